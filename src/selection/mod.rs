//! Region selection algorithms.
//!
//! This module provides the region-growing side of mask editing:
//! - **Raster sampling**: pixel index <-> coordinate mapping and color reads
//! - **Magic wand**: tolerance-bounded flood fill, single seed or scribble
//! - **Shortest paths**: bottleneck distances backing the tolerance preview
//!
//! Every algorithm returns a fresh delta mask; none of them touches the
//! session's live mask.

pub mod cancel;
pub mod kd_tree;
pub mod magic_wand;
pub mod priority_queue;
pub mod raster;
pub mod shortest_path;

pub use cancel::{CancelToken, FillOptions};
pub use magic_wand::{floodfill, floodfill_with, scribble_floodfill, scribble_floodfill_with};
pub use raster::{color_at, pixel_index_of, xy_of, Color, Raster};
pub use shortest_path::{shortest_paths, shortest_paths_with, PreviewDelta, TolerancePreview};

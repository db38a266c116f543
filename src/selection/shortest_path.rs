//! Bottleneck shortest paths for live tolerance previews.
//!
//! Dragging a tolerance slider should not rerun a flood fill per frame.
//! Instead [`shortest_paths`] computes once, for every pixel reachable
//! from the seed, the smallest possible maximum edge weight (squared color
//! distance between 4-neighbors) over all paths from the seed. A pixel is
//! in the preview at tolerance `t` iff that bottleneck distance is at most
//! `t^2`, so [`TolerancePreview`] can sort pixels by distance once and move
//! a cursor as the slider moves.

use rayon::prelude::*;

use super::cancel::FillOptions;
use super::magic_wand::{tolerance_sq, NEIGHBORS};
use super::priority_queue::PriorityQueue;
use super::raster::{check_coord, color_unchecked, in_bounds, Raster};
use crate::error::Result;
use crate::mask::{Mask, PixelIndex};

/// Bottleneck distance from (x, y) to every pixel, indexed by pixel number
/// (`PixelIndex / 4`).
///
/// Edges heavier than `tolerance_limit^2` are never crossed; pixels only
/// reachable through such edges are `None`.
pub fn shortest_paths(raster: &Raster, x: usize, y: usize, tolerance_limit: f64) -> Result<Vec<Option<u32>>> {
    shortest_paths_with(raster, x, y, tolerance_limit, &FillOptions::default())
}

/// [`shortest_paths`] with cancellation options.
pub fn shortest_paths_with(
    raster: &Raster,
    x: usize,
    y: usize,
    tolerance_limit: f64,
    options: &FillOptions,
) -> Result<Vec<Option<u32>>> {
    let limit = tolerance_sq(tolerance_limit)?;
    check_coord(raster, x, y)?;

    let (width, height) = (raster.width(), raster.height());
    let pixels = raster.pixels();

    let mut dist: Vec<Option<u32>> = vec![None; width * height];
    let mut settled = vec![false; width * height];
    let mut queue = PriorityQueue::new(|a: &(u32, usize), b: &(u32, usize)| a.0 < b.0);

    let seed = y * width + x;
    dist[seed] = Some(0);
    queue.push((0, seed));

    let mut processed = 0usize;
    while let Some((d, p)) = queue.pop() {
        // Stale entry superseded by a shorter one
        if settled[p] {
            continue;
        }
        settled[p] = true;
        options.checkpoint(processed)?;
        processed += 1;

        let (px, py) = ((p % width) as i64, (p / width) as i64);
        let color = color_unchecked(pixels, p * 4);

        for (dx, dy) in NEIGHBORS {
            let (nx, ny) = (px + dx, py + dy);
            if !in_bounds(width, height, nx, ny) {
                continue;
            }
            let n = ny as usize * width + nx as usize;
            if settled[n] {
                continue;
            }

            let weight = color.distance_sq(color_unchecked(pixels, n * 4));
            if weight > limit {
                continue;
            }
            let candidate = d.max(weight);
            if dist[n].map_or(true, |current| candidate < current) {
                dist[n] = Some(candidate);
                queue.push((candidate, n));
            }
        }
    }

    log::debug!(
        "shortest paths from ({}, {}) limit {} reached {} pixels",
        x,
        y,
        tolerance_limit,
        processed
    );
    Ok(dist)
}

/// Pixels entering and leaving the preview after a tolerance change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreviewDelta {
    pub added: Vec<PixelIndex>,
    pub removed: Vec<PixelIndex>,
}

impl PreviewDelta {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Incrementally maintained preview mask driven by a tolerance slider.
///
/// Starts empty; call [`set_tolerance`](Self::set_tolerance) to populate it.
#[derive(Debug, Clone)]
pub struct TolerancePreview {
    distances: Vec<Option<u32>>,
    /// Reachable pixels sorted by bottleneck distance
    order: Vec<(u32, PixelIndex)>,
    limit: u32,
    included: usize,
    tolerance: Option<f64>,
    mask: Mask,
}

impl TolerancePreview {
    /// Build from the output of [`shortest_paths`] computed with `tolerance_limit`.
    pub fn new(distances: Vec<Option<u32>>, tolerance_limit: f64) -> Result<Self> {
        let limit = tolerance_sq(tolerance_limit)?;
        let mut order: Vec<(u32, PixelIndex)> = distances
            .par_iter()
            .enumerate()
            .filter_map(|(p, &d)| d.map(|d| (d, p * 4)))
            .collect();
        order.par_sort_unstable();

        log::debug!("preview over {} reachable pixels", order.len());
        Ok(Self {
            distances,
            order,
            limit,
            included: 0,
            tolerance: None,
            mask: Mask::new(),
        })
    }

    /// Run [`shortest_paths`] and wrap the result.
    pub fn compute(raster: &Raster, x: usize, y: usize, tolerance_limit: f64, options: &FillOptions) -> Result<Self> {
        let distances = shortest_paths_with(raster, x, y, tolerance_limit, options)?;
        Self::new(distances, tolerance_limit)
    }

    /// Move the slider to `tolerance`, returning the pixels that changed.
    ///
    /// Tolerances above the precomputed limit are clamped to it.
    pub fn set_tolerance(&mut self, tolerance: f64) -> Result<PreviewDelta> {
        let mut threshold = tolerance_sq(tolerance)?;
        if threshold > self.limit {
            log::trace!("preview tolerance {} clamped to limit", tolerance);
            threshold = self.limit;
        }

        let target = self.order.partition_point(|&(d, _)| d <= threshold);
        let mut delta = PreviewDelta::default();
        if target > self.included {
            delta.added = self.order[self.included..target].iter().map(|&(_, p)| p).collect();
            self.mask.extend(delta.added.iter().copied());
        } else {
            delta.removed = self.order[target..self.included].iter().map(|&(_, p)| p).collect();
            for p in &delta.removed {
                self.mask.remove(p);
            }
        }

        self.included = target;
        self.tolerance = Some(tolerance);
        Ok(delta)
    }

    pub fn mask(&self) -> &Mask {
        &self.mask
    }

    pub fn into_mask(self) -> Mask {
        self.mask
    }

    pub fn tolerance(&self) -> Option<f64> {
        self.tolerance
    }

    pub fn distances(&self) -> &[Option<u32>] {
        &self.distances
    }

    /// Smallest tolerance at which `index` joins the preview.
    pub fn first_tolerance(&self, index: PixelIndex) -> Option<f64> {
        if index % 4 != 0 {
            return None;
        }
        self.distances
            .get(index / 4)
            .copied()
            .flatten()
            .map(|d| (d as f64).sqrt())
    }

    /// Number of reachable pixels.
    pub fn reachable(&self) -> usize {
        self.order.len()
    }
}

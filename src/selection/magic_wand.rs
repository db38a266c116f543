//! Magic wand selection using flood fill.
//!
//! Grows a region of 4-connected pixels whose color is within tolerance of
//! a reference. The basic fill compares against the seed color only; the
//! scribble fill compares against the seed plus every color under a
//! user-drawn stroke.
//!
//! Distances are squared RGB distances and tolerances are squared before
//! comparison, so no square root is taken per pixel.

use super::cancel::FillOptions;
use super::kd_tree::KdTree;
use super::raster::{
    check_coord, color_at, color_at_index, color_unchecked, in_bounds, pixel_index_of, Color, Raster,
};
use crate::error::{Result, SelectionError};
use crate::mask::Mask;

/// Left, right, up, down.
pub(crate) const NEIGHBORS: [(i64, i64); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Square a tolerance for comparison against squared color distances.
///
/// Distances are integers, so `d <= t^2` is the same test as `d <= floor(t^2)`.
pub fn tolerance_sq(tolerance: f64) -> Result<u32> {
    if !(tolerance >= 0.0) {
        return Err(SelectionError::InvalidTolerance(tolerance));
    }
    let squared = tolerance * tolerance;
    if squared >= u32::MAX as f64 {
        Ok(u32::MAX)
    } else {
        Ok(squared.floor() as u32)
    }
}

/// Select the region connected to (x, y) whose colors are within
/// `tolerance` of the seed color.
///
/// # Arguments
/// * `raster` - RGBA image
/// * `x`, `y` - Seed coordinate
/// * `tolerance` - Euclidean RGB tolerance (squared internally)
///
/// # Returns
/// Pixel indices of the selected region, seed included
pub fn floodfill(raster: &Raster, x: usize, y: usize, tolerance: f64) -> Result<Mask> {
    floodfill_with(raster, x, y, tolerance, &FillOptions::default())
}

/// [`floodfill`] with cancellation options.
pub fn floodfill_with(
    raster: &Raster,
    x: usize,
    y: usize,
    tolerance: f64,
    options: &FillOptions,
) -> Result<Mask> {
    let threshold = tolerance_sq(tolerance)?;
    let origin = color_at(raster, x, y)?;

    let mask = grow_region(raster, x, y, options, |color| origin.distance_sq(color) <= threshold)?;
    log::debug!(
        "floodfill from ({}, {}) tolerance {} selected {} pixels",
        x,
        y,
        tolerance,
        mask.len()
    );
    Ok(mask)
}

/// Flood fill that accepts a pixel if it is within `tolerance` of the seed
/// color or of any color under `scribble`.
///
/// Scribble colors closer to the seed color than half the squared
/// tolerance are dropped before the fill as redundant. With an empty
/// scribble this is equivalent to [`floodfill`].
pub fn scribble_floodfill(
    raster: &Raster,
    x: usize,
    y: usize,
    tolerance: f64,
    scribble: &Mask,
) -> Result<Mask> {
    scribble_floodfill_with(raster, x, y, tolerance, scribble, &FillOptions::default())
}

/// [`scribble_floodfill`] with cancellation options.
pub fn scribble_floodfill_with(
    raster: &Raster,
    x: usize,
    y: usize,
    tolerance: f64,
    scribble: &Mask,
    options: &FillOptions,
) -> Result<Mask> {
    let threshold = tolerance_sq(tolerance)?;
    let origin = color_at(raster, x, y)?;

    let references = reference_colors(raster, origin, threshold, scribble)?;
    let tree = KdTree::build(references);

    let mask = grow_region(raster, x, y, options, |color| tree.within(color, threshold))?;
    log::debug!(
        "scribble floodfill from ({}, {}) with {} references selected {} pixels",
        x,
        y,
        tree.len(),
        mask.len()
    );
    Ok(mask)
}

/// Seed color followed by the scribble colors that are not redundant with it.
pub fn reference_colors(
    raster: &Raster,
    origin: Color,
    threshold: u32,
    scribble: &Mask,
) -> Result<Vec<Color>> {
    let mut references = Vec::with_capacity(scribble.len() + 1);
    references.push(origin);

    for &index in scribble {
        let color = color_at_index(raster, index)?;
        // Already covered by the seed's own radius
        if 2 * (origin.distance_sq(color) as u64) < threshold as u64 {
            continue;
        }
        references.push(color);
    }

    log::trace!(
        "kept {} of {} scribble colors as references",
        references.len() - 1,
        scribble.len()
    );
    Ok(references)
}

/// Depth-first region growing with an explicit stack.
///
/// A neighbor is marked visited when first examined, whether or not it is
/// accepted, so each pixel's color is tested at most once.
fn grow_region<F>(raster: &Raster, x0: usize, y0: usize, options: &FillOptions, accept: F) -> Result<Mask>
where
    F: Fn(Color) -> bool,
{
    check_coord(raster, x0, y0)?;
    let (width, height) = (raster.width(), raster.height());
    let pixels = raster.pixels();

    let mut visited = vec![false; width * height];
    let mut stack = vec![(x0, y0)];
    visited[y0 * width + x0] = true;

    let mut mask = Mask::new();
    let mut processed = 0usize;

    while let Some((x, y)) = stack.pop() {
        options.checkpoint(processed)?;
        processed += 1;

        mask.insert(pixel_index_of(x, y, width));

        for (dx, dy) in NEIGHBORS {
            let nx = x as i64 + dx;
            let ny = y as i64 + dy;
            if !in_bounds(width, height, nx, ny) {
                continue;
            }
            let (nx, ny) = (nx as usize, ny as usize);
            let n = ny * width + nx;
            if visited[n] {
                continue;
            }
            visited[n] = true;

            if accept(color_unchecked(pixels, n * 4)) {
                stack.push((nx, ny));
            }
        }
    }

    Ok(mask)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::cancel::CancelToken;

    /// 11x4 image, black except the listed pixels which get `color`.
    fn make_test_image(width: usize, height: usize, color: [u8; 4], painted: &[usize]) -> Vec<u8> {
        let mut data = vec![0u8; width * height * 4];
        for &red in painted {
            data[red..red + 4].copy_from_slice(&color);
        }
        data
    }

    const WHITE_PIXELS: [usize; 13] = [8, 24, 28, 36, 48, 56, 64, 76, 96, 100, 112, 116, 152];

    fn fixture() -> Vec<u8> {
        make_test_image(11, 4, [255, 255, 255, 255], &WHITE_PIXELS)
    }

    fn set(items: &[usize]) -> Mask {
        items.iter().copied().collect()
    }

    fn gray_row(values: &[u8]) -> Vec<u8> {
        values.iter().flat_map(|&v| [v, v, v, 255]).collect()
    }

    #[test]
    fn test_isolated_pixel() {
        let data = fixture();
        let raster = Raster::new(&data, 11, 4).unwrap();
        assert_eq!(floodfill(&raster, 2, 1, 1.0).unwrap(), set(&[52]));
    }

    #[test]
    fn test_region_touching_border() {
        let data = fixture();
        let raster = Raster::new(&data, 11, 4).unwrap();
        assert_eq!(
            floodfill(&raster, 8, 2, 1.0).unwrap(),
            set(&[40, 80, 84, 120, 124, 128, 156, 160, 164, 168, 172])
        );
    }

    #[test]
    fn test_region_in_middle() {
        let data = fixture();
        let raster = Raster::new(&data, 11, 4).unwrap();
        assert_eq!(floodfill(&raster, 6, 1, 1.0).unwrap(), set(&[68, 72]));
    }

    #[test]
    fn test_single_color_fill() {
        let data = make_test_image(5, 5, [255, 0, 0, 255], &(0..25).map(|p| p * 4).collect::<Vec<_>>());
        let raster = Raster::new(&data, 5, 5).unwrap();
        assert_eq!(floodfill(&raster, 2, 2, 0.0).unwrap().len(), 25);
    }

    #[test]
    fn test_alpha_ignored() {
        let mut data = gray_row(&[50, 50, 50]);
        data[7] = 0;
        let raster = Raster::new(&data, 3, 1).unwrap();
        assert_eq!(floodfill(&raster, 0, 0, 0.0).unwrap().len(), 3);
    }

    #[test]
    fn test_tolerance_is_euclidean() {
        // Neighbor differs by (3, 4, 0): distance exactly 5
        let data = vec![10, 10, 10, 255, 13, 14, 10, 255];
        let raster = Raster::new(&data, 2, 1).unwrap();
        assert_eq!(floodfill(&raster, 0, 0, 5.0).unwrap().len(), 2);
        assert_eq!(floodfill(&raster, 0, 0, 4.99).unwrap().len(), 1);
    }

    #[test]
    fn test_monotonic_in_tolerance() {
        let values: Vec<u8> = (0..64u32).map(|i| (i * 29 % 256) as u8).collect();
        let data = gray_row(&values);
        let raster = Raster::new(&data, 8, 8).unwrap();

        let mut previous = 0;
        for tolerance in [0.0, 5.0, 20.0, 60.0, 120.0, 250.0, 500.0] {
            let size = floodfill(&raster, 3, 4, tolerance).unwrap().len();
            assert!(size >= previous);
            previous = size;
        }
        assert_eq!(previous, 64);
    }

    #[test]
    fn test_invalid_arguments() {
        let data = fixture();
        let raster = Raster::new(&data, 11, 4).unwrap();
        assert_eq!(
            floodfill(&raster, 0, 0, -1.0),
            Err(SelectionError::InvalidTolerance(-1.0))
        );
        assert!(matches!(floodfill(&raster, 0, 0, f64::NAN), Err(SelectionError::InvalidTolerance(_))));
        assert!(matches!(floodfill(&raster, 11, 0, 1.0), Err(SelectionError::OutOfBounds { .. })));
    }

    #[test]
    fn test_empty_scribble_matches_floodfill() {
        let data = fixture();
        let raster = Raster::new(&data, 11, 4).unwrap();
        for (x, y) in [(2, 1), (8, 2), (6, 1), (0, 0)] {
            assert_eq!(
                scribble_floodfill(&raster, x, y, 1.0, &Mask::new()).unwrap(),
                floodfill(&raster, x, y, 1.0).unwrap()
            );
        }
    }

    #[test]
    fn test_scribble_extends_references() {
        let data = gray_row(&[0, 0, 100, 100, 200]);
        let raster = Raster::new(&data, 5, 1).unwrap();

        assert_eq!(floodfill(&raster, 0, 0, 10.0).unwrap(), set(&[0, 4]));
        assert_eq!(
            scribble_floodfill(&raster, 0, 0, 10.0, &set(&[8])).unwrap(),
            set(&[0, 4, 8, 12])
        );
    }

    #[test]
    fn test_redundant_scribble_colors_dropped() {
        let data = gray_row(&[0, 3, 5, 90]);
        let raster = Raster::new(&data, 4, 1).unwrap();
        let origin = Color::new(0, 0, 0);

        // gray 3 is 27 away (< 100 / 2), gray 5 is 75 away
        let refs = reference_colors(&raster, origin, 100, &set(&[4, 8, 12])).unwrap();
        assert_eq!(refs.len(), 3);
        assert_eq!(refs[0], origin);
        assert!(!refs.contains(&Color::new(3, 3, 3)));
        assert!(refs.contains(&Color::new(5, 5, 5)));
        assert!(refs.contains(&Color::new(90, 90, 90)));
    }

    #[test]
    fn test_scribble_rejects_bad_index() {
        let data = fixture();
        let raster = Raster::new(&data, 11, 4).unwrap();
        assert!(matches!(
            scribble_floodfill(&raster, 0, 0, 1.0, &set(&[6])),
            Err(SelectionError::InvalidPixelIndex { index: 6, .. })
        ));
        assert!(matches!(
            scribble_floodfill(&raster, 0, 0, 1.0, &set(&[11 * 4 * 4])),
            Err(SelectionError::InvalidPixelIndex { .. })
        ));
    }

    #[test]
    fn test_cancelled_fill() {
        let data = fixture();
        let raster = Raster::new(&data, 11, 4).unwrap();
        let token = CancelToken::new();
        token.cancel();
        let options = FillOptions::with_cancel(token);
        assert_eq!(
            floodfill_with(&raster, 8, 2, 1.0, &options),
            Err(SelectionError::Cancelled)
        );
    }

    #[test]
    fn test_tolerance_sq() {
        assert_eq!(tolerance_sq(0.0), Ok(0));
        assert_eq!(tolerance_sq(2.5), Ok(6));
        assert_eq!(tolerance_sq(f64::INFINITY), Ok(u32::MAX));
    }
}

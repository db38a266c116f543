//! Raster access and color sampling.
//!
//! Pixels are stored row-major as packed RGBA bytes. A pixel is addressed
//! by the offset of its red channel, `(x + y * width) * 4`; the green, blue
//! and alpha channels follow at +1, +2 and +3.

use std::collections::HashSet;

use ndarray::ArrayView3;
use rayon::prelude::*;

use crate::error::{Result, SelectionError};
use crate::mask::{Mask, PixelIndex};

/// Read-only view of an RGBA image.
#[derive(Debug, Clone, Copy)]
pub struct Raster<'a> {
    width: usize,
    height: usize,
    pixels: &'a [u8],
}

impl<'a> Raster<'a> {
    /// Wrap a packed RGBA buffer of length `width * height * 4`.
    pub fn new(pixels: &'a [u8], width: usize, height: usize) -> Result<Self> {
        let len = pixels.len();
        let expected = pixel_count(width, height, len)?
            .checked_mul(4)
            .ok_or(SelectionError::InvalidDimensions { width, height, len })?;
        if len != expected {
            return Err(SelectionError::InvalidDimensions { width, height, len });
        }
        Ok(Self { width, height, pixels })
    }

    /// Caller has already checked the buffer length.
    pub(crate) fn new_unchecked(pixels: &'a [u8], width: usize, height: usize) -> Self {
        debug_assert_eq!(pixels.len(), width * height * 4);
        Self { width, height, pixels }
    }

    /// Wrap an (height, width, 4) array in standard layout.
    pub fn from_view(view: ArrayView3<'a, u8>) -> Result<Self> {
        let (height, width, channels) = view.dim();
        let len = view.len();
        if channels != 4 {
            return Err(SelectionError::InvalidDimensions { width, height, len });
        }
        let pixels = view
            .to_slice()
            .ok_or(SelectionError::InvalidDimensions { width, height, len })?;
        Self::new(pixels, width, height)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &'a [u8] {
        self.pixels
    }

    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }
}

/// `width * height`, or `InvalidDimensions` (reporting `len`) on overflow.
fn pixel_count(width: usize, height: usize, len: usize) -> Result<usize> {
    width
        .checked_mul(height)
        .ok_or(SelectionError::InvalidDimensions { width, height, len })
}

/// RGB color. Alpha never takes part in color distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Color {
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Squared Euclidean distance in RGB space (deliberately not rooted).
    #[inline]
    pub fn distance_sq(self, other: Color) -> u32 {
        let dr = self.red as i32 - other.red as i32;
        let dg = self.green as i32 - other.green as i32;
        let db = self.blue as i32 - other.blue as i32;
        (dr * dr + dg * dg + db * db) as u32
    }

    pub fn channels(self) -> [u8; 3] {
        [self.red, self.green, self.blue]
    }
}

/// Convert coord (x, y) to the red-channel offset in the flat buffer.
#[inline]
pub fn pixel_index_of(x: usize, y: usize, width: usize) -> PixelIndex {
    (x + y * width) * 4
}

/// Offsets of the red, green, blue and alpha channels for (x, y).
pub fn coord_to_data_array_indices(x: usize, y: usize, width: usize) -> [PixelIndex; 4] {
    let red = pixel_index_of(x, y, width);
    [red, red + 1, red + 2, red + 3]
}

/// Inverse of [`pixel_index_of`]. `None` for a zero width.
#[inline]
pub fn xy_of(index: PixelIndex, width: usize) -> Option<(usize, usize)> {
    let pixel = index / 4;
    Some((pixel.checked_rem(width)?, pixel / width))
}

#[inline]
pub fn in_bounds(width: usize, height: usize, x: i64, y: i64) -> bool {
    x >= 0 && y >= 0 && (x as u64) < width as u64 && (y as u64) < height as u64
}

/// Reject indices that are misaligned or past the end of the buffer.
pub fn check_pixel_index(raster: &Raster, index: PixelIndex) -> Result<()> {
    let len = raster.pixels.len();
    if index % 4 != 0 || index.checked_add(3).map_or(true, |end| end >= len) {
        return Err(SelectionError::InvalidPixelIndex { index, len });
    }
    Ok(())
}

/// Color of the pixel at (x, y).
pub fn color_at(raster: &Raster, x: usize, y: usize) -> Result<Color> {
    check_coord(raster, x, y)?;
    Ok(color_unchecked(raster.pixels, pixel_index_of(x, y, raster.width)))
}

/// Color of the pixel whose red channel sits at `index`.
pub fn color_at_index(raster: &Raster, index: PixelIndex) -> Result<Color> {
    check_pixel_index(raster, index)?;
    Ok(color_unchecked(raster.pixels, index))
}

/// All four channels of the pixel at (x, y).
pub fn rgba_at(raster: &Raster, x: usize, y: usize) -> Result<[u8; 4]> {
    check_coord(raster, x, y)?;
    let i = pixel_index_of(x, y, raster.width);
    let p = raster.pixels;
    Ok([p[i], p[i + 1], p[i + 2], p[i + 3]])
}

pub(crate) fn check_coord(raster: &Raster, x: usize, y: usize) -> Result<()> {
    if x >= raster.width || y >= raster.height {
        return Err(SelectionError::OutOfBounds {
            x: x as i64,
            y: y as i64,
            width: raster.width,
            height: raster.height,
        });
    }
    Ok(())
}

/// Caller guarantees `index` is aligned and in range.
#[inline]
pub(crate) fn color_unchecked(pixels: &[u8], index: PixelIndex) -> Color {
    Color::new(pixels[index], pixels[index + 1], pixels[index + 2])
}

// ============================================================================
// Mask helpers
// ============================================================================

/// Every pixel index of a `width` x `height` raster.
pub fn universe(width: usize, height: usize) -> Result<Mask> {
    let count = pixel_count(width, height, 0)?;
    if count.checked_mul(4).is_none() {
        return Err(SelectionError::InvalidDimensions { width, height, len: 0 });
    }
    Ok((0..count).into_par_iter().map(|p| p * 4).collect())
}

/// Render a mask as one byte per pixel (255 = selected, 0 = not selected).
///
/// Indices outside the raster or not on a red channel are skipped.
pub fn mask_to_bitmap(mask: &Mask, width: usize, height: usize) -> Result<Vec<u8>> {
    let mut bitmap = vec![0u8; pixel_count(width, height, 0)?];
    for &index in mask {
        match bitmap.get_mut(index / 4) {
            Some(value) if index % 4 == 0 => *value = 255,
            _ => log::trace!("skipping pixel index {} outside bitmap", index),
        }
    }
    Ok(bitmap)
}

/// Read a one-byte-per-pixel bitmap (nonzero = selected) back into a mask.
pub fn bitmap_to_mask(bitmap: &[u8], width: usize, height: usize) -> Result<Mask> {
    if bitmap.len() != pixel_count(width, height, bitmap.len())? {
        return Err(SelectionError::InvalidDimensions {
            width,
            height,
            len: bitmap.len(),
        });
    }
    let mask: HashSet<PixelIndex> = bitmap
        .par_iter()
        .enumerate()
        .filter(|&(_, &v)| v > 0)
        .map(|(p, _)| p * 4)
        .collect();
    Ok(mask)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    #[test]
    fn test_pixel_index_of() {
        assert_eq!(pixel_index_of(0, 0, 100), 0);
        assert_eq!(pixel_index_of(1, 5, 100), 2004);
    }

    #[test]
    fn test_channel_indices() {
        assert_eq!(coord_to_data_array_indices(1, 5, 100), [2004, 2005, 2006, 2007]);
    }

    #[test]
    fn test_xy_of_inverts_pixel_index() {
        for (x, y) in [(0, 0), (10, 3), (4, 2), (7, 0)] {
            assert_eq!(xy_of(pixel_index_of(x, y, 11), 11), Some((x, y)));
        }
        assert_eq!(xy_of(8, 0), None);
    }

    #[test]
    fn test_rgba_at() {
        let mut data = vec![0u8; 11 * 4 * 4];
        data[56..60].copy_from_slice(&[120, 111, 117, 255]);
        let raster = Raster::new(&data, 11, 4).unwrap();
        assert_eq!(rgba_at(&raster, 3, 1).unwrap(), [120, 111, 117, 255]);
        assert_eq!(color_at(&raster, 3, 1).unwrap(), Color::new(120, 111, 117));
    }

    #[test]
    fn test_in_bounds() {
        assert!(!in_bounds(11, 4, -1, 1));
        assert!(!in_bounds(11, 4, 11, 1));
        assert!(!in_bounds(11, 4, 4, -1));
        assert!(!in_bounds(11, 4, 4, 4));
        assert!(in_bounds(11, 4, 4, 2));
    }

    #[test]
    fn test_invalid_pixel_index() {
        let data = vec![0u8; 2 * 2 * 4];
        let raster = Raster::new(&data, 2, 2).unwrap();
        assert!(color_at_index(&raster, 12).is_ok());
        assert_eq!(
            color_at_index(&raster, 6),
            Err(SelectionError::InvalidPixelIndex { index: 6, len: 16 })
        );
        assert_eq!(
            color_at_index(&raster, 16),
            Err(SelectionError::InvalidPixelIndex { index: 16, len: 16 })
        );
        assert!(color_at_index(&raster, usize::MAX - 3).is_err());
    }

    #[test]
    fn test_out_of_bounds_coord() {
        let data = vec![0u8; 2 * 2 * 4];
        let raster = Raster::new(&data, 2, 2).unwrap();
        assert!(matches!(color_at(&raster, 2, 0), Err(SelectionError::OutOfBounds { .. })));
    }

    #[test]
    fn test_buffer_length_checked() {
        let data = vec![0u8; 15];
        assert!(matches!(
            Raster::new(&data, 2, 2),
            Err(SelectionError::InvalidDimensions { len: 15, .. })
        ));
    }

    #[test]
    fn test_overflowing_dimensions_rejected() {
        assert!(matches!(
            Raster::new(&[], 1 << 62, 1),
            Err(SelectionError::InvalidDimensions { len: 0, .. })
        ));
        assert!(matches!(
            Raster::new(&[], usize::MAX, 2),
            Err(SelectionError::InvalidDimensions { .. })
        ));
        assert!(universe(1 << 62, 1).is_err());
        assert!(mask_to_bitmap(&Mask::new(), usize::MAX, 2).is_err());
        assert!(bitmap_to_mask(&[], usize::MAX, 2).is_err());
    }

    #[test]
    fn test_from_view() {
        let mut img = Array3::<u8>::zeros((2, 3, 4));
        img[[1, 2, 0]] = 200;
        let raster = Raster::from_view(img.view()).unwrap();
        assert_eq!(raster.width(), 3);
        assert_eq!(raster.height(), 2);
        assert_eq!(color_at(&raster, 2, 1).unwrap().red, 200);

        let rgb = Array3::<u8>::zeros((2, 3, 3));
        assert!(Raster::from_view(rgb.view()).is_err());
    }

    #[test]
    fn test_distance_is_squared_rgb() {
        let a = Color::new(10, 20, 30);
        let b = Color::new(13, 24, 30);
        assert_eq!(a.distance_sq(b), 25);
        assert_eq!(Color::new(0, 0, 0).distance_sq(Color::new(255, 255, 255)), 3 * 255 * 255);
    }

    #[test]
    fn test_universe() {
        let all = universe(3, 2).unwrap();
        assert_eq!(all.len(), 6);
        assert!(all.contains(&20));
        assert!(!all.contains(&24));
    }

    #[test]
    fn test_bitmap_conversion() {
        let mask: Mask = [0, 12, 20].into_iter().collect();
        let bitmap = mask_to_bitmap(&mask, 3, 2).unwrap();
        assert_eq!(bitmap, vec![255, 0, 0, 255, 0, 255]);
        assert_eq!(bitmap_to_mask(&bitmap, 3, 2).unwrap(), mask);
        assert!(bitmap_to_mask(&bitmap, 2, 2).is_err());
    }
}

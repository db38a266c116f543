//! Static 3-D k-d tree over RGB colors.
//!
//! Built once per scribble fill and queried for every visited pixel, so
//! the tree is stored implicitly in a single sorted `Vec`: the median of
//! each slice is the node, the halves on either side are its subtrees.

use super::raster::Color;

pub struct KdTree {
    points: Vec<Color>,
}

impl KdTree {
    /// Build a tree from `points`. Duplicate colors are dropped.
    pub fn build(mut points: Vec<Color>) -> Self {
        points.sort_unstable_by_key(|c| c.channels());
        points.dedup();
        build_recursive(&mut points, 0);
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// True if some color lies within squared distance `radius_sq` of `target`.
    pub fn within(&self, target: Color, radius_sq: u32) -> bool {
        within_recursive(&self.points, 0, target.channels(), radius_sq)
    }
}

fn build_recursive(points: &mut [Color], depth: usize) {
    if points.len() <= 1 {
        return;
    }
    let axis = depth % 3;
    let mid = points.len() / 2;
    points.select_nth_unstable_by_key(mid, |c| c.channels()[axis]);
    let (left, rest) = points.split_at_mut(mid);
    build_recursive(left, depth + 1);
    build_recursive(&mut rest[1..], depth + 1);
}

#[inline]
fn distance_sq(a: [u8; 3], b: [u8; 3]) -> u32 {
    Color::new(a[0], a[1], a[2]).distance_sq(Color::new(b[0], b[1], b[2]))
}

/// Children of the node at `mid`, nearest side to `target` first, with the
/// squared distance from `target` to the splitting plane.
#[inline]
fn split<'a>(points: &'a [Color], depth: usize, target: [u8; 3]) -> (&'a [Color], &'a [Color], u32) {
    let mid = points.len() / 2;
    let axis = depth % 3;
    let diff = target[axis] as i32 - points[mid].channels()[axis] as i32;
    let (left, right) = (&points[..mid], &points[mid + 1..]);
    let plane = (diff * diff) as u32;
    if diff < 0 {
        (left, right, plane)
    } else {
        (right, left, plane)
    }
}

fn within_recursive(points: &[Color], depth: usize, target: [u8; 3], radius_sq: u32) -> bool {
    if points.is_empty() {
        return false;
    }
    if distance_sq(points[points.len() / 2].channels(), target) <= radius_sq {
        return true;
    }

    let (near, far, plane) = split(points, depth, target);
    within_recursive(near, depth + 1, target, radius_sq)
        || (plane <= radius_sq && within_recursive(far, depth + 1, target, radius_sq))
}

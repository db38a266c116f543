//! Set algebra over pixel-index masks.
//!
//! Every mask edit is expressed with these five operations. They never
//! mutate their inputs and always return a fresh set.

use std::collections::HashSet;

use super::Mask;

/// Eg. {1, 2, 3} union {3, 4, 5} => {1, 2, 3, 4, 5}
pub fn union(a: &Mask, b: &Mask) -> Mask {
    let mut result = a.clone();
    result.extend(b.iter().copied());
    result
}

/// Eg. {1, 2, 3} intersection {3, 4, 5} => {3}
pub fn intersection(a: &Mask, b: &Mask) -> Mask {
    // Iterate the smaller side
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small.iter().filter(|p| large.contains(p)).copied().collect()
}

/// Eg. {1, 2, 3} difference {3, 4, 5} => {1, 2}
pub fn difference(a: &Mask, b: &Mask) -> Mask {
    a.iter().filter(|p| !b.contains(p)).copied().collect()
}

/// Eg. {1, 2, 3} symmetric difference {3, 4, 5} => {1, 2, 4, 5}
pub fn symmetric_difference(a: &Mask, b: &Mask) -> Mask {
    let mut result: Mask = HashSet::with_capacity(a.len() + b.len());
    result.extend(a.iter().filter(|p| !b.contains(p)).copied());
    result.extend(b.iter().filter(|p| !a.contains(p)).copied());
    result
}

/// True iff the symmetric difference is empty.
pub fn equal(a: &Mask, b: &Mask) -> bool {
    a.len() == b.len() && symmetric_difference(a, b).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[usize]) -> Mask {
        items.iter().copied().collect()
    }

    #[test]
    fn test_union() {
        assert_eq!(union(&set(&[1, 2, 3]), &set(&[3, 4, 5])), set(&[1, 2, 3, 4, 5]));
    }

    #[test]
    fn test_intersection() {
        assert_eq!(intersection(&set(&[1, 2, 3]), &set(&[3, 4, 5])), set(&[3]));
    }

    #[test]
    fn test_difference() {
        assert_eq!(difference(&set(&[1, 2, 3]), &set(&[3, 4, 5])), set(&[1, 2]));
    }

    #[test]
    fn test_symmetric_difference() {
        assert_eq!(
            symmetric_difference(&set(&[1, 2, 3]), &set(&[3, 4, 5])),
            set(&[1, 2, 4, 5])
        );
    }

    #[test]
    fn test_commutative_union_and_intersection() {
        let a = set(&[0, 4, 8, 12]);
        let b = set(&[8, 12, 16]);
        assert_eq!(union(&a, &b), union(&b, &a));
        assert_eq!(intersection(&a, &b), intersection(&b, &a));
    }

    #[test]
    fn test_self_operations_are_empty() {
        let a = set(&[0, 4, 8, 12]);
        assert!(difference(&a, &a).is_empty());
        assert!(symmetric_difference(&a, &a).is_empty());
        assert!(equal(&a, &a));
    }

    #[test]
    fn test_inputs_untouched() {
        let a = set(&[1, 2]);
        let b = set(&[2, 3]);
        let _ = symmetric_difference(&a, &b);
        let _ = union(&a, &b);
        assert_eq!(a, set(&[1, 2]));
        assert_eq!(b, set(&[2, 3]));
    }

    #[test]
    fn test_equal_detects_difference() {
        assert!(!equal(&set(&[1, 2]), &set(&[1, 3])));
        assert!(!equal(&set(&[1, 2]), &set(&[1, 2, 3])));
        assert!(equal(&set(&[]), &set(&[])));
    }
}

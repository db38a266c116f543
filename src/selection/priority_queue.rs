//! Binary min-heap ordered by a caller-supplied predicate.
//!
//! Used by the bottleneck shortest-path expansion, where nodes are ordered
//! by their current best distance.

/// Binary heap backed by a `Vec`. `less(a, b)` returns true when `a` should
/// be popped before `b`.
pub struct PriorityQueue<T, F>
where
    F: Fn(&T, &T) -> bool,
{
    items: Vec<T>,
    less: F,
}

impl<T, F> PriorityQueue<T, F>
where
    F: Fn(&T, &T) -> bool,
{
    pub fn new(less: F) -> Self {
        Self { items: Vec::new(), less }
    }

    pub fn with_capacity(capacity: usize, less: F) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            less,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Peek at the highest-priority item.
    pub fn top(&self) -> Option<&T> {
        self.items.first()
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
        self.percolate_up(self.items.len() - 1);
    }

    pub fn pop(&mut self) -> Option<T> {
        if self.items.is_empty() {
            return None;
        }
        let last = self.items.len() - 1;
        self.items.swap(0, last);
        let item = self.items.pop();
        self.percolate_down(0);
        item
    }

    #[inline]
    fn parent(n: usize) -> usize {
        (n - 1) / 2
    }

    #[inline]
    fn left_child(n: usize) -> usize {
        2 * n + 1
    }

    #[inline]
    fn right_child(n: usize) -> usize {
        2 * n + 2
    }

    #[inline]
    fn compare(&self, i: usize, j: usize) -> bool {
        (self.less)(&self.items[i], &self.items[j])
    }

    fn percolate_up(&mut self, mut n: usize) {
        while n > 0 && self.compare(n, Self::parent(n)) {
            let parent = Self::parent(n);
            self.items.swap(n, parent);
            n = parent;
        }
    }

    fn percolate_down(&mut self, mut n: usize) {
        let size = self.items.len();
        while Self::left_child(n) < size {
            let mut child = Self::left_child(n);
            let right = Self::right_child(n);
            if right < size && self.compare(right, child) {
                child = right;
            }

            if !self.compare(child, n) {
                break;
            }
            self.items.swap(child, n);
            n = child;
        }
    }
}

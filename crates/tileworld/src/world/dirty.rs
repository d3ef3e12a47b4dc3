/// Accumulating bounding box over grid coordinates, marking the cells whose
/// occupancy or index changed since the last bake. Grows monotonically under
/// `mark` and is cleared only by the atlas cache once it has consumed the
/// region for a baking pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirtyRect {
    empty: bool,
    min_x: i32,
    min_y: i32,
    max_x: i32,
    max_y: i32,
}

/// Inclusive extents of a non-empty `DirtyRect`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirtyExtents {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl Default for DirtyRect {
    fn default() -> Self {
        Self {
            empty: true,
            min_x: i32::MAX,
            min_y: i32::MAX,
            max_x: i32::MIN,
            max_y: i32::MIN,
        }
    }
}

impl DirtyRect {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn mark(&mut self, x: i32, y: i32) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
        self.empty = false;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        !self.empty && x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    pub fn extents(&self) -> Option<DirtyExtents> {
        if self.empty {
            return None;
        }
        Some(DirtyExtents {
            min_x: self.min_x,
            min_y: self.min_y,
            max_x: self.max_x,
            max_y: self.max_y,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let rect = DirtyRect::new();
        assert!(rect.is_empty());
        assert!(rect.extents().is_none());
        assert!(!rect.contains(0, 0));
    }

    #[test]
    fn mark_grows_bounds_monotonically() {
        let mut rect = DirtyRect::new();
        rect.mark(3, 4);
        assert_eq!(
            rect.extents(),
            Some(DirtyExtents {
                min_x: 3,
                min_y: 4,
                max_x: 3,
                max_y: 4,
            })
        );
        rect.mark(-2, 10);
        let extents = rect.extents().unwrap();
        assert_eq!((extents.min_x, extents.min_y), (-2, 4));
        assert_eq!((extents.max_x, extents.max_y), (3, 10));
    }

    #[test]
    fn contains_is_inclusive_of_both_corners() {
        let mut rect = DirtyRect::new();
        rect.mark(1, 1);
        rect.mark(5, 3);
        assert!(rect.contains(1, 1));
        assert!(rect.contains(5, 3));
        assert!(rect.contains(3, 2));
        assert!(!rect.contains(0, 1));
        assert!(!rect.contains(6, 3));
        assert!(!rect.contains(3, 4));
    }

    #[test]
    fn reset_returns_to_empty() {
        let mut rect = DirtyRect::new();
        rect.mark(2, 2);
        rect.reset();
        assert!(rect.is_empty());
        assert!(!rect.contains(2, 2));
    }
}

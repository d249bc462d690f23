/// Largest coordinate magnitude the kernel's arithmetic stays exact for.
/// Coordinates beyond it are rejected at the marshaling boundary.
pub const HI_RANGE: i64 = 9_007_199_254_740_991;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct IntPoint {
    pub x: i64,
    pub y: i64,
}

impl IntPoint {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    pub fn in_range(self) -> bool {
        self.x.abs() <= HI_RANGE && self.y.abs() <= HI_RANGE
    }
}

impl From<(i64, i64)> for IntPoint {
    fn from((x, y): (i64, i64)) -> Self {
        Self { x, y }
    }
}

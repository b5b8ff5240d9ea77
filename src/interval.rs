/*

    Closed range [min, max] on a single axis, used to build
    and grow bounding boxes one axis at a time.

    @author: Bartu
    @date: Sept 2025

*/

use crate::numeric::{Float};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: Float,
    pub max: Float,
}

impl Interval {

    pub fn validate(&self) -> bool {
        self.max >= self.min
    }

    pub fn new(min: Float, max: Float) -> Self {
        Self {
            min,
            max,
        }
    }

    pub fn size(&self) -> Float {
        self.max - self.min
    }

    /// Grow symmetrically by `fraction` of the current size, half on each side.
    pub fn inflate(&self, fraction: Float) -> Interval {
        let half_adjust = self.size() * fraction / 2.0;
        Interval::new(self.min - half_adjust, self.max + half_adjust)
    }

}

use num_traits::{FromPrimitive, NumCast};
use serde::{Deserialize, Serialize};

/// Size of a rectangular area, e.g. of a rendering viewport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size<Num: num_traits::Num + PartialOrd + Copy + PartialEq = f64> {
    width: Num,
    height: Num,
}

impl<Num: num_traits::Num + FromPrimitive + PartialOrd + Copy + NumCast> Size<Num> {
    /// Creates a new size struct.
    pub fn new(width: Num, height: Num) -> Self {
        Self { width, height }
    }

    /// Width of the area.
    pub fn width(&self) -> Num {
        self.width
    }

    /// Half width of the area.
    pub fn half_width(&self) -> Num {
        self.width / Num::from_f64(2.0).expect("const conversion failed")
    }

    /// Height of the area.
    pub fn height(&self) -> Num {
        self.height
    }

    /// Half height of the area.
    pub fn half_height(&self) -> Num {
        self.height / Num::from_f64(2.0).expect("const conversion failed")
    }

    /// The smaller of width and height.
    pub fn min_dimension(&self) -> Num {
        if self.width < self.height {
            self.width
        } else {
            self.height
        }
    }

    /// Returns true if at least one dimension is zero.
    pub fn is_zero(&self) -> bool {
        self.width.is_zero() || self.height.is_zero()
    }

    /// Converts the underlying numeric type.
    pub fn cast<T: num_traits::Num + FromPrimitive + PartialOrd + Copy + NumCast>(
        &self,
    ) -> Size<T> {
        Size {
            width: NumCast::from(self.width).expect("invalid value"),
            height: NumCast::from(self.height).expect("invalid value"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_dimension() {
        assert_eq!(Size::new(800.0, 600.0).min_dimension(), 600.0);
        assert_eq!(Size::new(300.0, 600.0).min_dimension(), 300.0);
    }

    #[test]
    fn is_zero() {
        assert!(Size::new(0.0, 100.0).is_zero());
        assert!(!Size::new(1.0, 100.0).is_zero());
    }
}

//! Line segments

use wire4d_math::{Field, VectorTrait};

/// An ordered segment from `.0` to `.1`
///
/// The order defines the interpolation parameter: `t = 0` is `.0`, `t = 1` is `.1`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Line<V>(pub V, pub V);

impl<V: VectorTrait> Line<V> {
    /// Apply `f` to both endpoints
    pub fn map<U, F: Fn(V) -> U>(self, f: F) -> Line<U> {
        Line(f(self.0), f(self.1))
    }

    /// Point at parameter `t` along the segment
    #[inline]
    pub fn lerp(&self, t: Field) -> V {
        self.0.lerp(self.1, t)
    }

    /// Same segment traversed the other way
    pub fn reverse(self) -> Self {
        Line(self.1, self.0)
    }

    /// Vector from start to end
    #[inline]
    pub fn direction(&self) -> V {
        self.1 - self.0
    }

    pub fn length(&self) -> Field {
        self.direction().length()
    }

    /// Endpoint-wise approximate equality
    pub fn is_close(&self, other: &Self) -> bool {
        self.0.is_close(other.0) && self.1.is_close(other.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wire4d_math::{Vec2, Vec3};

    #[test]
    fn test_lerp_and_map() {
        let line = Line(Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(line.lerp(0.25), Vec3::new(0.5, 0.0, 0.0));
        let flat: Line<Vec2> = line.map(|v| Vec2::new(v.x, v.y));
        assert_eq!(flat, Line(Vec2::ZERO, Vec2::new(2.0, 0.0)));
    }

    #[test]
    fn test_reverse() {
        let line = Line(Vec2::X, Vec2::Y);
        assert_eq!(line.reverse(), Line(Vec2::Y, Vec2::X));
        assert!((line.length() - 2.0_f32.sqrt()).abs() < 1e-6);
    }
}

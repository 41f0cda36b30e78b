//! Aspect-preserving rectangle fitting.
//!
//! Sizes are `cgmath::Vector2<u32>`. Aspect ratios are `width / height`
//! expressed as `f64`.
//!
//! The fitted extent is truncated toward zero. Downstream code relies on this
//! to produce pixel-identical output, so don't "fix" it by rounding.
//!
//! # Examples
//!
//! ```
//! use cgmath::vec2;
//! use fitgeom::{fit_rect, Rect};
//!
//! // A 2:1 source letterboxed into a 3:2 target
//! assert_eq!(fit_rect(vec2(480, 320), 1.5, 2.0), Rect::new(0, 40, 480, 240));
//! ```
use cgmath::Vector2;

/// The tolerance used by [`aspect_eq`], relative to the magnitude of the
/// compared values.
pub const ASPECT_EPSILON: f64 = 1.0e-6;

/// An axis-aligned rectangle in the coordinate space of a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Construct a `Rect` covering an entire surface of the given size.
    #[inline]
    pub fn from_size(size: Vector2<u32>) -> Self {
        Self::new(0, 0, size.x as i32, size.y as i32)
    }

    #[inline]
    pub fn size(&self) -> Vector2<i32> {
        Vector2::new(self.width, self.height)
    }

    /// The exclusive right edge.
    #[inline]
    pub fn max_x(&self) -> i32 {
        self.x + self.width
    }

    /// The exclusive bottom edge.
    #[inline]
    pub fn max_y(&self) -> i32 {
        self.y + self.height
    }

    /// Check if the rectangle lies within `[0, size.x) × [0, size.y)`.
    pub fn is_within(&self, size: Vector2<u32>) -> bool {
        self.x >= 0
            && self.y >= 0
            && self.width >= 0
            && self.height >= 0
            && i64::from(self.max_x()) <= i64::from(size.x)
            && i64::from(self.max_y()) <= i64::from(size.y)
    }
}

/// Get the aspect ratio of a surface of the given size.
///
/// `size` must not have a zero component.
#[inline]
pub fn aspect_of(size: Vector2<u32>) -> f64 {
    debug_assert!(size.x > 0 && size.y > 0);
    f64::from(size.x) / f64::from(size.y)
}

/// Compare two aspect ratios, tolerating floating-point imprecision.
#[inline]
pub fn aspect_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= ASPECT_EPSILON * a.abs().max(b.abs())
}

/// Compute the largest rectangle with aspect ratio `source_aspect` that is
/// centered in a target surface of size `target`, which is presented with
/// aspect ratio `target_aspect`.
///
///  - If the aspect ratios match, the whole target is covered.
///  - If the source is wider, the rectangle spans the target's full width and
///    is centered vertically.
///  - Otherwise, it spans the full height and is centered horizontally.
///
/// `target_aspect` may differ from `aspect_of(target)` (e.g., a forced aspect
/// ratio). The extent is clamped to `target` in that case so the result always
/// fits. Neither extent is ever less than one pixel.
///
/// All inputs must be positive. Panics in debug builds otherwise.
pub fn fit_rect(target: Vector2<u32>, target_aspect: f64, source_aspect: f64) -> Rect {
    debug_assert!(target.x > 0 && target.y > 0, "empty target {:?}", target);
    debug_assert!(target_aspect > 0.0, "bad target aspect {}", target_aspect);
    debug_assert!(source_aspect > 0.0, "bad source aspect {}", source_aspect);

    let (tw, th) = (target.x as i32, target.y as i32);

    if aspect_eq(source_aspect, target_aspect) {
        return Rect::new(0, 0, tw, th);
    }

    if source_aspect > target_aspect {
        let width = tw;
        let height = clamp_extent(f64::from(width) / source_aspect, th);
        Rect::new(0, (th - height) / 2, width, height)
    } else {
        let height = th;
        let width = clamp_extent(f64::from(height) * source_aspect, tw);
        Rect::new((tw - width) / 2, 0, width, height)
    }
}

/// Truncate `x` and clamp it to `1..=max`.
#[inline]
fn clamp_extent(x: f64, max: i32) -> i32 {
    // `as` saturates on overflow and maps NaN to zero
    (x as i32).max(1).min(max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::vec2;
    use quickcheck::TestResult;
    use quickcheck_macros::quickcheck;

    #[test]
    fn matching_aspect_covers_target() {
        assert_eq!(fit_rect(vec2(480, 320), 1.5, 1.5), Rect::new(0, 0, 480, 320));
    }

    #[test]
    fn nearly_matching_aspect_covers_target() {
        let aspect = 480.0 / 320.0 + 1.0e-9;
        assert_eq!(fit_rect(vec2(480, 320), 1.5, aspect), Rect::new(0, 0, 480, 320));
    }

    #[test]
    fn wider_source_is_letterboxed() {
        assert_eq!(fit_rect(vec2(480, 320), 1.5, 2.0), Rect::new(0, 40, 480, 240));
    }

    #[test]
    fn taller_source_is_pillarboxed() {
        assert_eq!(fit_rect(vec2(480, 320), 1.5, 1.0), Rect::new(80, 0, 320, 320));
    }

    #[test]
    fn sixteen_by_nine_on_three_by_two() {
        // 480 / (1920 / 1080) is exactly 270 in binary64
        let rect = fit_rect(vec2(480, 320), 1.5, aspect_of(vec2(1920, 1080)));
        assert_eq!(rect, Rect::new(0, 25, 480, 270));
    }

    #[test]
    fn extent_is_truncated() {
        // 320 * 1.2345 = 395.04
        let rect = fit_rect(vec2(480, 320), 1.5, 1.2345);
        assert_eq!(rect, Rect::new(42, 0, 395, 320));
    }

    #[test]
    fn forced_aspect_is_clamped() {
        // The target is presented as 3:1 but is physically 3:2
        let rect = fit_rect(vec2(480, 320), 3.0, 2.0);
        assert_eq!(rect, Rect::new(0, 0, 480, 320));
    }

    #[test]
    fn extreme_aspect_keeps_one_pixel() {
        let rect = fit_rect(vec2(480, 320), 1.5, 1.0e6);
        assert_eq!(rect.height, 1);
        assert_eq!(rect.width, 480);
    }

    #[test]
    fn aspect_eq_is_relative() {
        assert!(aspect_eq(1.5, 1.5));
        assert!(aspect_eq(1000.0, 1000.0001));
        assert!(!aspect_eq(1.5, 1.5001));
    }

    fn arbitrary_aspect(x: u16) -> f64 {
        // Covers roughly 1:100 ..= 100:1
        (f64::from(x) / f64::from(u16::max_value()) * 9.2103 - 4.6052).exp()
    }

    #[quickcheck]
    fn result_fits_target(w: u16, h: u16, target_aspect: u16, source_aspect: u16) -> TestResult {
        if w == 0 || h == 0 {
            return TestResult::discard();
        }
        let target = vec2(u32::from(w), u32::from(h));
        let (ta, sa) = (arbitrary_aspect(target_aspect), arbitrary_aspect(source_aspect));

        let rect = fit_rect(target, ta, sa);

        if !rect.is_within(target) {
            return TestResult::error(format!(
                "{:?} doesn't fit {:?} (target_aspect = {}, source_aspect = {})",
                rect, target, ta, sa
            ));
        }

        TestResult::passed()
    }

    #[quickcheck]
    fn natural_aspect_spans_one_axis(w: u16, h: u16, source_aspect: u16) -> TestResult {
        if w == 0 || h == 0 {
            return TestResult::discard();
        }
        let target = vec2(u32::from(w), u32::from(h));
        let sa = arbitrary_aspect(source_aspect);

        let rect = fit_rect(target, aspect_of(target), sa);

        TestResult::from_bool(rect.width == w as i32 || rect.height == h as i32)
    }
}

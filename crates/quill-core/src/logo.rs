//! # Logo Fitting
//!
//! Aspect-preserving fit of an image into a bounding box. Units are
//! whatever the caller uses (pixels in, millimetres out in practice).

use serde::{Deserialize, Serialize};

/// Width and height of a rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Size { width, height }
    }

    /// True when either side is zero, negative or not finite.
    pub fn is_degenerate(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
    }
}

/// Largest rectangle with the aspect ratio of `intrinsic` that fits in
/// `bounds`.
///
/// Scales to the box width first; if that makes it too tall, scales to the
/// box height instead. A degenerate `intrinsic` size yields `Size::default()`.
///
/// ## Example
/// ```rust
/// use quill_core::{fit_within, Size};
///
/// let fitted = fit_within(Size::new(800.0, 400.0), Size::new(35.0, 25.0));
/// assert_eq!(fitted, Size::new(35.0, 17.5));
/// ```
pub fn fit_within(intrinsic: Size, bounds: Size) -> Size {
    if intrinsic.is_degenerate() || bounds.is_degenerate() {
        return Size::default();
    }

    let ratio = intrinsic.width / intrinsic.height;

    let width = bounds.width;
    let height = width / ratio;
    if height <= bounds.height {
        return Size::new(width, height);
    }

    let height = bounds.height;
    Size::new(height * ratio, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOGO_BOX: Size = Size::new(35.0, 25.0);

    #[test]
    fn test_wide_image_is_width_bound() {
        assert_eq!(fit_within(Size::new(800.0, 400.0), LOGO_BOX), Size::new(35.0, 17.5));
    }

    #[test]
    fn test_tall_image_is_height_bound() {
        assert_eq!(fit_within(Size::new(400.0, 800.0), LOGO_BOX), Size::new(12.5, 25.0));
    }

    #[test]
    fn test_exact_box_ratio_fills_the_box() {
        let fitted = fit_within(Size::new(700.0, 500.0), LOGO_BOX);
        assert!((fitted.width - 35.0).abs() < 1e-3);
        assert!((fitted.height - 25.0).abs() < 1e-3);
    }

    #[test]
    fn test_small_images_are_scaled_up() {
        let fitted = fit_within(Size::new(10.0, 10.0), LOGO_BOX);
        assert_eq!(fitted, Size::new(25.0, 25.0));
    }

    #[test]
    fn test_degenerate_sizes() {
        assert_eq!(fit_within(Size::new(0.0, 400.0), LOGO_BOX), Size::default());
        assert_eq!(fit_within(Size::new(400.0, 0.0), LOGO_BOX), Size::default());
        assert_eq!(fit_within(Size::new(f32::NAN, 1.0), LOGO_BOX), Size::default());
        assert!(fit_within(Size::new(400.0, 0.0), LOGO_BOX).is_degenerate());
    }

    #[test]
    fn test_result_never_exceeds_bounds() {
        for (w, h) in [(1.0, 1000.0), (1000.0, 1.0), (333.0, 237.0), (1920.0, 1080.0)] {
            let fitted = fit_within(Size::new(w, h), LOGO_BOX);
            assert!(fitted.width <= LOGO_BOX.width + 1e-4);
            assert!(fitted.height <= LOGO_BOX.height + 1e-4);
            let ratio = w / h;
            assert!((fitted.width / fitted.height - ratio).abs() / ratio < 1e-4);
        }
    }
}

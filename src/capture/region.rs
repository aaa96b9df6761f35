//! Pure region logic — functional core.
//!
//! This module has zero infrastructure dependencies.
//! It normalizes drag gestures into rectangles and crops pixel data to them.

use image::{DynamicImage, RgbaImage};
use serde::{Deserialize, Serialize};

/// Screen rectangle selected for repeated capture.
///
/// Coordinates are physical pixels relative to the primary monitor's
/// top-left corner. `width` and `height` are never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    /// Builds a region from the two endpoints of a drag gesture.
    ///
    /// The endpoints may arrive in any order; left/top become the
    /// coordinate-wise minimum.
    pub fn from_drag(start: (i32, i32), end: (i32, i32)) -> Self {
        let (x1, y1) = start;
        let (x2, y2) = end;
        Self {
            left: x1.min(x2),
            top: y1.min(y2),
            width: x1.abs_diff(x2),
            height: y1.abs_diff(y2),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Exclusive right edge.
    pub fn right(&self) -> i64 {
        self.left as i64 + self.width as i64
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> i64 {
        self.top as i64 + self.height as i64
    }

    /// Human-readable bounds for the main window, e.g. `(10, 20) - (110, 220)`.
    pub fn describe(&self) -> String {
        format!(
            "({}, {}) - ({}, {})",
            self.left,
            self.top,
            self.right(),
            self.bottom()
        )
    }
}

/// Crops a full-monitor screenshot to `region`.
///
/// This is a pure function with no side effects.
pub fn crop_to_region(image: &DynamicImage, region: &Region) -> Result<RgbaImage, CropError> {
    if region.is_empty() {
        return Err(CropError::ZeroDimension);
    }

    let (img_width, img_height) = (image.width(), image.height());

    let out_of_bounds = || CropError::OutOfBounds {
        requested: *region,
        image_size: (img_width, img_height),
    };

    if region.left < 0 || region.top < 0 {
        return Err(out_of_bounds());
    }
    if region.right() > img_width as i64 || region.bottom() > img_height as i64 {
        return Err(out_of_bounds());
    }

    let cropped = image.crop_imm(
        region.left as u32,
        region.top as u32,
        region.width,
        region.height,
    );

    Ok(cropped.to_rgba8())
}

#[derive(Debug, thiserror::Error)]
pub enum CropError {
    #[error("Capture region has zero width or height")]
    ZeroDimension,

    #[error(
        "Capture region {} exceeds screen bounds ({}x{})",
        requested.describe(), image_size.0, image_size.1
    )]
    OutOfBounds {
        requested: Region,
        image_size: (u32, u32),
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn screen(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::new(width, height))
    }

    #[test]
    fn drag_down_right_keeps_start_as_origin() {
        let r = Region::from_drag((10, 20), (110, 220));
        assert_eq!(
            r,
            Region {
                left: 10,
                top: 20,
                width: 100,
                height: 200
            }
        );
    }

    #[test]
    fn drag_up_left_is_normalized() {
        let r = Region::from_drag((110, 220), (10, 20));
        assert_eq!(r.left, 10);
        assert_eq!(r.top, 20);
        assert_eq!(r.width, 100);
        assert_eq!(r.height, 200);
    }

    #[test]
    fn click_without_drag_is_empty() {
        let r = Region::from_drag((50, 50), (50, 50));
        assert!(r.is_empty());
    }

    #[test]
    fn describe_shows_both_corners() {
        let r = Region::from_drag((10, 20), (110, 220));
        assert_eq!(r.describe(), "(10, 20) - (110, 220)");
    }

    #[test]
    fn crop_valid_region() {
        let img = screen(100, 100);
        let r = Region::from_drag((10, 10), (60, 40));
        let cropped = crop_to_region(&img, &r).unwrap();
        assert_eq!(cropped.dimensions(), (50, 30));
    }

    #[test]
    fn crop_keeps_pixels_from_region() {
        let mut raw = RgbaImage::new(4, 4);
        raw.put_pixel(2, 1, image::Rgba([255, 0, 0, 255]));
        let img = DynamicImage::ImageRgba8(raw);
        let r = Region {
            left: 2,
            top: 1,
            width: 1,
            height: 1,
        };
        let cropped = crop_to_region(&img, &r).unwrap();
        assert_eq!(cropped.get_pixel(0, 0).0, [255, 0, 0, 255]);
    }

    #[test]
    fn crop_zero_dimension_fails() {
        let img = screen(100, 100);
        let r = Region::from_drag((0, 0), (0, 50));
        assert!(matches!(
            crop_to_region(&img, &r),
            Err(CropError::ZeroDimension)
        ));
    }

    #[test]
    fn crop_out_of_bounds_fails() {
        let img = screen(100, 100);
        let r = Region::from_drag((80, 80), (110, 110));
        assert!(matches!(
            crop_to_region(&img, &r),
            Err(CropError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn crop_negative_origin_fails() {
        let img = screen(100, 100);
        let r = Region::from_drag((-5, 0), (20, 20));
        assert!(matches!(
            crop_to_region(&img, &r),
            Err(CropError::OutOfBounds { .. })
        ));
    }

    proptest! {
        #[test]
        fn normalized_region_starts_at_minimum(
            x1 in -5000i32..5000,
            y1 in -5000i32..5000,
            x2 in -5000i32..5000,
            y2 in -5000i32..5000,
        ) {
            let r = Region::from_drag((x1, y1), (x2, y2));
            prop_assert_eq!(r.left, x1.min(x2));
            prop_assert_eq!(r.top, y1.min(y2));
            prop_assert_eq!(r.right(), x1.max(x2) as i64);
            prop_assert_eq!(r.bottom(), y1.max(y2) as i64);
        }

        #[test]
        fn drag_direction_does_not_matter(
            x1 in -5000i32..5000,
            y1 in -5000i32..5000,
            x2 in -5000i32..5000,
            y2 in -5000i32..5000,
        ) {
            prop_assert_eq!(
                Region::from_drag((x1, y1), (x2, y2)),
                Region::from_drag((x2, y2), (x1, y1))
            );
        }
    }
}

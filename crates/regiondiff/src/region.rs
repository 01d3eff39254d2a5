use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::CompareError;
use crate::settings::ComparisonSettings;

/// How each image is placed on the shared canvas before cropping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SizingPolicy {
    /// Native size, centred; larger images are cropped by the canvas bounds.
    #[default]
    NoScale,
    /// Images smaller than the canvas are scaled up ("contain") and centred.
    FitScale,
}

/// Percentage rectangle on the shared canvas. Corners may be given in any order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Region {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Default for Region {
    fn default() -> Self {
        Self::FULL
    }
}

/// Pixel rectangle on the canvas. Percentages outside 0-100 put part of it
/// past the canvas edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceRect {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub const FULL: Region = Region::new(0.0, 0.0, 100.0, 100.0);

    pub const fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// True when the region is exactly the untouched default.
    pub fn is_full(&self) -> bool {
        *self == Self::FULL
    }

    /// Map the percentages onto a canvas of `canvas_w x canvas_h` pixels.
    ///
    /// Width and height are rounded to the nearest pixel, the origin is
    /// truncated. Percentages are not clamped: a rectangle reaching past the
    /// canvas reads transparent pixels there.
    pub fn to_rect(&self, canvas_w: u32, canvas_h: u32) -> Result<SourceRect, CompareError> {
        let corners = [self.x1, self.y1, self.x2, self.y2];
        if corners.iter().any(|v| !v.is_finite()) {
            return Err(CompareError::InvalidRegion {
                width: 0,
                height: 0,
            });
        }
        let [x1, y1, x2, y2] = corners;

        let (cw, ch) = (f64::from(canvas_w), f64::from(canvas_h));
        let sx = x1.min(x2) / 100.0 * cw;
        let sy = y1.min(y2) / 100.0 * ch;
        let sw = (x2 - x1).abs() / 100.0 * cw;
        let sh = (y2 - y1).abs() / 100.0 * ch;

        let width = sw.round() as i64;
        let height = sh.round() as i64;
        if width <= 0 || height <= 0 {
            return Err(CompareError::InvalidRegion { width, height });
        }

        let (Ok(w), Ok(h)) = (u32::try_from(width), u32::try_from(height)) else {
            return Err(CompareError::InvalidRegion { width, height });
        };
        Ok(SourceRect {
            x: sx.trunc() as i64,
            y: sy.trunc() as i64,
            width: w,
            height: h,
        })
    }
}

/// Bring both images into the same coordinate space and cut out the region.
///
/// Both returned buffers have the dimensions of the region rectangle, so they
/// can be compared pixel for pixel.
pub fn extract(
    left: &RgbaImage,
    right: &RgbaImage,
    settings: &ComparisonSettings,
) -> Result<(RgbaImage, RgbaImage), CompareError> {
    let canvas_w = left.width().max(right.width());
    let canvas_h = left.height().max(right.height());
    let rect = settings.region.to_rect(canvas_w, canvas_h)?;
    debug!(
        canvas_w,
        canvas_h,
        x = rect.x,
        y = rect.y,
        width = rect.width,
        height = rect.height,
        sizing = ?settings.sizing,
        "region resolved"
    );

    let left = region_of(left, canvas_w, canvas_h, settings.sizing, &rect);
    let right = region_of(right, canvas_w, canvas_h, settings.sizing, &rect);
    Ok((left, right))
}

fn region_of(
    img: &RgbaImage,
    canvas_w: u32,
    canvas_h: u32,
    sizing: SizingPolicy,
    rect: &SourceRect,
) -> RgbaImage {
    // An image that already fills the canvas is neither scaled nor shifted.
    if img.dimensions() == (canvas_w, canvas_h) {
        return crop(img, rect);
    }
    let canvas = place(img, canvas_w, canvas_h, sizing);
    crop(&canvas, rect)
}

/// Draw `img` onto a transparent `canvas_w x canvas_h` canvas per the sizing policy.
pub fn place(img: &RgbaImage, canvas_w: u32, canvas_h: u32, sizing: SizingPolicy) -> RgbaImage {
    let mut canvas = RgbaImage::new(canvas_w, canvas_h);
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        return canvas;
    }

    let smaller = w < canvas_w || h < canvas_h;
    if sizing == SizingPolicy::FitScale && smaller {
        let (draw_w, draw_h) = contain(w, h, canvas_w, canvas_h);
        let scaled = imageops::resize(img, draw_w, draw_h, FilterType::Triangle);
        imageops::replace(
            &mut canvas,
            &scaled,
            centre_offset(canvas_w, draw_w),
            centre_offset(canvas_h, draw_h),
        );
    } else {
        imageops::replace(
            &mut canvas,
            img,
            centre_offset(canvas_w, w),
            centre_offset(canvas_h, h),
        );
    }
    canvas
}

/// Largest size with the aspect ratio of `w x h` that fits inside the target.
fn contain(w: u32, h: u32, target_w: u32, target_h: u32) -> (u32, u32) {
    let aspect = f64::from(w) / f64::from(h);
    // Compare w/h against target_w/target_h without float division.
    let wider = u64::from(w) * u64::from(target_h) > u64::from(target_w) * u64::from(h);
    let (draw_w, draw_h) = if wider {
        (f64::from(target_w), f64::from(target_w) / aspect)
    } else {
        (f64::from(target_h) * aspect, f64::from(target_h))
    };
    (
        (draw_w.round() as u32).clamp(1, target_w),
        (draw_h.round() as u32).clamp(1, target_h),
    )
}

fn centre_offset(canvas: u32, size: u32) -> i64 {
    (i64::from(canvas) - i64::from(size)).div_euclid(2)
}

/// Cut `rect` out of `canvas`. Pixels outside the canvas read as transparent black.
fn crop(canvas: &RgbaImage, rect: &SourceRect) -> RgbaImage {
    let inside = rect.x >= 0
        && rect.y >= 0
        && rect.x + i64::from(rect.width) <= i64::from(canvas.width())
        && rect.y + i64::from(rect.height) <= i64::from(canvas.height());
    if inside {
        return imageops::crop_imm(canvas, rect.x as u32, rect.y as u32, rect.width, rect.height)
            .to_image();
    }

    RgbaImage::from_fn(rect.width, rect.height, |x, y| {
        let cx = rect.x + i64::from(x);
        let cy = rect.y + i64::from(y);
        if (0..i64::from(canvas.width())).contains(&cx) && (0..i64::from(canvas.height())).contains(&cy)
        {
            *canvas.get_pixel(cx as u32, cy as u32)
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
    const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

    fn settings(region: Region, sizing: SizingPolicy) -> ComparisonSettings {
        ComparisonSettings {
            region,
            sizing,
            ..Default::default()
        }
    }

    // -- rectangle math --

    #[test]
    fn full_region_covers_canvas() {
        let rect = Region::FULL.to_rect(100, 80).unwrap();
        assert_eq!(
            rect,
            SourceRect {
                x: 0,
                y: 0,
                width: 100,
                height: 80
            }
        );
    }

    #[test]
    fn corner_order_does_not_matter() {
        let a = Region::new(10.0, 20.0, 60.0, 90.0).to_rect(200, 100).unwrap();
        let b = Region::new(60.0, 90.0, 10.0, 20.0).to_rect(200, 100).unwrap();
        let c = Region::new(10.0, 90.0, 60.0, 20.0).to_rect(200, 100).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!((a.x, a.y, a.width, a.height), (20, 20, 100, 70));
    }

    #[test]
    fn dimensions_round_and_origin_truncates() {
        // 33.3% of 10 = 3.33 -> 3 wide; 15% of 10 = 1.5 origin -> 1
        let rect = Region::new(15.0, 0.0, 48.3, 100.0).to_rect(10, 10).unwrap();
        assert_eq!(rect.x, 1);
        assert_eq!(rect.width, 3);
    }

    #[test]
    fn sub_pixel_region_is_invalid() {
        let err = Region::new(0.0, 0.0, 0.4, 100.0).to_rect(100, 100).unwrap_err();
        assert!(matches!(err, CompareError::InvalidRegion { width: 0, height: 100 }));
    }

    #[test]
    fn non_finite_region_is_invalid() {
        let err = Region::new(f64::NAN, 0.0, 50.0, 50.0).to_rect(10, 10).unwrap_err();
        assert!(matches!(err, CompareError::InvalidRegion { .. }));
    }

    #[test]
    fn out_of_range_percentages_reach_past_canvas() {
        let rect = Region::new(-50.0, 0.0, 150.0, 100.0).to_rect(40, 40).unwrap();
        assert_eq!((rect.x, rect.width), (-20, 80));
        // -12.5% of 10 = -1.25, truncated toward zero
        let rect = Region::new(-12.5, 0.0, 50.0, 100.0).to_rect(10, 10).unwrap();
        assert_eq!((rect.x, rect.width), (-1, 6));
    }

    #[test]
    fn oversized_region_is_invalid() {
        let err = Region::new(0.0, 0.0, 1e12, 100.0).to_rect(100, 100).unwrap_err();
        assert!(matches!(err, CompareError::InvalidRegion { height: 100, .. }));
    }

    #[test]
    fn full_region_detection() {
        assert!(Region::default().is_full());
        assert!(!Region::new(0.0, 0.0, 100.0, 99.0).is_full());
    }

    // -- placement --

    #[test]
    fn no_scale_centres_smaller_image() {
        let small = RgbaImage::from_pixel(2, 2, BLUE);
        let canvas = place(&small, 4, 4, SizingPolicy::NoScale);
        assert_eq!(*canvas.get_pixel(0, 0), CLEAR);
        assert_eq!(*canvas.get_pixel(1, 1), BLUE);
        assert_eq!(*canvas.get_pixel(2, 2), BLUE);
        assert_eq!(*canvas.get_pixel(3, 3), CLEAR);
    }

    #[test]
    fn no_scale_odd_margin_floors_offset() {
        let small = RgbaImage::from_pixel(1, 1, BLUE);
        let canvas = place(&small, 4, 1, SizingPolicy::NoScale);
        // (4 - 1) / 2 = 1.5 -> column 1
        assert_eq!(*canvas.get_pixel(1, 0), BLUE);
        assert_eq!(*canvas.get_pixel(2, 0), CLEAR);
    }

    #[test]
    fn fit_scale_contains_wide_image() {
        let wide = RgbaImage::from_pixel(2, 1, RED);
        let canvas = place(&wide, 4, 4, SizingPolicy::FitScale);
        // drawn 4x2, centred vertically at row 1
        for x in 0..4 {
            assert_eq!(*canvas.get_pixel(x, 0), CLEAR);
            assert_eq!(*canvas.get_pixel(x, 1), RED);
            assert_eq!(*canvas.get_pixel(x, 2), RED);
            assert_eq!(*canvas.get_pixel(x, 3), CLEAR);
        }
    }

    #[test]
    fn fit_scale_contains_tall_image() {
        let tall = RgbaImage::from_pixel(1, 2, RED);
        let canvas = place(&tall, 6, 4, SizingPolicy::FitScale);
        // drawn 2x4, centred horizontally at column 2
        assert_eq!(*canvas.get_pixel(1, 0), CLEAR);
        assert_eq!(*canvas.get_pixel(2, 0), RED);
        assert_eq!(*canvas.get_pixel(3, 3), RED);
        assert_eq!(*canvas.get_pixel(4, 3), CLEAR);
    }

    #[test]
    fn contain_keeps_aspect_ratio() {
        assert_eq!(contain(50, 25, 100, 100), (100, 50));
        assert_eq!(contain(10, 40, 100, 100), (25, 100));
        assert_eq!(contain(3, 3, 9, 6), (6, 6));
    }

    // -- extraction --

    #[test]
    fn extracted_regions_share_dimensions() {
        let left = RgbaImage::from_pixel(120, 40, RED);
        let right = RgbaImage::from_pixel(30, 90, BLUE);
        for sizing in [SizingPolicy::NoScale, SizingPolicy::FitScale] {
            let (a, b) = extract(
                &left,
                &right,
                &settings(Region::new(5.0, 5.0, 95.0, 65.0), sizing),
            )
            .unwrap();
            assert_eq!(a.dimensions(), b.dimensions());
            assert_eq!(a.dimensions(), (108, 54));
        }
    }

    #[test]
    fn fit_scale_leaves_canvas_sized_image_untouched() {
        let left = RgbaImage::from_fn(8, 8, |x, y| Rgba([x as u8, y as u8, 0, 255]));
        let right = RgbaImage::from_pixel(4, 4, BLUE);
        let (a, _) = extract(&left, &right, &settings(Region::FULL, SizingPolicy::FitScale))
            .unwrap();
        assert_eq!(a, left);
    }

    #[test]
    fn fit_scale_fills_canvas_with_smaller_image() {
        let left = RgbaImage::from_pixel(8, 8, RED);
        let right = RgbaImage::from_pixel(4, 4, BLUE);
        let (_, b) = extract(&left, &right, &settings(Region::FULL, SizingPolicy::FitScale))
            .unwrap();
        assert!(b.pixels().all(|p| *p == BLUE));

        let (_, b) = extract(&left, &right, &settings(Region::FULL, SizingPolicy::NoScale))
            .unwrap();
        assert_eq!(*b.get_pixel(0, 0), CLEAR);
        assert_eq!(*b.get_pixel(4, 4), BLUE);
    }

    #[test]
    fn region_past_canvas_edge_reads_transparent() {
        let left = RgbaImage::from_pixel(10, 10, RED);
        let right = RgbaImage::from_pixel(10, 10, BLUE);
        let (a, b) = extract(
            &left,
            &right,
            &settings(Region::new(50.0, 0.0, 150.0, 100.0), SizingPolicy::NoScale),
        )
        .unwrap();
        assert_eq!(a.dimensions(), (10, 10));
        assert_eq!(*a.get_pixel(4, 3), RED);
        assert_eq!(*a.get_pixel(5, 3), CLEAR);
        assert_eq!(*b.get_pixel(4, 3), BLUE);
        assert_eq!(*b.get_pixel(9, 9), CLEAR);
    }

    #[test]
    fn crop_outside_canvas_reads_transparent() {
        let canvas = RgbaImage::from_pixel(4, 4, RED);
        let rect = SourceRect {
            x: 2,
            y: -1,
            width: 4,
            height: 2,
        };
        let out = crop(&canvas, &rect);
        assert_eq!(out.dimensions(), (4, 2));
        assert_eq!(*out.get_pixel(0, 0), CLEAR);
        assert_eq!(*out.get_pixel(0, 1), RED);
        assert_eq!(*out.get_pixel(1, 1), RED);
        assert_eq!(*out.get_pixel(2, 1), CLEAR);
    }
}

use glam::DVec2;
use serde::{Deserialize, Serialize};
use snafu::ensure;

use crate::{
    consts::MAX_BOX_SIZE,
    error::{DegenerateImageSnafu, ScenelensError},
};

/// An axis-aligned bounding box in percentage space.
///
/// `x`/`y` locate the top-left corner and `width`/`height` the extent, all
/// expressed as percentages (0 to 100) of the image width and height. The
/// type is a plain value: anything that "fixes" a box produces a new one.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// A bounding box in integer pixel coordinates, corners inclusive of the
/// top-left and exclusive of the bottom-right.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelBox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl PixelBox {
    /// Saturates instead of overflowing for boxes far outside the image.
    pub fn width(&self) -> i32 {
        self.x2.saturating_sub(self.x1)
    }

    pub fn height(&self) -> i32 {
        self.y2.saturating_sub(self.y1)
    }
}

impl BoundingBox {
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Top-left corner.
    pub fn min(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    /// Bottom-right corner.
    pub fn max(&self) -> DVec2 {
        DVec2::new(self.right(), self.bottom())
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Calculates the area of the bounding box.
    ///
    /// # Example
    /// ```
    /// use scenelens_core::analysis::bbox::BoundingBox;
    /// let bbox = BoundingBox::new(10.0, 10.0, 4.0, 3.0);
    /// assert_eq!(bbox.area(), 12.0);
    /// ```
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    pub fn center(&self) -> DVec2 {
        (self.min() + self.max()) / 2.0
    }

    /// Calculates the area of intersection between this bounding box and another.
    ///
    /// The intersection rectangle spans from the larger of the two top-left
    /// corners to the smaller of the two bottom-right corners. If it has no
    /// positive width or height the boxes do not overlap and 0.0 is returned.
    ///
    /// # Example
    /// ```
    /// use scenelens_core::analysis::bbox::BoundingBox;
    /// let a = BoundingBox::new(0.0, 0.0, 4.0, 4.0);
    /// let b = BoundingBox::new(2.0, 2.0, 4.0, 4.0);
    /// assert_eq!(a.intersection(&b), 4.0); // 2x2 intersection area
    /// ```
    pub fn intersection(&self, other: &Self) -> f64 {
        let min = self.min().max(other.min());
        let max = self.max().min(other.max());

        if max.x > min.x && max.y > min.y {
            (max.x - min.x) * (max.y - min.y)
        } else {
            0.
        }
    }

    /// Calculates the Intersection over Union (IoU) between this bounding box and another.
    ///
    /// # Returns
    /// A value between 0.0 (no overlap) and 1.0 (identical boxes). A
    /// degenerate union (both boxes without area) yields 0.0.
    ///
    /// # Formula
    /// IoU = Intersection Area / (Area1 + Area2 - Intersection Area)
    ///
    /// # Example
    /// ```
    /// use scenelens_core::analysis::bbox::BoundingBox;
    /// let a = BoundingBox::new(10.0, 10.0, 20.0, 20.0);
    /// assert_eq!(a.iou(&a), 1.0);
    /// ```
    pub fn iou(&self, other: &Self) -> f64 {
        let intersection_area = self.intersection(other);
        let union_area = self.area() + other.area() - intersection_area;

        if union_area > 0.0 {
            intersection_area / union_area
        } else {
            0.0
        }
    }

    /// Scales this box into pixel coordinates of a `img_width` x `img_height` image.
    ///
    /// Coordinates are truncated toward zero. No clamping happens here: a box
    /// outside percentage space maps to pixels outside the image.
    ///
    /// # Example
    /// ```
    /// use scenelens_core::analysis::bbox::{BoundingBox, PixelBox};
    /// let bbox = BoundingBox::new(10.0, 20.0, 50.0, 25.0);
    /// let px = bbox.to_pixels(640, 480);
    /// assert_eq!(px, PixelBox { x1: 64, y1: 96, x2: 384, y2: 216 });
    /// ```
    pub fn to_pixels(&self, img_width: u32, img_height: u32) -> PixelBox {
        let size = DVec2::new(img_width as f64, img_height as f64);
        let min = self.min() * size / MAX_BOX_SIZE;
        let max = self.max() * size / MAX_BOX_SIZE;

        PixelBox {
            x1: min.x as i32,
            y1: min.y as i32,
            x2: max.x as i32,
            y2: max.y as i32,
        }
    }

    /// Converts pixel corners back into percentage space.
    ///
    /// Fails when either image dimension is zero.
    pub fn try_from_pixels(
        pixels: PixelBox,
        img_width: u32,
        img_height: u32,
    ) -> Result<Self, ScenelensError> {
        ensure!(
            img_width > 0 && img_height > 0,
            DegenerateImageSnafu {
                width: img_width,
                height: img_height,
                stage: "pixels-to-percentage",
            }
        );

        let size = DVec2::new(img_width as f64, img_height as f64);
        let min = DVec2::new(pixels.x1 as f64, pixels.y1 as f64) / size * MAX_BOX_SIZE;
        let max = DVec2::new(pixels.x2 as f64, pixels.y2 as f64) / size * MAX_BOX_SIZE;
        let extent = max - min;

        Ok(Self::new(min.x, min.y, extent.x, extent.y))
    }
}

/// Converts a percentage box to `(x1, y1, x2, y2)` pixel corners.
pub fn percentage_to_pixels(bbox: &BoundingBox, img_width: u32, img_height: u32) -> PixelBox {
    bbox.to_pixels(img_width, img_height)
}

/// Converts pixel corners to a percentage box, falling back to
/// [`BoundingBox::ZERO`] for a zero-sized image so that callers further down
/// the pipeline always receive a value.
pub fn pixels_to_percentage(
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
    img_width: u32,
    img_height: u32,
) -> BoundingBox {
    checked_pixels_to_percentage(x1, y1, x2, y2, img_width, img_height).unwrap_or_else(|err| {
        tracing::warn!("{err}, using zero box");
        BoundingBox::ZERO
    })
}

pub fn checked_pixels_to_percentage(
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
    img_width: u32,
    img_height: u32,
) -> Result<BoundingBox, ScenelensError> {
    BoundingBox::try_from_pixels(PixelBox { x1, y1, x2, y2 }, img_width, img_height)
}

/// Intersection over Union of two percentage boxes.
pub fn iou(a: &BoundingBox, b: &BoundingBox) -> f64 {
    a.iou(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_box_extent_saturates() {
        let px = BoundingBox::new(-1e12, 0.0, 2e12, 10.0).to_pixels(10, 10);
        assert_eq!((px.x1, px.x2), (i32::MIN, i32::MAX));
        assert_eq!(px.width(), i32::MAX);
        assert_eq!(px.height(), 1);

        let inverted = PixelBox {
            x1: i32::MAX,
            y1: 0,
            x2: i32::MIN,
            y2: 0,
        };
        assert_eq!(inverted.width(), i32::MIN);
    }

    #[test]
    fn test_bbox_area_and_center() {
        let bbox = BoundingBox::new(0.0, 0.0, 2.0, 3.0);
        assert_eq!(bbox.area(), 6.0);
        assert_eq!(bbox.center(), DVec2::new(1.0, 1.5));

        let offset = BoundingBox::new(10.0, 20.0, 4.0, 6.0);
        assert_eq!(offset.center(), DVec2::new(12.0, 23.0));
        assert_eq!(offset.max(), DVec2::new(14.0, 26.0));

        // Zero area (degenerate case)
        let line = BoundingBox::new(5.0, 5.0, 5.0, 0.0);
        assert_eq!(line.area(), 0.0);
    }

    #[test]
    fn test_bbox_intersection_area() {
        // Two partially overlapping boxes (2x2 intersection)
        let a = BoundingBox::new(0.0, 0.0, 4.0, 4.0);
        let b = BoundingBox::new(2.0, 2.0, 4.0, 4.0);
        assert_eq!(a.intersection(&b), 4.0);

        // One box completely inside another
        let outer = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let inner = BoundingBox::new(2.0, 3.0, 3.0, 4.0);
        assert_eq!(outer.intersection(&inner), 12.0);
        assert_eq!(inner.intersection(&outer), 12.0);

        // Edge touching (no area intersection)
        let left = BoundingBox::new(0.0, 0.0, 2.0, 2.0);
        let right = BoundingBox::new(2.0, 0.0, 2.0, 2.0);
        assert_eq!(left.intersection(&right), 0.0);

        // Separated on one axis only
        let top = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let below = BoundingBox::new(0.0, 20.0, 10.0, 10.0);
        assert_eq!(top.intersection(&below), 0.0);
    }

    #[test]
    fn test_bbox_iou() {
        // Identical boxes
        let a = BoundingBox::new(12.5, 40.0, 30.0, 22.0);
        assert_eq!(iou(&a, &a), 1.0);

        // Disjoint boxes
        let far = BoundingBox::new(70.0, 0.0, 10.0, 10.0);
        assert_eq!(iou(&a, &far), 0.0);

        // bbox1: area 16, bbox2: area 16, intersection 4, union 28
        let p = BoundingBox::new(0.0, 0.0, 4.0, 4.0);
        let q = BoundingBox::new(2.0, 2.0, 4.0, 4.0);
        assert!((p.iou(&q) - 4.0 / 28.0).abs() < 1e-12);

        // Containment: 12 / 100
        let outer = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let inner = BoundingBox::new(2.0, 3.0, 3.0, 4.0);
        assert!((outer.iou(&inner) - 0.12).abs() < 1e-12);
        assert_eq!(outer.iou(&inner), inner.iou(&outer));

        // Zero area boxes have no union
        let line1 = BoundingBox::new(0.0, 0.0, 5.0, 0.0);
        let line2 = BoundingBox::new(2.0, 0.0, 5.0, 0.0);
        assert_eq!(line1.iou(&line2), 0.0);
    }

    #[test]
    fn test_percentage_to_pixels_truncates() {
        // 83.25, 63.125, 124.875, 69.4375
        let bbox = BoundingBox::new(25.0, 62.5, 12.5, 6.25);
        let px = percentage_to_pixels(&bbox, 333, 101);
        assert_eq!(px, PixelBox { x1: 83, y1: 63, x2: 124, y2: 69 });
        assert_eq!(px.width(), 41);
        assert_eq!(px.height(), 6);

        // Out-of-range input is not clamped
        let outside = BoundingBox::new(90.0, 90.0, 20.0, 20.0);
        let px = percentage_to_pixels(&outside, 200, 100);
        assert_eq!(px, PixelBox { x1: 180, y1: 90, x2: 220, y2: 110 });
    }

    #[test]
    fn test_pixels_to_percentage() {
        let bbox = pixels_to_percentage(64, 96, 384, 216, 640, 480);
        assert!((bbox.x - 10.0).abs() < 1e-12);
        assert!((bbox.y - 20.0).abs() < 1e-12);
        assert!((bbox.width - 50.0).abs() < 1e-12);
        assert!((bbox.height - 25.0).abs() < 1e-12);
    }

    #[test]
    fn test_pixels_to_percentage_zero_image() {
        assert_eq!(pixels_to_percentage(0, 0, 10, 10, 0, 480), BoundingBox::ZERO);
        assert_eq!(pixels_to_percentage(0, 0, 10, 10, 640, 0), BoundingBox::ZERO);

        let err = checked_pixels_to_percentage(0, 0, 10, 10, 0, 0).unwrap_err();
        assert!(matches!(err, ScenelensError::DegenerateImage { .. }));
    }

    #[test]
    fn test_pixel_round_trip_within_one_pixel() {
        let boxes = [
            BoundingBox::new(0.0, 0.0, 100.0, 100.0),
            BoundingBox::new(12.34, 56.78, 20.5, 13.25),
            BoundingBox::new(99.0, 99.0, 1.0, 1.0),
            BoundingBox::new(0.5, 47.1, 0.5, 52.9),
        ];
        let sizes = [(640, 480), (1920, 1080), (37, 53), (4000, 3000)];

        for bbox in boxes {
            for (w, h) in sizes {
                let px = percentage_to_pixels(&bbox, w, h);
                let back = pixels_to_percentage(px.x1, px.y1, px.x2, px.y2, w, h);
                let tol_x = 100.0 / w as f64;
                let tol_y = 100.0 / h as f64;

                assert!((back.x - bbox.x).abs() <= tol_x, "{bbox:?} {w}x{h}");
                assert!((back.y - bbox.y).abs() <= tol_y, "{bbox:?} {w}x{h}");
                assert!((back.width - bbox.width).abs() <= tol_x, "{bbox:?} {w}x{h}");
                assert!((back.height - bbox.height).abs() <= tol_y, "{bbox:?} {w}x{h}");
            }
        }
    }
}

use std::path::Path;

use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::{
    drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size},
    rect::Rect,
};
use snafu::ResultExt;
use tracing::*;

use crate::{
    analysis::{bbox::PixelBox, detection::DetectedObject},
    consts::{CAPTION_FONT_SIZE, CAPTION_PADDING, OVERLAY_LINE_THICKNESS},
    error::{FontSnafu, ImageOpenSnafu, ImageWriteSnafu, IoReadSnafu, ScenelensError},
};

const PERSON: Rgb<u8> = Rgb([255, 0, 0]);
const VEHICLE: Rgb<u8> = Rgb([0, 255, 0]);
const CONE: Rgb<u8> = Rgb([255, 165, 0]);
const FURNITURE: Rgb<u8> = Rgb([0, 255, 255]);
const DEFAULT: Rgb<u8> = Rgb([128, 0, 128]);
const CAPTION_TEXT: Rgb<u8> = Rgb([255, 255, 255]);

/// A TrueType font used to caption each outline.
pub struct CaptionFont {
    font: FontVec,
    scale: PxScale,
}

impl CaptionFont {
    pub fn load(path: &Path) -> Result<Self, ScenelensError> {
        let bytes = std::fs::read(path).context(IoReadSnafu {
            path: path.display().to_string(),
        })?;
        let font = FontVec::try_from_vec(bytes).context(FontSnafu {
            path: path.display().to_string(),
        })?;

        Ok(Self {
            font,
            scale: PxScale::from(CAPTION_FONT_SIZE),
        })
    }
}

/// Caption text for a detection, e.g. `Chair (87%)`.
pub fn caption(object: &DetectedObject) -> String {
    format!("{} ({}%)", object.label, (object.confidence * 100.0) as i32)
}

/// Outline colour for a detection, picked by the first keyword its label contains.
pub fn label_color(label: &str) -> Rgb<u8> {
    let label = label.to_lowercase();
    [
        ("person", PERSON),
        ("vehicle", VEHICLE),
        ("cone", CONE),
        ("furniture", FURNITURE),
    ]
    .into_iter()
    .find(|(keyword, _)| label.contains(keyword))
    .map_or(DEFAULT, |(_, color)| color)
}

/// Clips `px` to the image, or `None` when it lies entirely outside.
fn clip_to_image(px: PixelBox, width: u32, height: u32) -> Option<PixelBox> {
    let width = i32::try_from(width).unwrap_or(i32::MAX);
    let height = i32::try_from(height).unwrap_or(i32::MAX);

    if px.x1 >= width || px.y1 >= height || px.x2 < 0 || px.y2 < 0 {
        return None;
    }

    Some(PixelBox {
        x1: px.x1.max(0),
        y1: px.y1.max(0),
        x2: px.x2.min(width),
        y2: px.y2.min(height),
    })
}

/// Writes `text` on a band of `color` sitting on top of the box, or just
/// inside it when there is no room above.
fn draw_caption(
    image: &mut RgbImage,
    px: PixelBox,
    text: &str,
    color: Rgb<u8>,
    font: &CaptionFont,
) {
    let (text_width, text_height) = text_size(font.scale, &font.font, text);
    let band = i32::try_from(text_height)
        .unwrap_or(i32::MAX)
        .saturating_add(CAPTION_PADDING * 2);
    let top = if px.y1 >= band { px.y1 - band } else { px.y1 };

    let background = Rect::at(px.x1, top).of_size(text_width.max(1), band.max(1) as u32);
    draw_filled_rect_mut(image, background, color);
    draw_text_mut(
        image,
        CAPTION_TEXT,
        px.x1,
        top + CAPTION_PADDING,
        font.scale,
        &font.font,
        text,
    );
}

/// Draws one outline per detection onto `image`, captioned with label and
/// confidence when a font is given.
///
/// Boxes use the object's pixel box when present, otherwise they are
/// scaled to the image size.
pub fn draw_detections(
    image: &mut RgbImage,
    objects: &[DetectedObject],
    font: Option<&CaptionFont>,
) {
    let (width, height) = image.dimensions();

    for object in objects {
        let px = object
            .pixel_box
            .unwrap_or_else(|| object.bounding_box.to_pixels(width, height));
        let Some(px) = clip_to_image(px, width, height) else {
            debug!(label = %object.label, "detection outside the image, not drawn");
            continue;
        };
        let color = label_color(&object.label);

        // nested rectangles for a thicker line
        for offset in 0..OVERLAY_LINE_THICKNESS {
            let rect = Rect::at(px.x1 - offset, px.y1 - offset).of_size(
                (px.width() + offset * 2).max(1) as u32,
                (px.height() + offset * 2).max(1) as u32,
            );
            draw_hollow_rect_mut(image, rect, color);
        }

        if let Some(font) = font {
            draw_caption(image, px, &caption(object), color, font);
        }
    }
}

/// Opens `source`, draws `objects` on it and writes the result to `target`.
pub fn save_overlay(
    source: &Path,
    objects: &[DetectedObject],
    font: Option<&CaptionFont>,
    target: &Path,
) -> Result<(), ScenelensError> {
    let mut image = image::open(source)
        .context(ImageOpenSnafu {
            path: source.display().to_string(),
        })?
        .to_rgb8();

    draw_detections(&mut image, objects, font);

    image.save(target).context(ImageWriteSnafu {
        path: target.display().to_string(),
    })?;
    info!(path = %target.display(), objects = objects.len(), "overlay saved");
    Ok(())
}

//! Raster rendering of session state using tiny-skia
//!
//! The overlay is drawn on top of the working image; the mask is a
//! single-channel stencil with the same shapes in white on black. Only
//! contours of visible classes are drawn.

use ab_glyph::{FontRef, PxScale};
use image::{GrayImage, Luma, Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use tiny_skia::{
    FillRule, IntSize, LineCap, LineJoin, Paint, Path, PathBuilder, Pixmap, Stroke, Transform,
};

use super::geometry::{self, contour as style, handle, label};
use crate::capture::image::WorkingImage;
use crate::config::ClassPalette;
use crate::domain::{LabeledContour, Point};
use crate::session::state::EditSession;

static LABEL_FONT: &[u8] = include_bytes!("../../fonts/DejaVuSans.ttf");

/// Convert RgbaImage to Pixmap, apply drawing function, and copy back.
///
/// The image must be opaque so premultiplied and straight alpha agree.
fn with_pixmap(img: &mut RgbaImage, f: impl FnOnce(&mut Pixmap)) {
    let (w, h) = (img.width(), img.height());
    let Some(size) = IntSize::from_wh(w, h) else {
        return;
    };
    let Some(mut pixmap) = Pixmap::from_vec(img.as_raw().clone(), size) else {
        return;
    };

    f(&mut pixmap);

    img.copy_from_slice(pixmap.data());
}

/// Build a polyline path, closed for polygons
fn build_contour_path(points: &[Point], closed: bool) -> Option<Path> {
    let (first, rest) = points.split_first()?;
    let mut pb = PathBuilder::new();
    pb.move_to(first.x, first.y);
    for p in rest {
        pb.line_to(p.x, p.y);
    }
    if closed {
        pb.close();
    }
    pb.finish()
}

fn paint(rgba: [u8; 4], anti_alias: bool) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(rgba[0], rgba[1], rgba[2], rgba[3]);
    paint.anti_alias = anti_alias;
    paint
}

fn stroke(width: f32) -> Stroke {
    Stroke {
        width,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Default::default()
    }
}

fn draw_contour(pixmap: &mut Pixmap, contour: &LabeledContour, palette: &ClassPalette) {
    let Some(path) = build_contour_path(&contour.points, contour.closed) else {
        return;
    };
    let color = palette.color(&contour.label);
    if contour.closed {
        pixmap.fill_path(
            &path,
            &paint(color.to_rgba_u8(style::FILL_ALPHA), true),
            FillRule::Winding,
            Transform::identity(),
            None,
        );
    }
    pixmap.stroke_path(
        &path,
        &paint(color.to_rgba_u8(255), true),
        &stroke(style::OUTLINE),
        Transform::identity(),
        None,
    );
}

fn draw_handle(pixmap: &mut Pixmap, p: Point, selected: bool) {
    let (radius, color) = if selected {
        (handle::SELECTED_RADIUS, handle::SELECTED_COLOR)
    } else {
        (handle::RADIUS, handle::COLOR)
    };
    if let Some(path) = PathBuilder::from_circle(p.x, p.y, radius) {
        pixmap.fill_path(
            &path,
            &paint(color, true),
            FillRule::Winding,
            Transform::identity(),
            None,
        );
    }
}

/// Draw visible contours and their class names over an opaque copy of the
/// working image, optionally with vertex handles on top
pub fn render_overlay(image: &WorkingImage, session: &EditSession, handles: bool) -> RgbaImage {
    let mut overlay = image.rgba.clone();
    overlay.pixels_mut().for_each(|p| p[3] = 255);
    let palette = ClassPalette::new(&session.labels);

    with_pixmap(&mut overlay, |pixmap| {
        for (_, contour) in session.visible_contours() {
            draw_contour(pixmap, contour, &palette);
        }
    });
    draw_labels(&mut overlay, session, &palette);

    if handles {
        with_pixmap(&mut overlay, |pixmap| {
            for (ci, contour) in session.visible_contours() {
                for (pi, p) in contour.points.iter().enumerate() {
                    let selected = session
                        .selection
                        .is_some_and(|s| s.contour == ci && s.point == pi);
                    draw_handle(pixmap, *p, selected);
                }
            }
        });
    }
    overlay
}

/// Write each visible contour's class name just above its first vertex
fn draw_labels(overlay: &mut RgbaImage, session: &EditSession, palette: &ClassPalette) {
    let font = match FontRef::try_from_slice(LABEL_FONT) {
        Ok(font) => font,
        Err(err) => {
            log::warn!("Label font unavailable, drawing without labels: {}", err);
            return;
        }
    };
    let scale = PxScale::from(label::SIZE);
    for (_, contour) in session.visible_contours() {
        let Some(first) = contour.points.first() else {
            continue;
        };
        let x = first.x.round() as i32;
        let y = ((first.y - label::OFFSET - label::SIZE).round() as i32).max(0);
        let color = palette.color(&contour.label).to_rgba_u8(255);
        draw_text_mut(overlay, Rgba(color), x, y, scale, &font, &contour.label);
    }
}

/// Binary stencil mask of the visible contours: closed shapes filled,
/// open polylines stroked
pub fn render_mask(session: &EditSession, width: u32, height: u32) -> GrayImage {
    let Some(mut pixmap) = Pixmap::new(width, height) else {
        return GrayImage::new(width, height);
    };
    pixmap.fill(tiny_skia::Color::BLACK);

    let white = paint([255, 255, 255, 255], false);
    for (_, contour) in session.visible_contours() {
        let Some(path) = build_contour_path(&contour.points, contour.closed) else {
            continue;
        };
        if contour.closed {
            pixmap.fill_path(&path, &white, FillRule::Winding, Transform::identity(), None);
        } else {
            pixmap.stroke_path(
                &path,
                &white,
                &stroke(style::MASK_LINE),
                Transform::identity(),
                None,
            );
        }
    }

    pixmap_to_mask(&pixmap)
}

/// Threshold the red channel of an opaque pixmap into a binary mask
fn pixmap_to_mask(pixmap: &Pixmap) -> GrayImage {
    let (width, height) = (pixmap.width(), pixmap.height());
    let data = pixmap.data();
    GrayImage::from_fn(width, height, |x, y| {
        let i = (y as usize * width as usize + x as usize) * 4;
        Luma([if data[i] > 127 { 255 } else { 0 }])
    })
}

/// Draw a hard-edged line of `width` onto a binary mask, white when
/// `white`, black otherwise
pub fn stroke_mask(mask: &mut GrayImage, from: Point, to: Point, width: f32, white: bool) {
    let Some(size) = IntSize::from_wh(mask.width(), mask.height()) else {
        return;
    };
    let rgba: Vec<u8> = mask.pixels().flat_map(|p| [p[0], p[0], p[0], 255]).collect();
    let Some(mut pixmap) = Pixmap::from_vec(rgba, size) else {
        return;
    };

    let mut pb = PathBuilder::new();
    pb.move_to(from.x, from.y);
    pb.line_to(to.x, to.y);
    let Some(path) = pb.finish() else {
        return;
    };
    let value = if white { 255 } else { 0 };
    pixmap.stroke_path(
        &path,
        &paint([value, value, value, 255], false),
        &stroke(width),
        Transform::identity(),
        None,
    );

    *mask = pixmap_to_mask(&pixmap);
}

/// Overlay (with handles) and mask side by side, scaled for display
pub fn render_preview(image: &WorkingImage, session: &EditSession, scale: f32) -> RgbaImage {
    let (w, h) = (image.width(), image.height());
    let overlay = render_overlay(image, session, true);
    let mask = image::DynamicImage::ImageLuma8(render_mask(session, w, h)).to_rgba8();

    let mut canvas = RgbaImage::new(w * 2, h);
    image::imageops::replace(&mut canvas, &overlay, 0, 0);
    image::imageops::replace(&mut canvas, &mask, w as i64, 0);

    if (scale - 1.0).abs() < f32::EPSILON {
        return canvas;
    }
    image::imageops::resize(
        &canvas,
        geometry::scaled(w * 2, scale),
        geometry::scaled(h, scale),
        image::imageops::FilterType::Triangle,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Selection;
    use crate::session::state::tests::{rect_contour, session};

    fn gray_image(w: u32, h: u32) -> WorkingImage {
        WorkingImage::new(RgbaImage::from_pixel(w, h, Rgba([40, 40, 40, 255])))
    }

    #[test]
    fn test_mask_fills_closed_contours() {
        let s = session(vec![rect_contour("roof", 10.0, 10.0, 30.0, 20.0)], &["roof"]);
        let mask = render_mask(&s, 64, 64);
        assert_eq!(mask.get_pixel(25, 20)[0], 255);
        assert_eq!(mask.get_pixel(5, 5)[0], 0);
        assert_eq!(mask.get_pixel(50, 50)[0], 0);
        assert!(mask.pixels().all(|p| p[0] == 0 || p[0] == 255));
    }

    #[test]
    fn test_mask_strokes_open_trim() {
        let trim = LabeledContour::new(vec![Point::new(5.0, 30.0), Point::new(60.0, 30.0)], "trim", false);
        let s = session(vec![trim], &["trim"]);
        let mask = render_mask(&s, 64, 64);
        assert_eq!(mask.get_pixel(30, 30)[0], 255);
        assert_eq!(mask.get_pixel(30, 36)[0], 0);
    }

    #[test]
    fn test_hidden_classes_are_not_drawn() {
        let mut s = session(
            vec![
                rect_contour("roof", 0.0, 0.0, 20.0, 20.0),
                rect_contour("window", 30.0, 30.0, 20.0, 20.0),
            ],
            &["roof", "window"],
        );
        s.toggle_visibility('w');
        let mask = render_mask(&s, 64, 64);
        assert_eq!(mask.get_pixel(10, 10)[0], 255);
        assert_eq!(mask.get_pixel(40, 40)[0], 0);

        let img = gray_image(64, 64);
        let overlay = render_overlay(&img, &s, false);
        assert_eq!(*overlay.get_pixel(40, 40), Rgba([40, 40, 40, 255]));
        assert_ne!(*overlay.get_pixel(10, 10), Rgba([40, 40, 40, 255]));
    }

    #[test]
    fn test_selected_handle_is_red() {
        let mut s = session(vec![rect_contour("door", 10.0, 10.0, 40.0, 40.0)], &["door"]);
        s.selection = Some(Selection { contour: 0, point: 2 });
        let overlay = render_overlay(&gray_image(64, 64), &s, true);
        assert_eq!(*overlay.get_pixel(50, 50), Rgba([255, 0, 0, 255]));
        assert_eq!(*overlay.get_pixel(10, 10), Rgba([255, 255, 0, 255]));
    }

    #[test]
    fn test_preview_is_side_by_side_and_scaled() {
        let s = session(vec![rect_contour("roof", 0.0, 0.0, 20.0, 20.0)], &["roof"]);
        let preview = render_preview(&gray_image(100, 60), &s, 0.5);
        assert_eq!(preview.dimensions(), (100, 30));
        let full = render_preview(&gray_image(100, 60), &s, 1.0);
        assert_eq!(full.dimensions(), (200, 60));
        assert_eq!(*full.get_pixel(110, 10), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_class_name_is_written_above_first_point() {
        let background = Rgba([40, 40, 40, 255]);
        let mut s = session(vec![rect_contour("roof", 20.0, 70.0, 60.0, 30.0)], &["roof"]);
        let label_area = |overlay: &RgbaImage| -> Vec<Rgba<u8>> {
            (20..80)
                .flat_map(|x| (38..62).map(move |y| (x, y)))
                .map(|(x, y)| *overlay.get_pixel(x, y))
                .collect()
        };

        let overlay = render_overlay(&gray_image(120, 120), &s, false);
        let area = label_area(&overlay);
        assert!(
            area.iter().any(|p| p[0] > 150 && p[0] > p[1]),
            "expected red roof label pixels above the contour"
        );

        s.toggle_visibility('r');
        let overlay = render_overlay(&gray_image(120, 120), &s, false);
        assert!(label_area(&overlay).iter().all(|p| *p == background));
    }

    #[test]
    fn test_stroke_mask_paints_and_erases() {
        let mut mask = GrayImage::new(32, 32);
        stroke_mask(&mut mask, Point::new(4.0, 16.0), Point::new(28.0, 16.0), 3.0, true);
        assert_eq!(mask.get_pixel(16, 16)[0], 255);
        assert_eq!(mask.get_pixel(6, 16)[0], 255);
        assert_eq!(mask.get_pixel(16, 20)[0], 0);

        stroke_mask(&mut mask, Point::new(16.0, 4.0), Point::new(16.0, 28.0), 15.0, false);
        assert_eq!(mask.get_pixel(16, 16)[0], 0);
        assert_eq!(mask.get_pixel(10, 16)[0], 0);
        assert_eq!(mask.get_pixel(6, 16)[0], 255);
        assert!(mask.pixels().all(|p| p[0] == 0 || p[0] == 255));
    }
}

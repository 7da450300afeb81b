//! Freehand touch-up of an exported stencil mask
//!
//! Left-drag paints thin white lines, right-drag erases with a wide black
//! brush. This is the last correction pass before the mask goes to the
//! projector; it edits pixels, not contours.

use image::{GrayImage, Luma};

use crate::config::KeyBindings;
use crate::domain::{Point, ViewTransform};
use crate::render::geometry::brush;
use crate::render::image::stroke_mask;
use crate::session::input::{InputEvent, PointerButton};
use crate::session::shortcuts::Key;

/// What a touch-up event asks the loop to do besides painting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchUpAction {
    Save,
    Exit,
}

#[derive(Debug, Clone, Copy)]
struct Stroke {
    white: bool,
    last: Point,
}

/// Pixel-level editing state for one mask
#[derive(Debug, Clone)]
pub struct MaskTouchUp {
    pub mask: GrayImage,
    transform: ViewTransform,
    keys: KeyBindings,
    stroke: Option<Stroke>,
}

impl MaskTouchUp {
    /// Start from `mask`, binarized at >127
    pub fn new(mask: GrayImage, transform: ViewTransform, keys: KeyBindings) -> Self {
        let mask = GrayImage::from_fn(mask.width(), mask.height(), |x, y| {
            Luma([if mask.get_pixel(x, y)[0] > 127 { 255 } else { 0 }])
        });
        Self {
            mask,
            transform,
            keys,
            stroke: None,
        }
    }

    /// Apply one raw event. Painting happens on pointer moves while a
    /// button is held; a press alone leaves the mask untouched.
    pub fn handle_event(&mut self, event: &InputEvent) -> Option<TouchUpAction> {
        match *event {
            InputEvent::PointerDown { x, y, button } => {
                self.stroke = Some(Stroke {
                    white: button == PointerButton::Left,
                    last: self.transform.to_image(x, y),
                });
                None
            }
            InputEvent::PointerMove { x, y } => {
                let stroke = self.stroke.as_mut()?;
                let p = self.transform.to_image(x, y);
                let width = if stroke.white { brush::PAINT } else { brush::ERASE };
                stroke_mask(&mut self.mask, stroke.last, p, width, stroke.white);
                stroke.last = p;
                None
            }
            InputEvent::PointerUp => {
                self.stroke = None;
                None
            }
            InputEvent::Key { .. } => match event.key()? {
                Key::Escape => Some(TouchUpAction::Exit),
                Key::Character(c) if c == self.keys.save => Some(TouchUpAction::Save),
                Key::Character(_) => None,
            },
            InputEvent::Confidence { .. } | InputEvent::Idle => None,
        }
    }
}

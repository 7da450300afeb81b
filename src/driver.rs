//! Single-threaded poll loops feeding the edit session and the mask touch-up
//!
//! Each iteration drains one tick of input events, polls the confidence
//! control, applies the resulting commands and re-renders the preview.
//! Re-extraction runs synchronously inside the loop. Malformed events are
//! logged and skipped.

use std::io::BufRead;
use std::time::Duration;

use image::RgbaImage;

use crate::error::EditorError;
use crate::extraction::ContourSource;
use crate::render::export::Exporter;
use crate::render::image::render_preview;
use crate::session::input::{InputController, InputEvent};
use crate::session::messages::{Command, EditContext, Outcome, apply};
use crate::session::shortcuts::Action;
use crate::session::state::EditSession;
use crate::session::touchup::{MaskTouchUp, TouchUpAction};

/// Source of input events, one batch per loop iteration
pub trait EventSource {
    /// Events for the next tick, `None` once the surface is closed
    fn next_tick(&mut self) -> Result<Option<Vec<InputEvent>>, EditorError>;
}

/// Reads one JSON event per line; every line is one tick
pub struct JsonLinesSource<R> {
    reader: R,
    line: usize,
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, line: 0 }
    }
}

impl<R: BufRead> EventSource for JsonLinesSource<R> {
    fn next_tick(&mut self) -> Result<Option<Vec<InputEvent>>, EditorError> {
        let mut buf = String::new();
        loop {
            buf.clear();
            if self.reader.read_line(&mut buf)? == 0 {
                return Ok(None);
            }
            self.line += 1;
            let text = buf.trim();
            if text.is_empty() || text.starts_with('#') {
                continue;
            }
            let event = serde_json::from_str(text).map_err(|err| EditorError::Script {
                line: self.line,
                reason: err.to_string(),
            })?;
            return Ok(Some(vec![event]));
        }
    }
}

/// Next batch from `events`, skipping malformed input
fn next_batch<E: EventSource + ?Sized>(events: &mut E) -> Result<Option<Vec<InputEvent>>, EditorError> {
    loop {
        match events.next_tick() {
            Err(err @ EditorError::Script { .. }) => log::warn!("Ignoring {}", err),
            other => return other,
        }
    }
}

/// Why the loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    Escape,
    InputClosed,
}

/// Summary of one editing run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub reason: ExitReason,
    pub ticks: usize,
    pub saves: usize,
    /// Last rendered preview frame
    pub frame: RgbaImage,
}

/// Summary of one touch-up run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchUpSummary {
    pub reason: ExitReason,
    pub saves: usize,
}

pub struct Driver {
    controller: InputController,
    poll_interval: Duration,
    preview_scale: f32,
    slider: f32,
}

impl Driver {
    pub fn new(controller: InputController, poll_interval: Duration, preview_scale: f32, confidence: f32) -> Self {
        Self {
            controller,
            poll_interval,
            preview_scale,
            slider: confidence,
        }
    }

    /// Run until escape or until the event source closes. Unsaved edits are
    /// dropped on exit.
    pub fn run<S: ContourSource, E: EventSource + ?Sized>(
        &mut self,
        session: &mut EditSession,
        ctx: &EditContext<'_, S>,
        events: &mut E,
    ) -> Result<RunSummary, EditorError> {
        let mut ticks = 0;
        let mut saves = 0;
        let mut frame = render_preview(ctx.image, session, self.preview_scale);

        let reason = loop {
            let Some(batch) = next_batch(events)? else {
                break ExitReason::InputClosed;
            };
            ticks += 1;

            let mut commands = Vec::new();
            let mut exit = false;
            for event in &batch {
                if let InputEvent::Confidence { value } = event {
                    self.slider = *value;
                    continue;
                }
                match self.controller.handle_event(event) {
                    Some(Action::Command(command)) => commands.push(command),
                    Some(Action::Exit) => {
                        exit = true;
                        break;
                    }
                    None => {}
                }
            }
            if !exit && let Some(command) = self.controller.poll_confidence(self.slider) {
                commands.push(command);
            }

            // commands queued before an escape in the same batch still apply
            for command in commands {
                if self.dispatch(session, ctx, command) {
                    saves += 1;
                }
            }
            if exit {
                break ExitReason::Escape;
            }

            frame = render_preview(ctx.image, session, self.preview_scale);
            if !self.poll_interval.is_zero() {
                std::thread::sleep(self.poll_interval);
            }
        };

        log::info!("Editing session ended ({:?}) after {} ticks", reason, ticks);
        Ok(RunSummary {
            reason,
            ticks,
            saves,
            frame,
        })
    }

    /// Freehand touch-up of a mask until escape or the event source closes.
    /// Each save writes the current mask through `exporter`.
    pub fn touch_up<E: EventSource + ?Sized>(
        &self,
        touchup: &mut MaskTouchUp,
        exporter: &Exporter,
        events: &mut E,
    ) -> Result<TouchUpSummary, EditorError> {
        let mut saves = 0;
        let reason = 'ticks: loop {
            let Some(batch) = next_batch(events)? else {
                break ExitReason::InputClosed;
            };
            for event in &batch {
                match touchup.handle_event(event) {
                    Some(TouchUpAction::Save) => match exporter.export_edited_mask(&touchup.mask) {
                        Ok(_) => saves += 1,
                        Err(err) => log::error!("Touch-up save failed: {}", err),
                    },
                    Some(TouchUpAction::Exit) => break 'ticks ExitReason::Escape,
                    None => {}
                }
            }
            if !self.poll_interval.is_zero() {
                std::thread::sleep(self.poll_interval);
            }
        };

        log::info!("Touch-up ended ({:?}) with {} save(s)", reason, saves);
        Ok(TouchUpSummary { reason, saves })
    }

    /// Apply one command, logging failures. Returns whether a save happened.
    fn dispatch<S: ContourSource>(
        &self,
        session: &mut EditSession,
        ctx: &EditContext<'_, S>,
        command: Command,
    ) -> bool {
        match apply(session, ctx, command) {
            Ok(Outcome::Saved(_)) => true,
            Ok(outcome) => {
                log::debug!("{:?}", outcome);
                false
            }
            // a failed re-extract already logged and left the session intact
            Err(err @ EditorError::Detection(_)) => {
                log::debug!("Command failed: {}", err);
                false
            }
            Err(err) => {
                log::error!("Command failed: {}", err);
                false
            }
        }
    }
}

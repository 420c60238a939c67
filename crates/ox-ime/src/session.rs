//! Headless console session driven by replay steps.

use anyhow::{Context, Result};
use core_config::ImeConfig;
use core_events::InputBuffer;
use core_ime::{CompositionMessage, ImeHost, ImeMessage, OverlayRegistry};
use core_render::{CellDecoration, Coord, InvalidationLog, ScreenBuffer, TextAttribute};
use crossterm::{queue, style::Print};
use std::io::Write;
use tracing::{debug, info};

use crate::script::Step;

/// Legacy attribute per composition attribute index: input, target
/// converted, converted, target not converted, input error, then spares.
pub const DEFAULT_COLORS: [u16; 8] = [0x07, 0x1F, 0x70, 0x2F, 0x4F, 0x07, 0x07, 0x07];

pub struct Session {
    primary: ScreenBuffer,
    renderer: InvalidationLog,
    input: InputBuffer,
    registry: OverlayRegistry,
    typed: String,
}

impl Session {
    pub fn new(window: Coord, buffer_height: i32, config: ImeConfig) -> Result<Self> {
        let size = Coord::new(window.x, buffer_height.max(window.y));
        let primary = ScreenBuffer::new(
            window,
            Coord::new(8, 16),
            size,
            TextAttribute::DEFAULT,
            TextAttribute::from_legacy(0x5F),
            25,
        )
        .context("allocating primary screen buffer")?;
        Ok(Self {
            primary,
            renderer: InvalidationLog::new(),
            input: InputBuffer::new(),
            registry: OverlayRegistry::new(config),
            typed: String::new(),
        })
    }

    /// Committed text received so far.
    pub fn typed(&self) -> &str {
        &self.typed
    }

    pub fn registry(&self) -> &OverlayRegistry {
        &self.registry
    }

    fn send(&mut self, message: ImeMessage) -> Result<()> {
        let mut host = ImeHost::new(&mut self.primary, &mut self.renderer, &mut self.input);
        self.registry.handle_message(&mut host, message)?;
        Ok(())
    }

    pub fn apply(&mut self, step: &Step) -> Result<()> {
        match step {
            Step::Start => self.send(ImeMessage::StartComposition)?,
            Step::End => self.send(ImeMessage::EndComposition)?,
            Step::Cursor { x, y } => {
                self.primary.cursor_mut().position = Coord::new(*x, *y);
            }
            Step::Compose {
                text,
                attrs,
                colors,
            } => {
                let pending: Vec<char> = text.chars().collect();
                let mut attrs = attrs.clone();
                attrs.resize(pending.len(), 0);
                let colors = colors.unwrap_or(DEFAULT_COLORS);
                let msg = CompositionMessage::in_progress(pending, attrs, colors);
                self.send(ImeMessage::Composition(msg.encode()?))?;
            }
            Step::Commit { text } => {
                let msg = CompositionMessage::committed(text.chars().collect());
                self.send(ImeMessage::Composition(msg.encode()?))?;
            }
            Step::ResizeView { width, height } => {
                let size = Coord::new(*width, *height);
                self.primary.set_window_size(size);
                let mut host = ImeHost::new(&mut self.primary, &mut self.renderer, &mut self.input);
                self.registry.on_viewport_resize(&mut host, size)?;
            }
            Step::ResizeBuffer { width, height } => {
                let size = Coord::new(*width, *height);
                self.primary.resize(size).context("resizing primary buffer")?;
                let mut host = ImeHost::new(&mut self.primary, &mut self.renderer, &mut self.input);
                self.registry.on_buffer_resize(&mut host, size)?;
            }
            Step::Raw { bytes } => self.send(ImeMessage::Composition(bytes.clone()))?,
        }
        self.typed.extend(self.input.drain().iter().map(|ev| ev.character));
        let invalidations = self.renderer.take().len();
        let redraws = self.primary.take_redraws().len();
        debug!(target: "replay", ?step, invalidations, redraws, "step_applied");
        Ok(())
    }

    pub fn run(&mut self, steps: &[Step]) -> Result<()> {
        for (index, step) in steps.iter().enumerate() {
            self.apply(step)
                .with_context(|| format!("step {index} ({step:?})"))?;
        }
        info!(
            target: "replay",
            steps = steps.len(),
            overlays = self.registry.len(),
            typed = self.typed.chars().count(),
            "replay_complete"
        );
        Ok(())
    }

    /// Visible window rows with composition overlays composited on top.
    pub fn screen_lines(&self) -> Vec<String> {
        let view = self.primary.viewport();
        (view.top..=view.bottom)
            .map(|y| {
                let row = self.registry.composite_row(&self.primary, y);
                let from = usize::try_from(view.left).unwrap_or(0);
                let to = usize::try_from(view.right + 1).unwrap_or(0).min(row.len());
                let line: String = row
                    .get(from..to)
                    .unwrap_or(&[])
                    .iter()
                    .filter(|c| !c.decoration.contains(CellDecoration::TRAILING))
                    .map(|c| c.ch)
                    .collect();
                line.trim_end().to_string()
            })
            .collect()
    }

    pub fn render<W: Write>(&self, out: &mut W) -> Result<()> {
        let width = usize::try_from(self.primary.window_size().x).unwrap_or(0);
        let rule = "-".repeat(width);
        queue!(out, Print(&rule), Print("\n"))?;
        for line in self.screen_lines() {
            queue!(out, Print(line), Print("\n"))?;
        }
        queue!(out, Print(&rule), Print("\n"))?;
        if self.registry.visible_composition_rows() > 0 {
            let r = self.registry.suggestion_rect(&self.primary, |p| p);
            let (w, h) = (r.right - r.left, r.bottom - r.top);
            queue!(
                out,
                Print(format!("suggestion: {},{} {w}x{h}\n", r.left, r.top))
            )?;
        }
        queue!(out, Print(format!("typed: {}\n", self.typed)))?;
        out.flush()?;
        Ok(())
    }
}

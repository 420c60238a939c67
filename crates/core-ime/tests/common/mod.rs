#![allow(dead_code)] // Shared across integration tests; each test binary uses a subset of helpers.

use core_config::ImeConfig;
use core_events::InputBuffer;
use core_ime::{CompositionMessage, ImeHost, ImeMessage, OverlayRegistry};
use core_render::{CellDecoration, Coord, InvalidationLog, Rect, ScreenBuffer, TextAttribute};

pub const COLORS: [u16; 8] = [0x07, 0x1F, 0x2F, 0x3F, 0x4F, 0x5F, 0x6F, 0x70];

/// Primary surface, collaborators and registry for one console session.
pub struct Harness {
    pub primary: ScreenBuffer,
    pub log: InvalidationLog,
    pub input: InputBuffer,
    pub reg: OverlayRegistry,
}

impl Harness {
    /// Window `width` x `height` over a buffer four windows tall.
    pub fn new(width: i32, height: i32) -> Self {
        Self::with_config(width, height, ImeConfig::default())
    }

    pub fn with_config(width: i32, height: i32, config: ImeConfig) -> Self {
        Self::build(Coord::new(width, height), width, config)
    }

    /// Window `width` x `height` over a buffer `buffer_width` columns wide.
    pub fn over_wider_buffer(width: i32, height: i32, buffer_width: i32) -> Self {
        Self::build(Coord::new(width, height), buffer_width, ImeConfig::default())
    }

    fn build(window: Coord, buffer_width: i32, config: ImeConfig) -> Self {
        let primary = ScreenBuffer::new(
            window,
            Coord::new(8, 16),
            Coord::new(buffer_width, window.y * 4),
            TextAttribute::DEFAULT,
            TextAttribute::from_legacy(0x5F),
            25,
        )
        .unwrap();
        Self {
            primary,
            log: InvalidationLog::new(),
            input: InputBuffer::new(),
            reg: OverlayRegistry::new(config),
        }
    }

    pub fn set_cursor(&mut self, x: i32, y: i32) {
        self.primary.cursor_mut().position = Coord::new(x, y);
    }

    pub fn split(&mut self) -> (&mut OverlayRegistry, ImeHost<'_>) {
        let host = ImeHost::new(&mut self.primary, &mut self.log, &mut self.input);
        (&mut self.reg, host)
    }

    pub fn send(&mut self, message: ImeMessage) {
        let (reg, mut host) = self.split();
        reg.handle_message(&mut host, message).unwrap();
    }

    pub fn compose(&mut self, text: &str) {
        let chars: Vec<char> = text.chars().collect();
        let attrs = vec![0; chars.len()];
        self.send(pending_message(chars, attrs));
    }

    pub fn commit(&mut self, text: &str) {
        let bytes = CompositionMessage::committed(text.chars().collect())
            .encode()
            .unwrap();
        self.send(ImeMessage::Composition(bytes));
    }

    /// `(view_rect, view_offset)` of every visible composition row.
    pub fn visible_rows(&self) -> Vec<(Rect, Coord)> {
        self.reg
            .composition()
            .iter()
            .filter_map(|id| self.reg.overlay(*id))
            .filter(|o| !o.is_hidden())
            .map(|o| (o.view_rect(), o.view_offset()))
            .collect()
    }

    /// Cells shown by each visible composition row, in row order.
    pub fn shown_cells(&self) -> Vec<Vec<(char, CellDecoration)>> {
        self.reg
            .composition()
            .iter()
            .filter_map(|id| self.reg.overlay(*id))
            .filter(|o| !o.is_hidden())
            .map(|o| {
                let r = o.view_rect();
                (r.left..=r.right)
                    .filter_map(|x| o.buffer().cell(Coord::new(x, r.top)))
                    .map(|(ch, deco, _)| (ch, deco))
                    .collect()
            })
            .collect()
    }
}

pub fn pending_message(chars: Vec<char>, attrs: Vec<u8>) -> ImeMessage {
    let bytes = CompositionMessage::in_progress(chars, attrs, COLORS)
        .encode()
        .unwrap();
    ImeMessage::Composition(bytes)
}

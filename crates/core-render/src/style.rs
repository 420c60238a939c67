//! Text attributes and per-cell decoration.
//!
//! `TextAttribute` is the legacy 16-bit attribute word: the low byte holds
//! foreground / background color indices and the high bits hold grid-line
//! decorations. `CellDecoration` is the separate per-cell byte that tags the
//! two halves of a double-width glyph.
//!
//! Design invariants:
//! * A leading cell is always immediately followed by its trailing cell in
//!   the same row; writers that would break a pair blank the orphan instead.
//! * `GridFlags::SINGLE` is a private marker meaning "the vertical line flag
//!   in this word was requested by the composition attribute"; it is stripped
//!   when the attribute is merged into a row.

use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct GridFlags: u16 {
        const HORIZONTAL = 0x0400;
        const LVERTICAL  = 0x0800;
        const RVERTICAL  = 0x1000;
        const SINGLE     = 0x2000;
        const REVERSE    = 0x4000;
        const UNDERSCORE = 0x8000;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CellDecoration: u8 {
        const LEADING  = 0x01;
        const TRAILING = 0x02;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextAttribute(u16);

impl TextAttribute {
    /// Light grey on black.
    pub const DEFAULT: TextAttribute = TextAttribute(0x07);

    pub const fn from_legacy(word: u16) -> Self {
        Self(word)
    }

    pub const fn legacy(self) -> u16 {
        self.0
    }

    pub fn foreground(self) -> u8 {
        (self.0 & 0x0F) as u8
    }

    pub fn background(self) -> u8 {
        ((self.0 >> 4) & 0x0F) as u8
    }

    pub fn grid(self) -> GridFlags {
        GridFlags::from_bits_truncate(self.0)
    }

    pub fn with_grid(self, flags: GridFlags) -> Self {
        Self(self.0 | flags.bits())
    }

    pub fn without_grid(self, flags: GridFlags) -> Self {
        Self(self.0 & !flags.bits())
    }

    /// True when every bit of `flags` is present.
    pub fn has_grid(self, flags: GridFlags) -> bool {
        self.grid().contains(flags)
    }
}

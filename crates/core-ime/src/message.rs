//! Composition update payload.
//!
//! Wire layout (little-endian):
//!
//! ```text
//! 0   u32 size          total byte length, must match the buffer
//! 4   u32 comp_len      pending string, bytes of UTF-16LE
//! 8   u32 comp_off
//! 12  u32 attr_len      one attribute byte per pending UTF-16 unit
//! 16  u32 attr_off
//! 20  u32 result_len    committed string, bytes of UTF-16LE
//! 24  u32 result_off
//! 28  u16 colors[8]     legacy attribute per attribute index
//! 44  strings / attribute bytes, located by the offsets above
//! ```
//!
//! A committed string stops at the first NUL unit within `result_len`.
//! Surrogate pairs decode to one char carrying the attribute of its first
//! unit; unpaired surrogates become U+FFFD.

use crate::error::{ImeError, Result};

pub const HEADER_LEN: usize = 44;
pub const COLOR_TABLE_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompositionMessage {
    /// Uncommitted text, one attribute byte per char in `attrs`.
    pub pending: Vec<char>,
    pub attrs: Vec<u8>,
    pub colors: [u16; COLOR_TABLE_LEN],
    /// Committed text; `Some` whenever the payload declared a result, even
    /// an empty one.
    pub result: Option<Vec<char>>,
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

/// Empty ranges ignore their offset.
fn range(bytes: &[u8], off: u32, len: u32) -> Result<&[u8]> {
    if len == 0 {
        return Ok(&[]);
    }
    let start = off as usize;
    let end = start
        .checked_add(len as usize)
        .ok_or(ImeError::InvalidArgument("string range overflows"))?;
    bytes
        .get(start..end)
        .ok_or(ImeError::InvalidArgument("string range out of bounds"))
}

fn utf16_units(bytes: &[u8]) -> Result<Vec<u16>> {
    if bytes.len() % 2 != 0 {
        return Err(ImeError::InvalidArgument("odd utf-16 byte length"));
    }
    Ok(bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect())
}

/// Decode `units` to chars, pairing each char with the attribute of its
/// first unit.
fn decode_with_attrs(units: &[u16], unit_attrs: &[u8]) -> (Vec<char>, Vec<u8>) {
    let mut chars = Vec::with_capacity(units.len());
    let mut attrs = Vec::with_capacity(units.len());
    let mut at = 0usize;
    for decoded in char::decode_utf16(units.iter().copied()) {
        let (ch, width) = match decoded {
            Ok(ch) => (ch, ch.len_utf16()),
            Err(_) => (char::REPLACEMENT_CHARACTER, 1),
        };
        chars.push(ch);
        attrs.push(unit_attrs.get(at).copied().unwrap_or(0));
        at += width;
    }
    (chars, attrs)
}

fn encode_utf16(chars: &[char]) -> Vec<u16> {
    let mut units = Vec::with_capacity(chars.len());
    let mut buf = [0u16; 2];
    for ch in chars {
        units.extend_from_slice(ch.encode_utf16(&mut buf));
    }
    units
}

fn to_u32(n: usize) -> Result<u32> {
    u32::try_from(n).map_err(|_| ImeError::InvalidArgument("payload exceeds u32 range"))
}

impl CompositionMessage {
    pub fn in_progress(
        pending: Vec<char>,
        attrs: Vec<u8>,
        colors: [u16; COLOR_TABLE_LEN],
    ) -> Self {
        Self {
            pending,
            attrs,
            colors,
            result: None,
        }
    }

    pub fn committed(result: Vec<char>) -> Self {
        Self {
            result: Some(result),
            ..Self::default()
        }
    }

    /// Composition ended: nothing pending, or a result was delivered.
    pub fn is_determined(&self) -> bool {
        self.pending.is_empty() || self.result.is_some()
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(ImeError::InvalidArgument("payload shorter than header"));
        }
        let size = read_u32(bytes, 0) as usize;
        if size != bytes.len() {
            return Err(ImeError::InvalidArgument("payload size field mismatch"));
        }
        let comp = range(bytes, read_u32(bytes, 8), read_u32(bytes, 4))?;
        let attr = range(bytes, read_u32(bytes, 16), read_u32(bytes, 12))?;
        let result_len = read_u32(bytes, 20);
        let result = range(bytes, read_u32(bytes, 24), result_len)?;

        let comp_units = utf16_units(comp)?;
        if attr.len() < comp_units.len() {
            return Err(ImeError::InvalidArgument("attribute run shorter than composition"));
        }
        let mut colors = [0u16; COLOR_TABLE_LEN];
        for (i, color) in colors.iter_mut().enumerate() {
            let at = 28 + i * 2;
            *color = u16::from_le_bytes([bytes[at], bytes[at + 1]]);
        }
        let (pending, attrs) = decode_with_attrs(&comp_units, attr);

        let result = if result_len == 0 {
            None
        } else {
            let units = utf16_units(result)?;
            let end = units.iter().position(|u| *u == 0).unwrap_or(units.len());
            let chars = char::decode_utf16(units[..end].iter().copied())
                .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
                .collect();
            Some(chars)
        };

        Ok(Self {
            pending,
            attrs,
            colors,
            result,
        })
    }

    /// Serialize in wire layout. The committed string is followed by a NUL
    /// unit that `result_len` does not count.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let comp_units = encode_utf16(&self.pending);
        let mut unit_attrs = Vec::with_capacity(comp_units.len());
        for (i, ch) in self.pending.iter().enumerate() {
            let attr = self.attrs.get(i).copied().unwrap_or(0);
            unit_attrs.extend(std::iter::repeat_n(attr, ch.len_utf16()));
        }
        let result_units = self.result.as_deref().map(encode_utf16);

        let comp_off = HEADER_LEN;
        let comp_len = comp_units.len() * 2;
        let result_off = comp_off + comp_len;
        let result_len = result_units.as_ref().map_or(0, |u| u.len() * 2);
        let terminator = if result_units.is_some() { 2 } else { 0 };
        let attr_off = result_off + result_len + terminator;
        let attr_len = unit_attrs.len();
        let size = attr_off + attr_len;

        let mut out = Vec::new();
        out.try_reserve_exact(size)
            .map_err(|_| ImeError::OutOfMemory)?;
        for field in [size, comp_len, comp_off, attr_len, attr_off, result_len, result_off] {
            out.extend_from_slice(&to_u32(field)?.to_le_bytes());
        }
        for color in self.colors {
            out.extend_from_slice(&color.to_le_bytes());
        }
        for unit in &comp_units {
            out.extend_from_slice(&unit.to_le_bytes());
        }
        if let Some(units) = &result_units {
            for unit in units.iter().chain(std::iter::once(&0u16)) {
                out.extend_from_slice(&unit.to_le_bytes());
            }
        }
        out.extend_from_slice(&unit_attrs);
        Ok(out)
    }
}

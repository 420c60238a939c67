//! Row storage: a char row plus a run-length attribute row.
//!
//! Invariants:
//! - `CharRow::chars.len() == CharRow::decorations.len() == width`.
//! - `CharRow::left` is the first non-blank column (`width` when blank).
//! - `CharRow::right` is one past the last non-blank column (`0` when blank).
//! - `AttrRow` runs are non-empty, adjacent runs never share an attribute and
//!   their lengths sum to the row width.

use crate::style::{CellDecoration, TextAttribute};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharRow {
    pub chars: Vec<char>,
    pub decorations: Vec<CellDecoration>,
    pub left: usize,
    pub right: usize,
}

impl CharRow {
    pub fn new(width: usize) -> Self {
        Self {
            chars: vec![' '; width],
            decorations: vec![CellDecoration::empty(); width],
            left: width,
            right: 0,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.chars.len()
    }

    /// Fill every cell with `ch` and clear decorations.
    pub fn fill(&mut self, ch: char) {
        self.chars.iter_mut().for_each(|c| *c = ch);
        self.decorations
            .iter_mut()
            .for_each(|d| *d = CellDecoration::empty());
        self.recompute_bounds();
    }

    /// Full rescan of the non-blank markers. Writers that know which columns
    /// changed update the markers themselves.
    pub fn recompute_bounds(&mut self) {
        let width = self.width();
        self.left = self.chars.iter().position(|c| *c != ' ').unwrap_or(width);
        self.right = self
            .chars
            .iter()
            .rposition(|c| *c != ' ')
            .map(|i| i + 1)
            .unwrap_or(0);
    }

    /// Resize to `width`, padding with blanks. A leading half cut off from
    /// its trailing half becomes a blank.
    pub fn resize(&mut self, width: usize) {
        self.chars.resize(width, ' ');
        self.decorations.resize(width, CellDecoration::empty());
        if let Some(last) = width.checked_sub(1) {
            if self.decorations[last].contains(CellDecoration::LEADING) {
                self.chars[last] = ' ';
                self.decorations[last] = CellDecoration::empty();
            }
        }
        self.recompute_bounds();
    }

    /// Row text with trailing blanks removed.
    pub fn text(&self) -> String {
        self.chars[..self.right].iter().collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttrRun {
    pub length: usize,
    pub attr: TextAttribute,
}

impl AttrRun {
    pub const fn new(length: usize, attr: TextAttribute) -> Self {
        Self { length, attr }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrRow {
    runs: Vec<AttrRun>,
}

fn push_coalesced(out: &mut Vec<AttrRun>, length: usize, attr: TextAttribute) {
    if length == 0 {
        return;
    }
    match out.last_mut() {
        Some(last) if last.attr == attr => last.length += length,
        _ => out.push(AttrRun::new(length, attr)),
    }
}

impl AttrRow {
    pub fn new(width: usize, attr: TextAttribute) -> Self {
        let mut runs = Vec::new();
        push_coalesced(&mut runs, width, attr);
        Self { runs }
    }

    pub fn runs(&self) -> &[AttrRun] {
        &self.runs
    }

    /// Number of runs.
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    pub fn head(&self) -> Option<&AttrRun> {
        self.runs.first()
    }

    /// Total columns covered.
    pub fn width(&self) -> usize {
        self.runs.iter().map(|r| r.length).sum()
    }

    pub fn attr_at(&self, col: usize) -> Option<TextAttribute> {
        let mut start = 0usize;
        for run in &self.runs {
            if col < start + run.length {
                return Some(run.attr);
            }
            start += run.length;
        }
        None
    }

    /// Replace columns `start..=end_inclusive` with `inserted`, clipped to
    /// `row_width`. Columns the inserted runs do not cover keep their
    /// previous attribute.
    pub fn insert_runs(
        &mut self,
        inserted: &[AttrRun],
        start: usize,
        end_inclusive: usize,
        row_width: usize,
    ) {
        if row_width == 0 || start >= row_width || end_inclusive < start {
            return;
        }
        let end = end_inclusive.min(row_width - 1) + 1;
        let mut out = Vec::with_capacity(self.runs.len() + inserted.len() + 2);

        let mut col = 0usize;
        for run in &self.runs {
            let run_end = col + run.length;
            if col < start {
                push_coalesced(&mut out, run_end.min(start) - col, run.attr);
            }
            col = run_end;
        }

        let mut budget = end - start;
        for run in inserted {
            let len = run.length.min(budget);
            push_coalesced(&mut out, len, run.attr);
            budget -= len;
            if budget == 0 {
                break;
            }
        }

        let suffix_from = end - budget;
        col = 0;
        for run in &self.runs {
            let run_end = col + run.length;
            if run_end > suffix_from {
                let from = col.max(suffix_from);
                push_coalesced(&mut out, run_end - from, run.attr);
            }
            col = run_end;
        }
        self.runs = out;
    }

    /// Truncate or extend to `width`; new columns take `fill`.
    pub fn resize(&mut self, width: usize, fill: TextAttribute) {
        let current = self.width();
        if width >= current {
            push_coalesced(&mut self.runs, width - current, fill);
            return;
        }
        let mut out = Vec::with_capacity(self.runs.len());
        let mut col = 0usize;
        for run in &self.runs {
            if col >= width {
                break;
            }
            push_coalesced(&mut out, run.length.min(width - col), run.attr);
            col += run.length;
        }
        self.runs = out;
    }

    /// Per-column attributes (diagnostics and compositing).
    pub fn expand(&self) -> Vec<TextAttribute> {
        self.runs
            .iter()
            .flat_map(|r| std::iter::repeat_n(r.attr, r.length))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub chars: CharRow,
    pub attrs: AttrRow,
}

impl Row {
    pub fn new(width: usize, attr: TextAttribute) -> Self {
        Self {
            chars: CharRow::new(width),
            attrs: AttrRow::new(width, attr),
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.chars.width()
    }

    /// Blank the row and reset it to a single attribute run.
    pub fn clear(&mut self, ch: char, attr: TextAttribute) {
        let width = self.width();
        self.chars.fill(ch);
        self.attrs = AttrRow::new(width, attr);
    }

    pub fn resize(&mut self, width: usize, fill: TextAttribute) {
        self.chars.resize(width);
        self.attrs.resize(width, fill);
    }
}

//! SGR serializer.
//!
//! Walks rows of [`Cell`]s and emits the minimal SGR escape transitions
//! between consecutive cells' resolved attributes, interleaved with glyph
//! text and `\r\n` row separators.

use super::ansi::{transition_params, write_sgr};
use super::output::OutputBuffer;
use crate::attributes::Attributes;
use crate::cell::Cell;
use crate::storage::AttributeStorage;

/// Streams SGR output for a sequence of cell rows, tracking the previously
/// emitted attribute state across calls so rows can be serialized one at a
/// time (matching how a scrollback ring would hand rows to a renderer).
pub struct SgrSerializer {
    previous: Attributes,
}

impl SgrSerializer {
    /// A fresh serializer whose "previous" state is the synthetic all-default,
    /// all-flags-clear cell, so the first non-default cell always transitions.
    pub fn new() -> Self {
        Self {
            previous: Attributes::new(),
        }
    }

    /// Reset tracked state back to the synthetic default, e.g. between frames.
    pub fn reset(&mut self) {
        self.previous = Attributes::new();
    }

    /// Serialize one row of cells into `out`, continuing from whatever state
    /// this serializer carries from a prior row. Returns the total column
    /// width advanced across the row.
    pub fn serialize_row(&mut self, cells: &[Cell], storage: &AttributeStorage, out: &mut OutputBuffer) -> u16 {
        let mut column: u16 = 0;
        let mut current = Attributes::new();
        for cell in cells {
            storage.from_address(cell.id, &mut current);

            let params = transition_params(&self.previous, &current);
            if !params.is_empty() {
                write_sgr(out, &params).expect("writing to an in-memory buffer cannot fail");
            }

            match cell.glyph {
                Some(ch) => out.write_char(ch),
                None => out.write_char(' '),
            }

            self.previous = current;
            column += cell.advance();
        }
        column
    }

    /// Serialize multiple rows into `out`, separated by `\r\n`. Returns each
    /// row's total column width, in order.
    pub fn serialize_rows(&mut self, rows: &[&[Cell]], storage: &AttributeStorage, out: &mut OutputBuffer) -> Vec<u16> {
        let mut widths = Vec::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            if i > 0 {
                out.write_str("\r\n");
            }
            widths.push(self.serialize_row(row, storage, out));
        }
        widths
    }
}

impl Default for SgrSerializer {
    fn default() -> Self {
        Self::new()
    }
}

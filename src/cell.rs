//! The cell type the SGR serializer iterates.
//!
//! Everything about the scrollback ring itself — how cells are stored,
//! scrolled, or addressed — is out of scope; this crate only needs to read a
//! cell's glyph, stored display width, and attribute identifier.

use crate::attributes::Identifier;
use unicode_width::UnicodeWidthChar;

/// One terminal grid position as the serializer sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    /// The cell's glyph, or `None` for an empty cell (serialized as a single space).
    pub glyph: Option<char>,
    /// This cell's attribute identifier.
    pub id: Identifier,
    /// Stored display width: 0 for a combining mark attached to the previous
    /// cell, 1 for a normal cell, 2 for the leading cell of a wide character.
    pub width: u8,
}

impl Cell {
    pub fn new(glyph: char, id: Identifier, width: u8) -> Self {
        Self {
            glyph: Some(glyph),
            id,
            width,
        }
    }

    /// An empty cell carrying only an attribute identifier.
    pub fn empty(id: Identifier) -> Self {
        Self {
            glyph: None,
            id,
            width: 1,
        }
    }

    /// Build a cell, deriving `width` from `glyph`'s Unicode display width
    /// instead of a caller-supplied value. Zero-width codepoints (combining
    /// marks, control characters) get width 0; everything else is 1 or 2.
    pub fn from_char(glyph: char, id: Identifier) -> Self {
        let width = glyph.width().unwrap_or(0) as u8;
        Self {
            glyph: Some(glyph),
            id,
            width,
        }
    }

    /// Column advancement for this cell: `width`, except an empty
    /// zero-width cell advances by 1 to guarantee forward progress.
    pub fn advance(&self) -> u16 {
        if self.width == 0 && self.glyph.is_none() {
            1
        } else {
            self.width as u16
        }
    }
}

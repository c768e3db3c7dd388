//! The 32-bit packed attribute identifier and the mutable `Attributes` working
//! value the upstream SGR parser mutates.
//!
//! Bit layout (identical for a bare inline [`Identifier`] and the `flags`
//! word of [`Attributes`] / a pool [`Node`](crate::pool)):
//!
//! ```text
//! bit  0..7   fg palette index      (P16 / P256)
//! bit  8..15  bg palette index      (P16 / P256)
//! bit 16..17  fg color mode
//! bit 18..19  bg color mode
//! bit 20      BOLD
//! bit 21      UNDERLINE
//! bit 22      BLINK
//! bit 23      INVERSE
//! bit 24      INVISIBLE
//! bit 25      DIM
//! bit 26      ITALIC
//! bit 27..30  reserved (zero)
//! bit 31      tag (0 = inline, 1 = pool pointer) — only meaningful on an Identifier
//! ```

use bitflags::bitflags;

/// The 32-bit tagged attribute identifier.
pub type Identifier = u32;

/// Mask selecting the tag bit. `id & TAG_MASK != 0` means "pool pointer".
pub const TAG_MASK: u32 = 0x8000_0000;

bitflags! {
    /// The seven single-bit style flags, at their packed bit positions.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct FlagBits: u32 {
        const BOLD      = 1 << 20;
        const UNDERLINE = 1 << 21;
        const BLINK     = 1 << 22;
        const INVERSE   = 1 << 23;
        const INVISIBLE = 1 << 24;
        const DIM       = 1 << 25;
        const ITALIC    = 1 << 26;
    }
}

const FG_PALETTE_SHIFT: u32 = 0;
const BG_PALETTE_SHIFT: u32 = 8;
const PALETTE_MASK: u32 = 0xFF;
const FG_MODE_SHIFT: u32 = 16;
const BG_MODE_SHIFT: u32 = 18;
const MODE_MASK: u32 = 0b11;

/// A cell's foreground/background color mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    #[default]
    Default = 0,
    P16 = 1,
    P256 = 2,
    Rgb = 3,
}

impl ColorMode {
    fn from_bits(bits: u32) -> Self {
        match bits & MODE_MASK {
            1 => ColorMode::P16,
            2 => ColorMode::P256,
            3 => ColorMode::Rgb,
            _ => ColorMode::Default,
        }
    }
}

/// Pack `(r, g, b)` into the `0x00RRGGBB` word `Attributes`/`Node` store for RGB channels.
#[inline]
pub fn to_rgb(r: u8, g: u8, b: u8) -> u32 {
    ((r as u32) << 16) | ((g as u32) << 8) | (b as u32)
}

/// Unpack a `0x00RRGGBB` word into `(r, g, b)`.
#[inline]
pub fn from_rgb(value: u32) -> (u8, u8, u8) {
    (
        ((value >> 16) & 0xFF) as u8,
        ((value >> 8) & 0xFF) as u8,
        (value & 0xFF) as u8,
    )
}

macro_rules! bit_flag_accessor {
    ($getter:ident, $setter:ident, $flag:ident) => {
        #[inline]
        pub fn $getter(&self) -> bool {
            FlagBits::from_bits_truncate(self.flags).contains(FlagBits::$flag)
        }

        #[inline]
        pub fn $setter(&mut self, value: bool) {
            let mut bits = FlagBits::from_bits_truncate(self.flags);
            bits.set(FlagBits::$flag, value);
            self.flags = (self.flags & !FlagBits::all().bits()) | bits.bits();
            self.touch();
        }
    };
}

/// A mutable `(flags, fg, bg)` working value, with a memoized last-seen identifier.
///
/// The memo makes repeated `ref()` calls on an unchanged value cheap:
/// it is cleared by every setter and only trusted by `update_address` when
/// all three fields still match what was memoized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Attributes {
    flags: u32,
    fg: u32,
    bg: u32,
    memo_flags: u32,
    memo_fg: u32,
    memo_bg: u32,
    memo_id: Identifier,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn flags(&self) -> u32 {
        self.flags
    }
    #[inline]
    pub fn fg(&self) -> u32 {
        self.fg
    }
    #[inline]
    pub fn bg(&self) -> u32 {
        self.bg
    }

    fn touch(&mut self) {
        // Any mutation invalidates the memo outright; update_address() re-derives it.
        self.memo_id = 0;
    }

    bit_flag_accessor!(bold, set_bold, BOLD);
    bit_flag_accessor!(underline, set_underline, UNDERLINE);
    bit_flag_accessor!(blink, set_blink, BLINK);
    bit_flag_accessor!(inverse, set_inverse, INVERSE);
    bit_flag_accessor!(invisible, set_invisible, INVISIBLE);
    bit_flag_accessor!(dim, set_dim, DIM);
    bit_flag_accessor!(italic, set_italic, ITALIC);

    #[inline]
    pub fn get_fg_mode(&self) -> ColorMode {
        ColorMode::from_bits(self.flags >> FG_MODE_SHIFT)
    }

    #[inline]
    pub fn get_bg_mode(&self) -> ColorMode {
        ColorMode::from_bits(self.flags >> BG_MODE_SHIFT)
    }

    pub fn set_fg_mode(&mut self, mode: ColorMode) {
        self.flags &= !(MODE_MASK << FG_MODE_SHIFT);
        self.flags |= (mode as u32) << FG_MODE_SHIFT;
        if matches!(mode, ColorMode::Rgb) {
            self.flags &= !(PALETTE_MASK << FG_PALETTE_SHIFT);
        } else {
            self.fg = 0;
        }
        self.touch();
    }

    pub fn set_bg_mode(&mut self, mode: ColorMode) {
        self.flags &= !(MODE_MASK << BG_MODE_SHIFT);
        self.flags |= (mode as u32) << BG_MODE_SHIFT;
        if matches!(mode, ColorMode::Rgb) {
            self.flags &= !(PALETTE_MASK << BG_PALETTE_SHIFT);
        } else {
            self.bg = 0;
        }
        self.touch();
    }

    /// Get the foreground color value, interpreted according to the current fg mode.
    pub fn get_fg(&self) -> u32 {
        match self.get_fg_mode() {
            ColorMode::Default => 0,
            ColorMode::P16 | ColorMode::P256 => (self.flags >> FG_PALETTE_SHIFT) & PALETTE_MASK,
            ColorMode::Rgb => self.fg,
        }
    }

    /// Set the foreground color value, interpreted according to the current fg mode.
    pub fn set_fg(&mut self, value: u32) {
        match self.get_fg_mode() {
            ColorMode::Default => {}
            ColorMode::P16 | ColorMode::P256 => {
                self.flags &= !(PALETTE_MASK << FG_PALETTE_SHIFT);
                self.flags |= (value & PALETTE_MASK) << FG_PALETTE_SHIFT;
            }
            ColorMode::Rgb => self.fg = value,
        }
        self.touch();
    }

    pub fn get_bg(&self) -> u32 {
        match self.get_bg_mode() {
            ColorMode::Default => 0,
            ColorMode::P16 | ColorMode::P256 => (self.flags >> BG_PALETTE_SHIFT) & PALETTE_MASK,
            ColorMode::Rgb => self.bg,
        }
    }

    pub fn set_bg(&mut self, value: u32) {
        match self.get_bg_mode() {
            ColorMode::Default => {}
            ColorMode::P16 | ColorMode::P256 => {
                self.flags &= !(PALETTE_MASK << BG_PALETTE_SHIFT);
                self.flags |= (value & PALETTE_MASK) << BG_PALETTE_SHIFT;
            }
            ColorMode::Rgb => self.bg = value,
        }
        self.touch();
    }

    #[inline]
    pub fn has_rgb(&self) -> bool {
        matches!(self.get_fg_mode(), ColorMode::Rgb) || matches!(self.get_bg_mode(), ColorMode::Rgb)
    }

    /// Record that `id` is this value's current identifier.
    pub fn memoize(&mut self, id: Identifier) {
        self.memo_flags = self.flags;
        self.memo_fg = self.fg;
        self.memo_bg = self.bg;
        self.memo_id = id;
    }

    /// Return the memoized identifier if `(flags, fg, bg)` are unchanged since it was set,
    /// otherwise clear the memo and return 0.
    pub fn update_address(&mut self) -> Identifier {
        if self.memo_id != 0
            && self.memo_flags == self.flags
            && self.memo_fg == self.fg
            && self.memo_bg == self.bg
        {
            self.memo_id
        } else {
            self.memo_id = 0;
            0
        }
    }

    /// Overwrite `(flags, fg, bg)` directly (used by `Storage::from_address`).
    pub(crate) fn set_raw(&mut self, flags: u32, fg: u32, bg: u32) {
        self.flags = flags;
        self.fg = fg;
        self.bg = bg;
    }
}

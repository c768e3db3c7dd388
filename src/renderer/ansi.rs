//! SGR (Select Graphic Rendition) escape sequence assembly.
//!
//! Every function here deals purely in CSI `m`-terminated parameter lists;
//! cursor movement, screen control, and the other escape families a full
//! terminal renderer needs are out of scope here.

use crate::attributes::{Attributes, ColorMode};
use std::io::{self, Write};

/// Control Sequence Introducer.
pub const CSI: &str = "\x1b[";

/// Write one SGR escape built from a flat parameter list, e.g. `[1, 4, 34]` -> `\x1b[1;4;34m`.
/// Writes nothing if `params` is empty.
pub fn write_sgr<W: Write>(w: &mut W, params: &[u32]) -> io::Result<()> {
    if params.is_empty() {
        return Ok(());
    }
    write!(w, "{CSI}")?;
    for (i, p) in params.iter().enumerate() {
        if i > 0 {
            write!(w, ";")?;
        }
        write!(w, "{p}")?;
    }
    write!(w, "m")
}

/// The `(set, reset)` SGR codes for each of the seven single-bit flags.
pub fn bold_codes() -> (u32, u32) {
    (1, 22)
}
pub fn dim_codes() -> (u32, u32) {
    (2, 22)
}
pub fn italic_codes() -> (u32, u32) {
    (3, 23)
}
pub fn underline_codes() -> (u32, u32) {
    (4, 24)
}
pub fn blink_codes() -> (u32, u32) {
    (5, 25)
}
pub fn inverse_codes() -> (u32, u32) {
    (7, 27)
}
pub fn invisible_codes() -> (u32, u32) {
    (8, 28)
}

/// Append the foreground SGR parameters for the given mode/value to `params`.
pub fn push_fg_params(params: &mut Vec<u32>, mode: ColorMode, value: u32) {
    match mode {
        ColorMode::Default => params.push(39),
        ColorMode::P16 => {
            let idx = value & 0xFF;
            if idx & 0x08 == 0 {
                params.push(30 + (idx & 0x07));
            } else {
                params.push(90 + (idx & 0x07));
            }
        }
        ColorMode::P256 => {
            params.push(38);
            params.push(5);
            params.push(value & 0xFF);
        }
        ColorMode::Rgb => {
            let (r, g, b) = crate::attributes::from_rgb(value);
            params.push(38);
            params.push(2);
            params.push(r as u32);
            params.push(g as u32);
            params.push(b as u32);
        }
    }
}

/// Append the background SGR parameters for the given mode/value to `params`.
pub fn push_bg_params(params: &mut Vec<u32>, mode: ColorMode, value: u32) {
    match mode {
        ColorMode::Default => params.push(49),
        ColorMode::P16 => {
            let idx = value & 0xFF;
            if idx & 0x08 == 0 {
                params.push(40 + (idx & 0x07));
            } else {
                params.push(100 + (idx & 0x07));
            }
        }
        ColorMode::P256 => {
            params.push(48);
            params.push(5);
            params.push(value & 0xFF);
        }
        ColorMode::Rgb => {
            let (r, g, b) = crate::attributes::from_rgb(value);
            params.push(48);
            params.push(2);
            params.push(r as u32);
            params.push(g as u32);
            params.push(b as u32);
        }
    }
}

/// Compute the minimal SGR parameter list transitioning from `old` to `new`.
/// Order: flag diffs, then fg, then bg.
pub fn transition_params(old: &Attributes, new: &Attributes) -> Vec<u32> {
    let mut params = Vec::new();

    macro_rules! flag_diff {
        ($getter:ident, $codes:expr) => {
            if old.$getter() != new.$getter() {
                let (set, reset) = $codes;
                params.push(if new.$getter() { set } else { reset });
            }
        };
    }

    flag_diff!(bold, bold_codes());
    flag_diff!(dim, dim_codes());
    flag_diff!(italic, italic_codes());
    flag_diff!(underline, underline_codes());
    flag_diff!(blink, blink_codes());
    flag_diff!(inverse, inverse_codes());
    flag_diff!(invisible, invisible_codes());

    if old.get_fg_mode() != new.get_fg_mode() || old.get_fg() != new.get_fg() {
        push_fg_params(&mut params, new.get_fg_mode(), new.get_fg());
    }
    if old.get_bg_mode() != new.get_bg_mode() || old.get_bg() != new.get_bg() {
        push_bg_params(&mut params, new.get_bg_mode(), new.get_bg());
    }

    params
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_string(params: &[u32]) -> String {
        let mut buf = Vec::new();
        write_sgr(&mut buf, params).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn empty_params_write_nothing() {
        assert_eq!(to_string(&[]), "");
    }

    #[test]
    fn joins_params_with_semicolons() {
        assert_eq!(to_string(&[1, 4, 34]), "\x1b[1;4;34m");
    }

    #[test]
    fn fg_p16_low_and_bright() {
        let mut p = Vec::new();
        push_fg_params(&mut p, ColorMode::P16, 4);
        assert_eq!(p, vec![34]);
        let mut p = Vec::new();
        push_fg_params(&mut p, ColorMode::P16, 12);
        assert_eq!(p, vec![94]);
    }

    #[test]
    fn fg_p256_and_rgb() {
        let mut p = Vec::new();
        push_fg_params(&mut p, ColorMode::P256, 196);
        assert_eq!(p, vec![38, 5, 196]);

        let mut p = Vec::new();
        push_fg_params(&mut p, ColorMode::Rgb, crate::attributes::to_rgb(0x12, 0x34, 0x56));
        assert_eq!(p, vec![38, 2, 0x12, 0x34, 0x56]);
    }

    #[test]
    fn bg_default_and_bright() {
        let mut p = Vec::new();
        push_bg_params(&mut p, ColorMode::Default, 0);
        assert_eq!(p, vec![49]);
        let mut p = Vec::new();
        push_bg_params(&mut p, ColorMode::P16, 9);
        assert_eq!(p, vec![101]);
    }
}

//! Rendering the resolved attribute stream to SGR escapes.
//!
//! Split in two: [`ansi`] assembles the escape parameter lists, [`sgr`]
//! walks cell rows and decides when a transition needs to be emitted.
//! [`output`] is the accumulating byte buffer both write into.

pub mod ansi;
pub mod output;
pub mod sgr;

pub use ansi::{transition_params, write_sgr, CSI};
pub use output::OutputBuffer;
pub use sgr::SgrSerializer;

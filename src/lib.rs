//! # termattr
//!
//! Cell-attribute interning core for a terminal emulator scrollback buffer.
//!
//! A terminal cell's display attributes (style flags, foreground and
//! background color) rarely change from one cell to the next, but a
//! scrollback buffer can hold millions of cells. Storing the full attribute
//! triple per cell wastes memory; storing nothing per cell loses the data.
//! This crate interns each distinct non-default `(flags, fg, bg)` triple once
//! and hands cells back a small tagged [`Identifier`] instead.
//!
//! Two representations share the identifier's 32 bits:
//!
//! - **Inline**: no RGB color in use (style flags and palette colors are
//!   fine). The identifier *is* the packed attribute word; no pool storage
//!   is touched.
//! - **Pool pointer**: anything involving an RGB color is interned into a
//!   reference-counted node inside a fixed-size pool, indexed by a red-black
//!   tree keyed on `(flags, fg, bg)` so identical triples share one node.
//!
//! ## Modules
//!
//! - [`attributes`] — the packed identifier layout and the mutable
//!   `Attributes` working value callers build up before interning it.
//! - [`pool`] — the fixed-block node allocator backing the tree.
//! - [`tree`] — the red-black tree keyed on `(flags, fg, bg)`.
//! - [`storage`] — the reference-counted facade (`ref`/`unref`/`from_address`)
//!   that ties the pool and tree together.
//! - [`cell`] — the terminal grid cell type the serializer consumes.
//! - [`renderer`] — SGR escape assembly and row serialization.
//! - [`config`] — pool sizing configuration.
//! - [`error`] — the crate's error type.

pub mod attributes;
pub mod cell;
pub mod config;
pub mod error;
pub mod pool;
pub mod renderer;
pub mod storage;
pub mod tree;

pub use attributes::{from_rgb, to_rgb, Attributes, ColorMode, FlagBits, Identifier, TAG_MASK};
pub use cell::Cell;
pub use config::Config;
pub use error::{Error, Result};
pub use renderer::{OutputBuffer, SgrSerializer};
pub use storage::AttributeStorage;

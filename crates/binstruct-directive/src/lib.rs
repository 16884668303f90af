//! Per-field framing directives for the binstruct wire format.
//!
//! A directive string is a comma-separated token list attached to a record
//! field. It controls whether the field is on the wire at all, how a
//! collection's element count is prefixed, whether the field is wrapped in a
//! 4-byte length block, and whether decoding may stop cleanly at that field.
//!
//! Bracketed tokens (`[count16]`, `[len32]`, ...) target the *element* plane:
//! they apply to every element of a collection field instead of the field
//! itself.
//!
//! This crate is shared by the runtime codec and the derive macro, so the
//! grammar is parsed by exactly one implementation.

pub mod directives;
pub mod error;

pub use directives::{Directives, Framing};
pub use error::{DirectiveError, Result};

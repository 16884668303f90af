//! Wire rules for each supported value kind.

mod collection;
mod optional;
mod primitive;
mod text;
#[cfg(feature = "chrono")]
mod time;

pub use text::MAX_TEXT_LEN;
#[cfg(feature = "chrono")]
pub use time::{TIMESTAMP_EPOCH_UNIX_MILLIS, TIMESTAMP_SIZE};

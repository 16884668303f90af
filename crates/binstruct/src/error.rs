use binstruct_directive::DirectiveError;

/// Errors that can occur while encoding or decoding a record.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Fewer bytes remain than the next read requires.
    #[error("index out of bounds (needed {needed} bytes, {available} available)")]
    OutOfBounds { needed: usize, available: usize },

    /// A text or collection is too long for its wire prefix.
    #[error("{what} length {len} exceeds wire maximum {max}")]
    LengthExceeded {
        what: &'static str,
        len: usize,
        max: usize,
    },

    /// A directive string could not be parsed.
    ///
    /// Derived impls validate their directives at compile time, so this only
    /// arises when a caller parses directive text at runtime and propagates
    /// the failure with `?`.
    #[error(transparent)]
    Directive(#[from] DirectiveError),

    /// An abstract field was decoded with no decoder registered for its type.
    #[error("no decoder registered for abstract type {0}")]
    Unregistered(&'static str),

    /// The value has no wire representation.
    #[error("unsupported value: {0}")]
    Unsupported(&'static str),

    /// A text body is not valid UTF-8.
    #[error("text is not valid UTF-8: {0}")]
    InvalidText(#[from] std::str::Utf8Error),

    /// A length-prefixed block declares more bytes than the configured maximum.
    #[error("length-prefixed block too large ({size} bytes, max {max})")]
    BlockTooLarge { size: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, CodecError>;

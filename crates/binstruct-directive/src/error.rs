/// Errors that can occur while parsing a directive string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DirectiveError {
    /// A token outside the directive vocabulary.
    #[error("unknown directive token: {0:?}")]
    UnknownToken(String),
}

pub type Result<T> = std::result::Result<T, DirectiveError>;

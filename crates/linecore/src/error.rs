use thiserror::Error;

/// Everything a `LineBuffer` operation can fail with. All errors are
/// returned synchronously from the call that caused them; nothing is
/// retried internally.
#[derive(Debug, Error)]
pub enum BufferError {
    #[error("line {index} is out of bounds ({count} lines)")]
    OutOfBounds { index: usize, count: usize },

    #[error("line content must not contain a newline byte")]
    EmbeddedNewline,

    #[error("buffer has no file path bound to it")]
    PathUnset,

    #[error("file I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

use thiserror::Error;

/// Custom error types for the layerstream library.
#[derive(Error, Debug)]
pub enum Error {
    /// Underlying I/O errors from std::io operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The concrete stream does not implement the requested operation.
    #[error("Stream of type {stream} does not support {operation}")]
    Unsupported {
        stream: &'static str,
        operation: &'static str,
    },

    /// An exact read/skip, or a codec group, ran out of input.
    #[error("Unexpected end of stream: requested {requested} bytes, got {available}")]
    UnexpectedEnd { requested: usize, available: usize },

    /// A decoder met a character outside its alphabet that the tolerance does not allow.
    #[error("Invalid character {:?} in {codec} input", as_char(.byte))]
    InvalidCharacter { codec: &'static str, byte: u8 },

    /// A write exceeded a fixed bound.
    #[error("Capacity exceeded: cannot write {requested} bytes, {available} available")]
    Capacity { requested: usize, available: usize },

    /// A limited stream wrote as much as its budget allowed and then refused the rest.
    #[error("Write limit exceeded: {written} of {requested} bytes written")]
    LimitExceeded { requested: usize, written: usize },

    /// A seek targeted a position that cannot exist.
    #[error("Invalid position {position} (stream size {size})")]
    InvalidPosition { position: i64, size: u64 },

    /// The stream was finished and cannot accept more data until reset.
    #[error("Stream of type {stream} is already finished")]
    Finished { stream: &'static str },

    /// Checksum mismatch error when calculated checksum doesn't match the expected one.
    #[error("Checksum mismatch: expected {expected}, got {calculated}")]
    ChecksumMismatch { expected: String, calculated: String },

    /// A malformed argument or textual value.
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// An error annotated by an outer layer.
    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create a new `Unsupported` error for the stream type `stream`.
    pub fn unsupported(stream: &'static str, operation: &'static str) -> Self {
        Self::Unsupported { stream, operation }
    }

    /// Create a new `UnexpectedEnd` error.
    pub fn unexpected_end(requested: usize, available: usize) -> Self {
        Self::UnexpectedEnd {
            requested,
            available,
        }
    }

    /// Create a new `InvalidCharacter` error.
    pub fn invalid_character(codec: &'static str, byte: u8) -> Self {
        Self::InvalidCharacter { codec, byte }
    }

    /// Create a new `Capacity` error.
    pub fn capacity(requested: usize, available: usize) -> Self {
        Self::Capacity {
            requested,
            available,
        }
    }

    /// Create a new `InvalidInput` error with a descriptive message.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create a new `ChecksumMismatch` error with expected and calculated values.
    pub fn checksum_mismatch(expected: impl ToString, calculated: impl ToString) -> Self {
        Self::ChecksumMismatch {
            expected: expected.to_string(),
            calculated: calculated.to_string(),
        }
    }

    /// Wraps this error with a message describing what the caller was doing.
    pub fn context(self, context: impl Into<String>) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, skipping every `Context` layer.
    pub fn root(&self) -> &Error {
        let mut current = self;
        while let Self::Context { source, .. } = current {
            current = source;
        }
        current
    }
}

fn as_char(byte: &u8) -> char {
    char::from(*byte)
}

/// Extension for attaching context to a `Result` on its way up.
pub trait ResultExt<T> {
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Like `context`, but only builds the message on failure.
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Into<String>,
        F: FnOnce() -> C;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(context))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Into<String>,
        F: FnOnce() -> C,
    {
        self.map_err(|e| e.context(f()))
    }
}

/// Result type alias for the library operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_chain_keeps_root() {
        let err = Error::unexpected_end(4, 1)
            .context("reading header")
            .context("loading");
        assert!(matches!(err.root(), Error::UnexpectedEnd { requested: 4, available: 1 }));
        assert_eq!(
            err.to_string(),
            "loading: reading header: Unexpected end of stream: requested 4 bytes, got 1"
        );
    }

    #[test]
    fn invalid_character_is_printable() {
        let err = Error::invalid_character("hex", b'g');
        assert_eq!(err.to_string(), "Invalid character 'g' in hex input");
    }

    #[test]
    fn result_ext_only_wraps_errors() {
        let ok: Result<u8> = Ok(1);
        assert_eq!(ok.context("unused").unwrap(), 1);

        let err: Result<u8> = Err(Error::capacity(10, 2));
        let wrapped = err.with_context(|| format!("stream #{}", 3)).unwrap_err();
        assert!(wrapped.to_string().starts_with("stream #3: Capacity exceeded"));
    }
}

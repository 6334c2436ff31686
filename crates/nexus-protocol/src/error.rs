use thiserror::Error;

/// Why a decode attempt failed, independent of where in the value it failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeErrorKind {
    #[error("unknown field `{0}`")]
    UnknownField(String),
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },
    #[error("malformed duration: `{0}`")]
    MalformedDuration(String),
    #[error("malformed timestamp: `{0}`")]
    MalformedTimestamp(String),
    #[error("unsupported shape: {0}")]
    UnsupportedShape(String),
}

/// A codec failure, carrying the field path at which it occurred.
///
/// `path` is a dotted/bracketed breadcrumb such as `params[0].resourceLocator`
/// — useful for diagnosing which nested field in a request tripped the
/// decoder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} (at {path})")]
pub struct DecodeError {
    pub path: String,
    pub kind: DecodeErrorKind,
}

impl DecodeError {
    pub fn new(path: impl Into<String>, kind: DecodeErrorKind) -> Self {
        Self { path: path.into(), kind }
    }

    pub fn type_mismatch(path: impl Into<String>, expected: &str, found: &str) -> Self {
        Self::new(
            path,
            DecodeErrorKind::TypeMismatch { expected: expected.to_owned(), found: found.to_owned() },
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FractureError {
    #[error("unknown column index: {0}")]
    UnknownColumn(usize),

    #[error("lexicon lookup failed: {0}")]
    Lexicon(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T, E = FractureError> = std::result::Result<T, E>;

macro_rules! internal {
    ($($arg:tt)*) => {
        crate::errors::FractureError::Internal(format!($($arg)*))
    };
}

pub(crate) use internal;

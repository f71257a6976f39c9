#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// A raw operator id was outside of the range of valid operators.
    InvalidOperatorId(u8),

    /// An operator name did not match any known operator.
    UnknownOperator(String),

    /// A bit count was outside of `[1, 64]`.
    InvalidBitCount(u64),
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidOperatorId(id) => write!(f, "Invalid operator id: {id}"),
            Error::UnknownOperator(name) => write!(f, "Unknown operator: {name:?}"),
            Error::InvalidBitCount(n) => write!(f, "Invalid bit count: {n} (expected 1..=64)"),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

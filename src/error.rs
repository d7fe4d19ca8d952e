use thiserror::Error;

pub type Result<T> = std::result::Result<T, TicketSwitchError>;

#[derive(Debug, Error)]
pub enum TicketSwitchError {
    /// The caller passed an argument combination the query cannot answer.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The mapping does not have the shape of a ticket type tree.
    #[error("payload decode failed: {0}")]
    Decode(#[from] serde_json::Error),

    /// Only raised when `DecodeConfig::strict_price_ranges` is enabled.
    #[error("inconsistent {field} range: min {min} exceeds max {max}")]
    InconsistentRange {
        field: &'static str,
        min: f64,
        max: f64,
    },
}

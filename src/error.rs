//! Error types for the Syrup codec.

/// Errors that can occur while encoding or decoding Syrup data.
#[derive(Debug, thiserror::Error)]
pub enum SyrupError {
    /// A byte illegal in the scanner's current state, or a framing/length
    /// error in the input.
    #[error("malformed input: {0}")]
    Malformed(String),

    /// The wire kind cannot be stored in the destination type.
    #[error("cannot decode {wire} into value of type {target} at byte offset {offset}")]
    InvalidType {
        wire: &'static str,
        target: &'static str,
        offset: u64,
    },

    /// A numeric conversion would lose information.
    #[error("{wire} overflows {target} at byte offset {offset}")]
    Overflow {
        wire: &'static str,
        target: &'static str,
        offset: u64,
    },

    /// The encoder was handed an absent value of the named type. An absent
    /// map, sequence, or handle is distinct from an empty one and has no
    /// wire representation.
    #[error("cannot encode missing value of type {0}")]
    MissingValue(&'static str),

    /// I/O error from the underlying reader or writer. An unexpected EOF
    /// mid-value and a short write both surface here.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

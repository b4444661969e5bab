//! Value binding: the type-directed encoder and decoder.
//!
//! [`Encoder`] walks a host value and writes its token stream through the
//! encoding policy; [`Decoder`] drives the scanner over an input stream and
//! binds the resulting operations to a typed destination, recursing into
//! containers.

pub mod decode;
pub mod encode;

pub use decode::{Decode, Decoder};
pub use encode::{Encode, Encoder};

use crate::encoding::PrototypeEncoding;
use crate::error::SyrupError;

/// Encodes a value to a byte vector using the prototype encoding.
pub fn to_vec<T: Encode + ?Sized>(value: &T) -> Result<Vec<u8>, SyrupError> {
    let mut out = Vec::new();
    Encoder::new(PrototypeEncoding, &mut out).encode(value)?;
    Ok(out)
}

/// Decodes a value from a byte slice using the prototype encoding.
pub fn from_slice<T: Decode>(bytes: &[u8]) -> Result<T, SyrupError> {
    Decoder::new(PrototypeEncoding, bytes).decode()
}

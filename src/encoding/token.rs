//! Prototype Syrup token byte constants.

// Length-prefixed kinds: decimal byte count, then one of these.
pub const STRING: u8 = b'"';
pub const SYMBOL: u8 = b'\'';
pub const BYTES: u8 = b':';

// Integer: introducer, decimal digits (optional leading minus), terminator.
pub const INT_OPEN: u8 = b'i';
pub const INT_CLOSE: u8 = b'e';

// Boolean
pub const TRUE: u8 = b't';
pub const FALSE: u8 = b'f';

// Floats: introducer followed by big-endian IEEE-754 bits.
pub const FLOAT32: u8 = b'F';
pub const FLOAT64: u8 = b'D';

// Containers
pub const LIST_OPEN: u8 = b'[';
pub const LIST_CLOSE: u8 = b']';
pub const DICT_OPEN: u8 = b'{';
pub const DICT_CLOSE: u8 = b'}';
pub const SET_OPEN: u8 = b'#';
pub const SET_CLOSE: u8 = b'$';
pub const RECORD_OPEN: u8 = b'<';
pub const RECORD_CLOSE: u8 = b'>';

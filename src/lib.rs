//! SyrupR — a pure-Rust codec for the Syrup binary serialization format.
//!
//! Syrup is a self-delimiting, schema-less, ordered wire format for
//! structured data: strings, byte strings, symbols, booleans,
//! arbitrary-precision integers, IEEE-754 floats, lists, sets,
//! dictionaries, and labeled records.
//!
//! # Architecture
//!
//! - **`encoding`** — the pluggable byte syntax: format and scan functions
//!   bundled behind the [`Encoding`] trait, with [`PrototypeEncoding`] as
//!   the prototype Syrup dialect
//! - **`scan`** — the byte-at-a-time streaming [`Scanner`] that turns raw
//!   input into semantic operations
//! - **`codec`** — the value-binding layer: [`Encoder`]/[`Decoder`] and the
//!   [`Encode`]/[`Decode`] traits for host types
//! - **`types`** — the [`Value`] data model and the [`Symbol`], [`Set`],
//!   and [`Record`] marker types
//! - **`meta`** — per-aggregate field metadata and its concurrent cache,
//!   fed by the [`syrup_fields!`] macro
//!
//! # Example
//!
//! ```
//! use syrupr::{from_slice, to_vec, Value};
//!
//! let bytes = to_vec("Hello, World!")?;
//! assert_eq!(bytes, b"13\"Hello, World!");
//!
//! let v: Value = from_slice(b"[5\"Helloi42e]")?;
//! assert_eq!(v, Value::List(vec![Value::from("Hello"), Value::Int(42)]));
//! # Ok::<(), syrupr::SyrupError>(())
//! ```

pub mod codec;
pub mod encoding;
pub mod error;
pub mod meta;
pub mod scan;
pub mod types;

pub use codec::{from_slice, to_vec, Decode, Decoder, Encode, Encoder};
pub use encoding::{Encoding, PrototypeEncoding, Transition, WireInt};
pub use error::SyrupError;
pub use meta::{metadata, StructFields, StructMetadata};
pub use scan::{Op, ScanState, Scanner};
pub use types::{Record, Set, Symbol, Value};

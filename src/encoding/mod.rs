//! Pluggable byte-level syntax for the Syrup format.
//!
//! An encoding policy is the bundle of format functions (value → bytes) and
//! scan functions (byte → state transition) that constitute one Syrup
//! dialect. The [`Scanner`](crate::scan::Scanner), encoder, and decoder are
//! all generic over the policy, so an alternative dialect plugs in without
//! touching the state machines.

mod prototype;
pub mod token;

pub use prototype::PrototypeEncoding;

use num_bigint::BigInt;

use crate::error::SyrupError;
use crate::scan::{Op, ScanState};
use crate::types::Symbol;

/// Outcome of feeding one byte to a scan function.
#[derive(Debug, Clone, Copy)]
pub struct Transition {
    /// The scan state to move to.
    pub next: ScanState,
    /// The operation to surface, possibly [`Op::NoOp`].
    pub op: Op,
    /// Whether the examined byte carries value content and belongs in the
    /// accumulation buffer. Not every semantic byte does: a bool introducer
    /// is both semantic and value, an integer introducer is semantic only.
    pub include: bool,
    /// Nonzero when the next state consumes exactly this many raw payload
    /// bytes before emitting its value op. The countdown itself lives on
    /// the scanner, keeping the policy stateless and shareable.
    pub reserve: u64,
}

impl Transition {
    /// Moves to `next` without buffering the byte.
    pub fn shift(next: ScanState) -> Self {
        Self {
            next,
            op: Op::NoOp,
            include: false,
            reserve: 0,
        }
    }

    /// Moves to `next`, buffering the byte.
    pub fn accept(next: ScanState) -> Self {
        Self {
            next,
            op: Op::NoOp,
            include: true,
            reserve: 0,
        }
    }

    /// Emits `op` and returns to token search.
    pub fn emit(op: Op) -> Self {
        Self {
            next: ScanState::FindToken,
            op,
            include: false,
            reserve: 0,
        }
    }

    /// Emits `op`, buffering the byte, and returns to token search.
    pub fn emit_accept(op: Op) -> Self {
        Self {
            next: ScanState::FindToken,
            op,
            include: true,
            reserve: 0,
        }
    }

    /// Moves to `next` with a fixed-width raw payload of `reserve` bytes.
    pub fn raw(next: ScanState, reserve: u64) -> Self {
        Self {
            next,
            op: Op::NoOp,
            include: false,
            reserve,
        }
    }
}

/// A wire integer, split at the signed 64-bit boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireInt {
    /// Fits in a signed 64-bit integer.
    I64(i64),
    /// Outside the signed 64-bit range.
    Big(BigInt),
}

/// A Syrup dialect: byte-level format and scan functions.
///
/// All methods take `&self`; a policy value carries no per-stream state and
/// may drive any number of scanners concurrently.
pub trait Encoding {
    // -- Format functions (value → bytes) --

    fn fmt_string(&self, s: &str) -> Vec<u8>;
    fn fmt_symbol(&self, s: &str) -> Vec<u8>;
    fn fmt_bytes(&self, b: &[u8]) -> Vec<u8>;
    fn fmt_int(&self, i: i64) -> Vec<u8>;
    fn fmt_uint(&self, u: u64) -> Vec<u8>;
    fn fmt_big_int(&self, i: &BigInt) -> Vec<u8>;
    fn fmt_bool(&self, b: bool) -> Vec<u8>;
    fn fmt_float32(&self, f: f32) -> Vec<u8>;
    fn fmt_float64(&self, f: f64) -> Vec<u8>;

    fn list_open(&self) -> Vec<u8>;
    fn list_close(&self) -> Vec<u8>;
    fn dict_open(&self) -> Vec<u8>;
    fn dict_close(&self) -> Vec<u8>;
    fn set_open(&self) -> Vec<u8>;
    fn set_close(&self) -> Vec<u8>;
    fn record_open(&self) -> Vec<u8>;
    fn record_close(&self) -> Vec<u8>;

    // -- Scan functions (byte → transition) --

    /// Transition from [`ScanState::FindToken`].
    fn find_token(&self, b: u8) -> Result<Transition, SyrupError>;
    /// Transition while reading length-prefix digits.
    fn scan_token_len(&self, b: u8) -> Result<Transition, SyrupError>;
    /// Transition on the first byte after an integer introducer.
    fn scan_first_int(&self, b: u8) -> Result<Transition, SyrupError>;
    /// Transition on subsequent integer digits or the terminator.
    fn scan_int(&self, b: u8) -> Result<Transition, SyrupError>;

    /// Parses accumulated length-prefix digits. Returns the payload byte
    /// count, and — when it is zero — the value op to emit immediately so
    /// no payload phase is entered.
    fn parse_len(&self, digits: &[u8], next: ScanState) -> Result<(Op, u64), SyrupError>;

    // -- Value parsers over the accumulated buffer --

    fn bool_val(&self, raw: &[u8]) -> Result<bool, SyrupError>;
    fn symbol_val(&self, raw: &[u8]) -> Result<Symbol, SyrupError>;
    fn string_val(&self, raw: &[u8]) -> Result<String, SyrupError>;
    fn int_val(&self, raw: &[u8]) -> Result<WireInt, SyrupError>;
    fn float32_val(&self, raw: &[u8]) -> Result<f32, SyrupError>;
    fn float64_val(&self, raw: &[u8]) -> Result<f64, SyrupError>;
}

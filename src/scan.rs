//! Byte-at-a-time streaming scanner.
//!
//! The scanner owns no knowledge of the concrete byte syntax. It dispatches
//! each input byte to the [`Encoding`] policy, accumulates payload bytes,
//! and emits semantic [`Op`]s for the decoder to act on.

use std::fmt;

use bytes::{BufMut, Bytes, BytesMut};
use num_bigint::BigInt;

use crate::encoding::{Encoding, Transition, WireInt};
use crate::error::SyrupError;
use crate::types::Symbol;

/// Position within the wire grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// Between tokens, looking for the next introducer byte.
    FindToken,
    /// Reading the decimal digits of a length prefix.
    TokenLen,
    /// Reading the payload bytes of a string.
    String,
    /// Reading the first byte after an integer introducer (may be a sign).
    FirstInt,
    /// Reading integer digits or the terminator.
    Int,
    /// Reading the 8 raw payload bytes of a double-precision float.
    Float64,
    /// Reading the 4 raw payload bytes of a single-precision float.
    Float32,
    /// Reading the payload bytes of a symbol.
    Symbol,
    /// Reading the payload bytes of a byte string.
    ByteArr,
}

impl fmt::Display for ScanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FindToken => "find-token",
            Self::TokenLen => "token-length",
            Self::String => "string",
            Self::FirstInt => "first-int",
            Self::Int => "int",
            Self::Float64 => "float64",
            Self::Float32 => "float32",
            Self::Symbol => "symbol",
            Self::ByteArr => "byte-string",
        };
        f.write_str(name)
    }
}

/// A semantic operation emitted by the scanner.
///
/// `Val*` ops signal that a complete value is buffered and must be fetched
/// through the matching accessor. `Open*`/`Close*` ops bracket containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    NoOp,
    ValBool,
    ValByteArr,
    ValSymbol,
    ValString,
    ValInt,
    ValFloat32,
    ValFloat64,
    OpenList,
    OpenDict,
    OpenSet,
    OpenRecord,
    CloseList,
    CloseDict,
    CloseSet,
    CloseRecord,
}

/// Streaming scanner over one Syrup input.
///
/// Holds all per-stream mutable state: the current [`ScanState`], the
/// accumulation buffer, and the payload countdown shared by length-prefixed
/// kinds and fixed-width float payloads. A scanner is owned by exactly one
/// decoder and is not shared.
pub struct Scanner<E> {
    encoding: E,
    state: ScanState,
    buf: BytesMut,
    remaining: u64,
}

impl<E: Encoding> Scanner<E> {
    pub fn new(encoding: E) -> Self {
        Self {
            encoding,
            state: ScanState::FindToken,
            buf: BytesMut::new(),
            remaining: 0,
        }
    }

    /// Current scan state.
    pub fn state(&self) -> ScanState {
        self.state
    }

    /// Processes one input byte and returns the resulting operation.
    ///
    /// After a `Val*` op the caller must fetch the value through the
    /// matching `take_*` accessor (or [`Scanner::discard`]), which resets
    /// the accumulation buffer.
    pub fn process(&mut self, b: u8) -> Result<Op, SyrupError> {
        let was = self.state;

        // 1. State transition: the policy decides for grammar states; the
        // five payload states count down raw bytes locally.
        let t = match was {
            ScanState::FindToken => self.encoding.find_token(b)?,
            ScanState::TokenLen => self.encoding.scan_token_len(b)?,
            ScanState::FirstInt => self.encoding.scan_first_int(b)?,
            ScanState::Int => self.encoding.scan_int(b)?,
            ScanState::String => self.payload_byte(Op::ValString),
            ScanState::Symbol => self.payload_byte(Op::ValSymbol),
            ScanState::ByteArr => self.payload_byte(Op::ValByteArr),
            ScanState::Float32 => self.payload_byte(Op::ValFloat32),
            ScanState::Float64 => self.payload_byte(Op::ValFloat64),
        };

        // 2. Accumulate the byte when it carries value content.
        if t.include {
            self.buf.put_u8(b);
        }

        let mut op = t.op;
        let mut next = t.next;

        // 3. Leaving the length prefix: parse the buffered digits into the
        // payload countdown. A zero length short-circuits straight to the
        // value op with no payload phase.
        if was == ScanState::TokenLen && next != ScanState::TokenLen {
            let (len_op, len) = self.encoding.parse_len(&self.buf, next)?;
            self.buf.clear();
            self.remaining = len;
            if len == 0 {
                op = len_op;
                next = ScanState::FindToken;
            }
        }

        // 4. Fixed-width payload directive (floats): arm the countdown.
        if t.reserve > 0 {
            self.remaining = t.reserve;
        }

        self.state = next;
        Ok(op)
    }

    fn payload_byte(&mut self, done: Op) -> Transition {
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            Transition {
                next: ScanState::FindToken,
                op: done,
                include: true,
                reserve: 0,
            }
        } else {
            Transition {
                next: self.state,
                op: Op::NoOp,
                include: true,
                reserve: 0,
            }
        }
    }

    // -- Value accessors --
    //
    // Each accessor hands the accumulated bytes to the policy's parser and
    // resets the buffer.

    pub fn take_bool(&mut self) -> Result<bool, SyrupError> {
        let raw = self.buf.split();
        self.encoding.bool_val(&raw)
    }

    pub fn take_bytes(&mut self) -> Result<Bytes, SyrupError> {
        Ok(self.buf.split().freeze())
    }

    pub fn take_symbol(&mut self) -> Result<Symbol, SyrupError> {
        let raw = self.buf.split();
        self.encoding.symbol_val(&raw)
    }

    pub fn take_string(&mut self) -> Result<String, SyrupError> {
        let raw = self.buf.split();
        self.encoding.string_val(&raw)
    }

    pub fn take_int(&mut self) -> Result<WireInt, SyrupError> {
        let raw = self.buf.split();
        self.encoding.int_val(&raw)
    }

    pub fn take_big_int(&mut self) -> Result<BigInt, SyrupError> {
        match self.take_int()? {
            WireInt::I64(i) => Ok(BigInt::from(i)),
            WireInt::Big(b) => Ok(b),
        }
    }

    pub fn take_float32(&mut self) -> Result<f32, SyrupError> {
        let raw = self.buf.split();
        self.encoding.float32_val(&raw)
    }

    pub fn take_float64(&mut self) -> Result<f64, SyrupError> {
        let raw = self.buf.split();
        self.encoding.float64_val(&raw)
    }

    /// Drops a buffered value without parsing it. Used when a value op is
    /// consumed by a skip rather than a store.
    pub fn discard(&mut self) {
        self.buf.clear();
    }

    #[cfg(test)]
    fn buf_len(&self) -> usize {
        self.buf.len()
    }
}

//! The prototypical Syrup encoding.

use std::num::IntErrorKind;

use num_bigint::BigInt;

use super::token;
use super::{Encoding, Transition, WireInt};
use crate::error::SyrupError;
use crate::scan::{Op, ScanState};
use crate::types::Symbol;

/// The prototype Syrup byte syntax.
///
/// Length-prefixed strings/symbols/byte strings, `i…e` decimal integers,
/// single-byte booleans, big-endian IEEE-754 floats, and single-byte
/// container brackets.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrototypeEncoding;

/// White space for a single input byte, per the Unicode classification of
/// the corresponding code point.
fn is_whitespace(b: u8) -> bool {
    matches!(b, 0x09..=0x0D | 0x20 | 0x85 | 0xA0)
}

fn length_prefixed(payload: &[u8], kind: u8) -> Vec<u8> {
    let mut b = payload.len().to_string().into_bytes();
    b.push(kind);
    b.extend_from_slice(payload);
    b
}

impl Encoding for PrototypeEncoding {
    fn fmt_string(&self, s: &str) -> Vec<u8> {
        length_prefixed(s.as_bytes(), token::STRING)
    }

    fn fmt_symbol(&self, s: &str) -> Vec<u8> {
        length_prefixed(s.as_bytes(), token::SYMBOL)
    }

    fn fmt_bytes(&self, payload: &[u8]) -> Vec<u8> {
        length_prefixed(payload, token::BYTES)
    }

    fn fmt_int(&self, i: i64) -> Vec<u8> {
        let mut b = vec![token::INT_OPEN];
        b.extend_from_slice(i.to_string().as_bytes());
        b.push(token::INT_CLOSE);
        b
    }

    fn fmt_uint(&self, u: u64) -> Vec<u8> {
        let mut b = vec![token::INT_OPEN];
        b.extend_from_slice(u.to_string().as_bytes());
        b.push(token::INT_CLOSE);
        b
    }

    fn fmt_big_int(&self, i: &BigInt) -> Vec<u8> {
        let mut b = vec![token::INT_OPEN];
        b.extend_from_slice(i.to_str_radix(10).as_bytes());
        b.push(token::INT_CLOSE);
        b
    }

    fn fmt_bool(&self, b: bool) -> Vec<u8> {
        vec![if b { token::TRUE } else { token::FALSE }]
    }

    fn fmt_float32(&self, f: f32) -> Vec<u8> {
        let mut b = Vec::with_capacity(5);
        b.push(token::FLOAT32);
        b.extend_from_slice(&f.to_be_bytes());
        b
    }

    fn fmt_float64(&self, f: f64) -> Vec<u8> {
        let mut b = Vec::with_capacity(9);
        b.push(token::FLOAT64);
        b.extend_from_slice(&f.to_be_bytes());
        b
    }

    fn list_open(&self) -> Vec<u8> {
        vec![token::LIST_OPEN]
    }

    fn list_close(&self) -> Vec<u8> {
        vec![token::LIST_CLOSE]
    }

    fn dict_open(&self) -> Vec<u8> {
        vec![token::DICT_OPEN]
    }

    fn dict_close(&self) -> Vec<u8> {
        vec![token::DICT_CLOSE]
    }

    fn set_open(&self) -> Vec<u8> {
        vec![token::SET_OPEN]
    }

    fn set_close(&self) -> Vec<u8> {
        vec![token::SET_CLOSE]
    }

    fn record_open(&self) -> Vec<u8> {
        vec![token::RECORD_OPEN]
    }

    fn record_close(&self) -> Vec<u8> {
        vec![token::RECORD_CLOSE]
    }

    fn find_token(&self, b: u8) -> Result<Transition, SyrupError> {
        if is_whitespace(b) {
            return Ok(Transition::shift(ScanState::FindToken));
        }
        Ok(match b {
            b'0'..=b'9' => Transition::accept(ScanState::TokenLen),
            token::INT_OPEN => Transition::shift(ScanState::FirstInt),
            token::TRUE | token::FALSE => Transition::emit_accept(Op::ValBool),
            token::FLOAT32 => Transition::raw(ScanState::Float32, 4),
            token::FLOAT64 => Transition::raw(ScanState::Float64, 8),
            token::LIST_OPEN => Transition::emit(Op::OpenList),
            token::DICT_OPEN => Transition::emit(Op::OpenDict),
            token::SET_OPEN => Transition::emit(Op::OpenSet),
            token::RECORD_OPEN => Transition::emit(Op::OpenRecord),
            token::LIST_CLOSE => Transition::emit(Op::CloseList),
            token::DICT_CLOSE => Transition::emit(Op::CloseDict),
            token::SET_CLOSE => Transition::emit(Op::CloseSet),
            token::RECORD_CLOSE => Transition::emit(Op::CloseRecord),
            _ => {
                return Err(SyrupError::Malformed(format!(
                    "no token starts with byte 0x{b:02X}"
                )));
            }
        })
    }

    fn scan_token_len(&self, b: u8) -> Result<Transition, SyrupError> {
        Ok(match b {
            b'0'..=b'9' => Transition::accept(ScanState::TokenLen),
            token::SYMBOL => Transition::shift(ScanState::Symbol),
            token::STRING => Transition::shift(ScanState::String),
            token::BYTES => Transition::shift(ScanState::ByteArr),
            _ => {
                return Err(SyrupError::Malformed(format!(
                    "unexpected byte 0x{b:02X} in length prefix"
                )));
            }
        })
    }

    fn scan_first_int(&self, b: u8) -> Result<Transition, SyrupError> {
        Ok(match b {
            b'-' | b'0'..=b'9' => Transition::accept(ScanState::Int),
            token::INT_CLOSE => Transition::emit(Op::ValInt),
            _ => {
                return Err(SyrupError::Malformed(format!(
                    "unexpected byte 0x{b:02X} in integer"
                )));
            }
        })
    }

    fn scan_int(&self, b: u8) -> Result<Transition, SyrupError> {
        Ok(match b {
            b'0'..=b'9' => Transition::accept(ScanState::Int),
            token::INT_CLOSE => Transition::emit(Op::ValInt),
            _ => {
                return Err(SyrupError::Malformed(format!(
                    "unexpected byte 0x{b:02X} in integer"
                )));
            }
        })
    }

    fn parse_len(&self, digits: &[u8], next: ScanState) -> Result<(Op, u64), SyrupError> {
        let s = std::str::from_utf8(digits)
            .map_err(|_| SyrupError::Malformed("non-ASCII length prefix".into()))?;
        let len: u64 = s
            .parse()
            .map_err(|e| SyrupError::Malformed(format!("bad length prefix {s:?}: {e}")))?;
        if len == 0 {
            let op = match next {
                ScanState::Symbol => Op::ValSymbol,
                ScanState::String => Op::ValString,
                ScanState::ByteArr => Op::ValByteArr,
                other => {
                    return Err(SyrupError::Malformed(format!(
                        "length prefix cannot precede {other} state"
                    )));
                }
            };
            return Ok((op, 0));
        }
        Ok((Op::NoOp, len))
    }

    fn bool_val(&self, raw: &[u8]) -> Result<bool, SyrupError> {
        match raw {
            [token::TRUE] => Ok(true),
            [token::FALSE] => Ok(false),
            _ => Err(SyrupError::Malformed(format!(
                "bool value has {} bytes",
                raw.len()
            ))),
        }
    }

    fn symbol_val(&self, raw: &[u8]) -> Result<Symbol, SyrupError> {
        Ok(Symbol(String::from_utf8(raw.to_vec()).map_err(|e| {
            SyrupError::Malformed(format!("symbol is not valid UTF-8: {e}"))
        })?))
    }

    fn string_val(&self, raw: &[u8]) -> Result<String, SyrupError> {
        String::from_utf8(raw.to_vec())
            .map_err(|e| SyrupError::Malformed(format!("string is not valid UTF-8: {e}")))
    }

    fn int_val(&self, raw: &[u8]) -> Result<WireInt, SyrupError> {
        let s = std::str::from_utf8(raw)
            .map_err(|_| SyrupError::Malformed("non-ASCII integer digits".into()))?;
        match s.parse::<i64>() {
            Ok(i) => Ok(WireInt::I64(i)),
            Err(e)
                if matches!(
                    e.kind(),
                    IntErrorKind::PosOverflow | IntErrorKind::NegOverflow
                ) =>
            {
                BigInt::parse_bytes(s.as_bytes(), 10)
                    .map(WireInt::Big)
                    .ok_or_else(|| SyrupError::Malformed(format!("bad integer digits {s:?}")))
            }
            Err(e) => Err(SyrupError::Malformed(format!(
                "bad integer digits {s:?}: {e}"
            ))),
        }
    }

    fn float32_val(&self, raw: &[u8]) -> Result<f32, SyrupError> {
        let bits: [u8; 4] = raw
            .try_into()
            .map_err(|_| SyrupError::Malformed(format!("float32 payload has {} bytes", raw.len())))?;
        Ok(f32::from_be_bytes(bits))
    }

    fn float64_val(&self, raw: &[u8]) -> Result<f64, SyrupError> {
        let bits: [u8; 8] = raw
            .try_into()
            .map_err(|_| SyrupError::Malformed(format!("float64 payload has {} bytes", raw.len())))?;
        Ok(f64::from_be_bytes(bits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_string() {
        let e = PrototypeEncoding;
        assert_eq!(e.fmt_string("Hello, World!"), b"13\"Hello, World!");
        assert_eq!(e.fmt_string(""), b"0\"");
    }

    #[test]
    fn format_symbol() {
        let e = PrototypeEncoding;
        assert_eq!(e.fmt_symbol("PtrToIt"), b"7'PtrToIt");
    }

    #[test]
    fn format_bytes() {
        let e = PrototypeEncoding;
        let mut want = b"13:".to_vec();
        want.extend_from_slice(&[1, 1, 2, 3, 5, 8, 13, 8, 5, 3, 2, 1, 1]);
        assert_eq!(
            e.fmt_bytes(&[1, 1, 2, 3, 5, 8, 13, 8, 5, 3, 2, 1, 1]),
            want
        );
    }

    #[test]
    fn format_ints() {
        let e = PrototypeEncoding;
        assert_eq!(e.fmt_int(-919), b"i-919e");
        assert_eq!(e.fmt_int(0), b"i0e");
        assert_eq!(e.fmt_uint(2147483648), b"i2147483648e");
        let big: BigInt = "92233720368547758070".parse().unwrap();
        assert_eq!(e.fmt_big_int(&big), b"i92233720368547758070e");
    }

    #[test]
    fn format_bools() {
        let e = PrototypeEncoding;
        assert_eq!(e.fmt_bool(true), b"t");
        assert_eq!(e.fmt_bool(false), b"f");
    }

    #[test]
    fn format_floats() {
        let e = PrototypeEncoding;
        assert_eq!(
            e.fmt_float64(3.14159),
            &[b'D', 64, 9, 33, 249, 240, 27, 134, 110]
        );
        assert_eq!(e.fmt_float32(3.14159), &[b'F', 64, 73, 15, 208]);
    }

    #[test]
    fn format_brackets() {
        let e = PrototypeEncoding;
        assert_eq!(e.list_open(), b"[");
        assert_eq!(e.list_close(), b"]");
        assert_eq!(e.dict_open(), b"{");
        assert_eq!(e.dict_close(), b"}");
        assert_eq!(e.set_open(), b"#");
        assert_eq!(e.set_close(), b"$");
        assert_eq!(e.record_open(), b"<");
        assert_eq!(e.record_close(), b">");
    }

    #[test]
    fn find_token_skips_whitespace() {
        let e = PrototypeEncoding;
        for b in [0x09, 0x0A, 0x0B, 0x0C, 0x0D, 0x20, 0x85, 0xA0] {
            let t = e.find_token(b).unwrap();
            assert_eq!(t.next, ScanState::FindToken);
            assert_eq!(t.op, Op::NoOp);
            assert!(!t.include);
        }
    }

    #[test]
    fn find_token_rejects_unknown_bytes() {
        let e = PrototypeEncoding;
        assert!(e.find_token(b'!').is_err());
        assert!(e.find_token(0x00).is_err());
    }

    #[test]
    fn find_token_floats_reserve_payload() {
        let e = PrototypeEncoding;
        let t = e.find_token(b'F').unwrap();
        assert_eq!(t.next, ScanState::Float32);
        assert_eq!(t.reserve, 4);
        let t = e.find_token(b'D').unwrap();
        assert_eq!(t.next, ScanState::Float64);
        assert_eq!(t.reserve, 8);
    }

    #[test]
    fn token_len_transitions() {
        let e = PrototypeEncoding;
        assert_eq!(e.scan_token_len(b'7').unwrap().next, ScanState::TokenLen);
        assert_eq!(e.scan_token_len(b'"').unwrap().next, ScanState::String);
        assert_eq!(e.scan_token_len(b'\'').unwrap().next, ScanState::Symbol);
        assert_eq!(e.scan_token_len(b':').unwrap().next, ScanState::ByteArr);
        assert!(e.scan_token_len(b'e').is_err());
    }

    #[test]
    fn first_int_accepts_sign() {
        let e = PrototypeEncoding;
        assert_eq!(e.scan_first_int(b'-').unwrap().next, ScanState::Int);
        assert_eq!(e.scan_first_int(b'5').unwrap().next, ScanState::Int);
        assert!(e.scan_first_int(b'-').unwrap().include);
        assert!(e.scan_int(b'-').is_err());
    }

    #[test]
    fn parse_len_fast_path() {
        let e = PrototypeEncoding;
        assert_eq!(
            e.parse_len(b"0", ScanState::String).unwrap(),
            (Op::ValString, 0)
        );
        assert_eq!(
            e.parse_len(b"0", ScanState::Symbol).unwrap(),
            (Op::ValSymbol, 0)
        );
        assert_eq!(
            e.parse_len(b"0", ScanState::ByteArr).unwrap(),
            (Op::ValByteArr, 0)
        );
        assert_eq!(
            e.parse_len(b"13", ScanState::String).unwrap(),
            (Op::NoOp, 13)
        );
        assert!(e.parse_len(b"0", ScanState::Int).is_err());
    }

    #[test]
    fn int_val_boundaries() {
        let e = PrototypeEncoding;
        assert_eq!(
            e.int_val(b"9223372036854775807").unwrap(),
            WireInt::I64(i64::MAX)
        );
        assert_eq!(
            e.int_val(b"-9223372036854775808").unwrap(),
            WireInt::I64(i64::MIN)
        );
        let over: BigInt = "9223372036854775808".parse().unwrap();
        assert_eq!(e.int_val(b"9223372036854775808").unwrap(), WireInt::Big(over));
        let under: BigInt = "-9223372036854775809".parse().unwrap();
        assert_eq!(
            e.int_val(b"-9223372036854775809").unwrap(),
            WireInt::Big(under)
        );
        let big: BigInt = "92233720368547758070".parse().unwrap();
        assert_eq!(
            e.int_val(b"92233720368547758070").unwrap(),
            WireInt::Big(big)
        );
    }

    #[test]
    fn int_val_rejects_empty_and_garbage() {
        let e = PrototypeEncoding;
        assert!(e.int_val(b"").is_err());
        assert!(e.int_val(b"-").is_err());
        assert!(e.int_val(b"1-2").is_err());
    }

    #[test]
    fn bool_val_single_byte() {
        let e = PrototypeEncoding;
        assert!(e.bool_val(b"t").unwrap());
        assert!(!e.bool_val(b"f").unwrap());
        assert!(e.bool_val(b"tf").is_err());
        assert!(e.bool_val(b"").is_err());
    }

    #[test]
    fn float_vals_round_bits() {
        let e = PrototypeEncoding;
        assert_eq!(
            e.float64_val(&3.14159f64.to_be_bytes()).unwrap(),
            3.14159f64
        );
        assert_eq!(
            e.float32_val(&3.14159f32.to_be_bytes()).unwrap(),
            3.14159f32
        );
        assert!(e.float32_val(&[0; 3]).is_err());
        assert!(e.float64_val(&[0; 7]).is_err());
    }
}

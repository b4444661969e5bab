//! Syrup decoding: bytes → host values.

use std::any::type_name;
use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};
use std::io::Read;

use bytes::Bytes;
use num_bigint::BigInt;

use crate::encoding::{Encoding, WireInt};
use crate::error::SyrupError;
use crate::meta::{self, StructFields};
use crate::scan::{Op, Scanner};
use crate::types::{Record, Set, Symbol, Value};

/// Reads Syrup-encoded values from a reader through an encoding policy.
///
/// The decoder owns its scanner and reads one byte at a time; wrap slow
/// readers in a [`std::io::BufReader`]. Not safe for concurrent use.
pub struct Decoder<E, R> {
    scanner: Scanner<E>,
    reader: R,
    offset: u64,
    pending: Option<Op>,
}

impl<E: Encoding, R: Read> Decoder<E, R> {
    pub fn new(encoding: E, reader: R) -> Self {
        Self {
            scanner: Scanner::new(encoding),
            reader,
            offset: 0,
            pending: None,
        }
    }

    /// Decodes one value. The decoder does not read past the value, so
    /// end-of-input immediately after a complete value is not an error.
    pub fn decode<T: Decode>(&mut self) -> Result<T, SyrupError> {
        T::decode(self)
    }

    /// Count of input bytes consumed so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Reads input until the scanner produces a meaningful operation, or
    /// returns the pushed-back one.
    pub fn next_op(&mut self) -> Result<Op, SyrupError> {
        if let Some(op) = self.pending.take() {
            return Ok(op);
        }
        let mut byte = [0u8; 1];
        loop {
            self.reader.read_exact(&mut byte)?;
            self.offset += 1;
            match self.scanner.process(byte[0])? {
                Op::NoOp => continue,
                op => return Ok(op),
            }
        }
    }

    /// Returns an operation obtained from [`Decoder::next_op`] for the next
    /// caller to consume. At most one op can be pending.
    pub fn push_back(&mut self, op: Op) {
        debug_assert!(self.pending.is_none(), "an op is already pending");
        self.pending = Some(op);
    }

    /// Consumes one complete value, scalar or container, without
    /// materializing it.
    pub fn skip_value(&mut self) -> Result<(), SyrupError> {
        let mut depth: u64 = 0;
        loop {
            match self.next_op()? {
                Op::NoOp => {}
                Op::ValBool
                | Op::ValByteArr
                | Op::ValSymbol
                | Op::ValString
                | Op::ValInt
                | Op::ValFloat32
                | Op::ValFloat64 => {
                    self.scanner.discard();
                    if depth == 0 {
                        return Ok(());
                    }
                }
                Op::OpenList | Op::OpenDict | Op::OpenSet | Op::OpenRecord => depth += 1,
                Op::CloseList | Op::CloseDict | Op::CloseSet | Op::CloseRecord => {
                    depth = depth.checked_sub(1).ok_or_else(|| {
                        SyrupError::Malformed("unbalanced close while skipping a value".into())
                    })?;
                    if depth == 0 {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Decodes a dictionary into an aggregate described by its
    /// [`StructFields`] metadata. Keys with no matching field consume and
    /// discard their value.
    pub fn read_struct<T: StructFields + Default + 'static>(&mut self) -> Result<T, SyrupError> {
        match self.next_op()? {
            Op::OpenDict => {}
            op => return Err(self.mismatch(op, type_name::<T>())),
        }
        let meta = meta::metadata::<T>();
        let mut out = T::default();
        while self.dict_key_start()? {
            let key = String::decode(self)?;
            self.dict_value_start()?;
            match meta.position(&key) {
                Some(idx) => out.decode_field(idx, self)?,
                None => self.skip_value()?,
            }
        }
        Ok(out)
    }

    fn mismatch(&self, op: Op, target: &'static str) -> SyrupError {
        SyrupError::InvalidType {
            wire: wire_name(op),
            target,
            offset: self.offset,
        }
    }

    fn overflow(&self, wire: &'static str, target: &'static str) -> SyrupError {
        SyrupError::Overflow {
            wire,
            target,
            offset: self.offset,
        }
    }

    fn expect_i64(&mut self, target: &'static str) -> Result<i64, SyrupError> {
        match self.next_op()? {
            Op::ValInt => match self.scanner.take_int()? {
                WireInt::I64(i) => Ok(i),
                WireInt::Big(_) => Err(SyrupError::InvalidType {
                    wire: "big integer",
                    target,
                    offset: self.offset,
                }),
            },
            op => Err(self.mismatch(op, target)),
        }
    }

    /// Expects a list or set opener and returns the matching close op.
    fn open_sequence(&mut self, target: &'static str) -> Result<Op, SyrupError> {
        match self.next_op()? {
            Op::OpenList => Ok(Op::CloseList),
            Op::OpenSet => Ok(Op::CloseSet),
            op => Err(self.mismatch(op, target)),
        }
    }

    /// Rejects a close op of any kind; containers check their own close
    /// before calling this, so one here is a nesting violation.
    fn reject_stray_close(&self, op: Op) -> Result<(), SyrupError> {
        match op {
            Op::CloseList | Op::CloseDict | Op::CloseSet | Op::CloseRecord => Err(
                SyrupError::Malformed(format!("mismatched {} op", wire_name(op))),
            ),
            _ => Ok(()),
        }
    }

    /// Positions at the next dictionary key. Returns `false` at the close.
    fn dict_key_start(&mut self) -> Result<bool, SyrupError> {
        let op = self.next_op()?;
        if op == Op::CloseDict {
            return Ok(false);
        }
        self.reject_stray_close(op)?;
        self.push_back(op);
        Ok(true)
    }

    /// Positions at a dictionary value, after its key has been read.
    fn dict_value_start(&mut self) -> Result<(), SyrupError> {
        let op = self.next_op()?;
        if op == Op::CloseDict {
            return Err(SyrupError::Malformed(
                "dictionary key without a value".into(),
            ));
        }
        self.reject_stray_close(op)?;
        self.push_back(op);
        Ok(())
    }

    /// Reads a record body after its open op: the label, then values until
    /// the close.
    fn read_record_body(&mut self) -> Result<Record, SyrupError> {
        let op = self.next_op()?;
        if op == Op::CloseRecord {
            return Err(SyrupError::Malformed("record without a label".into()));
        }
        self.reject_stray_close(op)?;
        self.push_back(op);
        let label = Value::decode(self)?;
        let mut values = Vec::new();
        loop {
            let op = self.next_op()?;
            if op == Op::CloseRecord {
                return Ok(Record {
                    label: Box::new(label),
                    values,
                });
            }
            self.reject_stray_close(op)?;
            self.push_back(op);
            values.push(Value::decode(self)?);
        }
    }

    /// Builds a [`Value`] from an operation already obtained from
    /// [`Decoder::next_op`].
    fn value_from_op(&mut self, op: Op) -> Result<Value, SyrupError> {
        match op {
            Op::ValBool => Ok(Value::Bool(self.scanner.take_bool()?)),
            Op::ValByteArr => Ok(Value::Bytes(self.scanner.take_bytes()?.to_vec())),
            Op::ValSymbol => Ok(Value::Symbol(self.scanner.take_symbol()?)),
            Op::ValString => Ok(Value::String(self.scanner.take_string()?)),
            Op::ValInt => Ok(match self.scanner.take_int()? {
                WireInt::I64(i) => Value::Int(i),
                WireInt::Big(b) => Value::BigInt(b),
            }),
            Op::ValFloat32 => Ok(Value::Float32(self.scanner.take_float32()?)),
            Op::ValFloat64 => Ok(Value::Float64(self.scanner.take_float64()?)),
            Op::OpenList | Op::OpenSet => {
                let close = if op == Op::OpenList {
                    Op::CloseList
                } else {
                    Op::CloseSet
                };
                let mut items = Vec::new();
                loop {
                    let op = self.next_op()?;
                    if op == close {
                        return Ok(if close == Op::CloseList {
                            Value::List(items)
                        } else {
                            Value::Set(items)
                        });
                    }
                    self.reject_stray_close(op)?;
                    items.push(self.value_from_op(op)?);
                }
            }
            Op::OpenDict => {
                let mut pairs = Vec::new();
                while self.dict_key_start()? {
                    let key = Value::decode(self)?;
                    self.dict_value_start()?;
                    let val = Value::decode(self)?;
                    pairs.push((key, val));
                }
                Ok(Value::Dict(pairs))
            }
            Op::OpenRecord => Ok(Value::Record(self.read_record_body()?)),
            Op::NoOp => Err(SyrupError::Malformed("unexpected no-op".into())),
            Op::CloseList | Op::CloseDict | Op::CloseSet | Op::CloseRecord => Err(
                SyrupError::Malformed(format!("unbalanced {} op", wire_name(op))),
            ),
        }
    }
}

fn wire_name(op: Op) -> &'static str {
    match op {
        Op::NoOp => "no-op",
        Op::ValBool => "bool",
        Op::ValByteArr => "byte string",
        Op::ValSymbol => "symbol",
        Op::ValString => "string",
        Op::ValInt => "integer",
        Op::ValFloat32 => "float32",
        Op::ValFloat64 => "float64",
        Op::OpenList => "list",
        Op::OpenDict => "dict",
        Op::OpenSet => "set",
        Op::OpenRecord => "record",
        Op::CloseList => "close-list",
        Op::CloseDict => "close-dict",
        Op::CloseSet => "close-set",
        Op::CloseRecord => "close-record",
    }
}

/// A host type that can be reconstructed from the Syrup operation stream.
pub trait Decode: Sized {
    fn decode<E: Encoding, R: Read>(dec: &mut Decoder<E, R>) -> Result<Self, SyrupError>;
}

impl Decode for bool {
    fn decode<E: Encoding, R: Read>(dec: &mut Decoder<E, R>) -> Result<Self, SyrupError> {
        match dec.next_op()? {
            Op::ValBool => dec.scanner.take_bool(),
            op => Err(dec.mismatch(op, "bool")),
        }
    }
}

macro_rules! decode_signed {
    ($($t:ty),*) => {$(
        impl Decode for $t {
            fn decode<E: Encoding, R: Read>(
                dec: &mut Decoder<E, R>,
            ) -> Result<Self, SyrupError> {
                let i = dec.expect_i64(stringify!($t))?;
                <$t>::try_from(i).map_err(|_| dec.overflow("integer", stringify!($t)))
            }
        }
    )*};
}

decode_signed!(i8, i16, i32, i64, isize);

// Wire integers store into unsigned destinations by reinterpreting the
// signed 64-bit value as unsigned, then width-checking.
macro_rules! decode_unsigned {
    ($($t:ty),*) => {$(
        impl Decode for $t {
            fn decode<E: Encoding, R: Read>(
                dec: &mut Decoder<E, R>,
            ) -> Result<Self, SyrupError> {
                let u = dec.expect_i64(stringify!($t))? as u64;
                <$t>::try_from(u).map_err(|_| dec.overflow("integer", stringify!($t)))
            }
        }
    )*};
}

decode_unsigned!(u8, u16, u32, u64, usize);

impl Decode for f32 {
    fn decode<E: Encoding, R: Read>(dec: &mut Decoder<E, R>) -> Result<Self, SyrupError> {
        match dec.next_op()? {
            Op::ValFloat32 => dec.scanner.take_float32(),
            Op::ValFloat64 => {
                let f = dec.scanner.take_float64()?;
                if f != 0.0 && (f < -(f32::MAX as f64) || f > f32::MAX as f64) {
                    Err(dec.overflow("float64", "f32"))
                } else {
                    Ok(f as f32)
                }
            }
            op => Err(dec.mismatch(op, "f32")),
        }
    }
}

impl Decode for f64 {
    fn decode<E: Encoding, R: Read>(dec: &mut Decoder<E, R>) -> Result<Self, SyrupError> {
        match dec.next_op()? {
            Op::ValFloat64 => dec.scanner.take_float64(),
            Op::ValFloat32 => Ok(f64::from(dec.scanner.take_float32()?)),
            op => Err(dec.mismatch(op, "f64")),
        }
    }
}

impl Decode for String {
    fn decode<E: Encoding, R: Read>(dec: &mut Decoder<E, R>) -> Result<Self, SyrupError> {
        match dec.next_op()? {
            // A byte string stores into a string destination as UTF-8.
            Op::ValString | Op::ValByteArr => dec.scanner.take_string(),
            op => Err(dec.mismatch(op, "String")),
        }
    }
}

impl Decode for Symbol {
    fn decode<E: Encoding, R: Read>(dec: &mut Decoder<E, R>) -> Result<Self, SyrupError> {
        match dec.next_op()? {
            Op::ValSymbol => dec.scanner.take_symbol(),
            op => Err(dec.mismatch(op, "Symbol")),
        }
    }
}

impl Decode for Bytes {
    fn decode<E: Encoding, R: Read>(dec: &mut Decoder<E, R>) -> Result<Self, SyrupError> {
        match dec.next_op()? {
            // A string stores into a byte destination as its UTF-8 bytes.
            Op::ValByteArr | Op::ValString => dec.scanner.take_bytes(),
            op => Err(dec.mismatch(op, "Bytes")),
        }
    }
}

impl Decode for BigInt {
    fn decode<E: Encoding, R: Read>(dec: &mut Decoder<E, R>) -> Result<Self, SyrupError> {
        match dec.next_op()? {
            Op::ValInt => dec.scanner.take_big_int(),
            op => Err(dec.mismatch(op, "BigInt")),
        }
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn decode<E: Encoding, R: Read>(dec: &mut Decoder<E, R>) -> Result<Self, SyrupError> {
        let close = dec.open_sequence(type_name::<Self>())?;
        let mut out = Vec::new();
        loop {
            let op = dec.next_op()?;
            if op == close {
                return Ok(out);
            }
            dec.reject_stray_close(op)?;
            dec.push_back(op);
            out.push(T::decode(dec)?);
        }
    }
}

/// Fixed-length destinations keep the leading elements: extras are
/// consumed and dropped, a missing tail stays at the default.
impl<T: Decode + Default, const N: usize> Decode for [T; N] {
    fn decode<E: Encoding, R: Read>(dec: &mut Decoder<E, R>) -> Result<Self, SyrupError> {
        let close = dec.open_sequence(type_name::<Self>())?;
        let mut out: [T; N] = std::array::from_fn(|_| T::default());
        let mut i = 0;
        loop {
            let op = dec.next_op()?;
            if op == close {
                return Ok(out);
            }
            dec.reject_stray_close(op)?;
            dec.push_back(op);
            if i < N {
                out[i] = T::decode(dec)?;
                i += 1;
            } else {
                dec.skip_value()?;
            }
        }
    }
}

impl<T: Decode> Decode for Set<T> {
    fn decode<E: Encoding, R: Read>(dec: &mut Decoder<E, R>) -> Result<Self, SyrupError> {
        Ok(Set(Vec::decode(dec)?))
    }
}

impl<K, V, S> Decode for HashMap<K, V, S>
where
    K: Decode + Eq + Hash,
    V: Decode,
    S: BuildHasher + Default,
{
    fn decode<E: Encoding, R: Read>(dec: &mut Decoder<E, R>) -> Result<Self, SyrupError> {
        match dec.next_op()? {
            Op::OpenDict => {}
            op => return Err(dec.mismatch(op, type_name::<Self>())),
        }
        let mut out = HashMap::with_hasher(S::default());
        while dec.dict_key_start()? {
            let key = K::decode(dec)?;
            dec.dict_value_start()?;
            let val = V::decode(dec)?;
            out.insert(key, val);
        }
        Ok(out)
    }
}

impl<K, V> Decode for BTreeMap<K, V>
where
    K: Decode + Ord,
    V: Decode,
{
    fn decode<E: Encoding, R: Read>(dec: &mut Decoder<E, R>) -> Result<Self, SyrupError> {
        match dec.next_op()? {
            Op::OpenDict => {}
            op => return Err(dec.mismatch(op, type_name::<Self>())),
        }
        let mut out = BTreeMap::new();
        while dec.dict_key_start()? {
            let key = K::decode(dec)?;
            dec.dict_value_start()?;
            let val = V::decode(dec)?;
            out.insert(key, val);
        }
        Ok(out)
    }
}

impl Decode for Record {
    fn decode<E: Encoding, R: Read>(dec: &mut Decoder<E, R>) -> Result<Self, SyrupError> {
        match dec.next_op()? {
            Op::OpenRecord => dec.read_record_body(),
            op => Err(dec.mismatch(op, "Record")),
        }
    }
}

impl<T: Decode> Decode for Box<T> {
    fn decode<E: Encoding, R: Read>(dec: &mut Decoder<E, R>) -> Result<Self, SyrupError> {
        Ok(Box::new(T::decode(dec)?))
    }
}

impl Decode for Value {
    fn decode<E: Encoding, R: Read>(dec: &mut Decoder<E, R>) -> Result<Self, SyrupError> {
        let op = dec.next_op()?;
        dec.value_from_op(op)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{from_slice, to_vec};
    use crate::encoding::PrototypeEncoding;
    use crate::syrup_fields;
    use std::io::Cursor;

    #[test]
    fn decode_string() {
        let s: String = from_slice(b"13\"Hello, World!").unwrap();
        assert_eq!(s, "Hello, World!");
    }

    #[test]
    fn decode_integer_widths() {
        assert_eq!(from_slice::<i8>(b"i5e").unwrap(), 5);
        assert_eq!(from_slice::<i16>(b"i128e").unwrap(), 128);
        assert_eq!(from_slice::<i32>(b"i32768e").unwrap(), 32768);
        assert_eq!(from_slice::<i64>(b"i2147483648e").unwrap(), 2147483648);
        assert_eq!(from_slice::<isize>(b"i-919e").unwrap(), -919);
        assert_eq!(from_slice::<u8>(b"i5e").unwrap(), 5);
        assert_eq!(from_slice::<u16>(b"i128e").unwrap(), 128);
        assert_eq!(from_slice::<u32>(b"i32768e").unwrap(), 32768);
        assert_eq!(from_slice::<u64>(b"i2147483648e").unwrap(), 2147483648);
        assert_eq!(from_slice::<usize>(b"i919e").unwrap(), 919);
    }

    #[test]
    fn decode_signed_overflow() {
        let err = from_slice::<i8>(b"i300e").unwrap_err();
        assert!(matches!(err, SyrupError::Overflow { .. }));
    }

    #[test]
    fn decode_negative_into_unsigned_reinterprets() {
        // The signed wire value is reinterpreted as unsigned, then
        // width-checked: -5 fills the top of the 64-bit range but does not
        // fit in 8 bits.
        assert_eq!(from_slice::<u64>(b"i-5e").unwrap(), u64::MAX - 4);
        assert!(matches!(
            from_slice::<u8>(b"i-5e").unwrap_err(),
            SyrupError::Overflow { .. }
        ));
    }

    #[test]
    fn decode_big_int() {
        let want: BigInt = "92233720368547758070".parse().unwrap();
        assert_eq!(
            from_slice::<BigInt>(b"i92233720368547758070e").unwrap(),
            want
        );
        // A small wire integer widens into a big-integer destination.
        assert_eq!(from_slice::<BigInt>(b"i5e").unwrap(), BigInt::from(5));
        // A big wire integer does not fit a fixed-width destination.
        assert!(matches!(
            from_slice::<i64>(b"i92233720368547758070e").unwrap_err(),
            SyrupError::InvalidType { .. }
        ));
    }

    #[test]
    fn decode_bools() {
        assert!(from_slice::<bool>(b"t").unwrap());
        assert!(!from_slice::<bool>(b"f").unwrap());
    }

    #[test]
    fn decode_floats() {
        let mut input = vec![b'D'];
        input.extend_from_slice(&3.14159f64.to_be_bytes());
        assert_eq!(from_slice::<f64>(&input).unwrap(), 3.14159);

        let mut input = vec![b'F'];
        input.extend_from_slice(&3.14159f32.to_be_bytes());
        assert_eq!(from_slice::<f32>(&input).unwrap(), 3.14159f32);
        // Widening is always accepted.
        assert_eq!(from_slice::<f64>(&input).unwrap(), f64::from(3.14159f32));
    }

    #[test]
    fn decode_float_narrowing_overflow() {
        let mut input = vec![b'D'];
        input.extend_from_slice(&1e300f64.to_be_bytes());
        assert!(matches!(
            from_slice::<f32>(&input).unwrap_err(),
            SyrupError::Overflow { .. }
        ));
        // In-range narrowing is fine.
        let mut input = vec![b'D'];
        input.extend_from_slice(&0.5f64.to_be_bytes());
        assert_eq!(from_slice::<f32>(&input).unwrap(), 0.5f32);
    }

    #[test]
    fn decode_symbol() {
        assert_eq!(
            from_slice::<Symbol>(b"7'PtrToIt").unwrap(),
            Symbol::from("PtrToIt")
        );
        // A string does not store into a symbol destination.
        assert!(matches!(
            from_slice::<Symbol>(b"7\"PtrToIt").unwrap_err(),
            SyrupError::InvalidType { .. }
        ));
    }

    #[test]
    fn decode_byte_string() {
        let input: &[u8] = &[b'1', b'3', b':', 1, 1, 2, 3, 5, 8, 13, 8, 5, 3, 2, 1, 1];
        let b: Bytes = from_slice(input).unwrap();
        assert_eq!(&b[..], &[1, 1, 2, 3, 5, 8, 13, 8, 5, 3, 2, 1, 1]);
    }

    #[test]
    fn strings_and_bytes_cross_store() {
        let s: String = from_slice(b"5:Hello").unwrap();
        assert_eq!(s, "Hello");
        let b: Bytes = from_slice(b"5\"Hello").unwrap();
        assert_eq!(&b[..], b"Hello");
    }

    #[test]
    fn decode_string_list() {
        let v: Vec<String> = from_slice(b"[5\"Hello6\"World!]").unwrap();
        assert_eq!(v, vec!["Hello".to_string(), "World!".to_string()]);
    }

    #[test]
    fn decode_set() {
        let s: Set<Value> = from_slice(b"#5\"Helloi42e$").unwrap();
        assert_eq!(
            s,
            Set(vec![Value::from("Hello"), Value::Int(42)])
        );
        // A list stores into a set destination and vice versa.
        let s: Set<i64> = from_slice(b"[i1ei2e]").unwrap();
        assert_eq!(s, Set(vec![1, 2]));
        let v: Vec<i64> = from_slice(b"#i1ei2e$").unwrap();
        assert_eq!(v, vec![1, 2]);
    }

    #[test]
    fn decode_record() {
        let r: Record = from_slice(b"<6\"Napalmi-5e3'Yep5\"Hello>").unwrap();
        assert_eq!(
            r,
            Record::new(
                "Napalm",
                vec![
                    Value::Int(-5),
                    Value::Symbol(Symbol::from("Yep")),
                    Value::from("Hello"),
                ],
            )
        );
    }

    #[test]
    fn decode_label_only_record() {
        let r: Record = from_slice(b"<6\"Napalm>").unwrap();
        assert_eq!(r, Record::new("Napalm", vec![]));
    }

    #[test]
    fn decode_map_in_either_order() {
        for input in [
            b"{2\"ini2e11\"out of herei-99e}".as_slice(),
            b"{11\"out of herei-99e2\"ini2e}".as_slice(),
        ] {
            let m: HashMap<String, i64> = from_slice(input).unwrap();
            assert_eq!(m.len(), 2);
            assert_eq!(m["in"], 2);
            assert_eq!(m["out of here"], -99);
        }
    }

    #[test]
    fn decode_btree_map() {
        let m: BTreeMap<String, i64> = from_slice(b"{1\"bi2e1\"ai1e}").unwrap();
        assert_eq!(m.len(), 2);
        assert_eq!(m["a"], 1);
        assert_eq!(m["b"], 2);
    }

    #[test]
    fn decode_opaque_list() {
        let v: Value = from_slice(b"[5\"Helloi42e]").unwrap();
        assert_eq!(
            v,
            Value::List(vec![Value::from("Hello"), Value::Int(42)])
        );
    }

    #[test]
    fn decode_opaque_bytes_stay_bytes() {
        let v: Value = from_slice(b"[3\"stri5e3:1234:6789]").unwrap();
        assert_eq!(
            v,
            Value::List(vec![
                Value::from("str"),
                Value::Int(5),
                Value::Bytes(b"123".to_vec()),
                Value::Bytes(b"6789".to_vec()),
            ])
        );
    }

    #[test]
    fn decode_opaque_dict_and_record() {
        let v: Value = from_slice(b"{1\"ki1e}").unwrap();
        assert_eq!(
            v,
            Value::Dict(vec![(Value::from("k"), Value::Int(1))])
        );
        let v: Value = from_slice(b"<3'tagi1e>").unwrap();
        assert_eq!(
            v,
            Value::Record(Record::new(Symbol::from("tag"), vec![Value::Int(1)]))
        );
    }

    #[test]
    fn decode_empty_containers() {
        assert_eq!(from_slice::<Value>(b"[]").unwrap(), Value::List(vec![]));
        assert_eq!(from_slice::<Value>(b"#$").unwrap(), Value::Set(vec![]));
        assert_eq!(from_slice::<Value>(b"{}").unwrap(), Value::Dict(vec![]));
        let v: Vec<i64> = from_slice(b"[]").unwrap();
        assert!(v.is_empty());
    }

    #[test]
    fn decode_empty_strings_fast_path() {
        assert_eq!(from_slice::<String>(b"0\"").unwrap(), "");
        assert_eq!(from_slice::<Symbol>(b"0'").unwrap(), Symbol::from(""));
        let b: Bytes = from_slice(b"0:").unwrap();
        assert!(b.is_empty());
        // Followed by more content in the same stream.
        let v: Vec<String> = from_slice(b"[0\"5\"Hello]").unwrap();
        assert_eq!(v, vec![String::new(), "Hello".to_string()]);
    }

    #[test]
    fn decode_fixed_array_drops_extras() {
        let a: [String; 2] = from_slice(b"[5\"Hello7\"PtrToIt6\"World!]").unwrap();
        assert_eq!(a, ["Hello".to_string(), "PtrToIt".to_string()]);
    }

    #[test]
    fn decode_fixed_array_pads_missing_tail() {
        let a: [String; 5] = from_slice(b"[5\"Hello7\"PtrToIt6\"World!]").unwrap();
        assert_eq!(
            a,
            [
                "Hello".to_string(),
                "PtrToIt".to_string(),
                "World!".to_string(),
                String::new(),
                String::new(),
            ]
        );
    }

    #[test]
    fn decode_fixed_array_skips_container_extras() {
        let a: [i64; 1] = from_slice(b"[i1e[i2e{1\"ki3e}]i4e]").unwrap();
        assert_eq!(a, [1]);
    }

    #[test]
    fn whitespace_between_tokens_is_ignored() {
        let v: Vec<i64> = from_slice(b" [ i1e \t i2e \r\n ]").unwrap();
        assert_eq!(v, vec![1, 2]);
    }

    #[test]
    fn decode_whole_value_then_stops_reading() {
        let mut dec = Decoder::new(PrototypeEncoding, Cursor::new(b"i1ei2e".to_vec()));
        assert_eq!(dec.decode::<i64>().unwrap(), 1);
        assert_eq!(dec.decode::<i64>().unwrap(), 2);
        // A third decode hits end-of-input.
        assert!(matches!(
            dec.decode::<i64>().unwrap_err(),
            SyrupError::Io(_)
        ));
    }

    #[test]
    fn eof_mid_container_is_an_error() {
        let err = from_slice::<Value>(b"[5\"Hello").unwrap_err();
        assert!(matches!(err, SyrupError::Io(_)));
    }

    #[test]
    fn wrong_kind_reports_offset() {
        let err = from_slice::<bool>(b"i5e").unwrap_err();
        match err {
            SyrupError::InvalidType { wire, target, offset } => {
                assert_eq!(wire, "integer");
                assert_eq!(target, "bool");
                assert_eq!(offset, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn mismatched_close_is_malformed() {
        assert!(matches!(
            from_slice::<Value>(b"[i1e}").unwrap_err(),
            SyrupError::Malformed(_)
        ));
        assert!(matches!(
            from_slice::<Value>(b"]").unwrap_err(),
            SyrupError::Malformed(_)
        ));
    }

    #[test]
    fn dangling_dict_key_is_malformed() {
        assert!(matches!(
            from_slice::<HashMap<String, i64>>(b"{2\"in}").unwrap_err(),
            SyrupError::Malformed(_)
        ));
    }

    #[derive(Debug, Default, PartialEq)]
    struct Reading {
        id: i64,
        scale: f64,
        label: String,
    }

    syrup_fields!(Reading { id, scale, label });

    #[test]
    fn decode_struct_from_dict() {
        let mut input = b"{2\"idi-5e5\"scale".to_vec();
        input.extend_from_slice(&[b'D', 64, 9, 33, 249, 240, 27, 134, 110]);
        input.extend_from_slice(b"5\"label1\"x}");
        let r: Reading = from_slice(&input).unwrap();
        assert_eq!(
            r,
            Reading {
                id: -5,
                scale: 3.14159,
                label: "x".to_string(),
            }
        );
    }

    #[test]
    fn decode_struct_missing_fields_stay_default() {
        let r: Reading = from_slice(b"{2\"idi7e}").unwrap();
        assert_eq!(
            r,
            Reading {
                id: 7,
                scale: 0.0,
                label: String::new(),
            }
        );
    }

    #[test]
    fn decode_struct_skips_unknown_keys() {
        // The unknown keys carry a scalar and a nested container.
        let input =
            b"{7\"unknown[i1ei2e]2\"idi7e5\"extra{3\"abci1e}5\"label2\"ok}".to_vec();
        let r: Reading = from_slice(&input).unwrap();
        assert_eq!(
            r,
            Reading {
                id: 7,
                scale: 0.0,
                label: "ok".to_string(),
            }
        );
    }

    #[derive(Debug, Default, PartialEq)]
    struct Sensor {
        id: i64,
        name: String,
    }

    syrup_fields!(Sensor { id => "sensor-id", name });

    #[test]
    fn decode_struct_wire_name_override() {
        let s: Sensor = from_slice(b"{9\"sensor-idi7e4\"name4\"hall}").unwrap();
        assert_eq!(
            s,
            Sensor {
                id: 7,
                name: "hall".to_string(),
            }
        );
        // The Rust-side field name is not a wire name.
        let s: Sensor = from_slice(b"{2\"idi7e}").unwrap();
        assert_eq!(s, Sensor::default());
    }

    #[derive(Debug, Default, PartialEq)]
    struct Nested {
        inner: Reading,
        tag: Box<Sensor>,
    }

    syrup_fields!(Nested { inner, tag });

    #[test]
    fn decode_nested_structs() {
        let input = b"{5\"inner{2\"idi1e}3\"tag{4\"name1\"t}}".to_vec();
        let n: Nested = from_slice(&input).unwrap();
        assert_eq!(n.inner.id, 1);
        assert_eq!(n.tag.name, "t");
    }

    #[test]
    fn round_trip_struct() {
        let r = Reading {
            id: 42,
            scale: -0.25,
            label: "volts".to_string(),
        };
        let bytes = to_vec(&r).unwrap();
        assert_eq!(from_slice::<Reading>(&bytes).unwrap(), r);
    }

    #[test]
    fn round_trip_value_trees() {
        let values = [
            Value::Bool(true),
            Value::Int(i64::MIN),
            Value::BigInt("92233720368547758070".parse().unwrap()),
            Value::Float32(1.5),
            Value::Float64(-2.5),
            Value::String("hi".into()),
            Value::Bytes(vec![0, 1, 2]),
            Value::Symbol(Symbol::from("sym")),
            Value::List(vec![Value::Int(1), Value::List(vec![])]),
            Value::Set(vec![Value::from("a")]),
            Value::Dict(vec![(Value::Float64(0.5), Value::Bool(false))]),
            Value::Record(Record::new(Symbol::from("r"), vec![Value::Int(9)])),
        ];
        for v in values {
            let bytes = to_vec(&v).unwrap();
            assert_eq!(from_slice::<Value>(&bytes).unwrap(), v, "bytes {bytes:?}");
        }
    }

    #[test]
    fn signed_boundary_round_trips() {
        for i in [i64::MAX, i64::MIN, 0, -1] {
            let bytes = to_vec(&i).unwrap();
            assert_eq!(from_slice::<i64>(&bytes).unwrap(), i);
            assert_eq!(from_slice::<Value>(&bytes).unwrap(), Value::Int(i));
        }
        // One beyond the boundary becomes a big integer.
        let just_over: BigInt = BigInt::from(i64::MAX) + 1i64;
        let bytes = to_vec(&just_over).unwrap();
        assert_eq!(
            from_slice::<Value>(&bytes).unwrap(),
            Value::BigInt(just_over)
        );
    }
}

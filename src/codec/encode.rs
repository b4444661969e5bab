//! Syrup encoding: host values → bytes.

use std::collections::{BTreeMap, HashMap};
use std::io::Write;

use bytes::Bytes;
use num_bigint::BigInt;

use crate::encoding::Encoding;
use crate::error::SyrupError;
use crate::meta::StructFields;
use crate::types::{Record, Set, Symbol, Value};

/// Writes Syrup-encoded values through an encoding policy to a writer.
///
/// Not safe for concurrent use; callers encoding in parallel use distinct
/// instances.
pub struct Encoder<E, W> {
    encoding: E,
    writer: W,
}

impl<E: Encoding, W: Write> Encoder<E, W> {
    pub fn new(encoding: E, writer: W) -> Self {
        Self { encoding, writer }
    }

    /// Consumes the encoder, returning the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Encodes one value.
    pub fn encode<T: Encode + ?Sized>(&mut self, value: &T) -> Result<(), SyrupError> {
        value.encode(self)
    }

    fn write(&mut self, b: &[u8]) -> Result<(), SyrupError> {
        self.writer.write_all(b)?;
        Ok(())
    }

    // -- Scalar emitters, used by `Encode` implementations --

    pub fn emit_string(&mut self, s: &str) -> Result<(), SyrupError> {
        let b = self.encoding.fmt_string(s);
        self.write(&b)
    }

    pub fn emit_symbol(&mut self, s: &str) -> Result<(), SyrupError> {
        let b = self.encoding.fmt_symbol(s);
        self.write(&b)
    }

    pub fn emit_bytes(&mut self, payload: &[u8]) -> Result<(), SyrupError> {
        let b = self.encoding.fmt_bytes(payload);
        self.write(&b)
    }

    pub fn emit_int(&mut self, i: i64) -> Result<(), SyrupError> {
        let b = self.encoding.fmt_int(i);
        self.write(&b)
    }

    pub fn emit_uint(&mut self, u: u64) -> Result<(), SyrupError> {
        let b = self.encoding.fmt_uint(u);
        self.write(&b)
    }

    pub fn emit_big_int(&mut self, i: &BigInt) -> Result<(), SyrupError> {
        let b = self.encoding.fmt_big_int(i);
        self.write(&b)
    }

    pub fn emit_bool(&mut self, v: bool) -> Result<(), SyrupError> {
        let b = self.encoding.fmt_bool(v);
        self.write(&b)
    }

    pub fn emit_float32(&mut self, f: f32) -> Result<(), SyrupError> {
        let b = self.encoding.fmt_float32(f);
        self.write(&b)
    }

    pub fn emit_float64(&mut self, f: f64) -> Result<(), SyrupError> {
        let b = self.encoding.fmt_float64(f);
        self.write(&b)
    }

    // -- Container brackets --

    pub fn open_list(&mut self) -> Result<(), SyrupError> {
        let b = self.encoding.list_open();
        self.write(&b)
    }

    pub fn close_list(&mut self) -> Result<(), SyrupError> {
        let b = self.encoding.list_close();
        self.write(&b)
    }

    pub fn open_dict(&mut self) -> Result<(), SyrupError> {
        let b = self.encoding.dict_open();
        self.write(&b)
    }

    pub fn close_dict(&mut self) -> Result<(), SyrupError> {
        let b = self.encoding.dict_close();
        self.write(&b)
    }

    pub fn open_set(&mut self) -> Result<(), SyrupError> {
        let b = self.encoding.set_open();
        self.write(&b)
    }

    pub fn close_set(&mut self) -> Result<(), SyrupError> {
        let b = self.encoding.set_close();
        self.write(&b)
    }

    pub fn open_record(&mut self) -> Result<(), SyrupError> {
        let b = self.encoding.record_open();
        self.write(&b)
    }

    pub fn close_record(&mut self) -> Result<(), SyrupError> {
        let b = self.encoding.record_close();
        self.write(&b)
    }

    /// Encodes an aggregate as a dictionary of its described fields: each
    /// wire name as a Syrup string, followed by the field's value.
    pub fn encode_struct<T: StructFields>(&mut self, value: &T) -> Result<(), SyrupError> {
        self.open_dict()?;
        for (idx, name) in T::FIELDS.iter().enumerate() {
            self.emit_string(name)?;
            value.encode_field(idx, self)?;
        }
        self.close_dict()
    }
}

/// A host value with a Syrup wire representation.
pub trait Encode {
    fn encode<E: Encoding, W: Write>(&self, enc: &mut Encoder<E, W>) -> Result<(), SyrupError>;
}

impl Encode for bool {
    fn encode<E: Encoding, W: Write>(&self, enc: &mut Encoder<E, W>) -> Result<(), SyrupError> {
        enc.emit_bool(*self)
    }
}

macro_rules! encode_signed {
    ($($t:ty),*) => {$(
        impl Encode for $t {
            fn encode<E: Encoding, W: Write>(
                &self,
                enc: &mut Encoder<E, W>,
            ) -> Result<(), SyrupError> {
                enc.emit_int(*self as i64)
            }
        }
    )*};
}

encode_signed!(i8, i16, i32, i64, isize);

macro_rules! encode_unsigned {
    ($($t:ty),*) => {$(
        impl Encode for $t {
            fn encode<E: Encoding, W: Write>(
                &self,
                enc: &mut Encoder<E, W>,
            ) -> Result<(), SyrupError> {
                enc.emit_uint(*self as u64)
            }
        }
    )*};
}

encode_unsigned!(u8, u16, u32, u64, usize);

impl Encode for f32 {
    fn encode<E: Encoding, W: Write>(&self, enc: &mut Encoder<E, W>) -> Result<(), SyrupError> {
        enc.emit_float32(*self)
    }
}

impl Encode for f64 {
    fn encode<E: Encoding, W: Write>(&self, enc: &mut Encoder<E, W>) -> Result<(), SyrupError> {
        enc.emit_float64(*self)
    }
}

impl Encode for str {
    fn encode<E: Encoding, W: Write>(&self, enc: &mut Encoder<E, W>) -> Result<(), SyrupError> {
        enc.emit_string(self)
    }
}

impl Encode for String {
    fn encode<E: Encoding, W: Write>(&self, enc: &mut Encoder<E, W>) -> Result<(), SyrupError> {
        enc.emit_string(self)
    }
}

impl Encode for Symbol {
    fn encode<E: Encoding, W: Write>(&self, enc: &mut Encoder<E, W>) -> Result<(), SyrupError> {
        enc.emit_symbol(self)
    }
}

impl Encode for BigInt {
    fn encode<E: Encoding, W: Write>(&self, enc: &mut Encoder<E, W>) -> Result<(), SyrupError> {
        enc.emit_big_int(self)
    }
}

/// Byte strings. `Bytes` is the type hint that selects the byte-string
/// wire form; a plain `Vec<u8>` goes through the generic sequence
/// implementation and encodes as a list of integers.
impl Encode for Bytes {
    fn encode<E: Encoding, W: Write>(&self, enc: &mut Encoder<E, W>) -> Result<(), SyrupError> {
        enc.emit_bytes(self)
    }
}

impl<T: Encode> Encode for [T] {
    fn encode<E: Encoding, W: Write>(&self, enc: &mut Encoder<E, W>) -> Result<(), SyrupError> {
        enc.open_list()?;
        for item in self {
            item.encode(enc)?;
        }
        enc.close_list()
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn encode<E: Encoding, W: Write>(&self, enc: &mut Encoder<E, W>) -> Result<(), SyrupError> {
        self.as_slice().encode(enc)
    }
}

impl<T: Encode, const N: usize> Encode for [T; N] {
    fn encode<E: Encoding, W: Write>(&self, enc: &mut Encoder<E, W>) -> Result<(), SyrupError> {
        self.as_slice().encode(enc)
    }
}

impl<T: Encode> Encode for Set<T> {
    fn encode<E: Encoding, W: Write>(&self, enc: &mut Encoder<E, W>) -> Result<(), SyrupError> {
        enc.open_set()?;
        for item in &self.0 {
            item.encode(enc)?;
        }
        enc.close_set()
    }
}

impl<K: Encode, V: Encode, S> Encode for HashMap<K, V, S> {
    fn encode<E: Encoding, W: Write>(&self, enc: &mut Encoder<E, W>) -> Result<(), SyrupError> {
        enc.open_dict()?;
        for (k, v) in self {
            k.encode(enc)?;
            v.encode(enc)?;
        }
        enc.close_dict()
    }
}

impl<K: Encode, V: Encode> Encode for BTreeMap<K, V> {
    fn encode<E: Encoding, W: Write>(&self, enc: &mut Encoder<E, W>) -> Result<(), SyrupError> {
        enc.open_dict()?;
        for (k, v) in self {
            k.encode(enc)?;
            v.encode(enc)?;
        }
        enc.close_dict()
    }
}

impl Encode for Record {
    fn encode<E: Encoding, W: Write>(&self, enc: &mut Encoder<E, W>) -> Result<(), SyrupError> {
        enc.open_record()?;
        self.label.encode(enc)?;
        for v in &self.values {
            v.encode(enc)?;
        }
        enc.close_record()
    }
}

/// An absent value has no wire representation; only `Some` encodes.
impl<T: Encode> Encode for Option<T> {
    fn encode<E: Encoding, W: Write>(&self, enc: &mut Encoder<E, W>) -> Result<(), SyrupError> {
        match self {
            Some(v) => v.encode(enc),
            None => Err(SyrupError::MissingValue(std::any::type_name::<T>())),
        }
    }
}

impl<T: Encode + ?Sized> Encode for &T {
    fn encode<E: Encoding, W: Write>(&self, enc: &mut Encoder<E, W>) -> Result<(), SyrupError> {
        (**self).encode(enc)
    }
}

impl<T: Encode + ?Sized> Encode for Box<T> {
    fn encode<E: Encoding, W: Write>(&self, enc: &mut Encoder<E, W>) -> Result<(), SyrupError> {
        (**self).encode(enc)
    }
}

impl Encode for Value {
    fn encode<E: Encoding, W: Write>(&self, enc: &mut Encoder<E, W>) -> Result<(), SyrupError> {
        match self {
            Value::Bool(b) => enc.emit_bool(*b),
            Value::Int(i) => enc.emit_int(*i),
            Value::BigInt(i) => enc.emit_big_int(i),
            Value::Float32(f) => enc.emit_float32(*f),
            Value::Float64(f) => enc.emit_float64(*f),
            Value::String(s) => enc.emit_string(s),
            Value::Bytes(b) => enc.emit_bytes(b),
            Value::Symbol(s) => enc.emit_symbol(s),
            Value::List(items) => {
                enc.open_list()?;
                for item in items {
                    item.encode(enc)?;
                }
                enc.close_list()
            }
            Value::Set(items) => {
                enc.open_set()?;
                for item in items {
                    item.encode(enc)?;
                }
                enc.close_set()
            }
            Value::Dict(pairs) => {
                enc.open_dict()?;
                for (k, v) in pairs {
                    k.encode(enc)?;
                    v.encode(enc)?;
                }
                enc.close_dict()
            }
            Value::Record(r) => r.encode(enc),
        }
    }
}

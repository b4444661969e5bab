//! Per-aggregate field metadata and its process-wide cache.
//!
//! Rust offers no runtime field reflection, so aggregates describe
//! themselves through the [`StructFields`] descriptor trait (usually
//! generated by [`syrup_fields!`](crate::syrup_fields)). The cache maps a
//! concrete type to the name→position index built from that descriptor,
//! with load-or-store publication: concurrent first use of a type builds
//! outside the lock and the first insert wins.

use std::any::TypeId;
use std::collections::HashMap;
use std::io::{Read, Write};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use crate::codec::{Decoder, Encoder};
use crate::encoding::Encoding;
use crate::error::SyrupError;

/// Describes how an aggregate maps to a Syrup dictionary.
///
/// `FIELDS` lists the wire names of the encoded fields in declaration
/// order; a field whose wire name differs from its Rust name is the rename
/// case. `encode_field`/`decode_field` address fields by their position in
/// `FIELDS`.
pub trait StructFields {
    /// Wire names of the encoded fields, in declaration order.
    const FIELDS: &'static [&'static str];

    /// Encodes the field at `idx` through the encoder.
    fn encode_field<E: Encoding, W: Write>(
        &self,
        idx: usize,
        enc: &mut Encoder<E, W>,
    ) -> Result<(), SyrupError>;

    /// Decodes one value from the decoder into the field at `idx`.
    fn decode_field<E: Encoding, R: Read>(
        &mut self,
        idx: usize,
        dec: &mut Decoder<E, R>,
    ) -> Result<(), SyrupError>;
}

/// Cached per-type field metadata: the ordered wire-name list plus the
/// name→position index. Immutable after publication.
#[derive(Debug)]
pub struct StructMetadata {
    fields: &'static [&'static str],
    by_name: HashMap<&'static str, usize>,
}

impl StructMetadata {
    fn build(fields: &'static [&'static str]) -> Self {
        let by_name = fields
            .iter()
            .enumerate()
            .map(|(idx, name)| (*name, idx))
            .collect();
        Self { fields, by_name }
    }

    /// Wire names in declaration order.
    pub fn fields(&self) -> &'static [&'static str] {
        self.fields
    }

    /// Position of a wire name, if the aggregate has such a field.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }
}

type Cache = RwLock<HashMap<TypeId, Arc<StructMetadata>>>;

fn cache() -> &'static Cache {
    static CACHE: OnceLock<Cache> = OnceLock::new();
    CACHE.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Returns the cached metadata for `T`, building it on first use.
pub fn metadata<T: StructFields + 'static>() -> Arc<StructMetadata> {
    let key = TypeId::of::<T>();
    {
        let map = cache().read().unwrap_or_else(PoisonError::into_inner);
        if let Some(m) = map.get(&key) {
            return Arc::clone(m);
        }
    }
    let built = Arc::new(StructMetadata::build(T::FIELDS));
    let mut map = cache().write().unwrap_or_else(PoisonError::into_inner);
    Arc::clone(map.entry(key).or_insert(built))
}

/// Implements [`StructFields`], [`Encode`](crate::codec::Encode), and
/// [`Decode`](crate::codec::Decode) for a struct, mapping it to a Syrup
/// dictionary of its listed fields.
///
/// Fields not listed are skipped on encode and left at their default on
/// decode. A `field => "wire-name"` entry overrides the dictionary key on
/// both sides. The struct must implement `Default` for decoding.
///
/// ```
/// use syrupr::syrup_fields;
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Reading {
///     sensor: String,
///     celsius: f64,
/// }
///
/// syrup_fields!(Reading { sensor => "sensor-id", celsius });
/// ```
#[macro_export]
macro_rules! syrup_fields {
    ($ty:ty { $($field:ident $(=> $wire:literal)?),* $(,)? }) => {
        impl $crate::meta::StructFields for $ty {
            const FIELDS: &'static [&'static str] =
                &[$($crate::__syrup_field_name!($field $(=> $wire)?)),*];

            fn encode_field<E, W>(
                &self,
                idx: usize,
                enc: &mut $crate::codec::Encoder<E, W>,
            ) -> ::std::result::Result<(), $crate::error::SyrupError>
            where
                E: $crate::encoding::Encoding,
                W: ::std::io::Write,
            {
                let mut pos = 0usize;
                $(
                    if idx == pos {
                        return enc.encode(&self.$field);
                    }
                    pos += 1;
                )*
                let _ = pos;
                Err($crate::error::SyrupError::Malformed(format!(
                    "field index {idx} out of range"
                )))
            }

            fn decode_field<E, R>(
                &mut self,
                idx: usize,
                dec: &mut $crate::codec::Decoder<E, R>,
            ) -> ::std::result::Result<(), $crate::error::SyrupError>
            where
                E: $crate::encoding::Encoding,
                R: ::std::io::Read,
            {
                let mut pos = 0usize;
                $(
                    if idx == pos {
                        self.$field = dec.decode()?;
                        return Ok(());
                    }
                    pos += 1;
                )*
                let _ = pos;
                Err($crate::error::SyrupError::Malformed(format!(
                    "field index {idx} out of range"
                )))
            }
        }

        impl $crate::codec::Encode for $ty {
            fn encode<E, W>(
                &self,
                enc: &mut $crate::codec::Encoder<E, W>,
            ) -> ::std::result::Result<(), $crate::error::SyrupError>
            where
                E: $crate::encoding::Encoding,
                W: ::std::io::Write,
            {
                enc.encode_struct(self)
            }
        }

        impl $crate::codec::Decode for $ty {
            fn decode<E, R>(
                dec: &mut $crate::codec::Decoder<E, R>,
            ) -> ::std::result::Result<Self, $crate::error::SyrupError>
            where
                E: $crate::encoding::Encoding,
                R: ::std::io::Read,
            {
                dec.read_struct()
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __syrup_field_name {
    ($field:ident) => {
        stringify!($field)
    };
    ($field:ident => $wire:literal) => {
        $wire
    };
}

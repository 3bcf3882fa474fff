//! Canonical binary encoding for everything that crosses the runtime
//! boundary or lands in storage.
//!
//! Encoding format:
//! - Fixed-width integers are little-endian, written directly
//! - Fixed-size byte arrays (hashes, keys, signatures) are written raw
//! - Sequences, byte strings and strings are prefixed with a compact length
//! - `Option<T>`: 1-byte flag (0=None, 1=Some) followed by the value
//! - `Result<T, E>`: 1-byte tag (0=Ok, 1=Err) followed by the payload
//! - Enums: 1-byte discriminant matching the wire tag, then the fields
//!
//! Compact integers use the two low bits of the first byte as a mode:
//! `00` single byte (values < 2^6), `01` two bytes (< 2^14), `10` four
//! bytes (< 2^30), `11` big-integer mode where the upper six bits hold
//! `byte_len - 4`. Decoding rejects any value that would fit a shorter
//! mode, so every value has exactly one encoding.

use alloc::string::String;
use alloc::vec::Vec;
use crate::error::CodecError;

/// A cursor for reading bytes during decoding.
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        if n > self.remaining() {
            return Err(CodecError::UnexpectedEof);
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> Result<u8, CodecError> {
        let bytes = self.read_bytes(1)?;
        Ok(bytes[0])
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let bytes = self.read_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    pub fn read_u16(&mut self) -> Result<u16, CodecError> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32, CodecError> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_u64(&mut self) -> Result<u64, CodecError> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    pub fn read_bool(&mut self) -> Result<bool, CodecError> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(CodecError::InvalidBool(other)),
        }
    }

    /// Read a compact integer, rejecting non-minimal encodings.
    pub fn read_compact(&mut self) -> Result<u64, CodecError> {
        let first = self.read_u8()?;
        match first & 0b11 {
            0b00 => Ok(u64::from(first >> 2)),
            0b01 => {
                let second = self.read_u8()?;
                let value = u64::from(u16::from_le_bytes([first, second]) >> 2);
                if value < 1 << 6 {
                    return Err(CodecError::NonCanonicalCompact);
                }
                Ok(value)
            }
            0b10 => {
                let rest = self.read_array::<3>()?;
                let value = u64::from(u32::from_le_bytes([first, rest[0], rest[1], rest[2]]) >> 2);
                if value < 1 << 14 {
                    return Err(CodecError::NonCanonicalCompact);
                }
                Ok(value)
            }
            _ => {
                let len = usize::from(first >> 2) + 4;
                if len > 8 {
                    return Err(CodecError::CompactOverflow);
                }
                let bytes = self.read_bytes(len)?;
                let mut buf = [0u8; 8];
                buf[..len].copy_from_slice(bytes);
                let value = u64::from_le_bytes(buf);
                if bytes[len - 1] == 0 || value < 1 << 30 {
                    return Err(CodecError::NonCanonicalCompact);
                }
                Ok(value)
            }
        }
    }

    /// Read a compact length prefix.
    pub fn read_len(&mut self) -> Result<usize, CodecError> {
        usize::try_from(self.read_compact()?).map_err(|_| CodecError::CompactOverflow)
    }
}

// ── Encoding helpers ──

/// Append the compact encoding of `value`.
pub fn write_compact(buf: &mut Vec<u8>, value: u64) {
    match value {
        0..=0x3f => buf.push((value as u8) << 2),
        0x40..=0x3fff => buf.extend_from_slice(&(((value as u16) << 2) | 0b01).to_le_bytes()),
        0x4000..=0x3fff_ffff => {
            buf.extend_from_slice(&(((value as u32) << 2) | 0b10).to_le_bytes())
        }
        _ => {
            let len = 8 - (value.leading_zeros() / 8) as usize;
            buf.push((((len - 4) as u8) << 2) | 0b11);
            buf.extend_from_slice(&value.to_le_bytes()[..len]);
        }
    }
}

fn write_len(buf: &mut Vec<u8>, len: usize) {
    write_compact(buf, len as u64);
}

// ── Traits ──

/// Types with a single canonical byte encoding.
pub trait Encode {
    /// Append the encoding of `self` to `dest`.
    fn encode_to(&self, dest: &mut Vec<u8>);

    fn encode(&self) -> Vec<u8> {
        let mut dest = Vec::new();
        self.encode_to(&mut dest);
        dest
    }
}

/// Types that can be rebuilt from their canonical encoding.
pub trait Decode: Sized {
    fn decode(input: &mut Reader<'_>) -> Result<Self, CodecError>;
}

/// Decode a value that must occupy the whole of `data`.
pub fn decode_all<T: Decode>(data: &[u8]) -> Result<T, CodecError> {
    let mut reader = Reader::new(data);
    let value = T::decode(&mut reader)?;
    match reader.remaining() {
        0 => Ok(value),
        n => Err(CodecError::TrailingBytes(n)),
    }
}

/// Compact-encoded integer wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Compact<T>(pub T);

impl Encode for Compact<u64> {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        write_compact(dest, self.0);
    }
}

impl Decode for Compact<u64> {
    fn decode(input: &mut Reader<'_>) -> Result<Self, CodecError> {
        input.read_compact().map(Compact)
    }
}

impl Encode for Compact<u32> {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        write_compact(dest, u64::from(self.0));
    }
}

impl Decode for Compact<u32> {
    fn decode(input: &mut Reader<'_>) -> Result<Self, CodecError> {
        let value = input.read_compact()?;
        u32::try_from(value)
            .map(Compact)
            .map_err(|_| CodecError::CompactOverflow)
    }
}

// ── Primitive impls ──

impl Encode for () {
    fn encode_to(&self, _dest: &mut Vec<u8>) {}
}

impl Decode for () {
    fn decode(_input: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(())
    }
}

impl Encode for bool {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        dest.push(u8::from(*self));
    }
}

impl Decode for bool {
    fn decode(input: &mut Reader<'_>) -> Result<Self, CodecError> {
        input.read_bool()
    }
}

macro_rules! impl_fixed_int {
    ($($ty:ty => $read:ident),* $(,)?) => {
        $(
            impl Encode for $ty {
                fn encode_to(&self, dest: &mut Vec<u8>) {
                    dest.extend_from_slice(&self.to_le_bytes());
                }
            }

            impl Decode for $ty {
                fn decode(input: &mut Reader<'_>) -> Result<Self, CodecError> {
                    input.$read()
                }
            }
        )*
    };
}

impl_fixed_int!(u8 => read_u8, u16 => read_u16, u32 => read_u32, u64 => read_u64);

impl<const N: usize> Encode for [u8; N] {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        dest.extend_from_slice(self);
    }
}

impl<const N: usize> Decode for [u8; N] {
    fn decode(input: &mut Reader<'_>) -> Result<Self, CodecError> {
        input.read_array()
    }
}

impl<T: Encode + ?Sized> Encode for &T {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        (**self).encode_to(dest);
    }
}

impl<T: Encode> Encode for [T] {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        write_len(dest, self.len());
        for item in self {
            item.encode_to(dest);
        }
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        self.as_slice().encode_to(dest);
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn decode(input: &mut Reader<'_>) -> Result<Self, CodecError> {
        let len = input.read_len()?;
        // Never trust the prefix for the allocation size.
        let mut out = Vec::with_capacity(len.min(input.remaining()));
        for _ in 0..len {
            out.push(T::decode(input)?);
        }
        Ok(out)
    }
}

impl Encode for str {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        write_len(dest, self.len());
        dest.extend_from_slice(self.as_bytes());
    }
}

impl Encode for String {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        self.as_str().encode_to(dest);
    }
}

impl Decode for String {
    fn decode(input: &mut Reader<'_>) -> Result<Self, CodecError> {
        let len = input.read_len()?;
        let bytes = input.read_bytes(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| CodecError::InvalidUtf8)
    }
}

impl<T: Encode> Encode for Option<T> {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        match self {
            None => dest.push(0),
            Some(value) => {
                dest.push(1);
                value.encode_to(dest);
            }
        }
    }
}

impl<T: Decode> Decode for Option<T> {
    fn decode(input: &mut Reader<'_>) -> Result<Self, CodecError> {
        match input.read_u8()? {
            0 => Ok(None),
            1 => Ok(Some(T::decode(input)?)),
            tag => Err(CodecError::InvalidTag { what: "Option", tag }),
        }
    }
}

impl<T: Encode, E: Encode> Encode for Result<T, E> {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        match self {
            Ok(value) => {
                dest.push(0);
                value.encode_to(dest);
            }
            Err(err) => {
                dest.push(1);
                err.encode_to(dest);
            }
        }
    }
}

impl<T: Decode, E: Decode> Decode for Result<T, E> {
    fn decode(input: &mut Reader<'_>) -> Result<Self, CodecError> {
        match input.read_u8()? {
            0 => Ok(Ok(T::decode(input)?)),
            1 => Ok(Err(E::decode(input)?)),
            tag => Err(CodecError::InvalidTag { what: "Result", tag }),
        }
    }
}

macro_rules! impl_tuple {
    ($($name:ident),+) => {
        impl<$($name: Encode),+> Encode for ($($name,)+) {
            #[allow(non_snake_case)]
            fn encode_to(&self, dest: &mut Vec<u8>) {
                let ($($name,)+) = self;
                $($name.encode_to(dest);)+
            }
        }

        impl<$($name: Decode),+> Decode for ($($name,)+) {
            fn decode(input: &mut Reader<'_>) -> Result<Self, CodecError> {
                Ok(($($name::decode(input)?,)+))
            }
        }
    };
}

impl_tuple!(A, B);
impl_tuple!(A, B, C);

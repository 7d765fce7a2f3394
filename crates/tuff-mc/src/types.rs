//! Wire types.
//!
//! Fixed-width types are big-endian. `VarInt`/`VarLong` use the 7-bit group
//! encoding from [`crate::varint`]. Strings are `[VarInt length][UTF-8 bytes]`.
//! [`Json`] carries a structured value as a JSON document inside a string.

use std::f64::consts::PI;
use std::ops::{Deref, DerefMut};

use byteorder::{BigEndian, ReadBytesExt};
use bytes::{Buf, BufMut};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{ProtocolError, Result};
use crate::packets::traits::{Readable, Writable};
use crate::varint::{
    read_varint_from_buf, read_varlong_from_buf, write_varint_to_buf, write_varlong_to_buf,
};

/// Maximum string length in characters (vanilla limit).
pub const MAX_STRING_LENGTH: usize = 32767;

/// Maximum bytes a UTF-8 character can take.
const MAX_BYTES_PER_CHAR: usize = 4;

macro_rules! fixed_width {
    ($($ty:ty => $read:ident, $put:ident;)*) => {
        $(
            impl Readable for $ty {
                fn read(buf: &mut impl Buf) -> Result<Self> {
                    Ok(Buf::reader(buf).$read::<BigEndian>()?)
                }
            }

            impl Writable for $ty {
                fn write(&self, buf: &mut impl BufMut) -> Result<()> {
                    buf.$put(*self);
                    Ok(())
                }
            }
        )*
    };
}

fixed_width! {
    i16 => read_i16, put_i16;
    u16 => read_u16, put_u16;
    i32 => read_i32, put_i32;
    i64 => read_i64, put_i64;
    u64 => read_u64, put_u64;
    f32 => read_f32, put_f32;
    f64 => read_f64, put_f64;
}

impl Readable for u8 {
    fn read(buf: &mut impl Buf) -> Result<Self> {
        Ok(Buf::reader(buf).read_u8()?)
    }
}

impl Writable for u8 {
    fn write(&self, buf: &mut impl BufMut) -> Result<()> {
        buf.put_u8(*self);
        Ok(())
    }
}

impl Readable for i8 {
    fn read(buf: &mut impl Buf) -> Result<Self> {
        Ok(Buf::reader(buf).read_i8()?)
    }
}

impl Writable for i8 {
    fn write(&self, buf: &mut impl BufMut) -> Result<()> {
        buf.put_i8(*self);
        Ok(())
    }
}

impl Readable for bool {
    fn read(buf: &mut impl Buf) -> Result<Self> {
        Ok(u8::read(buf)? != 0)
    }
}

impl Writable for bool {
    fn write(&self, buf: &mut impl BufMut) -> Result<()> {
        buf.put_u8(u8::from(*self));
        Ok(())
    }
}

/// A 32-bit integer in variable-length encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarInt(pub i32);

impl From<i32> for VarInt {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

impl Readable for VarInt {
    fn read(buf: &mut impl Buf) -> Result<Self> {
        read_varint_from_buf(buf).map(Self)
    }
}

impl Writable for VarInt {
    fn write(&self, buf: &mut impl BufMut) -> Result<()> {
        write_varint_to_buf(buf, self.0);
        Ok(())
    }
}

/// A 64-bit integer in variable-length encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarLong(pub i64);

impl From<i64> for VarLong {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl Readable for VarLong {
    fn read(buf: &mut impl Buf) -> Result<Self> {
        read_varlong_from_buf(buf).map(Self)
    }
}

impl Writable for VarLong {
    fn write(&self, buf: &mut impl BufMut) -> Result<()> {
        write_varlong_to_buf(buf, self.0);
        Ok(())
    }
}

impl Readable for String {
    fn read(buf: &mut impl Buf) -> Result<Self> {
        read_string(buf, MAX_STRING_LENGTH)
    }
}

impl Writable for String {
    fn write(&self, buf: &mut impl BufMut) -> Result<()> {
        write_string(buf, self)
    }
}

/// Read a string of at most `max_len` characters.
///
/// # Errors
///
/// Returns an error if the declared length is negative or too long, the
/// buffer runs out, or the bytes are not UTF-8.
pub fn read_string(buf: &mut impl Buf, max_len: usize) -> Result<String> {
    let max = max_len * MAX_BYTES_PER_CHAR;
    let len = read_varint_from_buf(buf)?;

    let len = usize::try_from(len).map_err(|_| ProtocolError::StringTooLong { len: 0, max })?;
    if len > max {
        return Err(ProtocolError::StringTooLong { len, max });
    }

    if buf.remaining() < len {
        return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof).into());
    }

    let mut bytes = vec![0u8; len];
    buf.copy_to_slice(&mut bytes);

    String::from_utf8(bytes)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()).into())
}

/// Write a string with its `VarInt` length prefix.
///
/// # Errors
///
/// Returns an error if the string is longer than the protocol allows.
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub fn write_string(buf: &mut impl BufMut, s: &str) -> Result<()> {
    let bytes = s.as_bytes();
    let max = MAX_STRING_LENGTH * MAX_BYTES_PER_CHAR;
    if bytes.len() > max {
        return Err(ProtocolError::StringTooLong {
            len: bytes.len(),
            max,
        });
    }

    write_varint_to_buf(buf, bytes.len() as i32);
    buf.put_slice(bytes);
    Ok(())
}

/// A block position packed into one 64-bit word.
///
/// Bit layout, most significant first: 26 bits X, 12 bits Y, 26 bits Z.
/// Components are two's complement and sign-extended on access.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Position(pub u64);

impl Position {
    const XZ_MASK: u64 = 0x3FF_FFFF;
    const Y_MASK: u64 = 0xFFF;

    /// Pack three coordinates.
    ///
    /// X and Z keep their low 26 bits, Y its low 12 bits.
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        let x = (x as i64 as u64) & Self::XZ_MASK;
        let y = (y as i64 as u64) & Self::Y_MASK;
        let z = (z as i64 as u64) & Self::XZ_MASK;
        Self((x << 38) | (y << 26) | z)
    }

    /// The X coordinate.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub const fn x(self) -> i32 {
        ((self.0 as i64) >> 38) as i32
    }

    /// The Y coordinate.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub const fn y(self) -> i32 {
        (((self.0 as i64) << 26) >> 52) as i32
    }

    /// The Z coordinate.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub const fn z(self) -> i32 {
        (((self.0 as i64) << 38) >> 38) as i32
    }

    /// All three coordinates as `(x, y, z)`.
    #[must_use]
    pub const fn decompose(self) -> (i32, i32, i32) {
        (self.x(), self.y(), self.z())
    }
}

impl Readable for Position {
    fn read(buf: &mut impl Buf) -> Result<Self> {
        u64::read(buf).map(Self)
    }
}

impl Writable for Position {
    fn write(&self, buf: &mut impl BufMut) -> Result<()> {
        self.0.write(buf)
    }
}

/// A rotation in steps of 1/256 of a full turn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Angle(pub u8);

impl Angle {
    /// Quantize an angle in degrees. Any real input wraps into one turn.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_degrees(degrees: f64) -> Self {
        Self((degrees * 256.0 / 360.0).rem_euclid(256.0) as u8)
    }

    /// Quantize an angle in radians. Any real input wraps into one turn.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_radians(radians: f64) -> Self {
        Self((radians * 256.0 / (2.0 * PI)).rem_euclid(256.0) as u8)
    }

    /// The angle in degrees, in `[0, 360)`.
    #[must_use]
    pub fn degrees(self) -> f64 {
        f64::from(self.0) * 360.0 / 256.0
    }

    /// The angle in radians, in `[0, 2π)`.
    #[must_use]
    pub fn radians(self) -> f64 {
        f64::from(self.0) * 2.0 * PI / 256.0
    }
}

impl Readable for Angle {
    fn read(buf: &mut impl Buf) -> Result<Self> {
        u8::read(buf).map(Self)
    }
}

impl Writable for Angle {
    fn write(&self, buf: &mut impl BufMut) -> Result<()> {
        self.0.write(buf)
    }
}

/// A structured value carried as a length-prefixed JSON document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Json<T>(pub T);

impl<T> Deref for Json<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> DerefMut for Json<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

impl<T: DeserializeOwned> Readable for Json<T> {
    fn read(buf: &mut impl Buf) -> Result<Self> {
        let document = read_string(buf, MAX_STRING_LENGTH)?;
        Ok(Self(serde_json::from_str(&document)?))
    }
}

impl<T: Serialize> Writable for Json<T> {
    fn write(&self, buf: &mut impl BufMut) -> Result<()> {
        let document = serde_json::to_string(&self.0)?;
        write_string(buf, &document)
    }
}

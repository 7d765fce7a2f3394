//! `VarInt` and `VarLong` encoding/decoding.
//!
//! Each byte carries 7 bits of data, least significant group first, and
//! uses the high bit to indicate that more bytes follow. Negative values
//! are encoded from their two's complement bit pattern, so they always use
//! the maximum number of groups.

use bytes::{Buf, BufMut};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::{ProtocolError, Result};

/// Segment bits mask (lower 7 bits).
const SEGMENT_BITS: u8 = 0x7F;

/// Continue bit (high bit).
const CONTINUE_BIT: u8 = 0x80;

/// Maximum number of bytes in a `VarInt`.
pub const MAX_VARINT_LEN: u32 = 5;

/// Maximum number of bytes in a `VarLong`.
pub const MAX_VARLONG_LEN: u32 = 10;

/// Read a `VarInt` from an async reader.
///
/// # Errors
///
/// Returns an error if:
/// - An I/O error occurs
/// - The `VarInt` is longer than 5 bytes
#[allow(clippy::cast_possible_wrap)]
pub async fn read_varint<R: AsyncRead + Unpin>(reader: &mut R) -> Result<i32> {
    let mut value: u32 = 0;
    let mut num_read: u32 = 0;

    loop {
        let byte = reader.read_u8().await?;
        if num_read == MAX_VARINT_LEN {
            return Err(ProtocolError::VarIntTooBig);
        }

        value |= u32::from(byte & SEGMENT_BITS) << (7 * num_read);
        num_read += 1;

        if byte & CONTINUE_BIT == 0 {
            break;
        }
    }

    Ok(value as i32)
}

/// Read a `VarInt` from a buffer.
///
/// # Errors
///
/// Returns an error if the buffer runs out or the `VarInt` is longer than
/// 5 bytes.
#[allow(clippy::cast_possible_wrap)]
pub fn read_varint_from_buf(buf: &mut impl Buf) -> Result<i32> {
    let mut value: u32 = 0;
    let mut num_read: u32 = 0;

    loop {
        let byte = next_byte(buf)?;
        if num_read == MAX_VARINT_LEN {
            return Err(ProtocolError::VarIntTooBig);
        }

        value |= u32::from(byte & SEGMENT_BITS) << (7 * num_read);
        num_read += 1;

        if byte & CONTINUE_BIT == 0 {
            break;
        }
    }

    Ok(value as i32)
}

/// Write a `VarInt` to a buffer.
///
/// Returns the number of bytes written.
#[allow(clippy::cast_sign_loss)]
pub fn write_varint_to_buf(buf: &mut impl BufMut, value: i32) -> usize {
    let mut value = value as u32;
    let mut bytes_written = 0;

    loop {
        #[allow(clippy::cast_possible_truncation)]
        let mut byte = (value & u32::from(SEGMENT_BITS)) as u8;
        value >>= 7;

        if value != 0 {
            byte |= CONTINUE_BIT;
        }

        buf.put_u8(byte);
        bytes_written += 1;

        if value == 0 {
            break;
        }
    }

    bytes_written
}

/// Read a `VarLong` from a buffer.
///
/// # Errors
///
/// Returns an error if the buffer runs out or the `VarLong` is longer than
/// 10 bytes.
#[allow(clippy::cast_possible_wrap)]
pub fn read_varlong_from_buf(buf: &mut impl Buf) -> Result<i64> {
    let mut value: u64 = 0;
    let mut num_read: u32 = 0;

    loop {
        let byte = next_byte(buf)?;
        if num_read == MAX_VARLONG_LEN {
            return Err(ProtocolError::VarLongTooBig);
        }

        value |= u64::from(byte & SEGMENT_BITS) << (7 * num_read);
        num_read += 1;

        if byte & CONTINUE_BIT == 0 {
            break;
        }
    }

    Ok(value as i64)
}

/// Write a `VarLong` to a buffer.
///
/// Zero is written as a single zero byte; every other value loops until
/// the remaining bits are exhausted.
///
/// Returns the number of bytes written.
#[allow(clippy::cast_sign_loss)]
pub fn write_varlong_to_buf(buf: &mut impl BufMut, value: i64) -> usize {
    let mut value = value as u64;

    if value == 0 {
        buf.put_u8(0);
        return 1;
    }

    let mut bytes_written = 0;
    while value != 0 {
        #[allow(clippy::cast_possible_truncation)]
        let mut byte = (value & u64::from(SEGMENT_BITS)) as u8;
        value >>= 7;

        if value != 0 {
            byte |= CONTINUE_BIT;
        }

        buf.put_u8(byte);
        bytes_written += 1;
    }

    bytes_written
}

/// Calculate the number of bytes needed to encode a `VarInt`.
#[must_use]
#[allow(clippy::cast_sign_loss)]
pub const fn varint_len(value: i32) -> usize {
    let value = value as u32;

    if value == 0 {
        return 1;
    }

    let bits_needed = 32 - value.leading_zeros();
    (bits_needed as usize).div_ceil(7)
}

/// Calculate the number of bytes needed to encode a `VarLong`.
#[must_use]
#[allow(clippy::cast_sign_loss)]
pub const fn varlong_len(value: i64) -> usize {
    let value = value as u64;

    if value == 0 {
        return 1;
    }

    let bits_needed = 64 - value.leading_zeros();
    (bits_needed as usize).div_ceil(7)
}

fn next_byte(buf: &mut impl Buf) -> Result<u8> {
    if !buf.has_remaining() {
        return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof).into());
    }
    Ok(buf.get_u8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;
    use std::io::Cursor;

    fn roundtrip(value: i32) {
        let mut buf = BytesMut::new();
        let written = write_varint_to_buf(&mut buf, value);
        assert_eq!(written, varint_len(value));
        assert_eq!(buf.len(), varint_len(value));

        let read_value = read_varint_from_buf(&mut buf.freeze()).unwrap();
        assert_eq!(read_value, value);
    }

    fn roundtrip_long(value: i64) {
        let mut buf = BytesMut::new();
        let written = write_varlong_to_buf(&mut buf, value);
        assert_eq!(written, varlong_len(value));

        let read_value = read_varlong_from_buf(&mut buf.freeze()).unwrap();
        assert_eq!(read_value, value);
    }

    #[test]
    fn test_varint_zero() {
        let mut buf = BytesMut::new();
        write_varint_to_buf(&mut buf, 0);
        assert_eq!(&buf[..], &[0x00]);
    }

    #[test]
    fn test_varint_positive() {
        roundtrip(1);
        roundtrip(127);
        roundtrip(128);
        roundtrip(255);
        roundtrip(25565);
        roundtrip(2_097_151);
        roundtrip(i32::MAX);
    }

    #[test]
    fn test_varint_negative() {
        roundtrip(-1);
        roundtrip(-127);
        roundtrip(i32::MIN);
    }

    #[test]
    fn test_varint_len() {
        assert_eq!(varint_len(0), 1);
        assert_eq!(varint_len(1), 1);
        assert_eq!(varint_len(127), 1);
        assert_eq!(varint_len(128), 2);
        assert_eq!(varint_len(16383), 2);
        assert_eq!(varint_len(16384), 3);
        assert_eq!(varint_len(2_097_151), 3);
        assert_eq!(varint_len(2_097_152), 4);
        assert_eq!(varint_len(268_435_455), 4);
        assert_eq!(varint_len(268_435_456), 5);
        assert_eq!(varint_len(i32::MAX), 5);
        // Negative numbers always use 5 bytes
        assert_eq!(varint_len(-1), 5);
        assert_eq!(varint_len(i32::MIN), 5);
    }

    #[tokio::test]
    async fn test_known_values() {
        // Test vectors from wiki.vg
        let test_cases = [
            (0, vec![0x00]),
            (1, vec![0x01]),
            (127, vec![0x7f]),
            (128, vec![0x80, 0x01]),
            (255, vec![0xff, 0x01]),
            (25565, vec![0xdd, 0xc7, 0x01]),
            (2_097_151, vec![0xff, 0xff, 0x7f]),
            (2_147_483_647, vec![0xff, 0xff, 0xff, 0xff, 0x07]),
            (-1, vec![0xff, 0xff, 0xff, 0xff, 0x0f]),
            (-2_147_483_648, vec![0x80, 0x80, 0x80, 0x80, 0x08]),
        ];

        for (value, expected_bytes) in test_cases {
            let mut buf = BytesMut::new();
            write_varint_to_buf(&mut buf, value);
            assert_eq!(&buf[..], &expected_bytes[..], "write failed for {value}");

            let mut cursor = Cursor::new(expected_bytes);
            let read_value = read_varint(&mut cursor).await.unwrap();
            assert_eq!(read_value, value, "read failed for {value}");
        }
    }

    #[tokio::test]
    async fn test_varint_too_big() {
        // 6 bytes with continue bits set - should fail
        let bytes = vec![0x80, 0x80, 0x80, 0x80, 0x80, 0x01];

        let mut cursor = Cursor::new(bytes.clone());
        let result = read_varint(&mut cursor).await;
        assert!(matches!(result, Err(ProtocolError::VarIntTooBig)));

        let result = read_varint_from_buf(&mut &bytes[..]);
        assert!(matches!(result, Err(ProtocolError::VarIntTooBig)));
    }

    #[test]
    fn test_varint_max_groups_boundary() {
        // Five groups is the limit and must still decode.
        let bytes = [0xff, 0xff, 0xff, 0xff, 0x07];
        assert_eq!(read_varint_from_buf(&mut &bytes[..]).unwrap(), i32::MAX);
    }

    #[test]
    fn test_varint_truncated() {
        let bytes = [0x80, 0x80];
        let err = read_varint_from_buf(&mut &bytes[..]).unwrap_err();
        assert!(err.is_eof());
    }

    #[test]
    fn test_varlong_zero_is_single_byte() {
        let mut buf = BytesMut::new();
        let written = write_varlong_to_buf(&mut buf, 0);
        assert_eq!(written, 1);
        assert_eq!(&buf[..], &[0x00]);

        assert_eq!(read_varlong_from_buf(&mut buf.freeze()).unwrap(), 0);
    }

    #[test]
    fn test_varlong_roundtrip() {
        roundtrip_long(1);
        roundtrip_long(127);
        roundtrip_long(128);
        roundtrip_long(2_147_483_647);
        roundtrip_long(9_223_372_036_854_775_807);
        roundtrip_long(-1);
        roundtrip_long(-2_147_483_648);
        roundtrip_long(i64::MIN);
    }

    #[test]
    fn test_varlong_known_values() {
        let test_cases: [(i64, &[u8]); 4] = [
            (2_147_483_647, &[0xff, 0xff, 0xff, 0xff, 0x07]),
            (
                i64::MAX,
                &[0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x7f],
            ),
            (
                -1,
                &[0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x01],
            ),
            (
                i64::MIN,
                &[0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x01],
            ),
        ];

        for (value, expected_bytes) in test_cases {
            let mut buf = BytesMut::new();
            write_varlong_to_buf(&mut buf, value);
            assert_eq!(&buf[..], expected_bytes, "write failed for {value}");
            assert_eq!(
                read_varlong_from_buf(&mut &expected_bytes[..]).unwrap(),
                value
            );
        }
    }

    #[test]
    fn test_varlong_too_big() {
        let mut bytes = vec![0x80; 10];
        bytes.push(0x01);
        let result = read_varlong_from_buf(&mut &bytes[..]);
        assert!(matches!(result, Err(ProtocolError::VarLongTooBig)));
    }
}

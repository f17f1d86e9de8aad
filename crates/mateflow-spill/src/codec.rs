//! Serialization of spilled entries.
//!
//! Partition files are a plain concatenation of encoded `(key, value)` entries with no
//! separators, so every encoding must be self-delimiting. Two levels are provided:
//!
//! - [`Spillable`]: a type that can write itself to a stream and read itself back.
//! - [`Codec`]: encodes a whole entry. [`SpillableCodec`] is the default codec for any key and
//!   value that are both [`Spillable`]; custom codecs can be supplied when a value type needs a
//!   different layout or carries external context.
//!
//! All integers are written little-endian. Variable-length data is prefixed with its length as
//! a `u32`.

use std::io::{self, Read, Write};

/// A type that can be written to, and read back from, a spill file.
pub trait Spillable: Sized {
    /// Serialize `self` to the writer.
    fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()>;

    /// Deserialize one value from the reader.
    ///
    /// Must be the inverse of [`Spillable::write_to`] and consume exactly the bytes it wrote.
    fn read_from<R: Read>(reader: &mut R) -> io::Result<Self>;
}

/// Encodes and decodes one `(key, value)` entry of a partition file.
pub trait Codec<K, V> {
    /// Append one self-delimiting entry to the writer.
    fn encode<W: Write>(&self, key: &K, value: &V, writer: &mut W) -> io::Result<()>;

    /// Read exactly one entry previously written by [`Codec::encode`].
    fn decode<R: Read>(&self, reader: &mut R) -> io::Result<(K, V)>;
}

/// Default codec: the key followed by the value, each in its [`Spillable`] encoding.
#[derive(Debug, Default, Clone, Copy)]
pub struct SpillableCodec;

impl<K: Spillable, V: Spillable> Codec<K, V> for SpillableCodec {
    fn encode<W: Write>(&self, key: &K, value: &V, writer: &mut W) -> io::Result<()> {
        key.write_to(writer)?;
        value.write_to(writer)
    }

    fn decode<R: Read>(&self, reader: &mut R) -> io::Result<(K, V)> {
        let key = K::read_from(reader)?;
        let value = V::read_from(reader)?;
        Ok((key, value))
    }
}

/// Write a `u32` length prefix followed by the bytes.
///
/// # Errors
///
/// Returns an error if the slice is longer than `u32::MAX` or the write fails.
pub fn write_len_prefixed<W: Write>(writer: &mut W, bytes: &[u8]) -> io::Result<()> {
    let len = u32::try_from(bytes.len()).map_err(|_| {
        io::Error::new(io::ErrorKind::InvalidInput, "value too long to spill (> u32::MAX bytes)")
    })?;
    writer.write_all(&len.to_le_bytes())?;
    writer.write_all(bytes)
}

/// Read a `u32` length prefix and that many bytes.
///
/// # Errors
///
/// Returns an error if the stream ends early.
pub fn read_len_prefixed<R: Read>(reader: &mut R) -> io::Result<Vec<u8>> {
    let len = u32::read_from(reader)? as usize;
    let mut bytes = vec![0u8; len];
    reader.read_exact(&mut bytes)?;
    Ok(bytes)
}

macro_rules! spillable_int {
    ($($t:ty),*) => {
        $(
            impl Spillable for $t {
                #[inline]
                fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
                    writer.write_all(&self.to_le_bytes())
                }

                #[inline]
                fn read_from<R: Read>(reader: &mut R) -> io::Result<Self> {
                    let mut buf = [0u8; std::mem::size_of::<$t>()];
                    reader.read_exact(&mut buf)?;
                    Ok(<$t>::from_le_bytes(buf))
                }
            }
        )*
    };
}

spillable_int!(u8, u16, u32, u64, i8, i16, i32, i64);

impl Spillable for usize {
    fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        (*self as u64).write_to(writer)
    }

    fn read_from<R: Read>(reader: &mut R) -> io::Result<Self> {
        let value = u64::read_from(reader)?;
        usize::try_from(value)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "usize overflow in spill file"))
    }
}

impl Spillable for bool {
    fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        u8::from(*self).write_to(writer)
    }

    fn read_from<R: Read>(reader: &mut R) -> io::Result<Self> {
        match u8::read_from(reader)? {
            0 => Ok(false),
            1 => Ok(true),
            b => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("invalid boolean byte in spill file: {b}"),
            )),
        }
    }
}

impl Spillable for Vec<u8> {
    fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        write_len_prefixed(writer, self)
    }

    fn read_from<R: Read>(reader: &mut R) -> io::Result<Self> {
        read_len_prefixed(reader)
    }
}

impl Spillable for String {
    fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        write_len_prefixed(writer, self.as_bytes())
    }

    fn read_from<R: Read>(reader: &mut R) -> io::Result<Self> {
        let bytes = read_len_prefixed(reader)?;
        String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

impl<T: Spillable> Spillable for Option<T> {
    fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        match self {
            Some(value) => {
                true.write_to(writer)?;
                value.write_to(writer)
            }
            None => false.write_to(writer),
        }
    }

    fn read_from<R: Read>(reader: &mut R) -> io::Result<Self> {
        if bool::read_from(reader)? { Ok(Some(T::read_from(reader)?)) } else { Ok(None) }
    }
}

impl<A: Spillable, B: Spillable> Spillable for (A, B) {
    fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        self.0.write_to(writer)?;
        self.1.write_to(writer)
    }

    fn read_from<R: Read>(reader: &mut R) -> io::Result<Self> {
        Ok((A::read_from(reader)?, B::read_from(reader)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_entries_are_self_delimiting() {
        let codec = SpillableCodec;
        let mut buf = Vec::new();
        codec.encode(&"read1".to_string(), &(3_i32, Some(7_u64)), &mut buf).unwrap();
        codec.encode(&"read22".to_string(), &(-1_i32, None::<u64>), &mut buf).unwrap();

        let mut cursor = Cursor::new(buf);
        let (k1, v1): (String, (i32, Option<u64>)) = codec.decode(&mut cursor).unwrap();
        let (k2, v2): (String, (i32, Option<u64>)) = codec.decode(&mut cursor).unwrap();
        assert_eq!((k1.as_str(), v1), ("read1", (3, Some(7))));
        assert_eq!((k2.as_str(), v2), ("read22", (-1, None)));
        assert_eq!(cursor.position() as usize, cursor.get_ref().len());
    }

    #[test]
    fn test_string_layout_is_length_prefixed() {
        let mut buf = Vec::new();
        "abc".to_string().write_to(&mut buf).unwrap();
        assert_eq!(buf, vec![3, 0, 0, 0, b'a', b'b', b'c']);
    }

    #[test]
    fn test_truncated_entry_is_an_error() {
        let mut buf = Vec::new();
        "abcdef".to_string().write_to(&mut buf).unwrap();
        buf.truncate(6);
        let err = String::read_from(&mut Cursor::new(buf)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_invalid_utf8_is_rejected() {
        let mut buf = Vec::new();
        write_len_prefixed(&mut buf, &[0xff, 0xfe]).unwrap();
        let err = String::read_from(&mut Cursor::new(buf)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_invalid_bool_byte_is_rejected() {
        let err = bool::read_from(&mut Cursor::new(vec![2u8])).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}

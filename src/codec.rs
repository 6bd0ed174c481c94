//! Fixed-width little-endian scalar and fixed-length string primitives.
//!
//! Every multi-byte scalar in a WAD, ZIP, or Doom map record is
//! little-endian. These traits wrap `byteorder`'s `ReadBytesExt`/
//! `WriteBytesExt` so every call site reports failures as a
//! [`WadkitError::IoError`] carrying the operation name and expected byte
//! count, instead of a bare `std::io::Error`.

use std::io::{Read, Seek, SeekFrom, Write};

use byteorder::{LittleEndian as LE, ReadBytesExt, WriteBytesExt};

use crate::error::{Result, WadkitError};

fn io_err(op: &'static str, expected_bytes: usize) -> impl Fn(std::io::Error) -> WadkitError {
    move |source| WadkitError::io(op, expected_bytes, source)
}

/// Read primitives over any `Read`-capable stream.
pub trait ReadExt: Read {
    fn read_u8_(&mut self) -> Result<u8> {
        self.read_u8().map_err(io_err("read_u8", 1))
    }
    fn read_i8_(&mut self) -> Result<i8> {
        self.read_i8().map_err(io_err("read_i8", 1))
    }
    fn read_u16_le(&mut self) -> Result<u16> {
        self.read_u16::<LE>().map_err(io_err("read_u16_le", 2))
    }
    fn read_i16_le(&mut self) -> Result<i16> {
        self.read_i16::<LE>().map_err(io_err("read_i16_le", 2))
    }
    fn read_u32_le(&mut self) -> Result<u32> {
        self.read_u32::<LE>().map_err(io_err("read_u32_le", 4))
    }
    fn read_i32_le(&mut self) -> Result<i32> {
        self.read_i32::<LE>().map_err(io_err("read_i32_le", 4))
    }
    fn read_u64_le(&mut self) -> Result<u64> {
        self.read_u64::<LE>().map_err(io_err("read_u64_le", 8))
    }
    fn read_i64_le(&mut self) -> Result<i64> {
        self.read_i64::<LE>().map_err(io_err("read_i64_le", 8))
    }

    fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; n];
        self.read_exact(&mut buf).map_err(io_err("read_bytes", n))?;
        Ok(buf)
    }

    /// Read `n` bytes, truncating at the first NUL (if any). The returned
    /// bytes are not NUL-terminated.
    fn read_fixed_string(&mut self, n: usize) -> Result<Vec<u8>> {
        let buf = self.read_bytes(n)?;
        let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
        Ok(buf[..end].to_vec())
    }
}

impl<R: Read + ?Sized> ReadExt for R {}

/// Write primitives over any `Write`-capable stream.
pub trait WriteExt: Write {
    fn write_u8_(&mut self, v: u8) -> Result<()> {
        self.write_u8(v).map_err(io_err("write_u8", 1))
    }
    fn write_i8_(&mut self, v: i8) -> Result<()> {
        self.write_i8(v).map_err(io_err("write_i8", 1))
    }
    fn write_u16_le(&mut self, v: u16) -> Result<()> {
        self.write_u16::<LE>(v).map_err(io_err("write_u16_le", 2))
    }
    fn write_i16_le(&mut self, v: i16) -> Result<()> {
        self.write_i16::<LE>(v).map_err(io_err("write_i16_le", 2))
    }
    fn write_u32_le(&mut self, v: u32) -> Result<()> {
        self.write_u32::<LE>(v).map_err(io_err("write_u32_le", 4))
    }
    fn write_i32_le(&mut self, v: i32) -> Result<()> {
        self.write_i32::<LE>(v).map_err(io_err("write_i32_le", 4))
    }
    fn write_u64_le(&mut self, v: u64) -> Result<()> {
        self.write_u64::<LE>(v).map_err(io_err("write_u64_le", 8))
    }
    fn write_i64_le(&mut self, v: i64) -> Result<()> {
        self.write_i64::<LE>(v).map_err(io_err("write_i64_le", 8))
    }

    fn write_bytes(&mut self, buf: &[u8]) -> Result<()> {
        self.write_all(buf).map_err(io_err("write_bytes", buf.len()))
    }

    /// Write the first `min(s.len(), n)` bytes of `s`, then pad with NULs to
    /// `n`. No trailing NUL is written when `s.len() == n` — required for
    /// wire compatibility with readers that treat the field as exactly `n`
    /// raw bytes.
    fn write_fixed_string(&mut self, s: &[u8], n: usize) -> Result<()> {
        let take = s.len().min(n);
        self.write_bytes(&s[..take])?;
        if take < n {
            let pad = vec![0u8; n - take];
            self.write_bytes(&pad)?;
        }
        Ok(())
    }
}

impl<W: Write + ?Sized> WriteExt for W {}

/// Save the current position, run `f`, then restore the position —
/// regardless of whether `f` succeeded. Used by every nested lump read so a
/// failure never leaves the stream wedged at an unexpected offset.
pub fn with_restored_position<S, T>(
    stream: &mut S,
    f: impl FnOnce(&mut S) -> Result<T>,
) -> Result<T>
where
    S: Seek,
{
    let saved = stream
        .stream_position()
        .map_err(io_err("stream_position", 0))?;
    let result = f(stream);
    stream
        .seek(SeekFrom::Start(saved))
        .map_err(io_err("seek_restore", 0))?;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn u16_le_boundary() {
        let mut c = Cursor::new(vec![0xFE, 0xFF]);
        assert_eq!(c.read_u16_le().unwrap(), 0xFFFE);

        let mut out = Vec::new();
        out.write_u16_le(0xFFFE).unwrap();
        assert_eq!(out, vec![0xFE, 0xFF]);
    }

    #[test]
    fn u32_le_boundary() {
        let mut c = Cursor::new(vec![0xFC, 0xFD, 0xFE, 0xFF]);
        assert_eq!(c.read_u32_le().unwrap(), 0xFFFEFDFC);

        let mut out = Vec::new();
        out.write_u32_le(0xFFFEFDFC).unwrap();
        assert_eq!(out, vec![0xFC, 0xFD, 0xFE, 0xFF]);
    }

    #[test]
    fn u64_le_boundary() {
        let bytes = vec![0xF8, 0xF9, 0xFA, 0xFB, 0xFC, 0xFD, 0xFE, 0xFF];
        let mut c = Cursor::new(bytes.clone());
        assert_eq!(c.read_u64_le().unwrap(), 0xFFFEFDFCFBFAF9F8);

        let mut out = Vec::new();
        out.write_u64_le(0xFFFEFDFCFBFAF9F8).unwrap();
        assert_eq!(out, bytes);
    }

    #[test]
    fn fixed_string_truncates_at_nul() {
        let mut c = Cursor::new(vec![0x41, 0x42, 0x00, 0x44]);
        assert_eq!(c.read_fixed_string(4).unwrap(), b"AB".to_vec());
    }

    #[test]
    fn fixed_string_no_nul_present_returns_whole_field() {
        let mut c = Cursor::new(vec![0x41, 0x42, 0x43, 0x44]);
        assert_eq!(c.read_fixed_string(4).unwrap(), b"ABCD".to_vec());
    }

    #[test]
    fn write_fixed_string_full_width_has_no_trailing_nul() {
        let mut out = Vec::new();
        out.write_fixed_string(b"ABCDEFGH", 8).unwrap();
        assert_eq!(out, b"ABCDEFGH".to_vec());
    }

    #[test]
    fn write_fixed_string_pads_with_nuls() {
        let mut out = Vec::new();
        out.write_fixed_string(b"AB", 8).unwrap();
        assert_eq!(out, b"AB\0\0\0\0\0\0".to_vec());
    }

    #[test]
    fn short_read_reports_io_error() {
        let mut c = Cursor::new(vec![0x01]);
        let err = c.read_u16_le().unwrap_err();
        match err {
            WadkitError::IoError { op, expected_bytes, .. } => {
                assert_eq!(op, "read_u16_le");
                assert_eq!(expected_bytes, 2);
            }
            other => panic!("unexpected error variant: {other:?}"),
        }
    }

    #[test]
    fn with_restored_position_restores_on_success_and_failure() {
        let mut c = Cursor::new(vec![0u8; 16]);
        c.seek(SeekFrom::Start(4)).unwrap();
        let _ = with_restored_position(&mut c, |s| {
            s.seek(SeekFrom::Start(10)).unwrap();
            Ok(())
        });
        assert_eq!(c.stream_position().unwrap(), 4);

        let _ = with_restored_position(&mut c, |s| -> Result<()> {
            s.seek(SeekFrom::Start(12)).unwrap();
            Err(WadkitError::NotZip)
        });
        assert_eq!(c.stream_position().unwrap(), 4);
    }
}

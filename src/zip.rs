//! ZIP container codec: local file headers, central directory, EOCD.
//!
//! Only STORE and DEFLATE members are understood; multi-disk archives,
//! ZIP64, and encryption are rejected rather than silently mishandled.
//! Container-level metadata (comments, extra fields, timestamps) is
//! discarded on read and written as zero on emit.

use std::io::{Cursor, Read, Seek, SeekFrom, Write};

use crc32fast::Hasher as Crc32Hasher;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;
use log::{debug, trace};

use crate::codec::{with_restored_position, ReadExt, WriteExt};
use crate::directory::{Directory, Lump};
use crate::error::{Result, WadkitError};

const LOCAL_MAGIC: [u8; 4] = *b"PK\x03\x04";
const CENTRAL_MAGIC: [u8; 4] = *b"PK\x01\x02";
const EOCD_MAGIC: [u8; 4] = *b"PK\x05\x06";
const EOCD_LEN: u64 = 22;

const METHOD_STORE: u16 = 0;
const METHOD_DEFLATE: u16 = 8;

/// A parsed ZIP archive: just the lump directory, no container metadata.
pub struct Zip {
    pub directory: Directory,
}

impl Zip {
    pub fn new() -> Self {
        Zip {
            directory: Directory::new(),
        }
    }

    pub fn parse<R: Read + Seek>(mut reader: R) -> Result<Self> {
        let len = reader
            .seek(SeekFrom::End(0))
            .map_err(|e| WadkitError::io("seek_end", 0, e))?;
        if len < EOCD_LEN {
            return Err(WadkitError::TooSmall(len));
        }

        let eocd_pos = find_eocd(&mut reader, len)?;
        reader
            .seek(SeekFrom::Start(eocd_pos + 4))
            .map_err(|e| WadkitError::io("seek_eocd_body", 0, e))?;
        let disk_number = reader.read_u16_le()?;
        let cd_start_disk = reader.read_u16_le()?;
        if disk_number != 0 || cd_start_disk != 0 {
            return Err(WadkitError::UnsupportedMultiDisk);
        }
        let entries_this_disk = reader.read_u16_le()?;
        let entries_total = reader.read_u16_le()?;
        if entries_this_disk != entries_total {
            return Err(WadkitError::UnsupportedMultiDisk);
        }
        let _cd_size = reader.read_u32_le()?;
        let cd_offset = reader.read_u32_le()?;
        debug!(
            "zip eocd: {} entries, cd_offset={}",
            entries_total, cd_offset
        );

        reader
            .seek(SeekFrom::Start(cd_offset as u64))
            .map_err(|e| WadkitError::io("seek_cd", 0, e))?;

        let mut directory = Directory::new();
        for _ in 0..entries_total {
            let entry = parse_central_entry(&mut reader)?;
            let lump = with_restored_position(&mut reader, |r| {
                r.seek(SeekFrom::Start(entry.local_header_ofs as u64))
                    .map_err(|e| WadkitError::io("seek_local", 0, e))?;
                parse_local_file(r)
            })?;
            directory.push_back(lump);
        }

        Ok(Zip { directory })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::parse(Cursor::new(bytes))
    }

    pub fn emit<W: Write>(&self, mut writer: W) -> Result<()> {
        let count = self.directory.len();
        if count > u16::MAX as usize {
            return Err(WadkitError::TooMany {
                field: "zip entries",
                count,
            });
        }

        let mut central = Vec::new();
        let mut offset: u64 = 0;

        for lump in self.directory.iter() {
            if lump.name.len() > u16::MAX as usize {
                return Err(WadkitError::OutOfRange {
                    field: "name length",
                    value: lump.name.len() as i64,
                    bound: u16::MAX as i64,
                });
            }
            if lump.data.len() > u32::MAX as usize {
                return Err(WadkitError::OutOfRange {
                    field: "uncompressed size",
                    value: lump.data.len() as i64,
                    bound: u32::MAX as i64,
                });
            }

            let crc = crc32_of(&lump.data);
            let deflated = deflate(&lump.data)?;
            let (method, compressed): (u16, &[u8]) = if deflated.len() <= lump.data.len() {
                (METHOD_DEFLATE, &deflated)
            } else {
                (METHOD_STORE, &lump.data)
            };

            let local_header_ofs = offset;

            writer.write_bytes(&LOCAL_MAGIC)?;
            writer.write_u16_le(8)?; // version needed
            writer.write_u16_le(0)?; // bitflag
            writer.write_u16_le(method)?;
            writer.write_u16_le(0)?; // mod time
            writer.write_u16_le(0)?; // mod date
            writer.write_u32_le(crc)?;
            writer.write_u32_le(compressed.len() as u32)?;
            writer.write_u32_le(lump.data.len() as u32)?;
            writer.write_u16_le(lump.name.len() as u16)?;
            writer.write_u16_le(0)?; // extra length
            writer.write_bytes(&lump.name)?;
            writer.write_bytes(compressed)?;

            offset += 30 + lump.name.len() as u64 + compressed.len() as u64;

            central.write_bytes(&CENTRAL_MAGIC)?;
            central.write_u16_le(8)?; // version made by
            central.write_u16_le(8)?; // version needed
            central.write_u16_le(0)?; // bitflag
            central.write_u16_le(method)?;
            central.write_u16_le(0)?; // mod time
            central.write_u16_le(0)?; // mod date
            central.write_u32_le(crc)?;
            central.write_u32_le(compressed.len() as u32)?;
            central.write_u32_le(lump.data.len() as u32)?;
            central.write_u16_le(lump.name.len() as u16)?;
            central.write_u16_le(0)?; // extra length
            central.write_u16_le(0)?; // comment length
            central.write_u16_le(0)?; // disk number start
            central.write_u16_le(0)?; // internal attrs
            central.write_u32_le(0)?; // external attrs
            if local_header_ofs > u32::MAX as u64 {
                return Err(WadkitError::OutOfRange {
                    field: "local_header_ofs",
                    value: local_header_ofs as i64,
                    bound: u32::MAX as i64,
                });
            }
            central.write_u32_le(local_header_ofs as u32)?;
            central.write_bytes(&lump.name)?;
        }

        let cd_offset = offset;
        if cd_offset > u32::MAX as u64 {
            return Err(WadkitError::OutOfRange {
                field: "cd_offset",
                value: cd_offset as i64,
                bound: u32::MAX as i64,
            });
        }
        let cd_size = central.len() as u64;
        if cd_size > u32::MAX as u64 {
            return Err(WadkitError::OutOfRange {
                field: "cd_size",
                value: cd_size as i64,
                bound: u32::MAX as i64,
            });
        }

        writer.write_bytes(&central)?;

        writer.write_bytes(&EOCD_MAGIC)?;
        writer.write_u16_le(0)?; // disk number
        writer.write_u16_le(0)?; // cd start disk
        writer.write_u16_le(count as u16)?;
        writer.write_u16_le(count as u16)?;
        writer.write_u32_le(cd_size as u32)?;
        writer.write_u32_le(cd_offset as u32)?;
        writer.write_u16_le(0)?; // comment length

        debug!("emitted zip: {} entries, cd_offset={}", count, cd_offset);
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.emit(&mut out)?;
        Ok(out)
    }
}

impl Default for Zip {
    fn default() -> Self {
        Self::new()
    }
}

struct CentralEntry {
    local_header_ofs: u32,
}

fn parse_central_entry<R: Read>(r: &mut R) -> Result<CentralEntry> {
    let mut magic = [0u8; 4];
    r.read_exact(&mut magic)
        .map_err(|e| WadkitError::io("read_cd_magic", 4, e))?;
    if magic != CENTRAL_MAGIC {
        return Err(WadkitError::InvalidMagic {
            found: magic.to_vec(),
            wanted: &["PK\\x01\\x02"],
        });
    }
    let _version_made_by = r.read_u16_le()?;
    let _version_needed = r.read_u16_le()?;
    let _bitflag = r.read_u16_le()?;
    let _method = r.read_u16_le()?;
    let _mod_time = r.read_u16_le()?;
    let _mod_date = r.read_u16_le()?;
    let _crc = r.read_u32_le()?;
    let _compressed_size = r.read_u32_le()?;
    let _uncompressed_size = r.read_u32_le()?;
    let filename_len = r.read_u16_le()?;
    let extra_len = r.read_u16_le()?;
    let comment_len = r.read_u16_le()?;
    let _disk_number_start = r.read_u16_le()?;
    let _internal_attrs = r.read_u16_le()?;
    let _external_attrs = r.read_u32_le()?;
    let local_header_ofs = r.read_u32_le()?;
    let _name = r.read_bytes(filename_len as usize)?;
    let _extra = r.read_bytes(extra_len as usize)?;
    let _comment = r.read_bytes(comment_len as usize)?;
    Ok(CentralEntry { local_header_ofs })
}

fn parse_local_file<R: Read>(r: &mut R) -> Result<Lump> {
    let mut magic = [0u8; 4];
    r.read_exact(&mut magic)
        .map_err(|e| WadkitError::io("read_local_magic", 4, e))?;
    if magic != LOCAL_MAGIC {
        return Err(WadkitError::InvalidMagic {
            found: magic.to_vec(),
            wanted: &["PK\\x03\\x04"],
        });
    }
    let _version_needed = r.read_u16_le()?;
    let _bitflag = r.read_u16_le()?;
    let method = r.read_u16_le()?;
    let _mod_time = r.read_u16_le()?;
    let _mod_date = r.read_u16_le()?;
    let crc_expected = r.read_u32_le()?;
    let compressed_size = r.read_u32_le()?;
    let uncompressed_size = r.read_u32_le()?;
    let filename_len = r.read_u16_le()?;
    let extra_len = r.read_u16_le()?;
    let name = r.read_bytes(filename_len as usize)?;
    let _extra = r.read_bytes(extra_len as usize)?;

    let data = if compressed_size == 0 {
        Vec::new()
    } else {
        let compressed = r.read_bytes(compressed_size as usize)?;
        match method {
            METHOD_STORE => compressed,
            METHOD_DEFLATE => inflate(&compressed, uncompressed_size as usize)?,
            other => return Err(WadkitError::UnsupportedCompression { method: other }),
        }
    };

    let actual_crc = crc32_of(&data);
    if actual_crc != crc_expected {
        return Err(WadkitError::CrcMismatch {
            expected: crc_expected,
            actual: actual_crc,
        });
    }

    trace!("zip local file {:?}: {} bytes", name, data.len());
    Ok(Lump { name, data })
}

/// Scan backward from `length - 22` for the EOCD magic, one byte at a time,
/// failing once position 0 is passed without a match. No trailing-comment
/// tolerance: well-formed archives this crate emits always have the record
/// at the minimum offset, and that is the only position this scan expects
/// to succeed at in practice.
fn find_eocd<R: Read + Seek>(reader: &mut R, len: u64) -> Result<u64> {
    let mut pos = len - EOCD_LEN;
    loop {
        reader
            .seek(SeekFrom::Start(pos))
            .map_err(|e| WadkitError::io("seek_eocd_probe", 0, e))?;
        let mut magic = [0u8; 4];
        if reader.read_exact(&mut magic).is_ok() && magic == EOCD_MAGIC {
            return Ok(pos);
        }
        if pos == 0 {
            return Err(WadkitError::NotZip);
        }
        pos -= 1;
    }
}

fn crc32_of(data: &[u8]) -> u32 {
    let mut hasher = Crc32Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| WadkitError::io("deflate_write", data.len(), e))?;
    encoder
        .finish()
        .map_err(|e| WadkitError::io("deflate_finish", 0, e))
}

fn inflate(compressed: &[u8], expected_len: usize) -> Result<Vec<u8>> {
    let mut decoder = DeflateDecoder::new(compressed);
    let mut out = Vec::with_capacity(expected_len);
    decoder
        .read_to_end(&mut out)
        .map_err(|e| WadkitError::io("inflate", expected_len, e))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(lumps: &[(&str, &[u8])]) -> Vec<u8> {
        let mut z = Zip::new();
        for (name, data) in lumps {
            z.directory
                .push_back(Lump::new(name.as_bytes().to_vec(), data.to_vec()));
        }
        z.to_bytes().unwrap()
    }

    #[test]
    fn round_trips_empty_archive() {
        let bytes = build(&[]);
        let zip = Zip::from_bytes(&bytes).unwrap();
        assert_eq!(zip.directory.len(), 0);
    }

    #[test]
    fn round_trips_store_and_deflate_members() {
        // Random-ish bytes won't compress smaller than raw -> STORE path.
        let incompressible: Vec<u8> = (0u8..=255).cycle().take(300).collect();
        let repetitive = vec![b'a'; 4096];

        let mut z = Zip::new();
        z.directory
            .push_back(Lump::new(b"RANDOM".to_vec(), incompressible.clone()));
        z.directory
            .push_back(Lump::new(b"REPEAT".to_vec(), repetitive.clone()));
        let bytes = z.to_bytes().unwrap();

        let parsed = Zip::from_bytes(&bytes).unwrap();
        assert_eq!(parsed.directory.len(), 2);
        assert_eq!(parsed.directory.at(0).unwrap().data, incompressible);
        assert_eq!(parsed.directory.at(1).unwrap().data, repetitive);
    }

    #[test]
    fn too_small_buffer_is_rejected() {
        let err = Zip::from_bytes(&[0u8; 10]).unwrap_err();
        assert!(matches!(err, WadkitError::TooSmall(10)));
    }

    #[test]
    fn missing_eocd_is_not_zip() {
        let bytes = vec![0u8; 64];
        let err = Zip::from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, WadkitError::NotZip));
    }

    #[test]
    fn flipped_crc_bit_fails_with_crc_mismatch() {
        let bytes = build(&[("A", b"hello world, this compresses reasonably well")]);

        // Locate the local file header's CRC32 field (offset 14 within it)
        // and flip one bit.
        let crc_field_offset = 4 + 2 + 2 + 2 + 2 + 2; // magic..mod_date
        let mut corrupted = bytes.clone();
        corrupted[crc_field_offset] ^= 0x01;

        let err = Zip::from_bytes(&corrupted).unwrap_err();
        assert!(matches!(err, WadkitError::CrcMismatch { .. }));
    }

    #[test]
    fn first_lump_name_preserved() {
        let bytes = build(&[("DEHACKED", b"patch data"), ("DEMO1", b"\x01\x02\x03")]);
        let zip = Zip::from_bytes(&bytes).unwrap();
        assert_eq!(zip.directory.at(0).unwrap().name, b"DEHACKED");
        assert_eq!(zip.directory.at(1).unwrap().data, b"\x01\x02\x03");
    }
}

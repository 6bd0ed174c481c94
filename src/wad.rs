//! WAD container codec: header, 16-byte infotable entries, lump directory.
//!
//! Layout (all integers little-endian):
//!
//! ```text
//! offset 0   [4]  magic: "IWAD" or "PWAD"
//! offset 4   [4]  numlumps: i32
//! offset 8   [4]  infotableofs: i32
//! ...
//! infotableofs + 16*i:
//!            [4]  filepos: i32
//!            [4]  size:    i32
//!            [8]  name:    fixed string, NUL-padded, not NUL-terminated
//! ```
//!
//! A lump's data lives wherever `filepos` says; nothing requires lumps to be
//! contiguous or in directory order, though a freshly emitted WAD always
//! lays them out sequentially right after the header.

use std::io::{Cursor, Read, Seek, SeekFrom, Write};

use log::{debug, trace};

use crate::codec::{with_restored_position, ReadExt, WriteExt};
use crate::directory::{Directory, Lump};
use crate::error::{Result, WadkitError};

const HEADER_LEN: u64 = 12;
const ENTRY_LEN: u64 = 16;
const NAME_LEN: usize = 8;

/// Whether a WAD is an initial (full, standalone) or patch (merged-on-top)
/// archive. Carried through unchanged on round-trip.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WadKind {
    Iwad,
    Pwad,
}

impl WadKind {
    fn magic(self) -> &'static [u8; 4] {
        match self {
            WadKind::Iwad => b"IWAD",
            WadKind::Pwad => b"PWAD",
        }
    }

    fn from_magic(magic: &[u8]) -> Result<Self> {
        match magic {
            b"IWAD" => Ok(WadKind::Iwad),
            b"PWAD" => Ok(WadKind::Pwad),
            _ => Err(WadkitError::InvalidMagic {
                found: magic.to_vec(),
                wanted: &["IWAD", "PWAD"],
            }),
        }
    }
}

/// A parsed WAD archive: its kind plus the ordered lump directory.
pub struct Wad {
    pub kind: WadKind,
    pub directory: Directory,
}

impl Wad {
    pub fn new(kind: WadKind) -> Self {
        Wad {
            kind,
            directory: Directory::new(),
        }
    }

    /// Parse a WAD from an in-memory buffer or any `Read + Seek` source.
    pub fn parse<R: Read + Seek>(mut reader: R) -> Result<Self> {
        let mut magic = [0u8; 4];
        reader
            .read_exact(&mut magic)
            .map_err(|e| WadkitError::io("read_magic", 4, e))?;
        let kind = WadKind::from_magic(&magic)?;
        trace!("wad magic {:?} -> {:?}", magic, kind);

        let numlumps = reader.read_i32_le()?;
        if numlumps < 0 {
            return Err(WadkitError::OutOfRange {
                field: "numlumps",
                value: numlumps as i64,
                bound: 0,
            });
        }
        let infotableofs = reader.read_i32_le()?;
        if infotableofs < 0 {
            return Err(WadkitError::OutOfRange {
                field: "infotableofs",
                value: infotableofs as i64,
                bound: 0,
            });
        }
        debug!(
            "wad header: numlumps={} infotableofs={}",
            numlumps, infotableofs
        );

        let mut directory = Directory::new();
        for i in 0..numlumps {
            let entry_pos = infotableofs as u64 + i as u64 * ENTRY_LEN;
            let (filepos, size, name) = with_restored_position(&mut reader, |r| {
                r.seek(SeekFrom::Start(entry_pos))
                    .map_err(|e| WadkitError::io("seek_entry", 0, e))?;
                let filepos = r.read_i32_le()?;
                let size = r.read_i32_le()?;
                let name = r.read_fixed_string(NAME_LEN)?;
                Ok((filepos, size, name))
            })?;
            if size < 0 {
                return Err(WadkitError::OutOfRange {
                    field: "size",
                    value: size as i64,
                    bound: 0,
                });
            }
            // A zero-size lump never reads its body: file_ofs may be garbage
            // (some tools leave it uninitialized) and must not be validated.
            let data = if size == 0 {
                Vec::new()
            } else {
                if filepos < 0 {
                    return Err(WadkitError::OutOfRange {
                        field: "filepos",
                        value: filepos as i64,
                        bound: 0,
                    });
                }
                with_restored_position(&mut reader, |r| {
                    r.seek(SeekFrom::Start(filepos as u64))
                        .map_err(|e| WadkitError::io("seek_lump", 0, e))?;
                    r.read_bytes(size as usize)
                })?
            };
            directory.push_back(Lump { name, data });
        }

        Ok(Wad { kind, directory })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::parse(Cursor::new(bytes))
    }

    /// Serialize header, then lump bodies back to back, then the infotable
    /// last — the directory is always written after every lump's data, so
    /// `infotableofs` always lands at `HEADER_LEN + sum(lump sizes)`.
    pub fn emit<W: Write>(&self, mut writer: W) -> Result<()> {
        let numlumps = self.directory.len();
        if numlumps > i32::MAX as usize {
            return Err(WadkitError::TooMany {
                field: "numlumps",
                count: numlumps,
            });
        }

        let mut body_len: u64 = 0;
        let mut entries = Vec::with_capacity(numlumps);
        for lump in self.directory.iter() {
            if lump.name.len() > NAME_LEN {
                return Err(WadkitError::NameTooLong(lump.name.len()));
            }
            let filepos = HEADER_LEN + body_len;
            if filepos > i32::MAX as u64 || lump.data.len() > i32::MAX as usize {
                return Err(WadkitError::OutOfRange {
                    field: "filepos",
                    value: filepos as i64,
                    bound: i32::MAX as i64,
                });
            }
            entries.push((filepos as i32, lump.data.len() as i32, &lump.name));
            body_len += lump.data.len() as u64;
        }
        let infotableofs = HEADER_LEN + body_len;
        if infotableofs > i32::MAX as u64 {
            return Err(WadkitError::OutOfRange {
                field: "infotableofs",
                value: infotableofs as i64,
                bound: i32::MAX as i64,
            });
        }

        writer.write_bytes(self.kind.magic())?;
        writer.write_i32_le(numlumps as i32)?;
        writer.write_i32_le(infotableofs as i32)?;

        for lump in self.directory.iter() {
            writer.write_bytes(&lump.data)?;
        }

        for (filepos, size, name) in entries {
            writer.write_i32_le(filepos)?;
            writer.write_i32_le(size)?;
            writer.write_fixed_string(name, NAME_LEN)?;
        }

        debug!(
            "emitted wad: {} lumps, infotableofs={}",
            numlumps, infotableofs
        );
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.emit(&mut out)?;
        Ok(out)
    }
}

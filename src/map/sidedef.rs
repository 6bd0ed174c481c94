//! Sidedef: offsets, three textures, a back-reference to its Sector.
//! 30 bytes on disk; the sector reference is stored as an i16 ordinal.

use std::io::{Read, Write};

use crate::codec::{ReadExt, WriteExt};
use crate::error::{Result, WadkitError};
use crate::imap::{IMap, WeakRef};
use crate::map::sector::Sector;

const TEX_LEN: usize = 8;

pub struct Sidedef {
    pub x_off: i16,
    pub y_off: i16,
    pub upper_tex: Vec<u8>,
    pub middle_tex: Vec<u8>,
    pub lower_tex: Vec<u8>,
    pub sector_ref: Option<WeakRef<Sector>>,
}

impl Sidedef {
    /// Decode one Sidedef, resolving `sector_ord` against `sectors`. An
    /// out-of-range ordinal leaves `sector_ref` empty rather than failing —
    /// Sidedef decode never sees a sentinel value, so any non-resolving
    /// ordinal is simply absent (callers that need the Linedef/Sidedef
    /// invariant upheld validate it at the DoomMap level).
    pub fn decode<R: Read>(r: &mut R, sectors: &IMap<Sector>) -> Result<Self> {
        let x_off = r.read_i16_le()?;
        let y_off = r.read_i16_le()?;
        let upper_tex = r.read_fixed_string(TEX_LEN)?;
        let middle_tex = r.read_fixed_string(TEX_LEN)?;
        let lower_tex = r.read_fixed_string(TEX_LEN)?;
        let sector_ord = r.read_i16_le()?;
        let sector_ref = if sector_ord >= 0 && (sector_ord as usize) < sectors.len() {
            sectors.weak_of(sector_ord as usize)
        } else {
            None
        };
        Ok(Sidedef {
            x_off,
            y_off,
            upper_tex,
            middle_tex,
            lower_tex,
            sector_ref,
        })
    }

    /// Encode. An empty `sector_ref` writes ordinal 0 — unlike Linedef's
    /// side refs, Sidedef has no sentinel for "absent"; 0 is a precondition
    /// violation on well-formed data, not something this call detects.
    pub fn encode<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_i16_le(self.x_off)?;
        w.write_i16_le(self.y_off)?;
        w.write_fixed_string(&self.upper_tex, TEX_LEN)?;
        w.write_fixed_string(&self.middle_tex, TEX_LEN)?;
        w.write_fixed_string(&self.lower_tex, TEX_LEN)?;
        let ord = match &self.sector_ref {
            Some(weak) => match weak.position() {
                Some(pos) => pos_to_i16(pos)?,
                None => {
                    return Err(WadkitError::DanglingRef {
                        record: "Sidedef",
                        field: "sector_ref",
                    })
                }
            },
            None => 0,
        };
        w.write_i16_le(ord)?;
        Ok(())
    }
}

fn pos_to_i16(pos: usize) -> Result<i16> {
    i16::try_from(pos).map_err(|_| WadkitError::OutOfRange {
        field: "sector_ref position",
        value: pos as i64,
        bound: i16::MAX as i64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample_sidedef() -> Sidedef {
        Sidedef {
            x_off: 4,
            y_off: -4,
            upper_tex: b"STARTAN3".to_vec(),
            middle_tex: b"-".to_vec(),
            lower_tex: b"-".to_vec(),
            sector_ref: None,
        }
    }

    #[test]
    fn round_trips_with_resolved_sector() {
        let sectors: IMap<Sector> = IMap::new();
        sectors.push_back(Sector::default()).unwrap();
        sectors.push_back(Sector::default()).unwrap();

        let mut side = sample_sidedef();
        side.sector_ref = sectors.weak_of(1);

        let mut buf = Vec::new();
        side.encode(&mut buf).unwrap();
        assert_eq!(buf.len(), 30);

        let mut c = Cursor::new(buf);
        let decoded = Sidedef::decode(&mut c, &sectors).unwrap();
        assert_eq!(decoded.sector_ref.unwrap().position(), Some(1));
        assert_eq!(decoded.upper_tex, b"STARTAN3");
    }

    #[test]
    fn decode_out_of_range_ordinal_leaves_empty() {
        let sectors: IMap<Sector> = IMap::new();
        sectors.push_back(Sector::default()).unwrap();

        let mut buf = Vec::new();
        buf.write_i16_le(0).unwrap();
        buf.write_i16_le(0).unwrap();
        buf.write_fixed_string(b"-", TEX_LEN).unwrap();
        buf.write_fixed_string(b"-", TEX_LEN).unwrap();
        buf.write_fixed_string(b"-", TEX_LEN).unwrap();
        buf.write_i16_le(7).unwrap(); // out of range

        let mut c = Cursor::new(buf);
        let decoded = Sidedef::decode(&mut c, &sectors).unwrap();
        assert!(decoded.sector_ref.is_none());
    }

    #[test]
    fn encode_with_empty_sector_ref_writes_zero() {
        let side = sample_sidedef();
        let mut buf = Vec::new();
        side.encode(&mut buf).unwrap();
        let ord = i16::from_le_bytes(buf[28..30].try_into().unwrap());
        assert_eq!(ord, 0);
    }
}

//! Linedef: a wall segment referencing two Vertexes and up to two Sidedefs.
//! 14 bytes on disk; side refs of −1 encode absence.

use std::io::{Read, Write};

use crate::codec::{ReadExt, WriteExt};
use crate::error::{Result, WadkitError};
use crate::imap::{IMap, WeakRef};
use crate::map::sidedef::Sidedef;
use crate::map::vertex::Vertex;

pub struct Linedef {
    pub v_start: WeakRef<Vertex>,
    pub v_end: WeakRef<Vertex>,
    pub flags: u16,
    pub special: i16,
    pub tag: i16,
    pub front_side: Option<WeakRef<Sidedef>>,
    pub back_side: Option<WeakRef<Sidedef>>,
}

impl Linedef {
    pub fn decode<R: Read>(
        r: &mut R,
        vertexes: &IMap<Vertex>,
        sidedefs: &IMap<Sidedef>,
    ) -> Result<Self> {
        let v_start_ord = r.read_i16_le()?;
        let v_end_ord = r.read_i16_le()?;
        let v_start = resolve_vertex(vertexes, v_start_ord)?;
        let v_end = resolve_vertex(vertexes, v_end_ord)?;

        let flags = r.read_u16_le()?;
        let special = r.read_i16_le()?;
        let tag = r.read_i16_le()?;

        let front_ord = r.read_i16_le()?;
        let back_ord = r.read_i16_le()?;
        let front_side = resolve_side(sidedefs, front_ord)?;
        let back_side = resolve_side(sidedefs, back_ord)?;

        Ok(Linedef {
            v_start,
            v_end,
            flags,
            special,
            tag,
            front_side,
            back_side,
        })
    }

    pub fn encode<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_i16_le(required_position(&self.v_start, "v_start")?)?;
        w.write_i16_le(required_position(&self.v_end, "v_end")?)?;
        w.write_u16_le(self.flags)?;
        w.write_i16_le(self.special)?;
        w.write_i16_le(self.tag)?;
        w.write_i16_le(optional_position(&self.front_side)?)?;
        w.write_i16_le(optional_position(&self.back_side)?)?;
        Ok(())
    }
}

fn resolve_vertex(vertexes: &IMap<Vertex>, ord: i16) -> Result<WeakRef<Vertex>> {
    if ord >= 0 && (ord as usize) < vertexes.len() {
        vertexes
            .weak_of(ord as usize)
            .ok_or(WadkitError::DanglingRef {
                record: "Linedef",
                field: "v_start/v_end",
            })
    } else {
        Err(WadkitError::DanglingRef {
            record: "Linedef",
            field: "v_start/v_end",
        })
    }
}

fn resolve_side(sidedefs: &IMap<Sidedef>, ord: i16) -> Result<Option<WeakRef<Sidedef>>> {
    if ord == -1 {
        return Ok(None);
    }
    if ord >= 0 && (ord as usize) < sidedefs.len() {
        Ok(Some(sidedefs.weak_of(ord as usize).ok_or(
            WadkitError::DanglingRef {
                record: "Linedef",
                field: "front_side/back_side",
            },
        )?))
    } else {
        Err(WadkitError::DanglingRef {
            record: "Linedef",
            field: "front_side/back_side",
        })
    }
}

fn required_position<T>(weak: &WeakRef<T>, field: &'static str) -> Result<i16> {
    let pos = weak.position().ok_or(WadkitError::DanglingRef {
        record: "Linedef",
        field,
    })?;
    i16::try_from(pos).map_err(|_| WadkitError::OutOfRange {
        field,
        value: pos as i64,
        bound: i16::MAX as i64,
    })
}

fn optional_position<T>(weak: &Option<WeakRef<T>>) -> Result<i16> {
    match weak {
        None => Ok(-1),
        Some(w) => match w.position() {
            Some(pos) => i16::try_from(pos).map_err(|_| WadkitError::OutOfRange {
                field: "front_side/back_side",
                value: pos as i64,
                bound: i16::MAX as i64,
            }),
            None => Err(WadkitError::DanglingRef {
                record: "Linedef",
                field: "front_side/back_side",
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn fixture() -> (IMap<Vertex>, IMap<Sidedef>) {
        let vertexes: IMap<Vertex> = IMap::new();
        vertexes.push_back(Vertex { x: 0, y: 0 }).unwrap();
        vertexes.push_back(Vertex { x: 64, y: 0 }).unwrap();

        let sectors: crate::imap::IMap<crate::map::sector::Sector> = IMap::new();
        sectors
            .push_back(crate::map::sector::Sector::default())
            .unwrap();

        let sidedefs: IMap<Sidedef> = IMap::new();
        sidedefs
            .push_back(Sidedef {
                x_off: 0,
                y_off: 0,
                upper_tex: b"-".to_vec(),
                middle_tex: b"WALL".to_vec(),
                lower_tex: b"-".to_vec(),
                sector_ref: sectors.weak_of(0),
            })
            .unwrap();

        (vertexes, sidedefs)
    }

    #[test]
    fn round_trips_with_no_back_side() {
        let (vertexes, sidedefs) = fixture();
        let line = Linedef {
            v_start: vertexes.weak_of(0).unwrap(),
            v_end: vertexes.weak_of(1).unwrap(),
            flags: 1,
            special: 0,
            tag: 0,
            front_side: sidedefs.weak_of(0),
            back_side: None,
        };

        let mut buf = Vec::new();
        line.encode(&mut buf).unwrap();
        assert_eq!(buf.len(), 14);
        let back_ord = i16::from_le_bytes(buf[12..14].try_into().unwrap());
        assert_eq!(back_ord, -1);

        let mut c = Cursor::new(buf);
        let decoded = Linedef::decode(&mut c, &vertexes, &sidedefs).unwrap();
        assert_eq!(decoded.v_start.position(), Some(0));
        assert_eq!(decoded.v_end.position(), Some(1));
        assert!(decoded.back_side.is_none());
        assert_eq!(decoded.front_side.unwrap().position(), Some(0));
    }

    #[test]
    fn decode_rejects_out_of_range_vertex_ordinal() {
        let (vertexes, sidedefs) = fixture();
        let mut buf = Vec::new();
        buf.write_i16_le(5).unwrap(); // out of range
        buf.write_i16_le(1).unwrap();
        buf.write_u16_le(0).unwrap();
        buf.write_i16_le(0).unwrap();
        buf.write_i16_le(0).unwrap();
        buf.write_i16_le(-1).unwrap();
        buf.write_i16_le(-1).unwrap();

        let mut c = Cursor::new(buf);
        let err = Linedef::decode(&mut c, &vertexes, &sidedefs).unwrap_err();
        assert!(matches!(err, WadkitError::DanglingRef { record: "Linedef", .. }));
    }

    #[test]
    fn encode_fails_on_dangling_vertex() {
        let (vertexes, sidedefs) = fixture();
        let v_start = vertexes.weak_of(0).unwrap();
        let v_end = vertexes.weak_of(1).unwrap();
        vertexes.erase_at(1).unwrap();

        let line = Linedef {
            v_start,
            v_end,
            flags: 0,
            special: 0,
            tag: 0,
            front_side: sidedefs.weak_of(0),
            back_side: None,
        };
        let mut buf = Vec::new();
        let err = line.encode(&mut buf).unwrap_err();
        assert!(matches!(err, WadkitError::DanglingRef { .. }));
    }
}

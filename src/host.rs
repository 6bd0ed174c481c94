//! Host-facing API: the 1-based positional surface consumed by the CLI.
//!
//! Everything below this module is 0-based. This module exists solely to
//! translate that into the 1-based convention external callers see, and to
//! collapse the internal reference types (`WeakRef<T>`) into plain 1-based
//! ordinals a script host or command driver can print and re-enter.

use crate::directory::{Directory, Lump};
use crate::error::{Result, WadkitError};
use crate::map::{DoomMap, Sector, Sidedef, Thing, Vertex};
use crate::wad::{Wad, WadKind};
use crate::zip::Zip;

fn to_zero_based(pos: usize, len: usize, field: &'static str) -> Result<usize> {
    if pos == 0 || pos > len {
        return Err(WadkitError::OutOfRange {
            field,
            value: pos as i64,
            bound: len as i64,
        });
    }
    Ok(pos - 1)
}

/// Insert positions accept `len + 1` (append).
fn to_zero_based_insert(pos: usize, len: usize, field: &'static str) -> Result<usize> {
    if pos == 0 || pos > len + 1 {
        return Err(WadkitError::OutOfRange {
            field,
            value: pos as i64,
            bound: (len + 1) as i64,
        });
    }
    Ok(pos - 1)
}

/// Normalize a `find` start index per the script-boundary convention:
/// negative counts from the end, 0 is treated as 1 (i.e. "from the start").
fn normalize_find_start(start: i64, len: usize) -> usize {
    if start == 0 {
        return 0;
    }
    if start < 0 {
        let from_end = (-start) as usize;
        return len.saturating_sub(from_end).min(len);
    }
    (start as usize - 1).min(len)
}

/// Owns one open archive's Directory plus, optionally, a map unpacked from
/// it. A CLI collaborator creates one `Session` per script invocation —
/// there is no process-wide state here.
pub struct Session {
    pub directory: Directory,
    pub kind: Option<WadKind>,
}

impl Session {
    pub fn new() -> Self {
        Session {
            directory: Directory::new(),
            kind: None,
        }
    }

    pub fn from_wad_bytes(bytes: &[u8]) -> Result<Self> {
        let wad = Wad::from_bytes(bytes)?;
        Ok(Session {
            directory: wad.directory,
            kind: Some(wad.kind),
        })
    }

    pub fn from_zip_bytes(bytes: &[u8]) -> Result<Self> {
        let zip = Zip::from_bytes(bytes)?;
        Ok(Session {
            directory: zip.directory,
            kind: None,
        })
    }

    pub fn emit_wad(&self, kind: WadKind) -> Result<Vec<u8>> {
        let wad = Wad {
            kind,
            directory: self.directory.clone(),
        };
        wad.to_bytes()
    }

    pub fn emit_zip(&self) -> Result<Vec<u8>> {
        let zip = Zip {
            directory: self.directory.clone(),
        };
        zip.to_bytes()
    }

    pub fn len(&self) -> usize {
        self.directory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directory.is_empty()
    }

    /// `find(name, start)`: 1-based `start`, per the normalization rule in
    /// [`normalize_find_start`]. Returns a 1-based position.
    pub fn find(&self, name: &[u8], start: i64) -> Option<usize> {
        let start0 = normalize_find_start(start, self.directory.len());
        self.directory.find_index(name, start0).map(|p| p + 1)
    }

    pub fn get(&self, pos: usize) -> Result<Lump> {
        let pos0 = to_zero_based(pos, self.directory.len(), "pos")?;
        Ok(self.directory.at(pos0)?.clone())
    }

    pub fn set(&mut self, pos: usize, lump: Lump) -> Result<()> {
        let pos0 = to_zero_based(pos, self.directory.len(), "pos")?;
        *self.directory.at_mut(pos0)? = lump;
        Ok(())
    }

    pub fn insert(&mut self, pos: usize, lump: Lump) -> Result<()> {
        let pos0 = to_zero_based_insert(pos, self.directory.len(), "pos")?;
        self.directory.insert_at(pos0, lump)
    }

    pub fn remove(&mut self, pos: usize) -> Result<Lump> {
        let pos0 = to_zero_based(pos, self.directory.len(), "pos")?;
        self.directory.erase_at(pos0)
    }

    /// Bulk move/copy: copies the 1-based half-open range `[src_start,
    /// src_end)` from `src` into `self` starting at 1-based `dst_pos`.
    /// `src` and `self` may be the same Directory.
    pub fn copy_range(
        src: &Directory,
        src_start: usize,
        src_end: usize,
        dst: &mut Directory,
        dst_pos: usize,
    ) -> Result<()> {
        let src_len = src.len();
        let start0 = to_zero_based_insert(src_start, src_len, "src_start")?;
        let end0 = to_zero_based_insert(src_end, src_len, "src_end")?;
        let dst_pos0 = to_zero_based_insert(dst_pos, dst.len(), "dst_pos")?;
        src.copy_range(start0, end0, dst, dst_pos0)
    }

    /// Unpack the 11-lump map run starting at the 1-based header position.
    pub fn unpack_map(&self, header_pos: usize) -> Result<DoomMap> {
        let pos0 = to_zero_based(header_pos, self.directory.len(), "header_pos")?;
        DoomMap::unpack(&self.directory, pos0)
    }

    /// Pack `map` into a standalone 11-lump Directory under `name`.
    pub fn pack_map(map: &DoomMap, name: &[u8]) -> Result<Directory> {
        map.pack(name)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// 1-based mirror of [`crate::map::Sidedef`]'s `sector_ref`.
pub fn thing_at(map: &DoomMap, pos: usize) -> Result<Thing> {
    let pos0 = to_zero_based(pos, map.things.len(), "pos")?;
    map.things
        .at(pos0)
        .map(|t| *t)
        .ok_or(WadkitError::OutOfRange {
            field: "pos",
            value: pos as i64,
            bound: map.things.len() as i64,
        })
}

pub fn set_thing(map: &DoomMap, pos: usize, value: Thing) -> Result<()> {
    let pos0 = to_zero_based(pos, map.things.len(), "pos")?;
    let mut slot = map.things.mut_at(pos0).ok_or(WadkitError::OutOfRange {
        field: "pos",
        value: pos as i64,
        bound: map.things.len() as i64,
    })?;
    *slot = value;
    Ok(())
}

pub fn vertex_at(map: &DoomMap, pos: usize) -> Result<Vertex> {
    let pos0 = to_zero_based(pos, map.vertexes.len(), "pos")?;
    map.vertexes
        .at(pos0)
        .map(|v| *v)
        .ok_or(WadkitError::OutOfRange {
            field: "pos",
            value: pos as i64,
            bound: map.vertexes.len() as i64,
        })
}

pub fn set_vertex(map: &DoomMap, pos: usize, value: Vertex) -> Result<()> {
    let pos0 = to_zero_based(pos, map.vertexes.len(), "pos")?;
    let mut slot = map.vertexes.mut_at(pos0).ok_or(WadkitError::OutOfRange {
        field: "pos",
        value: pos as i64,
        bound: map.vertexes.len() as i64,
    })?;
    *slot = value;
    Ok(())
}

pub fn sector_at(map: &DoomMap, pos: usize) -> Result<Sector> {
    let pos0 = to_zero_based(pos, map.sectors.len(), "pos")?;
    map.sectors
        .at(pos0)
        .map(|s| s.clone())
        .ok_or(WadkitError::OutOfRange {
            field: "pos",
            value: pos as i64,
            bound: map.sectors.len() as i64,
        })
}

pub fn set_sector(map: &DoomMap, pos: usize, value: Sector) -> Result<()> {
    let pos0 = to_zero_based(pos, map.sectors.len(), "pos")?;
    let mut slot = map.sectors.mut_at(pos0).ok_or(WadkitError::OutOfRange {
        field: "pos",
        value: pos as i64,
        bound: map.sectors.len() as i64,
    })?;
    *slot = value;
    Ok(())
}

/// Host-facing Sidedef: identical fields, `sector_ref` collapsed to a
/// 1-based position (`None` if unresolved).
pub struct HostSidedef {
    pub x_off: i16,
    pub y_off: i16,
    pub upper_tex: Vec<u8>,
    pub middle_tex: Vec<u8>,
    pub lower_tex: Vec<u8>,
    pub sector_ref: Option<usize>,
}

pub fn sidedef_at(map: &DoomMap, pos: usize) -> Result<HostSidedef> {
    let pos0 = to_zero_based(pos, map.sidedefs.len(), "pos")?;
    let side = map.sidedefs.at(pos0).ok_or(WadkitError::OutOfRange {
        field: "pos",
        value: pos as i64,
        bound: map.sidedefs.len() as i64,
    })?;
    Ok(HostSidedef {
        x_off: side.x_off,
        y_off: side.y_off,
        upper_tex: side.upper_tex.clone(),
        middle_tex: side.middle_tex.clone(),
        lower_tex: side.lower_tex.clone(),
        sector_ref: side.sector_ref.as_ref().and_then(|w| w.position()).map(|p| p + 1),
    })
}

pub fn set_sidedef(map: &DoomMap, pos: usize, value: HostSidedef) -> Result<()> {
    let pos0 = to_zero_based(pos, map.sidedefs.len(), "pos")?;
    let sector_ref = match value.sector_ref {
        Some(p1) => {
            let p0 = to_zero_based(p1, map.sectors.len(), "sector_ref")?;
            Some(
                map.sectors
                    .weak_of(p0)
                    .ok_or(WadkitError::DanglingRef {
                        record: "Sidedef",
                        field: "sector_ref",
                    })?,
            )
        }
        None => None,
    };
    let mut slot = map.sidedefs.mut_at(pos0).ok_or(WadkitError::OutOfRange {
        field: "pos",
        value: pos as i64,
        bound: map.sidedefs.len() as i64,
    })?;
    slot.x_off = value.x_off;
    slot.y_off = value.y_off;
    slot.upper_tex = value.upper_tex;
    slot.middle_tex = value.middle_tex;
    slot.lower_tex = value.lower_tex;
    slot.sector_ref = sector_ref;
    Ok(())
}

/// Host-facing Linedef: reference fields collapsed to 1-based positions.
pub struct HostLinedef {
    pub v_start: usize,
    pub v_end: usize,
    pub flags: u16,
    pub special: i16,
    pub tag: i16,
    pub front_side: Option<usize>,
    pub back_side: Option<usize>,
}

pub fn linedef_at(map: &DoomMap, pos: usize) -> Result<HostLinedef> {
    let pos0 = to_zero_based(pos, map.linedefs.len(), "pos")?;
    let line = map.linedefs.at(pos0).ok_or(WadkitError::OutOfRange {
        field: "pos",
        value: pos as i64,
        bound: map.linedefs.len() as i64,
    })?;
    Ok(HostLinedef {
        v_start: line.v_start.position().ok_or(WadkitError::DanglingRef {
            record: "Linedef",
            field: "v_start",
        })? + 1,
        v_end: line.v_end.position().ok_or(WadkitError::DanglingRef {
            record: "Linedef",
            field: "v_end",
        })? + 1,
        flags: line.flags,
        special: line.special,
        tag: line.tag,
        front_side: line.front_side.as_ref().and_then(|w| w.position()).map(|p| p + 1),
        back_side: line.back_side.as_ref().and_then(|w| w.position()).map(|p| p + 1),
    })
}

pub fn set_linedef(map: &DoomMap, pos: usize, value: HostLinedef) -> Result<()> {
    let pos0 = to_zero_based(pos, map.linedefs.len(), "pos")?;
    let v_start0 = to_zero_based(value.v_start, map.vertexes.len(), "v_start")?;
    let v_end0 = to_zero_based(value.v_end, map.vertexes.len(), "v_end")?;
    let v_start = map.vertexes.weak_of(v_start0).ok_or(WadkitError::DanglingRef {
        record: "Linedef",
        field: "v_start",
    })?;
    let v_end = map.vertexes.weak_of(v_end0).ok_or(WadkitError::DanglingRef {
        record: "Linedef",
        field: "v_end",
    })?;
    let front_side = resolve_side_ref(map, value.front_side)?;
    let back_side = resolve_side_ref(map, value.back_side)?;

    let mut slot = map.linedefs.mut_at(pos0).ok_or(WadkitError::OutOfRange {
        field: "pos",
        value: pos as i64,
        bound: map.linedefs.len() as i64,
    })?;
    slot.v_start = v_start;
    slot.v_end = v_end;
    slot.flags = value.flags;
    slot.special = value.special;
    slot.tag = value.tag;
    slot.front_side = front_side;
    slot.back_side = back_side;
    Ok(())
}

fn resolve_side_ref(
    map: &DoomMap,
    pos1: Option<usize>,
) -> Result<Option<crate::imap::WeakRef<Sidedef>>> {
    match pos1 {
        None => Ok(None),
        Some(p1) => {
            let p0 = to_zero_based(p1, map.sidedefs.len(), "side_ref")?;
            Ok(Some(map.sidedefs.weak_of(p0).ok_or(
                WadkitError::DanglingRef {
                    record: "Linedef",
                    field: "front_side/back_side",
                },
            )?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::Sector;

    #[test]
    fn normalize_find_start_zero_means_from_beginning() {
        assert_eq!(normalize_find_start(0, 10), 0);
    }

    #[test]
    fn normalize_find_start_positive_is_one_based() {
        assert_eq!(normalize_find_start(1, 10), 0);
        assert_eq!(normalize_find_start(4, 10), 3);
    }

    #[test]
    fn normalize_find_start_negative_counts_from_end() {
        assert_eq!(normalize_find_start(-1, 10), 9);
        assert_eq!(normalize_find_start(-3, 10), 7);
    }

    #[test]
    fn session_insert_get_remove_round_trip_1_based() {
        let mut s = Session::new();
        s.insert(1, Lump::new(b"A".to_vec(), b"1".to_vec())).unwrap();
        s.insert(2, Lump::new(b"B".to_vec(), b"2".to_vec())).unwrap();
        assert_eq!(s.len(), 2);
        assert_eq!(s.get(1).unwrap().name, b"A");
        assert_eq!(s.get(2).unwrap().name, b"B");
        assert!(s.get(0).is_err());
        assert!(s.get(3).is_err());

        let removed = s.remove(1).unwrap();
        assert_eq!(removed.name, b"A");
        assert_eq!(s.get(1).unwrap().name, b"B");
    }

    #[test]
    fn session_find_returns_1_based_position() {
        let mut s = Session::new();
        s.insert(1, Lump::new(b"THINGS".to_vec(), Vec::new())).unwrap();
        s.insert(2, Lump::new(b"SIDEDEFS".to_vec(), Vec::new())).unwrap();
        assert_eq!(s.find(b"SIDEDEFS", 0), Some(2));
        assert_eq!(s.find(b"SIDEDEFS", 3), None);
    }

    #[test]
    fn copy_range_is_1_based_half_open() {
        let mut src = Directory::new();
        src.push_back(Lump::new(b"A".to_vec(), b"1".to_vec()));
        src.push_back(Lump::new(b"B".to_vec(), b"2".to_vec()));
        src.push_back(Lump::new(b"C".to_vec(), b"3".to_vec()));

        let mut dst = Directory::new();
        dst.push_back(Lump::new(b"Z".to_vec(), b"z".to_vec()));

        // 1-based [2, 4) == B, C
        Session::copy_range(&src, 2, 4, &mut dst, 2).unwrap();
        assert_eq!(dst.len(), 3);
        assert_eq!(dst.at(0).unwrap().name, b"Z");
        assert_eq!(dst.at(1).unwrap().name, b"B");
        assert_eq!(dst.at(2).unwrap().name, b"C");
    }

    #[test]
    fn host_sidedef_round_trips_sector_ref_1_based() {
        let map = DoomMap::new();
        map.sectors.push_back(Sector::default()).unwrap();
        map.sectors.push_back(Sector::default()).unwrap();
        map.sidedefs
            .push_back(Sidedef {
                x_off: 0,
                y_off: 0,
                upper_tex: b"-".to_vec(),
                middle_tex: b"-".to_vec(),
                lower_tex: b"-".to_vec(),
                sector_ref: map.sectors.weak_of(1),
            })
            .unwrap();

        let host = sidedef_at(&map, 1).unwrap();
        assert_eq!(host.sector_ref, Some(2));

        set_sidedef(
            &map,
            1,
            HostSidedef {
                sector_ref: Some(1),
                ..host
            },
        )
        .unwrap();
        let updated = sidedef_at(&map, 1).unwrap();
        assert_eq!(updated.sector_ref, Some(1));
    }
}

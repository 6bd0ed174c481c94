//! DoomMap: the aggregate of Things, Linedefs, Sidedefs, Vertexes, Sectors,
//! plus five opaque byte blobs (segs, ssectors, nodes, reject, blockmap),
//! and the pack/unpack operations that move it in and out of a Directory's
//! canonical 11-lump run.

use std::io::Cursor;

use crate::directory::{Directory, Lump};
use crate::error::{Result, WadkitError};
use crate::imap::IMap;
use crate::map::linedef::Linedef;
use crate::map::sector::Sector;
use crate::map::sidedef::Sidedef;
use crate::map::thing::Thing;
use crate::map::vertex::Vertex;

/// Names of the 10 data lumps that follow a map's header lump, in the
/// canonical order both unpack and pack use.
pub const LUMP_NAMES: [&[u8]; 10] = [
    b"THINGS",
    b"LINEDEFS",
    b"SIDEDEFS",
    b"VERTEXES",
    b"SEGS",
    b"SSECTORS",
    b"NODES",
    b"SECTORS",
    b"REJECT",
    b"BLOCKMAP",
];

pub struct DoomMap {
    pub things: IMap<Thing>,
    pub linedefs: IMap<Linedef>,
    pub sidedefs: IMap<Sidedef>,
    pub vertexes: IMap<Vertex>,
    pub sectors: IMap<Sector>,
    pub segs: Vec<u8>,
    pub ssectors: Vec<u8>,
    pub nodes: Vec<u8>,
    pub reject: Vec<u8>,
    pub blockmap: Vec<u8>,
}

impl DoomMap {
    pub fn new() -> Self {
        DoomMap {
            things: IMap::new(),
            linedefs: IMap::new(),
            sidedefs: IMap::new(),
            vertexes: IMap::new(),
            sectors: IMap::new(),
            segs: Vec::new(),
            ssectors: Vec::new(),
            nodes: Vec::new(),
            reject: Vec::new(),
            blockmap: Vec::new(),
        }
    }

    /// Unpack the 11-lump run starting at `header_pos` (the map-name header
    /// lump) into a `DoomMap`. Decode order within the group is Vertexes →
    /// Sectors → Sidedefs (needs Sectors) → Linedefs (needs Vertexes +
    /// Sidedefs) → Things.
    pub fn unpack(dir: &Directory, header_pos: usize) -> Result<Self> {
        let last = header_pos + LUMP_NAMES.len();
        if last >= dir.len() {
            return Err(WadkitError::OutOfRange {
                field: "header_pos",
                value: header_pos as i64,
                bound: dir.len() as i64,
            });
        }

        let things_lump = dir.at(header_pos + 1)?;
        let linedefs_lump = dir.at(header_pos + 2)?;
        let sidedefs_lump = dir.at(header_pos + 3)?;
        let vertexes_lump = dir.at(header_pos + 4)?;
        let segs_lump = dir.at(header_pos + 5)?;
        let ssectors_lump = dir.at(header_pos + 6)?;
        let nodes_lump = dir.at(header_pos + 7)?;
        let sectors_lump = dir.at(header_pos + 8)?;
        let reject_lump = dir.at(header_pos + 9)?;
        let blockmap_lump = dir.at(header_pos + 10)?;

        let vertexes: IMap<Vertex> = IMap::new();
        decode_stream(&vertexes_lump.data, |c| Vertex::decode(c), &vertexes)?;

        let sectors: IMap<Sector> = IMap::new();
        decode_stream(&sectors_lump.data, |c| Sector::decode(c), &sectors)?;

        let sidedefs: IMap<Sidedef> = IMap::new();
        decode_stream(
            &sidedefs_lump.data,
            |c| Sidedef::decode(c, &sectors),
            &sidedefs,
        )?;

        let linedefs: IMap<Linedef> = IMap::new();
        decode_stream(
            &linedefs_lump.data,
            |c| Linedef::decode(c, &vertexes, &sidedefs),
            &linedefs,
        )?;

        let things: IMap<Thing> = IMap::new();
        decode_stream(&things_lump.data, |c| Thing::decode(c), &things)?;

        Ok(DoomMap {
            things,
            linedefs,
            sidedefs,
            vertexes,
            sectors,
            segs: segs_lump.data.clone(),
            ssectors: ssectors_lump.data.clone(),
            nodes: nodes_lump.data.clone(),
            reject: reject_lump.data.clone(),
            blockmap: blockmap_lump.data.clone(),
        })
    }

    /// Pack into a fresh 11-lump Directory: header lump named `name` with
    /// empty data, then the 10 data lumps in canonical order.
    pub fn pack(&self, name: &[u8]) -> Result<Directory> {
        let mut dir = Directory::new();
        dir.push_back(Lump::new(name.to_vec(), Vec::new()));

        let mut things_buf = Vec::new();
        for t in self.things.iter() {
            t.encode(&mut things_buf)?;
        }
        dir.push_back(Lump::new(LUMP_NAMES[0].to_vec(), things_buf));

        let mut linedefs_buf = Vec::new();
        for l in self.linedefs.iter() {
            l.encode(&mut linedefs_buf)?;
        }
        dir.push_back(Lump::new(LUMP_NAMES[1].to_vec(), linedefs_buf));

        let mut sidedefs_buf = Vec::new();
        for s in self.sidedefs.iter() {
            s.encode(&mut sidedefs_buf)?;
        }
        dir.push_back(Lump::new(LUMP_NAMES[2].to_vec(), sidedefs_buf));

        let mut vertexes_buf = Vec::new();
        for v in self.vertexes.iter() {
            v.encode(&mut vertexes_buf)?;
        }
        dir.push_back(Lump::new(LUMP_NAMES[3].to_vec(), vertexes_buf));

        dir.push_back(Lump::new(LUMP_NAMES[4].to_vec(), self.segs.clone()));
        dir.push_back(Lump::new(LUMP_NAMES[5].to_vec(), self.ssectors.clone()));
        dir.push_back(Lump::new(LUMP_NAMES[6].to_vec(), self.nodes.clone()));

        let mut sectors_buf = Vec::new();
        for s in self.sectors.iter() {
            s.encode(&mut sectors_buf)?;
        }
        dir.push_back(Lump::new(LUMP_NAMES[7].to_vec(), sectors_buf));

        dir.push_back(Lump::new(LUMP_NAMES[8].to_vec(), self.reject.clone()));
        dir.push_back(Lump::new(LUMP_NAMES[9].to_vec(), self.blockmap.clone()));

        Ok(dir)
    }
}

impl Default for DoomMap {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode records from `data` one after another until exhausted, pushing
/// each into `target`. No count prefix: the lump's length implicitly
/// bounds the sequence.
fn decode_stream<T>(
    data: &[u8],
    mut decode_one: impl FnMut(&mut Cursor<&[u8]>) -> Result<T>,
    target: &IMap<T>,
) -> Result<()> {
    let mut cursor = Cursor::new(data);
    let len = data.len() as u64;
    while cursor.position() < len {
        let record = decode_one(&mut cursor)?;
        target.push_back(record)?;
    }
    Ok(())
}

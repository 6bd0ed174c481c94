//! Vertex: `(x, y)`, 4 bytes on disk.

use std::io::{Read, Write};

use crate::codec::{ReadExt, WriteExt};
use crate::error::Result;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Vertex {
    pub x: i16,
    pub y: i16,
}

impl Vertex {
    pub fn decode<R: Read>(r: &mut R) -> Result<Self> {
        let x = r.read_i16_le()?;
        let y = r.read_i16_le()?;
        Ok(Vertex { x, y })
    }

    pub fn encode<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_i16_le(self.x)?;
        w.write_i16_le(self.y)?;
        Ok(())
    }
}

//! Thing: a map actor spawn point. 10 bytes on disk.

use std::io::{Read, Write};

use crate::codec::{ReadExt, WriteExt};
use crate::error::Result;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Thing {
    pub x: i16,
    pub y: i16,
    pub angle: u16,
    pub thing_type: u16,
    /// Opaque 16-bit bag of spawn flags. Bit meaning is not interpreted here.
    pub flags: u16,
}

impl Thing {
    pub fn decode<R: Read>(r: &mut R) -> Result<Self> {
        let x = r.read_i16_le()?;
        let y = r.read_i16_le()?;
        let angle = r.read_u16_le()?;
        let thing_type = r.read_u16_le()?;
        let flags = r.read_u16_le()?;
        Ok(Thing {
            x,
            y,
            angle,
            thing_type,
            flags,
        })
    }

    pub fn encode<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_i16_le(self.x)?;
        w.write_i16_le(self.y)?;
        w.write_u16_le(self.angle)?;
        w.write_u16_le(self.thing_type)?;
        w.write_u16_le(self.flags)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn round_trips_and_is_10_bytes() {
        let t = Thing {
            x: 100,
            y: -200,
            angle: 90,
            thing_type: 1,
            flags: 0x0007,
        };
        let mut buf = Vec::new();
        t.encode(&mut buf).unwrap();
        assert_eq!(buf.len(), 10);
        let mut c = Cursor::new(buf);
        assert_eq!(Thing::decode(&mut c).unwrap(), t);
    }
}

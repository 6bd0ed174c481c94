//! Sector: floor/ceiling heights and textures, light, special, tag. 26 bytes.

use std::io::{Read, Write};

use crate::codec::{ReadExt, WriteExt};
use crate::error::Result;

const TEX_LEN: usize = 8;

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Sector {
    pub floor_h: i16,
    pub ceil_h: i16,
    pub floor_tex: Vec<u8>,
    pub ceil_tex: Vec<u8>,
    pub light: i16,
    pub special: i16,
    pub tag: i16,
}

impl Sector {
    pub fn decode<R: Read>(r: &mut R) -> Result<Self> {
        let floor_h = r.read_i16_le()?;
        let ceil_h = r.read_i16_le()?;
        let floor_tex = r.read_fixed_string(TEX_LEN)?;
        let ceil_tex = r.read_fixed_string(TEX_LEN)?;
        let light = r.read_i16_le()?;
        let special = r.read_i16_le()?;
        let tag = r.read_i16_le()?;
        Ok(Sector {
            floor_h,
            ceil_h,
            floor_tex,
            ceil_tex,
            light,
            special,
            tag,
        })
    }

    pub fn encode<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_i16_le(self.floor_h)?;
        w.write_i16_le(self.ceil_h)?;
        w.write_fixed_string(&self.floor_tex, TEX_LEN)?;
        w.write_fixed_string(&self.ceil_tex, TEX_LEN)?;
        w.write_i16_le(self.light)?;
        w.write_i16_le(self.special)?;
        w.write_i16_le(self.tag)?;
        Ok(())
    }
}

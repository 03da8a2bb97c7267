/// ==============================================================================================
/// =================================== Binary Path Writer =======================================
/// ==============================================================================================

use std::io::{Result, Write};

use byteorder::{LittleEndian, WriteBytesExt};

use crate::params::model::{ModelParams, TimeType};
use crate::stats::SummaryStats;

/// Shape of one serialised path frame, fixed once per run:
///     - `Reg`:            u32 nbins | u32 maxedout | i32 extinction |
///                         u32[nbins] inf | u32[nbins] newinf
///     - `RegPostest`:     Reg + u32[nbins] newpostest
///     - `Reltime`:        u32 nbins | u32 negbins | u32 maxedout |
///                         i32 extinction | u32[nbins] inf | u32[nbins] newinf
///                         (nbins includes the negbins leading bins)
///     - `ReltimePostest`: Reltime + u32[nbins] newpostest
///     All integers little-endian. The extinction field is
///     floor(extinction_time) for extinct paths and -i32::MAX otherwise.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FrameShape {
    Reg,
    RegPostest,
    Reltime,
    ReltimePostest,
}

impl FrameShape {
    /// Shape implied by the solved parameter record: shifted time origins
    /// emit relative-time frames, a configured positive-test model appends
    /// the newpostest timeline.
    pub fn select(pars: &ModelParams) -> Self {
        match (pars.timetype != TimeType::PriCreated, pars.has_postest()) {
            (false, false) => FrameShape::Reg,
            (false, true) => FrameShape::RegPostest,
            (true, false) => FrameShape::Reltime,
            (true, true) => FrameShape::ReltimePostest,
        }
    }

    #[inline]
    pub fn relative(&self) -> bool {
        matches!(self, FrameShape::Reltime | FrameShape::ReltimePostest)
    }

    #[inline]
    pub fn postest(&self) -> bool {
        matches!(self, FrameShape::RegPostest | FrameShape::ReltimePostest)
    }

    /// Serialise one path.
    ///     The bin range is trimmed from the right down to the last bin where
    ///     inf (or, for postest shapes, newpostest) is nonzero, and — for the
    ///     relative shapes only — from the left up to the first nonzero inf
    ///     bin, never past bin 0.
    pub fn write_path(&self, stats: &SummaryStats, buf: &mut impl Write) -> Result<()> {
        let postest = self.postest();

        let mut bmax = stats.npos() - 1;
        while bmax > 0
            && stats.inf_at(bmax) == 0
            && (!postest || stats.newpostest_at(bmax) == 0)
        {
            bmax -= 1;
        }

        let mut bmin = if self.relative() { -stats.shift() } else { 0 };
        if self.relative() {
            while bmin < 0 && stats.inf_at(bmin) == 0 {
                bmin += 1;
            }
        }

        let nbins = (bmax - bmin + 1) as u32;
        buf.write_u32::<LittleEndian>(nbins)?;
        if self.relative() {
            buf.write_u32::<LittleEndian>((-bmin) as u32)?;
        }
        buf.write_u32::<LittleEndian>(stats.nimaxedoutmintimeindex as u32)?;
        let extinction = if stats.extinction {
            stats.extinction_time.floor() as i32
        } else {
            -i32::MAX
        };
        buf.write_i32::<LittleEndian>(extinction)?;

        for b in bmin..=bmax {
            buf.write_u32::<LittleEndian>(stats.inf_at(b))?;
        }
        for b in bmin..=bmax {
            buf.write_u32::<LittleEndian>(stats.newinf_at(b))?;
        }
        if postest {
            for b in bmin..=bmax {
                buf.write_u32::<LittleEndian>(stats.newpostest_at(b))?;
            }
        }
        Ok(())
    }
}

/// ==============================================================================================
/// ================================== Contact-Tracing Log =======================================
/// ==============================================================================================

use std::io::{Result, Write};

use byteorder::{LittleEndian, WriteBytesExt};

const INIT_NACTENTRIES: usize = 16; // initial entry-pool size
const MINUTES_PER_BIN: f64 = 1440.0;

/// One recorded true-positive test. Times are in minutes (1440 per integer
/// time bin).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CtEntry {
    pub postesttime: u32,
    pub presymtime: u32,
    pub id: u32,
    pub pid: u32,
    pub ntracedcts: u32,
}

/// Path-local contact-tracing state.
///     Individual ids are handed out at frame push; an entry is recorded for
///     every true-positive test, and each new entry bumps `ntracedcts` on the
///     nearest traced ancestor (the positive tests reachable through traced
///     contacts). The pool is reused across paths.
pub struct CtLog {
    entries: Vec<CtEntry>,
    next_id: u32,
}

impl CtLog {
    pub fn new() -> Self {
        Self {
            entries: Vec::with_capacity(INIT_NACTENTRIES),
            next_id: 0,
        }
    }

    pub fn path_init(&mut self) {
        self.entries.clear();
        self.next_id = 0;
    }

    /// Path-local id for a freshly pushed frame.
    #[inline]
    pub fn next_frame_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Record a positive test.
    ///     `postesttime` / `presymtime` are in bin units; `ancestor_entry` is
    ///     the nearest traced entry up the stack (u32::MAX for none), whose
    ///     traced-contact count this test increments. Returns the new entry's
    ///     pool index.
    pub fn record_positive(
        &mut self,
        postesttime: f64,
        presymtime: f64,
        id: u32,
        pid: u32,
        ancestor_entry: u32,
    ) -> u32 {
        if ancestor_entry != u32::MAX {
            self.entries[ancestor_entry as usize].ntracedcts += 1;
        }
        self.entries.push(CtEntry {
            postesttime: (postesttime.max(0.0) * MINUTES_PER_BIN) as u32,
            presymtime: (presymtime.max(0.0) * MINUTES_PER_BIN) as u32,
            id,
            pid,
            ntracedcts: 0,
        });
        (self.entries.len() - 1) as u32
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialise this path's entries: sorted ascending by test time, 20
    /// little-endian bytes each; entries past the maxed-out time index are
    /// dropped when the path maxed out.
    pub fn write_path(&mut self, maxedoutmintimeindex: i32, buf: &mut impl Write) -> Result<()> {
        self.entries.sort_unstable_by_key(|e| e.postesttime);

        for e in &self.entries {
            if maxedoutmintimeindex != i32::MAX
                && (e.postesttime as f64 / MINUTES_PER_BIN).floor() as i32 > maxedoutmintimeindex
            {
                continue;
            }
            buf.write_u32::<LittleEndian>(e.postesttime)?;
            buf.write_u32::<LittleEndian>(e.presymtime)?;
            buf.write_u32::<LittleEndian>(e.id)?;
            buf.write_u32::<LittleEndian>(e.pid)?;
            buf.write_u32::<LittleEndian>(e.ntracedcts)?;
        }
        Ok(())
    }
}

impl Default for CtLog {
    fn default() -> Self {
        Self::new()
    }
}

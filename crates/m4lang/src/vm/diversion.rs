//! Output diversions.
//!
//! Non-argument output is multiplexed over ten numbered byte buffers plus a
//! discard sink. Diversion 0 is the primary output: it is flushed to the
//! output writer opportunistically while the interpreter runs. Diversions
//! 1 through 9 accumulate until they are explicitly undiverted or until the
//! run terminates, at which point they are flushed in numeric order. Writes
//! to the sink are dropped.

use std::io;

/// The number of numbered diversion buffers.
pub const DIVERSION_COUNT: usize = 10;

/// Selects the diversion that receives non-argument output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// One of the numbered buffers, 0 through 9.
    Buffer(u8),
    /// The discard sink (diversion -1).
    Sink,
}

pub(crate) struct DiversionSet {
    buffers: [Vec<u8>; DIVERSION_COUNT],
    current: Selection,
}

impl DiversionSet {
    pub(crate) fn new() -> DiversionSet {
        DiversionSet {
            buffers: Default::default(),
            current: Selection::Buffer(0),
        }
    }

    /// Append bytes to the current diversion.
    pub(crate) fn write(&mut self, bytes: &[u8]) {
        match self.current {
            Selection::Buffer(n) => self.buffers[usize::from(n)].extend_from_slice(bytes),
            Selection::Sink => {}
        }
    }

    pub(crate) fn select(&mut self, selection: Selection) {
        debug_assert!(matches!(selection, Selection::Sink | Selection::Buffer(0..=9)));
        self.current = selection;
    }

    /// The current diversion number: 0 through 9, or -1 for the sink.
    pub(crate) fn number(&self) -> i64 {
        match self.current {
            Selection::Buffer(n) => i64::from(n),
            Selection::Sink => -1,
        }
    }

    fn flush_buffer(&mut self, n: usize, writer: &mut dyn io::Write) -> io::Result<()> {
        if self.buffers[n].is_empty() {
            return Ok(());
        }
        writer.write_all(&self.buffers[n])?;
        writer.flush()?;
        self.buffers[n].clear();
        Ok(())
    }

    /// Flush diversion 0 to the writer.
    pub(crate) fn flush_primary(&mut self, writer: &mut dyn io::Write) -> io::Result<()> {
        self.flush_buffer(0, writer)
    }

    /// Flush diversions 0 through 9 to the writer, in numeric order.
    pub(crate) fn flush_all(&mut self, writer: &mut dyn io::Write) -> io::Result<()> {
        for n in 0..DIVERSION_COUNT {
            self.flush_buffer(n, writer)?;
        }
        Ok(())
    }

    /// Undivert buffer `n`, which must be 1 through 9.
    ///
    /// From diversion 0 the buffer is flushed to the writer; from any other
    /// diversion it is appended to the current diversion, unless the current
    /// diversion is buffer `n` itself. The source buffer is cleared.
    pub(crate) fn undivert(&mut self, n: u8, writer: &mut dyn io::Write) -> io::Result<()> {
        debug_assert!((1..=9).contains(&n));
        let n = usize::from(n);
        match self.current {
            Selection::Buffer(0) => self.flush_buffer(n, writer)?,
            Selection::Buffer(current) => {
                let current = usize::from(current);
                if current != n {
                    let source = std::mem::take(&mut self.buffers[n]);
                    self.buffers[current].extend_from_slice(&source);
                }
            }
            // A write to the sink is dropped, so undiverting into it
            // discards the source.
            Selection::Sink => self.buffers[n].clear(),
        }
        Ok(())
    }
}

use crate::error::Error;

/// Addressed block access to the nonvolatile cell space.
///
/// [`Fram`](crate::Fram) is the canonical implementation; wrappers that add
/// cross-cutting behavior (error tallying, tracing) implement it by
/// delegation and sit between a [`DataManager`](crate::DataManager) and the
/// chip. Neither side bounds-checks `cell_address + buf.len()` against the
/// device capacity.
pub trait BlockDevice {
    fn write_block(&mut self, buf: &[u8], cell_address: u16) -> Result<(), Error>;

    fn read_block(&mut self, buf: &mut [u8], cell_address: u16) -> Result<(), Error>;
}

impl<D: BlockDevice> BlockDevice for &mut D {
    fn write_block(&mut self, buf: &[u8], cell_address: u16) -> Result<(), Error> {
        (*self).write_block(buf, cell_address)
    }

    fn read_block(&mut self, buf: &mut [u8], cell_address: u16) -> Result<(), Error> {
        (*self).read_block(buf, cell_address)
    }
}

/// A pass-through [`BlockDevice`] that tallies failed transfers.
///
/// Errors still propagate to the caller unchanged; the counters only
/// aggregate them so firmware can inspect memory health at one place
/// instead of threading every result through.
pub struct Counted<D> {
    inner: D,
    read_errors: u32,
    write_errors: u32,
}

impl<D: BlockDevice> Counted<D> {
    pub fn new(inner: D) -> Self {
        Self {
            inner,
            read_errors: 0,
            write_errors: 0,
        }
    }

    /// Number of failed reads since creation or the last reset.
    pub fn read_errors(&self) -> u32 {
        self.read_errors
    }

    /// Number of failed writes since creation or the last reset.
    pub fn write_errors(&self) -> u32 {
        self.write_errors
    }

    pub fn reset_errors(&mut self) {
        self.read_errors = 0;
        self.write_errors = 0;
    }

    pub fn into_inner(self) -> D {
        self.inner
    }
}

impl<D: BlockDevice> BlockDevice for Counted<D> {
    fn write_block(&mut self, buf: &[u8], cell_address: u16) -> Result<(), Error> {
        let result = self.inner.write_block(buf, cell_address);
        if result.is_err() {
            self.write_errors += 1;
        }
        result
    }

    fn read_block(&mut self, buf: &mut [u8], cell_address: u16) -> Result<(), Error> {
        let result = self.inner.read_block(buf, cell_address);
        if result.is_err() {
            self.read_errors += 1;
        }
        result
    }
}

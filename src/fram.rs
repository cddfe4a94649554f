use crate::device::BlockDevice;
use crate::error::Error;
#[cfg(feature = "defmt")]
use defmt::trace;
use embedded_hal::i2c::I2c;

/// Largest payload of a single framed write. The devices this driver targets
/// accept longer bursts, but the record overlay never stores fields wider
/// than this, and a small fixed frame keeps the driver allocation free.
pub const MAX_BLOCK_SIZE: usize = 4;

/// Cell address header in front of every write payload: 16 bits, big-endian.
const ADDRESS_HEADER: usize = 2;

/// Filler byte written across the address range during capacity discovery.
const FILLER: u8 = 0xA0;
/// Marker byte planted at cell 0; its reappearance reveals the wrap index.
const MARKER: u8 = 0xB0;

/// Driver for I2C FRAM chips with 16-bit cell addressing.
///
/// Every cell is an independently addressable byte; there are no pages,
/// erase cycles or write delays to manage. Writes frame a big-endian cell
/// address in front of the payload in one bus transfer; reads position the
/// chip's internal pointer with an address-select write and then stream
/// bytes. Nothing here retries: a failed transfer is reported once.
pub struct Fram<I2C> {
    i2c: I2C,
    device_address: u8,
    capacity: u16,
}

impl<I2C: I2c> Fram<I2C> {
    /// Creates a driver for the chip at the given 7-bit bus address with
    /// `capacity` addressable cells.
    pub fn new(i2c: I2C, device_address: u8, capacity: u16) -> Self {
        Self {
            i2c,
            device_address,
            capacity,
        }
    }

    /// Declared number of addressable cells.
    pub fn capacity(&self) -> u16 {
        self.capacity
    }

    /// Releases the underlying bus.
    pub fn release(self) -> I2C {
        self.i2c
    }

    /// Writes a block of up to [`MAX_BLOCK_SIZE`] bytes starting at
    /// `cell_address`, as one framed bus transfer. Zero-length blocks
    /// succeed without touching the bus. The address is not checked against
    /// the capacity; cells past the end wrap around on most devices.
    pub fn write_block(&mut self, buf: &[u8], cell_address: u16) -> Result<(), Error> {
        if buf.len() > MAX_BLOCK_SIZE {
            return Err(Error::BlockTooLarge);
        }
        if buf.is_empty() {
            return Ok(());
        }

        #[cfg(feature = "defmt")]
        trace!("write_block @{:#06x}: [{}]", cell_address, buf.len());

        let mut frame = [0u8; ADDRESS_HEADER + MAX_BLOCK_SIZE];
        frame[..ADDRESS_HEADER].copy_from_slice(&cell_address.to_be_bytes());
        frame[ADDRESS_HEADER..ADDRESS_HEADER + buf.len()].copy_from_slice(buf);

        self.i2c
            .write(self.device_address, &frame[..ADDRESS_HEADER + buf.len()])
            .map_err(|_| Error::Bus)
    }

    /// Reads `buf.len()` bytes starting at `cell_address`. Two-phase: an
    /// address-select write positions the chip's internal pointer, then a
    /// pure read streams the data. If the select fails the read is never
    /// attempted. Zero-length blocks succeed without touching the bus.
    pub fn read_block(&mut self, buf: &mut [u8], cell_address: u16) -> Result<(), Error> {
        if buf.is_empty() {
            return Ok(());
        }

        #[cfg(feature = "defmt")]
        trace!("read_block @{:#06x}: [{}]", cell_address, buf.len());

        self.select_address(cell_address)?;
        self.i2c
            .read(self.device_address, buf)
            .map_err(|_| Error::Bus)
    }

    /// Verifies every cell by reading it, writing back its bitwise
    /// complement and reading that again, failing at the first mismatch.
    ///
    /// Destructive (memory ends up complemented) and linear in capacity.
    /// Commissioning tool, not a runtime path.
    pub fn self_test(&mut self) -> Result<(), Error> {
        for address in 0..self.capacity {
            let mut cell = [0u8; 1];
            self.read_block(&mut cell, address)?;
            cell[0] = !cell[0];
            self.write_block(&cell, address)?;

            let mut check = [0u8; 1];
            self.read_block(&mut check, address)?;
            if check != cell {
                return Err(Error::CellFault(address));
            }
        }
        Ok(())
    }

    /// Measures the cell count of an unknown chip: fills the whole 16-bit
    /// address range with a filler byte, plants a distinct marker at cell 0,
    /// then scans forward until the marker reappears where the address space
    /// wrapped back around.
    ///
    /// Calibration tool only. It relies on the chip aliasing addresses past
    /// its last cell back to 0 and on the marker never matching leftover
    /// filler, both of which must be checked against the target's datasheet.
    /// Linear in the address range, so slow.
    pub fn discover_capacity(&mut self) -> Result<u16, Error> {
        for address in 0..u16::MAX {
            self.write_block(&[FILLER], address)?;
        }
        self.write_block(&[MARKER], 0)?;

        for address in 1..u16::MAX {
            let mut cell = [0u8; 1];
            self.read_block(&mut cell, address)?;
            if cell[0] == MARKER {
                return Ok(address);
            }
        }
        Err(Error::CapacityNotFound)
    }

    /// Writes `value` to every cell up to the declared capacity.
    pub fn fill(&mut self, value: u8) -> Result<(), Error> {
        for address in 0..self.capacity {
            self.write_block(&[value], address)?;
        }
        Ok(())
    }

    fn select_address(&mut self, cell_address: u16) -> Result<(), Error> {
        self.i2c
            .write(self.device_address, &cell_address.to_be_bytes())
            .map_err(|_| Error::Bus)
    }
}

impl<I2C: I2c> BlockDevice for Fram<I2C> {
    fn write_block(&mut self, buf: &[u8], cell_address: u16) -> Result<(), Error> {
        Fram::write_block(self, buf, cell_address)
    }

    fn read_block(&mut self, buf: &mut [u8], cell_address: u16) -> Result<(), Error> {
        Fram::read_block(self, buf, cell_address)
    }
}

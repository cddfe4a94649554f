#![allow(dead_code)]

// filename according to https://doc.rust-lang.org/book/ch11-03-test-organization.html
use embedded_hal::i2c::{self, ErrorKind, ErrorType, I2c, Operation, SevenBitAddress};

pub const DEVICE_ADDRESS: u8 = 0x50;

/// Simulated I2C FRAM chip.
///
/// Writes take the first two bytes of the frame as a big-endian cell address
/// and store the rest sequentially; reads stream from the internal pointer.
/// Addresses past the last cell wrap back to 0, the same aliasing the real
/// chips exhibit and which capacity discovery depends on.
pub struct MockFram {
    pub mem: Vec<u8>,
    pointer: usize,
    pub transfers: Vec<Transfer>,
    pub fail_after_transfer: usize,
    /// A cell that silently ignores writes, for self-test failure cases.
    pub stuck_cell: Option<usize>,
}

/// One bus-level transfer as seen on the wire.
#[derive(Debug, PartialEq, Clone)]
pub enum Transfer {
    Write(Vec<u8>),
    Read(usize),
}

impl MockFram {
    pub fn new(capacity: usize) -> Self {
        Self {
            mem: vec![0x00; capacity],
            pointer: 0,
            transfers: Vec::new(),
            fail_after_transfer: usize::MAX,
            stuck_cell: None,
        }
    }

    pub fn new_with_fault(capacity: usize, fail_after_transfer: usize) -> Self {
        Self {
            fail_after_transfer,
            ..Self::new(capacity)
        }
    }

    pub fn disable_faults(&mut self) {
        self.fail_after_transfer = usize::MAX;
    }

    pub fn len(&self) -> usize {
        self.mem.len()
    }

    pub fn writes(&self) -> usize {
        self.transfers
            .iter()
            .filter(|t| matches!(t, Transfer::Write(_)))
            .count()
    }

    pub fn dump_transfers(&self) {
        println!("Transfers:");
        for transfer in &self.transfers {
            println!("  {:?}", transfer);
        }
    }
}

#[derive(Debug)]
pub struct BusFault;

impl i2c::Error for BusFault {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

impl ErrorType for MockFram {
    type Error = BusFault;
}

impl I2c for MockFram {
    fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        assert_eq!(address, DEVICE_ADDRESS);

        for operation in operations.iter_mut() {
            if self.transfers.len() >= self.fail_after_transfer {
                println!("    fram: FAULT");
                return Err(BusFault);
            }

            match operation {
                Operation::Write(bytes) => {
                    println!(
                        "    fram: write: [{:02X?}] #{:>2}",
                        bytes,
                        self.transfers.len()
                    );
                    assert!(bytes.len() >= 2, "write frame is missing the address header");
                    self.transfers.push(Transfer::Write(bytes.to_vec()));

                    let (header, payload) = bytes.split_at(2);
                    self.pointer = u16::from_be_bytes([header[0], header[1]]) as usize;
                    for &byte in payload {
                        let cell = self.pointer % self.mem.len();
                        if Some(cell) != self.stuck_cell {
                            self.mem[cell] = byte;
                        }
                        self.pointer += 1;
                    }
                }
                Operation::Read(buf) => {
                    println!(
                        "    fram: read:  [{:#06x}] #{:>2}",
                        buf.len(),
                        self.transfers.len()
                    );
                    self.transfers.push(Transfer::Read(buf.len()));

                    for byte in buf.iter_mut() {
                        *byte = self.mem[self.pointer % self.mem.len()];
                        self.pointer += 1;
                    }
                }
            }
        }
        Ok(())
    }
}

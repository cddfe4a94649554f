use thiserror::Error;

/// Errors that can occur during FRAM operations. Marked as non-exhaustive to
/// allow for future additions without breaking the API. A caller would likely
/// only need to handle `Bus`, as the other errors are static or only surface
/// from the commissioning routines.
#[derive(Error, Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum Error {
    /// The bus did not acknowledge or complete a transfer. The underlying
    /// HAL error is not preserved; wrappers such as [`Counted`](crate::Counted)
    /// keep aggregate failure counts instead.
    #[error("bus transfer failed")]
    Bus,

    /// The requested block exceeds the framed payload limit
    /// ([`MAX_BLOCK_SIZE`](crate::MAX_BLOCK_SIZE) bytes). This is a
    /// programming error in the caller, not a transient condition.
    #[error("block exceeds the framed payload limit")]
    BlockTooLarge,

    /// Self test read back a different value than was written to this cell.
    #[error("cell {0:#06x} failed read-back verification")]
    CellFault(u16),

    /// Capacity discovery exhausted the address range without the marker
    /// byte reappearing. The device is absent, dead or does not wrap its
    /// address space.
    #[error("wrap-around marker not found")]
    CapacityNotFound,
}

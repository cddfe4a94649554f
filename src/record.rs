use crate::device::BlockDevice;
use crate::error::Error;
use crate::fram::MAX_BLOCK_SIZE;

/// A primitive that can live in a record field: knows its persisted width
/// and how to move itself through the byte buffer handed to the device.
///
/// Payload bytes are little-endian. Together with the field offsets this IS
/// the on-device format, so it must stay stable across firmware builds
/// sharing a chip.
pub trait Value: Copy {
    /// Persisted width in bytes. Must not exceed [`MAX_BLOCK_SIZE`].
    const SIZE: usize;

    fn write_to(self, buf: &mut [u8]);

    fn read_from(buf: &[u8]) -> Self;
}

macro_rules! impl_value {
    ($($ty:ty),*) => {
        $(
            impl Value for $ty {
                const SIZE: usize = size_of::<$ty>();

                fn write_to(self, buf: &mut [u8]) {
                    buf.copy_from_slice(&self.to_le_bytes());
                }

                fn read_from(buf: &[u8]) -> Self {
                    let mut bytes = [0u8; size_of::<$ty>()];
                    bytes.copy_from_slice(buf);
                    Self::from_le_bytes(bytes)
                }
            }
        )*
    };
}

impl_value!(u8, i8, u16, i16, u32, i32, f32);

impl Value for bool {
    const SIZE: usize = 1;

    fn write_to(self, buf: &mut [u8]) {
        buf[0] = self as u8;
    }

    fn read_from(buf: &[u8]) -> Self {
        buf[0] != 0
    }
}

/// One named, typed member of a record schema, bound to a fixed byte offset
/// in the cell space.
///
/// The binding is declared once, next to the record type, and never
/// recomputed. Offsets must not produce overlapping `[offset, offset +
/// SIZE)` ranges between fields, and the last field must end within the
/// record's declared footprint.
///
/// ```rust,ignore
/// const BOOT_COUNT: Field<Settings, u32> =
///     Field::new(0, |r| r.boot_count, |r, v| r.boot_count = v);
/// ```
pub struct Field<R, T> {
    offset: u16,
    get: fn(&R) -> T,
    set: fn(&mut R, T),
}

// Derived impls would demand R: Copy/Clone, which a field handle doesn't need.
impl<R, T> Copy for Field<R, T> {}

impl<R, T> Clone for Field<R, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R, T: Value> Field<R, T> {
    /// Binds a field at `offset` to its accessors on the record type.
    pub const fn new(offset: u16, get: fn(&R) -> T, set: fn(&mut R, T)) -> Self {
        Self { offset, get, set }
    }

    /// Byte offset of this field in the cell space.
    pub const fn offset(&self) -> u16 {
        self.offset
    }

    /// Persisted width of this field in bytes.
    pub const fn size(&self) -> usize {
        T::SIZE
    }
}

/// A record schema: the fixed set of fields firmware persists, plus the
/// factory values a freshly provisioned device holds.
pub trait Record: Sized {
    /// Total declared byte footprint of the schema, for sizing the backing
    /// region or validating it against a discovered capacity.
    const SIZE: u16;

    /// Factory default values. Built once per [`DataManager`]; comparing a
    /// loaded record against them is how blank or corrupted memory is
    /// detected.
    fn defaults() -> Self;
}

/// Maps a record of typed fields onto the cell space of a [`BlockDevice`]
/// and moves individual fields between the in-memory record and the chip.
///
/// Owns two instances of the record: the live one firmware works with, and
/// an immutable default twin. Each manager is a self-contained unit, so
/// tests (or dual-bank layouts) can run several side by side.
pub struct DataManager<R, D> {
    device: D,
    live: R,
    defaults: R,
}

impl<R: Record, D: BlockDevice> DataManager<R, D> {
    /// Creates a manager over `device`. Both the live record and its
    /// default twin start out at the factory values; call [`load`] per
    /// field to pull the persisted state in.
    ///
    /// [`load`]: DataManager::load
    pub fn new(device: D) -> Self {
        Self {
            device,
            live: R::defaults(),
            defaults: R::defaults(),
        }
    }

    /// The working record.
    pub fn live(&self) -> &R {
        &self.live
    }

    /// Mutable access to the working record. Changes only reach the chip
    /// through [`store`](DataManager::store).
    pub fn live_mut(&mut self) -> &mut R {
        &mut self.live
    }

    /// The factory-default twin.
    pub fn defaults(&self) -> &R {
        &self.defaults
    }

    /// Persists the live record's value of `field` at the field's offset.
    pub fn store<T: Value>(&mut self, field: Field<R, T>) -> Result<(), Error> {
        self.write((field.get)(&self.live), field)
    }

    /// Reads `field` from the chip into the live record. On failure the
    /// live field keeps its previous value.
    pub fn load<T: Value>(&mut self, field: Field<R, T>) -> Result<(), Error> {
        let value = self.read(field)?;
        (field.set)(&mut self.live, value);
        Ok(())
    }

    /// Persists a caller-supplied value at the field's offset, leaving the
    /// live record untouched. Useful for staging values before committing
    /// them into the live instance.
    pub fn write<T: Value>(&mut self, value: T, field: Field<R, T>) -> Result<(), Error> {
        let mut buf = [0u8; MAX_BLOCK_SIZE];
        value.write_to(&mut buf[..T::SIZE]);
        self.device.write_block(&buf[..T::SIZE], field.offset())
    }

    /// Reads the field's persisted value without touching the live record.
    pub fn read<T: Value>(&mut self, field: Field<R, T>) -> Result<T, Error> {
        let mut buf = [0u8; MAX_BLOCK_SIZE];
        self.device.read_block(&mut buf[..T::SIZE], field.offset())?;
        Ok(T::read_from(&buf[..T::SIZE]))
    }

    /// Total declared byte footprint of the record schema.
    pub const fn size_of_data() -> u16 {
        R::SIZE
    }

    /// Releases the underlying block device.
    pub fn release(self) -> D {
        self.device
    }
}

#![doc = include_str!("../README.md")]
#![no_std]

pub mod error;

mod device;
mod fram;
mod record;

pub use device::{BlockDevice, Counted};
pub use fram::{Fram, MAX_BLOCK_SIZE};
pub use record::{DataManager, Field, Record, Value};

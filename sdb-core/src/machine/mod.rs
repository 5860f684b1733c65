//! Machine state accessors
//!
//! The evaluator only ever reads registers and memory words; stepping and
//! register dumps are needed by the monitor session.

mod simple;

pub use simple::SimpleMachine;

use thiserror::Error;

/// Machine word. Arithmetic on it is always wrapping.
#[cfg(not(feature = "word64"))]
pub type Word = u32;

/// Machine word. Arithmetic on it is always wrapping.
#[cfg(feature = "word64")]
pub type Word = u64;

/// Width of a [`Word`] in bytes
pub const WORD_BYTES: usize = std::mem::size_of::<Word>();

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MachineError {
    #[error("Unknown register name: '{name}'")]
    UnknownRegister { name: String },

    #[error("Address 0x{addr:x} is outside physical memory")]
    AddressOutOfBounds { addr: u64 },
}

impl MachineError {
    pub fn unknown_register(name: impl Into<String>) -> Self {
        MachineError::UnknownRegister { name: name.into() }
    }
}

/// Read-only view of machine state used during expression evaluation
pub trait MachineAccess {
    /// Current value of the register called `name` (without the `$` sigil)
    fn register(&self, name: &str) -> Result<Word, MachineError>;

    /// Read one word of memory at `addr`
    fn read_word(&self, addr: Word) -> Result<Word, MachineError>;
}

/// A steppable machine
pub trait Machine: MachineAccess {
    /// Execute a single instruction
    fn step(&mut self) -> Result<(), MachineError>;

    /// Assign a register by name
    fn set_register(&mut self, name: &str, value: Word) -> Result<(), MachineError>;

    /// Current program counter
    fn pc(&self) -> Word;

    /// All registers in display order
    fn registers(&self) -> Vec<(&'static str, Word)>;
}

impl<T: MachineAccess + ?Sized> MachineAccess for &T {
    fn register(&self, name: &str) -> Result<Word, MachineError> {
        (**self).register(name)
    }

    fn read_word(&self, addr: Word) -> Result<Word, MachineError> {
        (**self).read_word(addr)
    }
}

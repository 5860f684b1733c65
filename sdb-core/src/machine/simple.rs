//! A minimal simulated machine
//!
//! RV32-style general purpose registers, a program counter and one flat
//! little-endian memory region. Each step executes a no-op that falls through
//! to the next instruction.

use crate::config::MachineConfig;

use super::{Machine, MachineAccess, MachineError, Word, WORD_BYTES};

/// ABI names of the general purpose registers, indexed by register number
const GPR_NAMES: [&str; 32] = [
    "zero", "ra", "sp", "gp", "tp", "t0", "t1", "t2", "s0", "s1", "a0", "a1", "a2", "a3", "a4",
    "a5", "a6", "a7", "s2", "s3", "s4", "s5", "s6", "s7", "s8", "s9", "s10", "s11", "t3", "t4",
    "t5", "t6",
];

/// Width of one instruction in bytes
const INSN_BYTES: Word = 4;

#[derive(Debug, Clone)]
pub struct SimpleMachine {
    gpr: [Word; 32],
    pc: Word,
    mem_base: Word,
    memory: Vec<u8>,
}

impl SimpleMachine {
    pub fn new(config: &MachineConfig) -> Self {
        Self {
            gpr: [0; 32],
            pc: config.reset_pc,
            mem_base: config.mem_base,
            memory: vec![0; config.mem_size],
        }
    }

    /// Map a register name to its GPR index. `None` for `pc` and unknown names.
    fn gpr_index(name: &str) -> Option<usize> {
        match name {
            "0" => Some(0),
            "fp" => Some(8),
            _ => GPR_NAMES.iter().position(|&n| n == name),
        }
    }

    /// Assign a register. Writes to `zero` are discarded.
    pub fn set_register(&mut self, name: &str, value: Word) -> Result<(), MachineError> {
        if name == "pc" {
            self.pc = value;
            return Ok(());
        }
        let index = Self::gpr_index(name).ok_or_else(|| MachineError::unknown_register(name))?;
        if index != 0 {
            self.gpr[index] = value;
        }
        Ok(())
    }

    /// Store one little-endian word at `addr`
    pub fn write_word(&mut self, addr: Word, value: Word) -> Result<(), MachineError> {
        let range = self.word_range(addr)?;
        self.memory[range].copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    fn word_range(&self, addr: Word) -> Result<std::ops::Range<usize>, MachineError> {
        let out_of_bounds = || MachineError::AddressOutOfBounds { addr: addr as u64 };

        let offset = addr.checked_sub(self.mem_base).ok_or_else(out_of_bounds)? as usize;
        let end = offset.checked_add(WORD_BYTES).ok_or_else(out_of_bounds)?;
        if end > self.memory.len() {
            return Err(out_of_bounds());
        }
        Ok(offset..end)
    }
}

impl Default for SimpleMachine {
    fn default() -> Self {
        Self::new(&MachineConfig::default())
    }
}

impl MachineAccess for SimpleMachine {
    fn register(&self, name: &str) -> Result<Word, MachineError> {
        if name == "pc" {
            return Ok(self.pc);
        }
        Self::gpr_index(name)
            .map(|index| self.gpr[index])
            .ok_or_else(|| MachineError::unknown_register(name))
    }

    fn read_word(&self, addr: Word) -> Result<Word, MachineError> {
        let range = self.word_range(addr)?;
        let mut bytes = [0u8; WORD_BYTES];
        bytes.copy_from_slice(&self.memory[range]);
        Ok(Word::from_le_bytes(bytes))
    }
}

impl Machine for SimpleMachine {
    fn step(&mut self) -> Result<(), MachineError> {
        self.pc = self.pc.wrapping_add(INSN_BYTES);
        Ok(())
    }

    fn set_register(&mut self, name: &str, value: Word) -> Result<(), MachineError> {
        SimpleMachine::set_register(self, name, value)
    }

    fn pc(&self) -> Word {
        self.pc
    }

    fn registers(&self) -> Vec<(&'static str, Word)> {
        GPR_NAMES
            .iter()
            .copied()
            .zip(self.gpr.iter().copied())
            .chain(std::iter::once(("pc", self.pc)))
            .collect()
    }
}

//! Mask ROM contents of one ИК130x chip.
//!
//! Each chip in the family (ИК1302, ИК1303, ИК1306) carries the same three
//! ROM planes and differs only in their contents:
//!
//! - 128 micro-instruction words (28 bits used per word),
//! - 256 macro-command words (32 bits),
//! - a 256 × 9 byte program plane of micro-instruction addresses.
//!
//! The planes are interchanged as a flat little-endian dump: micro words,
//! then command words, then the program plane.

use std::fmt;

/// Number of micro-instruction words.
pub const MICRO_WORDS: usize = 128;
/// Number of macro-command words.
pub const CMD_WORDS: usize = 256;
/// Size of the program plane in bytes (256 rows of 9 addresses).
pub const PROG_BYTES: usize = 256 * 9;
/// Size of a flat chip dump.
pub const ROM_DUMP_BYTES: usize = MICRO_WORDS * 4 + CMD_WORDS * 4 + PROG_BYTES;

/// Error parsing a chip ROM dump.
#[derive(Debug)]
pub enum RomError {
    InvalidSize(usize),
}

impl fmt::Display for RomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSize(size) => write!(
                f,
                "invalid chip ROM dump size: {size} bytes (expected {ROM_DUMP_BYTES})",
            ),
        }
    }
}

impl std::error::Error for RomError {}

/// The three ROM planes of one ИК130x chip.
#[derive(Clone, Debug)]
pub struct ChipRom {
    micro: [u32; MICRO_WORDS],
    commands: [u32; CMD_WORDS],
    program: [u8; PROG_BYTES],
}

impl ChipRom {
    /// Parse a flat little-endian dump (micro, commands, program plane).
    pub fn from_bytes(data: &[u8]) -> Result<Self, RomError> {
        if data.len() != ROM_DUMP_BYTES {
            return Err(RomError::InvalidSize(data.len()));
        }
        let word = |offset: usize| {
            u32::from_le_bytes([
                data[offset],
                data[offset + 1],
                data[offset + 2],
                data[offset + 3],
            ])
        };
        let mut rom = Self {
            micro: [0; MICRO_WORDS],
            commands: [0; CMD_WORDS],
            program: [0; PROG_BYTES],
        };
        for (i, slot) in rom.micro.iter_mut().enumerate() {
            *slot = word(i * 4) & 0x0FFF_FFFF;
        }
        let base = MICRO_WORDS * 4;
        for (i, slot) in rom.commands.iter_mut().enumerate() {
            *slot = word(base + i * 4);
        }
        rom.program
            .copy_from_slice(&data[MICRO_WORDS * 4 + CMD_WORDS * 4..]);
        Ok(rom)
    }

    /// Build a ROM from in-memory planes (synthetic ROMs for tests,
    /// or tables converted from another dump format).
    #[must_use]
    pub fn from_tables(
        micro: [u32; MICRO_WORDS],
        commands: [u32; CMD_WORDS],
        program: [u8; PROG_BYTES],
    ) -> Self {
        let mut rom = Self {
            micro,
            commands,
            program,
        };
        for word in &mut rom.micro {
            *word &= 0x0FFF_FFFF;
        }
        rom
    }

    /// Serialize back to the flat dump format.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(ROM_DUMP_BYTES);
        for word in &self.micro {
            out.extend_from_slice(&word.to_le_bytes());
        }
        for word in &self.commands {
            out.extend_from_slice(&word.to_le_bytes());
        }
        out.extend_from_slice(&self.program);
        out
    }

    #[must_use]
    pub fn micro(&self) -> &[u32; MICRO_WORDS] {
        &self.micro
    }

    #[must_use]
    pub fn commands(&self) -> &[u32; CMD_WORDS] {
        &self.commands
    }

    #[must_use]
    pub fn program(&self) -> &[u8; PROG_BYTES] {
        &self.program
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_wrong_size() {
        let err = ChipRom::from_bytes(&[0; 100]).unwrap_err();
        assert!(matches!(err, RomError::InvalidSize(100)));
    }

    #[test]
    fn dump_round_trip() {
        let mut micro = [0u32; MICRO_WORDS];
        let mut commands = [0u32; CMD_WORDS];
        let mut program = [0u8; PROG_BYTES];
        for (i, w) in micro.iter_mut().enumerate() {
            *w = (i as u32).wrapping_mul(0x0101_0101) & 0x0FFF_FFFF;
        }
        for (i, w) in commands.iter_mut().enumerate() {
            *w = (i as u32).wrapping_mul(0x0301_0701);
        }
        for (i, b) in program.iter_mut().enumerate() {
            *b = (i % 251) as u8;
        }
        let rom = ChipRom::from_tables(micro, commands, program);
        let restored = ChipRom::from_bytes(&rom.to_bytes()).expect("round trip");
        assert_eq!(restored.micro(), rom.micro());
        assert_eq!(restored.commands(), rom.commands());
        assert_eq!(restored.program()[..], rom.program()[..]);
    }

    #[test]
    fn micro_words_are_masked_to_28_bits() {
        let mut micro = [0u32; MICRO_WORDS];
        micro[0] = 0xFFFF_FFFF;
        let rom = ChipRom::from_tables(micro, [0; CMD_WORDS], [0; PROG_BYTES]);
        assert_eq!(rom.micro()[0], 0x0FFF_FFFF);
    }
}

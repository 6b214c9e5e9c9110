//! Cycle-accurate MK-54 / MK-61 programmable calculator emulator.
//!
//! The calculator hardware is a ring of serial 4-bit chips: two (MK-54) or
//! three (MK-61) К145ИК130x PLM processors and two К145ИР2 FIFO delay
//! lines, each handing one nibble to the next every clock. This crate wires
//! the chip crates into that ring, runs it in 560-round host steps, and
//! reads the architectural state (stack, registers, program code) back out
//! of the circulating serial words.
//!
//! The chip mask ROMs are not bundled; a [`CalcConfig`] carries them. See
//! `roms/README.md` at the repository root for the dump format.

mod calculator;
mod config;
pub mod display;
pub mod input;
mod keyboard;
mod snapshot;
mod state;

pub use calculator::{Calculator, DISPLAY_POSITIONS, Panel, ROUNDS_PER_STEP};
pub use config::{CalcConfig, CalcModel};
pub use display::{DisplayFrame, format_value};
pub use input::{KeyScript, ScriptPanel};
pub use keyboard::{AngleMode, Key};
pub use snapshot::Snapshot;

#[cfg(test)]
pub(crate) mod testing {
    //! Shared fixtures: blank-ROM machines for plumbing tests.

    use angstrem_ik130x::{CMD_WORDS, ChipRom, MICRO_WORDS, PROG_BYTES};

    use crate::calculator::{Calculator, Panel};
    use crate::config::{CalcConfig, CalcModel};
    use crate::keyboard::AngleMode;

    pub(crate) fn blank_rom() -> ChipRom {
        ChipRom::from_tables([0; MICRO_WORDS], [0; CMD_WORDS], [0; PROG_BYTES])
    }

    pub(crate) fn mk61_blank() -> Calculator {
        Calculator::new(&CalcConfig {
            model: CalcModel::Mk61,
            ik1302: blank_rom(),
            ik1303: blank_rom(),
            ik1306: Some(blank_rom()),
        })
    }

    pub(crate) fn mk54_blank() -> Calculator {
        Calculator::new(&CalcConfig {
            model: CalcModel::Mk54,
            ik1302: blank_rom(),
            ik1303: blank_rom(),
            ik1306: None,
        })
    }

    /// Panel with nothing pressed and nothing recorded.
    pub(crate) struct IdlePanel;

    impl Panel for IdlePanel {
        fn keypad(&mut self) -> u8 {
            0
        }

        fn angle_mode(&mut self) -> AngleMode {
            AngleMode::Degrees
        }

        fn display(&mut self, _position: Option<usize>, _digit: Option<u8>, _dot: bool) {}
    }
}

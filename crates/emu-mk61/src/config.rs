//! Calculator model configuration.

use angstrem_ik130x::ChipRom;
use serde::{Deserialize, Serialize};

/// Supported calculator models.
///
/// The two models share the same chip family; the MK-61 adds a third PLM
/// chip in the ring, which buys one more memory register and seven more
/// program steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalcModel {
    Mk54,
    Mk61,
}

impl CalcModel {
    /// Number of numeric memory registers (0..9, A..D or A..E).
    #[must_use]
    pub const fn nregs(self) -> usize {
        match self {
            Self::Mk54 => 14,
            Self::Mk61 => 15,
        }
    }

    /// Number of program steps in code memory.
    #[must_use]
    pub const fn code_len(self) -> usize {
        match self {
            Self::Mk54 => 98,
            Self::Mk61 => 105,
        }
    }

    /// Does the ring include the third PLM chip (ИК1306)?
    #[must_use]
    pub const fn has_ik1306(self) -> bool {
        matches!(self, Self::Mk61)
    }
}

/// Configuration for creating a calculator instance.
///
/// Each field carries the mask ROM of one chip position in the ring. The
/// chip ROMs are silicon dumps and must be supplied by the caller; see
/// `roms/README.md` at the repository root for the dump format.
pub struct CalcConfig {
    pub model: CalcModel,
    /// ИК1302, the first PLM: drives the indicator and keypad.
    pub ik1302: ChipRom,
    /// ИК1303, the second PLM: reads the angle-mode switch.
    pub ik1303: ChipRom,
    /// ИК1306, the third PLM: MK-61 only.
    pub ik1306: Option<ChipRom>,
}

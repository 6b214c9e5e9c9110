//! Keypad codes and the angle-mode switch.
//!
//! The keypad is an 11×8 matrix scanned by the first PLM chip through the
//! indicator strobes. A keycode packs the row in the high nibble and the
//! column in the low nibble; 0 means no key is down.

/// Position of the radians/grads/degrees slide switch.
///
/// The switch is wired as a pseudo key row sensed by the second PLM chip,
/// which is why the discriminants start at 10.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AngleMode {
    Radians = 10,
    Degrees = 11,
    Grads = 12,
}

impl AngleMode {
    /// The row code the switch drives onto the second chip's strobe input.
    #[must_use]
    pub const fn row(self) -> u8 {
        self as u8
    }
}

/// Logical key on the calculator keypad.
///
/// Names follow the primary legend; most keys also carry an F-shifted and a
/// K-shifted function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    D0,
    D1,
    D2,
    D3,
    D4,
    D5,
    D6,
    D7,
    D8,
    D9,
    /// `+` (F: π)
    Add,
    /// `-` (F: √)
    Sub,
    /// `*` (F: x²)
    Mul,
    /// `/` (F: 1/x)
    Div,
    /// `xy` exchange (F: xʸ)
    Swap,
    /// `,` decimal comma
    Dot,
    /// `/-/` change sign
    Neg,
    /// `ВП` enter exponent
    Exp,
    /// `Cx` clear X
    Clear,
    /// `B↑` push
    Enter,
    /// `С/П` run/stop
    StopGo,
    /// `БП` branch
    Goto,
    /// `В/О` return / reset program counter
    Ret,
    /// `ПП` subroutine call
    Call,
    /// `П` store to register
    Store,
    /// `ШГ>` step forward
    StepFwd,
    /// `ИП` load from register
    Load,
    /// `<ШГ` step back
    StepBack,
    /// `K` shift
    K,
    /// `F` shift
    F,
}

impl Key {
    /// The 0xRC keycode: row in the high nibble, column in the low.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::D0 => 0x21,
            Self::D1 => 0x31,
            Self::D2 => 0x41,
            Self::D3 => 0x51,
            Self::D4 => 0x61,
            Self::D5 => 0x71,
            Self::D6 => 0x81,
            Self::D7 => 0x91,
            Self::D8 => 0xA1,
            Self::D9 => 0xB1,
            Self::Add => 0x28,
            Self::Sub => 0x38,
            Self::Mul => 0x48,
            Self::Div => 0x58,
            Self::Swap => 0x68,
            Self::Dot => 0x78,
            Self::Neg => 0x88,
            Self::Exp => 0x98,
            Self::Clear => 0xA8,
            Self::Enter => 0xB8,
            Self::StopGo => 0x29,
            Self::Goto => 0x39,
            Self::Ret => 0x49,
            Self::Call => 0x59,
            Self::Store => 0x69,
            Self::StepFwd => 0x79,
            Self::Load => 0x89,
            Self::StepBack => 0x99,
            Self::K => 0xA9,
            Self::F => 0xB9,
        }
    }

    /// Parse a script mnemonic. Digits name themselves; the rest use latin
    /// transliterations of the key legends.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "0" => Self::D0,
            "1" => Self::D1,
            "2" => Self::D2,
            "3" => Self::D3,
            "4" => Self::D4,
            "5" => Self::D5,
            "6" => Self::D6,
            "7" => Self::D7,
            "8" => Self::D8,
            "9" => Self::D9,
            "+" => Self::Add,
            "-" => Self::Sub,
            "*" => Self::Mul,
            "/" => Self::Div,
            "xy" => Self::Swap,
            "." | "," => Self::Dot,
            "neg" => Self::Neg,
            "exp" => Self::Exp,
            "cx" => Self::Clear,
            "enter" => Self::Enter,
            "rs" => Self::StopGo,
            "goto" => Self::Goto,
            "ret" => Self::Ret,
            "call" => Self::Call,
            "sto" => Self::Store,
            "fwd" => Self::StepFwd,
            "rcl" => Self::Load,
            "back" => Self::StepBack,
            "k" => Self::K,
            "f" => Self::F,
            _ => return None,
        })
    }

    /// All keys, in keycode order by column.
    pub const ALL: [Self; 30] = [
        Self::D0,
        Self::D1,
        Self::D2,
        Self::D3,
        Self::D4,
        Self::D5,
        Self::D6,
        Self::D7,
        Self::D8,
        Self::D9,
        Self::Add,
        Self::Sub,
        Self::Mul,
        Self::Div,
        Self::Swap,
        Self::Dot,
        Self::Neg,
        Self::Exp,
        Self::Clear,
        Self::Enter,
        Self::StopGo,
        Self::Goto,
        Self::Ret,
        Self::Call,
        Self::Store,
        Self::StepFwd,
        Self::Load,
        Self::StepBack,
        Self::K,
        Self::F,
    ];
}

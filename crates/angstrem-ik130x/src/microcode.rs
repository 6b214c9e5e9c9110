//! Micro-instruction word decoding.
//!
//! A micro-instruction is a 28-bit word of independent bit fields. There is
//! no "illegal" encoding: every combination behaves as the union of the
//! effects its set bits select.
//!
//! | Bits  | Field | Effect |
//! |-------|-------|--------|
//! | 0-6   | α sources | R, M, ST, ~R, 10-if-no-carry, S, 4 |
//! | 7-11  | β sources | S, ~S, S1, 6, 1 |
//! | 12-14 | γ sources | carry, ~carry, ~keypad_event |
//! | 15-17 | R write | keep / R+3 / σ / S / R∨S∨σ / S∨σ / R∨S / R∨σ |
//! | 18    | write σ to R at slot−1 |
//! | 19    | write σ to R at slot−2 |
//! | 20    | M ← S |
//! | 21    | latch carry from the σ overflow |
//! | 22-23 | S write | keep / S1 / σ / S1∨σ |
//! | 24-25 | S1 write | keep / σ / hold / S1∨σ; bit 25 also polls the keypad |
//! | 26-27 | ST write | keep / shift-in σ / rotate / 3-way merge |

/// Write mode for the addressed R slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegOp {
    /// Leave the slot untouched.
    Keep,
    /// Copy from the slot three positions ahead.
    Next3,
    /// Load σ.
    Sum,
    /// Load S.
    S,
    /// OR in both S and σ.
    OrSSum,
    /// Load S ∨ σ.
    SSum,
    /// OR in S.
    OrS,
    /// OR in σ.
    OrSum,
}

/// Write mode for the S scratch register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SOp {
    Keep,
    /// S ← S1.
    S1,
    /// S ← σ.
    Sum,
    /// S ← S1 ∨ σ.
    S1Sum,
}

/// Write mode for the S1 scratch register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum S1Op {
    Keep,
    /// S1 ← σ.
    Sum,
    /// Encoding 2 reads S1 back into itself; never emitted by the shipped
    /// ROMs and equivalent to `Keep`.
    Hold,
    /// S1 ← S1 ∨ σ.
    OrSum,
}

/// Write mode for the ST shift register triple at the current slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StOp {
    Keep,
    /// Shift σ in: ST+2 ← ST+1, ST+1 ← ST, ST ← σ.
    Shift,
    /// Rotate the triple left by one.
    Rotate,
    /// 3-way merge: ST ← σ∨y, ST+1 ← x∨z, ST+2 ← y∨x
    /// for (x, y, z) = old (ST, ST+1, ST+2).
    Merge,
}

/// One decoded micro-instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MicroOp {
    pub alpha_r: bool,
    pub alpha_m: bool,
    pub alpha_st: bool,
    pub alpha_not_r: bool,
    /// Constant 10, contributed only while carry is clear.
    pub alpha_ten_no_carry: bool,
    pub alpha_s: bool,
    pub alpha_4: bool,

    pub beta_s: bool,
    pub beta_not_s: bool,
    pub beta_s1: bool,
    pub beta_6: bool,
    pub beta_1: bool,

    pub gamma_carry: bool,
    pub gamma_not_carry: bool,
    pub gamma_not_key: bool,

    pub r_op: RegOp,
    /// Write σ to the R slot one position behind.
    pub r_prev1_sum: bool,
    /// Write σ to the R slot two positions behind.
    pub r_prev2_sum: bool,

    /// M ← S at the current slot.
    pub m_load_s: bool,
    /// Latch the σ overflow bit into carry.
    pub latch_carry: bool,

    pub s_op: SOp,
    pub s1_op: S1Op,
    /// OR the keypad column into S1 away from the strobed digit stage.
    pub poll_keypad: bool,

    pub st_op: StOp,
}

impl MicroOp {
    /// The all-zero word: no sources, no writes.
    pub const NOP: Self = Self::decode(0);

    /// Decode a 28-bit micro-instruction word.
    #[must_use]
    pub const fn decode(word: u32) -> Self {
        Self {
            alpha_r: word & 0x0000_0001 != 0,
            alpha_m: word & 0x0000_0002 != 0,
            alpha_st: word & 0x0000_0004 != 0,
            alpha_not_r: word & 0x0000_0008 != 0,
            alpha_ten_no_carry: word & 0x0000_0010 != 0,
            alpha_s: word & 0x0000_0020 != 0,
            alpha_4: word & 0x0000_0040 != 0,

            beta_s: word & 0x0000_0080 != 0,
            beta_not_s: word & 0x0000_0100 != 0,
            beta_s1: word & 0x0000_0200 != 0,
            beta_6: word & 0x0000_0400 != 0,
            beta_1: word & 0x0000_0800 != 0,

            gamma_carry: word & 0x0000_1000 != 0,
            gamma_not_carry: word & 0x0000_2000 != 0,
            gamma_not_key: word & 0x0000_4000 != 0,

            r_op: match (word >> 15) & 7 {
                1 => RegOp::Next3,
                2 => RegOp::Sum,
                3 => RegOp::S,
                4 => RegOp::OrSSum,
                5 => RegOp::SSum,
                6 => RegOp::OrS,
                7 => RegOp::OrSum,
                _ => RegOp::Keep,
            },
            r_prev1_sum: word & 0x0004_0000 != 0,
            r_prev2_sum: word & 0x0008_0000 != 0,

            m_load_s: word & 0x0010_0000 != 0,
            latch_carry: word & 0x0020_0000 != 0,

            s_op: match (word >> 22) & 3 {
                1 => SOp::S1,
                2 => SOp::Sum,
                3 => SOp::S1Sum,
                _ => SOp::Keep,
            },
            s1_op: match (word >> 24) & 3 {
                1 => S1Op::Sum,
                2 => S1Op::Hold,
                3 => S1Op::OrSum,
                _ => S1Op::Keep,
            },
            poll_keypad: word & 0x0200_0000 != 0,

            st_op: match (word >> 26) & 3 {
                1 => StOp::Shift,
                2 => StOp::Rotate,
                3 => StOp::Merge,
                _ => StOp::Keep,
            },
        }
    }
}

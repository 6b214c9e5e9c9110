//! К145ИК130x serial PLM processor chip.
//!
//! The ИК130x family (ИК1302, ИК1303, ИК1306) are 4-bit serial bit-slice
//! processors. All state circulates through 42-word shift registers: R (the
//! working register, also holding the macro program counter and the display
//! digits), M (data memory, doubling as the chip's serial port buffer), and
//! ST (a return-stack register). A 28-bit micro-instruction executes every
//! cycle; a 32-bit macro-command, fetched once per 42-cycle round, selects
//! which row of micro-instruction addresses runs over the round.
//!
//! The chips in one calculator are identical silicon with different mask
//! ROM contents ([`ChipRom`]). The first chip additionally drives the
//! indicator and scans the keypad through the `keyb_x`/`keyb_y` pins.

mod microcode;
mod rom;

pub use microcode::{MicroOp, RegOp, S1Op, SOp, StOp};
pub use rom::{CMD_WORDS, ChipRom, MICRO_WORDS, PROG_BYTES, ROM_DUMP_BYTES, RomError};

/// Number of 4-bit words in each serial register.
pub const REG_WORDS: usize = 42;

/// Number of digit stages per round (one per indicator position).
pub const DIGIT_STAGES: usize = 14;

/// Folds the 42 cycles of a round onto the 9 micro-instruction address
/// slots of a program row.
const REMAP: [usize; REG_WORDS] = [
    0, 1, 2, 3, 4, 5, 3, 4, 5, 3, 4, 5, 3, 4, //
    5, 3, 4, 5, 3, 4, 5, 3, 4, 5, 6, 7, 8, 0, //
    1, 2, 3, 4, 5, 6, 7, 8, 0, 1, 2, 3, 4, 5,
];

/// К145ИК130x serial PLM chip.
pub struct Plm {
    /// Serial input latch, driven by the previous chip in the ring.
    pub input: u8,
    /// Serial output latch, valid after `step()`.
    pub output: u8,
    /// Keypad row strobe input (1..11; 0 = idle).
    pub keyb_x: u8,
    /// Keypad column sense input (1..8; 0 = no key).
    pub keyb_y: u8,

    /// Working register; slots 36/39 hold the macro PC, every third slot a
    /// display digit.
    r: [u8; REG_WORDS],
    /// Data memory; exchanged with the serial port one word per cycle.
    m: [u8; REG_WORDS],
    /// Return-stack register.
    st: [u8; REG_WORDS],
    /// Scratch register S.
    s: u8,
    /// Scratch register S1, also the latched keypad column.
    s1: u8,
    carry: bool,
    /// Set when a key press was latched; observed through γ.
    keypad_event: bool,
    /// Macro-command latched at cycle 0 of the round.
    command: u32,
    /// Micro-instruction latched this cycle.
    opcode: MicroOp,

    /// Digit stage of the last carry-marked position (the decimal dot).
    dot: usize,
    /// Per-stage dot flags recorded during display rounds.
    show_dot: [bool; DIGIT_STAGES],
    /// Set while the round's macro-command is a display/poll command.
    enable_display: bool,

    micro: [MicroOp; MICRO_WORDS],
    commands: [u32; CMD_WORDS],
    program: [u8; PROG_BYTES],
}

impl Plm {
    /// Create a powered-on chip with the given mask ROM. The micro plane is
    /// decoded once here; stepping never touches the raw words again.
    #[must_use]
    pub fn new(rom: &ChipRom) -> Self {
        let raw = rom.micro();
        Self {
            input: 0,
            output: 0,
            keyb_x: 0,
            keyb_y: 0,
            r: [0; REG_WORDS],
            m: [0; REG_WORDS],
            st: [0; REG_WORDS],
            s: 0,
            s1: 0,
            carry: false,
            keypad_event: false,
            command: 0,
            opcode: MicroOp::NOP,
            dot: 0,
            show_dot: [false; DIGIT_STAGES],
            enable_display: false,
            micro: core::array::from_fn(|i| MicroOp::decode(raw[i])),
            commands: *rom.commands(),
            program: *rom.program(),
        }
    }

    /// Execute one micro-cycle. `cycle` is the position within the current
    /// 42-cycle round.
    pub fn step(&mut self, cycle: usize) {
        // Digit stage, 0..13.
        let d = cycle / 3;

        // Fetch the macro-command at the start of the round. Its address
        // circulates in R slots 36 (low) and 39 (high).
        if cycle == 0 {
            let pc = usize::from(self.r[36]) + (usize::from(self.r[39]) << 4);
            self.command = self.commands[pc];
            if self.command & 0x00FC_0000 == 0 {
                self.keypad_event = false;
            }
        }

        // The command packs three program row numbers, one per phase of the
        // round. A high third byte above 0x1F is a subroutine return: its
        // nibbles drop into the PC slots and row 0x5F runs instead.
        let prog_index = if cycle < 27 {
            (self.command & 0xFF) as usize
        } else if cycle < 36 {
            ((self.command >> 8) & 0xFF) as usize
        } else {
            let high = ((self.command >> 16) & 0xFF) as usize;
            if high > 0x1F {
                if cycle == 36 {
                    self.r[37] = (high & 0xF) as u8;
                    self.r[40] = (high >> 4) as u8;
                }
                0x5F
            } else {
                high
            }
        };
        let modifier = (self.command >> 24) & 0xFF;

        // Fetch the micro-instruction. Addresses 60..63 are conditional
        // pairs: the odd slot runs when carry is clear.
        let mut inst_addr = usize::from(self.program[prog_index * 9 + REMAP[cycle]] & 0x3F);
        if inst_addr >= 60 {
            inst_addr += inst_addr - 60;
            if !self.carry {
                inst_addr += 1;
            }
        }
        let op = self.micro[inst_addr];
        self.opcode = op;

        // Keypad poll: away from the strobed digit stage, OR the column
        // sense into S1.
        if op.poll_keypad && d as i32 != i32::from(self.keyb_x) - 1 && self.keyb_y > 0 {
            self.s1 |= self.keyb_y;
        }

        let mut alpha: u8 = 0;
        if op.alpha_r {
            alpha |= self.r[cycle];
        }
        if op.alpha_m {
            alpha |= self.m[cycle];
        }
        if op.alpha_st {
            alpha |= self.st[cycle];
        }
        if op.alpha_not_r {
            alpha |= self.r[cycle] ^ 0xF;
        }
        if op.alpha_ten_no_carry && !self.carry {
            alpha |= 0xA;
        }
        if op.alpha_s {
            alpha |= self.s;
        }
        if op.alpha_4 {
            alpha |= 4;
        }

        let mut beta: u8 = 0;
        if op.beta_s {
            beta |= self.s;
        }
        if op.beta_not_s {
            beta |= self.s ^ 0xF;
        }
        if op.beta_s1 {
            beta |= self.s1;
        }
        if op.beta_6 {
            beta |= 6;
        }
        if op.beta_1 {
            beta |= 1;
        }

        // Keypad latch and indicator side-channel. Commands with a zero
        // third byte are the display/poll commands.
        if self.command & 0x00FC_0000 != 0 {
            if self.keyb_y == 0 {
                self.keypad_event = false;
            }
        } else {
            self.enable_display = true;
            if d as i32 == i32::from(self.keyb_x) - 1 && self.keyb_y > 0 {
                self.s1 = self.keyb_y;
                self.keypad_event = true;
            }
            if self.carry && d < 12 {
                self.dot = d;
            }
            self.show_dot[d] = self.carry;
        }

        let mut gamma: u8 = 0;
        if op.gamma_carry {
            gamma |= u8::from(self.carry);
        }
        if op.gamma_not_carry {
            gamma |= u8::from(!self.carry);
        }
        if op.gamma_not_key {
            gamma |= u8::from(!self.keypad_event);
        }

        let sum = alpha + beta + gamma;
        let sigma = sum & 0xF;
        if op.latch_carry {
            self.carry = sum & 0x10 != 0;
        }

        // R writes are suppressed over the first 36 cycles of modified
        // commands (the modifier byte addresses a memory register through
        // the FIFO ring instead).
        if modifier == 0 || cycle >= 36 {
            let next3 = (cycle + 3) % REG_WORDS;
            let prev1 = (cycle + REG_WORDS - 1) % REG_WORDS;
            let prev2 = (cycle + REG_WORDS - 2) % REG_WORDS;
            match op.r_op {
                RegOp::Keep => {}
                RegOp::Next3 => self.r[cycle] = self.r[next3],
                RegOp::Sum => self.r[cycle] = sigma,
                RegOp::S => self.r[cycle] = self.s,
                RegOp::OrSSum => self.r[cycle] |= self.s | sigma,
                RegOp::SSum => self.r[cycle] = self.s | sigma,
                RegOp::OrS => self.r[cycle] |= self.s,
                RegOp::OrSum => self.r[cycle] |= sigma,
            }
            if op.r_prev1_sum {
                self.r[prev1] = sigma;
            }
            if op.r_prev2_sum {
                self.r[prev2] = sigma;
            }
        }

        if op.m_load_s {
            self.m[cycle] = self.s;
        }

        match op.s_op {
            SOp::Keep => {}
            SOp::S1 => self.s = self.s1,
            SOp::Sum => self.s = sigma,
            SOp::S1Sum => self.s = self.s1 | sigma,
        }
        match op.s1_op {
            S1Op::Keep | S1Op::Hold => {}
            S1Op::Sum => self.s1 = sigma,
            S1Op::OrSum => self.s1 |= sigma,
        }

        let plus1 = (cycle + 1) % REG_WORDS;
        let plus2 = (cycle + 2) % REG_WORDS;
        match op.st_op {
            StOp::Keep => {}
            StOp::Shift => {
                self.st[plus2] = self.st[plus1];
                self.st[plus1] = self.st[cycle];
                self.st[cycle] = sigma;
            }
            StOp::Rotate => {
                let x = self.st[cycle];
                self.st[cycle] = self.st[plus1];
                self.st[plus1] = self.st[plus2];
                self.st[plus2] = x;
            }
            StOp::Merge => {
                let x = self.st[cycle];
                let y = self.st[plus1];
                let z = self.st[plus2];
                self.st[cycle] = sigma | y;
                self.st[plus1] = x | z;
                self.st[plus2] = y | x;
            }
        }

        // Serial port: emit the current M word, capture the input latch.
        self.output = self.m[cycle] & 0xF;
        self.m[cycle] = self.input & 0xF;
    }

    /// The working register.
    #[must_use]
    pub fn r(&self) -> &[u8; REG_WORDS] {
        &self.r
    }

    /// The data memory / serial buffer.
    #[must_use]
    pub fn m(&self) -> &[u8; REG_WORDS] {
        &self.m
    }

    /// Mutable data memory, for host-side patching of latched state
    /// between instruction rounds.
    pub fn m_mut(&mut self) -> &mut [u8; REG_WORDS] {
        &mut self.m
    }

    /// Overwrite one M word (the ring closes the loop through here).
    pub fn write_m(&mut self, slot: usize, value: u8) {
        self.m[slot] = value & 0xF;
    }

    /// The return-stack register.
    #[must_use]
    pub fn st(&self) -> &[u8; REG_WORDS] {
        &self.st
    }

    #[must_use]
    pub fn s(&self) -> u8 {
        self.s
    }

    #[must_use]
    pub fn s1(&self) -> u8 {
        self.s1
    }

    #[must_use]
    pub fn carry(&self) -> bool {
        self.carry
    }

    #[must_use]
    pub fn keypad_event(&self) -> bool {
        self.keypad_event
    }

    /// Macro-command of the current round.
    #[must_use]
    pub fn command(&self) -> u32 {
        self.command
    }

    /// Micro-instruction latched by the last `step()`.
    #[must_use]
    pub fn opcode(&self) -> MicroOp {
        self.opcode
    }

    /// Digit stage of the decimal dot.
    #[must_use]
    pub fn dot(&self) -> usize {
        self.dot
    }

    /// Per-stage dot flags recorded during display rounds.
    #[must_use]
    pub fn show_dot(&self) -> &[bool; DIGIT_STAGES] {
        &self.show_dot
    }

    /// True while the chip is presenting a frame on the indicator.
    #[must_use]
    pub fn display_enabled(&self) -> bool {
        self.enable_display
    }

    /// Acknowledge the presented frame.
    pub fn clear_display_enable(&mut self) {
        self.enable_display = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_rom() -> ChipRom {
        ChipRom::from_tables([0; MICRO_WORDS], [0; CMD_WORDS], [0; PROG_BYTES])
    }

    /// ROM whose program row 0 runs `micro[1]` on every cycle.
    fn rom_running(micro_word: u32) -> ChipRom {
        let mut micro = [0u32; MICRO_WORDS];
        micro[1] = micro_word;
        let mut program = [0u8; PROG_BYTES];
        program[..9].fill(1);
        ChipRom::from_tables(micro, [0; CMD_WORDS], program)
    }

    const R_SUM: u32 = 2 << 15;
    const LATCH_CARRY: u32 = 0x0020_0000;
    const ALPHA_4: u32 = 0x40;
    const ALPHA_TEN: u32 = 0x10;
    const BETA_6: u32 = 0x400;
    const BETA_1: u32 = 0x800;

    #[test]
    fn alu_adds_alpha_and_beta() {
        let mut plm = Plm::new(&rom_running(ALPHA_4 | BETA_6 | R_SUM | LATCH_CARRY));
        plm.step(0);
        assert_eq!(plm.r()[0], 10);
        assert!(!plm.carry());
    }

    #[test]
    fn ten_constant_contributes_only_without_carry() {
        let mut plm = Plm::new(&rom_running(ALPHA_TEN | BETA_6 | R_SUM | LATCH_CARRY));
        plm.step(0);
        // 10 + 6 = 0x10: digit 0, carry out.
        assert_eq!(plm.r()[0], 0);
        assert!(plm.carry());
        plm.step(1);
        // With carry set the constant drops out: 0 + 6 = 6.
        assert_eq!(plm.r()[1], 6);
        assert!(!plm.carry());
    }

    #[test]
    fn conditional_address_selects_on_carry() {
        let mut micro = [0u32; MICRO_WORDS];
        micro[60] = ALPHA_4 | R_SUM;
        micro[61] = BETA_1 | R_SUM;
        let mut program = [0u8; PROG_BYTES];
        program[..9].fill(60);
        let rom = ChipRom::from_tables(micro, [0; CMD_WORDS], program);

        let mut taken = Plm::new(&rom);
        taken.carry = true;
        taken.step(0);
        assert_eq!(taken.r()[0], 4, "carry set selects the even slot");

        let mut not_taken = Plm::new(&rom);
        not_taken.step(0);
        assert_eq!(not_taken.r()[0], 1, "carry clear selects the odd slot");
    }

    #[test]
    fn macro_fetch_indexes_by_r36_r39() {
        let mut commands = [0u32; CMD_WORDS];
        commands[0x15] = 0x0000_0002;
        let mut micro = [0u32; MICRO_WORDS];
        micro[3] = ALPHA_4 | R_SUM;
        let mut program = [0u8; PROG_BYTES];
        program[2 * 9..3 * 9].fill(3);
        let rom = ChipRom::from_tables(micro, commands, program);

        let mut plm = Plm::new(&rom);
        plm.r[36] = 5;
        plm.r[39] = 1;
        plm.step(0);
        assert_eq!(plm.command(), 0x0000_0002);
        assert_eq!(plm.r()[0], 4, "program row from the fetched command runs");
    }

    #[test]
    fn display_command_clears_keypad_event_at_fetch() {
        let mut plm = Plm::new(&empty_rom());
        plm.keypad_event = true;
        plm.step(0);
        assert!(!plm.keypad_event());
    }

    #[test]
    fn busy_command_clears_event_only_when_column_idle() {
        let mut commands = [0u32; CMD_WORDS];
        commands[0] = 0x0004_0000;
        let rom = ChipRom::from_tables([0; MICRO_WORDS], commands, [0; PROG_BYTES]);

        let mut held = Plm::new(&rom);
        held.keypad_event = true;
        held.keyb_y = 2;
        held.step(0);
        assert!(held.keypad_event(), "event persists while the key is down");

        let mut released = Plm::new(&rom);
        released.keypad_event = true;
        released.keyb_y = 0;
        released.step(0);
        assert!(!released.keypad_event(), "event drops once the key is up");
    }

    #[test]
    fn key_press_latches_at_strobed_stage() {
        let mut plm = Plm::new(&empty_rom());
        plm.keyb_x = 2;
        plm.keyb_y = 3;
        for cycle in 0..3 {
            plm.step(cycle);
        }
        assert!(!plm.keypad_event(), "stage 0 is not strobed for row 2");
        plm.step(3);
        assert_eq!(plm.s1(), 3);
        assert!(plm.keypad_event());
        assert!(plm.display_enabled());
    }

    #[test]
    fn idle_row_strobe_never_latches() {
        let mut plm = Plm::new(&empty_rom());
        plm.keyb_x = 0;
        plm.keyb_y = 5;
        for cycle in 0..REG_WORDS {
            plm.step(cycle);
        }
        assert!(!plm.keypad_event());
        assert_eq!(plm.s1(), 0);
    }

    #[test]
    fn poll_op_ors_column_away_from_strobe() {
        let mut plm = Plm::new(&rom_running(2 << 24));
        plm.keyb_x = 5;
        plm.keyb_y = 8;
        plm.step(0);
        assert_eq!(plm.s1(), 8);
        assert!(!plm.keypad_event(), "polling alone raises no event");
    }

    #[test]
    fn serial_port_exchanges_m_word() {
        let mut plm = Plm::new(&empty_rom());
        plm.m[0] = 9;
        plm.input = 5;
        plm.step(0);
        assert_eq!(plm.output, 9);
        assert_eq!(plm.m()[0], 5);
    }

    #[test]
    fn modifier_suppresses_r_writes_until_cycle_36() {
        let mut commands = [0u32; CMD_WORDS];
        commands[0] = 0x0100_0000;
        let mut micro = [0u32; MICRO_WORDS];
        micro[1] = ALPHA_4 | R_SUM;
        let mut program = [0u8; PROG_BYTES];
        program[..9].fill(1);
        let rom = ChipRom::from_tables(micro, commands, program);

        let mut plm = Plm::new(&rom);
        for cycle in 0..36 {
            plm.step(cycle);
        }
        assert!(plm.r().iter().all(|&w| w == 0), "writes held back");
        plm.step(36);
        assert_eq!(plm.r()[36], 4, "writes resume on the PC cycles");
    }

    #[test]
    fn high_program_byte_latches_return_address() {
        let mut commands = [0u32; CMD_WORDS];
        commands[0] = 0x00AB_0000;
        let mut micro = [0u32; MICRO_WORDS];
        micro[2] = BETA_1 | R_SUM;
        let mut program = [0u8; PROG_BYTES];
        program[0x5F * 9..0x5F * 9 + 9].fill(2);
        let rom = ChipRom::from_tables(micro, commands, program);

        let mut plm = Plm::new(&rom);
        for cycle in 0..=36 {
            plm.step(cycle);
        }
        assert_eq!(plm.r()[37], 0xB);
        assert_eq!(plm.r()[40], 0xA);
        assert_eq!(plm.r()[36], 1, "row 0x5F runs in place of the high byte");
    }

    #[test]
    fn r_neighbour_writes() {
        let mut plm = Plm::new(&rom_running(ALPHA_4 | 0x0004_0000 | 0x0008_0000));
        plm.step(0);
        assert_eq!(plm.r()[41], 4);
        assert_eq!(plm.r()[40], 4);
        assert_eq!(plm.r()[0], 0);
    }

    #[test]
    fn r_copy_from_next3() {
        let mut plm = Plm::new(&rom_running(1 << 15));
        plm.r[3] = 9;
        plm.step(0);
        assert_eq!(plm.r()[0], 9);
    }

    #[test]
    fn s_and_s1_write_modes() {
        let mut plm = Plm::new(&rom_running(1 << 22));
        plm.s1 = 3;
        plm.step(0);
        assert_eq!(plm.s(), 3);

        let mut plm = Plm::new(&rom_running((3 << 22) | ALPHA_4));
        plm.s1 = 3;
        plm.step(0);
        assert_eq!(plm.s(), 7, "S1 merged with the sum");

        let mut plm = Plm::new(&rom_running((1 << 24) | ALPHA_4));
        plm.step(0);
        assert_eq!(plm.s1(), 4);

        let mut plm = Plm::new(&rom_running((3 << 24) | ALPHA_4));
        plm.s1 = 3;
        plm.step(0);
        assert_eq!(plm.s1(), 7);
    }

    #[test]
    fn st_shift_in() {
        let mut plm = Plm::new(&rom_running((1 << 26) | ALPHA_4));
        plm.st[0] = 1;
        plm.st[1] = 2;
        plm.st[2] = 3;
        plm.step(0);
        assert_eq!([plm.st()[0], plm.st()[1], plm.st()[2]], [4, 1, 2]);
    }

    #[test]
    fn st_rotate() {
        let mut plm = Plm::new(&rom_running(2 << 26));
        plm.st[0] = 1;
        plm.st[1] = 2;
        plm.st[2] = 3;
        plm.step(0);
        assert_eq!([plm.st()[0], plm.st()[1], plm.st()[2]], [2, 3, 1]);
    }

    #[test]
    fn st_merge() {
        let mut plm = Plm::new(&rom_running((3 << 26) | ALPHA_4));
        plm.st[0] = 1;
        plm.st[1] = 2;
        plm.st[2] = 3;
        plm.step(0);
        assert_eq!([plm.st()[0], plm.st()[1], plm.st()[2]], [4 | 2, 1 | 3, 2 | 1]);
    }

    #[test]
    fn dot_tracks_carry_during_display_rounds() {
        let mut plm = Plm::new(&rom_running(ALPHA_TEN | BETA_6 | LATCH_CARRY));
        // Cycle 0 produces a carry; stage 1 (cycles 3..5) then records it.
        plm.step(0);
        plm.step(3);
        assert_eq!(plm.dot(), 1);
        assert!(plm.show_dot()[1]);
    }
}

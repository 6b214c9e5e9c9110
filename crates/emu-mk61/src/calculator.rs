//! Top-level calculator: the chip ring and the host step loop.
//!
//! The calculator is a loop of serial chips, each passing one 4-bit word to
//! the next every clock:
//!
//! ```text
//! FIFO2 → ИК1302 → ИК1303 → [ИК1306 →] FIFO1 → FIFO2
//! ```
//!
//! 42 clocks make one instruction round, after which every chip has fetched
//! a fresh macro-command. One host step runs 560 rounds, enough for the
//! firmware to scan the keypad and refresh the whole indicator, and
//! reports whether a user program is running.

use angstrem_ik130x::{Plm, REG_WORDS};
use angstrem_ir2::Fifo;

use crate::config::{CalcConfig, CalcModel};
use crate::keyboard::AngleMode;

/// Rounds per host step.
pub const ROUNDS_PER_STEP: usize = 560;

/// Indicator positions (9 mantissa + 3 exponent digits).
pub const DISPLAY_POSITIONS: usize = 12;

/// Dot stage the firmware parks on while a user program runs.
const RUN_DOT: usize = 11;

/// The macro-command the MK-61 firmware executes once per program step in
/// run mode; the chase display renders a digit only on its rounds. Observed
/// from the command ROM, not a property of the engine.
const CHASE_COMMAND: u32 = 0x0011_7360;

/// Host-side panel: keypad, mode switch, indicator.
///
/// A panel is threaded into [`Calculator::step`] the way a bus is threaded
/// into a CPU tick. Implementations must not call back into the calculator.
pub trait Panel {
    /// Current keycode (row << 4 | column), or 0 when no key is down.
    fn keypad(&mut self) -> u8;

    /// Position of the radians/grads/degrees switch.
    fn angle_mode(&mut self) -> AngleMode;

    /// One indicator strobe. `position` is `None` for the two blank strobes
    /// that close each 14-round frame, otherwise 0..11 (11 = leftmost
    /// mantissa digit). `digit` is `None` when the position shows nothing
    /// this frame; values 10..15 select the dash/L/C/Г/E/blank glyphs.
    fn display(&mut self, position: Option<usize>, digit: Option<u8>, dot: bool);

    /// Called once per micro-cycle for cooperative I/O servicing.
    fn poll(&mut self) {}
}

/// An МК-54 or МК-61 calculator.
pub struct Calculator {
    model: CalcModel,
    pub(crate) ik1302: Plm,
    pub(crate) ik1303: Plm,
    pub(crate) ik1306: Option<Plm>,
    pub(crate) fifo1: Fifo,
    pub(crate) fifo2: Fifo,
    /// Round counter, drives the 14-round indicator frame.
    round: usize,
}

impl Calculator {
    /// Create a powered-on calculator from the given configuration.
    ///
    /// # Panics
    ///
    /// Panics if the model is MK-61 and no ИК1306 ROM is supplied.
    #[must_use]
    pub fn new(config: &CalcConfig) -> Self {
        let ik1306 = if config.model.has_ik1306() {
            let rom = config
                .ik1306
                .as_ref()
                .expect("MK-61 configuration requires the ИК1306 ROM");
            Some(Plm::new(rom))
        } else {
            None
        };
        Self {
            model: config.model,
            ik1302: Plm::new(&config.ik1302),
            ik1303: Plm::new(&config.ik1303),
            ik1306,
            fifo1: Fifo::new(),
            fifo2: Fifo::new(),
            round: 0,
        }
    }

    #[must_use]
    pub fn model(&self) -> CalcModel {
        self.model
    }

    /// Is a user program running? Valid at host-step boundaries.
    #[must_use]
    pub fn running(&self) -> bool {
        self.ik1302.dot() == RUN_DOT
    }

    /// Run one host step: 560 instruction rounds. Returns the running flag.
    ///
    /// The keypad and mode switch are sampled once per round; the panel's
    /// `display` is driven once per round and `poll` once per micro-cycle.
    pub fn step(&mut self, panel: &mut impl Panel) -> bool {
        for _ in 0..ROUNDS_PER_STEP {
            let keycode = panel.keypad();
            self.ik1302.keyb_x = keycode >> 4;
            self.ik1302.keyb_y = keycode & 0xF;
            self.ik1303.keyb_x = panel.angle_mode().row();
            self.ik1303.keyb_y = 1;

            for cycle in 0..REG_WORDS {
                panel.poll();
                self.ik1302.input = self.fifo2.output;
                self.ik1302.step(cycle);
                self.ik1303.input = self.ik1302.output;
                self.ik1303.step(cycle);
                self.fifo1.input = match &mut self.ik1306 {
                    Some(ik1306) => {
                        ik1306.input = self.ik1303.output;
                        ik1306.step(cycle);
                        ik1306.output
                    }
                    None => self.ik1303.output,
                };
                self.fifo1.step();
                self.fifo2.input = self.fifo1.output;
                self.fifo2.step();
                self.ik1302.write_m(cycle, self.fifo2.output);
            }

            self.refresh_display(panel);
            self.round += 1;
        }
        self.running()
    }

    /// Drive one indicator strobe from the first chip's circulating state.
    fn refresh_display(&mut self, panel: &mut impl Panel) {
        let position = self.round % 14;
        if position >= DISPLAY_POSITIONS {
            panel.display(None, None, false);
            return;
        }

        // Positions 0..2 carry the exponent, 3..11 the mantissa. Every
        // third R slot holds a digit.
        let (digit, dot) = if position < 3 {
            (
                self.ik1302.r()[(position + 9) * 3],
                self.ik1302.show_dot()[position + 10],
            )
        } else {
            (
                self.ik1302.r()[(position - 3) * 3],
                self.ik1302.show_dot()[position - 2],
            )
        };

        if self.ik1302.dot() == RUN_DOT {
            // Run mode: one lit position chases across the indicator, one
            // hop per program step, with every dot forced on.
            let shown = (self.ik1302.command() == CHASE_COMMAND).then_some(digit);
            panel.display(Some(position), shown, true);
        } else if self.ik1302.display_enabled() {
            panel.display(Some(position), Some(digit), dot);
            self.ik1302.clear_display_enable();
        } else {
            panel.display(Some(position), None, false);
        }
    }
}

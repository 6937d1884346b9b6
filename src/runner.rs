use crate::{Chip8, StepOutcome};

/// Default instruction rate. The timer rate is fixed by the architecture;
/// the instruction rate is a host preference.
pub const DEFAULT_CPU_HZ: f32 = 700.0;

const TIMER_HZ: f32 = 60.0;
const TIMER_TIME_STEP: f32 = 1.0 / TIMER_HZ;

/// Drives a [`Chip8`] from a host frame loop.
///
/// The core deliberately exposes no run loop of its own: instruction pacing
/// and the fixed 60 Hz timer cadence are host concerns. `Runner` keeps two
/// wall-clock accumulators so timer decay stays accurate no matter how fast
/// or slow instructions are stepped.
pub struct Runner {
    chip8: Chip8,
    cpu_time_step: f32,
    cpu_dt_accumulator: f32,
    timer_dt_accumulator: f32,
}

impl Runner {
    pub fn new(chip8: Chip8, cpu_hz: f32) -> Self {
        Self {
            chip8,
            cpu_time_step: 1.0 / cpu_hz,
            cpu_dt_accumulator: 0.0,
            timer_dt_accumulator: 0.0,
        }
    }

    /// Advances the machine by `dt` seconds of wall-clock time.
    ///
    /// Ticks timers at exactly 60 Hz and runs as many instruction cycles as
    /// the elapsed time covers. Stops batching early when a cycle reports
    /// [`StepOutcome::WaitForNextFrame`], dropping the leftover budget so the
    /// machine does not "catch up" in a burst on the next frame.
    pub fn update(&mut self, dt: f32) {
        self.cpu_dt_accumulator += dt;
        self.timer_dt_accumulator += dt;

        while self.timer_dt_accumulator >= TIMER_TIME_STEP {
            self.timer_dt_accumulator -= TIMER_TIME_STEP;
            self.chip8.tick_timers();
        }

        while self.cpu_dt_accumulator >= self.cpu_time_step {
            self.cpu_dt_accumulator -= self.cpu_time_step;

            if self.chip8.step() == StepOutcome::WaitForNextFrame {
                self.cpu_dt_accumulator = 0.0;
                break;
            }
        }
    }

    pub fn machine(&self) -> &Chip8 {
        &self.chip8
    }

    pub fn machine_mut(&mut self) -> &mut Chip8 {
        &mut self.chip8
    }
}

//! A CHIP-8 virtual machine.
//!
//! The core of the crate is [`Chip8`], which owns the full machine state and
//! exposes two entry points: [`Chip8::step`] executes exactly one instruction,
//! and [`Chip8::tick_timers`] decrements the delay and sound timers once. The
//! host decides how often to call each; the core never paces itself.
//!
//! Every core operation is total. Out-of-range memory addresses are clamped,
//! stack overflow and underflow are clamped, and unrecognized opcodes execute
//! as no-ops, so a malformed program image can never crash the machine.
//!
//! [`Runner`] is a convenience layer for hosts that drive the machine from a
//! frame loop: it converts wall-clock delta time into the right number of
//! instruction cycles and 60 Hz timer ticks.

mod chip8;
mod execute;
mod font;
mod nibble;
mod opcode;
mod rom;
mod runner;
mod types;

pub use chip8::*;
pub use font::*;
pub use nibble::u4;
pub use opcode::*;
pub use rom::*;
pub use runner::*;
pub use types::*;

pub const DISPLAY_X: usize = 64;
pub const DISPLAY_Y: usize = 32;

/// 64x32 grid indexed as `display[y][x]`.
pub type Display<T> = [[T; DISPLAY_X]; DISPLAY_Y];

/// Hint returned by [`crate::Chip8::step`].
///
/// Advisory only: the core never blocks or paces itself. Hosts that render
/// once per frame can use this to stop batching cycles after a draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// The next instruction can run immediately.
    Continue,
    /// The display changed or the machine is stalled waiting for a key, so
    /// running further cycles before the next frame is pointless.
    WaitForNextFrame,
}

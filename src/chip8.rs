use crate::{DISPLAY_X, DISPLAY_Y, Display, FONT, FONT_START_ADDRESS, Opcode, StepOutcome, u4};
use crate::{MAX_PROGRAM_SIZE, RomError};

pub(crate) const MEMORY_SIZE: usize = 4096;
pub(crate) const STACK_SIZE: usize = 16;

/// Address program images are loaded at; also the power-on program counter.
pub const PROGRAM_START: u16 = 0x200;

/// The complete state of one CHIP-8 machine.
///
/// Instances are plain owned values with no shared or global state, so any
/// number of machines can coexist in one process. All mutation goes through
/// [`Chip8::step`], [`Chip8::tick_timers`] and the explicit load/reset/keypad
/// methods; none of them can fail or block.
pub struct Chip8 {
    /// 4096 bytes of memory. The glyph table occupies the bottom of the
    /// interpreter area; programs start at 0x200.
    pub(crate) memory: [u8; MEMORY_SIZE],
    /// 64x32 monochrome display, `true` = pixel on.
    pub(crate) display: Display<bool>,

    /// Program counter: address of the next instruction to fetch.
    pub(crate) pc: u16,
    /// Index register, used as the memory pointer for sprite, BCD and bulk
    /// register transfers.
    pub(crate) i: u16,
    /// General-purpose registers V0-VF. VF doubles as the carry, borrow and
    /// collision flag.
    pub(crate) v: [u8; 16],
    /// Return-address slots for `CALL`/`RET`.
    pub(crate) stack: [u16; STACK_SIZE],
    /// Stack pointer. Kept within 0..=15; see `execute` for the clamping
    /// rules on call and return.
    pub(crate) sp: u8,

    /// Decrements at 60 Hz until it reaches 0.
    pub(crate) delay_timer: u8,
    /// Decrements at 60 Hz; the host beeps while it is nonzero.
    pub(crate) sound_timer: u8,

    /// Keypad state for keys 0x0-0xF, `true` = pressed. The host supplies a
    /// fresh snapshot before stepping.
    pub(crate) keypad: [bool; 16],
}

impl Chip8 {
    /// Creates a machine in the power-on state: PC at 0x200, everything else
    /// zeroed, glyph table loaded at the bottom of memory.
    pub fn new() -> Self {
        let mut chip8 = Chip8 {
            memory: [0; MEMORY_SIZE],
            display: [[false; DISPLAY_X]; DISPLAY_Y],
            pc: PROGRAM_START,
            i: 0,
            v: [0; 16],
            stack: [0; STACK_SIZE],
            sp: 0,
            delay_timer: 0,
            sound_timer: 0,
            keypad: [false; 16],
        };
        chip8.load_bytes(FONT_START_ADDRESS as u16, &FONT);
        chip8
    }

    /// Restores every field to its power-on default and reloads the glyph
    /// table. Any previously loaded program is erased.
    pub fn reset(&mut self) {
        *self = Chip8::new();
    }

    /// Reads one memory cell. The address is clamped into range, never fails.
    pub fn read_cell(&self, addr: u16) -> u8 {
        self.memory[Self::clamp_addr(addr)]
    }

    /// Overwrites one memory cell. The address is clamped into range,
    /// never fails.
    pub fn write_cell(&mut self, addr: u16, value: u8) {
        self.memory[Self::clamp_addr(addr)] = value;
    }

    /// Writes `bytes` sequentially starting at `origin`, through the same
    /// clamped writer as single-cell access. Total, never fails.
    pub fn load_bytes(&mut self, origin: u16, bytes: &[u8]) {
        for (offset, &byte) in bytes.iter().enumerate() {
            self.write_cell(origin.wrapping_add(offset as u16), byte);
        }
    }

    /// Places a program image at 0x200 and points the program counter at it.
    ///
    /// This is the one load path with a size check: an image that does not
    /// fit below the end of memory is rejected instead of silently clamped,
    /// since truncating a program is never what the host wants.
    pub fn load_program(&mut self, image: &[u8]) -> Result<(), RomError> {
        if image.len() > MAX_PROGRAM_SIZE {
            return Err(RomError::TooLarge {
                size: image.len(),
                max_size: MAX_PROGRAM_SIZE,
            });
        }

        self.load_bytes(PROGRAM_START, image);
        self.pc = PROGRAM_START;
        Ok(())
    }

    /// Fetches, decodes and executes exactly one instruction.
    ///
    /// The program counter advances by 2 during the fetch, before the
    /// instruction runs, so control transfers overwrite it with their target
    /// address directly and skips add a further 2.
    pub fn step(&mut self) -> StepOutcome {
        let word = self.fetch();
        self.execute(Opcode::decode(word))
    }

    /// Decrements each timer once, if it is nonzero. Call at a steady 60 Hz,
    /// independent of how fast instructions are stepped.
    pub fn tick_timers(&mut self) {
        if self.delay_timer > 0 {
            self.delay_timer -= 1;
        }
        if self.sound_timer > 0 {
            self.sound_timer -= 1;
        }
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer
    }

    /// Returns true while the sound timer is nonzero.
    pub fn should_beep(&self) -> bool {
        self.sound_timer > 0
    }

    /// Replaces the whole keypad snapshot. Hosts call this before stepping.
    pub fn set_keys(&mut self, keys: [bool; 16]) {
        self.keypad = keys;
    }

    /// Sets the state of a single key.
    pub fn set_key(&mut self, key: u4, pressed: bool) {
        self.keypad[key] = pressed;
    }

    /// Read-only view of the display bitmap.
    pub fn display(&self) -> &Display<bool> {
        &self.display
    }

    /// State of a single pixel (true = on).
    pub fn pixel(&self, y: usize, x: usize) -> bool {
        self.display[y][x]
    }

    /// Reads the big-endian instruction word at PC and advances PC by 2.
    fn fetch(&mut self) -> u16 {
        let high = self.read_cell(self.pc);
        let low = self.read_cell(self.pc.wrapping_add(1));
        self.pc = self.pc.wrapping_add(2);

        u16::from_be_bytes([high, low])
    }

    fn clamp_addr(addr: u16) -> usize {
        (addr as usize).min(MEMORY_SIZE - 1)
    }
}

impl Default for Chip8 {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GLYPH_SIZE;

    #[test]
    fn powers_on_with_defaults() {
        let chip8 = Chip8::new();

        assert_eq!(chip8.pc, 0x200);
        assert_eq!(chip8.i, 0);
        assert_eq!(chip8.sp, 0);
        assert_eq!(chip8.v, [0; 16]);
        assert_eq!(chip8.stack, [0; 16]);
        assert_eq!(chip8.delay_timer, 0);
        assert_eq!(chip8.sound_timer, 0);
        assert_eq!(chip8.keypad, [false; 16]);
        assert!(chip8.display.iter().flatten().all(|&px| !px));
    }

    #[test]
    fn glyph_table_is_loaded_at_the_bottom_of_memory() {
        let chip8 = Chip8::new();
        assert_eq!(&chip8.memory[..16 * GLYPH_SIZE], &FONT);
        // Memory above the glyph table is untouched.
        assert_eq!(chip8.memory[16 * GLYPH_SIZE..], [0; 4096 - 16 * GLYPH_SIZE]);
    }

    #[test]
    fn out_of_range_accesses_clamp_to_the_last_cell() {
        let mut chip8 = Chip8::new();

        chip8.write_cell(0x5000, 0xAB);
        assert_eq!(chip8.memory[4095], 0xAB);
        assert_eq!(chip8.read_cell(0xFFFF), 0xAB);
        assert_eq!(chip8.read_cell(4095), 0xAB);
    }

    #[test]
    fn load_bytes_writes_sequentially() {
        let mut chip8 = Chip8::new();

        chip8.load_bytes(0x300, &[1, 2, 3, 4]);
        assert_eq!(&chip8.memory[0x300..0x304], &[1, 2, 3, 4]);
    }

    #[test]
    fn load_program_places_the_image_at_0x200() {
        let mut chip8 = Chip8::new();

        chip8.load_program(&[0x00, 0xE0, 0x12, 0x00]).unwrap();
        assert_eq!(&chip8.memory[0x200..0x204], &[0x00, 0xE0, 0x12, 0x00]);
        assert_eq!(chip8.pc, 0x200);
    }

    #[test]
    fn load_program_rejects_oversized_images() {
        let mut chip8 = Chip8::new();

        let image = vec![0u8; MAX_PROGRAM_SIZE + 1];
        assert_eq!(
            chip8.load_program(&image),
            Err(RomError::TooLarge {
                size: MAX_PROGRAM_SIZE + 1,
                max_size: MAX_PROGRAM_SIZE,
            })
        );

        // A maximum-size image fits exactly.
        let image = vec![0xFFu8; MAX_PROGRAM_SIZE];
        chip8.load_program(&image).unwrap();
        assert_eq!(chip8.memory[4095], 0xFF);
    }

    #[test]
    fn reset_erases_the_program_and_reloads_the_font() {
        let mut chip8 = Chip8::new();
        chip8.load_program(&[0x12, 0x34]).unwrap();
        chip8.v[3] = 99;
        chip8.i = 0x400;
        chip8.delay_timer = 7;
        chip8.display[0][0] = true;
        chip8.memory[0] = 0x00; // clobber the font

        chip8.reset();

        assert_eq!(chip8.memory[0x200..0x202], [0, 0]);
        assert_eq!(&chip8.memory[..16 * GLYPH_SIZE], &FONT);
        assert_eq!(chip8.v[3], 0);
        assert_eq!(chip8.i, 0);
        assert_eq!(chip8.delay_timer, 0);
        assert_eq!(chip8.pc, 0x200);
        assert!(!chip8.display[0][0]);
    }

    #[test]
    fn fetch_combines_bytes_big_endian_and_advances_pc() {
        let mut chip8 = Chip8::new();
        chip8.load_bytes(0x200, &[0x6A, 0x3C]);

        assert_eq!(chip8.fetch(), 0x6A3C);
        assert_eq!(chip8.pc, 0x202);
    }

    #[test]
    fn timers_floor_at_zero() {
        let mut chip8 = Chip8::new();
        chip8.delay_timer = 5;

        let mut observed = Vec::new();
        for _ in 0..6 {
            chip8.tick_timers();
            observed.push(chip8.delay_timer());
        }

        assert_eq!(observed, [4, 3, 2, 1, 0, 0]);
        assert_eq!(chip8.sound_timer(), 0);
    }

    #[test]
    fn timers_decrement_independently() {
        let mut chip8 = Chip8::new();
        chip8.delay_timer = 1;
        chip8.sound_timer = 3;

        chip8.tick_timers();
        chip8.tick_timers();

        assert_eq!(chip8.delay_timer(), 0);
        assert_eq!(chip8.sound_timer(), 1);
        assert!(chip8.should_beep());
    }

    #[test]
    fn set_keys_replaces_the_whole_snapshot() {
        let mut chip8 = Chip8::new();

        let mut keys = [false; 16];
        keys[0xA] = true;
        chip8.set_keys(keys);
        assert!(chip8.keypad[0xA]);

        chip8.set_keys([false; 16]);
        assert_eq!(chip8.keypad, [false; 16]);

        chip8.set_key(u4::new(0x3), true);
        assert!(chip8.keypad[0x3]);
    }

    #[test]
    fn machines_are_independent() {
        let mut a = Chip8::new();
        let b = Chip8::new();

        a.load_program(&[0x6A, 0x3C]).unwrap();
        a.step();

        assert_eq!(a.v[0xA], 0x3C);
        assert_eq!(b.v[0xA], 0);
        assert_eq!(b.pc, 0x200);
    }
}

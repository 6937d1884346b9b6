use crate::chip8::{MEMORY_SIZE, PROGRAM_START};
use thiserror::Error;

/// Largest program image that fits between 0x200 and the end of memory.
pub const MAX_PROGRAM_SIZE: usize = MEMORY_SIZE - PROGRAM_START as usize;

/// Failure to place a program image into machine memory.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RomError {
    #[error("program image is {size} bytes, but only {max_size} bytes fit above 0x200")]
    TooLarge { size: usize, max_size: usize },
}

use crate::u4;

/// A decoded CHIP-8 instruction.
///
/// Field names follow the conventional operand encoding: `nnn` is a 12-bit
/// address, `nn` an 8-bit immediate, `n` a 4-bit immediate, and `x`/`y` are
/// register indices taken from the second and third nibbles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Opcode {
    /// 00E0: clear the display.
    Cls,
    /// 00EE: return from a subroutine.
    Ret,
    /// 1nnn: jump to nnn.
    Jp { nnn: u16 },
    /// Bnnn: jump to nnn + V0.
    JpV0 { nnn: u16 },
    /// 2nnn: call the subroutine at nnn.
    Call { nnn: u16 },

    /// 3xnn: skip the next instruction if Vx == nn.
    SeImm { x: u4, nn: u8 },
    /// 4xnn: skip the next instruction if Vx != nn.
    SneImm { x: u4, nn: u8 },
    /// 5xy0: skip the next instruction if Vx == Vy.
    SeReg { x: u4, y: u4 },
    /// 9xy0: skip the next instruction if Vx != Vy.
    SneReg { x: u4, y: u4 },

    /// 6xnn: Vx = nn.
    LdImm { x: u4, nn: u8 },
    /// 7xnn: Vx += nn, wrapping, no flag.
    AddImm { x: u4, nn: u8 },
    /// 8xy*: register-to-register arithmetic and logic.
    Alu { x: u4, y: u4, op: AluOp },
    /// Cxnn: Vx = random byte AND nn.
    Rnd { x: u4, nn: u8 },

    /// Annn: I = nnn.
    LdI { nnn: u16 },
    /// Fx1E: I += Vx, 16-bit wrapping, no flag.
    AddI { x: u4 },
    /// Fx29: I = address of the glyph for the digit in Vx.
    LdFont { x: u4 },
    /// Fx33: store the decimal digits of Vx at I, I+1, I+2.
    Bcd { x: u4 },
    /// Fx55: store V0..=Vx to memory starting at I.
    StoreRegs { x: u4 },
    /// Fx65: load V0..=Vx from memory starting at I.
    LoadRegs { x: u4 },

    /// Dxyn: XOR-blit an n-row sprite from I at (Vx, Vy).
    Drw { x: u4, y: u4, n: u4 },

    /// Ex9E: skip the next instruction if the key in Vx is pressed.
    Skp { x: u4 },
    /// ExA1: skip the next instruction if the key in Vx is not pressed.
    Sknp { x: u4 },
    /// Fx0A: stall until a key is pressed, then store its index in Vx.
    WaitKey { x: u4 },

    /// Fx07: Vx = delay timer.
    LdFromDt { x: u4 },
    /// Fx15: delay timer = Vx.
    LdToDt { x: u4 },
    /// Fx18: sound timer = Vx.
    LdToSt { x: u4 },

    /// Any pattern not matched above. Executes as a no-op so malformed or
    /// forward-compatible program images degrade gracefully.
    Nop(u16),
}

/// The 8xy* operation selected by the low nibble.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AluOp {
    /// 8xy0: Vx = Vy.
    Ld,
    /// 8xy1: Vx |= Vy.
    Or,
    /// 8xy2: Vx &= Vy.
    And,
    /// 8xy3: Vx ^= Vy.
    Xor,
    /// 8xy4: Vx += Vy, VF = carry.
    Add,
    /// 8xy5: Vx -= Vy, VF = 1 if Vx >= Vy.
    Sub,
    /// 8xy7: Vx = Vy - Vx, VF = 1 if Vy >= Vx.
    Subn,
    /// 8xy6: VF = bit 0 of Vx, then Vx >>= 1.
    Shr,
    /// 8xyE: VF = bit 7 of Vx, then Vx <<= 1.
    Shl,
}

impl Opcode {
    /// Decodes a raw 16-bit instruction word.
    ///
    /// The top nibble selects one of 16 families; families 0x0, 0x8, 0xE and
    /// 0xF need a secondary selector to pick the exact operation. Decoding is
    /// total: unmatched patterns become [`Opcode::Nop`].
    pub fn decode(word: u16) -> Self {
        let nibble = (
            ((word & 0xF000) >> 12) as u8,
            ((word & 0x0F00) >> 8) as u8,
            ((word & 0x00F0) >> 4) as u8,
            (word & 0x000F) as u8,
        );

        let x = u4::new(nibble.1);
        let y = u4::new(nibble.2);
        let n = u4::new(nibble.3);
        let nn = (word & 0x00FF) as u8;
        let nnn = word & 0x0FFF;

        match (nibble.0, nibble.1, nibble.2, nibble.3) {
            (0x0, 0x0, 0xE, 0x0) => Opcode::Cls,
            (0x0, 0x0, 0xE, 0xE) => Opcode::Ret,
            (0x1, _, _, _) => Opcode::Jp { nnn },
            (0x2, _, _, _) => Opcode::Call { nnn },
            (0x3, _, _, _) => Opcode::SeImm { x, nn },
            (0x4, _, _, _) => Opcode::SneImm { x, nn },
            (0x5, _, _, 0x0) => Opcode::SeReg { x, y },
            (0x6, _, _, _) => Opcode::LdImm { x, nn },
            (0x7, _, _, _) => Opcode::AddImm { x, nn },
            (0x8, _, _, _) => Opcode::Alu {
                x,
                y,
                op: match nibble.3 {
                    0x0 => AluOp::Ld,
                    0x1 => AluOp::Or,
                    0x2 => AluOp::And,
                    0x3 => AluOp::Xor,
                    0x4 => AluOp::Add,
                    0x5 => AluOp::Sub,
                    0x6 => AluOp::Shr,
                    0x7 => AluOp::Subn,
                    0xE => AluOp::Shl,
                    _ => return Opcode::Nop(word),
                },
            },
            (0x9, _, _, 0x0) => Opcode::SneReg { x, y },
            (0xA, _, _, _) => Opcode::LdI { nnn },
            (0xB, _, _, _) => Opcode::JpV0 { nnn },
            (0xC, _, _, _) => Opcode::Rnd { x, nn },
            (0xD, _, _, _) => Opcode::Drw { x, y, n },
            (0xE, _, 0x9, 0xE) => Opcode::Skp { x },
            (0xE, _, 0xA, 0x1) => Opcode::Sknp { x },
            (0xF, _, 0x0, 0x7) => Opcode::LdFromDt { x },
            (0xF, _, 0x0, 0xA) => Opcode::WaitKey { x },
            (0xF, _, 0x1, 0x5) => Opcode::LdToDt { x },
            (0xF, _, 0x1, 0x8) => Opcode::LdToSt { x },
            (0xF, _, 0x1, 0xE) => Opcode::AddI { x },
            (0xF, _, 0x2, 0x9) => Opcode::LdFont { x },
            (0xF, _, 0x3, 0x3) => Opcode::Bcd { x },
            (0xF, _, 0x5, 0x5) => Opcode::StoreRegs { x },
            (0xF, _, 0x6, 0x5) => Opcode::LoadRegs { x },

            _ => Opcode::Nop(word),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_every_family() {
        assert_eq!(Opcode::decode(0x00E0), Opcode::Cls);
        assert_eq!(Opcode::decode(0x00EE), Opcode::Ret);
        assert_eq!(Opcode::decode(0x1ABC), Opcode::Jp { nnn: 0xABC });
        assert_eq!(Opcode::decode(0x2123), Opcode::Call { nnn: 0x123 });
        assert_eq!(
            Opcode::decode(0x3A7F),
            Opcode::SeImm {
                x: u4::new(0xA),
                nn: 0x7F
            }
        );
        assert_eq!(
            Opcode::decode(0x4A7F),
            Opcode::SneImm {
                x: u4::new(0xA),
                nn: 0x7F
            }
        );
        assert_eq!(
            Opcode::decode(0x5120),
            Opcode::SeReg {
                x: u4::new(1),
                y: u4::new(2)
            }
        );
        assert_eq!(
            Opcode::decode(0x6A3C),
            Opcode::LdImm {
                x: u4::new(0xA),
                nn: 0x3C
            }
        );
        assert_eq!(
            Opcode::decode(0x7101),
            Opcode::AddImm {
                x: u4::new(1),
                nn: 0x01
            }
        );
        assert_eq!(
            Opcode::decode(0x9120),
            Opcode::SneReg {
                x: u4::new(1),
                y: u4::new(2)
            }
        );
        assert_eq!(Opcode::decode(0xAFFF), Opcode::LdI { nnn: 0xFFF });
        assert_eq!(Opcode::decode(0xBAAA), Opcode::JpV0 { nnn: 0xAAA });
        assert_eq!(
            Opcode::decode(0xC10F),
            Opcode::Rnd {
                x: u4::new(1),
                nn: 0x0F
            }
        );
        assert_eq!(
            Opcode::decode(0xD125),
            Opcode::Drw {
                x: u4::new(1),
                y: u4::new(2),
                n: u4::new(5)
            }
        );
        assert_eq!(Opcode::decode(0xE19E), Opcode::Skp { x: u4::new(1) });
        assert_eq!(Opcode::decode(0xE1A1), Opcode::Sknp { x: u4::new(1) });
        assert_eq!(Opcode::decode(0xF107), Opcode::LdFromDt { x: u4::new(1) });
        assert_eq!(Opcode::decode(0xF10A), Opcode::WaitKey { x: u4::new(1) });
        assert_eq!(Opcode::decode(0xF115), Opcode::LdToDt { x: u4::new(1) });
        assert_eq!(Opcode::decode(0xF118), Opcode::LdToSt { x: u4::new(1) });
        assert_eq!(Opcode::decode(0xF11E), Opcode::AddI { x: u4::new(1) });
        assert_eq!(Opcode::decode(0xF129), Opcode::LdFont { x: u4::new(1) });
        assert_eq!(Opcode::decode(0xF133), Opcode::Bcd { x: u4::new(1) });
        assert_eq!(Opcode::decode(0xF355), Opcode::StoreRegs { x: u4::new(3) });
        assert_eq!(Opcode::decode(0xF365), Opcode::LoadRegs { x: u4::new(3) });
    }

    #[test]
    fn decodes_alu_selectors() {
        let alu = |word: u16| match Opcode::decode(word) {
            Opcode::Alu { op, .. } => op,
            other => panic!("expected ALU opcode, got {other:?}"),
        };

        assert_eq!(alu(0x8120), AluOp::Ld);
        assert_eq!(alu(0x8121), AluOp::Or);
        assert_eq!(alu(0x8122), AluOp::And);
        assert_eq!(alu(0x8123), AluOp::Xor);
        assert_eq!(alu(0x8124), AluOp::Add);
        assert_eq!(alu(0x8125), AluOp::Sub);
        assert_eq!(alu(0x8126), AluOp::Shr);
        assert_eq!(alu(0x8127), AluOp::Subn);
        assert_eq!(alu(0x812E), AluOp::Shl);
    }

    #[test]
    fn unmatched_patterns_decode_to_nop() {
        // 0nnn (machine-code call on the original hardware) is not implemented.
        assert_eq!(Opcode::decode(0x0123), Opcode::Nop(0x0123));
        // Gaps in the 8xy*, 5xy*, 9xy*, Ex** and Fx** families.
        assert_eq!(Opcode::decode(0x8128), Opcode::Nop(0x8128));
        assert_eq!(Opcode::decode(0x5121), Opcode::Nop(0x5121));
        assert_eq!(Opcode::decode(0x9121), Opcode::Nop(0x9121));
        assert_eq!(Opcode::decode(0xE1FF), Opcode::Nop(0xE1FF));
        assert_eq!(Opcode::decode(0xF1FF), Opcode::Nop(0xF1FF));
    }
}

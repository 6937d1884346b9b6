use crate::{
    AluOp, Chip8, DISPLAY_X, DISPLAY_Y, FONT_START_ADDRESS, GLYPH_SIZE, Opcode, StepOutcome,
    chip8::STACK_SIZE, u4,
};

impl Chip8 {
    /// Executes one decoded instruction against the machine state.
    ///
    /// Runs after the fetch has already advanced PC by 2, so jump targets are
    /// written to PC as-is and a skip adds a further 2. Every arm is total:
    /// memory accesses clamp, the stack pointer clamps at both ends, and
    /// [`Opcode::Nop`] does nothing.
    pub(crate) fn execute(&mut self, opcode: Opcode) -> StepOutcome {
        match opcode {
            Opcode::Cls => {
                self.display = [[false; DISPLAY_X]; DISPLAY_Y];
            }
            Opcode::Ret => {
                // Underflow clamps: the return address in slot 0 is reused
                // rather than moving SP below 0.
                self.pc = self.stack[self.sp as usize];
                self.sp = self.sp.saturating_sub(1);
            }
            Opcode::Jp { nnn } => {
                self.pc = nnn;
            }
            Opcode::JpV0 { nnn } => {
                self.pc = nnn.wrapping_add(self.v[0].into());
            }
            Opcode::Call { nnn } => {
                // Increment-then-store, clamped at the top slot. A 17th
                // nested call overwrites slot 15 instead of running off the
                // end of the stack.
                self.sp = (self.sp + 1).min(STACK_SIZE as u8 - 1);
                self.stack[self.sp as usize] = self.pc;
                self.pc = nnn;
            }
            Opcode::SeImm { x, nn } => {
                if self.v[x] == nn {
                    self.pc = self.pc.wrapping_add(2);
                }
            }
            Opcode::SneImm { x, nn } => {
                if self.v[x] != nn {
                    self.pc = self.pc.wrapping_add(2);
                }
            }
            Opcode::SeReg { x, y } => {
                if self.v[x] == self.v[y] {
                    self.pc = self.pc.wrapping_add(2);
                }
            }
            Opcode::SneReg { x, y } => {
                if self.v[x] != self.v[y] {
                    self.pc = self.pc.wrapping_add(2);
                }
            }
            Opcode::LdImm { x, nn } => {
                self.v[x] = nn;
            }
            Opcode::AddImm { x, nn } => {
                self.v[x] = self.v[x].wrapping_add(nn);
            }
            Opcode::Alu { x, y, op } => {
                self.execute_alu(x, y, op);
            }
            Opcode::Rnd { x, nn } => {
                let byte: u8 = rand::random();
                self.v[x] = byte & nn;
            }
            Opcode::LdI { nnn } => {
                self.i = nnn;
            }
            Opcode::AddI { x } => {
                self.i = self.i.wrapping_add(self.v[x].into());
            }
            Opcode::LdFont { x } => {
                let digit = (self.v[x] & 0x0F) as u16;
                self.i = FONT_START_ADDRESS as u16 + digit * GLYPH_SIZE as u16;
            }
            Opcode::Bcd { x } => {
                let value = self.v[x];
                self.write_cell(self.i, value / 100);
                self.write_cell(self.i.wrapping_add(1), (value / 10) % 10);
                self.write_cell(self.i.wrapping_add(2), value % 10);
            }
            Opcode::StoreRegs { x } => {
                // I itself is left unchanged by the bulk transfers.
                for reg in 0..=usize::from(x) {
                    self.write_cell(self.i.wrapping_add(reg as u16), self.v[reg]);
                }
            }
            Opcode::LoadRegs { x } => {
                for reg in 0..=usize::from(x) {
                    self.v[reg] = self.read_cell(self.i.wrapping_add(reg as u16));
                }
            }
            Opcode::Drw { x, y, n } => {
                return self.execute_draw(x, y, n);
            }
            Opcode::Skp { x } => {
                if self.keypad[(self.v[x] & 0x0F) as usize] {
                    self.pc = self.pc.wrapping_add(2);
                }
            }
            Opcode::Sknp { x } => {
                if !self.keypad[(self.v[x] & 0x0F) as usize] {
                    self.pc = self.pc.wrapping_add(2);
                }
            }
            Opcode::WaitKey { x } => {
                return self.execute_wait_key(x);
            }
            Opcode::LdFromDt { x } => {
                self.v[x] = self.delay_timer;
            }
            Opcode::LdToDt { x } => {
                self.delay_timer = self.v[x];
            }
            Opcode::LdToSt { x } => {
                self.sound_timer = self.v[x];
            }
            Opcode::Nop(_) => {}
        }

        StepOutcome::Continue
    }

    fn execute_alu(&mut self, x: u4, y: u4, op: AluOp) {
        match op {
            AluOp::Ld => self.v[x] = self.v[y],
            // The logic ops have no flag effect.
            AluOp::Or => self.v[x] |= self.v[y],
            AluOp::And => self.v[x] &= self.v[y],
            AluOp::Xor => self.v[x] ^= self.v[y],
            AluOp::Add => {
                let (res, carry) = self.v[x].overflowing_add(self.v[y]);
                self.v[x] = res;
                self.v[0xF] = carry as u8;
            }
            AluOp::Sub => {
                let (res, borrow) = self.v[x].overflowing_sub(self.v[y]);
                self.v[x] = res;
                // VF = 1 iff Vx >= Vy, i.e. no borrow.
                self.v[0xF] = !borrow as u8;
            }
            AluOp::Subn => {
                let (res, borrow) = self.v[y].overflowing_sub(self.v[x]);
                self.v[x] = res;
                self.v[0xF] = !borrow as u8;
            }
            AluOp::Shr => {
                let bit = self.v[x] & 1;
                self.v[x] >>= 1;
                self.v[0xF] = bit;
            }
            AluOp::Shl => {
                let bit = self.v[x] >> 7;
                self.v[x] <<= 1;
                self.v[0xF] = bit;
            }
        }
    }

    /// XOR-blits an `n`-row, 8-column sprite read from `I..I+n-1` at
    /// (Vx, Vy). Both coordinates wrap toroidally per pixel, so a sprite
    /// hanging off one edge reappears on the opposite one. VF reports
    /// whether any set pixel was turned off.
    fn execute_draw(&mut self, x: u4, y: u4, n: u4) -> StepOutcome {
        let x_pos = self.v[x] as usize % DISPLAY_X;
        let y_pos = self.v[y] as usize % DISPLAY_Y;

        let mut any_erased = false;
        for row in 0..usize::from(n) {
            let sprite_byte = self.read_cell(self.i.wrapping_add(row as u16));

            for col in 0..8 {
                if (sprite_byte & (0x80 >> col)) != 0 {
                    let pixel =
                        &mut self.display[(y_pos + row) % DISPLAY_Y][(x_pos + col) % DISPLAY_X];

                    *pixel ^= true;
                    if !*pixel {
                        any_erased = true;
                    }
                }
            }
        }

        self.v[0xF] = any_erased as u8;
        StepOutcome::WaitForNextFrame
    }

    /// Fx0A is a polling stall, not a blocking wait: with no key pressed the
    /// PC rewinds by 2 so the same instruction re-executes on the next step.
    fn execute_wait_key(&mut self, x: u4) -> StepOutcome {
        match self.keypad.iter().position(|&pressed| pressed) {
            Some(key) => {
                self.v[x] = key as u8;
                StepOutcome::Continue
            }
            None => {
                self.pc = self.pc.wrapping_sub(2);
                StepOutcome::WaitForNextFrame
            }
        }
    }
}

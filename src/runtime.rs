mod alu;
mod bus;
mod flags;

use std::fmt;

pub use bus::{Memory, Panel, Ports, Ram};
pub use flags::Flags;

use crate::disasm;
use crate::isa::{
    self, Indirect, Op, Pair, Reg, StackPair, BRANCH_TAKEN_CYCLES, HALT_CYCLES, INTERRUPT_CYCLES,
};

/// Register file and processor status.
///
/// The default value is the reset state: everything zero apart from the fixed flag bit.
#[derive(Clone, Default, PartialEq, Eq, Debug)]
pub struct Cpu {
    pub a: u8,
    pub flags: Flags,
    pub bc: u16,
    pub de: u16,
    pub hl: u16,
    pub sp: u16,
    pub pc: u16,
    pub halted: bool,
    /// Interrupts enabled
    pub inte: bool,
    /// Cycles spent since reset
    pub cycles: u64,
}

impl fmt::Display for Cpu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "A={:02X} BC={:04X} DE={:04X} HL={:04X} SP={:04X} PC={:04X}",
            self.a, self.bc, self.de, self.hl, self.sp, self.pc
        )
    }
}

/// Why [`Machine::run`] returned.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Exit {
    Halted,
    CycleLimit,
}

/// Processor wired to its memory and I/O ports.
pub struct Machine<M, P> {
    pub cpu: Cpu,
    pub mem: M,
    pub io: P,
    /// Print every instruction before it executes
    trace: bool,
}

impl<M: Memory, P: Ports> Machine<M, P> {
    pub fn new(mem: M, io: P) -> Self {
        Machine {
            cpu: Cpu::default(),
            mem,
            io,
            trace: false,
        }
    }

    pub fn set_trace(&mut self, trace: bool) {
        self.trace = trace;
    }

    /// Back to the power-on register state. Memory is left alone.
    pub fn reset(&mut self) {
        self.cpu = Cpu::default();
    }

    /// Execute one instruction and return the cycles it took, branch penalties included.
    pub fn step(&mut self) -> u32 {
        if self.cpu.halted {
            self.cpu.cycles += HALT_CYCLES as u64;
            return HALT_CYCLES;
        }

        if self.trace {
            let (text, _) = self.disassemble(self.cpu.pc);
            dprintln!(
                Always,
                "{:04X}  {:<14} {} {}",
                self.cpu.pc,
                text,
                self.cpu,
                self.cpu.flags
            );
        }

        let opcode = self.fetch_byte();
        let cycles = isa::cycles(opcode) + self.execute(Op::decode(opcode));
        self.cpu.cycles += cycles as u64;
        cycles
    }

    /// Request restart `vector` (0-7). Ignored, returning 0, while interrupts are disabled.
    pub fn interrupt(&mut self, vector: u8) -> u32 {
        if !self.cpu.inte {
            return 0;
        }
        self.cpu.inte = false;
        self.cpu.halted = false;
        self.call((vector & 0b111) as u16 * 8);
        self.cpu.cycles += INTERRUPT_CYCLES as u64;
        INTERRUPT_CYCLES
    }

    /// Text and length of the instruction at `addr`.
    pub fn disassemble(&self, addr: u16) -> (String, u8) {
        disasm::disassemble(&self.mem, addr)
    }

    /// Step until halted, or until `limit` cycles have been spent since reset.
    pub fn run(&mut self, panel: &mut impl Panel, limit: Option<u64>) -> Exit {
        loop {
            if self.cpu.halted {
                return Exit::Halted;
            }
            if limit.is_some_and(|limit| self.cpu.cycles >= limit) {
                return Exit::CycleLimit;
            }
            self.step();
            panel.update(self.cpu.pc, self.mem.read(self.cpu.pc));
        }
    }

    /// Returns the extra cycles of a taken conditional call or return.
    fn execute(&mut self, op: Op) -> u32 {
        match op {
            Op::Nop => (),
            Op::Lxi(pair) => {
                let value = self.fetch_word();
                self.set_pair(pair, value);
            }
            Op::Stax(pair) => self.mem.write(self.indirect(pair), self.cpu.a),
            Op::Ldax(pair) => self.cpu.a = self.mem.read(self.indirect(pair)),
            Op::Shld => {
                let addr = self.fetch_word();
                self.mem.write_word(addr, self.cpu.hl);
            }
            Op::Lhld => {
                let addr = self.fetch_word();
                self.cpu.hl = self.mem.read_word(addr);
            }
            Op::Sta => {
                let addr = self.fetch_word();
                self.mem.write(addr, self.cpu.a);
            }
            Op::Lda => {
                let addr = self.fetch_word();
                self.cpu.a = self.mem.read(addr);
            }
            Op::Inx(pair) => self.set_pair(pair, self.pair(pair).wrapping_add(1)),
            Op::Dcx(pair) => self.set_pair(pair, self.pair(pair).wrapping_sub(1)),
            Op::Dad(pair) => self.cpu.dad(self.pair(pair)),
            Op::Inr(reg) => {
                let value = self.cpu.inr(self.reg(reg));
                self.set_reg(reg, value);
            }
            Op::Dcr(reg) => {
                let value = self.cpu.dcr(self.reg(reg));
                self.set_reg(reg, value);
            }
            Op::Mvi(reg) => {
                let value = self.fetch_byte();
                self.set_reg(reg, value);
            }
            Op::Rlc => self.cpu.rlc(),
            Op::Rrc => self.cpu.rrc(),
            Op::Ral => self.cpu.ral(),
            Op::Rar => self.cpu.rar(),
            Op::Daa => self.cpu.daa(),
            Op::Cma => self.cpu.a = !self.cpu.a,
            Op::Stc => self.cpu.flags.set_carry(true),
            Op::Cmc => self.cpu.flags.set_carry(!self.cpu.flags.carry()),
            Op::Mov(dest, src) => self.set_reg(dest, self.reg(src)),
            Op::Hlt => self.cpu.halted = true,
            Op::Alu(op, reg) => self.cpu.alu(op, self.reg(reg)),
            Op::AluImm(op) => {
                let value = self.fetch_byte();
                self.cpu.alu(op, value);
            }
            Op::Ret => self.cpu.pc = self.pop(),
            Op::RetIf(cond) => {
                if self.cpu.flags.test(cond) {
                    self.cpu.pc = self.pop();
                    return BRANCH_TAKEN_CYCLES;
                }
            }
            Op::Jmp => self.cpu.pc = self.fetch_word(),
            Op::JmpIf(cond) => {
                // Address is consumed either way
                let addr = self.fetch_word();
                if self.cpu.flags.test(cond) {
                    self.cpu.pc = addr;
                }
            }
            Op::Call => {
                let addr = self.fetch_word();
                self.call(addr);
            }
            Op::CallIf(cond) => {
                let addr = self.fetch_word();
                if self.cpu.flags.test(cond) {
                    self.call(addr);
                    return BRANCH_TAKEN_CYCLES;
                }
            }
            Op::Rst(vector) => self.call(vector as u16 * 8),
            Op::Push(pair) => {
                let value = match pair {
                    StackPair::B => self.cpu.bc,
                    StackPair::D => self.cpu.de,
                    StackPair::H => self.cpu.hl,
                    StackPair::Psw => {
                        self.cpu.flags.normalize();
                        u16::from_be_bytes([self.cpu.a, self.cpu.flags.bits()])
                    }
                };
                self.push(value);
            }
            Op::Pop(pair) => {
                let value = self.pop();
                match pair {
                    StackPair::B => self.cpu.bc = value,
                    StackPair::D => self.cpu.de = value,
                    StackPair::H => self.cpu.hl = value,
                    StackPair::Psw => {
                        let [a, flags] = value.to_be_bytes();
                        self.cpu.a = a;
                        self.cpu.flags = Flags::from_bits(flags);
                    }
                }
            }
            Op::Out => {
                let port = self.fetch_byte();
                self.io.output(port, self.cpu.a);
            }
            Op::In => {
                let port = self.fetch_byte();
                self.cpu.a = self.io.input(port);
            }
            Op::Xthl => {
                let value = self.mem.read_word(self.cpu.sp);
                self.mem.write_word(self.cpu.sp, self.cpu.hl);
                self.cpu.hl = value;
            }
            Op::Pchl => self.cpu.pc = self.cpu.hl,
            Op::Xchg => std::mem::swap(&mut self.cpu.de, &mut self.cpu.hl),
            Op::Sphl => self.cpu.sp = self.cpu.hl,
            Op::Di => self.cpu.inte = false,
            Op::Ei => self.cpu.inte = true,
        }
        0
    }

    fn fetch_byte(&mut self) -> u8 {
        let value = self.mem.read(self.cpu.pc);
        self.cpu.pc = self.cpu.pc.wrapping_add(1);
        value
    }

    fn fetch_word(&mut self) -> u16 {
        let value = self.mem.read_word(self.cpu.pc);
        self.cpu.pc = self.cpu.pc.wrapping_add(2);
        value
    }

    fn push(&mut self, value: u16) {
        self.cpu.sp = self.cpu.sp.wrapping_sub(2);
        self.mem.write_word(self.cpu.sp, value);
    }

    fn pop(&mut self) -> u16 {
        let value = self.mem.read_word(self.cpu.sp);
        self.cpu.sp = self.cpu.sp.wrapping_add(2);
        value
    }

    fn call(&mut self, addr: u16) {
        self.push(self.cpu.pc);
        self.cpu.pc = addr;
    }

    fn reg(&self, reg: Reg) -> u8 {
        let [b, c] = self.cpu.bc.to_be_bytes();
        let [d, e] = self.cpu.de.to_be_bytes();
        let [h, l] = self.cpu.hl.to_be_bytes();
        match reg {
            Reg::B => b,
            Reg::C => c,
            Reg::D => d,
            Reg::E => e,
            Reg::H => h,
            Reg::L => l,
            Reg::M => self.mem.read(self.cpu.hl),
            Reg::A => self.cpu.a,
        }
    }

    fn set_reg(&mut self, reg: Reg, value: u8) {
        let high = |pair: u16| (pair & 0x00FF) | (value as u16) << 8;
        let low = |pair: u16| (pair & 0xFF00) | value as u16;
        match reg {
            Reg::B => self.cpu.bc = high(self.cpu.bc),
            Reg::C => self.cpu.bc = low(self.cpu.bc),
            Reg::D => self.cpu.de = high(self.cpu.de),
            Reg::E => self.cpu.de = low(self.cpu.de),
            Reg::H => self.cpu.hl = high(self.cpu.hl),
            Reg::L => self.cpu.hl = low(self.cpu.hl),
            Reg::M => self.mem.write(self.cpu.hl, value),
            Reg::A => self.cpu.a = value,
        }
    }

    fn pair(&self, pair: Pair) -> u16 {
        match pair {
            Pair::B => self.cpu.bc,
            Pair::D => self.cpu.de,
            Pair::H => self.cpu.hl,
            Pair::SP => self.cpu.sp,
        }
    }

    fn set_pair(&mut self, pair: Pair, value: u16) {
        match pair {
            Pair::B => self.cpu.bc = value,
            Pair::D => self.cpu.de = value,
            Pair::H => self.cpu.hl = value,
            Pair::SP => self.cpu.sp = value,
        }
    }

    fn indirect(&self, pair: Indirect) -> u16 {
        match pair {
            Indirect::B => self.cpu.bc,
            Indirect::D => self.cpu.de,
        }
    }
}

//! Canonical model of the 8080 opcode map.
//!
//! Every byte value decodes to exactly one [`Op`]. The engine executes that shape, the
//! disassembler prints it and the assembler builds it from source before calling [`Op::encode`].
//! Keeping all three views on one type is what lets them agree byte for byte.

use std::fmt;

/// 8-bit register operand, numbered as in the opcode field.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Reg {
    B = 0,
    C,
    D,
    E,
    H,
    L,
    /// Memory byte addressed by `HL`.
    M,
    A,
}

impl Reg {
    const ALL: [Reg; 8] = [
        Reg::B,
        Reg::C,
        Reg::D,
        Reg::E,
        Reg::H,
        Reg::L,
        Reg::M,
        Reg::A,
    ];

    /// Register named by the low three bits of `code`.
    pub fn from_code(code: u8) -> Reg {
        Self::ALL[(code & 0b111) as usize]
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_name(name: &str) -> Option<Reg> {
        Self::ALL
            .into_iter()
            .find(|reg| reg.name().eq_ignore_ascii_case(name))
    }

    pub fn name(self) -> &'static str {
        ["B", "C", "D", "E", "H", "L", "M", "A"][self as usize]
    }
}

/// 16-bit register pair as used by `LXI`, `INX`, `DCX` and `DAD`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Pair {
    B = 0,
    D,
    H,
    SP,
}

impl Pair {
    pub fn from_code(code: u8) -> Pair {
        match code & 0b11 {
            0 => Pair::B,
            1 => Pair::D,
            2 => Pair::H,
            _ => Pair::SP,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_name(name: &str) -> Option<Pair> {
        match name.to_ascii_uppercase().as_str() {
            "B" | "BC" => Some(Pair::B),
            "D" | "DE" => Some(Pair::D),
            "H" | "HL" => Some(Pair::H),
            "SP" => Some(Pair::SP),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        ["B", "D", "H", "SP"][self as usize]
    }
}

/// Register pair as used by `PUSH` and `POP`, where code 3 is the status word.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum StackPair {
    B = 0,
    D,
    H,
    Psw,
}

impl StackPair {
    pub fn from_code(code: u8) -> StackPair {
        match code & 0b11 {
            0 => StackPair::B,
            1 => StackPair::D,
            2 => StackPair::H,
            _ => StackPair::Psw,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_name(name: &str) -> Option<StackPair> {
        match name.to_ascii_uppercase().as_str() {
            "B" | "BC" => Some(StackPair::B),
            "D" | "DE" => Some(StackPair::D),
            "H" | "HL" => Some(StackPair::H),
            "PSW" => Some(StackPair::Psw),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        ["B", "D", "H", "PSW"][self as usize]
    }
}

/// Pair usable for `LDAX`/`STAX`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Indirect {
    B = 0,
    D,
}

impl Indirect {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_name(name: &str) -> Option<Indirect> {
        match Pair::from_name(name)? {
            Pair::B => Some(Indirect::B),
            Pair::D => Some(Indirect::D),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        ["B", "D"][self as usize]
    }
}

/// Branch condition, numbered as in the opcode field.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Cond {
    NotZero = 0,
    Zero,
    NoCarry,
    Carry,
    ParityOdd,
    ParityEven,
    Plus,
    Minus,
}

impl Cond {
    const ALL: [Cond; 8] = [
        Cond::NotZero,
        Cond::Zero,
        Cond::NoCarry,
        Cond::Carry,
        Cond::ParityOdd,
        Cond::ParityEven,
        Cond::Plus,
        Cond::Minus,
    ];

    pub fn from_code(code: u8) -> Cond {
        Self::ALL[(code & 0b111) as usize]
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    /// Suffix used in `J<cc>`, `C<cc>` and `R<cc>` mnemonics.
    pub fn suffix(self) -> &'static str {
        ["NZ", "Z", "NC", "C", "PO", "PE", "P", "M"][self as usize]
    }

    pub fn from_suffix(suffix: &str) -> Option<Cond> {
        Self::ALL
            .into_iter()
            .find(|cond| cond.suffix().eq_ignore_ascii_case(suffix))
    }
}

/// Accumulator operation, numbered as in the opcode field.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AluOp {
    Add = 0,
    Adc,
    Sub,
    Sbb,
    Ana,
    Xra,
    Ora,
    Cmp,
}

impl AluOp {
    const ALL: [AluOp; 8] = [
        AluOp::Add,
        AluOp::Adc,
        AluOp::Sub,
        AluOp::Sbb,
        AluOp::Ana,
        AluOp::Xra,
        AluOp::Ora,
        AluOp::Cmp,
    ];

    pub fn from_code(code: u8) -> AluOp {
        Self::ALL[(code & 0b111) as usize]
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    /// Mnemonic of the register form.
    pub fn name(self) -> &'static str {
        ["ADD", "ADC", "SUB", "SBB", "ANA", "XRA", "ORA", "CMP"][self as usize]
    }

    /// Mnemonic of the immediate form.
    pub fn immediate_name(self) -> &'static str {
        ["ADI", "ACI", "SUI", "SBI", "ANI", "XRI", "ORI", "CPI"][self as usize]
    }

    pub fn from_name(name: &str) -> Option<AluOp> {
        Self::ALL
            .into_iter()
            .find(|op| op.name().eq_ignore_ascii_case(name))
    }

    pub fn from_immediate_name(name: &str) -> Option<AluOp> {
        Self::ALL
            .into_iter()
            .find(|op| op.immediate_name().eq_ignore_ascii_case(name))
    }
}

/// Data that follows an opcode byte in the instruction stream.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Operand {
    None,
    Byte,
    Word,
}

/// Shape of a decoded instruction, without its trailing data.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Op {
    Nop,
    Lxi(Pair),
    Stax(Indirect),
    Ldax(Indirect),
    Shld,
    Lhld,
    Sta,
    Lda,
    Inx(Pair),
    Dcx(Pair),
    Dad(Pair),
    Inr(Reg),
    Dcr(Reg),
    Mvi(Reg),
    Rlc,
    Rrc,
    Ral,
    Rar,
    Daa,
    Cma,
    Stc,
    Cmc,
    /// `MOV dest,src`.
    Mov(Reg, Reg),
    Hlt,
    Alu(AluOp, Reg),
    AluImm(AluOp),
    Ret,
    RetIf(Cond),
    Jmp,
    JmpIf(Cond),
    Call,
    CallIf(Cond),
    Rst(u8),
    Push(StackPair),
    Pop(StackPair),
    Out,
    In,
    Xthl,
    Pchl,
    Xchg,
    Sphl,
    Di,
    Ei,
}

impl Op {
    /// Decode any opcode byte. Undocumented bytes decode to the instruction they alias.
    pub fn decode(byte: u8) -> Op {
        // Octal fields: xx yyy zzz, with yyy split as pp q
        let y = (byte >> 3) & 0b111;
        let z = byte & 0b111;
        let p = y >> 1;
        let q = y & 1;
        match byte >> 6 {
            0 => match z {
                0 => Op::Nop,
                1 if q == 0 => Op::Lxi(Pair::from_code(p)),
                1 => Op::Dad(Pair::from_code(p)),
                2 => match y {
                    0 => Op::Stax(Indirect::B),
                    1 => Op::Ldax(Indirect::B),
                    2 => Op::Stax(Indirect::D),
                    3 => Op::Ldax(Indirect::D),
                    4 => Op::Shld,
                    5 => Op::Lhld,
                    6 => Op::Sta,
                    _ => Op::Lda,
                },
                3 if q == 0 => Op::Inx(Pair::from_code(p)),
                3 => Op::Dcx(Pair::from_code(p)),
                4 => Op::Inr(Reg::from_code(y)),
                5 => Op::Dcr(Reg::from_code(y)),
                6 => Op::Mvi(Reg::from_code(y)),
                _ => match y {
                    0 => Op::Rlc,
                    1 => Op::Rrc,
                    2 => Op::Ral,
                    3 => Op::Rar,
                    4 => Op::Daa,
                    5 => Op::Cma,
                    6 => Op::Stc,
                    _ => Op::Cmc,
                },
            },
            1 if byte == 0x76 => Op::Hlt,
            1 => Op::Mov(Reg::from_code(y), Reg::from_code(z)),
            2 => Op::Alu(AluOp::from_code(y), Reg::from_code(z)),
            _ => match z {
                0 => Op::RetIf(Cond::from_code(y)),
                1 if q == 0 => Op::Pop(StackPair::from_code(p)),
                1 => match p {
                    0 | 1 => Op::Ret,
                    2 => Op::Pchl,
                    _ => Op::Sphl,
                },
                2 => Op::JmpIf(Cond::from_code(y)),
                3 => match y {
                    0 | 1 => Op::Jmp,
                    2 => Op::Out,
                    3 => Op::In,
                    4 => Op::Xthl,
                    5 => Op::Xchg,
                    6 => Op::Di,
                    _ => Op::Ei,
                },
                4 => Op::CallIf(Cond::from_code(y)),
                5 if q == 0 => Op::Push(StackPair::from_code(p)),
                5 => Op::Call,
                6 => Op::AluImm(AluOp::from_code(y)),
                _ => Op::Rst(y),
            },
        }
    }

    /// Canonical opcode byte. Inverse of [`Op::decode`] for every documented byte.
    pub fn encode(self) -> u8 {
        match self {
            Op::Nop => 0x00,
            Op::Lxi(pair) => 0x01 | (pair.code() << 4),
            Op::Stax(pair) => 0x02 | (pair.code() << 4),
            Op::Ldax(pair) => 0x0A | (pair.code() << 4),
            Op::Shld => 0x22,
            Op::Lhld => 0x2A,
            Op::Sta => 0x32,
            Op::Lda => 0x3A,
            Op::Inx(pair) => 0x03 | (pair.code() << 4),
            Op::Dcx(pair) => 0x0B | (pair.code() << 4),
            Op::Dad(pair) => 0x09 | (pair.code() << 4),
            Op::Inr(reg) => 0x04 | (reg.code() << 3),
            Op::Dcr(reg) => 0x05 | (reg.code() << 3),
            Op::Mvi(reg) => 0x06 | (reg.code() << 3),
            Op::Rlc => 0x07,
            Op::Rrc => 0x0F,
            Op::Ral => 0x17,
            Op::Rar => 0x1F,
            Op::Daa => 0x27,
            Op::Cma => 0x2F,
            Op::Stc => 0x37,
            Op::Cmc => 0x3F,
            Op::Mov(dest, src) => 0x40 | (dest.code() << 3) | src.code(),
            Op::Hlt => 0x76,
            Op::Alu(op, reg) => 0x80 | (op.code() << 3) | reg.code(),
            Op::AluImm(op) => 0xC6 | (op.code() << 3),
            Op::Ret => 0xC9,
            Op::RetIf(cond) => 0xC0 | (cond.code() << 3),
            Op::Jmp => 0xC3,
            Op::JmpIf(cond) => 0xC2 | (cond.code() << 3),
            Op::Call => 0xCD,
            Op::CallIf(cond) => 0xC4 | (cond.code() << 3),
            Op::Rst(vector) => 0xC7 | ((vector & 0b111) << 3),
            Op::Push(pair) => 0xC5 | (pair.code() << 4),
            Op::Pop(pair) => 0xC1 | (pair.code() << 4),
            Op::Out => 0xD3,
            Op::In => 0xDB,
            Op::Xthl => 0xE3,
            Op::Pchl => 0xE9,
            Op::Xchg => 0xEB,
            Op::Sphl => 0xF9,
            Op::Di => 0xF3,
            Op::Ei => 0xFB,
        }
    }

    pub fn operand(self) -> Operand {
        match self {
            Op::Mvi(_) | Op::AluImm(_) | Op::Out | Op::In => Operand::Byte,
            Op::Lxi(_)
            | Op::Shld
            | Op::Lhld
            | Op::Sta
            | Op::Lda
            | Op::Jmp
            | Op::JmpIf(_)
            | Op::Call
            | Op::CallIf(_) => Operand::Word,
            _ => Operand::None,
        }
    }

    /// Instruction length in bytes, including the opcode.
    pub fn len(self) -> u8 {
        match self.operand() {
            Operand::None => 1,
            Operand::Byte => 2,
            Operand::Word => 3,
        }
    }
}

/// Mnemonic template: the instruction text up to where its trailing data is printed.
impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Op::Nop => write!(f, "NOP"),
            Op::Lxi(pair) => write!(f, "LXI {},", pair.name()),
            Op::Stax(pair) => write!(f, "STAX {}", pair.name()),
            Op::Ldax(pair) => write!(f, "LDAX {}", pair.name()),
            Op::Shld => write!(f, "SHLD "),
            Op::Lhld => write!(f, "LHLD "),
            Op::Sta => write!(f, "STA "),
            Op::Lda => write!(f, "LDA "),
            Op::Inx(pair) => write!(f, "INX {}", pair.name()),
            Op::Dcx(pair) => write!(f, "DCX {}", pair.name()),
            Op::Dad(pair) => write!(f, "DAD {}", pair.name()),
            Op::Inr(reg) => write!(f, "INR {}", reg.name()),
            Op::Dcr(reg) => write!(f, "DCR {}", reg.name()),
            Op::Mvi(reg) => write!(f, "MVI {},", reg.name()),
            Op::Rlc => write!(f, "RLC"),
            Op::Rrc => write!(f, "RRC"),
            Op::Ral => write!(f, "RAL"),
            Op::Rar => write!(f, "RAR"),
            Op::Daa => write!(f, "DAA"),
            Op::Cma => write!(f, "CMA"),
            Op::Stc => write!(f, "STC"),
            Op::Cmc => write!(f, "CMC"),
            Op::Mov(dest, src) => write!(f, "MOV {},{}", dest.name(), src.name()),
            Op::Hlt => write!(f, "HLT"),
            Op::Alu(op, reg) => write!(f, "{} {}", op.name(), reg.name()),
            Op::AluImm(op) => write!(f, "{} ", op.immediate_name()),
            Op::Ret => write!(f, "RET"),
            Op::RetIf(cond) => write!(f, "R{}", cond.suffix()),
            Op::Jmp => write!(f, "JMP "),
            Op::JmpIf(cond) => write!(f, "J{} ", cond.suffix()),
            Op::Call => write!(f, "CALL "),
            Op::CallIf(cond) => write!(f, "C{} ", cond.suffix()),
            Op::Rst(vector) => write!(f, "RST {}", vector),
            Op::Push(pair) => write!(f, "PUSH {}", pair.name()),
            Op::Pop(pair) => write!(f, "POP {}", pair.name()),
            Op::Out => write!(f, "OUT "),
            Op::In => write!(f, "IN "),
            Op::Xthl => write!(f, "XTHL"),
            Op::Pchl => write!(f, "PCHL"),
            Op::Xchg => write!(f, "XCHG"),
            Op::Sphl => write!(f, "SPHL"),
            Op::Di => write!(f, "DI"),
            Op::Ei => write!(f, "EI"),
        }
    }
}

/// Extra cycles charged when a conditional call or return is taken.
pub const BRANCH_TAKEN_CYCLES: u32 = 6;
/// Cost of a `step` while halted.
pub const HALT_CYCLES: u32 = 4;
/// Cost of accepting an interrupt, the same as executing `RST`.
pub const INTERRUPT_CYCLES: u32 = 11;

#[rustfmt::skip]
const CYCLES: [u8; 256] = [
//  0   1   2   3   4   5   6   7   8   9   A   B   C   D   E   F
    4, 10,  7,  5,  5,  5,  7,  4,  4, 10,  7,  5,  5,  5,  7,  4, // 0
    4, 10,  7,  5,  5,  5,  7,  4,  4, 10,  7,  5,  5,  5,  7,  4, // 1
    4, 10, 16,  5,  5,  5,  7,  4,  4, 10, 16,  5,  5,  5,  7,  4, // 2
    4, 10, 13,  5, 10, 10, 10,  4,  4, 10, 13,  5,  5,  5,  7,  4, // 3
    5,  5,  5,  5,  5,  5,  7,  5,  5,  5,  5,  5,  5,  5,  7,  5, // 4
    5,  5,  5,  5,  5,  5,  7,  5,  5,  5,  5,  5,  5,  5,  7,  5, // 5
    5,  5,  5,  5,  5,  5,  7,  5,  5,  5,  5,  5,  5,  5,  7,  5, // 6
    7,  7,  7,  7,  7,  7,  7,  7,  5,  5,  5,  5,  5,  5,  7,  5, // 7
    4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4, // 8
    4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4, // 9
    4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4, // A
    4,  4,  4,  4,  4,  4,  7,  4,  4,  4,  4,  4,  4,  4,  7,  4, // B
    5, 10, 10, 10, 11, 11,  7, 11,  5, 10, 10, 10, 11, 17,  7, 11, // C
    5, 10, 10, 10, 11, 11,  7, 11,  5, 10, 10, 10, 11, 17,  7, 11, // D
    5, 10, 10, 18, 11, 11,  7, 11,  5,  5, 10,  4, 11, 17,  7, 11, // E
    5, 10, 10,  4, 11, 11,  7, 11,  5,  5, 10,  4, 11, 17,  7, 11, // F
];

/// Base cycle cost of an opcode byte, charged at fetch.
pub fn cycles(opcode: u8) -> u32 {
    CYCLES[opcode as usize] as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Published instruction lengths, kept independent of [`Op::len`].
    #[rustfmt::skip]
    const LENGTHS: [u8; 256] = [
        1, 3, 1, 1, 1, 1, 2, 1, 1, 1, 1, 1, 1, 1, 2, 1,
        1, 3, 1, 1, 1, 1, 2, 1, 1, 1, 1, 1, 1, 1, 2, 1,
        1, 3, 3, 1, 1, 1, 2, 1, 1, 1, 3, 1, 1, 1, 2, 1,
        1, 3, 3, 1, 1, 1, 2, 1, 1, 1, 3, 1, 1, 1, 2, 1,
        1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
        1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
        1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
        1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
        1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
        1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
        1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
        1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
        1, 1, 3, 3, 3, 1, 2, 1, 1, 1, 3, 3, 3, 3, 2, 1,
        1, 1, 3, 2, 3, 1, 2, 1, 1, 1, 3, 2, 3, 3, 2, 1,
        1, 1, 3, 1, 3, 1, 2, 1, 1, 1, 3, 1, 3, 3, 2, 1,
        1, 1, 3, 1, 3, 1, 2, 1, 1, 1, 3, 1, 3, 3, 2, 1,
    ];

    const ALIASES: [u8; 12] = [
        0x08, 0x10, 0x18, 0x20, 0x28, 0x30, 0x38, 0xCB, 0xD9, 0xDD, 0xED, 0xFD,
    ];

    #[test]
    fn lengths_match_published_table() {
        for byte in 0..=255u8 {
            assert_eq!(
                Op::decode(byte).len(),
                LENGTHS[byte as usize],
                "length of 0x{byte:02x}"
            );
        }
    }

    #[test]
    fn encode_inverts_decode() {
        for byte in 0..=255u8 {
            let op = Op::decode(byte);
            if ALIASES.contains(&byte) {
                assert_ne!(op.encode(), byte);
            } else {
                assert_eq!(op.encode(), byte, "{op:?}");
            }
            assert_eq!(Op::decode(op.encode()), op);
        }
    }

    #[test]
    fn aliases() {
        for byte in [0x08, 0x10, 0x18, 0x20, 0x28, 0x30, 0x38] {
            assert_eq!(Op::decode(byte), Op::Nop);
        }
        assert_eq!(Op::decode(0xCB), Op::Jmp);
        assert_eq!(Op::decode(0xD9), Op::Ret);
        for byte in [0xDD, 0xED, 0xFD] {
            assert_eq!(Op::decode(byte), Op::Call);
        }
        // Aliases cost the same as the instruction they stand for
        assert_eq!(cycles(0xCB), cycles(0xC3));
        assert_eq!(cycles(0xD9), cycles(0xC9));
        assert_eq!(cycles(0xFD), cycles(0xCD));
    }

    #[test]
    fn field_packing() {
        assert_eq!(Op::Mov(Reg::A, Reg::M).encode(), 0x7E);
        assert_eq!(Op::Mvi(Reg::A).encode(), 0x3E);
        assert_eq!(Op::Lxi(Pair::SP).encode(), 0x31);
        assert_eq!(Op::Push(StackPair::Psw).encode(), 0xF5);
        assert_eq!(Op::Pop(StackPair::B).encode(), 0xC1);
        assert_eq!(Op::Alu(AluOp::Cmp, Reg::B).encode(), 0xB8);
        assert_eq!(Op::AluImm(AluOp::Cmp).encode(), 0xFE);
        assert_eq!(Op::JmpIf(Cond::Minus).encode(), 0xFA);
        assert_eq!(Op::CallIf(Cond::NotZero).encode(), 0xC4);
        assert_eq!(Op::RetIf(Cond::Carry).encode(), 0xD8);
        assert_eq!(Op::Rst(7).encode(), 0xFF);
        assert_eq!(Op::Ldax(Indirect::D).encode(), 0x1A);
    }

    #[test]
    fn templates() {
        assert_eq!(Op::decode(0x01).to_string(), "LXI B,");
        assert_eq!(Op::decode(0x31).to_string(), "LXI SP,");
        assert_eq!(Op::decode(0x7E).to_string(), "MOV A,M");
        assert_eq!(Op::decode(0xF5).to_string(), "PUSH PSW");
        assert_eq!(Op::decode(0xC2).to_string(), "JNZ ");
        assert_eq!(Op::decode(0xE8).to_string(), "RPE");
        assert_eq!(Op::decode(0xEF).to_string(), "RST 5");
        assert_eq!(Op::decode(0xFE).to_string(), "CPI ");
    }

    #[test]
    fn name_lookup() {
        assert_eq!(Reg::from_name("m"), Some(Reg::M));
        assert_eq!(Reg::from_name("BC"), None);
        assert_eq!(Pair::from_name("hl"), Some(Pair::H));
        assert_eq!(Pair::from_name("PSW"), None);
        assert_eq!(StackPair::from_name("psw"), Some(StackPair::Psw));
        assert_eq!(StackPair::from_name("SP"), None);
        assert_eq!(Indirect::from_name("H"), None);
        assert_eq!(Cond::from_suffix("pe"), Some(Cond::ParityEven));
        assert_eq!(AluOp::from_immediate_name("sbi"), Some(AluOp::Sbb));
    }
}

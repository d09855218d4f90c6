//! Selects the opcode for a mnemonic and its operands.
//!
//! Selection only looks at register names and operand counts, so the length of a line is known
//! before any label is resolved. Immediate values are filled in afterwards by [`Instr::bytes`].

use crate::air::Word;
use crate::isa::{AluOp, Cond, Indirect, Op, Operand, Pair, Reg, StackPair};
use crate::lexer::parse_literal;

/// Chosen opcode plus the operand that supplies its trailing data, if any.
#[derive(Clone, Copy, Debug)]
pub struct Instr<'a> {
    pub op: Op,
    pub immediate: Option<&'a Word>,
}

impl<'a> Instr<'a> {
    fn plain(op: Op) -> Self {
        Instr {
            op,
            immediate: None,
        }
    }

    fn with(op: Op, immediate: &'a Word) -> Self {
        Instr {
            op,
            immediate: Some(immediate),
        }
    }

    pub fn len(&self) -> u16 {
        self.op.len() as u16
    }

    /// Encoded bytes, given the resolved value of the immediate operand.
    pub fn bytes(&self, value: u16) -> Vec<u8> {
        let mut bytes = vec![self.op.encode()];
        match self.op.operand() {
            Operand::None => (),
            Operand::Byte => bytes.push(value as u8),
            Operand::Word => bytes.extend_from_slice(&value.to_le_bytes()),
        }
        bytes
    }
}

fn reg(word: &Word) -> Option<Reg> {
    Reg::from_name(&word.text)
}

/// Pick the instruction for `mnemonic` (upper case). `None` when the mnemonic is unknown or
/// its operands do not fit.
pub fn select<'a>(mnemonic: &str, operands: &'a [Word]) -> Option<Instr<'a>> {
    let op = match (mnemonic, operands) {
        ("MOV", [dest, src]) => match (reg(dest)?, reg(src)?) {
            // That byte is HLT
            (Reg::M, Reg::M) => return None,
            (dest, src) => Op::Mov(dest, src),
        },
        ("MVI", [dest, imm]) => return Some(Instr::with(Op::Mvi(reg(dest)?), imm)),
        ("LXI", [pair, imm]) => {
            return Some(Instr::with(Op::Lxi(Pair::from_name(&pair.text)?), imm))
        }
        ("PUSH", [pair]) => Op::Push(StackPair::from_name(&pair.text)?),
        ("POP", [pair]) => Op::Pop(StackPair::from_name(&pair.text)?),
        ("DAD", [pair]) => Op::Dad(Pair::from_name(&pair.text)?),
        ("INX", [pair]) => Op::Inx(Pair::from_name(&pair.text)?),
        ("DCX", [pair]) => Op::Dcx(Pair::from_name(&pair.text)?),
        ("LDAX", [pair]) => Op::Ldax(Indirect::from_name(&pair.text)?),
        ("STAX", [pair]) => Op::Stax(Indirect::from_name(&pair.text)?),
        ("INR", [r]) => Op::Inr(reg(r)?),
        ("DCR", [r]) => Op::Dcr(reg(r)?),
        ("RST", [vector]) => match parse_literal(&vector.text)? {
            n @ 0..=7 => Op::Rst(n as u8),
            _ => return None,
        },
        (_, []) => no_operand(mnemonic)?,
        (_, [operand]) => {
            if let Some(op) = AluOp::from_name(mnemonic) {
                Op::Alu(op, reg(operand)?)
            } else {
                return Some(Instr::with(with_data(mnemonic)?, operand));
            }
        }
        _ => return None,
    };
    Some(Instr::plain(op))
}

fn no_operand(mnemonic: &str) -> Option<Op> {
    let op = match mnemonic {
        "NOP" => Op::Nop,
        "HLT" => Op::Hlt,
        "RET" => Op::Ret,
        "PCHL" => Op::Pchl,
        "SPHL" => Op::Sphl,
        "XCHG" => Op::Xchg,
        "XTHL" => Op::Xthl,
        "EI" => Op::Ei,
        "DI" => Op::Di,
        "RLC" => Op::Rlc,
        "RRC" => Op::Rrc,
        "RAL" => Op::Ral,
        "RAR" => Op::Rar,
        "DAA" => Op::Daa,
        "CMA" => Op::Cma,
        "STC" => Op::Stc,
        "CMC" => Op::Cmc,
        _ => Op::RetIf(Cond::from_suffix(mnemonic.strip_prefix('R')?)?),
    };
    Some(op)
}

/// Single-operand instructions whose operand is data rather than a register.
fn with_data(mnemonic: &str) -> Option<Op> {
    let op = match mnemonic {
        "JMP" => Op::Jmp,
        "CALL" => Op::Call,
        "LDA" => Op::Lda,
        "STA" => Op::Sta,
        "LHLD" => Op::Lhld,
        "SHLD" => Op::Shld,
        "IN" => Op::In,
        "OUT" => Op::Out,
        _ => {
            if let Some(op) = AluOp::from_immediate_name(mnemonic) {
                Op::AluImm(op)
            } else if let Some(suffix) = mnemonic.strip_prefix('J') {
                Op::JmpIf(Cond::from_suffix(suffix)?)
            } else {
                Op::CallIf(Cond::from_suffix(mnemonic.strip_prefix('C')?)?)
            }
        }
    };
    Some(op)
}

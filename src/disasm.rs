use crate::isa::{Op, Operand};
use crate::runtime::Memory;

/// Text of the instruction at `addr` and its length in bytes.
///
/// Operand bytes past the top of memory wrap around to address 0.
pub fn disassemble(mem: &impl Memory, addr: u16) -> (String, u8) {
    let op = Op::decode(mem.read(addr));
    let operand_addr = addr.wrapping_add(1);
    let text = match op.operand() {
        Operand::None => op.to_string(),
        Operand::Byte => format!("{op}{:02X}h", mem.read(operand_addr)),
        Operand::Word => format!("{op}{:04X}h", mem.read_word(operand_addr)),
    };
    (text, op.len())
}

/// One line per instruction in `range`, as `AAAA: BB BB BB  TEXT`.
///
/// An instruction starting inside the range is printed whole, even if it runs past the end.
pub fn listing(mem: &impl Memory, range: std::ops::Range<u32>) -> String {
    let mut out = String::new();
    let mut addr = range.start;
    while addr < range.end {
        let (text, len) = disassemble(mem, addr as u16);
        out.push_str(&format!("{:04X}:", addr as u16));
        for i in 0..3u16 {
            if i < len as u16 {
                out.push_str(&format!(" {:02X}", mem.read((addr as u16).wrapping_add(i))));
            } else {
                out.push_str("   ");
            }
        }
        out.push_str(&format!("  {text}\n"));
        addr += len as u32;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Ram;

    fn ram(bytes: &[u8]) -> Ram {
        let mut ram = Ram::new();
        ram.load(0, bytes);
        ram
    }

    #[test]
    fn operand_formatting() {
        let ram = ram(&[0x3E, 0x48, 0xC3, 0x34, 0x12, 0x01, 0x00, 0xF0, 0xD3, 0x0A]);
        assert_eq!(disassemble(&ram, 0), ("MVI A,48h".to_string(), 2));
        assert_eq!(disassemble(&ram, 2), ("JMP 1234h".to_string(), 3));
        assert_eq!(disassemble(&ram, 5), ("LXI B,F000h".to_string(), 3));
        assert_eq!(disassemble(&ram, 8), ("OUT 0Ah".to_string(), 2));
    }

    #[test]
    fn registers_and_pairs() {
        let ram = ram(&[0x78, 0x77, 0xF5, 0xC1, 0x09, 0x33, 0x1A, 0xEF, 0x86, 0xFE, 0x00]);
        let texts: Vec<String> = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9]
            .iter()
            .map(|&addr| disassemble(&ram, addr).0)
            .collect();
        assert_eq!(
            texts[..9],
            [
                "MOV A,B", "MOV M,A", "PUSH PSW", "POP B", "DAD B", "INX SP", "LDAX D", "RST 5",
                "ADD M",
            ]
        );
        assert_eq!(texts[9], "CPI 00h");
    }

    #[test]
    fn total_over_every_byte() {
        for byte in 0..=255u8 {
            let ram = ram(&[byte, 0x00, 0x00]);
            let (text, len) = disassemble(&ram, 0);
            assert!(!text.is_empty());
            assert_eq!(len, Op::decode(byte).len());
        }
        // Aliases read as their canonical instruction
        assert_eq!(disassemble(&ram(&[0xCB, 0, 0]), 0).0, "JMP 0000h");
        assert_eq!(disassemble(&ram(&[0xFD, 0, 0]), 0).0, "CALL 0000h");
        assert_eq!(disassemble(&ram(&[0x38]), 0).0, "NOP");
        assert_eq!(disassemble(&ram(&[0xD9]), 0).0, "RET");
    }

    #[test]
    fn operands_wrap() {
        let mut ram = Ram::new();
        ram.write(0xFFFF, 0xC3);
        ram.write(0x0000, 0x00);
        ram.write(0x0001, 0x10);
        assert_eq!(disassemble(&ram, 0xFFFF), ("JMP 1000h".to_string(), 3));
    }

    #[test]
    fn listing_lines() {
        let ram = ram(&[0x3E, 0x48, 0xD3, 0x01, 0x76]);
        assert_eq!(
            listing(&ram, 0..5),
            "0000: 3E 48     MVI A,48h\n\
             0002: D3 01     OUT 01h\n\
             0004: 76        HLT\n"
        );
    }

    #[test]
    fn listing_runs_past_range_end() {
        // A three byte instruction starting on the last byte is shown whole
        let ram = ram(&[0x00, 0xC3, 0x00, 0x01]);
        assert_eq!(
            listing(&ram, 0..2),
            "0000: 00        NOP\n\
             0001: C3 00 01  JMP 0100h\n"
        );
    }
}

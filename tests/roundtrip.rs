use altair::isa::Op;
use altair::{assemble, disasm, Ram};

/// Source line and how the disassembler prints it back.
const FAMILIES: &[(&str, &str)] = &[
    // Register pair + immediate word
    ("LXI B,1234H", "LXI B,1234h"),
    ("LXI DE,0", "LXI D,0000h"),
    ("LXI SP,0FFFFH", "LXI SP,FFFFh"),
    // Register pair
    ("INX H", "INX H"),
    ("DCX SP", "DCX SP"),
    ("DAD D", "DAD D"),
    ("PUSH PSW", "PUSH PSW"),
    ("POP B", "POP B"),
    ("STAX D", "STAX D"),
    ("LDAX B", "LDAX B"),
    // Direct address
    ("SHLD 2000H", "SHLD 2000h"),
    ("LHLD 2000H", "LHLD 2000h"),
    ("STA 10", "STA 000Ah"),
    ("LDA 0x20", "LDA 0020h"),
    // Register
    ("INR M", "INR M"),
    ("DCR a", "DCR A"),
    ("MOV D,E", "MOV D,E"),
    ("mov m,a", "MOV M,A"),
    ("ADD B", "ADD B"),
    ("ADC C", "ADC C"),
    ("SUB D", "SUB D"),
    ("SBB E", "SBB E"),
    ("ANA H", "ANA H"),
    ("XRA L", "XRA L"),
    ("ORA M", "ORA M"),
    ("CMP A", "CMP A"),
    // Register + immediate byte
    ("MVI C,'x'", "MVI C,78h"),
    ("MVI M,1010B", "MVI M,0Ah"),
    // Immediate byte
    ("ADI 1", "ADI 01h"),
    ("ACI 2", "ACI 02h"),
    ("SUI 3", "SUI 03h"),
    ("SBI 4", "SBI 04h"),
    ("ANI 0FH", "ANI 0Fh"),
    ("XRI 0F0H", "XRI F0h"),
    ("ORI 80H", "ORI 80h"),
    ("CPI 'A'", "CPI 41h"),
    ("OUT 1", "OUT 01h"),
    ("IN 0FFH", "IN FFh"),
    // Jumps and calls
    ("JMP target", "JMP 0100h"),
    ("JNZ target", "JNZ 0100h"),
    ("JZ target", "JZ 0100h"),
    ("JNC target", "JNC 0100h"),
    ("JC target", "JC 0100h"),
    ("JPO target", "JPO 0100h"),
    ("JPE target", "JPE 0100h"),
    ("JP target", "JP 0100h"),
    ("JM target", "JM 0100h"),
    ("CALL target", "CALL 0100h"),
    ("CNZ target", "CNZ 0100h"),
    ("CM target", "CM 0100h"),
    ("RET", "RET"),
    ("RNZ", "RNZ"),
    ("RPE", "RPE"),
    ("RST 0", "RST 0"),
    ("RST 7", "RST 7"),
    // No operand
    ("NOP", "NOP"),
    ("RLC", "RLC"),
    ("RRC", "RRC"),
    ("RAL", "RAL"),
    ("RAR", "RAR"),
    ("DAA", "DAA"),
    ("CMA", "CMA"),
    ("STC", "STC"),
    ("CMC", "CMC"),
    ("XTHL", "XTHL"),
    ("PCHL", "PCHL"),
    ("XCHG", "XCHG"),
    ("SPHL", "SPHL"),
    ("DI", "DI"),
    ("EI", "EI"),
    ("HLT", "HLT"),
];

#[test]
fn every_family_disassembles_back() {
    let mut src = String::new();
    for (line, _) in FAMILIES {
        src.push_str("        ");
        src.push_str(line);
        src.push('\n');
    }
    src.push_str("        ORG 100H\ntarget: NOP\n");

    let asm = assemble(&src).unwrap();
    assert!(!asm.has_errors(), "{:?}", asm.diagnostics());

    let mut ram = Ram::new();
    ram.load_records(asm.records());

    let mut addr = 0u16;
    for (line, expected) in FAMILIES {
        let (text, len) = disasm::disassemble(&ram, addr);
        assert_eq!(&text, expected, "`{line}` at {addr:04X}");
        addr += len as u16;
    }
}

/// Operand text as the assembler wants it: hex numbers must start with a digit.
fn reassemblable(text: &str) -> String {
    match text.rfind([' ', ',']) {
        Some(i) if text.ends_with('h') => format!("{}0{}", &text[..=i], &text[i + 1..]),
        _ => text.to_string(),
    }
}

#[test]
fn every_opcode_reassembles() {
    for byte in 0..=255u8 {
        let mut ram = Ram::new();
        ram.load(0, &[byte, 0x34, 0x12]);
        let (text, len) = disasm::disassemble(&ram, 0);

        let asm = assemble(&reassemblable(&text)).unwrap();
        assert!(!asm.has_errors(), "{byte:02X} `{text}`: {:?}", asm.diagnostics());

        let bytes: Vec<u8> = asm
            .records()
            .iter()
            .flat_map(|record| record.data.iter().copied())
            .collect();
        let canonical = Op::decode(byte).encode();
        let mut expected = vec![canonical, 0x34, 0x12];
        expected.truncate(len as usize);
        assert_eq!(bytes, expected, "{byte:02X} `{text}`");
    }
}

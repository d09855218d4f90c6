//! Two-pass assembly of parsed lines into Intel HEX records.
//!
//! Pass one only assigns addresses to labels. Pass two walks the same lines again with the
//! complete table and emits bytes. All state lives in a [`Context`] owned by one call to
//! [`assemble`], so separate assemblies never see each other's labels.

use miette::Result;

use crate::{
    air::{Air, AsmLine, Word},
    encoder,
    error::{Diagnostic, DiagnosticKind},
    hex::{Emitter, Record, RecordKind},
    lexer::{is_numeric, parse_literal},
    parser,
    symbol::{InsertError, Span, SymbolTable},
};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Pass {
    /// Collect labels
    One,
    /// Resolve and emit
    Two,
}

struct Context {
    pass: Pass,
    /// Address of the next emitted byte
    addr: u16,
    symbols: SymbolTable,
    /// Lines whose label was already taken by an earlier line
    duplicates: Vec<usize>,
    emitter: Emitter,
    diagnostics: Vec<Diagnostic>,
}

/// Result of a completed assembly.
#[derive(Clone, Debug)]
pub struct Assembly {
    records: Vec<Record>,
    diagnostics: Vec<Diagnostic>,
    symbols: SymbolTable,
}

impl Assembly {
    /// Data records followed by the end-of-file record.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Problems found, ordered by line.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// Address of the first data record, where execution starts.
    pub fn entry(&self) -> Option<u16> {
        self.records
            .iter()
            .find(|record| record.kind == RecordKind::Data)
            .map(|record| record.address)
    }

    /// Intel HEX text, one record per line.
    pub fn hex(&self) -> String {
        self.records
            .iter()
            .map(|record| format!("{record}\n"))
            .collect()
    }
}

/// Assemble source text.
///
/// Problems with individual lines are collected as diagnostics and never stop the run. The only
/// error is running out of label space.
pub fn assemble(src: &str) -> Result<Assembly> {
    let (air, diagnostics) = parser::parse(src);

    let mut ctx = Context::new(diagnostics);
    ctx.run(&air).map_err(|diag| diag.report(src))?;
    ctx.start(Pass::Two);
    ctx.run(&air).map_err(|diag| diag.report(src))?;

    let mut diagnostics = ctx.diagnostics;
    // Stable, so diagnostics on one line keep pass order
    diagnostics.sort_by_key(|diag| diag.line);

    Ok(Assembly {
        records: ctx.emitter.finish(),
        diagnostics,
        symbols: ctx.symbols,
    })
}

impl Context {
    fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Context {
            pass: Pass::One,
            addr: 0,
            symbols: SymbolTable::new(),
            duplicates: Vec::new(),
            emitter: Emitter::new(),
            diagnostics,
        }
    }

    /// Rewind to the first line for another pass over the same table.
    fn start(&mut self, pass: Pass) {
        self.pass = pass;
        self.addr = 0;
        self.emitter = Emitter::new();
    }

    fn run(&mut self, air: &Air) -> Result<(), Diagnostic> {
        for line in air {
            self.line(line)?;
        }
        Ok(())
    }

    fn report(&mut self, line: &AsmLine, kind: DiagnosticKind, span: Span) {
        self.diagnostics
            .push(Diagnostic::new(kind, line.line, span));
    }

    fn line(&mut self, line: &AsmLine) -> Result<(), Diagnostic> {
        // Set when this line owns its label, which is what EQU may rebind
        let mut owns_label = false;
        if let Some(label) = &line.label {
            match self.pass {
                Pass::One => match self.symbols.insert(&label.text, self.addr) {
                    Ok(()) => owns_label = true,
                    Err(InsertError::Duplicate) => {
                        self.duplicates.push(line.line);
                        self.report(
                            line,
                            DiagnosticKind::DuplicateLabel(label.text.clone()),
                            label.span,
                        );
                    }
                    Err(InsertError::Full) => {
                        return Err(Diagnostic::new(
                            DiagnosticKind::TooManyLabels,
                            line.line,
                            label.span,
                        ))
                    }
                },
                Pass::Two => owns_label = !self.duplicates.contains(&line.line),
            }
        }

        let Some(mnemonic) = line.mnemonic() else {
            return Ok(());
        };
        match mnemonic.as_str() {
            "ORG" => {
                if let [operand] = line.operands.as_slice() {
                    // Unresolved is 0 in both passes
                    self.addr = self.value(line, operand).unwrap_or(0);
                } else {
                    self.unknown(line);
                }
            }
            "EQU" => match (&line.label, line.operands.as_slice()) {
                (None, _) => {
                    if self.pass == Pass::One {
                        self.report(line, DiagnosticKind::MissingLabel, line.span);
                    }
                }
                (Some(label), [operand]) => {
                    let value = self.value(line, operand);
                    // Bound once in pass one; pass two may only confirm it
                    match (self.pass, value) {
                        (_, None) => (),
                        _ if !owns_label => (),
                        (Pass::One, Some(value)) => self.symbols.set(&label.text, value),
                        (Pass::Two, Some(value)) => {
                            if self.symbols.get(&label.text) != Some(value) {
                                self.report(
                                    line,
                                    DiagnosticKind::ForwardEqu(label.text.clone()),
                                    operand.span,
                                );
                            }
                        }
                    }
                }
                _ => self.unknown(line),
            },
            "DB" | "DEFB" => self.data(line, 1),
            "DW" | "DEFW" => self.data(line, 2),
            "DS" | "DEFS" => {
                if let [operand] = line.operands.as_slice() {
                    let count = self.value(line, operand).unwrap_or(0);
                    for _ in 0..count {
                        self.emit(0);
                    }
                } else {
                    self.unknown(line);
                }
            }
            _ => self.instruction(line, &mnemonic),
        }
        Ok(())
    }

    fn instruction(&mut self, line: &AsmLine, mnemonic: &str) {
        let Some(instr) = encoder::select(mnemonic, &line.operands) else {
            self.unknown(line);
            return;
        };
        let value = match instr.immediate {
            Some(operand) => self.value(line, operand),
            None => Some(0),
        };
        match value {
            Some(value) if self.pass == Pass::Two => {
                for byte in instr.bytes(value) {
                    self.emit(byte);
                }
            }
            // Keep later lines at the addresses pass one gave them
            _ => self.addr = self.addr.wrapping_add(instr.len()),
        }
    }

    /// `DB`/`DW` with one or more operands of `width` bytes each.
    fn data(&mut self, line: &AsmLine, width: u16) {
        if line.operands.is_empty() {
            self.unknown(line);
            return;
        }
        let values: Vec<Option<u16>> = line
            .operands
            .iter()
            .map(|operand| self.value(line, operand))
            .collect();
        let values: Option<Vec<u16>> = values.into_iter().collect();
        match values {
            Some(values) if self.pass == Pass::Two => {
                for value in values {
                    let bytes = value.to_le_bytes();
                    for byte in &bytes[..width as usize] {
                        self.emit(*byte);
                    }
                }
            }
            _ => {
                let len = width.wrapping_mul(line.operands.len() as u16);
                self.addr = self.addr.wrapping_add(len);
            }
        }
    }

    fn emit(&mut self, byte: u8) {
        if self.pass == Pass::Two {
            self.emitter.push(self.addr, byte);
        }
        self.addr = self.addr.wrapping_add(1);
    }

    fn unknown(&mut self, line: &AsmLine) {
        if self.pass == Pass::Two {
            let text = line.mnemonic.as_ref().map_or("", |word| word.text.as_str());
            self.report(
                line,
                DiagnosticKind::UnknownInstruction(text.to_string()),
                line.span,
            );
        }
    }

    /// Resolve an operand. Pass one treats anything unresolved as 0; pass two reports it
    /// and returns `None`.
    fn value(&mut self, line: &AsmLine, operand: &Word) -> Option<u16> {
        let resolved = if is_numeric(&operand.text) {
            parse_literal(&operand.text)
                .ok_or_else(|| DiagnosticKind::InvalidLiteral(operand.text.clone()))
        } else {
            self.symbols
                .get(&operand.text)
                .ok_or_else(|| DiagnosticKind::UndefinedSymbol(operand.text.clone()))
        };
        match (resolved, self.pass) {
            (Ok(value), _) => Some(value),
            (Err(_), Pass::One) => Some(0),
            (Err(kind), Pass::Two) => {
                self.report(line, kind, operand.span);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::MAX_LABELS;

    fn data(asm: &Assembly) -> Vec<(u16, Vec<u8>)> {
        asm.records()
            .iter()
            .filter(|r| r.kind == RecordKind::Data)
            .map(|r| (r.address, r.data.clone()))
            .collect()
    }

    #[test]
    fn hello_port() {
        let asm = assemble("MVI A,48H\nOUT 1\nHLT\n").unwrap();
        assert!(!asm.has_errors());
        assert_eq!(data(&asm), vec![(0, vec![0x3E, 0x48, 0xD3, 0x01, 0x76])]);
        assert_eq!(asm.hex(), ":050000003E48D301762B\n:00000001FF\n");
        assert_eq!(asm.entry(), Some(0));
    }

    #[test]
    fn labels_resolve_both_directions() {
        let src = "
            ORG 100H
    start:  JMP end
    again:  JMP start
    end:    JMP again
        ";
        let asm = assemble(src).unwrap();
        assert!(!asm.has_errors());
        assert_eq!(asm.symbols().get("start"), Some(0x100));
        assert_eq!(asm.symbols().get("AGAIN"), Some(0x103));
        assert_eq!(asm.symbols().get("end"), Some(0x106));
        assert_eq!(
            data(&asm),
            vec![(
                0x100,
                vec![0xC3, 0x06, 0x01, 0xC3, 0x00, 0x01, 0xC3, 0x03, 0x01]
            )]
        );
    }

    #[test]
    fn equ_binds_value_not_address() {
        let src = "        MVI A,FOO\nFOO     EQU 5\n        MVI B,FOO\nBAR:    EQU 0FFH\n        MVI C,BAR";
        let asm = assemble(src).unwrap();
        assert!(!asm.has_errors(), "{:?}", asm.diagnostics());
        assert_eq!(asm.symbols().get("FOO"), Some(5));
        assert_eq!(
            data(&asm),
            vec![(0, vec![0x3E, 0x05, 0x06, 0x05, 0x0E, 0xFF])]
        );
    }

    #[test]
    fn equ_on_later_label_is_reported() {
        let asm = assemble("MVI A,FOO\nFOO EQU LATER\nMVI B,FOO\nLATER: HLT").unwrap();
        assert_eq!(asm.diagnostics().len(), 1);
        assert_eq!(asm.diagnostics()[0].line, 2);
        assert_eq!(
            asm.diagnostics()[0].kind,
            DiagnosticKind::ForwardEqu("FOO".to_string())
        );
        // Every use agrees on the pass-one value
        assert_eq!(asm.symbols().get("FOO"), Some(0));
        assert_eq!(data(&asm), vec![(0, vec![0x3E, 0x00, 0x06, 0x00, 0x76])]);
    }

    #[test]
    fn equ_on_earlier_label() {
        let asm = assemble("START: NOP\nALIAS EQU START\nJMP ALIAS").unwrap();
        assert!(!asm.has_errors(), "{:?}", asm.diagnostics());
        assert_eq!(asm.symbols().get("ALIAS"), Some(0));
        assert_eq!(data(&asm), vec![(0, vec![0x00, 0xC3, 0x00, 0x00])]);
    }

    #[test]
    fn undefined_symbol_keeps_layout() {
        let asm = assemble("NOP\nJMP nowhere\nHLT").unwrap();
        assert_eq!(asm.diagnostics().len(), 1);
        let diag = &asm.diagnostics()[0];
        assert_eq!(diag.line, 2);
        assert_eq!(diag.kind, DiagnosticKind::UndefinedSymbol("nowhere".into()));
        // HLT stays at 4, so the image has a hole where the jump would be
        assert_eq!(data(&asm), vec![(0, vec![0x00]), (4, vec![0x76])]);
    }

    #[test]
    fn unknown_instructions() {
        let asm = assemble("FROB A\nMOV M,M\nMVI A\nPUSH SP\nRST 9").unwrap();
        let lines: Vec<usize> = asm.diagnostics().iter().map(|d| d.line).collect();
        assert_eq!(lines, vec![1, 2, 3, 4, 5]);
        assert!(asm
            .diagnostics()
            .iter()
            .all(|d| matches!(d.kind, DiagnosticKind::UnknownInstruction(_))));
        assert_eq!(data(&asm), vec![]);
    }

    #[test]
    fn duplicate_label_first_wins() {
        let asm = assemble("here: NOP\nhere: NOP\nJMP here").unwrap();
        assert_eq!(asm.diagnostics().len(), 1);
        assert_eq!(asm.diagnostics()[0].line, 2);
        assert_eq!(asm.symbols().get("here"), Some(0));
        assert_eq!(data(&asm), vec![(0, vec![0x00, 0x00, 0xC3, 0x00, 0x00])]);
    }

    #[test]
    fn duplicate_equ_does_not_rebind() {
        let asm = assemble("X EQU 1\nX EQU 2\nMVI A,X").unwrap();
        assert_eq!(asm.diagnostics().len(), 1);
        assert_eq!(asm.symbols().get("X"), Some(1));
    }

    #[test]
    fn equ_without_label() {
        let asm = assemble("  EQU 5").unwrap();
        assert_eq!(asm.diagnostics().len(), 1);
        assert_eq!(asm.diagnostics()[0].kind, DiagnosticKind::MissingLabel);
    }

    #[test]
    fn data_directives() {
        let src = "ORG 10H\nDB 1, 'A', 0FFH\nDW 1234H, label\nlabel: DS 2\nDEFB 7";
        let asm = assemble(src).unwrap();
        assert!(!asm.has_errors(), "{:?}", asm.diagnostics());
        assert_eq!(asm.symbols().get("label"), Some(0x17));
        assert_eq!(
            data(&asm),
            vec![(
                0x10,
                vec![0x01, 0x41, 0xFF, 0x34, 0x12, 0x17, 0x00, 0x00, 0x00, 0x07]
            )]
        );
    }

    #[test]
    fn org_starts_new_record() {
        let asm = assemble("NOP\nORG 8\nHLT").unwrap();
        assert_eq!(data(&asm), vec![(0, vec![0x00]), (8, vec![0x76])]);
    }

    #[test]
    fn invalid_literal() {
        let asm = assemble("MVI A,12G").unwrap();
        assert_eq!(
            asm.diagnostics()[0].kind,
            DiagnosticKind::InvalidLiteral("12G".into())
        );
    }

    #[test]
    fn parse_errors_are_diagnostics() {
        let asm = assemble("MOV A B\nNOP").unwrap();
        assert_eq!(asm.diagnostics().len(), 1);
        assert!(matches!(
            asm.diagnostics()[0].kind,
            DiagnosticKind::UnexpectedToken(_)
        ));
        assert_eq!(data(&asm), vec![(0, vec![0x00])]);
    }

    #[test]
    fn label_limit_is_fatal() {
        let src: String = (0..=MAX_LABELS).map(|i| format!("L{i}: NOP\n")).collect();
        let err = assemble(&src).unwrap_err();
        assert_eq!(err.to_string(), "too many labels");
    }

    #[test]
    fn assemblies_are_independent() {
        let first = assemble("only: NOP").unwrap();
        assert_eq!(first.symbols().len(), 1);
        let second = assemble("JMP only").unwrap();
        assert!(second.has_errors());
        assert!(second.symbols().is_empty());
    }

    #[test]
    fn case_insensitive_mnemonics_and_registers() {
        let asm = assemble("mov a,m\nLxi h,0\npush psw").unwrap();
        assert!(!asm.has_errors());
        assert_eq!(data(&asm), vec![(0, vec![0x7E, 0x21, 0x00, 0x00, 0xF5])]);
    }
}

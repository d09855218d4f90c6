use std::fmt::{self, Display};

use miette::{miette, LabeledSpan, Report, Severity};

use crate::symbol::{Span, MAX_LABELS};

/// What went wrong on a source line.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum DiagnosticKind {
    UnknownInstruction(String),
    UndefinedSymbol(String),
    InvalidLiteral(String),
    DuplicateLabel(String),
    /// `EQU` on a line without a label.
    MissingLabel,
    /// `EQU` whose value depends on a label defined further down.
    ForwardEqu(String),
    UnexpectedToken(String),
    /// Fatal: the label table is full.
    TooManyLabels,
}

impl DiagnosticKind {
    fn code(&self) -> &'static str {
        match self {
            DiagnosticKind::UnknownInstruction(_) => "asm::unknown_instruction",
            DiagnosticKind::UndefinedSymbol(_) => "asm::undefined_symbol",
            DiagnosticKind::InvalidLiteral(_) => "asm::bad_lit",
            DiagnosticKind::DuplicateLabel(_) => "asm::duplicate_label",
            DiagnosticKind::MissingLabel => "asm::equ_label",
            DiagnosticKind::ForwardEqu(_) => "asm::equ_forward",
            DiagnosticKind::UnexpectedToken(_) => "parse::unexpected_token",
            DiagnosticKind::TooManyLabels => "asm::label_limit",
        }
    }

    fn help(&self) -> String {
        match self {
            DiagnosticKind::UnknownInstruction(_) => {
                "check the mnemonic and the number and kind of its operands".into()
            }
            DiagnosticKind::UndefinedSymbol(_) => {
                "labels are defined with a trailing `:` or with `EQU`".into()
            }
            DiagnosticKind::InvalidLiteral(_) => {
                "literals look like 48H, 0x48, 1001000B, 72 or 'H".into()
            }
            DiagnosticKind::DuplicateLabel(_) => {
                "labels may only be defined once; the first definition is used".into()
            }
            DiagnosticKind::MissingLabel => "write the name in front: `NAME EQU value`".into(),
            DiagnosticKind::ForwardEqu(_) => {
                "move the `EQU` below the label it refers to".into()
            }
            DiagnosticKind::UnexpectedToken(_) => {
                "lines look like `label: MNEMONIC operand, operand ; comment`".into()
            }
            DiagnosticKind::TooManyLabels => {
                format!("a program may define at most {MAX_LABELS} labels")
            }
        }
    }

    fn label(&self) -> &'static str {
        match self {
            DiagnosticKind::UnknownInstruction(_) => "unknown instruction",
            DiagnosticKind::UndefinedSymbol(_) => "undefined symbol",
            DiagnosticKind::InvalidLiteral(_) => "incorrect literal",
            DiagnosticKind::DuplicateLabel(_) => "duplicate label",
            DiagnosticKind::MissingLabel => "unlabeled directive",
            DiagnosticKind::ForwardEqu(_) => "defined later in the file",
            DiagnosticKind::UnexpectedToken(_) => "unexpected token",
            DiagnosticKind::TooManyLabels => "one label too many",
        }
    }
}

impl Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::UnknownInstruction(text) => write!(f, "unknown instruction `{text}`"),
            DiagnosticKind::UndefinedSymbol(name) => write!(f, "undefined symbol `{name}`"),
            DiagnosticKind::InvalidLiteral(text) => write!(f, "invalid literal `{text}`"),
            DiagnosticKind::DuplicateLabel(name) => write!(f, "duplicate label `{name}`"),
            DiagnosticKind::MissingLabel => f.write_str("EQU without a label"),
            DiagnosticKind::ForwardEqu(name) => {
                write!(f, "`{name}` is set from a label that is not defined yet")
            }
            DiagnosticKind::UnexpectedToken(found) => write!(f, "unexpected {found}"),
            DiagnosticKind::TooManyLabels => f.write_str("too many labels"),
        }
    }
}

/// Problem found while assembling, tied to a line and a span of the source.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// 1-based line number
    pub line: usize,
    pub span: Span,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, line: usize, span: Span) -> Self {
        Diagnostic { kind, line, span }
    }

    /// Render against the source it was produced from.
    pub fn report(&self, src: &str) -> Report {
        miette!(
            severity = Severity::Error,
            code = self.kind.code(),
            help = self.kind.help(),
            labels = vec![LabeledSpan::at(self.span, self.kind.label())],
            "{}",
            self.kind
        )
        .with_source_code(src.to_string())
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.kind)
    }
}

// Image loading errors

pub fn hex_invalid(err: crate::hex::HexError, src: &str) -> Report {
    let span = src
        .lines()
        .scan(0, |offs, line| {
            let start = *offs;
            *offs += line.len() + 1;
            Some((start, line.len()))
        })
        .nth(err.line.saturating_sub(1))
        .unwrap_or((0, 0));
    miette!(
        severity = Severity::Error,
        code = "hex::record",
        help = "records look like `:LLAAAATT[DD...]CC` and end with `:00000001FF`",
        labels = vec![LabeledSpan::at(span.0..span.0 + span.1, "invalid record")],
        "Encountered an invalid Intel HEX record: {}",
        err.kind
    )
    .with_source_code(src.to_string())
}

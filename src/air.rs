use crate::symbol::Span;

/// Piece of source text together with where it came from.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Word {
    pub text: String,
    pub span: Span,
}

impl Word {
    pub fn new(text: impl Into<String>, span: Span) -> Self {
        Word {
            text: text.into(),
            span,
        }
    }
}

/// Single source line: `[label:] [mnemonic [operand[, operand...]]]`.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct AsmLine {
    /// 1-based line number
    pub line: usize,
    /// Covers the label through the last operand
    pub span: Span,
    pub label: Option<Word>,
    pub mnemonic: Option<Word>,
    pub operands: Vec<Word>,
}

impl AsmLine {
    /// Upper-cased mnemonic, if the line has one.
    pub fn mnemonic(&self) -> Option<String> {
        self.mnemonic
            .as_ref()
            .map(|word| word.text.to_ascii_uppercase())
    }
}

/// Assembly intermediate representation: every non-empty line, in source order.
///
/// Both assembler passes walk the same `Air`, so they always agree on what each line is.
#[derive(Clone, Default, Debug)]
pub struct Air {
    lines: Vec<AsmLine>,
}

impl Air {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_line(&mut self, line: AsmLine) {
        self.lines.push(line)
    }

    pub fn get(&self, idx: usize) -> &AsmLine {
        &self.lines[idx]
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AsmLine> {
        self.lines.iter()
    }
}

impl<'a> IntoIterator for &'a Air {
    type Item = &'a AsmLine;
    type IntoIter = std::slice::Iter<'a, AsmLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}

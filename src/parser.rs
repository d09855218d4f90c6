use crate::{
    air::{Air, AsmLine, Word},
    error::{Diagnostic, DiagnosticKind},
    lexer::{Lexer, Token, TokenKind},
};

/// Transforms the token stream into AIR, one line at a time.
pub struct AsmParser<'a> {
    /// Reference to the source file
    src: &'a str,
    toks: Lexer<'a>,
    /// Assembly intermediate representation
    air: Air,
    diagnostics: Vec<Diagnostic>,
    /// Tracker for current line
    line: usize,
}

impl<'a> AsmParser<'a> {
    pub fn new(src: &'a str) -> Self {
        AsmParser {
            src,
            toks: Lexer::new(src),
            air: Air::new(),
            diagnostics: Vec::new(),
            line: 1,
        }
    }

    fn text(&self, tok: &Token) -> &'a str {
        &self.src[tok.span.range()]
    }

    fn word(&self, tok: &Token) -> Word {
        Word::new(self.text(tok), tok.span)
    }

    /// Create AIR out of the token stream. Malformed lines keep their label and are reported.
    pub fn parse(mut self) -> (Air, Vec<Diagnostic>) {
        loop {
            let (toks, at_eof) = self.line_tokens();
            if !toks.is_empty() {
                self.parse_line(&toks);
            }
            if at_eof {
                break;
            }
            self.line += 1;
        }
        // Consume self to return AIR
        (self.air, self.diagnostics)
    }

    /// Significant tokens up to the end of the current line.
    fn line_tokens(&mut self) -> (Vec<Token>, bool) {
        let mut toks = Vec::new();
        loop {
            match self.toks.next() {
                None => return (toks, true),
                Some(tok) => match tok.kind {
                    TokenKind::Newline => return (toks, false),
                    TokenKind::Whitespace | TokenKind::Comment => continue,
                    _ => toks.push(tok),
                },
            }
        }
    }

    fn parse_line(&mut self, toks: &[Token]) {
        let mut rest = toks;
        let mut label = None;

        // `name:` with nothing between the name and the colon
        if let [name, colon, tail @ ..] = rest {
            if name.kind == TokenKind::Word
                && colon.kind == TokenKind::Colon
                && name.span.end() == colon.span.offs()
            {
                label = Some(self.word(name));
                rest = tail;
            }
        }
        // `NAME EQU value`
        if label.is_none() {
            if let [name, equ, ..] = rest {
                if name.kind == TokenKind::Word
                    && equ.kind == TokenKind::Word
                    && self.text(equ).eq_ignore_ascii_case("EQU")
                {
                    label = Some(self.word(name));
                    rest = &rest[1..];
                }
            }
        }

        let span = match (toks.first(), toks.last()) {
            (Some(first), Some(last)) => first.span.to(last.span),
            _ => return,
        };
        let mut line = AsmLine {
            line: self.line,
            span,
            label,
            mnemonic: None,
            operands: Vec::new(),
        };

        let Some((first, tail)) = rest.split_first() else {
            self.air.add_line(line);
            return;
        };
        if first.kind != TokenKind::Word {
            self.unexpected(first);
            self.air.add_line(line);
            return;
        }
        line.mnemonic = Some(self.word(first));

        match self.operands(tail) {
            Ok(operands) => line.operands = operands,
            Err(bad) => {
                self.unexpected(&bad);
                line.mnemonic = None;
            }
        }
        self.air.add_line(line);
    }

    /// Comma separated operands. Returns the first token out of place on failure.
    fn operands(&self, toks: &[Token]) -> Result<Vec<Word>, Token> {
        let mut operands = Vec::new();
        let mut iter = toks.iter();
        while let Some(tok) = iter.next() {
            match tok.kind {
                TokenKind::Word | TokenKind::Char => operands.push(self.word(tok)),
                _ => return Err(*tok),
            }
            match iter.next() {
                None => break,
                Some(sep) if sep.kind == TokenKind::Comma => {
                    if iter.as_slice().is_empty() {
                        // Trailing comma
                        return Err(*sep);
                    }
                }
                Some(other) => return Err(*other),
            }
        }
        Ok(operands)
    }

    fn unexpected(&mut self, tok: &Token) {
        let found = match tok.kind {
            TokenKind::Word | TokenKind::Char => format!("`{}`", self.text(tok)),
            kind => kind.to_string(),
        };
        self.diagnostics.push(Diagnostic::new(
            DiagnosticKind::UnexpectedToken(found),
            self.line,
            tok.span,
        ));
    }
}

/// Parse a whole source file into lines.
pub fn parse(src: &str) -> (Air, Vec<Diagnostic>) {
    AsmParser::new(src).parse()
}

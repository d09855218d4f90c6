use crate::lexer::cursor::Cursor;
use crate::symbol::{Span, SrcOffset};

pub mod cursor;
mod literal;

pub use literal::{is_numeric, parse_literal};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Token { kind, span }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TokenKind {
    /// Mnemonic, directive, label, register or numeric literal.
    Word,
    /// `'c` with an optional closing quote.
    Char,
    Colon,
    Comma,
    /// `;` to end of line, or a whole line starting with `*`.
    Comment,
    Whitespace,
    Newline,
    Unknown,
    Eof,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TokenKind::Word => "word",
            TokenKind::Char => "character literal",
            TokenKind::Colon => "`:`",
            TokenKind::Comma => "`,`",
            TokenKind::Comment => "comment",
            TokenKind::Whitespace => "whitespace",
            TokenKind::Newline => "end of line",
            TokenKind::Unknown => "unknown",
            TokenKind::Eof => "end of file",
        };
        f.write_str(name)
    }
}

/// Test if a character is considered to be whitespace. Newlines are tokens of their own.
pub(crate) fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r')
}

/// Anything that does not separate tokens belongs to a word.
pub(crate) fn is_word(c: char) -> bool {
    !is_whitespace(c) && !matches!(c, '\n' | ',' | ':' | ';' | '\'')
}

/// Token stream over a whole source file, with spans relative to its start.
pub struct Lexer<'a> {
    cursor: Cursor<'a>,
    /// Nothing but whitespace seen since the last newline
    line_start: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Lexer {
            cursor: Cursor::new(src),
            line_start: true,
        }
    }

    pub fn advance_token(&mut self) -> Token {
        let first_char = match self.cursor.bump() {
            Some(c) => c,
            None => {
                let span = Span::new(SrcOffset(self.cursor.token_start()), 0);
                return Token::new(TokenKind::Eof, span);
            }
        };
        let kind = match first_char {
            ';' => {
                self.cursor.take_while(|c| c != '\n');
                TokenKind::Comment
            }
            '*' if self.line_start => {
                self.cursor.take_while(|c| c != '\n');
                TokenKind::Comment
            }
            '\n' => TokenKind::Newline,
            c if is_whitespace(c) => {
                self.cursor.take_while(is_whitespace);
                TokenKind::Whitespace
            }
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            '\'' => {
                if self.cursor.is_eof() || self.cursor.first() == '\n' {
                    TokenKind::Unknown
                } else {
                    // Quoted char may be anything, separators included
                    self.cursor.bump();
                    if self.cursor.first() == '\'' {
                        self.cursor.bump();
                    }
                    TokenKind::Char
                }
            }
            _ => {
                self.cursor.take_while(is_word);
                TokenKind::Word
            }
        };
        match kind {
            TokenKind::Newline => self.line_start = true,
            TokenKind::Whitespace => (),
            _ => self.line_start = false,
        }
        let span = Span::new(
            SrcOffset(self.cursor.token_start()),
            self.cursor.pos_in_token(),
        );
        self.cursor.reset_pos();
        Token::new(kind, span)
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.advance_token();
        if token.kind != TokenKind::Eof {
            Some(token)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new(src).map(|tok| tok.kind).collect()
    }

    fn texts(src: &str) -> Vec<&str> {
        Lexer::new(src).map(|tok| &src[tok.span.range()]).collect()
    }

    #[test]
    fn instruction_line() {
        use TokenKind::*;
        assert_eq!(
            kinds("loop: MOV A,M ; copy\n"),
            vec![Word, Colon, Whitespace, Word, Whitespace, Word, Comma, Word, Whitespace, Comment, Newline]
        );
        assert_eq!(
            texts("loop: MOV A,M ; copy\n"),
            vec!["loop", ":", " ", "MOV", " ", "A", ",", "M", " ", "; copy", "\n"]
        );
    }

    #[test]
    fn star_comment_only_at_line_start() {
        use TokenKind::*;
        assert_eq!(kinds("* header"), vec![Comment]);
        assert_eq!(kinds("  * header"), vec![Whitespace, Comment]);
        assert_eq!(kinds("DB 2*3"), vec![Word, Whitespace, Word]);
    }

    #[test]
    fn char_literals() {
        assert_eq!(texts("MVI A,';'"), vec!["MVI", " ", "A", ",", "';'"]);
        assert_eq!(texts("CPI ' "), vec!["CPI", " ", "' "]);
        assert_eq!(texts("DB ',,0"), vec!["DB", " ", "',", ",", "0"]);
        assert_eq!(kinds("'"), vec![TokenKind::Unknown]);
    }

    #[test]
    fn spans_are_absolute() {
        let src = "NOP\n  HLT";
        let toks: Vec<Token> = Lexer::new(src).collect();
        assert_eq!(toks[3].span.range(), 6..9);
        assert_eq!(&src[toks[3].span.range()], "HLT");
    }

    #[test]
    fn multibyte_text() {
        let src = "DB 'é'\nNOP";
        let texts = texts(src);
        assert_eq!(texts.last(), Some(&"NOP"));
    }
}

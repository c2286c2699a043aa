//! Tokenizer for the Metadesk-style document syntax.
//!
//! Whitespace and comments are dropped; newlines are kept as tokens because
//! they end implicit sets (`title: "Hello"`). Problems the lexer can see on
//! its own (unterminated strings and block comments) are reported here; the
//! parser reports everything else.

use crate::diagnostic::{Diagnostic, SourceLoc};
use crate::tree::QuoteStyle;
use std::ops::Range;

/// Bracket pair around an explicit set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Brace,
    Paren,
    Bracket,
}

impl Delimiter {
    pub fn closer(self) -> char {
        match self {
            Delimiter::Brace => '}',
            Delimiter::Paren => ')',
            Delimiter::Bracket => ']',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    Numeric,
    StringLiteral { quote: QuoteStyle, triple: bool },
    Symbol,
    Open(Delimiter),
    Close(Delimiter),
    Colon,
    Comma,
    Semicolon,
    At,
    Newline,
    BadCharacter,
    Eof,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte range of the whole token.
    pub span: Range<usize>,
    /// Byte range of the token's text: the contents for string literals, the
    /// whole span otherwise.
    pub inner: Range<usize>,
}

impl Token {
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        &source[self.inner.clone()]
    }

    pub fn raw<'s>(&self, source: &'s str) -> &'s str {
        &source[self.span.clone()]
    }

    pub fn is_label(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Identifier
                | TokenKind::Numeric
                | TokenKind::StringLiteral { .. }
                | TokenKind::Symbol
        )
    }
}

const BOM: char = '\u{feff}';

const SYMBOL_CHARS: &str = "~!$%^&*-=+<.>/?|#\\";

fn delimiter_for(c: char) -> Option<(bool, Delimiter)> {
    match c {
        '{' => Some((true, Delimiter::Brace)),
        '(' => Some((true, Delimiter::Paren)),
        '[' => Some((true, Delimiter::Bracket)),
        '}' => Some((false, Delimiter::Brace)),
        ')' => Some((false, Delimiter::Paren)),
        ']' => Some((false, Delimiter::Bracket)),
        _ => None,
    }
}

fn quote_for(c: char) -> Option<QuoteStyle> {
    match c {
        '"' => Some(QuoteStyle::Double),
        '\'' => Some(QuoteStyle::Single),
        '`' => Some(QuoteStyle::Backtick),
        _ => None,
    }
}

struct Lexer<'s> {
    file: &'s str,
    src: &'s str,
    pos: usize,
    tokens: Vec<Token>,
    diagnostics: Vec<Diagnostic>,
}

/// Split `source` into tokens. The last token is always [`TokenKind::Eof`].
///
/// A leading byte order mark is skipped; offsets still count from the start
/// of `source`.
pub fn tokenize(file: &str, source: &str) -> (Vec<Token>, Vec<Diagnostic>) {
    let mut lexer = Lexer {
        file,
        src: source,
        pos: if source.starts_with(BOM) { BOM.len_utf8() } else { 0 },
        tokens: Vec::new(),
        diagnostics: Vec::new(),
    };
    lexer.run();
    (lexer.tokens, lexer.diagnostics)
}

impl<'s> Lexer<'s> {
    fn rest(&self) -> &'s str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn error(&mut self, offset: usize, message: impl Into<String>) {
        let loc = SourceLoc::from_offset(self.file, self.src, offset);
        self.diagnostics.push(Diagnostic::error(loc, message));
    }

    fn push(&mut self, kind: TokenKind, start: usize) {
        self.push_with_inner(kind, start, start..self.pos);
    }

    fn push_with_inner(&mut self, kind: TokenKind, start: usize, inner: Range<usize>) {
        self.tokens.push(Token {
            kind,
            span: start..self.pos,
            inner,
        });
    }

    fn eat_while(&mut self, pred: impl Fn(char) -> bool) {
        let len = self
            .rest()
            .char_indices()
            .find(|&(_, c)| !pred(c))
            .map_or(self.rest().len(), |(i, _)| i);
        self.pos += len;
    }

    fn run(&mut self) {
        while let Some(c) = self.peek() {
            let start = self.pos;
            match c {
                '\n' => {
                    self.pos += 1;
                    self.push(TokenKind::Newline, start);
                }
                c if c.is_whitespace() => self.pos += c.len_utf8(),
                '/' if self.rest().starts_with("//") => self.eat_while(|c| c != '\n'),
                '/' if self.rest().starts_with("/*") => self.block_comment(),
                c if c.is_alphabetic() || c == '_' => {
                    self.eat_while(|c| c.is_alphanumeric() || c == '_');
                    self.push(TokenKind::Identifier, start);
                }
                c if c.is_ascii_digit() => {
                    self.eat_while(|c| c.is_alphanumeric() || c == '_' || c == '.');
                    self.push(TokenKind::Numeric, start);
                }
                c if quote_for(c).is_some() => self.string_literal(c),
                c if delimiter_for(c).is_some() => {
                    self.pos += 1;
                    let kind = match delimiter_for(c) {
                        Some((true, d)) => TokenKind::Open(d),
                        Some((false, d)) => TokenKind::Close(d),
                        None => TokenKind::BadCharacter,
                    };
                    self.push(kind, start);
                }
                ':' | ',' | ';' | '@' => {
                    self.pos += 1;
                    let kind = match c {
                        ':' => TokenKind::Colon,
                        ',' => TokenKind::Comma,
                        ';' => TokenKind::Semicolon,
                        _ => TokenKind::At,
                    };
                    self.push(kind, start);
                }
                c if SYMBOL_CHARS.contains(c) => {
                    self.pos += 1;
                    self.push(TokenKind::Symbol, start);
                }
                c => {
                    self.pos += c.len_utf8();
                    self.push(TokenKind::BadCharacter, start);
                }
            }
        }
        let end = self.src.len();
        self.tokens.push(Token {
            kind: TokenKind::Eof,
            span: end..end,
            inner: end..end,
        });
    }

    /// `/* ... */`, nesting allowed.
    fn block_comment(&mut self) {
        let start = self.pos;
        self.pos += 2;
        let mut depth = 1usize;
        while depth > 0 {
            let rest = self.rest();
            if rest.is_empty() {
                self.error(start, "unterminated block comment");
                return;
            }
            if rest.starts_with("/*") {
                depth += 1;
                self.pos += 2;
            } else if rest.starts_with("*/") {
                depth -= 1;
                self.pos += 2;
            } else {
                self.pos += rest.chars().next().map_or(1, char::len_utf8);
            }
        }
    }

    fn string_literal(&mut self, q: char) {
        let start = self.pos;
        let Some(quote) = quote_for(q) else {
            return;
        };
        let triplet: String = std::iter::repeat_n(q, 3).collect();
        let kind_single = TokenKind::StringLiteral {
            quote,
            triple: false,
        };

        if self.rest().starts_with(&triplet) {
            let body_start = start + 3;
            match self.src[body_start..].find(&triplet) {
                Some(rel) => {
                    let body_end = body_start + rel;
                    self.pos = body_end + 3;
                    let kind = TokenKind::StringLiteral {
                        quote,
                        triple: true,
                    };
                    self.push_with_inner(kind, start, body_start..body_end);
                }
                None => {
                    self.error(start, "unterminated string literal");
                    self.pos = self.src.len();
                    let kind = TokenKind::StringLiteral {
                        quote,
                        triple: true,
                    };
                    self.push_with_inner(kind, start, body_start..self.pos);
                }
            }
            return;
        }

        self.pos += 1;
        let body_start = self.pos;
        loop {
            match self.peek() {
                Some(c) if c == q => {
                    let body_end = self.pos;
                    self.pos += 1;
                    self.push_with_inner(kind_single, start, body_start..body_end);
                    return;
                }
                Some('\\') => {
                    self.pos += 1;
                    match self.peek() {
                        Some('\n') | None => {}
                        Some(c) => self.pos += c.len_utf8(),
                    }
                }
                Some('\n') | None => {
                    self.error(start, "unterminated string literal");
                    let body_end = self.pos;
                    self.push_with_inner(kind_single, start, body_start..body_end);
                    return;
                }
                Some(c) => self.pos += c.len_utf8(),
            }
        }
    }
}

//! Character-cursor lexer for the expression surface.
//!
//! Tokens borrow from the parse arena, not the source: identifier and
//! string payloads are interned with `alloc_str` so the token stream has
//! the same lifetime as the node tree it feeds.

use bumpalo::Bump;

use crate::parser::error::{ParseError, ParseErrorKind};
use crate::parser::syntax::Span;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Token<'a> {
    pub kind: TokenKind<'a>,
    pub span: Span,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum TokenKind<'a> {
    Num(f64),
    Str(&'a str),
    Ident(&'a str),

    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Colon,
    Question,
    Dot,
    FatArrow,

    Plus,
    Minus,
    Star,
    StarStar,
    Slash,
    Percent,
    Bang,
    EqEq,
    NotEq,
    EqEqEq,
    NotEqEq,
    Lt,
    Le,
    Gt,
    Ge,
    AmpAmp,
    PipePipe,
    QuestionQuestion,

    Eof,
}

impl<'a> TokenKind<'a> {
    /// Short description used in "expected X, found Y" diagnostics.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Num(n) => format!("number {}", n),
            TokenKind::Str(_) => "string literal".to_string(),
            TokenKind::Ident(name) => format!("'{}'", name),
            TokenKind::Eof => "end of input".to_string(),
            other => format!("'{}'", other.punct_str()),
        }
    }

    fn punct_str(&self) -> &'static str {
        match self {
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::Comma => ",",
            TokenKind::Colon => ":",
            TokenKind::Question => "?",
            TokenKind::Dot => ".",
            TokenKind::FatArrow => "=>",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::StarStar => "**",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Bang => "!",
            TokenKind::EqEq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::EqEqEq => "===",
            TokenKind::NotEqEq => "!==",
            TokenKind::Lt => "<",
            TokenKind::Le => "<=",
            TokenKind::Gt => ">",
            TokenKind::Ge => ">=",
            TokenKind::AmpAmp => "&&",
            TokenKind::PipePipe => "||",
            TokenKind::QuestionQuestion => "??",
            _ => "",
        }
    }
}

pub struct Lexer<'a, 's> {
    arena: &'a Bump,
    src: &'s str,
    chars: Vec<(usize, char)>,
    pos: usize,
}

impl<'a, 's> Lexer<'a, 's> {
    pub fn new(arena: &'a Bump, src: &'s str) -> Self {
        Self {
            arena,
            src,
            chars: src.char_indices().collect(),
            pos: 0,
        }
    }

    /// Lex the whole input. The returned stream always ends with `Eof`.
    pub fn tokenize(mut self) -> Result<Vec<Token<'a>>, ParseError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn current(&self) -> Option<char> {
        self.chars.get(self.pos).map(|(_, c)| *c)
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).map(|(_, c)| *c)
    }

    fn byte_offset(&self) -> usize {
        self.chars
            .get(self.pos)
            .map(|(i, _)| *i)
            .unwrap_or(self.src.len())
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn next_token(&mut self) -> Result<Token<'a>, ParseError> {
        self.skip_whitespace();

        let start = self.byte_offset();
        let Some(ch) = self.current() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                span: Span::new(start, start),
            });
        };

        if ch.is_ascii_digit() || (ch == '.' && self.peek(1).is_some_and(|c| c.is_ascii_digit())) {
            return self.read_number(start);
        }
        if ch == '"' || ch == '\'' {
            return self.read_string(start, ch);
        }
        if ch.is_alphabetic() || ch == '_' || ch == '$' {
            return Ok(self.read_identifier(start));
        }

        self.advance();
        let kind = match ch {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            '.' => TokenKind::Dot,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '*' => {
                if self.current() == Some('*') {
                    self.advance();
                    TokenKind::StarStar
                } else {
                    TokenKind::Star
                }
            }
            '!' => {
                if self.current() == Some('=') {
                    self.advance();
                    if self.current() == Some('=') {
                        self.advance();
                        TokenKind::NotEqEq
                    } else {
                        TokenKind::NotEq
                    }
                } else {
                    TokenKind::Bang
                }
            }
            '=' => {
                if self.current() == Some('=') {
                    self.advance();
                    if self.current() == Some('=') {
                        self.advance();
                        TokenKind::EqEqEq
                    } else {
                        TokenKind::EqEq
                    }
                } else if self.current() == Some('>') {
                    self.advance();
                    TokenKind::FatArrow
                } else {
                    return Err(ParseError::new(ParseErrorKind::UnexpectedChar {
                        ch,
                        span: Span::new(start, self.byte_offset()),
                    }));
                }
            }
            '<' => {
                if self.current() == Some('=') {
                    self.advance();
                    TokenKind::Le
                } else {
                    TokenKind::Lt
                }
            }
            '>' => {
                if self.current() == Some('=') {
                    self.advance();
                    TokenKind::Ge
                } else {
                    TokenKind::Gt
                }
            }
            '&' => {
                if self.current() == Some('&') {
                    self.advance();
                    TokenKind::AmpAmp
                } else {
                    return Err(ParseError::new(ParseErrorKind::UnexpectedChar {
                        ch,
                        span: Span::new(start, self.byte_offset()),
                    }));
                }
            }
            '|' => {
                if self.current() == Some('|') {
                    self.advance();
                    TokenKind::PipePipe
                } else {
                    return Err(ParseError::new(ParseErrorKind::UnexpectedChar {
                        ch,
                        span: Span::new(start, self.byte_offset()),
                    }));
                }
            }
            '?' => {
                if self.current() == Some('?') {
                    self.advance();
                    TokenKind::QuestionQuestion
                } else {
                    TokenKind::Question
                }
            }
            other => {
                return Err(ParseError::new(ParseErrorKind::UnexpectedChar {
                    ch: other,
                    span: Span::new(start, self.byte_offset()),
                }));
            }
        };

        Ok(Token {
            kind,
            span: Span::new(start, self.byte_offset()),
        })
    }

    fn read_identifier(&mut self, start: usize) -> Token<'a> {
        while let Some(ch) = self.current() {
            if ch.is_alphanumeric() || ch == '_' || ch == '$' {
                self.advance();
            } else {
                break;
            }
        }
        let end = self.byte_offset();
        let name = self.arena.alloc_str(&self.src[start..end]);
        Token {
            kind: TokenKind::Ident(name),
            span: Span::new(start, end),
        }
    }

    fn read_number(&mut self, start: usize) -> Result<Token<'a>, ParseError> {
        // Hex literals take a separate path; everything else is collected
        // and handed to f64 parsing.
        if self.current() == Some('0') && matches!(self.peek(1), Some('x') | Some('X')) {
            self.advance();
            self.advance();
            let digits_start = self.byte_offset();
            while self.current().is_some_and(|c| c.is_ascii_hexdigit()) {
                self.advance();
            }
            let end = self.byte_offset();
            let digits = &self.src[digits_start..end];
            let value = u64::from_str_radix(digits, 16).map_err(|_| {
                ParseError::new(ParseErrorKind::InvalidNumber {
                    text: self.src[start..end].to_string(),
                    span: Span::new(start, end),
                })
            })?;
            return Ok(Token {
                kind: TokenKind::Num(value as f64),
                span: Span::new(start, end),
            });
        }

        let mut seen_dot = false;
        let mut seen_exp = false;
        while let Some(ch) = self.current() {
            match ch {
                '0'..='9' => self.advance(),
                '.' if !seen_dot && !seen_exp => {
                    seen_dot = true;
                    self.advance();
                }
                'e' | 'E' if !seen_exp => {
                    seen_exp = true;
                    self.advance();
                    if matches!(self.current(), Some('+') | Some('-')) {
                        self.advance();
                    }
                }
                _ => break,
            }
        }
        let end = self.byte_offset();
        let text = &self.src[start..end];
        let value = text.parse::<f64>().map_err(|_| {
            ParseError::new(ParseErrorKind::InvalidNumber {
                text: text.to_string(),
                span: Span::new(start, end),
            })
        })?;
        Ok(Token {
            kind: TokenKind::Num(value),
            span: Span::new(start, end),
        })
    }

    fn read_string(&mut self, start: usize, quote: char) -> Result<Token<'a>, ParseError> {
        self.advance(); // opening quote
        let mut text = String::new();
        while let Some(ch) = self.current() {
            match ch {
                c if c == quote => {
                    self.advance();
                    let end = self.byte_offset();
                    return Ok(Token {
                        kind: TokenKind::Str(self.arena.alloc_str(&text)),
                        span: Span::new(start, end),
                    });
                }
                '\\' => {
                    self.advance();
                    match self.current() {
                        Some('n') => text.push('\n'),
                        Some('t') => text.push('\t'),
                        Some('r') => text.push('\r'),
                        Some('b') => text.push('\u{8}'),
                        Some('f') => text.push('\u{c}'),
                        Some('0') => text.push('\0'),
                        Some('u') => {
                            self.advance();
                            let hex: String =
                                (0..4).filter_map(|i| self.peek(i)).collect();
                            if hex.len() == 4 {
                                if let Some(decoded) = u32::from_str_radix(&hex, 16)
                                    .ok()
                                    .and_then(char::from_u32)
                                {
                                    text.push(decoded);
                                    for _ in 0..3 {
                                        self.advance();
                                    }
                                } else {
                                    text.push('u');
                                    continue;
                                }
                            } else {
                                text.push('u');
                                continue;
                            }
                        }
                        // Unknown escapes keep the escaped character.
                        Some(other) => text.push(other),
                        None => {
                            return Err(ParseError::new(ParseErrorKind::UnclosedDelimiter {
                                delimiter: quote,
                                span: Span::new(start, self.byte_offset()),
                            }));
                        }
                    }
                    self.advance();
                }
                _ => {
                    text.push(ch);
                    self.advance();
                }
            }
        }
        Err(ParseError::new(ParseErrorKind::UnclosedDelimiter {
            delimiter: quote,
            span: Span::new(start, self.byte_offset()),
        }))
    }
}

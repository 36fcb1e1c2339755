//! Recursive-descent / Pratt parser producing arena-allocated node trees.
//!
//! The grammar is the restricted C-family expression subset of the closed
//! node model: no statements, no assignment, no sequencing. A parse
//! succeeds only when a single expression consumes the entire input.

use bumpalo::Bump;

use crate::parser::ast::{Lit, MemberProp, Node, NodeKind, Property, PropertyKey};
use crate::parser::error::{ParseError, ParseErrorKind};
use crate::parser::lexer::{Lexer, Token, TokenKind};
use crate::parser::syntax::{BinaryOp, LogicalOp, Span, UnaryOp};

/// Parser configuration.
#[derive(Debug, Clone)]
pub struct ParserOptions {
    /// Maximum nesting depth before the parser refuses the input.
    pub max_depth: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self { max_depth: 64 }
    }
}

/// Parse `source` into a node tree allocated in `arena`.
pub fn parse<'a>(arena: &'a Bump, source: &str) -> Result<&'a Node<'a>, ParseError> {
    parse_with_options(arena, source, &ParserOptions::default())
}

pub fn parse_with_options<'a>(
    arena: &'a Bump,
    source: &str,
    options: &ParserOptions,
) -> Result<&'a Node<'a>, ParseError> {
    let tokens = Lexer::new(arena, source).tokenize()?;
    let mut parser = Parser {
        arena,
        tokens,
        pos: 0,
        depth: 0,
        max_depth: options.max_depth,
    };
    let root = parser.parse_expr()?;
    parser.expect_eof()?;
    Ok(root)
}

struct Parser<'a> {
    arena: &'a Bump,
    tokens: Vec<Token<'a>>,
    pos: usize,
    depth: usize,
    max_depth: usize,
}

impl<'a> Parser<'a> {
    fn current(&self) -> Token<'a> {
        self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek(&self, offset: usize) -> Token<'a> {
        self.tokens[(self.pos + offset).min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token<'a> {
        let token = self.current();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, kind: TokenKind<'a>, expected: &str) -> Result<Token<'a>, ParseError> {
        let token = self.current();
        if token.kind == kind {
            Ok(self.advance())
        } else {
            Err(ParseError::new(ParseErrorKind::UnexpectedToken {
                expected: expected.to_string(),
                found: token.kind.describe(),
                span: token.span,
            }))
        }
    }

    fn expect_eof(&self) -> Result<(), ParseError> {
        let token = self.current();
        if token.kind == TokenKind::Eof {
            Ok(())
        } else {
            Err(ParseError::new(ParseErrorKind::TrailingInput {
                span: token.span,
            }))
        }
    }

    fn alloc(&self, kind: NodeKind<'a>, span: Span) -> &'a Node<'a> {
        self.arena.alloc(Node { kind, span })
    }

    fn enter(&mut self, span: Span) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(ParseError::new(ParseErrorKind::MaxDepthExceeded {
                depth: self.depth,
                max_depth: self.max_depth,
                span,
            }));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    /// Entry point: arrow functions, then the conditional chain.
    fn parse_expr(&mut self) -> Result<&'a Node<'a>, ParseError> {
        self.enter(self.current().span)?;
        let result = if let Some(arrow) = self.try_parse_arrow()? {
            Ok(arrow)
        } else {
            self.parse_conditional()
        };
        self.leave();
        result
    }

    /// Arrow functions need lookahead: `x =>` or `(a, b) =>`. Anything
    /// else falls through to ordinary expression parsing untouched.
    fn try_parse_arrow(&mut self) -> Result<Option<&'a Node<'a>>, ParseError> {
        let start = self.current().span;

        let params: Vec<&'a str> = match self.current().kind {
            TokenKind::Ident(name) if self.peek(1).kind == TokenKind::FatArrow => {
                self.advance();
                vec![name]
            }
            TokenKind::LParen => {
                let Some(params) = self.scan_arrow_params() else {
                    return Ok(None);
                };
                // scan succeeded: consume `( params )`
                self.advance();
                for (i, _) in params.iter().enumerate() {
                    if i > 0 {
                        self.advance(); // comma
                    }
                    self.advance(); // ident
                }
                self.advance(); // `)`
                params
            }
            _ => return Ok(None),
        };

        self.expect(TokenKind::FatArrow, "'=>'")?;
        let body = self.parse_expr()?;
        let span = Span::new(start.start, body.span.end);
        Ok(Some(self.alloc(
            NodeKind::Arrow {
                params: self.arena.alloc_slice_copy(&params),
                body,
            },
            span,
        )))
    }

    /// Look ahead from a `(` for `ident, ident, ...) =>` without consuming
    /// anything. Returns the parameter names when the shape matches.
    fn scan_arrow_params(&self) -> Option<Vec<&'a str>> {
        let mut offset = 1;
        let mut params = Vec::new();

        if self.peek(offset).kind == TokenKind::RParen {
            // `() =>`
            return match self.peek(offset + 1).kind {
                TokenKind::FatArrow => Some(params),
                _ => None,
            };
        }

        loop {
            let TokenKind::Ident(name) = self.peek(offset).kind else {
                return None;
            };
            params.push(name);
            offset += 1;
            match self.peek(offset).kind {
                TokenKind::Comma => offset += 1,
                TokenKind::RParen => {
                    return match self.peek(offset + 1).kind {
                        TokenKind::FatArrow => Some(params),
                        _ => None,
                    };
                }
                _ => return None,
            }
        }
    }

    fn parse_conditional(&mut self) -> Result<&'a Node<'a>, ParseError> {
        let test = self.parse_binary(0)?;
        if self.current().kind != TokenKind::Question {
            return Ok(test);
        }
        self.advance();
        let consequent = self.parse_expr()?;
        self.expect(TokenKind::Colon, "':'")?;
        let alternate = self.parse_expr()?;
        let span = Span::new(test.span.start, alternate.span.end);
        Ok(self.alloc(
            NodeKind::Conditional {
                test,
                consequent,
                alternate,
            },
            span,
        ))
    }

    fn parse_binary(&mut self, min_bp: u8) -> Result<&'a Node<'a>, ParseError> {
        self.enter(self.current().span)?;
        let mut lhs = self.parse_unary()?;

        while let Some((op, lbp, rbp)) = binary_binding(self.current().kind) {
            if lbp < min_bp {
                break;
            }
            self.advance();
            let rhs = self.parse_binary(rbp)?;
            let span = Span::new(lhs.span.start, rhs.span.end);
            lhs = match op {
                ParsedOp::Binary(op) => self.alloc(
                    NodeKind::Binary {
                        op,
                        left: lhs,
                        right: rhs,
                    },
                    span,
                ),
                ParsedOp::Logical(op) => self.alloc(
                    NodeKind::Logical {
                        op,
                        left: lhs,
                        right: rhs,
                    },
                    span,
                ),
            };
        }

        self.leave();
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<&'a Node<'a>, ParseError> {
        let token = self.current();
        let op = match token.kind {
            TokenKind::Plus => Some(UnaryOp::Plus),
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Ident("typeof") => Some(UnaryOp::TypeOf),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            self.enter(token.span)?;
            let argument = self.parse_unary()?;
            self.leave();
            let span = Span::new(token.span.start, argument.span.end);
            return Ok(self.alloc(NodeKind::Unary { op, argument }, span));
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<&'a Node<'a>, ParseError> {
        let mut expr = self.parse_primary()?;

        loop {
            match self.current().kind {
                TokenKind::Dot => {
                    self.advance();
                    let token = self.current();
                    let TokenKind::Ident(name) = token.kind else {
                        return Err(ParseError::new(ParseErrorKind::UnexpectedToken {
                            expected: "property name".to_string(),
                            found: token.kind.describe(),
                            span: token.span,
                        }));
                    };
                    self.advance();
                    let span = Span::new(expr.span.start, token.span.end);
                    expr = self.alloc(
                        NodeKind::Member {
                            object: expr,
                            property: MemberProp::Name(name),
                        },
                        span,
                    );
                }
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.parse_expr()?;
                    let close = self.expect(TokenKind::RBracket, "']'")?;
                    let span = Span::new(expr.span.start, close.span.end);
                    expr = self.alloc(
                        NodeKind::Member {
                            object: expr,
                            property: MemberProp::Computed(index),
                        },
                        span,
                    );
                }
                TokenKind::LParen => {
                    self.advance();
                    let mut args = Vec::new();
                    if self.current().kind != TokenKind::RParen {
                        loop {
                            args.push(*self.parse_expr()?);
                            if self.current().kind == TokenKind::Comma {
                                self.advance();
                                continue;
                            }
                            break;
                        }
                    }
                    let close = self.expect(TokenKind::RParen, "')'")?;
                    let span = Span::new(expr.span.start, close.span.end);
                    expr = self.alloc(
                        NodeKind::Call {
                            callee: expr,
                            args: self.arena.alloc_slice_copy(&args),
                        },
                        span,
                    );
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<&'a Node<'a>, ParseError> {
        let token = self.current();
        match token.kind {
            TokenKind::Num(value) => {
                self.advance();
                Ok(self.alloc(NodeKind::Literal(Lit::Num(value)), token.span))
            }
            TokenKind::Str(value) => {
                self.advance();
                Ok(self.alloc(NodeKind::Literal(Lit::Str(value)), token.span))
            }
            TokenKind::Ident("true") => {
                self.advance();
                Ok(self.alloc(NodeKind::Literal(Lit::Bool(true)), token.span))
            }
            TokenKind::Ident("false") => {
                self.advance();
                Ok(self.alloc(NodeKind::Literal(Lit::Bool(false)), token.span))
            }
            TokenKind::Ident("null") => {
                self.advance();
                Ok(self.alloc(NodeKind::Literal(Lit::Null), token.span))
            }
            TokenKind::Ident(name) => {
                self.advance();
                Ok(self.alloc(NodeKind::Ident(name), token.span))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(inner)
            }
            TokenKind::LBracket => self.parse_array(token.span),
            TokenKind::LBrace => self.parse_object(token.span),
            other => Err(ParseError::new(ParseErrorKind::UnexpectedToken {
                expected: "expression".to_string(),
                found: other.describe(),
                span: token.span,
            })),
        }
    }

    fn parse_array(&mut self, start: Span) -> Result<&'a Node<'a>, ParseError> {
        self.advance(); // `[`
        let mut elements: Vec<Option<Node<'a>>> = Vec::new();
        loop {
            match self.current().kind {
                TokenKind::RBracket => break,
                TokenKind::Comma => {
                    // elision
                    self.advance();
                    elements.push(None);
                }
                _ => {
                    elements.push(Some(*self.parse_expr()?));
                    match self.current().kind {
                        TokenKind::Comma => {
                            self.advance();
                            if self.current().kind == TokenKind::RBracket {
                                break; // trailing comma
                            }
                        }
                        TokenKind::RBracket => break,
                        other => {
                            return Err(ParseError::new(ParseErrorKind::UnexpectedToken {
                                expected: "',' or ']'".to_string(),
                                found: other.describe(),
                                span: self.current().span,
                            }));
                        }
                    }
                }
            }
        }
        let close = self.expect(TokenKind::RBracket, "']'")?;
        let span = Span::new(start.start, close.span.end);
        Ok(self.alloc(
            NodeKind::Array(self.arena.alloc_slice_copy(&elements)),
            span,
        ))
    }

    fn parse_object(&mut self, start: Span) -> Result<&'a Node<'a>, ParseError> {
        self.advance(); // `{`
        let mut properties: Vec<Property<'a>> = Vec::new();
        if self.current().kind != TokenKind::RBrace {
            loop {
                let key_token = self.current();
                let key = match key_token.kind {
                    TokenKind::Ident(name) => {
                        self.advance();
                        PropertyKey::Ident(name)
                    }
                    TokenKind::Str(value) => {
                        self.advance();
                        PropertyKey::Str(value)
                    }
                    TokenKind::Num(value) => {
                        self.advance();
                        PropertyKey::Num(value)
                    }
                    TokenKind::LBracket => {
                        self.advance();
                        let expr = self.parse_expr()?;
                        self.expect(TokenKind::RBracket, "']'")?;
                        PropertyKey::Computed(expr)
                    }
                    other => {
                        return Err(ParseError::new(ParseErrorKind::UnexpectedToken {
                            expected: "property key".to_string(),
                            found: other.describe(),
                            span: key_token.span,
                        }));
                    }
                };

                let value = if self.current().kind == TokenKind::Colon {
                    self.advance();
                    *self.parse_expr()?
                } else if let PropertyKey::Ident(name) = key {
                    // shorthand `{ a }`
                    Node {
                        kind: NodeKind::Ident(name),
                        span: key_token.span,
                    }
                } else {
                    return Err(ParseError::new(ParseErrorKind::UnexpectedToken {
                        expected: "':'".to_string(),
                        found: self.current().kind.describe(),
                        span: self.current().span,
                    }));
                };

                properties.push(Property { key, value });

                match self.current().kind {
                    TokenKind::Comma => {
                        self.advance();
                        if self.current().kind == TokenKind::RBrace {
                            break; // trailing comma
                        }
                    }
                    TokenKind::RBrace => break,
                    other => {
                        return Err(ParseError::new(ParseErrorKind::UnexpectedToken {
                            expected: "',' or '}'".to_string(),
                            found: other.describe(),
                            span: self.current().span,
                        }));
                    }
                }
            }
        }
        let close = self.expect(TokenKind::RBrace, "'}'")?;
        let span = Span::new(start.start, close.span.end);
        Ok(self.alloc(
            NodeKind::Object(self.arena.alloc_slice_copy(&properties)),
            span,
        ))
    }
}

enum ParsedOp {
    Binary(BinaryOp),
    Logical(LogicalOp),
}

/// Binding powers for the Pratt loop. `**` is right-associative (its right
/// binding power is below its left); everything else associates left.
fn binary_binding(kind: TokenKind<'_>) -> Option<(ParsedOp, u8, u8)> {
    let entry = match kind {
        TokenKind::QuestionQuestion => (ParsedOp::Logical(LogicalOp::Nullish), 1, 2),
        TokenKind::PipePipe => (ParsedOp::Logical(LogicalOp::Or), 1, 2),
        TokenKind::AmpAmp => (ParsedOp::Logical(LogicalOp::And), 3, 4),
        TokenKind::EqEq => (ParsedOp::Binary(BinaryOp::Eq), 5, 6),
        TokenKind::NotEq => (ParsedOp::Binary(BinaryOp::Ne), 5, 6),
        TokenKind::EqEqEq => (ParsedOp::Binary(BinaryOp::StrictEq), 5, 6),
        TokenKind::NotEqEq => (ParsedOp::Binary(BinaryOp::StrictNe), 5, 6),
        TokenKind::Lt => (ParsedOp::Binary(BinaryOp::Lt), 7, 8),
        TokenKind::Le => (ParsedOp::Binary(BinaryOp::Le), 7, 8),
        TokenKind::Gt => (ParsedOp::Binary(BinaryOp::Gt), 7, 8),
        TokenKind::Ge => (ParsedOp::Binary(BinaryOp::Ge), 7, 8),
        TokenKind::Ident("in") => (ParsedOp::Binary(BinaryOp::In), 7, 8),
        TokenKind::Plus => (ParsedOp::Binary(BinaryOp::Add), 9, 10),
        TokenKind::Minus => (ParsedOp::Binary(BinaryOp::Sub), 9, 10),
        TokenKind::Star => (ParsedOp::Binary(BinaryOp::Mul), 11, 12),
        TokenKind::Slash => (ParsedOp::Binary(BinaryOp::Div), 11, 12),
        TokenKind::Percent => (ParsedOp::Binary(BinaryOp::Rem), 11, 12),
        TokenKind::StarStar => (ParsedOp::Binary(BinaryOp::Pow), 14, 13),
        _ => return None,
    };
    Some(entry)
}

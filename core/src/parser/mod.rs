//! Parser front-end: text → closed node tree, plus template hole
//! extraction and complexity metadata.

pub mod ast;
pub mod error;
mod lexer;
mod parsed_expr;
pub mod parser;
pub mod template;
mod syntax;

pub use ast::{Lit, MemberProp, Node, NodeKind, Property, PropertyKey};
pub use error::{ParseError, ParseErrorKind};
pub use parsed_expr::ParsedExpression;
pub use parser::{parse, parse_with_options, ParserOptions};
pub use syntax::{BinaryOp, LogicalOp, Position, Span, UnaryOp};
pub use template::{Hole, TemplateLayout};

use bumpalo::Bump;

/// Parse and analyze in one step: the form the orchestrator consumes.
pub fn parse_expression<'a>(
    arena: &'a Bump,
    source: &str,
    options: &ParserOptions,
) -> Result<&'a ParsedExpression<'a>, ParseError> {
    let root = parse_with_options(arena, source, options)?;
    Ok(ParsedExpression::new(arena, source, root))
}

#[cfg(test)]
mod parse_test;

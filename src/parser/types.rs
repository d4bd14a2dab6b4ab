//! Type parsing implementation.
//!
//! This module handles parsing of type annotations. It supports:
//!
//! - Primitive types (`number`, `real`, `logic`, `string`, `material`)
//! - List types, `[T]`
//! - Map types, `|K -> V|`
//! - Literal types, `<a, b, c>`
//!
//! Similar to expression parsing, each form is dispatched through a NUD
//! handler keyed by its first token.

use std::collections::{BTreeSet, HashMap};

use crate::{
    ast::types::{Primitive, Type},
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
};

use super::parser::Parser;

/// Type alias for type null denotation handler functions.
pub type TypeNUDHandler = fn(&mut Parser) -> Result<Type, Error>;

/// Type alias for type NUD lookup table.
pub type TypeNUDLookup = HashMap<TokenKind, TypeNUDHandler>;

/// Initializes the type parsing lookup table.
pub fn create_token_type_lookups(parser: &mut Parser) {
    parser.type_nud(TokenKind::Identifier, parse_symbol_type);
    parser.type_nud(TokenKind::OpenBracket, parse_list_type);
    parser.type_nud(TokenKind::Pipe, parse_map_type);
    parser.type_nud(TokenKind::Less, parse_literal_type);
}

pub fn parse_symbol_type(parser: &mut Parser) -> Result<Type, Error> {
    let token = parser.expect(TokenKind::Identifier)?;

    match Primitive::from_name(&token.value) {
        Some(primitive) => Ok(Type::Simple(primitive)),
        None => Err(Error::new(
            ErrorImpl::UnknownType { type_: token.value },
            token.span.start,
        )),
    }
}

pub fn parse_list_type(parser: &mut Parser) -> Result<Type, Error> {
    parser.expect(TokenKind::OpenBracket)?;
    let element = parse_type(parser)?;
    parser.expect_detailed(TokenKind::CloseBracket, "expected `]` after list element type")?;

    Ok(Type::list(element))
}

pub fn parse_map_type(parser: &mut Parser) -> Result<Type, Error> {
    parser.expect(TokenKind::Pipe)?;
    let key = parse_type(parser)?;
    parser.expect_detailed(TokenKind::Arrow, "expected `->` between map key and value types")?;
    let value = parse_type(parser)?;
    parser.expect_detailed(TokenKind::Pipe, "expected `|` after map value type")?;

    Ok(Type::map(key, value))
}

pub fn parse_literal_type(parser: &mut Parser) -> Result<Type, Error> {
    parser.expect(TokenKind::Less)?;

    let mut members = BTreeSet::new();
    loop {
        let member = parser.expect_detailed(TokenKind::Identifier, "expected a literal member")?;
        members.insert(member.value);

        if parser.current_token_kind() == TokenKind::Comma {
            parser.advance();
        } else {
            break;
        }
    }

    parser.expect_detailed(TokenKind::Greater, "expected `>` after literal members")?;

    Ok(Type::Literal(members))
}

pub fn parse_type(parser: &mut Parser) -> Result<Type, Error> {
    let token_kind = parser.current_token_kind();

    match parser.get_type_nud_lookup().get(&token_kind).copied() {
        Some(nud) => nud(parser),
        None => Err(Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: parser.current_token().value.clone(),
                message: String::from("expected a type"),
            },
            parser.get_position(),
        )),
    }
}

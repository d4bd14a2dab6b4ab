use std::rc::Rc;

use num_bigint::BigInt;

use crate::{
    ast::{
        ast::{Expr, ExprWrapper},
        expressions::{
            BinaryExpr, CallExpr, EnumExpr, IndexExpr, InterpolationExpr, InterpolationPart,
            ListExpr, LogicExpr, MapExpr, MaterialExpr, NumberExpr, PrefixExpr, RealExpr,
            StringExpr, SymbolExpr,
        },
    },
    errors::errors::{Error, ErrorImpl},
    lexer::{
        lexer::{tokenize_fragment, unescape},
        tokens::TokenKind,
    },
    Position, Span,
};

use super::{lookups::BindingPower, parser::Parser};

pub fn parse_expr(parser: &mut Parser, bp: BindingPower) -> Result<ExprWrapper, Error> {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let nud = match parser.get_nud_lookup().get(&token_kind) {
        Some(nud) => *nud,
        None => {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken {
                    token: parser.current_token().value.clone(),
                },
                parser.get_position(),
            ))
        }
    };

    let mut left = nud(parser)?;

    // While LED and current BP is less than BP of current token, continue parsing lhs
    loop {
        let token_kind = parser.current_token_kind();
        let token_bp = *parser
            .get_bp_lookup()
            .get(&token_kind)
            .unwrap_or(&BindingPower::Default);

        if token_bp <= bp {
            break;
        }

        let led = match parser.get_led_lookup().get(&token_kind) {
            Some(led) => *led,
            None => {
                return Err(Error::new(
                    ErrorImpl::UnexpectedToken {
                        token: parser.current_token().value.clone(),
                    },
                    parser.get_position(),
                ))
            }
        };

        left = led(parser, left, token_bp)?;
    }

    Ok(left)
}

fn parse_number_literal(parser: &Parser, literal: &str) -> Result<BigInt, Error> {
    literal.replace('_', "").parse().map_err(|_| {
        Error::new(
            ErrorImpl::NumberParseError {
                token: literal.to_string(),
            },
            parser.get_position(),
        )
    })
}

pub fn parse_primary_expr(parser: &mut Parser) -> Result<ExprWrapper, Error> {
    let token = parser.current_token().clone();
    let id = parser.advance_id();

    let expr = match token.kind {
        TokenKind::Number => Expr::Number(NumberExpr {
            value: parse_number_literal(parser, &token.value)?,
            id,
            span: token.span,
        }),
        TokenKind::Real => {
            let value = token.value.replace('_', "").parse().map_err(|_| {
                Error::new(
                    ErrorImpl::NumberParseError {
                        token: token.value.clone(),
                    },
                    parser.get_position(),
                )
            })?;

            Expr::Real(RealExpr {
                value,
                id,
                span: token.span,
            })
        }
        TokenKind::String => Expr::String(StringExpr {
            value: token.value,
            id,
            span: token.span,
        }),
        TokenKind::True | TokenKind::False => Expr::Logic(LogicExpr {
            value: token.kind == TokenKind::True,
            id,
            span: token.span,
        }),
        TokenKind::Material => {
            let (namespace, name) = match token.value.split_once(':') {
                Some((namespace, name)) => (Some(namespace.to_string()), name.to_string()),
                None => (None, token.value.clone()),
            };

            Expr::Material(MaterialExpr {
                namespace,
                name,
                id,
                span: token.span,
            })
        }
        TokenKind::Identifier => Expr::Symbol(SymbolExpr {
            value: token.value,
            up_levels: 0,
            id,
            span: token.span,
        }),
        _ => {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken { token: token.value },
                token.span.start,
            ))
        }
    };

    parser.advance();
    Ok(Rc::new(expr))
}

/// Parses the `^` prefixes of a symbol and the symbol itself.
pub fn parse_scoped_symbol(parser: &mut Parser) -> Result<SymbolExpr, Error> {
    let start = parser.get_position();

    let mut up_levels = 0;
    while parser.current_token_kind() == TokenKind::Caret {
        parser.advance();
        up_levels += 1;
    }

    let name = parser.expect_detailed(TokenKind::Identifier, "expected a variable name")?;

    Ok(SymbolExpr {
        value: name.value,
        up_levels,
        id: parser.advance_id(),
        span: parser.span_from(start),
    })
}

pub fn parse_scoped_symbol_expr(parser: &mut Parser) -> Result<ExprWrapper, Error> {
    Ok(Rc::new(Expr::Symbol(parse_scoped_symbol(parser)?)))
}

pub fn parse_binary_expr(
    parser: &mut Parser,
    left: ExprWrapper,
    bp: BindingPower,
) -> Result<ExprWrapper, Error> {
    let operator_token = parser.advance().clone();

    // `^` is right associative
    let right_bp = if operator_token.kind == TokenKind::Caret {
        BindingPower::Multiplicative
    } else {
        bp
    };
    let right = parse_expr(parser, right_bp)?;

    Ok(Rc::new(Expr::Binary(BinaryExpr {
        span: Span::new(left.get_span().start.clone(), right.get_span().end.clone()),
        left,
        operator: operator_token,
        right,
        id: parser.advance_id(),
    })))
}

pub fn parse_prefix_expr(parser: &mut Parser) -> Result<ExprWrapper, Error> {
    let operator_token = parser.advance().clone();
    let rhs = parse_expr(parser, BindingPower::Unary)?;

    Ok(Rc::new(Expr::Prefix(PrefixExpr {
        span: Span::new(operator_token.span.start.clone(), rhs.get_span().end.clone()),
        operator: operator_token,
        right_expr: rhs,
        id: parser.advance_id(),
    })))
}

pub fn parse_grouping_expr(parser: &mut Parser) -> Result<ExprWrapper, Error> {
    parser.advance();
    let expr = parse_expr(parser, BindingPower::Default)?;
    parser.expect_detailed(TokenKind::CloseParen, "expected `)` to close the group")?;

    Ok(expr)
}

/// Parses comma separated expressions up to (and including) `close`.
fn parse_expr_list(parser: &mut Parser, close: TokenKind) -> Result<Vec<ExprWrapper>, Error> {
    let mut items = vec![];

    while parser.current_token_kind() != close {
        items.push(parse_expr(parser, BindingPower::Default)?);

        if parser.current_token_kind() != close {
            parser.expect_detailed(TokenKind::Comma, "expected `,` between items")?;
        }
    }

    parser.expect(close)?;
    Ok(items)
}

pub fn parse_call_expr(
    parser: &mut Parser,
    left: ExprWrapper,
    _bp: BindingPower,
) -> Result<ExprWrapper, Error> {
    let callee = match &*left {
        Expr::Symbol(symbol) if symbol.up_levels == 0 => symbol.value.clone(),
        _ => return Err(parser.unexpected("only named functions can be called")),
    };

    parser.advance();
    let arguments = parse_expr_list(parser, TokenKind::CloseParen)?;

    Ok(Rc::new(Expr::Call(CallExpr {
        callee,
        arguments,
        id: parser.advance_id(),
        span: parser.span_from(left.get_span().start.clone()),
    })))
}

pub fn parse_index_expr(
    parser: &mut Parser,
    left: ExprWrapper,
    _bp: BindingPower,
) -> Result<ExprWrapper, Error> {
    parser.advance();
    let index = parse_expr(parser, BindingPower::Default)?;
    parser.expect_detailed(TokenKind::CloseBracket, "expected `]` after index")?;

    Ok(Rc::new(Expr::Index(IndexExpr {
        span: parser.span_from(left.get_span().start.clone()),
        collection: left,
        index,
        id: parser.advance_id(),
    })))
}

pub fn parse_list_expr(parser: &mut Parser) -> Result<ExprWrapper, Error> {
    let start = parser.advance().span.start.clone();
    let elements = parse_expr_list(parser, TokenKind::CloseBracket)?;

    Ok(Rc::new(Expr::List(ListExpr {
        elements,
        id: parser.advance_id(),
        span: parser.span_from(start),
    })))
}

pub fn parse_map_expr(parser: &mut Parser) -> Result<ExprWrapper, Error> {
    // {"a": 1, "b": 2}
    let start = parser.advance().span.start.clone();

    let mut entries = vec![];

    while parser.current_token_kind() != TokenKind::CloseCurly {
        let key = parse_expr(parser, BindingPower::Default)?;
        parser.expect_detailed(TokenKind::Colon, "expected `:` between map key and value")?;
        let value = parse_expr(parser, BindingPower::Default)?;

        entries.push((key, value));

        if parser.current_token_kind() != TokenKind::CloseCurly {
            parser.expect_detailed(TokenKind::Comma, "expected `,` between map entries")?;
        }
    }

    parser.expect(TokenKind::CloseCurly)?;

    Ok(Rc::new(Expr::Map(MapExpr {
        entries,
        id: parser.advance_id(),
        span: parser.span_from(start),
    })))
}

pub fn parse_enum_expr(parser: &mut Parser) -> Result<ExprWrapper, Error> {
    let start = parser.advance().span.start.clone();
    let member = parser.expect_detailed(TokenKind::Identifier, "expected an enum member")?;
    parser.expect_detailed(TokenKind::Greater, "expected `>` after enum member")?;

    Ok(Rc::new(Expr::Enum(EnumExpr {
        member: member.value,
        id: parser.advance_id(),
        span: parser.span_from(start),
    })))
}

/// Moves `position` forward over `text`.
fn advance_position(position: &Position, text: &str) -> Position {
    let mut advanced = position.clone();
    advanced.offset += text.len() as u32;

    match text.rfind('\n') {
        Some(last_newline) => {
            advanced.line += text.matches('\n').count() as u32;
            advanced.column = text[last_newline + 1..].chars().count() as u32 + 1;
        }
        None => advanced.column += text.chars().count() as u32,
    }

    advanced
}

/// Finds the `}` closing an embedded expression starting at `open + 1`,
/// skipping nested braces and string literals.
fn find_closing_brace(raw: &str, open: usize) -> Option<usize> {
    let mut depth = 0;
    let mut in_string = false;
    let mut escaped = false;

    for (index, ch) in raw[open + 1..].char_indices() {
        let index = open + 1 + index;

        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' if depth == 0 => return Some(index),
            '}' => depth -= 1,
            _ => {}
        }
    }

    None
}

pub fn parse_interpolation_expr(parser: &mut Parser) -> Result<ExprWrapper, Error> {
    let token = parser.advance().clone();
    let raw = token.value.as_str();
    // Contents start right after the opening backtick
    let content_start = advance_position(&token.span.start, "`");

    let escape_error = |text: String| {
        Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: text,
                message: String::from("invalid escape sequence in string"),
            },
            token.span.start.clone(),
        )
    };

    let mut parts = vec![];
    let mut text = String::new();
    let mut chars = raw.char_indices();

    while let Some((index, ch)) = chars.next() {
        match ch {
            '\\' => {
                text.push(ch);
                if let Some((_, escaped)) = chars.next() {
                    text.push(escaped);
                }
            }
            '{' => {
                let close = find_closing_brace(raw, index).ok_or_else(|| {
                    Error::new(
                        ErrorImpl::UnexpectedTokenDetailed {
                            token: raw[index..].to_string(),
                            message: String::from("unterminated `{` in interpolated string"),
                        },
                        advance_position(&content_start, &raw[..index]),
                    )
                })?;

                if !text.is_empty() {
                    parts.push(InterpolationPart::Text(
                        unescape(&text).map_err(escape_error)?,
                    ));
                    text.clear();
                }

                let source = &raw[index + 1..close];
                let position = advance_position(&content_start, &raw[..index + 1]);
                let tokens = tokenize_fragment(source, &position)?;

                let expr = parser.with_sub_parser(tokens, |sub_parser| {
                    let expr = parse_expr(sub_parser, BindingPower::Default)?;
                    if sub_parser.has_tokens() {
                        return Err(sub_parser.unexpected("expected `}` after embedded expression"));
                    }
                    Ok(expr)
                })?;
                parts.push(InterpolationPart::Expr(expr));

                // Skip the embedded source, including the closing brace
                while let Some((next, _)) = chars.next() {
                    if next == close {
                        break;
                    }
                }
            }
            _ => text.push(ch),
        }
    }

    if !text.is_empty() {
        parts.push(InterpolationPart::Text(unescape(&text).map_err(escape_error)?));
    }

    Ok(Rc::new(Expr::Interpolation(InterpolationExpr {
        parts,
        id: parser.advance_id(),
        span: token.span,
    })))
}

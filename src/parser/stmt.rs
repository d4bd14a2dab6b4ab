use std::{collections::HashSet, rc::Rc};

use crate::{
    ast::{
        ast::{Expr, Stmt, StmtWrapper},
        expressions::CallExpr,
        statements::{
            AssignmentStmt, BlockStmt, BreakStmt, ContinueStmt, ExpressionStmt, FnDeclStmt,
            IfStmt, NativeDecl, Parameter, RepeatStmt, ReturnStmt, VarDeclStmt, WhileStmt,
        },
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
    parser::{
        expr::{parse_expr, parse_scoped_symbol},
        lookups::BindingPower,
    },
};

use super::{parser::Parser, types::parse_type};

pub fn parse_stmt(parser: &mut Parser) -> Result<StmtWrapper, Error> {
    let handler = parser.get_stmt_lookup().get(&parser.current_token_kind()).copied();
    if let Some(handler) = handler {
        return handler(parser);
    }

    parse_expression_stmt(parser)
}

fn parse_expression_stmt(parser: &mut Parser) -> Result<StmtWrapper, Error> {
    let expr = parse_expr(parser, BindingPower::Default)?;

    parser.expect(TokenKind::Semicolon)?;

    Ok(Rc::new(Stmt::Expression(ExpressionStmt {
        span: parser.span_from(expr.get_span().start.clone()),
        expression: expr,
        id: parser.advance_id(),
    })))
}

pub fn parse_var_decl_stmt(parser: &mut Parser) -> Result<StmtWrapper, Error> {
    let start_token = parser.advance().clone();

    let variable_name = parser
        .expect_detailed(TokenKind::Identifier, "expected identifier during variable declaration")?
        .value;

    parser.expect_detailed(TokenKind::Colon, "expected `:` and a type after the variable name")?;
    let explicit_type = parse_type(parser)?;

    parser.expect_detailed(TokenKind::Assignment, "expected `=` and an initial value")?;
    let assigned_value = parse_expr(parser, BindingPower::Default)?;

    parser.expect(TokenKind::Semicolon)?;

    Ok(Rc::new(Stmt::VarDecl(VarDeclStmt {
        span: parser.span_from(start_token.span.start),
        identifier: variable_name,
        explicit_type,
        assigned_value,
        id: parser.advance_id(),
    })))
}

/// Statements starting with a name: an assignment, an expression starting
/// with a bracketed call, or a call without brackets (`print x;`,
/// `move 1, 0, 0;`).
pub fn parse_identifier_stmt(parser: &mut Parser) -> Result<StmtWrapper, Error> {
    let next = parser.peek_kind(1);

    if next == TokenKind::Assignment || next.is_compound_assignment() {
        return parse_assignment_stmt(parser);
    }

    if next == TokenKind::OpenParen {
        return parse_expression_stmt(parser);
    }

    let name = parser.advance().clone();

    let mut arguments = vec![];
    while parser.current_token_kind() != TokenKind::Semicolon {
        arguments.push(parse_expr(parser, BindingPower::Default)?);

        if parser.current_token_kind() != TokenKind::Semicolon {
            parser.expect_detailed(TokenKind::Comma, "expected `,` between arguments")?;
        }
    }

    let call = Rc::new(Expr::Call(CallExpr {
        callee: name.value,
        arguments,
        id: parser.advance_id(),
        span: parser.span_from(name.span.start.clone()),
    }));

    parser.expect(TokenKind::Semicolon)?;

    Ok(Rc::new(Stmt::Expression(ExpressionStmt {
        expression: call,
        id: parser.advance_id(),
        span: parser.span_from(name.span.start),
    })))
}

pub fn parse_assignment_stmt(parser: &mut Parser) -> Result<StmtWrapper, Error> {
    let start = parser.get_position();
    let assignee = parse_scoped_symbol(parser)?;

    let operator = parser.current_token().clone();
    if operator.kind != TokenKind::Assignment && !operator.kind.is_compound_assignment() {
        return Err(parser.unexpected("expected an assignment operator"));
    }
    parser.advance();

    let value = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::Semicolon)?;

    Ok(Rc::new(Stmt::Assignment(AssignmentStmt {
        assignee,
        operator,
        value,
        id: parser.advance_id(),
        span: parser.span_from(start),
    })))
}

pub fn parse_if_stmt(parser: &mut Parser) -> Result<StmtWrapper, Error> {
    let start = parser.advance().span.start.clone();

    let condition = parse_expr(parser, BindingPower::Default)?;
    let then_body = parse_block(parser)?;

    let else_body = if parser.current_token_kind() == TokenKind::Else {
        parser.advance();

        if parser.current_token_kind() == TokenKind::If {
            Some(parse_if_stmt(parser)?)
        } else {
            Some(parse_block_stmt(parser)?)
        }
    } else {
        None
    };

    Ok(Rc::new(Stmt::If(IfStmt {
        condition,
        then_body,
        else_body,
        id: parser.advance_id(),
        span: parser.span_from(start),
    })))
}

pub fn parse_while_stmt(parser: &mut Parser) -> Result<StmtWrapper, Error> {
    let start = parser.advance().span.start.clone();

    let condition = parse_expr(parser, BindingPower::Default)?;
    let body = parse_block(parser)?;

    Ok(Rc::new(Stmt::While(WhileStmt {
        condition,
        body,
        id: parser.advance_id(),
        span: parser.span_from(start),
    })))
}

pub fn parse_repeat_stmt(parser: &mut Parser) -> Result<StmtWrapper, Error> {
    let start = parser.advance().span.start.clone();

    let count = parse_expr(parser, BindingPower::Default)?;
    let body = parse_block(parser)?;

    Ok(Rc::new(Stmt::Repeat(RepeatStmt {
        count,
        body,
        id: parser.advance_id(),
        span: parser.span_from(start),
    })))
}

/// Parses `{ statements }`.
pub fn parse_block(parser: &mut Parser) -> Result<Rc<BlockStmt>, Error> {
    let start = parser
        .expect_detailed(TokenKind::OpenCurly, "expected `{` to open a block")?
        .span
        .start;

    let mut statements = Vec::new();
    while parser.current_token_kind() != TokenKind::CloseCurly {
        if !parser.has_tokens() {
            return Err(parser.unexpected("expected `}` to close the block"));
        }
        statements.push(parse_stmt(parser)?);
    }

    parser.expect(TokenKind::CloseCurly)?;

    Ok(Rc::new(BlockStmt {
        body: statements,
        id: parser.advance_id(),
        span: parser.span_from(start),
    }))
}

pub fn parse_block_stmt(parser: &mut Parser) -> Result<StmtWrapper, Error> {
    Ok(Rc::new(Stmt::Block(parse_block(parser)?)))
}

/// Parses `(name: type, ...)`, rejecting repeated names.
fn parse_parameters(parser: &mut Parser) -> Result<Vec<Parameter>, Error> {
    parser.expect(TokenKind::OpenParen)?;

    let mut parameters: Vec<Parameter> = Vec::new();
    let mut seen = HashSet::new();

    while parser.current_token_kind() != TokenKind::CloseParen {
        let name = parser.expect_detailed(TokenKind::Identifier, "expected a parameter name")?;
        parser.expect_detailed(TokenKind::Colon, "expected `:` and a parameter type")?;
        let explicit_type = parse_type(parser)?;

        if !seen.insert(name.value.clone()) {
            return Err(Error::new(
                ErrorImpl::DuplicateParameter {
                    parameter: name.value,
                },
                name.span.start,
            ));
        }

        parameters.push(Parameter {
            name: name.value,
            explicit_type,
            id: parser.advance_id(),
            span: parser.span_from(name.span.start),
        });

        if parser.current_token_kind() != TokenKind::CloseParen {
            parser.expect_detailed(TokenKind::Comma, "expected `,` between parameters")?;
        }
    }

    parser.expect(TokenKind::CloseParen)?;

    Ok(parameters)
}

pub fn parse_fn_decl_stmt(parser: &mut Parser) -> Result<StmtWrapper, Error> {
    let start = parser.advance().span.start.clone();

    let identifier = parser
        .expect_detailed(TokenKind::Identifier, "expected a function name")?
        .value;
    let parameters = parse_parameters(parser)?;

    let return_type = if parser.current_token_kind() == TokenKind::Colon {
        parser.advance();
        Some(parse_type(parser)?)
    } else {
        None
    };

    let body = parse_block(parser)?;

    Ok(Rc::new(Stmt::FnDecl(Rc::new(FnDeclStmt {
        identifier,
        parameters,
        return_type,
        body,
        id: parser.advance_id(),
        span: parser.span_from(start),
    }))))
}

pub fn parse_return_stmt(parser: &mut Parser) -> Result<StmtWrapper, Error> {
    let start = parser.advance().span.start.clone();

    let value = if parser.current_token_kind() != TokenKind::Semicolon {
        Some(parse_expr(parser, BindingPower::Default)?)
    } else {
        None
    };

    parser.expect(TokenKind::Semicolon)?;

    Ok(Rc::new(Stmt::Return(ReturnStmt {
        value,
        id: parser.advance_id(),
        span: parser.span_from(start),
    })))
}

pub fn parse_break_stmt(parser: &mut Parser) -> Result<StmtWrapper, Error> {
    let start = parser.advance().span.start.clone();
    parser.expect(TokenKind::Semicolon)?;

    Ok(Rc::new(Stmt::Break(BreakStmt {
        id: parser.advance_id(),
        span: parser.span_from(start),
    })))
}

pub fn parse_continue_stmt(parser: &mut Parser) -> Result<StmtWrapper, Error> {
    let start = parser.advance().span.start.clone();
    parser.expect(TokenKind::Semicolon)?;

    Ok(Rc::new(Stmt::Continue(ContinueStmt {
        id: parser.advance_id(),
        span: parser.span_from(start),
    })))
}

/// `native name(param: type, ...): type;` with an optional return type.
pub fn parse_native_signature(parser: &mut Parser) -> Result<NativeDecl, Error> {
    let start = parser
        .expect_detailed(TokenKind::Native, "expected `native`")?
        .span
        .start;

    let identifier = parser
        .expect_detailed(TokenKind::Identifier, "expected a function name")?
        .value;
    let parameters = parse_parameters(parser)?;

    let return_type = if parser.current_token_kind() == TokenKind::Colon {
        parser.advance();
        Some(parse_type(parser)?)
    } else {
        None
    };

    parser.expect(TokenKind::Semicolon)?;

    Ok(NativeDecl {
        identifier,
        parameters,
        return_type,
        span: parser.span_from(start),
    })
}

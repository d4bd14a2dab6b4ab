//! Unreachable-code and return-completeness checks.
//!
//! A statement sequence terminates once it reaches a `return`, or an
//! `if`/`else` whose branches all terminate. Inside a loop body `break` and
//! `continue` terminate it too. Loops never terminate the enclosing sequence.

use crate::{
    ast::{
        ast::Stmt,
        statements::{BlockStmt, FnDeclStmt},
    },
    errors::errors::{Error, ErrorImpl},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Function,
    Loop,
}

/// Checks a function body. A function with a return type must terminate on
/// every path.
pub fn check_function(decl: &FnDeclStmt) -> Result<(), Error> {
    let terminates = check_block(&decl.body, Mode::Function)?;

    if !terminates && decl.return_type.is_some() {
        return Err(Error::new(
            ErrorImpl::MissingReturn {
                function: decl.identifier.clone(),
            },
            decl.span.start.clone(),
        ));
    }

    Ok(())
}

pub fn check_loop(body: &BlockStmt) -> Result<(), Error> {
    check_block(body, Mode::Loop).map(|_| ())
}

fn check_block(block: &BlockStmt, mode: Mode) -> Result<bool, Error> {
    let mut terminated = false;

    for stmt in block.iter() {
        if terminated {
            return Err(Error::new(ErrorImpl::UnreachableCode, stmt.get_span().start.clone()));
        }
        terminated = check_stmt(stmt, mode)?;
    }

    Ok(terminated)
}

fn check_stmt(stmt: &Stmt, mode: Mode) -> Result<bool, Error> {
    match stmt {
        Stmt::Return(_) => Ok(true),
        Stmt::Break(_) | Stmt::Continue(_) => Ok(mode == Mode::Loop),
        Stmt::Block(block) => check_block(block, mode),
        Stmt::If(stmt) => {
            let then_terminates = check_block(&stmt.then_body, mode)?;
            let else_terminates = match &stmt.else_body {
                Some(else_body) => check_stmt(else_body, mode)?,
                None => false,
            };
            Ok(then_terminates && else_terminates)
        }
        // Loop and function bodies get their own check when analyzed.
        _ => Ok(false),
    }
}

use std::rc::Rc;

use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};

use crate::{
    ast::{
        ast::{Stmt, StmtWrapper},
        statements::{BlockStmt, RepeatStmt, WhileStmt},
    },
    errors::errors::Error,
    lexer::tokens::TokenKind,
    Position,
};

use super::{
    evaluator::{at, internal_error, Call, EvaluationVisitor},
    expr::schedule_expr,
    value::Value,
};

/// Schedules the statements of `block` so the first one runs next.
pub fn schedule_block(evaluator: &mut EvaluationVisitor, block: &BlockStmt) {
    for stmt in block.iter().rev() {
        schedule_stmt(evaluator, Rc::clone(stmt));
    }
}

pub fn schedule_stmt(evaluator: &mut EvaluationVisitor, stmt: StmtWrapper) {
    evaluator.schedule_thunk(move |evaluator, _| visit_stmt(evaluator, &stmt));
}

fn pop_logic(evaluator: &mut EvaluationVisitor, position: &Position) -> Result<bool, Error> {
    match evaluator.pop(position)? {
        Value::Logic(value) => Ok(value),
        other => Err(internal_error(
            &format!("expected a logic value, found {}", other.kind_name()),
            position,
        )),
    }
}

pub fn visit_stmt(evaluator: &mut EvaluationVisitor, stmt: &StmtWrapper) -> Result<(), Error> {
    match &**stmt {
        Stmt::Block(block) => {
            schedule_block(evaluator, block);
            Ok(())
        }
        Stmt::Expression(expression) => {
            let position = expression.span.start.clone();
            // Calls to functions without a return type leave `Unit`.
            evaluator.schedule_thunk(move |evaluator, _| evaluator.pop(&position).map(|_| ()));
            schedule_expr(evaluator, Rc::clone(&expression.expression));
            Ok(())
        }
        Stmt::VarDecl(decl) => {
            let position = decl.span.start.clone();
            let symbol = evaluator.symbol(decl.id, &position)?;

            evaluator.schedule_thunk(move |evaluator, _| {
                let value = evaluator.pop(&position)?;
                evaluator.declare(symbol, value);
                Ok(())
            });
            schedule_expr(evaluator, Rc::clone(&decl.assigned_value));
            Ok(())
        }
        Stmt::Assignment(assignment) => {
            let position = assignment.span.start.clone();
            let symbol = evaluator.symbol(assignment.assignee.id, &position)?;
            let operator = match assignment.operator.kind {
                TokenKind::Assignment => None,
                _ => Some(evaluator.operator(assignment.id, &position)?),
            };

            evaluator.schedule_thunk(move |evaluator, _| {
                let value = evaluator.pop(&position)?;
                let value = match operator {
                    Some(operator) => {
                        let current = evaluator.read(symbol, &position)?;
                        operator.apply_binary(current, value).map_err(at(&position))?
                    }
                    None => value,
                };
                evaluator.assign(symbol, value, &position)
            });
            schedule_expr(evaluator, Rc::clone(&assignment.value));
            Ok(())
        }
        Stmt::If(if_stmt) => {
            let condition = Rc::clone(&if_stmt.condition);
            let owned = Rc::clone(stmt);

            evaluator.schedule_thunk(move |evaluator, _| {
                let Stmt::If(if_stmt) = &*owned else {
                    return Ok(());
                };

                if pop_logic(evaluator, &if_stmt.span.start)? {
                    schedule_block(evaluator, &if_stmt.then_body);
                } else if let Some(else_body) = &if_stmt.else_body {
                    schedule_stmt(evaluator, Rc::clone(else_body));
                }
                Ok(())
            });
            schedule_expr(evaluator, condition);
            Ok(())
        }
        Stmt::While(while_stmt) => {
            schedule_while(evaluator, Rc::clone(stmt), while_stmt);
            Ok(())
        }
        Stmt::Repeat(repeat) => {
            schedule_repeat(evaluator, Rc::clone(stmt), repeat);
            Ok(())
        }
        // Functions are bound during analysis.
        Stmt::FnDecl(_) => Ok(()),
        Stmt::Return(return_stmt) => {
            let position = return_stmt.span.start.clone();
            evaluator.schedule_thunk(move |evaluator, _| evaluator.unwind_return(&position));

            match &return_stmt.value {
                Some(value) => schedule_expr(evaluator, Rc::clone(value)),
                None => evaluator.push(Value::Unit),
            }
            Ok(())
        }
        Stmt::Break(break_stmt) => evaluator.unwind_break(&break_stmt.span.start),
        Stmt::Continue(continue_stmt) => evaluator.unwind_continue(&continue_stmt.span.start),
    }
}

/// Schedules the work of one loop iteration. The re-scheduling thunk runs
/// after the body and first retires this iteration's `BreakPointer`, so the
/// pending stack does not grow across iterations.
fn schedule_iteration<F>(evaluator: &mut EvaluationVisitor, body: &BlockStmt, next: F)
where
    F: FnOnce(&mut EvaluationVisitor) + 'static,
{
    evaluator.schedule(Call::BreakPointer);
    evaluator.schedule_thunk(move |evaluator, _| {
        evaluator.retire_break_pointer();
        next(evaluator);
        Ok(())
    });
    evaluator.schedule(Call::ContinuePointer);
    schedule_block(evaluator, body);
}

fn schedule_while(evaluator: &mut EvaluationVisitor, stmt: StmtWrapper, while_stmt: &WhileStmt) {
    let condition = Rc::clone(&while_stmt.condition);

    evaluator.schedule_thunk(move |evaluator, _| {
        let Stmt::While(while_stmt) = &*stmt else {
            return Ok(());
        };

        if pop_logic(evaluator, &while_stmt.span.start)? {
            let body = Rc::clone(&while_stmt.body);
            let next = Rc::clone(&stmt);
            schedule_iteration(evaluator, &body, move |evaluator| {
                if let Stmt::While(while_stmt) = &*next {
                    schedule_while(evaluator, Rc::clone(&next), while_stmt);
                }
            });
        }
        Ok(())
    });
    schedule_expr(evaluator, condition);
}

fn schedule_repeat(evaluator: &mut EvaluationVisitor, stmt: StmtWrapper, repeat: &RepeatStmt) {
    let position = repeat.span.start.clone();

    evaluator.schedule_thunk(move |evaluator, _| {
        let remaining = match evaluator.pop(&position)? {
            Value::Number(count) if count.is_negative() => BigInt::zero(),
            Value::Number(count) => count,
            other => {
                return Err(internal_error(
                    &format!("expected a number of iterations, found {}", other.kind_name()),
                    &position,
                ))
            }
        };

        schedule_repetitions(evaluator, stmt, remaining);
        Ok(())
    });
    schedule_expr(evaluator, Rc::clone(&repeat.count));
}

fn schedule_repetitions(evaluator: &mut EvaluationVisitor, stmt: StmtWrapper, remaining: BigInt) {
    if remaining.is_zero() {
        return;
    }

    let Stmt::Repeat(repeat) = &*stmt else {
        return;
    };

    let body = Rc::clone(&repeat.body);
    schedule_iteration(evaluator, &body, move |evaluator| {
        schedule_repetitions(evaluator, stmt, remaining - BigInt::one());
    });
}

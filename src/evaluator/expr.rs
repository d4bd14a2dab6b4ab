use std::rc::Rc;

use crate::{
    ast::{
        ast::{Expr, ExprWrapper},
        expressions::InterpolationPart,
    },
    errors::errors::Error,
};

use super::{
    evaluator::{at, internal_error, Call, EvaluationVisitor},
    value::{Material, Value, DEFAULT_NAMESPACE},
};

pub fn schedule_expr(evaluator: &mut EvaluationVisitor, expr: ExprWrapper) {
    evaluator.schedule_thunk(move |evaluator, _| visit_expr(evaluator, &expr));
}

/// Schedules `operands` so they are computed left to right.
fn schedule_operands<'a>(evaluator: &mut EvaluationVisitor, operands: impl DoubleEndedIterator<Item = &'a ExprWrapper>) {
    for operand in operands.rev() {
        schedule_expr(evaluator, Rc::clone(operand));
    }
}

/// Leaves the value of `expr` on the value stack, directly for literals and
/// variables, through scheduled work for everything else.
pub fn visit_expr(evaluator: &mut EvaluationVisitor, expr: &ExprWrapper) -> Result<(), Error> {
    match &**expr {
        Expr::Number(number) => evaluator.push(Value::Number(number.value.clone())),
        Expr::Real(real) => evaluator.push(Value::Real(real.value)),
        Expr::Logic(logic) => evaluator.push(Value::Logic(logic.value)),
        Expr::String(string) => evaluator.push(Value::String(string.value.clone())),
        Expr::Material(material) => {
            let namespace = material.namespace.as_deref().unwrap_or(DEFAULT_NAMESPACE);
            evaluator.push(Value::Material(Material::new(namespace, material.name.clone())));
        }
        Expr::Enum(member) => evaluator.push(Value::Literal(member.member.clone())),
        Expr::Symbol(symbol) => {
            let id = evaluator.symbol(symbol.id, &symbol.span.start)?;
            let value = evaluator.read(id, &symbol.span.start)?;
            evaluator.push(value);
        }
        Expr::Interpolation(interpolation) => {
            let owned = Rc::clone(expr);
            let count = interpolation.expressions().count();

            evaluator.schedule_thunk(move |evaluator, _| {
                let Expr::Interpolation(interpolation) = &*owned else {
                    return Ok(());
                };

                let mut values = evaluator.pop_many(count, &interpolation.span.start)?.into_iter();
                let mut text = String::new();
                for part in &interpolation.parts {
                    match part {
                        InterpolationPart::Text(fragment) => text.push_str(fragment),
                        InterpolationPart::Expr(_) => {
                            if let Some(value) = values.next() {
                                text.push_str(&value.to_string());
                            }
                        }
                    }
                }

                evaluator.push(Value::String(text));
                Ok(())
            });
            let operands: Vec<&ExprWrapper> = interpolation.expressions().collect();
            schedule_operands(evaluator, operands.into_iter());
        }
        Expr::Binary(binary) => {
            let operator = evaluator.operator(binary.id, &binary.span.start)?;
            let position = binary.operator.span.start.clone();

            evaluator.schedule_thunk(move |evaluator, _| {
                let right = evaluator.pop(&position)?;
                let left = evaluator.pop(&position)?;
                let result = operator.apply_binary(left, right).map_err(at(&position))?;
                evaluator.push(result);
                Ok(())
            });
            schedule_operands(evaluator, [&binary.left, &binary.right].into_iter());
        }
        Expr::Prefix(prefix) => {
            let operator = evaluator.operator(prefix.id, &prefix.span.start)?;
            let position = prefix.span.start.clone();

            evaluator.schedule_thunk(move |evaluator, _| {
                let operand = evaluator.pop(&position)?;
                let result = operator.apply_unary(operand).map_err(at(&position))?;
                evaluator.push(result);
                Ok(())
            });
            schedule_expr(evaluator, Rc::clone(&prefix.right_expr));
        }
        Expr::Index(index) => {
            let operator = evaluator.operator(index.id, &index.span.start)?;
            let position = index.index.get_span().start.clone();

            evaluator.schedule_thunk(move |evaluator, _| {
                let key = evaluator.pop(&position)?;
                let collection = evaluator.pop(&position)?;
                let result = operator.apply_binary(collection, key).map_err(at(&position))?;
                evaluator.push(result);
                Ok(())
            });
            schedule_operands(evaluator, [&index.collection, &index.index].into_iter());
        }
        Expr::Call(call) => {
            let function = evaluator.function(call.id, &call.span.start)?;

            evaluator.schedule(Call::Invoke {
                function,
                span: call.span.clone(),
                arity: call.arguments.len(),
            });
            schedule_operands(evaluator, call.arguments.iter());
        }
        Expr::List(list) => {
            let count = list.elements.len();
            let position = list.span.start.clone();

            evaluator.schedule_thunk(move |evaluator, _| {
                let elements = evaluator.pop_many(count, &position)?;
                evaluator.push(Value::List(elements));
                Ok(())
            });
            schedule_operands(evaluator, list.elements.iter());
        }
        Expr::Map(map) => {
            let count = map.entries.len();
            let position = map.span.start.clone();

            evaluator.schedule_thunk(move |evaluator, _| {
                let flat = evaluator.pop_many(count * 2, &position)?;
                let mut flat = flat.into_iter();
                let mut entries = Vec::with_capacity(count);

                while let (Some(key), Some(value)) = (flat.next(), flat.next()) {
                    entries.push((key, value));
                }
                if entries.len() != count {
                    return Err(internal_error("map literal lost an entry", &position));
                }

                evaluator.push(Value::Map(entries.into_iter().collect()));
                Ok(())
            });
            schedule_operands(
                evaluator,
                map.entries.iter().flat_map(|(key, value)| [key, value]),
            );
        }
    }

    Ok(())
}

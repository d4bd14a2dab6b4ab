//! The resumable evaluator.
//!
//! Evaluation never recurses on the host stack. Pending work lives on an
//! explicit stack of [`Call`]s, intermediate results on a value stack, and
//! variables in one frame per active function call. The host runs one work
//! item at a time through [`EvaluationVisitor::step`] and may stop between
//! any two of them.

use std::{collections::HashMap, rc::Rc};

use crate::{
    ast::{ast::NodeId, statements::BlockStmt},
    errors::errors::{Error, ErrorImpl},
    stdlib::{
        context::RunContext,
        function::{Function, FunctionBody},
    },
    type_checker::{info_tables::InfoTables, info_tables::SymbolId, operators::Operators},
    Position, Span,
};

use super::{stmt::schedule_block, value::Value};

pub type Thunk = Box<dyn FnOnce(&mut EvaluationVisitor, &mut RunContext) -> Result<(), Error>>;

/// One item of pending work.
pub enum Call {
    Thunk(Thunk),
    /// Pops `arity` arguments and calls `function`, leaving its result.
    Invoke {
        function: Rc<Function>,
        span: Span,
        arity: usize,
    },
    /// Bottom of a script function call. Reached normally, it drops the
    /// call's frame.
    ReturnPointer,
    /// Bottom of one loop iteration, target of `break`.
    BreakPointer,
    /// End of one loop body, target of `continue`.
    ContinuePointer,
}

impl std::fmt::Debug for Call {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Call::Thunk(_) => write!(f, "Thunk"),
            Call::Invoke { function, arity, .. } => write!(f, "Invoke({}, {})", function.name, arity),
            Call::ReturnPointer => write!(f, "ReturnPointer"),
            Call::BreakPointer => write!(f, "BreakPointer"),
            Call::ContinuePointer => write!(f, "ContinuePointer"),
        }
    }
}

pub struct EvaluationVisitor {
    pub tables: Rc<InfoTables>,
    variables: Vec<HashMap<SymbolId, Value>>,
    calls: Vec<Call>,
    objects: Vec<Value>,
    max_depth: usize,
}

impl EvaluationVisitor {
    /// An evaluator positioned at the first statement of `program`.
    pub fn new(program: &BlockStmt, tables: Rc<InfoTables>, max_depth: usize) -> Self {
        let mut evaluator = EvaluationVisitor {
            tables,
            variables: vec![HashMap::new()],
            calls: vec![],
            objects: vec![],
            max_depth,
        };

        schedule_block(&mut evaluator, program);
        evaluator
    }

    pub fn is_finished(&self) -> bool {
        self.calls.is_empty()
    }

    /// Number of pending work items.
    pub fn pending(&self) -> usize {
        self.calls.len()
    }

    /// Number of active function calls.
    pub fn depth(&self) -> usize {
        self.variables.len() - 1
    }

    /// A variable of the top-level frame.
    pub fn global(&self, symbol: SymbolId) -> Option<&Value> {
        self.variables.first()?.get(&symbol)
    }

    /// Runs the next work item. Returns the description of the function call
    /// it performed, if it was one.
    pub fn step(&mut self, context: &mut RunContext) -> Result<Option<String>, Error> {
        let call = match self.calls.pop() {
            Some(call) => call,
            None => return Ok(None),
        };

        match call {
            Call::Thunk(thunk) => thunk(self, context).map(|_| None),
            Call::Invoke { function, span, arity } => self.invoke(&function, &span, arity, context).map(Some),
            Call::ReturnPointer => {
                self.variables.pop();
                Ok(None)
            }
            Call::BreakPointer | Call::ContinuePointer => Ok(None),
        }
    }

    pub fn schedule(&mut self, call: Call) {
        self.calls.push(call);
    }

    pub fn schedule_thunk<F>(&mut self, thunk: F)
    where
        F: FnOnce(&mut EvaluationVisitor, &mut RunContext) -> Result<(), Error> + 'static,
    {
        self.calls.push(Call::Thunk(Box::new(thunk)));
    }

    /// Takes the top work item if it is a `BreakPointer`.
    pub fn retire_break_pointer(&mut self) {
        if matches!(self.calls.last(), Some(Call::BreakPointer)) {
            self.calls.pop();
        }
    }

    pub fn push(&mut self, value: Value) {
        self.objects.push(value);
    }

    pub fn pop(&mut self, position: &Position) -> Result<Value, Error> {
        self.objects
            .pop()
            .ok_or_else(|| internal_error("value stack underflow", position))
    }

    /// Pops `count` values, returned in the order they were pushed.
    pub fn pop_many(&mut self, count: usize, position: &Position) -> Result<Vec<Value>, Error> {
        if self.objects.len() < count {
            return Err(internal_error("value stack underflow", position));
        }
        Ok(self.objects.split_off(self.objects.len() - count))
    }

    pub fn symbol(&self, node: NodeId, position: &Position) -> Result<SymbolId, Error> {
        self.tables
            .symbol(node)
            .ok_or_else(|| internal_error(&format!("no symbol recorded for node {}", node), position))
    }

    pub fn operator(&self, node: NodeId, position: &Position) -> Result<Operators, Error> {
        self.tables
            .operator(node)
            .ok_or_else(|| internal_error(&format!("no operator recorded for node {}", node), position))
    }

    pub fn function(&self, node: NodeId, position: &Position) -> Result<Rc<Function>, Error> {
        self.tables
            .function(node)
            .cloned()
            .ok_or_else(|| internal_error(&format!("no function recorded for node {}", node), position))
    }

    pub fn declare(&mut self, symbol: SymbolId, value: Value) {
        if let Some(frame) = self.variables.last_mut() {
            frame.insert(symbol, value);
        }
    }

    pub fn read(&self, symbol: SymbolId, position: &Position) -> Result<Value, Error> {
        self.variables
            .iter()
            .rev()
            .find_map(|frame| frame.get(&symbol))
            .cloned()
            .ok_or_else(|| internal_error(&format!("variable {} read before it was declared", symbol), position))
    }

    pub fn assign(&mut self, symbol: SymbolId, value: Value, position: &Position) -> Result<(), Error> {
        match self
            .variables
            .iter_mut()
            .rev()
            .find_map(|frame| frame.get_mut(&symbol))
        {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(internal_error(
                &format!("variable {} assigned before it was declared", symbol),
                position,
            )),
        }
    }

    /// Drops pending work up to and including the innermost `ReturnPointer`
    /// and leaves the function's frame. The return value stays on the value
    /// stack.
    pub fn unwind_return(&mut self, position: &Position) -> Result<(), Error> {
        self.unwind_to(|call| matches!(call, Call::ReturnPointer), "return", position)?;
        self.variables.pop();
        Ok(())
    }

    pub fn unwind_break(&mut self, position: &Position) -> Result<(), Error> {
        self.unwind_to(|call| matches!(call, Call::BreakPointer), "break", position)
    }

    pub fn unwind_continue(&mut self, position: &Position) -> Result<(), Error> {
        self.unwind_to(|call| matches!(call, Call::ContinuePointer), "continue", position)
    }

    fn unwind_to(&mut self, target: impl Fn(&Call) -> bool, statement: &str, position: &Position) -> Result<(), Error> {
        while let Some(call) = self.calls.pop() {
            if target(&call) {
                return Ok(());
            }
        }
        Err(internal_error(&format!("{} without a target", statement), position))
    }

    fn invoke(
        &mut self,
        function: &Rc<Function>,
        span: &Span,
        arity: usize,
        context: &mut RunContext,
    ) -> Result<String, Error> {
        let arguments = self.pop_many(arity, &span.start)?;
        let description = function.describe_call(&arguments);

        match &function.body {
            FunctionBody::Native(native) => {
                let result = native(context, arguments).map_err(|message| {
                    Error::new(
                        ErrorImpl::NativeCallFailed {
                            function: function.name.clone(),
                            message,
                        },
                        span.start.clone(),
                    )
                })?;
                self.push(result);
            }
            FunctionBody::Script(decl) => {
                if self.depth() >= self.max_depth {
                    return Err(Error::new(
                        ErrorImpl::RecursionLimit { limit: self.max_depth },
                        span.start.clone(),
                    ));
                }

                let mut frame = HashMap::new();
                for (parameter, argument) in decl.parameters.iter().zip(arguments) {
                    frame.insert(self.symbol(parameter.id, &parameter.span.start)?, argument);
                }
                self.variables.push(frame);

                // A body that falls off its end leaves `Unit` behind.
                self.schedule(Call::ReturnPointer);
                self.schedule_thunk(|evaluator, _| {
                    evaluator.push(Value::Unit);
                    Ok(())
                });
                schedule_block(self, &decl.body);
            }
        }

        Ok(description)
    }
}

pub fn internal_error(message: &str, position: &Position) -> Error {
    Error::new(
        ErrorImpl::InternalError {
            message: message.to_string(),
        },
        position.clone(),
    )
}

/// Attaches the position of the operator that failed.
pub fn at(position: &Position) -> impl Fn(ErrorImpl) -> Error + '_ {
    move |error| Error::new(error, position.clone())
}

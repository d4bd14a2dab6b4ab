use std::rc::Rc;

use crate::{
    ast::{
        ast::{Expr, NodeId, Stmt},
        expressions::{BinaryExpr, CallExpr, IndexExpr, InterpolationExpr, ListExpr, MapExpr, PrefixExpr, SymbolExpr},
        statements::{AssignmentStmt, BlockStmt, FnDeclStmt, ReturnStmt, VarDeclStmt},
        types::{display_types, Type},
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
    stdlib::{function::Function, stdlib::StandardLibrary},
    Position,
};

use super::{
    dead_code,
    info_tables::{InfoTables, SymbolId},
    operators::Operators,
    scope::{ScopeChain, Variable},
};

/// What the walk is currently inside of, innermost last.
#[derive(Debug, Clone)]
enum Context {
    Function {
        name: String,
        return_type: Option<Type>,
    },
    Loop,
}

pub struct TypeChecker<'a> {
    scopes: ScopeChain<'a>,
    tables: InfoTables,
    next_symbol: usize,
    contexts: Vec<Context>,
}

impl<'a> TypeChecker<'a> {
    pub fn new(stdlib: &'a StandardLibrary) -> Self {
        TypeChecker {
            scopes: ScopeChain::new(stdlib),
            tables: InfoTables::new(),
            next_symbol: 0,
            contexts: vec![],
        }
    }

    fn allocate_symbol(&mut self) -> SymbolId {
        let symbol = SymbolId(self.next_symbol);
        self.next_symbol += 1;
        symbol
    }

    fn declare_variable(&mut self, name: &str, ty: Type, node: NodeId, position: &Position) -> Result<SymbolId, Error> {
        let symbol = self.allocate_symbol();

        if !self.scopes.define_variable(name, ty, symbol, node) {
            return Err(Error::new(
                ErrorImpl::VariableAlreadyDeclared {
                    variable: name.to_string(),
                },
                position.clone(),
            ));
        }

        self.tables.add_symbol(node, symbol);
        Ok(symbol)
    }

    fn fetch_variable(&self, symbol: &SymbolExpr) -> Result<Variable, Error> {
        match self.scopes.resolve_variable(&symbol.value, symbol.up_levels) {
            Some(variable) => Ok(variable.clone()),
            None => Err(Error::new(
                ErrorImpl::VariableNotDeclared {
                    variable: symbol.value.clone(),
                    suggestions: self.scopes.suggestions(&symbol.value),
                },
                symbol.span.start.clone(),
            )),
        }
    }

    fn enclosing_function(&self) -> Option<(&String, &Option<Type>)> {
        self.contexts.iter().rev().find_map(|context| match context {
            Context::Function { name, return_type } => Some((name, return_type)),
            Context::Loop => None,
        })
    }

    /// Whether a `break`/`continue` here belongs to a loop of the current
    /// function (or of the top level).
    fn inside_loop(&self) -> bool {
        for context in self.contexts.iter().rev() {
            match context {
                Context::Loop => return true,
                Context::Function { .. } => return false,
            }
        }
        false
    }

    pub fn into_tables(self) -> InfoTables {
        self.tables
    }
}

/// Analyzes a whole program against `stdlib`, returning the side tables
/// the evaluator runs from. The first error aborts the analysis.
pub fn type_check(program: &BlockStmt, stdlib: &StandardLibrary) -> Result<InfoTables, Error> {
    let mut checker = TypeChecker::new(stdlib);

    checker.scopes.push();
    for stmt in program.iter() {
        type_check_stmt(&mut checker, stmt)?;
    }
    checker.scopes.pop();

    Ok(checker.into_tables())
}

fn type_mismatch(expected: &Type, received: &Type, position: &Position) -> Error {
    Error::new(
        ErrorImpl::TypeMatchError {
            expected: expected.to_string(),
            received: received.to_string(),
        },
        position.clone(),
    )
}

fn reject_pseudo(ty: &Type, expr: &Expr) -> Result<(), Error> {
    if ty.is_pseudo() {
        return Err(Error::new(ErrorImpl::EmptyCollectionOperand, expr.get_span().start.clone()));
    }
    Ok(())
}

fn check_condition(checker: &mut TypeChecker, condition: &Expr, statement: &str, expected: Type) -> Result<(), Error> {
    let received = type_check_expr(checker, condition)?;

    if received != expected {
        return Err(Error::new(
            ErrorImpl::ConditionTypeError {
                statement: statement.to_string(),
                expected: expected.to_string(),
                received: received.to_string(),
            },
            condition.get_span().start.clone(),
        ));
    }

    Ok(())
}

pub fn type_check_stmt(checker: &mut TypeChecker, stmt: &Stmt) -> Result<(), Error> {
    match stmt {
        Stmt::Block(block) => type_check_block(checker, block),
        Stmt::Expression(stmt) => match &*stmt.expression {
            // A call in statement position may return nothing.
            Expr::Call(call) => type_check_call(checker, call).map(|_| ()),
            expr => type_check_expr(checker, expr).map(|_| ()),
        },
        Stmt::VarDecl(decl) => type_check_var_decl(checker, decl),
        Stmt::Assignment(assignment) => type_check_assignment(checker, assignment),
        Stmt::If(stmt) => {
            check_condition(checker, &stmt.condition, "if", Type::LOGIC)?;
            type_check_block(checker, &stmt.then_body)?;

            if let Some(else_body) = &stmt.else_body {
                type_check_stmt(checker, else_body)?;
            }
            Ok(())
        }
        Stmt::While(stmt) => {
            check_condition(checker, &stmt.condition, "while", Type::LOGIC)?;
            type_check_loop_body(checker, &stmt.body)
        }
        Stmt::Repeat(stmt) => {
            check_condition(checker, &stmt.count, "repeat", Type::NUMBER)?;
            type_check_loop_body(checker, &stmt.body)
        }
        Stmt::FnDecl(decl) => type_check_fn_decl(checker, decl),
        Stmt::Return(stmt) => type_check_return(checker, stmt),
        Stmt::Break(stmt) => {
            if !checker.inside_loop() {
                return Err(Error::new(
                    ErrorImpl::OutsideLoop {
                        statement: String::from("break"),
                    },
                    stmt.span.start.clone(),
                ));
            }
            Ok(())
        }
        Stmt::Continue(stmt) => {
            if !checker.inside_loop() {
                return Err(Error::new(
                    ErrorImpl::OutsideLoop {
                        statement: String::from("continue"),
                    },
                    stmt.span.start.clone(),
                ));
            }
            Ok(())
        }
    }
}

fn type_check_block(checker: &mut TypeChecker, block: &BlockStmt) -> Result<(), Error> {
    checker.scopes.push();
    let result = block.iter().try_for_each(|stmt| type_check_stmt(checker, stmt));
    checker.scopes.pop();

    result
}

fn type_check_loop_body(checker: &mut TypeChecker, body: &BlockStmt) -> Result<(), Error> {
    dead_code::check_loop(body)?;

    checker.contexts.push(Context::Loop);
    let result = type_check_block(checker, body);
    checker.contexts.pop();

    result
}

fn type_check_var_decl(checker: &mut TypeChecker, decl: &VarDeclStmt) -> Result<(), Error> {
    // The initializer is checked before the name exists, so `var x: T = x;`
    // refers to an outer `x`.
    let initializer = type_check_expr(checker, &decl.assigned_value)?;

    if !decl.explicit_type.accepts_binding(&initializer) {
        return Err(type_mismatch(
            &decl.explicit_type,
            &initializer,
            &decl.assigned_value.get_span().start,
        ));
    }

    checker.declare_variable(&decl.identifier, decl.explicit_type.clone(), decl.id, &decl.span.start)?;
    Ok(())
}

fn type_check_assignment(checker: &mut TypeChecker, assignment: &AssignmentStmt) -> Result<(), Error> {
    let variable = checker.fetch_variable(&assignment.assignee)?;
    let value = type_check_expr(checker, &assignment.value)?;

    if assignment.operator.kind == TokenKind::Assignment {
        if !variable.ty.accepts_binding(&value) {
            return Err(type_mismatch(&variable.ty, &value, &assignment.value.get_span().start));
        }
    } else {
        match Operators::resolve_compound(assignment.operator.kind, &variable.ty, &value) {
            Some(operator) => checker.tables.add_operator(assignment.id, operator),
            None => {
                return Err(Error::new(
                    ErrorImpl::OperatorTypeError {
                        operator: assignment.operator.kind.symbol().to_string(),
                        left: variable.ty.to_string(),
                        right: value.to_string(),
                    },
                    assignment.span.start.clone(),
                ))
            }
        }
    }

    checker.tables.add_symbol(assignment.assignee.id, variable.symbol);
    Ok(())
}

fn type_check_fn_decl(checker: &mut TypeChecker, decl: &Rc<FnDeclStmt>) -> Result<(), Error> {
    let function = Rc::new(Function::script(Rc::clone(decl)));

    // Defined before the body is checked so the function can call itself.
    if !checker.scopes.define_function(function) {
        return Err(Error::new(
            ErrorImpl::FunctionAlreadyDeclared {
                function: decl.identifier.clone(),
            },
            decl.span.start.clone(),
        ));
    }

    dead_code::check_function(decl)?;

    checker.scopes.push();
    checker.contexts.push(Context::Function {
        name: decl.identifier.clone(),
        return_type: decl.return_type.clone(),
    });

    let result = type_check_fn_body(checker, decl);

    checker.contexts.pop();
    checker.scopes.pop();

    result
}

fn type_check_fn_body(checker: &mut TypeChecker, decl: &FnDeclStmt) -> Result<(), Error> {
    for parameter in &decl.parameters {
        checker
            .declare_variable(&parameter.name, parameter.explicit_type.clone(), parameter.id, &parameter.span.start)
            .map_err(|_| {
                Error::new(
                    ErrorImpl::DuplicateParameter {
                        parameter: parameter.name.clone(),
                    },
                    parameter.span.start.clone(),
                )
            })?;
    }

    // The body shares the parameters' scope.
    decl.body.iter().try_for_each(|stmt| type_check_stmt(checker, stmt))
}

fn type_check_return(checker: &mut TypeChecker, stmt: &ReturnStmt) -> Result<(), Error> {
    let (name, return_type) = match checker.enclosing_function() {
        Some((name, return_type)) => (name.clone(), return_type.clone()),
        None => return Err(Error::new(ErrorImpl::ReturnOutsideFunction, stmt.span.start.clone())),
    };

    match (&stmt.value, return_type) {
        (None, None) => Ok(()),
        (None, Some(_)) => Err(Error::new(
            ErrorImpl::MissingReturnValue { function: name },
            stmt.span.start.clone(),
        )),
        (Some(value), None) => Err(Error::new(
            ErrorImpl::UnexpectedReturnValue { function: name },
            value.get_span().start.clone(),
        )),
        (Some(value), Some(expected)) => {
            let received = type_check_expr(checker, value)?;

            if !expected.accepts_binding(&received) {
                return Err(Error::new(
                    ErrorImpl::ReturnTypeMismatch {
                        expected: expected.to_string(),
                        received: received.to_string(),
                    },
                    value.get_span().start.clone(),
                ));
            }
            Ok(())
        }
    }
}

/// Types an expression that must produce a value.
pub fn type_check_expr(checker: &mut TypeChecker, expr: &Expr) -> Result<Type, Error> {
    match expr {
        Expr::Number(_) => Ok(Type::NUMBER),
        Expr::Real(_) => Ok(Type::REAL),
        Expr::Logic(_) => Ok(Type::LOGIC),
        Expr::String(_) => Ok(Type::STRING),
        Expr::Material(_) => Ok(Type::MATERIAL),
        Expr::Enum(member) => Ok(Type::literal([member.member.clone()])),
        Expr::Interpolation(interpolation) => type_check_interpolation(checker, interpolation),
        Expr::Symbol(symbol) => {
            let variable = checker.fetch_variable(symbol)?;
            checker.tables.add_symbol(symbol.id, variable.symbol);
            Ok(variable.ty)
        }
        Expr::Binary(binary) => type_check_binary(checker, binary),
        Expr::Prefix(prefix) => type_check_prefix(checker, prefix),
        Expr::Index(index) => type_check_index(checker, index),
        Expr::Call(call) => match type_check_call(checker, call)? {
            Some(ty) => Ok(ty),
            None => Err(Error::new(
                ErrorImpl::TypeMatchError {
                    expected: String::from("a value"),
                    received: format!("nothing from {}", call.callee),
                },
                call.span.start.clone(),
            )),
        },
        Expr::List(list) => type_check_list(checker, list),
        Expr::Map(map) => type_check_map(checker, map),
    }
}

fn type_check_interpolation(checker: &mut TypeChecker, interpolation: &InterpolationExpr) -> Result<Type, Error> {
    for expr in interpolation.expressions() {
        let ty = type_check_expr(checker, expr)?;

        if !ty.is_simple() {
            return Err(Error::new(
                ErrorImpl::InterpolationTypeError {
                    received: ty.to_string(),
                },
                expr.get_span().start.clone(),
            ));
        }
    }

    Ok(Type::STRING)
}

fn type_check_binary(checker: &mut TypeChecker, binary: &BinaryExpr) -> Result<Type, Error> {
    let left = type_check_expr(checker, &binary.left)?;
    reject_pseudo(&left, &binary.left)?;
    let right = type_check_expr(checker, &binary.right)?;
    reject_pseudo(&right, &binary.right)?;

    match Operators::resolve_binary(binary.operator.kind, &left, &right) {
        Some((operator, ty)) => {
            checker.tables.add_operator(binary.id, operator);
            Ok(ty)
        }
        None => Err(Error::new(
            ErrorImpl::OperatorTypeError {
                operator: binary.operator.kind.symbol().to_string(),
                left: left.to_string(),
                right: right.to_string(),
            },
            binary.operator.span.start.clone(),
        )),
    }
}

fn type_check_prefix(checker: &mut TypeChecker, prefix: &PrefixExpr) -> Result<Type, Error> {
    let operand = type_check_expr(checker, &prefix.right_expr)?;
    reject_pseudo(&operand, &prefix.right_expr)?;

    match Operators::resolve_unary(prefix.operator.kind, &operand) {
        Some((operator, ty)) => {
            checker.tables.add_operator(prefix.id, operator);
            Ok(ty)
        }
        None => Err(Error::new(
            ErrorImpl::UnaryOperatorTypeError {
                operator: prefix.operator.kind.symbol().to_string(),
                operand: operand.to_string(),
            },
            prefix.span.start.clone(),
        )),
    }
}

fn type_check_index(checker: &mut TypeChecker, index: &IndexExpr) -> Result<Type, Error> {
    let collection = type_check_expr(checker, &index.collection)?;
    reject_pseudo(&collection, &index.collection)?;
    let key = type_check_expr(checker, &index.index)?;
    reject_pseudo(&key, &index.index)?;

    match Operators::resolve_index(&collection, &key) {
        Some((operator, ty)) => {
            checker.tables.add_operator(index.id, operator);
            Ok(ty)
        }
        None => Err(Error::new(
            ErrorImpl::IndexTypeError {
                collection: collection.to_string(),
                index: key.to_string(),
            },
            index.index.get_span().start.clone(),
        )),
    }
}

/// Resolves the overload for a call site. Returns the function's return
/// type, `None` for functions that return nothing.
pub fn type_check_call(checker: &mut TypeChecker, call: &CallExpr) -> Result<Option<Type>, Error> {
    let mut arguments = Vec::with_capacity(call.arguments.len());

    for argument in &call.arguments {
        let ty = type_check_expr(checker, argument)?;

        if ty.is_pseudo() {
            return Err(Error::new(
                ErrorImpl::EmptyCollectionArgument {
                    function: call.callee.clone(),
                },
                argument.get_span().start.clone(),
            ));
        }
        arguments.push(ty);
    }

    match checker.scopes.resolve_function(&call.callee, &arguments) {
        Some(function) => {
            let return_type = function.return_type.clone();
            checker.tables.add_function(call.id, function);
            Ok(return_type)
        }
        None => Err(Error::new(
            ErrorImpl::FunctionNotFound {
                function: call.callee.clone(),
                arguments: display_types(&arguments),
                suggestions: checker.scopes.suggestions(&call.callee),
            },
            call.span.start.clone(),
        )),
    }
}

/// Joins the type of one more element into the common element type. Literal
/// types merge their members; anything else must match exactly.
fn unify_element(current: Option<Type>, next: Type, expr: &Expr) -> Result<Type, Error> {
    reject_pseudo(&next, expr)?;

    match current {
        None => Ok(next),
        Some(Type::Literal(mut members)) => match next {
            Type::Literal(more) => {
                members.extend(more);
                Ok(Type::Literal(members))
            }
            other => Err(Error::new(
                ErrorImpl::ElementTypeMismatch {
                    expected: Type::Literal(members).to_string(),
                    received: other.to_string(),
                },
                expr.get_span().start.clone(),
            )),
        },
        Some(current) if current == next => Ok(current),
        Some(current) => Err(Error::new(
            ErrorImpl::ElementTypeMismatch {
                expected: current.to_string(),
                received: next.to_string(),
            },
            expr.get_span().start.clone(),
        )),
    }
}

fn type_check_list(checker: &mut TypeChecker, list: &ListExpr) -> Result<Type, Error> {
    let mut element = None;

    for expr in &list.elements {
        let ty = type_check_expr(checker, expr)?;
        element = Some(unify_element(element, ty, expr)?);
    }

    Ok(match element {
        Some(element) => Type::list(element),
        None => Type::EmptyList,
    })
}

fn type_check_map(checker: &mut TypeChecker, map: &MapExpr) -> Result<Type, Error> {
    let mut key = None;
    let mut value = None;

    for (key_expr, value_expr) in &map.entries {
        let ty = type_check_expr(checker, key_expr)?;
        key = Some(unify_element(key, ty, key_expr)?);

        let ty = type_check_expr(checker, value_expr)?;
        value = Some(unify_element(value, ty, value_expr)?);
    }

    Ok(match (key, value) {
        (Some(key), Some(value)) => Type::map(key, value),
        _ => Type::EmptyMap,
    })
}

use std::{rc::Rc, slice::Iter};

use crate::{lexer::tokens::Token, Span};

use super::{
    ast::{ExprWrapper, NodeId, StmtWrapper},
    expressions::SymbolExpr,
    types::Type,
};

#[derive(Debug, Clone)]
pub struct BlockStmt {
    pub body: Vec<StmtWrapper>,
    pub id: NodeId,
    pub span: Span,
}

impl BlockStmt {
    pub fn iter(&self) -> Iter<'_, StmtWrapper> {
        self.body.iter()
    }
}

#[derive(Debug, Clone)]
pub struct ExpressionStmt {
    pub expression: ExprWrapper,
    pub id: NodeId,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct VarDeclStmt {
    pub identifier: String,
    pub explicit_type: Type,
    pub assigned_value: ExprWrapper,
    pub id: NodeId,
    pub span: Span,
}

/// `x = e;` or a compound form such as `x += e;`.
#[derive(Debug, Clone)]
pub struct AssignmentStmt {
    pub assignee: SymbolExpr,
    pub operator: Token,
    pub value: ExprWrapper,
    pub id: NodeId,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct IfStmt {
    pub condition: ExprWrapper,
    pub then_body: Rc<BlockStmt>,
    /// Either a block or a chained `if`.
    pub else_body: Option<StmtWrapper>,
    pub id: NodeId,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct WhileStmt {
    pub condition: ExprWrapper,
    pub body: Rc<BlockStmt>,
    pub id: NodeId,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct RepeatStmt {
    pub count: ExprWrapper,
    pub body: Rc<BlockStmt>,
    pub id: NodeId,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: String,
    pub explicit_type: Type,
    pub id: NodeId,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct FnDeclStmt {
    pub identifier: String,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<Type>,
    pub body: Rc<BlockStmt>,
    pub id: NodeId,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ReturnStmt {
    pub value: Option<ExprWrapper>,
    pub id: NodeId,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct BreakStmt {
    pub id: NodeId,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ContinueStmt {
    pub id: NodeId,
    pub span: Span,
}

/// The signature half of a native function, `native name(p: type): type;`.
#[derive(Debug, Clone)]
pub struct NativeDecl {
    pub identifier: String,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<Type>,
    pub span: Span,
}

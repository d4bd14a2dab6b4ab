use std::{fmt::Display, rc::Rc};

use crate::Span;

use super::{expressions::*, statements::*};

/// Identity of a parse-tree node. Assigned by the parser, unique within one
/// parse, and used to key the analysis side tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Statements are shared between the tree and pending evaluation work.
pub type StmtWrapper = Rc<Stmt>;
/// Expressions are shared between the tree and pending evaluation work.
pub type ExprWrapper = Rc<Expr>;

#[derive(Debug)]
pub enum Stmt {
    Block(Rc<BlockStmt>),
    Expression(ExpressionStmt),
    VarDecl(VarDeclStmt),
    Assignment(AssignmentStmt),
    If(IfStmt),
    While(WhileStmt),
    Repeat(RepeatStmt),
    FnDecl(Rc<FnDeclStmt>),
    Return(ReturnStmt),
    Break(BreakStmt),
    Continue(ContinueStmt),
}

impl Stmt {
    pub fn get_span(&self) -> &Span {
        match self {
            Stmt::Block(stmt) => &stmt.span,
            Stmt::Expression(stmt) => &stmt.span,
            Stmt::VarDecl(stmt) => &stmt.span,
            Stmt::Assignment(stmt) => &stmt.span,
            Stmt::If(stmt) => &stmt.span,
            Stmt::While(stmt) => &stmt.span,
            Stmt::Repeat(stmt) => &stmt.span,
            Stmt::FnDecl(stmt) => &stmt.span,
            Stmt::Return(stmt) => &stmt.span,
            Stmt::Break(stmt) => &stmt.span,
            Stmt::Continue(stmt) => &stmt.span,
        }
    }

    pub fn get_id(&self) -> NodeId {
        match self {
            Stmt::Block(stmt) => stmt.id,
            Stmt::Expression(stmt) => stmt.id,
            Stmt::VarDecl(stmt) => stmt.id,
            Stmt::Assignment(stmt) => stmt.id,
            Stmt::If(stmt) => stmt.id,
            Stmt::While(stmt) => stmt.id,
            Stmt::Repeat(stmt) => stmt.id,
            Stmt::FnDecl(stmt) => stmt.id,
            Stmt::Return(stmt) => stmt.id,
            Stmt::Break(stmt) => stmt.id,
            Stmt::Continue(stmt) => stmt.id,
        }
    }
}

#[derive(Debug)]
pub enum Expr {
    Number(NumberExpr),
    Real(RealExpr),
    Logic(LogicExpr),
    String(StringExpr),
    Interpolation(InterpolationExpr),
    Material(MaterialExpr),
    Enum(EnumExpr),
    Symbol(SymbolExpr),
    Binary(BinaryExpr),
    Prefix(PrefixExpr),
    Index(IndexExpr),
    Call(CallExpr),
    List(ListExpr),
    Map(MapExpr),
}

impl Expr {
    pub fn get_span(&self) -> &Span {
        match self {
            Expr::Number(expr) => &expr.span,
            Expr::Real(expr) => &expr.span,
            Expr::Logic(expr) => &expr.span,
            Expr::String(expr) => &expr.span,
            Expr::Interpolation(expr) => &expr.span,
            Expr::Material(expr) => &expr.span,
            Expr::Enum(expr) => &expr.span,
            Expr::Symbol(expr) => &expr.span,
            Expr::Binary(expr) => &expr.span,
            Expr::Prefix(expr) => &expr.span,
            Expr::Index(expr) => &expr.span,
            Expr::Call(expr) => &expr.span,
            Expr::List(expr) => &expr.span,
            Expr::Map(expr) => &expr.span,
        }
    }

    pub fn get_id(&self) -> NodeId {
        match self {
            Expr::Number(expr) => expr.id,
            Expr::Real(expr) => expr.id,
            Expr::Logic(expr) => expr.id,
            Expr::String(expr) => expr.id,
            Expr::Interpolation(expr) => expr.id,
            Expr::Material(expr) => expr.id,
            Expr::Enum(expr) => expr.id,
            Expr::Symbol(expr) => expr.id,
            Expr::Binary(expr) => expr.id,
            Expr::Prefix(expr) => expr.id,
            Expr::Index(expr) => expr.id,
            Expr::Call(expr) => expr.id,
            Expr::List(expr) => expr.id,
            Expr::Map(expr) => expr.id,
        }
    }
}

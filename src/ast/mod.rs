/// AST (Abstract Syntax Tree) module
/// Contains all definitions related to the parse tree
///
/// Submodules:
/// - ast: Node ids and the statement/expression enums
/// - expressions: Definitions for the expression nodes
/// - statements: Definitions for the statement nodes
/// - types: The structural type values used by annotations and analysis
pub mod ast;
pub mod expressions;
pub mod statements;
pub mod types;

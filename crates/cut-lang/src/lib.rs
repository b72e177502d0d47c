pub mod ast;
mod compile;
mod error;
pub mod functions;
pub mod parse_utils;
mod parser;
pub mod tree;

pub use compile::{compile, compile_with_default};
pub use error::CompileError;
pub use parser::parse_expression;
pub use tree::{ExprNode, ExprTree, NodeId};

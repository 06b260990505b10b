pub mod analysis;
pub mod ast;
pub mod compiled;
pub mod environment;
pub mod evaluator;
pub mod lexer;
pub mod optimizer;
pub mod output;
pub mod parser;
pub mod structs;
pub mod value;
pub mod vector;

#[cfg(feature = "cli")]
pub mod cli;

pub use analysis::referenced_variables;
pub use ast::{Ast, BinOp, ExprKind, NodeId, Path, Position, Token, TokenKind};
pub use compiled::{CompileOptions, CompiledExpression, compile, compile_with};
pub use environment::{Context, Environment};
pub use evaluator::{EvalError, Evaluator, RuntimeError, Scope, TraceFrame};
pub use lexer::{LexError, Lexer};
pub use output::{to_json, to_json_pretty};
pub use parser::{ParseError, Parser};
pub use structs::{HostBindings, MoParams, MoStruct, StructRef, register_host_type};
pub use value::{FromValue, Value};
pub use vector::MolangVec3;

//! # MoLang - Abstract Syntax Tree
//!
//! This module defines the syntax tree for MoLang, the small expression
//! language used by data-driven animation and behavior definitions to compute
//! per-frame values.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens and source positions produced by the lexer
//! - **[path]** - Dotted names (`query.anim_time`) as linked segment chains
//! - **[operators]** - Binary and prefix operators plus their precedence levels
//! - **[expressions]** - The node arena the parser builds and the evaluator walks
//!
//! ## Quick Start
//!
//! ```text
//! v.offset = math.sin(q.anim_time * 90) * 0.5; return v.offset;
//! ```
//!
//! This formula stores a value in the persistent `variable` store and returns it.
//!
//! ## Core Concepts
//!
//! ### Roots
//!
//! Every name starts with a root that selects a store in the environment:
//!
//! - **`math`** - Read-only function library (`math.clamp`, `math.lerp`, ...)
//! - **`variable` / `v`** - Values that persist across evaluations
//! - **`temp` / `t`** - Scratch values cleared after each evaluation
//! - **`context` / `c`** - Read-only values supplied by the caller
//! - **`array`** - Stores whose nested containers are arrays
//!
//! Hosts can add more roots such as `query`.
//!
//! ### Truth
//!
//! There is no boolean type at runtime. `true` is 1, `false` is 0, and a value
//! counts as true when it is a number greater than zero.
//!
//! ## Examples
//!
//! ### Conditional
//!
//! ```text
//! q.is_on_ground ? 0 : math.sin(q.life_time * 360)
//! ```
//!
//! ### Loop
//!
//! ```text
//! t.x = 0; loop(3, { t.x = t.x + 1; }); return t.x;
//! ```
//!
//! ### Fallback
//!
//! ```text
//! v.speed ?? 1
//! ```
pub mod expressions;
pub mod operators;
pub mod path;
pub mod tokens;

pub use expressions::{Ast, ExprKind, ExprMeta, Node, NodeId};
pub use operators::{BinOp, Precedence, UnaryOp};
pub use path::Path;
pub use tokens::{Position, Token, TokenKind};

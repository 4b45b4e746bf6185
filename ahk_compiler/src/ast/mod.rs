//! Abstract syntax tree for AutoHotkey v2 scripts

pub mod nodes;
pub mod visit;

pub use nodes::*;
pub use visit::{walk_body, walk_program, walk_statement, Visitor};

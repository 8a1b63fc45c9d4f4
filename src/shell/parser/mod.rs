pub mod ast;
pub mod lexer;
#[allow(clippy::module_inception)]
mod parser;
pub mod redirect;

pub use ast::{ParsedCommand, Redirection};
pub use parser::Parser;

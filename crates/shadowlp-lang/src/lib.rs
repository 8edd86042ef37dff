pub mod ast;
pub mod compiler;
pub mod lexer;
pub mod parser;

pub use ast::*;
pub use compiler::{CompileError, Compiler, MAX_VARIABLES};
pub use lexer::{Lexer, Span, Token, TokenKind};
pub use parser::{ParseError, Parser};

/// Parse and compile problem text with a default [`Compiler`].
pub fn parse_problem(source: &str) -> Result<shadowlp_solver::LpProblem, CompileError> {
    Compiler::new().compile_source(source)
}

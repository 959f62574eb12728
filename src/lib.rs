//! Rox: a tree‑walking interpreter for a small dynamically‑typed language.
//!
//! The pipeline is `scan → parse → resolve → interpret`.  Each static stage
//! reports every error it finds; interpretation only runs on clean input.

pub mod ast_printer;
pub mod class;
pub mod environment;
pub mod error;
pub mod expr;
pub mod function;
pub mod interpreter;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod stmt;
pub mod token;
pub mod value;

use log::info;
use thiserror::Error;

use error::LoxError;
use interpreter::Interpreter;

/// Why a [`run`] did not complete.
#[derive(Debug, Error)]
pub enum RunError {
    /// Lexical, syntax or resolution errors; nothing was executed.
    #[error("{} static error(s)", .0.len())]
    Static(Vec<LoxError>),

    /// Execution started and stopped at this error.
    #[error(transparent)]
    Runtime(LoxError),
}

/// Push `source` through every stage on `interpreter`.  Globals defined by
/// earlier runs on the same interpreter stay visible.
pub fn run(interpreter: &mut Interpreter, source: &str) -> Result<(), RunError> {
    let tokens = scanner::scan(source).map_err(RunError::Static)?;
    let statements = parser::parse(&tokens).map_err(RunError::Static)?;
    let locals = resolver::resolve(&statements).map_err(RunError::Static)?;

    info!("Static checks passed, running {} statement(s)", statements.len());

    interpreter
        .interpret(&statements, locals)
        .map_err(RunError::Runtime)
}

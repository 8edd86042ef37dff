use std::path::Path;

use log::debug;
use shadowlp_lang::CompileError;
use shadowlp_solver::LpProblem;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Error reading file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid JSON problem: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Compile(#[from] CompileError),
}

/// Read a problem from `path`. Files ending in `.json` hold the serialized
/// [`LpProblem`]; anything else is the textual `Max Z = ...` form.
pub fn load_problem(path: &Path) -> Result<LpProblem, LoadError> {
    let source = std::fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let problem = if is_json {
        serde_json::from_str(&source)?
    } else {
        shadowlp_lang::parse_problem(&source)?
    };

    debug!(
        "loaded {} ({} variables, {} constraints)",
        path.display(),
        problem.variable_count(),
        problem.num_constraints()
    );
    Ok(problem)
}

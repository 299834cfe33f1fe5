use crate::environment::{EnvRef, Environment};
use crate::evaluator::{EvalError, EvalResult, evaluate};
use crate::parser::{ParseError, parse_program, parse_str};
use crate::types::Node;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

pub type Result<T = Node> = std::result::Result<T, Error>;

/// Owns the global root environment. It persists across calls, so bindings
/// changed by one evaluation are visible to the next.
pub struct Interpreter {
    global: EnvRef,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// An interpreter whose root frame holds the builtin procedures.
    pub fn new() -> Self {
        Interpreter {
            global: Environment::new_global_populated(),
        }
    }

    /// An interpreter over a caller-supplied root frame.
    pub fn with_env(global: EnvRef) -> Self {
        Interpreter { global }
    }

    pub fn global(&self) -> &EnvRef {
        &self.global
    }

    /// Evaluates `node` against the global root.
    pub fn evaluate(&self, node: &Node) -> EvalResult {
        evaluate(node, &self.global)
    }

    /// Parses the first expression in `input` and evaluates it.
    pub fn eval_str(&self, input: &str) -> Result {
        let node = parse_str(input)?;
        Ok(self.evaluate(&node)?)
    }

    /// Evaluates every top-level expression in `input` in order, stopping at
    /// the first failure. Returns each expression's value.
    pub fn run_program(&self, input: &str) -> Result<Vec<Node>> {
        let program = parse_program(input)?;
        log::debug!("running program of {} expressions", program.len());
        program
            .iter()
            .map(|node| self.evaluate(node).map_err(Error::from))
            .collect()
    }
}

use crate::source::Span;
use crate::types::{Node, PrimitiveFunc};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EnvError {
    #[error("Unbound variable: '{0}'")]
    UnboundVariable(String, Span), // Symbol name, span where lookup happened
}

/// Shared handle to a frame. Closures and child frames hold these, so a
/// frame lives as long as anything that can still reach it.
pub type EnvRef = Rc<RefCell<Environment>>;

// --- Environment Definition ---

#[derive(Debug)]
pub struct Environment {
    outer: Option<EnvRef>,
    bindings: HashMap<String, Node>, // Maps variable names to Nodes
}

impl Environment {
    /// Creates a new, top-level (global) environment.
    pub fn new() -> EnvRef {
        Rc::new(RefCell::new(Environment {
            outer: None,
            bindings: HashMap::new(),
        }))
    }

    /// Creates a root environment holding the builtin procedures.
    pub fn new_global_populated() -> EnvRef {
        let env_ptr = Environment::new();
        crate::primitives::register_builtins(&mut env_ptr.borrow_mut());
        env_ptr
    }

    /// Creates a new, empty environment enclosed within an outer one.
    pub fn new_enclosed(outer_env: EnvRef) -> EnvRef {
        Rc::new(RefCell::new(Environment {
            outer: Some(outer_env),
            bindings: HashMap::new(),
        }))
    }

    /// Creates a child frame of `outer` pairing `params` with `args` by
    /// position. Pairing stops at the shorter of the two: surplus parameters
    /// stay unbound and surplus arguments are dropped.
    pub fn extend(params: &[String], args: Vec<Node>, outer: EnvRef) -> EnvRef {
        if params.len() != args.len() {
            log::debug!(
                "binding {} arguments to {} parameters; extras ignored",
                args.len(),
                params.len()
            );
        }
        let env_ptr = Environment::new_enclosed(outer);
        {
            let mut env = env_ptr.borrow_mut();
            for (param, arg) in params.iter().zip(args) {
                env.bind(param.clone(), arg);
            }
        }
        env_ptr
    }

    /// Stores a binding in *this* frame, replacing any existing value.
    pub fn bind(&mut self, name: String, value_node: Node) {
        self.bindings.insert(name, value_node);
    }

    /// Whether this frame itself (not its ancestors) binds `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Returns the innermost frame, starting at `env` and walking outward,
    /// whose own bindings contain `name`.
    /// `lookup_span` is where the variable was referenced, for error reporting.
    pub fn find(env: &EnvRef, name: &str, lookup_span: Span) -> Result<EnvRef, EnvError> {
        let mut frame = env.clone();
        loop {
            if frame.borrow().contains(name) {
                return Ok(frame);
            }
            let outer = frame.borrow().outer.clone();
            match outer {
                Some(outer_env) => frame = outer_env,
                // Reached the root without finding it
                None => return Err(EnvError::UnboundVariable(name.to_string(), lookup_span)),
            }
        }
    }

    /// Looks up a variable's value through the chain.
    pub fn lookup(env: &EnvRef, name: &str, lookup_span: Span) -> Result<Node, EnvError> {
        let frame = Environment::find(env, name, lookup_span)?;
        let frame = frame.borrow();
        frame
            .bindings
            .get(name)
            .cloned()
            .ok_or_else(|| EnvError::UnboundVariable(name.to_string(), lookup_span))
    }

    /// Overwrites `name` in the frame `find` locates. Errors if no frame in
    /// the chain binds it yet.
    pub fn set(env: &EnvRef, name: &str, value_node: Node, set_span: Span) -> Result<(), EnvError> {
        let frame = Environment::find(env, name, set_span)?;
        frame.borrow_mut().bind(name.to_string(), value_node);
        Ok(())
    }

    /// Helper to add a primitive procedure to the environment.
    pub(crate) fn add_primitive(&mut self, name: &str, func: PrimitiveFunc) {
        let node = Node::new_primitive(func, name, Span::default());
        self.bind(name.to_string(), node);
    }

    fn add_identifiers(&self, mut identifiers: HashSet<String>) -> HashSet<String> {
        for identifier in self.bindings.keys() {
            identifiers.insert(identifier.to_string());
        }
        match self.outer {
            Some(ref outer_env_ptr) => outer_env_ptr.borrow().add_identifiers(identifiers),
            None => identifiers,
        }
    }

    /// Gets every identifier visible from this environment
    pub fn get_identifiers(&self) -> HashSet<String> {
        self.add_identifiers(HashSet::new())
    }
}

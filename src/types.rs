use crate::environment::EnvRef;
use crate::{evaluator::EvalResult, source::Span};
use std::fmt; // For custom display formatting
use std::rc::Rc;

/// An S-expression together with the source span it came from. Values built
/// by the host (primitive results, registry bindings) carry the span of the
/// call that produced them, or `Span::default()`.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: Sexpr, // The actual S-expression data
    pub span: Span,  // The source span it covers
}

// Two nodes are the same value wherever they were written.
impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Node {
    pub fn new(kind: Sexpr, span: Span) -> Self {
        Node { kind, span }
    }

    pub fn new_integer(n: i64, span: Span) -> Self {
        Node::new(Sexpr::Integer(n), span)
    }

    pub fn new_float(n: f64, span: Span) -> Self {
        Node::new(Sexpr::Float(n), span)
    }

    pub fn new_symbol(s: impl Into<String>, span: Span) -> Self {
        Node::new(Sexpr::Symbol(s.into()), span)
    }

    pub fn new_bool(b: bool, span: Span) -> Self {
        Node::new(Sexpr::Boolean(b), span)
    }

    pub fn new_list(elements: Vec<Node>, span: Span) -> Self {
        Node::new(Sexpr::List(elements), span)
    }

    /// The empty list `()`.
    pub fn new_nil(span: Span) -> Self {
        Node::new_list(Vec::new(), span)
    }

    pub fn new_primitive(func: PrimitiveFunc, name: &str, span: Span) -> Self {
        Node::new(
            Sexpr::Procedure(Procedure::Primitive(func, name.to_string())),
            span,
        )
    }

    pub fn new_lambda(params: Vec<String>, body: Node, env: EnvRef, span: Span) -> Self {
        Node::new(
            Sexpr::Procedure(Procedure::Lambda(Rc::new(Lambda { params, body, env }))),
            span,
        )
    }

    pub fn is_truthy(&self) -> bool {
        self.kind.is_truthy()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Delegate to Sexpr's Display implementation
        write!(f, "{}", self.kind)
    }
}

/// Represents an S-expression (Symbolic Expression).
/// The same type serves as parsed code and as runtime data.
#[derive(Debug, Clone, PartialEq)]
pub enum Sexpr {
    Integer(i64),    // e.g., 42, -7
    Float(f64),      // e.g., 2.5, 1e3
    Symbol(String),  // e.g., +, variable-name, quote
    List(Vec<Node>), // e.g., (+ 1 2), (define x 10), ()
    Boolean(bool),   // Only produced by host predicates and comparisons
    Procedure(Procedure),
}

impl Sexpr {
    /// `0`, `0.0`, false and the empty list are falsy; everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Sexpr::Integer(n) => *n != 0,
            Sexpr::Float(n) => *n != 0.0,
            Sexpr::Boolean(b) => *b,
            Sexpr::List(elements) => !elements.is_empty(),
            Sexpr::Symbol(_) | Sexpr::Procedure(_) => true,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Sexpr::Integer(_) => "integer",
            Sexpr::Float(_) => "float",
            Sexpr::Symbol(_) => "symbol",
            Sexpr::Boolean(_) => "boolean",
            Sexpr::List(_) => "list",
            Sexpr::Procedure(_) => "procedure",
        }
    }
}

// Lists render their elements back to back with no separator, so `(1 2)`
// prints as `(12)`. Callers that need re-readable output must not rely on it.
impl fmt::Display for Sexpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sexpr::Integer(n) => write!(f, "{}", n),
            // Debug keeps the fractional part: 2.0 prints as "2.0", not "2"
            Sexpr::Float(n) => write!(f, "{:?}", n),
            Sexpr::Symbol(s) => write!(f, "{}", s),
            Sexpr::Boolean(b) => write!(f, "{}", if *b { "#t" } else { "#f" }),
            Sexpr::List(list) => {
                write!(f, "(")?;
                for expr in list {
                    write!(f, "{}", expr)?;
                }
                write!(f, ")")
            }
            Sexpr::Procedure(procedure) => match procedure {
                Procedure::Primitive(_, name) => write!(f, "#<primitive:{}>", name),
                Procedure::Lambda(_) => write!(f, "#<lambda>"),
            },
        }
    }
}

pub type PrimitiveFunc = fn(Vec<Node>, Span) -> EvalResult;

/// A user closure: parameter names, a body, and the frame it was created in.
pub struct Lambda {
    pub params: Vec<String>,
    pub body: Node,
    pub env: EnvRef,
}

#[derive(Clone)] // Need Clone for Sexpr::Procedure
pub enum Procedure {
    Primitive(PrimitiveFunc, String), // The function pointer and its name (for display/debug)
    Lambda(Rc<Lambda>),
}

// The captured environment is left out: it may contain this very procedure.
impl fmt::Debug for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Procedure::Primitive(_, name) => write!(f, "Primitive({})", name),
            Procedure::Lambda(lambda) => write!(f, "Lambda({:?})", lambda.params),
        }
    }
}

// Primitives compare by name, closures by identity.
impl PartialEq for Procedure {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Procedure::Primitive(_, n1), Procedure::Primitive(_, n2)) => n1 == n2,
            (Procedure::Lambda(l1), Procedure::Lambda(l2)) => Rc::ptr_eq(l1, l2),
            _ => false,
        }
    }
}

use crate::environment::{EnvError, EnvRef, Environment};
use crate::source::Span;
use crate::types::{Node, Procedure, Sexpr};
use std::collections::HashSet;
use thiserror::Error;

// --- Evaluation Error ---
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error(transparent)]
    EnvError(#[from] EnvError), // Errors from environment lookup
    #[error("Evaluation Error: Expected a procedure, but got: {0}")]
    NotAProcedure(Sexpr, Span), // Tried to call something that isn't a procedure
    #[error("Evaluation Error: Invalid arguments - {0}")]
    InvalidArguments(String, Span), // Wrong count or type of args to a primitive
    #[error("Evaluation Error: Expected a symbol, but got: {0}")]
    NotASymbol(Sexpr, Span), // Expected a symbol (e.g., for define/set!)
    #[error("Evaluation Error: Invalid special form - {0}")]
    InvalidSpecialForm(String, Span), // Malformed special form (e.g., (if cond))
    #[error("Evaluation Error: Cannot evaluate the empty list")]
    EmptyApplication(Span),
}

impl EvalError {
    pub fn span(&self) -> Span {
        match self {
            EvalError::EnvError(EnvError::UnboundVariable(_, span))
            | EvalError::NotAProcedure(_, span)
            | EvalError::InvalidArguments(_, span)
            | EvalError::NotASymbol(_, span)
            | EvalError::InvalidSpecialForm(_, span)
            | EvalError::EmptyApplication(span) => *span,
        }
    }
}

// Result type alias for convenience
pub type EvalResult<T = Node> = Result<T, EvalError>;

const SPECIAL_FORMS: [&str; 6] = ["quote", "if", "set!", "define", "lambda", "begin"];

pub fn special_form_identifiers() -> HashSet<String> {
    SPECIAL_FORMS.iter().map(|s| s.to_string()).collect()
}

// --- Evaluate Function ---

/// Evaluates a given AST Node within the specified environment.
///
/// Evaluation is plain recursion with no tail-call elimination, so deeply
/// recursive programs are limited by the native stack.
pub fn evaluate(node: &Node, env: &EnvRef) -> EvalResult {
    log::trace!("evaluate {}", node);

    match &node.kind {
        // 1. Symbols: Look up in the environment
        Sexpr::Symbol(name) => Ok(Environment::lookup(env, name, node.span)?),

        // 2. Lists: special forms or procedure calls
        Sexpr::List(elements) => match elements.split_first() {
            Some((first, rest)) => match &first.kind {
                Sexpr::Symbol(keyword) => match keyword.as_str() {
                    "quote" => evaluate_quote(rest, node.span),
                    "if" => evaluate_if(rest, env, node.span),
                    "set!" | "define" => evaluate_assignment(keyword, rest, env, node.span),
                    "lambda" => evaluate_lambda(rest, env, node.span),
                    "begin" => evaluate_begin(rest, env, node.span),
                    _ => evaluate_application(elements, env, node.span),
                },
                _ => evaluate_application(elements, env, node.span),
            },
            None => Err(EvalError::EmptyApplication(node.span)),
        },

        // 3. Everything else evaluates to itself
        Sexpr::Integer(_) | Sexpr::Float(_) | Sexpr::Boolean(_) | Sexpr::Procedure(_) => {
            Ok(node.clone())
        }
    }
}

fn evaluate_quote(operands: &[Node], span: Span) -> EvalResult {
    if let [node] = operands {
        // Quote returns the operand unevaluated.
        Ok(node.clone())
    } else {
        Err(EvalError::InvalidSpecialForm(
            "quote expects exactly one argument".to_string(),
            span, // Use the span of the whole (quote ...) form
        ))
    }
}

fn evaluate_if(operands: &[Node], env: &EnvRef, span: Span) -> EvalResult {
    if let [condition, consequent, alternate] = operands {
        if evaluate(condition, env)?.is_truthy() {
            evaluate(consequent, env)
        } else {
            evaluate(alternate, env)
        }
    } else {
        Err(EvalError::InvalidSpecialForm(
            "if expects a condition, a consequent and an alternate".to_string(),
            span, // Span of the whole (if ...) form
        ))
    }
}

// `define` shares this path with `set!`: the target must already be bound
// somewhere in the chain, and the frame that binds it is overwritten.
fn evaluate_assignment(keyword: &str, operands: &[Node], env: &EnvRef, span: Span) -> EvalResult {
    let [target, expr] = operands else {
        return Err(EvalError::InvalidSpecialForm(
            format!("{} expects a variable and an expression", keyword),
            span,
        ));
    };
    let Sexpr::Symbol(name) = &target.kind else {
        return Err(EvalError::NotASymbol(target.kind.clone(), target.span));
    };

    let value = evaluate(expr, env)?;
    log::debug!("{} {} = {}", keyword, name, value);
    Environment::set(env, name, value, target.span)?;
    Ok(Node::new_nil(span))
}

fn evaluate_lambda(operands: &[Node], env: &EnvRef, span: Span) -> EvalResult {
    let [params, body] = operands else {
        return Err(EvalError::InvalidSpecialForm(
            "lambda expects a parameter list and a body".to_string(),
            span,
        ));
    };
    let Sexpr::List(param_nodes) = &params.kind else {
        return Err(EvalError::InvalidSpecialForm(
            format!("lambda parameters must be a list, got {}", params.kind.type_name()),
            params.span,
        ));
    };

    let names = param_nodes
        .iter()
        .map(|param| match &param.kind {
            Sexpr::Symbol(name) => Ok(name.clone()),
            other => Err(EvalError::NotASymbol(other.clone(), param.span)),
        })
        .collect::<EvalResult<Vec<String>>>()?;

    // Capture the current frame by reference, not by copy
    Ok(Node::new_lambda(names, body.clone(), env.clone(), span))
}

fn evaluate_begin(operands: &[Node], env: &EnvRef, span: Span) -> EvalResult {
    let Some((last, init)) = operands.split_last() else {
        return Err(EvalError::InvalidSpecialForm(
            "begin expects at least one expression".to_string(),
            span,
        ));
    };
    for expr in init {
        evaluate(expr, env)?;
    }
    evaluate(last, env)
}

// Operator and operands are all evaluated, left to right, before the
// operator is checked for callability.
fn evaluate_application(elements: &[Node], env: &EnvRef, span: Span) -> EvalResult {
    let mut values = elements
        .iter()
        .map(|element| evaluate(element, env))
        .collect::<EvalResult<Vec<Node>>>()?;
    let operator = values.remove(0);
    apply(operator, values, span)
}

/// Invokes a procedure value with already-evaluated arguments.
pub fn apply(operator: Node, args: Vec<Node>, span: Span) -> EvalResult {
    match operator.kind {
        Sexpr::Procedure(Procedure::Primitive(func, name)) => {
            log::trace!("call primitive {} with {} args", name, args.len());
            let result = func(args, span);
            if let Err(e) = &result {
                log::trace!("call to {} failed: {}", name, e);
            }
            result
        }
        Sexpr::Procedure(Procedure::Lambda(lambda)) => {
            log::trace!("call lambda {:?} with {} args", lambda.params, args.len());
            let frame = Environment::extend(&lambda.params, args, lambda.env.clone());
            evaluate(&lambda.body, &frame)
        }
        other => Err(EvalError::NotAProcedure(other, operator.span)),
    }
}

//! Builtin procedures bound into the root environment: arithmetic,
//! comparison, list operations, predicates and the math library.

use std::cmp::Ordering;

use crate::environment::Environment;
use crate::{EvalError, EvalResult, Node, Procedure, Sexpr, Span};

/// Binds every builtin procedure and constant into `env`.
pub fn register_builtins(env: &mut Environment) {
    env.add_primitive("+", prim_add);
    env.add_primitive("-", prim_sub);
    env.add_primitive("*", prim_mul);
    env.add_primitive("/", prim_div);
    env.add_primitive("=", prim_equals);
    env.add_primitive("<", prim_less_than);
    env.add_primitive("<=", prim_less_than_or_equals);
    env.add_primitive(">", prim_greater_than);
    env.add_primitive(">=", prim_greater_than_or_equals);
    env.add_primitive("equal?", prim_is_equal);
    env.add_primitive("eq?", prim_is_eq);
    env.add_primitive("not", prim_not);

    // --- List Primitives ---
    env.add_primitive("cons", prim_cons);
    env.add_primitive("car", prim_car);
    env.add_primitive("cdr", prim_cdr);
    env.add_primitive("append", prim_append);
    env.add_primitive("list", prim_list);
    env.add_primitive("length", prim_length);

    // --- Type Predicates ---
    env.add_primitive("list?", prim_is_list);
    env.add_primitive("null?", prim_is_null);
    env.add_primitive("symbol?", prim_is_symbol);

    // --- Math Library ---
    env.add_primitive("sqrt", prim_sqrt);
    env.add_primitive("exp", prim_exp);
    env.add_primitive("expm1", prim_expm1);
    env.add_primitive("log", prim_log);
    env.add_primitive("log10", prim_log10);
    env.add_primitive("log1p", prim_log1p);
    env.add_primitive("sin", prim_sin);
    env.add_primitive("cos", prim_cos);
    env.add_primitive("tan", prim_tan);
    env.add_primitive("asin", prim_asin);
    env.add_primitive("acos", prim_acos);
    env.add_primitive("atan", prim_atan);
    env.add_primitive("sinh", prim_sinh);
    env.add_primitive("cosh", prim_cosh);
    env.add_primitive("tanh", prim_tanh);
    env.add_primitive("asinh", prim_asinh);
    env.add_primitive("acosh", prim_acosh);
    env.add_primitive("atanh", prim_atanh);
    env.add_primitive("floor", prim_floor);
    env.add_primitive("ceil", prim_ceil);
    env.add_primitive("fabs", prim_fabs);
    env.add_primitive("degrees", prim_degrees);
    env.add_primitive("radians", prim_radians);
    env.add_primitive("trunc", prim_trunc);
    env.add_primitive("pow", prim_pow);
    env.add_primitive("atan2", prim_atan2);
    env.add_primitive("hypot", prim_hypot);
    env.add_primitive("fmod", prim_fmod);
    env.add_primitive("copysign", prim_copysign);
    env.add_primitive("isnan", prim_isnan);
    env.add_primitive("isinf", prim_isinf);
    env.add_primitive("factorial", prim_factorial);

    env.bind("pi".to_string(), Node::new_float(std::f64::consts::PI, Span::default()));
    env.bind("e".to_string(), Node::new_float(std::f64::consts::E, Span::default()));
}

// Checks the number of arguments
macro_rules! check_arity {
    ($args:expr, $expected:expr, $span:expr, $name:expr) => {
        if $args.len() != $expected {
            return Err(EvalError::InvalidArguments(
                format!(
                    "Primitive '{}' expects exactly {} arguments, got {}",
                    $name,
                    $expected,
                    $args.len()
                ),
                $span,
            ));
        }
    };
    // Variant for minimum number of args
    ($args:expr, min $expected:expr, $span:expr, $name:expr) => {
        if $args.len() < $expected {
            return Err(EvalError::InvalidArguments(
                format!(
                    "Primitive '{}' expects at least {} arguments, got {}",
                    $name,
                    $expected,
                    $args.len()
                ),
                $span,
            ));
        }
    };
    // Variant for range of args (inclusive)
    ($args:expr, $min:expr, $max:expr, $span:expr, $name:expr) => {
        if !($min..=$max).contains(&$args.len()) {
            return Err(EvalError::InvalidArguments(
                format!(
                    "Primitive '{}' expects between {} and {} arguments, got {}",
                    $name,
                    $min,
                    $max,
                    $args.len()
                ),
                $span,
            ));
        }
    };
}

// --- Numbers ---

/// Host numeric tower. Booleans count as 0 and 1.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn as_f64(self) -> f64 {
        match self {
            Number::Int(n) => n as f64,
            Number::Float(n) => n,
        }
    }

    fn into_node(self, span: Span) -> Node {
        match self {
            Number::Int(n) => Node::new_integer(n, span),
            Number::Float(n) => Node::new_float(n, span),
        }
    }

    fn compare(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => Some(a.cmp(&b)),
            (a, b) => a.as_f64().partial_cmp(&b.as_f64()),
        }
    }
}

fn as_number(kind: &Sexpr) -> Option<Number> {
    match kind {
        Sexpr::Integer(n) => Some(Number::Int(*n)),
        Sexpr::Float(n) => Some(Number::Float(*n)),
        Sexpr::Boolean(b) => Some(Number::Int(*b as i64)),
        _ => None,
    }
}

fn expect_number(node: &Node, span: Span, name: &str, arg_pos: usize) -> EvalResult<Number> {
    as_number(&node.kind).ok_or_else(|| {
        EvalError::InvalidArguments(
            format!(
                "Primitive '{}' expects a number for argument {}, got {}",
                name,
                arg_pos,
                node.kind.type_name()
            ),
            span, // Use call span for arg type errors
        )
    })
}

fn expect_list<'a>(node: &'a Node, span: Span, name: &str, arg_pos: usize) -> EvalResult<&'a [Node]> {
    match &node.kind {
        Sexpr::List(elements) => Ok(elements.as_slice()),
        other => Err(EvalError::InvalidArguments(
            format!(
                "Primitive '{}' expects a list for argument {}, got {}",
                name,
                arg_pos,
                other.type_name()
            ),
            span,
        )),
    }
}

/// Integer op when both sides are integers (checked), float op otherwise.
fn combine(
    left: Number,
    right: Number,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
    span: Span,
    operator: &str,
) -> EvalResult<Number> {
    match (left, right) {
        (Number::Int(a), Number::Int(b)) => int_op(a, b).map(Number::Int).ok_or_else(|| {
            EvalError::InvalidArguments(format!("Integer overflow in '{}'", operator), span)
        }),
        (a, b) => Ok(Number::Float(float_op(a.as_f64(), b.as_f64()))),
    }
}

fn fold_numbers(
    args: &[Node],
    span: Span,
    start: Number,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
    operator: &str,
    first_pos: usize,
) -> EvalResult {
    let mut acc = start;
    for (i, node) in args.iter().enumerate() {
        let num = expect_number(node, span, operator, i + first_pos)?;
        acc = combine(acc, num, int_op, float_op, span, operator)?;
    }
    // Result needs to be a Node with a span. Use the call span.
    Ok(acc.into_node(span))
}

pub fn prim_add(args: Vec<Node>, span: Span) -> EvalResult {
    // (+) -> 0
    // (+ 1 2 3) -> 6
    // (+ (list 1) (list 2)) -> (1 2)
    if matches!(args.first(), Some(Node { kind: Sexpr::List(_), .. })) {
        let mut elements = Vec::new();
        for (i, node) in args.iter().enumerate() {
            elements.extend_from_slice(expect_list(node, span, "+", i + 1)?);
        }
        return Ok(Node::new_list(elements, span));
    }
    fold_numbers(&args, span, Number::Int(0), i64::checked_add, |a, b| a + b, "+", 1)
}

pub fn prim_sub(args: Vec<Node>, span: Span) -> EvalResult {
    // (- x) -> -x
    // (- x y z) -> x - y - z
    check_arity!(args, min 1, span, "-");
    let first_num = expect_number(&args[0], span, "-", 1)?;

    if args.len() == 1 {
        let negated = combine(Number::Int(0), first_num, i64::checked_sub, |a, b| a - b, span, "-")?;
        Ok(negated.into_node(span))
    } else {
        fold_numbers(&args[1..], span, first_num, i64::checked_sub, |a, b| a - b, "-", 2)
    }
}

pub fn prim_mul(args: Vec<Node>, span: Span) -> EvalResult {
    // (*) -> 1
    // (* 1 2 3) -> 6
    fold_numbers(&args, span, Number::Int(1), i64::checked_mul, |a, b| a * b, "*", 1)
}

pub fn prim_div(args: Vec<Node>, span: Span) -> EvalResult {
    // (/ x) -> 1/x
    // (/ x y z) -> x / y / z
    // Always true division: (/ 7 2) -> 3.5
    check_arity!(args, min 1, span, "/");
    let first_num = expect_number(&args[0], span, "/", 1)?.as_f64();

    let (mut result, divisors) = if args.len() == 1 {
        (1.0, &args[..])
    } else {
        (first_num, &args[1..])
    };
    let first_pos = args.len() - divisors.len() + 1;
    for (i, node) in divisors.iter().enumerate() {
        let num = expect_number(node, span, "/", i + first_pos)?.as_f64();
        if num == 0.0 {
            return Err(EvalError::InvalidArguments(
                "Division by zero".to_string(),
                span,
            ));
        }
        result /= num;
    }
    Ok(Node::new_float(result, span))
}

fn compare_numbers(
    args: Vec<Node>,
    span: Span,
    accept: fn(Ordering) -> bool,
    operator: &str,
) -> EvalResult {
    // (< n1 n2 ...) -> boolean, true when every adjacent pair satisfies it
    check_arity!(args, min 2, span, operator);
    let numbers = args
        .iter()
        .enumerate()
        .map(|(i, node)| expect_number(node, span, operator, i + 1))
        .collect::<EvalResult<Vec<Number>>>()?;
    let result = numbers
        .windows(2)
        .all(|pair| pair[0].compare(pair[1]).is_some_and(accept));
    Ok(Node::new_bool(result, span))
}

pub fn prim_less_than(args: Vec<Node>, span: Span) -> EvalResult {
    compare_numbers(args, span, |o| o == Ordering::Less, "<")
}

pub fn prim_less_than_or_equals(args: Vec<Node>, span: Span) -> EvalResult {
    compare_numbers(args, span, |o| o != Ordering::Greater, "<=")
}

pub fn prim_greater_than(args: Vec<Node>, span: Span) -> EvalResult {
    compare_numbers(args, span, |o| o == Ordering::Greater, ">")
}

pub fn prim_greater_than_or_equals(args: Vec<Node>, span: Span) -> EvalResult {
    compare_numbers(args, span, |o| o != Ordering::Less, ">=")
}

// --- Equality ---

/// Structural equality. Numbers compare by value across integer and float.
fn values_equal(left: &Sexpr, right: &Sexpr) -> bool {
    if let (Some(a), Some(b)) = (as_number(left), as_number(right)) {
        return a.compare(b) == Some(Ordering::Equal);
    }
    match (left, right) {
        (Sexpr::List(a), Sexpr::List(b)) => {
            a.len() == b.len()
                && a.iter()
                    .zip(b.iter())
                    .all(|(x, y)| values_equal(&x.kind, &y.kind))
        }
        (Sexpr::Symbol(a), Sexpr::Symbol(b)) => a == b,
        (Sexpr::Procedure(a), Sexpr::Procedure(b)) => a == b,
        _ => false,
    }
}

/// Identity: atoms by value, `()` with itself, closures by pointer,
/// primitives by name. Distinct non-empty lists are never identical.
fn values_identical(left: &Sexpr, right: &Sexpr) -> bool {
    match (left, right) {
        (Sexpr::List(a), Sexpr::List(b)) => a.is_empty() && b.is_empty(),
        (Sexpr::Procedure(a), Sexpr::Procedure(b)) => match (a, b) {
            (Procedure::Lambda(_), Procedure::Lambda(_)) => a == b,
            (Procedure::Primitive(_, n1), Procedure::Primitive(_, n2)) => n1 == n2,
            _ => false,
        },
        _ => values_equal(left, right),
    }
}

pub fn prim_equals(args: Vec<Node>, span: Span) -> EvalResult {
    // (= a b ...) -> #t when all adjacent values are equal
    check_arity!(args, min 2, span, "=");
    let result = args
        .windows(2)
        .all(|pair| values_equal(&pair[0].kind, &pair[1].kind));
    Ok(Node::new_bool(result, span))
}

pub fn prim_is_equal(args: Vec<Node>, span: Span) -> EvalResult {
    check_arity!(args, 2, span, "equal?");
    Ok(Node::new_bool(values_equal(&args[0].kind, &args[1].kind), span))
}

pub fn prim_is_eq(args: Vec<Node>, span: Span) -> EvalResult {
    check_arity!(args, 2, span, "eq?");
    Ok(Node::new_bool(
        values_identical(&args[0].kind, &args[1].kind),
        span,
    ))
}

pub fn prim_not(args: Vec<Node>, span: Span) -> EvalResult {
    check_arity!(args, 1, span, "not");
    Ok(Node::new_bool(!args[0].is_truthy(), span))
}

// --- List Primitives ---

pub fn prim_cons(args: Vec<Node>, span: Span) -> EvalResult {
    // (cons item list) -> (item ..list)
    check_arity!(args, 2, span, "cons");
    let tail = expect_list(&args[1], span, "cons", 2)?;
    let mut elements = Vec::with_capacity(tail.len() + 1);
    elements.push(args[0].clone());
    elements.extend_from_slice(tail);
    Ok(Node::new_list(elements, span))
}

pub fn prim_car(args: Vec<Node>, span: Span) -> EvalResult {
    // (car list) -> first item
    check_arity!(args, 1, span, "car");
    match expect_list(&args[0], span, "car", 1)?.first() {
        Some(first) => Ok(first.clone()),
        None => Err(EvalError::InvalidArguments(
            "car: Cannot take car of empty list".to_string(),
            args[0].span,
        )),
    }
}

pub fn prim_cdr(args: Vec<Node>, span: Span) -> EvalResult {
    // (cdr list) -> rest of list; (cdr '()) -> ()
    check_arity!(args, 1, span, "cdr");
    let elements = expect_list(&args[0], span, "cdr", 1)?;
    let rest = elements.get(1..).unwrap_or_default().to_vec();
    Ok(Node::new_list(rest, span))
}

pub fn prim_append(args: Vec<Node>, span: Span) -> EvalResult {
    // (append '(1) '(2 3) '()) -> (1 2 3)
    let mut elements = Vec::new();
    for (i, node) in args.iter().enumerate() {
        elements.extend_from_slice(expect_list(node, span, "append", i + 1)?);
    }
    Ok(Node::new_list(elements, span))
}

pub fn prim_list(args: Vec<Node>, span: Span) -> EvalResult {
    // (list item1 item2 ...) -> new list containing items
    Ok(Node::new_list(args, span))
}

pub fn prim_length(args: Vec<Node>, span: Span) -> EvalResult {
    check_arity!(args, 1, span, "length");
    let len = match &args[0].kind {
        Sexpr::List(elements) => elements.len(),
        // Symbols are text, so they have a length too
        Sexpr::Symbol(s) => s.chars().count(),
        other => {
            return Err(EvalError::InvalidArguments(
                format!("Primitive 'length' expects a list, got {}", other.type_name()),
                span,
            ));
        }
    };
    Ok(Node::new_integer(len as i64, span))
}

// --- Type Predicates ---

pub fn prim_is_list(args: Vec<Node>, span: Span) -> EvalResult {
    check_arity!(args, 1, span, "list?");
    Ok(Node::new_bool(matches!(args[0].kind, Sexpr::List(_)), span))
}

pub fn prim_is_null(args: Vec<Node>, span: Span) -> EvalResult {
    // (null? obj) -> #t only for the empty list
    check_arity!(args, 1, span, "null?");
    let is_null = matches!(&args[0].kind, Sexpr::List(elements) if elements.is_empty());
    Ok(Node::new_bool(is_null, span))
}

pub fn prim_is_symbol(args: Vec<Node>, span: Span) -> EvalResult {
    check_arity!(args, 1, span, "symbol?");
    Ok(Node::new_bool(matches!(args[0].kind, Sexpr::Symbol(_)), span))
}

// --- Math Library ---

// NaN out of non-NaN input means the argument was outside the domain; an
// infinity out of finite input is a pole or an overflow.
fn float_result(value: f64, inputs: &[f64], span: Span, name: &str) -> EvalResult {
    if value.is_nan() && !inputs.iter().any(|x| x.is_nan()) {
        return Err(EvalError::InvalidArguments(
            format!("{}: math domain error", name),
            span,
        ));
    }
    if value.is_infinite() && inputs.iter().all(|x| x.is_finite()) {
        return Err(EvalError::InvalidArguments(
            format!("{}: math range error", name),
            span,
        ));
    }
    Ok(Node::new_float(value, span))
}

macro_rules! math_unary {
    ($fn_name:ident, $name:expr, $op:expr) => {
        pub fn $fn_name(args: Vec<Node>, span: Span) -> EvalResult {
            check_arity!(args, 1, span, $name);
            let x = expect_number(&args[0], span, $name, 1)?.as_f64();
            float_result($op(x), &[x], span, $name)
        }
    };
}

macro_rules! math_binary {
    ($fn_name:ident, $name:expr, $op:expr) => {
        pub fn $fn_name(args: Vec<Node>, span: Span) -> EvalResult {
            check_arity!(args, 2, span, $name);
            let x = expect_number(&args[0], span, $name, 1)?.as_f64();
            let y = expect_number(&args[1], span, $name, 2)?.as_f64();
            float_result($op(x, y), &[x, y], span, $name)
        }
    };
}

math_unary!(prim_sqrt, "sqrt", f64::sqrt);
math_unary!(prim_exp, "exp", f64::exp);
math_unary!(prim_expm1, "expm1", f64::exp_m1);
math_unary!(prim_log10, "log10", f64::log10);
math_unary!(prim_log1p, "log1p", f64::ln_1p);
math_unary!(prim_sin, "sin", f64::sin);
math_unary!(prim_cos, "cos", f64::cos);
math_unary!(prim_tan, "tan", f64::tan);
math_unary!(prim_asin, "asin", f64::asin);
math_unary!(prim_acos, "acos", f64::acos);
math_unary!(prim_atan, "atan", f64::atan);
math_unary!(prim_sinh, "sinh", f64::sinh);
math_unary!(prim_cosh, "cosh", f64::cosh);
math_unary!(prim_tanh, "tanh", f64::tanh);
math_unary!(prim_asinh, "asinh", f64::asinh);
math_unary!(prim_acosh, "acosh", f64::acosh);
math_unary!(prim_atanh, "atanh", f64::atanh);
math_unary!(prim_floor, "floor", f64::floor);
math_unary!(prim_ceil, "ceil", f64::ceil);
math_unary!(prim_fabs, "fabs", f64::abs);
math_unary!(prim_degrees, "degrees", f64::to_degrees);
math_unary!(prim_radians, "radians", f64::to_radians);

math_binary!(prim_pow, "pow", f64::powf);
math_binary!(prim_atan2, "atan2", f64::atan2);
math_binary!(prim_hypot, "hypot", f64::hypot);
math_binary!(prim_fmod, "fmod", |x: f64, y: f64| x % y);
math_binary!(prim_copysign, "copysign", f64::copysign);

pub fn prim_log(args: Vec<Node>, span: Span) -> EvalResult {
    // (log x) -> ln x; (log x base)
    check_arity!(args, 1, 2, span, "log");
    let x = expect_number(&args[0], span, "log", 1)?.as_f64();
    match args.get(1) {
        Some(base_node) => {
            let base = expect_number(base_node, span, "log", 2)?.as_f64();
            float_result(x.ln() / base.ln(), &[x, base], span, "log")
        }
        None => float_result(x.ln(), &[x], span, "log"),
    }
}

pub fn prim_trunc(args: Vec<Node>, span: Span) -> EvalResult {
    // Truncates toward zero, giving an integer
    check_arity!(args, 1, span, "trunc");
    match expect_number(&args[0], span, "trunc", 1)? {
        Number::Int(n) => Ok(Node::new_integer(n, span)),
        Number::Float(n) if n.is_finite() && n.trunc().abs() < i64::MAX as f64 => {
            Ok(Node::new_integer(n.trunc() as i64, span))
        }
        Number::Float(n) => Err(EvalError::InvalidArguments(
            format!("trunc: cannot convert {} to an integer", n),
            span,
        )),
    }
}

pub fn prim_isnan(args: Vec<Node>, span: Span) -> EvalResult {
    check_arity!(args, 1, span, "isnan");
    let x = expect_number(&args[0], span, "isnan", 1)?.as_f64();
    Ok(Node::new_bool(x.is_nan(), span))
}

pub fn prim_isinf(args: Vec<Node>, span: Span) -> EvalResult {
    check_arity!(args, 1, span, "isinf");
    let x = expect_number(&args[0], span, "isinf", 1)?.as_f64();
    Ok(Node::new_bool(x.is_infinite(), span))
}

pub fn prim_factorial(args: Vec<Node>, span: Span) -> EvalResult {
    check_arity!(args, 1, span, "factorial");
    let n = match expect_number(&args[0], span, "factorial", 1)? {
        Number::Int(n) if n >= 0 => n,
        Number::Float(f) if f >= 0.0 && f.fract() == 0.0 && f < i64::MAX as f64 => f as i64,
        _ => {
            return Err(EvalError::InvalidArguments(
                "factorial: only accepts non-negative integral values".to_string(),
                span,
            ));
        }
    };
    (1..=n)
        .try_fold(1i64, |acc, k| acc.checked_mul(k))
        .map(|result| Node::new_integer(result, span))
        .ok_or_else(|| EvalError::InvalidArguments("Integer overflow in 'factorial'".to_string(), span))
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::EnvRef;
    use crate::evaluator::evaluate;
    use crate::parser::parse_str;

    fn global() -> EnvRef {
        Environment::new_global_populated()
    }

    fn eval_in(input: &str, env: &EnvRef) -> EvalResult {
        let node = parse_str(input).unwrap_or_else(|e| panic!("Parsing failed for '{}': {}", input, e));
        evaluate(&node, env)
    }

    fn assert_eval_kind(input: &str, expected_kind: Sexpr) {
        match eval_in(input, &global()) {
            Ok(result) => assert_eq!(result.kind, expected_kind, "Input: '{}'", input),
            Err(e) => panic!("Evaluation failed for input '{}': {}", input, e),
        }
    }

    fn assert_eval_display(input: &str, expected: &str) {
        match eval_in(input, &global()) {
            Ok(result) => assert_eq!(result.to_string(), expected, "Input: '{}'", input),
            Err(e) => panic!("Evaluation failed for input '{}': {}", input, e),
        }
    }

    fn assert_invalid_arguments(input: &str) {
        match eval_in(input, &global()) {
            Err(EvalError::InvalidArguments(_, _)) => {}
            other => panic!("Expected InvalidArguments for '{}', got {:?}", input, other),
        }
    }

    fn assert_float(input: &str, expected: f64) {
        match eval_in(input, &global()) {
            Ok(Node {
                kind: Sexpr::Float(n),
                ..
            }) => assert!((n - expected).abs() < 1e-9, "Input: '{}', got {}", input, n),
            other => panic!("Expected a float for '{}', got {:?}", input, other),
        }
    }

    #[test]
    fn test_registry_names_are_callable() {
        let env = global();
        for name in [
            "+", "-", "*", "/", ">", "<", ">=", "<=", "=", "equal?", "eq?", "cons", "car", "cdr",
            "append", "list", "list?", "null?", "length", "symbol?", "not", "sqrt", "sin", "pow",
        ] {
            let value = Environment::lookup(&env, name, Span::default())
                .unwrap_or_else(|e| panic!("'{}' should be bound: {}", name, e));
            assert!(
                matches!(value.kind, Sexpr::Procedure(Procedure::Primitive(_, _))),
                "'{}' should be a primitive",
                name
            );
        }
    }

    #[test]
    fn test_arithmetic_integers() {
        assert_eval_kind("(+ 1 2)", Sexpr::Integer(3));
        assert_eval_kind("(+ 10 20 30 40)", Sexpr::Integer(100));
        assert_eval_kind("(+)", Sexpr::Integer(0));
        assert_eval_kind("(- 10 3)", Sexpr::Integer(7));
        assert_eval_kind("(- 5)", Sexpr::Integer(-5));
        assert_eval_kind("(- 10 3 2)", Sexpr::Integer(5));
        assert_eval_kind("(* 2 3 4)", Sexpr::Integer(24));
        assert_eval_kind("(*)", Sexpr::Integer(1));
    }

    #[test]
    fn test_arithmetic_promotes_to_float() {
        assert_eval_kind("(+ 1 2.5)", Sexpr::Float(3.5));
        assert_eval_kind("(* 2 0.5)", Sexpr::Float(1.0));
        assert_eval_kind("(- 1.5)", Sexpr::Float(-1.5));
    }

    #[test]
    fn test_division_is_true_division() {
        assert_eval_kind("(/ 10 4)", Sexpr::Float(2.5));
        assert_eval_kind("(/ 7 2)", Sexpr::Float(3.5));
        assert_eval_kind("(/ 6 3)", Sexpr::Float(2.0));
        assert_eval_kind("(/ 20 2 5)", Sexpr::Float(2.0));
        assert_eval_kind("(/ 4)", Sexpr::Float(0.25));
        assert_invalid_arguments("(/ 1 0)");
        assert_invalid_arguments("(/ 0)");
        assert_invalid_arguments("(/)");
    }

    #[test]
    fn test_integer_overflow_is_an_error() {
        assert_invalid_arguments("(+ 9223372036854775807 1)");
        assert_invalid_arguments("(* 9223372036854775807 2)");
        assert_invalid_arguments("(- -9223372036854775808)");
    }

    #[test]
    fn test_arithmetic_type_errors() {
        assert_invalid_arguments("(+ 1 (quote a))");
        assert_invalid_arguments("(- (list 1))");
        assert_invalid_arguments("(-)");
    }

    #[test]
    fn test_booleans_count_as_numbers() {
        assert_eval_kind("(+ (> 2 1) 1)", Sexpr::Integer(2));
        assert_eval_kind("(* (< 2 1) 5)", Sexpr::Integer(0));
    }

    #[test]
    fn test_comparisons() {
        assert_eval_kind("(> 3 2)", Sexpr::Boolean(true));
        assert_eval_kind("(< 3 2)", Sexpr::Boolean(false));
        assert_eval_kind("(< 1 2 3)", Sexpr::Boolean(true));
        assert_eval_kind("(< 1 3 2)", Sexpr::Boolean(false));
        assert_eval_kind("(<= 5 5 6)", Sexpr::Boolean(true));
        assert_eval_kind("(>= 6 5 5)", Sexpr::Boolean(true));
        assert_eval_kind("(> 6 5 5)", Sexpr::Boolean(false));
        assert_eval_kind("(< 1 1.5)", Sexpr::Boolean(true));
        assert_invalid_arguments("(< 1)");
        assert_invalid_arguments("(< 1 (quote a))");
    }

    #[test]
    fn test_equality() {
        assert_eval_kind("(= 5 5)", Sexpr::Boolean(true));
        assert_eval_kind("(= 5 5.0)", Sexpr::Boolean(true));
        assert_eval_kind("(= 5 5 6)", Sexpr::Boolean(false));
        assert_eval_kind("(= (quote a) (quote a))", Sexpr::Boolean(true));
        assert_eval_kind("(equal? (list 1 (list 2)) (quote (1 (2))))", Sexpr::Boolean(true));
        assert_eval_kind("(equal? (list 1 2) (list 1 3))", Sexpr::Boolean(false));
        assert_eval_kind("(equal? (quote a) 1)", Sexpr::Boolean(false));
        assert_invalid_arguments("(equal? 1)");
    }

    #[test]
    fn test_identity() {
        assert_eval_kind("(eq? (quote a) (quote a))", Sexpr::Boolean(true));
        assert_eval_kind("(eq? 3 3)", Sexpr::Boolean(true));
        assert_eval_kind("(eq? (quote ()) (list))", Sexpr::Boolean(true));
        assert_eval_kind("(eq? (list 1) (list 1))", Sexpr::Boolean(false));
        assert_eval_kind("(eq? car car)", Sexpr::Boolean(true));
        assert_eval_kind("(eq? car cdr)", Sexpr::Boolean(false));

        let env = global();
        env.borrow_mut().bind("f".to_string(), Node::new_integer(0, Span::default()));
        eval_in("(set! f (lambda (x) x))", &env).expect("set! works");
        assert_eq!(eval_in("(eq? f f)", &env).expect("eq? works").kind, Sexpr::Boolean(true));
        assert_eq!(
            eval_in("(eq? (lambda (x) x) (lambda (x) x))", &env)
                .expect("eq? works")
                .kind,
            Sexpr::Boolean(false)
        );
    }

    #[test]
    fn test_not() {
        assert_eval_kind("(not 0)", Sexpr::Boolean(true));
        assert_eval_kind("(not (quote ()))", Sexpr::Boolean(true));
        assert_eval_kind("(not (< 2 1))", Sexpr::Boolean(true));
        assert_eval_kind("(not 1)", Sexpr::Boolean(false));
        assert_eval_kind("(not (quote a))", Sexpr::Boolean(false));
    }

    #[test]
    fn test_list_operations() {
        assert_eval_display("(cons 1 (list 2 3))", "(123)");
        assert_eval_display("(cons (list 1) (list))", "((1))");
        assert_eval_display("(car (quote (a b c)))", "a");
        assert_eval_display("(cdr (quote (a b c)))", "(bc)");
        assert_eval_display("(cdr (quote (a)))", "()");
        assert_eval_display("(cdr (quote ()))", "()");
        assert_eval_display("(append (list 1) (list 2 3) (list))", "(123)");
        assert_eval_display("(append)", "()");
        assert_eval_display("(list)", "()");
        assert_eval_kind("(length (list 1 2 3))", Sexpr::Integer(3));
        assert_eval_kind("(length (quote ()))", Sexpr::Integer(0));
        assert_eval_kind("(length (quote abc))", Sexpr::Integer(3));
    }

    #[test]
    fn test_list_operation_errors() {
        assert_invalid_arguments("(car (quote ()))");
        assert_invalid_arguments("(car 1)");
        assert_invalid_arguments("(cdr 1)");
        assert_invalid_arguments("(cons 1 2)");
        assert_invalid_arguments("(cons 1)");
        assert_invalid_arguments("(append (list 1) 2)");
        assert_invalid_arguments("(length 5)");
    }

    #[test]
    fn test_predicates() {
        assert_eval_kind("(list? (list 1))", Sexpr::Boolean(true));
        assert_eval_kind("(list? (quote ()))", Sexpr::Boolean(true));
        assert_eval_kind("(list? 1)", Sexpr::Boolean(false));
        assert_eval_kind("(null? (quote ()))", Sexpr::Boolean(true));
        assert_eval_kind("(null? (list 1))", Sexpr::Boolean(false));
        assert_eval_kind("(null? 0)", Sexpr::Boolean(false));
        assert_eval_kind("(symbol? (quote a))", Sexpr::Boolean(true));
        assert_eval_kind("(symbol? 1)", Sexpr::Boolean(false));
        assert_eval_kind("(symbol? (quote (a)))", Sexpr::Boolean(false));
    }

    #[test]
    fn test_math_functions() {
        assert_float("(sqrt 16)", 4.0);
        assert_float("(pow 2 10)", 1024.0);
        assert_float("(sin 0)", 0.0);
        assert_float("(cos pi)", -1.0);
        assert_float("(log e)", 1.0);
        assert_float("(log 8 2)", 3.0);
        assert_float("(log10 1000)", 3.0);
        assert_float("(floor 2.7)", 2.0);
        assert_float("(ceil 2.1)", 3.0);
        assert_float("(fabs -3)", 3.0);
        assert_float("(hypot 3 4)", 5.0);
        assert_float("(fmod 7 3)", 1.0);
        assert_float("(degrees pi)", 180.0);
        assert_eval_kind("(trunc -2.7)", Sexpr::Integer(-2));
        assert_eval_kind("(factorial 5)", Sexpr::Integer(120));
        assert_eval_kind("(isnan (sqrt 4))", Sexpr::Boolean(false));
    }

    #[test]
    fn test_math_domain_errors() {
        assert_invalid_arguments("(sqrt -1)");
        assert_invalid_arguments("(acos 2)");
        assert_invalid_arguments("(fmod 1 0)");
        assert_invalid_arguments("(factorial -1)");
        assert_invalid_arguments("(factorial 30)");
        assert_invalid_arguments("(sqrt (quote x))");
        assert_invalid_arguments("(pow 2)");
        assert_invalid_arguments("(log)");
    }

    #[test]
    fn test_math_range_errors() {
        assert_invalid_arguments("(log 0)");
        assert_invalid_arguments("(log 5 1)");
        assert_invalid_arguments("(pow 0 -1)");
        assert_invalid_arguments("(exp 1000)");
        assert_invalid_arguments("(cosh 1000)");
        // An infinite argument may give an infinite result
        assert_eval_kind("(isinf (fabs inf))", Sexpr::Boolean(true));
        assert_float("(exp 0)", 1.0);
    }

    #[test]
    fn test_add_joins_lists() {
        assert_eval_display("(+ (list 1) (list 2))", "(12)");
        assert_eval_kind("(length (+ (list 1 2) (quote ()) (list 3)))", Sexpr::Integer(3));
        assert_eval_display("(+ (quote ()))", "()");
        assert_invalid_arguments("(+ (list 1) 2)");
        assert_invalid_arguments("(+ 1 (list 2))");
    }

    #[test]
    fn test_results_carry_call_span() {
        let env = global();
        let result = eval_in(" (+ 1 2)", &env).expect("+ works");
        assert_eq!(result.span, Span::new(1, 8));
    }
}

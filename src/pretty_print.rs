use crate::interpreter::Error;
use crate::{EnvError, EvalError, ParseError, Span};
use ariadne::{Label, Report, ReportKind, Source};
use std::io;
use std::ops::Range;

type SourceReport<'a> = Report<'a, (&'a str, Range<usize>)>;

fn report<'a>(name: &'a str, span: Span, message: String, label: String) -> SourceReport<'a> {
    Report::build(ReportKind::Error, (name, span.to_range()))
        .with_message(message)
        .with_label(Label::new((name, span.to_range())).with_message(label))
        .finish()
}

impl EvalError {
    fn to_report<'a>(&self, name: &'a str) -> SourceReport<'a> {
        match self {
            EvalError::EnvError(EnvError::UnboundVariable(symbol, span)) => report(
                name,
                *span,
                format!("Unbound symbol `{}`", symbol),
                "This symbol is not bound anywhere in the current scope".to_string(),
            ),
            EvalError::NotAProcedure(sexpr, span) => report(
                name,
                *span,
                format!("Not a procedure: {}", sexpr),
                format!("This evaluates to a {}, which cannot be called", sexpr.type_name()),
            ),
            EvalError::InvalidArguments(message, span) => report(
                name,
                *span,
                "Invalid arguments".to_string(),
                message.clone(),
            ),
            EvalError::NotASymbol(sexpr, span) => report(
                name,
                *span,
                format!("Not a symbol: {}", sexpr),
                format!("Expected a symbol but found a {}", sexpr.type_name()),
            ),
            EvalError::InvalidSpecialForm(message, span) => report(
                name,
                *span,
                format!("Invalid special form: {}", message),
                "This special form is malformed or incomplete".to_string(),
            ),
            EvalError::EmptyApplication(span) => report(
                name,
                *span,
                "Cannot evaluate the empty list".to_string(),
                "Quote it to use it as data: (quote ())".to_string(),
            ),
        }
    }

    /// Prints a source-annotated report of this error to stderr.
    pub fn pretty_print(&self, name: &str, input: &str) -> io::Result<()> {
        self.to_report(name).eprint((name, Source::from(input)))
    }
}

impl ParseError {
    fn to_report<'a>(&self, name: &'a str, input: &str) -> SourceReport<'a> {
        match self {
            ParseError::UnexpectedClose(span) => report(
                name,
                *span,
                "Unexpected `)`".to_string(),
                "This closes a list that was never opened".to_string(),
            ),
            ParseError::UnexpectedEof { open: Some(span) } => report(
                name,
                *span,
                "Unexpected end of input".to_string(),
                "This list is never closed".to_string(),
            ),
            ParseError::UnexpectedEof { open: None } => {
                let end = input.len();
                report(
                    name,
                    Span::new(end, end),
                    "Unexpected end of input".to_string(),
                    "Expected an expression".to_string(),
                )
            }
            ParseError::LexerError(lex_err) => report(
                name,
                lex_err.span,
                "Lexer Error".to_string(),
                lex_err.error.to_string(),
            ),
        }
    }

    /// Prints a source-annotated report of this error to stderr.
    pub fn pretty_print(&self, name: &str, input: &str) -> io::Result<()> {
        self.to_report(name, input)
            .eprint((name, Source::from(input)))
    }
}

impl Error {
    pub fn pretty_print(&self, name: &str, input: &str) -> io::Result<()> {
        match self {
            Error::Parse(e) => e.pretty_print(name, input),
            Error::Eval(e) => e.pretty_print(name, input),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Interpreter;

    // Renders a report to a string without colour codes for assertions
    fn render(report: SourceReport<'_>, name: &str, input: &str) -> String {
        let mut out = Vec::new();
        report
            .write_for_stdout((name, Source::from(input)), &mut out)
            .expect("report renders");
        String::from_utf8_lossy(&out).to_string()
    }

    #[test]
    fn test_unbound_report_names_symbol() {
        let input = "(+ 1 nope)";
        let err = match Interpreter::new().eval_str(input) {
            Err(Error::Eval(e)) => e,
            other => panic!("Expected an evaluation error, got {:?}", other),
        };
        let text = render(err.to_report("test"), "test", input);
        assert!(text.contains("Unbound symbol `nope`"), "{}", text);
    }

    #[test]
    fn test_unclosed_list_report() {
        let input = "(+ 1 2";
        let err = crate::parse_str(input).unwrap_err();
        let text = render(err.to_report("test", input), "test", input);
        assert!(text.contains("Unexpected end of input"), "{}", text);
        assert!(text.contains("This list is never closed"), "{}", text);
    }
}

use std::borrow::Cow;

use lispy::evaluator::special_form_identifiers;
use lispy::{EnvRef, Interpreter, TokenKind, tokenize};
use rustyline::error::ReadlineError;
use rustyline::highlight::{CmdKind, Highlighter};
use rustyline::history::DefaultHistory;
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{Cmd, Completer, Context, EditMode, Editor, EventHandler, KeyCode, KeyEvent, Modifiers};
use rustyline::{Helper, Highlighter, Hinter, Validator};

const DEFAULT_HISTORY: &str = "lispy_history.txt";

struct LispyCompleter {
    env: EnvRef,
}

impl LispyCompleter {
    fn new(env: EnvRef) -> Self {
        LispyCompleter { env }
    }
}

impl rustyline::completion::Completer for LispyCompleter {
    type Candidate = String;
    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        // Only complete when the cursor sits at the end of an atom
        let prefix = match tokenize(&line[..pos]) {
            Ok(tokens) => match tokens.last() {
                Some(token) if token.span.end == pos => match &token.kind {
                    TokenKind::Atom(text) => text.clone(),
                    _ => return Ok((pos, vec![])),
                },
                _ => return Ok((pos, vec![])),
            },
            Err(_) => return Ok((pos, vec![])),
        };
        let mut candidates: Vec<String> = self
            .env
            .borrow()
            .get_identifiers()
            .union(&special_form_identifiers())
            .filter_map(|id| id.strip_prefix(prefix.as_str()).map(str::to_string))
            .filter(|rest| !rest.is_empty())
            .collect();
        candidates.sort();
        Ok((pos, candidates))
    }
}

#[derive(Completer, Helper, Highlighter, Hinter, Validator)]
struct LispyHelper {
    #[rustyline(Validator)]
    validator: LispyValidator,
    #[rustyline(Highlighter)]
    highlighter: LispyHighlighter,
    #[rustyline(Completer)]
    completer: LispyCompleter,
}

/// Keeps reading lines while a `(` is still open.
struct LispyValidator;

impl Validator for LispyValidator {
    fn validate(&self, ctx: &mut ValidationContext) -> rustyline::Result<ValidationResult> {
        let tokens = match tokenize(ctx.input()) {
            Ok(tokens) => tokens,
            // Let the reader report it
            Err(_) => return Ok(ValidationResult::Valid(None)),
        };

        let mut depth = 0usize;
        for token in tokens {
            match token.kind {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => {
                    if depth == 0 {
                        return Ok(ValidationResult::Invalid(Some(format!(
                            "  - Unmatched ')' at position {}",
                            token.span.start
                        ))));
                    }
                    depth -= 1;
                }
                TokenKind::Atom(_) => {}
            }
        }

        if depth > 0 {
            Ok(ValidationResult::Incomplete)
        } else {
            Ok(ValidationResult::Valid(None))
        }
    }
}

/// Colours the parenthesis pair around the cursor, and any unmatched `)`.
struct LispyHighlighter;

impl Highlighter for LispyHighlighter {
    fn highlight<'l>(&self, line: &'l str, pos: usize) -> Cow<'l, str> {
        let cursor = pos.checked_sub(1);
        let mut stack: Vec<(usize, usize)> = Vec::new(); // (byte index in line, index in output)
        let mut highlighted = String::with_capacity(line.len());

        for (i, c) in line.char_indices() {
            match c {
                '(' => {
                    stack.push((i, highlighted.len()));
                    highlighted.push(c);
                }
                ')' => match stack.pop() {
                    Some((open, out_pos)) if cursor == Some(open) || cursor == Some(i) => {
                        highlighted.push_str("\x1b[34m)\x1b[0m");
                        highlighted.replace_range(out_pos..=out_pos, "\x1b[1;34m(\x1b[0m");
                    }
                    Some(_) => highlighted.push(c),
                    None => highlighted.push_str("\x1b[31m)\x1b[0m"),
                },
                _ => highlighted.push(c),
            }
        }

        Cow::Owned(highlighted)
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _kind: CmdKind) -> bool {
        true
    }
}

fn edit_mode() -> EditMode {
    match std::env::var("LISPY_EDIT_MODE") {
        Ok(mode) if mode.eq_ignore_ascii_case("vi") => EditMode::Vi,
        _ => EditMode::Emacs,
    }
}

fn main() -> rustyline::Result<()> {
    pretty_env_logger::init();

    println!("Lispy REPL v{}", env!("CARGO_PKG_VERSION"));
    println!("Type 'exit' or press Ctrl-D to quit.");

    let interp = Interpreter::new();
    let h = LispyHelper {
        highlighter: LispyHighlighter,
        validator: LispyValidator,
        completer: LispyCompleter::new(interp.global().clone()),
    };
    let config = rustyline::config::Config::builder()
        .edit_mode(edit_mode())
        .build();
    let mut rl: Editor<LispyHelper, DefaultHistory> = Editor::with_config(config)?;
    rl.set_helper(Some(h));
    rl.bind_sequence(
        KeyEvent(KeyCode::Char('s'), Modifiers::CTRL),
        EventHandler::Simple(Cmd::Newline),
    );

    let history_path =
        std::env::var("LISPY_HISTORY").unwrap_or_else(|_| DEFAULT_HISTORY.to_string());
    if rl.load_history(&history_path).is_err() {
        println!("No previous history.");
    }

    loop {
        match rl.readline("lispy> ") {
            Ok(line) => {
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }
                rl.add_history_entry(input)?;
                if input.eq_ignore_ascii_case("exit") {
                    break;
                }

                match interp.eval_str(input) {
                    Ok(result) => {
                        if result.is_truthy() {
                            println!("{}", result);
                        }
                    }
                    Err(e) => {
                        if e.pretty_print("REPL", input).is_err() {
                            eprintln!("Error: {}", e);
                        }
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl-C
                println!("Interrupted. Type 'exit' or Ctrl-D to quit.");
            }
            Err(ReadlineError::Eof) => {
                // Ctrl-D
                println!("\nExiting.");
                break;
            }
            Err(err) => {
                eprintln!("Readline Error: {:?}", err);
                break;
            }
        }
    }
    rl.save_history(&history_path)
}

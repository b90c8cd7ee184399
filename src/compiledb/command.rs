//! Compiler command-line parsing.
//!
//! Splits a compile entry's raw command string into the compiler, the
//! pass-through arguments, and the `-c` input / `-o` output paths.

use thiserror::Error;

/// Errors while parsing a compiler command line.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("empty compiler command line")]
    Empty,

    #[error("unbalanced quote in compiler command line")]
    UnbalancedQuote,

    #[error("unable to determine the input or output path from the compiler command line")]
    MissingPaths,
}

/// Parsed form of a compile entry's command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerCommand {
    pub compiler: String,
    /// Flags excluding `-c`/`-o` and their values, in original order.
    pub arguments: Vec<String>,
    pub input: String,
    pub output: String,
}

/// Parse a raw command string from the compilation database.
pub fn parse(command_line: &str) -> Result<CompilerCommand, CommandError> {
    let mut words = tokenize(command_line)?.into_iter();
    let compiler = words.next().ok_or(CommandError::Empty)?;

    let mut arguments = Vec::new();
    let mut input = None;
    let mut output = None;

    let mut words = words.peekable();
    while let Some(word) = words.next() {
        match word.as_str() {
            "-c" if words.peek().is_some() => input = words.next(),
            "-o" if words.peek().is_some() => output = words.next(),
            _ => arguments.push(word),
        }
    }

    match (input, output) {
        (Some(input), Some(output)) => Ok(CompilerCommand {
            compiler,
            arguments,
            input,
            output,
        }),
        _ => Err(CommandError::MissingPaths),
    }
}

/// Split a command string into words, respecting shell quoting.
///
/// Handles single quotes, double quotes (with `\"`, `\\`, `\$`, and
/// `` \` `` escapes), and backslash escapes outside quotes.
fn tokenize(input: &str) -> Result<Vec<String>, CommandError> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut chars = input.chars();

    while let Some(c) = chars.next() {
        match quote {
            Some('\'') => {
                if c == '\'' {
                    quote = None;
                } else {
                    current.push(c);
                }
            }
            Some(_) => match c {
                '"' => quote = None,
                '\\' => match chars.next() {
                    Some(next @ ('"' | '\\' | '$' | '`')) => current.push(next),
                    Some(next) => {
                        current.push('\\');
                        current.push(next);
                    }
                    None => return Err(CommandError::UnbalancedQuote),
                },
                _ => current.push(c),
            },
            None => match c {
                '\'' | '"' => {
                    quote = Some(c);
                    in_word = true;
                }
                '\\' => {
                    if let Some(next) = chars.next() {
                        current.push(next);
                        in_word = true;
                    }
                }
                c if c.is_whitespace() => {
                    if in_word {
                        words.push(std::mem::take(&mut current));
                        in_word = false;
                    }
                }
                _ => {
                    current.push(c);
                    in_word = true;
                }
            },
        }
    }

    if quote.is_some() {
        return Err(CommandError::UnbalancedQuote);
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

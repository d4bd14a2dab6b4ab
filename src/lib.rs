#![allow(clippy::module_inception)]

use std::{fmt::Display, rc::Rc};

use crate::errors::errors::{Error, ErrorTip};

pub mod ast;
pub mod errors;
pub mod evaluator;
pub mod lexer;
pub mod macros;
pub mod parser;
pub mod script_run;
pub mod stdlib;
pub mod type_checker;

extern crate regex;

/// A location in a source file. `offset` is a byte offset, `line` and
/// `column` are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub offset: u32,
    pub line: u32,
    pub column: u32,
    pub file: Rc<String>,
}

impl Position {
    pub fn new(offset: u32, line: u32, column: u32, file: Rc<String>) -> Self {
        Position {
            offset,
            line,
            column,
            file,
        }
    }

    pub fn null() -> Self {
        Position::new(0, 1, 1, Rc::new(String::from("<null>")))
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Span { start, end }
    }

    pub fn null() -> Self {
        Span::new(Position::null(), Position::null())
    }
}

/// Finds the line of `content` containing the byte offset of `position`.
///
/// Returns the 1-based line number, the text of that line and the offset of
/// the position within the line. Offsets past the end of the content resolve
/// to the last line.
pub fn get_line_at_position(content: &str, position: &Position) -> (usize, String, usize) {
    let pos = position.offset as usize;

    let mut start = 0;
    let mut line_number = 1;
    let mut last = (1, String::new(), 0);

    for line in content.split_inclusive('\n') {
        let end = start + line.len();

        if (start..end).contains(&pos) {
            return (line_number, line.to_string(), pos - start);
        }

        last = (line_number, line.to_string(), line.len());
        start = end;
        line_number += 1;
    }

    last
}

/// Renders an error with the offending source line and a caret under the
/// error position.
pub fn format_error(error: &Error, source: &str) -> String {
    /*
        Type error: message
        -> script.archit
           |
        20 | var a: number = "x";
           | ----------------^
    */

    let position = error.get_position();
    let (line, line_text, line_pos) = get_line_at_position(source, position);

    let line_string = line.to_string();
    let padding = line_string.len() + 2;

    let mut output = String::new();

    if let ErrorTip::None = error.get_tip() {
        output.push_str(&format!("{}: {}\n", error.kind(), error.get_error_name()));
    } else {
        output.push_str(&format!(
            "{}: {} ({})\n",
            error.kind(),
            error.get_error_name(),
            error.get_tip()
        ));
    }
    output.push_str(&format!("-> {}:{}:{}\n", position.file, position.line, position.column));
    output.push_str(&format!("{:>padding$}\n", "|"));

    let (line_text_removed, removed_whitespace) = remove_starting_whitespace(&line_text);
    output.push_str(&format!("{} | {}\n", line_string, line_text_removed.trim_end()));

    let arrows = line_pos.saturating_sub(removed_whitespace) + 1;

    output.push_str(&format!("{:>padding$} {:->arrows$}\n", "|", "^"));
    output
}

pub fn display_error(error: &Error, source: &str) {
    eprint!("{}", format_error(error, source));
}

fn remove_starting_whitespace(string: &str) -> (String, usize) {
    let start = string.chars().take_while(|c| *c == ' ').count();

    (String::from(&string[start..]), start)
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use crate::Position;

    fn at(offset: u32) -> Position {
        Position::new(offset, 1, 1, Rc::new(String::from("test.archit")))
    }

    #[test]
    fn test_get_line_at_position() {
        let content = "Hello, world!\nline two\n\nTesting { }\n";

        let (line_number, line, line_pos) = super::get_line_at_position(content, &at(10));
        assert_eq!(line_number, 1);
        assert_eq!(line, "Hello, world!\n");
        assert_eq!(line_pos, 10);

        let (line_number, line, line_pos) = super::get_line_at_position(content, &at(32));
        assert_eq!(line_number, 4);
        assert_eq!(line, "Testing { }\n");
        assert_eq!(line_pos, 8);
    }

    #[test]
    fn test_get_line_past_end() {
        let (line_number, line, _) = super::get_line_at_position("a\nbc", &at(99));
        assert_eq!(line_number, 2);
        assert_eq!(line, "bc");
    }
}

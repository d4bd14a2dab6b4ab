use std::rc::Rc;

use lazy_static::lazy_static;
use regex::Regex;

use crate::{
    errors::errors::{Error, ErrorImpl},
    Position, Span, MK_DEFAULT_HANDLER, MK_TOKEN,
};

use super::tokens::{Token, TokenKind, RESERVED_LOOKUP};

pub type RegexHandler = fn(&mut Lexer, &str) -> Result<(), Error>;

pub struct RegexPattern {
    regex: Regex,
    handler: RegexHandler,
}

fn pattern(regex: &str, handler: RegexHandler) -> RegexPattern {
    RegexPattern {
        regex: Regex::new(&format!("^(?:{})", regex)).unwrap(),
        handler,
    }
}

lazy_static! {
    // Tried in order; longer operators must precede their prefixes.
    static ref PATTERNS: Vec<RegexPattern> = vec![
        pattern(r"\s+", skip_handler),
        pattern(r"//[^\n]*", skip_handler),
        pattern(r"[0-9][0-9_]*\.[0-9][0-9_]*", real_handler),
        pattern(r"[0-9][0-9_]*", number_handler),
        pattern(r"[a-zA-Z_][a-zA-Z0-9_]*", symbol_handler),
        pattern(r#""(?:[^"\\]|\\.)*""#, string_handler),
        pattern(r"`(?:[^`\\]|\\.)*`", interpolation_handler),
        pattern(r"#[a-zA-Z_][a-zA-Z0-9_]*(?::[a-zA-Z_][a-zA-Z0-9_/.]*)?", material_handler),
        pattern(r"\[", MK_DEFAULT_HANDLER!(TokenKind::OpenBracket, "[")),
        pattern(r"\]", MK_DEFAULT_HANDLER!(TokenKind::CloseBracket, "]")),
        pattern(r"\{", MK_DEFAULT_HANDLER!(TokenKind::OpenCurly, "{")),
        pattern(r"\}", MK_DEFAULT_HANDLER!(TokenKind::CloseCurly, "}")),
        pattern(r"\(", MK_DEFAULT_HANDLER!(TokenKind::OpenParen, "(")),
        pattern(r"\)", MK_DEFAULT_HANDLER!(TokenKind::CloseParen, ")")),
        pattern("==", MK_DEFAULT_HANDLER!(TokenKind::Equals, "==")),
        pattern("!=", MK_DEFAULT_HANDLER!(TokenKind::NotEquals, "!=")),
        pattern("=", MK_DEFAULT_HANDLER!(TokenKind::Assignment, "=")),
        pattern("<=", MK_DEFAULT_HANDLER!(TokenKind::LessEquals, "<=")),
        pattern("<", MK_DEFAULT_HANDLER!(TokenKind::Less, "<")),
        pattern(">=", MK_DEFAULT_HANDLER!(TokenKind::GreaterEquals, ">=")),
        pattern(">", MK_DEFAULT_HANDLER!(TokenKind::Greater, ">")),
        pattern("->", MK_DEFAULT_HANDLER!(TokenKind::Arrow, "->")),
        pattern(";", MK_DEFAULT_HANDLER!(TokenKind::Semicolon, ";")),
        pattern(":", MK_DEFAULT_HANDLER!(TokenKind::Colon, ":")),
        pattern(",", MK_DEFAULT_HANDLER!(TokenKind::Comma, ",")),
        pattern(r"\|", MK_DEFAULT_HANDLER!(TokenKind::Pipe, "|")),
        pattern(r"\^", MK_DEFAULT_HANDLER!(TokenKind::Caret, "^")),
        pattern(r"\+=", MK_DEFAULT_HANDLER!(TokenKind::PlusEquals, "+=")),
        pattern("-=", MK_DEFAULT_HANDLER!(TokenKind::MinusEquals, "-=")),
        pattern(r"\*=", MK_DEFAULT_HANDLER!(TokenKind::StarEquals, "*=")),
        pattern("/=", MK_DEFAULT_HANDLER!(TokenKind::SlashEquals, "/=")),
        pattern("%=", MK_DEFAULT_HANDLER!(TokenKind::PercentEquals, "%=")),
        pattern(r"\+", MK_DEFAULT_HANDLER!(TokenKind::Plus, "+")),
        pattern("-", MK_DEFAULT_HANDLER!(TokenKind::Dash, "-")),
        pattern("/", MK_DEFAULT_HANDLER!(TokenKind::Slash, "/")),
        pattern(r"\*", MK_DEFAULT_HANDLER!(TokenKind::Star, "*")),
        pattern("%", MK_DEFAULT_HANDLER!(TokenKind::Percent, "%")),
    ];
}

pub struct Lexer {
    tokens: Vec<Token>,
    source: String,
    pos: usize,
    file: Rc<String>,
    line_starts: Vec<usize>,
    /// Where this source sits inside an enclosing file, for fragments lexed
    /// out of interpolated strings.
    base: Option<Position>,
}

impl Lexer {
    pub fn new(source: String, file: Option<String>) -> Lexer {
        let file_name = if let Some(file) = file {
            Rc::new(file)
        } else {
            Rc::new(String::from("shell"))
        };

        Lexer::with_file(source, file_name, None)
    }

    fn with_file(source: String, file: Rc<String>, base: Option<Position>) -> Lexer {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(index, _)| index + 1))
            .collect();

        Lexer {
            tokens: vec![],
            source,
            pos: 0,
            file,
            line_starts,
            base,
        }
    }

    pub fn advance_n(&mut self, n: usize) {
        self.pos += n;
    }

    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    pub fn at(&self) -> char {
        self.remainder().chars().next().unwrap_or('\0')
    }

    pub fn remainder(&self) -> &str {
        &self.source[self.pos..]
    }

    pub fn at_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    /// Converts a byte offset into a line/column position.
    pub fn position_at(&self, offset: usize) -> Position {
        let line_index = self.line_starts.partition_point(|start| *start <= offset) - 1;
        let line_start = self.line_starts[line_index];
        let column = self.source[line_start..offset].chars().count() + 1;

        match &self.base {
            None => Position::new(
                offset as u32,
                line_index as u32 + 1,
                column as u32,
                Rc::clone(&self.file),
            ),
            Some(base) => Position::new(
                base.offset + offset as u32,
                base.line + line_index as u32,
                if line_index == 0 {
                    base.column + column as u32 - 1
                } else {
                    column as u32
                },
                Rc::clone(&self.file),
            ),
        }
    }

    /// The span of the next `len` bytes.
    pub fn span_of(&self, len: usize) -> Span {
        Span {
            start: self.position_at(self.pos),
            end: self.position_at(self.pos + len),
        }
    }

    fn push_matched(&mut self, kind: TokenKind, value: String, matched: &str) {
        let span = self.span_of(matched.len());
        self.push(MK_TOKEN!(kind, value, span));
        self.advance_n(matched.len());
    }
}

fn number_handler(lexer: &mut Lexer, matched: &str) -> Result<(), Error> {
    lexer.push_matched(TokenKind::Number, matched.to_string(), matched);
    Ok(())
}

fn real_handler(lexer: &mut Lexer, matched: &str) -> Result<(), Error> {
    lexer.push_matched(TokenKind::Real, matched.to_string(), matched);
    Ok(())
}

fn skip_handler(lexer: &mut Lexer, matched: &str) -> Result<(), Error> {
    lexer.advance_n(matched.len());
    Ok(())
}

fn string_handler(lexer: &mut Lexer, matched: &str) -> Result<(), Error> {
    let literal = &matched[1..matched.len() - 1];
    let value = unescape(literal).map_err(|token| {
        Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token,
                message: String::from("invalid escape sequence in string"),
            },
            lexer.position_at(lexer.pos),
        )
    })?;

    lexer.push_matched(TokenKind::String, value, matched);
    Ok(())
}

// Escapes stay untouched so the parser can tell `\{` from an embedded expression.
fn interpolation_handler(lexer: &mut Lexer, matched: &str) -> Result<(), Error> {
    let literal = matched[1..matched.len() - 1].to_string();
    lexer.push_matched(TokenKind::Interpolation, literal, matched);
    Ok(())
}

fn material_handler(lexer: &mut Lexer, matched: &str) -> Result<(), Error> {
    lexer.push_matched(TokenKind::Material, matched[1..].to_string(), matched);
    Ok(())
}

fn symbol_handler(lexer: &mut Lexer, matched: &str) -> Result<(), Error> {
    let kind = RESERVED_LOOKUP
        .get(matched)
        .copied()
        .unwrap_or(TokenKind::Identifier);

    lexer.push_matched(kind, matched.to_string(), matched);
    Ok(())
}

/// Resolves backslash escapes. On failure returns the offending escape.
pub fn unescape(literal: &str) -> Result<String, String> {
    let mut result = String::new();
    let mut chars = literal.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }

        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some('0') => result.push('\0'),
            Some('x') => {
                let mut hex = String::new();

                while hex.len() < 2 {
                    match chars.peek() {
                        Some(ch) if ch.is_ascii_hexdigit() => {
                            hex.push(*ch);
                            chars.next();
                        }
                        _ => break,
                    }
                }

                match u8::from_str_radix(&hex, 16) {
                    Ok(byte) => result.push(byte as char),
                    Err(_) => return Err(format!("\\x{}", hex)),
                }
            }
            Some(other @ ('\\' | '"' | '`' | '{' | '}')) => result.push(other),
            // Unknown escapes keep their backslash
            Some(other) => {
                result.push('\\');
                result.push(other);
            }
            None => result.push('\\'),
        }
    }

    Ok(result)
}

fn run(mut lex: Lexer) -> Result<Vec<Token>, Error> {
    while !lex.at_eof() {
        let remainder = lex.remainder().to_string();
        let found = PATTERNS
            .iter()
            .find_map(|pattern| pattern.regex.find(&remainder).map(|m| (pattern.handler, m.as_str())));

        match found {
            Some((handler, matched)) => handler(&mut lex, matched)?,
            None => {
                return Err(Error::new(
                    ErrorImpl::UnrecognisedToken {
                        token: lex.at().to_string(),
                    },
                    lex.position_at(lex.pos),
                ))
            }
        }
    }

    let span = lex.span_of(0);
    lex.push(MK_TOKEN!(TokenKind::EOF, String::from("EOF"), span));
    Ok(lex.tokens)
}

pub fn tokenize(source: String, file: Option<String>) -> Result<Vec<Token>, Error> {
    run(Lexer::new(source, file))
}

/// Tokenizes a piece of a larger file, reporting positions relative to
/// `base`, where the fragment starts.
pub fn tokenize_fragment(source: &str, base: &Position) -> Result<Vec<Token>, Error> {
    run(Lexer::with_file(
        source.to_string(),
        Rc::clone(&base.file),
        Some(base.clone()),
    ))
}

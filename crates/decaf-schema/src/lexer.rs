//! Tokenizer for the annotated-model notation.
//!
//! Produces identifiers, numbers, quoted strings, and single-character
//! punctuation, each tagged with its 1-based line and column. Comments
//! and whitespace are dropped.

use decaf_core::SchemaError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    Ident(String),
    Number(f64),
    Str(String),
    Punct(char),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
}

const PUNCTUATION: &str = "@(){}[];:!?,.=<>|&*+-/%";

struct Cursor<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            chars: text.chars().peekable(),
            line: 1,
            column: 1,
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn error(&self, line: usize, column: usize, message: impl Into<String>) -> SchemaError {
        SchemaError::Syntax {
            line,
            column,
            message: message.into(),
        }
    }
}

pub(crate) fn tokenize(text: &str) -> Result<Vec<Token>, SchemaError> {
    let mut cursor = Cursor::new(text);
    let mut tokens = Vec::new();

    while let Some(c) = cursor.peek() {
        let (line, column) = (cursor.line, cursor.column);

        if c.is_whitespace() {
            cursor.bump();
            continue;
        }

        if c == '/' {
            cursor.bump();
            match cursor.peek() {
                Some('/') => {
                    while let Some(n) = cursor.bump() {
                        if n == '\n' {
                            break;
                        }
                    }
                    continue;
                }
                Some('*') => {
                    cursor.bump();
                    let mut prev = '\0';
                    let mut closed = false;
                    while let Some(n) = cursor.bump() {
                        if prev == '*' && n == '/' {
                            closed = true;
                            break;
                        }
                        prev = n;
                    }
                    if !closed {
                        return Err(cursor.error(line, column, "unterminated block comment"));
                    }
                    continue;
                }
                _ => {
                    tokens.push(Token {
                        kind: TokenKind::Punct('/'),
                        line,
                        column,
                    });
                    continue;
                }
            }
        }

        let kind = if c.is_ascii_alphabetic() || c == '_' || c == '$' {
            let mut ident = String::new();
            while let Some(n) = cursor.peek() {
                if n.is_ascii_alphanumeric() || n == '_' || n == '$' {
                    ident.push(n);
                    cursor.bump();
                } else {
                    break;
                }
            }
            TokenKind::Ident(ident)
        } else if c.is_ascii_digit() {
            let mut literal = String::new();
            while let Some(n) = cursor.peek() {
                if n.is_ascii_digit() || n == '.' || n == '_' {
                    if n != '_' {
                        literal.push(n);
                    }
                    cursor.bump();
                } else {
                    break;
                }
            }
            let value = literal
                .parse::<f64>()
                .map_err(|_| cursor.error(line, column, format!("malformed number '{literal}'")))?;
            TokenKind::Number(value)
        } else if c == '"' || c == '\'' || c == '`' {
            cursor.bump();
            let mut value = String::new();
            let mut closed = false;
            while let Some(n) = cursor.bump() {
                if n == c {
                    closed = true;
                    break;
                }
                if n == '\\' {
                    let escaped = cursor
                        .bump()
                        .ok_or_else(|| cursor.error(line, column, "unterminated string"))?;
                    value.push(match escaped {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        other => other,
                    });
                } else {
                    value.push(n);
                }
            }
            if !closed {
                return Err(cursor.error(line, column, "unterminated string"));
            }
            TokenKind::Str(value)
        } else if PUNCTUATION.contains(c) {
            cursor.bump();
            TokenKind::Punct(c)
        } else {
            return Err(cursor.error(line, column, format!("unexpected character {c:?}")));
        };

        tokens.push(Token { kind, line, column });
    }

    Ok(tokens)
}

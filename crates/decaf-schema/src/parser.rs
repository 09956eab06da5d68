//! Recursive-descent parser for the annotated-model notation.
//!
//! Recognizes `import` statements (skipped), class declarations with their
//! class decorators, field declarations with their decorators, and
//! constructors/methods (skipped). The output is a plain declaration tree;
//! the meaning of decorators and types is assigned by the compiler.

use decaf_core::{ConstraintArg, SchemaError};

use crate::lexer::{Token, TokenKind};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Definition {
    pub models: Vec<ModelDecl>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ModelDecl {
    pub name: String,
    pub fields: Vec<FieldDecl>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FieldDecl {
    pub name: String,
    pub type_name: String,
    pub many: bool,
    pub decorators: Vec<Decorator>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Decorator {
    pub name: String,
    pub args: Vec<ConstraintArg>,
    pub line: usize,
    pub column: usize,
}

/// Member modifiers that carry no meaning for validation.
const MODIFIERS: [&str; 7] = [
    "public",
    "private",
    "protected",
    "readonly",
    "declare",
    "override",
    "static",
];

/// Class decorators accepted in front of a model declaration.
const CLASS_DECORATORS: [&str; 1] = ["model"];

pub(crate) fn parse(tokens: &[Token]) -> Result<Definition, SchemaError> {
    Parser { tokens, pos: 0 }.definition()
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a TokenKind> {
        self.tokens.get(self.pos).map(|t| &t.kind)
    }

    fn peek_at(&self, offset: usize) -> Option<&'a TokenKind> {
        self.tokens.get(self.pos + offset).map(|t| &t.kind)
    }

    fn next(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    fn is_punct(&self, c: char) -> bool {
        self.peek() == Some(&TokenKind::Punct(c))
    }

    fn error_here(&self, message: impl Into<String>) -> SchemaError {
        let (line, column) = match self.tokens.get(self.pos).or(self.tokens.last()) {
            Some(t) => (t.line, t.column),
            None => (1, 1),
        };
        SchemaError::Syntax {
            line,
            column,
            message: message.into(),
        }
    }

    fn expect_punct(&mut self, c: char) -> Result<(), SchemaError> {
        if self.is_punct(c) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error_here(format!("expected '{c}'")))
        }
    }

    fn expect_ident(&mut self, what: &str) -> Result<String, SchemaError> {
        match self.peek() {
            Some(TokenKind::Ident(name)) => {
                self.pos += 1;
                Ok(name.clone())
            }
            _ => Err(self.error_here(format!("expected {what}"))),
        }
    }

    fn definition(&mut self) -> Result<Definition, SchemaError> {
        let mut models = Vec::new();
        let mut pending: Vec<Decorator> = Vec::new();

        while let Some(kind) = self.peek() {
            match kind {
                TokenKind::Ident(word) if word == "import" => self.skip_import()?,
                TokenKind::Ident(word)
                    if matches!(word.as_str(), "export" | "default" | "abstract") =>
                {
                    self.pos += 1;
                }
                TokenKind::Ident(word) if word == "class" => {
                    for decorator in pending.drain(..) {
                        if !CLASS_DECORATORS.contains(&decorator.name.as_str()) {
                            return Err(SchemaError::Syntax {
                                line: decorator.line,
                                column: decorator.column,
                                message: format!(
                                    "unsupported class decorator '@{}'",
                                    decorator.name
                                ),
                            });
                        }
                    }
                    models.push(self.class()?);
                }
                TokenKind::Punct('@') => pending.push(self.decorator()?),
                TokenKind::Punct(';') => self.pos += 1,
                _ => return Err(self.error_here("expected an import or class declaration")),
            }
        }

        if let Some(decorator) = pending.first() {
            return Err(SchemaError::Syntax {
                line: decorator.line,
                column: decorator.column,
                message: format!("decorator '@{}' is not followed by a class", decorator.name),
            });
        }

        Ok(Definition { models })
    }

    /// `import ... 'module';`: everything up to and including the module
    /// specifier string and an optional semicolon.
    fn skip_import(&mut self) -> Result<(), SchemaError> {
        self.pos += 1;
        loop {
            match self.next().map(|t| &t.kind) {
                Some(TokenKind::Str(_)) => break,
                Some(_) => {}
                None => return Err(self.error_here("unterminated import statement")),
            }
        }
        if self.is_punct(';') {
            self.pos += 1;
        }
        Ok(())
    }

    fn decorator(&mut self) -> Result<Decorator, SchemaError> {
        let at = &self.tokens[self.pos];
        let (line, column) = (at.line, at.column);
        self.expect_punct('@')?;
        let name = self.expect_ident("decorator name")?;
        let mut args = Vec::new();

        if self.is_punct('(') {
            self.pos += 1;
            while !self.is_punct(')') {
                args.push(self.literal()?);
                if self.is_punct(',') {
                    self.pos += 1;
                } else if !self.is_punct(')') {
                    return Err(self.error_here("expected ',' or ')' in decorator arguments"));
                }
            }
            self.pos += 1;
        }

        Ok(Decorator {
            name,
            args,
            line,
            column,
        })
    }

    fn literal(&mut self) -> Result<ConstraintArg, SchemaError> {
        let negative = self.is_punct('-');
        if negative {
            self.pos += 1;
        }
        match self.peek() {
            Some(TokenKind::Number(n)) => {
                self.pos += 1;
                Ok(ConstraintArg::Number(if negative { -n } else { *n }))
            }
            Some(TokenKind::Str(s)) if !negative => {
                self.pos += 1;
                Ok(ConstraintArg::Text(s.clone()))
            }
            _ => Err(self.error_here("decorator arguments must be number or string literals")),
        }
    }

    fn class(&mut self) -> Result<ModelDecl, SchemaError> {
        self.pos += 1; // `class`
        let name = self.expect_ident("class name")?;

        // `extends Model`, `implements X, Y`, generics: nothing here matters.
        while !self.is_punct('{') {
            if self.next().is_none() {
                return Err(self.error_here(format!("expected '{{' to open class {name}")));
            }
        }
        self.pos += 1;

        let mut fields = Vec::new();
        let mut pending: Vec<Decorator> = Vec::new();

        loop {
            match self.peek() {
                None => return Err(self.error_here(format!("class {name} is not closed"))),
                Some(TokenKind::Punct('}')) => {
                    self.pos += 1;
                    break;
                }
                Some(TokenKind::Punct(';')) => self.pos += 1,
                Some(TokenKind::Punct('@')) => pending.push(self.decorator()?),
                Some(TokenKind::Ident(word))
                    if MODIFIERS.contains(&word.as_str())
                        && matches!(self.peek_at(1), Some(TokenKind::Ident(_))) =>
                {
                    self.pos += 1;
                }
                Some(TokenKind::Ident(_)) if self.peek_at(1) == Some(&TokenKind::Punct('(')) => {
                    if let Some(decorator) = pending.first() {
                        return Err(SchemaError::Syntax {
                            line: decorator.line,
                            column: decorator.column,
                            message: format!(
                                "decorator '@{}' must precede a field declaration",
                                decorator.name
                            ),
                        });
                    }
                    self.skip_method()?;
                }
                Some(TokenKind::Ident(_)) => {
                    let decorators = std::mem::take(&mut pending);
                    fields.push(self.field(decorators)?);
                }
                Some(_) => return Err(self.error_here("expected a field declaration")),
            }
        }

        if let Some(decorator) = pending.first() {
            return Err(SchemaError::Syntax {
                line: decorator.line,
                column: decorator.column,
                message: format!(
                    "decorator '@{}' must precede a field declaration",
                    decorator.name
                ),
            });
        }

        Ok(ModelDecl { name, fields })
    }

    /// Skip `name(params): Ret { body }`, i.e. constructors and methods.
    fn skip_method(&mut self) -> Result<(), SchemaError> {
        self.pos += 1; // name
        self.skip_balanced('(', ')')?;
        while !self.is_punct('{') {
            if self.next().is_none() {
                return Err(self.error_here("expected method body"));
            }
        }
        self.skip_balanced('{', '}')
    }

    fn skip_balanced(&mut self, open: char, close: char) -> Result<(), SchemaError> {
        self.expect_punct(open)?;
        let mut depth = 1usize;
        while depth > 0 {
            match self.next().map(|t| &t.kind) {
                Some(TokenKind::Punct(c)) if *c == open => depth += 1,
                Some(TokenKind::Punct(c)) if *c == close => depth -= 1,
                Some(_) => {}
                None => return Err(self.error_here(format!("unbalanced '{open}'"))),
            }
        }
        Ok(())
    }

    fn field(&mut self, decorators: Vec<Decorator>) -> Result<FieldDecl, SchemaError> {
        let name = self.expect_ident("field name")?;
        if self.is_punct('!') || self.is_punct('?') {
            self.pos += 1;
        }
        if !self.is_punct(':') {
            return Err(self.error_here(format!("field '{name}' needs a type annotation")));
        }
        self.pos += 1;

        let (type_name, many) = self.type_annotation(&name)?;

        if self.is_punct('=') {
            // Initializers are irrelevant for validation.
            while !self.is_punct(';') {
                if self.is_punct('}') || self.next().is_none() {
                    return Err(self.error_here(format!(
                        "initializer of field '{name}' must end with ';'"
                    )));
                }
            }
        }
        if self.is_punct(';') {
            self.pos += 1;
        }

        Ok(FieldDecl {
            name,
            type_name,
            many,
            decorators,
        })
    }

    /// `T`, `T[]`, `Array<T>`, and unions with `null`/`undefined`.
    fn type_annotation(&mut self, field: &str) -> Result<(String, bool), SchemaError> {
        let mut candidates = Vec::new();
        loop {
            candidates.push(self.single_type()?);
            if self.is_punct('|') {
                self.pos += 1;
            } else {
                break;
            }
        }
        let mut concrete = candidates
            .into_iter()
            .filter(|(name, _)| name != "null" && name != "undefined");
        match (concrete.next(), concrete.next()) {
            (Some(found), None) => Ok(found),
            (None, _) => Err(self.error_here(format!("field '{field}' has no concrete type"))),
            (Some(_), Some(_)) => Err(self.error_here(format!(
                "field '{field}' has a union type; only unions with null or undefined are supported"
            ))),
        }
    }

    fn single_type(&mut self) -> Result<(String, bool), SchemaError> {
        let mut name = self.expect_ident("type name")?;
        let mut many = false;

        if name == "Array" && self.is_punct('<') {
            self.pos += 1;
            name = self.expect_ident("array element type")?;
            self.expect_punct('>')?;
            many = true;
        }

        while self.is_punct('[') {
            self.pos += 1;
            self.expect_punct(']')?;
            if many {
                return Err(self.error_here("nested array types are not supported"));
            }
            many = true;
        }

        Ok((name, many))
    }
}

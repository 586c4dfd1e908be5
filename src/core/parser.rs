//! Best-effort parsing of query text back into an [`OperationStructure`]
//!
//! The grammar is the subset the builder produces:
//!
//! ```text
//! document   := operation | selections | <empty>
//! operation  := ("query" | "mutation" | "subscription") Name? variables? selections?
//! variables  := "(" ("$" Name ":" type ("=" value)?)* ")"
//! type       := (Name | "[" type "]") "!"?
//! selections := "{" (Name arguments? selections?)* "}"
//! arguments  := "(" (Name ":" value)* ")"
//! value      := "$" Name | Int | Float | String | Name | "[" value* "]" | "{" (Name ":" value)* "}"
//! ```
//!
//! Commas and `#` comments are insignificant. Only the first definition is
//! read; anything after it is ignored. Argument and default values are kept
//! as the raw source text so they render back unchanged. Fragments, aliases
//! and directives are rejected. Nesting deeper than [`MAX_NESTING_DEPTH`] is
//! a syntax error.

use super::operation::{
    Operation, OperationStructure, OperationType, TreeArgument, TreeField, VariableDef,
};
use thiserror::Error;

/// Name given to operations written without one
pub const UNNAMED_OPERATION: &str = "UnnamedOperation";

/// Name of the sentinel operation returned for unparseable text
pub const PARSE_ERROR_OPERATION: &str = "ParseError";

/// Type tag given to every parsed argument
pub const PARSED_ARGUMENT_TYPE: &str = "String";

/// Deepest nesting of selection sets, list/object values and list types
pub const MAX_NESTING_DEPTH: usize = 256;

/// Syntax error in query text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at offset {offset}")]
pub struct QueryParseError {
    pub message: String,

    /// Byte offset into the parsed text
    pub offset: usize,
}

impl QueryParseError {
    fn new(message: impl Into<String>, offset: usize) -> Self {
        Self {
            message: message.into(),
            offset,
        }
    }
}

/// Parse `text`, falling back to the `ParseError` sentinel on syntax errors
pub fn parse_query(text: &str) -> OperationStructure {
    match try_parse_query(text) {
        Ok(structure) => structure,
        Err(err) => {
            tracing::warn!(error = %err, "Query text could not be parsed");
            parse_error_structure()
        }
    }
}

/// Parse `text` into a single-operation structure
pub fn try_parse_query(text: &str) -> Result<OperationStructure, QueryParseError> {
    let tokens = Lexer::new(text).tokenize()?;
    let mut parser = Parser {
        source: text,
        tokens,
        pos: 0,
        depth: 0,
    };
    let operation = parser.document()?;
    Ok(OperationStructure::single(operation))
}

/// Structure stored when query text cannot be parsed
pub fn parse_error_structure() -> OperationStructure {
    OperationStructure::single(Operation::new(OperationType::Query, PARSE_ERROR_OPERATION))
}

// =============================================================================
// Lexer
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Punct(char),
    Spread,
    Name,
    Int,
    Float,
    Str,
}

#[derive(Debug, Clone, Copy)]
struct Token {
    kind: TokenKind,
    start: usize,
    end: usize,
}

struct Lexer<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            pos: 0,
        }
    }

    fn tokenize(mut self) -> Result<Vec<Token>, QueryParseError> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn peek_byte(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn skip_ignored(&mut self) {
        while let Some(b) = self.peek_byte(0) {
            match b {
                b' ' | b'\t' | b'\n' | b'\r' | b',' => self.pos += 1,
                b'#' => {
                    while let Some(c) = self.peek_byte(0) {
                        if c == b'\n' || c == b'\r' {
                            break;
                        }
                        self.pos += 1;
                    }
                }
                _ if self.source[self.pos..].starts_with('\u{feff}') => {
                    self.pos += '\u{feff}'.len_utf8();
                }
                _ => break,
            }
        }
    }

    fn next_token(&mut self) -> Result<Option<Token>, QueryParseError> {
        self.skip_ignored();
        let start = self.pos;
        let Some(b) = self.peek_byte(0) else {
            return Ok(None);
        };

        let kind = match b {
            b'!' | b'$' | b'&' | b'(' | b')' | b':' | b'=' | b'@' | b'[' | b']' | b'{'
            | b'|' | b'}' => {
                self.pos += 1;
                TokenKind::Punct(b as char)
            }
            b'.' => {
                if self.source[start..].starts_with("...") {
                    self.pos += 3;
                    TokenKind::Spread
                } else {
                    return Err(QueryParseError::new("Unexpected '.'", start));
                }
            }
            b'_' | b'a'..=b'z' | b'A'..=b'Z' => {
                while matches!(self.peek_byte(0), Some(c) if c == b'_' || c.is_ascii_alphanumeric())
                {
                    self.pos += 1;
                }
                TokenKind::Name
            }
            b'-' | b'0'..=b'9' => self.number()?,
            b'"' => self.string()?,
            _ => {
                let ch = self.source[start..].chars().next().unwrap_or('?');
                return Err(QueryParseError::new(
                    format!("Unexpected character '{}'", ch),
                    start,
                ));
            }
        };

        Ok(Some(Token {
            kind,
            start,
            end: self.pos,
        }))
    }

    fn digits(&mut self) -> usize {
        let start = self.pos;
        while matches!(self.peek_byte(0), Some(c) if c.is_ascii_digit()) {
            self.pos += 1;
        }
        self.pos - start
    }

    fn number(&mut self) -> Result<TokenKind, QueryParseError> {
        let start = self.pos;
        if self.peek_byte(0) == Some(b'-') {
            self.pos += 1;
        }
        if self.digits() == 0 {
            return Err(QueryParseError::new("Invalid number", start));
        }

        let mut kind = TokenKind::Int;
        if self.peek_byte(0) == Some(b'.') {
            self.pos += 1;
            if self.digits() == 0 {
                return Err(QueryParseError::new("Invalid number", start));
            }
            kind = TokenKind::Float;
        }
        if matches!(self.peek_byte(0), Some(b'e' | b'E')) {
            self.pos += 1;
            if matches!(self.peek_byte(0), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            if self.digits() == 0 {
                return Err(QueryParseError::new("Invalid number", start));
            }
            kind = TokenKind::Float;
        }
        Ok(kind)
    }

    fn string(&mut self) -> Result<TokenKind, QueryParseError> {
        let start = self.pos;

        if self.source[start..].starts_with("\"\"\"") {
            self.pos += 3;
            return match self.source[self.pos..].find("\"\"\"") {
                Some(close) => {
                    self.pos += close + 3;
                    Ok(TokenKind::Str)
                }
                None => Err(QueryParseError::new("Unterminated block string", start)),
            };
        }

        self.pos += 1;
        while let Some(b) = self.peek_byte(0) {
            match b {
                b'"' => {
                    self.pos += 1;
                    return Ok(TokenKind::Str);
                }
                b'\\' => self.pos += 2,
                b'\n' | b'\r' => break,
                _ => self.pos += 1,
            }
        }
        Err(QueryParseError::new("Unterminated string", start))
    }
}

// =============================================================================
// Parser
// =============================================================================

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn peek_is(&self, ch: char) -> bool {
        matches!(self.peek(), Some(t) if t.kind == TokenKind::Punct(ch))
    }

    fn text(&self, token: Token) -> &'a str {
        &self.source[token.start..token.end]
    }

    fn offset(&self) -> usize {
        self.peek().map(|t| t.start).unwrap_or(self.source.len())
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn descend(&mut self) -> Result<(), QueryParseError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(QueryParseError::new("Nesting too deep", self.offset()));
        }
        self.depth += 1;
        Ok(())
    }

    fn ascend(&mut self) {
        self.depth -= 1;
    }

    fn expect_punct(&mut self, ch: char) -> Result<Token, QueryParseError> {
        match self.peek() {
            Some(t) if t.kind == TokenKind::Punct(ch) => {
                self.pos += 1;
                Ok(t)
            }
            Some(t) => Err(QueryParseError::new(
                format!("Expected '{}', found '{}'", ch, self.text(t)),
                t.start,
            )),
            None => Err(QueryParseError::new(
                format!("Expected '{}', found end of input", ch),
                self.source.len(),
            )),
        }
    }

    fn expect_name(&mut self) -> Result<&'a str, QueryParseError> {
        match self.peek() {
            Some(t) if t.kind == TokenKind::Name => {
                self.pos += 1;
                Ok(self.text(t))
            }
            Some(t) => Err(QueryParseError::new(
                format!("Expected a name, found '{}'", self.text(t)),
                t.start,
            )),
            None => Err(QueryParseError::new(
                "Expected a name, found end of input",
                self.source.len(),
            )),
        }
    }

    fn document(&mut self) -> Result<Operation, QueryParseError> {
        let Some(first) = self.peek() else {
            return Ok(Operation::new(OperationType::Query, UNNAMED_OPERATION));
        };

        if first.kind == TokenKind::Punct('{') {
            let mut operation = Operation::new(OperationType::Query, UNNAMED_OPERATION);
            operation.fields = self.selection_set()?;
            return Ok(operation);
        }

        let keyword = self.expect_name()?;
        let op_type: OperationType = keyword.parse().map_err(|_| {
            QueryParseError::new(
                format!(
                    "Expected query, mutation or subscription, found '{}'",
                    keyword
                ),
                first.start,
            )
        })?;

        let name = match self.peek() {
            Some(t) if t.kind == TokenKind::Name => {
                self.pos += 1;
                self.text(t)
            }
            _ => UNNAMED_OPERATION,
        };

        let mut operation = Operation::new(op_type, name);
        if self.peek_is('(') {
            operation.variables = self.variable_definitions()?;
        }
        self.reject_directives()?;
        if self.peek_is('{') {
            operation.fields = self.selection_set()?;
        }
        Ok(operation)
    }

    fn variable_definitions(&mut self) -> Result<Vec<VariableDef>, QueryParseError> {
        self.expect_punct('(')?;
        let mut variables = Vec::new();

        while !self.peek_is(')') {
            self.expect_punct('$')?;
            let name = self.expect_name()?;
            self.expect_punct(':')?;
            let var_type = self.type_literal()?;

            let default_value = if self.peek_is('=') {
                self.pos += 1;
                Some(self.value()?.to_string())
            } else {
                None
            };

            variables.push(VariableDef {
                name: name.to_string(),
                var_type: var_type.to_string(),
                default_value,
            });
        }

        self.expect_punct(')')?;
        Ok(variables)
    }

    fn type_literal(&mut self) -> Result<&'a str, QueryParseError> {
        self.descend()?;
        let start = self.offset();

        if self.peek_is('[') {
            self.pos += 1;
            self.type_literal()?;
            self.expect_punct(']')?;
        } else {
            self.expect_name()?;
        }

        let end = if self.peek_is('!') {
            self.expect_punct('!')?.end
        } else {
            self.tokens[self.pos - 1].end
        };

        self.ascend();
        Ok(&self.source[start..end])
    }

    fn reject_directives(&self) -> Result<(), QueryParseError> {
        if self.peek_is('@') {
            return Err(QueryParseError::new(
                "Directives are not supported",
                self.offset(),
            ));
        }
        Ok(())
    }

    fn selection_set(&mut self) -> Result<Vec<TreeField>, QueryParseError> {
        self.descend()?;
        self.expect_punct('{')?;
        let mut fields: Vec<TreeField> = Vec::new();

        loop {
            let Some(token) = self.peek() else {
                return Err(QueryParseError::new(
                    "Unterminated selection set",
                    self.source.len(),
                ));
            };

            match token.kind {
                TokenKind::Punct('}') => {
                    self.pos += 1;
                    self.ascend();
                    return Ok(fields);
                }
                TokenKind::Spread => {
                    return Err(QueryParseError::new(
                        "Fragments are not supported",
                        token.start,
                    ));
                }
                _ => {
                    let field = self.field()?;
                    if fields.iter().any(|f| f.name == field.name) {
                        tracing::debug!(field = %field.name, "Dropping repeated sibling selection");
                    } else {
                        fields.push(field);
                    }
                }
            }
        }
    }

    fn field(&mut self) -> Result<TreeField, QueryParseError> {
        let name = self.expect_name()?;
        if self.peek_is(':') {
            return Err(QueryParseError::new(
                "Aliases are not supported",
                self.offset(),
            ));
        }

        let mut field = TreeField::leaf(name);
        if self.peek_is('(') {
            field.args = self.arguments()?;
        }
        self.reject_directives()?;
        if self.peek_is('{') {
            field.fields = self.selection_set()?;
        }
        Ok(field)
    }

    fn arguments(&mut self) -> Result<Vec<TreeArgument>, QueryParseError> {
        self.expect_punct('(')?;
        let mut args = Vec::new();

        while !self.peek_is(')') {
            let name = self.expect_name()?;
            self.expect_punct(':')?;
            let value = self.value()?;
            args.push(TreeArgument::new(name, value, PARSED_ARGUMENT_TYPE));
        }

        self.expect_punct(')')?;
        Ok(args)
    }

    /// Consume one value and return its raw source text
    fn value(&mut self) -> Result<&'a str, QueryParseError> {
        self.descend()?;
        let Some(token) = self.advance() else {
            return Err(QueryParseError::new(
                "Expected a value, found end of input",
                self.source.len(),
            ));
        };

        let end = match token.kind {
            TokenKind::Int | TokenKind::Float | TokenKind::Str | TokenKind::Name => token.end,
            TokenKind::Punct('$') => {
                self.expect_name()?;
                self.tokens[self.pos - 1].end
            }
            TokenKind::Punct('[') => {
                while !self.peek_is(']') {
                    self.value()?;
                }
                self.expect_punct(']')?.end
            }
            TokenKind::Punct('{') => {
                while !self.peek_is('}') {
                    self.expect_name()?;
                    self.expect_punct(':')?;
                    self.value()?;
                }
                self.expect_punct('}')?.end
            }
            _ => {
                return Err(QueryParseError::new(
                    format!("Expected a value, found '{}'", self.text(token)),
                    token.start,
                ));
            }
        };

        self.ascend();
        Ok(&self.source[token.start..end])
    }
}

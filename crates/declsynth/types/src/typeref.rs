//! Unresolved type references as written in a declaration.
//!
//! Graphs spell types the way Kotlin source does: `String`, `List<Int>?`,
//! `kotlin.collections.Map<String, *>`, `(Int) -> Unit`,
//! `suspend Scope.() -> Unit`. Names stay unresolved until the symbol source
//! maps them to fully-qualified classes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A type reference prior to name resolution.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TypeRef {
    /// A (possibly dotted) class name with arguments.
    Named {
        name: String,
        arguments: Vec<TypeRef>,
        nullable: bool,
    },
    /// A function type.
    Function {
        receiver: Option<Box<TypeRef>>,
        parameters: Vec<TypeRef>,
        returns: Box<TypeRef>,
        nullable: bool,
        suspending: bool,
    },
    /// The `*` projection.
    Star,
}

impl TypeRef {
    /// A non-null reference without arguments.
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named {
            name: name.into(),
            arguments: Vec::new(),
            nullable: false,
        }
    }

    /// `kotlin.Unit`, the implied return type of a function.
    pub fn unit() -> Self {
        Self::named("Unit")
    }

    pub fn is_nullable(&self) -> bool {
        match self {
            Self::Named { nullable, .. } | Self::Function { nullable, .. } => *nullable,
            Self::Star => false,
        }
    }

    /// Every class name this reference mentions, in source order.
    pub fn names(&self) -> Vec<&str> {
        match self {
            Self::Named {
                name, arguments, ..
            } => {
                let mut out = vec![name.as_str()];
                for argument in arguments {
                    out.extend(argument.names());
                }
                out
            }
            Self::Function {
                receiver,
                parameters,
                returns,
                ..
            } => {
                let mut out = Vec::new();
                if let Some(receiver) = receiver {
                    out.extend(receiver.names());
                }
                for parameter in parameters {
                    out.extend(parameter.names());
                }
                out.extend(returns.names());
                out
            }
            Self::Star => Vec::new(),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named {
                name,
                arguments,
                nullable,
            } => {
                write!(f, "{}", name)?;
                if !arguments.is_empty() {
                    let args: Vec<String> = arguments.iter().map(ToString::to_string).collect();
                    write!(f, "<{}>", args.join(", "))?;
                }
                if *nullable {
                    write!(f, "?")?;
                }
                Ok(())
            }
            Self::Function {
                receiver,
                parameters,
                returns,
                nullable,
                suspending,
            } => {
                let mut text = String::new();
                if *suspending {
                    text.push_str("suspend ");
                }
                if let Some(receiver) = receiver {
                    text.push_str(&receiver.to_string());
                    text.push('.');
                }
                let params: Vec<String> = parameters.iter().map(ToString::to_string).collect();
                text.push_str(&format!("({}) -> {}", params.join(", "), returns));
                if *nullable {
                    write!(f, "({})?", text)
                } else {
                    f.write_str(&text)
                }
            }
            Self::Star => f.write_str("*"),
        }
    }
}

/// A type reference that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot parse type '{input}': {reason}")]
pub struct TypeRefParseError {
    pub input: String,
    pub reason: String,
}

impl FromStr for TypeRef {
    type Err = TypeRefParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fail = |reason: String| TypeRefParseError {
            input: s.to_string(),
            reason,
        };
        let tokens = tokenize(s).map_err(fail)?;
        let mut parser = Parser { tokens, pos: 0 };
        let ty = parser.parse_type().map_err(fail)?;
        match parser.peek() {
            None => Ok(ty),
            Some(token) => Err(fail(format!("unexpected {}", token))),
        }
    }
}

impl TryFrom<String> for TypeRef {
    type Error = TypeRefParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TypeRef> for String {
    fn from(value: TypeRef) -> Self {
        value.to_string()
    }
}

// ── Parser ───────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq)]
enum Token {
    Ident(String),
    Dot,
    Comma,
    Less,
    Greater,
    Question,
    LParen,
    RParen,
    Arrow,
    Star,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ident(name) => write!(f, "'{}'", name),
            Self::Dot => f.write_str("'.'"),
            Self::Comma => f.write_str("','"),
            Self::Less => f.write_str("'<'"),
            Self::Greater => f.write_str("'>'"),
            Self::Question => f.write_str("'?'"),
            Self::LParen => f.write_str("'('"),
            Self::RParen => f.write_str("')'"),
            Self::Arrow => f.write_str("'->'"),
            Self::Star => f.write_str("'*'"),
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '.' => {
                chars.next();
                tokens.push(Token::Dot);
            }
            ',' => {
                chars.next();
                tokens.push(Token::Comma);
            }
            '<' => {
                chars.next();
                tokens.push(Token::Less);
            }
            '>' => {
                chars.next();
                tokens.push(Token::Greater);
            }
            '?' => {
                chars.next();
                tokens.push(Token::Question);
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '*' => {
                chars.next();
                tokens.push(Token::Star);
            }
            '-' => {
                chars.next();
                if chars.next() != Some('>') {
                    return Err("expected '->'".into());
                }
                tokens.push(Token::Arrow);
            }
            c if c == '_' || c.is_alphabetic() => {
                let mut ident = String::new();
                while let Some(&c) = chars.peek() {
                    if c == '_' || c.is_alphanumeric() {
                        ident.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(ident));
            }
            other => return Err(format!("unexpected character '{}'", other)),
        }
    }
    if tokens.is_empty() {
        return Err("empty type".into());
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset)
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Token) -> Result<(), String> {
        if self.eat(token) {
            Ok(())
        } else {
            match self.peek() {
                Some(found) => Err(format!("expected {}, found {}", token, found)),
                None => Err(format!("expected {}, found end of input", token)),
            }
        }
    }

    fn parse_type(&mut self) -> Result<TypeRef, String> {
        let suspending = matches!(
            (self.peek(), self.peek_at(1)),
            (Some(Token::Ident(word)), Some(next))
                if word == "suspend" && *next != Token::Dot && *next != Token::Less
        );
        if suspending {
            self.pos += 1;
        }

        let ty = if self.peek() == Some(&Token::LParen) {
            self.parse_parenthesized(suspending)?
        } else {
            let named = self.parse_named()?;
            if self.peek() == Some(&Token::Dot) && self.peek_at(1) == Some(&Token::LParen) {
                self.pos += 1;
                self.parse_function(Some(named), suspending)?
            } else if suspending {
                return Err("'suspend' must precede a function type".into());
            } else {
                named
            }
        };
        Ok(ty)
    }

    /// `( ... )` is either a function parameter list or a grouped type.
    fn parse_parenthesized(&mut self, suspending: bool) -> Result<TypeRef, String> {
        let start = self.pos;
        self.expect(&Token::LParen)?;
        let mut depth = 1usize;
        let mut close = self.pos;
        while let Some(token) = self.tokens.get(close) {
            match token {
                Token::LParen => depth += 1,
                Token::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
            close += 1;
        }
        if self.tokens.get(close + 1) == Some(&Token::Arrow) {
            self.pos = start;
            return self.parse_function(None, suspending);
        }

        let mut inner = self.parse_type()?;
        self.expect(&Token::RParen)?;
        if self.eat(&Token::Question) {
            match &mut inner {
                TypeRef::Named { nullable, .. } | TypeRef::Function { nullable, .. } => {
                    *nullable = true
                }
                TypeRef::Star => return Err("'*' cannot be nullable".into()),
            }
        }
        Ok(inner)
    }

    fn parse_function(
        &mut self,
        receiver: Option<TypeRef>,
        suspending: bool,
    ) -> Result<TypeRef, String> {
        self.expect(&Token::LParen)?;
        let mut parameters = Vec::new();
        if !self.eat(&Token::RParen) {
            loop {
                parameters.push(self.parse_type()?);
                if self.eat(&Token::RParen) {
                    break;
                }
                self.expect(&Token::Comma)?;
            }
        }
        self.expect(&Token::Arrow)?;
        let returns = self.parse_type()?;
        Ok(TypeRef::Function {
            receiver: receiver.map(Box::new),
            parameters,
            returns: Box::new(returns),
            nullable: false,
            suspending,
        })
    }

    fn parse_named(&mut self) -> Result<TypeRef, String> {
        let mut name = self.ident()?;
        while self.peek() == Some(&Token::Dot)
            && matches!(self.peek_at(1), Some(Token::Ident(_)))
        {
            self.pos += 1;
            name.push('.');
            name.push_str(&self.ident()?);
        }

        let mut arguments = Vec::new();
        if self.eat(&Token::Less) {
            loop {
                if self.eat(&Token::Star) {
                    arguments.push(TypeRef::Star);
                } else {
                    if let Some(Token::Ident(word)) = self.peek() {
                        if (word == "in" || word == "out")
                            && matches!(self.peek_at(1), Some(Token::Ident(_)) | Some(Token::LParen))
                        {
                            return Err("variance projections are not supported".into());
                        }
                    }
                    arguments.push(self.parse_type()?);
                }
                if self.eat(&Token::Greater) {
                    break;
                }
                self.expect(&Token::Comma)?;
            }
        }
        let nullable = self.eat(&Token::Question);
        Ok(TypeRef::Named {
            name,
            arguments,
            nullable,
        })
    }

    fn ident(&mut self) -> Result<String, String> {
        match self.peek().cloned() {
            Some(Token::Ident(name)) => {
                self.pos += 1;
                Ok(name)
            }
            Some(other) => Err(format!("expected a name, found {}", other)),
            None => Err("expected a name, found end of input".into()),
        }
    }
}

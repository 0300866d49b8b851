// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Structural type references.
//!
//! A [`TypeRef`] is what the classifier matches against and what the C#
//! backend prints back out. It keeps only the shape: the qualified name of
//! the (unparameterized) definition, the generic arguments, and an opaque
//! suffix for array and nullable markers.
//!
//! ```
//! use crosschannel_core::declaration::TypeRef;
//!
//! let ty: TypeRef = "System.Threading.Tasks.Task<CrossChannel.RadioResult<int>>"
//!     .parse()
//!     .unwrap();
//! assert_eq!(ty.name(), "System.Threading.Tasks.Task");
//! assert_eq!(ty.arity(), 1);
//! assert_eq!(ty.arguments()[0].name(), "CrossChannel.RadioResult");
//! ```

use ecow::EcoString;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while parsing C# type syntax.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeRefParseError {
    /// The input contained no type at all.
    #[error("empty type reference")]
    Empty,

    /// A character that cannot start or continue a type name.
    #[error("unexpected '{found}' at offset {offset} in type reference")]
    UnexpectedChar { found: char, offset: usize },

    /// A generic argument list or tuple was never closed.
    #[error("unclosed '{open}' opened at offset {offset} in type reference")]
    Unclosed { open: char, offset: usize },

    /// Input remained after a complete type.
    #[error("trailing input at offset {offset} in type reference")]
    TrailingInput { offset: usize },
}

/// A structural reference to a (possibly generic) type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TypeRef {
    name: EcoString,
    arguments: Vec<TypeRef>,
    suffix: EcoString,
}

impl TypeRef {
    /// A non-generic type reference such as `int` or `Demo.Payload`.
    #[must_use]
    pub fn simple(name: impl Into<EcoString>) -> Self {
        Self {
            name: name.into(),
            arguments: Vec::new(),
            suffix: EcoString::new(),
        }
    }

    /// A generic type reference such as `CrossChannel.RadioResult<int>`.
    #[must_use]
    pub fn generic(name: impl Into<EcoString>, arguments: Vec<TypeRef>) -> Self {
        Self {
            name: name.into(),
            arguments,
            suffix: EcoString::new(),
        }
    }

    /// Appends array / nullable markers.
    #[must_use]
    pub fn with_suffix(mut self, suffix: &str) -> Self {
        self.suffix.push_str(suffix);
        self
    }

    /// The `void` pseudo-type.
    #[must_use]
    pub fn void() -> Self {
        Self::simple("void")
    }

    /// Qualified name of the unparameterized definition.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Generic arguments, in declaration order.
    #[must_use]
    pub fn arguments(&self) -> &[TypeRef] {
        &self.arguments
    }

    /// Number of generic arguments.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.arguments.len()
    }

    /// Array / nullable markers that follow the type (`[]`, `?`).
    #[must_use]
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Structural match on the unparameterized definition: same qualified
    /// name, same arity, and no array or nullable suffix.
    #[must_use]
    pub fn is_definition(&self, name: &str, arity: usize) -> bool {
        self.suffix.is_empty() && self.arity() == arity && self.name == name
    }

    /// Returns the last dot-separated segment of the name.
    #[must_use]
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.arguments.is_empty() {
            f.write_str("<")?;
            for (i, arg) in self.arguments.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{arg}")?;
            }
            f.write_str(">")?;
        }
        f.write_str(&self.suffix)
    }
}

impl FromStr for TypeRef {
    type Err = TypeRefParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parser = Parser { src: s, pos: 0 };
        parser.skip_ws();
        if parser.at_end() {
            return Err(TypeRefParseError::Empty);
        }
        let ty = parser.parse_type()?;
        parser.skip_ws();
        if parser.at_end() {
            Ok(ty)
        } else {
            Err(TypeRefParseError::TrailingInput { offset: parser.pos })
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

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn is_name_char(c: char) -> bool {
        c.is_alphanumeric() || matches!(c, '_' | '.' | '@' | ':')
    }

    fn parse_type(&mut self) -> Result<TypeRef, TypeRefParseError> {
        self.skip_ws();
        let name = match self.peek() {
            Some('(') => self.parse_tuple()?,
            Some(c) if Self::is_name_char(c) && c != '.' => self.parse_name().to_owned(),
            Some(found) => {
                return Err(TypeRefParseError::UnexpectedChar {
                    found,
                    offset: self.pos,
                });
            }
            None => return Err(TypeRefParseError::Empty),
        };

        self.skip_ws();
        let mut arguments = Vec::new();
        if self.peek() == Some('<') {
            let open = self.pos;
            self.bump();
            loop {
                arguments.push(self.parse_type()?);
                self.skip_ws();
                match self.bump() {
                    Some(',') => {}
                    Some('>') => break,
                    Some(found) => {
                        return Err(TypeRefParseError::UnexpectedChar {
                            found,
                            offset: self.pos - found.len_utf8(),
                        });
                    }
                    None => {
                        return Err(TypeRefParseError::Unclosed {
                            open: '<',
                            offset: open,
                        });
                    }
                }
            }
        }

        let suffix = self.parse_suffix()?;
        Ok(TypeRef {
            name: name.into(),
            arguments,
            suffix: suffix.into(),
        })
    }

    fn parse_name(&mut self) -> &str {
        let start = self.pos;
        while self.peek().is_some_and(Self::is_name_char) {
            self.bump();
        }
        &self.src[start..self.pos]
    }

    // Tuples are opaque to the classifier, so they are kept verbatim.
    fn parse_tuple(&mut self) -> Result<String, TypeRefParseError> {
        let start = self.pos;
        let mut depth = 0usize;
        while let Some(c) = self.bump() {
            match c {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(self.src[start..self.pos].to_string());
                    }
                }
                _ => {}
            }
        }
        Err(TypeRefParseError::Unclosed {
            open: '(',
            offset: start,
        })
    }

    fn parse_suffix(&mut self) -> Result<String, TypeRefParseError> {
        let mut suffix = String::new();
        loop {
            self.skip_ws();
            match self.peek() {
                Some('?' | '*') => {
                    if let Some(c) = self.bump() {
                        suffix.push(c);
                    }
                }
                Some('[') => {
                    let open = self.pos;
                    self.bump();
                    suffix.push('[');
                    loop {
                        match self.bump() {
                            Some(']') => break,
                            Some(',') => suffix.push(','),
                            Some(c) if c.is_whitespace() => {}
                            Some(found) => {
                                return Err(TypeRefParseError::UnexpectedChar {
                                    found,
                                    offset: self.pos - found.len_utf8(),
                                });
                            }
                            None => {
                                return Err(TypeRefParseError::Unclosed {
                                    open: '[',
                                    offset: open,
                                });
                            }
                        }
                    }
                    suffix.push(']');
                }
                _ => return Ok(suffix),
            }
        }
    }
}

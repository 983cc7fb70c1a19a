use std::{
    collections::HashSet,
    fmt::{self, Display},
};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::{Error, Result},
    value::{Symbol, Value},
};

pub mod parse;

/// A method signature such as `test?(a = "a")` or `find(id, limit: 10)`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Signature {
    /// Name the method is exposed under. When absent, the method takes the
    /// name of the Rust function it is registered with.
    pub name: Option<Symbol>,
    pub params: Vec<Param>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Param {
    pub name: Symbol,
    pub kind: ParamKind,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum ParamKind {
    Required,
    Optional(DefaultValue),
    /// Keyword parameter; `None` makes the keyword mandatory.
    Keyword(Option<DefaultValue>),
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum DefaultValue {
    Nil,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Symbol(Symbol),
}

impl DefaultValue {
    pub fn to_value(&self) -> Value {
        match self {
            DefaultValue::Nil => Value::Nil,
            DefaultValue::Boolean(b) => Value::Boolean(*b),
            DefaultValue::Integer(n) => Value::Integer(*n),
            DefaultValue::Float(x) => Value::Float(*x),
            DefaultValue::String(s) => Value::String(s.clone()),
            DefaultValue::Symbol(s) => Value::Symbol(s.clone()),
        }
    }
}

impl Display for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_value())
    }
}

/// Number of positional arguments a signature accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Arity {
    pub required: usize,
    pub optional: usize,
}

impl Arity {
    pub fn accepts(&self, given: usize) -> bool {
        self.required <= given && given <= self.required + self.optional
    }
}

impl Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.optional == 0 {
            write!(f, "{}", self.required)
        } else {
            write!(f, "{}..{}", self.required, self.required + self.optional)
        }
    }
}

impl Signature {
    /// Parses a complete signature, rejecting trailing input and repeated
    /// parameter names.
    pub fn parse(input: &str) -> Result<Self> {
        let (rest, signature) =
            parse::parse_signature(input).map_err(|_| Error::Signature(input.to_string()))?;
        if !rest.trim().is_empty() {
            debug!(?rest, "trailing input after signature");
            return Err(Error::Signature(input.to_string()));
        }

        let mut seen = HashSet::new();
        for param in &signature.params {
            if !seen.insert(param.name.as_str()) {
                return Err(Error::DuplicateParam(param.name.clone()));
            }
        }
        debug!(%signature, "parsed signature");
        Ok(signature)
    }

    pub fn arity(&self) -> Arity {
        self.params.iter().fold(
            Arity {
                required: 0,
                optional: 0,
            },
            |mut acc, p| {
                match p.kind {
                    ParamKind::Required => acc.required += 1,
                    ParamKind::Optional(_) => acc.optional += 1,
                    ParamKind::Keyword(_) => {}
                }
                acc
            },
        )
    }

    pub fn has_keywords(&self) -> bool {
        self.params
            .iter()
            .any(|p| matches!(p.kind, ParamKind::Keyword(_)))
    }

    /// Fills in the method name from `fn_name` when the signature has none.
    pub fn named(mut self, fn_name: &str) -> Self {
        if self.name.is_none() {
            self.name = Some(fn_name.to_string());
        }
        self
    }

    pub fn method_name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}

impl Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ParamKind::Required => write!(f, "{}", self.name),
            ParamKind::Optional(d) => write!(f, "{} = {}", self.name, d),
            ParamKind::Keyword(Some(d)) => write!(f, "{}: {}", self.name, d),
            ParamKind::Keyword(None) => write!(f, "{}:", self.name),
        }
    }
}

impl Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.method_name())?;
        if !self.params.is_empty() {
            let params: Vec<String> = self.params.iter().map(|p| p.to_string()).collect();
            write!(f, "({})", params.join(", "))?;
        }
        Ok(())
    }
}

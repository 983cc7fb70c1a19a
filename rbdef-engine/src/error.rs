use thiserror::Error;

use crate::value::ValueKind;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("wrong number of arguments (given {given}, expected {expected})")]
    Arity { given: usize, expected: String },
    #[error("missing argument `{0}`")]
    MissingArgument(String),
    #[error("missing keyword: :{0}")]
    MissingKeyword(String),
    #[error("unknown keyword: :{0}")]
    UnknownKeyword(String),
    #[error("no implicit conversion of {found} into {expected}")]
    Type { expected: ValueKind, found: ValueKind },
    #[error("undefined method `{method}' for {receiver}")]
    NoMethod { method: String, receiver: String },
    #[error("invalid attribute name `{0}'")]
    InvalidName(String),
    #[error("uninitialized constant {0}")]
    UninitializedConstant(String),
    #[error("{0} field is nil.")]
    NilField(String),
    #[error("parsing signature `{0}` failed")]
    Signature(String),
    #[error("duplicated argument name `{0}`")]
    DuplicateParam(String),
    #[error("parsing call `{0}` failed")]
    Call(String),
}

impl Error {
    /// Name of the exception class this error is raised as.
    pub fn exception_class(&self) -> &'static str {
        use Error::*;
        match self {
            Arity { .. } | MissingArgument(_) | MissingKeyword(_) | UnknownKeyword(_) => {
                "ArgumentError"
            }
            Type { .. } => "TypeError",
            NoMethod { .. } => "NoMethodError",
            InvalidName(_) | UninitializedConstant(_) => "NameError",
            NilField(_) => "StandardError",
            Signature(_) | DuplicateParam(_) | Call(_) => "SyntaxError",
        }
    }

    pub(crate) fn type_mismatch(expected: ValueKind, found: ValueKind) -> Self {
        Error::Type { expected, found }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

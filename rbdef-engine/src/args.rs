use tracing::trace;

use crate::{
    error::{Error, Result},
    signature::{ParamKind, Signature},
    value::{FromValue, Symbol, Value},
};

/// Call arguments matched against a [`Signature`], by parameter name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoundArgs {
    values: Vec<(Symbol, Value)>,
}

impl BoundArgs {
    pub fn get<T: FromValue>(&self, name: &str) -> Result<T> {
        self.value(name)
            .ok_or_else(|| Error::MissingArgument(name.to_string()))
            .and_then(T::from_value)
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn push(&mut self, name: &str, value: Value) {
        self.values.push((name.to_string(), value));
    }
}

/// Binds `args` to the parameters of `signature`.
///
/// A trailing hash is taken as keyword arguments when the signature declares
/// keywords. Optional positional parameters are filled left to right with
/// whatever is left after every required parameter has its argument.
pub fn bind(signature: &Signature, args: &[Value]) -> Result<BoundArgs> {
    let (positional, keywords) = match args.split_last() {
        Some((last @ Value::Hash(_), rest)) if signature.has_keywords() => (rest, Some(last)),
        _ => (args, None),
    };

    let arity = signature.arity();
    if !arity.accepts(positional.len()) {
        return Err(Error::Arity {
            given: positional.len(),
            expected: arity.to_string(),
        });
    }

    let mut surplus = positional.len() - arity.required;
    let mut positional = positional.iter();
    let mut bound = BoundArgs::default();

    for param in &signature.params {
        match &param.kind {
            ParamKind::Required => {
                let value = positional
                    .next()
                    .ok_or_else(|| Error::MissingArgument(param.name.clone()))?;
                bound.push(&param.name, value.clone());
            }
            ParamKind::Optional(default) => {
                let value = if surplus > 0 {
                    surplus -= 1;
                    positional
                        .next()
                        .cloned()
                        .ok_or_else(|| Error::MissingArgument(param.name.clone()))?
                } else {
                    trace!(param = %param.name, %default, "using default");
                    default.to_value()
                };
                bound.push(&param.name, value);
            }
            ParamKind::Keyword(default) => {
                let key = Value::Symbol(param.name.clone());
                let value = match (keywords.and_then(|h| h.hash_get(&key)), default) {
                    (Some(v), _) => v.clone(),
                    (None, Some(default)) => default.to_value(),
                    (None, None) => return Err(Error::MissingKeyword(param.name.clone())),
                };
                bound.push(&param.name, value);
            }
        }
    }

    if let Some(Value::Hash(pairs)) = keywords {
        for (key, _) in pairs {
            let known = matches!(key, Value::Symbol(k) if signature
                .params
                .iter()
                .any(|p| &p.name == k && matches!(p.kind, ParamKind::Keyword(_))));
            if !known {
                let name = match key {
                    Value::Symbol(k) | Value::String(k) => k.clone(),
                    other => other.to_string(),
                };
                return Err(Error::UnknownKeyword(name));
            }
        }
    }

    Ok(bound)
}

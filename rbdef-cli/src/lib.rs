pub mod call;

use std::fmt::{self, Display};

use anyhow::{Context, Result};
use rbdef_engine::{
    class::{MethodKind, Object},
    error::Error,
    signature::{Param, ParamKind, Signature},
    Registry, Value,
};
use serde::Serialize;
use tracing::{debug, warn};

use crate::call::{parse_call, parse_value_str};

pub mod call_error {
    use rbdef_engine::error::Error;

    /// Renders an engine error as `<ExceptionClass>: <message>`.
    pub fn raise(e: Error) -> anyhow::Error {
        anyhow::anyhow!("{}: {}", e.exception_class(), e)
    }
}

use call_error::raise;

/// What a call evaluated to.
#[derive(Debug, Clone)]
pub enum Outcome {
    Value(Value),
    Object(Object),
}

impl Outcome {
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Outcome::Value(v) => serde_json::Value::from(v),
            Outcome::Object(obj) => {
                let mut map = serde_json::Map::new();
                map.insert("class".to_string(), obj.class().name().into());
                for attr in obj.class().attributes() {
                    let value = obj.get(attr).unwrap_or_default();
                    map.insert(attr.clone(), serde_json::Value::from(&value));
                }
                serde_json::Value::Object(map)
            }
        }
    }
}

impl Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Value(v) => write!(f, "{}", v),
            Outcome::Object(obj) => write!(f, "{}", obj),
        }
    }
}

/// Parses a `name=value` pair given to `--set`.
pub fn parse_setting(s: &str) -> Result<(String, Value)> {
    let (name, value) = s
        .split_once('=')
        .with_context(|| format!("expected `name=value`, got `{}`", s))?;
    let value = parse_value_str(value)
        .map_err(raise)
        .with_context(|| format!("parsing value of `{}` failed", name))?;
    Ok((name.trim().to_string(), value))
}

/// Evaluates `call_str` against `registry`.
///
/// `Foo.new` yields a fresh instance with `attrs` applied. A class-level
/// method is called on the class directly. An instance method or accessor is
/// sent to a fresh instance after `attrs` are applied through their writers.
/// Anything else is reported against the class.
pub fn perform_call(
    registry: &Registry,
    call_str: &str,
    attrs: &[(String, Value)],
) -> Result<Outcome> {
    tracing::info!("performing call `{}`", call_str);

    let call = parse_call(call_str)
        .map_err(raise)
        .with_context(|| format!("parsing call `{}` failed", call_str))?;
    debug!(?call);

    let class = registry.get(&call.receiver).map_err(raise)?;

    if call.method != "new" && class.find(MethodKind::Singleton, &call.method).is_some() {
        if !attrs.is_empty() {
            warn!("attributes are ignored for class-level method `{}`", call.method);
        }
        return class
            .call(&call.method, &call.args)
            .map(Outcome::Value)
            .map_err(raise);
    }

    let responds = call.method == "new"
        || class.find(MethodKind::Instance, &call.method).is_some()
        || class.attributes().iter().any(|a| {
            a == &call.method || call.method.strip_suffix('=') == Some(a.as_str())
        });
    if !responds {
        return Err(raise(Error::NoMethod {
            method: call.method.clone(),
            receiver: format!("{}:Class", class.name()),
        }));
    }

    let mut obj = Object::new(class);
    for (name, value) in attrs {
        obj.send(&format!("{}=", name), std::slice::from_ref(value))
            .map_err(raise)
            .with_context(|| format!("setting `{}` failed", name))?;
    }
    debug!(%obj, "instance ready");

    if call.method == "new" {
        if !call.args.is_empty() {
            return Err(raise(Error::Arity {
                given: call.args.len(),
                expected: "0".to_string(),
            }));
        }
        return Ok(Outcome::Object(obj));
    }

    obj.send(&call.method, &call.args)
        .map(Outcome::Value)
        .map_err(raise)
}

#[derive(Debug, Clone, Serialize)]
pub struct SignatureEntry {
    pub class: String,
    pub kind: &'static str,
    pub signature: Signature,
    pub display: String,
}

/// Every method signature in `registry`, accessors included.
pub fn signatures(registry: &Registry) -> Vec<SignatureEntry> {
    let mut entries = vec![];
    for class in registry.classes.values() {
        for attr in class.attributes() {
            let reader = Signature {
                name: Some(attr.clone()),
                params: vec![],
            };
            let writer = Signature {
                name: Some(format!("{}=", attr)),
                params: vec![Param {
                    name: attr.clone(),
                    kind: ParamKind::Required,
                }],
            };
            for signature in [reader, writer] {
                entries.push(SignatureEntry {
                    class: class.name().to_string(),
                    kind: "accessor",
                    display: signature.to_string(),
                    signature,
                });
            }
        }
        for method in class.methods() {
            let kind = match method.kind() {
                MethodKind::Singleton => "singleton",
                MethodKind::Instance => "instance",
            };
            entries.push(SignatureEntry {
                class: class.name().to_string(),
                kind,
                display: method.signature.to_string(),
                signature: method.signature.clone(),
            });
        }
    }
    entries
}

use std::{
    collections::HashMap,
    fmt::{self, Display},
    sync::Arc,
};

use tracing::{debug, instrument};

use crate::{
    args::{bind, BoundArgs},
    error::{Error, Result},
    signature::{parse::parse_identifier, Signature},
    value::{Symbol, Value},
};

pub type SingletonFn = fn(&BoundArgs) -> Result<Value>;
pub type InstanceFn = fn(&Object, &BoundArgs) -> Result<Value>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MethodKind {
    Singleton,
    Instance,
}

#[derive(Clone, Copy)]
enum MethodBody {
    Singleton(SingletonFn),
    Instance(InstanceFn),
}

impl fmt::Debug for MethodBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodBody::Singleton(_) => write!(f, "Singleton(..)"),
            MethodBody::Instance(_) => write!(f, "Instance(..)"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct MethodDef {
    /// Name of the Rust function backing the method.
    pub fn_name: String,
    pub signature: Signature,
    body: MethodBody,
}

impl MethodDef {
    pub fn name(&self) -> &str {
        self.signature.method_name()
    }

    pub fn kind(&self) -> MethodKind {
        match self.body {
            MethodBody::Singleton(_) => MethodKind::Singleton,
            MethodBody::Instance(_) => MethodKind::Instance,
        }
    }
}

/// A class: attribute accessors plus methods bound by signature.
#[derive(Clone, Debug)]
pub struct ClassDef {
    name: Symbol,
    attributes: Vec<Symbol>,
    methods: Vec<MethodDef>,
}

impl ClassDef {
    pub fn new(name: impl Into<Symbol>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declares an attribute with a reader `name` and a writer `name=`.
    pub fn attribute(mut self, name: impl Into<Symbol>) -> Result<Self> {
        let name = name.into();
        match parse_identifier::<nom::error::Error<&str>>(&name) {
            Ok(("", _)) => {}
            _ => return Err(Error::InvalidName(name)),
        }
        if !self.has_attribute(&name) {
            self.attributes.push(name);
        }
        Ok(self)
    }

    pub fn attributes(&self) -> &[Symbol] {
        &self.attributes
    }

    pub fn methods(&self) -> &[MethodDef] {
        &self.methods
    }

    pub fn define_singleton(self, fn_name: &str, signature: &str, body: SingletonFn) -> Result<Self> {
        self.define(fn_name, signature, MethodBody::Singleton(body))
    }

    pub fn define_instance(self, fn_name: &str, signature: &str, body: InstanceFn) -> Result<Self> {
        self.define(fn_name, signature, MethodBody::Instance(body))
    }

    fn define(mut self, fn_name: &str, signature: &str, body: MethodBody) -> Result<Self> {
        let signature = Signature::parse(signature)?.named(fn_name);
        debug!(class = %self.name, %signature, "defining method");
        let def = MethodDef {
            fn_name: fn_name.to_string(),
            signature,
            body,
        };
        // A later definition replaces an earlier one of the same kind and name.
        match self
            .methods
            .iter_mut()
            .find(|m| m.kind() == def.kind() && m.name() == def.name())
        {
            Some(existing) => *existing = def,
            None => self.methods.push(def),
        }
        Ok(self)
    }

    pub fn find(&self, kind: MethodKind, name: &str) -> Option<&MethodDef> {
        self.methods
            .iter()
            .find(|m| m.kind() == kind && m.name() == name)
    }

    fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| a == name)
    }

    /// Calls a class-level method.
    #[instrument(level = "debug", skip(self), fields(class = %self.name))]
    pub fn call(&self, method: &str, args: &[Value]) -> Result<Value> {
        let def = self
            .find(MethodKind::Singleton, method)
            .ok_or_else(|| Error::NoMethod {
                method: method.to_string(),
                receiver: format!("{}:Class", self.name),
            })?;
        let bound = bind(&def.signature, args)?;
        match def.body {
            MethodBody::Singleton(f) => f(&bound),
            MethodBody::Instance(_) => unreachable!("found by singleton kind"),
        }
    }
}

/// An instance of a [`ClassDef`]. Unset attributes read as `nil`.
#[derive(Clone, Debug)]
pub struct Object {
    class: Arc<ClassDef>,
    ivars: HashMap<Symbol, Value>,
}

impl Object {
    pub fn new(class: Arc<ClassDef>) -> Self {
        Self {
            class,
            ivars: HashMap::new(),
        }
    }

    pub fn class(&self) -> &ClassDef {
        &self.class
    }

    fn no_method(&self, method: &str) -> Error {
        Error::NoMethod {
            method: method.to_string(),
            receiver: format!("an instance of {}", self.class.name),
        }
    }

    pub fn get(&self, attr: &str) -> Result<Value> {
        if !self.class.has_attribute(attr) {
            return Err(self.no_method(attr));
        }
        Ok(self.ivars.get(attr).cloned().unwrap_or_default())
    }

    pub fn set(&mut self, attr: &str, value: Value) -> Result<()> {
        if !self.class.has_attribute(attr) {
            return Err(self.no_method(&format!("{}=", attr)));
        }
        self.ivars.insert(attr.to_string(), value);
        Ok(())
    }

    /// Sends `method` to this object. Attribute accessors are tried before
    /// instance methods.
    #[instrument(level = "debug", skip(self), fields(class = %self.class.name))]
    pub fn send(&mut self, method: &str, args: &[Value]) -> Result<Value> {
        if self.class.has_attribute(method) {
            check_accessor_arity(args, 0)?;
            return self.get(method);
        }
        if let Some(attr) = method.strip_suffix('=') {
            if self.class.has_attribute(attr) {
                check_accessor_arity(args, 1)?;
                self.set(attr, args[0].clone())?;
                return Ok(args[0].clone());
            }
        }

        let class = Arc::clone(&self.class);
        let def = class
            .find(MethodKind::Instance, method)
            .ok_or_else(|| self.no_method(method))?;
        let bound = bind(&def.signature, args)?;
        match def.body {
            MethodBody::Instance(f) => f(self, &bound),
            MethodBody::Singleton(_) => unreachable!("found by instance kind"),
        }
    }
}

fn check_accessor_arity(args: &[Value], expected: usize) -> Result<()> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(Error::Arity {
            given: args.len(),
            expected: expected.to_string(),
        })
    }
}

impl Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<{}", self.class.name)?;
        let ivars: Vec<String> = self
            .class
            .attributes
            .iter()
            .filter_map(|a| self.ivars.get(a).map(|v| format!("{}={}", a, v)))
            .collect();
        if !ivars.is_empty() {
            write!(f, " {}", ivars.join(", "))?;
        }
        write!(f, ">")
    }
}

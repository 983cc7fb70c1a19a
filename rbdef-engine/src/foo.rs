//! The `Foo` class: two attributes, a class-level `test?` and an instance
//! `_hoge!`, both of which return their argument or a declared default.

use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::{
    args::BoundArgs,
    class::{ClassDef, Object},
    error::{Error, Result},
    value::Value,
};

const TEST_SIGNATURE: &str = r#"test?(a = "a")"#;
const HOGE_SIGNATURE: &str = r#"_hoge!(b = "-112")"#;

const TEST_DEFAULT: &str = "a";
const HOGE_DEFAULT: &str = "-112";

static FOO_CLASS: Lazy<Arc<ClassDef>> = Lazy::new(|| {
    Arc::new(define().expect("Foo signatures SHOULD ALWAYS parse"))
});

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Foo {
    pub foo1: String,
    pub foo2: i64,
}

impl Foo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `a`, or `"a"` when called without an argument.
    pub fn test(a: Option<&str>) -> String {
        a.unwrap_or(TEST_DEFAULT).to_string()
    }

    /// Returns `b`, or `"-112"` when called without an argument.
    pub fn hoge(&self, b: Option<&str>) -> String {
        b.unwrap_or(HOGE_DEFAULT).to_string()
    }

    /// The runtime class backing `Foo`.
    pub fn class() -> Arc<ClassDef> {
        Arc::clone(&FOO_CLASS)
    }

    pub fn into_object(self) -> Object {
        let mut obj = Object::new(Self::class());
        obj.set("foo1", self.foo1.into())
            .and_then(|_| obj.set("foo2", self.foo2.into()))
            .expect("foo1 and foo2 are declared attributes");
        obj
    }
}

impl TryFrom<&Object> for Foo {
    type Error = Error;

    fn try_from(obj: &Object) -> Result<Self> {
        let field = |name: &str| -> Result<Value> {
            let value = obj.get(name)?;
            if value.is_nil() {
                Err(Error::NilField(name.to_string()))
            } else {
                Ok(value)
            }
        };

        Ok(Foo {
            foo1: field("foo1")?.convert()?,
            foo2: field("foo2")?.convert()?,
        })
    }
}

fn rb_test(args: &BoundArgs) -> Result<Value> {
    let a: String = args.get("a")?;
    Ok(Foo::test(Some(&a)).into())
}

fn rb_hoge(obj: &Object, args: &BoundArgs) -> Result<Value> {
    let foo = Foo::try_from(obj)?;
    let b: String = args.get("b")?;
    Ok(foo.hoge(Some(&b)).into())
}

pub(crate) fn define() -> Result<ClassDef> {
    ClassDef::new("Foo")
        .attribute("foo1")?
        .attribute("foo2")?
        .define_singleton("test", TEST_SIGNATURE, rb_test)?
        .define_instance("hoge", HOGE_SIGNATURE, rb_hoge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueKind;

    #[test]
    fn class_definition_parses() {
        let class = define().unwrap();
        let names: Vec<&str> = class.methods().iter().map(|m| m.name()).collect();
        assert_eq!(names, vec!["test?", "_hoge!"]);
        assert_eq!(class.attributes(), &["foo1".to_string(), "foo2".to_string()]);
    }

    #[test]
    fn typed_defaults_match_signature_defaults() {
        assert_eq!(
            Foo::class().call("test?", &[]).unwrap(),
            Value::from(Foo::test(None))
        );
        let mut obj = Foo {
            foo1: "x".into(),
            foo2: 1,
        }
        .into_object();
        assert_eq!(
            obj.send("_hoge!", &[]).unwrap(),
            Value::from(Foo::new().hoge(None))
        );
    }

    #[test]
    fn hoge_needs_both_fields() {
        let mut obj = Object::new(Foo::class());
        assert_eq!(
            obj.send("_hoge!", &[]),
            Err(Error::NilField("foo1".into()))
        );
        obj.set("foo1", "hoge 1".into()).unwrap();
        assert_eq!(
            obj.send("_hoge!", &[]),
            Err(Error::NilField("foo2".into()))
        );
        obj.set("foo2", "100".into()).unwrap();
        assert_eq!(
            obj.send("_hoge!", &[]),
            Err(Error::Type {
                expected: ValueKind::Integer,
                found: ValueKind::String
            })
        );
    }

    #[test]
    fn object_round_trips_to_typed_foo() {
        let foo = Foo {
            foo1: "hoge 1".into(),
            foo2: 100,
        };
        let obj = foo.clone().into_object();
        assert_eq!(Foo::try_from(&obj).unwrap(), foo);
    }
}

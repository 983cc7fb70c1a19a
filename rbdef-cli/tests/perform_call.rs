use rbdef_cli::{parse_setting, perform_call, Outcome};
use rbdef_engine::{Registry, Value};

fn foo_attrs() -> Vec<(String, Value)> {
    vec![
        parse_setting(r#"foo1="hoge 1""#).unwrap(),
        parse_setting("foo2=100").unwrap(),
    ]
}

fn value_of(outcome: Outcome) -> Value {
    match outcome {
        Outcome::Value(v) => v,
        Outcome::Object(obj) => panic!("expected a value, got {}", obj),
    }
}

#[test]
fn new_foo_is_an_object() {
    let registry = Registry::builtin();
    let outcome = perform_call(&registry, "Foo.new", &[]).unwrap();
    assert!(matches!(outcome, Outcome::Object(_)));
    assert_eq!(outcome.to_string(), "#<Foo>");
    assert_eq!(
        outcome.to_json(),
        serde_json::json!({ "class": "Foo", "foo1": null, "foo2": null })
    );

    let outcome = perform_call(&registry, "Foo.new", &foo_attrs()).unwrap();
    assert_eq!(outcome.to_string(), r#"#<Foo foo1="hoge 1", foo2=100>"#);
}

#[test]
fn singleton_calls() {
    let registry = Registry::builtin();
    let v = value_of(perform_call(&registry, r#"Foo.test?("test a")"#, &[]).unwrap());
    assert_eq!(v, Value::from("test a"));
    let v = value_of(perform_call(&registry, "Foo.test?", &[]).unwrap());
    assert_eq!(v, Value::from("a"));
}

#[test]
fn instance_calls_apply_attributes_first() {
    let registry = Registry::builtin();
    let v = value_of(perform_call(&registry, r#"Foo._hoge!("test b")"#, &foo_attrs()).unwrap());
    assert_eq!(v, Value::from("test b"));
    let outcome = perform_call(&registry, "Foo._hoge!", &foo_attrs()).unwrap();
    assert_eq!(outcome.to_string(), r#""-112""#);
    assert_eq!(outcome.to_json(), serde_json::json!("-112"));
}

#[test]
fn accessors_are_sent_to_the_instance() {
    let registry = Registry::builtin();
    let v = value_of(perform_call(&registry, "Foo.foo1", &foo_attrs()).unwrap());
    assert_eq!(v, Value::from("hoge 1"));
    let v = value_of(perform_call(&registry, "Foo.foo2=(7)", &[]).unwrap());
    assert_eq!(v, Value::Integer(7));
}

#[test]
fn errors_carry_exception_class() {
    let registry = Registry::builtin();

    let err = perform_call(&registry, "Foo._hoge!", &[]).unwrap_err();
    assert_eq!(err.to_string(), "StandardError: foo1 field is nil.");

    let err = perform_call(&registry, "Bar.new", &[]).unwrap_err();
    assert_eq!(err.to_string(), "NameError: uninitialized constant Bar");

    let err = perform_call(&registry, "Foo.missing", &[]).unwrap_err();
    assert_eq!(
        err.to_string(),
        "NoMethodError: undefined method `missing' for Foo:Class"
    );

    let err = perform_call(&registry, "Foo.foo3=(1)", &[]).unwrap_err();
    assert_eq!(
        err.to_string(),
        "NoMethodError: undefined method `foo3=' for Foo:Class"
    );

    let attrs = vec![("size".to_string(), Value::Integer(1))];
    let err = perform_call(&registry, "Foo._hoge!", &attrs).unwrap_err();
    assert_eq!(err.to_string(), "setting `size` failed");

    let err = perform_call(&registry, "Foo.test?(", &[]).unwrap_err();
    assert_eq!(err.to_string(), "parsing call `Foo.test?(` failed");
}

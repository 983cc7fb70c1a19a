use nom::{
    branch::alt,
    bytes::complete::{tag, take_while},
    character::complete::{char, multispace0, satisfy},
    combinator::{map, opt, recognize},
    error::{ContextError, ParseError},
    multi::separated_list0,
    sequence::{delimited, pair, preceded, separated_pair, tuple},
    IResult,
};
use rbdef_engine::{
    error::{Error, Result},
    signature::{
        parse::{parse_identifier, parse_literal, parse_method_name},
        DefaultValue,
    },
    value::Symbol,
    Value,
};

/// `Receiver.method(args)`, e.g. `Foo.test?("test a")`.
#[derive(Clone, Debug, PartialEq)]
pub struct Call {
    pub receiver: Symbol,
    pub method: Symbol,
    pub args: Vec<Value>,
}

enum Arg {
    Positional(Value),
    Keyword(Symbol, Value),
}

/// Parses a whole call expression. Trailing `key: value` arguments are
/// gathered into a final hash.
pub fn parse_call(input: &str) -> Result<Call> {
    match parse_call_expr::<nom::error::Error<&str>>(input) {
        Ok((rest, call)) if rest.trim().is_empty() => Ok(call),
        _ => Err(Error::Call(input.to_string())),
    }
}

/// Parses a single value, such as the right-hand side of `--set foo2=100`.
pub fn parse_value_str(input: &str) -> Result<Value> {
    match delimited(multispace0, parse_value::<nom::error::Error<&str>>, multispace0)(input) {
        Ok(("", value)) => Ok(value),
        _ => Err(Error::Call(input.to_string())),
    }
}

fn parse_constant<'a, E>(i: &'a str) -> IResult<&'a str, Symbol, E>
where
    E: ParseError<&'a str> + ContextError<&'a str>,
{
    map(
        recognize(pair(
            satisfy(|c| c.is_ascii_uppercase()),
            take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'),
        )),
        |name: &str| name.to_string(),
    )(i)
}

fn parse_call_expr<'a, E>(i: &'a str) -> IResult<&'a str, Call, E>
where
    E: ParseError<&'a str> + ContextError<&'a str>,
{
    let (i, (_, receiver, _, method)) = tuple((
        multispace0,
        parse_constant,
        char('.'),
        parse_method_name,
    ))(i)?;
    let (i, args) = opt(preceded(multispace0, parse_arguments))(i)?;

    let mut positional = Vec::new();
    let mut keywords = Vec::new();
    for arg in args.unwrap_or_default() {
        match arg {
            Arg::Positional(v) => positional.push(v),
            Arg::Keyword(k, v) => keywords.push((Value::Symbol(k), v)),
        }
    }
    if !keywords.is_empty() {
        positional.push(keywords.into_iter().collect());
    }

    let call = Call {
        receiver,
        method,
        args: positional,
    };
    Ok((i, call))
}

fn parse_arguments<'a, E>(i: &'a str) -> IResult<&'a str, Vec<Arg>, E>
where
    E: ParseError<&'a str> + ContextError<&'a str>,
{
    delimited(
        char('('),
        separated_list0(
            char(','),
            delimited(
                multispace0,
                alt((
                    map(parse_keyword_pair, |(k, v): (Symbol, Value)| Arg::Keyword(k, v)),
                    map(parse_value, Arg::Positional),
                )),
                multispace0,
            ),
        ),
        preceded(multispace0, char(')')),
    )(i)
}

fn parse_keyword_pair<'a, E>(i: &'a str) -> IResult<&'a str, (Symbol, Value), E>
where
    E: ParseError<&'a str> + ContextError<&'a str>,
{
    separated_pair(
        parse_identifier,
        pair(char(':'), multispace0),
        parse_value,
    )(i)
}

fn parse_value<'a, E>(i: &'a str) -> IResult<&'a str, Value, E>
where
    E: ParseError<&'a str> + ContextError<&'a str>,
{
    alt((parse_hash, map(parse_literal, |lit: DefaultValue| lit.to_value())))(i)
}

fn parse_hash<'a, E>(i: &'a str) -> IResult<&'a str, Value, E>
where
    E: ParseError<&'a str> + ContextError<&'a str>,
{
    map(
        delimited(
            char('{'),
            separated_list0(
                char(','),
                delimited(
                    multispace0,
                    alt((
                        map(parse_keyword_pair, |(k, v): (Symbol, Value)| (Value::Symbol(k), v)),
                        separated_pair(
                            parse_value,
                            delimited(multispace0, tag("=>"), multispace0),
                            parse_value,
                        ),
                    )),
                    multispace0,
                ),
            ),
            preceded(multispace0, char('}')),
        ),
        |pairs: Vec<(Value, Value)>| pairs.into_iter().collect(),
    )(i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_call_without_arguments() {
        assert_eq!(
            parse_call("Foo.test?").unwrap(),
            Call {
                receiver: "Foo".to_string(),
                method: "test?".to_string(),
                args: vec![],
            }
        );
        assert!(parse_call("Foo._hoge!()").unwrap().args.is_empty());
    }

    #[test]
    fn test_parse_call_with_arguments() {
        let call = parse_call(r#"Foo.test?("test a")"#).unwrap();
        assert_eq!(call.method, "test?");
        assert_eq!(call.args, vec![Value::from("test a")]);

        let call = parse_call("Repo.find(1, 2.5, nil, :asc)").unwrap();
        assert_eq!(
            call.args,
            vec![
                Value::Integer(1),
                Value::Float(2.5),
                Value::Nil,
                Value::Symbol("asc".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_trailing_keywords_and_hashes() {
        let call = parse_call(r#"Repo.find(1, limit: 10, order: :asc)"#).unwrap();
        assert_eq!(
            call.args,
            vec![
                Value::Integer(1),
                Value::Hash(vec![
                    (Value::Symbol("limit".into()), Value::Integer(10)),
                    (Value::Symbol("order".into()), Value::Symbol("asc".into())),
                ]),
            ]
        );

        let call = parse_call(r#"Repo.store({"a" => 1, b: {}})"#).unwrap();
        assert_eq!(
            call.args,
            vec![Value::Hash(vec![
                (Value::from("a"), Value::Integer(1)),
                (Value::Symbol("b".into()), Value::Hash(vec![])),
            ])]
        );
    }

    #[test]
    fn test_repeated_keys_keep_last_value() {
        let call = parse_call("Repo.find(k: 1, j: 0, k: 2)").unwrap();
        assert_eq!(
            call.args,
            vec![Value::Hash(vec![
                (Value::Symbol("k".into()), Value::Integer(2)),
                (Value::Symbol("j".into()), Value::Integer(0)),
            ])]
        );

        let value = parse_value_str("{a: 1, a: 2}").unwrap();
        assert_eq!(value.to_string(), "{:a=>2}");
    }

    #[test]
    fn test_parse_call_errors() {
        assert!(parse_call("foo.bar").is_err());
        assert!(parse_call("Foo.bar(").is_err());
        assert!(parse_call("Foo.bar() baz").is_err());
    }

    #[test]
    fn test_parse_value_str() {
        assert_eq!(parse_value_str("100").unwrap(), Value::Integer(100));
        assert_eq!(parse_value_str(r#""hoge 1""#).unwrap(), Value::from("hoge 1"));
        assert!(parse_value_str("1 2").is_err());
    }
}

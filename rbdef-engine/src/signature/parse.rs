use nom::{
    branch::alt,
    bytes::complete::{escaped_transform, is_not, tag, take_while},
    character::complete::{alpha1, alphanumeric1, char, digit1, multispace0, one_of},
    combinator::{map, map_opt, opt, recognize, success, value},
    error::{ContextError, ParseError},
    multi::{many0, separated_list0},
    sequence::{delimited, pair, preceded, tuple},
    IResult,
};

use crate::signature::*;
use crate::value::Symbol;

pub fn parse_signature(i: &str) -> IResult<&str, Signature> {
    parse_method_signature(i)
}

pub fn parse_identifier<'a, E>(i: &'a str) -> IResult<&'a str, Symbol, E>
where
    E: ParseError<&'a str> + ContextError<&'a str>,
{
    map(
        recognize(pair(
            alt((tag("_"), alpha1)),
            many0(alt((tag("_"), alphanumeric1))),
        )),
        |symbol: &str| symbol.to_string(),
    )(i)
}

/// An identifier with an optional `?`, `!` or `=` suffix.
pub fn parse_method_name<'a, E>(i: &'a str) -> IResult<&'a str, Symbol, E>
where
    E: ParseError<&'a str> + ContextError<&'a str>,
{
    map(
        recognize(pair(parse_identifier::<E>, opt(one_of("?!=")))),
        |name: &str| name.to_string(),
    )(i)
}

fn parse_method_signature<'a, E>(i: &'a str) -> IResult<&'a str, Signature, E>
where
    E: ParseError<&'a str> + ContextError<&'a str>,
{
    let (i, name) = opt(preceded(multispace0, parse_method_name))(i)?;
    let (i, params) = opt(preceded(multispace0, parse_params))(i)?;
    let (i, _) = multispace0(i)?;

    let signature = Signature {
        name,
        params: params.unwrap_or_default(),
    };
    Ok((i, signature))
}

fn parse_params<'a, E>(i: &'a str) -> IResult<&'a str, Vec<Param>, E>
where
    E: ParseError<&'a str> + ContextError<&'a str>,
{
    delimited(
        char('('),
        separated_list0(
            char(','),
            delimited(multispace0, parse_param, multispace0),
        ),
        preceded(multispace0, char(')')),
    )(i)
}

fn parse_param<'a, E>(i: &'a str) -> IResult<&'a str, Param, E>
where
    E: ParseError<&'a str> + ContextError<&'a str>,
{
    let (i, name) = parse_identifier(i)?;
    let (i, _) = multispace0(i)?;
    let (i, kind) = alt((
        map(
            preceded(pair(char('='), multispace0), parse_literal),
            ParamKind::Optional,
        ),
        map(
            preceded(char(':'), opt(preceded(multispace0, parse_literal))),
            ParamKind::Keyword,
        ),
        success(ParamKind::Required),
    ))(i)?;

    Ok((i, Param { name, kind }))
}

/// Parses a literal: `nil`, `true`, `false`, numbers, quoted strings,
/// `:symbol`, or a bare word taken as a string.
pub fn parse_literal<'a, E>(i: &'a str) -> IResult<&'a str, DefaultValue, E>
where
    E: ParseError<&'a str> + ContextError<&'a str>,
{
    alt((
        map(parse_double_quoted, DefaultValue::String),
        map(parse_single_quoted, DefaultValue::String),
        map(preceded(char(':'), parse_identifier), DefaultValue::Symbol),
        parse_number,
        map(parse_identifier, |word: Symbol| match word.as_str() {
            "nil" => DefaultValue::Nil,
            "true" => DefaultValue::Boolean(true),
            "false" => DefaultValue::Boolean(false),
            _ => DefaultValue::String(word),
        }),
    ))(i)
}

fn parse_number<'a, E>(i: &'a str) -> IResult<&'a str, DefaultValue, E>
where
    E: ParseError<&'a str> + ContextError<&'a str>,
{
    map_opt(
        recognize(tuple((
            opt(char('-')),
            digit1,
            opt(pair(char('.'), digit1)),
        ))),
        |n: &str| {
            if n.contains('.') {
                n.parse().ok().map(DefaultValue::Float)
            } else {
                n.parse().ok().map(DefaultValue::Integer)
            }
        },
    )(i)
}

fn parse_double_quoted<'a, E>(i: &'a str) -> IResult<&'a str, String, E>
where
    E: ParseError<&'a str> + ContextError<&'a str>,
{
    map(
        delimited(
            char('"'),
            opt(escaped_transform(
                is_not("\\\""),
                '\\',
                alt((
                    value("\\", tag("\\")),
                    value("\"", tag("\"")),
                    value("\n", tag("n")),
                    value("\t", tag("t")),
                )),
            )),
            char('"'),
        ),
        Option::unwrap_or_default,
    )(i)
}

fn parse_single_quoted<'a, E>(i: &'a str) -> IResult<&'a str, String, E>
where
    E: ParseError<&'a str> + ContextError<&'a str>,
{
    map(
        delimited(char('\''), take_while(|c: char| c != '\''), char('\'')),
        |s: &str| s.to_string(),
    )(i)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn literal(input: &str) -> DefaultValue {
        let (rest, lit) = parse_literal::<nom::error::VerboseError<&str>>(input).unwrap();
        assert!(rest.is_empty(), "unparsed input: {:?}", rest);
        lit
    }

    #[test]
    fn test_parse_singleton_signature() {
        let (_, sig) = parse_signature(r#"test?(a = "a")"#).unwrap();
        assert_eq!(
            sig,
            Signature {
                name: Some("test?".to_string()),
                params: vec![Param {
                    name: "a".to_string(),
                    kind: ParamKind::Optional(DefaultValue::String("a".to_string())),
                }],
            }
        );
    }

    #[test]
    fn test_parse_bang_signature_with_numeric_string() {
        let (_, sig) = parse_signature(r#"_hoge!(b = "-112")"#).unwrap();
        assert_eq!(sig.name.as_deref(), Some("_hoge!"));
        assert_eq!(
            sig.params[0].kind,
            ParamKind::Optional(DefaultValue::String("-112".to_string()))
        );
    }

    #[test]
    fn test_parse_mixed_params() {
        let (rest, sig) = parse_signature("find(id, limit = 10, order: :asc, strict:)").unwrap();
        assert!(rest.is_empty());
        assert_eq!(
            sig.params,
            vec![
                Param {
                    name: "id".to_string(),
                    kind: ParamKind::Required,
                },
                Param {
                    name: "limit".to_string(),
                    kind: ParamKind::Optional(DefaultValue::Integer(10)),
                },
                Param {
                    name: "order".to_string(),
                    kind: ParamKind::Keyword(Some(DefaultValue::Symbol("asc".to_string()))),
                },
                Param {
                    name: "strict".to_string(),
                    kind: ParamKind::Keyword(None),
                },
            ]
        );
    }

    #[test]
    fn test_parse_name_only_and_params_only() {
        let (_, sig) = parse_signature("foo1=").unwrap();
        assert_eq!(sig.name.as_deref(), Some("foo1="));
        assert!(sig.params.is_empty());

        let (_, sig) = parse_signature("(x = nil)").unwrap();
        assert_eq!(sig.name, None);
        assert_eq!(sig.params[0].kind, ParamKind::Optional(DefaultValue::Nil));
    }

    #[test]
    fn test_parse_literals() {
        assert_eq!(literal("nil"), DefaultValue::Nil);
        assert_eq!(literal("true"), DefaultValue::Boolean(true));
        assert_eq!(literal("-112"), DefaultValue::Integer(-112));
        assert_eq!(literal("1.5"), DefaultValue::Float(1.5));
        assert_eq!(literal(":sym"), DefaultValue::Symbol("sym".to_string()));
        assert_eq!(literal("word"), DefaultValue::String("word".to_string()));
        assert_eq!(literal("''"), DefaultValue::String(String::new()));
        assert_eq!(literal(r#""""#), DefaultValue::String(String::new()));
        assert_eq!(
            literal(r#""a \"b\"\n""#),
            DefaultValue::String("a \"b\"\n".to_string())
        );
    }
}

//! Response assertion steps.

use super::StepArgs;
use crate::error::{AssayError, Result};
use crate::predicate::{
    self, parse_candidates, parse_literal, Comparison, LiteralKind, StringOp, StringOptions,
    TemporalShape,
};
use crate::scenario::ScenarioContext;
use crate::value::Value;

/// Failure subject, prefixed with the request alias when one is named.
fn subject(args: &StepArgs<'_>, label: &str) -> String {
    match args.alias() {
        "" => label.to_string(),
        alias => format!("HttpRequest \"{alias}\" {label}"),
    }
}

/// Subject and value of the response part named by the `target` group.
fn target(ctx: &ScenarioContext, args: &StepArgs<'_>) -> Result<(String, Value)> {
    let response = ctx.response(args.alias())?;

    if let Some(header) = args.get("header") {
        let name = ctx.resolve(header)?;
        let value = response.header(&name).map(Value::from).unwrap_or_default();
        return Ok((subject(args, &format!("header {name}")), value));
    }
    if let Some(path) = args.get("path") {
        let path = ctx.resolve(path)?;
        let value = response.json_value(&path)?;
        return Ok((subject(args, &path), value));
    }
    match args.required("target")? {
        "status code" => Ok((
            subject(args, "status code"),
            Value::Number(f64::from(response.status())),
        )),
        _ => Ok((
            subject(args, "body"),
            Value::from(response.text().into_owned()),
        )),
    }
}

/// Expected literal of an equality step.
///
/// With an explicit kind the literal is parsed as that kind. Otherwise a
/// quoted literal is a string, a lone expression keeps its resolved type,
/// and anything else is read as JSON when it parses and as text when not.
fn expected_literal(ctx: &ScenarioContext, args: &StepArgs<'_>) -> Result<Value> {
    let raw = args.required("expected")?.trim();
    let unquoted = raw
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'));

    if let Some(kind) = args.get("kind") {
        let kind: LiteralKind = kind.parse()?;
        let text = match (kind, unquoted) {
            (LiteralKind::Json, _) | (_, None) => raw,
            (_, Some(inner)) => inner,
        };
        return parse_literal(kind, &ctx.resolve(text)?);
    }
    if let Some(inner) = unquoted {
        return Ok(Value::String(ctx.resolve(inner)?));
    }
    match ctx.resolve_value(raw)? {
        Value::String(text) => match parse_literal(LiteralKind::Json, &text) {
            Ok(value) => Ok(value),
            Err(_) => Ok(Value::String(text)),
        },
        typed => Ok(typed),
    }
}

pub(super) fn status_code(ctx: &mut ScenarioContext, args: &StepArgs<'_>) -> Result<()> {
    let expected: f64 = args
        .required("expected")?
        .parse()
        .map_err(|e| AssayError::InvalidStepArgument {
            name: "expected".to_string(),
            reason: format!("{e}"),
        })?;
    let actual = ctx.response(args.alias())?.status();
    predicate::equals(
        &subject(args, "status code"),
        &Value::Number(f64::from(actual)),
        &Value::Number(expected),
        args.assert_true(),
    )
}

pub(super) fn conforms_to_schema(ctx: &mut ScenarioContext, args: &StepArgs<'_>) -> Result<()> {
    let uri = ctx.resolve(args.required("uri")?)?;
    let (response, schemas) = ctx.response_with_schemas(args.alias())?;
    predicate::conforms_to_schema(schemas, response, &uri, args.assert_true())
}

pub(super) fn equal_to(ctx: &mut ScenarioContext, args: &StepArgs<'_>) -> Result<()> {
    let (subject, actual) = target(ctx, args)?;
    let expected = expected_literal(ctx, args)?;
    predicate::equals(&subject, &actual, &expected, args.assert_true())
}

pub(super) fn string_op(ctx: &mut ScenarioContext, args: &StepArgs<'_>) -> Result<()> {
    let (subject, actual) = target(ctx, args)?;
    let op: StringOp = args.required("op")?.parse()?;
    let options = StringOptions {
        ignore_case: args.get("ignore_case").is_some(),
        resolve_expected: true,
    };
    predicate::string_op(
        &subject,
        &actual,
        op,
        args.required("expected")?,
        options,
        ctx.registry(),
        args.assert_true(),
    )
}

pub(super) fn compare(ctx: &mut ScenarioContext, args: &StepArgs<'_>) -> Result<()> {
    let (subject, actual) = target(ctx, args)?;
    let comparison: Comparison = args.required("comparison")?.parse()?;
    let raw = ctx.resolve(args.required("threshold")?)?;
    let threshold = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| AssayError::InvalidStepArgument {
            name: "threshold".to_string(),
            reason: format!("'{raw}' is not a number"),
        })?;
    predicate::compare(&subject, &actual, comparison, threshold, args.assert_true())
}

pub(super) fn matches_pattern(ctx: &mut ScenarioContext, args: &StepArgs<'_>) -> Result<()> {
    let (subject, actual) = target(ctx, args)?;
    predicate::matches_pattern(
        &subject,
        &actual,
        args.required("pattern")?,
        args.assert_true(),
    )
}

pub(super) fn temporal(ctx: &mut ScenarioContext, args: &StepArgs<'_>) -> Result<()> {
    let (subject, actual) = target(ctx, args)?;
    let shape: TemporalShape = args.required("shape")?.parse()?;
    predicate::temporal(&subject, &actual, shape, args.assert_true())
}

pub(super) fn one_of(ctx: &mut ScenarioContext, args: &StepArgs<'_>) -> Result<()> {
    let (subject, actual) = target(ctx, args)?;
    let candidates = parse_candidates(&ctx.resolve(args.required("candidates")?)?)?;
    predicate::one_of(&subject, &actual, &candidates, args.assert_true())
}

pub(super) fn exists(ctx: &mut ScenarioContext, args: &StepArgs<'_>) -> Result<()> {
    let (subject, actual) = target(ctx, args)?;
    predicate::exists(&subject, &actual, args.assert_true())
}

/// Compare the textual form of any expression with an expected text.
pub(super) fn value_equal_to(ctx: &mut ScenarioContext, args: &StepArgs<'_>) -> Result<()> {
    let expression = args.required("expression")?;
    let actual = ctx.resolve(expression)?;
    let expected = ctx.resolve(args.required("expected")?)?;
    predicate::equals(
        expression,
        &Value::String(actual),
        &Value::String(expected),
        args.assert_true(),
    )
}

#[cfg(test)]
mod tests {
    use crate::config::EngineConfig;
    use crate::error::{AssayError, Result};
    use crate::http::{HttpClient, OutgoingRequest, RawResponse};
    use crate::scenario::ScenarioContext;
    use crate::steps::StepRouter;
    use std::sync::Arc;

    const USER: &str = r#"{
        "id": "usr_42",
        "name": "SeaGate",
        "age": 21,
        "score": "50",
        "active": true,
        "status": "active",
        "createdAt": "2024-05-01T10:00:00Z",
        "tags": ["a", "b"]
    }"#;

    struct UserApi;

    impl HttpClient for UserApi {
        fn send(&self, _request: &OutgoingRequest) -> Result<RawResponse> {
            Ok(RawResponse {
                status: 200,
                headers: vec![
                    ("Content-Type".to_string(), "application/json".to_string()),
                    ("X-Request-Id".to_string(), "req-1".to_string()),
                ],
                body: USER.into(),
            })
        }
    }

    fn submitted() -> (ScenarioContext, StepRouter) {
        let router = StepRouter::standard();
        let mut ctx =
            ScenarioContext::new(Arc::new(EngineConfig::default()), Arc::new(UserApi)).unwrap();
        for step in [
            r#"a HttpRequest "user""#,
            r#"HttpRequest "user" url is "http://api.test/users/42""#,
            r#"HttpRequest "user" is submitted"#,
        ] {
            router.dispatch(&mut ctx, step, None).unwrap();
        }
        (ctx, router)
    }

    fn check(step: &str) -> Result<()> {
        let (mut ctx, router) = submitted();
        router.dispatch(&mut ctx, step, None)
    }

    #[test]
    fn test_affirmative_and_negated_forms() {
        let passing = [
            "response status code should be 200",
            "response status code should not be 404",
            r#"response body $.id should be equal to "usr_42""#,
            r#"response body $.id should not be equal to "usr_43""#,
            "response body $.age should be equal to 21",
            "response body $.age should be equal to number 21.0",
            r#"response body $.age should not be equal to string "21""#,
            "response body $.active should be equal to boolean true",
            r#"response body $.tags should be equal to ["a","b"]"#,
            r#"response body $.name should start with "Seagate" ignoring case"#,
            r#"response body $.name should not start with "Seagate""#,
            r#"response body $.name should contain "Gate""#,
            r#"response body $.name should end with "GATE" ignoring case"#,
            "response body $.score should be greater than 49",
            "response body $.age should be less than or equal to 21",
            "response body $.age should not be greater than 21",
            r#"response body $.id should match "^usr_\d+$""#,
            r#"response body $.id should not match "^org_""#,
            "response body $.createdAt should be a date-time",
            "response body $.createdAt should not be a date",
            r#"response body $.status should be one of ["active", "pending"]"#,
            r#"response body $.score should not be one of [50]"#,
            "response body $.id should exist",
            "response body $.missing should not exist",
            r#"response header "x-request-id" should be equal to "req-1""#,
            r#"response header "X-Request-Id" should start with "req-""#,
            r#"HttpRequest "user" response body $.id should be equal to "usr_42""#,
            r#"response body should contain "usr_42""#,
            r#"the value of "{{HttpRequest.user.response.body.age}}" should be equal to "21""#,
        ];
        for step in passing {
            if let Err(e) = check(step) {
                panic!("'{step}' failed: {e}");
            }
        }
    }

    #[test]
    fn test_failures_are_mismatches() {
        for step in [
            "response status code should be 201",
            r#"response body $.id should be equal to "usr_43""#,
            r#"response body $.name should start with "Seagate""#,
            "response body $.age should be greater than 21",
            "response body $.missing should exist",
        ] {
            let err = check(step).unwrap_err();
            assert!(err.is_mismatch(), "'{step}': {err}");
        }
    }

    #[test]
    fn test_evaluation_errors_are_not_mismatches() {
        let err = check("response body $.name should be greater than 1").unwrap_err();
        assert!(matches!(err, AssayError::CoercionError { .. }));

        let err = check(r#"response body $.age should contain "2""#).unwrap_err();
        assert!(matches!(err, AssayError::TypeMismatch { .. }));

        let err = check(r#"response body $.id should match "([""#).unwrap_err();
        assert!(matches!(err, AssayError::InvalidPattern { .. }));

        let err = check(r#"HttpRequest "other" response body $.id should exist"#).unwrap_err();
        assert!(matches!(err, AssayError::ComponentNotDefined { .. }));
    }

    #[test]
    fn test_mismatch_message_names_subject() {
        let err = check(r#"response body $.id should be equal to "usr_43""#).unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"$.id: expected "usr_42" to be equal to "usr_43""#
        );
    }

    #[test]
    fn test_mismatch_message_names_alias() {
        let err = check(r#"HttpRequest "user" response body $.id should be equal to "usr_43""#)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"HttpRequest "user" $.id: expected "usr_42" to be equal to "usr_43""#
        );

        let err = check(r#"HttpRequest "user" response status code should be 201"#).unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"HttpRequest "user" status code: expected 200 to be equal to 201"#
        );
    }
}

//! Step routing.
//!
//! A [`StepRouter`] is an ordered list of `(pattern, handler)` routes. A step
//! is dispatched to the first route whose pattern matches its whole text; a
//! step no route matches fails with `UndefinedStep`.
//!
//! # Module Structure
//!
//! - `request` - creating requests and entities, configuring and submitting
//! - `assert` - response assertions, each with an affirmative and a negated form
//!
//! # Step Catalog
//!
//! `{req}` is `HttpRequest` or `HttpRequest "alias"`, `{resp}` is `response`
//! or `HttpRequest "alias" response`, and `{target}` is `status code`,
//! `header "name"`, `body` or `body <path>`.
//!
//! ```text
//! a {req}
//! an Entity "alias" with username "u" and password "p"
//! {req} method is "POST"
//! {req} url is "http://host"
//! {req} path is "/users"
//! {req} header "name" is "value"
//! {req} headers are:              (data table of name | value rows)
//! {req} body is "inline"          | {req} body is:  (doc string)
//! {req} form field "name" is "v"  | {req} multipart field "name" is "v"
//! {req} uses basic auth of Entity "alias"
//! {req} is submitted              | I submit {req}
//! {resp} status code should [not] be 201
//! {resp} body should [not] conform to schema "file://schemas/user.json"
//! {resp} {target} should [not] be equal to [string|number|boolean|json] <literal>
//! {resp} {target} should [not] contain|start with|end with "text" [ignoring case]
//! {resp} {target} should [not] be less than|greater than [or equal to] <number>
//! {resp} {target} should [not] match "regex"
//! {resp} {target} should [not] be a date|time|date-time
//! {resp} {target} should [not] be one of ["a", "b"]
//! {resp} {target} should [not] exist
//! the value of "{{Type.alias.path}}" should [not] be equal to "text"
//! ```
//!
//! Arguments are passed through the expression resolver before use, except
//! regex patterns.

mod assert;
mod request;

use crate::error::{AssayError, Result};
use crate::feature::Step;
use crate::scenario::ScenarioContext;
use regex::{Captures, Regex};
use tracing::debug;

/// Step handler signature.
pub type Handler = fn(&mut ScenarioContext, &StepArgs<'_>) -> Result<()>;

/// `HttpRequest` optionally followed by a quoted alias.
const REQ: &str = r#"HttpRequest(?: "(?P<alias>[\w-]+)")?"#;
/// `response`, optionally of an aliased request.
const RESP: &str = r#"(?:HttpRequest "(?P<alias>[\w-]+)" )?response"#;
/// What part of the response an assertion reads.
const TARGET: &str =
    r#"(?P<target>status code|header "(?P<header>[^"]+)"|body(?: (?P<path>\S+))?)"#;
const SHOULD: &str = r"should(?P<not> not)?";

/// Captured arguments of a matched step.
#[derive(Debug)]
pub struct StepArgs<'a> {
    captures: Captures<'a>,
    docstring: Option<&'a str>,
    table: Option<&'a [Vec<String>]>,
}

impl<'a> StepArgs<'a> {
    /// Raw text of a named group, if it participated in the match.
    pub fn get(&self, name: &str) -> Option<&'a str> {
        self.captures.name(name).map(|m| m.as_str())
    }

    pub fn required(&self, name: &str) -> Result<&'a str> {
        self.get(name)
            .ok_or_else(|| AssayError::MissingStepArgument(format!("'{name}' argument")))
    }

    /// Alias of the addressed request, empty for the current one.
    pub fn alias(&self) -> &'a str {
        self.get("alias").unwrap_or("")
    }

    /// `false` for the negated form of an assertion.
    pub fn assert_true(&self) -> bool {
        self.get("not").is_none()
    }

    pub fn docstring(&self) -> Result<&'a str> {
        self.docstring
            .ok_or_else(|| AssayError::MissingStepArgument("doc string".to_string()))
    }

    pub fn table(&self) -> Result<&'a [Vec<String>]> {
        self.table
            .ok_or_else(|| AssayError::MissingStepArgument("data table".to_string()))
    }
}

struct Route {
    pattern: Regex,
    handler: Handler,
}

pub struct StepRouter {
    routes: Vec<Route>,
}

impl std::fmt::Debug for StepRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.routes.iter().map(|r| r.pattern.as_str()))
            .finish()
    }
}

impl Default for StepRouter {
    fn default() -> Self {
        Self::standard()
    }
}

impl StepRouter {
    /// Router without any route.
    pub fn empty() -> Self {
        Self { routes: Vec::new() }
    }

    /// Append a route. `pattern` is anchored to the whole step text.
    pub fn route(mut self, pattern: &str, handler: Handler) -> Result<Self> {
        let anchored = format!("^{pattern}$");
        let pattern = Regex::new(&anchored).map_err(|e| AssayError::InvalidPattern {
            pattern: anchored.clone(),
            reason: e.to_string(),
        })?;
        self.routes.push(Route { pattern, handler });
        Ok(self)
    }

    /// The built-in step catalog.
    pub fn standard() -> Self {
        Self::empty()
            // Setup
            .builtin(&format!("an? {REQ}"), request::create_request)
            .builtin(
                r#"an? Entity "(?P<alias>[\w-]+)" with username "(?P<username>[^"]*)" and password "(?P<password>[^"]*)""#,
                request::create_entity,
            )
            .builtin(&format!(r#"{REQ} method is "(?P<method>[^"]+)""#), request::set_method)
            .builtin(&format!(r#"{REQ} url is "(?P<url>[^"]+)""#), request::set_url)
            .builtin(&format!(r#"{REQ} path is "(?P<path>[^"]*)""#), request::set_path)
            .builtin(
                &format!(r#"{REQ} header "(?P<name>[^"]+)" is "(?P<value>[^"]*)""#),
                request::set_header,
            )
            .builtin(&format!("{REQ} headers are:"), request::set_headers)
            .builtin(&format!(r#"{REQ} body is(?: "(?P<body>.*)"|:)"#), request::set_body)
            .builtin(
                &format!(r#"{REQ} (?P<encoding>form|multipart) field "(?P<name>[^"]+)" is "(?P<value>[^"]*)""#),
                request::set_form_field,
            )
            .builtin(
                &format!(r#"{REQ} uses basic auth of Entity "(?P<entity>[\w-]+)""#),
                request::basic_auth,
            )
            .builtin(&format!("{REQ} is submitted"), request::submit)
            .builtin(&format!("I submit {REQ}"), request::submit)
            // Assertions
            .builtin(
                &format!(r"{RESP} status code {SHOULD} be (?P<expected>\d{{3}})"),
                assert::status_code,
            )
            .builtin(
                &format!(r#"{RESP} body {SHOULD} conform to schema "(?P<uri>[^"]+)""#),
                assert::conforms_to_schema,
            )
            .builtin(
                &format!(r"{RESP} {TARGET} {SHOULD} be equal to (?:(?P<kind>string|number|boolean|json) )?(?P<expected>.+)"),
                assert::equal_to,
            )
            .builtin(
                &format!(r#"{RESP} {TARGET} {SHOULD} (?P<op>contain|start with|end with) "(?P<expected>.*)"(?P<ignore_case> ignoring case)?"#),
                assert::string_op,
            )
            .builtin(
                &format!(r"{RESP} {TARGET} {SHOULD} be (?P<comparison>less than or equal to|greater than or equal to|less than|greater than|<=|>=|<|>) (?P<threshold>\S+)"),
                assert::compare,
            )
            .builtin(
                &format!(r#"{RESP} {TARGET} {SHOULD} match "(?P<pattern>.*)""#),
                assert::matches_pattern,
            )
            .builtin(
                &format!(r"{RESP} {TARGET} {SHOULD} be an? (?P<shape>date-time|datetime|date|time)"),
                assert::temporal,
            )
            .builtin(
                &format!(r"{RESP} {TARGET} {SHOULD} be one of (?P<candidates>\[.*\])"),
                assert::one_of,
            )
            .builtin(&format!("{RESP} {TARGET} {SHOULD} exist"), assert::exists)
            .builtin(
                &format!(r#"the value of "(?P<expression>.+)" {SHOULD} be equal to "(?P<expected>.*)""#),
                assert::value_equal_to,
            )
    }

    fn builtin(self, pattern: &str, handler: Handler) -> Self {
        self.route(pattern, handler)
            .expect("built-in step pattern is a valid regex")
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Run the first route matching `text`.
    pub fn dispatch(
        &self,
        ctx: &mut ScenarioContext,
        text: &str,
        docstring: Option<&str>,
    ) -> Result<()> {
        self.run(ctx, text, docstring, None)
    }

    /// Run a parsed feature step with its doc string and data table.
    pub fn dispatch_step(&self, ctx: &mut ScenarioContext, step: &Step) -> Result<()> {
        self.run(
            ctx,
            &step.text,
            step.docstring.as_deref(),
            step.table.as_deref(),
        )
    }

    fn run(
        &self,
        ctx: &mut ScenarioContext,
        text: &str,
        docstring: Option<&str>,
        table: Option<&[Vec<String>]>,
    ) -> Result<()> {
        let text = text.trim();
        for route in &self.routes {
            if let Some(captures) = route.pattern.captures(text) {
                debug!(step = text, route = route.pattern.as_str(), "Dispatching step");
                let args = StepArgs {
                    captures,
                    docstring,
                    table,
                };
                return (route.handler)(ctx, &args);
            }
        }
        Err(AssayError::UndefinedStep(text.to_string()))
    }
}

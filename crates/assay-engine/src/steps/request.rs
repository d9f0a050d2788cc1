//! Setup steps: requests, entities and submission.

use super::StepArgs;
use crate::component::Entity;
use crate::error::{AssayError, Result};
use crate::http::FormEncoding;
use crate::scenario::ScenarioContext;

pub(super) fn create_request(ctx: &mut ScenarioContext, args: &StepArgs<'_>) -> Result<()> {
    ctx.new_request(args.alias())
}

pub(super) fn create_entity(ctx: &mut ScenarioContext, args: &StepArgs<'_>) -> Result<()> {
    let username = ctx.resolve(args.required("username")?)?;
    let password = ctx.resolve(args.required("password")?)?;
    ctx.new_entity(args.alias(), Entity::new(username, password))
}

pub(super) fn set_method(ctx: &mut ScenarioContext, args: &StepArgs<'_>) -> Result<()> {
    let method = ctx.resolve(args.required("method")?)?;
    ctx.request_mut(args.alias())?.set_method(&method)
}

pub(super) fn set_url(ctx: &mut ScenarioContext, args: &StepArgs<'_>) -> Result<()> {
    let url = ctx.resolve(args.required("url")?)?;
    ctx.request_mut(args.alias())?.set_server_url(url)
}

pub(super) fn set_path(ctx: &mut ScenarioContext, args: &StepArgs<'_>) -> Result<()> {
    let path = ctx.resolve(args.required("path")?)?;
    ctx.request_mut(args.alias())?.set_path(path)
}

pub(super) fn set_header(ctx: &mut ScenarioContext, args: &StepArgs<'_>) -> Result<()> {
    let name = ctx.resolve(args.required("name")?)?;
    let value = ctx.resolve(args.required("value")?)?;
    ctx.request_mut(args.alias())?.set_header(&name, value)
}

/// One header per data table row: `| name | value |`.
pub(super) fn set_headers(ctx: &mut ScenarioContext, args: &StepArgs<'_>) -> Result<()> {
    for row in args.table()? {
        let [name, value] = row.as_slice() else {
            return Err(AssayError::InvalidStepArgument {
                name: "headers".to_string(),
                reason: format!("expected 2 cells per row, got {}", row.len()),
            });
        };
        let name = ctx.resolve(name)?;
        let value = ctx.resolve(value)?;
        ctx.request_mut(args.alias())?.set_header(&name, value)?;
    }
    Ok(())
}

/// Inline `body is "..."` or a doc string after `body is:`.
pub(super) fn set_body(ctx: &mut ScenarioContext, args: &StepArgs<'_>) -> Result<()> {
    let raw = match args.get("body") {
        Some(inline) => inline,
        None => args.docstring()?,
    };
    let body = ctx.resolve(raw)?;
    ctx.request_mut(args.alias())?.set_body(body)
}

pub(super) fn set_form_field(ctx: &mut ScenarioContext, args: &StepArgs<'_>) -> Result<()> {
    let encoding = match args.required("encoding")? {
        "multipart" => FormEncoding::Multipart,
        _ => FormEncoding::UrlEncoded,
    };
    let name = ctx.resolve(args.required("name")?)?;
    let value = ctx.resolve(args.required("value")?)?;
    ctx.request_mut(args.alias())?
        .set_form_field(encoding, name, value)
}

pub(super) fn basic_auth(ctx: &mut ScenarioContext, args: &StepArgs<'_>) -> Result<()> {
    let credentials = ctx.registry().entity(args.required("entity")?)?.basic_auth();
    ctx.request_mut(args.alias())?
        .set_header("authorization", credentials)
}

pub(super) fn submit(ctx: &mut ScenarioContext, args: &StepArgs<'_>) -> Result<()> {
    ctx.submit(args.alias()).map(|_| ())
}

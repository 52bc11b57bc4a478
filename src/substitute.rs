//! Text substitution for parameters the binder could not attach natively.
//!
//! Two independent passes, in order: `{{name}}` double-brace tokens, then
//! `@name` tokens guarded by non-word boundaries so references inside longer
//! identifiers or email-like strings are left alone. References to natively
//! bound parameters are kept verbatim for the driver to bind. This is
//! pattern matching over reference tokens, not SQL parsing.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::error::DataError;
use crate::params::{canonical_name, render_literal, NamedParameter};

static BRACE_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{[^{}]+\}\}").unwrap());

static AT_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?<head>\W+|^)(?<name>@\w+)(?<tail>\W|$)").unwrap());

/// Rewrites every parameter reference in `text` with the literal rendering
/// of the matching unbound parameter.
///
/// A reference naming a bound parameter is left untouched. A reference that
/// matches no supplied parameter at all is a caller contract violation and
/// aborts the execution.
pub fn substitute_parameters(
    text: &str,
    unbound: &[&NamedParameter],
    bound: &HashSet<String>,
) -> Result<String, DataError> {
    let text = replace_all(&BRACE_REFERENCE, text, |caps| {
        let token = &caps[0];
        let name = &token[2..token.len() - 2];
        Ok(match resolve(name, unbound, bound)? {
            Some(literal) => literal,
            None => token.to_string(),
        })
    })?;

    replace_all(&AT_REFERENCE, &text, |caps| {
        let head = caps.name("head").map_or("", |m| m.as_str());
        let tail = caps.name("tail").map_or("", |m| m.as_str());
        let name = &caps["name"];
        Ok(match resolve(name, unbound, bound)? {
            Some(literal) => format!("{head}{literal}{tail}"),
            None => caps[0].to_string(),
        })
    })
}

/// `Ok(None)` means the reference names a bound parameter and must stay
/// verbatim in the text.
fn resolve(
    reference: &str,
    unbound: &[&NamedParameter],
    bound: &HashSet<String>,
) -> Result<Option<String>, DataError> {
    let key = canonical_name(reference);
    if bound.contains(&key) {
        return Ok(None);
    }
    match unbound.iter().find(|p| canonical_name(&p.name) == key) {
        Some(parameter) => {
            tracing::debug!(name = %parameter.name, "substituting parameter reference");
            Ok(Some(render_literal(&parameter.value)))
        }
        None => Err(DataError::parameter_not_found(reference)),
    }
}

/// `Regex::replace_all` with a fallible replacement closure.
fn replace_all(
    re: &Regex,
    text: &str,
    mut replacement: impl FnMut(&Captures<'_>) -> Result<String, DataError>,
) -> Result<String, DataError> {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in re.captures_iter(text) {
        let whole = caps.get(0).unwrap();
        out.push_str(&text[last..whole.start()]);
        out.push_str(&replacement(&caps)?);
        last = whole.end();
    }
    out.push_str(&text[last..]);
    Ok(out)
}

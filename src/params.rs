//! Named parameters and the parameter binder.
//!
//! Every caller-supplied parameter is either attached to the command through
//! the bridge's native mechanism (Bound) or rendered as a SQL literal into
//! the command text by the substitution pass (Unbound). A parameter is in
//! exactly one of those states per execution attempt.

use std::collections::HashSet;

use chrono::{NaiveDateTime, NaiveTime};
use uuid::Uuid;

use crate::bridge::{
    jdbc_parameter_type, BoundParameter, Command, JdbcType, SqlType, SqlValue, TypeNotSupported,
};


/// Value of a caller-supplied parameter: scalar, null, or homogeneous array.
#[derive(Clone, Debug, PartialEq)]
pub enum ParameterValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Decimal(String),
    Text(String),
    Bytes(Vec<u8>),
    DateTime(NaiveDateTime),
    Uuid(Uuid),
    Array(Vec<ParameterValue>),
}

impl ParameterValue {
    /// Bridge value for a scalar. Arrays are rejected before binding and
    /// never reach this.
    fn scalar_value(&self) -> SqlValue {
        match self {
            ParameterValue::Null | ParameterValue::Array(_) => SqlValue::Null,
            ParameterValue::Bool(b) => SqlValue::Bool(*b),
            ParameterValue::Int(i) => SqlValue::I64(*i),
            ParameterValue::Float(x) => SqlValue::F64(*x),
            ParameterValue::Decimal(d) => SqlValue::Decimal(d.clone()),
            ParameterValue::Text(s) => SqlValue::Text(s.clone()),
            ParameterValue::Bytes(b) => SqlValue::Bytes(b.clone()),
            ParameterValue::DateTime(dt) => SqlValue::DateTime(*dt),
            ParameterValue::Uuid(u) => SqlValue::Uuid(*u),
        }
    }

    fn storage_type(&self) -> SqlType {
        match self {
            ParameterValue::Null | ParameterValue::Array(_) => SqlType::Object,
            ParameterValue::Bool(_) => SqlType::Bool,
            ParameterValue::Int(_) => SqlType::I64,
            ParameterValue::Float(_) => SqlType::F64,
            ParameterValue::Decimal(_) => SqlType::Decimal,
            ParameterValue::Text(_) => SqlType::Text,
            ParameterValue::Bytes(_) => SqlType::Bytes,
            ParameterValue::DateTime(_) => SqlType::DateTime,
            ParameterValue::Uuid(_) => SqlType::Uuid,
        }
    }
}

/// A parameter supplied by the caller for one execution. Identity is the
/// case-insensitive name; a leading `@` is not part of the name.
#[derive(Clone, Debug, PartialEq)]
pub struct NamedParameter {
    pub name: String,
    pub value: ParameterValue,
}

impl NamedParameter {
    pub fn new(name: impl Into<String>, value: ParameterValue) -> Self {
        NamedParameter { name: name.into(), value }
    }
}

pub(crate) fn canonical_name(name: &str) -> String {
    name.trim_start_matches('@').to_ascii_lowercase()
}

/// Canonical rendering of a timestamp: date-only at exactly midnight, full
/// timestamp otherwise.
pub(crate) fn render_datetime(dt: &NaiveDateTime) -> String {
    if dt.time() == NaiveTime::MIN {
        dt.format("%Y-%m-%d").to_string()
    } else {
        dt.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

fn is_null_or_empty(value: &ParameterValue) -> bool {
    match value {
        ParameterValue::Null => true,
        ParameterValue::Text(s) => s.is_empty(),
        _ => false,
    }
}

fn render_plain(value: &ParameterValue) -> String {
    match value {
        ParameterValue::Null => String::new(),
        ParameterValue::Bool(b) => b.to_string(),
        ParameterValue::Int(i) => i.to_string(),
        ParameterValue::Float(x) => x.to_string(),
        ParameterValue::Decimal(d) => d.clone(),
        ParameterValue::Text(s) => s.clone(),
        ParameterValue::Bytes(bytes) => {
            bytes.iter().map(|b| format!("{b:02x}")).collect()
        }
        ParameterValue::DateTime(dt) => render_datetime(dt),
        ParameterValue::Uuid(u) => u.to_string(),
        ParameterValue::Array(_) => render_literal(value),
    }
}

/// SQL literal rendering used by the text substitution pass.
///
/// Timestamps and UUIDs are quoted; other scalars keep their native string
/// form. Array elements other than timestamps and UUIDs are deliberately not
/// quoted: array parameters are expected to hold numeric, date, or uuid
/// elements, and the caller owns literal-safety for anything else.
pub(crate) fn render_literal(value: &ParameterValue) -> String {
    match value {
        ParameterValue::Array(items) => items
            .iter()
            .filter(|item| !is_null_or_empty(item))
            .map(|item| match item {
                ParameterValue::DateTime(dt) => format!("'{}'", render_datetime(dt)),
                ParameterValue::Uuid(u) => format!("'{u}'"),
                other => render_plain(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        ParameterValue::DateTime(dt) => format!("'{}'", render_datetime(dt)),
        ParameterValue::Uuid(u) => format!("'{u}'"),
        other => render_plain(other),
    }
}


/// Partition of one execution attempt's parameters.
#[derive(Debug, Default)]
pub struct BindingOutcome<'a> {
    /// Canonical names of the natively bound parameters. References to these
    /// are left verbatim in the command text.
    pub bound: HashSet<String>,
    /// Parameters that must be rendered into the command text instead.
    pub unbound: Vec<&'a NamedParameter>,
}

/// Runs the binder over all caller parameters, attaching every bindable one
/// to `command` and partitioning the rest for text substitution.
pub fn bind_parameters<'a>(
    command: &mut Command,
    parameters: &'a [NamedParameter],
) -> BindingOutcome<'a> {
    let mut outcome = BindingOutcome::default();
    for parameter in parameters {
        if try_bind(command, parameter) {
            outcome.bound.insert(canonical_name(&parameter.name));
        } else {
            tracing::debug!(name = %parameter.name, "parameter can not be bound natively");
            outcome.unbound.push(parameter);
        }
    }
    outcome
}

fn try_bind(command: &mut Command, parameter: &NamedParameter) -> bool {
    match &parameter.value {
        // Null binds as an empty string literal, which every driver accepts.
        ParameterValue::Null => {
            attach(command, parameter, SqlValue::Text(String::new()));
            true
        }
        // Arrays can never be bound natively.
        ParameterValue::Array(_) => false,
        scalar => match jdbc_parameter_type(scalar.storage_type()) {
            Ok(jdbc_type) => {
                command.parameters.push(BoundParameter {
                    name: parameter.name.clone(),
                    value: scalar.scalar_value(),
                    jdbc_type,
                });
                true
            }
            Err(TypeNotSupported(_)) => match scalar {
                ParameterValue::DateTime(dt) => {
                    attach(command, parameter, SqlValue::Text(render_datetime(dt)));
                    true
                }
                ParameterValue::Uuid(u) => {
                    attach(command, parameter, SqlValue::Text(u.to_string()));
                    true
                }
                _ => false,
            },
        },
    }
}

/// Attach a string-typed parameter. Used for null and for the canonical
/// string coercion of types the bridge can not bind as-is.
fn attach(command: &mut Command, parameter: &NamedParameter, value: SqlValue) {
    command.parameters.push(BoundParameter {
        name: parameter.name.clone(),
        value,
        jdbc_type: JdbcType::VARCHAR,
    });
}

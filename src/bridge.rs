//! Boundary with the JDBC bridge library.
//!
//! The actual bridge (driver loading, wire protocol, raw cursor mechanics) is
//! an external collaborator. This module pins down the surface the adapter
//! relies on: opening a connection from a validated descriptor, executing a
//! command, and walking a forward-only cursor with schema introspection.

use std::error::Error;
use std::fmt;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::connection::ConnectionDescriptor;


/// Column and parameter types the host's generic tabular consumer can
/// represent. `Object` is the opaque placeholder for driver types outside
/// this lattice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SqlType {
    Bool,
    I16,
    I32,
    I64,
    F32,
    F64,
    Decimal,
    Text,
    Bytes,
    DateTime,
    Uuid,
    Object,
}

/// A single cell or parameter value crossing the bridge.
#[derive(Clone, Debug, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Decimal(String),
    Text(String),
    Bytes(Vec<u8>),
    DateTime(NaiveDateTime),
    Uuid(Uuid),
    /// Raw string rendering of a value of an opaque driver type.
    Opaque(String),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }
}


/// `java.sql.Types` code used when a parameter is bound natively.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JdbcType(pub i32);

impl JdbcType {
    pub const BOOLEAN: JdbcType = JdbcType(16);
    pub const SMALLINT: JdbcType = JdbcType(5);
    pub const INTEGER: JdbcType = JdbcType(4);
    pub const BIGINT: JdbcType = JdbcType(-5);
    pub const REAL: JdbcType = JdbcType(7);
    pub const DOUBLE: JdbcType = JdbcType(8);
    pub const DECIMAL: JdbcType = JdbcType(3);
    pub const VARCHAR: JdbcType = JdbcType(12);
    pub const VARBINARY: JdbcType = JdbcType(-3);
}

/// Signal that the bridge has no native binding for a storage type. This is
/// deliberately a dedicated type so the binder can tell it apart from a
/// generic failure and engage its string-coercion fallback.
#[derive(Debug)]
pub struct TypeNotSupported(pub SqlType);

impl fmt::Display for TypeNotSupported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "No JDBC parameter type for {:?}", self.0)
    }
}

impl Error for TypeNotSupported {}

/// Bridge-side mapping from a parameter's storage type to the JDBC type code
/// used for native binding. `DateTime` and `Uuid` have no mapping: drivers
/// disagree too much on their wire forms, so the binder re-renders them as
/// strings instead.
pub fn jdbc_parameter_type(ty: SqlType) -> Result<JdbcType, TypeNotSupported> {
    match ty {
        SqlType::Bool => Ok(JdbcType::BOOLEAN),
        SqlType::I16 => Ok(JdbcType::SMALLINT),
        SqlType::I32 => Ok(JdbcType::INTEGER),
        SqlType::I64 => Ok(JdbcType::BIGINT),
        SqlType::F32 => Ok(JdbcType::REAL),
        SqlType::F64 => Ok(JdbcType::DOUBLE),
        SqlType::Decimal => Ok(JdbcType::DECIMAL),
        SqlType::Text => Ok(JdbcType::VARCHAR),
        SqlType::Bytes => Ok(JdbcType::VARBINARY),
        SqlType::DateTime | SqlType::Uuid | SqlType::Object => Err(TypeNotSupported(ty)),
    }
}


/// A parameter attached to a command through the bridge's native mechanism.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundParameter {
    pub name: String,
    pub value: SqlValue,
    pub jdbc_type: JdbcType,
}

/// Command state handed to the driver for one execution attempt.
///
/// A fresh `Command` is built for every attempt, so parameters attached
/// during a previous attempt can never leak into the next one.
#[derive(Clone, Debug, Default)]
pub struct Command {
    pub text: String,
    pub parameters: Vec<BoundParameter>,
}

impl Command {
    pub fn new(text: impl Into<String>) -> Self {
        Command {
            text: text.into(),
            parameters: Vec::new(),
        }
    }
}


/// Per-column schema metadata reported by the driver.
#[derive(Clone, Debug)]
pub struct ColumnSchema {
    pub name: String,
    /// Declared value type, `SqlType::Object` when the driver type has no
    /// host representation.
    pub ty: SqlType,
    /// Driver-reported class name of the underlying value type,
    /// e.g. `java.util.UUID`.
    pub type_class: String,
}

impl ColumnSchema {
    pub fn new(name: impl Into<String>, ty: SqlType) -> Self {
        ColumnSchema {
            name: name.into(),
            ty,
            type_class: String::new(),
        }
    }

    pub fn with_type_class(mut self, type_class: impl Into<String>) -> Self {
        self.type_class = type_class.into();
        self
    }
}


/// Failure reported by the bridge or the underlying driver.
#[derive(Debug)]
pub struct DriverError {
    pub message: String,
}

impl DriverError {
    pub fn new(message: impl Into<String>) -> Self {
        DriverError { message: message.into() }
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for DriverError {}


/// Entry point into the bridge: opens connections from validated descriptors.
#[async_trait]
pub trait JdbcDriver: Send + Sync {
    async fn open(
        &self,
        descriptor: &ConnectionDescriptor,
    ) -> Result<Box<dyn JdbcConnection>, DriverError>;
}

/// An open connection. Dropping it releases the underlying resources, which
/// is what keeps the no-leak-on-any-exit-path invariant without manual
/// bookkeeping.
#[async_trait]
pub trait JdbcConnection: Send {
    async fn execute(&mut self, command: &Command) -> Result<Box<dyn RowCursor>, DriverError>;
}

/// Forward-only cursor over one result set.
pub trait RowCursor: Send {
    /// Schema metadata as reported by the driver, unfiltered.
    fn schema(&self) -> &[ColumnSchema];

    /// Declared value type of a column. Decorators may reclassify this
    /// without touching [`RowCursor::schema`].
    fn field_type(&self, i: usize) -> SqlType;

    /// Move to the next row. `Ok(false)` once the result set is exhausted.
    fn advance(&mut self) -> Result<bool, DriverError>;

    /// Read a single column of the current row.
    fn value(&mut self, i: usize) -> Result<SqlValue, DriverError>;

    /// Read the whole current row into `out`, returning the column count.
    ///
    /// Implementations must clear `out` first: decorators rely on the row
    /// starting at index 0 so column ordinals line up with their override
    /// tables.
    fn row(&mut self, out: &mut Vec<SqlValue>) -> Result<usize, DriverError>;

    /// Chunked read out of a binary column, returning the bytes copied.
    fn bytes_chunk(
        &mut self,
        i: usize,
        offset: u64,
        buf: &mut [u8],
    ) -> Result<usize, DriverError>;

    fn column_count(&self) -> usize {
        self.schema().len()
    }

    fn column_name(&self, i: usize) -> &str {
        &self.schema()[i].name
    }

    fn ordinal(&self, name: &str) -> Option<usize> {
        self.schema()
            .iter()
            .position(|column| column.name.eq_ignore_ascii_case(name))
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameter_type_mapping_covers_bindable_types() {
        let cases: Vec<(SqlType, JdbcType)> = vec![
            (SqlType::Bool, JdbcType::BOOLEAN),
            (SqlType::I16, JdbcType::SMALLINT),
            (SqlType::I32, JdbcType::INTEGER),
            (SqlType::I64, JdbcType::BIGINT),
            (SqlType::F32, JdbcType::REAL),
            (SqlType::F64, JdbcType::DOUBLE),
            (SqlType::Decimal, JdbcType::DECIMAL),
            (SqlType::Text, JdbcType::VARCHAR),
            (SqlType::Bytes, JdbcType::VARBINARY),
        ];

        for (ty, expected) in cases {
            let mapped = jdbc_parameter_type(ty).unwrap();
            assert_eq!(mapped, expected, "for {ty:?}");
        }
    }

    #[test]
    fn datetime_and_uuid_are_not_natively_bindable() {
        assert!(jdbc_parameter_type(SqlType::DateTime).is_err());
        assert!(jdbc_parameter_type(SqlType::Uuid).is_err());
        assert!(jdbc_parameter_type(SqlType::Object).is_err());
    }

    #[test]
    fn fresh_command_carries_no_parameters() {
        let command = Command::new("select 1");
        assert_eq!(command.text, "select 1");
        assert!(command.parameters.is_empty());
    }
}

//! General-purpose native JDBC connector adapter.
//!
//! Lets a reporting host execute arbitrary SQL against any JDBC-reachable
//! database through one provider interface, enforcing row-count limits,
//! native-or-literal parameter handling, and column type normalization before
//! rows reach the host's tabular consumer. The JDBC bridge itself is supplied
//! externally through the [`bridge`] traits.
//!
//! The pipeline for one execution:
//! 1. [`connection::validate_connection_string`] normalizes the descriptor
//!    and resolves the driver jar under the trusted install directory.
//! 2. [`limit::ExecutionPlan`] maps the row limit mode to a query rewrite,
//!    a numeric cap, and a fallback policy.
//! 3. [`params::bind_parameters`] attaches every natively bindable parameter
//!    to the command; [`substitute::substitute_parameters`] renders the rest
//!    into the command text.
//! 4. [`reader::RowLimitedReader`] wraps the driver cursor, enforcing the cap
//!    and reclassifying opaque column types.

pub mod bridge;
pub mod connection;
pub mod error;
pub mod limit;
pub mod params;
pub mod provider;
pub mod reader;
pub mod substitute;

#[cfg(test)]
pub(crate) mod testing;

pub use connection::ConnectionDescriptor;
pub use error::{DataError, DataErrorKind};
pub use limit::{ExecutionPlan, RowLimitMode};
pub use params::{BindingOutcome, NamedParameter, ParameterValue};
pub use provider::{
    NativeJdbcProvider, NativeQuery, NativeQueryProvider, RowConsumer, PROVIDER_NAME,
};
pub use reader::RowLimitedReader;

//! Host boundary and the query execution pipeline.
//!
//! One execution is strictly sequential: validate the descriptor, open one
//! connection, derive the execution plan from the row limit mode, run the
//! binder and (when needed) the text substitution over a fresh command, and
//! hand the capped reader to the consumer exactly once before the connection
//! is dropped. Connection and cursor release rides on ownership: every exit
//! path, including errors, drops them before control returns to the caller.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::bridge::{Command, JdbcConnection, JdbcDriver, RowCursor};
use crate::connection::validate_connection_string;
use crate::error::DataError;
use crate::limit::{ExecutionPlan, RowLimitMode};
use crate::params::{bind_parameters, NamedParameter};
use crate::reader::RowLimitedReader;
use crate::substitute::substitute_parameters;

pub const PROVIDER_NAME: &str = "Native JDBC";

/// One query execution request from the host.
#[derive(Clone, Debug)]
pub struct NativeQuery {
    /// Original SQL text, never mutated; rewrites work on copies.
    pub text: String,
    pub connection_string: String,
    pub row_limit: RowLimitMode,
}

/// Receives the live row reader exactly once, before teardown.
pub type RowConsumer<'a> = Box<dyn FnOnce(&mut dyn RowCursor) + Send + 'a>;

/// The host's provider contract.
#[async_trait]
pub trait NativeQueryProvider {
    async fn execute(
        &self,
        query: &NativeQuery,
        parameters: &[NamedParameter],
        consumer: RowConsumer<'_>,
    ) -> Result<(), DataError>;

    async fn test_connection(&self, connection_string: &str) -> Result<(), DataError>;
}

/// General-purpose native JDBC connector.
pub struct NativeJdbcProvider<D> {
    driver: D,
    /// Trusted base directory for driver jars; relative driver paths in
    /// connection strings resolve under it.
    install_dir: PathBuf,
}

impl<D: JdbcDriver> NativeJdbcProvider<D> {
    pub fn new(driver: D, install_dir: impl Into<PathBuf>) -> Self {
        NativeJdbcProvider { driver, install_dir: install_dir.into() }
    }

    /// One execution attempt: fresh command (no parameters from a previous
    /// attempt survive), full binder pass, then text substitution only when
    /// some parameter ended up unbound.
    async fn run_attempt(
        &self,
        connection: &mut dyn JdbcConnection,
        text: &str,
        parameters: &[NamedParameter],
    ) -> Result<Box<dyn RowCursor>, DataError> {
        let mut command = Command::new(text);
        let outcome = bind_parameters(&mut command, parameters);
        if !outcome.unbound.is_empty() {
            tracing::debug!(
                count = outcome.unbound.len(),
                "rendering unbindable parameters into the command text"
            );
            command.text =
                substitute_parameters(&command.text, &outcome.unbound, &outcome.bound)?;
        }
        connection.execute(&command).await.map_err(DataError::execution)
    }
}

#[async_trait]
impl<D: JdbcDriver> NativeQueryProvider for NativeJdbcProvider<D> {
    async fn execute(
        &self,
        query: &NativeQuery,
        parameters: &[NamedParameter],
        consumer: RowConsumer<'_>,
    ) -> Result<(), DataError> {
        if query.text.trim().is_empty() {
            return Err(DataError::configuration(
                "Command text can not be null or empty.",
            ));
        }

        let descriptor = validate_connection_string(&query.connection_string, &self.install_dir)?;

        let mut connection = self
            .driver
            .open(&descriptor)
            .await
            .map_err(|source| DataError::connection(PROVIDER_NAME, source))?;

        let plan = ExecutionPlan::for_query(&query.text, query.row_limit);
        tracing::info!(cap = plan.cap, retry = plan.retry, "executing query");

        let cursor = match self
            .run_attempt(connection.as_mut(), &plan.command_text, parameters)
            .await
        {
            Ok(cursor) => cursor,
            Err(error) if plan.retry && error.is_execution_failure() => {
                tracing::warn!(%error, "rewritten query failed, retrying with the original text");
                self.run_attempt(connection.as_mut(), &query.text, parameters)
                    .await?
            }
            Err(error) => return Err(error),
        };

        let mut reader = RowLimitedReader::new(cursor, plan.cap);
        consumer(&mut reader);
        Ok(())
    }

    async fn test_connection(&self, connection_string: &str) -> Result<(), DataError> {
        let descriptor = validate_connection_string(connection_string, &self.install_dir)?;
        self.driver
            .open(&descriptor)
            .await
            .map_err(|source| DataError::connection(PROVIDER_NAME, source))?;
        Ok(())
    }
}

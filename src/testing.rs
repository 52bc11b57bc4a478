//! In-memory stand-in for the JDBC bridge, used by unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::bridge::{
    ColumnSchema, Command, DriverError, JdbcConnection, JdbcDriver, RowCursor, SqlValue,
};
use crate::connection::ConnectionDescriptor;

/// Scripted driver: every connection serves the same schema and rows, and
/// optionally fails commands whose text contains a given needle (to simulate
/// statements incompatible with subquery wrapping).
#[derive(Clone, Default)]
pub(crate) struct ScriptedDriver {
    pub schema: Vec<ColumnSchema>,
    pub rows: Vec<Vec<SqlValue>>,
    pub fail_contains: Option<String>,
    pub refuse_connections: bool,
    pub executed: Arc<Mutex<Vec<Command>>>,
    pub opened: Arc<AtomicUsize>,
}

impl ScriptedDriver {
    pub fn executed_texts(&self) -> Vec<String> {
        self.executed.lock().unwrap().iter().map(|c| c.text.clone()).collect()
    }

    pub fn opened_count(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JdbcDriver for ScriptedDriver {
    async fn open(
        &self,
        _descriptor: &ConnectionDescriptor,
    ) -> Result<Box<dyn JdbcConnection>, DriverError> {
        if self.refuse_connections {
            return Err(DriverError::new("connection refused"));
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedConnection { driver: self.clone() }))
    }
}

struct ScriptedConnection {
    driver: ScriptedDriver,
}

#[async_trait]
impl JdbcConnection for ScriptedConnection {
    async fn execute(&mut self, command: &Command) -> Result<Box<dyn RowCursor>, DriverError> {
        self.driver.executed.lock().unwrap().push(command.clone());
        if let Some(needle) = &self.driver.fail_contains {
            if command.text.contains(needle.as_str()) {
                return Err(DriverError::new(format!("syntax error near <{needle}>")));
            }
        }
        Ok(Box::new(ScriptedCursor::new(
            self.driver.schema.clone(),
            self.driver.rows.clone(),
        )))
    }
}

/// Forward-only cursor over scripted rows.
pub(crate) struct ScriptedCursor {
    schema: Vec<ColumnSchema>,
    rows: Vec<Vec<SqlValue>>,
    position: usize,
}

impl ScriptedCursor {
    pub fn new(schema: Vec<ColumnSchema>, rows: Vec<Vec<SqlValue>>) -> Self {
        ScriptedCursor { schema, rows, position: 0 }
    }

    fn current(&self) -> Result<&Vec<SqlValue>, DriverError> {
        if self.position == 0 {
            return Err(DriverError::new("cursor is before the first row"));
        }
        self.rows
            .get(self.position - 1)
            .ok_or_else(|| DriverError::new("cursor is past the last row"))
    }
}

impl RowCursor for ScriptedCursor {
    fn schema(&self) -> &[ColumnSchema] {
        &self.schema
    }

    fn field_type(&self, i: usize) -> crate::bridge::SqlType {
        self.schema[i].ty
    }

    fn advance(&mut self) -> Result<bool, DriverError> {
        if self.position < self.rows.len() {
            self.position += 1;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn value(&mut self, i: usize) -> Result<SqlValue, DriverError> {
        Ok(self.current()?[i].clone())
    }

    fn row(&mut self, out: &mut Vec<SqlValue>) -> Result<usize, DriverError> {
        let current = self.current()?.clone();
        out.clear();
        out.extend(current);
        Ok(out.len())
    }

    fn bytes_chunk(
        &mut self,
        i: usize,
        offset: u64,
        buf: &mut [u8],
    ) -> Result<usize, DriverError> {
        let SqlValue::Bytes(bytes) = &self.current()?[i] else {
            return Err(DriverError::new("column is not binary"));
        };
        let start = (offset as usize).min(bytes.len());
        let n = (bytes.len() - start).min(buf.len());
        buf[..n].copy_from_slice(&bytes[start..start + n]);
        Ok(n)
    }
}

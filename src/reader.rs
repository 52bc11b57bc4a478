//! Streaming row reader decorating the driver cursor.
//!
//! Enforces the execution plan's row cap during iteration and, on
//! construction, inspects the result schema once to reclassify opaque column
//! types the host can not represent natively. Overrides live in a vector
//! indexed by column ordinal, so the per-row read path does no map lookups.

use phf::phf_map;
use uuid::Uuid;

use crate::bridge::{ColumnSchema, DriverError, RowCursor, SqlType, SqlValue};


/// Replacement type and value converter for a column whose declared type is
/// the opaque placeholder but whose driver type class is recognized.
#[derive(Clone, Copy)]
pub struct ColumnOverride {
    pub ty: SqlType,
    pub convert: fn(SqlValue) -> Result<SqlValue, DriverError>,
}

/// Driver type class names with a known host-side representation.
static TYPE_CLASS_OVERRIDES: phf::Map<&'static str, ColumnOverride> = phf_map! {
    "java.util.uuid" => ColumnOverride { ty: SqlType::Uuid, convert: uuid_from_opaque },
};

/// Null and empty pass through as null; anything else must parse as a
/// canonical UUID string.
fn uuid_from_opaque(value: SqlValue) -> Result<SqlValue, DriverError> {
    let text = match value {
        SqlValue::Null => return Ok(SqlValue::Null),
        SqlValue::Uuid(u) => return Ok(SqlValue::Uuid(u)),
        SqlValue::Opaque(s) | SqlValue::Text(s) => s,
        other => {
            return Err(DriverError::new(format!(
                "can not convert {other:?} to a UUID"
            )));
        }
    };
    if text.is_empty() {
        return Ok(SqlValue::Null);
    }
    let parsed = Uuid::parse_str(&text)
        .map_err(|e| DriverError::new(format!("invalid UUID value <{text}>: {e}")))?;
    Ok(SqlValue::Uuid(parsed))
}

fn detect_overrides(schema: &[ColumnSchema]) -> Vec<Option<ColumnOverride>> {
    schema
        .iter()
        .map(|column| {
            if column.ty != SqlType::Object {
                return None;
            }
            let key = column.type_class.to_ascii_lowercase();
            let found = TYPE_CLASS_OVERRIDES.get(key.as_str()).copied();
            if let Some(over) = &found {
                tracing::debug!(
                    column = %column.name,
                    class = %column.type_class,
                    ty = ?over.ty,
                    "overriding opaque column type"
                );
            }
            found
        })
        .collect()
}


/// Cursor decorator capping the number of rows produced and applying column
/// type overrides to every value read.
pub struct RowLimitedReader {
    cursor: Box<dyn RowCursor>,
    cap: u64,
    rows_produced: u64,
    overrides: Vec<Option<ColumnOverride>>,
}

impl RowLimitedReader {
    pub fn new(cursor: Box<dyn RowCursor>, cap: u64) -> RowLimitedReader {
        let overrides = detect_overrides(cursor.schema());
        RowLimitedReader { cursor, cap, rows_produced: 0, overrides }
    }

    pub fn rows_produced(&self) -> u64 {
        self.rows_produced
    }

    fn override_for(&self, i: usize) -> Option<ColumnOverride> {
        self.overrides.get(i).copied().flatten()
    }
}

impl RowCursor for RowLimitedReader {
    fn schema(&self) -> &[ColumnSchema] {
        self.cursor.schema()
    }

    fn field_type(&self, i: usize) -> SqlType {
        match self.override_for(i) {
            Some(over) => over.ty,
            None => self.cursor.field_type(i),
        }
    }

    fn advance(&mut self) -> Result<bool, DriverError> {
        if self.rows_produced >= self.cap {
            return Ok(false);
        }
        if self.cursor.advance()? {
            self.rows_produced += 1;
            return Ok(true);
        }
        Ok(false)
    }

    fn value(&mut self, i: usize) -> Result<SqlValue, DriverError> {
        let raw = self.cursor.value(i)?;
        match self.override_for(i) {
            Some(over) => (over.convert)(raw),
            None => Ok(raw),
        }
    }

    fn row(&mut self, out: &mut Vec<SqlValue>) -> Result<usize, DriverError> {
        let count = self.cursor.row(out)?;
        for (i, slot) in out.iter_mut().enumerate().take(count) {
            if let Some(over) = self.overrides.get(i).copied().flatten() {
                let raw = std::mem::replace(slot, SqlValue::Null);
                *slot = (over.convert)(raw)?;
            }
        }
        Ok(count)
    }

    fn bytes_chunk(
        &mut self,
        i: usize,
        offset: u64,
        buf: &mut [u8],
    ) -> Result<usize, DriverError> {
        self.cursor.bytes_chunk(i, offset, buf)
    }
}

//! Typed values, records, and batches moved between the two databases.

use bytes::BytesMut;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use postgres::types::{to_sql_checked, IsNull, ToSql, Type};
use rusqlite::types::ValueRef;
use uuid::Uuid;

use crate::schema::{Field, FieldType};

/// One field value in transit from source to destination.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Text(String),
    Float(f64),
    Uuid(Uuid),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
}

impl SqlValue {
    /// Decode one SQLite column value according to the declared field type.
    ///
    /// NULL is accepted for any field; the destination's own constraints
    /// decide whether it is allowed there.
    pub fn decode(raw: ValueRef<'_>, field: &Field) -> Result<Self, String> {
        match (field.ty, raw) {
            (_, ValueRef::Null) => Ok(SqlValue::Null),
            (FieldType::Uuid, ValueRef::Text(bytes)) => {
                Uuid::parse_str(text_of(bytes)?).map(SqlValue::Uuid).map_err(|e| e.to_string())
            }
            (FieldType::Uuid, ValueRef::Blob(bytes)) => {
                Uuid::from_slice(bytes).map(SqlValue::Uuid).map_err(|e| e.to_string())
            }
            (FieldType::Text, ValueRef::Text(bytes)) => {
                Ok(SqlValue::Text(text_of(bytes)?.to_owned()))
            }
            (FieldType::Float, ValueRef::Real(v)) => Ok(SqlValue::Float(v)),
            // SQLite stores whole-number ratings as integers.
            (FieldType::Float, ValueRef::Integer(v)) => Ok(SqlValue::Float(v as f64)),
            (FieldType::Date, ValueRef::Text(bytes)) => {
                NaiveDate::parse_from_str(text_of(bytes)?, "%Y-%m-%d")
                    .map(SqlValue::Date)
                    .map_err(|e| e.to_string())
            }
            (FieldType::Timestamp, ValueRef::Text(bytes)) => {
                parse_timestamp(text_of(bytes)?).map(SqlValue::Timestamp)
            }
            (ty, other) => Err(format!(
                "cannot decode {} storage as {:?}",
                other.data_type(),
                ty
            )),
        }
    }
}

fn text_of(bytes: &[u8]) -> Result<&str, String> {
    std::str::from_utf8(bytes).map_err(|e| e.to_string())
}

/// Parse the timestamp text formats found in the source database.
///
/// The original loader wrote values like `2021-06-16 20:14:09.221838+00`;
/// RFC 3339 and naive timestamps (assumed UTC) are accepted as well.
pub(crate) fn parse_timestamp(text: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f") {
        return Ok(naive.and_utc());
    }
    Err(format!("unrecognized timestamp format: {text}"))
}

impl ToSql for SqlValue {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn std::error::Error + Sync + Send>> {
        match self {
            SqlValue::Null => Ok(IsNull::Yes),
            SqlValue::Text(v) => v.to_sql(ty, out),
            SqlValue::Float(v) => v.to_sql(ty, out),
            SqlValue::Uuid(v) => v.to_sql(ty, out),
            SqlValue::Date(v) => v.to_sql(ty, out),
            SqlValue::Timestamp(v) => v.to_sql(ty, out),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        // Values are typed at runtime; the inner `to_sql` rejects a column
        // type it cannot encode into.
        true
    }

    to_sql_checked!();
}

/// One source row materialized into a schema-shaped record.
///
/// Values follow the schema's declared field order; the record is immutable
/// after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedRecord {
    values: Vec<SqlValue>,
}

impl TypedRecord {
    pub fn new(values: Vec<SqlValue>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }
}

/// A bounded group of records moved in one read/write round trip.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    rows: Vec<TypedRecord>,
}

impl Batch {
    pub fn new(rows: Vec<TypedRecord>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[TypedRecord] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

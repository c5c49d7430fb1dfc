//! Declarative record shapes for the five migrated tables.
//!
//! Field order is load-bearing: it drives both the source `SELECT` column
//! order and the destination insert column order, and rows are mapped onto
//! records positionally. The reader checks each declaration against the
//! live source table before any row is read.

/// Field type as it travels between the two databases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// UUID primary/foreign keys, stored as text in SQLite.
    Uuid,
    Text,
    Float,
    /// Calendar date without time component.
    Date,
    /// Timestamp with timezone.
    Timestamp,
}

/// One named, typed field of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub ty: FieldType,
}

const fn field(name: &'static str, ty: FieldType) -> Field {
    Field { name, ty }
}

/// Ordered field declaration for one table's record shape.
#[derive(Debug, Clone, Copy)]
pub struct RecordSchema {
    /// Table name, identical on both sides.
    pub table: &'static str,

    /// Fields in declared order.
    pub fields: &'static [Field],
}

impl RecordSchema {
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Column names in declared order, for the source SELECT.
    pub fn column_list(&self) -> String {
        self.field_names().join(", ")
    }

    pub fn field_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.name).collect()
    }
}

use FieldType::{Date, Float, Text, Timestamp, Uuid};

pub const FILM_WORK: RecordSchema = RecordSchema {
    table: "film_work",
    fields: &[
        field("id", Uuid),
        field("title", Text),
        field("description", Text),
        field("creation_date", Date),
        field("file_path", Text),
        field("rating", Float),
        field("type", Text),
        field("created_at", Timestamp),
        field("updated_at", Timestamp),
    ],
};

pub const GENRE: RecordSchema = RecordSchema {
    table: "genre",
    fields: &[
        field("id", Uuid),
        field("name", Text),
        field("description", Text),
        field("created_at", Timestamp),
        field("updated_at", Timestamp),
    ],
};

pub const PERSON: RecordSchema = RecordSchema {
    table: "person",
    fields: &[
        field("id", Uuid),
        field("full_name", Text),
        field("birth_date", Date),
        field("created_at", Timestamp),
        field("updated_at", Timestamp),
    ],
};

pub const GENRE_FILM_WORK: RecordSchema = RecordSchema {
    table: "genre_film_work",
    fields: &[
        field("id", Uuid),
        field("film_work_id", Uuid),
        field("genre_id", Uuid),
        field("created_at", Timestamp),
    ],
};

pub const PERSON_FILM_WORK: RecordSchema = RecordSchema {
    table: "person_film_work",
    fields: &[
        field("id", Uuid),
        field("film_work_id", Uuid),
        field("person_id", Uuid),
        field("role", Text),
        field("created_at", Timestamp),
    ],
};

/// The fixed table-to-schema binding driving migration order.
///
/// Parent tables come before the link tables that reference them.
pub fn table_bindings() -> &'static [RecordSchema] {
    &[FILM_WORK, GENRE, PERSON, GENRE_FILM_WORK, PERSON_FILM_WORK]
}

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::collections::{HashMap, HashSet};

use crate::types::PortableType;

/// One output row: column name to value.
///
/// Rows are sparse. A column missing from a row means the value was absent for that
/// row, not an error; consumers should treat it as null.
pub type Row = Map<String, JsonValue>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub friendly_name: String,
    #[serde(rename = "type")]
    pub column_type: PortableType,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: PortableType) -> Self {
        let name = name.into();
        Self {
            friendly_name: name.clone(),
            name,
            column_type,
        }
    }
}

/// A flattened result: ordered columns plus rows keyed by column name.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<Column>,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }
}

/// Caller-supplied allow-list restricting which flattened names become columns.
///
/// An empty list restricts nothing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResultFields {
    names: HashSet<String>,
}

impl ResultFields {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn allows(&self, name: &str) -> bool {
        self.names.is_empty() || self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for ResultFields {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Accumulates columns in first-seen order while rows are being assembled.
///
/// A column's type is fixed by the first value recorded under its name; later values
/// never re-type it.
#[derive(Debug)]
pub(crate) struct TableBuilder<'a> {
    result_fields: Option<&'a ResultFields>,
    columns: Vec<Column>,
    index: HashMap<String, usize>,
    rows: Vec<Row>,
}

impl<'a> TableBuilder<'a> {
    pub(crate) fn new(result_fields: Option<&'a ResultFields>) -> Self {
        Self {
            result_fields,
            columns: Vec::new(),
            index: HashMap::new(),
            rows: Vec::new(),
        }
    }

    pub(crate) fn allows(&self, name: &str) -> bool {
        self.result_fields.map_or(true, |fields| fields.allows(name))
    }

    /// Sets `name = value` on `row`, registering the column on first sight.
    ///
    /// Names rejected by the allow-list are dropped without touching the row.
    pub(crate) fn record(&mut self, row: &mut Row, name: String, value: JsonValue) {
        if !self.allows(&name) {
            return;
        }
        if !self.index.contains_key(&name) {
            self.index.insert(name.clone(), self.columns.len());
            self.columns
                .push(Column::new(name.clone(), PortableType::for_value(&value)));
        }
        row.insert(name, value);
    }

    pub(crate) fn rows_mut(&mut self) -> &mut Vec<Row> {
        &mut self.rows
    }

    pub(crate) fn push_row(&mut self, row: Row) {
        self.rows.push(row);
    }

    pub(crate) fn finish(self) -> Table {
        Table {
            columns: self.columns,
            rows: self.rows,
        }
    }
}

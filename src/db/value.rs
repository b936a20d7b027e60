use rusqlite::types::ValueRef;
use serde::Serialize;
use std::fmt;

/// A single column value as SQLite stores it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl From<ValueRef<'_>> for SqlValue {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => SqlValue::Null,
            ValueRef::Integer(i) => SqlValue::Integer(i),
            ValueRef::Real(r) => SqlValue::Real(r),
            ValueRef::Text(t) => SqlValue::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => SqlValue::Blob(b.to_vec()),
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => write!(f, "None"),
            SqlValue::Integer(i) => write!(f, "{}", i),
            // Debug keeps the fractional part: 2.0 rather than 2
            SqlValue::Real(r) => write!(f, "{:?}", r),
            SqlValue::Text(t) => write!(f, "'{}'", t.replace('\\', "\\\\").replace('\'', "\\'")),
            SqlValue::Blob(b) => write!(f, "b'{}'", b.escape_ascii()),
        }
    }
}

/// One result row, columns in statement order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Row(pub Vec<SqlValue>);

impl Row {
    pub fn values(&self) -> &[SqlValue] {
        &self.0
    }
}

/// Renders the row as a tuple: `(1, 'A101', None)`, `(1,)`, `()`.
impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", value)?;
        }
        if self.0.len() == 1 {
            write!(f, ",")?;
        }
        write!(f, ")")
    }
}

/// Every row a statement produced, in the order SQLite returned them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl ResultSet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_value_rows_keep_the_trailing_comma() {
        assert_eq!(Row(vec![SqlValue::Integer(1)]).to_string(), "(1,)");
        assert_eq!(Row(vec![]).to_string(), "()");
    }

    #[test]
    fn mixed_row_rendering() {
        let row = Row(vec![
            SqlValue::Integer(3),
            SqlValue::Text("O'Brien".to_string()),
            SqlValue::Real(2.0),
            SqlValue::Null,
            SqlValue::Blob(vec![0x41, 0x00]),
        ]);
        assert_eq!(row.to_string(), r"(3, 'O\'Brien', 2.0, None, b'A\x00')");
    }

    #[test]
    fn rows_serialize_as_plain_json_arrays() {
        let set = ResultSet {
            columns: vec!["apt_id".to_string(), "apt_number".to_string()],
            rows: vec![Row(vec![SqlValue::Integer(1), SqlValue::Text("A101".to_string())])],
        };
        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "columns": ["apt_id", "apt_number"], "rows": [[1, "A101"]] })
        );
    }
}

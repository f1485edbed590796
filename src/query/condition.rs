use super::operator::QueryOperator;
use crate::naming::upper_snake_case;
use crate::protocol::DbValue;

/// Column reference, optionally qualified by table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryField {
    pub table_name: Option<String>,
    pub field_name: String,
}

impl QueryField {
    pub fn new(table_name: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self {
            table_name: Some(table_name.into()),
            field_name: field_name.into(),
        }
    }

    pub fn column(field_name: impl Into<String>) -> Self {
        Self {
            table_name: None,
            field_name: field_name.into(),
        }
    }

    /// Field of a record type; the table is the type name in upper snake case
    pub fn of_type(type_name: &str, field_name: impl Into<String>) -> Self {
        Self::new(upper_snake_case(type_name), field_name)
    }
}

/// Right-hand side of a condition
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    Null,
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    List(Vec<String>),
}

impl QueryValue {
    /// `UNHEX('<hex>')`, passed through unquoted when rendered
    pub fn unhex(hex: &str) -> Self {
        QueryValue::Text(format!("UNHEX('{}')", hex))
    }

    pub fn to_db_value(&self) -> DbValue {
        match self {
            QueryValue::Null => DbValue::Null,
            QueryValue::Text(s) => DbValue::Text(s.clone()),
            QueryValue::Integer(i) => DbValue::Integer(*i),
            QueryValue::Float(f) => DbValue::Float(*f),
            QueryValue::Bool(b) => DbValue::Bool(*b),
            QueryValue::List(items) => DbValue::Text(items.join(",")),
        }
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::Text(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::Text(value)
    }
}

impl From<i64> for QueryValue {
    fn from(value: i64) -> Self {
        QueryValue::Integer(value)
    }
}

impl From<i32> for QueryValue {
    fn from(value: i32) -> Self {
        QueryValue::Integer(value as i64)
    }
}

impl From<f64> for QueryValue {
    fn from(value: f64) -> Self {
        QueryValue::Float(value)
    }
}

impl From<bool> for QueryValue {
    fn from(value: bool) -> Self {
        QueryValue::Bool(value)
    }
}

impl From<Vec<String>> for QueryValue {
    fn from(value: Vec<String>) -> Self {
        QueryValue::List(value)
    }
}

impl From<Vec<&str>> for QueryValue {
    fn from(value: Vec<&str>) -> Self {
        QueryValue::List(value.into_iter().map(str::to_string).collect())
    }
}

impl<T: Into<QueryValue>> From<Option<T>> for QueryValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(QueryValue::Null)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryCondition {
    pub field: QueryField,
    pub operator: QueryOperator,
    pub value: QueryValue,
}

impl QueryCondition {
    pub fn new(field: QueryField, operator: QueryOperator, value: impl Into<QueryValue>) -> Self {
        Self {
            field,
            operator,
            value: value.into(),
        }
    }
}

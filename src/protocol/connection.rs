//! Execution collaborator boundary
//!
//! The engine never talks to a database driver directly. It hands a fully
//! described [`DbCommand`] to a [`DbConnection`] implementation, which runs it and
//! fills in the output parameter values.

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    StoredProcedure,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterDirection {
    Input,
    Output,
    InputOutput,
    ReturnValue,
}

impl ParameterDirection {
    pub fn is_output(&self) -> bool {
        !matches!(self, ParameterDirection::Input)
    }
}

/// Declared parameter type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbType {
    String,
    Int64,
    Double,
    Boolean,
    Object,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DbValue {
    Null,
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl DbValue {
    pub fn is_null(&self) -> bool {
        matches!(self, DbValue::Null)
    }

    pub fn db_type(&self) -> DbType {
        match self {
            DbValue::Null => DbType::Object,
            DbValue::Text(_) => DbType::String,
            DbValue::Integer(_) => DbType::Int64,
            DbValue::Float(_) => DbType::Double,
            DbValue::Bool(_) => DbType::Boolean,
        }
    }
}

impl fmt::Display for DbValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbValue::Null => write!(f, "NULL"),
            DbValue::Text(s) => write!(f, "{}", s),
            DbValue::Integer(i) => write!(f, "{}", i),
            DbValue::Float(n) => write!(f, "{}", n),
            DbValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for DbValue {
    fn from(value: &str) -> Self {
        DbValue::Text(value.to_string())
    }
}

impl From<String> for DbValue {
    fn from(value: String) -> Self {
        DbValue::Text(value)
    }
}

impl From<i64> for DbValue {
    fn from(value: i64) -> Self {
        DbValue::Integer(value)
    }
}

impl From<i32> for DbValue {
    fn from(value: i32) -> Self {
        DbValue::Integer(value as i64)
    }
}

impl From<f64> for DbValue {
    fn from(value: f64) -> Self {
        DbValue::Float(value)
    }
}

impl From<bool> for DbValue {
    fn from(value: bool) -> Self {
        DbValue::Bool(value)
    }
}

impl<T: Into<DbValue>> From<Option<T>> for DbValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(DbValue::Null)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DbParameter {
    pub name: String,
    pub direction: ParameterDirection,
    pub db_type: DbType,
    pub value: DbValue,
}

/// A statement ready for execution: text, parameters in bind order, timeout
#[derive(Debug, Clone, PartialEq)]
pub struct DbCommand {
    pub text: String,
    pub command_type: CommandType,
    pub parameters: Vec<DbParameter>,
    pub timeout: Option<Duration>,
}

impl DbCommand {
    pub fn new(text: impl Into<String>, command_type: CommandType) -> Self {
        Self {
            text: text.into(),
            command_type,
            parameters: Vec::new(),
            timeout: None,
        }
    }

    pub fn parameter(&self, name: &str) -> Option<&DbParameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Set the value of an output parameter (used by connections after execution)
    pub fn set_output(&mut self, name: &str, value: impl Into<DbValue>) -> bool {
        match self
            .parameters
            .iter_mut()
            .find(|p| p.name == name && p.direction.is_output())
        {
            Some(parameter) => {
                parameter.value = value.into();
                true
            }
            None => false,
        }
    }

    /// Input value as text, for connections that dispatch on parameters
    pub fn input_text(&self, name: &str) -> Option<&str> {
        match self.parameter(name).map(|p| &p.value) {
            Some(DbValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// Driver-level failure (connectivity, malformed statement, constraint)
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionFault {
    pub message: String,
}

impl ExecutionFault {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ExecutionFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExecutionFault {}

/// Physical connection to the database, supplied by the host application
#[async_trait]
pub trait DbConnection: Send + Sync {
    async fn open(&self) -> Result<(), ExecutionFault>;

    async fn close(&self) -> Result<(), ExecutionFault>;

    async fn begin_transaction(&self) -> Result<(), ExecutionFault>;

    async fn commit(&self) -> Result<(), ExecutionFault>;

    async fn rollback(&self) -> Result<(), ExecutionFault>;

    /// Run the command and populate its output parameters
    async fn execute(&self, command: &mut DbCommand) -> Result<(), ExecutionFault>;

    /// Database name used in diagnostics
    fn database(&self) -> &str {
        ""
    }
}

//! Single-shot command: bind parameters, execute once, fire output callbacks

use super::connection::{CommandType, DbCommand, DbParameter, DbType, DbValue, ParameterDirection};
use super::params;
use super::session::DataSession;
use crate::error::{CommandTrace, DataVaultError, Result};
use log::debug;
use serde::Serialize;
use std::time::{Duration, Instant};

/// Conversion from an output parameter value. Database NULL maps to the type's
/// zero value.
pub trait FromDbValue: Sized {
    fn from_db_value(value: &DbValue) -> Self;
}

impl FromDbValue for String {
    fn from_db_value(value: &DbValue) -> Self {
        match value {
            DbValue::Null => String::new(),
            other => other.to_string(),
        }
    }
}

impl FromDbValue for i64 {
    fn from_db_value(value: &DbValue) -> Self {
        match value {
            DbValue::Integer(i) => *i,
            DbValue::Float(f) => *f as i64,
            DbValue::Bool(b) => *b as i64,
            DbValue::Text(s) => s.trim().parse().unwrap_or_default(),
            DbValue::Null => 0,
        }
    }
}

impl FromDbValue for i32 {
    fn from_db_value(value: &DbValue) -> Self {
        i64::from_db_value(value) as i32
    }
}

impl FromDbValue for f64 {
    fn from_db_value(value: &DbValue) -> Self {
        match value {
            DbValue::Integer(i) => *i as f64,
            DbValue::Float(f) => *f,
            DbValue::Text(s) => s.trim().parse().unwrap_or_default(),
            _ => 0.0,
        }
    }
}

impl FromDbValue for bool {
    fn from_db_value(value: &DbValue) -> Self {
        match value {
            DbValue::Bool(b) => *b,
            DbValue::Integer(i) => *i != 0,
            DbValue::Text(s) => matches!(s.trim(), "1" | "true" | "TRUE" | "True"),
            _ => false,
        }
    }
}

impl<T: FromDbValue> FromDbValue for Option<T> {
    fn from_db_value(value: &DbValue) -> Self {
        match value {
            DbValue::Null => None,
            other => Some(T::from_db_value(other)),
        }
    }
}

type OutputCallback<S> = Box<dyn FnOnce(&mut S, &DbValue) + Send>;

/// A stored procedure or text command with its bound parameters.
///
/// Output callbacks receive a caller-owned state `S`; they run only after a
/// successful execution, once each, in registration order.
pub struct DataCommand<S = ()> {
    command: DbCommand,
    callbacks: Vec<(String, OutputCallback<S>)>,
}

impl<S> DataCommand<S> {
    pub fn stored_procedure(name: impl Into<String>) -> Self {
        Self {
            command: DbCommand::new(name, CommandType::StoredProcedure),
            callbacks: Vec::new(),
        }
    }

    pub fn text(sql: impl Into<String>) -> Self {
        Self {
            command: DbCommand::new(sql, CommandType::Text),
            callbacks: Vec::new(),
        }
    }

    pub fn command_text(&self) -> &str {
        &self.command.text
    }

    pub fn command(&self) -> &DbCommand {
        &self.command
    }

    /// Bind an input parameter, replacing any earlier binding with the same name
    pub fn parameter(mut self, name: &str, value: impl Into<DbValue>) -> Self {
        let value = value.into();
        self.push(DbParameter {
            name: name.to_string(),
            direction: ParameterDirection::Input,
            db_type: value.db_type(),
            value,
        });
        self
    }

    /// Bind a composite input serialized as JSON text
    pub fn json_parameter<T: Serialize + ?Sized>(self, name: &str, value: &T) -> Result<Self> {
        let json = serde_json::to_string(value)?;
        Ok(self.parameter(name, json))
    }

    pub fn parameter_out<T, F>(self, name: &str, db_type: DbType, callback: F) -> Self
    where
        T: FromDbValue + 'static,
        F: FnOnce(&mut S, T) + Send + 'static,
    {
        self.output(name, ParameterDirection::Output, db_type, callback)
    }

    pub fn return_value<T, F>(self, callback: F) -> Self
    where
        T: FromDbValue + 'static,
        F: FnOnce(&mut S, T) + Send + 'static,
    {
        self.output(params::RETURN_VALUE, ParameterDirection::ReturnValue, DbType::Int64, callback)
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.command.timeout = Some(timeout);
        self
    }

    pub fn trace(&self) -> CommandTrace {
        CommandTrace {
            command_text: self.command.text.clone(),
            parameters: self
                .command
                .parameters
                .iter()
                .map(|p| (p.name.clone(), p.value.to_string()))
                .collect(),
        }
    }

    /// Execute exactly once. The connection is requested before and released
    /// after the statement, whatever the outcome.
    pub async fn execute(mut self, session: &DataSession, state: &mut S) -> Result<()> {
        if self.command.timeout.is_none() {
            self.command.timeout = session.command_timeout();
        }

        session
            .ensure_connection()
            .await
            .map_err(|fault| self.wrap_fault(fault.message))?;

        let started = Instant::now();
        let outcome = session.connection().execute(&mut self.command).await;
        let elapsed = started.elapsed();

        debug!(
            "Executed [{}].[{}] in {}ms{}",
            session.connection().database(),
            self.command.text,
            elapsed.as_millis(),
            self.trace()
        );

        let released = session.release_connection().await;

        outcome.map_err(|fault| self.wrap_fault(fault.message))?;
        released.map_err(|fault| self.wrap_fault(fault.message))?;

        for (name, callback) in self.callbacks.drain(..) {
            let value = self
                .command
                .parameter(&name)
                .map(|p| p.value.clone())
                .unwrap_or(DbValue::Null);
            callback(state, &value);
        }

        Ok(())
    }

    fn output<T, F>(mut self, name: &str, direction: ParameterDirection, db_type: DbType, callback: F) -> Self
    where
        T: FromDbValue + 'static,
        F: FnOnce(&mut S, T) + Send + 'static,
    {
        self.push(DbParameter {
            name: name.to_string(),
            direction,
            db_type,
            value: DbValue::Null,
        });
        self.callbacks.retain(|(existing, _)| existing != name);
        self.callbacks.push((
            name.to_string(),
            Box::new(move |state: &mut S, value: &DbValue| callback(state, T::from_db_value(value))),
        ));
        self
    }

    fn push(&mut self, parameter: DbParameter) {
        match self
            .command
            .parameters
            .iter_mut()
            .find(|p| p.name == parameter.name)
        {
            Some(existing) => *existing = parameter,
            None => self.command.parameters.push(parameter),
        }
    }

    fn wrap_fault(&self, message: String) -> DataVaultError {
        DataVaultError::Execution {
            message,
            command: self.trace(),
        }
    }
}

//! Stored-procedure calls following the `(STATUS_CODE, RESULT)` contract

use super::command::DataCommand;
use super::connection::DbType;
use super::json::{has_json_value, parse_message, to_nested_json};
use super::params;
use super::session::DataSession;
use crate::audit::AuditInfo;
use crate::error::{BusinessErrorCode, CommandTrace, DataVaultError, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Raw outputs of a data vault procedure
#[derive(Debug, Clone, PartialEq)]
pub struct DataVaultResult {
    pub status_code: BusinessErrorCode,
    pub json_result: String,
}

impl Default for DataVaultResult {
    fn default() -> Self {
        Self {
            status_code: BusinessErrorCode::Failed,
            json_result: String::new(),
        }
    }
}

pub struct DataVaultCommand<'a> {
    session: &'a DataSession,
    command: DataCommand<DataVaultResult>,
}

impl<'a> DataVaultCommand<'a> {
    /// A read call: binds the `STATUS_CODE` and `RESULT` outputs
    pub fn read_only(session: &'a DataSession, procedure: impl Into<String>) -> Self {
        let command = DataCommand::stored_procedure(procedure)
            .parameter_out(params::STATUS_CODE, DbType::String, |r: &mut DataVaultResult, v: String| {
                r.status_code = BusinessErrorCode::parse(&v)
            })
            .parameter_out(params::RESULT, DbType::String, |r: &mut DataVaultResult, v: String| {
                r.json_result = v
            });

        Self { session, command }
    }

    /// A write call: joins (or opens) the session transaction and attaches audit metadata
    pub async fn update(session: &'a DataSession, audit: &AuditInfo, procedure: impl Into<String>) -> Result<Self> {
        let procedure = procedure.into();
        session
            .begin_transaction()
            .await
            .map_err(|fault| DataVaultError::Execution {
                message: fault.message,
                command: CommandTrace {
                    command_text: procedure.clone(),
                    parameters: Vec::new(),
                },
            })?;

        Self::read_only(session, procedure).with_md(audit)
    }

    pub fn with_hub_data<T: Serialize + ?Sized>(self, data: &T) -> Result<Self> {
        self.with_json(params::HUB_DATA, data)
    }

    pub fn with_sat_data<T: Serialize + ?Sized>(self, data: &T) -> Result<Self> {
        self.with_json(params::SAT_DATA, data)
    }

    pub fn with_sat_query<T: Serialize + ?Sized>(self, query: &T) -> Result<Self> {
        self.with_json(params::SAT_QUERY, query)
    }

    pub fn with_foreign_keys<T: Serialize + ?Sized>(self, keys: &T) -> Result<Self> {
        self.with_json(params::FK, keys)
    }

    pub fn with_md(self, audit: &AuditInfo) -> Result<Self> {
        self.with_json(params::MD, audit)
    }

    pub fn with_hub_pk(self, hub_pk: &str) -> Self {
        self.with_parameter(params::HUB_PK, hub_pk)
    }

    pub fn with_link_pk(self, link_pk: &str) -> Self {
        self.with_parameter(params::LINK_PK, link_pk)
    }

    pub fn with_lookup_table(self, table: &str) -> Self {
        self.with_parameter(params::LKP_TABLE, table)
    }

    pub fn with_lookup_code(self, code: &str) -> Self {
        self.with_parameter(params::LKP_CODE_VALUE, code)
    }

    pub fn with_parameter(mut self, name: &str, value: &str) -> Self {
        self.command = self.command.parameter(name, value);
        self
    }

    fn with_json<T: Serialize + ?Sized>(mut self, name: &str, value: &T) -> Result<Self> {
        self.command = self.command.json_parameter(name, value)?;
        Ok(self)
    }

    pub fn trace(&self) -> CommandTrace {
        self.command.trace()
    }

    /// Execute and return the raw status and result, without interpreting them
    pub async fn execute(self) -> Result<DataVaultResult> {
        let mut result = DataVaultResult::default();
        self.command.execute(self.session, &mut result).await?;
        Ok(result)
    }

    /// Execute and turn a non-success status into a business error
    pub async fn execute_with_error_handling(self) -> Result<String> {
        let trace = self.command.trace();
        let result = self.execute().await?;

        if !result.status_code.is_success() {
            return Err(DataVaultError::Business {
                code: result.status_code,
                message: parse_message(&result.json_result),
                command: trace,
            });
        }

        Ok(result.json_result)
    }

    /// Execute, check the status and decode the nested JSON result. An empty
    /// result decodes to `T::default()`.
    pub async fn execute_typed<T: DeserializeOwned + Default>(self) -> Result<T> {
        let json = self.execute_with_error_handling().await?;
        decode_result(&json)
    }
}

pub(crate) fn decode_result<T: DeserializeOwned + Default>(json: &str) -> Result<T> {
    if !has_json_value(json) {
        return Ok(T::default());
    }

    let value: Value = serde_json::from_str(json)?;
    Ok(serde_json::from_value(to_nested_json(value))?)
}

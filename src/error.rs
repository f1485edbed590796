//! Error taxonomy for the data vault engine
//!
//! Execution faults come from the driver, business failures from a non-zero
//! `STATUS_CODE`. Not-found, invalid-lookup and already-exists are raised by the
//! repository layer itself.

use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DataVaultError>;

/// Business status codes returned by the stored procedures in `STATUS_CODE`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BusinessErrorCode {
    Failed,
    Success,
    EmailAlreadyExists,
    InvalidPrimaryKey,
    InvalidSatellitePayloadFormat,
    InvalidSatelliteData,
    InvalidDateTimeData,
    PayloadExceedFieldMaximumLength,
    BusinessKeyIsRequired,
    NumberOfFkFieldsNotMatchGranularityOfLink,
    NumberOfBkFieldsNotMatchRequiredBkOfHub,
    InvalidTableName,
    InvalidInputValue,
}

impl BusinessErrorCode {
    pub fn code(&self) -> i32 {
        match self {
            Self::Failed => -1,
            Self::Success => 0,
            Self::EmailAlreadyExists => 101,
            Self::InvalidPrimaryKey => 102,
            Self::InvalidSatellitePayloadFormat => 103,
            Self::InvalidSatelliteData => 104,
            Self::InvalidDateTimeData => 105,
            Self::PayloadExceedFieldMaximumLength => 106,
            Self::BusinessKeyIsRequired => 107,
            Self::NumberOfFkFieldsNotMatchGranularityOfLink => 108,
            Self::NumberOfBkFieldsNotMatchRequiredBkOfHub => 109,
            Self::InvalidTableName => 110,
            Self::InvalidInputValue => 111,
        }
    }

    pub fn from_code(code: i64) -> Self {
        match code {
            0 => Self::Success,
            101 => Self::EmailAlreadyExists,
            102 => Self::InvalidPrimaryKey,
            103 => Self::InvalidSatellitePayloadFormat,
            104 => Self::InvalidSatelliteData,
            105 => Self::InvalidDateTimeData,
            106 => Self::PayloadExceedFieldMaximumLength,
            107 => Self::BusinessKeyIsRequired,
            108 => Self::NumberOfFkFieldsNotMatchGranularityOfLink,
            109 => Self::NumberOfBkFieldsNotMatchRequiredBkOfHub,
            110 => Self::InvalidTableName,
            111 => Self::InvalidInputValue,
            _ => Self::Failed,
        }
    }

    /// Parse the raw `STATUS_CODE` output. Anything unparsable maps to `Failed`.
    pub fn parse(raw: &str) -> Self {
        raw.trim()
            .parse::<i64>()
            .map(Self::from_code)
            .unwrap_or(Self::Failed)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for BusinessErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({})", self, self.code())
    }
}

/// Text and parameter dump of a command, attached to errors for diagnosis
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandTrace {
    pub command_text: String,
    pub parameters: Vec<(String, String)>,
}

impl fmt::Display for CommandTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\nQuery: [{}]", self.command_text)?;
        for (name, value) in &self.parameters {
            write!(f, "\n{}: {}", name, value)?;
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum DataVaultError {
    /// Driver-level failure while executing a command
    #[error("{message}{command}")]
    Execution {
        message: String,
        command: CommandTrace,
    },

    /// Non-success `STATUS_CODE` from a completed execution
    #[error("{message}")]
    Business {
        code: BusinessErrorCode,
        message: String,
        command: CommandTrace,
    },

    #[error("There is no such an entity. Entity type: {entity}, id: {id}")]
    EntityNotFound { entity: String, id: String },

    #[error("Invalid lookup value. Lookup type: {lookup}. Value: {value}. Expected: {}.", .expected.join(", "))]
    InvalidLookup {
        lookup: String,
        value: String,
        expected: Vec<String>,
    },

    #[error("{entity} '{id}' already exists.")]
    AlreadyExists { entity: String, id: String },

    #[error("Error occurs when update data vault: {0}")]
    DataUpdate(#[source] Box<DataVaultError>),

    #[error("JSON error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl DataVaultError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::EntityNotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::EntityNotFound { .. })
    }

    /// Business status code, when the error came from a stored procedure
    pub fn business_code(&self) -> Option<BusinessErrorCode> {
        match self {
            Self::Business { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn command(&self) -> Option<&CommandTrace> {
        match self {
            Self::Execution { command, .. } | Self::Business { command, .. } => Some(command),
            _ => None,
        }
    }
}

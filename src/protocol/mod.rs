//! Stored-procedure command protocol
//!
//! A command is built (procedure name + parameters), executed exactly once
//! through a [`DbConnection`], and its `(STATUS_CODE, RESULT)` pair decoded into
//! either a value or a typed error.

pub mod command;
pub mod connection;
pub mod json;
pub mod params;
pub mod session;
pub mod vault_command;

pub use command::{DataCommand, FromDbValue};
pub use connection::{CommandType, DbCommand, DbConnection, DbParameter, DbType, DbValue, ExecutionFault, ParameterDirection};
pub use session::DataSession;
pub use vault_command::{DataVaultCommand, DataVaultResult};

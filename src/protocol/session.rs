//! Connection and transaction lifetime for one unit of work

use super::connection::{DbConnection, ExecutionFault};
use crate::error::{CommandTrace, DataVaultError, Result};
use log::{debug, error, info};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct SessionState {
    open_count: usize,
    in_transaction: bool,
}

/// Wraps a [`DbConnection`] with a nesting counter: the connection is opened on
/// the first request and closed when the last holder releases it. A transaction
/// holds one reference until it is committed or rolled back.
pub struct DataSession {
    connection: Arc<dyn DbConnection>,
    state: Mutex<SessionState>,
    command_timeout: Option<Duration>,
}

impl DataSession {
    pub fn new(connection: Arc<dyn DbConnection>) -> Self {
        Self {
            connection,
            state: Mutex::new(SessionState::default()),
            command_timeout: None,
        }
    }

    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = Some(timeout);
        self
    }

    pub fn connection(&self) -> &dyn DbConnection {
        self.connection.as_ref()
    }

    pub fn command_timeout(&self) -> Option<Duration> {
        self.command_timeout
    }

    pub async fn in_transaction(&self) -> bool {
        self.state.lock().await.in_transaction
    }

    /// Number of outstanding connection requests
    pub async fn open_count(&self) -> usize {
        self.state.lock().await.open_count
    }

    pub async fn ensure_connection(&self) -> std::result::Result<(), ExecutionFault> {
        let mut state = self.state.lock().await;
        self.acquire(&mut state).await
    }

    pub async fn release_connection(&self) -> std::result::Result<(), ExecutionFault> {
        let mut state = self.state.lock().await;
        self.release(&mut state).await
    }

    /// Open the ambient transaction if there is none yet
    pub async fn begin_transaction(&self) -> std::result::Result<(), ExecutionFault> {
        let mut state = self.state.lock().await;
        if state.in_transaction {
            return Ok(());
        }

        self.acquire(&mut state).await?;
        if let Err(fault) = self.connection.begin_transaction().await {
            self.release(&mut state).await?;
            return Err(fault);
        }

        debug!("Transaction started");
        state.in_transaction = true;
        Ok(())
    }

    /// Commit the ambient transaction. On commit failure the transaction is
    /// rolled back and a `DataUpdate` error is returned. The transaction's
    /// connection reference is released either way.
    pub async fn save_changes(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        if !state.in_transaction {
            return Ok(());
        }

        let outcome = match self.connection.commit().await {
            Ok(()) => {
                info!("Transaction committed");
                Ok(())
            }
            Err(fault) => {
                error!("Commit failed, rolling back: {}", fault);
                if let Err(rollback_fault) = self.connection.rollback().await {
                    error!("Rollback failed: {}", rollback_fault);
                }
                Err(DataVaultError::DataUpdate(Box::new(transaction_error(fault, "COMMIT"))))
            }
        };

        state.in_transaction = false;
        self.release(&mut state)
            .await
            .map_err(|fault| transaction_error(fault, "CLOSE"))?;

        outcome
    }

    /// Discard the ambient transaction without committing
    pub async fn rollback(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        if !state.in_transaction {
            return Ok(());
        }

        let outcome = self
            .connection
            .rollback()
            .await
            .map_err(|fault| transaction_error(fault, "ROLLBACK"));

        state.in_transaction = false;
        self.release(&mut state)
            .await
            .map_err(|fault| transaction_error(fault, "CLOSE"))?;

        outcome
    }

    async fn acquire(&self, state: &mut SessionState) -> std::result::Result<(), ExecutionFault> {
        if state.open_count == 0 {
            self.connection.open().await?;
            debug!("Connection opened");
        }
        state.open_count += 1;
        Ok(())
    }

    async fn release(&self, state: &mut SessionState) -> std::result::Result<(), ExecutionFault> {
        if state.open_count == 0 {
            return Ok(());
        }

        state.open_count -= 1;
        if state.open_count == 0 {
            self.connection.close().await?;
            debug!("Connection closed");
        }
        Ok(())
    }
}

fn transaction_error(fault: ExecutionFault, statement: &str) -> DataVaultError {
    DataVaultError::Execution {
        message: fault.message,
        command: CommandTrace {
            command_text: statement.to_string(),
            parameters: Vec::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::connection::DbCommand;
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    struct RecordingConnection {
        events: StdMutex<Vec<&'static str>>,
        fail_commit: bool,
    }

    impl RecordingConnection {
        fn push(&self, event: &'static str) {
            self.events.lock().unwrap().push(event);
        }

        fn events(&self) -> Vec<&'static str> {
            self.events.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DbConnection for RecordingConnection {
        async fn open(&self) -> std::result::Result<(), ExecutionFault> {
            self.push("open");
            Ok(())
        }

        async fn close(&self) -> std::result::Result<(), ExecutionFault> {
            self.push("close");
            Ok(())
        }

        async fn begin_transaction(&self) -> std::result::Result<(), ExecutionFault> {
            self.push("begin");
            Ok(())
        }

        async fn commit(&self) -> std::result::Result<(), ExecutionFault> {
            self.push("commit");
            if self.fail_commit {
                return Err(ExecutionFault::new("deadlock"));
            }
            Ok(())
        }

        async fn rollback(&self) -> std::result::Result<(), ExecutionFault> {
            self.push("rollback");
            Ok(())
        }

        async fn execute(&self, _command: &mut DbCommand) -> std::result::Result<(), ExecutionFault> {
            self.push("execute");
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_nested_connection_requests() {
        let connection = Arc::new(RecordingConnection::default());
        let session = DataSession::new(connection.clone());

        session.ensure_connection().await.unwrap();
        session.ensure_connection().await.unwrap();
        assert_eq!(session.open_count().await, 2);

        session.release_connection().await.unwrap();
        assert_eq!(connection.events(), vec!["open"]);

        session.release_connection().await.unwrap();
        session.release_connection().await.unwrap();
        assert_eq!(connection.events(), vec!["open", "close"]);
    }

    #[tokio::test]
    async fn test_commit_releases_connection() {
        let connection = Arc::new(RecordingConnection::default());
        let session = DataSession::new(connection.clone());

        session.begin_transaction().await.unwrap();
        session.begin_transaction().await.unwrap();
        assert!(session.in_transaction().await);

        session.save_changes().await.unwrap();
        assert!(!session.in_transaction().await);
        assert_eq!(connection.events(), vec!["open", "begin", "commit", "close"]);
    }

    #[tokio::test]
    async fn test_commit_failure_rolls_back() {
        let connection = Arc::new(RecordingConnection {
            fail_commit: true,
            ..Default::default()
        });
        let session = DataSession::new(connection.clone());

        session.begin_transaction().await.unwrap();
        let err = session.save_changes().await.unwrap_err();

        assert!(matches!(err, DataVaultError::DataUpdate(_)));
        assert_eq!(
            connection.events(),
            vec!["open", "begin", "commit", "rollback", "close"]
        );
    }

    #[tokio::test]
    async fn test_save_without_transaction_is_noop() {
        let connection = Arc::new(RecordingConnection::default());
        let session = DataSession::new(connection.clone());

        session.save_changes().await.unwrap();
        assert!(connection.events().is_empty());
    }
}

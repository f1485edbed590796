use super::{DataVaultContext, HubRepository, LinkRepository};
use crate::entity::{HubEntity, LinkEntity};
use crate::error::Result;
use log::warn;
use std::sync::Arc;

/// Repositories sharing one [`DataVaultContext`], committed together.
///
/// Dropping an incomplete unit of work leaves the transaction open on the
/// context; call [`UnitOfWork::discard`] to roll it back.
pub struct UnitOfWork {
    context: Arc<DataVaultContext>,
    completed: bool,
}

impl UnitOfWork {
    pub fn new(context: DataVaultContext) -> Self {
        Self {
            context: Arc::new(context),
            completed: false,
        }
    }

    pub fn context(&self) -> &DataVaultContext {
        &self.context
    }

    pub fn hub_repository<E: HubEntity>(&self) -> HubRepository<E> {
        HubRepository::new(self.context.clone())
    }

    pub fn link_repository<E: LinkEntity>(&self) -> LinkRepository<E> {
        LinkRepository::new(self.context.clone())
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Commit everything written through this unit of work
    pub async fn complete(&mut self) -> Result<()> {
        self.context.save_changes().await?;
        self.completed = true;
        Ok(())
    }

    /// Roll back everything written through this unit of work
    pub async fn discard(mut self) -> Result<()> {
        if self.completed {
            return Ok(());
        }
        let outcome = self.context.discard_changes().await;
        self.completed = true;
        outcome
    }
}

impl Drop for UnitOfWork {
    fn drop(&mut self) {
        if !self.completed && Arc::strong_count(&self.context) == 1 {
            warn!("Unit of work dropped without complete() or discard()");
        }
    }
}

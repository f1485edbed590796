use super::{DataVaultContext, DataVaultRepository, projection};
use crate::entity::{DvRecord, LinkEntity};
use crate::error::Result;
use crate::query::SatQuery;
use crate::query::vault_query::{filter_link, filter_link_record, filter_pk_id, filter_sat};
use async_trait::async_trait;
use std::marker::PhantomData;
use std::sync::Arc;

/// Repository for a link entity type, identified by its own PK
pub struct LinkRepository<E: LinkEntity> {
    context: Arc<DataVaultContext>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: LinkEntity> Clone for LinkRepository<E> {
    fn clone(&self) -> Self {
        Self::new(self.context.clone())
    }
}

impl<E: LinkEntity> LinkRepository<E> {
    pub fn new(context: Arc<DataVaultContext>) -> Self {
        Self {
            context,
            _entity: PhantomData,
        }
    }

    /// Links whose link record matches every set field of `link`
    pub async fn get_list_by_link<R: DvRecord + Sync>(&self, link: &R, include_details: bool) -> Result<Vec<E>> {
        let query = filter_link_record(link, include_details)?;
        self.context.read_links::<E, _>(&query).await
    }

    /// Links whose satellite matches every set field of `sat`
    pub async fn get_list_by_sat<S: DvRecord + Sync>(&self, sat: &S, include_details: bool) -> Result<Vec<E>> {
        let query = filter_sat(sat, include_details)?;
        self.context.read_links::<E, _>(&query).await
    }

    pub async fn get_list_filtered<R, S>(&self, link: &R, sat: &S, include_details: bool) -> Result<Vec<E>>
    where
        R: DvRecord + Sync,
        S: DvRecord + Sync,
    {
        let query = filter_link(link, sat, include_details)?;
        self.context.read_links::<E, _>(&query).await
    }
}

#[async_trait]
impl<E: LinkEntity> DataVaultRepository<E> for LinkRepository<E> {
    fn context(&self) -> &DataVaultContext {
        &self.context
    }

    async fn find(&self, id: &str, include_details: bool) -> Result<Option<E>> {
        let query = SatQuery {
            filter_pk: Some(filter_pk_id::<E>(id)),
            select: projection(include_details),
            ..SatQuery::default()
        };
        Ok(self.context.read_links::<E, _>(&query).await?.into_iter().next())
    }

    /// Foreign keys plus satellites in one `LinkRecord` call
    async fn create(&self, entity: &E) -> Result<String> {
        self.context
            .link_record::<E>(&entity.record_data()?, &entity.satellite_data()?)
            .await
    }

    async fn update(&self, id: &str, entity: &E) -> Result<String> {
        self.context
            .update_link::<E>(id, &entity.satellite_data()?)
            .await?;
        Ok(id.to_string())
    }

    /// Deletes by link PK without a prior existence check
    async fn delete(&self, id: &str) -> Result<()> {
        self.context.unlink_record::<E>(id).await
    }
}

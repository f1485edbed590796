use super::{DataVaultContext, DataVaultRepository, projection};
use crate::entity::{DvRecord, HubEntity};
use crate::error::{DataVaultError, Result};
use crate::query::SatQuery;
use crate::query::vault_query::{contain_bks, contain_pks, equals_bk, equals_pk, filter_sat};
use async_trait::async_trait;
use std::marker::PhantomData;
use std::sync::Arc;

/// Repository for a hub entity type, identified by PK or business key
pub struct HubRepository<E: HubEntity> {
    context: Arc<DataVaultContext>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: HubEntity> Clone for HubRepository<E> {
    fn clone(&self) -> Self {
        Self::new(self.context.clone())
    }
}

impl<E: HubEntity> HubRepository<E> {
    pub fn new(context: Arc<DataVaultContext>) -> Self {
        Self {
            context,
            _entity: PhantomData,
        }
    }

    pub async fn find_by_bk(&self, bk: &str, include_details: bool) -> Result<Option<E>> {
        self.context
            .read_record::<E>(&equals_bk::<E>(bk), projection(include_details))
            .await
    }

    /// Entity with business key `bk`; a match without a PK counts as missing
    pub async fn get_by_bk(&self, bk: &str, include_details: bool) -> Result<E> {
        match self.find_by_bk(bk, include_details).await? {
            Some(entity) if entity.exists() => Ok(entity),
            _ => Err(DataVaultError::not_found(&E::descriptor().type_name, bk)),
        }
    }

    /// Entity matching every set field of a hub record
    pub async fn find_by_hub<H: DvRecord + Sync>(&self, hub: &H, include_details: bool) -> Result<Option<E>> {
        let hub_data = serde_json::to_value(hub)?;
        self.context
            .read_record::<E>(&hub_data, projection(include_details))
            .await
    }

    pub async fn get_by_hub<H: DvRecord + Sync>(&self, hub: &H, include_details: bool) -> Result<E> {
        match self.find_by_hub(hub, include_details).await? {
            Some(entity) => Ok(entity),
            None => Err(DataVaultError::not_found(
                &E::descriptor().type_name,
                serde_json::to_string(hub)?,
            )),
        }
    }

    /// Entities whose satellite matches every set field of `sat`
    pub async fn get_list<S: DvRecord + Sync>(&self, sat: &S, include_details: bool) -> Result<Vec<E>> {
        let query = filter_sat(sat, include_details)?;
        self.context.read_records::<E, _>(&query).await
    }

    pub async fn get_list_by_ids(&self, ids: &[String], include_details: bool) -> Result<Vec<E>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let query = SatQuery::new()
            .filter(vec![contain_pks::<E>(ids)])
            .include_details(include_details);
        self.context.read_records::<E, _>(&query).await
    }

    pub async fn get_list_by_bks(&self, bks: &[String], include_details: bool) -> Result<Vec<E>> {
        if bks.is_empty() {
            return Ok(Vec::new());
        }

        let query = SatQuery::new()
            .filter(vec![contain_bks::<E>(bks)])
            .include_details(include_details);
        self.context.read_records::<E, _>(&query).await
    }

    /// All-or-nothing: every non-blank business key must exist, otherwise the
    /// error names all the missing ones.
    pub async fn check_exist_bks_and_get_list(&self, bks: &[String], include_details: bool) -> Result<Vec<E>> {
        let bks = non_blank(bks);
        let entities = self.get_list_by_bks(&bks, include_details).await?;

        let found: Vec<&str> = entities.iter().filter_map(|e| e.business_key()).collect();
        ensure_all_found::<E>(&bks, &found)?;

        Ok(entities)
    }

    pub async fn check_exist_bks_and_get_ids(&self, bks: &[String]) -> Result<Vec<String>> {
        let entities = self.check_exist_bks_and_get_list(bks, false).await?;
        Ok(entities
            .iter()
            .filter_map(|e| e.id().map(str::to_string))
            .collect())
    }

    /// All-or-nothing by primary key
    pub async fn check_exist_pks_and_get_list(&self, ids: &[String], include_details: bool) -> Result<Vec<E>> {
        let ids = non_blank(ids);
        let entities = self.get_list_by_ids(&ids, include_details).await?;

        let found: Vec<&str> = entities.iter().filter_map(|e| e.id()).collect();
        ensure_all_found::<E>(&ids, &found)?;

        Ok(entities)
    }

    pub async fn generate_unique_sequence(&self) -> Result<String> {
        self.context.generate_entity_unique_sequence::<E>().await
    }
}

fn non_blank(keys: &[String]) -> Vec<String> {
    keys.iter()
        .filter(|key| !key.trim().is_empty())
        .cloned()
        .collect()
}

fn ensure_all_found<E: HubEntity>(requested: &[String], found: &[&str]) -> Result<()> {
    let mut missing: Vec<&str> = Vec::new();
    for key in requested {
        if !found.contains(&key.as_str()) && !missing.contains(&key.as_str()) {
            missing.push(key);
        }
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(DataVaultError::not_found(&E::descriptor().type_name, missing.join(", ")))
    }
}

#[async_trait]
impl<E: HubEntity> DataVaultRepository<E> for HubRepository<E> {
    fn context(&self) -> &DataVaultContext {
        &self.context
    }

    async fn find(&self, id: &str, include_details: bool) -> Result<Option<E>> {
        self.context
            .read_record::<E>(&equals_pk::<E>(id), projection(include_details))
            .await
    }

    /// Hub record plus satellites in one `CreateRecord` call
    async fn create(&self, entity: &E) -> Result<String> {
        self.context
            .create_record::<E>(&entity.record_data()?, &entity.satellite_data()?)
            .await
    }

    /// Satellites only; the hub record is never updated
    async fn update(&self, id: &str, entity: &E) -> Result<String> {
        self.context
            .update_record::<E>(id, &entity.satellite_data()?)
            .await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.get(id, false).await?;
        self.context.delete_record::<E>(id).await
    }
}

//! Generic repositories over hubs and links
//!
//! [`DataVaultRepository`] holds the operations common to both kinds,
//! including the relationship algorithms that connect an entity to other hubs
//! through a link type. [`HubRepository`] and [`LinkRepository`] supply the
//! kind-specific CRUD.

pub mod context;
pub mod hub;
pub mod link;
pub mod unit_of_work;

pub use context::{DataVaultContext, LookupCache};
pub use hub::HubRepository;
pub use link::LinkRepository;
pub use unit_of_work::UnitOfWork;

use crate::entity::{DvEntity, HubEntity, LinkEntity};
use crate::error::{DataVaultError, Result};
use crate::query::SatQuery;
use crate::query::vault_query::{contain_pks, filter_links_with_pks, link_object, select_list};
use async_trait::async_trait;
use log::debug;
use serde_json::{Map, Value};

#[async_trait]
pub trait DataVaultRepository<E: DvEntity>: Send + Sync {
    fn context(&self) -> &DataVaultContext;

    async fn find(&self, id: &str, include_details: bool) -> Result<Option<E>>;

    async fn create(&self, entity: &E) -> Result<String>;

    /// Write the satellites of `entity` under `id` and return `id`
    async fn update(&self, id: &str, entity: &E) -> Result<String>;

    async fn delete(&self, id: &str) -> Result<()>;

    /// Like [`Self::find`], failing with `EntityNotFound` when there is no match
    async fn get(&self, id: &str, include_details: bool) -> Result<E> {
        self.find(id, include_details)
            .await?
            .ok_or_else(|| DataVaultError::not_found(&E::descriptor().type_name, id))
    }

    async fn delete_entity(&self, entity: &E) -> Result<()> {
        self.delete(entity.id().unwrap_or_default()).await
    }

    /// Read this entity type's view
    async fn get_list_from_view(&self, sat_query: &SatQuery) -> Result<Vec<E>> {
        self.context().read_view::<E, _>(sat_query).await
    }

    /// Links of type `L` attached to the entity `id`
    async fn get_links<L: LinkEntity>(&self, id: &str, include_details: bool) -> Result<Vec<L>> {
        self.get_links_for::<L>(&[id.to_string()], include_details).await
    }

    /// Links of type `L` attached to any of `ids`
    async fn get_links_for<L: LinkEntity>(&self, ids: &[String], include_details: bool) -> Result<Vec<L>> {
        let query = filter_links_with_pks::<L>(&[(E::descriptor(), ids)], include_details);
        self.context().read_links::<L, _>(&query).await
    }

    async fn has_link<L: LinkEntity>(&self, id: &str) -> Result<bool> {
        Ok(!self.get_links::<L>(id, true).await?.is_empty())
    }

    /// Links of type `L` between the entity `id` and any of `linked_ids` (of type `O`)
    async fn get_links_between<L: LinkEntity, O: DvEntity>(&self, id: &str, linked_ids: &[String]) -> Result<Vec<L>> {
        if linked_ids.is_empty() {
            return Ok(Vec::new());
        }

        let own = vec![id.to_string()];
        let query = filter_links_with_pks::<L>(
            &[(E::descriptor(), own.as_slice()), (O::descriptor(), linked_ids)],
            true,
        );
        self.context().read_links::<L, _>(&query).await
    }

    /// The link of type `L` between `id` and `linked_id`, if any
    async fn get_link<L: LinkEntity, O: DvEntity>(&self, id: &str, linked_id: &str) -> Result<Option<L>> {
        let own = vec![id.to_string()];
        let other = vec![linked_id.to_string()];
        let query = filter_links_with_pks::<L>(
            &[(E::descriptor(), own.as_slice()), (O::descriptor(), other.as_slice())],
            true,
        );
        Ok(self.context().read_links::<L, _>(&query).await?.into_iter().next())
    }

    async fn exist_link<L: LinkEntity, O: DvEntity>(&self, id: &str, linked_id: &str) -> Result<bool> {
        Ok(self
            .get_link::<L, O>(id, linked_id)
            .await?
            .is_some_and(|link| link.exists()))
    }

    /// Distinct ids of the `O` entities linked to any of `ids`, in first-seen order
    async fn get_linked_entity_ids<L: LinkEntity, O: DvEntity>(&self, ids: &[String]) -> Result<Vec<String>> {
        let links = self.get_links_for::<L>(ids, false).await?;
        let pk_column = &O::descriptor().pk_column;

        let mut linked = Vec::with_capacity(links.len());
        for link in &links {
            if let Some(fk) = link.foreign_key(pk_column) {
                if !fk.is_empty() && !linked.iter().any(|seen: &String| seen == fk) {
                    linked.push(fk.to_string());
                }
            }
        }
        Ok(linked)
    }

    /// Hubs of type `O` linked to `id`, fetched in one batch read
    async fn get_linked_entities<L: LinkEntity, O: HubEntity>(&self, id: &str, include_details: bool) -> Result<Vec<O>> {
        let linked_ids = self.get_linked_entity_ids::<L, O>(&[id.to_string()]).await?;
        if linked_ids.is_empty() {
            return Ok(Vec::new());
        }

        let query = SatQuery::new()
            .filter(vec![contain_pks::<O>(&linked_ids)])
            .include_details(include_details);
        self.context().read_records::<O, _>(&query).await
    }

    /// Connect `entity_id` to `other_id` through a link of type `L`. An existing
    /// link is reused; a blank `other_id` yields an empty id without any call.
    async fn link_to<L: LinkEntity, O: DvEntity>(&self, entity_id: &str, other_id: &str) -> Result<String> {
        if other_id.trim().is_empty() {
            return Ok(String::new());
        }

        if let Some(existing) = self.get_link::<L, O>(entity_id, other_id).await? {
            if existing.exists() {
                debug!(
                    "{} already linked to {} through {}",
                    entity_id,
                    other_id,
                    L::descriptor().type_name
                );
                return Ok(existing.id().unwrap_or_default().to_string());
            }
        }

        let foreign_keys = link_object::<E, O>(entity_id, other_id);
        self.context()
            .link_record::<L>(&foreign_keys, &Value::Object(Map::new()))
            .await
    }

    /// [`Self::link_to`] for each id, in order. Stops at the first failure;
    /// links created before it stay in the transaction.
    async fn link_to_many<L: LinkEntity, O: DvEntity>(&self, entity_id: &str, other_ids: &[String]) -> Result<Vec<String>> {
        let mut link_ids = Vec::with_capacity(other_ids.len());
        for other_id in other_ids {
            link_ids.push(self.link_to::<L, O>(entity_id, other_id).await?);
        }
        Ok(link_ids)
    }

    /// Remove the links between `entity_id` and `other_ids`; pairs that are not
    /// linked are skipped.
    async fn unlink_to<L: LinkEntity, O: DvEntity>(&self, entity_id: &str, other_ids: &[String]) -> Result<()> {
        if other_ids.is_empty() {
            return Ok(());
        }

        let links = self.get_links_between::<L, O>(entity_id, other_ids).await?;
        for link in &links {
            self.context()
                .unlink_record::<L>(link.id().unwrap_or_default())
                .await?;
        }
        Ok(())
    }

    /// Remove every link of type `L` attached to `entity_id`
    async fn unlink_all<L: LinkEntity>(&self, entity_id: &str) -> Result<()> {
        let links = self.get_links::<L>(entity_id, true).await?;
        for link in &links {
            self.context()
                .unlink_record::<L>(link.id().unwrap_or_default())
                .await?;
        }
        Ok(())
    }
}

/// `SELECT` list for an include-details flag
pub(crate) fn projection(include_details: bool) -> Option<Vec<String>> {
    Some(select_list(include_details))
}

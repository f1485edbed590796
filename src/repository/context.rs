//! One call per stored procedure: the layer every repository goes through

use crate::audit::AuditContext;
use crate::cache::{CacheEntryOptions, DistributedCache};
use crate::entity::{DvEntity, HubEntity, LinkEntity, Lookup, LookupItem, is_blank_json};
use crate::error::{DataVaultError, Result};
use crate::naming::{StoredProcedure, normalize_table_name};
use crate::protocol::{DataCommand, DataSession, DataVaultCommand, DbConnection, params};
use crate::query::vault_query::select_list;
use log::debug;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;

/// Name under which lookup tables are cached
pub const LOOKUP_CACHE_NAME: &str = "LookupItems";
pub const DEFAULT_LOOKUP_EXPIRATION: Duration = Duration::from_secs(60 * 60);

pub type LookupCache = DistributedCache<Vec<LookupItem>>;

/// Data vault operations bound to one [`DataSession`]. Write calls join the
/// session transaction; nothing is committed until [`Self::save_changes`].
pub struct DataVaultContext {
    session: DataSession,
    audit: Arc<dyn AuditContext>,
    lookup_cache: Arc<LookupCache>,
    lookup_expiration: Duration,
}

impl DataVaultContext {
    pub fn new(
        connection: Arc<dyn DbConnection>,
        audit: Arc<dyn AuditContext>,
        lookup_cache: Arc<LookupCache>,
    ) -> Self {
        Self {
            session: DataSession::new(connection),
            audit,
            lookup_cache,
            lookup_expiration: DEFAULT_LOOKUP_EXPIRATION,
        }
    }

    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.session = self.session.with_command_timeout(timeout);
        self
    }

    pub fn with_lookup_expiration(mut self, expiration: Duration) -> Self {
        self.lookup_expiration = expiration;
        self
    }

    pub fn session(&self) -> &DataSession {
        &self.session
    }

    async fn update_command(&self, procedure: String) -> Result<DataVaultCommand<'_>> {
        let audit = self.audit.audit_info();
        DataVaultCommand::update(&self.session, &audit, procedure).await
    }

    /// `ReadRecord<E>`: one hub entity matching `hub_data`. The default
    /// projection is `["*"]`.
    pub async fn read_record<E: HubEntity>(&self, hub_data: &Value, select: Option<Vec<String>>) -> Result<Option<E>> {
        let procedure = E::descriptor().procedure(StoredProcedure::ReadRecord);

        DataVaultCommand::read_only(&self.session, procedure)
            .with_hub_data(hub_data)?
            .with_sat_data(&select.unwrap_or_else(|| select_list(true)))?
            .execute_typed::<Option<E>>()
            .await
    }

    /// `CreateRecord<E>`: returns the new hub PK
    pub async fn create_record<E: HubEntity>(&self, hub_data: &Value, sat_data: &Value) -> Result<String> {
        let procedure = E::descriptor().procedure(StoredProcedure::CreateRecord);

        self.update_command(procedure)
            .await?
            .with_hub_data(&or_empty_object(hub_data))?
            .with_sat_data(sat_data)?
            .execute_with_error_handling()
            .await
    }

    /// `LinkRecord<E>`: returns the new link PK
    pub async fn link_record<E: LinkEntity>(&self, foreign_keys: &Value, sat_data: &Value) -> Result<String> {
        let procedure = E::descriptor().procedure(StoredProcedure::LinkRecord);

        self.update_command(procedure)
            .await?
            .with_foreign_keys(&or_empty_object(foreign_keys))?
            .with_sat_data(sat_data)?
            .execute_with_error_handling()
            .await
    }

    /// `UpdateRecord<E>`. A satellite payload with nothing set is a no-op that
    /// returns `hub_pk` without touching the database.
    pub async fn update_record<E: HubEntity>(&self, hub_pk: &str, sat_data: &Value) -> Result<String> {
        if is_blank_json(sat_data) {
            debug!("Skipping update of {} {}: blank satellite payload", E::descriptor().type_name, hub_pk);
            return Ok(hub_pk.to_string());
        }

        let procedure = E::descriptor().procedure(StoredProcedure::UpdateRecord);

        self.update_command(procedure)
            .await?
            .with_hub_pk(hub_pk)
            .with_sat_data(sat_data)?
            .execute_with_error_handling()
            .await
    }

    /// `UpdateLink<E>`; a blank satellite payload is a no-op
    pub async fn update_link<E: LinkEntity>(&self, link_pk: &str, sat_data: &Value) -> Result<()> {
        if is_blank_json(sat_data) {
            return Ok(());
        }

        let procedure = E::descriptor().procedure(StoredProcedure::UpdateLink);

        self.update_command(procedure)
            .await?
            .with_link_pk(link_pk)
            .with_sat_data(sat_data)?
            .execute_with_error_handling()
            .await?;
        Ok(())
    }

    pub async fn delete_record<E: HubEntity>(&self, hub_pk: &str) -> Result<()> {
        let procedure = E::descriptor().procedure(StoredProcedure::DeleteRecord);

        self.update_command(procedure)
            .await?
            .with_hub_pk(hub_pk)
            .execute_with_error_handling()
            .await?;
        Ok(())
    }

    pub async fn unlink_record<E: LinkEntity>(&self, link_pk: &str) -> Result<()> {
        let procedure = E::descriptor().procedure(StoredProcedure::UnLinkRecord);

        self.update_command(procedure)
            .await?
            .with_link_pk(link_pk)
            .execute_with_error_handling()
            .await?;
        Ok(())
    }

    pub async fn read_records<E: HubEntity, Q: Serialize + Sync + ?Sized>(&self, sat_query: &Q) -> Result<Vec<E>> {
        let procedure = E::descriptor().procedure(StoredProcedure::ReadRecords);
        self.read_list(procedure, sat_query).await
    }

    pub async fn read_links<E: LinkEntity, Q: Serialize + Sync + ?Sized>(&self, sat_query: &Q) -> Result<Vec<E>> {
        let procedure = E::descriptor().procedure(StoredProcedure::ReadLinks);
        self.read_list(procedure, sat_query).await
    }

    /// `ReadView<V>` where the view is named after the entity's short name
    pub async fn read_view<E: DvEntity, Q: Serialize + Sync + ?Sized>(&self, sat_query: &Q) -> Result<Vec<E>> {
        self.read_view_named(&E::descriptor().short_name, sat_query).await
    }

    pub async fn read_view_named<T, Q>(&self, view_name: &str, sat_query: &Q) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Send,
        Q: Serialize + Sync + ?Sized,
    {
        self.read_list(StoredProcedure::ReadView.for_entity(view_name), sat_query)
            .await
    }

    async fn read_list<T, Q>(&self, procedure: String, sat_query: &Q) -> Result<Vec<T>>
    where
        T: DeserializeOwned + Send,
        Q: Serialize + Sync + ?Sized,
    {
        DataVaultCommand::read_only(&self.session, procedure)
            .with_sat_query(sat_query)?
            .execute_typed::<Vec<T>>()
            .await
    }

    /// Every lookup table's items, uncached
    pub async fn read_lookups(&self) -> Result<Vec<LookupItem>> {
        DataVaultCommand::read_only(&self.session, StoredProcedure::ReadLookups.as_str())
            .execute_typed()
            .await
    }

    pub async fn read_lookup<L: Lookup>(&self) -> Result<Vec<LookupItem>> {
        self.read_lookup_table(&L::table_name()).await
    }

    /// Items of one lookup table, served from the lookup cache
    pub async fn read_lookup_table(&self, table: &str) -> Result<Vec<LookupItem>> {
        let key = format!("Lookup:{}", table);
        let options = CacheEntryOptions::absolute(self.lookup_expiration);

        self.lookup_cache
            .get_or_add(&key, || self.read_lookup_from_db(table), Some(options))
            .await
    }

    async fn read_lookup_from_db(&self, table: &str) -> Result<Vec<LookupItem>> {
        DataVaultCommand::read_only(&self.session, StoredProcedure::ReadLookup.as_str())
            .with_lookup_table(&normalize_table_name(table))
            .with_lookup_code("")
            .execute_typed()
            .await
    }

    pub async fn validate_lookup_value<L: Lookup>(&self, value: &str) -> Result<bool> {
        self.validate_lookup_value_in(&L::table_name(), value).await
    }

    pub async fn validate_lookup_value_in(&self, table: &str, value: &str) -> Result<bool> {
        if value.trim().is_empty() {
            return Ok(false);
        }
        let items = self.read_lookup_table(table).await?;
        Ok(items.iter().any(|item| item.code == value))
    }

    /// Fail with `InvalidLookup`, listing the valid codes, unless `value` is one of them
    pub async fn check_lookup_value<L: Lookup>(&self, value: &str) -> Result<()> {
        let table = L::table_name();
        let items = self.read_lookup_table(&table).await?;

        let valid = !value.trim().is_empty() && items.iter().any(|item| item.code == value);
        if valid {
            return Ok(());
        }

        Err(DataVaultError::InvalidLookup {
            lookup: L::TYPE_NAME.to_string(),
            value: value.to_string(),
            expected: items.into_iter().map(|item| item.code).collect(),
        })
    }

    /// Next value of the entity's `SEQ-<SHORTNAME>` sequence
    pub async fn generate_entity_unique_sequence<E: HubEntity>(&self) -> Result<String> {
        let mut sequence = String::new();

        DataCommand::stored_procedure(StoredProcedure::GetUniqueSequence.as_str())
            .parameter(params::SEQ_NAME, E::descriptor().sequence_name.as_str())
            .return_value(|out: &mut String, value: String| *out = value)
            .execute(&self.session, &mut sequence)
            .await?;

        Ok(sequence)
    }

    /// Commit the session transaction, if one is open
    pub async fn save_changes(&self) -> Result<()> {
        self.session.save_changes().await
    }

    /// Discard the session transaction, if one is open
    pub async fn discard_changes(&self) -> Result<()> {
        self.session.rollback().await
    }
}

fn or_empty_object(value: &Value) -> Value {
    if value.is_null() {
        Value::Object(Map::new())
    } else {
        value.clone()
    }
}

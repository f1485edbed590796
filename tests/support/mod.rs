//! Scripted in-memory connection and fixture entities for repository tests

#![allow(dead_code)]

use async_trait::async_trait;
use datavault::audit::{AuditInfo, StaticAuditContext};
use datavault::cache::{CacheOptions, DistributedCache, MemoryCacheStore};
use datavault::entity::{DvEntity, DvRecord, HubEntity, LinkEntity, Lookup};
use datavault::naming::EntityDescriptor;
use datavault::protocol::{DbCommand, DbConnection, ExecutionFault, params};
use datavault::repository::context::LOOKUP_CACHE_NAME;
use datavault::repository::{DataVaultContext, LookupCache};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// `(STATUS_CODE, RESULT)` returned for one execution
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: String,
    pub result: String,
}

impl Reply {
    pub fn ok(result: &str) -> Self {
        Self {
            status: "0".to_string(),
            result: result.to_string(),
        }
    }

    pub fn status(status: &str, result: &str) -> Self {
        Self {
            status: status.to_string(),
            result: result.to_string(),
        }
    }
}

/// Records every executed command and answers by procedure name. Replies
/// queued for a procedure are consumed in order; the last one is repeated.
/// Procedures with no script succeed with an empty result.
#[derive(Default)]
pub struct ScriptedConnection {
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    executed: Mutex<Vec<DbCommand>>,
    events: Mutex<Vec<&'static str>>,
    fail_commit: bool,
}

impl ScriptedConnection {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing_commit() -> Arc<Self> {
        Arc::new(Self {
            fail_commit: true,
            ..Self::default()
        })
    }

    pub fn on(&self, procedure: &str, reply: Reply) -> &Self {
        self.replies
            .lock()
            .unwrap()
            .entry(procedure.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    pub fn executed(&self) -> Vec<DbCommand> {
        self.executed.lock().unwrap().clone()
    }

    pub fn procedures(&self) -> Vec<String> {
        self.executed().into_iter().map(|c| c.text).collect()
    }

    pub fn count(&self, procedure: &str) -> usize {
        self.procedures().iter().filter(|p| *p == procedure).count()
    }

    pub fn last(&self, procedure: &str) -> Option<DbCommand> {
        self.executed().into_iter().rev().find(|c| c.text == procedure)
    }

    pub fn events(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().clone()
    }

    fn event(&self, name: &'static str) {
        self.events.lock().unwrap().push(name);
    }

    fn next_reply(&self, procedure: &str) -> Reply {
        let mut replies = self.replies.lock().unwrap();
        match replies.get_mut(procedure) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) if !queue.is_empty() => queue[0].clone(),
            _ => Reply::ok(""),
        }
    }
}

#[async_trait]
impl DbConnection for ScriptedConnection {
    async fn open(&self) -> Result<(), ExecutionFault> {
        self.event("open");
        Ok(())
    }

    async fn close(&self) -> Result<(), ExecutionFault> {
        self.event("close");
        Ok(())
    }

    async fn begin_transaction(&self) -> Result<(), ExecutionFault> {
        self.event("begin");
        Ok(())
    }

    async fn commit(&self) -> Result<(), ExecutionFault> {
        self.event("commit");
        if self.fail_commit {
            return Err(ExecutionFault::new("deadlock detected"));
        }
        Ok(())
    }

    async fn rollback(&self) -> Result<(), ExecutionFault> {
        self.event("rollback");
        Ok(())
    }

    async fn execute(&self, command: &mut DbCommand) -> Result<(), ExecutionFault> {
        let reply = self.next_reply(&command.text);
        command.set_output(params::STATUS_CODE, reply.status.as_str());
        command.set_output(params::RESULT, reply.result.as_str());
        command.set_output(params::RETURN_VALUE, reply.result.as_str());
        self.executed.lock().unwrap().push(command.clone());
        Ok(())
    }
}

pub fn lookup_cache() -> Arc<LookupCache> {
    Arc::new(DistributedCache::new(
        LOOKUP_CACHE_NAME,
        Arc::new(MemoryCacheStore::new()),
        &CacheOptions::default(),
    ))
}

pub fn context(connection: Arc<ScriptedConnection>) -> DataVaultContext {
    context_with_cache(connection, lookup_cache())
}

pub fn context_with_cache(connection: Arc<ScriptedConnection>, cache: Arc<LookupCache>) -> DataVaultContext {
    let audit = Arc::new(StaticAuditContext::new(AuditInfo::for_app("tests").with_user("tester")));
    DataVaultContext::new(connection, audit, cache)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HubCustomer {
    #[serde(rename = "PK_CUSTOMER_ID", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "BK_CUSTOMER_NUMBER", default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
}

impl DvRecord for HubCustomer {
    const TYPE_NAME: &'static str = "HubCustomer";
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SatCustomerDetail {
    #[serde(rename = "NAME", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "COUNTRY", default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl DvRecord for SatCustomerDetail {
    const TYPE_NAME: &'static str = "SatCustomerDetail";
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DvCustomer {
    #[serde(rename = "HUB_CUSTOMER", default, skip_serializing_if = "Option::is_none")]
    pub hub: Option<HubCustomer>,
    #[serde(rename = "SAT_CUSTOMER_DETAIL", default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<SatCustomerDetail>,
}

impl DvCustomer {
    pub fn new(number: &str, name: &str) -> Self {
        Self {
            hub: Some(HubCustomer {
                id: None,
                number: Some(number.to_string()),
            }),
            detail: Some(SatCustomerDetail {
                name: Some(name.to_string()),
                country: None,
            }),
        }
    }
}

impl DvEntity for DvCustomer {
    fn descriptor() -> &'static EntityDescriptor {
        datavault::dv_descriptor!(Hub, DvCustomer)
    }

    fn id(&self) -> Option<&str> {
        self.hub.as_ref()?.id.as_deref()
    }
}

impl HubEntity for DvCustomer {
    fn business_key(&self) -> Option<&str> {
        self.hub.as_ref()?.number.as_deref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HubOrder {
    #[serde(rename = "PK_ORDER_ID", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "BK_ORDER_NUMBER", default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DvOrder {
    #[serde(rename = "HUB_ORDER", default, skip_serializing_if = "Option::is_none")]
    pub hub: Option<HubOrder>,
}

impl DvEntity for DvOrder {
    fn descriptor() -> &'static EntityDescriptor {
        datavault::dv_descriptor!(Hub, DvOrder)
    }

    fn id(&self) -> Option<&str> {
        self.hub.as_ref()?.id.as_deref()
    }
}

impl HubEntity for DvOrder {
    fn business_key(&self) -> Option<&str> {
        self.hub.as_ref()?.number.as_deref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LnkCustomerOrder {
    #[serde(rename = "PK_CUSTOMER_ORDER_ID", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "PK_CUSTOMER_ID", default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(rename = "PK_ORDER_ID", default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
}

impl DvRecord for LnkCustomerOrder {
    const TYPE_NAME: &'static str = "LnkCustomerOrder";
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DvCustomerOrder {
    #[serde(rename = "LNK_CUSTOMER_ORDER", default, skip_serializing_if = "Option::is_none")]
    pub link: Option<LnkCustomerOrder>,
}

impl DvEntity for DvCustomerOrder {
    fn descriptor() -> &'static EntityDescriptor {
        datavault::dv_descriptor!(Link, DvCustomerOrder)
    }

    fn id(&self) -> Option<&str> {
        self.link.as_ref()?.id.as_deref()
    }
}

impl LinkEntity for DvCustomerOrder {
    fn foreign_key(&self, pk_column: &str) -> Option<&str> {
        let link = self.link.as_ref()?;
        match pk_column {
            "PK_CUSTOMER_ID" => link.customer_id.as_deref(),
            "PK_ORDER_ID" => link.order_id.as_deref(),
            _ => None,
        }
    }
}

pub struct CountryCode;

impl Lookup for CountryCode {
    const TYPE_NAME: &'static str = "CountryCode";
}

/// Dotted-key JSON row for a customer, as the procedures return it
pub fn customer_row(id: &str, number: &str) -> String {
    format!(
        r#"{{"HUB_CUSTOMER.PK_CUSTOMER_ID":"{}","HUB_CUSTOMER.BK_CUSTOMER_NUMBER":"{}","SAT_CUSTOMER_DETAIL.NAME":"Customer {}"}}"#,
        id, number, number
    )
}

pub fn link_row(id: &str, customer_id: &str, order_id: &str) -> String {
    format!(
        r#"{{"LNK_CUSTOMER_ORDER.PK_CUSTOMER_ORDER_ID":"{}","LNK_CUSTOMER_ORDER.PK_CUSTOMER_ID":"{}","LNK_CUSTOMER_ORDER.PK_ORDER_ID":"{}"}}"#,
        id, customer_id, order_id
    )
}

pub fn rows(rows: &[String]) -> String {
    format!("[{}]", rows.join(","))
}

/// Parsed JSON of a text parameter
pub fn json_param(command: &DbCommand, name: &str) -> serde_json::Value {
    let raw = command.input_text(name).unwrap_or("null");
    serde_json::from_str(raw).unwrap()
}

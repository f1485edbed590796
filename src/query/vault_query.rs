//! Structured JSON queries sent in `SAT_QUERY` / `HUB_DATA`

use super::condition::{QueryField, QueryValue};
use super::expression::escape;
use super::operator::SortDirection;
use super::predicate::PredicateBuilder;
use crate::entity::{DvEntity, DvRecord, HubEntity};
use crate::error::Result;
use crate::naming::EntityDescriptor;
use serde::Serialize;
use serde_json::{Map, Value};

pub const DEFAULT_ROW_COUNT: i64 = 100;
pub const DEFAULT_ROW_NUMBER: i64 = 0;

/// Query object understood by the `ReadRecords*`, `ReadLinks*` and `ReadView*` procedures
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SatQuery {
    #[serde(rename = "filterPK", skip_serializing_if = "Option::is_none")]
    pub filter_pk: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub select: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_number: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_count: Option<i64>,
}

impl SatQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: Vec<String>) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn filter_pk(mut self, filter_pk: Vec<String>) -> Self {
        self.filter_pk = Some(filter_pk);
        self
    }

    pub fn include_details(mut self, include_details: bool) -> Self {
        self.select = Some(select_list(include_details));
        self
    }
}

/// `["*"]` for full details, `[]` for the minimal projection
pub fn select_list(include_details: bool) -> Vec<String> {
    if include_details {
        vec!["*".to_string()]
    } else {
        Vec::new()
    }
}

/// `TABLE.PK=UNHEX('a') OR TABLE.PK=UNHEX('b')`
pub fn contain_pks<E: DvEntity>(ids: &[String]) -> String {
    let descriptor = E::descriptor();
    ids.iter()
        .filter(|id| !id.is_empty())
        .map(|id| format!("{}=UNHEX('{}')", descriptor.qualified_pk(), id))
        .collect::<Vec<_>>()
        .join(" OR ")
}

/// `TABLE.BK='a' OR TABLE.BK='b'`
pub fn contain_bks<E: HubEntity>(bks: &[String]) -> String {
    let descriptor = E::descriptor();
    let column = descriptor.bk_column.as_deref().unwrap_or_default();
    bks.iter()
        .filter(|bk| !bk.is_empty())
        .map(|bk| format!("{}='{}'", descriptor.qualified(column), escape(bk)))
        .collect::<Vec<_>>()
        .join(" OR ")
}

/// Hub lookup object `{PK: id}`
pub fn equals_pk<E: DvEntity>(id: &str) -> Value {
    single_field(&E::descriptor().pk_column, id)
}

/// Hub lookup object `{BK: bk}`
pub fn equals_bk<E: HubEntity>(bk: &str) -> Value {
    single_field(E::descriptor().bk_column.as_deref().unwrap_or_default(), bk)
}

/// Foreign key pair of a link between `E` and `O`: `{PK_E: entity_id, PK_O: other_id}`
pub fn link_object<E: DvEntity, O: DvEntity>(entity_id: &str, other_id: &str) -> Value {
    let mut map = Map::new();
    map.insert(E::descriptor().pk_column.clone(), Value::String(entity_id.to_string()));
    map.insert(O::descriptor().pk_column.clone(), Value::String(other_id.to_string()));
    Value::Object(map)
}

/// `["LNK_T.PK_T_ID='id'"]`, the PK filter of a single link read
pub fn filter_pk_id<E: DvEntity>(id: &str) -> Vec<String> {
    vec![format!("{}='{}'", E::descriptor().qualified_pk(), escape(id))]
}

/// Records whose satellite matches every set field of `sat`
pub fn filter_sat<S: DvRecord>(sat: &S, include_details: bool) -> Result<SatQuery> {
    Ok(SatQuery::new()
        .filter(object_to_filter_conditions(sat)?)
        .include_details(include_details))
}

/// Links whose link record matches every set field of `link`
pub fn filter_link_record<L: DvRecord>(link: &L, include_details: bool) -> Result<SatQuery> {
    Ok(SatQuery::new()
        .filter_pk(object_to_filter_conditions(link)?)
        .include_details(include_details))
}

/// Links matching both a link record and a satellite record
pub fn filter_link<L: DvRecord, S: DvRecord>(link: &L, sat: &S, include_details: bool) -> Result<SatQuery> {
    Ok(SatQuery::new()
        .filter_pk(object_to_filter_conditions(link)?)
        .filter(object_to_filter_conditions(sat)?)
        .include_details(include_details))
}

/// Links of type `L` connected to the given hub ids, one filter entry per hub
/// type: `(LNK_T.PK_A_ID=UNHEX('1') OR LNK_T.PK_A_ID=UNHEX('2'))`. Hub types with
/// no ids are skipped.
pub fn filter_links_with_pks<L: DvEntity>(
    entries: &[(&EntityDescriptor, &[String])],
    include_details: bool,
) -> SatQuery {
    let link = L::descriptor();
    let filter = entries
        .iter()
        .filter(|(_, ids)| !ids.is_empty())
        .map(|(hub, ids)| {
            let column = link.qualified(&hub.pk_column);
            let alternatives: Vec<String> = ids
                .iter()
                .map(|id| format!("{}=UNHEX('{}')", column, id))
                .collect();
            format!("({})", alternatives.join(" OR "))
        })
        .collect();

    SatQuery::new()
        .filter(filter)
        .include_details(include_details)
}

/// `TABLE.FIELD='value'` for every non-null field of a record
fn object_to_filter_conditions<R: DvRecord>(record: &R) -> Result<Vec<String>> {
    let table = R::table_name();
    let value = serde_json::to_value(record)?;

    let conditions = match value {
        Value::Object(map) => map
            .into_iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(field, v)| {
                let rendered = match v {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                format!("{}.{}='{}'", table, field, escape(&rendered))
            })
            .collect(),
        _ => Vec::new(),
    };

    Ok(conditions)
}

fn single_field(column: &str, value: &str) -> Value {
    let mut map = Map::new();
    map.insert(column.to_string(), Value::String(value.to_string()));
    Value::Object(map)
}

/// Paged, sorted view query built from literal predicates
#[derive(Debug, Clone)]
pub struct DataVaultQueryBuilder {
    filters: Vec<PredicateBuilder>,
    sorts: Vec<String>,
    select: Option<Vec<String>>,
    row_count: i64,
    row_number: i64,
}

impl Default for DataVaultQueryBuilder {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            sorts: Vec::new(),
            select: None,
            row_count: DEFAULT_ROW_COUNT,
            row_number: DEFAULT_ROW_NUMBER,
        }
    }
}

impl DataVaultQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a predicate; each predicate becomes one entry of `filter`
    pub fn filter(mut self, predicate: PredicateBuilder) -> Self {
        self.filters.push(predicate);
        self
    }

    /// Shorthand for a single-condition predicate
    pub fn filter_on(self, field: QueryField, operator: super::QueryOperator, value: impl Into<QueryValue>) -> Self {
        self.filter(PredicateBuilder::new(field, operator, value))
    }

    pub fn row_count(mut self, row_count: i64) -> Self {
        self.row_count = row_count;
        self
    }

    pub fn row_number(mut self, row_number: i64) -> Self {
        self.row_number = row_number;
        self
    }

    pub fn include_details(mut self, include_details: bool) -> Self {
        self.select = Some(select_list(include_details));
        self
    }

    pub fn sort_ascending(self, field: QueryField) -> Self {
        self.sort(field, SortDirection::Asc)
    }

    pub fn sort_descending(self, field: QueryField) -> Self {
        self.sort(field, SortDirection::Desc)
    }

    /// `` `TABLE.FIELD` ASC|DESC ``, in call order
    pub fn sort(mut self, field: QueryField, direction: SortDirection) -> Self {
        let column = match field.table_name {
            Some(table) => format!("{}.{}", table, field.field_name),
            None => field.field_name,
        };
        self.sorts.push(format!("`{}` {}", column, direction));
        self
    }

    pub fn build_view_query(&self) -> SatQuery {
        SatQuery {
            filter_pk: None,
            filter: Some(
                self.filters
                    .iter()
                    .map(PredicateBuilder::build)
                    .filter(|f| !f.is_empty())
                    .collect(),
            ),
            select: self.select.clone(),
            order: Some(self.sorts.clone()),
            row_number: Some(self.row_number),
            row_count: Some(self.row_count),
        }
    }
}

//! Query construction
//!
//! Two forms: structured JSON query objects for the data vault procedures
//! ([`SatQuery`], [`DataVaultQueryBuilder`]) and literal SQL predicates
//! ([`PredicateBuilder`], [`WhereBuilder`]) embedded in them or used by the
//! plain-table statement builders.

pub mod condition;
pub mod expression;
pub mod operator;
pub mod predicate;
pub mod statement;
pub mod vault_query;
pub mod where_builder;

pub use condition::{QueryCondition, QueryField, QueryValue};
pub use operator::{LogicOperator, QueryOperator, SortDirection};
pub use predicate::PredicateBuilder;
pub use statement::{InsertCommandBuilder, SelectCommandBuilder, UpdateCommandBuilder};
pub use vault_query::{DataVaultQueryBuilder, SatQuery};
pub use where_builder::WhereBuilder;

//! Literal SQL predicates over qualified fields

use super::condition::{QueryCondition, QueryField, QueryValue};
use super::expression::build_condition;
use super::operator::{LogicOperator, QueryOperator};

/// Ordered list of conditions, each joined to the previous one by AND / OR.
/// Rendered flat, left to right, without grouping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredicateBuilder {
    conditions: Vec<(QueryCondition, LogicOperator)>,
}

impl PredicateBuilder {
    /// Start a predicate with its first condition
    pub fn new(field: QueryField, operator: QueryOperator, value: impl Into<QueryValue>) -> Self {
        Self {
            conditions: vec![(QueryCondition::new(field, operator, value), LogicOperator::None)],
        }
    }

    /// Shorthand for a field of a record type (`SatCustomerDetail` -> `SAT_CUSTOMER_DETAIL`)
    pub fn on(type_name: &str, field: &str, operator: QueryOperator, value: impl Into<QueryValue>) -> Self {
        Self::new(QueryField::of_type(type_name, field), operator, value)
    }

    pub fn and(mut self, field: QueryField, operator: QueryOperator, value: impl Into<QueryValue>) -> Self {
        self.push(QueryCondition::new(field, operator, value), LogicOperator::And);
        self
    }

    pub fn or(mut self, field: QueryField, operator: QueryOperator, value: impl Into<QueryValue>) -> Self {
        self.push(QueryCondition::new(field, operator, value), LogicOperator::Or);
        self
    }

    pub fn conditions(&self) -> &[(QueryCondition, LogicOperator)] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn build(&self) -> String {
        render_conditions(&self.conditions)
    }

    fn push(&mut self, condition: QueryCondition, logic: LogicOperator) {
        let logic = if self.conditions.is_empty() { LogicOperator::None } else { logic };
        self.conditions.push((condition, logic));
    }
}

pub(crate) fn render_conditions(conditions: &[(QueryCondition, LogicOperator)]) -> String {
    let mut parts = Vec::with_capacity(conditions.len() * 2);
    for (index, (condition, logic)) in conditions.iter().enumerate() {
        if index > 0 {
            parts.push(logic.keyword().unwrap_or("AND").to_string());
        }
        parts.push(build_condition(condition));
    }
    parts.join(" ")
}

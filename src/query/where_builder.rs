//! WHERE clauses for the text command builders

use super::condition::{QueryCondition, QueryField, QueryValue};
use super::expression::build_field;
use super::operator::{LogicOperator, QueryOperator};
use super::predicate::render_conditions;

/// Conditions on bare column names, rendered like [`super::PredicateBuilder`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WhereBuilder {
    conditions: Vec<(QueryCondition, LogicOperator)>,
}

impl WhereBuilder {
    pub fn new(field: &str, operator: QueryOperator, value: impl Into<QueryValue>) -> Self {
        Self {
            conditions: vec![(
                QueryCondition::new(QueryField::column(field), operator, value),
                LogicOperator::None,
            )],
        }
    }

    pub fn id(id: i64) -> Self {
        Self::new("id", QueryOperator::Equal, id)
    }

    pub fn and(self, field: &str, operator: QueryOperator, value: impl Into<QueryValue>) -> Self {
        self.push(field, operator, value.into(), LogicOperator::And)
    }

    pub fn or(self, field: &str, operator: QueryOperator, value: impl Into<QueryValue>) -> Self {
        self.push(field, operator, value.into(), LogicOperator::Or)
    }

    pub fn conditions(&self) -> &[(QueryCondition, LogicOperator)] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Conditions with literal values
    pub fn build(&self) -> String {
        render_conditions(&self.conditions)
    }

    /// Conditions with `@<prefix><FIELD><index>` placeholders in place of values.
    /// `IN` and `IS NULL` keep their literal rendering.
    pub fn build_parameterized(&self, prefix: &str) -> String {
        let mut parts = Vec::with_capacity(self.conditions.len() * 2);
        for (index, (condition, logic)) in self.conditions.iter().enumerate() {
            if index > 0 {
                parts.push(logic.keyword().unwrap_or("AND").to_string());
            }
            if is_literal(condition.operator) {
                parts.push(render_conditions(&[(condition.clone(), LogicOperator::None)]));
            } else {
                parts.push(format!(
                    "{} {} @{}",
                    build_field(&condition.field),
                    condition.operator.sql(),
                    parameter_name(prefix, index, condition)
                ));
            }
        }
        parts.join(" ")
    }

    /// Values behind the placeholders of [`WhereBuilder::build_parameterized`]
    pub fn parameters(&self, prefix: &str) -> Vec<(String, &QueryValue)> {
        self.conditions
            .iter()
            .enumerate()
            .filter(|(_, (condition, _))| !is_literal(condition.operator))
            .map(|(index, (condition, _))| (parameter_name(prefix, index, condition), &condition.value))
            .collect()
    }

    fn push(mut self, field: &str, operator: QueryOperator, value: QueryValue, logic: LogicOperator) -> Self {
        let logic = if self.conditions.is_empty() { LogicOperator::None } else { logic };
        self.conditions
            .push((QueryCondition::new(QueryField::column(field), operator, value), logic));
        self
    }
}

fn is_literal(operator: QueryOperator) -> bool {
    matches!(operator, QueryOperator::In | QueryOperator::Null)
}

fn parameter_name(prefix: &str, index: usize, condition: &QueryCondition) -> String {
    format!("{}{}{}", prefix, condition.field.field_name, index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_and_parameterized() {
        let builder = WhereBuilder::new("CODE", QueryOperator::Equal, "A")
            .and("STATUS", QueryOperator::In, vec!["X", "Y"]);

        assert_eq!(builder.build(), "`CODE` = 'A' AND `STATUS` IN ('X','Y')");
        assert_eq!(
            builder.build_parameterized("where"),
            "`CODE` = @whereCODE0 AND `STATUS` IN ('X','Y')"
        );
    }

    #[test]
    fn test_same_field_gets_one_placeholder_per_condition() {
        let builder = WhereBuilder::new("age", QueryOperator::GreaterThan, 18)
            .and("age", QueryOperator::LessThan, 65)
            .or("deleted_at", QueryOperator::Null, QueryValue::Null);

        assert_eq!(
            builder.build_parameterized("where"),
            "`age` > @whereage0 AND `age` < @whereage1 OR `deleted_at` IS NULL"
        );

        let parameters = builder.parameters("where");
        assert_eq!(
            parameters,
            vec![
                ("whereage0".to_string(), &QueryValue::Integer(18)),
                ("whereage1".to_string(), &QueryValue::Integer(65)),
            ]
        );
    }
}

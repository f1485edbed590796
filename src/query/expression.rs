//! Rendering of single conditions into SQL text

use super::condition::{QueryCondition, QueryField, QueryValue};
use super::operator::QueryOperator;

/// `` `TABLE.FIELD` OP VALUE ``. The `Null` operator ignores the value.
pub fn build_condition(condition: &QueryCondition) -> String {
    let field = build_field(&condition.field);

    if condition.operator == QueryOperator::Null {
        return format!("{} {}", field, condition.operator.sql());
    }

    format!(
        "{} {} {}",
        field,
        condition.operator.sql(),
        build_value(&condition.value)
    )
}

pub fn build_field(field: &QueryField) -> String {
    match field.table_name.as_deref().map(str::trim) {
        Some(table) if !table.is_empty() => format!("`{}.{}`", table, field.field_name),
        _ => format!("`{}`", field.field_name),
    }
}

pub fn build_value(value: &QueryValue) -> String {
    match value {
        QueryValue::Null => "NULL".to_string(),
        QueryValue::Text(s) => quote(s),
        QueryValue::Integer(i) => i.to_string(),
        QueryValue::Float(f) => f.to_string(),
        QueryValue::Bool(b) => if *b { "1" } else { "0" }.to_string(),
        QueryValue::List(items) => {
            let rendered: Vec<String> = items
                .iter()
                .filter(|item| !item.is_empty())
                .map(|item| quote(item))
                .collect();
            format!("({})", rendered.join(","))
        }
    }
}

/// Single-quote a string, backslash-escaping `'`. Values containing `UNHEX`
/// are SQL expressions and pass through unchanged.
fn quote(value: &str) -> String {
    if value.contains("UNHEX") {
        return value.to_string();
    }
    format!("'{}'", escape(value))
}

/// Backslash-escapes single quotes for a value placed inside `'...'`
pub(crate) fn escape(value: &str) -> String {
    value.replace('\'', "\\'")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn condition(operator: QueryOperator, value: impl Into<QueryValue>) -> String {
        build_condition(&QueryCondition::new(
            QueryField::new("SAT_CUSTOMER", "NAME"),
            operator,
            value,
        ))
    }

    #[test]
    fn test_quotes_and_escapes_strings() {
        assert_eq!(condition(QueryOperator::Equal, "O'Brien"), "`SAT_CUSTOMER.NAME` = 'O\\'Brien'");
    }

    #[test]
    fn test_in_list() {
        assert_eq!(
            condition(QueryOperator::In, vec!["A", "B"]),
            "`SAT_CUSTOMER.NAME` IN ('A','B')"
        );
    }

    #[test]
    fn test_null_value_and_null_operator() {
        assert_eq!(condition(QueryOperator::Equal, QueryValue::Null), "`SAT_CUSTOMER.NAME` = NULL");
        assert_eq!(condition(QueryOperator::Null, QueryValue::Null), "`SAT_CUSTOMER.NAME` IS NULL");
    }

    #[test]
    fn test_unhex_passes_through() {
        assert_eq!(
            condition(QueryOperator::Equal, QueryValue::unhex("AB01")),
            "`SAT_CUSTOMER.NAME` = UNHEX('AB01')"
        );
    }

    #[test]
    fn test_numbers_and_unqualified_fields() {
        let rendered = build_condition(&QueryCondition::new(
            QueryField::column("AGE"),
            QueryOperator::GreaterThanOrEqual,
            18,
        ));
        assert_eq!(rendered, "`AGE` >= 18");
        assert_eq!(build_value(&QueryValue::Bool(true)), "1");
    }
}

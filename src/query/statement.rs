//! Text command builders for plain tables (outside the stored-procedure contract)

use super::where_builder::WhereBuilder;
use crate::protocol::{DataCommand, DbValue};

const WHERE_PARAMETER_PREFIX: &str = "where";

/// Table, column values and WHERE clause shared by the statement builders
#[derive(Debug, Clone, Default)]
struct CommandParts {
    table: String,
    columns: Vec<(String, DbValue)>,
    where_builder: Option<WhereBuilder>,
}

impl CommandParts {
    fn column(&mut self, name: &str, value: DbValue) {
        if !self.columns.iter().any(|(existing, _)| existing == name) {
            self.columns.push((name.to_string(), value));
        }
    }

    fn where_literal(&self) -> String {
        match &self.where_builder {
            Some(builder) if !builder.is_empty() => format!(" WHERE {}", builder.build()),
            _ => String::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SelectCommandBuilder {
    parts: CommandParts,
    limit: i64,
    offset: i64,
    order: Option<String>,
}

impl Default for SelectCommandBuilder {
    fn default() -> Self {
        Self {
            parts: CommandParts::default(),
            limit: 100,
            offset: 0,
            order: None,
        }
    }
}

impl SelectCommandBuilder {
    pub fn from(table: impl Into<String>) -> Self {
        let mut builder = Self::default();
        builder.parts.table = table.into();
        builder
    }

    pub fn filter(mut self, builder: WhereBuilder) -> Self {
        self.parts.where_builder = Some(builder);
        self
    }

    pub fn where_id(self, id: i64) -> Self {
        self.filter(WhereBuilder::id(id))
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }

    /// 1-based page of `page_size` rows
    pub fn paging(mut self, page: i64, page_size: i64) -> Self {
        self.limit = page_size;
        self.offset = page_size * (page - 1);
        self
    }

    pub fn order_by(mut self, order: impl Into<String>) -> Self {
        self.order = Some(order.into());
        self
    }

    pub fn sql(&self) -> String {
        let mut sql = format!("SELECT * FROM {}", self.parts.table);
        sql.push_str(&self.parts.where_literal());
        if let Some(order) = self.order.as_deref().filter(|o| !o.trim().is_empty()) {
            sql.push_str(" ORDER BY ");
            sql.push_str(order);
        }
        sql.push_str(&format!(" LIMIT {}, {}", self.offset, self.limit));
        sql
    }

    pub fn build<S>(&self) -> DataCommand<S> {
        DataCommand::text(self.sql())
    }
}

#[derive(Debug, Clone, Default)]
pub struct InsertCommandBuilder {
    parts: CommandParts,
}

impl InsertCommandBuilder {
    pub fn table(table: impl Into<String>) -> Self {
        let mut builder = Self::default();
        builder.parts.table = table.into();
        builder
    }

    /// Add a column value; a repeated column keeps its first value
    pub fn column(mut self, name: &str, value: impl Into<DbValue>) -> Self {
        self.parts.column(name, value.into());
        self
    }

    pub fn sql(&self) -> String {
        let names: Vec<&str> = self.parts.columns.iter().map(|(n, _)| n.as_str()).collect();
        let placeholders: Vec<String> = names.iter().map(|n| format!("@{}", n)).collect();
        format!(
            "INSERT INTO {} ({}) VALUES ({}); SELECT LAST_INSERT_ID();",
            self.parts.table,
            names.join(", "),
            placeholders.join(", ")
        )
    }

    pub fn build<S>(&self) -> DataCommand<S> {
        self.parts
            .columns
            .iter()
            .fold(DataCommand::text(self.sql()), |command, (name, value)| {
                command.parameter(name, value.clone())
            })
    }
}

#[derive(Debug, Clone, Default)]
pub struct UpdateCommandBuilder {
    parts: CommandParts,
}

impl UpdateCommandBuilder {
    pub fn table(table: impl Into<String>) -> Self {
        let mut builder = Self::default();
        builder.parts.table = table.into();
        builder
    }

    pub fn column(mut self, name: &str, value: impl Into<DbValue>) -> Self {
        self.parts.column(name, value.into());
        self
    }

    pub fn filter(mut self, builder: WhereBuilder) -> Self {
        self.parts.where_builder = Some(builder);
        self
    }

    pub fn where_id(self, id: i64) -> Self {
        self.filter(WhereBuilder::id(id))
    }

    pub fn sql(&self) -> String {
        let assignments: Vec<String> = self
            .parts
            .columns
            .iter()
            .map(|(name, _)| format!("{} = @{}", name, name))
            .collect();

        let mut sql = format!("UPDATE {} SET {}", self.parts.table, assignments.join(", "));
        if let Some(builder) = self.parts.where_builder.as_ref().filter(|b| !b.is_empty()) {
            sql.push_str(" WHERE ");
            sql.push_str(&builder.build_parameterized(WHERE_PARAMETER_PREFIX));
        }
        sql
    }

    /// Column values are bound as `@<COLUMN>`, WHERE values as
    /// `@where<FIELD><position>`
    pub fn build<S>(&self) -> DataCommand<S> {
        let mut command = DataCommand::text(self.sql());

        if let Some(builder) = &self.parts.where_builder {
            for (name, value) in builder.parameters(WHERE_PARAMETER_PREFIX) {
                command = command.parameter(&name, value.to_db_value());
            }
        }

        for (name, value) in &self.parts.columns {
            command = command.parameter(name, value.clone());
        }
        command
    }
}

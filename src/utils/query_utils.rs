use sqlx::MySql;
use sqlx::mysql::MySqlArguments;
use sqlx::query::{QueryAs, QueryScalar};

/// ===============================
/// SQL bindable value enum
/// ===============================
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    String(String),
    U64(u64),
}

/// ===============================
/// Dynamic WHERE clause
/// ===============================
#[derive(Debug, Default)]
pub struct WhereClause {
    conditions: Vec<String>,
    values: Vec<SqlValue>,
}

impl WhereClause {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a condition; `values` must line up with its `?` placeholders.
    pub fn push(&mut self, condition: &str, values: impl IntoIterator<Item = SqlValue>) -> &mut Self {
        self.conditions.push(condition.to_string());
        self.values.extend(values);
        self
    }

    /// `WHERE a AND b`, or empty when there are no conditions.
    pub fn sql(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conditions.join(" AND "))
        }
    }

    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }
}

pub fn like_pattern(search: &str) -> SqlValue {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    SqlValue::String(format!("%{}%", escaped))
}

pub fn bind_as<'q, O>(
    mut query: QueryAs<'q, MySql, O, MySqlArguments>,
    values: &[SqlValue],
) -> QueryAs<'q, MySql, O, MySqlArguments> {
    for value in values.iter().cloned() {
        query = match value {
            SqlValue::String(v) => query.bind(v),
            SqlValue::U64(v) => query.bind(v),
        };
    }
    query
}

pub fn bind_scalar<'q, O>(
    mut query: QueryScalar<'q, MySql, O, MySqlArguments>,
    values: &[SqlValue],
) -> QueryScalar<'q, MySql, O, MySqlArguments> {
    for value in values.iter().cloned() {
        query = match value {
            SqlValue::String(v) => query.bind(v),
            SqlValue::U64(v) => query.bind(v),
        };
    }
    query
}

use serde::{Deserialize, Serialize};

use super::error::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    ILike,
    Is,
}

impl FilterOp {
    /// PostgREST operator prefix, e.g. `eq` in `id=eq.42`.
    pub fn as_param(&self) -> &'static str {
        match self {
            FilterOp::Eq => "eq",
            FilterOp::Neq => "neq",
            FilterOp::Gt => "gt",
            FilterOp::Gte => "gte",
            FilterOp::Lt => "lt",
            FilterOp::Lte => "lte",
            FilterOp::Like => "like",
            FilterOp::ILike => "ilike",
            FilterOp::Is => "is",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub column: String,
    pub op: FilterOp,
    pub value: String,
}

impl Filter {
    pub fn new(column: impl Into<String>, op: FilterOp, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            op,
            value: value.into(),
        }
    }

    pub fn eq(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(column, FilterOp::Eq, value)
    }

    fn to_param(&self) -> (String, String) {
        (self.column.clone(), format!("{}.{}", self.op.as_param(), self.value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_param(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub sort: SortDirection,
}

/// A read against one table of the store's schema namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectQuery {
    pub table: String,
    pub columns: Vec<String>,
    pub filters: Vec<Filter>,
    pub order: Vec<Order>,
    pub limit: Option<u32>,
}

impl SelectQuery {
    pub fn from(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: vec![],
            filters: vec![],
            order: vec![],
            limit: None,
        }
    }

    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn eq(self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.filter(Filter::eq(column, value))
    }

    pub fn order_by(mut self, column: impl Into<String>, sort: SortDirection) -> Self {
        self.order.push(Order {
            column: column.into(),
            sort,
        });
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Query string pairs in PostgREST syntax. Identifiers are validated here
    /// so nothing unchecked reaches the URL.
    pub fn to_params(&self) -> Result<Vec<(String, String)>, StoreError> {
        validate_identifier(&self.table)?;

        let mut params = Vec::with_capacity(self.filters.len() + 3);

        let select = if self.columns.is_empty() || self.columns.iter().any(|c| c == "*") {
            "*".to_string()
        } else {
            for column in &self.columns {
                validate_identifier(column)?;
            }
            self.columns.join(",")
        };
        params.push(("select".to_string(), select));

        params.extend(filter_params(&self.filters)?);

        if !self.order.is_empty() {
            for order in &self.order {
                validate_identifier(&order.column)?;
            }
            let order = self
                .order
                .iter()
                .map(|o| format!("{}.{}", o.column, o.sort.as_param()))
                .collect::<Vec<_>>()
                .join(",");
            params.push(("order".to_string(), order));
        }

        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }

        Ok(params)
    }
}

pub(crate) fn filter_params(filters: &[Filter]) -> Result<Vec<(String, String)>, StoreError> {
    filters
        .iter()
        .map(|f| {
            validate_identifier(&f.column)?;
            Ok(f.to_param())
        })
        .collect()
}

/// Table, column and procedure names: ASCII letters, digits and underscores,
/// not starting with a digit.
pub fn validate_identifier(name: &str) -> Result<(), StoreError> {
    let mut chars = name.chars();
    let valid_start = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_');
    if !valid_start || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(StoreError::InvalidQuery(format!("Invalid identifier: {:?}", name)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_listing_params() {
        let params = SelectQuery::from("users")
            .columns(["id", "email", "created_at"])
            .order_by("created_at", SortDirection::Desc)
            .limit(100)
            .to_params()
            .unwrap();

        assert_eq!(
            params,
            vec![
                ("select".to_string(), "id,email,created_at".to_string()),
                ("order".to_string(), "created_at.desc".to_string()),
                ("limit".to_string(), "100".to_string()),
            ]
        );
    }

    #[test]
    fn builds_filter_params() {
        let params = SelectQuery::from("admin_users")
            .columns(["id"])
            .eq("id", "7f1c")
            .limit(1)
            .to_params()
            .unwrap();

        assert!(params.contains(&("id".to_string(), "eq.7f1c".to_string())));
        assert!(params.contains(&("limit".to_string(), "1".to_string())));
    }

    #[test]
    fn star_wins_over_named_columns() {
        let params = SelectQuery::from("clouds").columns(["*", "id"]).to_params().unwrap();
        assert_eq!(params[0], ("select".to_string(), "*".to_string()));
    }

    #[test]
    fn rejects_bad_identifiers() {
        assert!(validate_identifier("admin_users").is_ok());
        assert!(validate_identifier("_private").is_ok());
        assert!(validate_identifier("").is_err());
        assert!(validate_identifier("1users").is_err());
        assert!(validate_identifier("users;drop").is_err());
        assert!(validate_identifier("users?select=*").is_err());

        let err = SelectQuery::from("users").eq("id&x", "1").to_params();
        assert!(matches!(err, Err(StoreError::InvalidQuery(_))));
    }
}

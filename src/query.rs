use serde::Deserialize;
use sqlx::postgres::{PgArguments, Postgres};
use sqlx::query::QueryAs;
use utoipa::IntoParams;

/// Default number of items per page
pub const DEFAULT_PAGE_SIZE: u32 = 10;
/// Largest accepted page size
pub const MAX_PAGE_SIZE: u32 = 100;

/// A bound parameter of a dynamically built query
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Int(i32),
    IntList(Vec<i32>),
    TextList(Vec<String>),
}

/// SQL query builder for parameterized filter queries
///
/// Conditions are written with a `{}` placeholder that is replaced by the
/// next positional parameter (`$1`, `$2`, ...).
#[derive(Debug)]
pub struct SQLQueryBuilder {
    base_query: String,
    where_clauses: Vec<String>,
    params: Vec<SqlParam>,
    order_clause: Option<String>,
}

impl SQLQueryBuilder {
    pub fn new(base_query: &str) -> Self {
        Self {
            base_query: base_query.to_string(),
            where_clauses: Vec::new(),
            params: Vec::new(),
            order_clause: None,
        }
    }

    /// Adds a condition without parameters
    pub fn add_clause(&mut self, clause: &str) {
        self.where_clauses.push(clause.to_string());
    }

    /// Adds a condition bound to one parameter
    pub fn add_condition(&mut self, template: &str, param: SqlParam) {
        let placeholder = format!("${}", self.params.len() + 1);
        self.where_clauses.push(template.replace("{}", &placeholder));
        self.params.push(param);
    }

    /// Adds `column = value`
    pub fn add_eq(&mut self, column: &str, value: i32) {
        self.add_condition(&format!("{} = {{}}", column), SqlParam::Int(value));
    }

    /// Adds `column = ANY(values)`; no-op for an empty list
    pub fn add_any(&mut self, column: &str, values: Vec<i32>) {
        if !values.is_empty() {
            self.add_condition(&format!("{} = ANY({{}})", column), SqlParam::IntList(values));
        }
    }

    /// Adds a case-insensitive `column IN values`; no-op for an empty list
    pub fn add_any_ci(&mut self, column: &str, values: Vec<String>) {
        if !values.is_empty() {
            let lowered = values.into_iter().map(|v| v.to_lowercase()).collect();
            self.add_condition(
                &format!("LOWER({}) = ANY({{}})", column),
                SqlParam::TextList(lowered),
            );
        }
    }

    pub fn set_order(&mut self, order: &str) {
        self.order_clause = Some(order.to_string());
    }

    /// Builds the final SQL string and its parameters
    pub fn build(&self) -> (String, Vec<SqlParam>) {
        let mut query = self.base_query.clone();

        if !self.where_clauses.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&self.where_clauses.join(" AND "));
        }

        if let Some(ref order) = self.order_clause {
            query.push_str(" ORDER BY ");
            query.push_str(order);
        }

        (query, self.params.clone())
    }
}

/// Bind built parameters onto a `query_as` in order
pub fn bind_params<'q, O>(
    mut query: QueryAs<'q, Postgres, O, PgArguments>,
    params: Vec<SqlParam>,
) -> QueryAs<'q, Postgres, O, PgArguments> {
    for param in params {
        query = match param {
            SqlParam::Int(value) => query.bind(value),
            SqlParam::IntList(values) => query.bind(values),
            SqlParam::TextList(values) => query.bind(values),
        };
    }
    query
}

/// Malformed query string parameter
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QueryError {
    #[error("{name} must be a positive number (greater than 0)")]
    NotPositive { name: &'static str },

    #[error("{name} must not exceed {max}")]
    TooLarge { name: &'static str, max: u32 },

    #[error("{name} must be a comma-separated list of integers, got '{value}'")]
    InvalidList { name: &'static str, value: String },

    #[error("{0}")]
    Conflict(String),
}

/// `page` / `limit` query parameters
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
pub struct PaginationQuery {
    /// Page number (1-indexed, defaults to 1)
    pub page: Option<u32>,
    /// Items per page (defaults to 10, at most 100)
    pub limit: Option<u32>,
}

/// Validated pagination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl PaginationQuery {
    pub fn validate(self) -> Result<Pagination, QueryError> {
        let page = match self.page {
            Some(0) => return Err(QueryError::NotPositive { name: "page" }),
            Some(p) => p,
            None => 1,
        };
        let limit = match self.limit {
            Some(0) => return Err(QueryError::NotPositive { name: "limit" }),
            Some(l) if l > MAX_PAGE_SIZE => {
                return Err(QueryError::TooLarge {
                    name: "limit",
                    max: MAX_PAGE_SIZE,
                })
            }
            Some(l) => l,
            None => DEFAULT_PAGE_SIZE,
        };
        Ok(Pagination { page, limit })
    }
}

impl Pagination {
    /// Rows to skip; widened so that no `page` can overflow it
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    /// Slice an in-memory result set to the requested page
    ///
    /// Callers load and price the whole filtered set before slicing, since
    /// stay coverage can only be decided after pricing.
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        let skip = usize::try_from(self.offset()).unwrap_or(usize::MAX);
        items
            .into_iter()
            .skip(skip)
            .take(self.limit as usize)
            .collect()
    }
}

/// Normalizes string parameters by trimming whitespace
/// Returns None if the string is empty or whitespace-only
pub fn normalize_string(s: Option<String>) -> Option<String> {
    s.and_then(|s| {
        let trimmed = s.trim().to_string();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    })
}

/// Splits a comma-separated parameter into trimmed, non-empty values
pub fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Parses a comma-separated list of integers such as `1,2,3`
pub fn parse_int_list(name: &'static str, value: Option<&str>) -> Result<Vec<i32>, QueryError> {
    split_list(value)
        .into_iter()
        .map(|item| {
            item.parse::<i32>().map_err(|_| QueryError::InvalidList {
                name,
                value: value.unwrap_or_default().to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_basic_query() {
        let builder = SQLQueryBuilder::new("SELECT * FROM rooms");
        let (query, params) = builder.build();

        assert_eq!(query, "SELECT * FROM rooms");
        assert!(params.is_empty());
    }

    #[test]
    fn test_builder_numbers_placeholders_in_order() {
        let mut builder = SQLQueryBuilder::new("SELECT * FROM rooms");
        builder.add_eq("hotel_id", 3);
        builder.add_any("number_of_adults", vec![1, 2]);
        builder.add_any_ci("category", vec!["Suite".to_string()]);
        builder.set_order("id");
        let (query, params) = builder.build();

        assert_eq!(
            query,
            "SELECT * FROM rooms WHERE hotel_id = $1 AND number_of_adults = ANY($2) \
             AND LOWER(category) = ANY($3) ORDER BY id"
        );
        assert_eq!(params[0], SqlParam::Int(3));
        assert_eq!(params[1], SqlParam::IntList(vec![1, 2]));
        assert_eq!(params[2], SqlParam::TextList(vec!["suite".to_string()]));
    }

    #[test]
    fn test_builder_skips_empty_lists() {
        let mut builder = SQLQueryBuilder::new("SELECT * FROM rooms");
        builder.add_any("number_of_children", vec![]);
        builder.add_clause("is_active");
        let (query, params) = builder.build();

        assert_eq!(query, "SELECT * FROM rooms WHERE is_active");
        assert!(params.is_empty());
    }

    #[test]
    fn test_pagination_defaults_and_bounds() {
        let default = PaginationQuery::default().validate().unwrap();
        assert_eq!(default, Pagination { page: 1, limit: DEFAULT_PAGE_SIZE });
        assert_eq!(default.offset(), 0);

        let page_two = PaginationQuery { page: Some(2), limit: Some(20) }.validate().unwrap();
        assert_eq!(page_two.offset(), 20);

        assert!(PaginationQuery { page: Some(0), limit: None }.validate().is_err());
        assert!(PaginationQuery { page: None, limit: Some(0) }.validate().is_err());
        assert!(PaginationQuery { page: None, limit: Some(101) }.validate().is_err());
    }

    #[test]
    fn test_pagination_apply() {
        let pagination = Pagination { page: 2, limit: 2 };
        assert_eq!(pagination.apply(vec![1, 2, 3, 4, 5]), vec![3, 4]);

        let past_end = Pagination { page: 4, limit: 2 };
        assert!(past_end.apply(vec![1, 2, 3]).is_empty());
    }

    #[test]
    fn test_pagination_last_page_does_not_overflow() {
        let pagination = PaginationQuery {
            page: Some(u32::MAX),
            limit: Some(MAX_PAGE_SIZE),
        }
        .validate()
        .unwrap();

        assert_eq!(
            pagination.offset(),
            (u64::from(u32::MAX) - 1) * u64::from(MAX_PAGE_SIZE)
        );
        assert!(i64::try_from(pagination.offset()).is_ok());
        assert!(pagination.apply(vec![1, 2, 3]).is_empty());
    }

    #[test]
    fn test_parse_int_list() {
        assert_eq!(parse_int_list("n", Some("1, 2,3")).unwrap(), vec![1, 2, 3]);
        assert_eq!(parse_int_list("n", None).unwrap(), Vec::<i32>::new());
        assert_eq!(parse_int_list("n", Some(" , ")).unwrap(), Vec::<i32>::new());
        assert!(matches!(
            parse_int_list("number_of_adults", Some("1,two")),
            Err(QueryError::InvalidList { name: "number_of_adults", .. })
        ));
    }

    #[test]
    fn test_normalize_string() {
        assert_eq!(normalize_string(Some("  Italy ".into())), Some("Italy".into()));
        assert_eq!(normalize_string(Some("   ".into())), None);
        assert_eq!(normalize_string(None), None);
    }
}

//! SQL builder with parameterized query construction.
//!
//! All caller-supplied values go through DuckDB's parameter binding (`?`
//! placeholders), never through string interpolation. Values are bound as
//! text, so typed comparisons wrap the placeholder in an explicit `CAST`.
//!
//! # Example
//!
//! ```rust
//! use fuel_market_sdk::SqlBuilder;
//! let (sql, params) = SqlBuilder::new("price_observations")
//!     .where_eq("fuel_type", "regular")
//!     .where_in("station_id", &["st-1", "st-2"])
//!     .order_by(&["observed_at ASC"])
//!     .build();
//! assert!(sql.contains("station_id IN (?, ?)"));
//! assert_eq!(params.len(), 3);
//! ```

use chrono::{DateTime, Utc};

/// Format a timestamp the way DuckDB parses `CAST(? AS TIMESTAMP)`.
pub fn sql_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S%.3f").to_string()
}

/// Builds parameterized SQL queries safely.
///
/// Methods return `&mut Self` for chaining.
pub struct SqlBuilder {
    select_cols: Vec<String>,
    from_table: String,
    joins: Vec<String>,
    where_clauses: Vec<String>,
    params: Vec<String>,
    group_by_cols: Vec<String>,
    order_by_cols: Vec<String>,
    limit_val: Option<usize>,
}

impl SqlBuilder {
    /// Create a builder targeting the given table (optionally with an alias, e.g. `"stations s"`).
    pub fn new(table: &str) -> Self {
        Self {
            select_cols: vec!["*".to_string()],
            from_table: table.to_string(),
            joins: Vec::new(),
            where_clauses: Vec::new(),
            params: Vec::new(),
            group_by_cols: Vec::new(),
            order_by_cols: Vec::new(),
            limit_val: None,
        }
    }

    /// Set the columns to select (replaces the default `*`).
    pub fn select(&mut self, cols: &[&str]) -> &mut Self {
        self.select_cols = cols.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Add a JOIN clause, e.g. `"JOIN stations s ON s.id = o.station_id"`.
    pub fn join(&mut self, clause: &str) -> &mut Self {
        self.joins.push(clause.to_string());
        self
    }

    /// Add a WHERE condition with `?` placeholders for each param, appended in order.
    pub fn where_clause(&mut self, condition: &str, params: &[&str]) -> &mut Self {
        self.where_clauses.push(condition.to_string());
        self.params.extend(params.iter().map(|p| p.to_string()));
        self
    }

    /// Add an equality condition: `{column} = ?`.
    pub fn where_eq(&mut self, column: &str, value: &str) -> &mut Self {
        self.where_clauses.push(format!("{} = ?", column));
        self.params.push(value.to_string());
        self
    }

    /// Add an IN condition with parameterized values.
    ///
    /// Empty values list produces `FALSE`.
    pub fn where_in<S: AsRef<str>>(&mut self, column: &str, values: &[S]) -> &mut Self {
        if values.is_empty() {
            self.where_clauses.push("FALSE".to_string());
            return self;
        }
        let placeholders: Vec<&str> = values.iter().map(|_| "?").collect();
        self.where_clauses
            .push(format!("{} IN ({})", column, placeholders.join(", ")));
        self.params
            .extend(values.iter().map(|v| v.as_ref().to_string()));
        self
    }

    /// `{column} >= CAST(? AS TIMESTAMP)`.
    pub fn where_since(&mut self, column: &str, ts: &DateTime<Utc>) -> &mut Self {
        self.where_clauses
            .push(format!("{} >= CAST(? AS TIMESTAMP)", column));
        self.params.push(sql_timestamp(ts));
        self
    }

    /// `{column} <= CAST(? AS TIMESTAMP)`.
    pub fn where_until(&mut self, column: &str, ts: &DateTime<Utc>) -> &mut Self {
        self.where_clauses
            .push(format!("{} <= CAST(? AS TIMESTAMP)", column));
        self.params.push(sql_timestamp(ts));
        self
    }

    /// `{column} BETWEEN CAST(? AS DOUBLE) AND CAST(? AS DOUBLE)`.
    pub fn where_between(&mut self, column: &str, low: f64, high: f64) -> &mut Self {
        self.where_clauses.push(format!(
            "{} BETWEEN CAST(? AS DOUBLE) AND CAST(? AS DOUBLE)",
            column
        ));
        self.params.push(low.to_string());
        self.params.push(high.to_string());
        self
    }

    /// `({column} BETWEEN .. AND .. OR ..)` over several ranges.
    ///
    /// Empty ranges list produces `FALSE`.
    pub fn where_between_any(&mut self, column: &str, ranges: &[(f64, f64)]) -> &mut Self {
        if ranges.is_empty() {
            self.where_clauses.push("FALSE".to_string());
            return self;
        }
        let conditions: Vec<String> = ranges
            .iter()
            .map(|_| format!("{} BETWEEN CAST(? AS DOUBLE) AND CAST(? AS DOUBLE)", column))
            .collect();
        self.where_clauses
            .push(format!("({})", conditions.join(" OR ")));
        for (low, high) in ranges {
            self.params.push(low.to_string());
            self.params.push(high.to_string());
        }
        self
    }

    /// Add GROUP BY columns.
    pub fn group_by(&mut self, cols: &[&str]) -> &mut Self {
        self.group_by_cols
            .extend(cols.iter().map(|c| c.to_string()));
        self
    }

    /// Add ORDER BY clauses (e.g. `"observed_at ASC"`).
    pub fn order_by(&mut self, clauses: &[&str]) -> &mut Self {
        self.order_by_cols
            .extend(clauses.iter().map(|c| c.to_string()));
        self
    }

    /// Set the maximum number of rows to return.
    pub fn limit(&mut self, n: usize) -> &mut Self {
        self.limit_val = Some(n);
        self
    }

    /// Build the final SQL string and parameter list.
    pub fn build(&self) -> (String, Vec<String>) {
        let mut parts = vec![
            format!("SELECT {}", self.select_cols.join(", ")),
            format!("FROM {}", self.from_table),
        ];

        for j in &self.joins {
            parts.push(j.clone());
        }

        if !self.where_clauses.is_empty() {
            parts.push(format!("WHERE {}", self.where_clauses.join(" AND ")));
        }

        if !self.group_by_cols.is_empty() {
            parts.push(format!("GROUP BY {}", self.group_by_cols.join(", ")));
        }

        if !self.order_by_cols.is_empty() {
            parts.push(format!("ORDER BY {}", self.order_by_cols.join(", ")));
        }

        if let Some(n) = self.limit_val {
            parts.push(format!("LIMIT {}", n));
        }

        (parts.join("\n"), self.params.clone())
    }
}

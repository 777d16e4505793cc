//! PostgREST query builder.
//!
//! Filters render as `column=op.value` pairs, ordering as `order=a.asc,b.desc`,
//! and pagination as `offset`/`limit`.

use std::fmt;

/// A composed row filter, ordering and page window for one table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    select: Option<String>,
    filters: Vec<(String, String)>,
    order: Vec<String>,
    offset: Option<u64>,
    limit: Option<u64>,
}

impl Query {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Columns to return (`*` when never called).
    #[must_use]
    pub fn select(mut self, columns: &str) -> Self {
        self.select = Some(columns.to_string());
        self
    }

    #[must_use]
    pub fn eq(self, column: &str, value: impl fmt::Display) -> Self {
        self.filter(column, "eq", value)
    }

    #[must_use]
    pub fn neq(self, column: &str, value: impl fmt::Display) -> Self {
        self.filter(column, "neq", value)
    }

    #[must_use]
    pub fn gt(self, column: &str, value: impl fmt::Display) -> Self {
        self.filter(column, "gt", value)
    }

    /// Case-insensitive `LIKE`; `*` is the wildcard.
    #[must_use]
    pub fn ilike(self, column: &str, pattern: &str) -> Self {
        self.filter(column, "ilike", pattern)
    }

    /// Case-insensitive substring match.
    #[must_use]
    pub fn contains_text(self, column: &str, needle: &str) -> Self {
        let escaped = needle.replace(['*', '%'], "");
        self.ilike(column, &format!("*{escaped}*"))
    }

    /// `column IN (values)`. An empty list adds no filter.
    #[must_use]
    pub fn in_list<I, V>(self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: fmt::Display,
    {
        let items: Vec<String> = values.into_iter().map(|v| quote_list_item(&v.to_string())).collect();
        if items.is_empty() {
            return self;
        }
        self.filter(column, "in", format!("({})", items.join(",")))
    }

    #[must_use]
    pub fn is_null(self, column: &str) -> Self {
        self.filter(column, "is", "null")
    }

    #[must_use]
    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        let dir = if ascending { "asc" } else { "desc" };
        self.order.push(format!("{column}.{dir}"));
        self
    }

    /// Inclusive row window `from..=to`.
    #[must_use]
    pub fn range(mut self, from: u64, to: u64) -> Self {
        self.offset = Some(from);
        self.limit = Some(to.saturating_sub(from).saturating_add(1));
        self
    }

    /// Zero-based page of `page_size` rows.
    #[must_use]
    pub fn page(self, page: u64, page_size: u64) -> Self {
        let size = page_size.max(1);
        let from = page.saturating_mul(size);
        self.range(from, from.saturating_add(size - 1))
    }

    #[must_use]
    pub const fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Only the filters, for `PATCH`/`DELETE`/count requests.
    #[must_use]
    pub fn filters_only(&self) -> Self {
        Self {
            filters: self.filters.clone(),
            ..Self::default()
        }
    }

    fn filter(mut self, column: &str, op: &str, value: impl fmt::Display) -> Self {
        self.filters.push((column.to_string(), format!("{op}.{value}")));
        self
    }

    /// Parameter pairs in render order, not yet percent-encoded.
    #[must_use]
    pub fn params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(select) = &self.select {
            params.push(("select".to_string(), select.clone()));
        }
        params.extend(self.filters.iter().cloned());
        if !self.order.is_empty() {
            params.push(("order".to_string(), self.order.join(",")));
        }
        if let Some(offset) = self.offset {
            params.push(("offset".to_string(), offset.to_string()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        params
    }

    /// Percent-encoded query string without the leading `?`.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        self.params()
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Double-quote list items that contain PostgREST reserved characters.
fn quote_list_item(raw: &str) -> String {
    if raw.contains([',', '(', ')', '"', ':', '.', ' ']) {
        format!("\"{}\"", raw.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        raw.to_string()
    }
}

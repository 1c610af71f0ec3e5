//! Query configuration for a single dataset: the [`ResourceQuery`] builder
//! and the URL composition it drives.

use crate::{types::OutputFormat, Error};

/// Conversion into the comma-joined column list accepted by `$select`.
///
/// Implemented for a single column name and for ordered sequences of names,
/// so `select("a,b")` and `select(["a", "b"])` produce the same query.
pub trait IntoColumns {
    fn into_columns(self) -> String;
}

impl IntoColumns for &str {
    fn into_columns(self) -> String {
        self.to_string()
    }
}
impl IntoColumns for String {
    fn into_columns(self) -> String {
        self
    }
}
impl IntoColumns for &[&str] {
    fn into_columns(self) -> String {
        self.join(",")
    }
}
impl<const N: usize> IntoColumns for [&str; N] {
    fn into_columns(self) -> String {
        self.join(",")
    }
}
impl IntoColumns for Vec<&str> {
    fn into_columns(self) -> String {
        self.join(",")
    }
}
impl IntoColumns for &[String] {
    fn into_columns(self) -> String {
        self.join(",")
    }
}
impl IntoColumns for Vec<String> {
    fn into_columns(self) -> String {
        self.join(",")
    }
}

/// Mutable query configuration for one dataset resource.
///
/// Builder methods mutate in place and return `&mut Self` for chaining;
/// none of them perform I/O. State persists across fetches on the same
/// instance, there is no automatic reset.
#[derive(Clone, Debug)]
pub struct ResourceQuery {
    resource_id: String,
    output: OutputFormat,
    columns: String,
    filter_column: String,
    filter_value: String,
    limit: u64,
}

impl ResourceQuery {
    pub fn new(resource_id: &str, output: OutputFormat) -> Self {
        Self {
            resource_id: resource_id.to_string(),
            output,
            columns: String::new(),
            filter_column: String::new(),
            filter_value: String::new(),
            limit: 0,
        }
    }

    /// Restricts the response to the given column(s). An empty selection
    /// means all columns.
    pub fn select<C: IntoColumns>(&mut self, columns: C) -> &mut Self {
        self.columns = columns.into_columns();
        self
    }

    /// Filters rows to those where `column` equals `value`.
    ///
    /// The query holds a single predicate: a second call replaces the first,
    /// it does not conjoin. Both arguments must be non-empty; on
    /// [`Error::InvalidArgument`] any prior filter is left untouched.
    pub fn filter(&mut self, column: &str, value: &str) -> Result<&mut Self, Error> {
        if column.is_empty() || value.is_empty() {
            return Err(Error::InvalidArgument(
                "filter requires both a column and a value".to_string(),
            ));
        }
        self.filter_column = column.to_string();
        self.filter_value = value.to_string();
        Ok(self)
    }

    /// Caps the number of rows returned. `0` is a no-op and leaves any
    /// previously set limit in place.
    pub fn limit(&mut self, limit: u64) -> &mut Self {
        if limit > 0 {
            self.limit = limit;
        }
        self
    }

    /// Assembles the query string from the current configuration.
    ///
    /// Pure and idempotent: parameters are collected in a fixed order
    /// (`$limit`, the filter pair, `$select`) and joined, so repeated calls
    /// with unchanged state yield the same string and never duplicate
    /// parameters. The leading `?` is always present, even when empty.
    pub fn query_string(&self) -> String {
        let mut params: Vec<String> = Vec::new();
        if self.limit > 0 {
            params.push(format!("$limit={}", self.limit));
        }
        if !self.filter_column.is_empty() && !self.filter_value.is_empty() {
            params.push(format!("{}={}", self.filter_column, self.filter_value));
        }
        if !self.columns.is_empty() {
            params.push(format!("$select={}", self.columns));
        }
        format!("?{}", params.join("&"))
    }

    /// Builds the full resource request URL for the given portal base.
    pub fn request_url(&self, base_url: &str) -> String {
        format!(
            "{}/resource/{}.{}{}",
            base_url,
            self.resource_id,
            self.output,
            self.query_string()
        )
    }

    pub fn resource_id(&self) -> &str {
        &self.resource_id
    }

    pub fn output(&self) -> OutputFormat {
        self.output
    }
}

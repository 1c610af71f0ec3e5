//! HTTP client for SODA (Socrata Open Data API) dataset resources.

use std::time::Duration;

use chrono::{DateTime, FixedOffset};
use reqwest::header::HeaderMap;
use url::Url;

use crate::{
    query::{IntoColumns, ResourceQuery},
    types::{FetchedResult, Options, OutputFormat, Payload},
    Error,
};

const DEFAULT_BASE_URL: &str = "https://soda.demo.socrata.com";
const USER_AGENT: &str = concat!("soda_api/", env!("CARGO_PKG_VERSION"));

const FIELDS_HEADER: &str = "x-soda2-fields";
const OUT_OF_DATE_HEADER: &str = "x-soda2-data-out-of-date";

/// Client for one dataset on a SODA open-data portal.
///
/// Holds the mutable query configuration for the dataset; `select`, `filter`
/// and `limit` chain on the same instance and [`get`](Client::get) is the
/// only method that performs I/O. Configuration persists across `get` calls,
/// so an instance can be reused to poll the same query. Each request builds
/// a fresh `reqwest::Client` with a 30-second timeout.
pub struct Client {
    /// Base URL of the data portal. Defaults to the Socrata demo portal.
    base_api_url: String,
    query: ResourceQuery,
    include_metadata: bool,
    is_outdated: bool,
    last_modified: Option<String>,
}

impl Client {
    /// Creates a client for the given dataset identifier on the default
    /// portal. Fails with [`Error::InvalidArgument`] when the identifier is
    /// empty.
    pub fn new(resource_id: &str, options: Options) -> Result<Self, Error> {
        Self::with_base_url(DEFAULT_BASE_URL, resource_id, options)
    }

    /// Creates a client against a custom portal base URL. Used for other
    /// portals and for testing with wiremock.
    pub fn with_base_url(
        base_url: &str,
        resource_id: &str,
        options: Options,
    ) -> Result<Self, Error> {
        if resource_id.is_empty() {
            return Err(Error::InvalidArgument(
                "a dataset identifier is required".to_string(),
            ));
        }
        Ok(Self {
            base_api_url: base_url.trim_end_matches('/').to_string(),
            query: ResourceQuery::new(resource_id, options.output),
            include_metadata: options.include_metadata,
            is_outdated: false,
            last_modified: None,
        })
    }

    /// Restricts the response to the given column(s). See
    /// [`ResourceQuery::select`].
    pub fn select<C: IntoColumns>(&mut self, columns: C) -> &mut Self {
        self.query.select(columns);
        self
    }

    /// Filters rows to those where `column` equals `value`. See
    /// [`ResourceQuery::filter`].
    pub fn filter(&mut self, column: &str, value: &str) -> Result<&mut Self, Error> {
        self.query.filter(column, value)?;
        Ok(self)
    }

    /// Caps the number of rows returned. See [`ResourceQuery::limit`].
    pub fn limit(&mut self, limit: u64) -> &mut Self {
        self.query.limit(limit);
        self
    }

    /// The resource URL the next [`get`](Client::get) call will request.
    pub fn request_url(&self) -> String {
        self.query.request_url(&self.base_api_url)
    }

    /// Whether the portal reported the dataset as out of date on the most
    /// recent fetch.
    pub fn is_outdated(&self) -> bool {
        self.is_outdated
    }

    /// Raw `Last-Modified` header value from the most recent fetch.
    pub fn last_modified(&self) -> Option<&str> {
        self.last_modified.as_deref()
    }

    /// `Last-Modified` from the most recent fetch, parsed as an RFC 2822
    /// timestamp. `None` when absent or unparseable.
    pub fn last_modified_time(&self) -> Option<DateTime<FixedOffset>> {
        self.last_modified
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc2822(raw).ok())
    }

    /// Fetches the dataset with the current query configuration.
    ///
    /// Issues one request to the resource endpoint and, when the client was
    /// constructed with `include_metadata`, a second sequential request to
    /// the metadata endpoint. Any transport, status, or parse failure is
    /// returned immediately; nothing is retried. A failed primary request
    /// never triggers the metadata request.
    pub async fn get(&mut self) -> Result<FetchedResult, Error> {
        let url = Url::parse(&self.request_url()).map_err(|e| {
            tracing::error!("Invalid URL constructed: {}", e);
            Error::InvalidArgument(format!("invalid request URL: {e}"))
        })?;
        tracing::debug!(%url, "fetching dataset resource");

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                tracing::error!("Failed to build HTTP client: {}", e);
                Error::Transport(e)
            })?;
        let resp = http
            .get(url)
            .header("accept", "application/json, text/csv, */*")
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to get resource: {}", e);
                Error::Transport(e)
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.map_err(Error::Transport)?;
            let snippet = truncate_body(&body);
            tracing::error!("Request failed with status {}: {}", status, snippet);
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body: snippet,
            });
        }

        let fields = parse_fields_header(resp.headers())?;
        self.is_outdated = resp
            .headers()
            .get(OUT_OF_DATE_HEADER)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.eq_ignore_ascii_case("true"));
        self.last_modified = resp
            .headers()
            .get(reqwest::header::LAST_MODIFIED)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = resp.text().await.map_err(|e| {
            tracing::error!("Failed to read response body: {}", e);
            Error::Transport(e)
        })?;

        let metadata = if self.include_metadata {
            self.fetch_metadata(&http).await?
        } else {
            serde_json::Value::Null
        };

        let data = match self.query.output() {
            OutputFormat::Csv => Payload::Csv(body),
            OutputFormat::Json => {
                let rows = serde_json::from_str(&body).map_err(|e| {
                    let snippet = truncate_body(&body);
                    tracing::error!("Failed to parse resource: {} | body: {}", e, snippet);
                    Error::Parse(e)
                })?;
                Payload::Rows(rows)
            }
        };

        if self.is_outdated {
            tracing::warn!(
                resource_id = self.query.resource_id(),
                "dataset reported as out of date by the portal"
            );
        }

        Ok(FetchedResult {
            data,
            fields,
            metadata,
        })
    }

    /// Fetches the dataset's metadata document from the portal's views
    /// endpoint.
    async fn fetch_metadata(&self, http: &reqwest::Client) -> Result<serde_json::Value, Error> {
        let url = format!(
            "{}/api/views/{}.json",
            self.base_api_url,
            self.query.resource_id()
        );
        let resp = http.get(&url).send().await.map_err(|e| {
            tracing::error!("Failed to get metadata: {}", e);
            Error::Transport(e)
        })?;

        let status = resp.status();
        let body = resp.text().await.map_err(Error::Transport)?;
        if !status.is_success() {
            let snippet = truncate_body(&body);
            tracing::error!("Metadata request failed with status {}: {}", status, snippet);
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body: snippet,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse metadata: {}", e);
            Error::Parse(e)
        })
    }
}

/// Parses the comma-separated column listing from the `X-SODA2-Fields`
/// header. Some portals render the header as a JSON array, so surrounding
/// brackets and quotes are stripped from each name.
fn parse_fields_header(headers: &HeaderMap) -> Result<Vec<String>, Error> {
    let raw = headers
        .get(FIELDS_HEADER)
        .ok_or(Error::MalformedHeader {
            header: "X-SODA2-Fields",
        })?
        .to_str()
        .map_err(|_| Error::MalformedHeader {
            header: "X-SODA2-Fields",
        })?;

    let fields: Vec<String> = raw
        .trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .split(',')
        .map(|name| name.trim().trim_matches('"').to_string())
        .filter(|name| !name.is_empty())
        .collect();
    if fields.is_empty() {
        return Err(Error::MalformedHeader {
            header: "X-SODA2-Fields",
        });
    }
    Ok(fields)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 2000;
    if body.len() <= MAX {
        body.to_string()
    } else {
        format!("{}...[truncated]", &body[..MAX])
    }
}

#[cfg(test)]
mod tests {
    use super::parse_fields_header;
    use reqwest::header::HeaderMap;

    #[test]
    fn fields_header_plain_list() {
        let mut headers = HeaderMap::new();
        headers.insert("x-soda2-fields", "a,b,c".parse().unwrap());
        assert_eq!(parse_fields_header(&headers).unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn fields_header_json_array_rendition() {
        let mut headers = HeaderMap::new();
        headers.insert("x-soda2-fields", r#"[":id","name","state"]"#.parse().unwrap());
        assert_eq!(
            parse_fields_header(&headers).unwrap(),
            vec![":id", "name", "state"]
        );
    }

    #[test]
    fn fields_header_missing_is_an_error() {
        let headers = HeaderMap::new();
        assert!(parse_fields_header(&headers).is_err());
    }

    #[test]
    fn fields_header_empty_is_an_error() {
        let mut headers = HeaderMap::new();
        headers.insert("x-soda2-fields", "".parse().unwrap());
        assert!(parse_fields_header(&headers).is_err());
    }
}

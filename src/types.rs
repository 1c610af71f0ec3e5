//! Result and option types returned by or passed to [`crate::Client`].

use serde::Serialize;

/// Response format requested from the resource endpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Rows as a JSON array of objects. This is the default.
    #[default]
    Json,
    /// Rows as raw CSV text.
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        })
    }
}

/// Construction options for [`crate::Client`].
#[derive(Clone, Copy, Debug, Default)]
pub struct Options {
    /// Response format for the resource endpoint. Defaults to JSON.
    pub output: OutputFormat,
    /// Also fetch the dataset's metadata document on every `get`.
    pub include_metadata: bool,
}

/// Response body, parsed according to the requested [`OutputFormat`].
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    /// Parsed JSON rows.
    Rows(serde_json::Value),
    /// Raw CSV text, unparsed.
    Csv(String),
}

/// Normalized result of one [`crate::Client::get`] call.
#[derive(Clone, Debug, Serialize)]
pub struct FetchedResult {
    /// Row data in the requested format.
    pub data: Payload,
    /// Column names, in dataset order, from the `X-SODA2-Fields` header.
    pub fields: Vec<String>,
    /// Dataset metadata document. `Null` unless `include_metadata` was set.
    pub metadata: serde_json::Value,
}

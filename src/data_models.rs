use std::process::ExitStatus;

use serde::{Deserialize, Serialize};

/// A search query exactly as the caller sent it.
///
/// No trimming or validation happens here; an absent `query` parameter
/// becomes the empty string and is forwarded like any other value.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    #[serde(default)]
    pub query: String,
}

impl Query {
    pub fn new(query: impl Into<String>) -> Query {
        Query {
            query: query.into(),
        }
    }

    /// Picks the first `query` pair out of a decoded query string. Repeats
    /// and unrelated parameters are ignored.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Query {
        pairs
            .into_iter()
            .find(|(key, _)| key == "query")
            .map(|(_, value)| Query::new(value))
            .unwrap_or_default()
    }

    pub fn as_str(&self) -> &str {
        &self.query
    }
}

/// Whatever JSON value the resolver printed on its first line.
/// Usually an array of link strings or `{title, url, snippet, distance}` objects.
pub type LinkResult = serde_json::Value;

/// Captured result of a single resolver run.
#[derive(Debug, Clone)]
pub struct ResolverOutput {
    pub status: ExitStatus,
    pub lines: Vec<String>,
    pub stderr: String,
}

impl ResolverOutput {
    pub fn new(status: ExitStatus, stdout: &[u8], stderr: &[u8]) -> ResolverOutput {
        // `lines` drops the trailing empty line and strips `\r`.
        let lines = String::from_utf8_lossy(stdout)
            .lines()
            .map(|l| l.to_string())
            .collect();
        ResolverOutput {
            status,
            lines,
            stderr: String::from_utf8_lossy(stderr).trim_end().to_string(),
        }
    }

    pub fn first_line(&self) -> Option<&str> {
        self.lines.first().map(|l| l.as_str())
    }
}

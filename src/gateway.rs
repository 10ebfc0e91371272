use crate::data_models::{LinkResult, ResolverOutput};
use crate::error::GatewayError;
use crate::resolver::LinkResolver;

/// Turns a query into links by running the resolver once and reading the
/// first line it prints.
pub struct QueryGateway {
    resolver: LinkResolver,
}

impl QueryGateway {
    pub fn new(resolver: LinkResolver) -> Self {
        Self { resolver }
    }

    pub async fn handle(&self, query: &str) -> Result<LinkResult, GatewayError> {
        tracing::info!(query, "received query");

        let output = self.resolver.run(query).await.inspect_err(|e| {
            tracing::error!(query, error = %e, "error running resolver");
        })?;

        tracing::info!(query, lines = ?output.lines, "resolver raw output");

        let links = parse_links(&output).inspect_err(|e| {
            tracing::error!(query, error = %e, "error reading resolver output");
        })?;

        tracing::info!(query, %links, "parsed links");
        Ok(links)
    }
}

/// Only the first line is the payload. Anything after it is ignored.
pub fn parse_links(output: &ResolverOutput) -> Result<LinkResult, GatewayError> {
    let first = output.first_line().ok_or(GatewayError::EmptyOutput)?;
    let links = serde_json::from_str(first)?;
    Ok(links)
}

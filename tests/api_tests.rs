use anyhow::Result;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower::ServiceExt;

use delve::api::create_router;
use delve::config::ResolverConfig;
use delve::gateway::QueryGateway;
use delve::resolver::LinkResolver;

mod test_helpers {
    use super::*;
    use tempfile::TempDir;

    /// Resolver whose behaviour is picked by the query itself, so one router
    /// can exercise every outcome.
    pub const SCRIPTED_RESOLVER: &str = r#"#!/bin/sh
case "$1" in
  fail) echo '["http://ignored.com"]'; exit 2 ;;
  empty) exit 0 ;;
  garbage) echo 'not-json' ;;
  slow-*) sleep 1; printf '["%s"]\n' "$1" ;;
  *) printf '["http://a.com/%s","http://b.com/%s"]\n' "$1" "$1" ;;
esac
"#;

    pub fn test_app() -> Result<(Router, TempDir)> {
        let dir = tempfile::tempdir()?;
        std::fs::write(dir.path().join("resolver.sh"), SCRIPTED_RESOLVER)?;
        let gateway = QueryGateway::new(LinkResolver::new(ResolverConfig {
            interpreter: PathBuf::from("sh"),
            script_dir: dir.path().to_path_buf(),
            script: "resolver.sh".to_string(),
            timeout: Some(Duration::from_secs(30)),
        }));
        Ok((create_router(Arc::new(gateway)), dir))
    }

    pub async fn get(app: &Router, uri: impl AsRef<str>) -> Result<(StatusCode, Value)> {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri.as_ref()).body(Body::empty())?)
            .await?;
        let status = response.status();
        let bytes = response.into_body().collect().await?.to_bytes();
        let body: Value = serde_json::from_slice(&bytes)?;
        Ok((status, body))
    }
}

use test_helpers::*;

#[tokio::test]
async fn test_query_success() -> Result<()> {
    let (app, _dir) = test_app()?;

    let (status, body) = get(&app, "/query?query=lambda").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"links": ["http://a.com/lambda", "http://b.com/lambda"]})
    );
    Ok(())
}

#[tokio::test]
async fn test_query_is_url_decoded() -> Result<()> {
    let (app, _dir) = test_app()?;

    let (status, body) = get(&app, "/query?query=s3%20bucket").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["links"][0], "http://a.com/s3 bucket");
    Ok(())
}

#[tokio::test]
async fn test_missing_query_param_is_forwarded_as_empty() -> Result<()> {
    let (app, _dir) = test_app()?;

    let (status, body) = get(&app, "/query").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"links": ["http://a.com/", "http://b.com/"]}));
    Ok(())
}

#[tokio::test]
async fn test_repeated_query_param_uses_first() -> Result<()> {
    let (app, _dir) = test_app()?;

    let (status, body) = get(&app, "/query?query=a&query=b").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"links": ["http://a.com/a", "http://b.com/a"]}));

    let (status, body) = get(&app, "/query?page=2&query=fail&query=ok").await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Error executing Python script"}));
    Ok(())
}

#[tokio::test]
async fn test_execution_error_response() -> Result<()> {
    let (app, _dir) = test_app()?;

    let (status, body) = get(&app, "/query?query=fail").await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Error executing Python script"}));
    Ok(())
}

#[tokio::test]
async fn test_empty_output_response() -> Result<()> {
    let (app, _dir) = test_app()?;

    let (status, body) = get(&app, "/query?query=empty").await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "No results from Python script"}));
    Ok(())
}

#[tokio::test]
async fn test_malformed_output_response() -> Result<()> {
    let (app, _dir) = test_app()?;

    let (status, body) = get(&app, "/query?query=garbage").await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Error parsing Python script output"}));
    Ok(())
}

#[tokio::test]
async fn test_server_keeps_serving_after_failures() -> Result<()> {
    let (app, _dir) = test_app()?;

    for failing in ["fail", "empty", "garbage"] {
        let (status, _) = get(&app, &format!("/query?query={failing}")).await?;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let (status, body) = get(&app, "/query?query=ok").await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["links"][0], "http://a.com/ok");
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_queries_do_not_interfere() -> Result<()> {
    let (app, _dir) = test_app()?;
    let queries: Vec<String> = (0..8).map(|i| format!("slow-{i}")).collect();

    let start = Instant::now();
    let responses = futures::future::join_all(
        queries
            .iter()
            .map(|q| get(&app, format!("/query?query={q}")))
            .collect::<Vec<_>>(),
    )
    .await;

    for (query, response) in queries.iter().zip(responses) {
        let (status, body) = response?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"links": [query]}));
    }
    // eight one-second resolvers must overlap rather than queue
    assert!(start.elapsed() < Duration::from_secs(6));
    Ok(())
}

#[tokio::test]
async fn test_unknown_route_is_not_found() -> Result<()> {
    let (app, _dir) = test_app()?;

    let response = app
        .oneshot(Request::builder().uri("/api/search").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_cors_headers_present() -> Result<()> {
    let (app, _dir) = test_app()?;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/query?query=ok")
                .header("origin", "http://localhost:3000")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .map(|v| v.as_bytes()),
        Some(&b"*"[..])
    );
    Ok(())
}

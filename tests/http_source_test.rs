//! End-to-end tests of the HTTP parameter source against a local mock server.

mod common;

use std::time::Duration;

use common::{error_body, named, page_body, recording_callback};
use paramstore::adapters::{HttpParameterSource, ReqwestHttpClient};
use paramstore::error::RetrievalError;
use paramstore::paramstore::{strip_prefix, ParamStore, ParamStoreConfig};
use paramstore::traits::{PageRequest, ParameterSource};
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, body_string_contains, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn store_for(server: &MockServer) -> ParamStore {
    let config = ParamStoreConfig::new()
        .with_path("/app")
        .with_endpoint(server.uri())
        .with_decryption(true)
        .with_recursive(true)
        .with_watch_interval(Duration::from_millis(200));
    ParamStore::new(config, Some(strip_prefix("/app/"))).unwrap()
}

#[tokio::test]
async fn test_read_follows_next_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_partial_json(json!({ "NextToken": "page-2" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(page_body(&[named("/app/db/port", "5432")], None)),
        )
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/"))
        .and(header("x-amz-target", "AmazonSSM.GetParametersByPath"))
        .and(header("content-type", "application/x-amz-json-1.1"))
        .and(body_partial_json(json!({
            "Path": "/app",
            "WithDecryption": true,
            "Recursive": true
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(page_body(&[named("/app/db/host", "db.internal")], Some("page-2"))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = store_for(&server).read().await.unwrap();

    assert_eq!(
        Value::Object(config),
        json!({ "db": { "host": "db.internal", "port": "5432" } })
    );
}

#[tokio::test]
async fn test_throttling_surfaces_as_retryable_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(error_body("ThrottlingException", "Rate exceeded")),
        )
        .mount(&server)
        .await;

    let err = store_for(&server).read().await.unwrap_err();

    assert!(err.is_retryable());
    assert_eq!(
        err.as_retrieval(),
        Some(&RetrievalError::Throttled {
            message: "Rate exceeded".to_string()
        })
    );
}

#[tokio::test]
async fn test_access_denied_is_not_retryable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(error_body(
            "com.amazonaws.ssm#AccessDeniedException",
            "User is not authorized",
        )))
        .mount(&server)
        .await;

    let source = HttpParameterSource::new(ReqwestHttpClient::new(), server.uri());
    let err = source.fetch_page(&PageRequest::new("/app")).await.unwrap_err();

    assert!(err.is_auth());
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_unreachable_endpoint_is_connection_failure() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let uri = format!("http://{}/", listener.local_addr().unwrap());
    drop(listener);

    let source = HttpParameterSource::new(
        ReqwestHttpClient::with_timeout(Duration::from_secs(2)),
        uri.clone(),
    );
    let err = source.fetch_page(&PageRequest::new("/app")).await.unwrap_err();

    assert!(matches!(
        err,
        RetrievalError::ConnectionFailed { ref endpoint, .. } if *endpoint == uri
    ) || matches!(err, RetrievalError::Timeout { .. }));
}

#[tokio::test]
async fn test_watch_reports_version_bump_over_http() {
    let server = MockServer::start().await;
    let mut v1 = named("/app/feature", "off");
    v1.version = 1;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(&[v1.clone()], None)))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    let store = store_for(&server);
    store.read().await.unwrap();

    let mut v2 = v1.clone();
    v2.value = "on".to_string();
    v2.version = 2;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(&[v2.clone()], None)))
        .mount(&server)
        .await;

    let (callback, seen) = recording_callback();
    let handle = store.watch(callback).unwrap();
    tokio::time::sleep(Duration::from_millis(500)).await;
    handle.stop().await;

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1, "only the first tick after the bump reports");
    assert_eq!(seen[0].as_ref().unwrap().parameters, vec![v2]);
}

#[tokio::test]
async fn test_static_keys_sign_every_page() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .and(header_exists("authorization"))
        .and(header_exists("x-amz-date"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page_body(&[named("/app/region", "eu")], None)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = ParamStoreConfig::new()
        .with_path("/app")
        .with_endpoint(server.uri())
        .with_region("eu-west-1")
        .with_credentials("AKIDEXAMPLE", "secret");
    let store = ParamStore::new(config, Some(strip_prefix("/app/"))).unwrap();

    store.read().await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let auth = requests[0].headers.get("authorization").unwrap().to_str().unwrap();
    assert!(auth.starts_with("AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/"));
    assert!(auth.contains("/eu-west-1/ssm/aws4_request"));
}

#[tokio::test]
async fn test_role_session_signs_store_requests() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/sts/"))
        .and(body_string_contains("Action=AssumeRole"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "AssumeRoleResponse": {
                "AssumeRoleResult": {
                    "Credentials": {
                        "AccessKeyId": "ASIASESSION",
                        "SecretAccessKey": "session-secret",
                        "SessionToken": "session-token",
                        "Expiration": 4_102_444_800u64
                    }
                }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/"))
        .and(header("x-amz-security-token", "session-token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page_body(&[named("/app/mode", "ro")], None)),
        )
        .expect(2)
        .mount(&server)
        .await;

    let config = ParamStoreConfig::new()
        .with_path("/app")
        .with_endpoint(server.uri())
        .with_sts_endpoint(format!("{}/sts/", server.uri()))
        .with_credentials("AKIDBASE", "base-secret")
        .with_role_arn("arn:aws:iam::123456789012:role/config-reader");
    let store = ParamStore::new(config, Some(strip_prefix("/app/"))).unwrap();

    store.read().await.unwrap();
    let settings = store.read().await.unwrap();

    assert_eq!(Value::Object(settings), json!({ "mode": "ro" }));
    let store_auth: Vec<String> = server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.url.path() == "/")
        .filter_map(|r| r.headers.get("authorization").and_then(|v| v.to_str().ok().map(String::from)))
        .collect();
    assert_eq!(store_auth.len(), 2);
    assert!(store_auth.iter().all(|a| a.contains("Credential=ASIASESSION/")));
}

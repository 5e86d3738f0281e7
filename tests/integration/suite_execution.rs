//! Integration tests for suite execution
//!
//! Covers ordering, value extraction across tests, comparison failures and
//! suite validation, first through the mock transport and then over real HTTP.

use super::server::{Route, TestServer};
use super::{suite, MockTransport};
use apirunner::{
    execute_suite, run_suite_file, ReqwestTransport, RunConfig, RunnerError, TestStatus,
};
use serde_json::json;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

fn config() -> RunConfig {
    RunConfig {
        base_url: "http://api.test".to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_single_passing_test() {
    let transport =
        MockTransport::new().on_json("GET", "http://api.test/users/1", 200, json!({"id": 1, "name": "name"}));
    let spec = suite(json!({"tests": [{
        "name": "A",
        "request": {"method": "GET", "url": "/users/1"},
        "expectedResponse": {"statusCode": 200, "body": {"id": 1, "name": "name"}}
    }]}));

    let result = execute_suite(&spec, "users.json", &config(), &transport).await;

    assert_eq!(result.total_tests, 1);
    assert_eq!(result.passed.len(), 1);
    assert!(result.all_passed());
}

#[tokio::test]
async fn test_extracted_value_used_in_later_url() {
    let transport = MockTransport::new()
        .on_json("POST", "http://api.test/users", 200, json!({"userId": "user_1"}))
        .on_json("GET", "http://api.test/users/user_1", 200, json!({"userId": "user_1"}));
    let spec = suite(json!({"tests": [
        {
            "name": "A",
            "request": {"method": "POST", "url": "/users", "body": {"email": "a@b.c"}},
            "expectedResponse": {"statusCode": 200, "body": {"userId": "{{ A.userId }}"}}
        },
        {
            "name": "B",
            "request": {"method": "GET", "url": "/users/{{ A.userId }}"},
            "expectedResponse": {"statusCode": 200, "body": {"userId": "{{ A.userId }}"}}
        }
    ]}));

    let result = execute_suite(&spec, "users.json", &config(), &transport).await;

    assert_eq!(result.passed.len(), 2, "{:?}", result.failed);
    assert!(transport.urls()[1].contains("user_1"));
    assert_eq!(transport.requests()[0].body, r#"{"email":"a@b.c"}"#);
}

#[tokio::test]
async fn test_unknown_template_variable_fails() {
    let transport =
        MockTransport::new().on_json("POST", "http://api.test/users", 200, json!({"userId": "user_1"}));
    let spec = suite(json!({"tests": [
        {
            "name": "A",
            "request": {"method": "POST", "url": "/users"},
            "expectedResponse": {"statusCode": 200, "body": {"userId": "user_1"}}
        },
        {
            "name": "B",
            "request": {"method": "GET", "url": "/users/{{ A.userIdWrongVar }}"},
            "expectedResponse": {"statusCode": 200}
        }
    ]}));

    let result = execute_suite(&spec, "users.json", &config(), &transport).await;

    assert_eq!(result.passed.len(), 1);
    assert_eq!(result.failed.len(), 1);
    assert_eq!(
        result.failed[0].errors,
        vec!["missing template value for var: 'A.userIdWrongVar'"]
    );
    assert_eq!(transport.requests().len(), 1);
}

#[tokio::test]
async fn test_forward_reference_fails() {
    let transport = MockTransport::new()
        .on_json("GET", "http://api.test/a", 200, json!({"id": 1}));
    let spec = suite(json!({"tests": [
        {
            "name": "first",
            "request": {"method": "GET", "url": "/items/{{ second.id }}"},
            "expectedResponse": {"statusCode": 200}
        },
        {
            "name": "second",
            "request": {"method": "GET", "url": "/a"},
            "expectedResponse": {"statusCode": 200, "body": {"id": 1}}
        }
    ]}));

    let result = execute_suite(&spec, "order.json", &config(), &transport).await;

    let names: Vec<_> = result.ordered.iter().map(|r| (r.name.as_str(), r.status)).collect();
    assert_eq!(
        names,
        vec![("first", TestStatus::Failed), ("second", TestStatus::Passed)]
    );
}

#[tokio::test]
async fn test_array_length_mismatch_is_one_error() {
    let transport =
        MockTransport::new().on_json("GET", "http://api.test/items", 200, json!([{"id": 1}]));
    let spec = suite(json!({"tests": [{
        "name": "list",
        "request": {"method": "GET", "url": "/items"},
        "expectedResponse": {"statusCode": 200, "body": [{"id": 1}, {"id": 2}]}
    }]}));

    let result = execute_suite(&spec, "items.json", &config(), &transport).await;

    let errors = &result.failed[0].errors;
    assert_eq!(
        errors[0],
        "The number of array elements in response and expectedResponse don't match"
    );
    assert!(errors[1].starts_with("Full response payload from server: "));
    assert_eq!(errors.len(), 2);
}

#[tokio::test]
async fn test_unexpected_body_fails() {
    let transport =
        MockTransport::new().on_json("DELETE", "http://api.test/users/1", 200, json!({"id": 1}));
    let spec = suite(json!({"tests": [{
        "name": "remove",
        "request": {"method": "DELETE", "url": "/users/1"},
        "expectedResponse": {"statusCode": 200}
    }]}));

    let result = execute_suite(&spec, "users.json", &config(), &transport).await;

    assert_eq!(result.failed.len(), 1);
}

#[tokio::test]
async fn test_duplicate_names_fail_before_any_request() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dupes.json");
    fs::write(
        &path,
        json!({"tests": [
            {"name": "A", "request": {"method": "GET", "url": "/a"}, "expectedResponse": {"statusCode": 200}},
            {"name": "A", "request": {"method": "GET", "url": "/b"}, "expectedResponse": {"statusCode": 200}}
        ]})
        .to_string(),
    )
    .unwrap();
    let transport = MockTransport::new();

    let err = run_suite_file(&path, &config(), &transport).await.unwrap_err();

    assert!(matches!(err, RunnerError::DuplicateTestName(ref name) if name == "A"));
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_skip_flags() {
    let transport = MockTransport::new().on_json("GET", "http://api.test/a", 200, json!({}));
    let spec = suite(json!({"tests": [
        {"name": "a", "request": {"method": "GET", "url": "/a"}, "expectedResponse": {"statusCode": 200, "body": {}}},
        {"name": "b", "skip": true, "request": {"method": "GET", "url": "/b"}}
    ]}));

    let result = execute_suite(&spec, "skip.json", &config(), &transport).await;
    assert_eq!(result.passed.len(), 1);
    assert_eq!(result.skipped.len(), 1);

    let mut skipped_suite = spec.clone();
    skipped_suite.skip = true;
    let result = execute_suite(&skipped_suite, "skip.json", &config(), &transport).await;
    assert_eq!(result.skipped.len(), 2);
    assert_eq!(result.total_tests, 2);
    assert_eq!(transport.requests().len(), 1);
}

#[tokio::test]
async fn test_ignored_fields_in_suite() {
    let transport = MockTransport::new().on_json(
        "GET",
        "http://api.test/things/1",
        200,
        json!({
            "id": 1,
            "createdAt": "2023-04-05T12:38:54.038Z",
            "owner": {"id": 9, "createdAt": "2023-04-05T12:38:54.038Z"}
        }),
    );
    let spec = suite(json!({
        "ignoredFields": ["createdAt"],
        "tests": [{
            "name": "thing",
            "request": {"method": "GET", "url": "/things/1"},
            "expectedResponse": {"statusCode": 200, "body": {
                "id": 1,
                "createdAt": "2000-01-01T00:00:00Z",
                "owner": {"id": 9}
            }}
        }]
    }));

    let result = execute_suite(&spec, "things.json", &config(), &transport).await;
    assert!(result.all_passed(), "{:?}", result.failed);
}

#[tokio::test]
async fn test_suite_base_url_and_custom_headers() {
    let transport = MockTransport::new().on_json("GET", "http://suite.test/ping", 200, json!({"ok": true}));
    let spec = suite(json!({
        "baseUrl": "http://suite.test",
        "tests": [{
            "name": "ping",
            "request": {"method": "GET", "url": "/ping", "headers": {"X-Trace": "t1"}},
            "expectedResponse": {"statusCode": 200, "body": {"ok": true}}
        }]
    }));
    let mut run_config = config();
    run_config.api_key = Some("secret".to_string());

    let result = execute_suite(&spec, "ping.json", &run_config, &transport).await;

    assert!(result.all_passed(), "{:?}", result.failed);
    let request = &transport.requests()[0];
    assert_eq!(request.header("authorization"), Some("ApiKey secret"));
    assert_eq!(request.header("x-trace"), Some("t1"));
}

#[tokio::test]
async fn test_transport_failure_fails_every_test() {
    let transport = MockTransport::new().with_failure(true);
    let spec = suite(json!({"tests": [
        {"name": "a", "request": {"method": "GET", "url": "/a"}, "expectedResponse": {"statusCode": 200}},
        {"name": "b", "request": {"method": "GET", "url": "/b"}, "expectedResponse": {"statusCode": 200}}
    ]}));

    let result = execute_suite(&spec, "down.json", &config(), &transport).await;

    assert_eq!(result.failed.len(), 2);
    assert_eq!(
        result.failed[0].errors,
        vec!["Error making request: dial tcp: connection refused"]
    );
}

#[tokio::test]
async fn test_header_values_chain_between_tests_over_http() {
    let server = TestServer::start(vec![
        (
            "POST /users",
            Route::status(201)
                .json(json!({"userId": "user_42", "email": "a@b.c"}))
                .header("Warrant-Token", "token-1"),
        ),
        (
            "GET /users/user_42",
            Route::status(200).json(json!({"userId": "user_42", "email": "a@b.c"})),
        ),
    ]);
    let spec = suite(json!({"tests": [
        {
            "name": "createUser",
            "request": {"method": "POST", "url": "/users", "body": {"email": "a@b.c"}},
            "expectedResponse": {
                "statusCode": 201,
                "headers": {"warrant-token": "token-1"},
                "body": {"userId": "{{ createUser.userId }}", "email": "{{ createUser.request.body.email }}"}
            }
        },
        {
            "name": "getUser",
            "request": {
                "method": "GET",
                "url": "/users/{{ createUser.userId }}",
                "headers": {"Warrant-Token": "{{ createUser.header.Warrant-Token }}"}
            },
            "expectedResponse": {"statusCode": 200, "body": {"userId": "user_42", "email": "a@b.c"}}
        }
    ]}));
    let run_config = RunConfig {
        base_url: server.base_url.clone(),
        timeout_secs: Some(5),
        ..Default::default()
    };
    let transport = ReqwestTransport::new(run_config.timeout()).unwrap();

    let result = execute_suite(&spec, "users.json", &run_config, &transport).await;

    assert!(result.all_passed(), "{:?}", result.failed);
    let received = server.received();
    assert_eq!(received[0].body, r#"{"email":"a@b.c"}"#);
    assert_eq!(received[0].header("content-type"), Some("application/json"));
    assert_eq!(received[1].path, "/users/user_42");
    assert_eq!(received[1].header("warrant-token"), Some("token-1"));
}

#[tokio::test]
async fn test_status_mismatch_over_http() {
    let server = TestServer::start(vec![]);
    let spec = suite(json!({"tests": [{
        "name": "missing",
        "request": {"method": "GET", "url": "/nothing"},
        "expectedResponse": {"statusCode": 200, "body": {"message": "not found"}}
    }]}));
    let run_config = RunConfig {
        base_url: server.base_url.clone(),
        ..Default::default()
    };
    let transport = ReqwestTransport::new(Some(Duration::from_secs(5))).unwrap();

    let result = execute_suite(&spec, "missing.json", &run_config, &transport).await;

    assert_eq!(
        result.failed[0].errors[0],
        "Expected http 200 but got http 404"
    );
    assert_eq!(result.failed[0].errors.len(), 2);
}

#[tokio::test]
async fn test_connection_refused_over_http() {
    let spec = suite(json!({"tests": [{
        "name": "down",
        "request": {"method": "GET", "url": "/"},
        "expectedResponse": {"statusCode": 200}
    }]}));
    let run_config = RunConfig {
        base_url: "http://127.0.0.1:1".to_string(),
        ..Default::default()
    };
    let transport = ReqwestTransport::new(Some(Duration::from_secs(5))).unwrap();

    let result = execute_suite(&spec, "down.json", &run_config, &transport).await;

    assert!(result.failed[0].errors[0].starts_with("Error making request: "));
}

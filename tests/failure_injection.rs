//! Failure injection tests against a real socket.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use hospital_client::resources::Blog;
use hospital_client::{ApiClient, ApiError, Credentials, Role};

mod common;

const BLOGS: &str = r#"{"success":true,"data":[{"_id":"b1","title":"Flu season","content":"..."}]}"#;

#[tokio::test]
async fn test_retry_on_503_then_success() {
    let calls = Arc::new(AtomicU32::new(0));
    let c = calls.clone();
    let addr = common::start_programmable_backend(move |_| {
        let c = c.clone();
        async move {
            if c.fetch_add(1, Ordering::SeqCst) < 2 {
                (503, r#"{"message":"Database not connected"}"#.into())
            } else {
                (200, BLOGS.into())
            }
        }
    })
    .await;

    let client = common::client_for(addr);
    let blogs = client.resource::<Blog>().list().await.expect("should succeed after retries");

    assert_eq!(blogs[0].title, "Flu season");
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(client.status().consecutive_failures, 0);
    assert!(client.status().is_online);
}

#[tokio::test]
async fn test_database_outage_recovers_through_reconnect() {
    let reconnected = Arc::new(AtomicBool::new(false));
    let blog_calls = Arc::new(AtomicU32::new(0));
    let reconnect_calls = Arc::new(AtomicU32::new(0));

    let (r, b, rc) = (reconnected.clone(), blog_calls.clone(), reconnect_calls.clone());
    let addr = common::start_programmable_backend(move |req| {
        let (r, b, rc) = (r.clone(), b.clone(), rc.clone());
        async move {
            match req.path.as_str() {
                "/api/db-reconnect" => {
                    rc.fetch_add(1, Ordering::SeqCst);
                    r.store(true, Ordering::SeqCst);
                    (200, r#"{"success":true,"message":"Reconnected"}"#.into())
                }
                "/api/blogs" => {
                    b.fetch_add(1, Ordering::SeqCst);
                    if r.load(Ordering::SeqCst) {
                        (200, BLOGS.into())
                    } else {
                        (503, "{}".into())
                    }
                }
                _ => (404, "{}".into()),
            }
        }
    })
    .await;

    let client = common::client_for(addr);
    let blogs = client.resource::<Blog>().list().await.expect("replayed call should succeed");

    assert_eq!(blogs.len(), 1);
    assert_eq!(blog_calls.load(Ordering::SeqCst), 4);
    assert_eq!(reconnect_calls.load(Ordering::SeqCst), 1);

    let status = client.status();
    assert!(status.db_connected);
    assert_eq!(status.consecutive_failures, 0);
}

#[tokio::test]
async fn test_failed_reconnect_surfaces_original_error() {
    let addr = common::start_programmable_backend(|req| async move {
        match req.path.as_str() {
            "/api/db-reconnect" => (500, r#"{"success":false,"message":"still down"}"#.into()),
            _ => (503, "{}".into()),
        }
    })
    .await;

    let client = common::client_for(addr);
    let err = client.get("blogs").await.unwrap_err();

    assert!(matches!(err, ApiError::ServiceUnavailable));
    let status = client.status();
    assert!(!status.db_connected);
    assert_eq!(status.consecutive_failures, 1);
}

#[tokio::test]
async fn test_unauthorized_clears_session() {
    let calls = Arc::new(AtomicU32::new(0));
    let c = calls.clone();
    let addr = common::start_programmable_backend(move |_| {
        let c = c.clone();
        async move {
            c.fetch_add(1, Ordering::SeqCst);
            (401, r#"{"message":"Token expired"}"#.into())
        }
    })
    .await;

    let client = common::client_for(addr);
    client
        .session()
        .login(Credentials {
            token: "stale".into(),
            role: Role::Doctor,
        })
        .unwrap();
    client.session().navigate("/doctor/dashboard");

    let err = client.get("appointments").await.unwrap_err();

    assert!(matches!(err, ApiError::Unauthorized));
    assert_eq!(calls.load(Ordering::SeqCst), 1, "401 must not be retried");
    assert!(client.session().credentials().is_none());
    assert_eq!(client.session().current_route(), "/doctor/login");
    assert_eq!(client.status().consecutive_failures, 0);
}

#[tokio::test]
async fn test_interceptor_headers_and_stable_request_id() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let s = seen.clone();
    let addr = common::start_programmable_backend(move |req| {
        let s = s.clone();
        async move {
            let first = {
                let mut seen = s.lock().unwrap();
                seen.push(req);
                seen.len() == 1
            };
            if first {
                (500, "{}".into())
            } else {
                (200, "[]".into())
            }
        }
    })
    .await;

    let client = common::client_for(addr);
    client
        .session()
        .login(Credentials {
            token: "abc123".into(),
            role: Role::Admin,
        })
        .unwrap();

    client.get("testimonials").await.unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].header("authorization"), Some("Bearer abc123"));
    let id = seen[0].header("x-request-id").expect("request id attached");
    assert_eq!(seen[1].header("x-request-id"), Some(id));
    assert!(seen[0].header("x-request-start").is_some());
}

#[tokio::test]
async fn test_connection_refused_marks_offline() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = common::client_for(addr);
    let err = client.get("doctors").await.unwrap_err();

    assert!(matches!(err, ApiError::Network(_)), "got {:?}", err);
    let status = client.status();
    assert!(!status.is_online);
    assert_eq!(status.consecutive_failures, 1);

    let health = client.check_system_health().await;
    assert!(!health.system);
    assert!(!health.database);
}

#[tokio::test]
async fn test_slow_backend_times_out() {
    let addr = common::start_programmable_backend(|_| async {
        tokio::time::sleep(Duration::from_millis(1500)).await;
        (200, "[]".into())
    })
    .await;

    let mut config = common::local_config(addr);
    config.timeouts.request_secs = 1;
    config.retries.max_attempts = 1;
    let client = ApiClient::from_config(&config).unwrap();

    let err = client.get("events").await.unwrap_err();

    assert!(matches!(err, ApiError::Timeout), "got {:?}", err);
    assert_eq!(client.status().consecutive_failures, 1);
    assert!(client.status().is_online);
}

#[tokio::test]
async fn test_health_endpoints() {
    let addr = common::start_programmable_backend(|req| async move {
        match (req.method.as_str(), req.path.as_str()) {
            ("GET", "/api/health") => (
                200,
                r#"{"status":"OK","database":{"connected":false,"readyState":0}}"#.into(),
            ),
            ("GET", "/api/db-health") => (200, r#"{"isConnected":true,"readyState":1}"#.into()),
            _ => (404, "{}".into()),
        }
    })
    .await;

    let client = common::client_for(addr);

    let system = client.check_system_health().await;
    assert!(system.system);
    assert!(!system.database);
    assert!(!client.status().db_connected);

    let db = client.check_database_health().await;
    assert!(db.is_connected);
    assert_eq!(db.ready_state, 1);
    assert!(client.status().db_connected);
}

#![allow(dead_code)]

use std::time::Duration;
use waygpt::{ClientOptions, ManagementClient, RetryPolicy, WayGptClient};
use wiremock::MockServer;

pub const PROJECT_KEY: &str = "sk_test_key";
pub const PROJECT_ID: &str = "project-1";
pub const HMAC_SECRET: &str = "top-secret";

/// Retries with millisecond delays so tests stay fast.
pub fn fast_retry(max_retries: u32) -> RetryPolicy {
    RetryPolicy::new(max_retries)
        .with_initial_interval(Duration::from_millis(10))
        .with_max_interval(Duration::from_millis(50))
}

pub fn options(server: &MockServer) -> ClientOptions {
    ClientOptions::new()
        .with_base_url(server.uri())
        .with_project_key(PROJECT_KEY)
        .with_signing(false)
        .with_timeout(Duration::from_secs(5))
        .with_retry_policy(fast_retry(3))
}

pub fn client(server: &MockServer) -> WayGptClient {
    WayGptClient::new(options(server)).unwrap()
}

pub fn signed_client(server: &MockServer) -> WayGptClient {
    WayGptClient::new(
        options(server)
            .with_signing(true)
            .with_project_id(PROJECT_ID)
            .with_hmac_secret(HMAC_SECRET),
    )
    .unwrap()
}

pub fn management(server: &MockServer) -> ManagementClient {
    ManagementClient::new(
        ClientOptions::new()
            .with_base_url(server.uri())
            .with_retry_policy(fast_retry(3)),
    )
    .unwrap()
}

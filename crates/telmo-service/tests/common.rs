//! Common test utilities for telmo integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;

use axum::Router;
use axum_test::TestServer;
use serde_json::json;
use tempfile::TempDir;

use telmo_service::{create_router, AppState, ServiceConfig};
use telmo_store::RocksStore;

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// Temporary directory for the database (kept alive for test duration).
    pub _temp_dir: TempDir,
    /// The service API key for provisioning requests.
    pub service_api_key: String,
}

impl TestHarness {
    /// Create a new test harness with a fresh database.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = Arc::new(RocksStore::open(temp_dir.path()).expect("Failed to open store"));

        let service_api_key = "test-service-key".to_string();

        let config = ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            data_dir: temp_dir.path().to_string_lossy().to_string(),
            service_api_key: Some(service_api_key.clone()),
            cors_origins: vec!["*".into()],
            max_body_bytes: 256 * 1024,
            request_timeout_seconds: 30,
        };

        let state = AppState::new(store.clone(), store, config);
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            _temp_dir: temp_dir,
            service_api_key,
        }
    }

    /// Provision an account through the admin endpoint.
    pub async fn seed_account(&self, phone_number: &str, credit: i64, mobile_money: i64) {
        self.server
            .post("/v1/admin/accounts")
            .add_header("x-api-key", &self.service_api_key)
            .json(&json!({
                "phone_number": phone_number,
                "credit_balance": credit,
                "mobile_money_balance": mobile_money
            }))
            .await
            .assert_status_ok();
    }

    /// Seed a catalog plan through the admin endpoint.
    pub async fn seed_plan(
        &self,
        category: &str,
        plan_id: &str,
        name: &str,
        price: i64,
        duration_days: u32,
    ) {
        self.server
            .post("/v1/admin/catalog")
            .add_header("x-api-key", &self.service_api_key)
            .json(&json!({
                "category": category,
                "plan_id": plan_id,
                "name": name,
                "description": format!("{name} plan"),
                "price": price,
                "duration_days": duration_days
            }))
            .await
            .assert_status_ok();
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

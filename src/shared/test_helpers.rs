use std::sync::Arc;
use std::time::Duration;

use axum::{extract::Request, middleware::Next, response::Response, Router};
use axum_test::TestServer;
use serde_json::{json, Value};

use crate::features::auth::model::AuthenticatedUser;
use crate::features::collection_router;
use crate::features::files::AttachmentService;
use crate::modules::records::memory::MemoryRecordStore;
use crate::modules::records::RecordStore;
use crate::modules::storage::MemoryBlobStore;

pub fn test_user() -> AuthenticatedUser {
    AuthenticatedUser {
        subject: "test-subject".to_string(),
        account_id: Some("test-account".to_string()),
        roles: vec!["engineer".to_string()],
    }
}

async fn inject_test_user(mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(test_user());
    next.run(request).await
}

/// Wrap a router so every request arrives authenticated as [`test_user`]
pub fn with_test_auth(router: Router) -> Router {
    router.layer(axum::middleware::from_fn(inject_test_user))
}

/// Collection API over in-memory stores
pub struct TestApp {
    pub server: TestServer,
    pub records: Arc<MemoryRecordStore>,
    pub blobs: Arc<MemoryBlobStore>,
}

pub fn test_app() -> TestApp {
    let records = Arc::new(MemoryRecordStore::new());
    let blobs = Arc::new(MemoryBlobStore::new());
    let record_store: Arc<dyn RecordStore> = records.clone();
    let attachments = Arc::new(AttachmentService::new(
        blobs.clone(),
        record_store.clone(),
        "test",
        Duration::from_secs(5),
    ));
    let router = with_test_auth(collection_router(
        record_store,
        attachments,
        Duration::from_secs(5),
    ));
    let server = TestServer::new(router).expect("test server");
    TestApp {
        server,
        records,
        blobs,
    }
}

/// A complete aircraft create body
pub fn aircraft_body(registration: &str) -> Value {
    json!({
        "registration": registration,
        "manufacturer": "Cessna",
        "type": "Single Piston",
        "model": "172S",
        "msn": format!("MSN-{}", registration),
        "reg_no": format!("REG-{}", registration),
        "base": "Halim",
        "ownership": "Owned",
    })
}

/// Create an aircraft through the API and return its id
pub async fn create_aircraft(app: &TestApp, registration: &str) -> i64 {
    let response = app
        .server
        .post("/api/v1/aircraft")
        .json(&aircraft_body(registration))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<Value>()["id"]
        .as_i64()
        .expect("aircraft id")
}

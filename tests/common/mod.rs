#![allow(dead_code)]

use reqwest::Client;
use sea_orm::{ConnectionTrait, DatabaseConnection, Statement};
use sea_orm_migration::MigratorTrait;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Once;
use tokio::sync::OnceCell;

static INIT: Once = Once::new();
static SCHEMA: OnceCell<()> = OnceCell::const_new();

pub const UPLOAD_DIR: &str = "./test_uploads";

fn init_env() {
    INIT.call_once(|| {
        dotenv::dotenv().ok();
        // Every test shares 127.0.0.1; per-IP limits would trip.
        std::env::set_var("RATE_LIMIT_ENABLED", "false");
    });
}

pub struct TestApp {
    pub addr: String,
    pub db: DatabaseConnection,
    pub client: Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.addr, path)
    }
}

fn database_url() -> String {
    std::env::var("TEST_DATABASE_URL")
        .unwrap_or_else(|_| std::env::var("DATABASE_URL").expect("DATABASE_URL must be set"))
}

/// Migrate and empty the tables once per test binary. Tests then scope
/// their data with unique cities instead of truncating under each other.
async fn prepare_schema(db: &DatabaseConnection) {
    SCHEMA
        .get_or_init(|| async {
            road_report::migration::Migrator::up(db, None)
                .await
                .expect("Failed to run migrations");
            cleanup_tables(db).await;
        })
        .await;
}

pub async fn spawn_app() -> TestApp {
    init_env();

    let db = sea_orm::Database::connect(&database_url())
        .await
        .expect("Failed to connect to test database");
    prepare_schema(&db).await;

    let upload_config = road_report::config::upload::UploadConfig {
        upload_dir: UPLOAD_DIR.to_string(),
        public_base_url: String::new(),
    };

    let app = road_report::create_app(UPLOAD_DIR, tower_http::cors::CorsLayer::permissive())
        .layer(axum::extract::Extension(db.clone()))
        .layer(axum::extract::Extension(upload_config));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    TestApp {
        addr: format!("http://{}", addr),
        db,
        client: Client::new(),
    }
}

async fn cleanup_tables(db: &DatabaseConnection) {
    let tables = ["post_reports", "post_comments", "post_upvotes", "posts"];

    for table in tables {
        let sql = format!("TRUNCATE TABLE {} CASCADE", table);
        let _ = db
            .execute(Statement::from_string(
                sea_orm::DatabaseBackend::Postgres,
                sql,
            ))
            .await;
    }
}

/// A city no other test uses, so location filters isolate a test's posts.
pub fn unique_city() -> String {
    format!("Town {}", uuid::Uuid::new_v4().simple())
}

pub fn post_payload(title: &str, severity: &str, city: &str) -> Value {
    json!({
        "name": "Jane",
        "title": title,
        "severity": severity,
        "state": "CA",
        "city": city,
        "latitude": 37.12,
        "longitude": -122.45,
        "photo_url": "/uploads/post-photos/1-pothole.jpg"
    })
}

/// Create a post and return its JSON representation.
pub async fn create_post(app: &TestApp, title: &str, severity: &str, city: &str) -> Value {
    let resp = app
        .client
        .post(app.url("/posts"))
        .json(&post_payload(title, severity, city))
        .send()
        .await
        .expect("Failed to create post");

    let status = resp.status();
    let body: Value = resp.json().await.expect("Failed to parse response");
    if !body["success"].as_bool().unwrap_or(false) {
        panic!("Failed to create post: status={}, body={}", status, body);
    }
    body["data"].clone()
}

pub fn id_of(post: &Value) -> String {
    post["id"]
        .as_str()
        .expect("Response missing id field")
        .to_string()
}

/// Fetch the feed restricted to one city.
pub async fn feed_in(app: &TestApp, city: &str, extra: &[(&str, &str)]) -> Value {
    let mut query = vec![("location", city)];
    query.extend_from_slice(extra);
    let resp = app
        .client
        .get(app.url("/posts"))
        .query(&query)
        .send()
        .await
        .expect("Failed to list posts");
    assert_eq!(resp.status(), 200);
    resp.json().await.expect("Failed to parse feed")
}

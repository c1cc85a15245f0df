#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use po_upload_api::{
    app_router,
    commands::po_uploads::{CreatePoUploadCommand, PoUploadLineInput},
    config::AppConfig,
    db::{self, DbPool},
    entities::{partner, product_template, product_variant},
    services::po_uploads::{PoUploadDetail, PoUploadService},
    AppState,
};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::Value;
use tower::ServiceExt;

/// Partners every test can use on its lines.
#[derive(Debug, Clone, Copy)]
pub struct Partners {
    pub customer_id: i64,
    pub vendor_id: i64,
    /// A company that is neither customer nor vendor
    pub bystander_id: i64,
}

/// Helper harness for spinning up an application state backed by an in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub partners: Partners,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.auto_migrate = true;
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let partners = Partners {
            customer_id: insert_partner(&pool, "Northwind Retail", true, 1, 0).await,
            vendor_id: insert_partner(&pool, "Sunrise Garments", true, 0, 1).await,
            bystander_id: insert_partner(&pool, "Jane Doe", false, 0, 0).await,
        };

        let state = AppState::new(Arc::new(pool), cfg);
        let router = app_router(state.clone());

        Self {
            router,
            state,
            partners,
        }
    }

    pub fn db(&self) -> &DbPool {
        &self.state.db
    }

    pub fn service(&self) -> &PoUploadService {
        &self.state.po_uploads
    }

    /// Adds a catalog template with one variant; returns (template id, variant id).
    pub async fn catalog_item(&self, style_no: &str, list_price: Decimal) -> (i64, i64) {
        let template = self.catalog_template(style_no, list_price).await;
        let variant = product_variant::ActiveModel {
            product_template_id: Set(template),
            default_code: Set(Some(format!("{style_no}-DEFAULT"))),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db())
        .await
        .expect("insert variant");
        (template, variant.id)
    }

    /// Adds a catalog template without any variant.
    pub async fn catalog_template(&self, style_no: &str, list_price: Decimal) -> i64 {
        product_template::ActiveModel {
            name: Set(format!("Style {style_no}")),
            buyer_style_no: Set(Some(style_no.to_string())),
            list_price: Set(list_price),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.db())
        .await
        .expect("insert template")
        .id
    }

    pub fn line(&self, sku_no: &str, buyer_order_number: Option<&str>) -> PoUploadLineInput {
        PoUploadLineInput {
            customer_id: self.partners.customer_id,
            vendor_id: self.partners.vendor_id,
            buyer_order_number: buyer_order_number.map(str::to_string),
            sku_no: sku_no.to_string(),
            quantity: Decimal::from(2),
            vendor_code: Some("V-01".to_string()),
            order_date: None,
            po_issue_date: None,
            vendor_ex_fact_date: None,
        }
    }

    /// Creates an upload holding `lines` through the service.
    pub async fn upload_with(&self, lines: Vec<PoUploadLineInput>) -> PoUploadDetail {
        self.service()
            .create_upload(CreatePoUploadCommand {
                po_reference: Some("PO-REF-1".to_string()),
                lines,
                ..Default::default()
            })
            .await
            .expect("create upload")
    }

    /// Send a request against the router.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Sends a request and decodes the JSON body.
    pub async fn request_json(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let response = self.request(method, uri, body).await;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("response body is JSON")
        };
        (status, value)
    }
}

async fn insert_partner(
    db: &DbPool,
    name: &str,
    is_company: bool,
    customer_rank: i32,
    supplier_rank: i32,
) -> i64 {
    partner::ActiveModel {
        name: Set(name.to_string()),
        is_company: Set(is_company),
        customer_rank: Set(customer_rank),
        supplier_rank: Set(supplier_rank),
        created_at: Set(Utc::now()),
        updated_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert partner")
    .id
}

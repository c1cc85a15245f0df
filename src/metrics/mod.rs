/*!
 * # Metrics Module
 *
 * Prometheus counters for the PO upload workflow, exposed in text format at
 * `/metrics`.
 */

use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use tracing::warn;

use crate::errors::ServiceError;

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();
    pub static ref PO_UPLOADS_CREATED: IntCounter = counter(
        "po_uploads_created_total",
        "Total number of PO uploads created"
    );
    pub static ref PO_UPLOAD_LINES_ADDED: IntCounter = counter(
        "po_upload_lines_added_total",
        "Total number of PO upload lines added"
    );
    pub static ref PO_UPLOAD_VALIDATIONS: IntCounterVec = counter_vec(
        "po_upload_validations_total",
        "Total number of SKU validation runs by outcome",
        &["outcome"]
    );
    pub static ref PO_UPLOAD_LINES_CHECKED: IntCounterVec = counter_vec(
        "po_upload_lines_checked_total",
        "Total number of PO upload lines checked against the catalog",
        &["validity"]
    );
    pub static ref PO_UPLOAD_CONFIRMATIONS: IntCounter = counter(
        "po_upload_confirmations_total",
        "Total number of PO uploads confirmed"
    );
    pub static ref QUOTATIONS_CREATED: IntCounter = counter(
        "po_upload_quotations_created_total",
        "Total number of quotations generated from PO uploads"
    );
    pub static ref PO_UPLOAD_CANCELLATIONS: IntCounter = counter(
        "po_upload_cancellations_total",
        "Total number of PO uploads cancelled"
    );
    pub static ref PO_UPLOAD_FAILURES: IntCounterVec = counter_vec(
        "po_upload_failures_total",
        "Total number of failed PO upload operations",
        &["operation", "error_type"]
    );
}

fn counter(name: &str, help: &str) -> IntCounter {
    let counter = IntCounter::new(name, help).expect("metric can be created");
    REGISTRY
        .register(Box::new(counter.clone()))
        .expect("metric can be registered");
    counter
}

fn counter_vec(name: &str, help: &str, labels: &[&str]) -> IntCounterVec {
    let counter = IntCounterVec::new(Opts::new(name, help), labels).expect("metric can be created");
    REGISTRY
        .register(Box::new(counter.clone()))
        .expect("metric can be registered");
    counter
}

/// Counts a failed operation under the error's kind.
pub fn record_failure(operation: &str, err: &ServiceError) {
    PO_UPLOAD_FAILURES
        .with_label_values(&[operation, err.kind()])
        .inc();
}

/// Touches every counter so they show up in the export before first use.
pub fn init() {
    lazy_static::initialize(&PO_UPLOADS_CREATED);
    lazy_static::initialize(&PO_UPLOAD_LINES_ADDED);
    lazy_static::initialize(&PO_UPLOAD_VALIDATIONS);
    lazy_static::initialize(&PO_UPLOAD_LINES_CHECKED);
    lazy_static::initialize(&PO_UPLOAD_CONFIRMATIONS);
    lazy_static::initialize(&QUOTATIONS_CREATED);
    lazy_static::initialize(&PO_UPLOAD_CANCELLATIONS);
    lazy_static::initialize(&PO_UPLOAD_FAILURES);
}

/// Renders the registry in the Prometheus text exposition format.
pub fn export_metrics() -> Result<String, ServiceError> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder
        .encode(&REGISTRY.gather(), &mut buffer)
        .map_err(|e| {
            warn!(error = %e, "Failed to encode metrics");
            ServiceError::InternalError(format!("Failed to encode metrics: {}", e))
        })?;
    String::from_utf8(buffer)
        .map_err(|e| ServiceError::InternalError(format!("Metrics are not UTF-8: {}", e)))
}

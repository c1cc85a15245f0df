use crate::{
    commands::Command,
    db::DbPool,
    entities::po_upload_line,
    errors::ServiceError,
    metrics::{record_failure, PO_UPLOAD_LINES_ADDED},
    services::{
        partners::{ensure_customer, ensure_vendor},
        po_uploads::{ensure_lines_editable, find_upload, refresh_sku_status},
    },
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use validator::{Validate, ValidationError};

/// One PO line as submitted by the user.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PoUploadLineInput {
    pub customer_id: i64,
    pub vendor_id: i64,
    #[validate(length(max = 64))]
    pub buyer_order_number: Option<String>,
    #[validate(
        length(min = 1, max = 128, message = "SKU is required"),
        custom = "validate_not_blank"
    )]
    pub sku_no: String,
    #[validate(custom = "validate_positive_quantity")]
    pub quantity: Decimal,
    #[validate(length(max = 64))]
    pub vendor_code: Option<String>,
    pub order_date: Option<NaiveDate>,
    pub po_issue_date: Option<NaiveDate>,
    pub vendor_ex_fact_date: Option<NaiveDate>,
}

pub(crate) fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

pub(crate) fn validate_positive_quantity(quantity: &Decimal) -> Result<(), ValidationError> {
    if *quantity <= Decimal::ZERO {
        return Err(ValidationError::new("quantity_must_be_positive"));
    }
    Ok(())
}

/// Inserts a line for `upload_id` after checking its partners. New lines
/// start out invalid until the next validation run.
pub(crate) async fn insert_line<C>(
    conn: &C,
    upload_id: i64,
    input: &PoUploadLineInput,
) -> Result<po_upload_line::Model, ServiceError>
where
    C: ConnectionTrait,
{
    ensure_customer(conn, input.customer_id).await?;
    ensure_vendor(conn, input.vendor_id).await?;

    let now = Utc::now();
    let line = po_upload_line::ActiveModel {
        upload_id: Set(upload_id),
        customer_id: Set(input.customer_id),
        vendor_id: Set(input.vendor_id),
        sales_order_id: Set(None),
        buyer_order_number: Set(input.buyer_order_number.clone()),
        sku_no: Set(input.sku_no.trim().to_string()),
        quantity: Set(Some(input.quantity)),
        vendor_code: Set(input.vendor_code.clone()),
        order_date: Set(input.order_date),
        po_issue_date: Set(input.po_issue_date),
        vendor_ex_fact_date: Set(input.vendor_ex_fact_date),
        is_valid_sku: Set(false),
        is_invalid_sku: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    Ok(line.insert(conn).await?)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddPoUploadLineCommand {
    pub upload_id: i64,
    pub line: PoUploadLineInput,
}

#[async_trait::async_trait]
impl Command for AddPoUploadLineCommand {
    type Result = po_upload_line::Model;

    #[instrument(skip(self, db_pool), fields(upload_id = self.upload_id))]
    async fn execute(&self, db_pool: Arc<DbPool>) -> Result<Self::Result, ServiceError> {
        self.line.validate().map_err(|e| {
            let err = ServiceError::ValidationError(format!("Invalid line: {}", e));
            record_failure("add_line", &err);
            err
        })?;

        let line = self.add_line(&db_pool).await.map_err(|e| {
            record_failure("add_line", &e);
            error!(upload_id = self.upload_id, error = %e, "Failed to add PO upload line");
            e
        })?;

        PO_UPLOAD_LINES_ADDED.inc();
        info!(
            upload_id = self.upload_id,
            line_id = line.id,
            sku_no = %line.sku_no,
            "PO upload line added"
        );

        Ok(line)
    }
}

impl AddPoUploadLineCommand {
    async fn add_line(&self, db: &DbPool) -> Result<po_upload_line::Model, ServiceError> {
        let txn = db.begin().await?;

        let upload = find_upload(&txn, self.upload_id).await?;
        ensure_lines_editable(&upload)?;

        let line = insert_line(&txn, upload.id, &self.line).await?;
        refresh_sku_status(&txn, upload).await?;

        txn.commit().await?;
        Ok(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;

    fn input(sku_no: &str, quantity: Decimal) -> PoUploadLineInput {
        PoUploadLineInput {
            customer_id: 1,
            vendor_id: 2,
            buyer_order_number: Some("B1".into()),
            sku_no: sku_no.into(),
            quantity,
            vendor_code: None,
            order_date: None,
            po_issue_date: None,
            vendor_ex_fact_date: None,
        }
    }

    #[test]
    fn accepts_complete_line() {
        assert!(input("ST-100", dec!(3)).validate().is_ok());
    }

    #[test]
    fn rejects_blank_sku() {
        let errors = input("   ", dec!(1)).validate().unwrap_err();
        assert!(errors.field_errors().contains_key("sku_no"));
    }

    #[test]
    fn rejects_non_positive_quantity() {
        let errors = input("ST-100", dec!(0)).validate().unwrap_err();
        assert!(errors.field_errors().contains_key("quantity"));
        assert_matches!(input("ST-100", dec!(-2)).validate(), Err(_));
    }
}

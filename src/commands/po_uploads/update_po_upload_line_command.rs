use crate::{
    commands::Command,
    db::DbPool,
    entities::po_upload_line,
    errors::ServiceError,
    metrics::record_failure,
    services::{
        partners::{ensure_customer, ensure_vendor},
        po_uploads::{ensure_lines_editable, find_line, find_upload, refresh_sku_status},
    },
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use validator::Validate;

/// Partial update of a PO line. Absent fields are left as they are; SKU
/// validity is not re-evaluated until the next validation run. A blank
/// `buyer_order_number` clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdatePoUploadLineCommand {
    #[serde(default)]
    pub upload_id: i64,
    #[serde(default)]
    pub line_id: i64,
    pub customer_id: Option<i64>,
    pub vendor_id: Option<i64>,
    #[validate(length(max = 64))]
    pub buyer_order_number: Option<String>,
    #[validate(length(min = 1, max = 128))]
    pub sku_no: Option<String>,
    pub quantity: Option<Decimal>,
    #[validate(length(max = 64))]
    pub vendor_code: Option<String>,
    pub order_date: Option<NaiveDate>,
    pub po_issue_date: Option<NaiveDate>,
    pub vendor_ex_fact_date: Option<NaiveDate>,
}

#[async_trait::async_trait]
impl Command for UpdatePoUploadLineCommand {
    type Result = po_upload_line::Model;

    #[instrument(skip(self, db_pool), fields(upload_id = self.upload_id, line_id = self.line_id))]
    async fn execute(&self, db_pool: Arc<DbPool>) -> Result<Self::Result, ServiceError> {
        self.check_input().map_err(|e| {
            record_failure("update_line", &e);
            e
        })?;

        let line = self.update_line(&db_pool).await.map_err(|e| {
            record_failure("update_line", &e);
            error!(error = %e, "Failed to update PO upload line");
            e
        })?;

        info!(upload_id = self.upload_id, line_id = line.id, "PO upload line updated");
        Ok(line)
    }
}

impl UpdatePoUploadLineCommand {
    fn check_input(&self) -> Result<(), ServiceError> {
        self.validate()
            .map_err(|e| ServiceError::ValidationError(format!("Invalid line: {}", e)))?;

        if matches!(self.sku_no.as_deref(), Some(sku) if sku.trim().is_empty()) {
            return Err(ServiceError::ValidationError(
                "sku_no must not be blank".to_string(),
            ));
        }
        if matches!(self.quantity, Some(quantity) if quantity <= Decimal::ZERO) {
            return Err(ServiceError::ValidationError(
                "quantity must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    async fn update_line(&self, db: &DbPool) -> Result<po_upload_line::Model, ServiceError> {
        let txn = db.begin().await?;

        let upload = find_upload(&txn, self.upload_id).await?;
        ensure_lines_editable(&upload)?;
        let line = find_line(&txn, upload.id, self.line_id).await?;

        if let Some(customer_id) = self.customer_id {
            ensure_customer(&txn, customer_id).await?;
        }
        if let Some(vendor_id) = self.vendor_id {
            ensure_vendor(&txn, vendor_id).await?;
        }

        let mut line: po_upload_line::ActiveModel = line.into();
        if let Some(customer_id) = self.customer_id {
            line.customer_id = Set(customer_id);
        }
        if let Some(vendor_id) = self.vendor_id {
            line.vendor_id = Set(vendor_id);
        }
        if let Some(number) = &self.buyer_order_number {
            let number = number.trim();
            line.buyer_order_number = Set((!number.is_empty()).then(|| number.to_string()));
        }
        if let Some(sku_no) = &self.sku_no {
            line.sku_no = Set(sku_no.trim().to_string());
        }
        if let Some(quantity) = self.quantity {
            line.quantity = Set(Some(quantity));
        }
        if let Some(vendor_code) = &self.vendor_code {
            line.vendor_code = Set(Some(vendor_code.clone()));
        }
        if let Some(date) = self.order_date {
            line.order_date = Set(Some(date));
        }
        if let Some(date) = self.po_issue_date {
            line.po_issue_date = Set(Some(date));
        }
        if let Some(date) = self.vendor_ex_fact_date {
            line.vendor_ex_fact_date = Set(Some(date));
        }
        line.updated_at = Set(Utc::now());

        let line = line.update(&txn).await?;
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

    #[test]
    fn empty_update_is_accepted() {
        assert!(UpdatePoUploadLineCommand::default().check_input().is_ok());
    }

    #[test]
    fn rejects_blank_sku_and_zero_quantity() {
        let blank = UpdatePoUploadLineCommand {
            sku_no: Some(" ".into()),
            ..Default::default()
        };
        assert_matches!(blank.check_input(), Err(ServiceError::ValidationError(_)));

        let zero = UpdatePoUploadLineCommand {
            quantity: Some(dec!(0)),
            ..Default::default()
        };
        assert_matches!(zero.check_input(), Err(ServiceError::ValidationError(_)));
    }
}

use crate::{
    commands::Command,
    db::DbPool,
    entities::{
        po_upload::PoUploadState,
        po_upload_line::{self, SkuValidity},
    },
    errors::ServiceError,
    metrics::{record_failure, PO_UPLOAD_LINES_CHECKED, PO_UPLOAD_VALIDATIONS},
    services::{
        catalog::find_by_style_no,
        po_uploads::{find_upload, load_lines, write_sku_status},
    },
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Checks every line's SKU against the catalog's buyer style numbers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatePoUploadCommand {
    pub upload_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub upload_id: i64,
    pub state: PoUploadState,
    pub lines_checked: usize,
    pub valid_count: usize,
    pub invalid_skus: Vec<String>,
    pub has_invalid_sku: bool,
    pub has_all_valid_sku: bool,
}

impl ValidationReport {
    pub fn invalid_count(&self) -> usize {
        self.lines_checked - self.valid_count
    }
}

/// State an upload lands in after a validation pass.
pub(crate) fn state_after_validation(lines_checked: usize, invalid_count: usize) -> PoUploadState {
    if lines_checked > 0 && invalid_count == 0 {
        PoUploadState::Validated
    } else {
        PoUploadState::New
    }
}

#[async_trait::async_trait]
impl Command for ValidatePoUploadCommand {
    type Result = ValidationReport;

    #[instrument(skip(self, db_pool), fields(upload_id = self.upload_id))]
    async fn execute(&self, db_pool: Arc<DbPool>) -> Result<Self::Result, ServiceError> {
        let report = self.validate_lines(&db_pool).await.map_err(|e| {
            record_failure("validate", &e);
            error!(error = %e, "Failed to validate PO upload");
            e
        })?;

        let outcome = report.state.to_string();
        PO_UPLOAD_VALIDATIONS
            .with_label_values(&[outcome.as_str()])
            .inc();
        PO_UPLOAD_LINES_CHECKED
            .with_label_values(&["valid"])
            .inc_by(report.valid_count as u64);
        PO_UPLOAD_LINES_CHECKED
            .with_label_values(&["invalid"])
            .inc_by(report.invalid_count() as u64);

        info!(
            upload_id = report.upload_id,
            state = %report.state,
            lines_checked = report.lines_checked,
            invalid = report.invalid_count(),
            "PO upload validated"
        );

        Ok(report)
    }
}

impl ValidatePoUploadCommand {
    async fn validate_lines(&self, db: &DbPool) -> Result<ValidationReport, ServiceError> {
        let txn = db.begin().await?;

        let upload = find_upload(&txn, self.upload_id).await?;
        if upload.state.is_terminal() {
            return Err(ServiceError::InvalidOperation(format!(
                "PO upload {} cannot be validated in {} state",
                upload.name, upload.state
            )));
        }

        let lines = load_lines(&txn, &upload).await?;
        if lines.is_empty() {
            warn!(upload_id = upload.id, "PO upload has no lines to validate");
        }

        let mut checked = Vec::with_capacity(lines.len());
        let mut invalid_skus = Vec::new();
        for line in lines {
            let validity = match find_by_style_no(&txn, &line.sku_no).await? {
                Some(template) => {
                    debug!(
                        line_id = line.id,
                        sku_no = %line.sku_no,
                        template_id = template.id,
                        "SKU matched"
                    );
                    SkuValidity::Valid
                }
                None => {
                    debug!(line_id = line.id, sku_no = %line.sku_no, "SKU not in catalog");
                    invalid_skus.push(line.sku_no.clone());
                    SkuValidity::Invalid
                }
            };

            let mut line: po_upload_line::ActiveModel = line.into();
            line.set_sku_validity(validity);
            line.updated_at = Set(Utc::now());
            checked.push(line.update(&txn).await?);
        }

        let lines_checked = checked.len();
        let next_state = state_after_validation(lines_checked, invalid_skus.len());
        let upload = write_sku_status(&txn, upload, &checked, Some(next_state)).await?;

        txn.commit().await?;

        Ok(ValidationReport {
            upload_id: upload.id,
            state: upload.state,
            lines_checked,
            valid_count: lines_checked - invalid_skus.len(),
            invalid_skus,
            has_invalid_sku: upload.has_invalid_sku,
            has_all_valid_sku: upload.has_all_valid_sku,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(3, 0, PoUploadState::Validated)]
    #[case(3, 1, PoUploadState::New)]
    #[case(1, 1, PoUploadState::New)]
    #[case(0, 0, PoUploadState::New)]
    fn next_state(#[case] checked: usize, #[case] invalid: usize, #[case] expected: PoUploadState) {
        assert_eq!(state_after_validation(checked, invalid), expected);
    }
}

use crate::{
    commands::Command,
    db::DbPool,
    entities::po_upload::{self, PoUploadState},
    errors::ServiceError,
    metrics::{record_failure, PO_UPLOAD_CANCELLATIONS},
    services::po_uploads::find_upload,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Moves an upload to `cancel` from any state. Lines are left untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelPoUploadCommand {
    pub upload_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelPoUploadResult {
    pub upload_id: i64,
    pub previous_state: PoUploadState,
    pub state: PoUploadState,
}

#[async_trait::async_trait]
impl Command for CancelPoUploadCommand {
    type Result = CancelPoUploadResult;

    #[instrument(skip(self, db_pool), fields(upload_id = self.upload_id))]
    async fn execute(&self, db_pool: Arc<DbPool>) -> Result<Self::Result, ServiceError> {
        let result = self.cancel(&db_pool).await.map_err(|e| {
            record_failure("cancel", &e);
            error!(error = %e, "Failed to cancel PO upload");
            e
        })?;

        PO_UPLOAD_CANCELLATIONS.inc();
        info!(
            upload_id = result.upload_id,
            previous_state = %result.previous_state,
            "PO upload cancelled"
        );

        Ok(result)
    }
}

impl CancelPoUploadCommand {
    async fn cancel(&self, db: &DbPool) -> Result<CancelPoUploadResult, ServiceError> {
        let upload = find_upload(db, self.upload_id).await?;
        let previous_state = upload.state;

        let mut upload: po_upload::ActiveModel = upload.into();
        upload.state = Set(PoUploadState::Cancel);
        upload.updated_at = Set(Utc::now());
        let upload = upload.update(db).await?;

        Ok(CancelPoUploadResult {
            upload_id: upload.id,
            previous_state,
            state: upload.state,
        })
    }
}

use crate::{
    commands::Command,
    db::DbPool,
    errors::ServiceError,
    metrics::record_failure,
    services::po_uploads::{ensure_lines_editable, find_line, find_upload, refresh_sku_status},
};
use sea_orm::{ModelTrait, TransactionTrait};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemovePoUploadLineCommand {
    pub upload_id: i64,
    pub line_id: i64,
}

#[async_trait::async_trait]
impl Command for RemovePoUploadLineCommand {
    type Result = ();

    #[instrument(skip(self, db_pool), fields(upload_id = self.upload_id, line_id = self.line_id))]
    async fn execute(&self, db_pool: Arc<DbPool>) -> Result<Self::Result, ServiceError> {
        self.remove_line(&db_pool).await.map_err(|e| {
            record_failure("remove_line", &e);
            error!(error = %e, "Failed to remove PO upload line");
            e
        })?;

        info!(upload_id = self.upload_id, line_id = self.line_id, "PO upload line removed");
        Ok(())
    }
}

impl RemovePoUploadLineCommand {
    async fn remove_line(&self, db: &DbPool) -> Result<(), ServiceError> {
        let txn = db.begin().await?;

        let upload = find_upload(&txn, self.upload_id).await?;
        ensure_lines_editable(&upload)?;

        let line = find_line(&txn, upload.id, self.line_id).await?;
        line.delete(&txn).await?;
        refresh_sku_status(&txn, upload).await?;

        txn.commit().await?;
        Ok(())
    }
}

use crate::{
    commands::Command,
    db::DbPool,
    entities::{
        po_upload::PoUploadState,
        po_upload_line::{self, Entity as PoUploadLineEntity},
    },
    errors::ServiceError,
    metrics::record_failure,
    services::po_uploads::find_upload,
};
use sea_orm::{ColumnTrait, EntityTrait, ModelTrait, QueryFilter, TransactionTrait};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Deletes an upload with its lines. Confirmed uploads are referenced by
/// their quotations and stay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletePoUploadCommand {
    pub upload_id: i64,
}

#[async_trait::async_trait]
impl Command for DeletePoUploadCommand {
    type Result = ();

    #[instrument(skip(self, db_pool), fields(upload_id = self.upload_id))]
    async fn execute(&self, db_pool: Arc<DbPool>) -> Result<Self::Result, ServiceError> {
        let removed_lines = self.delete_upload(&db_pool).await.map_err(|e| {
            record_failure("delete", &e);
            error!(error = %e, "Failed to delete PO upload");
            e
        })?;

        info!(upload_id = self.upload_id, removed_lines, "PO upload deleted");
        Ok(())
    }
}

impl DeletePoUploadCommand {
    async fn delete_upload(&self, db: &DbPool) -> Result<u64, ServiceError> {
        let txn = db.begin().await?;

        let upload = find_upload(&txn, self.upload_id).await?;
        if upload.state == PoUploadState::Confirm {
            return Err(ServiceError::InvalidOperation(format!(
                "PO upload {} is confirmed and cannot be deleted",
                upload.name
            )));
        }

        let removed = PoUploadLineEntity::delete_many()
            .filter(po_upload_line::Column::UploadId.eq(upload.id))
            .exec(&txn)
            .await?;
        upload.delete(&txn).await?;

        txn.commit().await?;
        Ok(removed.rows_affected)
    }
}

use crate::{
    commands::Command,
    db::DbPool,
    entities::po_upload::{self, Entity as PoUploadEntity, PoUploadState},
    errors::ServiceError,
    metrics::{record_failure, PO_UPLOADS_CREATED, PO_UPLOAD_LINES_ADDED},
    services::{
        po_uploads::{write_sku_status, PoUploadDetail},
        sequences::{next_by_code, PLACEHOLDER_NAME, UPLOAD_SEQUENCE},
    },
};
use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, Set,
    SqlErr, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use validator::Validate;

use super::{insert_line, PoUploadLineInput};

/// Upper bound on sequence values skipped because a caller already used them.
const MAX_SEQUENCE_DRAWS: usize = 100;

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CreatePoUploadCommand {
    /// Explicit upload name; generated from the upload sequence when absent
    #[validate(length(min = 1, max = 64))]
    pub name: Option<String>,
    #[validate(length(max = 64))]
    pub created_by: Option<String>,
    pub created_on: Option<NaiveDate>,
    #[validate(length(max = 256))]
    pub po_reference: Option<String>,
    #[serde(default)]
    pub lines: Vec<PoUploadLineInput>,
}

#[async_trait::async_trait]
impl Command for CreatePoUploadCommand {
    type Result = PoUploadDetail;

    #[instrument(skip(self, db_pool))]
    async fn execute(&self, db_pool: Arc<DbPool>) -> Result<Self::Result, ServiceError> {
        self.check_input().map_err(|e| {
            record_failure("create", &e);
            e
        })?;

        let detail = self.create_upload(&db_pool).await.map_err(|e| {
            record_failure("create", &e);
            error!(error = %e, "Failed to create PO upload");
            e
        })?;

        PO_UPLOADS_CREATED.inc();
        PO_UPLOAD_LINES_ADDED.inc_by(detail.lines.len() as u64);
        info!(
            upload_id = detail.upload.id,
            name = %detail.upload.name,
            line_count = detail.lines.len(),
            "PO upload created"
        );

        Ok(detail)
    }
}

impl CreatePoUploadCommand {
    fn check_input(&self) -> Result<(), ServiceError> {
        self.validate()
            .map_err(|e| ServiceError::ValidationError(format!("Invalid PO upload: {}", e)))?;

        for (index, line) in self.lines.iter().enumerate() {
            line.validate().map_err(|e| {
                ServiceError::ValidationError(format!("Invalid line {}: {}", index + 1, e))
            })?;
        }

        Ok(())
    }

    /// Caller-supplied name, unless it is blank or the placeholder.
    fn requested_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty() && *name != PLACEHOLDER_NAME)
    }

    async fn resolve_name<C>(&self, conn: &C) -> Result<String, ServiceError>
    where
        C: ConnectionTrait,
    {
        if let Some(name) = self.requested_name() {
            if name_taken(conn, name).await? {
                return Err(ServiceError::Conflict(format!(
                    "PO upload {} already exists",
                    name
                )));
            }
            return Ok(name.to_string());
        }

        for _ in 0..MAX_SEQUENCE_DRAWS {
            let Some(name) = next_by_code(conn, UPLOAD_SEQUENCE).await? else {
                warn!(code = UPLOAD_SEQUENCE, "Sequence missing, using placeholder name");
                return Ok(PLACEHOLDER_NAME.to_string());
            };
            if !name_taken(conn, &name).await? {
                return Ok(name);
            }
            debug!(name = %name, "Sequence value already used, drawing again");
        }

        Err(ServiceError::Conflict(format!(
            "No unused name left in sequence {}",
            UPLOAD_SEQUENCE
        )))
    }

    async fn create_upload(&self, db: &DbPool) -> Result<PoUploadDetail, ServiceError> {
        let txn = db.begin().await?;

        let name = self.resolve_name(&txn).await?;
        let now = Utc::now();
        let upload = po_upload::ActiveModel {
            name: Set(name.clone()),
            created_by: Set(self.created_by.clone()),
            created_on: Set(self.created_on),
            po_reference: Set(self.po_reference.clone()),
            state: Set(PoUploadState::New),
            has_invalid_sku: Set(false),
            has_all_valid_sku: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| duplicate_name_conflict(e, &name))?;

        let mut lines = Vec::with_capacity(self.lines.len());
        for input in &self.lines {
            lines.push(insert_line(&txn, upload.id, input).await?);
        }
        let upload = write_sku_status(&txn, upload, &lines, None).await?;

        txn.commit().await?;
        Ok(PoUploadDetail { upload, lines })
    }
}

async fn name_taken<C>(conn: &C, name: &str) -> Result<bool, ServiceError>
where
    C: ConnectionTrait,
{
    Ok(PoUploadEntity::find()
        .filter(po_upload::Column::Name.eq(name))
        .one(conn)
        .await?
        .is_some())
}

/// A concurrent insert can still claim the name between the check and the insert.
fn duplicate_name_conflict(err: DbErr, name: &str) -> ServiceError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            ServiceError::Conflict(format!("PO upload {} already exists", name))
        }
        _ => ServiceError::DatabaseError(err),
    }
}

use crate::{
    commands::Command,
    db::DbPool,
    entities::{
        po_upload::{self, PoUploadState},
        po_upload_line,
        sales_order::{self, SalesOrderState},
        sales_order_line,
    },
    errors::ServiceError,
    metrics::{record_failure, PO_UPLOAD_CONFIRMATIONS, QUOTATIONS_CREATED},
    services::{
        catalog::resolve_sku,
        po_uploads::{find_upload, group_by_buyer_order, load_lines, LineGroup},
        sequences::{next_by_code, PLACEHOLDER_NAME, QUOTATION_SEQUENCE},
    },
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Turns a validated upload into draft quotations, one per buyer order number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmPoUploadCommand {
    pub upload_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotationSummary {
    pub id: i64,
    pub name: String,
    pub buyer_order_no: Option<String>,
    pub line_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmationSummary {
    pub upload_id: i64,
    pub state: PoUploadState,
    pub quotations: Vec<QuotationSummary>,
    /// SKUs of lines left out because the catalog no longer knows them
    pub skipped_skus: Vec<String>,
}

#[async_trait::async_trait]
impl Command for ConfirmPoUploadCommand {
    type Result = ConfirmationSummary;

    #[instrument(skip(self, db_pool), fields(upload_id = self.upload_id))]
    async fn execute(&self, db_pool: Arc<DbPool>) -> Result<Self::Result, ServiceError> {
        let summary = self.confirm(&db_pool).await.map_err(|e| {
            record_failure("confirm", &e);
            error!(error = %e, "Failed to confirm PO upload");
            e
        })?;

        PO_UPLOAD_CONFIRMATIONS.inc();
        QUOTATIONS_CREATED.inc_by(summary.quotations.len() as u64);
        info!(
            upload_id = summary.upload_id,
            quotations = summary.quotations.len(),
            skipped = summary.skipped_skus.len(),
            "PO upload confirmed"
        );

        Ok(summary)
    }
}

impl ConfirmPoUploadCommand {
    async fn confirm(&self, db: &DbPool) -> Result<ConfirmationSummary, ServiceError> {
        let txn = db.begin().await?;

        let upload = find_upload(&txn, self.upload_id).await?;
        if upload.state != PoUploadState::Validated {
            return Err(ServiceError::InvalidOperation(format!(
                "Only validated PO uploads can be confirmed; {} is in {} state",
                upload.name, upload.state
            )));
        }

        let lines = load_lines(&txn, &upload).await?;
        let mut quotations = Vec::new();
        let mut skipped_skus = Vec::new();

        for group in group_by_buyer_order(&lines) {
            let Some(quotation) =
                create_quotation(&txn, &upload, &group, &mut skipped_skus).await?
            else {
                continue;
            };
            quotations.push(quotation);
        }

        let mut active: po_upload::ActiveModel = upload.into();
        active.state = Set(PoUploadState::Confirm);
        active.updated_at = Set(Utc::now());
        let upload = active.update(&txn).await?;

        txn.commit().await?;

        Ok(ConfirmationSummary {
            upload_id: upload.id,
            state: upload.state,
            quotations,
            skipped_skus,
        })
    }
}

/// Creates the quotation header for one buyer order group and a quotation
/// line for each PO line whose SKU still resolves.
async fn create_quotation<C>(
    conn: &C,
    upload: &po_upload::Model,
    group: &LineGroup<'_>,
    skipped_skus: &mut Vec<String>,
) -> Result<Option<QuotationSummary>, ServiceError>
where
    C: ConnectionTrait,
{
    let Some(first) = group.representative() else {
        return Ok(None);
    };

    let name = match next_by_code(conn, QUOTATION_SEQUENCE).await? {
        Some(name) => name,
        None => {
            warn!(code = QUOTATION_SEQUENCE, "Sequence missing, using placeholder name");
            PLACEHOLDER_NAME.to_string()
        }
    };

    let now = Utc::now();
    let order = sales_order::ActiveModel {
        name: Set(name),
        partner_id: Set(first.customer_id),
        vendor_id: Set(Some(first.vendor_id)),
        origin: Set(upload.po_reference.clone()),
        state: Set(SalesOrderState::Draft),
        po_upload_no: Set(Some(upload.name.clone())),
        buyer_order_no: Set(group.key.number().map(str::to_string)),
        po_issue_date: Set(first.po_issue_date),
        ex_factory_date: Set(first.vendor_ex_fact_date),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    let mut line_count = 0;
    for line in &group.lines {
        let Some(item) = resolve_sku(conn, &line.sku_no).await? else {
            warn!(
                line_id = line.id,
                sku_no = %line.sku_no,
                buyer_order = %group.key,
                "SKU not in catalog, line left out of quotation"
            );
            skipped_skus.push(line.sku_no.clone());
            continue;
        };

        sales_order_line::ActiveModel {
            order_id: Set(order.id),
            product_variant_id: Set(item.variant.id),
            product_uom_qty: Set(line.quantity.unwrap_or(Decimal::ONE)),
            price_unit: Set(item.template.list_price),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(conn)
        .await?;

        let mut po_line: po_upload_line::ActiveModel = (*line).clone().into();
        po_line.sales_order_id = Set(Some(order.id));
        po_line.updated_at = Set(now);
        po_line.update(conn).await?;

        line_count += 1;
    }

    info!(
        quotation_id = order.id,
        quotation = %order.name,
        buyer_order = %group.key,
        line_count,
        "Quotation created from PO upload"
    );

    Ok(Some(QuotationSummary {
        id: order.id,
        name: order.name,
        buyer_order_no: order.buyer_order_no,
        line_count,
    }))
}

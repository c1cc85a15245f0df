use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder,
};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt, sync::Arc};
use tracing::{debug, instrument};

use crate::{
    commands::{
        po_uploads::{
            AddPoUploadLineCommand, CancelPoUploadCommand, CancelPoUploadResult,
            ConfirmPoUploadCommand, ConfirmationSummary, CreatePoUploadCommand,
            DeletePoUploadCommand, RemovePoUploadLineCommand, UpdatePoUploadLineCommand,
            ValidatePoUploadCommand, ValidationReport,
        },
        Command,
    },
    db::DbPool,
    entities::{
        po_upload::{self, Entity as PoUploadEntity, PoUploadState, SkuStatus},
        po_upload_line::{self, Entity as PoUploadLineEntity},
        sales_order::{self, Entity as SalesOrderEntity},
        sales_order_line,
    },
    errors::ServiceError,
};

/// Label of the group holding lines without a buyer order number.
pub const UNASSIGNED_BUYER_ORDER: &str = "NO_BUYER_ORDER_NO";

/// Grouping key for quotation generation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BuyerOrderKey {
    Number(String),
    Unassigned,
}

impl BuyerOrderKey {
    pub fn of(line: &po_upload_line::Model) -> Self {
        match line.buyer_order_key() {
            Some(number) => BuyerOrderKey::Number(number.to_string()),
            None => BuyerOrderKey::Unassigned,
        }
    }

    /// The buyer order number carried onto the quotation, if any.
    pub fn number(&self) -> Option<&str> {
        match self {
            BuyerOrderKey::Number(number) => Some(number),
            BuyerOrderKey::Unassigned => None,
        }
    }
}

impl fmt::Display for BuyerOrderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.number().unwrap_or(UNASSIGNED_BUYER_ORDER))
    }
}

#[derive(Debug)]
pub struct LineGroup<'a> {
    pub key: BuyerOrderKey,
    pub lines: Vec<&'a po_upload_line::Model>,
}

impl<'a> LineGroup<'a> {
    /// First line of the group; its customer, vendor and dates head the quotation.
    pub fn representative(&self) -> Option<&'a po_upload_line::Model> {
        self.lines.first().copied()
    }
}

/// Partitions lines by buyer order number, keeping groups in the order their
/// first line appears and lines in their original order.
pub fn group_by_buyer_order(lines: &[po_upload_line::Model]) -> Vec<LineGroup<'_>> {
    let mut groups: Vec<LineGroup<'_>> = Vec::new();
    let mut positions: HashMap<BuyerOrderKey, usize> = HashMap::new();

    for line in lines {
        let key = BuyerOrderKey::of(line);
        match positions.get(&key) {
            Some(&position) => groups[position].lines.push(line),
            None => {
                positions.insert(key.clone(), groups.len());
                groups.push(LineGroup {
                    key,
                    lines: vec![line],
                });
            }
        }
    }

    groups
}

pub(crate) async fn find_upload<C>(conn: &C, upload_id: i64) -> Result<po_upload::Model, ServiceError>
where
    C: ConnectionTrait,
{
    PoUploadEntity::find_by_id(upload_id)
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("PO upload {} not found", upload_id)))
}

pub(crate) async fn load_lines<C>(
    conn: &C,
    upload: &po_upload::Model,
) -> Result<Vec<po_upload_line::Model>, ServiceError>
where
    C: ConnectionTrait,
{
    let lines = upload
        .find_related(PoUploadLineEntity)
        .order_by_asc(po_upload_line::Column::Id)
        .all(conn)
        .await?;
    Ok(lines)
}

pub(crate) async fn find_line<C>(
    conn: &C,
    upload_id: i64,
    line_id: i64,
) -> Result<po_upload_line::Model, ServiceError>
where
    C: ConnectionTrait,
{
    PoUploadLineEntity::find_by_id(line_id)
        .filter(po_upload_line::Column::UploadId.eq(upload_id))
        .one(conn)
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound(format!(
                "Line {} not found on PO upload {}",
                line_id, upload_id
            ))
        })
}

/// Lines of confirmed or cancelled uploads are frozen.
pub(crate) fn ensure_lines_editable(upload: &po_upload::Model) -> Result<(), ServiceError> {
    if upload.state.is_terminal() {
        return Err(ServiceError::InvalidOperation(format!(
            "Lines of PO upload {} cannot be changed in {} state",
            upload.name, upload.state
        )));
    }
    Ok(())
}

/// Stores the derived SKU flags computed from `lines`, optionally moving the
/// upload to `next_state` in the same write.
pub(crate) async fn write_sku_status<C>(
    conn: &C,
    upload: po_upload::Model,
    lines: &[po_upload_line::Model],
    next_state: Option<PoUploadState>,
) -> Result<po_upload::Model, ServiceError>
where
    C: ConnectionTrait,
{
    let status = SkuStatus::from_lines(lines);
    debug!(
        upload_id = upload.id,
        has_invalid_sku = status.has_invalid_sku,
        has_all_valid_sku = status.has_all_valid_sku,
        "Recomputed SKU status"
    );

    let mut active: po_upload::ActiveModel = upload.into();
    active.has_invalid_sku = Set(status.has_invalid_sku);
    active.has_all_valid_sku = Set(status.has_all_valid_sku);
    if let Some(state) = next_state {
        active.state = Set(state);
    }
    active.updated_at = Set(Utc::now());
    Ok(active.update(conn).await?)
}

/// Reloads the lines of `upload` and refreshes its derived SKU flags.
pub(crate) async fn refresh_sku_status<C>(
    conn: &C,
    upload: po_upload::Model,
) -> Result<po_upload::Model, ServiceError>
where
    C: ConnectionTrait,
{
    let lines = load_lines(conn, &upload).await?;
    write_sku_status(conn, upload, &lines, None).await
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoUploadDetail {
    pub upload: po_upload::Model,
    pub lines: Vec<po_upload_line::Model>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotationDetail {
    pub order: sales_order::Model,
    pub lines: Vec<sales_order_line::Model>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PoUploadFilter {
    pub state: Option<PoUploadState>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PoUploadPage {
    pub items: Vec<po_upload::Model>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
}

const DEFAULT_PAGE_SIZE: u64 = 20;
const MAX_PAGE_SIZE: u64 = 100;

/// Service for the PO upload workflow: intake, SKU validation and quotation
/// generation
#[derive(Clone)]
pub struct PoUploadService {
    db_pool: Arc<DbPool>,
    default_page_size: u64,
    max_page_size: u64,
}

impl PoUploadService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self {
            db_pool,
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }

    pub fn with_page_sizes(mut self, default_page_size: u64, max_page_size: u64) -> Self {
        self.max_page_size = max_page_size.max(1);
        self.default_page_size = default_page_size.clamp(1, self.max_page_size);
        self
    }

    /// Creates an upload, optionally with its first lines
    #[instrument(skip(self, command))]
    pub async fn create_upload(
        &self,
        command: CreatePoUploadCommand,
    ) -> Result<PoUploadDetail, ServiceError> {
        command.execute(self.db_pool.clone()).await
    }

    #[instrument(skip(self, command), fields(upload_id = command.upload_id))]
    pub async fn add_line(
        &self,
        command: AddPoUploadLineCommand,
    ) -> Result<po_upload_line::Model, ServiceError> {
        command.execute(self.db_pool.clone()).await
    }

    #[instrument(skip(self, command), fields(upload_id = command.upload_id, line_id = command.line_id))]
    pub async fn update_line(
        &self,
        command: UpdatePoUploadLineCommand,
    ) -> Result<po_upload_line::Model, ServiceError> {
        command.execute(self.db_pool.clone()).await
    }

    #[instrument(skip(self))]
    pub async fn remove_line(&self, upload_id: i64, line_id: i64) -> Result<(), ServiceError> {
        RemovePoUploadLineCommand { upload_id, line_id }
            .execute(self.db_pool.clone())
            .await
    }

    #[instrument(skip(self))]
    pub async fn delete_upload(&self, upload_id: i64) -> Result<(), ServiceError> {
        DeletePoUploadCommand { upload_id }
            .execute(self.db_pool.clone())
            .await
    }

    /// Checks every line's SKU against the catalog
    #[instrument(skip(self))]
    pub async fn validate(&self, upload_id: i64) -> Result<ValidationReport, ServiceError> {
        ValidatePoUploadCommand { upload_id }
            .execute(self.db_pool.clone())
            .await
    }

    /// Generates one draft quotation per buyer order number
    #[instrument(skip(self))]
    pub async fn confirm(&self, upload_id: i64) -> Result<ConfirmationSummary, ServiceError> {
        ConfirmPoUploadCommand { upload_id }
            .execute(self.db_pool.clone())
            .await
    }

    #[instrument(skip(self))]
    pub async fn cancel(&self, upload_id: i64) -> Result<CancelPoUploadResult, ServiceError> {
        CancelPoUploadCommand { upload_id }
            .execute(self.db_pool.clone())
            .await
    }

    /// Gets an upload together with its lines
    #[instrument(skip(self))]
    pub async fn get_upload(&self, upload_id: i64) -> Result<PoUploadDetail, ServiceError> {
        let db = &*self.db_pool;
        let upload = find_upload(db, upload_id).await?;
        let lines = load_lines(db, &upload).await?;
        Ok(PoUploadDetail { upload, lines })
    }

    /// Lists uploads, newest first
    #[instrument(skip(self))]
    pub async fn list_uploads(&self, filter: PoUploadFilter) -> Result<PoUploadPage, ServiceError> {
        let db = &*self.db_pool;
        let page = filter.page.unwrap_or(1).max(1);
        let per_page = filter
            .per_page
            .unwrap_or(self.default_page_size)
            .clamp(1, self.max_page_size);

        let mut query = PoUploadEntity::find().order_by_desc(po_upload::Column::Id);
        if let Some(state) = filter.state {
            query = query.filter(po_upload::Column::State.eq(state));
        }

        let paginator = query.paginate(db, per_page);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page - 1).await?;

        Ok(PoUploadPage {
            items,
            total,
            page,
            per_page,
            total_pages: total.div_ceil(per_page),
        })
    }

    /// Quotations generated when the upload was confirmed
    #[instrument(skip(self))]
    pub async fn quotations_for_upload(
        &self,
        upload_id: i64,
    ) -> Result<Vec<QuotationDetail>, ServiceError> {
        let db = &*self.db_pool;
        let upload = find_upload(db, upload_id).await?;

        let orders = SalesOrderEntity::find()
            .filter(sales_order::Column::PoUploadNo.eq(upload.name.as_str()))
            .order_by_asc(sales_order::Column::Id)
            .all(db)
            .await?;

        let mut quotations = Vec::with_capacity(orders.len());
        for order in orders {
            let lines = order
                .find_related(sales_order_line::Entity)
                .order_by_asc(sales_order_line::Column::Id)
                .all(db)
                .await?;
            quotations.push(QuotationDetail { order, lines });
        }

        Ok(quotations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn line(id: i64, buyer_order_number: Option<&str>) -> po_upload_line::Model {
        po_upload_line::Model {
            id,
            upload_id: 1,
            customer_id: 10,
            vendor_id: 20,
            sales_order_id: None,
            buyer_order_number: buyer_order_number.map(str::to_string),
            sku_no: format!("SKU-{id}"),
            quantity: None,
            vendor_code: None,
            order_date: None,
            po_issue_date: None,
            vendor_ex_fact_date: None,
            is_valid_sku: true,
            is_invalid_sku: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn ids(group: &LineGroup<'_>) -> Vec<i64> {
        group.lines.iter().map(|line| line.id).collect()
    }

    #[test]
    fn groups_follow_first_appearance() {
        let lines = vec![
            line(1, Some("B2")),
            line(2, Some("B1")),
            line(3, Some("B2")),
            line(4, Some("B1")),
        ];

        let groups = group_by_buyer_order(&lines);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, BuyerOrderKey::Number("B2".into()));
        assert_eq!(ids(&groups[0]), vec![1, 3]);
        assert_eq!(groups[1].key, BuyerOrderKey::Number("B1".into()));
        assert_eq!(ids(&groups[1]), vec![2, 4]);
    }

    #[test]
    fn missing_and_blank_numbers_share_one_group() {
        let lines = vec![line(1, None), line(2, Some("B1")), line(3, Some("  ")), line(4, Some(""))];

        let groups = group_by_buyer_order(&lines);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, BuyerOrderKey::Unassigned);
        assert_eq!(ids(&groups[0]), vec![1, 3, 4]);
        assert_eq!(groups[0].key.number(), None);
        assert_eq!(groups[0].key.to_string(), UNASSIGNED_BUYER_ORDER);
    }

    #[test]
    fn literal_sentinel_text_is_a_real_buyer_order() {
        let lines = vec![line(1, None), line(2, Some(UNASSIGNED_BUYER_ORDER))];

        let groups = group_by_buyer_order(&lines);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[1].key.number(), Some(UNASSIGNED_BUYER_ORDER));
    }

    #[test]
    fn representative_is_first_line() {
        let lines = vec![line(7, Some("X")), line(8, Some("X"))];
        let groups = group_by_buyer_order(&lines);
        assert_eq!(groups[0].representative().map(|l| l.id), Some(7));
    }

    #[test]
    fn no_lines_no_groups() {
        assert!(group_by_buyer_order(&[]).is_empty());
    }

    #[test]
    fn editing_is_blocked_for_terminal_states() {
        let mut upload = po_upload::Model {
            id: 1,
            name: "POU/00001".into(),
            created_by: None,
            created_on: None,
            po_reference: None,
            state: PoUploadState::Validated,
            has_invalid_sku: false,
            has_all_valid_sku: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(ensure_lines_editable(&upload).is_ok());

        upload.state = PoUploadState::Confirm;
        assert!(matches!(
            ensure_lines_editable(&upload),
            Err(ServiceError::InvalidOperation(_))
        ));
    }
}

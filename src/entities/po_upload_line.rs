use rust_decimal::Decimal;
use sea_orm::{entity::prelude::*, ActiveValue::Set};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "po_upload_lines")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub upload_id: i64,
    pub customer_id: i64,
    pub vendor_id: i64,
    pub sales_order_id: Option<i64>,
    pub buyer_order_number: Option<String>,
    pub sku_no: String,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))", nullable)]
    pub quantity: Option<Decimal>,
    pub vendor_code: Option<String>,
    pub order_date: Option<Date>,
    pub po_issue_date: Option<Date>,
    pub vendor_ex_fact_date: Option<Date>,
    pub is_valid_sku: bool,
    pub is_invalid_sku: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::po_upload::Entity",
        from = "Column::UploadId",
        to = "super::po_upload::Column::Id",
        on_delete = "Cascade"
    )]
    PoUpload,
    #[sea_orm(
        belongs_to = "super::partner::Entity",
        from = "Column::CustomerId",
        to = "super::partner::Column::Id"
    )]
    Customer,
    #[sea_orm(
        belongs_to = "super::partner::Entity",
        from = "Column::VendorId",
        to = "super::partner::Column::Id"
    )]
    Vendor,
    #[sea_orm(
        belongs_to = "super::sales_order::Entity",
        from = "Column::SalesOrderId",
        to = "super::sales_order::Column::Id"
    )]
    SalesOrder,
}

impl Related<super::po_upload::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PoUpload.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Outcome of looking a line's SKU up in the catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkuValidity {
    Valid,
    Invalid,
}

impl SkuValidity {
    /// `(is_valid_sku, is_invalid_sku)`; never both true.
    pub fn flags(self) -> (bool, bool) {
        match self {
            SkuValidity::Valid => (true, false),
            SkuValidity::Invalid => (false, true),
        }
    }
}

impl ActiveModel {
    pub fn set_sku_validity(&mut self, validity: SkuValidity) {
        let (valid, invalid) = validity.flags();
        self.is_valid_sku = Set(valid);
        self.is_invalid_sku = Set(invalid);
    }
}

impl Model {
    /// Blank buyer order numbers are treated the same as missing ones.
    pub fn buyer_order_key(&self) -> Option<&str> {
        self.buyer_order_number
            .as_deref()
            .filter(|number| !number.trim().is_empty())
    }
}

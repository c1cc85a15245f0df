use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Contact directory record. Customers and vendors on upload lines must be
/// companies carrying the matching commercial rank.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "partners")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub is_company: bool,
    pub customer_rank: i32,
    pub supplier_rank: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_customer_company(&self) -> bool {
        self.is_company && self.customer_rank > 0
    }

    pub fn is_vendor_company(&self) -> bool {
        self.is_company && self.supplier_rank > 0
    }
}

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Numbering sequence keyed by `code`; `number_next` is the value handed out
/// by the next draw.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sequences")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub code: String,
    pub prefix: Option<String>,
    pub padding: i32,
    pub number_next: i64,
    pub number_increment: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

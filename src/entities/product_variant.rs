use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "product_variants")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub product_template_id: i64,
    pub default_code: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::product_template::Entity",
        from = "Column::ProductTemplateId",
        to = "super::product_template::Column::Id"
    )]
    ProductTemplate,
}

impl Related<super::product_template::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductTemplate.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};

use crate::{
    entities::{
        product_template::{self, Entity as ProductTemplateEntity},
        product_variant::{self, Entity as ProductVariantEntity},
    },
    errors::ServiceError,
};

/// Finds the catalog item whose buyer style number equals `sku` exactly.
/// Style numbers are not unique; the oldest template wins.
pub async fn find_by_style_no<C>(
    conn: &C,
    sku: &str,
) -> Result<Option<product_template::Model>, ServiceError>
where
    C: ConnectionTrait,
{
    let template = ProductTemplateEntity::find()
        .filter(product_template::Column::BuyerStyleNo.eq(sku))
        .order_by_asc(product_template::Column::Id)
        .one(conn)
        .await?;
    Ok(template)
}

/// The default variant of a template is its first one.
pub async fn default_variant<C>(
    conn: &C,
    template_id: i64,
) -> Result<Option<product_variant::Model>, ServiceError>
where
    C: ConnectionTrait,
{
    let variant = ProductVariantEntity::find()
        .filter(product_variant::Column::ProductTemplateId.eq(template_id))
        .order_by_asc(product_variant::Column::Id)
        .one(conn)
        .await?;
    Ok(variant)
}

/// A catalog match resolved down to the variant a quotation line is sold as.
#[derive(Debug, Clone)]
pub struct CatalogItem {
    pub template: product_template::Model,
    pub variant: product_variant::Model,
}

/// Resolves `sku` to a sellable item. A style match whose template has no
/// variant at all is broken catalog data and reported as `NotFound`.
pub async fn resolve_sku<C>(conn: &C, sku: &str) -> Result<Option<CatalogItem>, ServiceError>
where
    C: ConnectionTrait,
{
    let Some(template) = find_by_style_no(conn, sku).await? else {
        return Ok(None);
    };

    let variant = default_variant(conn, template.id).await?.ok_or_else(|| {
        ServiceError::NotFound(format!(
            "Product template {} ({}) has no variant",
            template.id, template.name
        ))
    })?;

    Ok(Some(CatalogItem { template, variant }))
}

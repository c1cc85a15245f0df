use sea_orm::{ConnectionTrait, EntityTrait};

use crate::{
    entities::partner::{self, Entity as PartnerEntity},
    errors::ServiceError,
};

async fn load<C>(conn: &C, role: &str, partner_id: i64) -> Result<partner::Model, ServiceError>
where
    C: ConnectionTrait,
{
    PartnerEntity::find_by_id(partner_id)
        .one(conn)
        .await?
        .ok_or_else(|| {
            ServiceError::ValidationError(format!("{} {} does not exist", role, partner_id))
        })
}

/// Customers must be companies with a positive customer rank.
pub async fn ensure_customer<C>(conn: &C, partner_id: i64) -> Result<partner::Model, ServiceError>
where
    C: ConnectionTrait,
{
    let partner = load(conn, "Customer", partner_id).await?;
    if !partner.is_customer_company() {
        return Err(ServiceError::ValidationError(format!(
            "Partner {} ({}) is not a customer company",
            partner.id, partner.name
        )));
    }
    Ok(partner)
}

/// Vendors must be companies with a positive supplier rank.
pub async fn ensure_vendor<C>(conn: &C, partner_id: i64) -> Result<partner::Model, ServiceError>
where
    C: ConnectionTrait,
{
    let partner = load(conn, "Vendor", partner_id).await?;
    if !partner.is_vendor_company() {
        return Err(ServiceError::ValidationError(format!(
            "Partner {} ({}) is not a vendor company",
            partner.id, partner.name
        )));
    }
    Ok(partner)
}

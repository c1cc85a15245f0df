use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait,
    EntityTrait, QueryFilter, QuerySelect,
};
use tracing::{debug, info, instrument};

use crate::{
    entities::sequence::{self, Entity as SequenceEntity},
    errors::ServiceError,
};

/// Sequence that names PO uploads.
pub const UPLOAD_SEQUENCE: &str = "po_upload.upload";
/// Sequence that names generated quotations.
pub const QUOTATION_SEQUENCE: &str = "sale.order";

/// Name used when no sequence is available.
pub const PLACEHOLDER_NAME: &str = "New";

pub fn format_sequence(prefix: &str, padding: i32, number: i64) -> String {
    let width = usize::try_from(padding).unwrap_or(0);
    format!("{prefix}{number:0width$}")
}

/// Draws the next value of `code`, or `None` when no such sequence exists.
///
/// The row is read with `FOR UPDATE`, so concurrent draws wait for the
/// holder's transaction to finish and then see the advanced counter.
/// SQLite has no row locks and serializes writers on the database instead.
#[instrument(skip(conn))]
pub async fn next_by_code<C>(conn: &C, code: &str) -> Result<Option<String>, ServiceError>
where
    C: ConnectionTrait,
{
    let Some(seq) = SequenceEntity::find()
        .filter(sequence::Column::Code.eq(code))
        .lock_exclusive()
        .one(conn)
        .await?
    else {
        return Ok(None);
    };

    SequenceEntity::update_many()
        .col_expr(
            sequence::Column::NumberNext,
            Expr::col(sequence::Column::NumberNext).add(seq.number_increment),
        )
        .filter(sequence::Column::Id.eq(seq.id))
        .exec(conn)
        .await?;

    let value = format_sequence(
        seq.prefix.as_deref().unwrap_or_default(),
        seq.padding,
        seq.number_next,
    );
    debug!(code, value = %value, "Sequence value drawn");
    Ok(Some(value))
}

/// Applies prefix and padding to a sequence, registering it when missing.
pub async fn configure<C>(
    conn: &C,
    code: &str,
    prefix: &str,
    padding: i32,
) -> Result<sequence::Model, ServiceError>
where
    C: ConnectionTrait,
{
    let existing = SequenceEntity::find()
        .filter(sequence::Column::Code.eq(code))
        .one(conn)
        .await?;

    let model = match existing {
        Some(seq) => {
            let mut active: sequence::ActiveModel = seq.into();
            active.prefix = Set(Some(prefix.to_string()));
            active.padding = Set(padding);
            active.update(conn).await?
        }
        None => {
            let created = sequence::ActiveModel {
                code: Set(code.to_string()),
                prefix: Set(Some(prefix.to_string())),
                padding: Set(padding),
                number_next: Set(1),
                number_increment: Set(1),
                ..Default::default()
            }
            .insert(conn)
            .await?;
            info!(code, "Sequence registered");
            created
        }
    };

    Ok(model)
}

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle of a PO upload batch.
///
/// `New` and `Validated` toggle while lines are (re-)validated; `Confirm` and
/// `Cancel` are terminal.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PoUploadState {
    #[sea_orm(string_value = "new")]
    New,
    #[sea_orm(string_value = "validated")]
    Validated,
    #[sea_orm(string_value = "confirm")]
    Confirm,
    #[sea_orm(string_value = "cancel")]
    Cancel,
}

impl PoUploadState {
    pub fn is_terminal(self) -> bool {
        matches!(self, PoUploadState::Confirm | PoUploadState::Cancel)
    }
}

impl Default for PoUploadState {
    fn default() -> Self {
        PoUploadState::New
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "po_uploads")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub name: String,
    pub created_by: Option<String>,
    pub created_on: Option<Date>,
    pub po_reference: Option<String>,
    pub state: PoUploadState,
    pub has_invalid_sku: bool,
    pub has_all_valid_sku: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::po_upload_line::Entity")]
    PoUploadLines,
}

impl Related<super::po_upload_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PoUploadLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Stored summary of the validity flags of an upload's lines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SkuStatus {
    pub has_invalid_sku: bool,
    pub has_all_valid_sku: bool,
}

impl SkuStatus {
    pub fn from_lines<'a, I>(lines: I) -> Self
    where
        I: IntoIterator<Item = &'a super::po_upload_line::Model>,
    {
        let (mut any_valid, mut any_invalid) = (false, false);
        for line in lines {
            any_valid |= line.is_valid_sku;
            any_invalid |= line.is_invalid_sku;
        }
        Self {
            has_invalid_sku: any_invalid,
            has_all_valid_sku: any_valid && !any_invalid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::po_upload_line::{self, SkuValidity};
    use chrono::Utc;
    use std::str::FromStr;

    fn line(validity: Option<SkuValidity>) -> po_upload_line::Model {
        let (is_valid_sku, is_invalid_sku) = validity.map(SkuValidity::flags).unwrap_or((false, true));
        po_upload_line::Model {
            id: 1,
            upload_id: 1,
            customer_id: 1,
            vendor_id: 2,
            sales_order_id: None,
            buyer_order_number: None,
            sku_no: "A1".into(),
            quantity: None,
            vendor_code: None,
            order_date: None,
            po_issue_date: None,
            vendor_ex_fact_date: None,
            is_valid_sku,
            is_invalid_sku,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn no_lines_is_neither_invalid_nor_all_valid() {
        let status = SkuStatus::from_lines(std::iter::empty());
        assert_eq!(status, SkuStatus::default());
    }

    #[test]
    fn unvalidated_lines_count_as_invalid() {
        let lines = vec![line(None)];
        let status = SkuStatus::from_lines(&lines);
        assert!(status.has_invalid_sku);
        assert!(!status.has_all_valid_sku);
    }

    #[test]
    fn one_invalid_line_spoils_all_valid() {
        let lines = vec![line(Some(SkuValidity::Valid)), line(Some(SkuValidity::Invalid))];
        let status = SkuStatus::from_lines(&lines);
        assert!(status.has_invalid_sku);
        assert!(!status.has_all_valid_sku);
    }

    #[test]
    fn all_valid_lines() {
        let lines = vec![line(Some(SkuValidity::Valid)), line(Some(SkuValidity::Valid))];
        let status = SkuStatus::from_lines(&lines);
        assert!(!status.has_invalid_sku);
        assert!(status.has_all_valid_sku);
    }

    #[test]
    fn state_round_trips_through_its_label() {
        assert_eq!(PoUploadState::Validated.to_string(), "validated");
        assert_eq!(PoUploadState::from_str("cancel").unwrap(), PoUploadState::Cancel);
        assert!(PoUploadState::Confirm.is_terminal());
        assert!(!PoUploadState::Validated.is_terminal());
    }
}

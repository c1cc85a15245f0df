mod common;

use assert_matches::assert_matches;
use common::TestApp;
use po_upload_api::{
    entities::{
        po_upload::PoUploadState,
        po_upload_line::{self, Entity as PoUploadLineEntity},
        sales_order::{self, Entity as SalesOrderEntity, SalesOrderState},
        sales_order_line::Entity as SalesOrderLineEntity,
    },
    errors::ServiceError,
};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

async fn validated_upload(app: &TestApp, lines: Vec<(&str, Option<&str>)>) -> i64 {
    let inputs = lines
        .into_iter()
        .map(|(sku, buyer_order)| app.line(sku, buyer_order))
        .collect();
    let detail = app.upload_with(inputs).await;
    let report = app.service().validate(detail.upload.id).await.unwrap();
    assert_eq!(report.state, PoUploadState::Validated);
    detail.upload.id
}

#[tokio::test]
async fn one_quotation_per_buyer_order() {
    let app = TestApp::new().await;
    app.catalog_item("A1", Decimal::from(10)).await;
    app.catalog_item("B2", Decimal::from(20)).await;
    let upload_id =
        validated_upload(&app, vec![("A1", Some("B1")), ("B2", Some("B1")), ("A1", Some("B2"))])
            .await;

    let summary = app.service().confirm(upload_id).await.unwrap();

    assert_eq!(summary.state, PoUploadState::Confirm);
    assert_eq!(summary.quotations.len(), 2);
    assert_eq!(summary.quotations[0].buyer_order_no.as_deref(), Some("B1"));
    assert_eq!(summary.quotations[0].line_count, 2);
    assert_eq!(summary.quotations[1].buyer_order_no.as_deref(), Some("B2"));
    assert_eq!(summary.quotations[1].line_count, 1);
    assert!(summary.skipped_skus.is_empty());

    let orders = SalesOrderEntity::find()
        .order_by_asc(sales_order::Column::Id)
        .all(app.db())
        .await
        .unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0].name, "S00001");
    assert_eq!(orders[1].name, "S00002");
    for order in &orders {
        assert_eq!(order.state, SalesOrderState::Draft);
        assert_eq!(order.partner_id, app.partners.customer_id);
        assert_eq!(order.vendor_id, Some(app.partners.vendor_id));
        assert_eq!(order.origin.as_deref(), Some("PO-REF-1"));
        assert_eq!(order.po_upload_no.as_deref(), Some("POU/00001"));
    }
}

#[tokio::test]
async fn quotation_lines_take_price_and_quantity() {
    let app = TestApp::new().await;
    let (_, variant_id) = app.catalog_item("A1", Decimal::from(15)).await;
    let upload_id = validated_upload(&app, vec![("A1", Some("X"))]).await;

    app.service().confirm(upload_id).await.unwrap();

    let lines = SalesOrderLineEntity::find().all(app.db()).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].product_variant_id, variant_id);
    assert_eq!(lines[0].product_uom_qty, Decimal::from(2));
    assert_eq!(lines[0].price_unit, Decimal::from(15));
}

#[tokio::test]
async fn line_without_quantity_is_quoted_as_one() {
    let app = TestApp::new().await;
    app.catalog_item("A1", Decimal::from(10)).await;
    let upload_id = validated_upload(&app, vec![("A1", Some("X"))]).await;

    let line = PoUploadLineEntity::find()
        .filter(po_upload_line::Column::UploadId.eq(upload_id))
        .one(app.db())
        .await
        .unwrap()
        .unwrap();
    let mut line: po_upload_line::ActiveModel = line.into();
    line.quantity = Set(None);
    line.update(app.db()).await.unwrap();

    app.service().confirm(upload_id).await.unwrap();

    let lines = SalesOrderLineEntity::find().all(app.db()).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].product_uom_qty, Decimal::ONE);
}

#[tokio::test]
async fn lines_without_buyer_order_share_one_quotation() {
    let app = TestApp::new().await;
    app.catalog_item("A1", Decimal::from(10)).await;
    let upload_id =
        validated_upload(&app, vec![("A1", None), ("A1", Some("B1")), ("A1", Some(" "))]).await;

    let summary = app.service().confirm(upload_id).await.unwrap();

    assert_eq!(summary.quotations.len(), 2);
    assert_eq!(summary.quotations[0].buyer_order_no, None);
    assert_eq!(summary.quotations[0].line_count, 2);
    assert_eq!(summary.quotations[1].buyer_order_no.as_deref(), Some("B1"));
}

#[tokio::test]
async fn confirmed_lines_link_to_their_quotation() {
    let app = TestApp::new().await;
    app.catalog_item("A1", Decimal::from(10)).await;
    app.catalog_item("B2", Decimal::from(10)).await;
    let upload_id = validated_upload(&app, vec![("A1", Some("X")), ("B2", Some("Y"))]).await;

    let summary = app.service().confirm(upload_id).await.unwrap();

    let lines = PoUploadLineEntity::find()
        .filter(po_upload_line::Column::UploadId.eq(upload_id))
        .order_by_asc(po_upload_line::Column::Id)
        .all(app.db())
        .await
        .unwrap();
    assert_eq!(lines[0].sales_order_id, Some(summary.quotations[0].id));
    assert_eq!(lines[1].sales_order_id, Some(summary.quotations[1].id));
}

#[tokio::test]
async fn sku_removed_from_catalog_is_skipped() {
    let app = TestApp::new().await;
    let (template_id, _) = app.catalog_item("A1", Decimal::from(10)).await;
    app.catalog_item("B2", Decimal::from(10)).await;
    let upload_id = validated_upload(&app, vec![("A1", Some("X")), ("B2", Some("X"))]).await;

    po_upload_api::entities::product_template::Entity::delete_by_id(template_id)
        .exec(app.db())
        .await
        .unwrap();

    let summary = app.service().confirm(upload_id).await.unwrap();

    assert_eq!(summary.quotations.len(), 1);
    assert_eq!(summary.quotations[0].line_count, 1);
    assert_eq!(summary.skipped_skus, vec!["A1".to_string()]);

    let unlinked = PoUploadLineEntity::find()
        .filter(po_upload_line::Column::UploadId.eq(upload_id))
        .filter(po_upload_line::Column::SalesOrderId.is_null())
        .count(app.db())
        .await
        .unwrap();
    assert_eq!(unlinked, 1);
}

#[tokio::test]
async fn only_validated_uploads_confirm() {
    let app = TestApp::new().await;
    let detail = app.upload_with(vec![app.line("UNKNOWN", Some("X"))]).await;
    app.service().validate(detail.upload.id).await.unwrap();

    assert_matches!(
        app.service().confirm(detail.upload.id).await,
        Err(ServiceError::InvalidOperation(_))
    );

    let after = app.service().get_upload(detail.upload.id).await.unwrap();
    assert_eq!(after.upload.state, PoUploadState::New);
    assert!(after.lines.iter().all(|line| line.sales_order_id.is_none()));
    assert_eq!(SalesOrderEntity::find().count(app.db()).await.unwrap(), 0);
}

#[tokio::test]
async fn confirming_twice_is_refused() {
    let app = TestApp::new().await;
    app.catalog_item("A1", Decimal::from(10)).await;
    let upload_id = validated_upload(&app, vec![("A1", Some("X"))]).await;

    app.service().confirm(upload_id).await.unwrap();
    assert_matches!(
        app.service().confirm(upload_id).await,
        Err(ServiceError::InvalidOperation(_))
    );
    assert_eq!(SalesOrderEntity::find().count(app.db()).await.unwrap(), 1);
}

#[tokio::test]
async fn template_without_variant_rolls_back() {
    let app = TestApp::new().await;
    app.catalog_item("A1", Decimal::from(10)).await;
    app.catalog_template("HOLLOW", Decimal::from(10)).await;
    let upload_id = validated_upload(&app, vec![("A1", Some("X")), ("HOLLOW", Some("Y"))]).await;

    assert_matches!(
        app.service().confirm(upload_id).await,
        Err(ServiceError::NotFound(_))
    );

    let after = app.service().get_upload(upload_id).await.unwrap();
    assert_eq!(after.upload.state, PoUploadState::Validated);
    assert!(after.lines.iter().all(|line| line.sales_order_id.is_none()));
    assert_eq!(SalesOrderEntity::find().count(app.db()).await.unwrap(), 0);
}

#[tokio::test]
async fn quotations_are_listed_per_upload() {
    let app = TestApp::new().await;
    app.catalog_item("A1", Decimal::from(10)).await;
    let upload_id = validated_upload(&app, vec![("A1", Some("X")), ("A1", Some("X"))]).await;
    app.service().confirm(upload_id).await.unwrap();

    let quotations = app.service().quotations_for_upload(upload_id).await.unwrap();

    assert_eq!(quotations.len(), 1);
    assert_eq!(quotations[0].order.buyer_order_no.as_deref(), Some("X"));
    assert_eq!(quotations[0].lines.len(), 2);
}

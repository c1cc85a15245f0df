use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_partners_table::Migration),
            Box::new(m20250301_000002_create_catalog_tables::Migration),
            Box::new(m20250301_000003_create_sales_order_tables::Migration),
            Box::new(m20250301_000004_create_sequences_table::Migration),
            Box::new(m20250301_000005_create_po_upload_tables::Migration),
        ]
    }
}

// Migration implementations

mod m20250301_000001_create_partners_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000001_create_partners_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Partners::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Partners::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Partners::Name).string().not_null())
                        .col(
                            ColumnDef::new(Partners::IsCompany)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Partners::CustomerRank)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Partners::SupplierRank)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Partners::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Partners::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Partners::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum Partners {
        Table,
        Id,
        Name,
        IsCompany,
        CustomerRank,
        SupplierRank,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250301_000002_create_catalog_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000002_create_catalog_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ProductTemplates::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ProductTemplates::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(ProductTemplates::Name).string().not_null())
                        .col(ColumnDef::new(ProductTemplates::BuyerStyleNo).string().null())
                        .col(
                            ColumnDef::new(ProductTemplates::ListPrice)
                                .decimal_len(16, 4)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(ProductTemplates::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductTemplates::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            // SKU validation looks templates up by style number
            manager
                .create_index(
                    Index::create()
                        .name("idx_product_templates_buyer_style_no")
                        .table(ProductTemplates::Table)
                        .col(ProductTemplates::BuyerStyleNo)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ProductVariants::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ProductVariants::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(ProductVariants::ProductTemplateId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ProductVariants::DefaultCode).string().null())
                        .col(
                            ColumnDef::new(ProductVariants::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductVariants::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_product_variants_template")
                                .from(ProductVariants::Table, ProductVariants::ProductTemplateId)
                                .to(ProductTemplates::Table, ProductTemplates::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ProductVariants::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(ProductTemplates::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum ProductTemplates {
        Table,
        Id,
        Name,
        BuyerStyleNo,
        ListPrice,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub enum ProductVariants {
        Table,
        Id,
        ProductTemplateId,
        DefaultCode,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250301_000003_create_sales_order_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000003_create_sales_order_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(SalesOrders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(SalesOrders::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(SalesOrders::Name).string().not_null())
                        .col(ColumnDef::new(SalesOrders::PartnerId).big_integer().not_null())
                        .col(ColumnDef::new(SalesOrders::VendorId).big_integer().null())
                        .col(ColumnDef::new(SalesOrders::Origin).string().null())
                        .col(
                            ColumnDef::new(SalesOrders::State)
                                .string_len(16)
                                .not_null()
                                .default("draft"),
                        )
                        .col(ColumnDef::new(SalesOrders::PoUploadNo).string().null())
                        .col(ColumnDef::new(SalesOrders::BuyerOrderNo).string().null())
                        .col(ColumnDef::new(SalesOrders::PoIssueDate).date().null())
                        .col(ColumnDef::new(SalesOrders::ExFactoryDate).date().null())
                        .col(
                            ColumnDef::new(SalesOrders::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SalesOrders::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_sales_orders_po_upload_no")
                        .table(SalesOrders::Table)
                        .col(SalesOrders::PoUploadNo)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(SalesOrderLines::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(SalesOrderLines::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(SalesOrderLines::OrderId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SalesOrderLines::ProductVariantId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SalesOrderLines::ProductUomQty)
                                .decimal_len(16, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SalesOrderLines::PriceUnit)
                                .decimal_len(16, 4)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SalesOrderLines::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SalesOrderLines::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_sales_order_lines_order")
                                .from(SalesOrderLines::Table, SalesOrderLines::OrderId)
                                .to(SalesOrders::Table, SalesOrders::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(SalesOrderLines::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(SalesOrders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum SalesOrders {
        Table,
        Id,
        Name,
        PartnerId,
        VendorId,
        Origin,
        State,
        PoUploadNo,
        BuyerOrderNo,
        PoIssueDate,
        ExFactoryDate,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub enum SalesOrderLines {
        Table,
        Id,
        OrderId,
        ProductVariantId,
        ProductUomQty,
        PriceUnit,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250301_000004_create_sequences_table {

    use crate::services::sequences::{QUOTATION_SEQUENCE, UPLOAD_SEQUENCE};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000004_create_sequences_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Sequences::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Sequences::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Sequences::Code)
                                .string_len(64)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Sequences::Prefix).string_len(32).null())
                        .col(
                            ColumnDef::new(Sequences::Padding)
                                .integer()
                                .not_null()
                                .default(5),
                        )
                        .col(
                            ColumnDef::new(Sequences::NumberNext)
                                .big_integer()
                                .not_null()
                                .default(1),
                        )
                        .col(
                            ColumnDef::new(Sequences::NumberIncrement)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .to_owned(),
                )
                .await?;

            let mut seed = Query::insert();
            seed.into_table(Sequences::Table).columns([
                Sequences::Code,
                Sequences::Prefix,
                Sequences::Padding,
                Sequences::NumberNext,
                Sequences::NumberIncrement,
            ]);
            for (code, prefix) in [(UPLOAD_SEQUENCE, "POU/"), (QUOTATION_SEQUENCE, "S")] {
                seed.values([
                    code.into(),
                    prefix.into(),
                    5i32.into(),
                    1i64.into(),
                    1i32.into(),
                ])
                .map_err(|e| DbErr::Custom(e.to_string()))?;
            }
            manager.exec_stmt(seed).await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Sequences::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum Sequences {
        Table,
        Id,
        Code,
        Prefix,
        Padding,
        NumberNext,
        NumberIncrement,
    }
}

mod m20250301_000005_create_po_upload_tables {

    use super::m20250301_000001_create_partners_table::Partners;
    use super::m20250301_000003_create_sales_order_tables::SalesOrders;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250301_000005_create_po_upload_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(PoUploads::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PoUploads::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(PoUploads::Name)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(PoUploads::CreatedBy).string().null())
                        .col(ColumnDef::new(PoUploads::CreatedOn).date().null())
                        .col(ColumnDef::new(PoUploads::PoReference).string().null())
                        .col(
                            ColumnDef::new(PoUploads::State)
                                .string_len(16)
                                .not_null()
                                .default("new"),
                        )
                        .col(
                            ColumnDef::new(PoUploads::HasInvalidSku)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(PoUploads::HasAllValidSku)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(PoUploads::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PoUploads::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_po_uploads_state")
                        .table(PoUploads::Table)
                        .col(PoUploads::State)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(PoUploadLines::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PoUploadLines::Id)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(PoUploadLines::UploadId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PoUploadLines::CustomerId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PoUploadLines::VendorId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PoUploadLines::SalesOrderId)
                                .big_integer()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(PoUploadLines::BuyerOrderNumber)
                                .string()
                                .null(),
                        )
                        .col(ColumnDef::new(PoUploadLines::SkuNo).string().not_null())
                        .col(
                            ColumnDef::new(PoUploadLines::Quantity)
                                .decimal_len(16, 4)
                                .null(),
                        )
                        .col(ColumnDef::new(PoUploadLines::VendorCode).string().null())
                        .col(ColumnDef::new(PoUploadLines::OrderDate).date().null())
                        .col(ColumnDef::new(PoUploadLines::PoIssueDate).date().null())
                        .col(
                            ColumnDef::new(PoUploadLines::VendorExFactDate)
                                .date()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(PoUploadLines::IsValidSku)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(PoUploadLines::IsInvalidSku)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(PoUploadLines::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PoUploadLines::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_po_upload_lines_upload")
                                .from(PoUploadLines::Table, PoUploadLines::UploadId)
                                .to(PoUploads::Table, PoUploads::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_po_upload_lines_customer")
                                .from(PoUploadLines::Table, PoUploadLines::CustomerId)
                                .to(Partners::Table, Partners::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_po_upload_lines_vendor")
                                .from(PoUploadLines::Table, PoUploadLines::VendorId)
                                .to(Partners::Table, Partners::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_po_upload_lines_sales_order")
                                .from(PoUploadLines::Table, PoUploadLines::SalesOrderId)
                                .to(SalesOrders::Table, SalesOrders::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_po_upload_lines_upload_id")
                        .table(PoUploadLines::Table)
                        .col(PoUploadLines::UploadId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PoUploadLines::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(PoUploads::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum PoUploads {
        Table,
        Id,
        Name,
        CreatedBy,
        CreatedOn,
        PoReference,
        State,
        HasInvalidSku,
        HasAllValidSku,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub enum PoUploadLines {
        Table,
        Id,
        UploadId,
        CustomerId,
        VendorId,
        SalesOrderId,
        BuyerOrderNumber,
        SkuNo,
        Quantity,
        VendorCode,
        OrderDate,
        PoIssueDate,
        VendorExFactDate,
        IsValidSku,
        IsInvalidSku,
        CreatedAt,
        UpdatedAt,
    }
}

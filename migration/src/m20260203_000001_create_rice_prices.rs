use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Append-only log of scraped wholesale prices
        manager
            .create_table(
                Table::create()
                    .table(RicePrices::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RicePrices::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(RicePrices::Price)
                            .big_integer()
                            .not_null()
                            .check(Expr::col(RicePrices::Price).gte(0)),
                    )
                    .col(
                        ColumnDef::new(RicePrices::ItemName)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RicePrices::Location)
                            .string_len(50)
                            .not_null()
                            .default("평균"),
                    )
                    .col(
                        ColumnDef::new(RicePrices::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .to_owned(),
            )
            .await?;

        // Snapshot reads scan from the newest batch backwards
        manager
            .create_index(
                Index::create()
                    .name("idx_rice_prices_created_at")
                    .table(RicePrices::Table)
                    .col((RicePrices::CreatedAt, IndexOrder::Desc))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_rice_prices_location_created_at")
                    .table(RicePrices::Table)
                    .col(RicePrices::Location)
                    .col(RicePrices::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RicePrices::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum RicePrices {
    Table,
    Id,
    Price,
    ItemName,
    Location,
    CreatedAt,
}

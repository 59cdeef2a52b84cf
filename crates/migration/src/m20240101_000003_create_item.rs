//! Create `item` table.
//! Items are the sellable units of a product.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Item::Table)
                    .if_not_exists()
                    .col(pk_auto(Item::Id))
                    .col(integer(Item::Version))
                    .col(string_len(Item::Name, 64))
                    .col(string_len_null(Item::Description, 1024))
                    .col(string_len_null(Item::ImagePath, 256))
                    .col(double(Item::UnitCost))
                    .col(integer_null(Item::ProductId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_item_product")
                            .from(Item::Table, Item::ProductId)
                            .to(Product::Table, Product::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Item::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Item { Table, Id, Version, Name, Description, ImagePath, UnitCost, ProductId }

#[derive(DeriveIden)]
enum Product { Table, Id }

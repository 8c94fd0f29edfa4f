use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

const INDEXED_TABLES: [&str; 4] = ["weather", "events", "movies", "yelp"];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in INDEXED_TABLES {
            manager
                .create_index(
                    Index::create()
                        .name(format!("idx_{table}_location_id"))
                        .table(Alias::new(table))
                        .col(LocationScoped::LocationId)
                        .if_not_exists()
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in INDEXED_TABLES {
            manager
                .drop_index(
                    Index::drop()
                        .name(format!("idx_{table}_location_id"))
                        .table(Alias::new(table))
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }
}

#[derive(DeriveIden)]
enum LocationScoped {
    LocationId,
}

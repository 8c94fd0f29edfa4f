use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Locations::Table)
                    .if_not_exists()
                    .col(pk_auto(Locations::Id))
                    .col(string(Locations::SearchQuery).unique_key())
                    .col(string(Locations::FormattedQuery))
                    .col(double(Locations::Latitude))
                    .col(double(Locations::Longitude))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Weather::Table)
                    .if_not_exists()
                    .col(pk_auto(Weather::Id))
                    .col(text(Weather::Forecast))
                    .col(string(Weather::Time))
                    .col(big_integer(Weather::CreatedAt))
                    .col(integer(Weather::LocationId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_weather_location")
                            .from(Weather::Table, Weather::LocationId)
                            .to(Locations::Table, Locations::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Events::Table)
                    .if_not_exists()
                    .col(pk_auto(Events::Id))
                    .col(string(Events::Link))
                    .col(string(Events::Name))
                    .col(string(Events::EventDate))
                    .col(text_null(Events::Summary))
                    .col(big_integer(Events::CreatedAt))
                    .col(integer(Events::LocationId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_events_location")
                            .from(Events::Table, Events::LocationId)
                            .to(Locations::Table, Locations::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Movies::Table)
                    .if_not_exists()
                    .col(pk_auto(Movies::Id))
                    .col(string(Movies::Title))
                    .col(text(Movies::Overview))
                    .col(double(Movies::AverageVotes))
                    .col(integer(Movies::TotalVotes))
                    .col(string(Movies::ImageUrl))
                    .col(double(Movies::Popularity))
                    .col(string(Movies::ReleasedOn))
                    .col(big_integer(Movies::CreatedAt))
                    .col(integer(Movies::LocationId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movies_location")
                            .from(Movies::Table, Movies::LocationId)
                            .to(Locations::Table, Locations::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Yelp::Table)
                    .if_not_exists()
                    .col(pk_auto(Yelp::Id))
                    .col(string(Yelp::Name))
                    .col(string(Yelp::ImageUrl))
                    .col(string_null(Yelp::Price))
                    .col(double(Yelp::Rating))
                    .col(string(Yelp::Url))
                    .col(big_integer(Yelp::CreatedAt))
                    .col(integer(Yelp::LocationId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_yelp_location")
                            .from(Yelp::Table, Yelp::LocationId)
                            .to(Locations::Table, Locations::Id),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Yelp::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Movies::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Events::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Weather::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Locations::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Locations {
    Table,
    Id,
    SearchQuery,
    FormattedQuery,
    Latitude,
    Longitude,
}

#[derive(DeriveIden)]
enum Weather {
    Table,
    Id,
    Forecast,
    Time,
    CreatedAt,
    LocationId,
}

#[derive(DeriveIden)]
enum Events {
    Table,
    Id,
    Link,
    Name,
    EventDate,
    Summary,
    CreatedAt,
    LocationId,
}

#[derive(DeriveIden)]
enum Movies {
    Table,
    Id,
    Title,
    Overview,
    AverageVotes,
    TotalVotes,
    ImageUrl,
    Popularity,
    ReleasedOn,
    CreatedAt,
    LocationId,
}

#[derive(DeriveIden)]
enum Yelp {
    Table,
    Id,
    Name,
    ImageUrl,
    Price,
    Rating,
    Url,
    CreatedAt,
    LocationId,
}

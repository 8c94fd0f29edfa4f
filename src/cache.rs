use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, TransactionTrait,
};
use tracing::debug;

use crate::{
    entities::{event, location, movie, weather, yelp},
    error::AppResult,
    models::Location,
};

/// A table whose rows all belong to one location.
pub trait LocationScoped: EntityTrait {
    fn location_column() -> Self::Column;
    fn id_column() -> Self::Column;
}

/// A transient record that is persisted as one row of a location-scoped table.
pub trait Record: Sized {
    type Entity: LocationScoped;
    type ActiveModel: ActiveModelTrait<Entity = Self::Entity> + Send + 'static;

    fn to_active_model(&self, location_id: i32) -> Self::ActiveModel;
    fn from_model(row: <Self::Entity as EntityTrait>::Model) -> Self;
    fn created_at(&self) -> i64;
}

/// Outcome of looking up the cached rows of one resource for one location.
#[derive(Debug, PartialEq)]
pub enum Lookup<R> {
    Hit(Vec<R>),
    Miss,
}

#[derive(Clone)]
pub struct CacheStore {
    db: DatabaseConnection,
}

impl CacheStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub async fn find_location(&self, search_query: &str) -> AppResult<Option<Location>> {
        let row = location::Entity::find()
            .filter(location::Column::SearchQuery.eq(search_query))
            .one(&self.db)
            .await?;
        Ok(row.map(Location::from))
    }

    /// Persists a freshly geocoded location and returns it with its generated id.
    pub async fn insert_location(&self, location: &Location) -> AppResult<Location> {
        let row = location.to_active_model().insert(&self.db).await?;
        debug!(id = row.id, search_query = %row.search_query, "stored location");
        Ok(Location::from(row))
    }

    /// All cached rows of `R` for a location, in insertion order.
    pub async fn lookup<R: Record>(&self, location_id: i32) -> AppResult<Lookup<R>> {
        let rows = <R::Entity as EntityTrait>::find()
            .filter(R::Entity::location_column().eq(location_id))
            .order_by_asc(R::Entity::id_column())
            .all(&self.db)
            .await?;

        if rows.is_empty() {
            return Ok(Lookup::Miss);
        }
        Ok(Lookup::Hit(rows.into_iter().map(R::from_model).collect()))
    }

    pub async fn save_all<R: Record>(&self, location_id: i32, records: &[R]) -> AppResult<()> {
        let txn = self.db.begin().await?;
        insert_rows(&txn, location_id, records).await?;
        txn.commit().await?;
        Ok(())
    }

    /// Drops every cached row of `R` for the location and stores `records` in their place.
    pub async fn replace_all<R: Record>(&self, location_id: i32, records: &[R]) -> AppResult<()> {
        let txn = self.db.begin().await?;
        delete_rows::<R, _>(&txn, location_id).await?;
        insert_rows(&txn, location_id, records).await?;
        txn.commit().await?;
        Ok(())
    }
}

async fn insert_rows<R: Record, C: ConnectionTrait>(
    conn: &C,
    location_id: i32,
    records: &[R],
) -> AppResult<()> {
    for record in records {
        <R::Entity as EntityTrait>::insert(record.to_active_model(location_id)).exec(conn).await?;
    }
    Ok(())
}

async fn delete_rows<R: Record, C: ConnectionTrait>(conn: &C, location_id: i32) -> AppResult<u64> {
    let res = <R::Entity as EntityTrait>::delete_many()
        .filter(R::Entity::location_column().eq(location_id))
        .exec(conn)
        .await?;
    Ok(res.rows_affected)
}

impl LocationScoped for weather::Entity {
    fn location_column() -> weather::Column {
        weather::Column::LocationId
    }

    fn id_column() -> weather::Column {
        weather::Column::Id
    }
}

impl LocationScoped for event::Entity {
    fn location_column() -> event::Column {
        event::Column::LocationId
    }

    fn id_column() -> event::Column {
        event::Column::Id
    }
}

impl LocationScoped for movie::Entity {
    fn location_column() -> movie::Column {
        movie::Column::LocationId
    }

    fn id_column() -> movie::Column {
        movie::Column::Id
    }
}

impl LocationScoped for yelp::Entity {
    fn location_column() -> yelp::Column {
        yelp::Column::LocationId
    }

    fn id_column() -> yelp::Column {
        yelp::Column::Id
    }
}

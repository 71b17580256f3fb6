use async_trait::async_trait;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel,
    QueryFilter, Set, TransactionTrait,
};
use time::OffsetDateTime;
use tower_sessions::{session::Id, session::Record, session_store, ExpiredDeletion, SessionStore};

use crate::entity::session::{self, ActiveModel as SessionActiveModel, Entity as SessionEntity};

/// A session store for tower-sessions persisting records through Sea-ORM.
///
/// `SeaOrmStore` keeps every session in the `sessions` table of the same
/// database that holds users and roles, so the cookie only ever carries the
/// session id. Session data is serialized using MessagePack.
///
/// # Usage
///
/// ```no_run
/// use sea_orm::Database;
/// use time::Duration;
/// use tower_sessions::{Expiry, SessionManagerLayer};
/// use roster::SeaOrmStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let conn = Database::connect("sqlite://data.sqlite?mode=rwc").await?;
/// let store = SeaOrmStore::new(conn);
///
/// let session_layer = SessionManagerLayer::new(store)
///     .with_expiry(Expiry::OnInactivity(Duration::hours(24)));
/// # Ok(())
/// # }
/// ```
///
/// # Error Handling
///
/// - Database errors → `session_store::Error::Backend`
/// - Serialization errors → `session_store::Error::Encode`
/// - Deserialization errors → `session_store::Error::Decode`
#[derive(Debug, Clone)]
pub struct SeaOrmStore {
    conn: DatabaseConnection,
}

impl SeaOrmStore {
    /// Creates a store on top of an already migrated connection.
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl SessionStore for SeaOrmStore {
    /// Inserts a new session record.
    ///
    /// The id lookup and insert share a transaction; on an id collision a
    /// fresh id is drawn and written back into `record`.
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        let txn = self.conn.begin().await.map_err(backend)?;

        while SessionEntity::find_by_id(record.id.to_string())
            .one(&txn)
            .await
            .map_err(backend)?
            .is_some()
        {
            record.id = Id::default();
        }

        let data =
            rmp_serde::to_vec(record).map_err(|e| session_store::Error::Encode(e.to_string()))?;
        let expiry_date = convert_time_to_datetime(record.expiry_date)?;

        SessionActiveModel {
            id: Set(record.id.to_string()),
            data: Set(data),
            expiry_date: Set(expiry_date),
        }
        .insert(&txn)
        .await
        .map_err(backend)?;

        txn.commit().await.map_err(backend)?;

        Ok(())
    }

    /// Updates the record if its id is stored, inserts it otherwise.
    async fn save(&self, record: &Record) -> session_store::Result<()> {
        let data =
            rmp_serde::to_vec(record).map_err(|e| session_store::Error::Encode(e.to_string()))?;
        let expiry_date = convert_time_to_datetime(record.expiry_date)?;

        match SessionEntity::find_by_id(record.id.to_string())
            .one(&self.conn)
            .await
            .map_err(backend)?
        {
            Some(existing) => {
                let mut active_model = existing.into_active_model();
                active_model.data = Set(data);
                active_model.expiry_date = Set(expiry_date);
                active_model.update(&self.conn).await.map_err(backend)?;
            }
            None => {
                SessionActiveModel {
                    id: Set(record.id.to_string()),
                    data: Set(data),
                    expiry_date: Set(expiry_date),
                }
                .insert(&self.conn)
                .await
                .map_err(backend)?;
            }
        }

        Ok(())
    }

    /// Loads a record by id. Expired records are treated as missing.
    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        let now = convert_time_to_datetime(OffsetDateTime::now_utc())?;

        let session = SessionEntity::find_by_id(session_id.to_string())
            .filter(session::Column::ExpiryDate.gt(now))
            .one(&self.conn)
            .await
            .map_err(backend)?;

        match session {
            Some(model) => {
                let record = rmp_serde::from_slice(&model.data)
                    .map_err(|e| session_store::Error::Decode(e.to_string()))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        SessionEntity::delete_by_id(session_id.to_string())
            .exec(&self.conn)
            .await
            .map_err(backend)?;

        Ok(())
    }
}

#[async_trait]
impl ExpiredDeletion for SeaOrmStore {
    /// Bulk-deletes every record whose expiry date is in the past.
    ///
    /// The server never schedules this; `roster-shell purge-sessions` runs it.
    async fn delete_expired(&self) -> session_store::Result<()> {
        let now = convert_time_to_datetime(OffsetDateTime::now_utc())?;

        SessionEntity::delete_many()
            .filter(session::Column::ExpiryDate.lt(now))
            .exec(&self.conn)
            .await
            .map_err(backend)?;

        Ok(())
    }
}

/// Maps a Sea-ORM failure onto the store's backend error.
fn backend(err: DbErr) -> session_store::Error {
    session_store::Error::Backend(err.to_string())
}

/// Converts a `time` expiry into Sea-ORM's chrono based timestamp.
///
/// Instants chrono cannot represent are reported as `Encode` errors.
fn convert_time_to_datetime(time: OffsetDateTime) -> session_store::Result<DateTimeWithTimeZone> {
    chrono::DateTime::from_timestamp(time.unix_timestamp(), time.nanosecond())
        .map(Into::into)
        .ok_or_else(|| {
            session_store::Error::Encode(format!("expiry date {time} is out of range"))
        })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use sea_orm::PaginatorTrait;
    use time::Duration;

    use super::*;
    use crate::db;

    async fn store() -> SeaOrmStore {
        SeaOrmStore::new(db::connect("sqlite::memory:", 1).await.unwrap())
    }

    fn record(expires_in: Duration) -> Record {
        let mut data = HashMap::new();
        data.insert("name".to_string(), serde_json::json!("Ada"));
        Record {
            id: Id::default(),
            data,
            expiry_date: OffsetDateTime::now_utc() + expires_in,
        }
    }

    #[tokio::test]
    async fn create_then_load_returns_the_record() {
        let store = store().await;
        let mut rec = record(Duration::hours(1));

        store.create(&mut rec).await.unwrap();
        let loaded = store.load(&rec.id).await.unwrap().unwrap();

        assert_eq!(loaded.id, rec.id);
        assert_eq!(loaded.data, rec.data);
    }

    #[tokio::test]
    async fn create_moves_to_a_fresh_id_on_collision() {
        let store = store().await;
        let mut first = record(Duration::hours(1));
        store.create(&mut first).await.unwrap();

        let mut second = record(Duration::hours(1));
        second.id = first.id;
        store.create(&mut second).await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(SessionEntity::find().count(&store.conn).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn save_upserts() {
        let store = store().await;
        let mut rec = record(Duration::hours(1));

        store.save(&rec).await.unwrap();
        rec.data.insert("known".to_string(), serde_json::json!(true));
        store.save(&rec).await.unwrap();

        let loaded = store.load(&rec.id).await.unwrap().unwrap();
        assert_eq!(loaded.data.get("known"), Some(&serde_json::json!(true)));
        assert_eq!(SessionEntity::find().count(&store.conn).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn expired_records_are_not_loaded_and_get_purged() {
        let store = store().await;
        let mut stale = record(Duration::hours(-1));
        let mut fresh = record(Duration::hours(1));
        store.create(&mut stale).await.unwrap();
        store.create(&mut fresh).await.unwrap();

        assert!(store.load(&stale.id).await.unwrap().is_none());

        store.delete_expired().await.unwrap();
        assert_eq!(SessionEntity::find().count(&store.conn).await.unwrap(), 1);
        assert!(store.load(&fresh.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn delete_removes_the_record() {
        let store = store().await;
        let mut rec = record(Duration::hours(1));
        store.create(&mut rec).await.unwrap();

        store.delete(&rec.id).await.unwrap();

        assert!(store.load(&rec.id).await.unwrap().is_none());
    }
}

use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, to_bson},
    options::IndexOptions,
    Collection, IndexModel,
};

use crate::{
    db::Database,
    errors::{AppError, AppResult},
    models::domain::RefreshToken,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    /// Replace-on-issue: removes whatever record the user had and inserts
    /// the fresh one, keeping the per-user relation one-to-one.
    async fn replace_for_user(&self, record: RefreshToken) -> AppResult<RefreshToken>;

    /// All of the user's records that accept the presented value right now,
    /// on either the current or the grace path.
    async fn find_matching(&self, user_id: &str, presented: &str) -> AppResult<Vec<RefreshToken>>;

    /// Persists a rotation as a compare-and-swap keyed on the record id and
    /// the current-token hash observed at read time. A competing rotation
    /// that committed first makes the filter miss; that surfaces as
    /// `ConcurrencyConflict`.
    async fn commit_rotation(&self, record: &RefreshToken, observed_hash: &str) -> AppResult<()>;

    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoRefreshTokenRepository {
    collection: Collection<RefreshToken>,
}

impl MongoRefreshTokenRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("refresh_tokens");
        Self { collection }
    }
}

#[async_trait]
impl RefreshTokenRepository for MongoRefreshTokenRepository {
    async fn replace_for_user(&self, record: RefreshToken) -> AppResult<RefreshToken> {
        self.collection
            .delete_many(doc! { "user_id": &record.user_id })
            .await?;
        self.collection.insert_one(&record).await?;
        Ok(record)
    }

    async fn find_matching(&self, user_id: &str, presented: &str) -> AppResult<Vec<RefreshToken>> {
        // The per-user set is bounded (one record under the singleton
        // invariant), so expiry filtering happens here rather than in a
        // BSON date comparison.
        let cursor = self.collection.find(doc! { "user_id": user_id }).await?;
        let records: Vec<RefreshToken> = cursor.try_collect().await?;

        let now = Utc::now();
        Ok(records
            .into_iter()
            .filter(|r| r.matches(presented, now))
            .collect())
    }

    async fn commit_rotation(&self, record: &RefreshToken, observed_hash: &str) -> AppResult<()> {
        let id = record.id.ok_or_else(|| {
            AppError::InternalError("Cannot rotate refresh token without id".to_string())
        })?;

        let filter = doc! { "_id": id, "token_hash": observed_hash };
        let update = doc! { "$set": {
            "token_hash": &record.token_hash,
            "expires_at": to_bson(&record.expires_at)?,
            "previous_token_hash": to_bson(&record.previous_token_hash)?,
            "previous_expires_at": to_bson(&record.previous_expires_at)?,
        }};

        let result = self.collection.update_one(filter, update).await?;
        if result.matched_count == 0 {
            return Err(AppError::ConcurrencyConflict);
        }

        Ok(())
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        let user_id_options = IndexOptions::builder().unique(true).build();
        let user_id_model = IndexModel::builder()
            .keys(doc! { "user_id": 1 })
            .options(user_id_options)
            .build();
        self.collection.create_index(user_id_model).await?;
        log::info!("Created unique index on refresh_tokens.user_id");

        let token_hash_options = IndexOptions::builder().unique(true).build();
        let token_hash_model = IndexModel::builder()
            .keys(doc! { "token_hash": 1 })
            .options(token_hash_options)
            .build();
        self.collection.create_index(token_hash_model).await?;
        log::info!("Created unique index on refresh_tokens.token_hash");

        let expires_at_model = IndexModel::builder()
            .keys(doc! { "expires_at": 1 })
            .build();
        self.collection.create_index(expires_at_model).await?;
        log::info!("Created index on refresh_tokens.expires_at");

        Ok(())
    }
}

use async_trait::async_trait;
use mongodb::{bson::doc, Collection, IndexModel};

use crate::{db::Database, errors::AppResult, models::domain::RoleProfile};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoleProfileRepository: Send + Sync {
    async fn create(&self, profile: RoleProfile) -> AppResult<RoleProfile>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoRoleProfileRepository {
    collection: Collection<RoleProfile>,
}

impl MongoRoleProfileRepository {
    pub fn new(db: &Database) -> Self {
        let collection = db.get_collection("role_profiles");
        Self { collection }
    }
}

#[async_trait]
impl RoleProfileRepository for MongoRoleProfileRepository {
    async fn create(&self, profile: RoleProfile) -> AppResult<RoleProfile> {
        self.collection.insert_one(&profile).await?;
        Ok(profile)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        let model = IndexModel::builder().keys(doc! { "user_id": 1 }).build();
        self.collection.create_index(model).await?;
        log::info!("Created index on role_profiles.user_id");

        Ok(())
    }
}

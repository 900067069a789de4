use models::banner::{fields, Banner, BannerDocument};
use mongodb::bson::{self, Document};
use mongodb::options::{FindOptions, IndexOptions};
use mongodb::{Collection, Database, IndexModel};
use tracing::debug;
use uuid::Uuid;

use crate::banner::repository::BannerRepository;
use crate::errors::ServiceError;

/// MongoDB-backed banner repository.
pub struct MongoBannerRepository {
    collection: Collection<BannerDocument>,
}

impl MongoBannerRepository {
    pub fn new(db: &Database, collection: &str) -> Self {
        Self { collection: db.collection(collection) }
    }
}

fn by_id(id: Uuid) -> Document {
    let mut filter = Document::new();
    filter.insert(fields::ID, bson::Uuid::from_uuid_1(id));
    filter
}

fn db_err(e: mongodb::error::Error) -> ServiceError {
    ServiceError::Db(e.to_string())
}

#[async_trait::async_trait]
impl BannerRepository for MongoBannerRepository {
    async fn get_all(&self) -> Result<Vec<Banner>, ServiceError> {
        let mut sort = Document::new();
        sort.insert(fields::CREATED, 1);
        let options = FindOptions::builder().sort(sort).build();

        let mut cursor = self.collection.find(None, options).await.map_err(db_err)?;
        let mut banners = Vec::new();
        while cursor.advance().await.map_err(db_err)? {
            let doc = cursor.deserialize_current().map_err(db_err)?;
            banners.push(Banner::from(doc));
        }
        debug!(count = banners.len(), "banners loaded");
        Ok(banners)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Banner>, ServiceError> {
        let found = self.collection.find_one(by_id(id), None).await.map_err(db_err)?;
        Ok(found.map(Banner::from))
    }

    async fn insert(&self, banner: Banner) -> Result<Banner, ServiceError> {
        self.collection
            .insert_one(BannerDocument::from(&banner), None)
            .await
            .map_err(db_err)?;
        Ok(banner)
    }

    // No upsert: a replace that matches nothing is reported, not repaired.
    async fn replace(&self, id: Uuid, banner: &Banner) -> Result<bool, ServiceError> {
        let res = self
            .collection
            .replace_one(by_id(id), BannerDocument::from(banner), None)
            .await
            .map_err(db_err)?;
        Ok(res.matched_count > 0)
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool, ServiceError> {
        let res = self.collection.delete_one(by_id(id), None).await.map_err(db_err)?;
        Ok(res.deleted_count > 0)
    }

    async fn delete_all(&self) -> Result<u64, ServiceError> {
        let res = self.collection.delete_many(Document::new(), None).await.map_err(db_err)?;
        Ok(res.deleted_count)
    }

    async fn ensure_indexes(&self) -> Result<(), ServiceError> {
        let mut keys = Document::new();
        keys.insert(fields::ID, 1);
        let index = IndexModel::builder()
            .keys(keys)
            .options(IndexOptions::builder().unique(true).build())
            .build();
        let res = self.collection.create_index(index, None).await.map_err(db_err)?;
        debug!(index = %res.index_name, "banner id index ensured");
        Ok(())
    }
}

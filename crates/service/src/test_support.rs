#![cfg(test)]
use uuid::Uuid;

use crate::banner::repo::mongo::MongoBannerRepository;

/// Repository over a throwaway collection on the server named by
/// `MONGODB_URI`; `None` when the variable is unset so tests can skip.
pub async fn mongo_repository() -> Result<Option<MongoBannerRepository>, anyhow::Error> {
    let Some(db) = models::db::connect_from_env().await? else {
        return Ok(None);
    };
    let collection = format!("banner_test_{}", Uuid::new_v4().simple());
    Ok(Some(MongoBannerRepository::new(&db, &collection)))
}

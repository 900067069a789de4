use async_trait::async_trait;
use models::banner::Banner;
use uuid::Uuid;

use crate::errors::ServiceError;

/// Persistence abstraction for banners.
#[async_trait]
pub trait BannerRepository: Send + Sync {
    async fn get_all(&self) -> Result<Vec<Banner>, ServiceError>;
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Banner>, ServiceError>;
    async fn insert(&self, banner: Banner) -> Result<Banner, ServiceError>;
    /// Overwrite the stored banner with `id`; `false` when nothing matched.
    async fn replace(&self, id: Uuid, banner: &Banner) -> Result<bool, ServiceError>;
    /// Remove the banner with `id`; `false` when nothing matched.
    async fn delete_by_id(&self, id: Uuid) -> Result<bool, ServiceError>;
    /// Remove every banner, returning how many were deleted.
    async fn delete_all(&self) -> Result<u64, ServiceError>;
    async fn ensure_indexes(&self) -> Result<(), ServiceError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::sync::{Mutex, MutexGuard, PoisonError};

    /// Number of calls seen per repository operation.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub struct CallCounts {
        pub get_all: usize,
        pub get_by_id: usize,
        pub insert: usize,
        pub replace: usize,
        pub delete_by_id: usize,
        pub delete_all: usize,
        pub ensure_indexes: usize,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Failure {
        /// replace/delete report "not applied"
        WritesNotApplied,
        /// every call fails with a database error
        Unavailable,
    }

    #[derive(Default)]
    pub struct MockBannerRepository {
        banners: Mutex<Vec<Banner>>, // insertion order
        calls: Mutex<CallCounts>,
        failure: Mutex<Option<Failure>>,
    }

    fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
        m.lock().unwrap_or_else(PoisonError::into_inner)
    }

    impl MockBannerRepository {
        pub fn with_banners(banners: Vec<Banner>) -> Self {
            Self { banners: Mutex::new(banners), ..Self::default() }
        }

        pub fn calls(&self) -> CallCounts {
            *lock(&self.calls)
        }

        pub fn snapshot(&self) -> Vec<Banner> {
            lock(&self.banners).clone()
        }

        /// Make `replace` and `delete_by_id` report that the write did not apply.
        pub fn fail_writes(&self) {
            *lock(&self.failure) = Some(Failure::WritesNotApplied);
        }

        /// Make every call fail as if the store were unreachable.
        pub fn fail_all(&self) {
            *lock(&self.failure) = Some(Failure::Unavailable);
        }

        fn record(&self, f: impl FnOnce(&mut CallCounts)) -> Result<Option<Failure>, ServiceError> {
            f(&mut *lock(&self.calls));
            match *lock(&self.failure) {
                Some(Failure::Unavailable) => Err(ServiceError::Db("mock store unavailable".into())),
                other => Ok(other),
            }
        }
    }

    #[async_trait]
    impl BannerRepository for MockBannerRepository {
        async fn get_all(&self) -> Result<Vec<Banner>, ServiceError> {
            self.record(|c| c.get_all += 1)?;
            Ok(self.snapshot())
        }

        async fn get_by_id(&self, id: Uuid) -> Result<Option<Banner>, ServiceError> {
            self.record(|c| c.get_by_id += 1)?;
            Ok(lock(&self.banners).iter().find(|b| b.id == id).cloned())
        }

        async fn insert(&self, banner: Banner) -> Result<Banner, ServiceError> {
            self.record(|c| c.insert += 1)?;
            let mut banners = lock(&self.banners);
            if banners.iter().any(|b| b.id == banner.id) {
                return Err(ServiceError::Db(format!("duplicate banner id {}", banner.id)));
            }
            banners.push(banner.clone());
            Ok(banner)
        }

        async fn replace(&self, id: Uuid, banner: &Banner) -> Result<bool, ServiceError> {
            if self.record(|c| c.replace += 1)? == Some(Failure::WritesNotApplied) {
                return Ok(false);
            }
            let mut banners = lock(&self.banners);
            match banners.iter_mut().find(|b| b.id == id) {
                Some(slot) => {
                    *slot = banner.clone();
                    Ok(true)
                }
                None => Ok(false),
            }
        }

        async fn delete_by_id(&self, id: Uuid) -> Result<bool, ServiceError> {
            if self.record(|c| c.delete_by_id += 1)? == Some(Failure::WritesNotApplied) {
                return Ok(false);
            }
            let mut banners = lock(&self.banners);
            let before = banners.len();
            banners.retain(|b| b.id != id);
            Ok(banners.len() != before)
        }

        async fn delete_all(&self) -> Result<u64, ServiceError> {
            self.record(|c| c.delete_all += 1)?;
            let mut banners = lock(&self.banners);
            let removed = banners.len() as u64;
            banners.clear();
            Ok(removed)
        }

        async fn ensure_indexes(&self) -> Result<(), ServiceError> {
            self.record(|c| c.ensure_indexes += 1)?;
            Ok(())
        }
    }
}

use std::sync::Arc;

use models::banner::{self, non_blank_fields, Banner, BannerDto};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::domain::{BannerInput, SAMPLE_BANNERS};
use super::repository::BannerRepository;
use crate::errors::ServiceError;

const ENTITY: &str = "banner";

/// Banner business service independent of web framework
pub struct BannerService<R: BannerRepository + ?Sized> {
    repo: Arc<R>,
}

impl<R: BannerRepository + ?Sized> BannerService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }

    /// Every stored banner, fully mapped.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<BannerDto>, ServiceError> {
        let banners = self.repo.get_all().await?;
        debug!(count = banners.len(), "list banners");
        Ok(banners.into_iter().map(BannerDto::from).collect())
    }

    /// One banner. With no usable field selector the dto is fully mapped,
    /// otherwise only the selected fields are populated.
    ///
    /// # Examples
    /// ```
    /// use service::banner::{BannerService, repository::mock::MockBannerRepository};
    /// use models::banner::{Banner, now};
    /// use std::sync::Arc;
    /// let banner = Banner::new("<div></div>", now());
    /// let id = banner.id;
    /// let svc = BannerService::new(Arc::new(MockBannerRepository::with_banners(vec![banner])));
    /// let dto = tokio_test::block_on(svc.get(id, &["html"])).unwrap();
    /// assert_eq!(dto.html.as_deref(), Some("<div></div>"));
    /// assert!(dto.id.is_none() && dto.created.is_none());
    /// ```
    #[instrument(skip(self, fields), fields(banner_id = %id))]
    pub async fn get<S: AsRef<str>>(&self, id: Uuid, fields: &[S]) -> Result<BannerDto, ServiceError> {
        let banner = self.find(id).await?;
        let selected = non_blank_fields(fields);
        if selected.is_empty() {
            return Ok(banner.into());
        }
        Ok(BannerDto::project(&banner, &selected))
    }

    /// Validate and store a new banner. Id and `created` are assigned here.
    ///
    /// # Examples
    /// ```
    /// use service::banner::{BannerService, domain::BannerInput, repository::mock::MockBannerRepository};
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockBannerRepository::default());
    /// let svc = BannerService::new(repo.clone());
    /// let dto = tokio_test::block_on(svc.create(BannerInput::new("<div></div>"))).unwrap();
    /// assert!(dto.id.is_some() && dto.created.is_some() && dto.modified.is_none());
    /// assert!(tokio_test::block_on(svc.create(BannerInput::new("<div>div>"))).is_err());
    /// assert_eq!(repo.calls().insert, 1);
    /// ```
    #[instrument(skip(self, input))]
    pub async fn create(&self, input: BannerInput) -> Result<BannerDto, ServiceError> {
        let html = banner::validate_html(input.html.as_deref())?;
        let stored = self.repo.insert(Banner::new(html, banner::now())).await?;
        info!(banner_id = %stored.id, "banner_created");
        Ok(stored.into())
    }

    /// Validate new markup, then replace the stored banner's html and stamp
    /// `modified`.
    #[instrument(skip(self, input), fields(banner_id = %id))]
    pub async fn update(&self, id: Uuid, input: BannerInput) -> Result<BannerDto, ServiceError> {
        let html = banner::validate_html(input.html.as_deref())?;
        let mut current = self.find(id).await?;
        current.revise(html, banner::now());

        if !self.repo.replace(id, &current).await? {
            return Err(ServiceError::Inconsistent(format!("unable to update banner {id}")));
        }
        info!(banner_id = %id, "banner_updated");
        Ok(current.into())
    }

    #[instrument(skip(self), fields(banner_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        self.find(id).await?;
        if !self.repo.delete_by_id(id).await? {
            return Err(ServiceError::Inconsistent(format!("unable to delete banner {id}")));
        }
        info!(banner_id = %id, "banner_deleted");
        Ok(())
    }

    /// Stored markup, verbatim.
    #[instrument(skip(self), fields(banner_id = %id))]
    pub async fn html(&self, id: Uuid) -> Result<String, ServiceError> {
        Ok(self.find(id).await?.html)
    }

    /// Wipe the collection, make sure the id index exists and insert the
    /// sample banners. Returns how many were inserted.
    #[instrument(skip(self))]
    pub async fn reset_with_samples(&self) -> Result<usize, ServiceError> {
        let removed = self.repo.delete_all().await?;
        self.repo.ensure_indexes().await?;
        for html in SAMPLE_BANNERS {
            self.repo.insert(Banner::new(html, banner::now())).await?;
        }
        info!(removed, inserted = SAMPLE_BANNERS.len(), "banners_reseeded");
        Ok(SAMPLE_BANNERS.len())
    }

    async fn find(&self, id: Uuid) -> Result<Banner, ServiceError> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(ENTITY, id))
    }
}

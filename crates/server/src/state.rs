use std::sync::Arc;

use service::banner::{repository::BannerRepository, BannerService};
use uuid::Uuid;

/// Shared handler state.
#[derive(Clone)]
pub struct ServerState {
    pub banners: Arc<BannerService<dyn BannerRepository>>,
    public_base_url: Arc<str>,
}

impl ServerState {
    pub fn new(repo: Arc<dyn BannerRepository>, public_base_url: &str) -> Self {
        Self {
            banners: Arc::new(BannerService::new(repo)),
            public_base_url: public_base_url.trim_end_matches('/').into(),
        }
    }

    /// Absolute address of a banner resource, used for `Location` headers.
    pub fn location(&self, id: Uuid) -> String {
        format!("{}/banners/{}", self.public_base_url, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use service::banner::repository::mock::MockBannerRepository;

    #[test]
    fn location_joins_base_and_id() {
        let state = ServerState::new(Arc::new(MockBannerRepository::default()), "http://localhost:50211/api/v1/");
        let id = Uuid::nil();
        assert_eq!(
            state.location(id),
            "http://localhost:50211/api/v1/banners/00000000-0000-0000-0000-000000000000"
        );
    }
}

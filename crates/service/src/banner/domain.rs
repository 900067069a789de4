use serde::{Deserialize, Serialize};

/// Create/update request body. Only `html` is accepted from clients; identity
/// and timestamps are always assigned server-side, so any other field in the
/// payload is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BannerInput {
    #[serde(default)]
    pub html: Option<String>,
}

impl BannerInput {
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: Some(html.into()) }
    }
}

/// Markup inserted by the reset-and-seed flow.
pub const SAMPLE_BANNERS: [&str; 4] = [
    "<div>Hello1</div>",
    "<div>Hello2</div>",
    "<div>Hello3</div>",
    "<div>Hello4</div>",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_identity_fields_are_dropped() {
        let input: BannerInput = serde_json::from_str(
            r#"{"id":"00000000-0000-0000-0000-000000000001","created":"2001-01-01T00:00:00Z","html":"<p></p>"}"#,
        )
        .unwrap();
        assert_eq!(input.html.as_deref(), Some("<p></p>"));
    }

    #[test]
    fn missing_html_deserializes_as_none() {
        let input: BannerInput = serde_json::from_str("{}").unwrap();
        assert!(input.html.is_none());
    }

    #[test]
    fn samples_are_well_formed() {
        for html in SAMPLE_BANNERS {
            assert!(models::html::validate(html).is_empty());
        }
    }
}

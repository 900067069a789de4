use serde::Serialize;
use utoipa::OpenApi;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

/// Banner as returned by the API; fields not selected are `null`.
#[derive(ToSchema)]
pub struct BannerDoc {
    pub id: Option<Uuid>,
    pub html: Option<String>,
    #[schema(format = DateTime)]
    pub created: Option<String>,
    #[schema(format = DateTime)]
    pub modified: Option<String>,
}

#[derive(ToSchema)]
pub struct BannerInputDoc { pub html: String }

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HtmlParseErrorDoc {
    /// TagNotClosed, TagNotOpened, EndTagNotRequired, UnterminatedTag or UnterminatedComment
    pub code: String,
    pub line: u32,
    pub line_position: u32,
    pub stream_position: u32,
    pub source_text: String,
    pub reason: String,
}

#[derive(ToSchema)]
pub struct InternalErrorDoc { pub error: String, pub error_code: Uuid }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::banners::list,
        crate::routes::banners::get,
        crate::routes::banners::create,
        crate::routes::banners::update,
        crate::routes::banners::delete,
        crate::routes::banners::html,
        crate::routes::init::init,
    ),
    components(
        schemas(
            HealthResponse,
            BannerDoc,
            BannerInputDoc,
            HtmlParseErrorDoc,
            InternalErrorDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "banners"),
        (name = "init")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_banner_routes() {
        let doc = ApiDoc::openapi();
        for path in ["/api/v1/banners", "/api/v1/banners/{id}", "/api/v1/banners/{id}/html", "/health"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn parse_error_schema_uses_wire_names() {
        let doc = serde_json::to_value(ApiDoc::openapi()).expect("serialize document");
        let props = &doc["components"]["schemas"]["HtmlParseErrorDoc"]["properties"];
        for name in ["code", "line", "linePosition", "streamPosition", "sourceText", "reason"] {
            assert!(props[name].is_object(), "missing {name}");
        }
        assert!(props["line_position"].is_null());
    }
}

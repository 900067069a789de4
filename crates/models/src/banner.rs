use std::collections::HashSet;

use chrono::{DateTime, SubsecRound, Utc};
use mongodb::bson::{self, oid::ObjectId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;
use crate::html;

/// Canonical stored banner.
#[derive(Clone, Debug, PartialEq)]
pub struct Banner {
    pub id: Uuid,
    pub html: String,
    pub created: DateTime<Utc>,
    pub modified: Option<DateTime<Utc>>,
}

impl Banner {
    /// New banner with a server-generated id.
    pub fn new(html: impl Into<String>, created: DateTime<Utc>) -> Self {
        Self { id: Uuid::new_v4(), html: html.into(), created, modified: None }
    }

    /// Replace the markup and stamp `modified`, never moving it backwards.
    pub fn revise(&mut self, html: impl Into<String>, now: DateTime<Utc>) {
        let floor = self.modified.unwrap_or(self.created);
        self.html = html.into();
        self.modified = Some(now.max(floor));
    }
}

/// Current UTC time at the store's millisecond precision.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Check a client-supplied html payload: present, non-blank and well-formed.
pub fn validate_html(html: Option<&str>) -> Result<&str, ModelError> {
    let html = match html {
        Some(h) if !h.trim().is_empty() => h,
        _ => return Err(ModelError::Required("html")),
    };
    let errors = html::validate(html);
    if !errors.is_empty() {
        return Err(ModelError::Markup(errors));
    }
    Ok(html)
}

/// Document field names, shared by the schema and query filters.
pub mod fields {
    pub const ID: &str = "Id";
    pub const HTML: &str = "Html";
    pub const CREATED: &str = "Created";
    pub const MODIFIED: &str = "Modified";
}

/// Storage shape of a banner. `_id` is the store's surrogate key and never
/// leaves the persistence layer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BannerDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub internal_id: Option<ObjectId>,
    #[serde(rename = "Id")]
    pub id: bson::Uuid,
    #[serde(rename = "Html")]
    pub html: String,
    #[serde(rename = "Created")]
    pub created: bson::DateTime,
    #[serde(rename = "Modified", default)]
    pub modified: Option<bson::DateTime>,
}

impl From<&Banner> for BannerDocument {
    fn from(b: &Banner) -> Self {
        Self {
            internal_id: None,
            id: bson::Uuid::from_uuid_1(b.id),
            html: b.html.clone(),
            created: bson::DateTime::from_chrono(b.created),
            modified: b.modified.map(bson::DateTime::from_chrono),
        }
    }
}

impl From<BannerDocument> for Banner {
    fn from(d: BannerDocument) -> Self {
        Self {
            id: d.id.to_uuid_1(),
            html: d.html,
            created: d.created.to_chrono(),
            modified: d.modified.map(|m| m.to_chrono()),
        }
    }
}

/// Wire representation of a banner. Every field is optional: `None` means
/// "not requested", so the same type carries full and partial responses.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BannerDto {
    pub id: Option<Uuid>,
    pub html: Option<String>,
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
}

impl From<&Banner> for BannerDto {
    fn from(b: &Banner) -> Self {
        Self {
            id: Some(b.id),
            html: Some(b.html.clone()),
            created: Some(b.created),
            modified: b.modified,
        }
    }
}

impl From<Banner> for BannerDto {
    fn from(b: Banner) -> Self {
        Self { id: Some(b.id), html: Some(b.html), created: Some(b.created), modified: b.modified }
    }
}

/// Selectable banner fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BannerField {
    Id,
    Created,
    Html,
    Modified,
}

/// Name lookup for field selection; matched ASCII case-insensitively.
const FIELD_TABLE: [(&str, BannerField); 4] = [
    ("id", BannerField::Id),
    ("created", BannerField::Created),
    ("html", BannerField::Html),
    ("modified", BannerField::Modified),
];

impl BannerField {
    /// Whole-name match; `"id,html"` or `" id "` name no field.
    pub fn parse(name: &str) -> Option<Self> {
        FIELD_TABLE
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, field)| *field)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Created => "created",
            Self::Html => "html",
            Self::Modified => "modified",
        }
    }

    fn copy(self, from: &Banner, to: &mut BannerDto) {
        match self {
            Self::Id => to.id = Some(from.id),
            Self::Created => to.created = Some(from.created),
            Self::Html => to.html = Some(from.html.clone()),
            Self::Modified => to.modified = from.modified,
        }
    }
}

impl BannerDto {
    /// Partial representation holding only the requested fields. Unknown
    /// names are ignored; an empty request yields an all-`None` dto.
    pub fn project<S: AsRef<str>>(banner: &Banner, requested: &[S]) -> Self {
        let selected: HashSet<BannerField> =
            requested.iter().filter_map(|name| BannerField::parse(name.as_ref())).collect();
        let mut dto = Self::default();
        for field in selected {
            field.copy(banner, &mut dto);
        }
        dto
    }
}

/// Raw `fields` query values minus the blank ones. Kept values are passed on
/// untouched.
pub fn non_blank_fields<S: AsRef<str>>(values: &[S]) -> Vec<&str> {
    values
        .iter()
        .map(AsRef::as_ref)
        .filter(|v| !v.trim().is_empty())
        .collect()
}

//! Property value shapes shared by several block models.

use serde::{Deserialize, Serialize};

/// A link picked in the editor.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Link {
    pub name: Option<String>,
    pub url: String,
    pub target: Option<String>,
    pub page_id: Option<i64>,
}

impl Link {
    pub fn opens_in_new_window(&self) -> bool {
        self.target.as_deref() == Some("_blank")
    }

    /// Link text, defaulting to the url.
    pub fn label(&self) -> &str {
        self.name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.url)
    }
}

/// Value of a link picker property.
///
/// Accepts a bare URL string, a single picker object or a picker array.
/// Entries still missing a url mid-edit are dropped rather than rejected.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "RawLinks")]
pub struct LinkPicker(Vec<Link>);

impl LinkPicker {
    /// The first complete link, as single-link pickers use it.
    pub fn first(self) -> Option<Link> {
        self.0.into_iter().next()
    }

    pub fn into_links(self) -> Vec<Link> {
        self.0
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LinkObject {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    target: Option<String>,
    #[serde(default, alias = "id")]
    page_id: Option<i64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawLink {
    Url(String),
    Object(LinkObject),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawLinks {
    Many(Vec<RawLink>),
    One(RawLink),
}

impl RawLink {
    fn into_link(self) -> Option<Link> {
        let object = match self {
            RawLink::Url(url) => LinkObject {
                name: None,
                url: Some(url),
                target: None,
                page_id: None,
            },
            RawLink::Object(object) => object,
        };

        let url = object.url.filter(|url| !url.trim().is_empty())?;
        Some(Link {
            name: object.name,
            url,
            target: object.target.filter(|target| !target.trim().is_empty()),
            page_id: object.page_id,
        })
    }
}

impl From<RawLinks> for LinkPicker {
    fn from(raw: RawLinks) -> Self {
        let entries = match raw {
            RawLinks::Many(entries) => entries,
            RawLinks::One(entry) => vec![entry],
        };
        Self(entries.into_iter().filter_map(RawLink::into_link).collect())
    }
}

/// A picked media item, either a plain path or `{src, alt}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawMedia")]
pub struct MediaRef {
    pub src: String,
    pub alt: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawMedia {
    Path(String),
    Object {
        #[serde(alias = "url", alias = "mediaUrl")]
        src: String,
        #[serde(default, alias = "altText")]
        alt: Option<String>,
    },
}

impl From<RawMedia> for MediaRef {
    fn from(raw: RawMedia) -> Self {
        match raw {
            RawMedia::Path(src) => Self { src, alt: None },
            RawMedia::Object { src, alt } => Self { src, alt },
        }
    }
}

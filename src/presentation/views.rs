use askama::Template;

use crate::application::{
    context::RenderContext,
    models::{
        BlockViewModel, CodeSnippetRow, HeroBlock, IconLinkRow, ImageRow, MediaRef, ModelType,
        RichTextRow, VideoRow,
    },
};

const DEFAULT_CODE_LANGUAGE: &str = "plaintext";

/// An askama view bound to exactly one block model type.
pub trait BlockTemplate: Template + Sized {
    type Model: ModelType;

    fn from_model(model: &Self::Model, view: &BlockViewModel, context: &RenderContext) -> Self;
}

#[derive(Template)]
#[template(path = "blocks/components/hero.html")]
pub struct HeroTemplate {
    pub title: String,
    pub subtitle: Option<String>,
    pub link_url: Option<String>,
    pub link_text: String,
    pub background_src: Option<String>,
    pub background_alt: String,
}

impl BlockTemplate for HeroTemplate {
    type Model = HeroBlock;

    fn from_model(model: &HeroBlock, _view: &BlockViewModel, _context: &RenderContext) -> Self {
        Self {
            title: model.title.clone(),
            subtitle: model.subtitle.clone(),
            link_url: model.link.as_ref().map(|link| link.url.clone()),
            link_text: model.link_text.clone(),
            background_src: model.background.as_ref().map(|media| media.src.clone()),
            background_alt: model
                .background
                .as_ref()
                .and_then(|media| media.alt.clone())
                .unwrap_or_default(),
        }
    }
}

#[derive(Template)]
#[template(path = "blocks/components/richTextRow.html")]
pub struct RichTextTemplate {
    pub block_id: String,
    pub lang: Option<String>,
    pub content: String,
}

impl BlockTemplate for RichTextTemplate {
    type Model = RichTextRow;

    fn from_model(model: &RichTextRow, view: &BlockViewModel, context: &RenderContext) -> Self {
        Self {
            block_id: view.id.to_string(),
            lang: context.locale.as_ref().map(ToString::to_string),
            content: model.content.clone(),
        }
    }
}

#[derive(Template)]
#[template(path = "blocks/components/imageRow.html")]
pub struct ImageTemplate {
    pub block_id: String,
    pub src: Option<String>,
    pub alt: String,
    pub caption: Option<String>,
}

impl BlockTemplate for ImageTemplate {
    type Model = ImageRow;

    fn from_model(model: &ImageRow, view: &BlockViewModel, _context: &RenderContext) -> Self {
        Self {
            block_id: view.id.to_string(),
            src: model.image.as_ref().map(|image| image.src.clone()),
            alt: alt_text(model.image.as_ref(), model.caption.as_deref()).to_string(),
            caption: model.caption.clone(),
        }
    }
}

#[derive(Template)]
#[template(path = "blocks/components/codeSnippetRow.html")]
pub struct CodeSnippetTemplate {
    pub block_id: String,
    pub title: Option<String>,
    pub language: String,
    pub code: String,
}

impl BlockTemplate for CodeSnippetTemplate {
    type Model = CodeSnippetRow;

    fn from_model(
        model: &CodeSnippetRow,
        view: &BlockViewModel,
        _context: &RenderContext,
    ) -> Self {
        Self {
            block_id: view.id.to_string(),
            title: model.title.clone(),
            language: model
                .language
                .as_deref()
                .map(str::trim)
                .filter(|language| !language.is_empty())
                .unwrap_or(DEFAULT_CODE_LANGUAGE)
                .to_ascii_lowercase(),
            code: model.code.clone(),
        }
    }
}

pub struct IconLinkView {
    pub label: String,
    pub url: String,
    pub new_window: bool,
    pub current: bool,
}

#[derive(Template)]
#[template(path = "blocks/components/iconLinkRow.html")]
pub struct IconLinkTemplate {
    pub block_id: String,
    pub links: Vec<IconLinkView>,
}

impl BlockTemplate for IconLinkTemplate {
    type Model = IconLinkRow;

    fn from_model(model: &IconLinkRow, view: &BlockViewModel, context: &RenderContext) -> Self {
        let links = model
            .links
            .iter()
            .map(|link| IconLinkView {
                label: link.label().to_string(),
                url: link.url.clone(),
                new_window: link.opens_in_new_window(),
                current: context.is_current_page(link.page_id),
            })
            .collect();

        Self {
            block_id: view.id.to_string(),
            links,
        }
    }
}

#[derive(Template)]
#[template(path = "blocks/components/videoRow.html")]
pub struct VideoTemplate {
    pub block_id: String,
    pub embed_url: Option<String>,
    pub caption: Option<String>,
}

impl BlockTemplate for VideoTemplate {
    type Model = VideoRow;

    fn from_model(model: &VideoRow, view: &BlockViewModel, _context: &RenderContext) -> Self {
        Self {
            block_id: view.id.to_string(),
            embed_url: model.video_url.as_deref().map(embed_url),
            caption: model.caption.clone(),
        }
    }
}

/// Image alt text, falling back to the caption.
fn alt_text<'a>(image: Option<&'a MediaRef>, caption: Option<&'a str>) -> &'a str {
    image
        .and_then(|image| image.alt.as_deref())
        .or(caption)
        .unwrap_or("")
}

/// Rewrites watch links from the common video hosts to their embeddable form.
fn embed_url(raw: &str) -> String {
    let raw = raw.trim();
    let Ok(parsed) = url::Url::parse(raw) else {
        return raw.to_string();
    };

    match parsed.host_str() {
        Some("www.youtube.com" | "youtube.com") if parsed.path() == "/watch" => parsed
            .query_pairs()
            .find(|(key, _)| key == "v")
            .map(|(_, id)| format!("https://www.youtube-nocookie.com/embed/{id}"))
            .unwrap_or_else(|| raw.to_string()),
        Some("youtu.be") => format!(
            "https://www.youtube-nocookie.com/embed/{}",
            parsed.path().trim_start_matches('/')
        ),
        Some("vimeo.com") => format!(
            "https://player.vimeo.com/video/{}",
            parsed.path().trim_start_matches('/')
        ),
        _ => raw.to_string(),
    }
}

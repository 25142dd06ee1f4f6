//! Makes rendered block markup inert for embedding in the editor.

use lol_html::{RewriteStrSettings, element, rewrite_str};
use thiserror::Error;

/// Value every link target is replaced with.
pub const INERT_HREF: &str = "javascript:;";

#[derive(Debug, Error)]
#[error("failed to rewrite preview markup: {message}")]
pub struct SanitizeError {
    message: String,
}

/// Neutralises `href` on every `a` and `area` element. Everything else passes through untouched.
pub fn sanitize_markup(markup: &str) -> Result<String, SanitizeError> {
    if markup.trim().is_empty() {
        return Ok(markup.to_string());
    }

    rewrite_str(
        markup,
        RewriteStrSettings {
            element_content_handlers: vec![element!("a[href], area[href]", |el| {
                el.set_attribute("href", INERT_HREF)?;
                Ok(())
            })],
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|err| SanitizeError {
        message: err.to_string(),
    })
}

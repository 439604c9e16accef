//! Submission and sandboxed preview.
//!
//! Submitting copies the document verbatim into fixed store slots that are
//! independent of the draft, then hands it to a [`Renderer`] under a locked
//! down [`SandboxPolicy`].

mod frame;

pub use frame::{FrameRenderer, escape_attribute, frame_page};

use crate::store::Store;

/// Store key holding the document as of the last submit.
pub const SUBMISSION_KEY: &str = "tagpad.final-submission";
/// Store key read by the preview surface.
pub const PREVIEW_KEY: &str = "tagpad.preview";

/// What the rendered document may do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SandboxPolicy {
    pub allow_scripts: bool,
    pub allow_forms: bool,
    pub allow_top_navigation: bool,
    pub allow_network: bool,
}

impl SandboxPolicy {
    /// Scripts off, forms on, no navigation, no network.
    pub const fn locked_down() -> Self {
        Self {
            allow_scripts: false,
            allow_forms: true,
            allow_top_navigation: false,
            allow_network: false,
        }
    }

    /// Value for an iframe `sandbox` attribute.
    pub fn sandbox_attribute(&self) -> String {
        let mut tokens = Vec::new();
        if self.allow_scripts {
            tokens.push("allow-scripts");
        }
        if self.allow_forms {
            tokens.push("allow-forms");
        }
        if self.allow_top_navigation {
            tokens.push("allow-top-navigation");
        }
        tokens.join(" ")
    }

    /// Content-Security-Policy for the host page.
    pub fn content_security_policy(&self) -> String {
        let mut directives = vec!["default-src 'none'"];
        if self.allow_network {
            directives.push("connect-src *");
            directives.push("img-src * data:");
            directives.push("font-src * data:");
            directives.push("style-src * 'unsafe-inline'");
        } else {
            directives.push("img-src data:");
            directives.push("font-src data:");
            directives.push("style-src 'unsafe-inline'");
        }
        if self.allow_scripts {
            directives.push("script-src 'unsafe-inline'");
        }
        if !self.allow_forms {
            directives.push("form-action 'none'");
        }
        directives.join("; ")
    }
}

impl Default for SandboxPolicy {
    fn default() -> Self {
        Self::locked_down()
    }
}

/// A document to render and the policy to render it under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewRequest<'a> {
    pub document: &'a str,
    pub policy: SandboxPolicy,
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to write preview page {path}: {source}")]
    Write {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to open preview: {0}")]
    Open(#[source] std::io::Error),
}

/// Displays a submitted document.
pub trait Renderer {
    /// Render `request.document` as a full document.
    ///
    /// # Errors
    /// Returns an error if the preview could not be produced.
    fn render(&mut self, request: &PreviewRequest<'_>) -> Result<(), RenderError>;
}

/// What happened during a submit. Failures are already logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub stored: bool,
    pub rendered: bool,
}

/// Record `document` as the submission and render it.
pub fn submit(store: &mut impl Store, renderer: &mut impl Renderer, document: &str) -> SubmitOutcome {
    let mut stored = true;
    for key in [SUBMISSION_KEY, PREVIEW_KEY] {
        if let Err(err) = store.set(key, document) {
            tracing::warn!(key, %err, "submission write failed");
            stored = false;
        }
    }

    let request = PreviewRequest {
        document,
        policy: SandboxPolicy::locked_down(),
    };
    let rendered = match renderer.render(&request) {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(%err, "preview render failed");
            false
        }
    };

    tracing::info!(bytes = document.len(), stored, rendered, "document submitted");
    SubmitOutcome { stored, rendered }
}

/// Forget the last submission.
pub fn clear_submission(store: &mut impl Store) {
    for key in [SUBMISSION_KEY, PREVIEW_KEY] {
        if let Err(err) = store.remove(key) {
            tracing::warn!(key, %err, "submission clear failed");
        }
    }
}

/// The document as of the last submit, if any.
pub fn last_submission(store: &impl Store) -> Option<String> {
    store.get(SUBMISSION_KEY).unwrap_or_else(|err| {
        tracing::warn!(%err, "submission read failed");
        None
    })
}

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use super::{PreviewRequest, RenderError, Renderer, SandboxPolicy};

/// Renders into a local HTML page that embeds the document in a sandboxed
/// `srcdoc` frame, optionally opening it with the platform browser.
#[derive(Debug, Clone)]
pub struct FrameRenderer {
    path: PathBuf,
    open: bool,
}

impl FrameRenderer {
    pub fn new(path: impl Into<PathBuf>, open: bool) -> Self {
        Self {
            path: path.into(),
            open,
        }
    }
}

impl Renderer for FrameRenderer {
    fn render(&mut self, request: &PreviewRequest<'_>) -> Result<(), RenderError> {
        let page = frame_page(request.document, &request.policy);
        let write_err = |source| RenderError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        fs::write(&self.path, page).map_err(write_err)?;
        tracing::debug!(path = %self.path.display(), "preview page written");

        if self.open {
            open_in_browser(&self.path).map_err(RenderError::Open)?;
        }
        Ok(())
    }
}

/// Host page for `document`.
///
/// The frame inherits the page's CSP, so the policy applies to the
/// submitted document as well.
pub fn frame_page(document: &str, policy: &SandboxPolicy) -> String {
    let mut page = String::with_capacity(document.len() * 2 + 512);
    page.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(
        page,
        "<meta http-equiv=\"Content-Security-Policy\" content=\"{}\">",
        escape_attribute(&policy.content_security_policy())
    );
    page.push_str("<title>tagpad preview</title>\n");
    page.push_str(
        "<style>html,body{margin:0;height:100%}iframe{border:0;width:100%;height:100%}</style>\n",
    );
    page.push_str("</head>\n<body>\n");
    let _ = writeln!(
        page,
        "<iframe title=\"preview\" sandbox=\"{}\" referrerpolicy=\"no-referrer\" srcdoc=\"{}\"></iframe>",
        escape_attribute(&policy.sandbox_attribute()),
        escape_attribute(document)
    );
    page.push_str("</body>\n</html>\n");
    page
}

/// Escape text for a double-quoted HTML attribute value.
pub fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    out
}

fn open_in_browser(path: &Path) -> std::io::Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(path)
            .spawn()?
            .wait()?;
        Ok(())
    }
    #[cfg(target_os = "windows")]
    {
        use std::process::Stdio;
        std::process::Command::new("cmd")
            .arg("/C")
            .arg("start")
            .arg("")
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        return Ok(());
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        use std::process::Stdio;
        std::process::Command::new("xdg-open")
            .arg(path)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?
            .wait()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn unescape(value: &str) -> String {
        value
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&#39;", "'")
            .replace("&amp;", "&")
    }

    #[test]
    fn test_escape_attribute() {
        assert_eq!(
            escape_attribute(r#"<a href="x">&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#39;&lt;/a&gt;"
        );
        assert_eq!(escape_attribute("plain"), "plain");
    }

    #[test]
    fn test_frame_page_embeds_document_verbatim() {
        let doc = "<h1 class=\"t\">Tom & Jerry's</h1>\n<script>alert('x')</script>";
        let page = frame_page(doc, &SandboxPolicy::locked_down());
        let start = page.find("srcdoc=\"").unwrap() + "srcdoc=\"".len();
        let end = start + page[start..].find('"').unwrap();
        assert_eq!(unescape(&page[start..end]), doc);
        assert!(!page.contains("<script>"));
    }

    #[test]
    fn test_frame_page_is_sandboxed() {
        let page = frame_page("x", &SandboxPolicy::locked_down());
        assert!(page.contains("sandbox=\"allow-forms\""));
        assert!(!page.contains("allow-scripts"));
        assert!(page.contains("Content-Security-Policy"));
        assert!(page.contains("default-src &#39;none&#39;"));
    }

    #[test]
    fn test_render_writes_page() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out").join("preview.html");
        let mut renderer = FrameRenderer::new(&path, false);
        let request = PreviewRequest {
            document: "<p>hello</p>",
            policy: SandboxPolicy::locked_down(),
        };
        renderer.render(&request).unwrap();
        let page = std::fs::read_to_string(&path).unwrap();
        assert!(page.contains("&lt;p&gt;hello&lt;/p&gt;"));
    }

    #[test]
    fn test_render_reports_unwritable_path() {
        let dir = tempdir().unwrap();
        // Target is an existing directory, so the write fails.
        let mut renderer = FrameRenderer::new(dir.path(), false);
        let request = PreviewRequest {
            document: "x",
            policy: SandboxPolicy::locked_down(),
        };
        assert!(matches!(
            renderer.render(&request),
            Err(RenderError::Write { .. })
        ));
    }
}

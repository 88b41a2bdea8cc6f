//! Page capture, save and source view.

use std::path::{Path, PathBuf};

use common::{ShellError, ShellResult};
use image::imageops::{self, FilterType};
use image::{ImageFormat, RgbaImage};
use url::Url;

use crate::engine::HtmlPurpose;
use crate::events::{ShellEvent, TaskOutcome};
use crate::session::{PageSource, Session};
use crate::tab::TabId;
use crate::tasks::TaskScope;

/// Scale factor of "upscale page".
pub const UPSCALE_FACTOR: u32 = 2;

/// Resize a capture by [`UPSCALE_FACTOR`] with a linear filter.
pub fn upscale(image: &RgbaImage) -> RgbaImage {
    imageops::resize(
        image,
        image.width() * UPSCALE_FACTOR,
        image.height() * UPSCALE_FACTOR,
        FilterType::Triangle,
    )
}

/// Write an image to a new temporary PNG that outlives the session.
pub fn write_temp_png(image: &RgbaImage) -> ShellResult<PathBuf> {
    let file = tempfile::Builder::new()
        .prefix("octo-upscaled-")
        .suffix(".png")
        .tempfile()?;
    image
        .save_with_format(file.path(), ImageFormat::Png)
        .map_err(|e| ShellError::engine(format!("failed to encode image: {e}")))?;
    let (_, path) = file.keep().map_err(|e| ShellError::Io(e.error))?;
    Ok(path)
}

/// `file://` URL of a local path.
pub fn file_url(path: &Path) -> ShellResult<String> {
    Url::from_file_path(path)
        .map(String::from)
        .map_err(|_| ShellError::engine(format!("not an absolute path: {}", path.display())))
}

impl Session {
    /// Capture the active page, upscale it and open the result in a new tab.
    pub(crate) fn upscale_page(&mut self) -> ShellResult<()> {
        let capture = self.tabs.active_tab_mut().view_mut().capture_image()?;
        let upscaled = upscale(&capture);
        let path = write_temp_png(&upscaled)?;
        tracing::info!(path = %path.display(), width = upscaled.width(), height = upscaled.height(), "page upscaled");

        let url = file_url(&path)?;
        self.open_tab(&url, "Upscaled")?;
        Ok(())
    }

    pub(crate) fn save_page(&mut self, path: PathBuf) {
        self.tabs
            .active_tab_mut()
            .view_mut()
            .extract_html(HtmlPurpose::SavePage(path));
    }

    pub(crate) fn view_source(&mut self) {
        self.tabs
            .active_tab_mut()
            .view_mut()
            .extract_html(HtmlPurpose::ViewSource);
    }

    pub(crate) fn on_html(&mut self, tab: TabId, purpose: HtmlPurpose, html: String) -> ShellResult<()> {
        match purpose {
            HtmlPurpose::SavePage(path) => {
                // Not tied to the tab: closing it does not abort the write.
                self.tasks.spawn(TaskScope::Session, async move {
                    let result = tokio::fs::write(&path, html).await.map(|()| path);
                    ShellEvent::from(TaskOutcome::PageSaved(result.map_err(ShellError::from)))
                })?;
            }
            HtmlPurpose::ViewSource => {
                self.page_source = Some(PageSource { tab, html });
            }
        }
        Ok(())
    }

    pub(crate) fn on_page_saved(&mut self, result: ShellResult<PathBuf>) {
        match result {
            Ok(path) => {
                tracing::info!(path = %path.display(), "page saved");
                self.notify("Save Page", "Page saved successfully.");
            }
            Err(err) => self.report("Save Page", err),
        }
    }
}

//! Page-rendering engine collaborator.
//!
//! The shell never renders pages itself. It drives an engine through the
//! [`Engine`] (profile-wide) and [`EngineView`] (per tab) traits and reacts
//! to the [`EngineEvent`](crate::events::EngineEvent)s the engine reports
//! back through the session's event channel.

use std::path::PathBuf;
use std::sync::Arc;

use browser_security::RequestFilter;
use common::ShellResult;
use image::RgbaImage;

use crate::tab::TabId;

/// Shared engine profile.
pub trait Engine: Send {
    /// Create the view backing a new tab.
    fn create_view(&mut self, tab: TabId) -> Box<dyn EngineView>;

    /// Set the HTTP user agent for every view.
    fn set_user_agent(&mut self, user_agent: &str);

    /// Install (`Some`) or remove (`None`) the request filter hook.
    fn set_request_filter(&mut self, filter: Option<Arc<dyn RequestFilter>>);

    /// Set the cookie persistence policy.
    fn set_cookie_policy(&mut self, policy: CookiePolicy);
}

/// Engine view backing one tab.
pub trait EngineView: Send {
    fn load_url(&mut self, url: &str) -> ShellResult<()>;

    fn reload(&mut self);

    fn go_back(&mut self);

    fn go_forward(&mut self);

    fn set_zoom(&mut self, factor: f64);

    /// Run a page script. Fire-and-forget: no result is reported.
    fn run_script(&mut self, script: &PageScript) -> ShellResult<()>;

    /// Request the page's plain text. The engine answers later with
    /// `EngineEvent::PlainText` carrying the same purpose.
    fn extract_plain_text(&mut self, purpose: TextPurpose);

    /// Request the page's HTML. The engine answers later with
    /// `EngineEvent::Html` carrying the same purpose.
    fn extract_html(&mut self, purpose: HtmlPurpose);

    /// Capture the rendered page as a bitmap.
    fn capture_image(&mut self) -> ShellResult<RgbaImage>;
}

/// Cookie persistence policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CookiePolicy {
    Persistent,
    Ephemeral,
}

/// Why plain text was requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextPurpose {
    ReadAloud,
    Summarize,
}

/// Why HTML was requested.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HtmlPurpose {
    SavePage(PathBuf),
    ViewSource,
}

/// Page mutations the shell may ask the engine to perform.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PageScript {
    /// Create the `<style>` element with this id if absent, then replace its
    /// content. Never creates a second element with the same id.
    UpsertStyle { element_id: String, css: String },
}

impl PageScript {
    /// Render the script as JavaScript source.
    pub fn to_javascript(&self) -> String {
        match self {
            PageScript::UpsertStyle { element_id, css } => format!(
                r#"(function() {{
    var style = document.getElementById({id});
    if (!style) {{
        style = document.createElement('style');
        style.id = {id};
        document.head.appendChild(style);
    }}
    style.textContent = {css};
}})();"#,
                id = js_string_literal(element_id),
                css = js_string_literal(css),
            ),
        }
    }
}

/// Quote a string as a JavaScript string literal.
fn js_string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '<' => out.push_str("\\u003c"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

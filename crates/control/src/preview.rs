//! Preview dispatch.
//!
//! Routes a file to a rendering path by its declared content type and owns
//! the show/hide lifecycle of the preview surface. Opening is split in two
//! so rendering can happen off the owning thread:
//!
//! 1. [`PreviewDispatcher::request`] switches state, clears and shows the
//!    surface, and hands back a self-contained [`PreviewRequest`].
//! 2. [`PreviewRequest::render`] does the parsing and conversion.
//! 3. [`PreviewDispatcher::complete`] applies the outcome, but only if no
//!    newer request or close happened in the meantime.

use filedock_config::Settings;
use filedock_core::{codec, mime, FileHandle, PreviewKind, SheetGrid};
use filedock_io::html::{escape_attr, escape_text};
use filedock_io::{convert_to_html, parse_workbook_with_limits, ParseLimits, SheetTheme, SheetView};

use crate::registry::FileId;

/// Display region the dispatcher renders into.
pub trait PreviewSurface {
    fn set_visible(&mut self, visible: bool);
    fn is_visible(&self) -> bool;
    /// Replace the whole content.
    fn set_content(&mut self, html: String);
    fn content(&self) -> &str;
}

/// In-memory surface for headless hosts and tests.
#[derive(Debug, Default, Clone)]
pub struct MemorySurface {
    visible: bool,
    content: String,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreviewSurface for MemorySurface {
    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn set_content(&mut self, html: String) {
        self.content = html;
    }

    fn content(&self) -> &str {
        &self.content
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreviewPhase {
    #[default]
    Closed,
    Open(PreviewKind),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreviewState {
    pub phase: PreviewPhase,
    /// File being previewed
    pub file: Option<FileId>,
    /// Selected tab of a tabular preview
    pub active_sheet: Option<String>,
}

/// Identifies one preview request. Outcomes carrying an outdated token are
/// dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewToken {
    generation: u64,
    file: FileId,
}

impl PreviewToken {
    pub fn file(&self) -> FileId {
        self.file
    }
}

/// Rendering parameters, fixed per dispatcher.
#[derive(Debug, Clone)]
pub struct PreviewOptions {
    pub max_height_px: u32,
    pub limits: ParseLimits,
    pub sheet_view: SheetView,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            max_height_px: 500,
            limits: ParseLimits::default(),
            sheet_view: SheetView::default(),
        }
    }
}

impl PreviewOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        let theme = SheetTheme {
            font_family: settings.preview_font_family.clone(),
            ..SheetTheme::default()
        };
        Self {
            max_height_px: settings.preview_max_height_px,
            limits: ParseLimits {
                max_rows: settings.preview_max_rows,
                max_cols: settings.preview_max_cols,
            },
            sheet_view: SheetView::new(theme),
        }
    }
}

/// Everything needed to render one preview, detached from the dispatcher.
#[derive(Debug, Clone)]
pub struct PreviewRequest {
    token: PreviewToken,
    kind: PreviewKind,
    handle: FileHandle,
    options: PreviewOptions,
}

impl PreviewRequest {
    pub fn token(&self) -> PreviewToken {
        self.token
    }

    pub fn kind(&self) -> PreviewKind {
        self.kind
    }

    /// Render the preview. Never fails: parse and conversion errors become
    /// a fixed inline message.
    pub fn render(&self) -> PreviewOutcome {
        let bytes = self.handle.bytes();
        let max_height = self.options.max_height_px;

        let rendered = match self.kind {
            PreviewKind::Pdf => Rendered::Html(format!(
                "<embed src=\"{}\" width=\"100%\" height=\"{}px\" />",
                escape_attr(&codec::data_url(mime::PDF, bytes)),
                max_height
            )),
            PreviewKind::Image => Rendered::Html(format!(
                "<img src=\"{}\" alt=\"Image Preview\" style=\"max-width: 100%; max-height: {}px;\" />",
                escape_attr(&codec::data_url(essence(self.handle.mime_type()), bytes)),
                max_height
            )),
            PreviewKind::Tabular => match parse_workbook_with_limits(bytes, self.options.limits) {
                Ok(grid) => {
                    let active = grid.first().map(|sheet| sheet.name.clone());
                    let html = self
                        .options
                        .sheet_view
                        .render(&grid, active.as_deref().unwrap_or_default());
                    Rendered::Sheets { grid, active, html }
                }
                Err(e) => Rendered::Failed {
                    html: "<p>Error rendering spreadsheet</p>".to_string(),
                    cause: e.to_string(),
                },
            },
            PreviewKind::Document => match convert_to_html(bytes) {
                Ok(conversion) => Rendered::Document {
                    html: conversion.html,
                    messages: conversion.messages,
                },
                Err(e) => Rendered::Failed {
                    html: "<p>Error rendering document</p>".to_string(),
                    cause: e.to_string(),
                },
            },
            PreviewKind::RawText => {
                Rendered::Html(format!("<pre>{}</pre>", escape_text(&String::from_utf8_lossy(bytes))))
            }
        };

        PreviewOutcome {
            token: self.token,
            file_name: self.handle.name().to_string(),
            rendered,
        }
    }
}

/// Result of [`PreviewRequest::render`].
#[derive(Debug, Clone)]
pub struct PreviewOutcome {
    token: PreviewToken,
    file_name: String,
    rendered: Rendered,
}

#[derive(Debug, Clone)]
enum Rendered {
    Html(String),
    Sheets {
        grid: SheetGrid,
        active: Option<String>,
        html: String,
    },
    Document {
        html: String,
        messages: Vec<String>,
    },
    Failed {
        html: String,
        cause: String,
    },
}

impl PreviewOutcome {
    pub fn token(&self) -> PreviewToken {
        self.token
    }

    pub fn html(&self) -> &str {
        match &self.rendered {
            Rendered::Html(html)
            | Rendered::Sheets { html, .. }
            | Rendered::Document { html, .. }
            | Rendered::Failed { html, .. } => html,
        }
    }
}

/// Owns the preview surface and the single active preview.
pub struct PreviewDispatcher<S: PreviewSurface> {
    surface: S,
    options: PreviewOptions,
    state: PreviewState,
    generation: u64,
    /// Parsed workbook of the open tabular preview, kept for tab switches
    grid: Option<SheetGrid>,
}

impl<S: PreviewSurface> PreviewDispatcher<S> {
    pub fn new(surface: S, options: PreviewOptions) -> Self {
        Self {
            surface,
            options,
            state: PreviewState::default(),
            generation: 0,
            grid: None,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn state(&self) -> &PreviewState {
        &self.state
    }

    pub fn options(&self) -> &PreviewOptions {
        &self.options
    }

    pub fn sheet_grid(&self) -> Option<&SheetGrid> {
        self.grid.as_ref()
    }

    /// Token an outcome must carry to be applied right now.
    pub fn current_token(&self) -> Option<PreviewToken> {
        self.state.file.map(|file| PreviewToken {
            generation: self.generation,
            file,
        })
    }

    /// Start previewing `file`. Any previous content is discarded and the
    /// surface shown empty until the outcome arrives.
    pub fn request(&mut self, file: FileId, handle: &FileHandle) -> PreviewRequest {
        let kind = PreviewKind::classify(handle.mime_type());

        self.generation += 1;
        self.state = PreviewState {
            phase: PreviewPhase::Open(kind),
            file: Some(file),
            active_sheet: None,
        };
        self.grid = None;
        self.surface.set_content(String::new());
        self.surface.set_visible(true);

        PreviewRequest {
            token: PreviewToken {
                generation: self.generation,
                file,
            },
            kind,
            handle: handle.clone(),
            options: self.options.clone(),
        }
    }

    /// Apply a rendered outcome. Returns false (and changes nothing) when
    /// the outcome belongs to a superseded or closed preview.
    pub fn complete(&mut self, outcome: PreviewOutcome) -> bool {
        if self.current_token() != Some(outcome.token) {
            log::warn!(
                "Dropping stale preview of '{}' ({})",
                outcome.file_name,
                outcome.token.file
            );
            return false;
        }

        match outcome.rendered {
            Rendered::Html(html) => self.surface.set_content(html),
            Rendered::Sheets { grid, active, html } => {
                self.state.active_sheet = active;
                self.grid = Some(grid);
                self.surface.set_content(html);
            }
            Rendered::Document { html, messages } => {
                for message in &messages {
                    log::warn!("Preview of '{}': {}", outcome.file_name, message);
                }
                self.surface.set_content(html);
            }
            Rendered::Failed { html, cause } => {
                log::warn!("Preview of '{}' failed: {}", outcome.file_name, cause);
                self.surface.set_content(html);
            }
        }
        true
    }

    /// Request, render and complete inline.
    pub fn open(&mut self, file: FileId, handle: &FileHandle) {
        let request = self.request(file, handle);
        let outcome = request.render();
        self.complete(outcome);
    }

    /// Switch the open tabular preview to another sheet. Unknown names and
    /// non-tabular previews are ignored.
    pub fn select_sheet(&mut self, name: &str) -> bool {
        if self.state.phase != PreviewPhase::Open(PreviewKind::Tabular) {
            return false;
        }
        let Some(grid) = &self.grid else {
            return false;
        };
        if grid.sheet(name).is_none() {
            log::debug!("Ignoring unknown sheet '{}'", name);
            return false;
        }

        let html = self.options.sheet_view.render(grid, name);
        self.state.active_sheet = Some(name.to_string());
        self.surface.set_content(html);
        true
    }

    /// Hide the surface and invalidate any in-flight render.
    pub fn close(&mut self) {
        self.generation += 1;
        self.state = PreviewState::default();
        self.grid = None;
        self.surface.set_visible(false);
        self.surface.set_content(String::new());
    }
}

/// Declared type without parameters: `image/png; q=1` -> `image/png`
fn essence(mime_type: &str) -> &str {
    mime_type.split(';').next().unwrap_or_default().trim()
}

//! Browser window mirror.
//!
//! A [`Window`] tracks, driver-side, everything the frontend has announced
//! about one of its windows. It never talks to the frontend itself: the
//! session dispatches parsed notifications into it and reads its state
//! back out for wait predicates.
//!
//! # Mirrored Attributes
//!
//! | Attribute | Updated by |
//! |-----------|------------|
//! | size | `SIZE`, `GET_DIMENSIONS` |
//! | title | `TITLE` |
//! | url | `SET_URL` |
//! | status, pointer, scale | `SET_STATUS`, `SET_POINTER`, `SET_SCALE` |
//! | scroll offset | `SET_SCROLL`, `GET_SCROLL`, `SCROLL_START` |
//! | content extent | `UPDATE_EXTENT` |
//! | throbbing | `START_THROBBER`, `STOP_THROBBER` |
//! | console log | `CONSOLE_LOG` |
//! | captured plots | `REDRAW START`/`STOP` gating `PLOT` lines |
//!
//! Once the frontend destroys a window the mirror flips `alive` off and
//! becomes inert: every mutating entry point checks the flag, so a stray
//! late notification cannot resurrect state.

// ============================================================================
// Imports
// ============================================================================

use tracing::warn;

use crate::identifiers::WindowId;
use crate::protocol::{NewWindowParams, WindowUpdate};

// ============================================================================
// LogEntry
// ============================================================================

/// One console message captured from a window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Message source, e.g. a script URL.
    pub source: String,
    /// Whether the frontend marked the entry foldable.
    pub foldable: bool,
    /// Severity level token, e.g. `WARNING`.
    pub level: String,
    /// Message text.
    pub message: String,
}

// ============================================================================
// LogFilter
// ============================================================================

/// Conjunctive filter over console-log entries.
///
/// Each criterion is optional; an entry matches when every criterion that
/// is set agrees with it. A filter with no criteria set matches nothing
/// by definition and is rejected by the query operations.
///
/// # Example
///
/// ```
/// use monkey_driver::LogFilter;
///
/// let filter = LogFilter::new().level("WARNING").substring("mixed content");
/// assert!(!filter.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogFilter {
    source: Option<String>,
    foldable: Option<bool>,
    level: Option<String>,
    substring: Option<String>,
}

impl LogFilter {
    /// Creates a filter with no criteria.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires an exact source match.
    #[must_use]
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Requires the foldable flag to match.
    #[must_use]
    pub fn foldable(mut self, foldable: bool) -> Self {
        self.foldable = Some(foldable);
        self
    }

    /// Requires an exact level match.
    #[must_use]
    pub fn level(mut self, level: impl Into<String>) -> Self {
        self.level = Some(level.into());
        self
    }

    /// Requires the message to contain a substring.
    #[must_use]
    pub fn substring(mut self, substring: impl Into<String>) -> Self {
        self.substring = Some(substring.into());
        self
    }

    /// Returns `true` if no criterion is set.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.source.is_none()
            && self.foldable.is_none()
            && self.level.is_none()
            && self.substring.is_none()
    }

    /// Returns `true` if `entry` satisfies every set criterion.
    #[must_use]
    pub fn matches(&self, entry: &LogEntry) -> bool {
        if let Some(source) = &self.source
            && entry.source != *source
        {
            return false;
        }
        if let Some(foldable) = self.foldable
            && entry.foldable != foldable
        {
            return false;
        }
        if let Some(level) = &self.level
            && entry.level != *level
        {
            return false;
        }
        if let Some(substring) = &self.substring
            && !entry.message.contains(substring.as_str())
        {
            return false;
        }
        true
    }
}

// ============================================================================
// PlotCommand
// ============================================================================

/// One captured drawing command.
///
/// The tokens belong to the frontend's plotting protocol; the driver
/// records them without interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlotCommand {
    kind: String,
    args: Vec<String>,
}

impl PlotCommand {
    /// Splits raw plot tokens into a kind and its arguments.
    pub(crate) fn from_tokens(tokens: Vec<String>) -> Self {
        let mut tokens = tokens.into_iter();
        let kind = tokens.next().unwrap_or_default();
        Self {
            kind,
            args: tokens.collect(),
        }
    }

    /// Returns the command kind, e.g. `TEXT` or `RECT`.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Returns the command arguments, unjoined.
    #[inline]
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

// ============================================================================
// Window
// ============================================================================

/// Driver-side mirror of one frontend window.
#[derive(Debug, Clone)]
pub struct Window {
    id: WindowId,
    core_id: String,
    existing: Option<WindowId>,
    new_tab: bool,
    clone: bool,
    width: u32,
    height: u32,
    title: String,
    throbbing: bool,
    scroll_x: i32,
    scroll_y: i32,
    content_width: u32,
    content_height: u32,
    status: String,
    pointer: String,
    scale: f64,
    url: String,
    log: Vec<LogEntry>,
    plotted: Vec<PlotCommand>,
    plotting: bool,
    alive: bool,
}

impl Window {
    /// Creates a mirror from a `WINDOW NEW` announcement.
    pub(crate) fn new(id: WindowId, params: NewWindowParams) -> Self {
        Self {
            id,
            core_id: params.core_id,
            existing: params.existing,
            new_tab: params.new_tab,
            clone: params.clone,
            width: 0,
            height: 0,
            title: String::new(),
            throbbing: false,
            scroll_x: 0,
            scroll_y: 0,
            content_width: 0,
            content_height: 0,
            status: String::new(),
            pointer: String::new(),
            scale: 1.0,
            url: String::new(),
            log: Vec::new(),
            plotted: Vec::new(),
            plotting: false,
            alive: true,
        }
    }
}

// ============================================================================
// Window - Notification Entry Points
// ============================================================================

impl Window {
    /// Applies one attribute mutation.
    ///
    /// Updates for a destroyed window are dropped with a warning.
    pub(crate) fn apply(&mut self, update: WindowUpdate) {
        if !self.alive {
            warn!(window = %self.id, ?update, "Dropping update for destroyed window");
            return;
        }
        match update {
            WindowUpdate::Size { width, height } => {
                self.width = width;
                self.height = height;
            }
            WindowUpdate::Title { title } => self.title = title,
            WindowUpdate::Url { url } => self.url = url,
            WindowUpdate::Status { status } => self.status = status,
            WindowUpdate::Pointer { pointer } => self.pointer = pointer,
            WindowUpdate::Scale { scale } => self.scale = scale,
            WindowUpdate::Scroll { x, y } => {
                self.scroll_x = x;
                self.scroll_y = y;
            }
            WindowUpdate::ScrollStart => {
                self.scroll_x = 0;
                self.scroll_y = 0;
            }
            WindowUpdate::Extent { width, height } => {
                self.content_width = width;
                self.content_height = height;
            }
            WindowUpdate::ThrobberStart => self.throbbing = true,
            WindowUpdate::ThrobberStop => self.throbbing = false,
            WindowUpdate::ConsoleLog {
                source,
                foldable,
                level,
                message,
            } => self.log.push(LogEntry {
                source,
                foldable,
                level,
                message,
            }),
            // Announced but carrying no mirrored state.
            WindowUpdate::BoxUpdated
            | WindowUpdate::ContentChanged
            | WindowUpdate::IconChanged => {}
        }
    }

    /// Marks the window destroyed; the mirror keeps its last state.
    pub(crate) fn destroy(&mut self) {
        if !self.alive {
            warn!(window = %self.id, "Duplicate destroy for window");
            return;
        }
        self.alive = false;
    }

    /// Starts a draw-capture cycle, discarding previously captured plots.
    pub(crate) fn begin_capture(&mut self) {
        if !self.alive {
            warn!(window = %self.id, "Dropping capture start for destroyed window");
            return;
        }
        self.plotting = true;
        self.plotted.clear();
    }

    /// Ends the draw-capture cycle.
    pub(crate) fn end_capture(&mut self) {
        if !self.alive {
            warn!(window = %self.id, "Dropping capture stop for destroyed window");
            return;
        }
        self.plotting = false;
    }

    /// Records one plot command while a capture cycle is active.
    pub(crate) fn record_plot(&mut self, tokens: Vec<String>) {
        if !self.alive || !self.plotting {
            return;
        }
        self.plotted.push(PlotCommand::from_tokens(tokens));
    }

    /// Discards accumulated console-log entries.
    pub(crate) fn clear_log(&mut self) {
        self.log.clear();
    }
}

// ============================================================================
// Window - Accessors
// ============================================================================

impl Window {
    /// Returns the frontend-assigned identifier.
    #[inline]
    #[must_use]
    pub fn id(&self) -> WindowId {
        self.id
    }

    /// Returns the owning core-side identifier, as announced.
    #[inline]
    #[must_use]
    pub fn core_id(&self) -> &str {
        &self.core_id
    }

    /// Returns the window this one was opened from, when announced.
    #[inline]
    #[must_use]
    pub fn existing(&self) -> Option<WindowId> {
        self.existing
    }

    /// Returns `true` if the window opened as a tab.
    #[inline]
    #[must_use]
    pub fn is_new_tab(&self) -> bool {
        self.new_tab
    }

    /// Returns `true` if the window is a clone of [`Window::existing`].
    #[inline]
    #[must_use]
    pub fn is_clone(&self) -> bool {
        self.clone
    }

    /// Returns the viewport size as `(width, height)`.
    #[inline]
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Returns the window title.
    #[inline]
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns `true` while a page load is in progress.
    #[inline]
    #[must_use]
    pub fn is_throbbing(&self) -> bool {
        self.throbbing
    }

    /// Returns the scroll offset as `(x, y)`.
    #[inline]
    #[must_use]
    pub fn scroll(&self) -> (i32, i32) {
        (self.scroll_x, self.scroll_y)
    }

    /// Returns the content extent as `(width, height)`.
    #[inline]
    #[must_use]
    pub fn content_extent(&self) -> (u32, u32) {
        (self.content_width, self.content_height)
    }

    /// Returns the status-bar text.
    #[inline]
    #[must_use]
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Returns the pointer shape name.
    #[inline]
    #[must_use]
    pub fn pointer(&self) -> &str {
        &self.pointer
    }

    /// Returns the rendering scale factor.
    #[inline]
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Returns the current URL.
    #[inline]
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns `false` once the frontend has destroyed the window.
    #[inline]
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Returns `true` while a draw-capture cycle is active.
    #[inline]
    #[must_use]
    pub fn is_capturing(&self) -> bool {
        self.plotting
    }

    /// Returns the plots captured by the most recent redraw cycle.
    #[inline]
    #[must_use]
    pub fn plotted(&self) -> &[PlotCommand] {
        &self.plotted
    }

    /// Returns the accumulated console-log entries.
    #[inline]
    #[must_use]
    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    /// Returns `true` if any log entry satisfies `filter`.
    #[must_use]
    pub fn log_matches(&self, filter: &LogFilter) -> bool {
        self.log.iter().any(|entry| filter.matches(entry))
    }
}

// ============================================================================
// Tests
// ============================================================================

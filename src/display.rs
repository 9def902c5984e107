use crate::ClassifyError;
use std::io::Write;
use tracing::warn;

pub const LOADING_TEXT: &str = "Loading...";
pub const LABEL_PREFIX: &str = "Classification: ";
pub const FAILURE_PREFIX: &str = "Classification failed: ";

/// Where the text to classify comes from.
pub trait TextSource {
    fn read(&self) -> String;
}

/// A text element that can be shown or hidden.
pub trait DisplaySurface {
    fn set_visible(&mut self, visible: bool);

    fn set_text(&mut self, text: &str);
}

impl TextSource for String {
    fn read(&self) -> String {
        self.clone()
    }
}

impl<D: DisplaySurface + ?Sized> DisplaySurface for &mut D {
    fn set_visible(&mut self, visible: bool) {
        (**self).set_visible(visible);
    }

    fn set_text(&mut self, text: &str) {
        (**self).set_text(text);
    }
}

/// What the controller last asked the display to show.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DisplayState {
    #[default]
    Hidden,
    Loading,
    Classified(String),
    Failed(ClassifyError),
}

impl DisplayState {
    pub fn text(&self) -> Option<String> {
        match self {
            DisplayState::Hidden => None,
            DisplayState::Loading => Some(LOADING_TEXT.to_string()),
            DisplayState::Classified(label) => Some(format!("{LABEL_PREFIX}{label}")),
            DisplayState::Failed(err) => Some(format!("{FAILURE_PREFIX}{err}")),
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            DisplayState::Classified(label) => Some(label),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ClassifyError> {
        match self {
            DisplayState::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Pushes this state onto a surface. Text goes first so a surface never
    /// becomes visible while still holding the previous value.
    pub fn apply<D: DisplaySurface + ?Sized>(&self, surface: &mut D) {
        match self.text() {
            Some(text) => {
                surface.set_text(&text);
                surface.set_visible(true);
            }
            None => surface.set_visible(false),
        }
    }
}

/// Prints the display as lines on a terminal (or any writer).
///
/// A line is written whenever the text changes while visible, and when the
/// display turns visible. Hiding prints nothing.
pub struct TerminalDisplay<W: Write> {
    writer: W,
    visible: bool,
    text: String,
}

impl<W: Write> TerminalDisplay<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            visible: false,
            text: String::new(),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn emit(&mut self) {
        let result = writeln!(self.writer, "{}", self.text).and_then(|_| self.writer.flush());
        if let Err(err) = result {
            warn!(error = %err, "failed to write to display");
        }
    }
}

impl TerminalDisplay<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> DisplaySurface for TerminalDisplay<W> {
    fn set_visible(&mut self, visible: bool) {
        let became_visible = visible && !self.visible;
        self.visible = visible;
        if became_visible {
            self.emit();
        }
    }

    fn set_text(&mut self, text: &str) {
        if self.text == text {
            return;
        }
        self.text = text.to_string();
        if self.visible {
            self.emit();
        }
    }
}

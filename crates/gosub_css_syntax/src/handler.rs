use crate::selector::SelectorList;
use crate::value::LexicalValue;
use gosub_css_shared::errors::CssError;

/// Receives the content of declaration blocks and rules as they are parsed
pub trait DocumentHandler {
    fn property(&mut self, name: &str, value: &LexicalValue, important: bool);

    fn start_selector(&mut self, _selectors: &SelectorList) {}

    fn end_selector(&mut self, _selectors: &SelectorList) {}

    fn start_at_rule(&mut self, _name: &str, _prelude: &str) {}

    fn end_at_rule(&mut self) {}
}

/// Receives errors and warnings found while parsing. Every reported error carries a location.
pub trait CssErrorHandler {
    fn error(&mut self, error: CssError);

    fn fatal_error(&mut self, error: CssError);

    fn warning(&mut self, warning: CssError);
}

/// Error handler that reports through the `log` crate
#[derive(Clone, Debug, Default)]
pub struct LoggingErrorHandler {
    source: Option<String>,
}

impl LoggingErrorHandler {
    pub fn new(source: Option<String>) -> Self {
        Self { source }
    }

    fn source(&self) -> &str {
        self.source.as_deref().unwrap_or("<inline>")
    }
}

impl CssErrorHandler for LoggingErrorHandler {
    fn error(&mut self, error: CssError) {
        log::warn!("{}: {}", self.source(), error);
    }

    fn fatal_error(&mut self, error: CssError) {
        log::error!("{}: {}", self.source(), error);
    }

    fn warning(&mut self, warning: CssError) {
        log::info!("{}: {}", self.source(), warning);
    }
}

/// Error handler that keeps everything for later inspection
#[derive(Clone, Debug, Default)]
pub struct CollectingErrorHandler {
    pub errors: Vec<CssError>,
    pub fatal_errors: Vec<CssError>,
    pub warnings: Vec<CssError>,
}

impl CollectingErrorHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty() || !self.fatal_errors.is_empty()
    }
}

impl CssErrorHandler for CollectingErrorHandler {
    fn error(&mut self, error: CssError) {
        self.errors.push(error);
    }

    fn fatal_error(&mut self, error: CssError) {
        self.fatal_errors.push(error);
    }

    fn warning(&mut self, warning: CssError) {
        self.warnings.push(warning);
    }
}

/// Result of a recovering parse: the value that could be salvaged plus everything that was
/// dropped or looked suspicious along the way
#[derive(Clone, Debug, PartialEq)]
pub struct ParseReport<T> {
    pub value: T,
    pub errors: Vec<CssError>,
    pub warnings: Vec<CssError>,
}

impl<T> ParseReport<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Hands the collected errors and warnings to the given handler and returns the value
    pub fn forward(self, handler: &mut dyn CssErrorHandler) -> T {
        for error in self.errors {
            handler.error(error);
        }
        for warning in self.warnings {
            handler.warning(warning);
        }
        self.value
    }
}

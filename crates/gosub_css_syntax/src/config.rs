use bitflags::bitflags;
use gosub_css_shared::char_stream::Location;

bitflags! {
    /// Optional parser behaviour
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ParserFlags: u8 {
        /// Accept old Internet Explorer value hacks (`600px\9`, `progid:...`, `expression()`)
        /// as compatibility identifiers
        const IEVALUES = 0b0000_0001;
        /// Accept a `*` in front of a property name
        const STARHACK = 0b0000_0010;
    }
}

/// Maximum depth of nested functions, parentheses and selector lists
pub const DEFAULT_MAX_NESTING: usize = 64;

/// ParserConfig holds the configuration for the parser
#[derive(Clone, Debug)]
pub struct ParserConfig {
    /// Optional parser behaviour
    pub flags: ParserFlags,
    /// Location holds the start position of the given element in the data source
    pub location: Location,
    /// Optional source filename or url
    pub source: Option<String>,
    /// Maximum nesting depth before the parser gives up with a syntax error
    pub max_nesting: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            flags: ParserFlags::empty(),
            location: Location::default(),
            source: None,
            max_nesting: DEFAULT_MAX_NESTING,
        }
    }
}

impl ParserConfig {
    #[must_use]
    pub fn with_flags(flags: ParserFlags) -> Self {
        Self {
            flags,
            ..Default::default()
        }
    }
}

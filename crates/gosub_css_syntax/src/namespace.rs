use std::collections::HashMap;
use std::fmt;

/// Namespace of a type or attribute selector
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// `*|name`: any namespace, including none
    Any,
    /// `|name`: elements without a namespace
    NoNamespace,
    /// `prefix|name` where the prefix resolved to `uri`
    Uri { prefix: String, uri: String },
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Namespace::Any => write!(f, "*|"),
            Namespace::NoNamespace => write!(f, "|"),
            Namespace::Uri { prefix, .. } => {
                write!(f, "{}|", crate::escape::escape_identifier(prefix))
            }
        }
    }
}

/// Resolves namespace prefixes used in selectors. The `*` and empty prefixes are handled by the
/// parser and are never looked up.
pub trait NamespaceMap {
    fn lookup(&self, prefix: &str) -> Option<String>;
}

/// A namespace map without any registered prefix
pub struct NoNamespaces;

impl NamespaceMap for NoNamespaces {
    fn lookup(&self, _prefix: &str) -> Option<String> {
        None
    }
}

impl NamespaceMap for HashMap<String, String> {
    fn lookup(&self, prefix: &str) -> Option<String> {
        self.get(prefix).cloned()
    }
}

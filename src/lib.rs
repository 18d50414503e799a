//! Gosub CSS grammar engine
//!
//! Parsers for the CSS micro-syntaxes: property values, selectors, media queries, `@supports`
//! conditions, `An+B` and custom property syntax descriptors. The parsers live in
//! [`gosub_css_syntax`], the character stream and error types in [`gosub_css_shared`]. This
//! crate adds the pieces used by the `css-grammar` binary.

pub use gosub_css_shared as shared;
pub use gosub_css_syntax as syntax;

pub mod grammar;
pub mod snippet;

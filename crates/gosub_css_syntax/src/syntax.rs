use lazy_static::lazy_static;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};

/// Data type of a `<type>` clause in a custom property syntax
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SyntaxCategory {
    Angle,
    Color,
    CustomIdent,
    Image,
    Integer,
    Length,
    LengthPercentage,
    Number,
    Percentage,
    Resolution,
    String,
    Time,
    TransformFunction,
    TransformList,
    Url,
}

lazy_static! {
    static ref CATEGORY_NAMES: HashMap<&'static str, SyntaxCategory> = {
        let mut names = HashMap::new();
        names.insert("angle", SyntaxCategory::Angle);
        names.insert("color", SyntaxCategory::Color);
        names.insert("custom-ident", SyntaxCategory::CustomIdent);
        names.insert("image", SyntaxCategory::Image);
        names.insert("integer", SyntaxCategory::Integer);
        names.insert("length", SyntaxCategory::Length);
        names.insert("length-percentage", SyntaxCategory::LengthPercentage);
        names.insert("number", SyntaxCategory::Number);
        names.insert("percentage", SyntaxCategory::Percentage);
        names.insert("resolution", SyntaxCategory::Resolution);
        names.insert("string", SyntaxCategory::String);
        names.insert("time", SyntaxCategory::Time);
        names.insert("transform-function", SyntaxCategory::TransformFunction);
        names.insert("transform-list", SyntaxCategory::TransformList);
        names.insert("url", SyntaxCategory::Url);
        names
    };
}

impl SyntaxCategory {
    /// Looks up the category of a type name (without the angle brackets)
    pub fn from_name(name: &str) -> Option<SyntaxCategory> {
        CATEGORY_NAMES.get(name).copied()
    }

    pub fn name(&self) -> &'static str {
        match self {
            SyntaxCategory::Angle => "angle",
            SyntaxCategory::Color => "color",
            SyntaxCategory::CustomIdent => "custom-ident",
            SyntaxCategory::Image => "image",
            SyntaxCategory::Integer => "integer",
            SyntaxCategory::Length => "length",
            SyntaxCategory::LengthPercentage => "length-percentage",
            SyntaxCategory::Number => "number",
            SyntaxCategory::Percentage => "percentage",
            SyntaxCategory::Resolution => "resolution",
            SyntaxCategory::String => "string",
            SyntaxCategory::Time => "time",
            SyntaxCategory::TransformFunction => "transform-function",
            SyntaxCategory::TransformList => "transform-list",
            SyntaxCategory::Url => "url",
        }
    }

    /// `<transform-list>` is already a list and takes no multiplier
    pub fn accepts_multiplier(&self) -> bool {
        *self != SyntaxCategory::TransformList
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Multiplier {
    /// `+`: space separated list
    OneOrMore,
    /// `#`: comma separated list
    CommaList,
}

impl Display for Multiplier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Multiplier::OneOrMore => write!(f, "+"),
            Multiplier::CommaList => write!(f, "#"),
        }
    }
}

/// One alternative of a syntax descriptor
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SyntaxComponent {
    /// `*`, any token sequence
    Universal,
    /// `<type>` or a literal identifier
    Component {
        category: SyntaxCategory,
        /// Type name, or the identifier itself for literal clauses
        name: String,
        literal: bool,
        multiplier: Option<Multiplier>,
    },
}

impl Display for SyntaxComponent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SyntaxComponent::Universal => write!(f, "*"),
            SyntaxComponent::Component {
                name,
                literal,
                multiplier,
                ..
            } => {
                if *literal {
                    write!(f, "{}", crate::escape::escape_identifier(name))?;
                } else {
                    write!(f, "<{name}>")?;
                }
                match multiplier {
                    Some(multiplier) => write!(f, "{multiplier}"),
                    None => Ok(()),
                }
            }
        }
    }
}

/// Ordered list of alternatives, as in `<length> | <percentage>+ | auto`
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct SyntaxDescriptor {
    pub components: Vec<SyntaxComponent>,
}

impl SyntaxDescriptor {
    pub fn is_universal(&self) -> bool {
        self.components == [SyntaxComponent::Universal]
    }
}

impl Display for SyntaxDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.components.iter().map(|c| c.to_string()).collect();
        write!(f, "{}", parts.join(" | "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_names() {
        assert_eq!(
            SyntaxCategory::from_name("length-percentage"),
            Some(SyntaxCategory::LengthPercentage)
        );
        assert_eq!(SyntaxCategory::from_name("foo"), None);
        assert_eq!(SyntaxCategory::TransformList.name(), "transform-list");
        assert!(!SyntaxCategory::TransformList.accepts_multiplier());
        assert!(SyntaxCategory::Length.accepts_multiplier());
    }

    #[test]
    fn display_descriptor() {
        let descriptor = SyntaxDescriptor {
            components: vec![
                SyntaxComponent::Component {
                    category: SyntaxCategory::Length,
                    name: "length".into(),
                    literal: false,
                    multiplier: Some(Multiplier::CommaList),
                },
                SyntaxComponent::Component {
                    category: SyntaxCategory::CustomIdent,
                    name: "auto".into(),
                    literal: true,
                    multiplier: None,
                },
            ],
        };

        assert_eq!(descriptor.to_string(), "<length># | auto");
        assert!(!descriptor.is_universal());
    }
}

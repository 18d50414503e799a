use crate::escape::{escape_identifier, escape_string};
use crate::namespace::Namespace;
use itertools::Itertools;
use std::fmt::{Display, Formatter};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Combinator {
    Descendant,
    Child,
    NextSibling,
    SubsequentSibling,
    Column,
}

impl Display for Combinator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Combinator::Descendant => write!(f, " "),
            Combinator::Child => write!(f, ">"),
            Combinator::NextSibling => write!(f, "+"),
            Combinator::SubsequentSibling => write!(f, "~"),
            Combinator::Column => write!(f, "||"),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum MatcherType {
    #[default]
    None, // No matcher
    Equals,         // Equals
    Includes,       // Must include
    DashMatch,      // Must start with
    PrefixMatch,    // Must begin with
    SuffixMatch,    // Must ends with
    SubstringMatch, // Must contain
}

impl Display for MatcherType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            MatcherType::None => write!(f, ""),
            MatcherType::Equals => write!(f, "="),
            MatcherType::Includes => write!(f, "~="),
            MatcherType::DashMatch => write!(f, "|="),
            MatcherType::PrefixMatch => write!(f, "^="),
            MatcherType::SuffixMatch => write!(f, "$="),
            MatcherType::SubstringMatch => write!(f, "*="),
        }
    }
}

/// Keyword form of an `An+B` argument
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PositionalKeyword {
    Odd,
    Even,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Selector {
    /// `*`, optionally namespace qualified. An unqualified universal selector is also the
    /// implicit base of a compound selector without a type selector.
    Universal { namespace: Option<Namespace> },
    /// Type selector
    Element {
        name: String,
        namespace: Option<Namespace>,
    },
    /// A simple selector with one or more conditions (classes, ids, attributes, pseudo-classes)
    Conditional {
        simple: Box<Selector>,
        condition: Box<Condition>,
    },
    Combinator {
        kind: Combinator,
        left: Box<Selector>,
        right: Box<Selector>,
    },
    /// Anchor of a relative selector, as in `:has(> img)`
    Scope,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Condition {
    Attribute {
        name: String,
        namespace: Option<Namespace>,
        matcher: MatcherType,
        value: Option<String>,
        case_insensitive: bool,
    },
    Class(String),
    Id(String),
    PseudoClass {
        name: String,
        /// Raw argument text of functional pseudo-classes
        argument: Option<String>,
    },
    PseudoElement {
        name: String,
        argument: Option<String>,
    },
    /// `:lang()` with its raw, comma separated arguments
    Lang(Vec<String>),
    /// `:nth-child()` and friends
    Positional {
        step: i32,
        offset: i32,
        of_type: bool,
        forward: bool,
        keyword: Option<PositionalKeyword>,
        of_list: Option<SelectorList>,
    },
    /// Pseudo-classes that take a selector list, like `:not()`, `:is()` or `:has()`
    SelectorArgument { name: String, list: SelectorList },
    And(Box<Condition>, Box<Condition>),
}

impl Condition {
    /// Combines two conditions into a (left-deep) `And`
    pub fn and(first: Condition, second: Condition) -> Condition {
        Condition::And(Box::new(first), Box::new(second))
    }

    /// Returns the conditions of an `And` chain in source order
    pub fn flatten(&self) -> Vec<&Condition> {
        match self {
            Condition::And(first, second) => {
                let mut conditions = first.flatten();
                conditions.extend(second.flatten());
                conditions
            }
            c => vec![c],
        }
    }
}

/// Comma separated list of complex selectors
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct SelectorList {
    pub selectors: Vec<Selector>,
}

impl SelectorList {
    pub fn new(selectors: Vec<Selector>) -> Self {
        Self { selectors }
    }

    pub fn item(&self, index: usize) -> Option<&Selector> {
        self.selectors.get(index)
    }

    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Selector> {
        self.selectors.iter()
    }
}

/// Writes `(step, offset)` in its shortest `An+B` form
pub fn anb_to_string(step: i32, offset: i32) -> String {
    if step == 0 {
        return offset.to_string();
    }

    let a = match step {
        1 => "n".to_string(),
        -1 => "-n".to_string(),
        _ => format!("{step}n"),
    };

    match offset {
        0 => a,
        b if b > 0 => format!("{a}+{b}"),
        b => format!("{a}{b}"),
    }
}

fn write_namespace(f: &mut Formatter<'_>, namespace: &Option<Namespace>) -> std::fmt::Result {
    match namespace {
        Some(ns) => write!(f, "{ns}"),
        None => Ok(()),
    }
}

impl Display for Selector {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Selector::Universal { namespace } => {
                write_namespace(f, namespace)?;
                write!(f, "*")
            }
            Selector::Element { name, namespace } => {
                write_namespace(f, namespace)?;
                write!(f, "{}", escape_identifier(name))
            }
            Selector::Conditional { simple, condition } => {
                if **simple != (Selector::Universal { namespace: None }) {
                    write!(f, "{simple}")?;
                }
                write!(f, "{condition}")
            }
            Selector::Combinator { kind, left, right } => {
                if **left == Selector::Scope {
                    if *kind == Combinator::Descendant {
                        return write!(f, "{right}");
                    }
                    return write!(f, "{kind}{right}");
                }
                write!(f, "{left}{kind}{right}")
            }
            Selector::Scope => Ok(()),
        }
    }
}

impl Display for Condition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Condition::Attribute {
                name,
                namespace,
                matcher,
                value,
                case_insensitive,
            } => {
                write!(f, "[")?;
                write_namespace(f, namespace)?;
                write!(f, "{}", escape_identifier(name))?;
                if let Some(value) = value {
                    write!(f, "{matcher}\"{}\"", escape_string(value, '"'))?;
                }
                if *case_insensitive {
                    write!(f, " i")?;
                }
                write!(f, "]")
            }
            Condition::Class(name) => write!(f, ".{}", escape_identifier(name)),
            Condition::Id(name) => write!(f, "#{}", escape_identifier(name)),
            Condition::PseudoClass { name, argument } => match argument {
                Some(argument) => write!(f, ":{name}({argument})"),
                None => write!(f, ":{name}"),
            },
            Condition::PseudoElement { name, argument } => match argument {
                Some(argument) => write!(f, "::{name}({argument})"),
                None => write!(f, "::{name}"),
            },
            Condition::Lang(languages) => write!(f, ":lang({})", languages.iter().join(",")),
            Condition::Positional {
                step,
                offset,
                of_type,
                forward,
                keyword,
                of_list,
            } => {
                let name = match (forward, of_type) {
                    (true, false) => "nth-child",
                    (false, false) => "nth-last-child",
                    (true, true) => "nth-of-type",
                    (false, true) => "nth-last-of-type",
                };
                let anb = match keyword {
                    Some(PositionalKeyword::Odd) => "odd".to_string(),
                    Some(PositionalKeyword::Even) => "even".to_string(),
                    None => anb_to_string(*step, *offset),
                };
                match of_list {
                    Some(list) => write!(f, ":{name}({anb} of {list})"),
                    None => write!(f, ":{name}({anb})"),
                }
            }
            Condition::SelectorArgument { name, list } => write!(f, ":{name}({list})"),
            Condition::And(first, second) => write!(f, "{first}{second}"),
        }
    }
}

impl Display for SelectorList {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.selectors.iter().join(","))
    }
}

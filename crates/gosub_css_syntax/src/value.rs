//! Lexical values
//!
//! A property value (or any other value expression) is a chain of lexical units. Functions,
//! sub-expressions and other function-like units own a parameter chain of their own. All
//! units of a value live in a single arena owned by [`LexicalValue`] and refer to each other
//! through [`UnitId`] indices.

use crate::escape::{escape_identifier, escape_string};
use crate::tokenizer::Number;
use gosub_css_shared::errors::{CssError, CssResult};
use itertools::Itertools;
use std::fmt;
use std::fmt::{Display, Formatter};

/// Index of a unit inside the arena of a [`LexicalValue`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperatorKind {
    Comma,
    Plus,
    Minus,
    Multiply,
    Slash,
    Exponent,
    Equals,
    Semicolon,
}

impl OperatorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperatorKind::Comma => ",",
            OperatorKind::Plus => "+",
            OperatorKind::Minus => "-",
            OperatorKind::Multiply => "*",
            OperatorKind::Slash => "/",
            OperatorKind::Exponent => "^",
            OperatorKind::Equals => "=",
            OperatorKind::Semicolon => ";",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColorFunctionKind {
    Rgb,
    Hsl,
    Hwb,
    Lab,
    Lch,
    Oklab,
    Oklch,
    Color,
}

impl ColorFunctionKind {
    /// Returns the color function kind for a function name. The legacy `rgba` and `hsla`
    /// aliases map onto `rgb` and `hsl`.
    pub fn from_name(name: &str) -> Option<ColorFunctionKind> {
        let kind = match name.to_ascii_lowercase().as_str() {
            "rgb" | "rgba" => ColorFunctionKind::Rgb,
            "hsl" | "hsla" => ColorFunctionKind::Hsl,
            "hwb" => ColorFunctionKind::Hwb,
            "lab" => ColorFunctionKind::Lab,
            "lch" => ColorFunctionKind::Lch,
            "oklab" => ColorFunctionKind::Oklab,
            "oklch" => ColorFunctionKind::Oklch,
            "color" => ColorFunctionKind::Color,
            _ => return None,
        };

        Some(kind)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ColorFunctionKind::Rgb => "rgb",
            ColorFunctionKind::Hsl => "hsl",
            ColorFunctionKind::Hwb => "hwb",
            ColorFunctionKind::Lab => "lab",
            ColorFunctionKind::Lch => "lch",
            ColorFunctionKind::Oklab => "oklab",
            ColorFunctionKind::Oklch => "oklch",
            ColorFunctionKind::Color => "color",
        }
    }

    /// True when the function accepts the legacy comma separated notation
    pub fn allows_legacy_syntax(&self) -> bool {
        matches!(self, ColorFunctionKind::Rgb | ColorFunctionKind::Hsl)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum UnitKind {
    Ident(String),
    String(String),
    Integer(i32),
    Real(Number),
    Percentage(Number),
    Dimension { value: Number, unit: String },
    Uri(String),
    Operator(OperatorKind),
    /// Parenthesized expression, the contents are the parameters
    SubExpression,
    /// Generic function, the arguments are the parameters
    Function(String),
    Calc,
    ColorFunction(ColorFunctionKind),
    Var,
    Attr,
    Counter,
    Counters,
    /// `element(#id)`, the single parameter is the id
    Element,
    UnicodeRange,
    UnicodeCharacter(u32),
    UnicodeWildcard(String),
    /// Raw text of a non-standard construct that is kept for compatibility
    CompatIdent(String),
    /// Placeholder for an empty `var()` fallback
    Empty,
}

impl UnitKind {
    /// True when units of this kind own a parameter chain
    pub fn has_parameters(&self) -> bool {
        matches!(
            self,
            UnitKind::SubExpression
                | UnitKind::Function(_)
                | UnitKind::Calc
                | UnitKind::ColorFunction(_)
                | UnitKind::Var
                | UnitKind::Attr
                | UnitKind::Counter
                | UnitKind::Counters
                | UnitKind::Element
                | UnitKind::UnicodeRange
        )
    }

    /// Name that is written before the parameter list
    fn function_name(&self) -> Option<&str> {
        match self {
            UnitKind::Function(name) => Some(name),
            UnitKind::Calc => Some("calc"),
            UnitKind::ColorFunction(kind) => Some(kind.name()),
            UnitKind::Var => Some("var"),
            UnitKind::Attr => Some("attr"),
            UnitKind::Counter => Some("counter"),
            UnitKind::Counters => Some("counters"),
            UnitKind::Element => Some("element"),
            _ => None,
        }
    }
}

const CSS_WIDE_KEYWORDS: [&str; 5] = ["inherit", "initial", "unset", "revert", "revert-layer"];

/// Returns true when the given identifier is a CSS-wide keyword
pub fn is_css_wide_keyword(ident: &str) -> bool {
    CSS_WIDE_KEYWORDS
        .iter()
        .any(|kw| kw.eq_ignore_ascii_case(ident))
}

#[derive(Clone, Debug, PartialEq)]
pub struct LexicalUnit {
    pub kind: UnitKind,
    next: Option<UnitId>,
    previous: Option<UnitId>,
    owner: Option<UnitId>,
    parameters: Option<UnitId>,
}

impl LexicalUnit {
    fn new(kind: UnitKind) -> Self {
        Self {
            kind,
            next: None,
            previous: None,
            owner: None,
            parameters: None,
        }
    }

    pub fn next(&self) -> Option<UnitId> {
        self.next
    }

    pub fn previous(&self) -> Option<UnitId> {
        self.previous
    }

    /// The function-like unit whose parameter chain contains this unit
    pub fn owner(&self) -> Option<UnitId> {
        self.owner
    }

    /// Head of the parameter chain of this unit
    pub fn parameters(&self) -> Option<UnitId> {
        self.parameters
    }

    pub fn is_parameter(&self) -> bool {
        self.owner.is_some()
    }

    pub fn is_css_wide_keyword(&self) -> bool {
        matches!(&self.kind, UnitKind::Ident(ident) if is_css_wide_keyword(ident))
    }
}

/// A value expression: an arena of lexical units and the head of the top level chain
#[derive(Clone, Debug, Default)]
pub struct LexicalValue {
    units: Vec<LexicalUnit>,
    head: Option<UnitId>,
}

impl LexicalValue {
    pub fn new() -> Self {
        Self::default()
    }

    /// First unit of the top level chain
    pub fn head(&self) -> Option<UnitId> {
        self.head
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    pub fn unit(&self, id: UnitId) -> &LexicalUnit {
        &self.units[id.0]
    }

    pub fn kind(&self, id: UnitId) -> &UnitKind {
        &self.units[id.0].kind
    }

    pub fn kind_mut(&mut self, id: UnitId) -> &mut UnitKind {
        &mut self.units[id.0].kind
    }

    /// Iterates over all units in the arena, including detached ones
    pub fn units(&self) -> impl Iterator<Item = (UnitId, &LexicalUnit)> {
        self.units.iter().enumerate().map(|(i, u)| (UnitId(i), u))
    }

    /// Iterates over the unit and all of its following siblings
    pub fn siblings(&self, start: Option<UnitId>) -> Siblings<'_> {
        Siblings {
            value: self,
            current: start,
        }
    }

    /// Iterates over the parameter chain of the given unit
    pub fn parameters(&self, id: UnitId) -> Siblings<'_> {
        self.siblings(self.unit(id).parameters)
    }

    /// Iterates over the top level chain
    pub fn top_level(&self) -> Siblings<'_> {
        self.siblings(self.head)
    }

    /// Adds a detached unit to the arena
    pub fn push_unit(&mut self, kind: UnitKind) -> UnitId {
        self.units.push(LexicalUnit::new(kind));
        UnitId(self.units.len() - 1)
    }

    /// Adds a unit at the end of the parameter chain of `owner`
    pub fn push_parameter(&mut self, owner: UnitId, kind: UnitKind) -> UnitId {
        let id = self.push_unit(kind);
        let last = self.siblings(self.unit(owner).parameters).last();
        match last {
            Some(last) => self.link(last, id),
            None => self.units[owner.0].parameters = Some(id),
        }
        self.units[id.0].owner = Some(owner);
        id
    }

    /// Adds a unit at the end of the top level chain
    pub fn push_top_level(&mut self, kind: UnitKind) -> UnitId {
        let id = self.push_unit(kind);
        let last = self.top_level().last();
        match last {
            Some(last) => self.link(last, id),
            None => self.head = Some(id),
        }
        id
    }

    /// Links the given detached units into a chain and makes it the top level chain
    pub(crate) fn set_top_level(&mut self, ids: &[UnitId]) {
        self.head = self.chain(None, ids);
    }

    /// Links the given detached units into a chain and makes it the parameter chain of `owner`
    pub(crate) fn set_parameters(&mut self, owner: UnitId, ids: &[UnitId]) {
        self.units[owner.0].parameters = self.chain(Some(owner), ids);
    }

    fn chain(&mut self, owner: Option<UnitId>, ids: &[UnitId]) -> Option<UnitId> {
        for pair in ids.windows(2) {
            self.link(pair[0], pair[1]);
        }
        for id in ids {
            self.units[id.0].owner = owner;
        }
        ids.first().copied()
    }

    fn link(&mut self, first: UnitId, second: UnitId) {
        self.units[first.0].next = Some(second);
        self.units[second.0].previous = Some(first);
    }

    fn last_of_chain(&self, start: UnitId) -> UnitId {
        self.siblings(Some(start)).last().unwrap_or(start)
    }

    /// Fails when `chain` is not the head of a detached chain, or when `at` is part of it. Only
    /// detached chains can be linked in, so a unit never ends up in two chains.
    fn check_detached(&self, at: UnitId, chain: UnitId) -> CssResult<()> {
        let unit = self.unit(chain);
        let linked = unit.previous.is_some()
            || unit.owner.is_some()
            || self.head == Some(chain)
            || self.units.iter().any(|u| u.parameters == Some(chain));
        if linked {
            return Err(CssError::new("Chain is already linked into the value"));
        }

        if self.siblings(Some(chain)).any(|id| id == at) {
            return Err(CssError::new(
                "Chain cannot be linked next to one of its own units",
            ));
        }

        Ok(())
    }

    /// Inserts the detached chain that starts at `chain` directly after `at`. The inserted
    /// units take over the owner of `at`.
    pub fn insert_next(&mut self, at: UnitId, chain: UnitId) -> CssResult<()> {
        self.check_detached(at, chain)?;

        let owner = self.unit(at).owner;
        let tail = self.last_of_chain(chain);
        let after = self.unit(at).next;

        let inserted: Vec<UnitId> = self.siblings(Some(chain)).collect();
        for id in inserted {
            self.units[id.0].owner = owner;
        }

        self.units[chain.0].previous = Some(at);
        self.units[at.0].next = Some(chain);
        self.units[tail.0].next = after;
        if let Some(after) = after {
            self.units[after.0].previous = Some(tail);
        }

        Ok(())
    }

    /// Replaces `at` by the detached chain starting at `replacement`, or removes it when no
    /// replacement is given. Returns the unit that now occupies the position of `at`.
    pub fn replace_by(
        &mut self,
        at: UnitId,
        replacement: Option<UnitId>,
    ) -> CssResult<Option<UnitId>> {
        if let Some(head) = replacement {
            self.check_detached(at, head)?;
        }

        let LexicalUnit {
            previous,
            next,
            owner,
            ..
        } = self.units[at.0].clone();

        let (first, last) = match replacement {
            Some(head) => {
                let tail = self.last_of_chain(head);
                let inserted: Vec<UnitId> = self.siblings(Some(head)).collect();
                for id in inserted {
                    self.units[id.0].owner = owner;
                }
                self.units[head.0].previous = previous;
                self.units[tail.0].next = next;
                (Some(head), Some(tail))
            }
            None => (next, previous),
        };

        match previous {
            Some(previous) => self.units[previous.0].next = first,
            None => match owner {
                Some(owner) => self.units[owner.0].parameters = first,
                None => {
                    if self.head == Some(at) {
                        self.head = first;
                    }
                }
            },
        }

        if let Some(next) = next {
            self.units[next.0].previous = last;
        }

        let unit = &mut self.units[at.0];
        unit.next = None;
        unit.previous = None;
        unit.owner = None;

        Ok(first)
    }

    /// Deep copies the unit, its following siblings and all of their parameters into a new
    /// value. Preceding siblings and the owner are never copied.
    pub fn clone_unit(&self, at: UnitId) -> LexicalValue {
        let mut value = LexicalValue::new();
        value.head = value.copy_chain(self, Some(at), None);
        value
    }

    /// Copies the unit and its parameters into a new value, without its siblings
    pub fn shallow_clone(&self, at: UnitId) -> LexicalValue {
        let mut value = LexicalValue::new();
        let id = value.copy_unit(self, at, None);
        value.head = Some(id);
        value
    }

    /// Copies the top level chain of another value into this arena as a detached chain, so it
    /// can be passed to [`LexicalValue::insert_next`] or [`LexicalValue::replace_by`].
    pub fn import(&mut self, other: &LexicalValue) -> Option<UnitId> {
        self.copy_chain(other, other.head, None)
    }

    fn copy_chain(
        &mut self,
        source: &LexicalValue,
        start: Option<UnitId>,
        owner: Option<UnitId>,
    ) -> Option<UnitId> {
        let ids = source
            .siblings(start)
            .map(|id| self.copy_unit(source, id, owner))
            .collect::<Vec<_>>();

        for pair in ids.windows(2) {
            self.link(pair[0], pair[1]);
        }

        ids.first().copied()
    }

    fn copy_unit(
        &mut self,
        source: &LexicalValue,
        id: UnitId,
        owner: Option<UnitId>,
    ) -> UnitId {
        let copy = self.push_unit(source.kind(id).clone());
        self.units[copy.0].owner = owner;
        let parameters = self.copy_chain(source, source.unit(id).parameters, Some(copy));
        self.units[copy.0].parameters = parameters;
        copy
    }

    /// Serializes the given unit (without its siblings)
    pub fn unit_to_string(&self, id: UnitId) -> String {
        let mut s = String::new();
        // writing into a String cannot fail
        let _ = self.write_unit(&mut s, id);
        s
    }

    /// Serializes the chain starting at the given unit
    pub fn chain_to_string(&self, start: Option<UnitId>) -> String {
        let mut s = String::new();
        let _ = self.write_chain(&mut s, start, false);
        s
    }

    fn write_chain(
        &self,
        f: &mut impl fmt::Write,
        start: Option<UnitId>,
        calc: bool,
    ) -> fmt::Result {
        let mut previous: Option<&UnitKind> = None;

        for id in self.siblings(start) {
            let kind = self.kind(id);

            if let Some(previous) = previous {
                let spaced = match (previous, kind) {
                    (UnitKind::Operator(op), _) | (_, UnitKind::Operator(op)) => {
                        calc && matches!(op, OperatorKind::Plus | OperatorKind::Minus)
                    }
                    _ => true,
                };
                if spaced {
                    f.write_char(' ')?;
                }
            }

            self.write_unit(f, id)?;
            previous = Some(kind);
        }

        Ok(())
    }

    fn write_unit(&self, f: &mut impl fmt::Write, id: UnitId) -> fmt::Result {
        let unit = self.unit(id);

        match &unit.kind {
            UnitKind::Ident(ident) => f.write_str(&escape_identifier(ident)),
            UnitKind::String(s) => write!(f, "\"{}\"", escape_string(s, '"')),
            UnitKind::Integer(i) => write!(f, "{i}"),
            UnitKind::Real(n) => f.write_str(&format_number(*n)),
            UnitKind::Percentage(n) => write!(f, "{}%", format_number(*n)),
            UnitKind::Dimension { value, unit } => {
                write!(f, "{}{}", format_number(*value), escape_unit(unit))
            }
            UnitKind::Uri(uri) => {
                if uri.chars().any(|c| c.is_whitespace() || "\"'()\\".contains(c)) {
                    write!(f, "url(\"{}\")", escape_string(uri, '"'))
                } else {
                    write!(f, "url({uri})")
                }
            }
            UnitKind::Operator(op) => f.write_str(op.as_str()),
            UnitKind::SubExpression => {
                f.write_char('(')?;
                self.write_chain(f, unit.parameters, true)?;
                f.write_char(')')
            }
            UnitKind::Calc => {
                f.write_str("calc(")?;
                self.write_chain(f, unit.parameters, true)?;
                f.write_char(')')
            }
            UnitKind::Element => {
                f.write_str("element(#")?;
                if let Some(id) = unit.parameters {
                    if let UnitKind::Ident(name) = self.kind(id) {
                        f.write_str(&escape_identifier(name))?;
                    }
                }
                f.write_char(')')
            }
            UnitKind::UnicodeRange => {
                f.write_str("U+")?;
                let parts = self
                    .siblings(unit.parameters)
                    .map(|id| match self.kind(id) {
                        UnitKind::UnicodeCharacter(cp) => format!("{cp:x}"),
                        UnitKind::UnicodeWildcard(w) => w.to_ascii_lowercase(),
                        _ => String::new(),
                    })
                    .join("-");
                f.write_str(&parts)
            }
            UnitKind::UnicodeCharacter(cp) => write!(f, "U+{cp:x}"),
            UnitKind::UnicodeWildcard(w) => write!(f, "U+{}", w.to_ascii_lowercase()),
            UnitKind::CompatIdent(raw) => f.write_str(raw),
            UnitKind::Empty => Ok(()),
            kind => {
                let name = kind.function_name().unwrap_or_default();
                write!(f, "{}(", escape_identifier(name))?;
                self.write_chain(f, unit.parameters, calc_like_function(name))?;
                f.write_char(')')
            }
        }
    }
}

/// Math functions whose arguments are calc sums
pub(crate) fn calc_like_function(name: &str) -> bool {
    matches!(
        name.to_ascii_lowercase().as_str(),
        "min" | "max" | "clamp" | "round" | "mod" | "rem" | "abs" | "sign" | "sin" | "cos" | "tan"
            | "asin" | "acos" | "atan" | "atan2" | "pow" | "sqrt" | "hypot" | "log" | "exp"
    )
}

/// Writes a number with the minimal amount of digits
pub(crate) fn format_number(n: Number) -> String {
    if n.fract() == 0.0 && n.abs() < 1e9 {
        return format!("{}", n as i64);
    }

    format!("{n}")
}

/// Units that could be read back as an exponent are escaped
fn escape_unit(unit: &str) -> String {
    let escaped = escape_identifier(unit);
    let mut chars = unit.chars();
    match (chars.next(), chars.next()) {
        (Some('e' | 'E'), Some(c)) if c.is_ascii_digit() || c == '-' => format!("\\{escaped}"),
        _ => escaped,
    }
}

impl Display for LexicalValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.write_chain(f, self.head, false)
    }
}

/// Structural equality: two values are equal when their top level chains serialize to the
/// same units, regardless of how the arena is laid out.
impl PartialEq for LexicalValue {
    fn eq(&self, other: &Self) -> bool {
        chains_equal(self, self.head, other, other.head)
    }
}

fn chains_equal(
    a: &LexicalValue,
    a_start: Option<UnitId>,
    b: &LexicalValue,
    b_start: Option<UnitId>,
) -> bool {
    let left: Vec<UnitId> = a.siblings(a_start).collect();
    let right: Vec<UnitId> = b.siblings(b_start).collect();

    left.len() == right.len()
        && left.iter().zip(right.iter()).all(|(l, r)| {
            a.kind(*l) == b.kind(*r)
                && chains_equal(a, a.unit(*l).parameters, b, b.unit(*r).parameters)
        })
}

pub struct Siblings<'a> {
    value: &'a LexicalValue,
    current: Option<UnitId>,
}

impl Iterator for Siblings<'_> {
    type Item = UnitId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.value.unit(id).next;
        Some(id)
    }
}

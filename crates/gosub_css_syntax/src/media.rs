//! Media query lists
//!
//! Media features keep their bounds as lexical values. Legacy `min-` and `max-` features are
//! normalized into `>=` and `<=` ranges while parsing, so `(min-width: 600px)` and
//! `(width >= 600px)` are the same feature.
//!
//! [`MediaQueryList::matches`] tells whether one list covers another: `a.matches(b)` is true when
//! every environment matched by `b` is matched by `a` as well.

use crate::condition::BooleanCondition;
use crate::value::{LexicalValue, OperatorKind, UnitId, UnitKind};
use itertools::Itertools;
use std::fmt::{Display, Formatter};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RangeOperator {
    /// `(name: value)`
    Plain,
    Eq,
    Lt,
    Le,
    Gt,
    Ge,
    /// `(v1 < name < v2)`
    LtLt,
    LtLe,
    LeLt,
    LeLe,
    /// `(v1 > name > v2)`
    GtGt,
    GtGe,
    GeGt,
    GeGe,
}

impl RangeOperator {
    /// Mirrors the operator, for turning `(v < name)` into `(name > v)`
    pub fn flip(self) -> RangeOperator {
        match self {
            RangeOperator::Lt => RangeOperator::Gt,
            RangeOperator::Le => RangeOperator::Ge,
            RangeOperator::Gt => RangeOperator::Lt,
            RangeOperator::Ge => RangeOperator::Le,
            op => op,
        }
    }

    /// Combines the two operators of a two-sided range. Both must point in the same direction.
    pub fn combine(first: RangeOperator, second: RangeOperator) -> Option<RangeOperator> {
        use RangeOperator::*;

        let op = match (first, second) {
            (Lt, Lt) => LtLt,
            (Lt, Le) => LtLe,
            (Le, Lt) => LeLt,
            (Le, Le) => LeLe,
            (Gt, Gt) => GtGt,
            (Gt, Ge) => GtGe,
            (Ge, Gt) => GeGt,
            (Ge, Ge) => GeGe,
            _ => return None,
        };

        Some(op)
    }

    /// Splits a two-sided operator into its two parts
    pub fn split(self) -> Option<(RangeOperator, RangeOperator)> {
        use RangeOperator::*;

        let parts = match self {
            LtLt => (Lt, Lt),
            LtLe => (Lt, Le),
            LeLt => (Le, Lt),
            LeLe => (Le, Le),
            GtGt => (Gt, Gt),
            GtGe => (Gt, Ge),
            GeGt => (Ge, Gt),
            GeGe => (Ge, Ge),
            _ => return None,
        };

        Some(parts)
    }

    pub fn is_two_sided(self) -> bool {
        self.split().is_some()
    }

    fn as_str(self) -> &'static str {
        match self {
            RangeOperator::Plain => ":",
            RangeOperator::Eq => "=",
            RangeOperator::Lt => "<",
            RangeOperator::Le => "<=",
            RangeOperator::Gt => ">",
            RangeOperator::Ge => ">=",
            _ => "",
        }
    }
}

impl Display for RangeOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.split() {
            Some((first, second)) => write!(f, "{} {}", first.as_str(), second.as_str()),
            None => write!(f, "{}", self.as_str()),
        }
    }
}

/// A media feature test. A feature without bound is a boolean test like `(color)`.
#[derive(Clone, Debug, PartialEq)]
pub struct MediaFeature {
    pub name: String,
    pub operator: RangeOperator,
    pub bound: Option<LexicalValue>,
    /// Right hand bound of a two-sided range
    pub bound2: Option<LexicalValue>,
}

impl MediaFeature {
    pub fn boolean(name: &str) -> Self {
        Self {
            name: name.to_string(),
            operator: RangeOperator::Plain,
            bound: None,
            bound2: None,
        }
    }

    pub fn range(name: &str, operator: RangeOperator, bound: LexicalValue) -> Self {
        Self {
            name: name.to_string(),
            operator,
            bound: Some(bound),
            bound2: None,
        }
    }

    /// True when every environment that satisfies this feature satisfies `other` too
    pub fn implies(&self, other: &MediaFeature) -> bool {
        if self.name != other.name {
            return false;
        }

        if other.bound.is_none() {
            // a boolean test holds for anything but zero
            return match self.interval() {
                Some(interval) => !interval.contains(0.0),
                None => true,
            };
        }

        if self == other {
            return true;
        }

        match (self.interval(), other.interval()) {
            (Some(mine), Some(theirs)) => mine.unit == theirs.unit && mine.within(&theirs),
            _ => false,
        }
    }

    fn interval(&self) -> Option<Interval> {
        use RangeOperator::*;

        let (v1, unit) = numeric_value(self.bound.as_ref()?)?;
        let at = |value: f32, inclusive: bool| Some(Bound { value, inclusive });

        let (lower, upper) = match self.operator {
            Plain | Eq => (at(v1, true), at(v1, true)),
            Lt => (None, at(v1, false)),
            Le => (None, at(v1, true)),
            Gt => (at(v1, false), None),
            Ge => (at(v1, true), None),
            two_sided => {
                let (v2, unit2) = numeric_value(self.bound2.as_ref()?)?;
                if unit2 != unit {
                    return None;
                }
                match two_sided {
                    LtLt => (at(v1, false), at(v2, false)),
                    LtLe => (at(v1, false), at(v2, true)),
                    LeLt => (at(v1, true), at(v2, false)),
                    LeLe => (at(v1, true), at(v2, true)),
                    GtGt => (at(v2, false), at(v1, false)),
                    GtGe => (at(v2, true), at(v1, false)),
                    GeGt => (at(v2, false), at(v1, true)),
                    _ => (at(v2, true), at(v1, true)),
                }
            }
        };

        Some(Interval { unit, lower, upper })
    }
}

impl Display for MediaFeature {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = crate::escape::escape_identifier(&self.name);

        match (self.operator.split(), &self.bound, &self.bound2) {
            (Some((first, second)), Some(bound), Some(bound2)) => write!(
                f,
                "({bound} {} {name} {} {bound2})",
                first.as_str(),
                second.as_str()
            ),
            (_, None, _) => write!(f, "({name})"),
            (_, Some(bound), _) if self.operator == RangeOperator::Plain => {
                write!(f, "({name}: {bound})")
            }
            (_, Some(bound), _) => write!(f, "({name} {} {bound})", self.operator.as_str()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Bound {
    value: f32,
    inclusive: bool,
}

/// Numeric range of a feature
#[derive(Clone, Debug, PartialEq)]
struct Interval {
    unit: String,
    lower: Option<Bound>,
    upper: Option<Bound>,
}

impl Interval {
    fn contains(&self, value: f32) -> bool {
        let above = match self.lower {
            Some(b) => value > b.value || (b.inclusive && value == b.value),
            None => true,
        };
        let below = match self.upper {
            Some(b) => value < b.value || (b.inclusive && value == b.value),
            None => true,
        };
        above && below
    }

    fn within(&self, other: &Interval) -> bool {
        let lower = match (self.lower, other.lower) {
            (_, None) => true,
            (None, Some(_)) => false,
            (Some(mine), Some(theirs)) => {
                mine.value > theirs.value
                    || (mine.value == theirs.value && (theirs.inclusive || !mine.inclusive))
            }
        };
        let upper = match (self.upper, other.upper) {
            (_, None) => true,
            (None, Some(_)) => false,
            (Some(mine), Some(theirs)) => {
                mine.value < theirs.value
                    || (mine.value == theirs.value && (theirs.inclusive || !mine.inclusive))
            }
        };
        lower && upper
    }
}

fn plain_number(kind: &UnitKind) -> Option<f32> {
    match kind {
        UnitKind::Integer(i) => Some(*i as f32),
        UnitKind::Real(n) => Some(*n),
        _ => None,
    }
}

/// Returns the number and unit of a single numeric bound. Ratios use `/` as unit.
fn numeric_value(value: &LexicalValue) -> Option<(f32, String)> {
    let units: Vec<UnitId> = value.top_level().collect();

    match units.as_slice() {
        [single] => match value.kind(*single) {
            UnitKind::Dimension { value, unit } => Some((*value, unit.to_ascii_lowercase())),
            kind => plain_number(kind).map(|n| (n, String::new())),
        },
        [numerator, slash, denominator]
            if value.kind(*slash) == &UnitKind::Operator(OperatorKind::Slash) =>
        {
            let numerator = plain_number(value.kind(*numerator))?;
            let denominator = plain_number(value.kind(*denominator))?;
            if denominator == 0.0 {
                return None;
            }
            Some((numerator / denominator, "/".to_string()))
        }
        _ => None,
    }
}

pub type MediaCondition = BooleanCondition<MediaFeature>;

/// True when every environment matching `b` also matches `a`
fn condition_implies(b: &MediaCondition, a: &MediaCondition) -> bool {
    match (b, a) {
        (_, BooleanCondition::And(items)) => items.iter().all(|a| condition_implies(b, a)),
        (BooleanCondition::Or(items), _) => items.iter().all(|b| condition_implies(b, a)),
        (BooleanCondition::And(items), _) => items.iter().any(|b| condition_implies(b, a)),
        (_, BooleanCondition::Or(items)) => items.iter().any(|a| condition_implies(b, a)),
        (BooleanCondition::Predicate(b), BooleanCondition::Predicate(a)) => b.implies(a),
        // not B implies not A when A implies B
        (BooleanCondition::Not(b), BooleanCondition::Not(a)) => condition_implies(a, b),
        _ => false,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MediaQualifier {
    Only,
    Not,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MediaQuery {
    pub qualifier: Option<MediaQualifier>,
    /// Lowercased media type, `all` when the query has only a condition
    pub media_type: String,
    pub condition: Option<MediaCondition>,
    /// False when the query could not be parsed. Invalid queries never match.
    pub valid: bool,
}

impl MediaQuery {
    /// The query that matches every environment
    pub fn all() -> Self {
        Self {
            qualifier: None,
            media_type: "all".to_string(),
            condition: None,
            valid: true,
        }
    }

    /// Placeholder for a query that failed to parse
    pub fn invalid() -> Self {
        Self {
            qualifier: Some(MediaQualifier::Not),
            media_type: "all".to_string(),
            condition: None,
            valid: false,
        }
    }

    /// True when the query can never match
    pub fn is_not_all(&self) -> bool {
        !self.valid
            || (self.qualifier == Some(MediaQualifier::Not)
                && self.media_type == "all"
                && self.condition.is_none())
    }

    fn is_all(&self) -> bool {
        self.valid
            && self.qualifier != Some(MediaQualifier::Not)
            && self.media_type == "all"
            && self.condition.is_none()
    }

    fn is_negated(&self) -> bool {
        self.qualifier == Some(MediaQualifier::Not)
    }

    /// Same query without its `not` qualifier
    fn positive(&self) -> MediaQuery {
        MediaQuery {
            qualifier: None,
            ..self.clone()
        }
    }

    /// True when every environment matched by `other` is matched by this query
    pub fn matches(&self, other: &MediaQuery) -> bool {
        if self.is_not_all() || other.is_not_all() {
            return false;
        }
        if self.is_all() {
            return true;
        }

        match (self.is_negated(), other.is_negated()) {
            (false, false) => {
                let media_type = self.media_type == "all" || self.media_type == other.media_type;
                let condition = match (&self.condition, &other.condition) {
                    (None, _) => true,
                    (Some(_), None) => false,
                    (Some(mine), Some(theirs)) => condition_implies(theirs, mine),
                };
                media_type && condition
            }
            // not A covers not B when B covers A
            (true, true) => other.positive().matches(&self.positive()),
            // `not screen` covers any other media type
            (true, false) => {
                self.condition.is_none()
                    && other.media_type != "all"
                    && other.media_type != self.media_type
            }
            (false, true) => false,
        }
    }
}

impl Display for MediaQuery {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if !self.valid {
            return write!(f, "not all");
        }

        let show_type =
            self.qualifier.is_some() || self.media_type != "all" || self.condition.is_none();

        if show_type {
            match self.qualifier {
                Some(MediaQualifier::Only) => write!(f, "only ")?,
                Some(MediaQualifier::Not) => write!(f, "not ")?,
                None => {}
            }
            write!(f, "{}", self.media_type)?;

            return match &self.condition {
                Some(condition @ BooleanCondition::Or(_)) => write!(f, " and ({condition})"),
                Some(condition) => write!(f, " and {condition}"),
                None => Ok(()),
            };
        }

        match &self.condition {
            Some(condition) => write!(f, "{condition}"),
            None => Ok(()),
        }
    }
}

/// Comma separated list of media queries. An empty list matches everything.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MediaQueryList {
    pub queries: Vec<MediaQuery>,
    /// True when at least one entry failed to parse
    pub has_errors: bool,
}

impl MediaQueryList {
    pub fn new(queries: Vec<MediaQuery>) -> Self {
        Self {
            queries,
            has_errors: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MediaQuery> {
        self.queries.iter()
    }

    /// True when no query of a non-empty list can ever match
    pub fn is_not_all(&self) -> bool {
        !self.queries.is_empty() && self.queries.iter().all(MediaQuery::is_not_all)
    }

    /// True when every environment matched by `other` is matched by this list
    pub fn matches(&self, other: &MediaQueryList) -> bool {
        if self.is_not_all() || other.is_not_all() {
            return false;
        }
        if self.queries.is_empty() {
            return true;
        }

        let all = [MediaQuery::all()];
        let theirs: Vec<&MediaQuery> = if other.queries.is_empty() {
            all.iter().collect()
        } else {
            other.queries.iter().filter(|q| !q.is_not_all()).collect()
        };

        theirs
            .iter()
            .all(|b| self.queries.iter().any(|a| a.matches(b)))
    }
}

impl Display for MediaQueryList {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if !self.queries.is_empty() && self.queries.iter().all(|q| !q.valid) {
            return write!(f, "not all");
        }

        write!(f, "{}", self.queries.iter().join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn px(value: i32) -> LexicalValue {
        let mut bound = LexicalValue::new();
        bound.push_top_level(UnitKind::Dimension {
            value: value as f32,
            unit: "px".into(),
        });
        bound
    }

    fn typed(media_type: &str, condition: Option<MediaCondition>) -> MediaQuery {
        MediaQuery {
            qualifier: None,
            media_type: media_type.into(),
            condition,
            valid: true,
        }
    }

    fn width(operator: RangeOperator, value: i32) -> MediaCondition {
        BooleanCondition::Predicate(MediaFeature::range("width", operator, px(value)))
    }

    #[test]
    fn operators() {
        assert_eq!(RangeOperator::Lt.flip(), RangeOperator::Gt);
        assert_eq!(
            RangeOperator::combine(RangeOperator::Lt, RangeOperator::Le),
            Some(RangeOperator::LtLe)
        );
        assert_eq!(
            RangeOperator::combine(RangeOperator::Gt, RangeOperator::Lt),
            None
        );
        assert_eq!(
            RangeOperator::combine(RangeOperator::Eq, RangeOperator::Lt),
            None
        );
        assert!(RangeOperator::GeGt.is_two_sided());
        assert_eq!(RangeOperator::GeGt.to_string(), ">= >");
    }

    #[test]
    fn display_features() {
        assert_eq!(MediaFeature::boolean("color").to_string(), "(color)");
        assert_eq!(
            MediaFeature::range("width", RangeOperator::Ge, px(600)).to_string(),
            "(width >= 600px)"
        );

        let two_sided = MediaFeature {
            name: "width".into(),
            operator: RangeOperator::LtLe,
            bound: Some(px(400)),
            bound2: Some(px(700)),
        };
        assert_eq!(two_sided.to_string(), "(400px < width <= 700px)");
    }

    #[test]
    fn feature_implication() {
        let wide = MediaFeature::range("width", RangeOperator::Ge, px(800));
        let medium = MediaFeature::range("width", RangeOperator::Ge, px(600));
        assert!(wide.implies(&medium));
        assert!(!medium.implies(&wide));

        let exclusive = MediaFeature::range("width", RangeOperator::Gt, px(600));
        assert!(exclusive.implies(&medium));
        assert!(!medium.implies(&exclusive));

        let window = MediaFeature {
            name: "width".into(),
            operator: RangeOperator::LeLe,
            bound: Some(px(650)),
            bound2: Some(px(700)),
        };
        assert!(window.implies(&medium));
        assert!(window.implies(&MediaFeature::boolean("width")));
        let height = MediaFeature::range("height", RangeOperator::Ge, px(600));
        assert!(!window.implies(&height));
    }

    #[test]
    fn query_matching() {
        let all = MediaQuery::all();
        let screen = typed("screen", None);
        let wide_screen = typed("screen", Some(width(RangeOperator::Ge, 800)));

        assert!(all.matches(&screen));
        assert!(!screen.matches(&all));
        assert!(screen.matches(&wide_screen));
        assert!(!wide_screen.matches(&screen));

        let not_all = MediaQuery {
            qualifier: Some(MediaQualifier::Not),
            ..MediaQuery::all()
        };
        assert!(!not_all.matches(&screen));
        assert!(!all.matches(&not_all));
        assert!(!not_all.matches(&not_all));
    }

    #[test]
    fn condition_matching() {
        let both = BooleanCondition::And(vec![
            width(RangeOperator::Ge, 800),
            BooleanCondition::Predicate(MediaFeature::boolean("color")),
        ]);
        let either = BooleanCondition::Or(vec![
            width(RangeOperator::Ge, 600),
            BooleanCondition::Predicate(MediaFeature::boolean("monochrome")),
        ]);

        assert!(condition_implies(&both, &either));
        assert!(!condition_implies(&either, &both));
    }

    #[test]
    fn list_display() {
        let list = MediaQueryList::new(vec![
            typed("screen", Some(width(RangeOperator::Ge, 600))),
            MediaQuery::invalid(),
        ]);
        assert_eq!(list.to_string(), "screen and (width >= 600px), not all");
        assert!(!list.is_not_all());

        let list = MediaQueryList::new(vec![MediaQuery::invalid(), MediaQuery::invalid()]);
        assert_eq!(list.to_string(), "not all");
        assert!(list.is_not_all());

        assert_eq!(MediaQueryList::default().to_string(), "");
    }

    #[test]
    fn empty_list_is_all() {
        let empty = MediaQueryList::default();
        let print = MediaQueryList::new(vec![typed("print", None)]);

        assert!(empty.matches(&print));
        assert!(!print.matches(&empty));
        assert!(empty.matches(&empty));
    }
}

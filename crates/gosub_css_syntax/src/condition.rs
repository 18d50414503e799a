use crate::selector::SelectorList;
use crate::value::LexicalValue;
use itertools::Itertools;
use std::fmt::{Display, Formatter};

/// Boolean combination of predicates, as used by media queries and `@supports`
#[derive(Clone, Debug, PartialEq)]
pub enum BooleanCondition<P> {
    Predicate(P),
    Not(Box<BooleanCondition<P>>),
    And(Vec<BooleanCondition<P>>),
    Or(Vec<BooleanCondition<P>>),
}

impl<P> BooleanCondition<P> {
    /// Builds an `And` or `Or` from the given operands. A single operand is returned as is.
    pub(crate) fn combine(mut operands: Vec<BooleanCondition<P>>, or: bool) -> BooleanCondition<P> {
        if operands.len() == 1 {
            if let Some(operand) = operands.pop() {
                return operand;
            }
        }

        if or {
            BooleanCondition::Or(operands)
        } else {
            BooleanCondition::And(operands)
        }
    }

    /// Visits all predicates in the condition
    pub fn predicates(&self) -> Vec<&P> {
        match self {
            BooleanCondition::Predicate(p) => vec![p],
            BooleanCondition::Not(c) => c.predicates(),
            BooleanCondition::And(operands) | BooleanCondition::Or(operands) => {
                operands.iter().flat_map(|c| c.predicates()).collect()
            }
        }
    }
}

/// Writes an operand of a boolean operator, adding parentheses around nested operators
struct Operand<'a, P>(&'a BooleanCondition<P>);

impl<P: Display> Display for Operand<'_, P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            BooleanCondition::Predicate(p) => write!(f, "{p}"),
            c => write!(f, "({c})"),
        }
    }
}

impl<P: Display> Display for BooleanCondition<P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BooleanCondition::Predicate(p) => write!(f, "{p}"),
            BooleanCondition::Not(c) => write!(f, "not {}", Operand(c)),
            BooleanCondition::And(operands) => {
                write!(f, "{}", operands.iter().map(Operand).join(" and "))
            }
            BooleanCondition::Or(operands) => {
                write!(f, "{}", operands.iter().map(Operand).join(" or "))
            }
        }
    }
}

/// A single test inside an `@supports` condition
#[derive(Clone, Debug, PartialEq)]
pub enum SupportsPredicate {
    /// `(property: value)`
    Declaration {
        property: String,
        value: LexicalValue,
    },
    /// `selector(...)`
    Selector(SelectorList),
    /// Any other parenthesized block or function, kept as raw text. It evaluates to false.
    Unknown(String),
}

impl Display for SupportsPredicate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SupportsPredicate::Declaration { property, value } => {
                let property = crate::escape::escape_identifier(property);
                write!(f, "({property}: {value})")
            }
            SupportsPredicate::Selector(list) => write!(f, "selector({list})"),
            SupportsPredicate::Unknown(raw) => write!(f, "{raw}"),
        }
    }
}

pub type SupportsCondition = BooleanCondition<SupportsPredicate>;

#[cfg(test)]
mod tests {
    use super::*;

    type Cond = BooleanCondition<&'static str>;

    #[test]
    fn display_nested_operators() {
        let condition: Cond = BooleanCondition::And(vec![
            BooleanCondition::Predicate("(a)"),
            BooleanCondition::Or(vec![
                BooleanCondition::Predicate("(b)"),
                BooleanCondition::Not(Box::new(BooleanCondition::Predicate("(c)"))),
            ]),
        ]);

        assert_eq!(condition.to_string(), "(a) and ((b) or (not (c)))");
    }

    #[test]
    fn combine_single_operand() {
        let operands = vec![BooleanCondition::Predicate("(a)")];
        let condition: Cond = BooleanCondition::combine(operands, true);
        assert_eq!(condition, BooleanCondition::Predicate("(a)"));

        let condition: Cond = BooleanCondition::combine(
            vec![
                BooleanCondition::Predicate("(a)"),
                BooleanCondition::Predicate("(b)"),
            ],
            true,
        );
        assert_eq!(condition.to_string(), "(a) or (b)");
        assert_eq!(condition.predicates(), vec![&"(a)", &"(b)"]);
    }
}

use crate::tokenizer::TokenType;
use crate::value::{
    calc_like_function, ColorFunctionKind, LexicalValue, OperatorKind, UnitId, UnitKind,
};
use crate::CssParser;
use gosub_css_shared::char_stream::Location;
use gosub_css_shared::errors::{CssError, CssErrorKind, CssResult};

/// What a color function accepts at a given argument position
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Channel {
    Number,
    Percentage,
    NumberOrPercentage,
    /// A number or an angle
    Hue,
    /// The predefined color space of `color()`
    ColorSpace,
}

const ANGLE_UNITS: [&str; 4] = ["deg", "grad", "rad", "turn"];

impl Channel {
    fn accepts(self, kind: &UnitKind, legacy: bool) -> bool {
        if is_typed_placeholder(kind) {
            return self != Channel::ColorSpace;
        }

        if let UnitKind::Ident(ident) = kind {
            if ident.eq_ignore_ascii_case("none") {
                return !legacy && self != Channel::ColorSpace;
            }
        }

        match self {
            Channel::Number => matches!(kind, UnitKind::Integer(_) | UnitKind::Real(_)),
            Channel::Percentage => matches!(kind, UnitKind::Percentage(_)),
            Channel::NumberOrPercentage => matches!(
                kind,
                UnitKind::Integer(_) | UnitKind::Real(_) | UnitKind::Percentage(_)
            ),
            Channel::Hue => match kind {
                UnitKind::Integer(_) | UnitKind::Real(_) => true,
                UnitKind::Dimension { unit, .. } => ANGLE_UNITS
                    .iter()
                    .any(|angle| angle.eq_ignore_ascii_case(unit)),
                _ => false,
            },
            Channel::ColorSpace => matches!(kind, UnitKind::Ident(_)),
        }
    }

    fn description(self) -> &'static str {
        match self {
            Channel::Number => "a number",
            Channel::Percentage => "a percentage",
            Channel::NumberOrPercentage => "a number or percentage",
            Channel::Hue => "a hue",
            Channel::ColorSpace => "a color space",
        }
    }
}

fn channels(kind: ColorFunctionKind, legacy: bool) -> &'static [Channel] {
    use Channel::*;

    match kind {
        ColorFunctionKind::Rgb => &[NumberOrPercentage, NumberOrPercentage, NumberOrPercentage],
        // legacy hsl() only takes percentages for saturation and lightness
        ColorFunctionKind::Hsl if legacy => &[Hue, Percentage, Percentage],
        ColorFunctionKind::Hsl | ColorFunctionKind::Hwb => {
            &[Hue, NumberOrPercentage, NumberOrPercentage]
        }
        ColorFunctionKind::Lab => &[Percentage, Number, Number],
        ColorFunctionKind::Lch => &[Percentage, Number, Hue],
        ColorFunctionKind::Oklab => &[NumberOrPercentage, Number, Number],
        ColorFunctionKind::Oklch => &[NumberOrPercentage, NumberOrPercentage, Hue],
        ColorFunctionKind::Color => &[
            ColorSpace,
            NumberOrPercentage,
            NumberOrPercentage,
            NumberOrPercentage,
        ],
    }
}

/// Units that compute to a single number of the right type
fn is_typed_placeholder(kind: &UnitKind) -> bool {
    match kind {
        UnitKind::Calc => true,
        UnitKind::Function(name) => calc_like_function(name),
        _ => false,
    }
}

/// `var()` and `attr()` can expand to any number of arguments
fn is_expanding_placeholder(kind: &UnitKind) -> bool {
    matches!(kind, UnitKind::Var | UnitKind::Attr)
}

impl CssParser<'_> {
    /// Parses the arguments of `rgb()`, `hsl()`, `lab()` and the other color functions. The
    /// first separator decides between the legacy comma notation and the modern one.
    pub(crate) fn parse_color_function(
        &mut self,
        value: &mut LexicalValue,
        kind: ColorFunctionKind,
    ) -> CssResult<UnitId> {
        log::trace!("parse_color_function");

        let name = kind.name();
        let mut units = Vec::new();
        let mut components: Vec<(UnitId, Location)> = Vec::new();
        let mut alpha: Option<(UnitId, Location)> = None;
        let mut slash: Option<Location> = None;
        let mut legacy: Option<bool> = None;
        let mut pending_comma = false;

        let closing = loop {
            self.consume_whitespace_comments();
            let t = self.tokenizer.consume();

            match &t.token_type {
                TokenType::RParen => break t.location,
                TokenType::Eof => return Err(self.unexpected(&t, "Expected ')'")),
                TokenType::Comma => {
                    if !kind.allows_legacy_syntax() {
                        return Err(CssError::with_location(
                            &format!("{name}() does not accept commas"),
                            t.location,
                        ));
                    }
                    if components.is_empty()
                        || pending_comma
                        || slash.is_some()
                        || legacy == Some(false)
                    {
                        return Err(self.unexpected(&t, &format!("Unexpected ',' in {name}()")));
                    }
                    legacy = Some(true);
                    pending_comma = true;
                    units.push(value.push_unit(UnitKind::Operator(OperatorKind::Comma)));
                }
                TokenType::Delim('/') => {
                    if components.is_empty() || slash.is_some() || legacy == Some(true) {
                        return Err(self.unexpected(&t, &format!("Unexpected '/' in {name}()")));
                    }
                    legacy = Some(false);
                    slash = Some(t.location);
                    units.push(value.push_unit(UnitKind::Operator(OperatorKind::Slash)));
                }
                _ => {
                    if alpha.is_some() {
                        return Err(self.unexpected(&t, "Unexpected value after alpha"));
                    }
                    if legacy == Some(true) && !pending_comma {
                        return Err(self.unexpected(&t, "Expected ','"));
                    }
                    if legacy.is_none() && !components.is_empty() {
                        legacy = Some(false);
                    }

                    let unit = self.parse_term(value, &t)?;
                    units.push(unit);
                    pending_comma = false;

                    if slash.is_some() {
                        alpha = Some((unit, t.location));
                    } else {
                        components.push((unit, t.location));
                    }
                }
            }
        };

        if pending_comma {
            return Err(CssError::with_location("Expected value after ','", closing));
        }
        if let Some(slash) = slash {
            if alpha.is_none() {
                return Err(CssError::with_location(
                    "Expected alpha value after '/'",
                    slash,
                ));
            }
        }

        let legacy = legacy == Some(true);
        let expected = channels(kind, legacy);

        // the legacy notation passes alpha as fourth comma separated argument
        if legacy && components.len() == expected.len() + 1 {
            alpha = components.pop();
        }

        let expanding = components
            .iter()
            .chain(alpha.iter())
            .any(|(unit, _)| is_expanding_placeholder(value.kind(*unit)));

        if !expanding {
            check_arguments(value, kind, &components, alpha, legacy, closing)?;
        }

        let color = value.push_unit(UnitKind::ColorFunction(kind));
        value.set_parameters(color, &units);

        Ok(color)
    }
}

fn check_arguments(
    value: &LexicalValue,
    kind: ColorFunctionKind,
    components: &[(UnitId, Location)],
    alpha: Option<(UnitId, Location)>,
    legacy: bool,
    closing: Location,
) -> CssResult<()> {
    let name = kind.name();
    let expected = channels(kind, legacy);

    if let Some((_, location)) = components.get(expected.len()) {
        return Err(CssError::with_kind(
            CssErrorKind::UnsupportedConstruct,
            &format!("Too many arguments for {name}()"),
            *location,
        ));
    }
    if components.len() < expected.len() {
        return Err(CssError::with_kind(
            CssErrorKind::UnsupportedConstruct,
            &format!("{name}() needs {} arguments", expected.len()),
            closing,
        ));
    }

    for ((unit, location), channel) in components.iter().zip(expected) {
        if !channel.accepts(value.kind(*unit), legacy) {
            return Err(CssError::with_location(
                &format!("Expected {} in {name}()", channel.description()),
                *location,
            ));
        }
    }

    if let Some((unit, location)) = alpha {
        if !Channel::NumberOrPercentage.accepts(value.kind(unit), legacy) {
            return Err(CssError::with_location(
                &format!("Expected alpha value in {name}()"),
                location,
            ));
        }
    }

    // legacy rgb() does not mix numbers and percentages
    if legacy && kind == ColorFunctionKind::Rgb {
        let is_percentage = |unit: &UnitId| matches!(value.kind(*unit), UnitKind::Percentage(_));
        let mut plain = components
            .iter()
            .filter(|(unit, _)| !is_typed_placeholder(value.kind(*unit)));
        if let Some((first, _)) = plain.next() {
            let percentages = is_percentage(first);
            let mixed = plain.find(|(unit, _)| is_percentage(unit) != percentages);
            if let Some((_, location)) = mixed {
                return Err(CssError::with_location(
                    "Cannot mix numbers and percentages in rgb()",
                    *location,
                ));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::config::ParserConfig;
    use crate::value::{ColorFunctionKind, UnitKind};
    use crate::CssParser;
    use gosub_css_shared::errors::CssErrorKind;
    use test_case::test_case;

    fn parse(data: &str) -> String {
        CssParser::parse_value_str(data, &ParserConfig::default())
            .unwrap()
            .to_string()
    }

    #[test_case("rgb(255, 0, 0)", "rgb(255,0,0)")]
    #[test_case("rgba(255, 0, 0, 0.5)", "rgb(255,0,0,0.5)")]
    #[test_case("rgba(0 0 0 / 50%)", "rgb(0 0 0/50%)")]
    #[test_case("RGB(10% 20% 30%)", "rgb(10% 20% 30%)")]
    #[test_case("hsl(120deg 100% 50%)", "hsl(120deg 100% 50%)")]
    #[test_case("hsla(120, 100%, 50%, .3)", "hsl(120,100%,50%,0.3)")]
    #[test_case("hsl(120 50 50)", "hsl(120 50 50)")]
    #[test_case("hwb(12 50% 0%)", "hwb(12 50% 0%)")]
    #[test_case("lab(53.2% 42.4 57.76)", "lab(53.2% 42.4 57.76)")]
    #[test_case("lab(none 20 -30 / 0.4)", "lab(none 20 -30/0.4)")]
    #[test_case("oklab(0.6 0.1 -0.1)", "oklab(0.6 0.1 -0.1)")]
    #[test_case("oklch(70% 0.1 none)", "oklch(70% 0.1 none)")]
    #[test_case("lch(52% 40 30deg)", "lch(52% 40 30deg)")]
    #[test_case("color(display-p3 1 0.5 0)", "color(display-p3 1 0.5 0)")]
    #[test_case("rgb(calc(255 / 2) 0 0)", "rgb(calc(255/2) 0 0)")]
    #[test_case("rgb(var(--channels))", "rgb(var(--channels))")]
    #[test_case("lab(var(--l) var(--a) 5)", "lab(var(--l) var(--a) 5)")]
    fn serializes(input: &str, expected: &str) {
        assert_eq!(parse(input), expected);
    }

    #[test]
    fn lab_arguments() {
        let config = ParserConfig::default();
        let value = CssParser::parse_value_str("lab(53.2% 42.4 57.76)", &config).unwrap();
        let lab = value.head().unwrap();
        assert_eq!(
            value.kind(lab),
            &UnitKind::ColorFunction(ColorFunctionKind::Lab)
        );

        let params: Vec<_> = value.parameters(lab).collect();
        assert_eq!(params.len(), 3);
        assert_eq!(value.kind(params[0]), &UnitKind::Percentage(53.2));
        assert_eq!(value.kind(params[1]), &UnitKind::Real(42.4));
        assert_eq!(value.kind(params[2]), &UnitKind::Real(57.76));
    }

    #[test_case("lab(12 48 0.1)", 5 ; "lab lightness must be a percentage")]
    #[test_case("lab(50% red 0.1)", 9 ; "non numeric second argument")]
    #[test_case("lab(50% 1 red)", 11 ; "non numeric third argument")]
    #[test_case("rgb(1 2 3 /)", 11 ; "slash without alpha")]
    #[test_case("rgb(1 2 3 / 0.5 0.2)", 17 ; "value after alpha")]
    #[test_case("rgb(1 2, 3)", 8 ; "comma in modern notation")]
    #[test_case("rgb(1, 2 3)", 10 ; "missing comma")]
    #[test_case("lab(50%, 1, 2)", 8 ; "comma in lab")]
    #[test_case("rgb(1, 2%, 3)", 8 ; "mixed legacy rgb")]
    #[test_case("rgb(1, 2, none)", 11 ; "none in legacy notation")]
    #[test_case("hsl(red 1% 2%)", 5 ; "invalid hue")]
    #[test_case("color(1 2 3 4)", 7 ; "missing color space")]
    #[test_case("lch(50 30 120)", 5 ; "lch lightness must be a percentage")]
    #[test_case("lch(50% 30% 120)", 9 ; "lch chroma must be a number")]
    #[test_case("hsl(120, 50, 50%)", 10 ; "legacy hsl saturation must be a percentage")]
    #[test_case("hsla(120, 50%, 50, 1)", 16 ; "legacy hsl lightness must be a percentage")]
    fn rejects(input: &str, column: usize) {
        let err = CssParser::parse_value_str(input, &ParserConfig::default()).unwrap_err();
        assert_eq!(err.column(), column);
    }

    #[test]
    fn argument_count() {
        let config = ParserConfig::default();

        let err = CssParser::parse_value_str("rgb(1 2)", &config).unwrap_err();
        assert_eq!(err.kind, CssErrorKind::UnsupportedConstruct);
        assert_eq!(err.column(), 8);

        let err = CssParser::parse_value_str("rgb(1 2 3 4)", &config).unwrap_err();
        assert_eq!(err.kind, CssErrorKind::UnsupportedConstruct);
        assert_eq!(err.column(), 11);

        let err = CssParser::parse_value_str("rgb(1, 2, 3, 4, 5)", &config).unwrap_err();
        assert_eq!(err.kind, CssErrorKind::UnsupportedConstruct);
    }
}

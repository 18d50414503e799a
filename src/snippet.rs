//! Source snippets that point at the location of an error

use gosub_css_shared::errors::CssError;

/// Number of lines shown before and after the line with the error
const CONTEXT_LINES: usize = 2;

/// Renders the lines around the error with a caret under the error column. Errors without a
/// location, or with a location outside the source, render as the message only.
pub fn display_snippet(source: &str, err: &CssError) -> String {
    let Some(location) = err.location else {
        return err.message.clone();
    };

    let lines: Vec<&str> = source.split('\n').collect();
    let line_nr = location.line.saturating_sub(1);
    if line_nr >= lines.len() {
        return err.message.clone();
    }

    let mut out = Vec::new();

    for (nr, line) in lines
        .iter()
        .enumerate()
        .skip(line_nr.saturating_sub(CONTEXT_LINES))
        .take_while(|(nr, _)| *nr <= line_nr + CONTEXT_LINES)
    {
        out.push(format!("{:<5}|{}", nr + 1, line));
        if nr == line_nr {
            out.push(format!(
                "     |{}^ {}",
                " ".repeat(location.column.saturating_sub(1)),
                err.message
            ));
        }
    }

    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use gosub_css_shared::char_stream::Location;

    #[test]
    fn caret_points_at_column() {
        let err = CssError::with_location("Invalid hex color", Location::new(1, 8, 7));
        assert_eq!(
            display_snippet("color: #x", &err),
            "1    |color: #x\n     |       ^ Invalid hex color"
        );
    }

    #[test]
    fn context_lines() {
        let source = "a\nb\nc\nd\ne\nf";
        let err = CssError::with_location("bad", Location::new(4, 1, 6));
        let snippet = display_snippet(source, &err);

        let numbers: Vec<&str> = snippet
            .lines()
            .filter_map(|l| l.split('|').next())
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .collect();
        assert_eq!(numbers, vec!["2", "3", "4", "5", "6"]);
    }

    #[test]
    fn without_location() {
        assert_eq!(display_snippet("a", &CssError::new("oops")), "oops");
        let err = CssError::with_location("far", Location::new(9, 1, 0));
        assert_eq!(display_snippet("a", &err), "far");
    }
}

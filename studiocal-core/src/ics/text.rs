//! RFC 5545 text handling: TEXT escaping, parameter quoting and line folding.
//!
//! Unfolding on input is done by `icalendar::parser::unfold`.

/// Content lines are limited to 75 octets, excluding the line break.
const MAX_LINE_OCTETS: usize = 75;

/// Escape a TEXT property value (`\`, `;`, `,` and line breaks).
pub fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push_str("\\n");
            }
            '\n' => out.push_str("\\n"),
            _ => out.push(ch),
        }
    }

    out
}

/// Reverse [`escape_text`]. Unknown escapes are kept verbatim.
pub fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(c @ ('\\' | ';' | ',')) => out.push(c),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }

    out
}

/// Prepare a parameter value such as `CN`.
///
/// DQUOTE and control characters are not allowed inside parameter values;
/// values containing `:`, `;` or `,` must be quoted.
pub fn quote_param_value(value: &str) -> String {
    let cleaned: String = value
        .chars()
        .filter(|c| *c != '"')
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();

    if cleaned.contains(|c: char| matches!(c, ':' | ';' | ',')) {
        format!("\"{cleaned}\"")
    } else {
        cleaned
    }
}

/// Fold a content line so no physical line exceeds 75 octets.
///
/// Continuation lines start with a single space. Multi-byte characters are
/// never split across lines.
pub fn fold_line(line: &str) -> String {
    if line.len() <= MAX_LINE_OCTETS {
        return line.to_string();
    }

    let mut out = String::with_capacity(line.len() + (line.len() / MAX_LINE_OCTETS) * 3);
    let mut used = 0;

    for ch in line.chars() {
        if used + ch.len_utf8() > MAX_LINE_OCTETS {
            out.push_str("\r\n ");
            used = 1;
        }
        out.push(ch);
        used += ch.len_utf8();
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_text() {
        assert_eq!(
            escape_text("Studio A; 2nd floor, left\nRing twice \\o/"),
            "Studio A\\; 2nd floor\\, left\\nRing twice \\\\o/"
        );
        assert_eq!(escape_text("one\r\ntwo"), "one\\ntwo");
    }

    #[test]
    fn test_unescape_reverses_escape() {
        let original = "Bring: props, lights; backdrop\\stand\nand snacks";
        assert_eq!(unescape_text(&escape_text(original)), original);
        assert_eq!(unescape_text("Line one\\NLine two"), "Line one\nLine two");
    }

    #[test]
    fn test_unescape_keeps_unknown_escapes() {
        assert_eq!(unescape_text("C:\\temp"), "C:\\temp");
        assert_eq!(unescape_text("trailing\\"), "trailing\\");
    }

    #[test]
    fn test_quote_param_value() {
        assert_eq!(quote_param_value("Maija Virtanen"), "Maija Virtanen");
        assert_eq!(quote_param_value("Virtanen, Maija"), "\"Virtanen, Maija\"");
        assert_eq!(quote_param_value("The \"Studio\""), "The Studio");
    }

    #[test]
    fn test_fold_line_limits_octets() {
        let line = format!("SUMMARY:{}", "x".repeat(200));
        let folded = fold_line(&line);

        for physical in folded.split("\r\n") {
            assert!(physical.len() <= 75, "line too long: {}", physical.len());
        }
        assert!(folded.split("\r\n").skip(1).all(|l| l.starts_with(' ')));
        assert_eq!(icalendar::parser::unfold(&folded), line);
    }

    #[test]
    fn test_fold_line_keeps_multibyte_chars_whole() {
        let line = format!("LOCATION:{}", "ä".repeat(60));
        let folded = fold_line(&line);

        for physical in folded.split("\r\n") {
            assert!(physical.len() <= 75);
        }
        assert_eq!(icalendar::parser::unfold(&folded), line);
    }

    #[test]
    fn test_short_line_is_not_folded() {
        assert_eq!(fold_line("SUMMARY:Short"), "SUMMARY:Short");
    }
}

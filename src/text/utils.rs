/// Undo the escaping of the text format. HELP docstrings escape `\\` and `\n`,
/// label values additionally escape `\"`. Returns `None` on any other escape.
pub fn unescape_str(s: &str, allow_quote: bool) -> Option<String> {
    if !s.contains('\\') {
        return Some(s.to_owned());
    }

    let mut build = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            build.push(c);
            continue;
        }

        match chars.next()? {
            '\\' => build.push('\\'),
            'n' => build.push('\n'),
            '"' if allow_quote => build.push('"'),
            _ => return None,
        }
    }

    Some(build)
}

/// Renders a sample value the way the exposition format spells it: the shortest
/// decimal that parses back to the same `f64`, with `NaN`, `+Inf` and `-Inf` for
/// the non-finite values. Magnitudes from `1e21` up and below `1e-4` use exponent
/// form.
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        String::from("NaN")
    } else if value == f64::INFINITY {
        String::from("+Inf")
    } else if value == f64::NEG_INFINITY {
        String::from("-Inf")
    } else if value != 0. && (value.abs() >= 1e21 || value.abs() < 1e-4) {
        format!("{:e}", value)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unescape_label_value() {
        assert_eq!(unescape_str(r#"a\"b\\c\nd"#, true).unwrap(), "a\"b\\c\nd");
        assert_eq!(unescape_str("plain", true).unwrap(), "plain");
    }

    #[test]
    fn test_unescape_help_rejects_quote_escape() {
        assert_eq!(unescape_str(r#"say \"hi\""#, false), None);
        assert_eq!(unescape_str(r#"two\nlines"#, false).unwrap(), "two\nlines");
    }

    #[test]
    fn test_unescape_rejects_unknown_sequences() {
        assert_eq!(unescape_str(r#"C:\x"#, true), None);
        assert_eq!(unescape_str(r#"tab\t"#, false), None);
        assert_eq!(unescape_str("trailing\\", false), None);
    }

    #[test]
    fn test_format_float() {
        assert_eq!(format_float(5.0), "5");
        assert_eq!(format_float(0.5), "0.5");
        assert_eq!(format_float(-1.25), "-1.25");
        assert_eq!(format_float(f64::INFINITY), "+Inf");
        assert_eq!(format_float(f64::NEG_INFINITY), "-Inf");
        assert_eq!(format_float(f64::NAN), "NaN");
        assert_eq!(format_float(0.0), "0");
        assert_eq!(format_float(0.0001), "0.0001");
        assert_eq!(format_float(1698739260.), "1698739260");
    }

    #[test]
    fn test_format_float_extreme_magnitudes_use_exponent() {
        assert_eq!(format_float(5e-324), "5e-324");
        assert_eq!(format_float(2.3609e-05), "2.3609e-5");
        assert_eq!(format_float(1e21), "1e21");
        assert_eq!(format_float(-1.7976931348623157e308), "-1.7976931348623157e308");
        assert_eq!(format_float(123456789012345680000.), "123456789012345680000");
    }

    #[test]
    fn test_format_float_round_trips() {
        for value in &[0.1, 1.0 / 3.0, 1e-9, 123456789.125, 1.7976931348623157e308, 5e-324] {
            let rendered = format_float(*value);
            let parsed: f64 = rendered.parse().unwrap();
            assert!((parsed - value).abs() <= f64::EPSILON * value.abs(), "{} -> {}", value, rendered);
        }

        let parsed: f64 = format_float(f64::INFINITY).parse().unwrap();
        assert_eq!(parsed, f64::INFINITY);
    }
}

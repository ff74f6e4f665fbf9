/// Convert a localized price string (e.g. `"$1.181.499,15"`) to a float.
/// `$`, spaces and `.` thousands separators are stripped, the decimal `,`
/// becomes a `.`. Anything unparseable is 0.0 so one malformed price never
/// aborts a page.
pub fn parse_price(raw: &str) -> f64 {
    let normalized: String = raw
        .chars()
        .filter(|c| !matches!(c, '$' | ' ' | '.'))
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    normalized.parse().unwrap_or(0.0)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn millions_with_thousands_separators() {
        assert_eq!(parse_price("$1.181.499,15"), 1181499.15);
    }

    #[test]
    fn zero() {
        assert_eq!(parse_price("$0,00"), 0.0);
    }

    #[test]
    fn plain_two_digit_price() {
        assert_eq!(parse_price("$10,00"), 10.0);
    }

    #[test]
    fn garbage_is_zero() {
        assert_eq!(parse_price("garbage"), 0.0);
    }

    #[test]
    fn empty_is_zero() {
        assert_eq!(parse_price(""), 0.0);
    }

    #[test]
    fn spaces_are_ignored() {
        assert_eq!(parse_price("$ 500,50"), 500.5);
    }
}

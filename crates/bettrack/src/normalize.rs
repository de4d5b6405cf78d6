//! Currency-text normalization and net-profit inference.
//!
//! The history table renders amounts through a display layer that leaves
//! non-breaking spaces, unicode minus signs, coin icons and thousands
//! separators in the text. Both functions here are total: malformed input
//! degrades to a defined default instead of raising an error.

/// Extract a finite numeric value from display text.
///
/// Non-breaking spaces become ASCII spaces, the unicode minus sign becomes a
/// hyphen, everything that is not a digit, dot or hyphen is stripped, and the
/// remainder is parsed. Unparseable or non-finite input yields exactly `0.0`.
pub fn parse_amount(text: &str) -> f64 {
    let cleaned: String = text
        .replace('\u{00a0}', " ")
        .replace('\u{2212}', "-")
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();

    leading_number(&cleaned).filter(|n| n.is_finite()).unwrap_or(0.0)
}

/// Longest leading `[-]digits[.digits]` run, parsed. Mirrors how the
/// browser's `parseFloat` salvages a number from the front of noisy text
/// ("12-5" → 12, "1.2.3" → 1.2).
fn leading_number(s: &str) -> Option<f64> {
    let bytes = s.as_bytes();
    let mut len = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;

    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'-' if i == 0 => len = 1,
            b'0'..=b'9' => {
                seen_digit = true;
                len = i + 1;
            }
            b'.' if !seen_dot => {
                seen_dot = true;
                len = i + 1;
            }
            _ => break,
        }
    }

    if !seen_digit {
        return None;
    }
    s[..len].parse::<f64>().ok()
}

/// Recover the net profit for a row.
///
/// The site sometimes renders a pre-computed net figure and sometimes a raw
/// zero placeholder. A nonzero value is trusted outright; a zero is resolved
/// from the outcome: a lost slip nets the negative of its stake, anything
/// else nets zero. A genuine $0 win is indistinguishable from the
/// placeholder and comes out as 0; known source limitation, kept as-is.
pub fn infer_profit(raw_profit: f64, bet: f64, status: &str) -> f64 {
    if raw_profit.abs() > 1e-9 {
        raw_profit
    } else if status == "lost" {
        -bet
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount_strips_noise() {
        assert_eq!(parse_amount("$ 1,234.56"), 1234.56);
        assert_eq!(parse_amount("25.00 coins"), 25.0);
        assert_eq!(parse_amount("  42  "), 42.0);
    }

    #[test]
    fn test_parse_amount_unicode_minus_and_nbsp() {
        // U+2212 minus and U+00A0 non-breaking space, as the display layer emits them
        assert_eq!(parse_amount("\u{2212}12.50"), -12.5);
        assert_eq!(parse_amount("1\u{00a0}250.75"), 1250.75);
    }

    #[test]
    fn test_parse_amount_garbage_is_zero() {
        assert_eq!(parse_amount(""), 0.0);
        assert_eq!(parse_amount("pending"), 0.0);
        assert_eq!(parse_amount("--"), 0.0);
        assert_eq!(parse_amount("."), 0.0);
    }

    #[test]
    fn test_parse_amount_takes_leading_number() {
        assert_eq!(parse_amount("12-5"), 12.0);
        assert_eq!(parse_amount("1.2.3"), 1.2);
        assert_eq!(parse_amount("-.5"), -0.5);
    }

    #[test]
    fn test_infer_profit_zero_lost_nets_negative_stake() {
        assert_eq!(infer_profit(0.0, 25.0, "lost"), -25.0);
    }

    #[test]
    fn test_infer_profit_zero_other_statuses_net_zero() {
        assert_eq!(infer_profit(0.0, 25.0, "cancelled"), 0.0);
        assert_eq!(infer_profit(0.0, 25.0, "open"), 0.0);
        // A true $0 win is indistinguishable from the placeholder
        assert_eq!(infer_profit(0.0, 25.0, "won"), 0.0);
    }

    #[test]
    fn test_infer_profit_nonzero_trusted_regardless_of_status() {
        assert_eq!(infer_profit(45.5, 25.0, "won"), 45.5);
        assert_eq!(infer_profit(-10.0, 25.0, "lost"), -10.0);
        assert_eq!(infer_profit(3.0, 25.0, "cancelled"), 3.0);
    }
}

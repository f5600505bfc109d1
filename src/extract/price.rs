//! Price text normalization
//!
//! Listing pages format prices in many ways: `£51.77`, `1,299.00`,
//! `1 299,00 ₽`, `51,77 €`. [`parse_price`] reduces all of them to an `f64`.

/// Parses the first number in a price label
///
/// When both `.` and `,` occur, the one appearing last is the decimal
/// separator. A single kind of separator is grouping when it repeats, or when
/// it looks like one thousands group (`1,299`, not `0.500`); otherwise it
/// is the decimal point. Returns `None` when the text holds no digits.
pub fn parse_price(text: &str) -> Option<f64> {
    let token = first_number_token(text)?;
    normalize_separators(&token)
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Spaces used as thousands separators
fn is_group_space(c: char) -> bool {
    matches!(c, ' ' | '\u{a0}' | '\u{2009}' | '\u{202f}')
}

fn first_number_token(text: &str) -> Option<String> {
    let chars: Vec<char> = text.chars().collect();
    let start = chars.iter().position(|c| c.is_ascii_digit())?;

    let rest = &chars[start..];
    let mut token = String::new();
    for (i, &c) in rest.iter().enumerate() {
        let next_is_digit = rest.get(i + 1).is_some_and(|n| n.is_ascii_digit());

        if c.is_ascii_digit() {
            token.push(c);
        } else if (c == '.' || c == ',') && next_is_digit {
            token.push(c);
        } else if is_group_space(c) && next_is_digit {
            continue;
        } else {
            break;
        }
    }

    Some(token)
}

/// Rewrites a digits-and-separators token into `f64::from_str` syntax
fn normalize_separators(token: &str) -> String {
    let digits_only = |s: &str| s.chars().filter(char::is_ascii_digit).collect::<String>();

    let decimal_pos = match (token.rfind('.'), token.rfind(',')) {
        (None, None) => None,
        (Some(dot), Some(comma)) => Some(dot.max(comma)),
        (Some(pos), None) | (None, Some(pos)) => {
            let separator = &token[pos..=pos];
            let repeats = token.matches(separator).count() > 1;
            if repeats || is_single_group(&token[..pos], &token[pos + 1..]) {
                None
            } else {
                Some(pos)
            }
        }
    };

    match decimal_pos {
        Some(pos) => format!("{}.{}", digits_only(&token[..pos]), &token[pos + 1..]),
        None => digits_only(token),
    }
}

/// `1,299` or `12.500`: one to three leading digits not starting with `0`,
/// then exactly three digits
///
/// `0.500` and `1234.567` fail this test and keep their decimal point.
fn is_single_group(head: &str, tail: &str) -> bool {
    (1..=3).contains(&head.len()) && !head.starts_with('0') && tail.len() == 3
}

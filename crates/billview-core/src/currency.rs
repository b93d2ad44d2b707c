//! Currency-symbol stripping for numeric and currency fields.

/// Single-character currency symbols removed from the front of a value.
pub const CURRENCY_SYMBOLS: &[char] = &[
    '$', '€', '¥', '£', '₹', '₽', '₺', '₩', '₫', '₪', '₦', '₱', '฿', '₲', '₡', '₭', '₮', '₸', '₼',
];

/// Written currency markers. Only stripped when a number follows, so text
/// such as `"Rs. Total"` or `"kr"` alone stays intact.
pub const WRITTEN_SYMBOLS: &[&str] = &[
    "R$", "US$", "A$", "C$", "Rs.", "Rs", "Br", "лв", "zł", "kr", "د.إ",
];

fn strip_leading_symbol(text: &str) -> Option<&str> {
    let first = text.chars().next()?;
    if CURRENCY_SYMBOLS.contains(&first) {
        return Some(&text[first.len_utf8()..]);
    }
    WRITTEN_SYMBOLS.iter().find_map(|sym| {
        let rest = text.strip_prefix(*sym)?;
        let next = rest.trim_start().chars().next()?;
        (next.is_ascii_digit() || next == '-').then_some(rest)
    })
}

/// Strip leading currency symbols and thousands separators from `text`.
///
/// Leading whitespace is trimmed before the symbol test, so `" £5 "` yields
/// `"5"`. Text that does not start with a recognised symbol is only
/// trimmed; commas inside it are kept.
pub fn strip_currency(text: &str) -> String {
    let trimmed = text.trim();
    let mut rest = trimmed;
    let mut stripped = false;
    while let Some(next) = strip_leading_symbol(rest) {
        rest = next;
        stripped = true;
    }
    if stripped {
        rest.replace(',', "").trim().to_string()
    } else {
        trimmed.to_string()
    }
}

/// Currencies whose unit amount is already in major units.
const ZERO_DECIMAL: &[&str] = &[
    "bif", "clp", "djf", "gnf", "jpy", "kmf", "krw", "mga", "pyg", "rwf", "ugx", "vnd", "vuv",
    "xaf", "xof", "xpf",
];

fn symbol(currency: &str) -> Option<&'static str> {
    Some(match currency {
        "usd" => "$",
        "eur" => "€",
        "gbp" => "£",
        "jpy" => "¥",
        "inr" => "₹",
        "krw" => "₩",
        "cad" => "CA$",
        "aud" => "A$",
        "nzd" => "NZ$",
        "hkd" => "HK$",
        "mxn" => "MX$",
        "brl" => "R$",
        "cny" => "CN¥",
        _ => return None,
    })
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Formats a unit amount the way `en-US` currency formatting does with no
/// minimum fraction digits: `$10`, `$10.5`, `$1,234.99`, `CHF 12`.
pub fn format_price(currency: &str, unit_amount: Option<i64>) -> String {
    let currency = currency.to_lowercase();
    let amount = unit_amount.unwrap_or(0);
    let minor = amount.unsigned_abs();

    let number = if ZERO_DECIMAL.contains(&currency.as_str()) {
        group_thousands(minor)
    } else {
        let (whole, cents) = (minor / 100, minor % 100);
        match cents {
            0 => group_thousands(whole),
            c if c % 10 == 0 => format!("{}.{}", group_thousands(whole), c / 10),
            c => format!("{}.{:02}", group_thousands(whole), c),
        }
    };

    let sign = if amount < 0 { "-" } else { "" };
    match symbol(&currency) {
        Some(symbol) => format!("{}{}{}", sign, symbol, number),
        None => format!("{}{}\u{a0}{}", sign, currency.to_uppercase(), number),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_trailing_zero_fraction() {
        assert_eq!(format_price("usd", Some(1000)), "$10");
        assert_eq!(format_price("usd", Some(1050)), "$10.5");
        assert_eq!(format_price("usd", Some(1099)), "$10.99");
        assert_eq!(format_price("usd", Some(5)), "$0.05");
        assert_eq!(format_price("usd", None), "$0");
    }

    #[test]
    fn groups_thousands() {
        assert_eq!(format_price("usd", Some(123_456_700)), "$1,234,567");
        assert_eq!(format_price("EUR", Some(100_050)), "€1,000.5");
    }

    #[test]
    fn zero_decimal_currencies_are_not_divided() {
        assert_eq!(format_price("jpy", Some(1500)), "¥1,500");
    }

    #[test]
    fn unknown_currency_uses_its_code() {
        assert_eq!(format_price("chf", Some(1200)), "CHF\u{a0}12");
        assert_eq!(format_price("usd", Some(-250)), "-$2.5");
    }
}

use rust_decimal::Decimal;

/// Format a decimal with thousands separators and two places: 1,234.56
pub fn amount(val: Decimal) -> String {
    let rounded = val.round_dp(2);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let cents = format!("{:.2}", rounded.abs());
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    if negative {
        format!("-{with_commas}.{dec_part}")
    } else {
        format!("{with_commas}.{dec_part}")
    }
}

/// Balance label used on statements and summaries: "1,300.00 Dr",
/// "200.00 Cr", or "0.00" when the balance is exactly zero.
pub fn balance_label(balance: Decimal) -> String {
    let magnitude = amount(balance.abs());
    if balance.is_zero() {
        magnitude
    } else if balance.is_sign_negative() {
        format!("{magnitude} Dr")
    } else {
        format!("{magnitude} Cr")
    }
}

/// Blank for zero, grouped amount otherwise. Used for debit/credit columns.
pub fn amount_or_blank(val: Decimal) -> String {
    if val.is_zero() {
        String::new()
    } else {
        amount(val)
    }
}

pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{size:.1} {}", UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_amount_formatting() {
        assert_eq!(amount(dec!(1234.56)), "1,234.56");
        assert_eq!(amount(dec!(-500)), "-500.00");
        assert_eq!(amount(Decimal::ZERO), "0.00");
        assert_eq!(amount(dec!(1000000.99)), "1,000,000.99");
        assert_eq!(amount(dec!(42.1)), "42.10");
        assert_eq!(amount(dec!(0.005)), "0.00");
    }

    #[test]
    fn test_balance_label() {
        assert_eq!(balance_label(dec!(-500)), "500.00 Dr");
        assert_eq!(balance_label(dec!(-1300)), "1,300.00 Dr");
        assert_eq!(balance_label(dec!(200)), "200.00 Cr");
        assert_eq!(balance_label(Decimal::ZERO), "0.00");
        assert_eq!(balance_label(dec!(-0.00)), "0.00");
    }

    #[test]
    fn test_amount_or_blank() {
        assert_eq!(amount_or_blank(Decimal::ZERO), "");
        assert_eq!(amount_or_blank(dec!(1000)), "1,000.00");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MB");
    }
}

//! Brazilian currency formatting for alert descriptions

use rust_decimal::Decimal;

/// Format an amount as Brazilian reais: `R$ 1.234,56`.
pub fn format_brl(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    let negative = rounded.is_sign_negative();
    let text = rounded.abs().to_string();

    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i.to_string(), format!("{f:0<2}")),
        None => (text, "00".to_string()),
    };

    let digits = int_part.as_bytes();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, b) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(*b as char);
    }

    let sign = if negative { "-" } else { "" };
    format!("R$ {sign}{grouped},{frac_part}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_format_brl_basic() {
        assert_eq!(format_brl(dec("150")), "R$ 150,00");
        assert_eq!(format_brl(dec("150.00")), "R$ 150,00");
        assert_eq!(format_brl(dec("0.5")), "R$ 0,50");
        assert_eq!(format_brl(dec("0")), "R$ 0,00");
    }

    #[test]
    fn test_format_brl_thousands_grouping() {
        assert_eq!(format_brl(dec("1234.5")), "R$ 1.234,50");
        assert_eq!(format_brl(dec("1234567.89")), "R$ 1.234.567,89");
        assert_eq!(format_brl(dec("999")), "R$ 999,00");
        assert_eq!(format_brl(dec("1000")), "R$ 1.000,00");
    }

    #[test]
    fn test_format_brl_rounds_to_cents() {
        assert_eq!(format_brl(dec("10.005")), "R$ 10,00");
        assert_eq!(format_brl(dec("10.015")), "R$ 10,02");
    }

    #[test]
    fn test_format_brl_negative() {
        assert_eq!(format_brl(dec("-42.10")), "R$ -42,10");
    }
}

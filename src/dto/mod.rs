//! View structs handed to templates and the JSON API.

pub mod brands;
pub mod categories;
pub mod products;

/// Formats an amount of Vietnamese dong, e.g. `450.000 ₫`.
pub fn format_vnd(amount: f64) -> String {
    let rounded = amount.round();
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{sign}{grouped} ₫")
}

#[cfg(test)]
mod tests {
    use super::format_vnd;

    #[test]
    fn groups_thousands_with_dots() {
        assert_eq!(format_vnd(450000.0), "450.000 ₫");
        assert_eq!(format_vnd(1250000.0), "1.250.000 ₫");
        assert_eq!(format_vnd(999.0), "999 ₫");
        assert_eq!(format_vnd(0.0), "0 ₫");
    }

    #[test]
    fn rounds_fractional_amounts() {
        assert_eq!(format_vnd(333333.33), "333.333 ₫");
        assert_eq!(format_vnd(-1500.0), "-1.500 ₫");
    }
}

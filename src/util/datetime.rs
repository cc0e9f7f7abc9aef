/// 兩位數的西元年，例如週次 "25W13" 的 25 => 2025
pub fn two_digit_year_to_gregorian(year: i32) -> i32 {
    2000 + year
}

/// 月份是否合法 (1~12)
pub fn is_valid_month(month: u32) -> bool {
    (1..=12).contains(&month)
}

/// ISO 週次是否合法 (1~53)
pub fn is_valid_week(week: u32) -> bool {
    (1..=53).contains(&week)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_digit_year() {
        assert_eq!(two_digit_year_to_gregorian(25), 2025);
        assert_eq!(two_digit_year_to_gregorian(9), 2009);
    }

    #[test]
    fn test_ranges() {
        assert!(is_valid_month(12));
        assert!(!is_valid_month(0));
        assert!(!is_valid_month(13));
        assert!(is_valid_week(53));
        assert!(!is_valid_week(54));
    }
}

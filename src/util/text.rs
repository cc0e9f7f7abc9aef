use std::{collections::HashSet, str::FromStr};

use anyhow::{anyhow, Result};

const NUMBER_ESCAPE_CHAR: &[char] = &['元', '%', ',', ' ', '"', '\n', '\u{a0}'];

/// 網頁上表示「無資料」的符號
const PLACEHOLDERS: &[&str] = &["-", "--", "—"];

/// Parses an `f64` value from a given string.
///
/// Thousands separators, percent signs and the other characters in
/// `NUMBER_ESCAPE_CHAR` are stripped before parsing.
///
/// # Example
///
/// ```
/// let v = parse_f64("1,234.5%", None).unwrap();
/// assert_eq!(v, 1234.5);
/// ```
pub fn parse_f64(s: &str, escape_chars: Option<Vec<char>>) -> Result<f64> {
    let cleaned = clean_escape_chars(s, escape_chars);
    f64::from_str(&cleaned)
        .map_err(|why| anyhow!("Failed to parse '{}' as f64 because {:?}", cleaned, why))
}

/// Parses an `i32` value from a given string.
pub fn parse_i32(s: &str, escape_chars: Option<Vec<char>>) -> Result<i32> {
    let cleaned = clean_escape_chars(s, escape_chars);
    i32::from_str(&cleaned)
        .map_err(|why| anyhow!("Failed to parse '{}' as i32 because: {:?}", cleaned, why))
}

/// Parses a `u32` value from a given string.
pub fn parse_u32(s: &str, escape_chars: Option<Vec<char>>) -> Result<u32> {
    let cleaned = clean_escape_chars(s, escape_chars);
    u32::from_str(&cleaned)
        .map_err(|why| anyhow!("Failed to parse '{}' as u32 because: {:?}", cleaned, why))
}

/// 清掉跳脫字元後若為空字串或 "-" 之類的符號，代表網頁沒有提供數值
pub fn is_placeholder(s: &str) -> bool {
    let cleaned = clean_escape_chars(s, None);
    cleaned.is_empty() || PLACEHOLDERS.contains(&cleaned.as_str())
}

/// 解析儲存格的數值
///
/// - 空字串或 "-" 回傳 `Ok(None)`
/// - 其餘無法解析的內容回傳 `Err`，由呼叫端決定如何記錄
pub fn parse_optional_f64(s: &str) -> Result<Option<f64>> {
    if is_placeholder(s) {
        return Ok(None);
    }

    parse_f64(s, None).map(Some)
}

/// Removes a set of escape characters from a given string.
///
/// # Example
///
/// ```
/// let s = "Hello$Wor^ld!@#";
/// let clean_s = clean_escape_chars(s, Some(vec!['$', '^', '@', '#']));
/// assert_eq!(clean_s, "HelloWorld!");
/// ```
pub(crate) fn clean_escape_chars(s: &str, escape_chars: Option<Vec<char>>) -> String {
    let mut combined: Vec<char> = NUMBER_ESCAPE_CHAR.to_vec();
    if let Some(ec) = escape_chars {
        combined.extend(ec);
    }

    let filters = combined.iter().collect::<HashSet<_>>();
    s.trim().chars().filter(|c| !filters.contains(c)).collect()
}

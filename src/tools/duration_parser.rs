use anyhow::{Context, Result, bail};
use regex::Regex;
use std::sync::LazyLock;

static DURATION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([0-9]+)\s*([smhdSMHD]?)\s*$").expect("duration pattern is valid")
});

/// 解析時間長度字串，回傳秒數
///
/// 接受 `45`、`45s`、`90m`、`3h`、`1d`；沒有單位時視為秒
pub fn parse_duration_seconds(input: &str) -> Result<u64> {
    let Some(captures) = DURATION_PATTERN.captures(input) else {
        bail!("無效的時間長度: {input:?}（範例: 45s, 90m, 3h, 1d）");
    };

    let value: u64 = captures[1]
        .parse()
        .with_context(|| format!("時間長度數值過大: {input:?}"))?;

    let multiplier = match captures[2].to_ascii_lowercase().as_str() {
        "" | "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        "d" => 24 * 60 * 60,
        _ => unreachable!(),
    };

    value
        .checked_mul(multiplier)
        .with_context(|| format!("時間長度數值過大: {input:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_units() {
        assert_eq!(parse_duration_seconds("45").unwrap(), 45);
        assert_eq!(parse_duration_seconds("45s").unwrap(), 45);
        assert_eq!(parse_duration_seconds("90m").unwrap(), 5_400);
        assert_eq!(parse_duration_seconds("3h").unwrap(), 10_800);
        assert_eq!(parse_duration_seconds(" 1D ").unwrap(), 86_400);
    }

    #[test]
    fn test_reject_invalid() {
        assert!(parse_duration_seconds("").is_err());
        assert!(parse_duration_seconds("3 hours").is_err());
        assert!(parse_duration_seconds("-5m").is_err());
        assert!(parse_duration_seconds("1.5h").is_err());
        assert!(parse_duration_seconds("99999999999999999999h").is_err());
    }

    #[test]
    fn test_non_ascii_digits_are_invalid_format() {
        let err = parse_duration_seconds("٣h").unwrap_err();
        assert!(format!("{err:#}").contains("無效的時間長度"));
    }
}

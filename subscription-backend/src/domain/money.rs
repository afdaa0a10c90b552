// subscription-backend/src/domain/money.rs
//
// 価格は通貨の最小単位（USDならセント）の整数で永続化し、
// APIの境界では小数の主単位（9.99 など）でやり取りする。

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// 小数点以下の桁数（最小単位 = 1/100）
pub const MINOR_UNIT_DIGITS: usize = 2;
const MINOR_UNITS_PER_MAJOR: i64 = 100;
/// 整数部の最大桁数（i64 オーバーフロー防止）
const MAX_INTEGER_DIGITS: usize = 13;

static PRICE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)(?:\.(\d+))?$").expect("valid price regex"));

static CURRENCY_CODE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z]{3}$").expect("valid currency regex"));

/// JSONの値（数値または数値文字列）を最小単位の整数に変換
///
/// - 負数、指数表記、3桁以上の有効な小数部は拒否する
/// - `"9.990"` のように末尾が0の余分な桁は許容する
pub fn parse_price(value: &Value) -> Result<i64, String> {
    let raw = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return Err("price must be a number".to_string()),
    };

    parse_price_str(&raw)
}

pub fn parse_price_str(raw: &str) -> Result<i64, String> {
    let captures = PRICE_REGEX
        .captures(raw)
        .ok_or_else(|| format!("'{}' is not a valid non-negative price", raw))?;

    let integer_part = captures.get(1).map_or("", |m| m.as_str());
    let fraction_part = captures.get(2).map_or("", |m| m.as_str());

    let integer_part = integer_part.trim_start_matches('0');
    if integer_part.len() > MAX_INTEGER_DIGITS {
        return Err(format!("'{}' is too large", raw));
    }

    let (significant, rest) = if fraction_part.len() > MINOR_UNIT_DIGITS {
        fraction_part.split_at(MINOR_UNIT_DIGITS)
    } else {
        (fraction_part, "")
    };
    if rest.chars().any(|c| c != '0') {
        return Err(format!(
            "'{}' has more than {} decimal places",
            raw, MINOR_UNIT_DIGITS
        ));
    }

    let major: i64 = if integer_part.is_empty() {
        0
    } else {
        integer_part
            .parse()
            .map_err(|_| format!("'{}' is not a valid price", raw))?
    };
    let minor: i64 = format!("{:0<width$}", significant, width = MINOR_UNIT_DIGITS)
        .parse()
        .map_err(|_| format!("'{}' is not a valid price", raw))?;

    Ok(major * MINOR_UNITS_PER_MAJOR + minor)
}

/// 最小単位の整数を主単位の小数に変換
pub fn minor_to_major(amount: i64) -> f64 {
    amount as f64 / MINOR_UNITS_PER_MAJOR as f64
}

/// 通貨コードを検証して大文字に正規化
pub fn normalize_currency_code(code: &str) -> Result<String, String> {
    let code = code.trim();
    if CURRENCY_CODE_REGEX.is_match(code) {
        Ok(code.to_uppercase())
    } else {
        Err(format!(
            "'{}' is not a valid currency code (expected 3 letters, e.g. USD)",
            code
        ))
    }
}

//! Field normalization: one raw export value in, an ordered list of scalar
//! tokens out.
//!
//! Nothing here fails. Values that cannot be interpreted degrade to a
//! single-token list (or an empty one), so callers always get a list back.
//! Numeric, flag, and voltage helpers are layered on top of the token lists.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::slug::lookup_key;

static TRAILING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*\]").expect("valid regex"));

static BARE_ORDINAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d)\.\s+").expect("valid regex"));

static NEWLINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:\\r)?\\n|\r?\n").expect("valid regex"));

/// Which delimiters a string may be split on once JSON repair has failed.
#[derive(Debug, Clone, Copy)]
struct SplitRules {
    slash: bool,
    times: bool,
    comma: bool,
}

const VALUE_RULES: SplitRules = SplitRules {
    slash: true,
    times: true,
    comma: true,
};

/// `x` is an ordinary letter in names ("Negro texturado").
const LABEL_RULES: SplitRules = SplitRules {
    slash: true,
    times: false,
    comma: true,
};

/// Storage paths contain `/` and often `x` (`600x400.webp`).
const PATH_RULES: SplitRules = SplitRules {
    slash: false,
    times: false,
    comma: true,
};

/// Converts one raw field value into an ordered list of tokens.
///
/// - `null` and objects yield an empty list.
/// - Arrays are flattened; each element is stringified and empties dropped.
/// - Strings are first tried as a (possibly malformed) JSON array, then
///   split on the first delimiter present out of `/`, `x`, `,`, and
///   otherwise kept whole.
///
/// Every token is trimmed, has internal whitespace collapsed, and loses any
/// leading bullet or dash marker.
#[must_use]
pub fn normalize_list(raw: &Value) -> Vec<String> {
    tokenize(raw, VALUE_RULES)
}

/// Like [`normalize_list`] but never splits on `x`. Used for catalog names.
#[must_use]
pub fn normalize_label_list(raw: &Value) -> Vec<String> {
    tokenize(raw, LABEL_RULES)
}

/// Like [`normalize_list`] but only splits on `,`, keeping storage paths intact.
#[must_use]
pub fn normalize_path_list(raw: &Value) -> Vec<String> {
    tokenize(raw, PATH_RULES)
}

/// Parses every token of [`normalize_list`] as a number, dropping tokens that
/// are not finite numbers. Surviving values keep their relative order.
#[must_use]
pub fn to_num_list(raw: &Value) -> Vec<f64> {
    normalize_list(raw)
        .iter()
        .filter_map(|token| parse_number(token))
        .collect()
}

/// [`to_num_list`] rounded to the nearest integer.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn to_int_list(raw: &Value) -> Vec<i64> {
    to_num_list(raw)
        .into_iter()
        .map(|value| value.round() as i64)
        .collect()
}

/// Parses a single token as a finite number.
///
/// Decimal commas are accepted (`"7,5"`) and a trailing unit suffix is
/// ignored (`"13W"`, `"900 lm"`, `"3000K"`). A `.` is always a decimal
/// point, never a thousands separator (`"1.200"` is `1.2`).
#[must_use]
pub fn parse_number(token: &str) -> Option<f64> {
    let unitless = token.trim().trim_end_matches(|c: char| {
        c.is_alphabetic() || c.is_whitespace() || c == '°' || c == '%'
    });
    let value = unitless.replace(',', ".").parse::<f64>().ok()?;
    value.is_finite().then_some(value)
}

/// Interprets a yes/no style field. `None` when the value says neither.
#[must_use]
pub fn parse_flag(raw: &Value) -> Option<bool> {
    match raw {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|v| v.abs() > f64::EPSILON),
        Value::String(s) => match lookup_key(s).as_str() {
            "si" | "s" | "yes" | "y" | "true" | "1" | "x" | "incluye" | "incluido" => Some(true),
            "no" | "n" | "false" | "0" | "no incluye" => Some(false),
            _ => None,
        },
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Reads a unit quantity, clamping anything missing or below one to `1`.
#[must_use]
pub fn parse_quantity(raw: &Value) -> u32 {
    to_int_list(raw)
        .first()
        .copied()
        .filter(|q| *q >= 1)
        .map_or(1, |q| u32::try_from(q).unwrap_or(u32::MAX))
}

/// Supply-voltage range parsed from a voltage label.
#[derive(Debug, Clone, PartialEq)]
pub struct VoltageRange {
    pub min: f64,
    pub max: f64,
    /// Normalized label text, tokens joined with `/`.
    pub label: String,
}

/// Parses a voltage label such as `"110-220"`, `"12/24"`, or `"220V"` into
/// its lowest and highest positive values.
#[must_use]
pub fn parse_voltage_range(raw: &Value) -> Option<VoltageRange> {
    let tokens = normalize_list(raw);
    let values: Vec<f64> = tokens
        .iter()
        .flat_map(|token| token.split(['-', '\u{2013}', '~']))
        .filter_map(parse_number)
        .filter(|v| *v > 0.0)
        .collect();

    if values.is_empty() {
        return None;
    }

    Some(VoltageRange {
        min: values.iter().copied().fold(f64::INFINITY, f64::min),
        max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        label: tokens.join("/"),
    })
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn tokenize(raw: &Value, rules: SplitRules) -> Vec<String> {
    match raw {
        Value::Null | Value::Object(_) => Vec::new(),
        Value::Bool(b) => vec![b.to_string()],
        Value::Number(n) => vec![n.to_string()],
        Value::Array(items) => flatten_array(items),
        Value::String(s) => tokenize_str(s, rules),
    }
}

fn flatten_array(items: &[Value]) -> Vec<String> {
    let mut tokens = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::String(s) => tokens.extend(clean_token(s)),
            Value::Number(n) => tokens.push(n.to_string()),
            Value::Bool(b) => tokens.push(b.to_string()),
            Value::Array(inner) => tokens.extend(flatten_array(inner)),
            Value::Null | Value::Object(_) => {}
        }
    }
    tokens
}

fn tokenize_str(raw: &str, rules: SplitRules) -> Vec<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    if let Some(items) = parse_json_array(trimmed) {
        return flatten_array(&items);
    }

    let body = strip_brackets(trimmed);
    let parts: Vec<&str> = if rules.slash && body.contains('/') {
        body.split('/').collect()
    } else if rules.times && body.contains('x') {
        body.split('x').collect()
    } else if rules.comma && body.contains(',') {
        body.split(',').collect()
    } else {
        vec![body]
    };

    parts.into_iter().filter_map(clean_token).collect()
}

/// Parses `s` as a JSON array, retrying once after repairing the malformed
/// patterns the legacy export is known to contain.
fn parse_json_array(s: &str) -> Option<Vec<Value>> {
    if !(s.starts_with('[') && s.ends_with(']')) {
        return None;
    }

    if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(s) {
        return Some(items);
    }

    match serde_json::from_str::<Value>(&repair_json(s)) {
        Ok(Value::Array(items)) => Some(items),
        _ => None,
    }
}

fn repair_json(s: &str) -> String {
    let quoted: String = s
        .chars()
        .map(|c| match c {
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' | '\u{2033}' | '\u{2018}'
            | '\u{2019}' => '"',
            other => other,
        })
        .collect();
    let flattened = NEWLINES.replace_all(&quoted, " ");
    let undoubled = flattened.replace("\"\"", "\"");
    let no_trailing = TRAILING_COMMA.replace_all(&undoubled, "]");
    BARE_ORDINAL.replace_all(&no_trailing, "${1}, ").into_owned()
}

fn strip_brackets(s: &str) -> &str {
    s.strip_prefix('[')
        .and_then(|inner| inner.strip_suffix(']'))
        .map_or(s, str::trim)
}

fn clean_token(raw: &str) -> Option<String> {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut token = collapsed.trim_matches(|c: char| c == '"' || c == '\'').trim();

    loop {
        let mut chars = token.chars();
        let stripped = match chars.next() {
            Some('\u{2022}' | '\u{00B7}' | '*' | '\u{25AA}' | '\u{25CF}') => chars.as_str(),
            Some('-' | '\u{2013}' | '\u{2014}') => {
                // A dash directly before a digit is a sign, not a bullet.
                if chars.clone().next().is_some_and(|c| c.is_ascii_digit() || c == '.') {
                    break;
                }
                chars.as_str()
            }
            _ => break,
        };
        token = stripped.trim_start();
    }

    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;

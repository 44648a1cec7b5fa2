//! Built-in leaf validators.
//!
//! Every validator lets the absence marker pass, except `presence`, which
//! exists to reject it. Default messages carry a `[var]` placeholder for the
//! field label; `options.message` replaces them.

use ensure_core::{Comparator, ConstraintOptions, ParamValue};
use regex::Regex;
use std::sync::LazyLock;

/// Signature shared by the built-in validators.
pub type BuiltinFn = fn(&ParamValue, &ConstraintOptions) -> Option<String>;

/// The built-in validators by registry name.
pub const BUILTINS: &[(&str, BuiltinFn)] = &[
    ("string", string),
    ("number", number),
    ("presence", presence),
    ("inclusion", inclusion),
    ("format", format),
    ("array", array),
    ("date", date),
    ("uuid", uuid),
    ("bool", bool),
    ("email", email),
    ("url", url),
    ("length", length),
    ("numericality", numericality),
    ("ordered", ordered),
];

static UUID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-f0-9]{32}$").expect("uuid pattern is valid"));

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[A-Z0-9._%+-]+@[A-Z0-9.-]+.[A-Z]{2,4}$").expect("email pattern is valid")
});

// Private and loopback IPv4 hosts are rejected after matching, see `is_url`.
static URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)^(?:(?:https?|ftp)://)",
        r"(?:\S+(?::\S*)?@)?",
        r"(?:",
        r"(?P<ip>(?:[1-9][0-9]?|1[0-9][0-9]|2[01][0-9]|22[0-3])",
        r"(?:\.(?:1?[0-9]{1,2}|2[0-4][0-9]|25[0-5])){2}",
        r"(?:\.(?:[1-9][0-9]?|1[0-9][0-9]|2[0-4][0-9]|25[0-4])))",
        r"|",
        r"(?:(?:[a-z\x{00a1}-\x{ffff}0-9]-*)*[a-z\x{00a1}-\x{ffff}0-9]+)",
        r"(?:\.(?:[a-z\x{00a1}-\x{ffff}0-9]-*)*[a-z\x{00a1}-\x{ffff}0-9]+)*",
        r"(?:\.(?:[a-z\x{00a1}-\x{ffff}]{2,}))\.?",
        r")",
        r"(?::[0-9]{2,5})?",
        r"(?:[/?#]\S*)?$",
    ))
    .expect("url pattern is valid")
});

fn fail(options: &ConstraintOptions, default: &str) -> Option<String> {
    Some(options.message_or(None, default))
}

fn text_matches(value: &ParamValue, regex: &Regex) -> bool {
    value.to_text().is_some_and(|text| regex.is_match(&text))
}

/// Passes when the value is absent or a string.
pub fn string(value: &ParamValue, options: &ConstraintOptions) -> Option<String> {
    if value.is_null() || value.as_str().is_some() {
        return None;
    }
    fail(options, "[var] is not a string")
}

/// Passes when the value is absent or a finite number.
pub fn number(value: &ParamValue, options: &ConstraintOptions) -> Option<String> {
    if value.is_null() || value.is_number() {
        return None;
    }
    fail(options, "[var] is not a number")
}

/// Fails on the absence marker, and with `disallow_empty` also on `""` and
/// empty sequences.
pub fn presence(value: &ParamValue, options: &ConstraintOptions) -> Option<String> {
    let empty = match value {
        ParamValue::String(s) => s.is_empty(),
        ParamValue::Array(items) => items.is_empty(),
        _ => false,
    };

    if value.is_null() || (options.disallow_empty && empty) {
        return fail(options, "[var] can't be blank");
    }
    None
}

/// Passes when the value is absent or a member of `within`.
pub fn inclusion(value: &ParamValue, options: &ConstraintOptions) -> Option<String> {
    if value.is_null() {
        return None;
    }

    let within = options.within.as_deref().unwrap_or_default();
    if within.iter().any(|allowed| allowed.same_value(value)) {
        return None;
    }
    fail(options, "[var] is not included in the list")
}

/// Passes when the value is absent or its textual form matches `pattern`.
///
/// Without a pattern there is nothing to check against.
pub fn format(value: &ParamValue, options: &ConstraintOptions) -> Option<String> {
    let Some(pattern) = &options.pattern else {
        return None;
    };
    if value.is_null() {
        return None;
    }

    if value.to_text().is_some_and(|text| pattern.is_match(&text)) {
        return None;
    }
    fail(options, "[var] is in the wrong format")
}

/// Passes when the value is absent or a sequence.
pub fn array(value: &ParamValue, options: &ConstraintOptions) -> Option<String> {
    if value.is_null() || value.as_array().is_some() {
        return None;
    }
    fail(options, "[var] is not an array")
}

/// Passes when the value is absent or a date instance.
pub fn date(value: &ParamValue, options: &ConstraintOptions) -> Option<String> {
    if value.is_null() || value.as_date().is_some() {
        return None;
    }
    fail(options, "[var] is not an instance of Date")
}

/// Passes when the value is absent or 32 lowercase hex digits.
pub fn uuid(value: &ParamValue, options: &ConstraintOptions) -> Option<String> {
    if value.is_null() || text_matches(value, &UUID_REGEX) {
        return None;
    }
    fail(options, "[var] is not a UUID")
}

/// Passes when the value is absent or a boolean.
pub fn bool(value: &ParamValue, options: &ConstraintOptions) -> Option<String> {
    if value.is_null() || value.as_bool().is_some() {
        return None;
    }
    fail(options, "[var] is not boolean")
}

/// Passes when the value is absent or looks like an email address.
pub fn email(value: &ParamValue, options: &ConstraintOptions) -> Option<String> {
    if value.is_null() || text_matches(value, &EMAIL_REGEX) {
        return None;
    }
    fail(options, "[var] is not a valid email")
}

/// Passes when the value is absent or a public http(s)/ftp URL.
pub fn url(value: &ParamValue, options: &ConstraintOptions) -> Option<String> {
    if value.is_null() || value.to_text().is_some_and(|text| is_url(&text)) {
        return None;
    }
    fail(options, "[var] is not a valid url")
}

fn is_url(text: &str) -> bool {
    let Some(captures) = URL_REGEX.captures(text) else {
        return false;
    };

    match captures.name("ip") {
        Some(ip) => !is_private_ipv4(ip.as_str()),
        None => true,
    }
}

fn is_private_ipv4(host: &str) -> bool {
    let octets: Vec<u8> = host.split('.').filter_map(|o| o.parse().ok()).collect();
    match octets.as_slice() {
        [10, ..] | [127, ..] => true,
        [169, 254, ..] | [192, 168, ..] => true,
        [172, second, ..] => (16..=31).contains(second),
        _ => false,
    }
}

/// Checks string or sequence length against `minimum`, `maximum` and
/// `exactly`, in that order. Values without a length pass.
pub fn length(value: &ParamValue, options: &ConstraintOptions) -> Option<String> {
    let len = value.length()?;

    if let Some(minimum) = options.minimum.filter(|&min| len < min) {
        return Some(options.message_or(
            options.too_short.as_ref(),
            format!("[var] is too short (minimum length is {minimum})"),
        ));
    }
    if let Some(maximum) = options.maximum.filter(|&max| len > max) {
        return Some(options.message_or(
            options.too_long.as_ref(),
            format!("[var] is too long (maximum length is {maximum})"),
        ));
    }
    if let Some(exactly) = options.exactly.filter(|&exact| len != exact) {
        return Some(options.message_or(
            options.wrong_length.as_ref(),
            format!("[var] has length that is not exactly {exactly}"),
        ));
    }
    None
}

/// Checks a number against the configured bounds.
///
/// Order: `only_integer`, `greater_than`, `greater_than_or_equal_to`,
/// `less_than`, `less_than_or_equal_to`, `pattern`. The first violation
/// wins. Absent and non-numeric values pass.
pub fn numericality(value: &ParamValue, options: &ConstraintOptions) -> Option<String> {
    let n = value.as_number()?;

    if options.only_integer && n.fract() != 0.0 {
        return Some(options.message_or(options.not_an_integer.as_ref(), "[var] is not an integer"));
    }
    if let Some(bound) = options.greater_than.filter(|&b| n <= b) {
        return Some(options.message_or(
            options.not_greater_than.as_ref(),
            format!("[var] is not greater than {bound}"),
        ));
    }
    if let Some(bound) = options.greater_than_or_equal_to.filter(|&b| n < b) {
        return Some(options.message_or(
            options.not_greater_than_or_equal_to.as_ref(),
            format!("[var] is not greater than or equal to {bound}"),
        ));
    }
    if let Some(bound) = options.less_than.filter(|&b| n >= b) {
        return Some(options.message_or(
            options.not_less_than.as_ref(),
            format!("[var] is not less than {bound}"),
        ));
    }
    if let Some(bound) = options.less_than_or_equal_to.filter(|&b| n > b) {
        return Some(options.message_or(
            options.not_less_than_or_equal_to.as_ref(),
            format!("[var] is not less than or equal to {bound}"),
        ));
    }
    if let Some(pattern) = &options.pattern {
        if !value.to_text().is_some_and(|text| pattern.is_match(&text)) {
            return Some(options.message_or(options.wrong_format.as_ref(), "[var] has wrong format"));
        }
    }
    None
}

/// Checks every adjacent pair of a sequence with the comparator.
///
/// Without a comparator, ascending natural order is required. Absent
/// values, non-sequences and sequences of at most one element pass.
pub fn ordered(value: &ParamValue, options: &ConstraintOptions) -> Option<String> {
    let items = value.as_array()?;
    if items.len() <= 1 {
        return None;
    }

    let natural = Comparator::by_name("ascending");
    let comparator = options.comparator.as_ref().or(natural.as_ref())?;

    if items.windows(2).all(|pair| comparator.holds(&pair[0], &pair[1])) {
        return None;
    }
    fail(options, "[var] is not ordered")
}

// src/version.rs

//! Maven to 0install version conversion
//!
//! Maven versions are free-form strings with well-known qualifiers
//! (`1.0-SNAPSHOT`, `2.1-beta3`, `3.0-rc1`). 0install versions are dotted
//! numeric lists separated by `-` and the modifiers `pre`, `rc` and `post`.
//! The conversion keeps ordering intact for the common cases:
//!
//! | Maven qualifier    | 0install |
//! |--------------------|----------|
//! | `snapshot`         | `pre`    |
//! | `milestone`, `m`   | `pre1`   |
//! | `alpha`, `a`       | `pre2`   |
//! | `beta`, `b`        | `pre3`   |
//! | `rc`, `cr`         | `rc`     |
//! | `ga`, `final`      | `0`      |
//! | `rev`              | `post`   |
//! | `sp`               | `post`   |
//!
//! Anything that is still not numeric after stripping the qualifier is
//! replaced by the three-digit ASCII codes of its characters, so `xyz`
//! becomes `120121122`.

/// Qualifier prefixes, checked in order (longer names before their abbreviations)
const QUALIFIERS: &[(&str, &str)] = &[
    ("snapshot", "pre-"),
    ("milestone", "pre1-"),
    ("m", "pre1-"),
    ("alpha", "pre2-"),
    ("a", "pre2-"),
    ("beta", "pre3-"),
    ("b", "pre3-"),
    ("rc", "rc"),
    ("cr", "rc"),
    ("ga", "0"),
    ("final", "0"),
    ("rev", "post-"),
    ("sp", "post"),
];

/// Check for a dotted list of numbers such as `1`, `1.0` or `2.10.3`
fn is_dotted_list(value: &str) -> bool {
    !value.is_empty()
        && value
            .split('.')
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()))
}

/// Replace every byte with its zero-padded three-digit decimal code
pub fn convert_to_ascii_numbers(value: &str) -> String {
    value.bytes().map(|b| format!("{:03}", b)).collect()
}

fn convert_part(part: &str) -> String {
    let lower = part.to_ascii_lowercase();
    let mut prefix = "";
    let mut rest = part;

    for (qualifier, replacement) in QUALIFIERS {
        if lower.starts_with(qualifier) {
            rest = &part[qualifier.len()..];
            prefix = replacement;
            break;
        }
    }

    let rest = if is_dotted_list(rest) {
        rest.to_string()
    } else {
        convert_to_ascii_numbers(rest)
    };

    match prefix.strip_suffix('-') {
        Some(bare) if rest.is_empty() => bare.to_string(),
        _ => format!("{}{}", prefix, rest),
    }
}

/// Convert a Maven version into a 0install version
pub fn convert_version(maven_version: &str) -> String {
    let trimmed = maven_version.trim();
    let mut parts: Vec<&str> = trimmed.split('-').collect();
    while parts.len() > 1 && parts.last().is_some_and(|p| p.is_empty()) {
        parts.pop();
    }
    if trimmed.is_empty() {
        return String::new();
    }

    let converted: Vec<String> = parts.iter().map(|p| convert_part(p)).collect();
    let joined = converted.join("-");

    if is_dotted_list(parts[0]) {
        joined
    } else {
        format!("1-{}", joined)
    }
}

/// Check whether a version string uses Maven range syntax
pub fn is_maven_range(value: &str) -> bool {
    value.contains(['(', ')', '[', ']'])
}

/// Convert a Maven version range into a 0install version expression
///
/// `[a,b)` becomes `a..!b`, inclusive upper bounds are expressed as
/// `..!b-post`, exclusive lower bounds as `a-post..`, and comma separated
/// alternatives outside brackets become `|`.
pub fn convert_range(maven_range: &str) -> String {
    let mut result = String::new();
    let mut in_interval = false;
    let mut left_open = false;
    let mut saw_comma = false;
    let mut version = String::new();

    for c in maven_range.chars() {
        match c {
            '[' | '(' => {
                in_interval = true;
                left_open = c == '(';
                saw_comma = false;
            }
            ')' => {
                in_interval = false;
                if !version.is_empty() {
                    result.push('!');
                    result.push_str(&convert_version(&version));
                    version.clear();
                }
            }
            ']' => {
                in_interval = false;
                if !version.is_empty() {
                    let converted = convert_version(&version);
                    if !saw_comma {
                        // [1.0] pins exactly one version
                        result.push_str(&converted);
                        result.push_str("..");
                    }
                    result.push('!');
                    result.push_str(&converted);
                    result.push_str("-post");
                    version.clear();
                }
            }
            ',' if in_interval => {
                saw_comma = true;
                if !version.is_empty() {
                    result.push_str(&convert_version(&version));
                    version.clear();
                    if left_open {
                        result.push_str("-post");
                    }
                }
                result.push_str("..");
            }
            ',' => {
                if !version.is_empty() {
                    result.push_str(&convert_version(&version));
                    version.clear();
                }
                result.push('|');
            }
            _ => version.push(c),
        }
    }

    if !version.is_empty() {
        result.push_str(&convert_version(&version));
    }

    result
}

/// Convert either a plain version or a range
pub fn convert_requirement(value: &str) -> String {
    if is_maven_range(value) {
        convert_range(value)
    } else {
        convert_version(value)
    }
}

//! Printf-style message interpolation
//!
//! Recognized directives: `%s` (stringify), `%d` (numeric), `%j` (JSON),
//! `%%` (literal percent). Positional arguments are consumed left to
//! right; a directive with no remaining argument stays literal, and any
//! arguments left over after the format string is exhausted are appended
//! space-joined. This mirrors familiar printf semantics and is a
//! compatibility contract, tested independently of the logger.

use serde_json::Value;

/// Render one argument the way `%s` does: strings verbatim (no quotes),
/// everything else as compact JSON.
#[must_use]
pub fn stringify_arg(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn numeric_arg(value: &Value) -> String {
    match value {
        Value::Number(n) => n.to_string(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => "0".to_string(),
        Value::String(s) => match s.parse::<f64>() {
            Ok(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", n as i64)
                } else {
                    n.to_string()
                }
            }
            Err(_) => "NaN".to_string(),
        },
        _ => "NaN".to_string(),
    }
}

fn json_arg(value: &Value) -> String {
    value.to_string()
}

/// Interpolate `fmt` with `args`.
///
/// Exact argument-count edge cases:
/// - too few args: the unconsumed directive is emitted literally;
/// - too many args: leftovers are appended, space-joined, after the
///   formatted string.
#[must_use]
pub fn format_message(fmt: &str, args: &[Value]) -> String {
    let mut out = String::with_capacity(fmt.len() + 16);
    let mut arg_iter = args.iter();
    let mut consumed = 0usize;

    let mut chars = fmt.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.peek().copied() {
            Some('%') => {
                chars.next();
                out.push('%');
            }
            Some(d @ ('s' | 'd' | 'j')) => {
                match arg_iter.next() {
                    Some(arg) => {
                        consumed += 1;
                        chars.next();
                        match d {
                            's' => out.push_str(&stringify_arg(arg)),
                            'd' => out.push_str(&numeric_arg(arg)),
                            'j' => out.push_str(&json_arg(arg)),
                            _ => unreachable!(),
                        }
                    }
                    None => {
                        // Too few arguments: keep the directive literal
                        out.push('%');
                    }
                }
            }
            _ => out.push('%'),
        }
    }

    // Too many arguments: append the rest, space-joined
    for arg in args.iter().skip(consumed) {
        out.push(' ');
        out.push_str(&stringify_arg(arg));
    }

    out
}

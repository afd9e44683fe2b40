//! Colorized JSON pretty-printing for terminal output.
//!
//! Renders JSON values with syntax highlighting:
//! - Field names in cyan
//! - Strings in green
//! - Numbers in yellow
//! - Booleans in magenta
//! - Null in red

use serde_json::Value;

const FIELD: &str = "\x1b[36m";
const STRING: &str = "\x1b[32m";
const NUMBER: &str = "\x1b[33m";
const BOOLEAN: &str = "\x1b[35m";
const NULL: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";

const INDENT: usize = 2;

/// Print a JSON value with colorized syntax highlighting.
///
/// Renders the value with 2-space indentation and ANSI color codes.
/// When `use_color` is false, outputs plain JSON without colors
/// (suitable for machine consumption or piping).
pub fn print_json(value: &Value, use_color: bool) {
    println!("{}", render_json(value, use_color));
}

/// Render a JSON value as an indented string.
pub fn render_json(value: &Value, use_color: bool) -> String {
    let mut out = String::new();
    write_value(&mut out, value, 0, use_color);
    out
}

fn write_value(out: &mut String, value: &Value, depth: usize, use_color: bool) {
    match value {
        Value::Null => paint(out, NULL, "null", use_color),
        Value::Bool(b) => paint(out, BOOLEAN, &b.to_string(), use_color),
        Value::Number(n) => paint(out, NUMBER, &n.to_string(), use_color),
        Value::String(_) => paint(out, STRING, &value.to_string(), use_color),
        Value::Array(items) if items.is_empty() => out.push_str("[]"),
        Value::Array(items) => {
            out.push_str("[\n");
            for (i, item) in items.iter().enumerate() {
                push_indent(out, depth + 1);
                write_value(out, item, depth + 1, use_color);
                push_separator(out, i + 1 < items.len());
            }
            push_indent(out, depth);
            out.push(']');
        }
        Value::Object(map) if map.is_empty() => out.push_str("{}"),
        Value::Object(map) => {
            out.push_str("{\n");
            for (i, (key, item)) in map.iter().enumerate() {
                push_indent(out, depth + 1);
                paint(out, FIELD, &Value::String(key.clone()).to_string(), use_color);
                out.push_str(": ");
                write_value(out, item, depth + 1, use_color);
                push_separator(out, i + 1 < map.len());
            }
            push_indent(out, depth);
            out.push('}');
        }
    }
}

fn paint(out: &mut String, color: &str, text: &str, use_color: bool) {
    if use_color {
        out.push_str(color);
        out.push_str(text);
        out.push_str(RESET);
    } else {
        out.push_str(text);
    }
}

fn push_indent(out: &mut String, depth: usize) {
    out.push_str(&" ".repeat(depth * INDENT));
}

fn push_separator(out: &mut String, more: bool) {
    if more {
        out.push(',');
    }
    out.push('\n');
}

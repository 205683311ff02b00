//! Named parameter binding.
//!
//! Query files use `:name` placeholders. Before execution they are rewritten
//! into the positional form the target database understands, and the values
//! are collected in binding order.

use super::QueryParams;
use crate::error::{NeriumError, Result};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::iter::Peekable;
use std::str::Chars;

/// Positional placeholder syntax of a database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// `?` per occurrence (SQLite).
    Question,
    /// `$1`, `$2`, ... with repeated names sharing a slot (PostgreSQL).
    Dollar,
}

/// SQL rewritten for positional binding, plus values in binding order.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundQuery {
    pub sql: String,
    pub values: Vec<JsonValue>,
}

/// Rewrites `:name` placeholders and resolves their values from `params`.
///
/// Placeholders inside string literals, quoted identifiers and comments are
/// left alone, as are `::` casts. With [`PlaceholderStyle::Dollar`] the
/// PostgreSQL forms `E'...'` (backslash escapes) and `$tag$...$tag$` are
/// literals too. Unused parameters are ignored.
pub fn bind_named(sql: &str, params: &QueryParams, style: PlaceholderStyle) -> Result<BoundQuery> {
    let mut out = String::with_capacity(sql.len());
    let mut values = Vec::new();
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut chars = sql.chars().peekable();

    let postgres = style == PlaceholderStyle::Dollar;

    while let Some(c) = chars.next() {
        let at_boundary = !out.chars().next_back().is_some_and(is_identifier_char);
        match c {
            'E' | 'e' if postgres && at_boundary && chars.peek() == Some(&'\'') => {
                out.push(c);
                out.push('\'');
                chars.next();
                copy_escaped(&mut chars, &mut out);
            }
            '$' if postgres && at_boundary => match dollar_tag(&chars) {
                Some(tag) => {
                    let delimiter = format!("${tag}$");
                    out.push_str(&delimiter);
                    chars.by_ref().take(tag.len() + 1).for_each(drop);
                    copy_dollar_quoted(&mut chars, &mut out, &delimiter);
                }
                None => out.push(c),
            },
            '\'' | '"' | '`' => {
                out.push(c);
                copy_quoted(&mut chars, &mut out, c);
            }
            '-' if chars.peek() == Some(&'-') => {
                out.push(c);
                copy_until(&mut chars, &mut out, |current, _| current == '\n');
            }
            '/' if chars.peek() == Some(&'*') => {
                out.push(c);
                out.push('*');
                chars.next();
                copy_until(&mut chars, &mut out, |current, previous| {
                    current == '/' && previous == '*'
                });
            }
            ':' if chars.peek() == Some(&':') => {
                out.push_str("::");
                chars.next();
            }
            ':' if chars.peek().is_some_and(|n| n.is_ascii_alphabetic() || *n == '_') => {
                let name = read_identifier(&mut chars);
                let value = params
                    .get(&name)
                    .cloned()
                    .ok_or_else(|| NeriumError::query(format!("missing value for parameter :{name}")))?;

                match style {
                    PlaceholderStyle::Question => {
                        values.push(value);
                        out.push('?');
                    }
                    PlaceholderStyle::Dollar => {
                        let slot = match slots.get(&name) {
                            Some(slot) => *slot,
                            None => {
                                values.push(value);
                                slots.insert(name, values.len());
                                values.len()
                            }
                        };
                        out.push('$');
                        out.push_str(&slot.to_string());
                    }
                }
            }
            _ => out.push(c),
        }
    }

    Ok(BoundQuery { sql: out, values })
}

/// Copies a quoted section through its closing quote. Doubled quotes are
/// escapes and stay inside the section.
fn copy_quoted(chars: &mut Peekable<Chars<'_>>, out: &mut String, quote: char) {
    while let Some(c) = chars.next() {
        out.push(c);
        if c == quote {
            if chars.peek() == Some(&quote) {
                out.push(quote);
                chars.next();
            } else {
                return;
            }
        }
    }
}

/// Copies an `E'...'` body through its closing quote. A backslash escapes
/// the next character.
fn copy_escaped(chars: &mut Peekable<Chars<'_>>, out: &mut String) {
    while let Some(c) = chars.next() {
        out.push(c);
        match c {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            }
            '\'' if chars.peek() == Some(&'\'') => {
                out.push('\'');
                chars.next();
            }
            '\'' => return,
            _ => {}
        }
    }
}

/// Tag of a dollar-quote opening at the current position (the `$` already
/// consumed): empty for `$$`, `None` when this is not an opening (`$1`).
fn dollar_tag(chars: &Peekable<Chars<'_>>) -> Option<String> {
    let mut ahead = chars.clone();
    let mut tag = String::new();
    loop {
        match ahead.next()? {
            '$' => return Some(tag),
            c if c.is_ascii_digit() && !tag.is_empty() => tag.push(c),
            c if c.is_ascii_alphabetic() || c == '_' => tag.push(c),
            _ => return None,
        }
    }
}

fn copy_dollar_quoted(chars: &mut Peekable<Chars<'_>>, out: &mut String, delimiter: &str) {
    let body_start = out.len();
    for c in chars.by_ref() {
        out.push(c);
        if out[body_start..].ends_with(delimiter) {
            return;
        }
    }
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Copies characters until `done(current, previous)` holds for the last one.
fn copy_until(chars: &mut Peekable<Chars<'_>>, out: &mut String, done: impl Fn(char, char) -> bool) {
    let mut last = '\0';
    for c in chars.by_ref() {
        out.push(c);
        if done(c, last) {
            return;
        }
        last = c;
    }
}

fn read_identifier(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut name = String::new();
    while let Some(&c) = chars.peek() {
        if c.is_ascii_alphanumeric() || c == '_' {
            name.push(c);
            chars.next();
        } else {
            break;
        }
    }
    name
}

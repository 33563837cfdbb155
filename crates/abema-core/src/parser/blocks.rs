//! JSON-LD block scanner
//!
//! Locates `<script type="application/ld+json">` elements by pattern and
//! exposes their raw contents. Field lookups inside a block go through
//! `serde_json` when the block is well formed, with a text-pattern fallback
//! for blocks that are not.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

static LD_JSON_SCRIPT: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r#"(?is)<script\b[^>]*\btype\s*=\s*["']?application/ld\+json["']?[^>]*>(.*?)</script\s*>"#,
    )
    .ok()
});

/// Scans an HTML document for JSON-LD blocks
///
/// The iterator is lazy and borrows from `html`; calling this again on the
/// same document yields the same sequence. A document without blocks yields
/// nothing.
pub fn scan_blocks(html: &str) -> impl Iterator<Item = &str> + '_ {
    LD_JSON_SCRIPT
        .as_ref()
        .into_iter()
        .flat_map(move |re| re.captures_iter(html))
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// A single JSON-LD block, parsed when possible
#[derive(Debug)]
pub struct Block<'a> {
    raw: &'a str,
    json: Option<Value>,
}

impl<'a> Block<'a> {
    pub fn parse(raw: &'a str) -> Self {
        Self {
            raw,
            json: serde_json::from_str(raw.trim()).ok(),
        }
    }

    /// Raw block text as found in the page
    pub fn raw(&self) -> &'a str {
        self.raw
    }

    /// True when the block parsed as JSON
    pub fn is_structured(&self) -> bool {
        self.json.is_some()
    }

    /// Whether the block contains the given key anywhere
    pub fn has_field(&self, key: &str) -> bool {
        match &self.json {
            Some(json) => contains_key(json, key),
            None => self.raw.contains(&format!("\"{}\"", key)),
        }
    }

    /// First string value stored under `key`, in document order
    pub fn first_string(&self, key: &str) -> Option<String> {
        match &self.json {
            Some(json) => find_first_string(json, key).map(str::to_string),
            None => raw_string_fields(self.raw, key).into_iter().next(),
        }
    }

    /// Every string value stored under `key`, in document order
    pub fn all_strings(&self, key: &str) -> Vec<String> {
        match &self.json {
            Some(json) => {
                let mut out = Vec::new();
                collect_strings(json, key, &mut out);
                out
            }
            None => raw_string_fields(self.raw, key),
        }
    }

    /// Whether the block declares the given `@type`
    ///
    /// Accepts a plain string or an array of types, and any spacing around
    /// the colon in unparsed blocks.
    pub fn has_type(&self, type_name: &str) -> bool {
        match &self.json {
            Some(json) => declares_type(json, type_name),
            None => {
                let pattern = format!(r#""@type"\s*:\s*"{}""#, regex::escape(type_name));
                Regex::new(&pattern)
                    .map(|re| re.is_match(self.raw))
                    .unwrap_or(false)
            }
        }
    }
}

fn declares_type(value: &Value, type_name: &str) -> bool {
    match value {
        Value::Object(map) => {
            let own = match map.get("@type") {
                Some(Value::String(t)) => t == type_name,
                Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some(type_name)),
                _ => false,
            };
            // Nested nodes count too (@graph, WebPage.breadcrumb, ...)
            own || map.values().any(|v| declares_type(v, type_name))
        }
        Value::Array(items) => items.iter().any(|item| declares_type(item, type_name)),
        _ => false,
    }
}

fn contains_key(value: &Value, key: &str) -> bool {
    match value {
        Value::Object(map) => map.contains_key(key) || map.values().any(|v| contains_key(v, key)),
        Value::Array(items) => items.iter().any(|v| contains_key(v, key)),
        _ => false,
    }
}

fn find_first_string<'v>(value: &'v Value, key: &str) -> Option<&'v str> {
    match value {
        Value::Object(map) => map.iter().find_map(|(k, v)| {
            if k == key
                && let Some(s) = v.as_str()
            {
                return Some(s);
            }
            find_first_string(v, key)
        }),
        Value::Array(items) => items.iter().find_map(|v| find_first_string(v, key)),
        _ => None,
    }
}

fn collect_strings(value: &Value, key: &str, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (k, v) in map {
                if k == key
                    && let Some(s) = v.as_str()
                {
                    out.push(s.to_string());
                }
                collect_strings(v, key, out);
            }
        }
        Value::Array(items) => {
            for v in items {
                collect_strings(v, key, out);
            }
        }
        _ => {}
    }
}

/// Text-pattern fallback for blocks that are not valid JSON
///
/// Values are the raw text between quotes with JSON escapes decoded on a
/// best-effort basis.
fn raw_string_fields(raw: &str, key: &str) -> Vec<String> {
    let pattern = format!(r#""{}"\s*:\s*"([^"]+)""#, regex::escape(key));
    let Ok(re) = Regex::new(&pattern) else {
        return Vec::new();
    };

    re.captures_iter(raw)
        .filter_map(|caps| caps.get(1))
        .map(|m| decode_json_escapes(m.as_str()))
        .collect()
}

/// Decodes the escape sequences found in a JSON string literal
///
/// `\n` becomes a newline and, when a `\u` marker is present, unicode escapes
/// are decoded (surrogate pairs included). If unicode decoding fails the
/// newline-replaced text is returned unchanged.
pub fn decode_json_escapes(value: &str) -> String {
    let replaced = value.replace("\\n", "\n");
    if !replaced.contains("\\u") {
        return replaced;
    }
    decode_unicode_escapes(&replaced).unwrap_or(replaced)
}

/// Strictly decodes `\uXXXX` and the simple backslash escapes
///
/// Returns `None` on a malformed or unpaired escape.
fn decode_unicode_escapes(value: &str) -> Option<String> {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }

        match chars.next()? {
            'u' => {
                let high = read_hex4(&mut chars)?;
                let code = if (0xD800..0xDC00).contains(&high) {
                    if chars.next()? != '\\' || chars.next()? != 'u' {
                        return None;
                    }
                    let low = read_hex4(&mut chars)?;
                    if !(0xDC00..0xE000).contains(&low) {
                        return None;
                    }
                    0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
                } else {
                    high
                };
                out.push(char::from_u32(code)?);
            }
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            '"' => out.push('"'),
            '/' => out.push('/'),
            '\\' => out.push('\\'),
            _ => return None,
        }
    }

    Some(out)
}

fn read_hex4(chars: &mut std::str::Chars<'_>) -> Option<u32> {
    let mut code = 0;
    for _ in 0..4 {
        code = code * 16 + chars.next()?.to_digit(16)?;
    }
    Some(code)
}

//! Front matter: the `---`-delimited key/value header at the top of a note.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

const DELIMITER: &str = "---";

/// Parsed front matter properties, in file order.
///
/// Array values (a value-less key followed by `- item` lines) are stored
/// joined with `", "` and written back as a list when they contain a comma.
/// Any comma-separated value is normalized to the same `", "` form on parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrontMatter {
    pub properties: IndexMap<String, String>,
}

impl FrontMatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }

    /// Files are enabled unless `enabled` is explicitly `false`
    pub fn is_enabled(&self) -> bool {
        self.get("enabled")
            .map(|v| !v.eq_ignore_ascii_case("false"))
            .unwrap_or(true)
    }

    pub fn is_automatic(&self) -> bool {
        self.get("automatic")
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    pub fn title(&self) -> Option<&str> {
        self.get("title").filter(|t| !t.is_empty())
    }

    pub fn tags(&self) -> Vec<String> {
        self.get("tags").map(split_list).unwrap_or_default()
    }

    /// Serialize as a `---` block terminated by a newline
    pub fn to_header(&self) -> String {
        let mut out = String::new();
        out.push_str(DELIMITER);
        out.push('\n');
        for (key, value) in &self.properties {
            if value.contains(',') {
                out.push_str(key);
                out.push_str(":\n");
                for item in split_list(value) {
                    out.push_str("  - ");
                    out.push_str(&item);
                    out.push('\n');
                }
            } else {
                out.push_str(&format!("{}: \"{}\"\n", key, value));
            }
        }
        out.push_str(DELIMITER);
        out.push('\n');
        out
    }
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end_matches('\r') == DELIMITER
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn unquote(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

/// Extract front matter from the leading lines of a file.
///
/// Returns the front matter and the index of the first line after the closing
/// delimiter, or `None` when the file has no complete front matter block.
pub fn extract(lines: &[&str]) -> Option<(FrontMatter, usize)> {
    if !lines.first().map(|l| is_delimiter(l)).unwrap_or(false) {
        return None;
    }
    let close = lines.iter().skip(1).position(|l| is_delimiter(l))? + 1;

    let mut front_matter = FrontMatter::new();
    let mut array_key: Option<String> = None;

    for raw in &lines[1..close] {
        let line = raw.trim();

        if let Some(key) = &array_key {
            if let Some(item) = line.strip_prefix('-') {
                let item = unquote(item.trim());
                let entry = front_matter.properties.entry(key.clone()).or_default();
                if !entry.is_empty() {
                    entry.push_str(", ");
                }
                entry.push_str(item);
                continue;
            }
        }

        let Some(colon) = line.find(':') else {
            array_key = None;
            continue;
        };
        let key = line[..colon].trim().to_string();
        let value = unquote(line[colon + 1..].trim()).to_string();

        array_key = if value.is_empty() { Some(key.clone()) } else { None };
        front_matter.properties.insert(key, value);
    }

    for value in front_matter.properties.values_mut() {
        if value.contains(',') {
            *value = split_list(value).join(", ");
        }
    }

    Some((front_matter, close + 1))
}

use url::Url;

use crate::model::Channel;

/// Display name used when neither the EXTINF title nor `tvg-name` is present.
const FALLBACK_NAME: &str = "Unknown Channel";

/// Parse raw M3U/M3U8 text into channels.
///
/// The scanner is line oriented and tolerant: the `#EXTM3U` header and any
/// unrecognized `#`-prefixed extension tags are skipped, and an `#EXTINF`
/// line with no following URL before end of input (or before the next
/// `#EXTINF`) is dropped without emitting a channel. Content with no valid
/// entries yields an empty vec, never an error.
pub fn parse(text: &str) -> Vec<Channel> {
    let mut channels = Vec::new();
    let mut pending: Option<PendingEntry> = None;

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("#EXTINF:") {
            // A new EXTINF replaces any dangling pending entry.
            pending = Some(PendingEntry::from_extinf(line));
        } else if line.starts_with('#') {
            continue;
        } else if let Some(entry) = pending.take() {
            match stream_url(line) {
                Some(url) => channels.push(entry.into_channel(url)),
                // Not a URL line; keep waiting for one.
                None => pending = Some(entry),
            }
        }
    }

    channels
}

/// Accept only lines that parse as absolute http/https URLs.
fn stream_url(line: &str) -> Option<String> {
    let parsed = Url::parse(line).ok()?;
    match parsed.scheme() {
        "http" | "https" => Some(line.to_string()),
        _ => None,
    }
}

struct PendingEntry {
    name: String,
    group: Option<String>,
    logo: Option<String>,
    tvg_id: Option<String>,
    tvg_name: Option<String>,
}

impl PendingEntry {
    fn from_extinf(line: &str) -> Self {
        let mut group = None;
        let mut logo = None;
        let mut tvg_id = None;
        let mut tvg_name = None;

        for (key, value) in quoted_attributes(line) {
            if value.is_empty() {
                continue;
            }
            match key.as_str() {
                "group-title" => group = Some(value),
                "tvg-logo" => logo = Some(value),
                "tvg-id" => tvg_id = Some(value),
                "tvg-name" => tvg_name = Some(value),
                _ => {}
            }
        }

        let name = display_name(line)
            .or_else(|| tvg_name.clone())
            .unwrap_or_else(|| FALLBACK_NAME.to_string());

        Self {
            name,
            group,
            logo,
            tvg_id,
            tvg_name,
        }
    }

    fn into_channel(self, url: String) -> Channel {
        Channel {
            name: self.name,
            url,
            group: self.group,
            logo: self.logo,
            tvg_id: self.tvg_id,
            tvg_name: self.tvg_name,
        }
    }
}

/// The display name is the text after the last comma that sits outside any
/// quoted attribute value. Returns `None` when that text is empty.
fn display_name(line: &str) -> Option<String> {
    let mut in_quotes = false;
    let mut last_comma = None;
    for (idx, c) in line.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => last_comma = Some(idx),
            _ => {}
        }
    }
    let idx = last_comma?;
    let name = line[idx + 1..].trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Scan `key="value"` pairs; keys are lowercased for case-insensitive
/// matching. Unquoted attributes (rare in the wild) are ignored.
fn quoted_attributes(line: &str) -> Vec<(String, String)> {
    let bytes = line.as_bytes();
    let mut attrs = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if !bytes[i].is_ascii_alphanumeric() {
            i += 1;
            continue;
        }
        let key_start = i;
        while i < bytes.len()
            && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'-' || bytes[i] == b'_')
        {
            i += 1;
        }
        if i + 1 >= bytes.len() || bytes[i] != b'=' || bytes[i + 1] != b'"' {
            continue;
        }
        let key = line[key_start..i].to_ascii_lowercase();
        i += 2;
        let value_start = i;
        while i < bytes.len() && bytes[i] != b'"' {
            i += 1;
        }
        // Unterminated quote: discard the fragment.
        if i >= bytes.len() {
            break;
        }
        attrs.push((key, line[value_start..i].to_string()));
        i += 1;
    }

    attrs
}

use std::fmt::Write;

use crate::model::Channel;

/// Serialize channels back to M3U text.
///
/// Output is a faithful inverse of [`crate::parse`] for populated fields:
/// attributes that were absent are not emitted at all (never as empty
/// strings), and values are written verbatim. Lines use `\n` endings.
pub fn serialize_playlist(channels: &[Channel]) -> String {
    let mut out = String::from("#EXTM3U\n");
    for channel in channels {
        let mut line = String::from("#EXTINF:-1");
        push_attr(&mut line, "tvg-id", channel.tvg_id.as_deref());
        push_attr(&mut line, "tvg-name", channel.tvg_name.as_deref());
        push_attr(&mut line, "tvg-logo", channel.logo.as_deref());
        push_attr(&mut line, "group-title", channel.group.as_deref());
        let _ = write!(line, ",{}", channel.name);
        out.push_str(&line);
        out.push('\n');
        out.push_str(&channel.url);
        out.push('\n');
    }
    out
}

fn push_attr(line: &mut String, key: &str, value: Option<&str>) {
    if let Some(value) = value {
        let _ = write!(line, " {key}=\"{value}\"");
    }
}

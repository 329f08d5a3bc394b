//! Rendering of collected videos for callers

use serde::Serialize;

use crate::error::Result;
use crate::types::Video;
use crate::url::Site;

/// A video as printed: the cache layout plus its absolute URL
#[derive(Debug, Serialize)]
struct VideoEntry<'a> {
    #[serde(flatten)]
    video: &'a Video,
    url: String,
}

/// Serializes `value` as pretty JSON with four-space indentation
pub fn to_json_pretty<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    // serde_json only ever emits UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Renders videos as a pretty JSON array, each with a `url` field
pub fn render_json(site: &Site, videos: &[Video]) -> Result<String> {
    let entries: Vec<VideoEntry> = videos
        .iter()
        .map(|video| VideoEntry {
            video,
            url: video.url(site),
        })
        .collect();
    to_json_pretty(&entries)
}

/// Renders one absolute video URL per line
pub fn render_urls(site: &Site, videos: &[Video]) -> String {
    videos
        .iter()
        .map(|v| v.url(site))
        .collect::<Vec<_>>()
        .join("\n")
}

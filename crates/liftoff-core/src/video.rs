//! Mission video links.
//!
//! Webcast URLs come from upstream data and are not trusted. Only YouTube
//! hosts are accepted, and only the video id is carried into the embed URL.

use url::Url;

const EMBED_BASE: &str = "https://www.youtube.com/embed/";

/// Convert a webcast URL into a YouTube embed URL.
///
/// Accepts `youtu.be/<id>` and `(www.)youtube.com/watch?v=<id>`; returns
/// `None` for anything else, including unparseable input.
pub fn youtube_embed_url(url: Option<&str>) -> Option<String> {
  let parsed = Url::parse(url?.trim()).ok()?;

  match parsed.host_str()? {
    "youtu.be" => {
      let id = parsed.path().trim_start_matches('/');
      (!id.is_empty()).then(|| format!("{EMBED_BASE}{id}"))
    }
    "www.youtube.com" | "youtube.com" => parsed
      .query_pairs()
      .find(|(k, _)| k == "v")
      .map(|(_, v)| v.into_owned())
      .filter(|v| !v.is_empty())
      .map(|id| format!("{EMBED_BASE}{id}")),
    _ => None,
  }
}

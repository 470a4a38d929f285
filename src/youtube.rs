use url::Url;

pub const DEFAULT_PLAYER_WIDTH: f32 = 560.0;
pub const DEFAULT_PLAYER_HEIGHT: f32 = 315.0;

pub fn embed_url(video_id: &str) -> String {
    format!("https://www.youtube.com/embed/{video_id}?enablejsapi=1")
}

pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

pub fn thumbnail_url(video_id: &str) -> String {
    format!("https://img.youtube.com/vi/{video_id}/hqdefault.jpg")
}

/// Best-effort local extraction of a video id from the common URL shapes.
///
/// The backend remains authoritative; this only drives the input hint.
pub fn video_id_from_url(input: &str) -> Option<String> {
    let url = Url::parse(input.trim()).ok()?;
    let host = url.host_str()?;
    let id = if host == "youtu.be" {
        url.path_segments()?.next().map(str::to_string)
    } else if host.ends_with("youtube.com") {
        if url.path() == "/watch" {
            url.query_pairs()
                .find(|(k, _)| k == "v")
                .map(|(_, v)| v.into_owned())
        } else {
            let mut segments = url.path_segments()?;
            match segments.next() {
                Some("embed") | Some("shorts") | Some("live") => segments.next().map(str::to_string),
                _ => None,
            }
        }
    } else {
        None
    };
    id.filter(|id| !id.is_empty())
}

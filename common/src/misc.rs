/// Adds `https://` when no scheme is given and guarantees a trailing slash.
pub fn normalize_site_url(raw: &str) -> String {
    let raw = raw.trim();
    let mut url = if raw.starts_with("http://") || raw.starts_with("https://") {
        raw.to_string()
    } else {
        format!("https://{}", raw)
    };
    if !url.ends_with('/') {
        url.push('/');
    }
    url
}

use rand::Rng;

/// Reduces a client-supplied name to its final path component. Both `/` and
/// `\` count as separators since the browser decides which one it sends.
pub fn sanitize(original: &str) -> String {
    let base = original
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or_default()
        .trim();
    match base {
        "" | "." | ".." => "file".to_string(),
        name => name.to_string(),
    }
}

/// `<millis>-<random 0..1e9>-<name>`.
pub fn unique_upload_name(original: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let nonce: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
    format!("{}-{}-{}", millis, nonce, sanitize(original))
}

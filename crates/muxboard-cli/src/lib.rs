use muxboard_api_client::Asset;

/// Whole-number upload percentage; an empty file counts as complete.
pub fn progress_percent(sent: u64, total: u64) -> u8 {
    if total == 0 {
        return 100;
    }
    ((sent.min(total) as u128 * 100) / total as u128) as u8
}

/// Build an asset title from a file name when none is given ("my_clip.mp4" -> "my_clip").
pub fn default_title(path: &std::path::Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "Untitled".to_string())
}

/// One tab-separated line per asset: id, status, duration (m:ss), title.
pub fn asset_row(asset: &Asset) -> String {
    let status = asset
        .tracked_status
        .map(|s| s.as_str().to_string())
        .unwrap_or_else(|| asset.status.clone());
    let title = if asset.title.is_empty() {
        "(untitled)"
    } else {
        asset.title.as_str()
    };
    format!(
        "{}\t{}\t{}\t{}",
        asset.id,
        status,
        asset.formatted_duration().unwrap_or_else(|| "-".to_string()),
        title
    )
}

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

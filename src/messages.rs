//! Texts sent to the recipient

/// Reply to `/start`
pub const WELCOME: &str = "📥 Welcome to the Batch Video Downloader Bot!\n\n\
    Send me a TXT file containing a list of mpd or m3u8 URLs (one per line), \
    and I will download each video stream and send it back to you.\n\n\
    ⚠️ Note: There are no file size limits on downloads. However, Telegram has \
    upload limits that may prevent very large files from being delivered.\n\n\
    Only the owner can use this bot.";

/// Reply to senders that fail the authorization check
pub const UNAUTHORIZED: &str = "❌ Unauthorized. You are not allowed to use this bot.";

/// Reply to an uploaded file without a `.txt` name
pub const NOT_A_TEXT_FILE: &str = "⚠️ Please send a file with .txt extension containing URLs.";

/// Reply to plain text that is not a command
pub const USAGE_HINT: &str = "❓ Please send a TXT file with mpd/m3u8 URLs or /start to begin.";

/// Reply when the input file cannot be fetched from the transport
pub const INPUT_UNAVAILABLE: &str = "⚠️ Could not read the file. Please try sending it again.";

/// Reply when the list contains no manifest URLs
pub const NO_VALID_URLS: &str =
    "❌ No valid mpd or m3u8 URLs found in the file.\nPlease check the file and try again.";

/// Sent once after the last item
pub const BATCH_COMPLETE: &str = "✅ All downloads processed.";

/// Sent once before the first item
pub fn batch_started(total: usize) -> String {
    format!("🔎 Found {total} valid URLs. Starting downloads...")
}

/// Per-item progress message
pub fn progress(index: usize, total: usize, url: &str) -> String {
    format!("⏳ Downloading ({index}/{total}):\n{url}")
}

/// Per-item transcode failure; the tool's diagnostic is deliberately absent
pub fn transcode_failed(url: &str) -> String {
    format!("❌ Failed to download or convert URL:\n{url}")
}

/// Per-item delivery failure including the transport's error
pub fn delivery_failed(index: usize, error: &str) -> String {
    format!("❌ Failed to send video {index}.\nError: {error}")
}

/// Caption attached to each delivered video
pub fn caption(index: usize, total: usize) -> String {
    format!("🎬 Video {index} of {total}")
}

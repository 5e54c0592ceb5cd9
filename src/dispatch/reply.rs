//! User-facing reply text. Every failure path in the pipeline answers with
//! one of these friendly messages, never a raw error.

pub fn welcome(limit: u32) -> String {
    format!(
        "Send me a file and I'll convert it!\n\nLimit: {limit} conversions per day."
    )
}

pub fn subscribe_prompt(channel_username: &str) -> String {
    format!(
        "Subscribe to the channel to use the bot:\nhttps://t.me/{channel_username}"
    )
}

pub fn quota_exhausted(channel_username: &str, limit: u32) -> String {
    format!(
        "Daily limit reached ({limit}/day). It resets tomorrow!\nChannel: https://t.me/{channel_username}"
    )
}

pub fn missing_document() -> &'static str {
    "Send a file to convert."
}

pub fn unsupported_file() -> &'static str {
    "That file type isn't supported. Send a PDF, DOCX, TXT, JPG, PNG, MP4 or MP3 file."
}

pub fn conversion_failed() -> &'static str {
    "Something went wrong. Try a different file."
}

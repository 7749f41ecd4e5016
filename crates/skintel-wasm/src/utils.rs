use chrono::{DateTime, Local, Utc};

/// Browser localStorage key holding the auth token set at login
pub const TOKEN_STORAGE_KEY: &str = "token";

/// Clock time of a message in the viewer's timezone
pub fn format_time(timestamp: &DateTime<Utc>) -> String {
    timestamp.with_timezone(&Local).format("%H:%M").to_string()
}

/// Escape HTML to prevent XSS
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Join `api_base` and `path` without doubling the slash
pub fn endpoint(api_base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        api_base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// The prompt sent when the user picks concerns instead of typing
pub fn concerns_prompt(concerns: &[String]) -> String {
    format!("Can you give me advice for: {}?", concerns.join(", "))
}

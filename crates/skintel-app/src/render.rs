use chrono::Local;
use colored::Colorize;
use skintel_types::{ChatMessage, ChatbotStatus, Sender};

/// One transcript line: `[14:02] You: ...`
pub fn format_message(msg: &ChatMessage) -> String {
    let time = msg.timestamp().with_timezone(&Local).format("%H:%M");
    let speaker = match msg.sender() {
        Sender::User => "You".bright_cyan().bold(),
        Sender::Bot => "Skintel".bright_green().bold(),
    };
    format!("{} {}: {}", format!("[{}]", time).bright_black(), speaker, msg.content())
}

pub fn print_message(msg: &ChatMessage) {
    println!("{}", format_message(msg));
}

pub fn print_transcript(messages: &[ChatMessage]) {
    println!("{}", "─".repeat(60).bright_black());
    for msg in messages {
        print_message(msg);
    }
    println!("{}", "─".repeat(60).bright_black());
}

pub fn format_status(status: &ChatbotStatus) -> String {
    let quota = &status.quota_status;
    let availability = if status.service_available {
        "available".green()
    } else {
        "unavailable".red()
    };

    let mut out = format!(
        "Chatbot: {}\nRequests: {} of {} used today, {} remaining",
        availability, quota.requests_made, quota.daily_limit, quota.requests_remaining
    );
    if quota.retry_after > 0 {
        out.push_str(&format!("\nRate limited: retry after {}s", quota.retry_after));
    }
    if let Some(reset) = &status.estimated_reset_time {
        out.push_str(&format!("\n{}", reset));
    }
    out
}

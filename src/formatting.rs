// src/formatting.rs

use crate::config::Config;
use crate::core::Attachment;

/// Label used for inline content when the attachment has no file name.
pub const DEFAULT_CONTENT_LABEL: &str = "Trace Logs";

/// Builds the outbound text of an alert.
///
/// The layout is shared by every platform; implementors only choose how
/// emphasis is written.
pub trait TextFormatter: Send + Sync {
    /// Wraps `text` in the platform's bold markers.
    fn emphasize(&self, text: &str) -> String;

    fn format_alert(&self, message: &str, attachment: Option<&Attachment>, config: &Config) -> String {
        let mut formatted = String::new();

        if let Some(header) = header_label(&config.service_name, &config.environment) {
            formatted.push_str(&self.emphasize(&format!("[{}]", header)));
            formatted.push('\n');
        }

        formatted.push_str(message);

        if let Some(attachment) = attachment {
            if !attachment.content.is_empty() {
                let label = if attachment.file_name.is_empty() {
                    DEFAULT_CONTENT_LABEL
                } else {
                    attachment.file_name.as_str()
                };
                formatted.push_str(&format!(
                    "\n\n{}\n```\n{}\n```",
                    self.emphasize(&format!("{}:", label)),
                    attachment.content
                ));
            }
            if !attachment.url.is_empty() {
                formatted.push_str(&format!(
                    "\n\n{} {}",
                    self.emphasize("Attachment:"),
                    attachment.url
                ));
            }
        }

        formatted
    }
}

fn header_label(service_name: &str, environment: &str) -> Option<String> {
    match (service_name.is_empty(), environment.is_empty()) {
        (false, false) => Some(format!("{} - {}", service_name, environment)),
        (false, true) => Some(service_name.to_string()),
        (true, false) => Some(environment.to_string()),
        (true, true) => None,
    }
}

/// Slack mrkdwn: `*bold*`.
pub struct SlackTextFormatter;

impl TextFormatter for SlackTextFormatter {
    fn emphasize(&self, text: &str) -> String {
        format!("*{}*", text)
    }
}

/// Lark markdown: `**bold**`.
pub struct LarkTextFormatter;

impl TextFormatter for LarkTextFormatter {
    fn emphasize(&self, text: &str) -> String {
        format!("**{}**", text)
    }
}

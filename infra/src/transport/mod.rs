//! Message transports
//!
//! Development transports that render the message and log it instead of
//! handing it to a provider. Production providers implement the same
//! [`vc_core::services::verification::ChannelTransport`] trait.

pub mod log_email;
pub mod log_sms;

pub use log_email::LogEmailTransport;
pub use log_sms::LogSmsTransport;

/// Placeholder replaced by the code in caller-supplied templates
pub const CODE_PLACEHOLDER: &str = "{code}";

/// Render the message body for `code`
///
/// A caller template without the placeholder gets the code appended, so the
/// recipient always receives it.
pub fn render_message(template: Option<&str>, code: &str, default_template: &str) -> String {
    let template = template
        .map(str::trim)
        .filter(|template| !template.is_empty())
        .unwrap_or(default_template);

    if template.contains(CODE_PLACEHOLDER) {
        template.replace(CODE_PLACEHOLDER, code)
    } else {
        format!("{} {}", template, code)
    }
}

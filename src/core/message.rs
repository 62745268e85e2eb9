//! Deferred diagnostic messages
//!
//! A `Message` is a format template plus an ordered argument list. It is
//! rendered only at the point a record is produced, so callers can hand a
//! prefix message to the error drainer without formatting it themselves.

use super::log_context::FieldValue;
use std::borrow::Cow;
use std::fmt;

/// Format template with `{}` placeholders and its arguments.
///
/// `{{` and `}}` render as literal braces. A placeholder with no matching
/// argument renders as `{}`; surplus arguments are ignored.
///
/// # Example
///
/// ```
/// use tls_log_adapter::tls_msg;
///
/// let msg = tls_msg!("Failed reading {} from {}", "certificate", "/etc/tls/server.pem");
/// assert_eq!(msg.render(), "Failed reading certificate from /etc/tls/server.pem");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    template: Cow<'static, str>,
    args: Vec<FieldValue>,
}

impl Message {
    pub fn new(template: impl Into<Cow<'static, str>>) -> Self {
        Self {
            template: template.into(),
            args: Vec::new(),
        }
    }

    /// Append the next positional argument
    #[must_use]
    pub fn arg(mut self, value: impl Into<FieldValue>) -> Self {
        self.args.push(value.into());
        self
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn args(&self) -> &[FieldValue] {
        &self.args
    }

    /// Substitute the arguments into the template
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.template.len() + self.args.len() * 8);
        let mut args = self.args.iter();
        let mut chars = self.template.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    out.push('{');
                }
                '{' if chars.peek() == Some(&'}') => {
                    chars.next();
                    match args.next() {
                        Some(arg) => out.push_str(&arg.to_string()),
                        None => out.push_str("{}"),
                    }
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    out.push('}');
                }
                other => out.push(other),
            }
        }

        out
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl From<&'static str> for Message {
    fn from(template: &'static str) -> Self {
        Message::new(template)
    }
}

impl From<String> for Message {
    fn from(template: String) -> Self {
        Message::new(template)
    }
}

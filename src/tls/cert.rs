//! Certificate chain trace

use super::drain::LogTarget;
use crate::core::{LogEntry, LogKind, LogLevel, Logger};
use std::panic::Location;

/// Longest subject kept in a chain line
pub const MAX_SUBJECT_LEN: usize = 1023;

/// What the chain trace needs to know about a certificate
pub trait CertificateInfo {
    /// Subject distinguished name on one line
    fn subject_oneline(&self) -> String;

    /// Public key algorithm, e.g. `RSA` or `EC`
    fn pkey_type(&self) -> &str;
}

/// Plain certificate description, for hosts that extract the fields up front
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateSummary {
    pub subject: String,
    pub pkey_type: String,
}

impl CertificateSummary {
    pub fn new(subject: impl Into<String>, pkey_type: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            pkey_type: pkey_type.into(),
        }
    }
}

impl CertificateInfo for CertificateSummary {
    fn subject_oneline(&self) -> String {
        self.subject.clone()
    }

    fn pkey_type(&self) -> &str {
        &self.pkey_type
    }
}

/// Log a certificate chain from the root down, ending with the leaf at `[0]`.
///
/// Lines are logged as `Debug` at `Lvl1`, so they pass whenever debugging is
/// on and disappear entirely when the process level (for `LogTarget::Global`)
/// or the request level (for `LogTarget::Request`) is `Off`.
///
/// Returns the number of lines that passed the debug gate.
///
/// # Example
///
/// ```
/// use tls_log_adapter::prelude::*;
/// use tls_log_adapter::tls::{log_certificate_chain, CertificateSummary};
///
/// let (memory, records) = MemoryAppender::new();
/// let logger = Logger::builder()
///     .debug_level(LogLevel::Lvl1)
///     .appender(memory)
///     .build();
///
/// let chain = [CertificateSummary::new("/CN=Example Root CA", "RSA")];
/// let leaf = CertificateSummary::new("/CN=radius.example.org", "EC");
/// log_certificate_chain(&logger, LogTarget::Global, &chain, &leaf);
///
/// assert_eq!(
///     records.messages(),
///     vec!["[1] RSA /CN=Example Root CA", "[0] EC /CN=radius.example.org"]
/// );
/// ```
#[track_caller]
pub fn log_certificate_chain<C>(
    logger: &Logger,
    target: LogTarget<'_>,
    chain: &[C],
    leaf: &C,
) -> usize
where
    C: CertificateInfo,
{
    let site = Location::caller();
    let lines = chain
        .iter()
        .enumerate()
        .rev()
        .map(|(i, cert)| (i + 1, cert))
        .chain(std::iter::once((0, leaf)));

    let mut logged = 0;
    for (index, cert) in lines {
        let mut subject = cert.subject_oneline();
        truncate_subject(&mut subject);

        let entry = LogEntry::new(
            LogKind::Debug,
            LogLevel::Lvl1,
            format!("[{}] {} {}", index, cert.pkey_type(), subject),
        )
        .with_site(site);

        let passed = match target {
            LogTarget::Global => logger.log_global_entry(entry),
            LogTarget::Request(request) => logger.log_request_entry(request, entry),
        };
        if passed {
            logged += 1;
        }
    }
    logged
}

fn truncate_subject(subject: &mut String) {
    if subject.len() <= MAX_SUBJECT_LEN {
        return;
    }
    let mut end = MAX_SUBJECT_LEN;
    while !subject.is_char_boundary(end) {
        end -= 1;
    }
    subject.truncate(end);
}

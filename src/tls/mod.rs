//! TLS library integration: log BIOs, error queue draining and chain traces

pub mod aggregator;
pub mod bio;
pub mod cert;
pub mod context;
pub mod drain;
pub mod error_buffer;
pub mod error_queue;
pub mod session;

pub use aggregator::{LineAggregator, Lines, LINE_TERMINATOR};
pub use bio::{BioId, BioWrite, Binding, Channel, LogBio};
pub use cert::{log_certificate_chain, CertificateInfo, CertificateSummary, MAX_SUBJECT_LEN};
pub use context::{ExecutionContext, ReleaseHook};
pub use drain::{ErrorDrainer, LogTarget, MAX_DESCRIPTION_LEN};
pub use error_buffer::ErrorBuffer;
pub use error_queue::{ErrorCode, ErrorQueue, ErrorRecord, MemoryErrorQueue};
pub use session::{IoOutcome, SessionError, TlsSession};

//! Integration tests for the TLS log adapter
//!
//! These tests verify:
//! - BIO writes reach appenders as whole lines
//! - Channel independence and rebind behavior
//! - Error drainer output modes
//! - Session I/O classification
//! - Context teardown and cross-thread isolation

use parking_lot::Mutex;
use std::io::Write;
use std::sync::Arc;
use tls_log_adapter::prelude::*;
use tls_log_adapter::tls::{
    log_certificate_chain, BioId, CertificateSummary, ErrorCode, ErrorRecord, MemoryErrorQueue,
};

fn capture(level: LogLevel) -> (Arc<Logger>, MemoryRecords) {
    let (memory, records) = MemoryAppender::new();
    let logger = Logger::builder()
        .debug_level(level)
        .appender(memory)
        .build_shared();
    (logger, records)
}

fn code(value: u64) -> ErrorCode {
    ErrorCode::new(value).expect("non-zero code")
}

fn queue_of(codes: &[u64]) -> MemoryErrorQueue {
    let mut queue = MemoryErrorQueue::new()
        .with_reason(code(0x0A00_0086), "certificate verify failed")
        .with_reason(code(0x0A00_0418), "tlsv1 alert unknown ca");
    for (i, value) in codes.iter().enumerate() {
        queue.push_error(code(*value), "ssl/statem/statem_srvr.c", 1000 + i as u32);
    }
    queue
}

// ============================================================================
// Log BIO
// ============================================================================

#[test]
fn test_fragmented_handshake_trace() {
    let (logger, records) = capture(LogLevel::Lvl2);
    let mut ctx = ExecutionContext::new();
    let bio = ctx.global_log_bio(&logger, LogKind::Debug, LogLevel::Lvl2);

    for fragment in [
        "SSL_accept: before SSL ",
        "initialization\nSSL_accept: SSLv3/TLS read client ",
        "hello\n",
        "\n",
        "SSL_accept: SSLv3/TLS write server hello\nSSL_acc",
    ] {
        assert_eq!(bio.bio_puts(fragment), fragment.len());
    }

    assert_eq!(
        records.messages(),
        vec![
            "SSL_accept: before SSL initialization",
            "SSL_accept: SSLv3/TLS read client hello",
            "SSL_accept: SSLv3/TLS write server hello",
        ]
    );
    assert_eq!(bio.aggregator().pending(), b"SSL_acc");
    assert_eq!(bio.aggregator().cursor(), 0);
}

#[test]
fn test_request_bio_uses_request_gate() {
    let (logger, records) = capture(LogLevel::Off);
    let verbose = Arc::new(RequestContext::new("req-verbose").with_debug_level(LogLevel::Lvl3));
    let quiet = Arc::new(RequestContext::new("req-quiet"));
    let mut ctx = ExecutionContext::new();

    ctx.request_log_bio(&logger, &verbose, LogKind::Debug, LogLevel::Lvl3)
        .bio_puts("verbose line\n");
    ctx.request_log_bio(&logger, &quiet, LogKind::Debug, LogLevel::Lvl3)
        .bio_puts("quiet line\n");
    ctx.request_log_bio(&logger, &quiet, LogKind::DebugErrorRequest, LogLevel::Lvl3)
        .bio_puts("error line\n");

    let entries = records.entries();
    let seen: Vec<(Option<&str>, &str)> = entries
        .iter()
        .map(|e| (e.request.as_deref(), e.message.as_str()))
        .collect();
    assert_eq!(
        seen,
        vec![
            (Some("req-verbose"), "verbose line"),
            (Some("req-quiet"), "error line"),
        ]
    );
}

#[test]
fn test_channels_do_not_share_buffers() {
    let (logger, records) = capture(LogLevel::Lvl1);
    let request = Arc::new(RequestContext::new("req-1").with_debug_level(LogLevel::Lvl1));
    let mut ctx = ExecutionContext::new();

    ctx.global_log_bio(&logger, LogKind::Debug, LogLevel::Lvl1)
        .bio_puts("global ");
    ctx.request_log_bio(&logger, &request, LogKind::Debug, LogLevel::Lvl1)
        .bio_puts("request ");

    assert_eq!(ctx.bio(Channel::Global).unwrap().aggregator().pending(), b"global ");
    assert_eq!(ctx.bio(Channel::Request).unwrap().aggregator().pending(), b"request ");
    assert!(records.is_empty());
}

#[test]
fn test_rebind_discards_partial_and_keeps_handle() {
    let (logger, records) = capture(LogLevel::Lvl4);
    let mut ctx = ExecutionContext::new();

    let first = ctx.global_log_bio(&logger, LogKind::Debug, LogLevel::Lvl1);
    let id = first.id();
    first.bio_puts("abandoned fragment");

    let second = ctx.global_log_bio(&logger, LogKind::DebugWarn, LogLevel::Lvl2);
    assert_eq!(second.id(), id);
    second.bio_puts("fresh line\n");

    let entries = records.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].message, "fresh line");
    assert_eq!(entries[0].kind, LogKind::DebugWarn);
    assert_eq!(entries[0].level, LogLevel::Lvl2);
    assert_eq!(ctx.metrics().partials_discarded(), 1);
}

#[test]
fn test_io_write_and_json_config() {
    let (logger, records) = capture(LogLevel::Lvl1);
    let config = AdapterConfig::from_json(r#"{ "initial_capacity": 8, "max_capacity": 16 }"#)
        .expect("valid config");
    let mut ctx = ExecutionContext::with_config(config).expect("valid context");
    let bio = ctx.global_log_bio(&logger, LogKind::Debug, LogLevel::Lvl1);

    writeln!(bio, "a line far longer than sixteen bytes").unwrap();
    writeln!(bio, "short").unwrap();

    assert_eq!(records.messages(), vec!["a line far long", "short"]);
    assert_eq!(ctx.metrics().lines_truncated(), 1);
    assert!(ctx.bio(Channel::Global).unwrap().aggregator().len() <= 16);
}

#[test]
fn test_missing_request_binding_is_an_error() {
    let (logger, _records) = capture(LogLevel::Lvl1);
    let mut ctx = ExecutionContext::new();

    let result = ctx.acquire(
        Channel::Request,
        tls_log_adapter::Binding::global(logger, LogKind::Debug, LogLevel::Lvl1),
    );
    assert!(matches!(result, Err(TlsLogError::MissingRequest { .. })));
}

// ============================================================================
// Error drainer
// ============================================================================

#[test]
fn test_drain_empty_without_prefix() {
    let (logger, records) = capture(LogLevel::Off);
    let drainer = ErrorDrainer::new(logger);
    let mut queue = queue_of(&[]);

    assert_eq!(drainer.drain_and_log(&mut queue, None, LogTarget::Global), 0);
    assert!(records.is_empty());
}

#[test]
fn test_drain_empty_with_prefix() {
    let (logger, records) = capture(LogLevel::Off);
    let drainer = ErrorDrainer::new(logger);
    let mut queue = queue_of(&[]);

    let drained =
        drainer.drain_and_log(&mut queue, Some(tls_msg!("X failed")), LogTarget::Global);

    assert_eq!(drained, 0);
    assert_eq!(records.messages(), vec!["X failed"]);
}

#[test]
fn test_drain_single_error_without_prefix() {
    let (logger, records) = capture(LogLevel::Off);
    let drainer = ErrorDrainer::new(logger);
    let mut queue = queue_of(&[0x0A00_0086]);

    assert_eq!(drainer.drain_and_log(&mut queue, None, LogTarget::Global), 1);
    assert_eq!(
        records.messages(),
        vec!["error:0A000086:lib(20)::certificate verify failed"]
    );
    assert!(!queue.peek_error());
}

#[test]
fn test_drain_multiple_errors_with_prefix() {
    let (logger, records) = capture(LogLevel::Off);
    let drainer = ErrorDrainer::new(logger);
    let mut queue = queue_of(&[0x0A00_0086, 0x0A00_0418]);

    let drained = drainer.drain_and_log(
        &mut queue,
        Some(tls_msg!("{} failed", "X")),
        LogTarget::Global,
    );

    assert_eq!(drained, 2);
    assert_eq!(
        records.messages(),
        vec![
            "X failed",
            "error:0A000086:lib(20)::certificate verify failed",
            "error:0A000418:lib(20)::tlsv1 alert unknown ca",
        ]
    );
    assert!(records.entries().iter().all(|e| e.kind == LogKind::Error));
}

#[test]
fn test_drain_verbose_multi_line() {
    let (logger, records) = capture(LogLevel::Lvl3);
    let drainer = ErrorDrainer::new(logger);
    let mut queue = queue_of(&[]);
    queue.push(ErrorRecord::new(code(0x0A00_0086), "statem_clnt.c", 1889));
    queue.push(ErrorRecord::new(code(5), "x509_vfy.c", 307).with_data("depth=2"));

    drainer.drain_and_log(&mut queue, None, LogTarget::Global);

    assert_eq!(
        records.messages(),
        vec![
            "statem_clnt.c[1889]:error:0A000086:lib(20)::certificate verify failed",
            "x509_vfy.c[307]:error:00000005:lib(0)::reason(5):depth=2",
        ]
    );
}

#[test]
fn test_verbosity_rules_are_configurable() {
    let (logger, records) = capture(LogLevel::Off);
    let config = AdapterConfig::default()
        .with_global_verbosity(VerbosityRule::Always)
        .with_request_verbosity(VerbosityRule::Never);
    let drainer = ErrorDrainer::from_config(logger, &config);
    let request = RequestContext::new("req-1").with_debug_level(LogLevel::Lvl4);

    drainer.drain_and_log(&mut queue_of(&[3]), None, LogTarget::Global);
    drainer.drain_and_log(&mut queue_of(&[3]), None, LogTarget::Request(&request));

    assert_eq!(
        records.messages(),
        vec![
            "ssl/statem/statem_srvr.c[1000]:error:00000003:lib(0)::reason(3)",
            "error:00000003:lib(0)::reason(3)",
        ]
    );
}

#[test]
fn test_clear_then_single_error_is_single_line() {
    let (logger, records) = capture(LogLevel::Off);
    let drainer = ErrorDrainer::new(logger);
    let mut queue = queue_of(&[1, 2, 3]);

    assert_eq!(ErrorDrainer::clear(&mut queue), 3);
    queue.push_error(code(0x0A00_0086), "ssl_lib.c", 12);

    let prefix = tls_msg!("Read failed");
    let drained = drainer.drain_and_log(&mut queue, Some(prefix), LogTarget::Global);
    assert_eq!(drained, 1);
    assert_eq!(
        records.messages(),
        vec!["Read failed: error:0A000086:lib(20)::certificate verify failed"]
    );
}

#[test]
fn test_drain_into_global_error_buffer() {
    let mut queue = queue_of(&[0x0A00_0086, 0x0A00_0418]);
    let buffer = ErrorBuffer::global();

    let drained = ErrorDrainer::drain_to_buffer(
        &mut queue,
        Some(tls_msg!("Failed loading {}", "/etc/tls/ca.pem")),
        buffer,
    );

    assert_eq!(drained, 2);
    assert_eq!(
        buffer.take(),
        vec![
            "Failed loading /etc/tls/ca.pem: error:0A000086:lib(20)::certificate verify failed",
            "error:0A000418:lib(20)::tlsv1 alert unknown ca",
        ]
    );
}

// ============================================================================
// Session classification
// ============================================================================

#[test]
fn test_want_read_logs_queue_then_continues() {
    let (logger, records) = capture(LogLevel::Off);
    let drainer = ErrorDrainer::new(logger);
    let request = RequestContext::new("req-5");
    let mut queue = queue_of(&[0x0A00_0418]);
    let session = |_ret: i32| SessionError::WantRead;

    let outcome = drainer.classify_io(
        &mut queue,
        &session,
        -1,
        Some(tls_msg!("Read failed")),
        LogTarget::Request(&request),
    );

    assert_eq!(outcome, IoOutcome::Continue);
    let entries = records.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].kind, LogKind::DebugErrorRequest);
    assert_eq!(
        entries[0].message,
        "Read failed: error:0A000418:lib(20)::tlsv1 alert unknown ca"
    );
    assert!(!queue.peek_error());
}

#[test]
fn test_syscall_is_fatal() {
    let (logger, records) = capture(LogLevel::Off);
    let drainer = ErrorDrainer::new(logger);
    let mut queue = queue_of(&[]);
    let session = |ret: i32| SessionError::from_code(if ret < 0 { 5 } else { 0 });

    let outcome = drainer.classify_io(&mut queue, &session, -1, None, LogTarget::Global);

    assert_eq!(outcome, IoOutcome::Fatal(SessionError::Syscall));
    assert_eq!(records.messages(), vec!["System call (I/O) error (-1)"]);
}

#[test]
fn test_protocol_error_with_queue() {
    let (logger, records) = capture(LogLevel::Off);
    let drainer = ErrorDrainer::new(logger);
    let mut queue = queue_of(&[0x0A00_0086, 0x0A00_0418]);
    let session = |_ret: i32| SessionError::Ssl;

    let outcome = drainer.classify_io(&mut queue, &session, 0, None, LogTarget::Global);

    assert!(outcome.is_fatal());
    assert_eq!(records.len(), 3);
    assert_eq!(records.messages()[2], "TLS protocol error (0)");
}

// ============================================================================
// Certificate chains
// ============================================================================

#[test]
fn test_certificate_chain_for_request() {
    let (logger, records) = capture(LogLevel::Off);
    let request = RequestContext::new("req-eap").with_debug_level(LogLevel::Lvl1);
    let chain = [
        CertificateSummary::new("/C=US/O=Example/CN=Example Intermediate", "RSA"),
        CertificateSummary::new("/C=US/O=Example/CN=Example Root", "RSA"),
    ];
    let leaf = CertificateSummary::new("/CN=client@example.org", "EC");

    let logged = log_certificate_chain(&logger, LogTarget::Request(&request), &chain, &leaf);

    assert_eq!(logged, 3);
    let entries = records.entries();
    assert!(entries.iter().all(|e| e.request.as_deref() == Some("req-eap")));
    assert_eq!(entries[0].message, "[2] RSA /C=US/O=Example/CN=Example Root");
    assert_eq!(entries[2].message, "[0] EC /CN=client@example.org");
}

// ============================================================================
// Lifecycle and threads
// ============================================================================

#[test]
fn test_teardown_releases_each_bio_once() {
    let (logger, _records) = capture(LogLevel::Lvl1);
    let released: Arc<Mutex<Vec<(Channel, BioId)>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = released.clone();
    let request = Arc::new(RequestContext::new("req-1"));

    let mut ctx = ExecutionContext::new().with_release_hook(Arc::new(
        move |channel: Channel, id: BioId| sink.lock().push((channel, id)),
    ));
    for _ in 0..3 {
        ctx.global_log_bio(&logger, LogKind::Debug, LogLevel::Lvl1);
        ctx.request_log_bio(&logger, &request, LogKind::Debug, LogLevel::Lvl1);
    }
    let metrics = ctx.metrics().clone();
    drop(ctx);

    let released = released.lock();
    assert_eq!(released.len(), 2);
    assert_eq!(metrics.bios_created(), 2);
    assert_eq!(metrics.bios_released(), 2);
}

#[test]
fn test_thread_contexts_are_isolated() {
    let (logger, records) = capture(LogLevel::Lvl1);

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let logger = logger.clone();
            std::thread::spawn(move || {
                ExecutionContext::with_current(|ctx| {
                    let bio = ctx.global_log_bio(&logger, LogKind::Debug, LogLevel::Lvl1);
                    for i in 0..25 {
                        bio.bio_puts(&format!("thread-{} ", t));
                        bio.bio_puts(&format!("line-{}\n", i));
                    }
                    bio.id()
                })
                .expect("context available")
            })
        })
        .collect();

    let mut ids: Vec<BioId> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 4);

    let messages = records.messages();
    assert_eq!(messages.len(), 100);
    for t in 0..4 {
        let prefix = format!("thread-{} line-", t);
        let lines: Vec<&String> = messages.iter().filter(|m| m.starts_with(&prefix)).collect();
        assert_eq!(lines.len(), 25);
        for (i, line) in lines.iter().enumerate() {
            assert_eq!(**line, format!("{}{}", prefix, i));
        }
    }
}

#[test]
fn test_panicking_appender_does_not_break_bio() {
    struct Exploding;

    impl Appender for Exploding {
        fn append(&mut self, _entry: &LogEntry) -> Result<()> {
            panic!("appender exploded");
        }

        fn flush(&mut self) -> Result<()> {
            Ok(())
        }

        fn name(&self) -> &str {
            "exploding"
        }
    }

    let (memory, records) = MemoryAppender::new();
    let logger = Logger::builder()
        .debug_level(LogLevel::Lvl1)
        .appender(Exploding)
        .appender(memory)
        .build_shared();
    let mut ctx = ExecutionContext::new();

    let bio = ctx.global_log_bio(&logger, LogKind::Debug, LogLevel::Lvl1);
    assert_eq!(bio.bio_puts("survives\n"), 9);

    assert_eq!(records.messages(), vec!["survives"]);
    assert_eq!(logger.dropped_count(), 1);
}

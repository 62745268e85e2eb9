//! Trace BIO example
//!
//! Simulates a TLS library writing handshake trace output in fragments,
//! raising queued errors and returning I/O results, and shows what reaches
//! the console.
//!
//! Run with: cargo run --example trace_bio

use std::sync::Arc;
use tls_log_adapter::prelude::*;
use tls_log_adapter::tls::{log_certificate_chain, CertificateSummary, ErrorCode, MemoryErrorQueue};

fn main() -> Result<()> {
    println!("=== TLS Log Adapter - Trace BIO Example ===\n");

    let config = AdapterConfig::from_json(
        r#"{ "request_verbosity": { "rule": "request_or_process", "level": "lvl2" } }"#,
    )?;

    let logger = Logger::builder()
        .debug_level(LogLevel::Lvl2)
        .appender(ConsoleAppender::new().with_location(true))
        .build_shared();

    let request = Arc::new(
        RequestContext::new("eap-tls-17")
            .with_debug_level(LogLevel::Lvl3)
            .with_field("peer", "198.51.100.23"),
    );

    println!("1. Fragmented handshake trace:");
    let mut ctx = ExecutionContext::with_config(config.clone())?;
    {
        let bio = ctx.request_log_bio(&logger, &request, LogKind::Debug, LogLevel::Lvl3);
        for fragment in [
            "SSL_accept: before SSL initial",
            "ization\nSSL_accept: SSLv3/TLS read client hello\nSSL_accept: SSLv3/",
            "TLS write server hello\n\n",
        ] {
            bio.bio_puts(fragment);
        }
    }

    println!("\n2. Certificate chain:");
    let chain = [CertificateSummary::new("/O=Example/CN=Example Root CA", "RSA")];
    let leaf = CertificateSummary::new("/CN=supplicant@example.org", "EC");
    log_certificate_chain(&logger, LogTarget::Request(&request), &chain, &leaf);

    println!("\n3. Error queue drain on a failed read:");
    let drainer = ErrorDrainer::from_config(logger.clone(), &config);
    let mut queue = MemoryErrorQueue::new();
    if let Some(code) = ErrorCode::new(0x0A00_0418) {
        queue.push_error(code, "ssl/record/rec_layer_s3.c", 1584);
    }
    if let Some(code) = ErrorCode::new(0x0A00_0086) {
        queue.push_error(code, "ssl/statem/statem_srvr.c", 3527);
    }

    let session = |ret: i32| {
        if ret < 0 {
            SessionError::Ssl
        } else {
            SessionError::WantRead
        }
    };
    let outcome = drainer.classify_io(
        &mut queue,
        &session,
        -1,
        Some(tls_msg!("Failed reading from {}", "198.51.100.23")),
        LogTarget::Request(&request),
    );
    println!("   outcome: {:?}", outcome);

    println!("\n4. Error buffer for the configuration loader:");
    if let Some(code) = ErrorCode::new(0x0080_0002) {
        queue.push_error(code, "crypto/bio/bss_file.c", 67);
    }
    ErrorDrainer::drain_to_buffer(
        &mut queue,
        Some(tls_msg!("Failed reading {}", "/etc/raddb/certs/ca.pem")),
        ErrorBuffer::global(),
    );
    for message in ErrorBuffer::global().take() {
        println!("   {}", message);
    }

    let metrics = ctx.metrics().clone();
    drop(ctx);
    println!(
        "\nBIOs created: {}, released: {}, lines: {}",
        metrics.bios_created(),
        metrics.bios_released(),
        metrics.lines_emitted()
    );

    logger.flush()?;
    Ok(())
}

use sevlog_core::{
    InitOptions, SeverityLogger, SeverityMask, ThreadLocalBuffer, sev_dbg, sev_err, sev_inf,
    sev_wng,
};

// Drives the engine directly, without the `log` facade: a lock-free
// thread-local buffer, caller attribution, and syslog forwarding left
// off.
fn main() {
    let logger = SeverityLogger::with_strategy(ThreadLocalBuffer::new());
    logger
        .init(InitOptions {
            buffer_size: 1000,
            mask: SeverityMask::ALL,
            timestamp: true,
            caller: true,
            thread_id: true,
            syslog: false,
        })
        .expect("logger init failed");

    sev_inf!(logger, "hello, {}", "world").unwrap();
    sev_wng!(logger, "multi-line payloads\nbecome independent records").unwrap();
    sev_dbg!(logger, "debug is enabled by the ALL mask").unwrap();

    logger.set_mask(SeverityMask::ERR);
    assert!(sev_inf!(logger, "masked out").is_err());
    sev_err!(logger, "errors always pass this mask").unwrap();

    logger.cleanup();
}

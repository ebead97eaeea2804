use fleetdesk_logger::{LevelFilter, Logger, LoggerError};

#[test]
fn second_init_reports_subscriber_error() {
    let logger = Logger::builder()
        .name("fleetdesk-init-twice")
        .level(LevelFilter::INFO)
        .init()
        .expect("first init should succeed");
    assert!(!logger.has_file_output(), "console-only logger has no file writer");

    let err = Logger::builder()
        .name("fleetdesk-init-twice-again")
        .level(LevelFilter::INFO)
        .init()
        .expect_err("second init should fail");

    assert!(matches!(err, LoggerError::Subscriber { .. }));
    assert_eq!(err.kind(), "Subscriber");
}

//! Configuration tests - defaults, builders and JSON route tables.

use proptest::prelude::*;

use crate::logging::DEFAULT_REDACTION_REPLACEMENT;
use crate::{CallLogError, LogLevel, LogOptions, PayloadCategory, RouteLogConfig};

const CATEGORIES: [PayloadCategory; 4] = [
    PayloadCategory::UnaryRequest,
    PayloadCategory::UnaryResponse,
    PayloadCategory::StreamIn,
    PayloadCategory::StreamOut,
];

#[test]
fn test_route_config_defaults_log_everything() {
    let config = RouteLogConfig::default();
    assert!(!config.omit_request_metadata);
    for category in CATEGORIES {
        assert!(!config.omits_payload(category));
        assert!(config.redacted_keys(category).is_empty());
    }
}

#[test]
fn test_log_options_defaults() {
    let options = LogOptions::default_options();
    assert!(options.log_configurations.is_empty());
    assert_eq!(options.redaction_replacement, DEFAULT_REDACTION_REPLACEMENT);
    assert_eq!(options.level, LogLevel::Info);
    assert_eq!(options, LogOptions::new());
}

#[test]
fn test_route_config_builders() {
    let config = RouteLogConfig::new()
        .omit_request_metadata(true)
        .omit_payload(PayloadCategory::StreamOut, true)
        .redact_keys(PayloadCategory::UnaryRequest, ["password"])
        .redact_keys(PayloadCategory::UnaryRequest, vec!["otp".to_string()]);

    assert!(config.omit_request_metadata);
    assert!(config.omit_stream_out_msg_payload);
    assert!(config.omits_payload(PayloadCategory::StreamOut));
    assert!(!config.omits_payload(PayloadCategory::StreamIn));
    assert_eq!(
        config.redacted_keys(PayloadCategory::UnaryRequest),
        &["password".to_string(), "otp".to_string()]
    );
}

#[test]
fn test_route_lookup_is_exact() {
    let options = LogOptions::new()
        .route("/a.A/Get", RouteLogConfig::new().omit_request_metadata(true))
        .with_redaction_replacement("***")
        .with_level(LogLevel::Warn);

    assert!(options.route_config("/a.A/Get").is_some());
    assert!(options.route_config("/a.A/get").is_none());
    assert!(options.route_config("/a.A/Get/").is_none());
    assert_eq!(options.redaction_replacement, "***");
    assert_eq!(options.level, LogLevel::Warn);
}

#[test]
fn test_route_replaces_previous_entry() {
    let options = LogOptions::new()
        .route("/a.A/Get", RouteLogConfig::new().omit_request_metadata(true))
        .route("/a.A/Get", RouteLogConfig::new());
    assert_eq!(options.route_config("/a.A/Get"), Some(&RouteLogConfig::default()));
}

#[test]
fn test_from_json_uses_camel_case_names() {
    let options = LogOptions::from_json(
        r#"{
            "logConfigurations": {
                "/auth.Auth/Login": {
                    "omitRequestMetadata": true,
                    "omitUnaryRequestPayloadKeys": ["password"],
                    "omitUnaryResponsePayload": true
                },
                "/chat.Chat/Talk": {
                    "omitStreamInMsgPayload": true,
                    "omitStreamOutMsgPayloadKeys": ["token"]
                }
            },
            "redactionReplacement": "[hidden]",
            "level": "debug"
        }"#,
    )
    .unwrap();

    let login = options.route_config("/auth.Auth/Login").unwrap();
    assert!(login.omit_request_metadata);
    assert!(login.omit_unary_response_payload);
    assert_eq!(login.redacted_keys(PayloadCategory::UnaryRequest), &["password".to_string()]);

    let talk = options.route_config("/chat.Chat/Talk").unwrap();
    assert!(talk.omits_payload(PayloadCategory::StreamIn));
    assert_eq!(talk.redacted_keys(PayloadCategory::StreamOut), &["token".to_string()]);
    assert!(!talk.omit_request_metadata);

    assert_eq!(options.redaction_replacement, "[hidden]");
    assert_eq!(options.level, LogLevel::Debug);
}

#[test]
fn test_from_json_fills_missing_fields() {
    let options = LogOptions::from_json("{}").unwrap();
    assert_eq!(options, LogOptions::default_options());
}

#[test]
fn test_from_json_rejects_malformed_input() {
    let error = LogOptions::from_json(r#"{ "logConfigurations": [] }"#).unwrap_err();
    assert!(matches!(error, CallLogError::Config(_)));
    assert_eq!(error.kind(), "config");
    assert!(error.to_string().starts_with("invalid log configuration"));
}

#[test]
fn test_log_level_filtering() {
    assert!(LogLevel::Info.should_log(LogLevel::Info));
    assert!(LogLevel::Info.should_log(LogLevel::Error));
    assert!(!LogLevel::Info.should_log(LogLevel::Debug));
    assert!(LogLevel::Error.should_log(LogLevel::Error));
    assert!(!LogLevel::Error.should_log(LogLevel::Info));
    assert!(!LogLevel::Off.should_log(LogLevel::Error));
}

proptest! {
    /// Options survive a JSON round trip through their camelCase form.
    #[test]
    fn prop_options_json_round_trip(
        omit in any::<[bool; 5]>(),
        keys in prop::collection::vec("[a-z_]{1,10}", 0..4),
        path in "/[a-z]{1,6}\\.[A-Z][a-z]{1,6}/[A-Z][a-z]{1,8}",
    ) {
        let mut config = RouteLogConfig::new().omit_request_metadata(omit[0]);
        for (category, omit) in CATEGORIES.into_iter().zip(&omit[1..]) {
            config = config
                .omit_payload(category, *omit)
                .redact_keys(category, keys.iter().cloned());
        }
        let options = LogOptions::new().route(path, config);

        let json = serde_json::to_string(&options).unwrap();
        prop_assert_eq!(LogOptions::from_json(&json).unwrap(), options);
    }
}

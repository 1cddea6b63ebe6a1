//! Record and sink tests - flat field layout and the channel sink.

use serde_json::json;

use crate::logging::{MSG_CALL_FAILED, MSG_STREAM_SENT, MockSink};
use crate::{
    CallContext, CallError, CallInfo, CallLogger, CallShape, ChannelSink, Direction, JsonSink,
    LogLevel, LogOptions, LogRecord, LogSink, Metadata, MethodDescriptor, TracingSink,
};
use crate::tests::support::MockCall;

fn info() -> CallInfo {
    CallInfo {
        correlation_id: Some("req-1".into()),
        path: "/Svc/Get".into(),
        call_type: CallShape::Unary,
    }
}

#[test]
fn test_start_record_fields_are_flat() {
    let metadata = Metadata::new().with("x-tenant", "acme");
    let record = LogRecord::start(info(), Some(metadata), Some(json!({ "id": 7 })));

    assert_eq!(
        serde_json::Value::Object(record.to_fields()),
        json!({
            "message": "Start handling call",
            "correlation_id": "req-1",
            "path": "/Svc/Get",
            "call_type": "unary",
            "event": "start",
            "metadata": { "x-tenant": "acme" },
            "payload": { "id": 7 }
        })
    );
}

#[test]
fn test_failed_finish_fields() {
    let record = LogRecord::failed(
        info(),
        12,
        CallError::invalid_argument("bad id").with_details(json!({ "field": "id" })),
    );
    let fields = record.to_fields();

    assert_eq!(fields["message"], MSG_CALL_FAILED);
    assert_eq!(fields["event"], "finish");
    assert_eq!(fields["took_ms"], 12);
    assert_eq!(
        fields["error"],
        json!({ "code": "INVALID_ARGUMENT", "message": "bad id", "details": { "field": "id" } })
    );
    assert!(!fields.contains_key("payload"));
}

#[test]
fn test_stream_record_fields() {
    let mut info = info();
    info.correlation_id = None;
    info.call_type = CallShape::BidiStream;

    let message = LogRecord::stream_message(info.clone(), Direction::Out, None);
    assert_eq!(message.message, MSG_STREAM_SENT);
    assert_eq!(
        serde_json::Value::Object(message.to_fields()),
        json!({
            "message": "Sent message to peer via stream",
            "path": "/Svc/Get",
            "call_type": "bidi_stream",
            "event": "stream_message",
            "direction": "out"
        })
    );

    let end = LogRecord::stream_end(info, Direction::In, Some(CallError::cancelled("bye")));
    let fields = end.to_fields();
    assert_eq!(fields["message"], "Inbound stream failed");
    assert_eq!(fields["direction"], "in");
    assert_eq!(fields["error"]["code"], "CANCELLED");
}

#[test]
fn test_failure_notice_fields() {
    let record = LogRecord::failure(info(), "payload_conversion", "not serializable");
    let fields = record.to_fields();
    assert_eq!(fields["event"], "failure");
    assert_eq!(fields["stage"], "payload_conversion");
    assert_eq!(fields["error"], "not serializable");
    assert_eq!(fields["message"], "Call logging failed");
}

#[test]
fn test_context_info_and_elapsed() {
    let started = std::time::Instant::now();
    let context = CallContext::new("/Svc/Get", CallShape::Unary, None, started);

    assert_eq!(context.path(), "/Svc/Get");
    assert_eq!(context.shape(), CallShape::Unary);
    assert!(context.correlation_id().is_none());
    assert_eq!(context.info().path, "/Svc/Get");
    assert_eq!(
        context.elapsed_ms(started + std::time::Duration::from_millis(1_500)),
        1_500
    );
}

#[test]
fn test_builtin_sinks_do_not_panic_without_subscriber() {
    let record = LogRecord::finished(info(), 3, Some(json!({ "ok": true })));
    for level in [LogLevel::Trace, LogLevel::Info, LogLevel::Error, LogLevel::Off] {
        TracingSink.emit(&record, level);
        JsonSink.emit(&record, level);
    }
}

#[tokio::test]
async fn test_channel_sink_forwards_to_drain() {
    let (sink, drain) = ChannelSink::new(16);
    let target = MockSink::new();
    let task = tokio::spawn(drain.run(target.clone()));

    let logger = CallLogger::with_sink(LogOptions::default_options(), sink.clone());
    let mut call = MockCall::new(MethodDescriptor::unary("/Svc/Get")).with_request(json!({ "id": 1 }));
    logger.intercept(call.service_call(), || {});
    call.respond(&json!({ "id": 1 }));

    // The drain ends once every sender is gone.
    drop(logger);
    drop(call);
    drop(sink);
    task.await.unwrap();

    let events: Vec<_> = target.records().iter().map(|r| r.event()).collect();
    assert_eq!(events, vec!["start", "finish"]);
}

#[test]
fn test_channel_sink_drops_when_full() {
    let (sink, mut drain) = ChannelSink::new(2);
    let record = LogRecord::start(info(), None, None);

    for _ in 0..5 {
        sink.emit(&record, LogLevel::Info);
    }
    assert_eq!(sink.dropped(), 3);

    let target = MockSink::new();
    assert_eq!(drain.flush_into(&target), 2);
    assert_eq!(target.len(), 2);

    // Space is available again after the flush.
    sink.emit(&record, LogLevel::Info);
    assert_eq!(drain.flush_into(&target), 1);
    assert_eq!(sink.dropped(), 3);
}

#[test]
fn test_channel_sink_counts_closed_drain() {
    let (sink, drain) = ChannelSink::new(4);
    drop(drain);

    sink.emit(&LogRecord::start(info(), None, None), LogLevel::Info);
    assert_eq!(sink.dropped(), 1);
}

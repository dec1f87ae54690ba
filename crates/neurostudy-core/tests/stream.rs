use neurostudy_core::stream::{FAILURE_NOTICE, StreamEvent, accumulate};

#[test]
fn fragment_is_framed_as_data_line() {
    let line = StreamEvent::fragment("Photo").to_line().unwrap();
    assert_eq!(line, "data: {\"content\":\"Photo\"}\n");
}

#[test]
fn done_is_framed_as_sentinel() {
    assert_eq!(StreamEvent::Done.to_line().unwrap(), "data: [DONE]\n");
}

#[test]
fn framing_escapes_newlines_and_quotes() {
    let line = StreamEvent::fragment("a \"quoted\"\nline").to_line().unwrap();
    assert_eq!(line, "data: {\"content\":\"a \\\"quoted\\\"\\nline\"}\n");
    assert_eq!(line.matches('\n').count(), 1);
}

#[test]
fn accumulate_skips_done() {
    let events = vec![
        StreamEvent::fragment("Photo"),
        StreamEvent::fragment("synthesis is..."),
        StreamEvent::Done,
    ];
    assert_eq!(accumulate(&events), "Photosynthesis is...");
}

#[test]
fn failure_notice_literal() {
    assert_eq!(FAILURE_NOTICE, "Uplink Failure: System Offline.");
}

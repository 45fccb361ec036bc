//! Event and log callbacks as seen by a host.
//!
//! The callbacks are process-wide, so everything lives in one test to keep
//! parallel tests from replacing each other's callback.

use std::sync::{Arc, Mutex};

use termline::ansi::AnsiWriter;
use termline::edit::EditorConfig;
use termline::event::{clear_event_callback, clear_log_callback};
use termline::{LogLevel, Session, set_event_callback, set_log_callback};

#[test]
fn test_session_reports_events_and_logs() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let logs = Arc::new(Mutex::new(Vec::new()));
    {
        let events = Arc::clone(&events);
        set_event_callback(move |name, data| {
            events.lock().unwrap().push(format!("{name}:{data}"));
        });
        let logs = Arc::clone(&logs);
        set_log_callback(move |level, message| {
            logs.lock().unwrap().push((level, message.to_string()));
        });
    }

    let mut session = Session::new(AnsiWriter::new(Vec::new(), 80, 24), EditorConfig::default());
    session.handle_input(b"north\r").unwrap();
    session.notify_resize(100, 30);
    session.poll().unwrap();
    session.load(&mut &b"#frobnicate now\n"[..]).unwrap();

    clear_event_callback();
    clear_log_callback();

    let events = events.lock().unwrap();
    assert_eq!(*events, ["line-submitted:5", "resize:100x30"]);

    let logs = logs.lock().unwrap();
    assert!(logs.iter().all(|(level, _)| *level == LogLevel::Debug));
    assert!(logs.iter().any(|(_, m)| m.contains("resize")));
    assert!(logs.iter().any(|(_, m)| m.contains("frobnicate")));
}

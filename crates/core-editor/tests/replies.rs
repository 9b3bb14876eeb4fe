//! Cursor-position replies: prompt-row anchoring and type-ahead recovery.

mod common;

use common::*;

#[test]
fn reply_moves_the_prompt_anchor() {
    let mut repl = engine(80, 24);
    assert_eq!(repl.prompt_row(), 0);
    repl.handle_message(b"\x1b[12;1R").unwrap();
    assert_eq!(repl.prompt_row(), 11);
}

#[test]
fn reply_rows_clamp_to_the_terminal() {
    let mut repl = engine(80, 24);
    repl.handle_message(b"\x1b[99;1R").unwrap();
    assert_eq!(repl.prompt_row(), 23);
}

#[test]
fn malformed_replies_leave_state_alone() {
    let mut repl = engine(80, 24);
    repl.handle_message(b"\x1b[12;1R").unwrap();
    repl.handle_message(b"\x1b[nonsenseR").unwrap();
    assert_eq!(repl.prompt_row(), 11);
}

#[test]
fn type_ahead_before_the_reply_is_inserted() {
    // Keystrokes during a blocked evaluate arrive in one message with the
    // trailing cursor-position reply.
    let mut repl = engine(80, 24);
    repl.handle_message(b"abc\x1b[5;3R").unwrap();
    assert_eq!(repl.buffer(), b"abc");
    assert_eq!(repl.cursor(), 3);
    assert_eq!(repl.prompt_row(), 4);
}

#[test]
fn type_ahead_filters_control_bytes() {
    let mut repl = engine(80, 24);
    repl.handle_message(b"a\x07b\x1b[5;3R").unwrap();
    assert_eq!(repl.buffer(), b"ab");
}

#[test]
fn reply_repaints_the_status_row() {
    let mut repl = engine(80, 24);
    let before = output_len(&repl);
    repl.handle_message(b"\x1b[4;1R").unwrap();
    // Status repaint = highlight + reset around the bottom-row write.
    let tail = output_since(&repl, before);
    assert!(tail.contains("\x1b[48;5;247m"));
    assert!(tail.contains("\x1b[0m"));
    assert!(tail.contains("\x1b[24;1H"));
}

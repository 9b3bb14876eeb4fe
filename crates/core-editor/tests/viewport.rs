//! Overflow windowing: the buffer taller than the inner area stays anchored
//! around the cursor, and the status bar names the visible edge.

mod common;

use common::*;
use core_text::rendered_height;

const PROMPT_LEN: usize = 2; // "> "

fn assert_window_invariants(repl: &TestRepl, width: usize, inner: usize) {
    let len = repl.buffer().len();
    let cursor = repl.cursor();
    assert!(cursor <= len, "cursor {cursor} out of range 0..={len}");
    let (start, end) = repl.view_range();
    let over = rendered_height(repl.buffer(), PROMPT_LEN, width) > inner;
    if over {
        let end = end.expect("overflow must window the buffer").min(len);
        assert!(start <= cursor, "cursor left of window: {start} > {cursor}");
        assert!(cursor <= end, "cursor right of window: {cursor} > {end}");
        assert!(
            rendered_height(&repl.buffer()[start..end], PROMPT_LEN, width) <= inner,
            "window taller than the inner area"
        );
    } else {
        assert_eq!(start, 0);
        assert!(end.is_none() || end == Some(len));
    }
}

#[test]
fn long_input_windows_around_the_cursor() {
    // 10 columns, 4 rows, status visible: 3 inner rows.
    let mut repl = engine(10, 4);
    for _ in 0..30 {
        repl.handle_message(&[b'a']).unwrap();
        assert_window_invariants(&repl, 10, 3);
    }
    assert_eq!(repl.buffer().len(), 30);
    assert_eq!(repl.cursor(), 30);
    let (start, end) = repl.view_range();
    assert!(start > 0, "suffix view starts past the buffer head");
    assert_eq!(end, Some(30));
}

#[test]
fn jump_to_start_shows_the_prefix() {
    let mut repl = engine(10, 4);
    type_str(&mut repl, &"a".repeat(30));
    let before = output_len(&repl);
    repl.handle_message(&[1]).unwrap(); // Ctrl-A
    assert_window_invariants(&repl, 10, 3);
    let (start, end) = repl.view_range();
    assert_eq!(start, 0);
    assert!(end.unwrap_or(30) < 30, "tail must be hidden");
    assert!(output_since(&repl, before).contains("Start"));
}

#[test]
fn jump_to_end_shows_the_suffix() {
    let mut repl = engine(10, 4);
    type_str(&mut repl, &"a".repeat(30));
    feed(&mut repl, &[&[1]]);
    let before = output_len(&repl);
    repl.handle_message(&[5]).unwrap(); // Ctrl-E
    assert_window_invariants(&repl, 10, 3);
    let (start, end) = repl.view_range();
    assert!(start > 0);
    assert_eq!(end, Some(30));
    assert!(output_since(&repl, before).contains("End"));
}

#[test]
fn walking_left_through_the_window_keeps_the_cursor_visible() {
    let mut repl = engine(10, 4);
    type_str(&mut repl, &"a".repeat(30));
    for _ in 0..30 {
        repl.handle_message(&[27, 91, 68]).unwrap();
        assert_window_invariants(&repl, 10, 3);
    }
    assert_eq!(repl.cursor(), 0);
    assert_eq!(repl.view_range().0, 0);
}

#[test]
fn deleting_back_under_the_limit_unwindows() {
    let mut repl = engine(10, 4);
    type_str(&mut repl, &"a".repeat(30));
    for _ in 0..10 {
        repl.handle_message(&[127]).unwrap();
        assert_window_invariants(&repl, 10, 3);
    }
    assert_eq!(repl.buffer().len(), 20);
    // 22 cells fit in 3 rows of 10: no more windowing.
    let (start, end) = repl.view_range();
    assert_eq!(start, 0);
    assert!(end.is_none() || end == Some(20));
}

#[test]
fn resize_rewindows_the_buffer() {
    let mut repl = engine(80, 24);
    type_str(&mut repl, &"b".repeat(30));
    assert_eq!(repl.view_range(), (0, None));
    repl.resize(10, 4).unwrap();
    assert_eq!(repl.size(), (10, 4));
    assert_window_invariants(&repl, 10, 3);
    let text = output_text(&repl);
    assert!(text.contains("\x1b[2J"), "resize overflow repaints the screen");
    // Growing back makes everything visible again.
    repl.resize(80, 24).unwrap();
    assert_window_invariants(&repl, 80, 23);
}

#[test]
fn status_bar_hides_below_ten_columns() {
    let mut repl = engine(10, 4);
    type_str(&mut repl, "abc");
    assert!(output_text(&repl).contains("\x1b[48;5;247m"));

    let mut narrow = engine(9, 4);
    type_str(&mut narrow, "abc");
    assert!(!output_text(&narrow).contains("\x1b[48;5;247m"));
}

#[test]
fn degenerate_terminal_never_wedges() {
    let mut repl = engine(0, 0);
    type_str(&mut repl, "abc");
    repl.handle_message(&[127]).unwrap();
    repl.handle_message(&[1]).unwrap();
    assert_eq!(repl.buffer(), b"ab");
}

//! Keystroke message decoding: bytes to editor actions.
//!
//! Pure translation layer ahead of the dispatcher, so the whole byte table
//! is testable without a terminal. Unrecognized messages decode to `None`
//! and are dropped silently.

/// One decoded editor action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    MoveBufferStart,
    MoveBufferEnd,
    MoveLeft,
    MoveRight,
    MovePhraseLeft,
    MovePhraseRight,
    MoveLineUp,
    MoveLineDown,
    /// Ctrl-C / Esc: end the search, or clear the buffer.
    Cancel,
    /// Ctrl-D.
    Quit,
    Backspace,
    /// Forward delete (`ESC [ 3 ~`).
    DeleteChar,
    Tab,
    /// Shift-Enter in terminals that send a bare LF.
    InsertNewline,
    Enter,
    KillToEnd,
    KillToStart,
    KillPhraseLeft,
    KillPhraseRight,
    Yank,
    RedrawScreen,
    HistoryBack,
    HistoryForward,
    ReverseSearch,
    /// A single printable byte.
    Insert(u8),
    /// A cleaned multi-byte pasted run.
    Paste(Vec<u8>),
    /// Cursor-position reply, possibly preceded by printable bytes typed
    /// while the dispatcher was blocked in `evaluate`.
    CursorReply {
        pos: Option<(usize, usize)>,
        pasted: Vec<u8>,
    },
}

impl Key {
    /// Stable label for logging; payloads stay out of logs.
    pub fn name(&self) -> &'static str {
        match self {
            Key::MoveBufferStart => "move_buffer_start",
            Key::MoveBufferEnd => "move_buffer_end",
            Key::MoveLeft => "move_left",
            Key::MoveRight => "move_right",
            Key::MovePhraseLeft => "move_phrase_left",
            Key::MovePhraseRight => "move_phrase_right",
            Key::MoveLineUp => "move_line_up",
            Key::MoveLineDown => "move_line_down",
            Key::Cancel => "cancel",
            Key::Quit => "quit",
            Key::Backspace => "backspace",
            Key::DeleteChar => "delete_char",
            Key::Tab => "tab",
            Key::InsertNewline => "insert_newline",
            Key::Enter => "enter",
            Key::KillToEnd => "kill_to_end",
            Key::KillToStart => "kill_to_start",
            Key::KillPhraseLeft => "kill_phrase_left",
            Key::KillPhraseRight => "kill_phrase_right",
            Key::Yank => "yank",
            Key::RedrawScreen => "redraw_screen",
            Key::HistoryBack => "history_back",
            Key::HistoryForward => "history_forward",
            Key::ReverseSearch => "reverse_search",
            Key::Insert(_) => "insert",
            Key::Paste(_) => "paste",
            Key::CursorReply { .. } => "cursor_reply",
        }
    }
}

/// Decode one keystroke message.
pub fn decode(bytes: &[u8]) -> Option<Key> {
    let n = bytes.len();
    match n {
        0 => None,
        1 => decode_single(bytes[0]),
        // 2-byte ALT chords are not supported.
        2 if bytes[0] == 195 => None,
        _ => {
            if bytes[0] == 27 && bytes[1] == 79 {
                // ESC O P.. function keys, unsupported.
                return None;
            }
            if bytes[0] == 27 && bytes[1] == 91 {
                return decode_csi(bytes);
            }
            if n > 6 && bytes[n - 1] == b'R' {
                return decode_trailing_reply(bytes);
            }
            decode_paste(bytes)
        }
    }
}

fn decode_single(b: u8) -> Option<Key> {
    match b {
        1 => Some(Key::MoveBufferStart),
        2 => Some(Key::MoveLeft),
        3 => Some(Key::Cancel),
        4 => Some(Key::Quit),
        5 => Some(Key::MoveBufferEnd),
        6 => Some(Key::MoveRight),
        8 | 127 => Some(Key::Backspace),
        9 => Some(Key::Tab),
        10 => Some(Key::InsertNewline),
        11 => Some(Key::KillToEnd),
        12 => Some(Key::RedrawScreen),
        13 => Some(Key::Enter),
        14 => Some(Key::HistoryForward),
        16 => Some(Key::HistoryBack),
        17 => Some(Key::KillPhraseRight),
        18 => Some(Key::ReverseSearch),
        21 => Some(Key::KillToStart),
        23 => Some(Key::KillPhraseLeft),
        25 => Some(Key::Yank),
        27 => Some(Key::Cancel),
        32..127 => Some(Key::Insert(b)),
        _ => None,
    }
}

fn decode_csi(b: &[u8]) -> Option<Key> {
    let n = b.len();
    match n {
        3 => match b[2] {
            65 => Some(Key::HistoryBack),
            66 => Some(Key::HistoryForward),
            67 => Some(Key::MoveRight),
            68 => Some(Key::MoveLeft),
            70 => Some(Key::MoveBufferEnd),
            72 => Some(Key::MoveBufferStart),
            _ => None,
        },
        4 => (b[2] == 51 && b[3] == 126).then_some(Key::DeleteChar),
        6 if b[2] == 49 && b[3] == 59 && b[4] == 53 => match b[5] {
            65 => Some(Key::MoveLineUp),
            66 => Some(Key::MoveLineDown),
            67 => Some(Key::MovePhraseRight),
            68 => Some(Key::MovePhraseLeft),
            _ => None,
        },
        _ if n > 5 && b[n - 1] == b'R' => parse_reply(&b[2..n - 1]).map(|pos| Key::CursorReply {
            pos: Some(pos),
            pasted: Vec::new(),
        }),
        _ => None,
    }
}

/// `row ; col` out of a cursor-position reply, converted to 0-based (x, y).
fn parse_reply(b: &[u8]) -> Option<(usize, usize)> {
    let s = std::str::from_utf8(b).ok()?;
    let (row, col) = s.split_once(';')?;
    let row: usize = row.parse().ok()?;
    let col: usize = col.parse().ok()?;
    Some((col.saturating_sub(1), row.saturating_sub(1)))
}

/// Printable bytes typed during a blocked `evaluate` arrive in the same
/// message as the subsequent cursor-position reply. Walk back to the reply's
/// `ESC [` prefix; everything printable before it is pasted input.
fn decode_trailing_reply(b: &[u8]) -> Option<Key> {
    let n = b.len();
    for i in (0..n - 1).rev() {
        if b[i] == 27 && b[i + 1] == 91 {
            let pos = parse_reply(&b[i + 2..n - 1]);
            let pasted: Vec<u8> = b[..i].iter().copied().filter(|&c| c >= 32).collect();
            return Some(Key::CursorReply { pos, pasted });
        }
    }
    None
}

/// A plain multi-byte run is pasted text: tabs become spaces, anything
/// outside the printable range is dropped.
fn decode_paste(b: &[u8]) -> Option<Key> {
    let cleaned: Vec<u8> = b
        .iter()
        .map(|&c| if c == b'\t' { b' ' } else { c })
        .filter(|c| (32..127).contains(c))
        .collect();
    if cleaned.is_empty() {
        None
    } else {
        Some(Key::Paste(cleaned))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_bytes_map_to_actions() {
        assert_eq!(decode(&[1]), Some(Key::MoveBufferStart));
        assert_eq!(decode(&[2]), Some(Key::MoveLeft));
        assert_eq!(decode(&[3]), Some(Key::Cancel));
        assert_eq!(decode(&[4]), Some(Key::Quit));
        assert_eq!(decode(&[5]), Some(Key::MoveBufferEnd));
        assert_eq!(decode(&[6]), Some(Key::MoveRight));
        assert_eq!(decode(&[8]), Some(Key::Backspace));
        assert_eq!(decode(&[127]), Some(Key::Backspace));
        assert_eq!(decode(&[9]), Some(Key::Tab));
        assert_eq!(decode(&[10]), Some(Key::InsertNewline));
        assert_eq!(decode(&[11]), Some(Key::KillToEnd));
        assert_eq!(decode(&[12]), Some(Key::RedrawScreen));
        assert_eq!(decode(&[13]), Some(Key::Enter));
        assert_eq!(decode(&[14]), Some(Key::HistoryForward));
        assert_eq!(decode(&[16]), Some(Key::HistoryBack));
        assert_eq!(decode(&[17]), Some(Key::KillPhraseRight));
        assert_eq!(decode(&[18]), Some(Key::ReverseSearch));
        assert_eq!(decode(&[21]), Some(Key::KillToStart));
        assert_eq!(decode(&[23]), Some(Key::KillPhraseLeft));
        assert_eq!(decode(&[25]), Some(Key::Yank));
        assert_eq!(decode(&[27]), Some(Key::Cancel));
    }

    #[test]
    fn printables_insert_and_high_bytes_drop() {
        assert_eq!(decode(&[b'a']), Some(Key::Insert(b'a')));
        assert_eq!(decode(&[32]), Some(Key::Insert(32)));
        assert_eq!(decode(&[126]), Some(Key::Insert(126)));
        assert_eq!(decode(&[0]), None);
        assert_eq!(decode(&[22]), None);
        assert_eq!(decode(&[200]), None);
    }

    #[test]
    fn arrow_and_edit_sequences() {
        assert_eq!(decode(&[27, 91, 65]), Some(Key::HistoryBack));
        assert_eq!(decode(&[27, 91, 66]), Some(Key::HistoryForward));
        assert_eq!(decode(&[27, 91, 67]), Some(Key::MoveRight));
        assert_eq!(decode(&[27, 91, 68]), Some(Key::MoveLeft));
        assert_eq!(decode(&[27, 91, 72]), Some(Key::MoveBufferStart));
        assert_eq!(decode(&[27, 91, 70]), Some(Key::MoveBufferEnd));
        assert_eq!(decode(&[27, 91, 51, 126]), Some(Key::DeleteChar));
    }

    #[test]
    fn ctrl_arrows_jump_phrases_and_lines() {
        assert_eq!(decode(&[27, 91, 49, 59, 53, 68]), Some(Key::MovePhraseLeft));
        assert_eq!(
            decode(&[27, 91, 49, 59, 53, 67]),
            Some(Key::MovePhraseRight)
        );
        assert_eq!(decode(&[27, 91, 49, 59, 53, 65]), Some(Key::MoveLineUp));
        assert_eq!(decode(&[27, 91, 49, 59, 53, 66]), Some(Key::MoveLineDown));
    }

    #[test]
    fn cursor_replies_parse_zero_based() {
        assert_eq!(
            decode(b"\x1b[12;5R"),
            Some(Key::CursorReply {
                pos: Some((4, 11)),
                pasted: Vec::new()
            })
        );
    }

    #[test]
    fn malformed_replies_are_dropped() {
        assert_eq!(decode(b"\x1b[12:5R"), None);
        assert_eq!(decode(b"\x1b[xy;zR"), None);
    }

    #[test]
    fn typed_ahead_bytes_ride_with_the_reply() {
        assert_eq!(
            decode(b"abc\x1b[3;9R"),
            Some(Key::CursorReply {
                pos: Some((8, 2)),
                pasted: b"abc".to_vec()
            })
        );
        // Control bytes ahead of the reply are filtered out.
        assert_eq!(
            decode(b"a\x07b\x1b[3;9R"),
            Some(Key::CursorReply {
                pos: Some((8, 2)),
                pasted: b"ab".to_vec()
            })
        );
    }

    #[test]
    fn plain_runs_become_pastes() {
        assert_eq!(decode(b"hello"), Some(Key::Paste(b"hello".to_vec())));
        assert_eq!(decode(b"a\tb"), Some(Key::Paste(b"a b".to_vec())));
        // Nothing printable left: drop the message.
        assert_eq!(decode(&[1, 2, 7]), None);
    }

    #[test]
    fn unsupported_sequences_are_dropped() {
        assert_eq!(decode(&[27, 79, 80]), None); // F1
        assert_eq!(decode(&[195, 164]), None); // ALT chord
        assert_eq!(decode(&[27, 91, 90]), None); // Shift-Tab
        assert_eq!(decode(&[]), None);
    }
}

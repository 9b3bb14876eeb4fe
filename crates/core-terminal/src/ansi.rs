//! ANSI CSI emitter.
//!
//! All cursor and erase traffic goes through this sink, generic over the
//! writer so tests assert on captured byte streams. Inputs are 0-based; CSI
//! parameters are emitted 1-based. Every public operation flushes, because
//! escape sequences carry no newline to trip line buffering.

use std::io::{self, Write};

pub struct AnsiSink<W: Write> {
    out: W,
}

impl AnsiSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> AnsiSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Direct access for plain text output (evaluator results, echo).
    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.out
    }

    pub fn writer(&self) -> &W {
        &self.out
    }

    pub fn into_writer(self) -> W {
        self.out
    }

    fn csi1(&mut self, n: usize, c: char) -> io::Result<()> {
        write!(self.out, "\x1b[{n}{c}")?;
        self.out.flush()
    }

    fn csi2(&mut self, n: usize, m: usize, c: char) -> io::Result<()> {
        write!(self.out, "\x1b[{n};{m}{c}")?;
        self.out.flush()
    }

    /// Move to 0-based (x, y).
    pub fn move_cursor_to(&mut self, x: usize, y: usize) -> io::Result<()> {
        self.csi2(y + 1, x + 1, 'H')
    }

    /// Move to 0-based column x on the current row.
    pub fn move_to_col(&mut self, x: usize) -> io::Result<()> {
        self.csi1(x + 1, 'G')
    }

    pub fn move_to_row_start(&mut self) -> io::Result<()> {
        self.csi1(1, 'G')
    }

    /// Move to column 0 of 0-based row y.
    pub fn move_to_row(&mut self, y: usize) -> io::Result<()> {
        self.csi2(y + 1, 1, 'H')
    }

    pub fn move_to_screen_start(&mut self) -> io::Result<()> {
        self.csi2(1, 1, 'H')
    }

    pub fn clear_screen(&mut self) -> io::Result<()> {
        self.csi1(2, 'J')
    }

    pub fn clear_row(&mut self) -> io::Result<()> {
        self.csi1(2, 'K')
    }

    pub fn clear_row_after_cursor(&mut self) -> io::Result<()> {
        self.csi1(0, 'K')
    }

    /// Clear `n` rows walking upward from the current row.
    pub fn clear_rows(&mut self, n: usize) -> io::Result<()> {
        for _ in 0..n {
            write!(self.out, "\x1b[2K\x1b[1F")?;
        }
        self.out.flush()
    }

    /// Black text on a grey background, for the status bar.
    pub fn highlight(&mut self) -> io::Result<()> {
        write!(self.out, "\x1b[48;5;247m\x1b[30m")?;
        self.out.flush()
    }

    pub fn reset_decorations(&mut self) -> io::Result<()> {
        write!(self.out, "\x1b[0m")?;
        self.out.flush()
    }

    /// CSI 6n; the reply arrives on stdin as `ESC [ row ; col R`.
    pub fn query_cursor_position(&mut self) -> io::Result<()> {
        self.csi1(6, 'n')
    }

    /// Raw mode disables output post-processing, so a bare `\n` only moves
    /// down; pair it with `\r` to also return to column 0.
    pub fn newline(&mut self) -> io::Result<()> {
        self.out.write_all(b"\n\r")?;
        self.out.flush()
    }

    pub fn print_str(&mut self, s: &str) -> io::Result<()> {
        self.out.write_all(s.as_bytes())?;
        self.out.flush()
    }

    /// Write buffer content: printables verbatim, `\n` as `\n\r`.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        for &b in bytes {
            if b == b'\n' {
                self.out.write_all(b"\n\r")?;
            } else {
                self.out.write_all(&[b])?;
            }
        }
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sink() -> AnsiSink<Vec<u8>> {
        AnsiSink::new(Vec::new())
    }

    #[test]
    fn cursor_moves_are_one_based() {
        let mut s = sink();
        s.move_cursor_to(0, 0).unwrap();
        s.move_cursor_to(3, 7).unwrap();
        s.move_to_col(5).unwrap();
        s.move_to_row(2).unwrap();
        assert_eq!(s.into_writer(), b"\x1b[1;1H\x1b[8;4H\x1b[6G\x1b[3;1H");
    }

    #[test]
    fn clear_rows_interleaves_erase_and_up() {
        let mut s = sink();
        s.clear_rows(2).unwrap();
        assert_eq!(s.into_writer(), b"\x1b[2K\x1b[1F\x1b[2K\x1b[1F");
    }

    #[test]
    fn highlight_uses_grey_background() {
        let mut s = sink();
        s.highlight().unwrap();
        s.reset_decorations().unwrap();
        assert_eq!(s.into_writer(), b"\x1b[48;5;247m\x1b[30m\x1b[0m");
    }

    #[test]
    fn newlines_carry_carriage_returns() {
        let mut s = sink();
        s.write_bytes(b"ab\ncd").unwrap();
        assert_eq!(s.into_writer(), b"ab\n\rcd");
    }

    #[test]
    fn position_query_is_csi_6n() {
        let mut s = sink();
        s.query_cursor_position().unwrap();
        assert_eq!(s.into_writer(), b"\x1b[6n");
    }
}

//! The capability a host implements to drive the REPL.

use crate::session::Session;

/// User-supplied evaluation hooks. The engine calls these; it never defines
/// what a line means.
pub trait Evaluator {
    /// Prompt text printed before the input. Its rendered width counts
    /// toward line layout, so keep it plain single-column text.
    fn prompt(&self) -> String;

    /// Completion hook. Receives everything before the cursor; whatever it
    /// returns is inserted at the cursor. Return an empty string for "no
    /// completion".
    fn tab(&mut self, prefix: &str) -> String;

    /// Handle one accepted line (surrounding whitespace already trimmed).
    /// The return value is printed below the prompt, each `\n` advancing a
    /// row; an empty return prints nothing. Runs synchronously on the
    /// dispatcher: no keystrokes are consumed until it returns. `session`
    /// provides nested line reads and raw-mode bracketing for evaluators
    /// that launch full-screen programs.
    fn evaluate(&mut self, line: &str, session: &mut Session<'_>) -> String;
}

#![allow(dead_code)] // Shared across test binaries; each uses a subset.

use anyhow::Result;
use core_config::EngineConfig;
use core_editor::{Evaluator, Repl, Session};
use core_terminal::{AnsiSink, TerminalControl};
use std::cell::RefCell;
use std::rc::Rc;

/// Terminal fake with fixed geometry; raw-mode calls are no-ops.
pub struct FixedTerminal {
    pub width: u16,
    pub height: u16,
}

impl TerminalControl for FixedTerminal {
    fn make_raw(&mut self) -> Result<()> {
        Ok(())
    }
    fn restore(&mut self) -> Result<()> {
        Ok(())
    }
    fn size(&self) -> Result<(u16, u16)> {
        Ok((self.width, self.height))
    }
}

/// Evaluator returning canned strings and logging every evaluated line.
pub struct ScriptedEvaluator {
    prompt: String,
    tab_reply: String,
    eval_reply: String,
    log: Rc<RefCell<Vec<String>>>,
}

impl Evaluator for ScriptedEvaluator {
    fn prompt(&self) -> String {
        self.prompt.clone()
    }
    fn tab(&mut self, _prefix: &str) -> String {
        self.tab_reply.clone()
    }
    fn evaluate(&mut self, line: &str, _session: &mut Session<'_>) -> String {
        self.log.borrow_mut().push(line.to_string());
        self.eval_reply.clone()
    }
}

pub type TestRepl = Repl<FixedTerminal, Vec<u8>>;

pub fn engine(width: u16, height: u16) -> TestRepl {
    engine_with(width, height, "> ", "", "").0
}

pub fn engine_with(
    width: u16,
    height: u16,
    prompt: &str,
    tab_reply: &str,
    eval_reply: &str,
) -> (TestRepl, Rc<RefCell<Vec<String>>>) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let evaluator = ScriptedEvaluator {
        prompt: prompt.to_string(),
        tab_reply: tab_reply.to_string(),
        eval_reply: eval_reply.to_string(),
        log: log.clone(),
    };
    let repl = Repl::with_parts(
        Box::new(evaluator),
        EngineConfig::default(),
        FixedTerminal { width, height },
        AnsiSink::new(Vec::new()),
    );
    (repl, log)
}

/// Type a string one keystroke message per byte.
pub fn type_str(repl: &mut TestRepl, s: &str) {
    for b in s.bytes() {
        repl.handle_message(&[b]).unwrap();
    }
}

pub fn feed(repl: &mut TestRepl, messages: &[&[u8]]) {
    for m in messages {
        repl.handle_message(m).unwrap();
    }
}

/// Accept lines through the real dispatch path so history fills the way a
/// session would fill it.
pub fn seed_history(repl: &mut TestRepl, entries: &[&str]) {
    for entry in entries {
        type_str(repl, entry);
        repl.handle_message(&[13]).unwrap();
    }
}

pub fn output_text(repl: &TestRepl) -> String {
    String::from_utf8_lossy(repl.output()).into_owned()
}

pub fn output_len(repl: &TestRepl) -> usize {
    repl.output().len()
}

/// Terminal bytes written after offset `from`.
pub fn output_since(repl: &TestRepl, from: usize) -> String {
    String::from_utf8_lossy(&repl.output()[from..]).into_owned()
}

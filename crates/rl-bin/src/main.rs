//! Redline demo REPL: a tiny command evaluator exercising the engine.

use anyhow::Result;
use clap::Parser;
use core_editor::{Evaluator, Repl, Session};
use tracing::{error, info};

const HELP: &str = "help              display this message\n\
                    add <int> <int>   add two numbers\n\
                    sleep             sleep for 5s\n\
                    read              read some user input\n\
                    quit              quit this program";

const COMMANDS: &[&str] = &["help", "add", "sleep", "read", "quit"];

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "redline", version, about = "Redline demo REPL")]
struct Args {
    /// Optional configuration file path (overrides discovery of
    /// `redline.toml`).
    #[arg(long = "config")]
    config: Option<std::path::PathBuf>,
}

struct DemoEvaluator;

impl Evaluator for DemoEvaluator {
    fn prompt(&self) -> String {
        "> ".to_string()
    }

    fn tab(&mut self, prefix: &str) -> String {
        // Complete the command word when the prefix is still unambiguous.
        let word = prefix.rsplit(char::is_whitespace).next().unwrap_or("");
        if word.is_empty() || word != prefix {
            return String::new();
        }
        let mut candidates = COMMANDS.iter().filter(|c| c.starts_with(word));
        match (candidates.next(), candidates.next()) {
            (Some(cmd), None) => cmd[word.len()..].to_string(),
            _ => String::new(),
        }
    }

    fn evaluate(&mut self, line: &str, session: &mut Session<'_>) -> String {
        let mut fields = line.split_whitespace();
        let Some(cmd) = fields.next() else {
            return String::new();
        };
        let args: Vec<&str> = fields.collect();
        match cmd {
            "help" => HELP.to_string(),
            "add" => match args.as_slice() {
                [a, b] => match (a.parse::<i64>(), b.parse::<i64>()) {
                    (Ok(a), Ok(b)) => (a + b).to_string(),
                    _ => "\"add\" expects 2 ints".to_string(),
                },
                _ => "\"add\" expects 2 args".to_string(),
            },
            "sleep" => {
                std::thread::sleep(std::time::Duration::from_secs(5));
                "done sleeping".to_string()
            }
            "read" => {
                let input = session.read_line(true);
                format!("you typed: {input}")
            }
            "quit" => session.quit(),
            other => format!("unknown command \"{other}\", type \"help\""),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // File logging: the terminal itself belongs to the editor.
    let log_dir = std::path::Path::new(".");
    let file_appender = tracing_appender::rolling::never(log_dir, "redline.log");
    let (writer, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(writer)
        .init();

    // Log panics before the terminal backend's Drop restores the screen.
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        tracing::error!(target: "runtime.panic", ?info, "panic");
        default_panic(info);
    }));

    let args = Args::parse();
    let config = core_config::load_from(args.config)?;
    info!(target: "runtime", "startup");

    println!("Welcome, type \"help\" for more info");

    let repl = Repl::new(Box::new(DemoEvaluator), config.engine());
    if let Err(e) = repl.run().await {
        error!(target: "runtime", error = %e, "session_ended");
        eprintln!("redline: {e}");
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tab_completes_unambiguous_commands() {
        let mut eval = DemoEvaluator;
        assert_eq!(eval.tab("he"), "lp");
        assert_eq!(eval.tab("q"), "uit");
        assert_eq!(eval.tab("s"), "leep");
        // Empty, mid-line, or unknown prefixes stay put.
        assert_eq!(eval.tab(""), "");
        assert_eq!(eval.tab("add 1"), "");
        assert_eq!(eval.tab("zz"), "");
    }
}

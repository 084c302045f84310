//! Line-oriented command surface on stdin.

use hygro_core::{Command, Mode, Notice};
use std::path::PathBuf;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

pub const HELP: &str = "\
humidity | temperature | both   start acquisition in that mode (clears data)
stop | play                     pause / resume acquisition
details                         show or hide regression statistics
save [base]                     write <base>.png and <base>.xlsx (while stopped)
status                          point count, mode and cycle state
feed                            most recent samples, newest first
ports                           list serial ports
back                            return to the mode menu (clears data)
help                            this text
quit                            exit";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown command {0:?}; type `help` for the list")]
    Unknown(String),

    #[error("`{0}` takes no argument")]
    UnexpectedArgument(&'static str),
}

/// Parse one console line.  Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Command>, ParseError> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    if word.is_empty() {
        return Ok(None);
    }

    let command = match word.to_ascii_lowercase().as_str() {
        "save" | "s" => {
            let base = (!rest.is_empty()).then(|| PathBuf::from(rest));
            return Ok(Some(Command::Save(base)));
        }
        "humidity" | "h" => ("humidity", Command::Select(Mode::Humidity)),
        "temperature" | "t" => ("temperature", Command::Select(Mode::Temperature)),
        "both" | "b" => ("both", Command::Select(Mode::Both)),
        "stop" | "pause" => ("stop", Command::Stop),
        "play" | "resume" => ("play", Command::Play),
        "details" | "d" => ("details", Command::Details),
        "status" => ("status", Command::Status),
        "feed" | "f" => ("feed", Command::Feed),
        "ports" => ("ports", Command::Ports),
        "back" => ("back", Command::Back),
        "help" | "?" => ("help", Command::Help),
        "quit" | "exit" | "q" => ("quit", Command::Quit),
        _ => return Err(ParseError::Unknown(word.to_string())),
    };

    if !rest.is_empty() {
        return Err(ParseError::UnexpectedArgument(command.0));
    }
    Ok(Some(command.1))
}

/// Async line stream over the process's stdin.
pub fn stdin_lines() -> Lines<BufReader<Stdin>> {
    BufReader::new(tokio::io::stdin()).lines()
}

/// Print notices as distinct blocks on stdout.
pub fn emit(notices: impl IntoIterator<Item = Notice>) {
    for notice in notices {
        tracing::debug!(level = ?notice.level, title = %notice.title, "notice");
        println!("{notice}\n");
    }
}

//! Line commands for the console front end.
//!
//! Lines starting with `/` are commands; anything else is a chat message.

use zendo_proto::task::TaskId;

use crate::tasks::Direction;

/// Help text listing every command.
pub const HELP: &str = "\
commands:
  /board            show the task board
  /refresh          fetch the task list now
  /next <id>        move a task one column right
  /back <id>        move a task one column left
  /transcript       show the whole conversation
  /prompts          list suggested prompts
  /use <n>          send suggested prompt n
  /dismiss          hide the error banner
  /help             show this help
  /quit             exit
anything else is sent to the assistant";

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Blank line.
    Empty,
    /// Send the text to the assistant.
    Chat(String),
    /// Render the board.
    Board,
    /// Refresh the task list out of schedule.
    Refresh,
    /// Move a task one column.
    Move {
        /// Task to move.
        task_id: TaskId,
        /// Which way.
        direction: Direction,
    },
    /// Render the transcript.
    Transcript,
    /// List the suggested prompts.
    Prompts,
    /// Send the suggested prompt at this zero-based index.
    UsePrompt(usize),
    /// Hide the chat error banner.
    Dismiss,
    /// Print [`HELP`].
    Help,
    /// Exit.
    Quit,
}

/// Why a command line was not understood.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// The word after `/` is not a command.
    #[error("unknown command /{0} (try /help)")]
    Unknown(String),

    /// The command needs an argument that is missing or malformed.
    #[error("usage: {0}")]
    Usage(&'static str),
}

/// Parses one input line.
///
/// # Errors
///
/// Returns [`CommandError`] for an unknown `/` command or a bad argument.
pub fn parse(line: &str) -> Result<Command, CommandError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(Command::Empty);
    }
    let Some(rest) = trimmed.strip_prefix('/') else {
        return Ok(Command::Chat(line.trim_end_matches(['\r', '\n']).to_string()));
    };

    let mut words = rest.split_whitespace();
    let name = words.next().unwrap_or_default();
    let arg = words.next();

    match name {
        "board" | "b" => Ok(Command::Board),
        "refresh" | "r" => Ok(Command::Refresh),
        "next" | "n" => parse_move(arg, Direction::Forward, "/next <id>"),
        "back" => parse_move(arg, Direction::Backward, "/back <id>"),
        "transcript" | "t" => Ok(Command::Transcript),
        "prompts" => Ok(Command::Prompts),
        "use" => arg
            .and_then(|n| n.parse::<usize>().ok())
            .and_then(|n| n.checked_sub(1))
            .map(Command::UsePrompt)
            .ok_or(CommandError::Usage("/use <n>, counting from 1")),
        "dismiss" => Ok(Command::Dismiss),
        "help" | "h" | "?" => Ok(Command::Help),
        "quit" | "q" | "exit" => Ok(Command::Quit),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

fn parse_move(
    arg: Option<&str>,
    direction: Direction,
    usage: &'static str,
) -> Result<Command, CommandError> {
    let id = arg
        .map(|a| a.trim_start_matches('#'))
        .and_then(|a| a.parse::<i64>().ok())
        .ok_or(CommandError::Usage(usage))?;
    Ok(Command::Move {
        task_id: TaskId::new(id),
        direction,
    })
}

use std::io::Write as _;

use anyhow::Result;
use shared::domain::PollId;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::{controller::PollApp, print_outcome};

pub const HELP: &str = "\
Commands:
  list                               show all polls
  create <question> | <opt1> | <opt2> create a poll
  vote <poll-id> <0|1>               vote for an option
  results <poll-id>                  show a poll's results
  clear                              close the results panel
  help                               show this help
  quit                               leave the shell";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    List,
    Create {
        question: String,
        option1: String,
        option2: String,
    },
    Vote {
        poll_id: PollId,
        option_index: usize,
    },
    Results {
        poll_id: PollId,
    },
    Clear,
    Help,
    Quit,
}

pub fn parse_shell_line(line: &str) -> Result<Option<ShellCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    let command = match verb.to_ascii_lowercase().as_str() {
        "list" | "ls" => ShellCommand::List,
        "create" | "new" => {
            let parts: Vec<&str> = rest.split('|').collect();
            let [question, option1, option2] = parts.as_slice() else {
                return Err("usage: create <question> | <opt1> | <opt2>".to_string());
            };
            ShellCommand::Create {
                question: question.trim().to_string(),
                option1: option1.trim().to_string(),
                option2: option2.trim().to_string(),
            }
        }
        "vote" => {
            let mut args = rest.split_whitespace();
            let (Some(poll_id), Some(index), None) = (args.next(), args.next(), args.next())
            else {
                return Err("usage: vote <poll-id> <0|1>".to_string());
            };
            let option_index = index
                .parse::<usize>()
                .map_err(|_| format!("option index must be 0 or 1, got '{index}'"))?;
            ShellCommand::Vote {
                poll_id: PollId::from(poll_id),
                option_index,
            }
        }
        "results" | "show" => {
            if rest.is_empty() {
                return Err("usage: results <poll-id>".to_string());
            }
            ShellCommand::Results {
                poll_id: PollId::from(rest),
            }
        }
        "clear" => ShellCommand::Clear,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" => ShellCommand::Quit,
        other => return Err(format!("unknown command '{other}'; type 'help'")),
    };
    Ok(Some(command))
}

pub async fn run(mut app: PollApp) -> Result<()> {
    print_outcome(&app.refresh().await);
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("halo> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let command = match parse_shell_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(usage) => {
                eprintln!("{usage}");
                continue;
            }
        };

        let outcome = match command {
            ShellCommand::List => app.refresh().await,
            ShellCommand::Create {
                question,
                option1,
                option2,
            } => app.submit_poll(&question, &option1, &option2).await,
            ShellCommand::Vote {
                poll_id,
                option_index,
            } => app.cast_vote(&poll_id, option_index).await,
            ShellCommand::Results { poll_id } => app.show_results(&poll_id).await,
            ShellCommand::Clear => {
                app.clear_results();
                continue;
            }
            ShellCommand::Help => {
                println!("{HELP}");
                continue;
            }
            ShellCommand::Quit => break,
        };
        print_outcome(&outcome);
    }

    Ok(())
}

#[cfg(test)]
#[path = "tests/shell_tests.rs"]
mod tests;

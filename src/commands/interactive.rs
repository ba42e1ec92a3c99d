//! The `stamps session` command: a line-oriented interactive calculator.
//!
//! Stamp and target edits are applied as soon as their line is read. `ask` hands the query to the
//! suggestion gateway on a separate task and the session keeps reading input while it runs. The
//! result comes back over a channel tagged with its request ticket, and the session decides whether
//! it is still current.

use crate::api::SuggestionGateway;
use crate::commands::Out;
use crate::model::Suggestion;
use crate::{CatalogDisplay, Config, RequestTicket, Result, Session, Summary, SuggestionDisplay};
use anyhow::Context;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, trace};

const HELP: &str = "\
Commands:
  add <id> [count]   add stamps of a denomination
  remove <id>        take one stamp away
  target <amount>    set the target postage (blank to unset)
  ask <question>     ask the AI for a postage suggestion
  clear              reset stamps, target and suggestion
  show               show the total, target and inventory
  catalog            list the denominations
  help               show this message
  quit               leave the session
";

/// One parsed input line.
#[derive(Debug, Clone, Eq, PartialEq)]
enum Input {
    Add { id: String, count: u64 },
    Remove(String),
    Target(String),
    Ask(String),
    Clear,
    Show,
    Catalog,
    Help,
    Quit,
    Blank,
    Invalid(String),
}

impl Input {
    fn parse(line: &str) -> Self {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        match word.to_lowercase().as_str() {
            "" => Input::Blank,
            "add" | "a" => {
                let mut parts = rest.split_whitespace();
                let Some(id) = parts.next() else {
                    return Input::Invalid("add needs a denomination id".to_string());
                };
                let count = match parts.next().map(str::parse::<u64>) {
                    None => 1,
                    Some(Ok(n)) if n > 0 => n,
                    Some(_) => return Input::Invalid(format!("Invalid count in '{line}'")),
                };
                Input::Add {
                    id: id.to_string(),
                    count,
                }
            }
            "remove" | "rm" | "r" => match rest.split_whitespace().next() {
                Some(id) => Input::Remove(id.to_string()),
                None => Input::Invalid("remove needs a denomination id".to_string()),
            },
            "target" | "t" => Input::Target(rest.to_string()),
            "ask" => Input::Ask(rest.to_string()),
            "clear" | "reset" => Input::Clear,
            "show" | "s" => Input::Show,
            "catalog" => Input::Catalog,
            "help" | "?" => Input::Help,
            "quit" | "exit" | "q" => Input::Quit,
            other => Input::Invalid(format!("Unknown command '{other}', type 'help'")),
        }
    }
}

type Resolution = (RequestTicket, Option<Suggestion>);

/// Runs an interactive session, reading commands from `input` and writing results to `output`.
///
/// When `gateway` is `None` the calculator still works, but `ask` reports that suggestions are
/// unavailable. On end of input the session waits for an outstanding suggestion before it
/// finishes; `quit` leaves immediately.
pub async fn session<R, W>(
    config: &Config,
    gateway: Option<SuggestionGateway>,
    input: R,
    mut output: W,
) -> Result<Out<Summary>>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut session = Session::new(config.catalog().clone());
    let (tx, mut rx) = mpsc::unbounded_channel::<Resolution>();
    let mut lines = input.lines();

    write(&mut output, "Type 'help' for a list of commands.\n").await?;
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Unable to read a command")? else {
                    debug!("End of input");
                    drain(&mut session, &mut rx, &mut output).await?;
                    break;
                };
                trace!("input: {line}");
                let input = Input::parse(&line);
                if input == Input::Quit {
                    break;
                }
                let text = apply(&mut session, input, gateway.as_ref(), &tx);
                write(&mut output, &text).await?;
            }
            Some((ticket, outcome)) = rx.recv() => {
                let text = resolve(&mut session, ticket, outcome);
                write(&mut output, &text).await?;
            }
        }
    }

    let summary = session.summary();
    Ok(Out::new("Session finished", summary))
}

/// Waits for the outstanding request, if any, and applies it.
async fn drain<W>(
    session: &mut Session,
    rx: &mut mpsc::UnboundedReceiver<Resolution>,
    output: &mut W,
) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    while session.is_in_flight() {
        let Some((ticket, outcome)) = rx.recv().await else {
            break;
        };
        let text = resolve(session, ticket, outcome);
        write(output, &text).await?;
    }
    Ok(())
}

/// Applies one input line to the session and returns the text to show for it.
fn apply(
    session: &mut Session,
    input: Input,
    gateway: Option<&SuggestionGateway>,
    tx: &mpsc::UnboundedSender<Resolution>,
) -> String {
    match input {
        Input::Add { id, count } => {
            if !session.catalog().contains(&id) {
                return format!("Unknown denomination '{id}', type 'catalog' to list them\n");
            }
            session.add_n(&id, count);
            status(session)
        }
        Input::Remove(id) => {
            session.remove(&id);
            status(session)
        }
        Input::Target(text) => {
            session.set_target(text);
            status(session)
        }
        Input::Ask(query) => ask(session, query, gateway, tx),
        Input::Clear => {
            session.clear();
            "Cleared\n".to_string()
        }
        Input::Show => session.summary().to_string(),
        Input::Catalog => CatalogDisplay(session.catalog()).to_string(),
        Input::Help => HELP.to_string(),
        Input::Blank | Input::Quit => String::new(),
        Input::Invalid(message) => format!("{message}\n"),
    }
}

/// Starts a suggestion request on its own task. The result arrives later through `tx`.
fn ask(
    session: &mut Session,
    query: String,
    gateway: Option<&SuggestionGateway>,
    tx: &mpsc::UnboundedSender<Resolution>,
) -> String {
    let Some(gateway) = gateway else {
        return "Suggestions are unavailable, check the API key\n".to_string();
    };
    if query.trim().is_empty() {
        return "ask needs a question, e.g. 'ask 50g letter to the UK'\n".to_string();
    }
    let Some(ticket) = session.begin_request(&query) else {
        return "Still waiting for the previous suggestion\n".to_string();
    };
    let gateway = gateway.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        let outcome = gateway.suggest(&query).await;
        // The receiver is gone only when the session has ended.
        let _ = tx.send((ticket, outcome));
    });
    "Asking for a postage suggestion...\n".to_string()
}

fn resolve(session: &mut Session, ticket: RequestTicket, outcome: Option<Suggestion>) -> String {
    if !session.resolve(ticket, outcome) {
        return String::new();
    }
    match session.suggestion() {
        Some(suggestion) => format!("{}{}", SuggestionDisplay(suggestion), status(session)),
        None => "No postage suggestion is available for that question\n".to_string(),
    }
}

/// A one-line view of the derived numbers.
fn status(session: &Session) -> String {
    let summary = session.summary();
    if summary.target.is_positive() {
        format!(
            "Total {} | target {} | remaining {} | {}%\n",
            summary.total,
            summary.target,
            summary.remaining,
            summary.progress_percent.round_dp(0)
        )
    } else {
        format!("Total {}\n", summary.total)
    }
}

async fn write<W>(output: &mut W, text: &str) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    if text.is_empty() {
        return Ok(());
    }
    output
        .write_all(text.as_bytes())
        .await
        .context("Unable to write output")?;
    output.flush().await.context("Unable to flush output")
}

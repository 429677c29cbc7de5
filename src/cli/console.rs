//! Line-oriented operator console.

use anyhow::Result;
use chrono::Utc;
use std::io::Write;
use std::str::FromStr;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_stream::StreamExt;

use crate::core::{SenderRole, StateChange, ThreadView};
use crate::session::SessionHandle;

use super::render::{render_message, render_summaries, render_thread};

const HELP: &str = "\
Commands:
  list           Show conversations
  open <id>      Open a conversation and mark it read
  close          Close the open conversation
  send <text>    Send a message to the open conversation
  order          Create an order for the open conversation's customer
  help           Show this help
  quit           Leave the console";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    List,
    Open(String),
    Close,
    Send(String),
    Order,
    Help,
    Quit,
}

impl FromStr for ConsoleCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (word, rest) = s.split_once(char::is_whitespace).unwrap_or((s, ""));
        let rest = rest.trim();

        match word.to_lowercase().as_str() {
            "list" | "ls" => Ok(ConsoleCommand::List),
            "open" if !rest.is_empty() => Ok(ConsoleCommand::Open(rest.to_string())),
            "open" => Err("Usage: open <id>".to_string()),
            "close" => Ok(ConsoleCommand::Close),
            "send" => Ok(ConsoleCommand::Send(rest.to_string())),
            "order" => Ok(ConsoleCommand::Order),
            "help" | "?" => Ok(ConsoleCommand::Help),
            "quit" | "exit" => Ok(ConsoleCommand::Quit),
            _ => Err(format!("Unknown command: {} (try 'help')", word)),
        }
    }
}

/// Run the console until `quit` or end of input.
pub async fn run_console(session: SessionHandle) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut changes = session.changes();

    let mut active = session
        .active_thread_view()
        .await?
        .conversation_id()
        .map(str::to_string);

    print_overview(&session, active.as_deref()).await?;
    println!("Type 'help' for commands.");
    prompt();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    prompt();
                    continue;
                }
                match line.parse::<ConsoleCommand>() {
                    Ok(ConsoleCommand::Quit) => break,
                    Ok(command) => {
                        if let Err(e) = execute(&session, command).await {
                            println!("Error: {}", e);
                        }
                    }
                    Err(e) => println!("{}", e),
                }
                prompt();
            }
            Some(change) = changes.next() => {
                show_change(&change, &mut active);
            }
        }
    }

    let cancelled = session.cancel_all().await?;
    tracing::debug!("Console closed, {} follow-ups cancelled", cancelled);
    session.shutdown().await?;
    Ok(())
}

async fn execute(session: &SessionHandle, command: ConsoleCommand) -> Result<()> {
    match command {
        ConsoleCommand::List => {
            let view = session.active_thread_view().await?;
            let summaries = session.conversation_summaries().await?;
            print!(
                "{}",
                render_summaries(&summaries, view.conversation_id(), Utc::now())
            );
        }
        ConsoleCommand::Open(id) => {
            session.select(&id).await?;
            print!("{}", render_thread(&session.active_thread_view().await?, Utc::now()));
        }
        ConsoleCommand::Close => {
            session.clear_selection().await?;
        }
        ConsoleCommand::Send(text) => {
            let view = session.active_thread_view().await?;
            let Some(id) = view.conversation_id() else {
                println!("Select a conversation first.");
                return Ok(());
            };
            let message = session.send_operator_message(id, &text).await?;
            print!("{}", render_message(&message));
        }
        ConsoleCommand::Order => create_order(&session.active_thread_view().await?),
        ConsoleCommand::Help => println!("{}", HELP),
        ConsoleCommand::Quit => {}
    }
    Ok(())
}

/// Order creation only needs the active customer.
fn create_order(view: &ThreadView) {
    match view.customer() {
        Some(customer) => {
            tracing::info!("Order requested for customer {}", customer.id);
            println!("Order created successfully for {} ({})", customer.name, customer.id);
        }
        None => println!("Select a conversation first."),
    }
}

fn show_change(change: &StateChange, active: &mut Option<String>) {
    match change {
        StateChange::SelectionChanged { conversation_id } => {
            *active = conversation_id.clone();
        }
        StateChange::MessageAppended {
            conversation_id,
            message,
        } => {
            // Operator messages are echoed when sent.
            if message.sender == SenderRole::Operator {
                return;
            }
            if active.as_deref() == Some(conversation_id.as_str()) {
                print!("\n{}", render_message(message));
            } else if message.sender == SenderRole::Customer {
                println!("\nNew message in {}", conversation_id);
            } else {
                return;
            }
            prompt();
        }
        StateChange::ConversationAdded { conversation_id } => {
            println!("\nNew conversation {}", conversation_id);
            prompt();
        }
        StateChange::MarkedRead { .. } => {}
    }
}

async fn print_overview(session: &SessionHandle, active: Option<&str>) -> Result<()> {
    let now = Utc::now();
    print!(
        "{}",
        render_summaries(&session.conversation_summaries().await?, active, now)
    );
    println!();
    print!("{}", render_thread(&session.active_thread_view().await?, now));
    Ok(())
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}

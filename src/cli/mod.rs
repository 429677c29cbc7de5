//! CLI commands for ConvoDesk using clap.

mod console;
mod render;

pub use console::{run_console, ConsoleCommand};
pub use render::{render_message, render_summaries, render_thread};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tokio_stream::StreamExt;

use crate::config::{load_settings_from, load_settings_or_default, Settings};
use crate::core::{ConversationRegistry, SenderRole, StateChange};
use crate::seed::SeedData;
use crate::session::{Session, SessionHandle};
use crate::simulator::CannedReply;

/// ConvoDesk - business messaging console.
#[derive(Parser)]
#[command(name = "convodesk")]
#[command(version = "0.1.0")]
#[command(about = "ConvoDesk - customer conversations from every channel in one place", long_about = None)]
pub struct Commands {
    /// Settings file (defaults to ~/.convodesk/settings.json)
    #[arg(long, global = true, env = "CONVODESK_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Seed file with the initial conversations
    #[arg(long, global = true)]
    pub seed: Option<PathBuf>,

    /// Delay before the automated assistant replies, in milliseconds
    #[arg(long, global = true)]
    pub delay_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List conversations
    List,

    /// Show one conversation
    Show {
        /// Conversation ID
        id: String,
    },

    /// Run the scripted demo: open a conversation, reply, wait for the assistant
    Demo {
        /// Conversation to reply in
        #[arg(long, default_value = "c1")]
        id: String,

        /// Message to send
        #[arg(long, default_value = "Hello! Happy to help with returns.")]
        message: String,
    },

    /// Interactive operator console
    Console,
}

impl Commands {
    /// Run the command.
    pub async fn run(&self) -> Result<()> {
        let settings = self.settings()?;
        match &self.command {
            Command::List => cmd_list(&settings).await,
            Command::Show { id } => cmd_show(&settings, id).await,
            Command::Demo { id, message } => cmd_demo(&settings, id, message).await,
            Command::Console => cmd_console(&settings).await,
        }
    }

    /// Settings with command-line overrides applied.
    fn settings(&self) -> Result<Settings> {
        let mut settings = match &self.settings {
            Some(path) => load_settings_from(path)
                .with_context(|| format!("loading settings from {}", path.display()))?,
            None => load_settings_or_default(),
        };
        if let Some(seed) = &self.seed {
            settings.seed.path = Some(seed.clone());
        }
        if let Some(delay_ms) = self.delay_ms {
            settings.simulator.reply_delay_ms = delay_ms;
        }
        Ok(settings)
    }
}

fn load_registry(settings: &Settings) -> Result<ConversationRegistry> {
    let seed = match &settings.seed.path {
        Some(path) => SeedData::from_path(path)
            .with_context(|| format!("loading seed from {}", path.display()))?,
        None => SeedData::demo()?,
    };
    Ok(seed.into_registry(Utc::now())?)
}

fn start_session(settings: &Settings, preselect_first: bool) -> Result<SessionHandle> {
    let registry = load_registry(settings)?;
    let mut options = settings.session_options();
    options.preselect_first = preselect_first;

    let generator = CannedReply::new(settings.simulator.reply_text.clone());
    Ok(Session::spawn(registry, options, Box::new(generator)))
}

// Command implementations

async fn cmd_list(settings: &Settings) -> Result<()> {
    let session = start_session(settings, false)?;
    let summaries = session.conversation_summaries().await?;
    print!("{}", render_summaries(&summaries, None, Utc::now()));
    session.shutdown().await?;
    Ok(())
}

async fn cmd_show(settings: &Settings, id: &str) -> Result<()> {
    let session = start_session(settings, false)?;
    session.select(id).await?;
    print!("{}", render_thread(&session.active_thread_view().await?, Utc::now()));
    session.shutdown().await?;
    Ok(())
}

async fn cmd_demo(settings: &Settings, id: &str, message: &str) -> Result<()> {
    let session = start_session(settings, false)?;
    let mut changes = session.changes();

    print!(
        "{}",
        render_summaries(&session.conversation_summaries().await?, None, Utc::now())
    );
    println!();

    session.select(id).await?;
    let sent = session.send_operator_message(id, message).await?;
    println!("Sent {} to {}; waiting for the assistant...", sent.id, id);

    // Generous upper bound; the follow-up normally lands after one delay.
    let wait = settings.reply_delay() * 5 + Duration::from_secs(1);
    let follow_up = tokio::time::timeout(wait, async {
        while let Some(change) = changes.next().await {
            if let StateChange::MessageAppended {
                conversation_id,
                message,
            } = change
            {
                if conversation_id == id && message.sender == SenderRole::Assistant {
                    return Some(message);
                }
            }
        }
        None
    })
    .await
    .ok()
    .flatten();

    if follow_up.is_none() {
        println!("No automated reply within {:?}", wait);
    }

    println!();
    print!("{}", render_thread(&session.active_thread_view().await?, Utc::now()));
    session.shutdown().await?;
    Ok(())
}

async fn cmd_console(settings: &Settings) -> Result<()> {
    let session = start_session(settings, settings.session.preselect_first)?;
    tracing::info!("Console session {} started", session.id());
    run_console(session).await
}

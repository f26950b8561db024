//! CLI channel: stdin/stdout REPL for local testing.

use std::io::Write;

use futures::{StreamExt, stream};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use crate::channels::InputStream;
use crate::dialogue::{DialogueMachine, OutgoingMessage, Session};
use crate::error::Result;

/// Typing this ends the CLI session.
pub const QUIT_COMMAND: &str = "/quit";

/// Runs one dialogue session against a terminal.
pub struct CliChannel;

impl CliChannel {
    pub fn new() -> Self {
        Self
    }

    /// Stream of non-empty stdin lines. Ends on EOF or a read error.
    pub fn stdin_lines(&self) -> InputStream {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();

        tokio::spawn(async move {
            let reader = BufReader::new(tokio::io::stdin());
            let mut lines = reader.lines();

            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let line = line.trim().to_string();
                        if line.is_empty() {
                            eprint!("> ");
                            continue;
                        }
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Ok(None) => break, // EOF
                    Err(e) => {
                        tracing::error!("Error reading stdin: {}", e);
                        break;
                    }
                }
            }
        });

        Box::pin(stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|line| (line, rx))
        }))
    }

    /// Drive a fresh session from `input`, writing replies to `out`.
    /// Returns the session as it stood when input ended.
    pub async fn drive<W: Write>(
        &self,
        machine: &DialogueMachine,
        mut input: InputStream,
        out: &mut W,
    ) -> Result<Session> {
        let mut session = Session::new();
        render(out, &machine.greeting())?;

        while let Some(line) = input.next().await {
            if line == QUIT_COMMAND {
                info!("CLI session ended by user");
                break;
            }
            let turn = machine.handle(session, &line).await;
            render(out, &turn.messages)?;
            session = turn.session;
        }
        Ok(session)
    }
}

impl Default for CliChannel {
    fn default() -> Self {
        Self::new()
    }
}

fn render<W: Write>(out: &mut W, messages: &[OutgoingMessage]) -> Result<()> {
    for message in messages {
        writeln!(out, "\n{}", message.text)?;
        if !message.options.is_empty() {
            let choices: Vec<String> = message.options.iter().map(|o| format!("[{o}]")).collect();
            writeln!(out, "   {}", choices.join(" "))?;
        }
    }
    out.flush()?;
    eprint!("> ");
    Ok(())
}

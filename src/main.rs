use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use docqa_backend::core::config::AppPaths;
use docqa_backend::core::logging;
use docqa_backend::state::AppState;

const HELP: &str = "Commands: /new, /session <id>, /sessions, /history, /end, /quit. Anything else is a question.";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let paths = Arc::new(AppPaths::new());
    logging::init(&paths);

    let state = AppState::initialize(paths)
        .await
        .context("Failed to initialize application state")?;

    let mut session_id = state.sessions.create_session();
    tracing::info!("Ready (session {})", session_id);

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    write_line(&mut stdout, HELP).await?;

    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let reply = match line.split_once(' ').unwrap_or((line, "")) {
            ("/quit", _) => break,
            ("/new", _) => {
                session_id = state.sessions.create_session();
                format!("Started session {session_id}")
            }
            ("/session", id) if !id.trim().is_empty() => {
                session_id = id.trim().to_string();
                format!("Switched to session {session_id}")
            }
            ("/sessions", _) => state
                .sessions
                .list_sessions()
                .await
                .iter()
                .map(|s| format!("{} ({} entries, updated {})", s.id, s.message_count, s.updated_at))
                .collect::<Vec<_>>()
                .join("\n"),
            ("/history", _) => state
                .sessions
                .history(&session_id)
                .await
                .map(|entries| entries.join("\n"))
                .unwrap_or_else(|| "(empty)".to_string()),
            ("/end", _) => {
                let ended = session_id.clone();
                let outcome = state.sessions.end_session(&ended, state.index.as_ref()).await;
                session_id = state.sessions.create_session();
                match outcome {
                    Ok(_) => format!("Ended session {ended}; started {session_id}"),
                    Err(err) => format!("Ended session {ended} (cleanup failed: {err}); started {session_id}"),
                }
            }
            (cmd, _) if cmd.starts_with('/') => HELP.to_string(),
            _ => {
                state
                    .sessions
                    .ask(&state.pipeline, Some(&session_id), line)
                    .await
            }
        };

        write_line(&mut stdout, &reply).await?;
    }

    Ok(())
}

async fn write_line(stdout: &mut tokio::io::Stdout, text: &str) -> anyhow::Result<()> {
    stdout.write_all(text.as_bytes()).await?;
    stdout.write_all(b"\n").await?;
    stdout.flush().await?;
    Ok(())
}

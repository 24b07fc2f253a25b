//! Interactive mode.
//!
//! One session stays open for the whole run. `quit`, Ctrl-C, or end of input
//! is the shutdown intent: the model is saved and the process exits only after
//! the store acknowledged the save. A failed save hands the session back to the
//! prompt so the edits can still be saved; only when no more input can arrive
//! does the shell give up.

use anyhow::{anyhow, bail, Result};
use clap::Parser;
use progresso_progress::ProgressEngine;
use progresso_storage::{Session, ShutdownAck, Storage};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tracing::{debug, info, warn};

use crate::commands::{self, Op};
use crate::config::AppConfig;

#[derive(Parser)]
#[command(no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    op: Op,
}

enum Step {
    Continue,
    Quit,
}

/// Why the read loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Exit {
    Quit,
    Interrupted,
    /// End of input or an unreadable stream; nothing more will arrive.
    InputClosed,
}

pub async fn run<S: Storage>(session: Session<S>, engine: ProgressEngine, config: AppConfig) -> Result<()> {
    println!("progresso shell - `help` for commands, `quit` or Ctrl-D to save and exit");
    let lines = BufReader::new(tokio::io::stdin()).lines();
    let ack = drive(lines, session, &engine, &config).await?;
    println!("Saved {} bytes to {}", ack.bytes, ack.key);
    Ok(())
}

/// Read and apply commands until a shutdown intent, then save. Loops back to
/// the prompt while the save fails and input is still available.
async fn drive<S, R>(
    mut lines: Lines<R>,
    mut session: Session<S>,
    engine: &ProgressEngine,
    config: &AppConfig,
) -> Result<ShutdownAck>
where
    S: Storage,
    R: AsyncBufRead + Unpin,
{
    loop {
        let exit = read_commands(&mut lines, &mut session, engine, config).await;
        match session.shutdown().await {
            Ok(ack) => return Ok(ack),
            Err((_, err)) if exit == Exit::InputClosed => {
                bail!("Failed to save before exit and no more input to retry: {err}")
            }
            Err((back, err)) => {
                eprintln!("error: failed to save: {err}");
                eprintln!("Edits are still in memory. Fix the problem, then `save` or `quit` to retry.");
                session = back;
            }
        }
    }
}

async fn read_commands<S, R>(
    lines: &mut Lines<R>,
    session: &mut Session<S>,
    engine: &ProgressEngine,
    config: &AppConfig,
) -> Exit
where
    S: Storage,
    R: AsyncBufRead + Unpin,
{
    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    if let Step::Quit = step(&line, session, engine, config).await {
                        return Exit::Quit;
                    }
                }
                Ok(None) => {
                    debug!("End of input");
                    return Exit::InputClosed;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to read input, saving and exiting");
                    eprintln!("error: failed to read input: {e}");
                    return Exit::InputClosed;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                return Exit::Interrupted;
            }
        }
    }
}

async fn step<S: Storage>(
    line: &str,
    session: &mut Session<S>,
    engine: &ProgressEngine,
    config: &AppConfig,
) -> Step {
    let words = match split_line(line) {
        Ok(words) => words,
        Err(e) => {
            eprintln!("error: {e}");
            return Step::Continue;
        }
    };
    match words.first().map(String::as_str) {
        None => {}
        Some("quit" | "exit") => return Step::Quit,
        Some("save") => match session.save().await {
            Ok(bytes) => println!("Saved {bytes} bytes"),
            Err(e) => eprintln!("error: {e}"),
        },
        Some(_) => match ShellLine::try_parse_from(&words) {
            Ok(parsed) => match commands::apply(parsed.op, session, engine, config) {
                Ok(out) => println!("{out}"),
                Err(e) => eprintln!("error: {e:#}"),
            },
            // Help and usage errors alike are printed, never fatal.
            Err(e) => {
                let _ = e.print();
            }
        },
    }
    Step::Continue
}

/// Split a line into words, honoring double quotes so names may contain
/// spaces.
fn split_line(line: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut pending = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                quoted = !quoted;
                pending = true;
            }
            c if c.is_whitespace() && !quoted => {
                if pending {
                    words.push(std::mem::take(&mut current));
                    pending = false;
                }
            }
            c => {
                current.push(c);
                pending = true;
            }
        }
    }
    if quoted {
        return Err(anyhow!("Unterminated quote"));
    }
    if pending {
        words.push(current);
    }
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use chrono::NaiveDate;
    use progresso_storage::{JsonStorage, MemoryStorage, StorageError};

    struct ReadOnly;

    #[async_trait::async_trait]
    impl Storage for ReadOnly {
        async fn save(&mut self, _key: &str, _blob: &[u8]) -> progresso_storage::Result<()> {
            Err(StorageError::Other("read-only".to_string()))
        }
        async fn load(&self, _key: &str) -> progresso_storage::Result<Option<Vec<u8>>> {
            Ok(None)
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 6).unwrap()
    }

    #[test]
    fn test_split_line() {
        assert_eq!(split_line("  task add  Guitar \"Major scales\" ").unwrap(), vec![
            "task",
            "add",
            "Guitar",
            "Major scales"
        ]);
        assert_eq!(split_line("skill rename Guitar \"\"").unwrap(), vec!["skill", "rename", "Guitar", ""]);
        assert!(split_line("").unwrap().is_empty());
        assert!(split_line("skill add \"Guitar").is_err());
    }

    #[tokio::test]
    async fn test_steps_apply_and_quit() {
        let mut session = Session::open_at(MemoryStorage::new(), "ProgressoData", today()).await.unwrap();
        let engine = ProgressEngine::new();
        let config = AppConfig::default();

        assert!(matches!(step("skill add \"Music theory\"", &mut session, &engine, &config).await, Step::Continue));
        assert!(matches!(step("nonsense", &mut session, &engine, &config).await, Step::Continue));
        assert!(matches!(step("quit", &mut session, &engine, &config).await, Step::Quit));
        assert_eq!(session.model().skills[0].name, "Music theory");
    }

    /// Refuses the first `failures` saves, then keeps the last blob.
    struct Flaky {
        failures: usize,
        saved: Arc<Mutex<Vec<u8>>>,
    }

    #[async_trait::async_trait]
    impl Storage for Flaky {
        async fn save(&mut self, _key: &str, blob: &[u8]) -> progresso_storage::Result<()> {
            if self.failures > 0 {
                self.failures -= 1;
                return Err(StorageError::Other("disk full".to_string()));
            }
            *self.saved.lock().unwrap() = blob.to_vec();
            Ok(())
        }
        async fn load(&self, _key: &str) -> progresso_storage::Result<Option<Vec<u8>>> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_unreadable_input_still_saves() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonStorage::new(dir.path()).await.unwrap();
        let session = Session::open_at(storage, "ProgressoData", today()).await.unwrap();
        let input: &[u8] = b"skill add Guitar\nskill add Piano\n\xff\xfe\nquit\n";

        let ack = drive(input.lines(), session, &ProgressEngine::new(), &AppConfig::default())
            .await
            .unwrap();
        assert_eq!(ack.key, "ProgressoData");

        let saved = std::fs::read_to_string(dir.path().join("ProgressoData.json")).unwrap();
        assert!(saved.contains("Guitar"));
        assert!(saved.contains("Piano"));
    }

    #[tokio::test]
    async fn test_failed_save_returns_to_prompt() {
        let saved = Arc::new(Mutex::new(Vec::new()));
        let storage = Flaky {
            failures: 1,
            saved: Arc::clone(&saved),
        };
        let session = Session::open_at(storage, "ProgressoData", today()).await.unwrap();
        let input: &[u8] = b"skill add Guitar\nquit\nskill add Piano\nquit\n";

        drive(input.lines(), session, &ProgressEngine::new(), &AppConfig::default())
            .await
            .unwrap();

        let blob = String::from_utf8(saved.lock().unwrap().clone()).unwrap();
        assert!(blob.contains("Guitar"));
        assert!(blob.contains("Piano"));
    }

    #[tokio::test]
    async fn test_failed_save_at_end_of_input_is_an_error() {
        let session = Session::open_at(ReadOnly, "ProgressoData", today()).await.unwrap();
        let input: &[u8] = b"theme\n";

        let err = drive(input.lines(), session, &ProgressEngine::new(), &AppConfig::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("read-only"));
    }
}

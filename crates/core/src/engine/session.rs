//! One engine process per query
//!
//! Spawns the engine as a subprocess and talks UCI over its stdin/stdout.
//! A session walks `Spawned -> Configured -> PositionSet -> Searching ->
//! Drained -> Terminated` and is never reused.

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use tracing::debug;

use super::info::PvTable;
use crate::config::EngineConfig;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Spawned,
    Configured,
    PositionSet,
    Searching,
    Drained,
    Terminated,
}

/// Everything read between `go` and `bestmove`
#[derive(Debug, Default)]
pub struct SearchOutcome {
    pub table: PvTable,
    /// Move from the `bestmove` marker, if any
    pub best_move: Option<String>,
}

pub struct EngineSession {
    /// The child process
    process: Child,
    /// Stdin for sending commands
    stdin: ChildStdin,
    /// Stdout reader for receiving responses
    stdout: BufReader<ChildStdout>,
    state: SessionState,
}

impl EngineSession {
    /// Spawns the engine and completes the `uci` handshake.
    pub fn spawn(config: &EngineConfig) -> Result<Self> {
        debug!("Spawning engine {}", config.path.display());

        let mut process = Command::new(&config.path)
            .args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                Error::EngineUnavailable(format!("failed to start {}: {}", config.path.display(), e))
            })?;

        let stdin = process
            .stdin
            .take()
            .ok_or_else(|| Error::engine("failed to open stdin"))?;

        let stdout = process
            .stdout
            .take()
            .ok_or_else(|| Error::engine("failed to open stdout"))?;

        let mut session = EngineSession {
            process,
            stdin,
            stdout: BufReader::new(stdout),
            state: SessionState::Spawned,
        };

        session.send("uci")?;
        session.read_until("uciok")?;

        Ok(session)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    fn send(&mut self, cmd: &str) -> Result<()> {
        debug!(">> {}", cmd);
        writeln!(self.stdin, "{}", cmd).map_err(Error::engine)?;
        self.stdin.flush().map_err(Error::engine)?;
        Ok(())
    }

    /// Next trimmed line, or `None` once the engine closed stdout.
    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        let read = self.stdout.read_line(&mut line).map_err(Error::engine)?;
        if read == 0 {
            return Ok(None);
        }
        let line = line.trim().to_string();
        debug!("<< {}", line);
        Ok(Some(line))
    }

    fn read_until(&mut self, expected: &str) -> Result<()> {
        loop {
            match self.read_line()? {
                Some(line) if line.starts_with(expected) => return Ok(()),
                Some(_) => continue,
                None => {
                    return Err(Error::EngineUnavailable(format!(
                        "engine exited while waiting for {}",
                        expected
                    )))
                }
            }
        }
    }

    /// Applies options and waits for the engine to acknowledge them.
    ///
    /// `multipv` is only sent when more than the default single line is
    /// wanted.
    pub fn configure(&mut self, multipv: Option<u32>) -> Result<()> {
        if let Some(lines) = multipv {
            self.send(&format!("setoption name MultiPV value {}", lines))?;
        }
        self.send("isready")?;
        self.read_until("readyok")?;
        self.state = SessionState::Configured;
        Ok(())
    }

    pub fn set_position(&mut self, fen: &str) -> Result<()> {
        self.send(&format!("position fen {}", fen))?;
        self.state = SessionState::PositionSet;
        Ok(())
    }

    /// Searches to a fixed depth and drains output up to `bestmove`.
    pub fn search(&mut self, depth: u8) -> Result<SearchOutcome> {
        self.send(&format!("go depth {}", depth))?;
        self.state = SessionState::Searching;

        let mut outcome = SearchOutcome::default();
        loop {
            let Some(line) = self.read_line()? else {
                return Err(Error::engine("engine exited before finishing the search"));
            };

            if line.starts_with("bestmove") {
                // "bestmove e2e4 ponder e7e5" or "bestmove (none)"
                outcome.best_move = line
                    .split_whitespace()
                    .nth(1)
                    .filter(|m| *m != "(none)")
                    .map(str::to_string);
                break;
            } else if line.starts_with("info") {
                outcome.table.observe(&line);
            }
        }

        self.state = SessionState::Drained;
        Ok(outcome)
    }

    /// Sends `quit` and waits for the process to exit.
    pub fn quit(&mut self) -> Result<()> {
        if self.state == SessionState::Terminated {
            return Ok(());
        }
        self.state = SessionState::Terminated;

        // The engine may already be gone; the wait below still reaps it.
        let _ = self.send("quit");
        let status = self.process.wait().map_err(Error::engine)?;
        debug!("Engine exited with {}", status);
        Ok(())
    }
}

impl Drop for EngineSession {
    fn drop(&mut self) {
        if self.state != SessionState::Terminated {
            let _ = self.process.kill();
            let _ = self.process.wait();
        }
    }
}

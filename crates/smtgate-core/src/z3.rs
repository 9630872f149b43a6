//! Z3 engine over an external process
//!
//! Each session is one `z3 -in -smt2` child process. Commands go to its stdin
//! as SMT-LIB text, answers are read back from stdout one complete
//! s-expression at a time. The process is killed when the session is dropped.

use crate::engine::{Engine, EngineModel, Session, Verdict};
use crate::error::{EngineError, Result};
use crate::sexpr::{self, DepthTracker, SExpr};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::debug;
use uuid::Uuid;

/// How to launch Z3
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Z3Config {
    /// Path or name of the z3 executable
    pub binary: PathBuf,

    /// Soft timeout handed to z3 for each query, in milliseconds (0 = none)
    pub timeout_ms: u64,

    /// Extra command-line arguments
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for Z3Config {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("z3"),
            timeout_ms: 30_000,
            args: Vec::new(),
        }
    }
}

impl Z3Config {
    /// Full argument list for the child process
    pub fn command_args(&self) -> Vec<String> {
        let mut args = vec!["-in".to_string(), "-smt2".to_string()];
        if self.timeout_ms > 0 {
            args.push(format!("-t:{}", self.timeout_ms));
        }
        args.extend(self.args.iter().cloned());
        args
    }
}

/// Engine that spawns one z3 process per session
#[derive(Debug, Clone, Default)]
pub struct Z3Engine {
    config: Z3Config,
}

impl Z3Engine {
    pub fn new(config: Z3Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Z3Config {
        &self.config
    }
}

#[async_trait]
impl Engine for Z3Engine {
    fn name(&self) -> &str {
        "z3"
    }

    async fn new_session(&self) -> Result<Box<dyn Session>> {
        Ok(Box::new(Z3Session::spawn(&self.config)?))
    }
}

/// A live z3 process
pub struct Z3Session {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl Z3Session {
    pub fn spawn(config: &Z3Config) -> Result<Self> {
        let mut child = Command::new(&config.binary)
            .args(config.command_args())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(EngineError::Spawn)?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| EngineError::Protocol("solver stdin was not captured".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| EngineError::Protocol("solver stdout was not captured".to_string()))?;

        debug!(pid = child.id(), binary = %config.binary.display(), "Spawned solver process");
        Ok(Self {
            child,
            stdin,
            stdout: BufReader::new(stdout),
        })
    }

    /// Send one command and read its answer
    async fn command(&mut self, command: &str) -> Result<String> {
        self.stdin.write_all(command.as_bytes()).await?;
        self.stdin.write_all(b"\n").await?;
        self.stdin.flush().await?;

        match read_response(&mut self.stdout).await? {
            Some(response) => Ok(response),
            None => Err(self.exited(&format!("while answering {}", command)).await),
        }
    }

    /// Build the error for a process that closed its stdout
    async fn exited(&mut self, context: &str) -> EngineError {
        let mut stderr = String::new();
        if let Some(mut pipe) = self.child.stderr.take() {
            pipe.read_to_string(&mut stderr).await.ok();
        }
        let status = self
            .child
            .wait()
            .await
            .map(|s| s.to_string())
            .unwrap_or_else(|e| e.to_string());
        let stderr = stderr.trim();
        if stderr.is_empty() {
            EngineError::Exited(format!("{} ({})", context, status))
        } else {
            EngineError::Exited(format!("{} ({}): {}", context, status, stderr))
        }
    }
}

#[async_trait]
impl Session for Z3Session {
    async fn submit(&mut self, text: &str) -> Result<()> {
        check_script(text)?;

        // The echo marks the end of the submission's output; a fresh marker
        // cannot collide with anything the constraint prints itself
        let marker = format!("smtgate-ack-{}", Uuid::new_v4().simple());
        let script = format!("{}\n(echo \"{}\")\n", text, marker);

        let stdin = &mut self.stdin;
        let stdout = &mut self.stdout;
        let write = async {
            stdin.write_all(script.as_bytes()).await?;
            stdin.flush().await
        };
        // Read while writing so a chatty solver never blocks on a full pipe
        let (written, acknowledged) = tokio::join!(write, read_until_marker(stdout, &marker));

        let errors = match acknowledged? {
            Some(errors) => errors,
            None => return Err(self.exited("before acknowledging the constraint").await),
        };
        written?;

        if errors.is_empty() {
            Ok(())
        } else {
            Err(EngineError::Parse(errors.join("; ")))
        }
    }

    async fn check(&mut self) -> Result<Verdict> {
        let response = self.command("(check-sat)").await?;
        if let Some(message) = error_message(&response) {
            return Err(EngineError::Solver(message));
        }
        response
            .parse::<Verdict>()
            .map_err(|_| EngineError::Protocol(format!("unexpected check-sat answer: {}", response)))
    }

    async fn model(&mut self) -> Result<EngineModel> {
        let response = self.command("(get-model)").await?;
        if let Some(message) = error_message(&response) {
            return Err(EngineError::Solver(message));
        }
        EngineModel::parse(&response)
    }
}

/// Reject text that would desynchronize the conversation before it reaches
/// the solver: unbalanced lists, unterminated literals, and top-level atoms
/// (every SMT-LIB command is a parenthesized list)
pub fn check_script(text: &str) -> Result<()> {
    let commands = sexpr::parse_all(text).map_err(|e| EngineError::Parse(e.to_string()))?;
    match commands.iter().find(|command| !matches!(command, SExpr::List(_))) {
        Some(stray) => Err(EngineError::Parse(format!(
            "invalid command, '(' expected before '{}'",
            stray
        ))),
        None => Ok(()),
    }
}

/// Message of an `(error "...")` answer
///
/// The message is taken from the raw text: solvers escape quotes inside it
/// either as `""` or as `\"`. When the quoting cannot be undone the raw
/// answer is returned.
pub fn error_message(response: &str) -> Option<String> {
    let body = response.trim().strip_prefix("(error")?;
    if !body.starts_with(|c: char| c.is_whitespace() || c == '"') {
        return None;
    }
    let quoted = body
        .trim()
        .strip_suffix(')')
        .map(str::trim)
        .and_then(|inner| inner.strip_prefix('"'))
        .and_then(|inner| inner.strip_suffix('"'));

    Some(match quoted {
        Some(message) => unescape_message(message),
        None => response.trim().to_string(),
    })
}

fn unescape_message(message: &str) -> String {
    let mut unescaped = String::with_capacity(message.len());
    let mut chars = message.chars().peekable();
    while let Some(c) = chars.next() {
        match (c, chars.peek()) {
            ('\\', Some(&next)) if next == '"' || next == '\\' => {
                unescaped.push(next);
                chars.next();
            }
            ('"', Some('"')) => {
                unescaped.push('"');
                chars.next();
            }
            _ => unescaped.push(c),
        }
    }
    unescaped
}

/// True if `response` is the echo of `marker`, bare or as a string literal
fn is_marker(response: &str, marker: &str) -> bool {
    response == marker
        || response
            .strip_prefix('"')
            .and_then(|rest| rest.strip_suffix('"'))
            == Some(marker)
}

/// Read one complete answer; `None` on end of stream
async fn read_response(stdout: &mut BufReader<ChildStdout>) -> Result<Option<String>> {
    let mut tracker = DepthTracker::new();
    let mut response = String::new();
    let mut line = String::new();
    loop {
        line.clear();
        if stdout.read_line(&mut line).await? == 0 {
            return Ok(None);
        }
        tracker.feed(&line);
        response.push_str(&line);
        if tracker.is_complete() {
            return Ok(Some(response.trim().to_string()));
        }
    }
}

/// Read answers up to the acknowledgement marker, collecting error messages
async fn read_until_marker(
    stdout: &mut BufReader<ChildStdout>,
    marker: &str,
) -> Result<Option<Vec<String>>> {
    let mut errors = Vec::new();
    while let Some(response) = read_response(stdout).await? {
        if is_marker(&response, marker) {
            return Ok(Some(errors));
        }
        match error_message(&response) {
            Some(message) => errors.push(message),
            None => debug!(output = %response, "Ignoring solver output before acknowledgement"),
        }
    }
    Ok(None)
}

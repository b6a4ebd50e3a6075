//! Process-backed agent invoker.
//!
//! Spawns the configured agent command, reads stdout and stderr concurrently and
//! funnels both through one channel so chunks reach the tee in arrival order.

use async_trait::async_trait;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::tee::TeeWriter;
use super::{AgentInvoker, InvocationError, InvocationResult};
use crate::config::{AgentConfig, CONTEXT_PLACEHOLDER};

const READ_CHUNK_BYTES: usize = 8 * 1024;
const CHUNK_QUEUE_DEPTH: usize = 64;

/// Runs the agent as a child process
#[derive(Debug, Clone)]
pub struct ProcessInvoker {
    command: String,
    args: Vec<String>,
    working_dir: Option<PathBuf>,
    timeout: Option<Duration>,
    max_output_bytes: Option<usize>,
}

impl ProcessInvoker {
    /// Create an invoker for `command` with argument template `args`
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
            working_dir: None,
            timeout: None,
            max_output_bytes: None,
        }
    }

    pub fn from_config(config: &AgentConfig) -> Self {
        let mut invoker = Self::new(config.command.clone(), config.args.clone())
            .timeout(config.timeout_ms.map(Duration::from_millis))
            .max_output_bytes(config.max_output_bytes);
        invoker.working_dir = config.working_dir.clone();
        invoker
    }

    /// Set the directory the agent runs in
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Kill the agent if it runs longer than this
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Retain at most this many bytes of captured output
    pub fn max_output_bytes(mut self, limit: Option<usize>) -> Self {
        self.max_output_bytes = limit;
        self
    }

    /// Expand the argument template with the context files.
    ///
    /// Context files are rendered as `@<path>` references. Arguments containing
    /// the placeholder get all references joined by spaces; without a
    /// placeholder each reference is appended as its own argument.
    pub fn build_args(&self, context: &[PathBuf]) -> Vec<String> {
        let refs: Vec<String> = context.iter().map(|p| format!("@{}", p.display())).collect();

        if self.args.iter().any(|arg| arg.contains(CONTEXT_PLACEHOLDER)) {
            let joined = refs.join(" ");
            self.args
                .iter()
                .map(|arg| arg.replace(CONTEXT_PLACEHOLDER, &joined))
                .collect()
        } else {
            self.args.iter().cloned().chain(refs).collect()
        }
    }

    fn spawn(&self, context: &[PathBuf]) -> io::Result<Child> {
        let mut cmd = Command::new(&self.command);
        cmd.args(self.build_args(context))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        cmd.spawn()
    }
}

#[async_trait]
impl AgentInvoker for ProcessInvoker {
    async fn run(&self, context: &[PathBuf], live: &mut (dyn Write + Send)) -> InvocationResult {
        log::info!("Invoking agent: {} ({} context files)", self.command, context.len());

        let mut child = match self.spawn(context) {
            Ok(child) => child,
            Err(e) => {
                log::warn!("Failed to launch {}: {}", self.command, e);
                return InvocationResult::failed(
                    String::new(),
                    InvocationError::Launch {
                        command: self.command.clone(),
                        reason: e.to_string(),
                    },
                );
            }
        };

        let (tx, mut rx) = mpsc::channel::<Vec<u8>>(CHUNK_QUEUE_DEPTH);
        let mut readers: Vec<JoinHandle<io::Result<()>>> = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            readers.push(tokio::spawn(pump(stdout, tx.clone())));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(tokio::spawn(pump(stderr, tx.clone())));
        }
        drop(tx);

        let mut tee = TeeWriter::new(live, self.max_output_bytes);

        let status = match self.timeout {
            None => Some(drain(&mut rx, &mut tee, &mut child).await),
            Some(limit) => tokio::time::timeout(limit, drain(&mut rx, &mut tee, &mut child))
                .await
                .ok(),
        };

        let Some(status) = status else {
            let limit_ms = self.timeout.map(|t| t.as_millis() as u64).unwrap_or_default();
            log::warn!("Agent exceeded {}ms, killing", limit_ms);
            if let Err(e) = child.kill().await {
                log::warn!("Failed to kill agent: {}", e);
            }
            // Descendants may still hold the pipes open; keep only what already arrived
            for reader in &readers {
                reader.abort();
            }
            while let Ok(chunk) = rx.try_recv() {
                let _ = tee.write_all(&chunk);
            }
            return InvocationResult::failed(tee.into_output(), InvocationError::TimedOut(limit_ms));
        };

        let mut capture_error = None;
        for reader in readers {
            match reader.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => capture_error = Some(e.to_string()),
                Err(e) => capture_error = Some(e.to_string()),
            }
        }

        if tee.dropped() > 0 {
            log::debug!("Discarded {} bytes of agent output", tee.dropped());
        }
        let output = tee.into_output();

        let status = match status {
            Ok(status) => status,
            Err(e) => return InvocationResult::failed(output, InvocationError::Capture(e.to_string())),
        };

        log::info!("Agent finished: {:?}", status.code());
        if let Some(error) = exit_error(status) {
            return InvocationResult::failed(output, error);
        }
        if let Some(reason) = capture_error {
            return InvocationResult::failed(output, InvocationError::Capture(reason));
        }
        InvocationResult::success(output)
    }
}

/// Copy chunks from one pipe into the shared channel until EOF
async fn pump<R>(mut reader: R, tx: mpsc::Sender<Vec<u8>>) -> io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; READ_CHUNK_BYTES];
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            return Ok(());
        }
        if tx.send(buf[..n].to_vec()).await.is_err() {
            // Receiver gone: the invocation was abandoned
            return Ok(());
        }
    }
}

/// Feed every chunk to the tee until both pipes close, then reap the child
async fn drain(
    rx: &mut mpsc::Receiver<Vec<u8>>,
    tee: &mut TeeWriter<'_>,
    child: &mut Child,
) -> io::Result<ExitStatus> {
    while let Some(chunk) = rx.recv().await {
        tee.write_all(&chunk)?;
    }
    child.wait().await
}

fn exit_error(status: ExitStatus) -> Option<InvocationError> {
    if status.success() {
        return None;
    }
    Some(match status.code() {
        Some(code) => InvocationError::NonZeroExit(code),
        None => InvocationError::Terminated,
    })
}

//! Running the combo generator, either as a child process with a hard wall-clock
//! budget or in-process.

use crate::cache::MetadataCache;
use crate::combos;
use crate::config::Config;
use crate::error::{Result, SkillgraphError};
use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::time::Duration;

const MAX_OUTPUT: usize = 10 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    pub success: bool,
    /// Combined stdout and stderr, trimmed, keeping the last 10KB.
    pub output: String,
}

/// Spawn `command`, draining its pipes on helper threads, and kill it by PID if it
/// outlives `timeout`.
pub fn run_with_timeout(mut command: Command, timeout: Duration) -> Result<ProcessOutput> {
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| SkillgraphError::Subprocess(format!("failed to spawn: {e}")))?;
    let child_pid = child.id();

    let stdout_handle = child.stdout.take();
    let stderr_handle = child.stderr.take();
    let stdout_thread = std::thread::spawn(move || drain(stdout_handle));
    let stderr_thread = std::thread::spawn(move || drain(stderr_handle));

    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let _ = tx.send(child.wait());
    });
    let status = match rx.recv_timeout(timeout) {
        Ok(result) => {
            result.map_err(|e| SkillgraphError::Subprocess(format!("wait failed: {e}")))?
        }
        Err(_) => {
            // the waiter and reader threads unblock once the killed process exits
            kill_process(child_pid);
            return Err(SkillgraphError::Timeout(timeout.as_secs()));
        }
    };

    let stdout = stdout_thread.join().unwrap_or_default();
    let stderr = stderr_thread.join().unwrap_or_default();
    Ok(ProcessOutput {
        success: status.success(),
        output: combine_output(&stdout, &stderr),
    })
}

fn drain<R: Read>(handle: Option<R>) -> String {
    let mut buf = String::new();
    if let Some(mut r) = handle {
        let _ = r.read_to_string(&mut buf);
    }
    buf
}

fn combine_output(stdout: &str, stderr: &str) -> String {
    let output = match (stdout.is_empty(), stderr.is_empty()) {
        (_, true) => stdout.to_string(),
        (true, false) => stderr.to_string(),
        (false, false) => format!("{stdout}\n{stderr}"),
    };
    let trimmed = output.trim();
    if trimmed.len() <= MAX_OUTPUT {
        return trimmed.to_string();
    }
    let mut start = trimmed.len() - MAX_OUTPUT;
    while !trimmed.is_char_boundary(start) {
        start += 1;
    }
    trimmed[start..].to_string()
}

/// Terminate a process by PID using SIGKILL. Best-effort.
fn kill_process(pid: u32) {
    let _ = Command::new("kill")
        .arg("-9")
        .arg(pid.to_string())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();
}

// ---------------------------------------------------------------------------
// ComboGenerator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratorOutcome {
    Applied,
    NotApplied(String),
}

/// The auto-applied action behind undefined combo lists.
pub trait ComboGenerator {
    fn generate(&self) -> GeneratorOutcome;
}

/// Runs `<program> <args...>` with a hard timeout; a zero exit status counts as
/// applied.
pub struct SubprocessGenerator {
    program: PathBuf,
    args: Vec<String>,
    timeout: Duration,
}

impl SubprocessGenerator {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }
}

impl ComboGenerator for SubprocessGenerator {
    fn generate(&self) -> GeneratorOutcome {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        match run_with_timeout(command, self.timeout) {
            Ok(out) if out.success => GeneratorOutcome::Applied,
            Ok(out) => {
                let last = out.output.lines().last().unwrap_or("no output");
                GeneratorOutcome::NotApplied(format!("generator failed: {last}"))
            }
            Err(e) => GeneratorOutcome::NotApplied(e.to_string()),
        }
    }
}

/// Scores and writes combos within the current process.
pub struct InProcessGenerator<'a> {
    cache: &'a MetadataCache,
    config: &'a Config,
}

impl<'a> InProcessGenerator<'a> {
    pub fn new(cache: &'a MetadataCache, config: &'a Config) -> Self {
        Self { cache, config }
    }
}

impl ComboGenerator for InProcessGenerator<'_> {
    fn generate(&self) -> GeneratorOutcome {
        let report = combos::generate(self.cache, self.config, false);
        tracing::debug!(
            "in-process generation: {} updated, {} failed",
            report.updated.len(),
            report.failed.len()
        );
        if report.all_failed() {
            GeneratorOutcome::NotApplied(format!(
                "no descriptor could be written ({})",
                report.failed.join(", ")
            ))
        } else {
            GeneratorOutcome::Applied
        }
    }
}

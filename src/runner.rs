//! Subprocess execution with output capture and cancellation.
//!
//! The runner produces the triple the classifier consumes: the exit
//! failure, the captured stderr text, and the context's termination
//! reason. Cancellation and deadlines kill the child but still collect its
//! exit, so classification always sees a complete invocation outcome.

use std::io;
use std::process::{ExitStatus, Stdio};

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::TerraformConfig;
use crate::context::{wait_canceled, CancelReason, RunContext};
use crate::error::{ExitClassifier, ExitError, ExitFailure, RunError};

/// Captured output of a completed invocation.
#[derive(Debug, Clone)]
pub(crate) struct CommandOutput {
    /// Exit status of the subprocess.
    pub(crate) status: ExitStatus,
    /// Full standard output, lossily decoded.
    pub(crate) stdout: String,
    /// Full standard error, lossily decoded.
    pub(crate) stderr: String,
}

/// Runs the configured binary and turns failures into classified errors.
///
/// Holds no per-invocation state; concurrent invocations through the same
/// runner are independent.
#[derive(Debug)]
pub(crate) struct ProcessRunner {
    config: TerraformConfig,
    classifier: ExitClassifier,
}

impl ProcessRunner {
    pub(crate) fn new(config: TerraformConfig) -> Self {
        Self {
            config,
            classifier: ExitClassifier::new(),
        }
    }

    pub(crate) fn config(&self) -> &TerraformConfig {
        &self.config
    }

    /// Run with only exit code 0 accepted.
    pub(crate) async fn run(
        &self,
        args: &[String],
        ctx: &mut RunContext,
    ) -> Result<CommandOutput, RunError> {
        self.run_accepting(args, &[], ctx).await
    }

    /// Run, additionally accepting the given non-zero exit codes.
    pub(crate) async fn run_accepting(
        &self,
        args: &[String],
        accept: &[i32],
        ctx: &mut RunContext,
    ) -> Result<CommandOutput, RunError> {
        let program = self.config.exec_path.to_string_lossy().into_owned();
        debug!(program = %program, args = ?args, "spawning subprocess");

        let mut command = Command::new(&self.config.exec_path);
        command
            .args(args)
            .current_dir(&self.config.working_dir)
            .env("TF_IN_AUTOMATION", "1")
            .envs(&self.config.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(source) => {
                // Launch failures take the same classification path as exit
                // failures; the classifier returns them unchanged.
                let err = RunError::Launch { program, source };
                return Err(self.classifier.classify(err, "", ctx));
            }
        };

        let stdout_task = drain(child.stdout.take());
        let stderr_task = drain(child.stderr.take());

        let status = self
            .supervise(&mut child, &program, ctx)
            .await
            .map_err(RunError::Capture)?;

        let stdout = collect(stdout_task).await.map_err(RunError::Capture)?;
        let stderr = collect(stderr_task).await.map_err(RunError::Capture)?;

        let accepted = status.success() || status.code().is_some_and(|code| accept.contains(&code));
        if !accepted {
            let failure = ExitFailure::new(program, status);
            let err = RunError::Exit(ExitError::plain(failure, ctx.reason()));
            return Err(self.classifier.classify(err, &stderr, ctx));
        }

        debug!(program = %program, code = ?status.code(), "subprocess completed");
        Ok(CommandOutput {
            status,
            stdout,
            stderr,
        })
    }

    /// Classify an accepted-but-failed invocation after the fact.
    ///
    /// Used by commands that accept a non-zero exit code for its side
    /// channel but still treat the run as failed when the expected output
    /// is missing.
    pub(crate) fn exit_error(&self, output: &CommandOutput, ctx: &RunContext) -> RunError {
        let program = self.config.exec_path.to_string_lossy().into_owned();
        let failure = ExitFailure::new(program, output.status);
        let err = RunError::Exit(ExitError::plain(failure, ctx.reason()));
        self.classifier.classify(err, &output.stderr, ctx)
    }

    /// Wait for the child, racing the context's cancel signal and the
    /// deadline. On either, the child is killed and the reason recorded;
    /// the exit is then collected normally.
    async fn supervise(
        &self,
        child: &mut Child,
        program: &str,
        ctx: &mut RunContext,
    ) -> io::Result<ExitStatus> {
        let limit = ctx.deadline().or(self.config.timeout);
        let cancel = ctx.cancel_signal();

        let canceled = async {
            match cancel {
                Some(rx) => wait_canceled(rx).await,
                None => std::future::pending().await,
            }
        };
        let expired = async {
            match limit {
                Some(limit) => tokio::time::sleep(limit).await,
                None => std::future::pending().await,
            }
        };
        tokio::pin!(canceled, expired);

        loop {
            // A fired signal must not be polled again; its guard goes
            // false once the reason is recorded.
            let interruption = tokio::select! {
                status = child.wait() => return status,
                _ = &mut canceled, if ctx.reason() == CancelReason::None => {
                    CancelReason::Canceled
                }
                _ = &mut expired, if ctx.reason() == CancelReason::None => {
                    CancelReason::DeadlineExceeded
                }
            };

            ctx.set_reason(interruption);
            warn!(program = %program, reason = ?interruption, "killing subprocess");
            let _ = child.start_kill();
        }
    }
}

fn drain<R>(pipe: Option<R>) -> JoinHandle<io::Result<Vec<u8>>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            pipe.read_to_end(&mut buf).await?;
        }
        Ok(buf)
    })
}

async fn collect(task: JoinHandle<io::Result<Vec<u8>>>) -> io::Result<String> {
    let bytes = task.await.map_err(io::Error::other)??;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

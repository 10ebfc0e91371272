use std::process::Stdio;

use tokio::process::Command;

use crate::config::ResolverConfig;
use crate::data_models::ResolverOutput;
use crate::error::GatewayError;

/// Runs the external link resolver, one process per query.
///
/// The process is `<interpreter> <script_dir>/<script> <query>` with
/// `script_dir` as its working directory. The query is passed as a single
/// argv entry; there is no shell in between.
#[derive(Debug, Clone)]
pub struct LinkResolver {
    config: ResolverConfig,
}

impl LinkResolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    pub fn command(&self, query: &str) -> Command {
        let mut cmd = Command::new(&self.config.interpreter);
        cmd.arg(self.config.script_path())
            .arg(query)
            .current_dir(&self.config.script_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    /// Spawns the resolver and waits for it to exit.
    ///
    /// Launch failures, non-zero exits and timeouts all come back as
    /// [`GatewayError::ProcessExecution`]. Stdout is only looked at when the
    /// exit status is success.
    ///
    /// On timeout or cancellation only the direct child is killed; anything
    /// the resolver itself spawned keeps running until it exits.
    pub async fn run(&self, query: &str) -> Result<ResolverOutput, GatewayError> {
        let mut cmd = self.command(query);
        let output = cmd.output();

        let output = match self.config.timeout {
            Some(limit) => tokio::time::timeout(limit, output).await.map_err(|_| {
                GatewayError::execution(format!("timed out after {}s", limit.as_secs()))
            })?,
            None => output.await,
        }
        .map_err(|e| {
            GatewayError::execution(format!(
                "failed to launch {}: {e}",
                self.config.interpreter.display()
            ))
        })?;

        let result = ResolverOutput::new(output.status, &output.stdout, &output.stderr);

        if !result.stderr.is_empty() {
            tracing::debug!(stderr = %result.stderr, "resolver stderr");
        }

        if !result.status.success() {
            let reason = match result.stderr.lines().last() {
                Some(last) => format!("{}: {last}", result.status),
                None => result.status.to_string(),
            };
            return Err(GatewayError::execution(reason));
        }

        Ok(result)
    }
}

// src/exec/process.rs

//! Running a single command bound to a scope.

use std::io;
use std::process::ExitStatus;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::command::CommandSpec;
use crate::errors::{ProcGroupError, Result};
use crate::scope::Scope;

/// Background task copying bytes between a caller stream and a child pipe.
struct Pump {
    stream: &'static str,
    handle: JoinHandle<io::Result<()>>,
}

/// Spawn `spec` and wait for it, killing the process if `scope` ends first.
///
/// - A scope that has already ended never spawns anything.
/// - Spawn failures become [`ProcGroupError::Launch`].
/// - A non-zero exit becomes [`ProcGroupError::Exited`] (or `Signaled`).
/// - Scope expiry or cancellation kills the child and yields
///   [`ProcGroupError::Cancelled`].
pub async fn run_command(spec: CommandSpec, scope: Scope) -> Result<()> {
    let command = spec.label().to_string();

    if let Some(cause) = scope.end() {
        debug!(command = %command, %cause, "scope already ended; not launching");
        return Err(ProcGroupError::Cancelled { command, cause });
    }

    info!(
        command = %command,
        cmd = %spec,
        timeout = ?spec.timeout,
        "starting process"
    );

    let program = spec.program();
    let CommandSpec {
        args,
        env,
        dir,
        stdin,
        stdout,
        stderr,
        ..
    } = spec;

    let (stdin_stdio, stdin_reader) = stdin.into_stdio();
    let (stdout_stdio, stdout_writer) = stdout.into_stdio();
    let (stderr_stdio, stderr_writer) = stderr.into_stdio();

    let mut cmd = Command::new(program);
    cmd.args(&args)
        .stdin(stdin_stdio)
        .stdout(stdout_stdio)
        .stderr(stderr_stdio)
        .kill_on_drop(true);

    if let Some(env) = &env {
        cmd.env_clear().envs(env);
    }
    if let Some(dir) = &dir {
        cmd.current_dir(dir);
    }

    let mut child = cmd.spawn().map_err(|source| ProcGroupError::Launch {
        command: command.clone(),
        source,
    })?;

    debug!(command = %command, pid = ?child.id(), "process spawned");

    let mut pumps = Vec::new();
    if let (Some(reader), Some(pipe)) = (stdin_reader, child.stdin.take()) {
        pumps.push(spawn_input_pump(reader, pipe));
    }
    if let (Some(writer), Some(pipe)) = (stdout_writer, child.stdout.take()) {
        pumps.push(spawn_output_pump("stdout", pipe, writer));
    }
    if let (Some(writer), Some(pipe)) = (stderr_writer, child.stderr.take()) {
        pumps.push(spawn_output_pump("stderr", pipe, writer));
    }

    // Natural exit wins a tie with the scope ending.
    let status = tokio::select! {
        biased;

        status_res = child.wait() => {
            status_res.map_err(|source| ProcGroupError::Wait {
                command: command.clone(),
                source,
            })?
        }

        cause = scope.done() => {
            info!(command = %command, %cause, "scope ended before process exited; killing");
            if let Err(e) = child.kill().await {
                warn!(
                    command = %command,
                    error = %e,
                    "failed to kill child process on cancellation"
                );
            }
            abort_pumps(&pumps);
            return Err(ProcGroupError::Cancelled { command, cause });
        }
    };

    info!(
        command = %command,
        exit_code = status.code().unwrap_or(-1),
        success = status.success(),
        "process exited"
    );

    // The process is gone, but a pump may still be draining a pipe held open
    // by a grandchild; the scope bounds that wait too.
    let pump_error = tokio::select! {
        biased;

        err = drain_pumps(&command, &mut pumps) => err,

        cause = scope.done() => {
            debug!(command = %command, %cause, "scope ended while draining streams");
            abort_pumps(&pumps);
            return Err(ProcGroupError::Cancelled { command, cause });
        }
    };

    if let Some(err) = status_error(&command, status) {
        return Err(err);
    }
    match pump_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn spawn_input_pump(
    mut reader: Box<dyn AsyncRead + Send + Unpin>,
    mut pipe: tokio::process::ChildStdin,
) -> Pump {
    let handle = tokio::spawn(async move {
        let res = tokio::io::copy(&mut reader, &mut pipe).await;
        // Dropping the pipe closes it so the child sees EOF.
        drop(pipe);
        match res {
            Ok(_) => Ok(()),
            // The child is free to exit without reading all of its input.
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
            Err(e) => Err(e),
        }
    });

    Pump {
        stream: "stdin",
        handle,
    }
}

fn spawn_output_pump<R>(
    stream: &'static str,
    mut pipe: R,
    mut writer: Box<dyn AsyncWrite + Send + Unpin>,
) -> Pump
where
    R: AsyncRead + Send + Unpin + 'static,
{
    let handle = tokio::spawn(async move {
        tokio::io::copy(&mut pipe, &mut writer).await?;
        writer.flush().await
    });

    Pump { stream, handle }
}

/// Wait for every pump and keep the first failure.
async fn drain_pumps(command: &str, pumps: &mut [Pump]) -> Option<ProcGroupError> {
    let mut first = None;

    for pump in pumps.iter_mut() {
        let err = match (&mut pump.handle).await {
            Ok(Ok(())) => continue,
            Ok(Err(source)) => ProcGroupError::Stream {
                command: command.to_string(),
                stream: pump.stream,
                source,
            },
            Err(join) => ProcGroupError::Join(join),
        };

        debug!(command = %command, stream = pump.stream, error = %err, "stream pump failed");
        if first.is_none() {
            first = Some(err);
        }
    }

    first
}

fn abort_pumps(pumps: &[Pump]) {
    for pump in pumps {
        pump.handle.abort();
    }
}

fn status_error(command: &str, status: ExitStatus) -> Option<ProcGroupError> {
    if status.success() {
        return None;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return Some(ProcGroupError::Signaled {
                command: command.to_string(),
                signal,
            });
        }
    }

    Some(ProcGroupError::Exited {
        command: command.to_string(),
        code: status.code().unwrap_or(-1),
    })
}

//! Control socket: server (during `batchdl serve`) and clients (`submit`, `poll`).
//!
//! One request per connection:
//! - `submit`, then one URL per line, then a line with a single `.`;
//!   answered with `ok <job id>` or `error <message>`. Lines starting with
//!   `.` are sent with one extra leading `.` (dot-stuffing).
//! - `poll <job id>`; answered with one line of snapshot JSON.

use anyhow::{Context, Result};
use batchdl_core::job::JobSnapshot;
use batchdl_core::service::BatchService;
use std::os::unix::fs::FileTypeExt;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};

const END_OF_URLS: &str = ".";

/// Binds `path` (replacing a stale socket file) and serves requests in a
/// background task until the returned handle is aborted. Refuses to replace
/// anything at `path` that is not a socket.
pub fn spawn_control_listener(
    service: Arc<BatchService>,
    path: impl AsRef<Path>,
) -> Result<tokio::task::JoinHandle<()>> {
    let path = path.as_ref().to_path_buf();
    match std::fs::symlink_metadata(&path) {
        Ok(meta) if meta.file_type().is_socket() => std::fs::remove_file(&path)
            .with_context(|| format!("remove stale control socket {}", path.display()))?,
        Ok(_) => anyhow::bail!("{} exists and is not a socket", path.display()),
        Err(_) => {}
    }
    let listener = UnixListener::bind(&path)
        .with_context(|| format!("bind control socket {}", path.display()))?;
    let handle = tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((stream, _)) => {
                    let service = Arc::clone(&service);
                    tokio::spawn(async move {
                        if let Err(e) = serve_connection(&service, stream).await {
                            tracing::debug!("control connection: {:#}", e);
                        }
                    });
                }
                Err(e) => tracing::debug!("control socket accept: {}", e),
            }
        }
    });
    Ok(handle)
}

async fn serve_connection(service: &BatchService, stream: UnixStream) -> Result<()> {
    let (read, mut write) = stream.into_split();
    let reply = handle_request(service, read).await?;
    write.write_all(reply.as_bytes()).await?;
    write.write_all(b"\n").await?;
    write.shutdown().await?;
    Ok(())
}

/// Reads one request from `read` and returns the reply line (without newline).
pub(crate) async fn handle_request<R>(service: &BatchService, read: R) -> Result<String>
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(read).lines();
    let Some(command) = lines.next_line().await? else {
        return Ok("error empty request".to_string());
    };
    let command = command.trim();

    if command == "submit" {
        let mut text = String::new();
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line == END_OF_URLS {
                break;
            }
            text.push_str(unstuff(line));
            text.push('\n');
        }
        return Ok(match service.submit_text(&text) {
            Ok(id) => format!("ok {}", id),
            Err(e) => format!("error {}", e),
        });
    }

    if let Some(id) = command.strip_prefix("poll ") {
        let snapshot = service.poll_str(id.trim());
        return Ok(serde_json::to_string(&snapshot)?);
    }

    Ok(format!("error unknown command: {}", command))
}

/// Removes the extra `.` a sender adds to lines starting with `.`.
fn unstuff(line: &str) -> &str {
    if line.starts_with("..") {
        &line[1..]
    } else {
        line
    }
}

async fn request(socket_path: &Path, body: &str) -> Result<String> {
    let mut stream = UnixStream::connect(socket_path)
        .await
        .with_context(|| format!("connect {} (is `batchdl serve` running?)", socket_path.display()))?;
    stream.write_all(body.as_bytes()).await?;
    let mut lines = BufReader::new(stream).lines();
    lines
        .next_line()
        .await?
        .ok_or_else(|| anyhow::anyhow!("control socket closed without reply"))
}

/// Sends a URL list and returns the job id issued by the server.
pub async fn send_submit(socket_path: &Path, urls_text: &str) -> Result<String> {
    let mut body = String::from("submit\n");
    for line in urls_text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if line.starts_with('.') {
            body.push('.');
        }
        body.push_str(line);
        body.push('\n');
    }
    body.push_str(END_OF_URLS);
    body.push('\n');

    let reply = request(socket_path, &body).await?;
    match reply.strip_prefix("ok ") {
        Some(id) => Ok(id.trim().to_string()),
        None => anyhow::bail!("submit rejected: {}", reply.trim_start_matches("error ")),
    }
}

/// Fetches the snapshot of `job_id` from the server.
pub async fn send_poll(socket_path: &Path, job_id: &str) -> Result<JobSnapshot> {
    let reply = request(socket_path, &format!("poll {}\n", job_id)).await?;
    if let Some(err) = reply.strip_prefix("error ") {
        anyhow::bail!("poll rejected: {}", err);
    }
    serde_json::from_str(&reply).context("decode snapshot")
}

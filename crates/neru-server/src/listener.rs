//! The Unix-socket IPC listener (§4.8): one thread accepting connections,
//! one thread per connection reading newline-delimited JSON requests and
//! forwarding each to the engine's serial queue.

use std::{
    fs,
    io::{BufRead, BufReader, Write},
    os::unix::{fs::PermissionsExt, net::UnixListener},
    path::Path,
    thread,
};

use neru_engine::{CoalescingSender, IpcJob};
use neru_protocol::{Error as EngineError, Request, Response};

use crate::{Error, Result};

const SOCKET_MODE: u32 = 0o600;

/// Binds `socket_path`, removing any stale socket file left behind by a
/// previous run, and restricts it to the owner (§4's socket-mode
/// requirement).
fn bind(socket_path: &Path) -> Result<UnixListener> {
    let _ = fs::remove_file(socket_path);
    let listener = UnixListener::bind(socket_path).map_err(|e| Error::Bind {
        path: socket_path.display().to_string(),
        source: e,
    })?;
    let perms = std::fs::Permissions::from_mode(SOCKET_MODE);
    fs::set_permissions(socket_path, perms).map_err(|e| Error::Bind {
        path: socket_path.display().to_string(),
        source: e,
    })?;
    Ok(listener)
}

/// Accepts connections on `socket_path` forever, spawning a thread per
/// connection. Each connection is single-command, single-response per line
/// (§4.8), but a connection may send many lines over its lifetime.
///
/// Intended to run on its own dedicated thread; it never returns except on
/// a bind failure.
pub fn serve(socket_path: &Path, queue: CoalescingSender) -> Result<()> {
    let listener = bind(socket_path)?;
    tracing::info!(path = %socket_path.display(), "IPC listener bound");

    for stream in listener.incoming() {
        let stream = match stream {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(error = %e, "failed to accept IPC connection");
                continue;
            }
        };
        let queue = queue.clone();
        thread::Builder::new()
            .name("neru-ipc-conn".to_string())
            .spawn(move || handle_connection(stream, queue))
            .expect("failed to spawn IPC connection thread");
    }
    Ok(())
}

fn handle_connection(stream: std::os::unix::net::UnixStream, queue: CoalescingSender) {
    let mut writer = match stream.try_clone() {
        Ok(w) => w,
        Err(e) => {
            tracing::warn!(error = %e, "failed to clone IPC connection for writing");
            return;
        }
    };
    let reader = BufReader::new(stream);

    for line in reader.lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                tracing::debug!(error = %e, "IPC connection read error, closing");
                return;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        let response = dispatch_line(&line, &queue);
        let Ok(mut encoded) = serde_json::to_string(&response) else {
            tracing::warn!("failed to encode IPC response, closing connection");
            return;
        };
        encoded.push('\n');
        if writer.write_all(encoded.as_bytes()).is_err() || writer.flush().is_err() {
            tracing::debug!("IPC connection write error, closing");
            return;
        }
    }
}

/// Parses one request line and forwards it to the engine, blocking this
/// connection thread (never the engine thread) for the reply.
fn dispatch_line(line: &str, queue: &CoalescingSender) -> Response {
    let request: Request = match serde_json::from_str(line) {
        Ok(r) => r,
        Err(e) => return Response::from_error(&EngineError::InvalidInput(e.to_string())),
    };
    let (reply_tx, reply_rx) = crossbeam_channel::bounded(1);
    queue.send_ipc(IpcJob { request, reply: reply_tx });
    reply_rx
        .recv()
        .unwrap_or_else(|_| Response::from_error(&EngineError::Internal("engine unavailable".to_string())))
}

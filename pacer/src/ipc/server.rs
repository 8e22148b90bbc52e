//! Unix domain socket server for IPC.
//!
//! Commands never touch session state here. Each one is forwarded over a
//! channel into the event loop, which owns the `App`, and the reply comes
//! back on a oneshot.

use anyhow::Result;
use pacer_ipc::{Command, Response, SOCKET_PATH};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tracing::{error, info};

/// Sending half handed to connections; the event loop holds the receiver.
pub type CommandSender =
    std::sync::mpsc::Sender<(Command, tokio::sync::oneshot::Sender<Response>)>;

pub async fn start(tx: CommandSender) -> Result<()> {
    // Remove a stale socket from a previous run
    let _ = std::fs::remove_file(SOCKET_PATH);

    let listener = UnixListener::bind(SOCKET_PATH)?;
    info!("IPC server listening on {}", SOCKET_PATH);

    loop {
        match listener.accept().await {
            Ok((stream, _)) => {
                let tx = tx.clone();
                tokio::spawn(async move {
                    if let Err(e) = handle_client(stream, tx).await {
                        error!("Error handling client: {}", e);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {}", e);
            }
        }
    }
}

async fn handle_client(stream: UnixStream, tx: CommandSender) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();

    reader.read_line(&mut line).await?;
    let command: Command = serde_json::from_str(&line)?;
    info!("IPC command: {:?}", command);

    let (reply_tx, reply_rx) = tokio::sync::oneshot::channel();
    let response = if tx.send((command, reply_tx)).is_ok() {
        reply_rx
            .await
            .unwrap_or_else(|_| Response::Error("event loop dropped the request".into()))
    } else {
        Response::Error("event loop is gone".into())
    };

    let mut response_json = serde_json::to_vec(&response)?;
    response_json.push(b'\n');
    writer.write_all(&response_json).await?;

    Ok(())
}

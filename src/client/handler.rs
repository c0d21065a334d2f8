use log::{error, info, warn};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Mutex;
use tokio::task;
use tokio::time::timeout;

use crate::client::ClientRegistry;
use crate::config::{SharedRuntimeConfig, StartupConfig};
use crate::error::handlers::{error_to_response_code, handle_error};
use crate::error::{ProtocolError, ServerError};
use crate::protocol::responses::{self, format_response};
use crate::protocol::{Command, CommandResult, CommandStatus, handle_command, parse_command};
use crate::storage::FileStore;

/// Handles one client session using the Tokio async runtime.
///
/// - Reads command lines (and upload payloads) from the client.
/// - Runs each command against the store on a blocking thread.
/// - Drops the connection after `connection_timeout_secs` of silence.
/// - Removes the client from `clients` when the session ends.
pub async fn handle_client(
    stream: TcpStream,
    client_addr: SocketAddr,
    clients: Arc<Mutex<ClientRegistry>>,
    store: Arc<dyn FileStore>,
    startup: Arc<StartupConfig>,
    runtime: SharedRuntimeConfig,
) {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);
    let idle = startup.connection_timeout();

    loop {
        let line = match timeout(idle, read_command_line(&mut reader, startup.max_command_length)).await {
            Err(_) => {
                info!("Client {} idle for {:?}, closing", client_addr, idle);
                send_error(&mut write_half, ProtocolError::Timeout).await;
                break;
            }
            Ok(Ok(None)) => {
                // Client closed the connection
                info!("Connection closed by client {}", client_addr);
                break;
            }
            Ok(Ok(Some(line))) => line,
            Ok(Err(e @ ProtocolError::CommandTooLong(_))) => {
                // The rest of the line (and any payload) is unread, so the stream is out of sync
                send_error(&mut write_half, e).await;
                break;
            }
            Ok(Err(e)) => {
                error!("Failed to read from {}: {}", client_addr, e);
                break;
            }
        };

        let command = parse_command(&line);
        info!("Received from {}: {:?}", client_addr, command);

        let payload = match &command {
            Command::Upload { size, .. } => {
                let max = runtime.read().await.max_upload_size_bytes();
                match read_payload(&mut reader, *size, max, idle).await {
                    Ok(payload) => payload,
                    Err(e) => {
                        // The payload was not consumed, so the stream is out of sync
                        send_error(&mut write_half, e).await;
                        break;
                    }
                }
            }
            _ => Vec::new(),
        };
        let received = payload.len() as u64;

        let worker_store = Arc::clone(&store);
        let result = match task::spawn_blocking(move || {
            handle_command(worker_store.as_ref(), command, payload)
        })
        .await
        {
            Ok(result) => result,
            Err(e) => {
                error!("Command worker for {} failed: {}", client_addr, e);
                let reply = format_response(responses::LOCAL_ERROR, "Internal server error");
                if write_half.write_all(reply.as_bytes()).await.is_err() {
                    break;
                }
                continue;
            }
        };

        let sent = result.data.as_ref().map_or(0, |data| data.len() as u64);
        if let Some(client) = clients.lock().await.get_mut(&client_addr) {
            client.record_command(received, sent);
        }

        if let Err(e) = send_result(&mut write_half, &result).await {
            error!("Failed to write to {}: {}", client_addr, e);
            break;
        }

        match result.status {
            CommandStatus::CloseConnection => {
                info!("Client {} requested to quit", client_addr);
                break;
            }
            CommandStatus::Failure(reason) => {
                warn!("Command from {} failed: {}", client_addr, reason);
            }
            CommandStatus::Success => {}
        }
    }

    let mut clients_guard = clients.lock().await;
    if let Some(client) = clients_guard.remove(&client_addr) {
        info!(
            "Client {} disconnected after {:?}: {} commands, {} bytes in, {} bytes out",
            client_addr,
            client.session_duration(),
            client.commands_handled(),
            client.bytes_received(),
            client.bytes_sent()
        );
    }
}

/// Reads one command line of at most `max_len` bytes, newline included.
///
/// Returns `None` once the client has closed the connection. Never buffers
/// more than `max_len + 1` bytes of a line.
async fn read_command_line<R: AsyncBufRead + Unpin>(
    reader: &mut R,
    max_len: usize,
) -> Result<Option<String>, ProtocolError> {
    let mut buf = Vec::new();
    let read = (&mut *reader)
        .take(max_len as u64 + 1)
        .read_until(b'\n', &mut buf)
        .await?;
    if read == 0 {
        return Ok(None);
    }
    if buf.len() > max_len {
        return Err(ProtocolError::CommandTooLong(max_len));
    }
    String::from_utf8(buf)
        .map(Some)
        .map_err(|e| ProtocolError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
}

/// Reads exactly `size` upload bytes following an `UPLOAD` line.
async fn read_payload<R: AsyncRead + Unpin>(
    reader: &mut R,
    size: u64,
    max: u64,
    idle: Duration,
) -> Result<Vec<u8>, ProtocolError> {
    if size == 0 {
        return Ok(Vec::new());
    }
    if size > max {
        return Err(ProtocolError::PayloadTooLarge { size, max });
    }

    let mut payload = vec![0u8; size as usize];
    timeout(idle, reader.read_exact(&mut payload))
        .await
        .map_err(|_| ProtocolError::Timeout)??;
    Ok(payload)
}

async fn send_result(write_half: &mut OwnedWriteHalf, result: &CommandResult) -> std::io::Result<()> {
    if let Some(msg) = &result.message {
        write_half.write_all(msg.as_bytes()).await?;
    }
    if let Some(data) = &result.data {
        write_half.write_all(data).await?;
    }
    write_half.flush().await
}

async fn send_error(write_half: &mut OwnedWriteHalf, error: ProtocolError) {
    let error = ServerError::from(error);
    handle_error(&error);
    let reply = format_response(error_to_response_code(&error), &error.to_string());
    let _ = write_half.write_all(reply.as_bytes()).await;
}

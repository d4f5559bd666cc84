use crate::core_command::command::ShareCommand;
use crate::core_command::handlers::{initialize_command_handlers, CommandHandlers};
use crate::core_command::utils::{parse_command_line, redact_command_line};
use crate::core_error::ShareError;
use crate::core_network::channel::{LineChannel, ShareStream};
use crate::core_network::SharedChannel;
use crate::helpers::send_response;
use crate::server::ServerContext;
use crate::session::Session;
use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::task::JoinSet;

pub async fn bind(address: &str, port: u16) -> Result<TcpListener> {
    let listener = TcpListener::bind((address, port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", address, port))?;
    info!("Server listening on {}", listener.local_addr()?);
    Ok(listener)
}

/// Accepts connections until `shutdown` resolves, one task per connection.
///
/// After shutdown no new connection is accepted; sessions still running get
/// the configured grace period before they are aborted.
pub async fn serve<F>(listener: TcpListener, context: Arc<ServerContext>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send,
{
    let handlers = Arc::new(initialize_command_handlers());
    let mut connections = JoinSet::new();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown requested, no longer accepting connections");
                break;
            }
            accepted = listener.accept() => {
                let (socket, addr) = match accepted {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        error!("Failed to accept connection: {}", e);
                        continue;
                    }
                };
                info!("New connection from {}", addr);

                let context = Arc::clone(&context);
                let handlers = Arc::clone(&handlers);
                connections.spawn(async move {
                    if let Err(e) = handle_connection(socket, Some(addr), context, handlers).await {
                        warn!("Connection error for {}: {}", addr, e);
                    }
                    info!("Connection closed for {}", addr);
                });
            }
            Some(_) = connections.join_next(), if !connections.is_empty() => {}
        }
    }

    drain_connections(&mut connections, &context).await;
    Ok(())
}

async fn drain_connections(connections: &mut JoinSet<()>, context: &ServerContext) {
    if connections.is_empty() {
        return;
    }
    let grace = context.config.server.shutdown_grace_secs();
    info!(
        "Waiting up to {}s for {} open session(s)",
        grace,
        connections.len()
    );
    let drained = tokio::time::timeout(Duration::from_secs(grace), async {
        while connections.join_next().await.is_some() {}
    })
    .await;
    if drained.is_err() {
        warn!("Aborting {} session(s) still open", connections.len());
        connections.shutdown().await;
    }
}

/// Runs one session over `stream` until QUIT, disconnect or a fatal error.
pub async fn handle_connection<S>(
    stream: S,
    peer_addr: Option<SocketAddr>,
    context: Arc<ServerContext>,
    handlers: Arc<CommandHandlers>,
) -> Result<(), ShareError>
where
    S: ShareStream + 'static,
{
    let channel: SharedChannel = Arc::new(Mutex::new(LineChannel::with_limits(
        stream,
        context.config.server.max_line_length(),
        context.config.server.transfer_buffer_size(),
    )));
    let session = Arc::new(Mutex::new(Session::new(peer_addr)));
    let peer = session.lock().await.peer_label();

    loop {
        let line = {
            let mut channel = channel.lock().await;
            channel.read_line().await?
        };
        let line = match line {
            Some(line) => line,
            None => {
                info!("Client {} disconnected", peer);
                break;
            }
        };

        debug!("Received command from {}: {}", peer, redact_command_line(&line));
        let (keyword, arg) = parse_command_line(&line);

        let command = ShareCommand::from_keyword(keyword);
        let handler = command.and_then(|command| handlers.get(&command));
        let (command, handler) = match (command, handler) {
            (Some(command), Some(handler)) => (command, handler),
            _ => {
                warn!("Unknown command from {}: {:?}", peer, keyword);
                let error = ShareError::UnknownCommand(keyword.to_string());
                send_response(&channel, &error.to_wire_response()).await?;
                continue;
            }
        };

        if command.requires_auth() && !session.lock().await.is_authenticated {
            warn!("Command {} from {} refused: not authenticated", command, peer);
            send_response(&channel, &ShareError::NotAuthed.to_wire_response()).await?;
            continue;
        }

        let result = handler(
            Arc::clone(&channel),
            Arc::clone(&context),
            Arc::clone(&session),
            arg.to_string(),
        )
        .await;

        match result {
            Ok(()) => {}
            Err(e) if e.is_fatal() => {
                error!("Error handling command {} from {}: {}", command, peer, e);
                return Err(e);
            }
            Err(e) => {
                warn!("Command {} from {} refused: {}", command, peer, e);
                send_response(&channel, &e.to_wire_response()).await?;
            }
        }

        if command == ShareCommand::Quit {
            break;
        }
    }

    let mut channel = channel.lock().await;
    if let Err(e) = channel.shutdown().await {
        debug!("Error shutting down stream for {}: {}", peer, e);
    }
    Ok(())
}

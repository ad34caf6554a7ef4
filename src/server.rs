//! Listener setup and the per-connection request loop.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::{TcpSocket, TcpStream};
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument};

use crate::connection::{Connection, ConnectionError};
use crate::key_value_store::KeyValueStore;
use crate::state::State;

/// Binds the listener and serves connections until the process exits.
///
/// Each accepted connection runs in its own task; a panic or protocol
/// error on one connection never affects the others. Errors from `bind`
/// propagate so the process can exit non-zero.
pub async fn run(port: u16) -> io::Result<()> {
    let _ = tracing_subscriber::fmt()
        .try_init()
        .map_err(|e| debug!("Failed to initialize global tracing: {}", e));

    let address = SocketAddr::from(([127, 0, 0, 1], port));

    let socket = TcpSocket::new_v4()?;
    socket.set_reuseaddr(true)?;
    socket.bind(address)?;
    let listener = socket.listen(1024)?;

    info!("listening on {}", listener.local_addr()?);

    let store = Arc::new(Mutex::new(KeyValueStore::new()));
    let state = Arc::new(Mutex::new(State::new()));

    loop {
        match listener.accept().await {
            Ok((stream, client_address)) => {
                let store = Arc::clone(&store);
                let state = Arc::clone(&state);

                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, client_address, store, state).await {
                        debug!("connection {} closed: {}", client_address, e);
                    }
                });
            }
            Err(e) => {
                error!("failed to accept connection: {}", e);
            }
        }
    }
}

/// Reads requests off one connection and answers them in arrival order.
///
/// Command-level failures become error replies and the connection keeps
/// going; framing violations propagate as errors and the connection is
/// dropped without a reply.
#[instrument(name = "connection", skip_all, fields(client_address = %client_address))]
async fn handle_connection(
    stream: TcpStream,
    client_address: SocketAddr,
    store: Arc<Mutex<KeyValueStore>>,
    state: Arc<Mutex<State>>,
) -> Result<(), ConnectionError> {
    let mut connection = Connection::new(stream);

    while let Some(handler) = connection.read_request().await? {
        debug!("handling {}", handler.name);

        // Run the command while also watching the socket. Pipelined
        // requests arriving mid-command stay buffered; an end-of-stream
        // cancels the command, so a client that disconnects while parked
        // in BLPOP releases its waiter instead of swallowing a value.
        let command = handler.handle_command(&store, &state);
        tokio::pin!(command);

        let reply = loop {
            tokio::select! {
                result = &mut command => {
                    break match result {
                        Ok(reply) => reply,
                        Err(e) => e.as_resp(),
                    };
                }
                read = connection.fill_buffer() => {
                    match read {
                        Ok(0) | Err(_) => {
                            debug!("client went away mid-command");
                            return Ok(());
                        }
                        Ok(_) => continue,
                    }
                }
            }
        };

        connection.write_reply(&reply).await?;
    }

    debug!("connection closed");
    Ok(())
}

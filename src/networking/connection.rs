//! WebSocket connection to the game server
//!
//! A single connection carries every subscribed game. Outbound messages are
//! drained from a channel by the writer half; inbound frames are handed to
//! [`GameClient::handle_frame`] in arrival order by the reader half.

use std::sync::Arc;

use futures::{Sink, SinkExt, Stream, StreamExt};
use http::Uri;
use shared::ClientMessage;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use url::Url;

use websocket::{ClientBuilder, Message};

use crate::networking::client::GameClient;
use crate::networking::error::{NetworkError, NetworkResult};

/// Open a WebSocket to `url` and serve `client` until either side closes
pub async fn connect_and_run(
    url: &Url,
    client: Arc<GameClient>,
    outbound_rx: mpsc::UnboundedReceiver<ClientMessage>,
) -> NetworkResult<()> {
    let uri = Uri::try_from(url.as_str())?;
    info!("[NETWORK] Connecting to {}", uri);
    let (stream, _response) = ClientBuilder::from_uri(uri).connect().await?;
    info!("[NETWORK] Connected");
    run_connection(stream, client, outbound_rx).await
}

/// Pump frames between an established stream and the client
pub async fn run_connection<S>(
    stream: S,
    client: Arc<GameClient>,
    mut outbound_rx: mpsc::UnboundedReceiver<ClientMessage>,
) -> NetworkResult<()>
where
    S: Stream<Item = Result<Message, websocket::Error>>
        + Sink<Message, Error = websocket::Error>
        + Unpin,
{
    let (mut sink, mut source) = stream.split();

    let writer = async move {
        while let Some(message) = outbound_rx.recv().await {
            let text = message.to_json()?;
            debug!("[NETWORK] -> {}", text);
            sink.send(Message::text(text)).await?;
        }
        // Every sender is gone; the client was dropped
        let _ = sink.close().await;
        Ok::<(), NetworkError>(())
    };

    let reader = async {
        while let Some(frame) = source.next().await {
            let frame = frame?;
            if frame.is_close() {
                info!("[NETWORK] Server closed the connection");
                return Err(NetworkError::ConnectionClosed);
            }
            if let Some(text) = frame.as_text() {
                debug!("[NETWORK] <- {}", text);
                if let Err(err) = client.handle_frame(text) {
                    warn!("[NETWORK] Frame rejected: {}", err);
                }
            }
        }
        Err(NetworkError::ConnectionClosed)
    };

    tokio::select! {
        result = writer => result,
        result = reader => result,
    }
}

// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Live ticket streaming over WebSocket.
//!
//! Each connection subscribes to the ticket feed with the filter from its
//! query parameters and receives every snapshot in publish order until it
//! disconnects. Events are informational; clients still use the HTTP API
//! for authoritative reads and all mutations.

use axum::{
    extract::{
        Query, State as AxumState, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use futures::{SinkExt, stream::StreamExt};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use toolreq_api::TicketSubscription;
use toolreq_domain::Ticket;

use crate::{AppState, FilterParams};

/// One message on the live stream.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum LiveMessage {
    /// Connection confirmation (sent on initial connect).
    Connected {
        /// Server timestamp (ISO 8601).
        timestamp: String,
    },
    /// A fresh filtered view of the ticket list.
    Snapshot {
        /// The tickets matching the connection's filter, newest first.
        tickets: Vec<Ticket>,
    },
    /// The upstream subscription failed. The stream ends after this.
    Error {
        /// A description of the failure.
        message: String,
    },
}

/// Handles WebSocket upgrade requests for the live ticket stream.
///
/// # Arguments
///
/// * `ws` - WebSocket upgrade request
/// * `params` - Filter criteria from the query string
/// * `app_state` - Application state carrying the ticket feed
pub(crate) async fn live_tickets_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<FilterParams>,
    AxumState(app_state): AxumState<AppState>,
) -> Result<Response, crate::HttpError> {
    let filter = params.into_filter()?;
    let subscription = app_state.feed.subscribe(filter);
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, subscription)))
}

/// Handles an individual WebSocket connection.
///
/// Sends a connection confirmation, then streams filtered snapshots until
/// the client disconnects, the feed ends, or an upstream error arrives.
async fn handle_socket(socket: WebSocket, mut subscription: TicketSubscription) {
    info!("Client connected to live ticket stream");

    let (mut sender, mut receiver) = socket.split();

    let connected = LiveMessage::Connected {
        timestamp: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Iso8601::DEFAULT)
            .unwrap_or_else(|_| String::from("unknown")),
    };

    if let Ok(json) = serde_json::to_string(&connected)
        && sender.send(Message::Text(json.into())).await.is_err()
    {
        warn!("Failed to send connection confirmation");
        return;
    }

    // Task for sending feed events to the client
    let mut send_task = tokio::spawn(async move {
        while let Some(event) = subscription.recv().await {
            let message = match event {
                Ok(tickets) => LiveMessage::Snapshot { tickets },
                Err(err) => LiveMessage::Error {
                    message: err.to_string(),
                },
            };
            let terminal = matches!(message, LiveMessage::Error { .. });
            match serde_json::to_string(&message) {
                Ok(json) => {
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        // Client disconnected
                        break;
                    }
                }
                Err(e) => {
                    error!(?e, "Failed to serialize live message");
                }
            }
            if terminal {
                // The feed does not retry; close out after forwarding.
                break;
            }
        }
    });

    // Task for receiving messages from the client (though we don't expect any)
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Text(_) | Message::Binary(_)) => {
                    // No commands are accepted over the live stream
                    warn!("Received unexpected message from client, ignoring");
                }
                Ok(Message::Close(_)) => {
                    debug!("Client sent close frame");
                    break;
                }
                Ok(Message::Ping(_) | Message::Pong(_)) => {
                    // Ping/pong handled automatically by Axum
                }
                Err(e) => {
                    error!(?e, "WebSocket receive error");
                    break;
                }
            }
        }
    });

    // Wait for either task to complete
    tokio::select! {
        _ = &mut send_task => {
            debug!("Send task completed");
            recv_task.abort();
        }
        _ = &mut recv_task => {
            debug!("Receive task completed");
            send_task.abort();
        }
    }

    info!("Client disconnected from live ticket stream");
}

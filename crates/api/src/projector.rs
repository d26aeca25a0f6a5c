// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Live ticket feed: a continuously updated, filterable view of the
//! ticket list.
//!
//! The feed holds the single upstream snapshot stream; each subscriber
//! re-derives its filtered view from every snapshot it receives. Ordering
//! is done by the store (`created_at` descending, id tie-break); the
//! projector never re-sorts.
//!
//! # Delivery contract
//!
//! - Snapshots are delivered to every subscriber in publish order.
//! - Each subscriber has an unbounded queue: a slow consumer sees every
//!   intermediate snapshot, nothing is dropped or reordered.
//! - A new subscriber immediately receives the latest snapshot, if any.
//! - Upstream failures are forwarded to every subscriber's stream as an
//!   error event; the feed does not retry on its own.
//! - Dropping a subscription ends delivery; the feed prunes closed
//!   subscribers on the next publish.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::debug;

use toolreq_domain::{Ticket, TicketCategory, TicketStatus};

use crate::error::ApiError;

/// Filter criteria for a ticket subscription.
///
/// The predicate is the conjunction of the three parts; an empty status or
/// category set means "all".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TicketFilter {
    /// Statuses to include. Empty includes all.
    #[serde(default)]
    pub statuses: Vec<TicketStatus>,
    /// Categories to include. Empty includes all.
    #[serde(default)]
    pub categories: Vec<TicketCategory>,
    /// Case-insensitive substring matched against the ticket number, tool
    /// name, applicant name, and the admin/supervisor handler names.
    #[serde(default)]
    pub search: Option<String>,
}

impl TicketFilter {
    /// Returns true if a ticket satisfies every part of the filter.
    #[must_use]
    pub fn matches(&self, ticket: &Ticket) -> bool {
        if !self.statuses.is_empty() && !self.statuses.contains(&ticket.status) {
            return false;
        }
        if !self.categories.is_empty() && !self.categories.contains(&ticket.category) {
            return false;
        }
        if let Some(query) = &self.search {
            let query = query.to_lowercase();
            if !query.is_empty() && !Self::search_fields(ticket).any(|field| field.to_lowercase().contains(&query)) {
                return false;
            }
        }
        true
    }

    /// Derives the filtered view of a snapshot, preserving its order.
    #[must_use]
    pub fn apply(&self, snapshot: &[Ticket]) -> Vec<Ticket> {
        snapshot
            .iter()
            .filter(|t| self.matches(t))
            .cloned()
            .collect()
    }

    fn search_fields(ticket: &Ticket) -> impl Iterator<Item = &str> {
        [
            Some(ticket.ticket_no.as_str()),
            Some(ticket.tool_name.as_str()),
            Some(ticket.applicant.display_name.as_str()),
            ticket.admin_handler.as_ref().map(|h| h.display_name.as_str()),
            ticket
                .supervisor_note
                .as_ref()
                .map(|n| n.display_name.as_str()),
        ]
        .into_iter()
        .flatten()
    }
}

/// One event on a subscriber's stream.
#[derive(Debug, Clone)]
pub enum FeedEvent {
    /// A fresh full snapshot of the ordered ticket list.
    Snapshot(Vec<Ticket>),
    /// The upstream subscription failed. Terminal; the feed does not
    /// retry.
    Error(ApiError),
}

/// Shared state behind a feed handle.
struct FeedState {
    subscribers: Vec<mpsc::UnboundedSender<FeedEvent>>,
    latest: Option<Vec<Ticket>>,
}

/// Publisher and subscriber registry for live ticket snapshots.
///
/// Cloning the feed clones the handle, not the state; all clones publish
/// to the same subscribers.
#[derive(Clone)]
pub struct TicketFeed {
    state: Arc<Mutex<FeedState>>,
}

impl TicketFeed {
    /// Creates a new, empty feed.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(FeedState {
                subscribers: Vec::new(),
                latest: None,
            })),
        }
    }

    /// Publishes a fresh snapshot to every live subscriber.
    ///
    /// Subscribers whose stream has been dropped are pruned here.
    pub fn publish(&self, snapshot: Vec<Ticket>) {
        let mut state = self.lock_state();
        state.latest = Some(snapshot.clone());
        state
            .subscribers
            .retain(|tx| tx.send(FeedEvent::Snapshot(snapshot.clone())).is_ok());
        debug!(
            subscribers = state.subscribers.len(),
            tickets = snapshot.len(),
            "Published ticket snapshot"
        );
    }

    /// Forwards an upstream failure to every live subscriber.
    pub fn fail(&self, error: &ApiError) {
        let mut state = self.lock_state();
        state
            .subscribers
            .retain(|tx| tx.send(FeedEvent::Error(error.clone())).is_ok());
        debug!(subscribers = state.subscribers.len(), %error, "Forwarded feed error");
    }

    /// Subscribes to the feed with a filter.
    ///
    /// The current snapshot, if any, is delivered immediately.
    #[must_use]
    pub fn subscribe(&self, filter: TicketFilter) -> TicketSubscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut state = self.lock_state();
        if let Some(latest) = &state.latest {
            // A send to our own fresh channel cannot fail.
            let _ = tx.send(FeedEvent::Snapshot(latest.clone()));
        }
        state.subscribers.push(tx);
        TicketSubscription { rx, filter }
    }

    /// Number of live subscribers. Intended for diagnostics.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.lock_state().subscribers.len()
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, FeedState> {
        // A poisoned mutex means a publisher panicked mid-publish; the
        // registry itself is still structurally sound.
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Default for TicketFeed {
    fn default() -> Self {
        Self::new()
    }
}

/// A cancellable stream of filtered ticket snapshots.
///
/// The subscription owns its place in the feed: dropping it (or calling
/// [`TicketSubscription::unsubscribe`]) ends delivery and releases the
/// underlying queue.
pub struct TicketSubscription {
    rx: mpsc::UnboundedReceiver<FeedEvent>,
    filter: TicketFilter,
}

impl TicketSubscription {
    /// Receives the next filtered snapshot or upstream error.
    ///
    /// Returns `None` once the feed has been dropped and the queue is
    /// drained.
    pub async fn recv(&mut self) -> Option<Result<Vec<Ticket>, ApiError>> {
        self.rx.recv().await.map(|event| self.project(event))
    }

    /// Non-blocking variant of [`TicketSubscription::recv`].
    ///
    /// Returns `None` when no event is queued right now.
    pub fn try_recv(&mut self) -> Option<Result<Vec<Ticket>, ApiError>> {
        self.rx.try_recv().ok().map(|event| self.project(event))
    }

    /// Cancels the subscription. No further events are delivered.
    pub fn unsubscribe(self) {
        drop(self);
    }

    /// The filter this subscription projects snapshots through.
    #[must_use]
    pub const fn filter(&self) -> &TicketFilter {
        &self.filter
    }

    fn project(&self, event: FeedEvent) -> Result<Vec<Ticket>, ApiError> {
        match event {
            FeedEvent::Snapshot(snapshot) => Ok(self.filter.apply(&snapshot)),
            FeedEvent::Error(err) => Err(err),
        }
    }
}

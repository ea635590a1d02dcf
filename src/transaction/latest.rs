//! Keeps the newest filter request per user so that a slow, stale response
//! never replaces the results of a newer one.

use std::{
    collections::HashMap,
    sync::{Mutex, PoisonError},
};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Proof that a fetch was started, see [LatestRequests::begin].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    key: String,
    generation: u64,
}

/// Hands out a monotonically increasing generation per key.
///
/// A fetch holding a ticket is only current while no newer ticket has been
/// issued for the same key.
#[derive(Debug, Default)]
pub struct LatestRequests {
    generations: Mutex<HashMap<String, u64>>,
}

impl LatestRequests {
    /// Record that a fetch for `key` started, superseding earlier fetches for `key`.
    pub fn begin(&self, key: &str) -> FetchTicket {
        // A panic while holding the lock cannot leave the counters inconsistent.
        let mut generations = self
            .generations
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let generation = generations
            .entry(key.to_owned())
            .and_modify(|generation| *generation += 1)
            .or_insert(1);

        FetchTicket {
            key: key.to_owned(),
            generation: *generation,
        }
    }

    /// Whether `ticket` is still the newest one issued for its key.
    pub fn is_latest(&self, ticket: &FetchTicket) -> bool {
        let generations = self
            .generations
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        generations.get(&ticket.key) == Some(&ticket.generation)
    }

    /// The newest generation issued for `key`, if any.
    #[cfg(test)]
    pub fn generation(&self, key: &str) -> Option<u64> {
        self.generations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .copied()
    }
}

/// Wait until a fetch for `key` has been started by another task.
#[cfg(test)]
pub async fn wait_for_fetch(latest_requests: &LatestRequests, key: &str) {
    for _ in 0..1000 {
        if latest_requests.generation(key).is_some() {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(1)).await;
    }

    panic!("no fetch was started for {key}");
}

/// The key for the filter requests that `email` makes from the page at `path`.
pub fn request_key(email: &str, path: &str) -> String {
    format!("{email} {path}")
}

/// Build the response with `render`, unless a newer fetch was started after `ticket`.
///
/// A superseded fetch gets `204 No Content`, which HTMX does not swap into
/// the page. Requests without a ticket are always rendered.
pub fn render_if_latest(
    latest_requests: &LatestRequests,
    ticket: Option<&FetchTicket>,
    render: impl FnOnce() -> Response,
) -> Response {
    match ticket {
        Some(ticket) if !latest_requests.is_latest(ticket) => {
            tracing::debug!("dropping stale response for {}", ticket.key);
            StatusCode::NO_CONTENT.into_response()
        }
        _ => render(),
    }
}

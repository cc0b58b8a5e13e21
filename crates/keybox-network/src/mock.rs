//! Scripted status client for testing and offline development.
//!
//! [`MockStatusClient`] answers from queued results first. When a queue is
//! empty it either falls back to a simulated authority (which keeps its own
//! key state and accepts every event) or, if none was configured, fails the
//! call with a transport error.

use std::collections::VecDeque;

use keybox_core::{EventType, TagEvent, TagId};

use crate::client::StatusClient;
use crate::error::{NetworkError, Result};

/// A call received by the mock, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusCall {
    Fetch,
    Submit { tag_id: TagId, event_type: EventType },
}

/// Status client driven by scripted responses.
///
/// # Examples
///
/// ```
/// use keybox_network::{MockStatusClient, StatusClient};
///
/// #[tokio::main]
/// async fn main() {
///     let mut client = MockStatusClient::new();
///     client.push_fetch(Ok(true));
///
///     assert_eq!(client.fetch_key_state().await, Ok(true));
///     assert!(client.fetch_key_state().await.is_err());
///     assert_eq!(client.fetch_count(), 2);
/// }
/// ```
#[derive(Debug, Default)]
pub struct MockStatusClient {
    fetch_results: VecDeque<Result<bool>>,
    submit_results: VecDeque<Result<bool>>,
    authority: Option<bool>,
    calls: Vec<StatusCall>,
}

impl MockStatusClient {
    /// Create a mock with empty scripts and no simulated authority.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock backed by a simulated authority holding `key_taken`.
    ///
    /// Unscripted fetches return the authority's state; unscripted submits
    /// are accepted and update it.
    pub fn simulated(key_taken: bool) -> Self {
        Self {
            authority: Some(key_taken),
            ..Self::default()
        }
    }

    /// Queue the result of a future `fetch_key_state` call.
    pub fn push_fetch(&mut self, result: Result<bool>) -> &mut Self {
        self.fetch_results.push_back(result);
        self
    }

    /// Queue the result of a future `submit_event` call.
    pub fn push_submit(&mut self, result: Result<bool>) -> &mut Self {
        self.submit_results.push_back(result);
        self
    }

    /// Key state held by the simulated authority, if any.
    pub fn authority(&self) -> Option<bool> {
        self.authority
    }

    /// Change the simulated authority's state, as another device would.
    pub fn set_authority(&mut self, key_taken: bool) {
        self.authority = Some(key_taken);
    }

    /// Every call received so far.
    pub fn calls(&self) -> &[StatusCall] {
        &self.calls
    }

    /// Number of `fetch_key_state` calls received.
    pub fn fetch_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, StatusCall::Fetch))
            .count()
    }

    /// Number of `submit_event` calls received.
    pub fn submit_count(&self) -> usize {
        self.calls.len() - self.fetch_count()
    }

    /// Event types submitted so far, in order.
    pub fn submitted_event_types(&self) -> Vec<EventType> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                StatusCall::Submit { event_type, .. } => Some(*event_type),
                StatusCall::Fetch => None,
            })
            .collect()
    }

    /// Whether every scripted response has been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.fetch_results.is_empty() && self.submit_results.is_empty()
    }
}

impl StatusClient for MockStatusClient {
    async fn fetch_key_state(&mut self) -> Result<bool> {
        self.calls.push(StatusCall::Fetch);

        match self.fetch_results.pop_front() {
            Some(result) => result,
            None => self
                .authority
                .ok_or_else(|| NetworkError::transport("no scripted fetch response")),
        }
    }

    async fn submit_event(&mut self, event: &TagEvent) -> Result<bool> {
        self.calls.push(StatusCall::Submit {
            tag_id: event.tag_id().clone(),
            event_type: event.event_type(),
        });

        match self.submit_results.pop_front() {
            Some(result) => {
                if let (Ok(true), Some(_)) = (&result, self.authority) {
                    self.authority = Some(event.event_type().resulting_state().is_taken());
                }
                result
            }
            None => match self.authority {
                Some(_) => {
                    self.authority = Some(event.event_type().resulting_state().is_taken());
                    Ok(true)
                }
                None => Err(NetworkError::transport("no scripted submit response")),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn event(tag: &str, event_type: EventType) -> TagEvent {
        TagEvent::new(TagId::new(tag).unwrap(), event_type, Instant::now())
    }

    #[tokio::test]
    async fn test_scripted_responses_in_order() {
        let mut client = MockStatusClient::new();
        client
            .push_fetch(Ok(false))
            .push_fetch(Err(NetworkError::Timeout(100)))
            .push_submit(Ok(true));

        assert_eq!(client.fetch_key_state().await, Ok(false));
        assert_eq!(
            client.fetch_key_state().await,
            Err(NetworkError::Timeout(100))
        );
        assert_eq!(
            client.submit_event(&event("AB12", EventType::Take)).await,
            Ok(true)
        );
        assert!(client.is_exhausted());
    }

    #[tokio::test]
    async fn test_unscripted_calls_fail_without_authority() {
        let mut client = MockStatusClient::new();

        assert!(client.fetch_key_state().await.is_err());
        assert!(
            client
                .submit_event(&event("AB12", EventType::Take))
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_simulated_authority_tracks_events() {
        let mut client = MockStatusClient::simulated(false);

        assert_eq!(client.fetch_key_state().await, Ok(false));
        assert_eq!(
            client.submit_event(&event("AB12", EventType::Take)).await,
            Ok(true)
        );
        assert_eq!(client.authority(), Some(true));
        assert_eq!(client.fetch_key_state().await, Ok(true));
    }

    #[tokio::test]
    async fn test_scripted_rejection_leaves_authority_unchanged() {
        let mut client = MockStatusClient::simulated(false);
        client.push_submit(Ok(false));

        assert_eq!(
            client.submit_event(&event("AB12", EventType::Take)).await,
            Ok(false)
        );
        assert_eq!(client.authority(), Some(false));
    }

    #[tokio::test]
    async fn test_call_log() {
        let mut client = MockStatusClient::simulated(true);

        client.fetch_key_state().await.unwrap();
        client
            .submit_event(&event("cd34", EventType::Return))
            .await
            .unwrap();

        assert_eq!(client.fetch_count(), 1);
        assert_eq!(client.submit_count(), 1);
        assert_eq!(client.submitted_event_types(), vec![EventType::Return]);
        assert_eq!(
            client.calls()[1],
            StatusCall::Submit {
                tag_id: TagId::new("CD34").unwrap(),
                event_type: EventType::Return
            }
        );
    }
}

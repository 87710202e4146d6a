use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::info;
use serenity::model::id::{ChannelId, UserId};
use tokio::sync::{Mutex, RwLock};

use crate::error::PollError;
use crate::models::{Outcome, Poll};

/// Shared in-memory poll state. The outer lock guards membership; each poll
/// carries its own mutex so votes for different polls never contend while
/// two votes for the same poll cannot lose an increment.
///
/// State lives for the process only. A restart drops all polls.
pub struct PollRegistry {
    polls: RwLock<BTreeMap<String, Arc<Mutex<Poll>>>>,
}

impl PollRegistry {
    pub fn new() -> Self {
        Self {
            polls: RwLock::new(BTreeMap::new()),
        }
    }

    /// Register a single poll. The id must be unused.
    pub async fn create(&self, poll: Poll) -> Result<(), PollError> {
        let mut polls = self.polls.write().await;
        if polls.contains_key(&poll.id) {
            return Err(PollError::DuplicateKey(poll.id));
        }
        info!("Registered poll {} ({})", poll.id, poll.title);
        polls.insert(poll.id.clone(), Arc::new(Mutex::new(poll)));
        Ok(())
    }

    /// Register a batch of polls, all or nothing. If any id collides the
    /// registry is left exactly as it was.
    pub async fn create_batch(&self, batch: Vec<Poll>) -> Result<(), PollError> {
        let mut polls = self.polls.write().await;
        if let Some(poll) = batch.iter().find(|p| polls.contains_key(&p.id)) {
            return Err(PollError::DuplicateKey(poll.id.clone()));
        }
        for poll in batch {
            info!("Registered poll {} ({})", poll.id, poll.title);
            polls.insert(poll.id.clone(), Arc::new(Mutex::new(poll)));
        }
        Ok(())
    }

    /// Apply one vote event to the named poll.
    pub async fn record_vote(
        &self,
        poll_id: &str,
        voter: UserId,
        outcome: Outcome,
    ) -> Result<(), PollError> {
        let entry = {
            let polls = self.polls.read().await;
            polls
                .get(poll_id)
                .cloned()
                .ok_or_else(|| PollError::UnknownPoll(poll_id.to_string()))?
        };
        let mut poll = entry.lock().await;
        poll.record_vote(voter, outcome)
    }

    /// Close every open poll whose window has elapsed. Returns
    /// `(id, title, channel)` for each poll that transitioned, once only.
    pub async fn close_expired(&self, now: DateTime<Utc>) -> Vec<(String, String, ChannelId)> {
        let entries: Vec<_> = { self.polls.read().await.values().cloned().collect() };
        let mut closed = Vec::new();
        for entry in entries {
            let mut poll = entry.lock().await;
            if poll.closes_at <= now && poll.close() {
                closed.push((poll.id.clone(), poll.title.clone(), poll.channel_id));
            }
        }
        closed
    }

    /// Close every open poll regardless of deadline (explicit stop).
    pub async fn close_all(&self) -> Vec<(String, String, ChannelId)> {
        let entries: Vec<_> = { self.polls.read().await.values().cloned().collect() };
        let mut closed = Vec::new();
        for entry in entries {
            let mut poll = entry.lock().await;
            if poll.close() {
                closed.push((poll.id.clone(), poll.title.clone(), poll.channel_id));
            }
        }
        closed
    }

    /// Summarize every registered poll, in id order.
    pub async fn report(&self) -> String {
        let entries: Vec<_> = { self.polls.read().await.values().cloned().collect() };
        let mut report = String::from("Poll Results:\n");
        for entry in entries {
            let poll = entry.lock().await;
            report.push_str(&format!("\n**{}**:\n", poll.id.to_uppercase()));
            for outcome in Outcome::ALL {
                report.push_str(&format!(
                    "{} {}: {} votes\n",
                    outcome.emoji(),
                    outcome.label(),
                    poll.tally(outcome)
                ));
            }
        }
        report
    }

    /// Drop every poll, open or closed.
    pub async fn reset_all(&self) {
        let mut polls = self.polls.write().await;
        info!("Clearing {} poll(s) from the registry", polls.len());
        polls.clear();
    }

    pub async fn len(&self) -> usize {
        self.polls.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    use crate::models::POLL_DURATION_SECS;

    fn poll(id: &str, title: &str) -> Poll {
        Poll::new(id, title, ChannelId(1), Utc::now())
    }

    #[tokio::test]
    async fn vote_scenario_produces_expected_report() {
        let registry = PollRegistry::new();
        registry.create(poll("poll1", "Match 1")).await.unwrap();

        registry
            .record_vote("poll1", UserId(1), Outcome::Home)
            .await
            .unwrap();
        registry
            .record_vote("poll1", UserId(2), Outcome::Away)
            .await
            .unwrap();
        assert!(matches!(
            registry.record_vote("poll1", UserId(1), Outcome::Draw).await,
            Err(PollError::DuplicateVote(_))
        ));

        let report = registry.report().await;
        assert!(report.contains("**POLL1**:"));
        assert!(report.contains("Home Win: 1 votes"));
        assert!(report.contains("Draw: 0 votes"));
        assert!(report.contains("Away Win: 1 votes"));
    }

    #[tokio::test]
    async fn vote_for_unknown_poll_is_rejected() {
        let registry = PollRegistry::new();
        assert!(matches!(
            registry.record_vote("poll9", UserId(1), Outcome::Home).await,
            Err(PollError::UnknownPoll(_))
        ));
    }

    #[tokio::test]
    async fn duplicate_id_fails_create() {
        let registry = PollRegistry::new();
        registry.create(poll("poll1", "Match 1")).await.unwrap();
        assert!(matches!(
            registry.create(poll("poll1", "Match 1 again")).await,
            Err(PollError::DuplicateKey(_))
        ));
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn colliding_batch_leaves_registry_unchanged() {
        let registry = PollRegistry::new();
        registry.create(poll("poll2", "Match 2")).await.unwrap();

        let batch = vec![
            poll("poll1", "Match 1"),
            poll("poll2", "Match 2"),
            poll("poll3", "Match 3"),
        ];
        assert!(matches!(
            registry.create_batch(batch).await,
            Err(PollError::DuplicateKey(id)) if id == "poll2"
        ));
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn reset_all_yields_empty_report() {
        let registry = PollRegistry::new();
        registry.create(poll("poll1", "Match 1")).await.unwrap();
        registry
            .record_vote("poll1", UserId(1), Outcome::Home)
            .await
            .unwrap();

        registry.reset_all().await;
        assert_eq!(registry.report().await, "Poll Results:\n");
        assert_eq!(registry.len().await, 0);
    }

    #[tokio::test]
    async fn expiry_closes_each_poll_exactly_once() {
        let registry = PollRegistry::new();
        let created = poll("poll1", "Match 1");
        let deadline = created.closes_at;
        registry.create(created).await.unwrap();

        // Before the deadline nothing expires.
        assert!(registry
            .close_expired(deadline - Duration::seconds(1))
            .await
            .is_empty());

        let closed = registry.close_expired(deadline).await;
        assert_eq!(closed.len(), 1);
        assert_eq!(closed[0].0, "poll1");

        // Votes after closing are rejected, the entry is retained, and a
        // second sweep does not announce the poll again.
        assert!(matches!(
            registry.record_vote("poll1", UserId(1), Outcome::Home).await,
            Err(PollError::PollClosed(_))
        ));
        assert_eq!(registry.len().await, 1);
        assert!(registry
            .close_expired(deadline + Duration::seconds(POLL_DURATION_SECS))
            .await
            .is_empty());
    }

    #[tokio::test]
    async fn close_all_reports_only_previously_open_polls() {
        let registry = PollRegistry::new();
        registry.create(poll("poll1", "Match 1")).await.unwrap();
        registry.create(poll("poll2", "Match 2")).await.unwrap();

        let first = registry.close_all().await;
        assert_eq!(first.len(), 2);
        assert!(registry.close_all().await.is_empty());
    }

    #[tokio::test]
    async fn errors_in_one_poll_do_not_touch_others() {
        let registry = PollRegistry::new();
        registry.create(poll("poll1", "Match 1")).await.unwrap();
        registry.create(poll("poll2", "Match 2")).await.unwrap();

        registry
            .record_vote("poll1", UserId(1), Outcome::Home)
            .await
            .unwrap();
        let _ = registry.record_vote("poll1", UserId(1), Outcome::Home).await;

        registry
            .record_vote("poll2", UserId(1), Outcome::Draw)
            .await
            .unwrap();

        let report = registry.report().await;
        assert!(report.contains("**POLL2**:"));
        assert!(report.contains("Draw: 1 votes"));
    }
}

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use serenity::model::id::{ChannelId, UserId};

use crate::error::PollError;

/// Length of a poll's voting window.
pub const POLL_DURATION_SECS: i64 = 60;

/// The three 1X2 outcomes a poll can be voted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Home,
    Draw,
    Away,
}

impl Outcome {
    /// Display order used in announcements and reports.
    pub const ALL: [Outcome; 3] = [Outcome::Home, Outcome::Draw, Outcome::Away];

    /// Token embedded in button custom ids (`vote_{token}_{pollId}`).
    pub fn token(self) -> &'static str {
        match self {
            Outcome::Home => "1",
            Outcome::Draw => "x",
            Outcome::Away => "2",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "1" => Some(Outcome::Home),
            "x" => Some(Outcome::Draw),
            "2" => Some(Outcome::Away),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Outcome::Home => "Home Win",
            Outcome::Draw => "Draw",
            Outcome::Away => "Away Win",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Outcome::Home => "1️⃣",
            Outcome::Draw => "❌",
            Outcome::Away => "2️⃣",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStatus {
    Open,
    Closed,
}

/// One voting round. Counters and the voter set move together: a voter id
/// is in `voters` exactly when one counter was incremented on their behalf.
#[derive(Debug, Clone)]
pub struct Poll {
    pub id: String,
    pub title: String,
    pub channel_id: ChannelId,
    pub created_at: DateTime<Utc>,
    pub closes_at: DateTime<Utc>,
    pub status: PollStatus,
    pub home: u32,
    pub draw: u32,
    pub away: u32,
    pub voters: HashSet<UserId>,
}

impl Poll {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        channel_id: ChannelId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            channel_id,
            created_at: now,
            closes_at: now + Duration::seconds(POLL_DURATION_SECS),
            status: PollStatus::Open,
            home: 0,
            draw: 0,
            away: 0,
            voters: HashSet::new(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == PollStatus::Open
    }

    pub fn tally(&self, outcome: Outcome) -> u32 {
        match outcome {
            Outcome::Home => self.home,
            Outcome::Draw => self.draw,
            Outcome::Away => self.away,
        }
    }

    pub fn total_votes(&self) -> u32 {
        self.home + self.draw + self.away
    }

    /// Apply one vote event. Rejections leave the poll untouched.
    pub fn record_vote(&mut self, voter: UserId, outcome: Outcome) -> Result<(), PollError> {
        if !self.is_open() {
            return Err(PollError::PollClosed(self.id.clone()));
        }
        if self.voters.contains(&voter) {
            return Err(PollError::DuplicateVote(self.id.clone()));
        }
        match outcome {
            Outcome::Home => self.home += 1,
            Outcome::Draw => self.draw += 1,
            Outcome::Away => self.away += 1,
        }
        self.voters.insert(voter);
        Ok(())
    }

    /// Close the voting window. Returns true only on the `Open -> Closed`
    /// transition; a closed poll stays closed.
    pub fn close(&mut self) -> bool {
        if self.is_open() {
            self.status = PollStatus::Closed;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_poll() -> Poll {
        Poll::new("poll1", "Match 1", ChannelId(1), Utc::now())
    }

    #[test]
    fn counters_match_voter_set_after_every_event() {
        let mut poll = open_poll();
        let events = [
            (UserId(1), Outcome::Home),
            (UserId(2), Outcome::Away),
            (UserId(1), Outcome::Draw), // rejected duplicate
            (UserId(3), Outcome::Home),
        ];
        for (voter, outcome) in events {
            let _ = poll.record_vote(voter, outcome);
            assert_eq!(poll.total_votes(), poll.voters.len() as u32);
        }
    }

    #[test]
    fn second_vote_by_same_voter_is_rejected() {
        let mut poll = open_poll();
        poll.record_vote(UserId(7), Outcome::Home).unwrap();
        let before = (poll.home, poll.draw, poll.away);

        // Same outcome and a different outcome are both rejected.
        assert!(matches!(
            poll.record_vote(UserId(7), Outcome::Home),
            Err(PollError::DuplicateVote(_))
        ));
        assert!(matches!(
            poll.record_vote(UserId(7), Outcome::Draw),
            Err(PollError::DuplicateVote(_))
        ));
        assert_eq!((poll.home, poll.draw, poll.away), before);
    }

    #[test]
    fn distinct_voters_increment_independently_of_order() {
        let mut forward = open_poll();
        forward.record_vote(UserId(1), Outcome::Draw).unwrap();
        forward.record_vote(UserId(2), Outcome::Draw).unwrap();

        let mut reverse = open_poll();
        reverse.record_vote(UserId(2), Outcome::Draw).unwrap();
        reverse.record_vote(UserId(1), Outcome::Draw).unwrap();

        assert_eq!(forward.draw, 2);
        assert_eq!(reverse.draw, 2);
    }

    #[test]
    fn closed_poll_rejects_votes() {
        let mut poll = open_poll();
        assert!(poll.close());
        assert!(matches!(
            poll.record_vote(UserId(1), Outcome::Home),
            Err(PollError::PollClosed(_))
        ));
        assert_eq!(poll.total_votes(), 0);
        // Closing twice is a no-op.
        assert!(!poll.close());
    }

    #[test]
    fn outcome_tokens_round_trip() {
        for outcome in Outcome::ALL {
            assert_eq!(Outcome::from_token(outcome.token()), Some(outcome));
        }
        assert_eq!(Outcome::from_token("9"), None);
    }
}

//! Like/dislike toggle state machine. One transition per request; membership
//! in the liked and disliked lists stays mutually exclusive and the counters
//! track the list lengths exactly.

use std::fmt;
use std::str::FromStr;

use crate::models::ReactionState;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ReactionError {
    #[error("unrecognized reaction action: {0}")]
    UnknownAction(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionAction {
    Like,
    Dislike,
    Unlike,
    Undislike,
}

impl FromStr for ReactionAction {
    type Err = ReactionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(ReactionAction::Like),
            "dislike" => Ok(ReactionAction::Dislike),
            "unlike" => Ok(ReactionAction::Unlike),
            "undislike" => Ok(ReactionAction::Undislike),
            other => Err(ReactionError::UnknownAction(other.to_string())),
        }
    }
}

impl fmt::Display for ReactionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReactionAction::Like => "like",
            ReactionAction::Dislike => "dislike",
            ReactionAction::Unlike => "unlike",
            ReactionAction::Undislike => "undislike",
        })
    }
}

/// What a transition did. No-ops are reported, not errors: the caller uses
/// them for user-facing messaging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionOutcome {
    Applied,
    AlreadyLiked,
    AlreadyDisliked,
    NotLiked,
    NotDisliked,
}

impl ReactionOutcome {
    pub fn changed(self) -> bool {
        self == ReactionOutcome::Applied
    }

    pub fn message(self) -> Option<&'static str> {
        match self {
            ReactionOutcome::AlreadyLiked => Some("you already liked this post"),
            ReactionOutcome::AlreadyDisliked => Some("you already disliked this post"),
            _ => None,
        }
    }
}

/// Apply one reaction for `user`. Liking while disliked (and vice versa)
/// flips the membership in the same transition; repeating an action is
/// idempotent after the first application.
pub fn apply(state: &mut ReactionState, user: &str, action: ReactionAction) -> ReactionOutcome {
    match action {
        ReactionAction::Like => {
            if contains(&state.user_liked, user) {
                return ReactionOutcome::AlreadyLiked;
            }
            if remove(&mut state.user_disliked, user) {
                state.dislikes = state.dislikes.saturating_sub(1);
            }
            state.user_liked.push(user.to_string());
            state.likes += 1;
            ReactionOutcome::Applied
        }
        ReactionAction::Dislike => {
            if contains(&state.user_disliked, user) {
                return ReactionOutcome::AlreadyDisliked;
            }
            if remove(&mut state.user_liked, user) {
                state.likes = state.likes.saturating_sub(1);
            }
            state.user_disliked.push(user.to_string());
            state.dislikes += 1;
            ReactionOutcome::Applied
        }
        ReactionAction::Unlike => {
            if remove(&mut state.user_liked, user) {
                state.likes = state.likes.saturating_sub(1);
                ReactionOutcome::Applied
            } else {
                ReactionOutcome::NotLiked
            }
        }
        ReactionAction::Undislike => {
            if remove(&mut state.user_disliked, user) {
                state.dislikes = state.dislikes.saturating_sub(1);
                ReactionOutcome::Applied
            } else {
                ReactionOutcome::NotDisliked
            }
        }
    }
}

fn contains(members: &[String], user: &str) -> bool {
    members.iter().any(|m| m == user)
}

fn remove(members: &mut Vec<String>, user: &str) -> bool {
    match members.iter().position(|m| m == user) {
        Some(idx) => {
            members.remove(idx);
            true
        }
        None => false,
    }
}

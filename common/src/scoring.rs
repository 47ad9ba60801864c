use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    constants::*,
    protocol::{ActorId, Team},
};

const TEAMS: usize = MAX_ACTORS / TEAM_SIZE;

// ============================================================================
// Match Rules
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchRules {
    pub time_limit_ticks: u64,
    // Delay between the first finish and the end of a won match
    pub finish_grace_ticks: u64,
}

impl Default for MatchRules {
    fn default() -> Self {
        Self {
            time_limit_ticks: u64::from(TIME_LIMIT_SECS * TICK_RATE),
            finish_grace_ticks: u64::from(FINISH_GRACE_SECS * TICK_RATE),
        }
    }
}

// ============================================================================
// Match Progress
// ============================================================================

// Finish bookkeeping for one level run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchProgress {
    pub rules: MatchRules,
    players: usize,
    finished: [bool; MAX_ACTORS],
    first_finish: Option<u64>,
    pub team_scores: [i32; TEAMS],
    pub winning_team: Option<Team>,
}

impl MatchProgress {
    #[must_use]
    pub fn new(players: usize, rules: MatchRules) -> Self {
        Self {
            rules,
            players: players.min(MAX_ACTORS),
            finished: [false; MAX_ACTORS],
            first_finish: None,
            team_scores: [0; TEAMS],
            winning_team: None,
        }
    }

    #[must_use]
    pub fn is_finished(&self, actor: ActorId) -> bool {
        self.finished.get(actor.0).copied().unwrap_or(false)
    }

    #[must_use]
    pub fn finished_count(&self) -> usize {
        self.finished.iter().filter(|done| **done).count()
    }

    // Record `actor` reaching the exit. Returns the team when this finish wins the match.
    pub fn record_finish(&mut self, actor: ActorId, tick: u64) -> Option<Team> {
        if actor.0 >= self.players || self.finished[actor.0] {
            return None;
        }
        self.finished[actor.0] = true;
        self.first_finish.get_or_insert(tick);

        let team = actor.team();
        self.team_scores[team.0] += FINISH_POINTS;

        let team_done = (0..self.players)
            .filter(|id| ActorId(*id).team() == team)
            .all(|id| self.finished[id]);
        if team_done && self.winning_team.is_none() {
            self.winning_team = Some(team);
            self.team_scores[team.0] += TEAM_WIN_BONUS;
            info!(team = team.0, tick, "team reached the exit");
            return Some(team);
        }
        None
    }

    // The match ends at the time limit, or once a team has won and the grace period
    // since the first finish has passed.
    #[must_use]
    pub fn is_over(&self, tick: u64) -> bool {
        if tick >= self.rules.time_limit_ticks {
            return true;
        }
        match (self.winning_team, self.first_finish) {
            (Some(_), Some(first)) => tick.saturating_sub(first) > self.rules.finish_grace_ticks,
            _ => false,
        }
    }

    // Final payload for a match played on `level` in `mode`, ended at `ticks`
    #[must_use]
    pub fn result(&self, mode: &str, level: &str, ticks: u64) -> MatchResult {
        let mut scores = [0; MAX_ACTORS];
        for (id, score) in scores.iter_mut().enumerate() {
            let team = ActorId(id).team();
            *score = if id >= self.players {
                0
            } else if self.finished[id] {
                let bonus = if self.winning_team == Some(team) { FINISH_POINTS } else { 0 };
                FINISH_POINTS + bonus
            } else {
                self.team_scores[team.0] / 2
            };
        }

        let winner = self.winning_team.map_or_else(
            || if self.team_scores[0] >= self.team_scores[1] { 0 } else { 1 },
            |team| team.0 as i32,
        );

        MatchResult {
            scores,
            winner,
            team_scores: self.team_scores,
            meta: ResultMeta {
                mode: mode.to_string(),
                finished: self.finished_count(),
                team_game: true,
                level: level.to_string(),
                ticks,
            },
        }
    }
}

// ============================================================================
// Match Result
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultMeta {
    pub mode: String,
    pub finished: usize,
    pub team_game: bool,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub ticks: u64,
}

// Payload of the `RESULT:` line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub scores: [i32; MAX_ACTORS],
    pub winner: i32,
    pub team_scores: [i32; TEAMS],
    pub meta: ResultMeta,
}

//! Map draft: turn-based bans and picks before a match is played.

use crate::models::{
    BanPickEntry, BanPickOutcome, Draft, DraftAction, EngineError, Match, MatchStatus, TeamId,
};
use chrono::Utc;

/// Open the draft of a scheduled match. Team 1 acts first.
///
/// If the pool already has exactly `best_of` maps there is nothing to ban and the
/// match goes straight to `AwaitingScores`.
pub fn start_draft(m: &mut Match, map_pool: &[String], best_of: u32) -> Result<(), EngineError> {
    if m.draft.is_some() {
        return Err(EngineError::AlreadyStarted);
    }
    if m.status != MatchStatus::Scheduled {
        return Err(EngineError::InvalidState { status: m.status });
    }
    let (team1, team2) = m.teams().ok_or(EngineError::TeamsNotDecided)?;
    if best_of == 0 {
        return Err(EngineError::invalid("best_of must be at least 1"));
    }
    if map_pool.len() < best_of as usize {
        return Err(EngineError::invalid(format!(
            "map pool has {} maps but best_of is {}",
            map_pool.len(),
            best_of
        )));
    }

    let draft = Draft::new(map_pool.to_vec(), best_of, team1, team2);
    if draft.is_complete() {
        m.play_order = draft.play_order();
        m.status = MatchStatus::AwaitingScores;
    } else {
        m.status = MatchStatus::Drafting;
    }
    m.draft = Some(draft);
    m.touch();
    Ok(())
}

/// Commit one ban or pick.
///
/// `team_id` must play in the match. A captain may only act on their own turn; with
/// `by_referee` the action is recorded for whichever team is on turn. Re-sending an
/// action that is already committed returns that entry with `duplicate = true`.
pub fn submit_action(
    m: &mut Match,
    team_id: TeamId,
    map_name: &str,
    action: DraftAction,
    by_referee: bool,
) -> Result<BanPickOutcome, EngineError> {
    if m.side_of(team_id).is_none() {
        return Err(EngineError::NotParticipant(team_id));
    }
    let status = m.status;
    let draft = m
        .draft
        .as_mut()
        .ok_or(EngineError::InvalidState { status })?;

    if let Some(existing) = draft.entry_for(map_name) {
        let same_actor = if by_referee {
            existing.by_referee
        } else {
            existing.acting_team_id == team_id
        };
        if same_actor && existing.action == action {
            return Ok(BanPickOutcome {
                entry: existing.clone(),
                duplicate: true,
                draft_complete: draft.is_complete(),
            });
        }
        return Err(EngineError::MapAlreadyUsed(map_name.to_string()));
    }

    if status != MatchStatus::Drafting {
        return Err(EngineError::InvalidState { status });
    }
    if !draft.map_pool.iter().any(|p| p == map_name) {
        return Err(EngineError::UnknownMap(map_name.to_string()));
    }

    let on_turn = draft.team_on_turn();
    if !by_referee && team_id != on_turn {
        return Err(EngineError::NotYourTurn { expected: on_turn });
    }
    if action == DraftAction::Pick && draft.picks() >= draft.best_of as usize {
        return Err(EngineError::PicksExhausted {
            best_of: draft.best_of,
        });
    }

    let entry = BanPickEntry {
        map_name: map_name.to_string(),
        action,
        acting_team_id: on_turn,
        pick_order: draft.entries.len() as u32 + 1,
        by_referee,
        created_at: Utc::now(),
    };
    draft.entries.push(entry.clone());

    let complete = draft.is_complete();
    if complete {
        m.play_order = draft.play_order();
        m.status = MatchStatus::AwaitingScores;
    }
    m.touch();

    Ok(BanPickOutcome {
        entry,
        duplicate: false,
        draft_complete: complete,
    })
}

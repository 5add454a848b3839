//! Group stage: drawing groups, round-robin matches, standings and playoff seeding.

use crate::models::{EngineError, Group, GroupMatch, GroupMatchId, GroupStanding, TeamId};
use std::collections::HashSet;

/// Highest score a single group match may be recorded with.
pub const MAX_GROUP_SCORE: u32 = 999;

/// Name of the `index`-th group: A, B, C, ...
pub fn group_name(index: usize) -> String {
    char::from(b'A' + index as u8).to_string()
}

/// Split `teams` into `group_count` groups (team `i` goes to group `i % group_count`)
/// and create one match per pair inside each group.
pub fn draw_groups(
    teams: &[TeamId],
    group_count: usize,
    min_teams: usize,
) -> Result<Vec<Group>, EngineError> {
    if teams.len() < min_teams {
        return Err(EngineError::InsufficientTeams {
            required: min_teams,
            found: teams.len(),
        });
    }
    if group_count == 0 || group_count > 26 {
        return Err(EngineError::invalid("group count must be between 1 and 26"));
    }
    if teams.len() < group_count * 2 {
        return Err(EngineError::invalid(format!(
            "{} teams cannot fill {} groups of at least two",
            teams.len(),
            group_count
        )));
    }
    let mut seen = HashSet::new();
    if let Some(dup) = teams.iter().find(|t| !seen.insert(**t)) {
        return Err(EngineError::invalid(format!("team {dup} is listed twice")));
    }

    let mut groups: Vec<Group> = (0..group_count)
        .map(|i| Group {
            name: group_name(i),
            teams: Vec::new(),
            matches: Vec::new(),
        })
        .collect();
    for (i, &team) in teams.iter().enumerate() {
        groups[i % group_count].teams.push(team);
    }
    for group in &mut groups {
        let ids = &group.teams;
        for (i, &a) in ids.iter().enumerate() {
            for &b in &ids[i + 1..] {
                group.matches.push(GroupMatch::new(group.name.clone(), a, b));
            }
        }
    }
    Ok(groups)
}

/// Set the score of a group match. Only matches with `played` count towards standings.
pub fn record_result(
    group: &mut Group,
    match_id: GroupMatchId,
    team1_score: u32,
    team2_score: u32,
    played: bool,
) -> Result<GroupMatch, EngineError> {
    if team1_score > MAX_GROUP_SCORE || team2_score > MAX_GROUP_SCORE {
        return Err(EngineError::invalid(format!(
            "scores must be at most {MAX_GROUP_SCORE}, got {team1_score}:{team2_score}"
        )));
    }
    let m = group
        .matches
        .iter_mut()
        .find(|m| m.id == match_id)
        .ok_or(EngineError::GroupMatchNotFound(match_id))?;
    m.team1_score = team1_score;
    m.team2_score = team2_score;
    m.played = played;
    Ok(m.clone())
}

/// Table of a group, folded from its played matches.
///
/// Order: points, goal difference, goals scored (all descending), then team id so that
/// equal records always come out the same way.
pub fn compute_standings(group: &Group) -> Vec<GroupStanding> {
    let mut table: Vec<GroupStanding> = group
        .teams
        .iter()
        .map(|&t| GroupStanding::new(group.name.clone(), t))
        .collect();

    for m in group.matches.iter().filter(|m| m.played) {
        if let Some(s) = table.iter_mut().find(|s| s.team_id == m.team1_id) {
            s.record(m.team1_score, m.team2_score);
        }
        if let Some(s) = table.iter_mut().find(|s| s.team_id == m.team2_id) {
            s.record(m.team2_score, m.team1_score);
        }
    }

    table.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then(b.goal_difference.cmp(&a.goal_difference))
            .then(b.goals_for.cmp(&a.goals_for))
            .then(a.team_id.cmp(&b.team_id))
    });
    table
}

/// Seeding order for the playoff bracket from each group's qualifiers (best first).
///
/// Group winners take the top seeds in group order. Each further tier is placed so that,
/// where possible, a team's round-one opponent comes from another group: with four groups
/// that gives A1-B2, B1-A2, C1-D2, D1-C2.
pub fn playoff_seeding(qualifiers: &[Vec<TeamId>]) -> Vec<TeamId> {
    let total: usize = qualifiers.iter().map(Vec::len).sum();
    let size = total.next_power_of_two();
    let tiers = qualifiers.iter().map(Vec::len).max().unwrap_or(0);

    // (group index, team) per 0-based seed slot.
    let mut slots: Vec<Option<(usize, TeamId)>> = vec![None; total];
    let mut next = 0;
    for tier in 0..tiers {
        let mut pool: Vec<(usize, TeamId)> = qualifiers
            .iter()
            .enumerate()
            .filter_map(|(g, teams)| teams.get(tier).map(|&t| (g, t)))
            .collect();
        let range = next..next + pool.len();
        next = range.end;
        if tier == 0 {
            for (slot, entry) in range.zip(pool) {
                slots[slot] = Some(entry);
            }
            continue;
        }
        for slot in range.rev() {
            let opponent_group = slots
                .get(size - 1 - slot)
                .copied()
                .flatten()
                .map(|(g, _)| g);
            let pick = pool
                .iter()
                .position(|(g, _)| Some(*g) != opponent_group)
                .unwrap_or(0);
            slots[slot] = Some(pool.remove(pick));
        }
    }
    slots.into_iter().flatten().map(|(_, t)| t).collect()
}

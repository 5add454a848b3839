//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use match_engine::{
    Actor, Completion, Engine, MatchId, MatchStatus, NewTournament, Role, Team, TeamId,
    Tournament, TournamentFormat,
};
use uuid::Uuid;

pub const POOL: [&str; 7] = [
    "Ancient", "Anubis", "Dust2", "Inferno", "Mirage", "Nuke", "Vertigo",
];

pub fn admin() -> Actor {
    Actor::new(Uuid::new_v4(), Role::Admin)
}

pub fn referee() -> Actor {
    Actor::new(Uuid::new_v4(), Role::Referee)
}

pub fn player() -> Actor {
    Actor::new(Uuid::new_v4(), Role::Player)
}

pub fn captain(team: &Team) -> Actor {
    Actor::new(team.captain_id, Role::Player)
}

/// Register `n` teams named T1..Tn, each with its own captain.
pub fn register_teams(engine: &Engine, n: usize) -> Vec<Team> {
    (1..=n)
        .map(|i| {
            let team = Team::new(format!("T{i}"), Uuid::new_v4());
            engine.upsert_team(team.clone());
            team
        })
        .collect()
}

pub fn ids(teams: &[Team]) -> Vec<TeamId> {
    teams.iter().map(|t| t.id).collect()
}

pub fn tournament(
    engine: &Engine,
    format: TournamentFormat,
    best_of: u32,
    pool: &[&str],
) -> Tournament {
    engine
        .create_tournament(
            &admin(),
            NewTournament {
                name: "Spring Cup".to_string(),
                format,
                team_size: 5,
                best_of,
                map_pool: pool.iter().map(|m| m.to_string()).collect(),
            },
        )
        .unwrap()
}

/// Single-elimination, best of one on a one-map pool: drafts finish as soon as they start.
pub fn quick_tournament(engine: &Engine) -> Tournament {
    tournament(engine, TournamentFormat::SingleElimination, 1, &["Dust2"])
}

/// Team looked up by id among `teams`.
pub fn team_by_id<'a>(teams: &'a [Team], id: TeamId) -> &'a Team {
    teams.iter().find(|t| t.id == id).unwrap()
}

/// Drive a match with both teams known to completion with the given score.
pub fn play(engine: &Engine, match_id: MatchId, team1_score: u32, team2_score: u32) -> Completion {
    let referee = referee();
    if engine.get_match(match_id).unwrap().status == MatchStatus::Scheduled {
        engine.start_ban_pick(&referee, match_id).unwrap();
    }
    engine
        .confirm_match(&referee, match_id, team1_score, team2_score)
        .unwrap();
    engine.complete_match(&referee, match_id).unwrap()
}

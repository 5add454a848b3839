//! Integration tests for the group stage: draws, results, standings and finalization.

mod common;

use common::{admin, ids, referee, register_teams, tournament};
use match_engine::logic::group_stage::{compute_standings, playoff_seeding};
use match_engine::{
    Engine, EngineError, ErrorKind, Group, GroupMatch, GroupStageView, TeamId, Tournament,
    TournamentFormat, TournamentStatus,
};
use std::collections::HashMap;
use uuid::Uuid;

fn group_tournament(engine: &Engine) -> Tournament {
    tournament(engine, TournamentFormat::GroupThenPlayoff, 1, &["Dust2"])
}

/// Play every group match; the team drawn earlier in its group always wins 2:0.
fn play_all(engine: &Engine, stage: &GroupStageView) {
    let referee = referee();
    for group in &stage.groups {
        for m in &group.matches {
            engine
                .update_group_match(&referee, m.id, 2, 0, true)
                .unwrap();
        }
    }
}

#[test]
fn too_few_teams_is_rejected() {
    let engine = Engine::default();
    let teams = register_teams(&engine, 15);
    let t = group_tournament(&engine);
    let err = engine
        .create_group_stage(&admin(), t.id, &ids(&teams), None)
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InsufficientTeams {
            required: 16,
            found: 15
        }
    );
    assert_eq!(err.kind(), ErrorKind::Sequence);
}

#[test]
fn sixteen_teams_make_four_round_robin_groups() {
    let engine = Engine::default();
    let teams = register_teams(&engine, 16);
    let t = group_tournament(&engine);
    let stage = engine
        .create_group_stage(&admin(), t.id, &ids(&teams), None)
        .unwrap();

    let names: Vec<&str> = stage.groups.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, vec!["A", "B", "C", "D"]);
    for g in &stage.groups {
        assert_eq!(g.standings.len(), 4);
        assert_eq!(g.matches.len(), 6);
        assert!(g.matches.iter().all(|m| !m.played && m.group_name == g.name));
    }
    let total: usize = stage.groups.iter().map(|g| g.matches.len()).sum();
    assert_eq!(total, 24);
    // Team i goes to group i % 4.
    assert_eq!(stage.groups[1].standings.iter().filter(|s| s.team_id == teams[5].id).count(), 1);
    assert_eq!(
        engine.tournament(t.id).unwrap().status,
        TournamentStatus::GroupStage
    );
}

#[test]
fn group_count_is_validated() {
    let engine = Engine::default();
    let teams = register_teams(&engine, 16);
    let t = group_tournament(&engine);
    for bad in [0, 9, 27] {
        let err = engine
            .create_group_stage(&admin(), t.id, &ids(&teams), Some(bad))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation, "group count {bad}");
    }
    let two = engine
        .create_group_stage(&admin(), t.id, &ids(&teams), Some(2))
        .unwrap();
    assert_eq!(two.groups.len(), 2);
    assert_eq!(two.groups[0].matches.len(), 28);
}

#[test]
fn draw_can_be_redone_until_a_result_is_in() {
    let engine = Engine::default();
    let teams = register_teams(&engine, 16);
    let t = group_tournament(&engine);
    engine
        .create_group_stage(&admin(), t.id, &ids(&teams), None)
        .unwrap();
    let mut reversed = ids(&teams);
    reversed.reverse();
    let redrawn = engine
        .create_group_stage(&admin(), t.id, &reversed, None)
        .unwrap();

    let first = &redrawn.groups[0].matches[0];
    engine
        .update_group_match(&referee(), first.id, 1, 0, true)
        .unwrap();
    assert!(matches!(
        engine.create_group_stage(&admin(), t.id, &ids(&teams), None),
        Err(EngineError::AlreadyStarted)
    ));
}

#[test]
fn draws_count_and_unplayed_results_do_not() {
    let engine = Engine::default();
    let teams = register_teams(&engine, 16);
    let t = group_tournament(&engine);
    let stage = engine
        .create_group_stage(&admin(), t.id, &ids(&teams), None)
        .unwrap();
    let m = stage.groups[0].matches[0].clone();
    let other = stage.groups[0].matches[1].clone();

    let group = engine
        .update_group_match(&referee(), m.id, 1, 1, true)
        .unwrap();
    let row = |id: TeamId| group.standings.iter().find(|s| s.team_id == id).unwrap().clone();
    assert_eq!(row(m.team1_id).draws, 1);
    assert_eq!(row(m.team1_id).points, 1);
    assert_eq!(row(m.team2_id).points, 1);

    let group = engine
        .update_group_match(&referee(), other.id, 5, 0, false)
        .unwrap();
    let winner = group
        .standings
        .iter()
        .find(|s| s.team_id == other.team1_id)
        .unwrap();
    assert_eq!(winner.goals_for, 1);
    assert_eq!(winner.matches_played, 1);
}

#[test]
fn standings_are_ordered_by_points_difference_goals_then_id() {
    let (a, b, c, d) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    let result = |t1, t2, s1, s2| GroupMatch {
        team1_score: s1,
        team2_score: s2,
        played: true,
        ..GroupMatch::new("A", t1, t2)
    };
    let group = Group {
        name: "A".to_string(),
        teams: vec![a, b, c, d],
        matches: vec![
            result(a, b, 3, 0),
            result(c, d, 1, 0),
            result(a, c, 0, 1),
            result(b, d, 2, 2),
            result(a, d, 1, 1),
            result(b, c, 1, 1),
        ],
    };
    let table = compute_standings(&group);
    let order: Vec<TeamId> = table.iter().map(|s| s.team_id).collect();
    // c 7 pts; a 4 pts; b and d 2 pts each, d ahead on goal difference.
    assert_eq!(order, vec![c, a, d, b]);
    assert_eq!(table[1].goal_difference, 2);
    assert_eq!(table[2].goal_difference, -1);
    assert_eq!(table[3].goal_difference, -3);
    assert_eq!(compute_standings(&group), table);
}

#[test]
fn level_teams_are_ordered_by_id() {
    let (x, y) = (Uuid::new_v4(), Uuid::new_v4());
    let group = Group {
        name: "B".to_string(),
        teams: vec![x, y],
        matches: vec![GroupMatch {
            team1_score: 2,
            team2_score: 2,
            played: true,
            ..GroupMatch::new("B", x, y)
        }],
    };
    let order: Vec<TeamId> = compute_standings(&group).iter().map(|s| s.team_id).collect();
    assert_eq!(order, vec![x.min(y), x.max(y)]);
}

#[test]
fn seeding_keeps_group_mates_apart() {
    let groups: Vec<Vec<TeamId>> = (0..4).map(|_| vec![Uuid::new_v4(), Uuid::new_v4()]).collect();
    let seeded = playoff_seeding(&groups);
    let (a, b, c, d) = (&groups[0], &groups[1], &groups[2], &groups[3]);
    assert_eq!(seeded[..4], [a[0], b[0], c[0], d[0]]);
    // Seed 8 meets seed 1, 7 meets 2, 6 meets 3, 5 meets 4.
    assert_eq!(seeded[7], b[1]);
    assert_eq!(seeded[6], a[1]);
    assert_eq!(seeded[5], d[1]);
    assert_eq!(seeded[4], c[1]);
}

#[test]
fn finalize_needs_every_result() {
    let engine = Engine::default();
    let teams = register_teams(&engine, 16);
    let t = group_tournament(&engine);
    engine
        .create_group_stage(&admin(), t.id, &ids(&teams), None)
        .unwrap();
    assert!(matches!(
        engine.finalize_group_stage(&admin(), t.id),
        Err(EngineError::IncompleteGroupStage { unplayed: 24 })
    ));
}

#[test]
fn sixteen_teams_to_an_eight_team_playoff() {
    let engine = Engine::default();
    let teams = register_teams(&engine, 16);
    let t = group_tournament(&engine);
    let stage = engine
        .create_group_stage(&admin(), t.id, &ids(&teams), None)
        .unwrap();
    play_all(&engine, &stage);

    let group_of: HashMap<TeamId, String> = stage
        .groups
        .iter()
        .flat_map(|g| g.standings.iter().map(move |s| (s.team_id, g.name.clone())))
        .collect();
    let stage = engine.get_group_stage(t.id).unwrap();
    for g in &stage.groups {
        let points: Vec<u32> = g.standings.iter().map(|s| s.points).collect();
        assert_eq!(points, vec![9, 6, 3, 0]);
    }

    let bracket = engine.finalize_group_stage(&admin(), t.id).unwrap();
    assert_eq!(bracket.max_round, 3);
    let names: Vec<&str> = bracket.rounds.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Quarterfinal", "Semifinal", "Final"]);

    let round1 = &bracket.rounds[0].matches;
    assert_eq!(round1.len(), 4);
    for m in round1 {
        let (t1, t2) = m.teams().unwrap();
        assert_ne!(group_of[&t1], group_of[&t2]);
    }
    // A1 opens against B2.
    let winner_a = stage.groups[0].standings[0].team_id;
    let runner_b = stage.groups[1].standings[1].team_id;
    assert_eq!(round1[0].teams(), Some((winner_a, runner_b)));

    let stage = engine.get_group_stage(t.id).unwrap();
    assert!(stage.finalized);
    assert_eq!(
        engine.tournament(t.id).unwrap().status,
        TournamentStatus::Playoffs
    );
}

#[test]
fn finalized_stage_is_frozen() {
    let engine = Engine::default();
    let teams = register_teams(&engine, 16);
    let t = group_tournament(&engine);
    let stage = engine
        .create_group_stage(&admin(), t.id, &ids(&teams), None)
        .unwrap();
    play_all(&engine, &stage);
    engine.finalize_group_stage(&admin(), t.id).unwrap();

    let any = stage.groups[0].matches[0].id;
    assert!(matches!(
        engine.update_group_match(&referee(), any, 0, 3, true),
        Err(EngineError::GroupStageFinalized)
    ));
    assert!(matches!(
        engine.finalize_group_stage(&admin(), t.id),
        Err(EngineError::GroupStageFinalized)
    ));
    assert!(matches!(
        engine.create_group_stage(&admin(), t.id, &ids(&teams), None),
        Err(EngineError::GroupStageFinalized)
    ));
}

#[test]
fn unknown_group_match_is_not_found() {
    let engine = Engine::default();
    let err = engine
        .update_group_match(&referee(), Uuid::new_v4(), 1, 0, true)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn oversized_scores_are_rejected_before_storing() {
    let engine = Engine::default();
    let teams = register_teams(&engine, 16);
    let t = group_tournament(&engine);
    let stage = engine
        .create_group_stage(&admin(), t.id, &ids(&teams), None)
        .unwrap();
    let first = stage.groups[0].matches[0].clone();
    let second = stage.groups[0].matches[1].clone();

    let err = engine
        .update_group_match(&referee(), first.id, u32::MAX, 0, true)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let group = engine
        .update_group_match(&referee(), second.id, 1, 0, true)
        .unwrap();
    assert!(group.matches.iter().all(|m| m.id != first.id || !m.played));
    let view = engine.get_group_stage(t.id).unwrap();
    let leader = &view.groups[0].standings[0];
    assert_eq!(leader.team_id, second.team1_id);
    assert_eq!(leader.goals_for, 1);
}

#[test]
fn huge_goal_totals_do_not_overflow_the_table() {
    let (x, y) = (Uuid::new_v4(), Uuid::new_v4());
    let big = |t1, t2| GroupMatch {
        team1_score: u32::MAX,
        team2_score: 0,
        played: true,
        ..GroupMatch::new("C", t1, t2)
    };
    let group = Group {
        name: "C".to_string(),
        teams: vec![x, y],
        matches: vec![big(x, y), big(x, y)],
    };
    let table = compute_standings(&group);
    assert_eq!(table[0].team_id, x);
    assert_eq!(table[0].goals_for, u32::MAX);
    assert_eq!(table[0].points, 6);
}

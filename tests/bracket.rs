//! Integration tests for bracket generation, byes and winner propagation.

mod common;

use common::{admin, ids, play, player, quick_tournament, referee, register_teams, tournament};
use match_engine::{
    Engine, EngineError, ErrorKind, MatchStatus, Side, TournamentFormat, TournamentStatus,
};

#[test]
fn eight_seeds_pair_top_against_bottom() {
    let engine = Engine::default();
    let teams = register_teams(&engine, 8);
    let seeds = ids(&teams);
    let t = quick_tournament(&engine);
    let bracket = engine.generate_bracket(&admin(), t.id, &seeds).unwrap();

    assert_eq!(bracket.max_round, 3);
    let names: Vec<&str> = bracket.rounds.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Quarterfinal", "Semifinal", "Final"]);
    assert_eq!(bracket.rounds[0].matches.len(), 4);
    assert_eq!(bracket.rounds[1].matches.len(), 2);
    assert_eq!(bracket.rounds[2].matches.len(), 1);

    let pairs: Vec<(usize, usize)> = bracket.rounds[0]
        .matches
        .iter()
        .map(|m| {
            let seed = |id| seeds.iter().position(|s| Some(*s) == id).unwrap() + 1;
            (seed(m.team1_id), seed(m.team2_id))
        })
        .collect();
    assert_eq!(pairs, vec![(1, 8), (4, 5), (3, 6), (2, 7)]);
    for (i, m) in bracket.rounds[0].matches.iter().enumerate() {
        assert_eq!(m.round, 1);
        assert_eq!(m.match_number, i as u32 + 1);
        assert_eq!(m.status, MatchStatus::Scheduled);
    }
    assert!(bracket.rounds[1].matches.iter().all(|m| m.teams().is_none()));
    assert_eq!(bracket.champion_id, None);

    let t = engine.tournament(t.id).unwrap();
    assert_eq!(t.status, TournamentStatus::Playoffs);
}

#[test]
fn byes_become_walkovers_for_top_seeds() {
    let engine = Engine::default();
    let teams = register_teams(&engine, 6);
    let seeds = ids(&teams);
    let t = quick_tournament(&engine);
    let bracket = engine.generate_bracket(&admin(), t.id, &seeds).unwrap();

    let round1 = &bracket.rounds[0].matches;
    // Seeds 7 and 8 do not exist: seed 1 and seed 2 go straight through.
    assert!(round1[0].walkover);
    assert_eq!(round1[0].status, MatchStatus::Completed);
    assert_eq!(round1[0].winner_id, Some(seeds[0]));
    assert!(round1[3].walkover);
    assert_eq!(round1[3].winner_id, Some(seeds[1]));
    assert!(!round1[1].walkover && !round1[2].walkover);

    let round2 = &bracket.rounds[1].matches;
    assert_eq!(round2[0].team1_id, Some(seeds[0]));
    assert_eq!(round2[0].team2_id, None);
    assert_eq!(round2[1].team2_id, Some(seeds[1]));
    assert_eq!(round2[1].team1_id, None);

    // A walkover has no result to void.
    assert!(engine.nullify_match(&referee(), round1[0].id).is_err());
}

#[test]
fn winners_fill_the_next_round() {
    let engine = Engine::default();
    let teams = register_teams(&engine, 8);
    let t = quick_tournament(&engine);
    let bracket = engine.generate_bracket(&admin(), t.id, &ids(&teams)).unwrap();
    let round1 = &bracket.rounds[0].matches;
    let semi = bracket.rounds[1].matches[0].id;

    let done = play(&engine, round1[0].id, 2, 0);
    assert_eq!(done.advanced_to, Some(semi));
    let done = play(&engine, round1[1].id, 0, 2);
    assert_eq!(done.advanced_to, Some(semi));

    let semi = engine.get_match(semi).unwrap();
    assert_eq!(semi.team1_id, round1[0].team1_id);
    assert_eq!(semi.team2_id, round1[1].team2_id);
}

#[test]
fn repeated_completion_does_not_move_anyone_twice() {
    let engine = Engine::default();
    let teams = register_teams(&engine, 4);
    let t = quick_tournament(&engine);
    let bracket = engine.generate_bracket(&admin(), t.id, &ids(&teams)).unwrap();
    let m = &bracket.rounds[0].matches[0];
    let final_id = bracket.rounds[1].matches[0].id;

    play(&engine, m.id, 2, 1);
    let before = engine.get_match(final_id).unwrap();
    let again = engine.complete_match(&referee(), m.id).unwrap();
    assert!(!again.newly_completed);
    assert_eq!(again.advanced_to, Some(final_id));
    assert_eq!(engine.get_match(final_id).unwrap(), before);
}

#[test]
fn changed_winner_conflicts_until_slot_is_cleared() {
    let engine = Engine::default();
    let teams = register_teams(&engine, 4);
    let t = quick_tournament(&engine);
    let bracket = engine.generate_bracket(&admin(), t.id, &ids(&teams)).unwrap();
    let m = bracket.rounds[0].matches[0].clone();
    let final_id = bracket.rounds[1].matches[0].id;
    let referee = referee();

    play(&engine, m.id, 2, 1);
    engine.nullify_match(&referee, m.id).unwrap();
    // Nullify leaves the propagated winner in place.
    assert_eq!(engine.get_match(final_id).unwrap().team1_id, m.team1_id);

    engine.confirm_match(&referee, m.id, 0, 2).unwrap();
    let err = engine.complete_match(&referee, m.id).unwrap_err();
    assert_eq!(
        err,
        EngineError::SlotConflict {
            match_id: final_id,
            occupant: m.team1_id.unwrap(),
        }
    );
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let cleared = engine
        .clear_bracket_slot(&referee, final_id, Side::One)
        .unwrap();
    assert_eq!(cleared.team1_id, None);

    let done = engine.complete_match(&referee, m.id).unwrap();
    assert!(!done.newly_completed);
    assert_eq!(engine.get_match(final_id).unwrap().team1_id, m.team2_id);
}

#[test]
fn slot_with_reports_cannot_be_cleared() {
    let engine = Engine::default();
    let teams = register_teams(&engine, 2);
    let t = quick_tournament(&engine);
    let bracket = engine.generate_bracket(&admin(), t.id, &ids(&teams)).unwrap();
    let m = &bracket.rounds[0].matches[0];
    play(&engine, m.id, 2, 0);
    assert!(matches!(
        engine.clear_bracket_slot(&referee(), m.id, Side::Two),
        Err(EngineError::InvalidState {
            status: MatchStatus::Completed
        })
    ));
}

#[test]
fn playing_every_round_crowns_a_champion() {
    let engine = Engine::default();
    let teams = register_teams(&engine, 4);
    let seeds = ids(&teams);
    let t = quick_tournament(&engine);
    let bracket = engine.generate_bracket(&admin(), t.id, &seeds).unwrap();

    for m in &bracket.rounds[0].matches {
        play(&engine, m.id, 2, 0);
    }
    let final_id = bracket.rounds[1].matches[0].id;
    let done = play(&engine, final_id, 0, 2);
    // Seed 1 beat seed 4, seed 2 beat seed 3; seed 2 wins the final from slot two.
    assert_eq!(done.champion_id, Some(seeds[1]));

    let view = engine.get_bracket(t.id).unwrap();
    assert_eq!(view.champion_id, Some(seeds[1]));
    let t = engine.tournament(t.id).unwrap();
    assert_eq!(t.status, TournamentStatus::Completed);
    assert_eq!(t.champion_id, Some(seeds[1]));
}

#[test]
fn generation_is_validated() {
    let engine = Engine::default();
    let teams = register_teams(&engine, 4);
    let seeds = ids(&teams);
    let t = quick_tournament(&engine);

    assert!(matches!(
        engine.generate_bracket(&player(), t.id, &seeds),
        Err(EngineError::NotAdmin)
    ));
    assert!(matches!(
        engine.generate_bracket(&admin(), t.id, &seeds[..1]),
        Err(EngineError::InsufficientTeams { required: 2, found: 1 })
    ));
    let twice = vec![seeds[0], seeds[1], seeds[0]];
    assert_eq!(
        engine.generate_bracket(&admin(), t.id, &twice).unwrap_err().kind(),
        ErrorKind::Validation
    );
    let unknown = vec![seeds[0], uuid::Uuid::new_v4()];
    assert_eq!(
        engine.generate_bracket(&admin(), t.id, &unknown).unwrap_err().kind(),
        ErrorKind::NotFound
    );

    engine.generate_bracket(&admin(), t.id, &seeds).unwrap();
    assert!(matches!(
        engine.generate_bracket(&admin(), t.id, &seeds),
        Err(EngineError::AlreadyStarted)
    ));
}

#[test]
fn group_format_is_seeded_from_its_groups() {
    let engine = Engine::default();
    let teams = register_teams(&engine, 4);
    let t = tournament(&engine, TournamentFormat::GroupThenPlayoff, 1, &["Dust2"]);
    let err = engine.generate_bracket(&admin(), t.id, &ids(&teams)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(matches!(
        engine.get_bracket(t.id),
        Err(EngineError::BracketNotFound(id)) if id == t.id
    ));
}

#[test]
fn large_field_uses_numbered_early_rounds() {
    let engine = Engine::default();
    let teams = register_teams(&engine, 20);
    let t = quick_tournament(&engine);
    let bracket = engine.generate_bracket(&admin(), t.id, &ids(&teams)).unwrap();
    assert_eq!(bracket.max_round, 5);
    let names: Vec<&str> = bracket.rounds.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["Round 1", "Round of 16", "Quarterfinal", "Semifinal", "Final"]
    );
    let walkovers = bracket.rounds[0].matches.iter().filter(|m| m.walkover).count();
    assert_eq!(walkovers, 12);
}

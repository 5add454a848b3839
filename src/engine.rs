//! Engine: owns all tournament state and runs every operation under the right lock.
//!
//! Each match sits behind its own mutex. Bracket propagation locks the destination match
//! only after the source match's guard is dropped, and always moves from round `r` to
//! `r + 1`, so no global lock is needed. Lock order where several are held at once:
//! `group_stages`, group locks, then `brackets`, then `matches`. `teams`, `tournaments`
//! and `ratings` are leaves.

use crate::audit::{ActionLog, ActionLogEntry};
use crate::config::EngineConfig;
use crate::logic::{ban_pick, bracket, group_stage, rating, scoring};
use crate::models::{
    Actor, BanPickOutcome, BanPickView, Bracket, BracketView, DraftAction, EngineError, Group,
    GroupMatchId, GroupStageView, GroupView, Match, MatchId, MatchStatus, NewTournament,
    RoundView, Side, Team, TeamId, TeamRating, Tournament, TournamentFormat, TournamentId,
    TournamentStatus,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard,
};

type MatchCell = Arc<Mutex<Match>>;

/// Group phase of one tournament. The layout is fixed; each group locks on its own.
#[derive(Debug)]
struct GroupStage {
    groups: Vec<Mutex<Group>>,
    /// Which group each match belongs to.
    index: HashMap<GroupMatchId, usize>,
    finalized: AtomicBool,
}

/// What `complete_match` did.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Completion {
    #[serde(rename = "match")]
    pub game: Match,
    /// False when the match had already been completed by an earlier call.
    pub newly_completed: bool,
    /// Match the winner now plays in, if this was not the final.
    pub advanced_to: Option<MatchId>,
    /// Set when this was the final.
    pub champion_id: Option<TeamId>,
}

#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    tournaments: RwLock<HashMap<TournamentId, Tournament>>,
    teams: RwLock<HashMap<TeamId, Team>>,
    matches: RwLock<HashMap<MatchId, MatchCell>>,
    brackets: RwLock<HashMap<TournamentId, Arc<Bracket>>>,
    group_stages: RwLock<HashMap<TournamentId, Arc<GroupStage>>>,
    ratings: RwLock<HashMap<TeamId, TeamRating>>,
    log: ActionLog,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn require_referee(actor: &Actor) -> Result<(), EngineError> {
    if actor.role.can_officiate() {
        Ok(())
    } else {
        Err(EngineError::NotReferee)
    }
}

fn require_admin(actor: &Actor) -> Result<(), EngineError> {
    if actor.role.can_administer() {
        Ok(())
    } else {
        Err(EngineError::NotAdmin)
    }
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        let log = ActionLog::new(config.action_log_capacity);
        Self {
            config,
            tournaments: RwLock::new(HashMap::new()),
            teams: RwLock::new(HashMap::new()),
            matches: RwLock::new(HashMap::new()),
            brackets: RwLock::new(HashMap::new()),
            group_stages: RwLock::new(HashMap::new()),
            ratings: RwLock::new(HashMap::new()),
            log,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ---- tournaments and teams ------------------------------------------------

    /// Create a tournament in Registration (organizer/admin).
    pub fn create_tournament(
        &self,
        actor: &Actor,
        settings: NewTournament,
    ) -> Result<Tournament, EngineError> {
        require_admin(actor)?;
        let tournament = Tournament::new(settings)?;
        write(&self.tournaments).insert(tournament.id, tournament.clone());
        self.log.record(
            actor,
            "create_tournament",
            "tournament",
            tournament.id,
            format!("{} ({:?}, bo{})", tournament.name, tournament.format, tournament.best_of),
        );
        Ok(tournament)
    }

    pub fn tournament(&self, id: TournamentId) -> Result<Tournament, EngineError> {
        read(&self.tournaments)
            .get(&id)
            .cloned()
            .ok_or(EngineError::TournamentNotFound(id))
    }

    /// Insert or replace a team as published by the roster service.
    pub fn upsert_team(&self, team: Team) {
        log::debug!("team {} ({}) captain {}", team.id, team.name, team.captain_id);
        write(&self.teams).insert(team.id, team);
    }

    pub fn team(&self, id: TeamId) -> Result<Team, EngineError> {
        read(&self.teams)
            .get(&id)
            .cloned()
            .ok_or(EngineError::TeamNotFound(id))
    }

    fn is_captain_of(&self, actor: &Actor, team_id: TeamId) -> bool {
        read(&self.teams)
            .get(&team_id)
            .is_some_and(|t| t.is_captain(actor.user_id))
    }

    fn require_known_teams(&self, ids: &[TeamId]) -> Result<(), EngineError> {
        let teams = read(&self.teams);
        match ids.iter().find(|id| !teams.contains_key(*id)) {
            Some(&missing) => Err(EngineError::TeamNotFound(missing)),
            None => Ok(()),
        }
    }

    fn set_tournament_status(&self, id: TournamentId, status: TournamentStatus) {
        if let Some(t) = write(&self.tournaments).get_mut(&id) {
            t.status = status;
        }
    }

    // ---- matches -------------------------------------------------------------

    fn match_cell(&self, id: MatchId) -> Result<MatchCell, EngineError> {
        read(&self.matches)
            .get(&id)
            .cloned()
            .ok_or(EngineError::MatchNotFound(id))
    }

    /// Current state of a match.
    pub fn get_match(&self, id: MatchId) -> Result<Match, EngineError> {
        let cell = self.match_cell(id)?;
        let m = lock(&cell).clone();
        Ok(m)
    }

    /// Run `f` on a match under its lock and return the resulting snapshot.
    fn mutate<F>(&self, id: MatchId, f: F) -> Result<Match, EngineError>
    where
        F: FnOnce(&mut Match) -> Result<(), EngineError>,
    {
        let cell = self.match_cell(id)?;
        let mut m = lock(&cell);
        f(&mut *m)?;
        Ok(m.clone())
    }

    /// Set or move the start time of a match (referee).
    pub fn schedule_match(
        &self,
        actor: &Actor,
        match_id: MatchId,
        at: DateTime<Utc>,
    ) -> Result<Match, EngineError> {
        require_referee(actor)?;
        let m = self.mutate(match_id, |m| {
            if !m.status.is_open() {
                return Err(EngineError::InvalidState { status: m.status });
            }
            m.scheduled_at = Some(at);
            m.touch();
            Ok(())
        })?;
        self.log
            .record(actor, "schedule_match", "match", match_id, format!("at {at}"));
        Ok(m)
    }

    /// Unfinished matches with both teams known, soonest first.
    pub fn active_matches(&self, limit: usize) -> Vec<Match> {
        let cells: Vec<MatchCell> = read(&self.matches).values().cloned().collect();
        let mut active: Vec<Match> = cells
            .iter()
            .map(|c| lock(c).clone())
            .filter(|m| m.status.is_open() && m.teams().is_some())
            .collect();
        active.sort_by(|a, b| {
            let when = |m: &Match| (m.scheduled_at.is_none(), m.scheduled_at);
            when(a)
                .cmp(&when(b))
                .then(a.round.cmp(&b.round))
                .then(a.match_number.cmp(&b.match_number))
        });
        active.truncate(limit);
        active
    }

    // ---- map draft -----------------------------------------------------------

    /// Open the ban/pick phase of a match with the tournament's pool (referee/system).
    pub fn start_ban_pick(&self, actor: &Actor, match_id: MatchId) -> Result<Match, EngineError> {
        require_referee(actor)?;
        let cell = self.match_cell(match_id)?;
        let mut m = lock(&cell);
        let tournament = self.tournament(m.tournament_id)?;
        ban_pick::start_draft(&mut m, &tournament.map_pool, tournament.best_of)?;
        let snapshot = m.clone();
        drop(m);
        self.log.record(
            actor,
            "start_ban_pick",
            "match",
            match_id,
            format!("pool of {}, bo{}", tournament.map_pool.len(), tournament.best_of),
        );
        Ok(snapshot)
    }

    pub fn get_ban_pick(&self, match_id: MatchId) -> Result<BanPickView, EngineError> {
        let cell = self.match_cell(match_id)?;
        let view = BanPickView::from_match(&lock(&cell));
        Ok(view)
    }

    /// Ban or pick a map for `team_id`.
    ///
    /// The team's captain acts for the team itself; a referee who is not that captain
    /// acts on behalf of whichever team is on turn.
    pub fn make_ban_pick(
        &self,
        actor: &Actor,
        match_id: MatchId,
        team_id: TeamId,
        map_name: &str,
        action: DraftAction,
    ) -> Result<BanPickOutcome, EngineError> {
        let by_referee = if self.is_captain_of(actor, team_id) {
            false
        } else if actor.role.can_officiate() {
            true
        } else {
            return Err(EngineError::NotCaptain);
        };

        let cell = self.match_cell(match_id)?;
        let outcome = {
            let mut m = lock(&cell);
            ban_pick::submit_action(&mut m, team_id, map_name.trim(), action, by_referee)?
        };

        if !outcome.duplicate {
            log::info!(
                "match {}: #{} {:?} {} by team {}{}",
                match_id,
                outcome.entry.pick_order,
                outcome.entry.action,
                outcome.entry.map_name,
                outcome.entry.acting_team_id,
                if by_referee { " (referee)" } else { "" }
            );
            if by_referee {
                self.log.record(
                    actor,
                    "make_ban_pick",
                    "match",
                    match_id,
                    format!(
                        "{:?} {} for team {}",
                        outcome.entry.action, outcome.entry.map_name, outcome.entry.acting_team_id
                    ),
                );
            }
            if outcome.draft_complete {
                log::info!("match {}: draft complete, awaiting scores", match_id);
            }
        }
        Ok(outcome)
    }

    // ---- scores ----------------------------------------------------------------

    /// A captain reports their team's score. The team is the one the actor captains.
    pub fn submit_match_score(
        &self,
        actor: &Actor,
        match_id: MatchId,
        team_score: u32,
        opponent_score: u32,
    ) -> Result<Match, EngineError> {
        let m = self.mutate(match_id, |m| {
            let side = [Side::One, Side::Two]
                .into_iter()
                .find(|&s| m.team(s).is_some_and(|t| self.is_captain_of(actor, t)))
                .ok_or(EngineError::NotCaptain)?;
            scoring::report_score(m, side, team_score, opponent_score, actor.user_id)
        })?;
        match m.status {
            MatchStatus::Confirmed => {
                log::info!("match {}: captains agree, confirmed", match_id)
            }
            MatchStatus::Disputed => log::warn!("match {}: score reports disagree", match_id),
            _ => log::info!("match {}: score reported", match_id),
        }
        Ok(m)
    }

    /// Clear both captain reports (referee).
    pub fn reset_match_score(&self, actor: &Actor, match_id: MatchId) -> Result<Match, EngineError> {
        require_referee(actor)?;
        let m = self.mutate(match_id, scoring::reset_score)?;
        self.log
            .record(actor, "reset_match_score", "match", match_id, "reports cleared");
        Ok(m)
    }

    /// Set the result directly, overriding captain reports (referee).
    pub fn confirm_match(
        &self,
        actor: &Actor,
        match_id: MatchId,
        team1_score: u32,
        team2_score: u32,
    ) -> Result<Match, EngineError> {
        require_referee(actor)?;
        let m = self.mutate(match_id, |m| {
            scoring::confirm_match(m, team1_score, team2_score)
        })?;
        self.log.record(
            actor,
            "confirm_match",
            "match",
            match_id,
            format!("{team1_score}:{team2_score}"),
        );
        Ok(m)
    }

    /// Complete a confirmed match and move its winner on (referee/system).
    ///
    /// Safe to repeat: on an already completed match it only re-applies propagation,
    /// which is itself a no-op when the winner is already in place.
    pub fn complete_match(&self, actor: &Actor, match_id: MatchId) -> Result<Completion, EngineError> {
        require_referee(actor)?;
        let (game, newly_completed) = {
            let cell = self.match_cell(match_id)?;
            let mut m = lock(&cell);
            let newly = scoring::complete_match(&mut m)?;
            (m.clone(), newly)
        };
        if newly_completed {
            self.rate(&game);
            self.log.record(
                actor,
                "complete_match",
                "match",
                match_id,
                format!("winner {}", game.winner_id.map_or_else(String::new, |w| w.to_string())),
            );
        }
        let (advanced_to, champion_id) = self.propagate(&game)?;
        Ok(Completion {
            game,
            newly_completed,
            advanced_to,
            champion_id,
        })
    }

    /// Update both teams' ratings from a match that was actually played.
    fn rate(&self, game: &Match) {
        if game.walkover {
            return;
        }
        let (Some((team1, team2)), Some(winner)) = (game.teams(), game.winner_id) else {
            return;
        };
        let loser = if winner == team1 { team2 } else { team1 };
        let initial = self.config.initial_rating;

        let mut ratings = write(&self.ratings);
        let mut w = ratings
            .remove(&winner)
            .unwrap_or_else(|| TeamRating::new(winner, initial));
        let mut l = ratings
            .remove(&loser)
            .unwrap_or_else(|| TeamRating::new(loser, initial));
        rating::record_result(&mut w, &mut l, self.config.rating_k);
        log::debug!(
            "match {}: rating {} -> {:.1}, {} -> {:.1}",
            game.id,
            winner,
            w.rating,
            loser,
            l.rating
        );
        ratings.insert(winner, w);
        ratings.insert(loser, l);
    }

    /// Rated teams, strongest first.
    pub fn team_ratings(&self) -> Vec<TeamRating> {
        let mut all: Vec<TeamRating> = read(&self.ratings).values().cloned().collect();
        all.sort_by(|a, b| {
            b.rating
                .total_cmp(&a.rating)
                .then(a.team_id.cmp(&b.team_id))
        });
        all
    }

    /// Push the winner of a completed match into the next round, or crown the champion.
    fn propagate(&self, source: &Match) -> Result<(Option<MatchId>, Option<TeamId>), EngineError> {
        let layout = read(&self.brackets)
            .get(&source.tournament_id)
            .cloned()
            .ok_or(EngineError::BracketNotFound(source.tournament_id))?;

        match bracket::destination(&layout, source) {
            Some((dest_id, side)) => {
                let cell = self.match_cell(dest_id)?;
                let mut dest = lock(&cell);
                match bracket::advance_winner(source, &mut dest) {
                    Ok(true) => log::info!(
                        "match {}: winner advances to round {} match {} ({:?})",
                        source.id,
                        dest.round,
                        dest.match_number,
                        side
                    ),
                    Ok(false) => log::debug!("match {}: winner already in place", source.id),
                    Err(e) => {
                        log::warn!("match {}: cannot advance winner: {}", source.id, e);
                        return Err(e);
                    }
                }
                Ok((Some(dest_id), None))
            }
            None => {
                let champion = source.winner_id;
                if let Some(t) = write(&self.tournaments).get_mut(&source.tournament_id) {
                    t.champion_id = champion;
                    t.status = TournamentStatus::Completed;
                }
                log::info!(
                    "tournament {}: final decided, champion {:?}",
                    source.tournament_id,
                    champion
                );
                Ok((None, champion))
            }
        }
    }

    /// Void a result and reopen reporting (referee). Already propagated winners stay put.
    pub fn nullify_match(&self, actor: &Actor, match_id: MatchId) -> Result<Match, EngineError> {
        require_referee(actor)?;
        let mut previous = None;
        let m = self.mutate(match_id, |m| {
            previous = Some(m.status);
            scoring::nullify_match(m)
        })?;
        if previous == Some(MatchStatus::Completed) {
            self.reopen_if_final(&m);
            log::warn!(
                "match {}: nullified after completion, next round slot is left as is",
                match_id
            );
        }
        self.log.record(
            actor,
            "nullify_match",
            "match",
            match_id,
            format!("was {}", previous.unwrap_or_default()),
        );
        Ok(m)
    }

    /// A voided final takes the champion with it; the tournament is back in its playoffs.
    fn reopen_if_final(&self, game: &Match) {
        let is_final = read(&self.brackets)
            .get(&game.tournament_id)
            .is_some_and(|b| b.final_match() == Some(game.id));
        if !is_final {
            return;
        }
        if let Some(t) = write(&self.tournaments).get_mut(&game.tournament_id) {
            t.champion_id = None;
            t.status = TournamentStatus::Playoffs;
        }
        log::warn!("tournament {}: final nullified, champion cleared", game.tournament_id);
    }

    /// Cancel a match for good (referee).
    pub fn cancel_match(&self, actor: &Actor, match_id: MatchId) -> Result<Match, EngineError> {
        require_referee(actor)?;
        let m = self.mutate(match_id, scoring::cancel_match)?;
        self.log
            .record(actor, "cancel_match", "match", match_id, "match cancelled");
        Ok(m)
    }

    /// Empty a team slot that was filled by propagation, to correct a bracket by hand (referee).
    pub fn clear_bracket_slot(
        &self,
        actor: &Actor,
        match_id: MatchId,
        side: Side,
    ) -> Result<Match, EngineError> {
        require_referee(actor)?;
        let mut removed = None;
        let m = self.mutate(match_id, |m| {
            removed = bracket::clear_slot(m, side)?;
            Ok(())
        })?;
        self.log.record(
            actor,
            "clear_bracket_slot",
            "match",
            match_id,
            format!(
                "{:?} slot emptied (was {})",
                side,
                removed.map_or_else(|| "empty".to_string(), |t| t.to_string())
            ),
        );
        Ok(m)
    }

    // ---- bracket ---------------------------------------------------------------

    /// Generate the single-elimination bracket from a seeding list (organizer/admin).
    ///
    /// Group-phase tournaments get their bracket from `finalize_group_stage` instead.
    pub fn generate_bracket(
        &self,
        actor: &Actor,
        tournament_id: TournamentId,
        seeded: &[TeamId],
    ) -> Result<BracketView, EngineError> {
        require_admin(actor)?;
        let tournament = self.tournament(tournament_id)?;
        if tournament.format == TournamentFormat::GroupThenPlayoff {
            return Err(EngineError::invalid(
                "this tournament is seeded from its group stage",
            ));
        }
        self.install_bracket(actor, tournament_id, seeded)?;
        self.get_bracket(tournament_id)
    }

    fn install_bracket(
        &self,
        actor: &Actor,
        tournament_id: TournamentId,
        seeded: &[TeamId],
    ) -> Result<(), EngineError> {
        self.require_known_teams(seeded)?;
        {
            let mut brackets = write(&self.brackets);
            if brackets.contains_key(&tournament_id) {
                return Err(EngineError::AlreadyStarted);
            }
            let (layout, matches) = bracket::generate(tournament_id, seeded)?;
            let mut store = write(&self.matches);
            for m in matches {
                store.insert(m.id, Arc::new(Mutex::new(m)));
            }
            brackets.insert(tournament_id, Arc::new(layout));
        }
        self.set_tournament_status(tournament_id, TournamentStatus::Playoffs);
        self.log.record(
            actor,
            "generate_bracket",
            "tournament",
            tournament_id,
            format!("{} teams seeded", seeded.len()),
        );
        Ok(())
    }

    /// Bracket with derived round names and the champion, if decided.
    pub fn get_bracket(&self, tournament_id: TournamentId) -> Result<BracketView, EngineError> {
        let layout = read(&self.brackets)
            .get(&tournament_id)
            .cloned()
            .ok_or(EngineError::BracketNotFound(tournament_id))?;

        let mut rounds = Vec::with_capacity(layout.rounds.len());
        for (idx, ids) in layout.rounds.iter().enumerate() {
            let round = idx as u32 + 1;
            let matches = ids
                .iter()
                .map(|&id| self.get_match(id))
                .collect::<Result<Vec<_>, _>>()?;
            rounds.push(RoundView {
                round,
                name: bracket::round_name(round, layout.max_round),
                matches,
            });
        }
        let champion_id = match layout.final_match() {
            Some(id) => {
                let last = self.get_match(id)?;
                (last.status == MatchStatus::Completed)
                    .then_some(last.winner_id)
                    .flatten()
            }
            None => None,
        };

        Ok(BracketView {
            tournament_id,
            max_round: layout.max_round,
            rounds,
            champion_id,
        })
    }

    // ---- group stage -----------------------------------------------------------

    /// Draw groups and create round-robin matches (organizer/admin).
    ///
    /// May be redone with a different draw until the first group result is played.
    pub fn create_group_stage(
        &self,
        actor: &Actor,
        tournament_id: TournamentId,
        teams: &[TeamId],
        group_count: Option<usize>,
    ) -> Result<GroupStageView, EngineError> {
        require_admin(actor)?;
        let tournament = self.tournament(tournament_id)?;
        if tournament.format != TournamentFormat::GroupThenPlayoff {
            return Err(EngineError::invalid(
                "this tournament has no group stage",
            ));
        }
        self.require_known_teams(teams)?;
        let group_count = group_count.unwrap_or(self.config.default_group_count);
        let groups = group_stage::draw_groups(teams, group_count, self.config.min_group_stage_teams)?;

        {
            let mut stages = write(&self.group_stages);
            if let Some(existing) = stages.get(&tournament_id) {
                if existing.finalized.load(Ordering::SeqCst) {
                    return Err(EngineError::GroupStageFinalized);
                }
                let started = existing
                    .groups
                    .iter()
                    .any(|g| lock(g).matches.iter().any(|m| m.played));
                if started {
                    return Err(EngineError::AlreadyStarted);
                }
            }
            let index = groups
                .iter()
                .enumerate()
                .flat_map(|(i, g)| g.matches.iter().map(move |m| (m.id, i)))
                .collect();
            stages.insert(
                tournament_id,
                Arc::new(GroupStage {
                    groups: groups.into_iter().map(Mutex::new).collect(),
                    index,
                    finalized: AtomicBool::new(false),
                }),
            );
        }
        self.set_tournament_status(tournament_id, TournamentStatus::GroupStage);
        self.log.record(
            actor,
            "create_group_stage",
            "tournament",
            tournament_id,
            format!("{} teams in {} groups", teams.len(), group_count),
        );
        self.get_group_stage(tournament_id)
    }

    fn group_stage(&self, tournament_id: TournamentId) -> Result<Arc<GroupStage>, EngineError> {
        read(&self.group_stages)
            .get(&tournament_id)
            .cloned()
            .ok_or(EngineError::GroupStageNotFound(tournament_id))
    }

    /// Groups with their matches and freshly computed standings.
    pub fn get_group_stage(&self, tournament_id: TournamentId) -> Result<GroupStageView, EngineError> {
        let stage = self.group_stage(tournament_id)?;
        let groups = stage
            .groups
            .iter()
            .map(|g| group_view(&lock(g)))
            .collect();
        Ok(GroupStageView {
            tournament_id,
            finalized: stage.finalized.load(Ordering::SeqCst),
            groups,
        })
    }

    /// Record (or correct) a group match result (referee). Returns the owning group.
    pub fn update_group_match(
        &self,
        actor: &Actor,
        match_id: GroupMatchId,
        team1_score: u32,
        team2_score: u32,
        played: bool,
    ) -> Result<GroupView, EngineError> {
        require_referee(actor)?;
        // Held until the result is in, so a redraw cannot swap the stage out underneath.
        let stages = read(&self.group_stages);
        let (tournament_id, stage, group_idx) = stages
            .iter()
            .find_map(|(tid, s)| s.index.get(&match_id).map(|&g| (*tid, s, g)))
            .ok_or(EngineError::GroupMatchNotFound(match_id))?;

        let view = {
            let mut group = lock(&stage.groups[group_idx]);
            if stage.finalized.load(Ordering::SeqCst) {
                return Err(EngineError::GroupStageFinalized);
            }
            group_stage::record_result(&mut group, match_id, team1_score, team2_score, played)?;
            group_view(&group)
        };
        drop(stages);
        self.log.record(
            actor,
            "update_group_match",
            "group_match",
            match_id,
            format!(
                "tournament {tournament_id} group {}: {team1_score}:{team2_score}{}",
                view.name,
                if played { "" } else { " (not played)" }
            ),
        );
        Ok(view)
    }

    /// Close the group phase and seed the playoff bracket from the standings (organizer/admin).
    pub fn finalize_group_stage(
        &self,
        actor: &Actor,
        tournament_id: TournamentId,
    ) -> Result<BracketView, EngineError> {
        require_admin(actor)?;
        let stage = self.group_stage(tournament_id)?;

        // Holding every group lock keeps results from changing under the seeding.
        let groups: Vec<MutexGuard<'_, Group>> = stage.groups.iter().map(|g| lock(g)).collect();
        if stage.finalized.load(Ordering::SeqCst) {
            return Err(EngineError::GroupStageFinalized);
        }
        let unplayed: usize = groups.iter().map(|g| g.unplayed()).sum();
        if unplayed > 0 {
            return Err(EngineError::IncompleteGroupStage { unplayed });
        }

        let per_group = self.config.qualifiers_per_group;
        let qualifiers: Vec<Vec<TeamId>> = groups
            .iter()
            .map(|g| {
                group_stage::compute_standings(g)
                    .into_iter()
                    .take(per_group)
                    .map(|s| s.team_id)
                    .collect()
            })
            .collect();
        let seeded = group_stage::playoff_seeding(&qualifiers);

        self.install_bracket(actor, tournament_id, &seeded)?;
        stage.finalized.store(true, Ordering::SeqCst);
        drop(groups);

        log::info!(
            "tournament {}: group stage finalized, {} teams to playoffs",
            tournament_id,
            seeded.len()
        );
        self.get_bracket(tournament_id)
    }

    // ---- action log ------------------------------------------------------------

    /// Most recent staff actions, newest first.
    pub fn action_log(&self, limit: usize) -> Vec<ActionLogEntry> {
        self.log.recent(limit)
    }
}

fn group_view(group: &Group) -> GroupView {
    GroupView {
        name: group.name.clone(),
        matches: group.matches.clone(),
        standings: group_stage::compute_standings(group),
    }
}

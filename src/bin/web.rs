//! Single binary web server for the match engine. All state is in memory.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default.
//! Override with env: HOST, PORT, SESSION_KEY (64+ bytes shared with the auth service),
//! ENGINE_CONFIG (path to a JSON engine config).
//!
//! Mutations go through `POST /api/actions` with an `action` field naming the operation,
//! the way the site's admin panel calls its backend. The acting user is read from the
//! signed session cookie written by the auth service, never from the request body.

use actix_session::{storage::CookieSessionStore, Session, SessionMiddleware};
use actix_web::{
    cookie::Key,
    get, post,
    http::StatusCode,
    web::{Data, Json, Path, Query},
    App, HttpResponse, HttpServer, Responder,
};
use chrono::{DateTime, Utc};
use match_engine::{
    Actor, DraftAction, Engine, EngineConfig, EngineError, ErrorKind, GroupMatchId, MatchId,
    NewTournament, Side, Team, TeamId, TournamentId,
};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

type AppState = Data<Engine>;

/// Session key under which the auth service stores the signed-in actor.
const SESSION_ACTOR: &str = "actor";

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

/// Every operation the engine exposes, tagged by its action name.
#[derive(Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum ActionRequest {
    CreateTournament {
        #[serde(flatten)]
        settings: NewTournament,
    },
    UpsertTeam {
        team: Team,
    },
    GenerateBracket {
        tournament_id: TournamentId,
        seeded_teams: Vec<TeamId>,
    },
    GetBracket {
        tournament_id: TournamentId,
    },
    GetMatch {
        match_id: MatchId,
    },
    GetActiveMatches {
        #[serde(default = "default_limit")]
        limit: usize,
    },
    ScheduleMatch {
        match_id: MatchId,
        scheduled_at: DateTime<Utc>,
    },
    StartBanPick {
        match_id: MatchId,
    },
    GetBanPick {
        match_id: MatchId,
    },
    MakeBanPick {
        match_id: MatchId,
        team_id: TeamId,
        map_name: String,
        #[serde(rename = "action_type")]
        draft_action: DraftAction,
    },
    SubmitMatchScore {
        match_id: MatchId,
        team_score: u32,
        opponent_score: u32,
    },
    ResetMatchScore {
        match_id: MatchId,
    },
    ConfirmMatch {
        match_id: MatchId,
        team1_score: u32,
        team2_score: u32,
    },
    CompleteMatch {
        match_id: MatchId,
    },
    NullifyMatch {
        match_id: MatchId,
    },
    CancelMatch {
        match_id: MatchId,
    },
    ClearBracketSlot {
        match_id: MatchId,
        side: Side,
    },
    CreateGroupStage {
        tournament_id: TournamentId,
        teams: Vec<TeamId>,
        group_count: Option<usize>,
        #[serde(default)]
        shuffle: bool,
    },
    GetGroupStage {
        tournament_id: TournamentId,
    },
    UpdateGroupMatch {
        match_id: GroupMatchId,
        team1_score: u32,
        team2_score: u32,
        #[serde(default)]
        played: bool,
    },
    FinalizeGroupStage {
        tournament_id: TournamentId,
    },
    GetAdminLogs {
        #[serde(default = "default_limit")]
        limit: usize,
    },
    GetTeamRatings,
}

impl ActionRequest {
    /// Reads are open to everyone; everything else needs a signed-in actor.
    fn is_read(&self) -> bool {
        matches!(
            self,
            ActionRequest::GetBracket { .. }
                | ActionRequest::GetMatch { .. }
                | ActionRequest::GetActiveMatches { .. }
                | ActionRequest::GetBanPick { .. }
                | ActionRequest::GetGroupStage { .. }
                | ActionRequest::GetTeamRatings
        )
    }

    /// Match the request is about, so a sequence error can echo its current state.
    fn target_match(&self) -> Option<MatchId> {
        use ActionRequest::*;
        match self {
            ScheduleMatch { match_id, .. }
            | StartBanPick { match_id }
            | MakeBanPick { match_id, .. }
            | SubmitMatchScore { match_id, .. }
            | ResetMatchScore { match_id }
            | ConfirmMatch { match_id, .. }
            | CompleteMatch { match_id }
            | NullifyMatch { match_id }
            | CancelMatch { match_id }
            | ClearBracketSlot { match_id, .. } => Some(*match_id),
            _ => None,
        }
    }
}

fn default_limit() -> usize {
    10
}

#[derive(Deserialize)]
struct LimitQuery {
    #[serde(default = "default_limit")]
    limit: usize,
}

/// Path segment: tournament id (e.g. /api/tournaments/{id})
#[derive(Deserialize)]
struct TournamentPath {
    id: TournamentId,
}

/// Path segment: match id (e.g. /api/matches/{id})
#[derive(Deserialize)]
struct MatchPath {
    id: MatchId,
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Permission => StatusCode::FORBIDDEN,
        ErrorKind::Sequence | ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::InvalidResult => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
    }
}

/// `{ "error": { "kind", "message", "current"? } }`
fn error_response(engine: &Engine, e: &EngineError, target: Option<MatchId>) -> HttpResponse {
    let kind = e.kind();
    let current = match kind {
        ErrorKind::Sequence | ErrorKind::Conflict => target.and_then(|id| engine.get_match(id).ok()),
        _ => None,
    };
    log::debug!("rejected ({:?}): {}", kind, e);
    HttpResponse::build(status_for(kind)).json(serde_json::json!({
        "error": { "kind": kind, "message": e.to_string(), "current": current }
    }))
}

fn respond<T: Serialize>(
    engine: &Engine,
    result: Result<T, EngineError>,
    target: Option<MatchId>,
) -> HttpResponse {
    match result {
        Ok(body) => HttpResponse::Ok().json(body),
        Err(e) => error_response(engine, &e, target),
    }
}

/// Actor stored in the signed session, if any.
fn session_actor(session: &Session) -> Option<Actor> {
    match session.get::<Actor>(SESSION_ACTOR) {
        Ok(actor) => actor,
        Err(e) => {
            log::warn!("unreadable session actor: {}", e);
            None
        }
    }
}

fn unauthorized() -> HttpResponse {
    HttpResponse::Unauthorized().json(serde_json::json!({
        "error": { "kind": "permission", "message": "Not signed in" }
    }))
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "match-engine",
    })
}

#[get("/api/tournaments/{id}")]
async fn api_get_tournament(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    respond(&state, state.tournament(path.id), None)
}

#[get("/api/tournaments/{id}/bracket")]
async fn api_get_bracket(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    respond(&state, state.get_bracket(path.id), None)
}

#[get("/api/tournaments/{id}/group-stage")]
async fn api_get_group_stage(state: AppState, path: Path<TournamentPath>) -> HttpResponse {
    respond(&state, state.get_group_stage(path.id), None)
}

#[get("/api/matches/active")]
async fn api_active_matches(state: AppState, query: Query<LimitQuery>) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "matches": state.active_matches(query.limit) }))
}

#[get("/api/ratings")]
async fn api_team_ratings(state: AppState) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "ratings": state.team_ratings() }))
}

#[get("/api/matches/{id}")]
async fn api_get_match(state: AppState, path: Path<MatchPath>) -> HttpResponse {
    respond(&state, state.get_match(path.id), None)
}

#[get("/api/matches/{id}/ban-pick")]
async fn api_get_ban_pick(state: AppState, path: Path<MatchPath>) -> HttpResponse {
    respond(&state, state.get_ban_pick(path.id), None)
}

/// Run one named operation on behalf of the session's actor.
#[post("/api/actions")]
async fn api_action(state: AppState, session: Session, body: Json<ActionRequest>) -> HttpResponse {
    let request = body.into_inner();
    let actor = session_actor(&session);
    let actor = match actor {
        Some(a) => a,
        None if request.is_read() => Actor::new(uuid::Uuid::nil(), Default::default()),
        None => return unauthorized(),
    };
    let target = request.target_match();
    let engine: &Engine = &state;

    use ActionRequest::*;
    let result: Result<serde_json::Value, EngineError> = match request {
        CreateTournament { settings } => engine.create_tournament(&actor, settings).map(to_json),
        UpsertTeam { team } => {
            if actor.role.can_administer() {
                engine.upsert_team(team.clone());
                Ok(to_json(team))
            } else {
                Err(EngineError::NotAdmin)
            }
        }
        GenerateBracket {
            tournament_id,
            seeded_teams,
        } => engine
            .generate_bracket(&actor, tournament_id, &seeded_teams)
            .map(to_json),
        GetBracket { tournament_id } => engine.get_bracket(tournament_id).map(to_json),
        GetMatch { match_id } => engine.get_match(match_id).map(to_json),
        GetActiveMatches { limit } => Ok(serde_json::json!({
            "matches": engine.active_matches(limit)
        })),
        ScheduleMatch {
            match_id,
            scheduled_at,
        } => engine
            .schedule_match(&actor, match_id, scheduled_at)
            .map(to_json),
        StartBanPick { match_id } => engine.start_ban_pick(&actor, match_id).map(to_json),
        GetBanPick { match_id } => engine.get_ban_pick(match_id).map(to_json),
        MakeBanPick {
            match_id,
            team_id,
            map_name,
            draft_action,
        } => engine
            .make_ban_pick(&actor, match_id, team_id, &map_name, draft_action)
            .map(to_json),
        SubmitMatchScore {
            match_id,
            team_score,
            opponent_score,
        } => engine
            .submit_match_score(&actor, match_id, team_score, opponent_score)
            .map(to_json),
        ResetMatchScore { match_id } => engine.reset_match_score(&actor, match_id).map(to_json),
        ConfirmMatch {
            match_id,
            team1_score,
            team2_score,
        } => engine
            .confirm_match(&actor, match_id, team1_score, team2_score)
            .map(to_json),
        CompleteMatch { match_id } => engine.complete_match(&actor, match_id).map(to_json),
        NullifyMatch { match_id } => engine.nullify_match(&actor, match_id).map(to_json),
        CancelMatch { match_id } => engine.cancel_match(&actor, match_id).map(to_json),
        ClearBracketSlot { match_id, side } => engine
            .clear_bracket_slot(&actor, match_id, side)
            .map(to_json),
        CreateGroupStage {
            tournament_id,
            mut teams,
            group_count,
            shuffle,
        } => {
            if shuffle {
                teams.shuffle(&mut rand::thread_rng());
            }
            engine
                .create_group_stage(&actor, tournament_id, &teams, group_count)
                .map(to_json)
        }
        GetGroupStage { tournament_id } => engine.get_group_stage(tournament_id).map(to_json),
        UpdateGroupMatch {
            match_id,
            team1_score,
            team2_score,
            played,
        } => engine
            .update_group_match(&actor, match_id, team1_score, team2_score, played)
            .map(to_json),
        FinalizeGroupStage { tournament_id } => engine
            .finalize_group_stage(&actor, tournament_id)
            .map(to_json),
        GetAdminLogs { limit } => {
            if actor.role.can_officiate() {
                Ok(serde_json::json!({ "logs": engine.action_log(limit) }))
            } else {
                Err(EngineError::NotReferee)
            }
        }
        GetTeamRatings => Ok(serde_json::json!({ "ratings": engine.team_ratings() })),
    };
    respond(engine, result, target)
}

fn to_json<T: Serialize>(value: T) -> serde_json::Value {
    serde_json::to_value(value).unwrap_or_else(|e| serde_json::json!({ "serialization_error": e.to_string() }))
}

/// Server settings from the environment.
struct ServerConfig {
    host: String,
    port: u16,
    session_key: Key,
    engine: EngineConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl ServerConfig {
    fn from_env() -> std::io::Result<Self> {
        let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or_else(default_port);

        let session_key = match std::env::var("SESSION_KEY") {
            Ok(raw) => Key::try_from(raw.as_bytes()).map_err(|e| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("SESSION_KEY must be at least 64 bytes: {e}"),
                )
            })?,
            Err(_) => {
                log::warn!("SESSION_KEY not set, using a random key; sessions from the auth service will not be accepted");
                Key::generate()
            }
        };

        let engine = match std::env::var("ENGINE_CONFIG") {
            Ok(path) => {
                let raw = std::fs::read_to_string(&path)?;
                serde_json::from_str(&raw).map_err(|e| {
                    std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        format!("{path}: {e}"),
                    )
                })?
            }
            Err(_) => EngineConfig::default(),
        };

        Ok(Self {
            host,
            port,
            session_key,
            engine,
        })
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ServerConfig::from_env()?;
    let bind = (config.host.clone(), config.port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);
    log::info!("Engine config: {:?}", config.engine);

    let state = Data::new(Engine::new(config.engine));
    let session_key = config.session_key;

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(SessionMiddleware::new(
                CookieSessionStore::default(),
                session_key.clone(),
            ))
            .service(api_health)
            .service(api_get_tournament)
            .service(api_get_bracket)
            .service(api_get_group_stage)
            .service(api_active_matches)
            .service(api_team_ratings)
            .service(api_get_match)
            .service(api_get_ban_pick)
            .service(api_action)
    })
    .bind(bind)?
    .run()
    .await
}

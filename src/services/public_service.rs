//! Read-only projections for viewers: live board, standings, scorers, history,
//! fixtures and rosters.

use indexmap::IndexMap;
use time::OffsetDateTime;

use crate::{
    dao::models::{
        HistoryMatchEntity, PlayerEntity, PlayerRef, ScheduledMatchEntity, StandingEntity,
        TournamentEntity,
    },
    dto::{
        common::{GoalView, MatchView, PlayerView, TeamView, full_name},
        format_timestamp,
        public::{
            FixtureView, FixturesQuery, HistoryMatchView, HistoryResponse, HistorySummary,
            LineupResponse, LiveMatchesResponse, PositionGroup, StandingView, TopScorerView,
            TournamentView,
        },
    },
    error::ServiceError,
    state::{SharedState, live_match::LiveMatch},
};

const DEFAULT_FIXTURE_LIMIT: u32 = 10;
const MAX_FIXTURE_LIMIT: u32 = 100;
/// Display order of roster positions; anything else is listed afterwards.
const POSITION_ORDER: [&str; 4] = ["Portero", "Defensor", "Mediocampista", "Delantero"];

/// Current board with clocks evaluated now.
pub async fn live_matches(state: &SharedState) -> LiveMatchesResponse {
    let now = OffsetDateTime::now_utc();
    let board = state.board().read().await;
    LiveMatchesResponse {
        refreshed_at: board.refreshed_at().map(format_timestamp),
        degraded: state.is_degraded(),
        matches: board.snapshot(now),
    }
}

/// A single live match.
pub async fn live_match(state: &SharedState, match_id: &str) -> Result<MatchView, ServiceError> {
    let now = OffsetDateTime::now_utc();
    let board = state.board().read().await;
    board
        .get(match_id)
        .map(|entry| MatchView::at(&entry.live_match, now))
        .ok_or_else(|| ServiceError::NotFound(format!("live match `{match_id}`")))
}

/// Standings of `tournament_id`, leader first.
pub async fn standings(
    state: &SharedState,
    tournament_id: String,
) -> Result<Vec<StandingView>, ServiceError> {
    let rows = state.backend().standings(tournament_id).await?;
    Ok(rank_standings(rows))
}

/// Goal leaders of a tournament, counted from the matches on the live board.
pub async fn top_scorers(state: &SharedState, tournament_id: &str) -> Vec<TopScorerView> {
    let board = state.board().read().await;
    aggregate_scorers(board.matches(), tournament_id)
}

/// Match history with aggregates.
pub async fn history(state: &SharedState) -> Result<HistoryResponse, ServiceError> {
    let matches = state.backend().list_history().await?;
    Ok(build_history(matches))
}

/// Upcoming fixtures honoring the query filters.
pub async fn fixtures(
    state: &SharedState,
    query: FixturesQuery,
) -> Result<Vec<FixtureView>, ServiceError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_FIXTURE_LIMIT)
        .clamp(1, MAX_FIXTURE_LIMIT);
    let tournament = query.tournament.filter(|id| !id.trim().is_empty());

    let fixtures = state.backend().upcoming_matches(tournament, limit).await?;
    Ok(fixtures.into_iter().map(fixture_view).collect())
}

/// Roster of `team_id` grouped by position.
pub async fn lineup(state: &SharedState, team_id: String) -> Result<LineupResponse, ServiceError> {
    let players = state.backend().team_lineup(team_id.clone()).await?;
    Ok(LineupResponse {
        team_id,
        groups: group_by_position(players),
    })
}

/// Every club.
pub async fn teams(state: &SharedState) -> Result<Vec<TeamView>, ServiceError> {
    let teams = state.backend().list_teams().await?;
    Ok(teams.iter().map(TeamView::from).collect())
}

/// Every tournament.
pub async fn tournaments(state: &SharedState) -> Result<Vec<TournamentView>, ServiceError> {
    let tournaments = state.backend().list_tournaments().await?;
    Ok(tournaments.into_iter().map(tournament_view).collect())
}

/// Sort by points then goal difference, both descending, and number the rows.
fn rank_standings(mut rows: Vec<StandingEntity>) -> Vec<StandingView> {
    rows.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then(b.goal_difference.cmp(&a.goal_difference))
    });

    rows.into_iter()
        .enumerate()
        .map(|(index, row)| StandingView {
            position: index + 1,
            team: (&row.team).into(),
            matches_played: row.matches_played,
            wins: row.wins,
            draws: row.draws,
            losses: row.losses,
            goals_for: row.goals_for,
            goals_against: row.goals_against,
            goal_difference: row.goal_difference,
            points: row.points,
        })
        .collect()
}

fn aggregate_scorers<'a>(
    matches: impl Iterator<Item = &'a LiveMatch>,
    tournament_id: &str,
) -> Vec<TopScorerView> {
    let mut tally: IndexMap<String, (TopScorerView, Option<&'a str>)> = IndexMap::new();

    for live in matches.filter(|m| m.tournament.as_ref().map(|t| t.id()) == Some(tournament_id)) {
        for goal in &live.goals {
            let player_id = goal.player.id().to_string();
            let name = match &goal.player {
                PlayerRef::Populated(player) => {
                    Some(full_name(&player.first_name, &player.last_name))
                }
                PlayerRef::Id(_) => None,
            };

            let (entry, last_match) = tally.entry(player_id.clone()).or_insert_with(|| {
                (
                    TopScorerView {
                        player_id,
                        name: None,
                        team_id: Some(goal.team.id().to_string()),
                        goals: 0,
                        matches: 0,
                    },
                    None,
                )
            });
            entry.goals += 1;
            if entry.name.is_none() {
                entry.name = name;
            }
            if *last_match != Some(live.id.as_str()) {
                entry.matches += 1;
                *last_match = Some(live.id.as_str());
            }
        }
    }

    let mut scorers: Vec<_> = tally.into_values().map(|(view, _)| view).collect();
    scorers.sort_by(|a, b| {
        b.goals.cmp(&a.goals).then_with(|| {
            let a_name = a.name.as_deref().unwrap_or(&a.player_id);
            let b_name = b.name.as_deref().unwrap_or(&b.player_id);
            a_name.cmp(b_name)
        })
    });
    scorers
}

fn build_history(matches: Vec<HistoryMatchEntity>) -> HistoryResponse {
    let total_matches = matches.len();
    let total_goals: u64 = matches
        .iter()
        .map(|m| u64::from(m.score_a) + u64::from(m.score_b))
        .sum();
    let average_goals = if total_matches == 0 {
        0.0
    } else {
        (total_goals as f64 / total_matches as f64 * 100.0).round() / 100.0
    };

    HistoryResponse {
        summary: HistorySummary {
            total_matches,
            total_goals,
            average_goals,
        },
        matches: matches
            .into_iter()
            .map(|m| HistoryMatchView {
                team_a: (&m.team_a).into(),
                team_b: (&m.team_b).into(),
                goals: m.goals.iter().map(GoalView::from).collect(),
                id: m.id,
                date: m.date,
                score_a: m.score_a,
                score_b: m.score_b,
            })
            .collect(),
    }
}

fn fixture_view(fixture: ScheduledMatchEntity) -> FixtureView {
    FixtureView {
        team_a: (&fixture.team_a).into(),
        team_b: (&fixture.team_b).into(),
        tournament_id: fixture.tournament.as_ref().map(|t| t.id().to_string()),
        id: fixture.id,
        date: fixture.date,
        time: fixture.time,
        stadium: fixture.stadium,
        referee: fixture.referee,
        matchday: fixture.matchday,
    }
}

fn tournament_view(tournament: TournamentEntity) -> TournamentView {
    TournamentView {
        id: tournament.id,
        name: tournament.name,
        kind: tournament.kind,
        season: tournament.season,
    }
}

/// Group a roster by position in field order, skipping empty positions.
fn group_by_position(players: Vec<PlayerEntity>) -> Vec<PositionGroup> {
    let mut groups: IndexMap<String, Vec<PlayerView>> = POSITION_ORDER
        .iter()
        .map(|position| (position.to_string(), Vec::new()))
        .collect();

    for player in players {
        let position = player
            .position
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or("Sin posición")
            .to_string();
        groups.entry(position).or_default().push(player.into());
    }

    groups
        .into_iter()
        .filter(|(_, players)| !players.is_empty())
        .map(|(position, mut players)| {
            players.sort_by_key(|p| p.number);
            PositionGroup { position, players }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::models::LiveMatchEntity;

    fn standing(team: &str, points: u32, goal_difference: i32) -> StandingEntity {
        serde_json::from_value(serde_json::json!({
            "team": {"_id": team, "name": team},
            "points": points,
            "goalDifference": goal_difference,
        }))
        .unwrap()
    }

    fn live_with_goals(id: &str, tournament: &str, scorers: &[(&str, Option<&str>)]) -> LiveMatch {
        let goals: Vec<_> = scorers
            .iter()
            .map(|(player, name)| match name {
                Some(name) => serde_json::json!({
                    "player": {"_id": player, "firstName": name, "lastName": "X"},
                    "minute": 10,
                    "team": "ta"
                }),
                None => serde_json::json!({"player": player, "minute": 10, "team": "ta"}),
            })
            .collect();
        serde_json::from_value::<LiveMatchEntity>(serde_json::json!({
            "_id": id,
            "teamA": "ta",
            "teamB": "tb",
            "status": "live",
            "tournament": {"_id": tournament, "name": tournament},
            "goals": goals,
        }))
        .unwrap()
        .into()
    }

    #[test]
    fn standings_sort_by_points_then_goal_difference() {
        let ranked = rank_standings(vec![
            standing("a", 10, 2),
            standing("b", 12, -1),
            standing("c", 10, 5),
        ]);
        let order: Vec<_> = ranked.iter().map(|r| r.team.id.as_str()).collect();
        assert_eq!(order, ["b", "c", "a"]);
        assert_eq!(ranked[2].position, 3);
    }

    #[test]
    fn scorers_are_counted_per_tournament() {
        let matches = vec![
            live_with_goals("m1", "t1", &[("p1", Some("Ana")), ("p2", None), ("p1", None)]),
            live_with_goals("m2", "t1", &[("p2", None), ("p2", None)]),
            live_with_goals("m3", "t2", &[("p1", Some("Ana"))]),
        ];

        let scorers = aggregate_scorers(matches.iter(), "t1");
        assert_eq!(scorers.len(), 2);
        assert_eq!(scorers[0].player_id, "p2");
        assert_eq!((scorers[0].goals, scorers[0].matches), (3, 2));
        assert_eq!(scorers[1].name.as_deref(), Some("Ana X"));
        assert_eq!((scorers[1].goals, scorers[1].matches), (2, 1));
    }

    #[test]
    fn scorer_ties_break_on_name() {
        let matches = vec![live_with_goals(
            "m1",
            "t1",
            &[("p9", Some("Zoe")), ("p1", Some("Bea"))],
        )];
        let scorers = aggregate_scorers(matches.iter(), "t1");
        assert_eq!(scorers[0].name.as_deref(), Some("Bea X"));
    }

    #[test]
    fn history_summary_averages_goals() {
        let matches: Vec<HistoryMatchEntity> = serde_json::from_value(serde_json::json!([
            {"_id": "h1", "teamA": "a", "teamB": "b", "scoreA": 2, "scoreB": 1},
            {"_id": "h2", "teamA": "a", "teamB": "c", "scoreA": 0, "scoreB": 0},
            {"_id": "h3", "teamA": "b", "teamB": "c", "scoreA": 1, "scoreB": 1}
        ]))
        .unwrap();

        let history = build_history(matches);
        assert_eq!(history.summary.total_matches, 3);
        assert_eq!(history.summary.total_goals, 5);
        assert_eq!(history.summary.average_goals, 1.67);
        assert_eq!(build_history(Vec::new()).summary.average_goals, 0.0);
    }

    #[test]
    fn lineup_groups_follow_field_order() {
        let players: Vec<PlayerEntity> = serde_json::from_value(serde_json::json!([
            {"_id": "1", "firstName": "A", "lastName": "A", "number": 9, "position": "Delantero"},
            {"_id": "2", "firstName": "B", "lastName": "B", "number": 1, "position": "Portero"},
            {"_id": "3", "firstName": "C", "lastName": "C", "number": 7, "position": "Delantero"},
            {"_id": "4", "firstName": "D", "lastName": "D", "number": 5}
        ]))
        .unwrap();

        let groups = group_by_position(players);
        let names: Vec<_> = groups.iter().map(|g| g.position.as_str()).collect();
        assert_eq!(
            names,
            ["Portero", "Delantero", "Sin posición"]
        );
        let forwards: Vec<_> = groups[1].players.iter().map(|p| p.number).collect();
        assert_eq!(forwards, [7, 9]);
    }
}

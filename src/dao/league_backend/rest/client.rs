use std::{sync::Arc, time::Duration};

use futures::future::BoxFuture;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{Serialize, de::DeserializeOwned};

use crate::dao::{
    backend::BackendResult,
    league_backend::{AccessToken, LeagueBackend},
    models::{
        ActionBody, HistoryMatchEntity, LiveMatchEntity, NewHistoryMatchDocument,
        NewLiveMatchDocument, NewPlayerDocument, NewTeamDocument, NewTournamentDocument,
        PlayerEntity, ScheduledMatchEntity, ScoreDocument, StandingEntity, TeamEntity,
        TournamentEntity, UserProfileEntity, UserSyncDocument,
    },
};

use super::error::{RestDaoError, RestResult};

const MAX_MESSAGE_LEN: usize = 200;

/// [`LeagueBackend`] implementation speaking HTTP+JSON to the league REST API.
#[derive(Clone)]
pub struct RestLeagueBackend {
    client: Client,
    base_url: Arc<str>,
}

impl RestLeagueBackend {
    /// Build a client for `base_url` whose requests give up after `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> RestResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| RestDaoError::ClientBuilder { source })?;

        Ok(Self {
            client,
            base_url: Arc::<str>::from(base_url.trim_end_matches('/')),
        })
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let builder = self.client.request(method, url);
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, path: &str, builder: RequestBuilder) -> RestResult<Response> {
        let response = builder
            .send()
            .await
            .map_err(|source| RestDaoError::RequestSend {
                path: path.to_string(),
                source,
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(RestDaoError::RequestStatus {
            path: path.to_string(),
            status,
            message: rejection_message(&body)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string()),
        })
    }

    async fn get_json<T>(&self, path: &str, token: Option<&str>) -> RestResult<T>
    where
        T: DeserializeOwned,
    {
        let builder = self.request(Method::GET, path, token);
        let response = self.send(path, builder).await?;
        response
            .json::<T>()
            .await
            .map_err(|source| RestDaoError::DecodeResponse {
                path: path.to_string(),
                source,
            })
    }

    async fn send_json<B>(
        &self,
        method: Method,
        path: &str,
        token: &str,
        body: Option<&B>,
    ) -> RestResult<Response>
    where
        B: ?Sized + Serialize,
    {
        let mut builder = self.request(method, path, Some(token));
        if let Some(body) = body {
            builder = builder.json(body);
        }
        self.send(path, builder).await
    }
}

/// Extract the human-readable part of an error body (`{message}` or `{error}`).
fn rejection_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        let field = ["message", "error"]
            .iter()
            .find_map(|key| value.get(*key).and_then(|v| v.as_str()));
        if let Some(message) = field {
            return Some(message.to_string());
        }
    }

    Some(trimmed.chars().take(MAX_MESSAGE_LEN).collect())
}

impl LeagueBackend for RestLeagueBackend {
    fn list_live_matches(&self) -> BoxFuture<'static, BackendResult<Vec<LiveMatchEntity>>> {
        let backend = self.clone();
        Box::pin(async move {
            backend
                .get_json::<Vec<LiveMatchEntity>>("/live-matches", None)
                .await
                .map_err(Into::into)
        })
    }

    fn create_live_match(
        &self,
        token: AccessToken,
        document: NewLiveMatchDocument,
    ) -> BoxFuture<'static, BackendResult<()>> {
        let backend = self.clone();
        Box::pin(async move {
            backend
                .send_json(Method::POST, "/live-matches", &token, Some(&document))
                .await?;
            Ok(())
        })
    }

    fn send_match_action(
        &self,
        token: AccessToken,
        match_id: String,
        action: &'static str,
        body: Option<ActionBody>,
    ) -> BoxFuture<'static, BackendResult<()>> {
        let backend = self.clone();
        Box::pin(async move {
            let path = format!("/live-matches/{match_id}/{action}");
            backend
                .send_json(Method::POST, &path, &token, body.as_ref())
                .await?;
            Ok(())
        })
    }

    fn register_goal(
        &self,
        token: AccessToken,
        match_id: String,
        document: ScoreDocument,
    ) -> BoxFuture<'static, BackendResult<()>> {
        let backend = self.clone();
        Box::pin(async move {
            let path = format!("/live-matches/{match_id}/score");
            backend
                .send_json(Method::PUT, &path, &token, Some(&document))
                .await?;
            Ok(())
        })
    }

    fn team_lineup(&self, team_id: String) -> BoxFuture<'static, BackendResult<Vec<PlayerEntity>>> {
        let backend = self.clone();
        Box::pin(async move {
            let path = format!("/players/lineup/{team_id}");
            backend.get_json::<Vec<PlayerEntity>>(&path, None).await.map_err(Into::into)
        })
    }

    fn list_teams(&self) -> BoxFuture<'static, BackendResult<Vec<TeamEntity>>> {
        let backend = self.clone();
        Box::pin(async move {
            backend
                .get_json::<Vec<TeamEntity>>("/team", None)
                .await
                .map_err(Into::into)
        })
    }

    fn create_team(
        &self,
        token: AccessToken,
        document: NewTeamDocument,
    ) -> BoxFuture<'static, BackendResult<()>> {
        let backend = self.clone();
        Box::pin(async move {
            backend
                .send_json(Method::POST, "/team", &token, Some(&document))
                .await?;
            Ok(())
        })
    }

    fn create_players(
        &self,
        token: AccessToken,
        documents: Vec<NewPlayerDocument>,
    ) -> BoxFuture<'static, BackendResult<()>> {
        let backend = self.clone();
        Box::pin(async move {
            backend
                .send_json(Method::POST, "/players/bulk", &token, Some(&documents))
                .await?;
            Ok(())
        })
    }

    fn list_tournaments(&self) -> BoxFuture<'static, BackendResult<Vec<TournamentEntity>>> {
        let backend = self.clone();
        Box::pin(async move {
            backend
                .get_json::<Vec<TournamentEntity>>("/tournaments", None)
                .await
                .map_err(Into::into)
        })
    }

    fn create_tournament(
        &self,
        token: AccessToken,
        document: NewTournamentDocument,
    ) -> BoxFuture<'static, BackendResult<()>> {
        let backend = self.clone();
        Box::pin(async move {
            backend
                .send_json(Method::POST, "/tournaments", &token, Some(&document))
                .await?;
            Ok(())
        })
    }

    fn list_history(&self) -> BoxFuture<'static, BackendResult<Vec<HistoryMatchEntity>>> {
        let backend = self.clone();
        Box::pin(async move {
            backend
                .get_json::<Vec<HistoryMatchEntity>>("/api/matches", None)
                .await
                .map_err(Into::into)
        })
    }

    fn create_history_match(
        &self,
        token: AccessToken,
        document: NewHistoryMatchDocument,
    ) -> BoxFuture<'static, BackendResult<()>> {
        let backend = self.clone();
        Box::pin(async move {
            backend
                .send_json(Method::POST, "/api/matches", &token, Some(&document))
                .await?;
            Ok(())
        })
    }

    fn standings(
        &self,
        tournament_id: String,
    ) -> BoxFuture<'static, BackendResult<Vec<StandingEntity>>> {
        let backend = self.clone();
        Box::pin(async move {
            let path = format!("/team-tournament-standings/{tournament_id}/standings");
            backend.get_json::<Vec<StandingEntity>>(&path, None).await.map_err(Into::into)
        })
    }

    fn upcoming_matches(
        &self,
        tournament_id: Option<String>,
        limit: u32,
    ) -> BoxFuture<'static, BackendResult<Vec<ScheduledMatchEntity>>> {
        let backend = self.clone();
        Box::pin(async move {
            const PATH: &str = "/scheduled-matches/upcoming";
            let mut query = vec![("limit", limit.to_string())];
            if let Some(tournament) = tournament_id {
                query.push(("tournament", tournament));
            }

            let builder = backend.request(Method::GET, PATH, None).query(&query);
            let response = backend.send(PATH, builder).await?;
            response
                .json::<Vec<ScheduledMatchEntity>>()
                .await
                .map_err(|source| {
                    RestDaoError::DecodeResponse {
                        path: PATH.to_string(),
                        source,
                    }
                    .into()
                })
        })
    }

    fn user_profile(
        &self,
        token: AccessToken,
    ) -> BoxFuture<'static, BackendResult<UserProfileEntity>> {
        let backend = self.clone();
        Box::pin(async move {
            backend
                .get_json::<UserProfileEntity>("/api/users/profile", Some(&token))
                .await
                .map_err(Into::into)
        })
    }

    fn current_user(
        &self,
        token: AccessToken,
    ) -> BoxFuture<'static, BackendResult<serde_json::Value>> {
        let backend = self.clone();
        Box::pin(async move {
            backend
                .get_json::<serde_json::Value>("/api/users", Some(&token))
                .await
                .map_err(Into::into)
        })
    }

    fn sync_user(
        &self,
        token: AccessToken,
        document: UserSyncDocument,
    ) -> BoxFuture<'static, BackendResult<serde_json::Value>> {
        const PATH: &str = "/api/users";
        let backend = self.clone();
        Box::pin(async move {
            let response = backend
                .send_json(Method::POST, PATH, &token, Some(&document))
                .await?;
            // Some deployments answer 201 with an empty body.
            let body = response
                .text()
                .await
                .map_err(|source| RestDaoError::DecodeResponse {
                    path: PATH.to_string(),
                    source,
                })?;
            Ok(serde_json::from_str(&body).unwrap_or(serde_json::Value::Null))
        })
    }

    fn health_check(&self) -> BoxFuture<'static, BackendResult<()>> {
        let backend = self.clone();
        Box::pin(async move {
            const PATH: &str = "/tournaments";
            let builder = backend.request(Method::HEAD, PATH, None);
            backend.send(PATH, builder).await?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_message_prefers_message_field() {
        assert_eq!(
            rejection_message(r#"{"message": "Partido no encontrado"}"#).as_deref(),
            Some("Partido no encontrado")
        );
        assert_eq!(
            rejection_message(r#"{"error": "invalid stage"}"#).as_deref(),
            Some("invalid stage")
        );
    }

    #[test]
    fn rejection_message_falls_back_to_raw_body() {
        assert_eq!(rejection_message("  ").as_deref(), None);
        assert_eq!(
            rejection_message("Bad Gateway").as_deref(),
            Some("Bad Gateway")
        );
        let long = "x".repeat(500);
        assert_eq!(rejection_message(&long).map(|m| m.len()), Some(MAX_MESSAGE_LEN));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let backend =
            RestLeagueBackend::new("http://league.local/", Duration::from_secs(1)).unwrap();
        assert_eq!(&*backend.base_url, "http://league.local");
    }
}

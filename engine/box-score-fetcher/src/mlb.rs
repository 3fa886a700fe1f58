//! MLB Stats API adapter

use async_trait::async_trait;
use chrono::NaiveDate;
use projection_model::{BoxScoreRecord, GameId, GameStatus, GameSummary, Metric, PlayerLine, Sport};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::adapter::{build_client, fetch_json, numeric_fields, ProviderAdapter};
use crate::config::FetcherConfig;
use crate::error::{FetchError, Result};

/// Team sides in the order players are reported
const TEAM_SIDES: [&str; 2] = ["away", "home"];

#[derive(Debug, Deserialize)]
struct ScheduleResponse {
    #[serde(default)]
    dates: Vec<ScheduleDate>,
}

#[derive(Debug, Deserialize)]
struct ScheduleDate {
    #[serde(default)]
    games: Vec<ScheduleGame>,
}

#[derive(Debug, Deserialize)]
struct ScheduleGame {
    #[serde(rename = "gamePk")]
    game_pk: u64,

    #[serde(default)]
    status: Option<ScheduleStatus>,
}

#[derive(Debug, Deserialize)]
struct ScheduleStatus {
    #[serde(rename = "abstractGameState")]
    abstract_game_state: Option<String>,
}

/// Adapter for statsapi.mlb.com
pub struct MlbStatsAdapter {
    client: Client,
    base_url: String,
}

impl MlbStatsAdapter {
    /// Create a new MLB adapter
    pub fn new(config: &FetcherConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config)?,
            base_url: config.mlb.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Parse a `/schedule` payload
    pub fn parse_schedule(body: Value) -> Result<Vec<GameSummary>> {
        let schedule: ScheduleResponse = serde_json::from_value(body)?;

        Ok(schedule
            .dates
            .into_iter()
            .flat_map(|date| date.games)
            .map(|game| GameSummary {
                id: GameId::new(game.game_pk.to_string()),
                status: game
                    .status
                    .and_then(|status| status.abstract_game_state)
                    .map(|state| Self::parse_status(&state))
                    .unwrap_or(GameStatus::Unknown),
            })
            .collect())
    }

    fn parse_status(state: &str) -> GameStatus {
        match state {
            "Final" => GameStatus::Final,
            "Live" => GameStatus::Live,
            "Preview" => GameStatus::Scheduled,
            _ => GameStatus::Unknown,
        }
    }

    /// Parse a `/game/{gamePk}/boxscore` payload into batting lines
    pub fn parse_boxscore(game_id: &GameId, body: &Value) -> Result<BoxScoreRecord> {
        let teams = body
            .get("teams")
            .and_then(Value::as_object)
            .ok_or_else(|| FetchError::malformed(format!("boxscore {game_id} has no teams")))?;

        let mut record = BoxScoreRecord::new(game_id.clone());
        for side in TEAM_SIDES {
            let Some(players) =
                teams.get(side).and_then(|team| team.get("players")).and_then(Value::as_object)
            else {
                continue;
            };

            // Map iterates in document order (serde_json `preserve_order`)
            for player in players.values() {
                let Some(name) = player.pointer("/person/fullName").and_then(Value::as_str) else {
                    continue;
                };

                let mut line = PlayerLine::new(name);
                if let Some(batting) = player.pointer("/stats/batting").and_then(Value::as_object) {
                    line.stats = numeric_fields(batting);
                }
                record.push(line);
            }
        }

        Ok(record)
    }
}

/// Raw batting keys for each MLB metric
pub fn mlb_stat_fields(metric: Metric) -> &'static [&'static str] {
    match metric {
        Metric::Hits => &["hits"],
        Metric::HomeRuns => &["homeRuns"],
        Metric::Rbi => &["rbi"],
        Metric::Runs => &["runs"],
        Metric::TotalBases => &["totalBases"],
        Metric::StolenBases => &["stolenBases"],
        _ => &[],
    }
}

#[async_trait]
impl ProviderAdapter for MlbStatsAdapter {
    fn sport(&self) -> Sport {
        Sport::Mlb
    }

    fn name(&self) -> &str {
        "mlb-statsapi"
    }

    async fn list_schedule(&self, date: NaiveDate) -> Result<Vec<GameSummary>> {
        let url = format!("{}/schedule?sportId=1&date={}", self.base_url, date.format("%Y-%m-%d"));
        let body = fetch_json(self.client.get(&url), &url).await?;

        let games = Self::parse_schedule(body)?;
        info!("Fetched {} MLB games for {}", games.len(), date);
        Ok(games)
    }

    async fn fetch_boxscore(&self, game_id: &GameId) -> Result<BoxScoreRecord> {
        let url = format!("{}/game/{}/boxscore", self.base_url, game_id);
        let body = fetch_json(self.client.get(&url), &url).await?;

        let record = Self::parse_boxscore(game_id, &body)?;
        debug!("Parsed {} MLB player lines for game {}", record.len(), game_id);
        Ok(record)
    }

    fn stat_fields(&self, metric: Metric) -> &'static [&'static str] {
        mlb_stat_fields(metric)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use projection_model::NameMatcher;
    use serde_json::json;

    #[test]
    fn test_parse_schedule() {
        let body = json!({
            "dates": [{
                "date": "2024-04-10",
                "games": [
                    { "gamePk": 745123, "status": { "abstractGameState": "Final", "detailedState": "Final" } },
                    { "gamePk": 745124, "status": { "abstractGameState": "Live", "detailedState": "In Progress" } },
                    { "gamePk": 745125, "status": { "abstractGameState": "Preview", "detailedState": "Scheduled" } },
                    { "gamePk": 745126 }
                ]
            }]
        });

        let games = MlbStatsAdapter::parse_schedule(body).unwrap();
        let statuses: Vec<(String, GameStatus)> =
            games.into_iter().map(|game| (game.id.0, game.status)).collect();

        assert_eq!(
            statuses,
            vec![
                ("745123".to_string(), GameStatus::Final),
                ("745124".to_string(), GameStatus::Live),
                ("745125".to_string(), GameStatus::Scheduled),
                ("745126".to_string(), GameStatus::Unknown),
            ]
        );
    }

    #[test]
    fn test_parse_empty_schedule() {
        assert!(MlbStatsAdapter::parse_schedule(json!({ "dates": [] })).unwrap().is_empty());
        assert!(MlbStatsAdapter::parse_schedule(json!({})).unwrap().is_empty());
    }

    #[test]
    fn test_parse_boxscore() {
        let body = json!({
            "teams": {
                "away": {
                    "players": {
                        "ID592450": {
                            "person": { "id": 592450, "fullName": "Aaron Judge" },
                            "stats": { "batting": { "hits": 1, "homeRuns": 1, "rbi": 2, "totalBases": 4 } }
                        }
                    }
                },
                "home": {
                    "players": {
                        "ID605141": {
                            "person": { "id": 605141, "fullName": "Mookie Betts" },
                            "stats": { "batting": { "hits": 2, "runs": 1, "stolenBases": 1, "summary": "2-4 | SB" } }
                        },
                        "ID477132": {
                            "person": { "id": 477132, "fullName": "Clayton Kershaw" },
                            "stats": { "batting": {}, "pitching": { "strikeOuts": 8 } }
                        }
                    }
                }
            }
        });

        let game_id = GameId::new("745123");
        let record = MlbStatsAdapter::parse_boxscore(&game_id, &body).unwrap();

        assert_eq!(record.game_id, game_id);
        let names: Vec<&str> = record.player_names().collect();
        assert_eq!(names, vec!["Aaron Judge", "Mookie Betts", "Clayton Kershaw"]);

        let betts = record.player("Mookie Betts").unwrap();
        assert_eq!(betts.stat("hits"), 2.0);
        assert_eq!(betts.stat("stolenBases"), 1.0);
        assert!(!betts.stats.contains_key("summary"));

        let kershaw = record.player("Clayton Kershaw").unwrap();
        assert_eq!(kershaw.stat("hits"), 0.0);
    }

    #[test]
    fn test_parse_boxscore_keeps_provider_order_for_substring_match() {
        let body = json!({
            "teams": {
                "home": {
                    "players": {
                        "ID669257": { "person": { "fullName": "Will Smith" }, "stats": { "batting": { "hits": 1 } } },
                        "ID642086": { "person": { "fullName": "Dominic Smith" }, "stats": { "batting": { "hits": 3 } } }
                    }
                }
            }
        });
        let record = MlbStatsAdapter::parse_boxscore(&GameId::new("745123"), &body).unwrap();

        let names: Vec<&str> = record.player_names().collect();
        assert_eq!(names, vec!["Will Smith", "Dominic Smith"]);
        assert_eq!(NameMatcher::new().find_match("Smith", record.player_names()), Some("Will Smith"));
    }

    #[test]
    fn test_parse_boxscore_without_teams_is_malformed() {
        let result = MlbStatsAdapter::parse_boxscore(&GameId::new("1"), &json!({ "copyright": "" }));
        assert!(matches!(result, Err(FetchError::Malformed(_))));
    }

    #[test]
    fn test_extract_from_parsed_boxscore() {
        let adapter = MlbStatsAdapter::new(&FetcherConfig::default()).unwrap();
        let body = json!({
            "teams": {
                "home": {
                    "players": {
                        "ID605141": {
                            "person": { "fullName": "Mookie Betts" },
                            "stats": { "batting": { "hits": 2, "totalBases": 3 } }
                        }
                    }
                }
            }
        });
        let record = MlbStatsAdapter::parse_boxscore(&GameId::new("745123"), &body).unwrap();

        assert_eq!(adapter.extract_stat(&record, "Mookie Betts", "hits"), Some(2.0));
        assert_eq!(adapter.extract_stat(&record, "Mookie Betts", "Total Bases"), Some(3.0));
        assert_eq!(adapter.extract_stat(&record, "Mookie Betts", "homeruns"), Some(0.0));
    }
}

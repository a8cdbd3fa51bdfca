use serde::{Deserialize, Serialize};

use super::error_codes;
use crate::achievements::AchievementCatalog;
use crate::constraint::Constraint;
use crate::context::LeagueContext;
use crate::eligibility::EligibilityIndex;
use crate::error::GridError;
use crate::generator::{GenerateOptions, GeneratorConfig, GridGenerator, Layout};
use crate::grid::{Grid, GRID_SIZE};
use crate::models::{LeagueDataset, PlayerId};

pub const SCHEMA_VERSION: u8 = 1;

fn err_code(code: &str, message: impl std::fmt::Display) -> String {
    format!("{code}: {message}")
}

fn grid_err(err: impl Into<GridError>) -> String {
    let err = err.into();
    err_code(err.code(), &err)
}

fn check_schema(version: u8) -> Result<(), String> {
    if version == SCHEMA_VERSION {
        Ok(())
    } else {
        Err(err_code(error_codes::UNSUPPORTED_SCHEMA, format!("expected {SCHEMA_VERSION}, got {version}")))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub schema_version: u8,
    #[serde(default)]
    pub seed: Option<String>,
    /// Generator preset; the environment-configured one when absent.
    #[serde(default)]
    pub profile: Option<String>,
    #[serde(default)]
    pub layout: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderView {
    /// Stable identity, e.g. `team:4` or `achievement:mvp`.
    pub key: String,
    pub label: String,
    /// `team`, `achievement` or `season`
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridResponse {
    pub schema_version: u8,
    pub seed: String,
    pub share_code: String,
    pub layout: String,
    pub dataset_version: String,
    pub rows: Vec<HeaderView>,
    pub cols: Vec<HeaderView>,
    pub candidate_counts: [[usize; GRID_SIZE]; GRID_SIZE],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuessRequest {
    pub schema_version: u8,
    pub share_code: String,
    pub row: usize,
    pub col: usize,
    pub player_id: PlayerId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuessResponse {
    pub schema_version: u8,
    pub row: usize,
    pub col: usize,
    pub player_id: PlayerId,
    pub correct: bool,
    pub player_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResponse {
    pub schema_version: u8,
    pub row: usize,
    pub col: usize,
    pub player_id: PlayerId,
    pub score: u8,
    pub pool_size: usize,
}

fn header_view(ctx: &LeagueContext<'_>, header: &Constraint) -> HeaderView {
    let kind = match header {
        Constraint::Team { .. } => "team",
        Constraint::Achievement { season_specific: true, .. } => "season",
        Constraint::Achievement { season_specific: false, .. } => "achievement",
    };
    HeaderView { key: header.to_string(), label: ctx.label(header), kind: kind.to_string() }
}

fn grid_response(ctx: &LeagueContext<'_>, grid: &Grid) -> GridResponse {
    GridResponse {
        schema_version: SCHEMA_VERSION,
        seed: grid.seed().to_string(),
        share_code: grid.share_code(),
        layout: grid.layout().name().to_string(),
        dataset_version: grid.version().to_string(),
        rows: grid.rows().iter().map(|h| header_view(ctx, h)).collect(),
        cols: grid.cols().iter().map(|h| header_view(ctx, h)).collect(),
        candidate_counts: grid.candidate_counts(),
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| err_code(error_codes::SERIALIZE, e))
}

/// Generates a grid from a JSON [`GenerateRequest`] and returns a [`GridResponse`].
pub fn generate_grid_json(
    dataset: &LeagueDataset,
    catalog: &dyn AchievementCatalog,
    index: &EligibilityIndex,
    request_json: &str,
) -> Result<String, String> {
    let request: GenerateRequest =
        serde_json::from_str(request_json).map_err(|e| err_code(error_codes::INVALID_REQUEST, e))?;
    check_schema(request.schema_version)?;

    let config = match request.profile.as_deref() {
        Some(profile) => GeneratorConfig::from_profile(profile)
            .ok_or_else(|| err_code(error_codes::UNKNOWN_PROFILE, format!("'{profile}'")))?,
        None => GeneratorConfig::from_env_or_default(),
    };
    let layout = match request.layout.as_deref() {
        Some(name) => {
            Some(Layout::from_str(name).ok_or_else(|| err_code(error_codes::UNKNOWN_LAYOUT, format!("'{name}'")))?)
        }
        None => None,
    };

    let ctx = LeagueContext::new(dataset, catalog);
    let options = GenerateOptions { seed: request.seed, layout, on_yield: None };
    let grid = GridGenerator::new(config).generate(&ctx, index, &options).map_err(grid_err)?;
    to_json(&grid_response(&ctx, &grid))
}

fn rebuild(
    dataset: &LeagueDataset,
    catalog: &dyn AchievementCatalog,
    index: &EligibilityIndex,
    request_json: &str,
) -> Result<(GuessRequest, Grid), String> {
    let request: GuessRequest =
        serde_json::from_str(request_json).map_err(|e| err_code(error_codes::INVALID_REQUEST, e))?;
    check_schema(request.schema_version)?;
    let ctx = LeagueContext::new(dataset, catalog);
    let grid = Grid::from_share_code(&ctx, index, &request.share_code).map_err(grid_err)?;
    Ok((request, grid))
}

/// Checks a guess against the grid encoded in the request's share code.
pub fn check_guess_json(
    dataset: &LeagueDataset,
    catalog: &dyn AchievementCatalog,
    index: &EligibilityIndex,
    request_json: &str,
) -> Result<String, String> {
    let (request, grid) = rebuild(dataset, catalog, index, request_json)?;
    to_json(&GuessResponse {
        schema_version: SCHEMA_VERSION,
        row: request.row,
        col: request.col,
        player_id: request.player_id,
        correct: grid.check_guess(request.row, request.col, request.player_id),
        player_name: dataset.player(request.player_id).map(|p| p.name.clone()),
    })
}

/// Rarity score for a correct guess. Incorrect guesses are errors.
pub fn score_guess_json(
    dataset: &LeagueDataset,
    catalog: &dyn AchievementCatalog,
    index: &EligibilityIndex,
    request_json: &str,
) -> Result<String, String> {
    let (request, grid) = rebuild(dataset, catalog, index, request_json)?;
    let score = grid.score_guess(dataset, request.row, request.col, request.player_id).map_err(grid_err)?;
    let pool_size = grid.cell(request.row, request.col).map_or(0, |cell| cell.len());
    to_json(&ScoreResponse {
        schema_version: SCHEMA_VERSION,
        row: request.row,
        col: request.col,
        player_id: request.player_id,
        score,
        pool_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::achievements::StandardCatalog;
    use crate::data::SyntheticLeague;

    fn prepared() -> (LeagueDataset, StandardCatalog) {
        let mut dataset = SyntheticLeague::new(31).build();
        let catalog = StandardCatalog::for_dataset(&dataset);
        dataset.prepare(&catalog);
        (dataset, catalog)
    }

    #[test]
    fn test_generate_then_score() {
        let (dataset, catalog) = prepared();
        let index = EligibilityIndex::new();

        let response = generate_grid_json(&dataset, &catalog, &index, r#"{"schema_version":1,"seed":"json-api","profile":"default"}"#)
            .unwrap();
        let grid: GridResponse = serde_json::from_str(&response).unwrap();
        assert_eq!(grid.seed, "json-api");
        assert_eq!(grid.rows.len(), 3);
        assert!(grid.candidate_counts.iter().flatten().all(|&n| n > 0));

        let ctx = LeagueContext::new(&dataset, &catalog);
        let rebuilt = Grid::from_share_code(&ctx, &index, &grid.share_code).unwrap();
        let answer = *rebuilt.cell(1, 1).unwrap().iter().min().unwrap();

        let guess = serde_json::json!({
            "schema_version": 1, "share_code": grid.share_code, "row": 1, "col": 1, "player_id": answer
        })
        .to_string();
        let checked: GuessResponse = serde_json::from_str(&check_guess_json(&dataset, &catalog, &index, &guess).unwrap()).unwrap();
        assert!(checked.correct);
        let scored: ScoreResponse = serde_json::from_str(&score_guess_json(&dataset, &catalog, &index, &guess).unwrap()).unwrap();
        assert!((10..=100).contains(&scored.score));
        assert_eq!(scored.pool_size, grid.candidate_counts[1][1]);
    }

    #[test]
    fn test_error_codes() {
        let (dataset, catalog) = prepared();
        let index = EligibilityIndex::new();

        let err = generate_grid_json(&dataset, &catalog, &index, r#"{"schema_version":2}"#).unwrap_err();
        assert!(err.starts_with("E_UNSUPPORTED_SCHEMA:"), "{err}");

        let err = generate_grid_json(&dataset, &catalog, &index, "not json").unwrap_err();
        assert!(err.starts_with("E_INVALID_REQUEST:"), "{err}");

        let err = generate_grid_json(&dataset, &catalog, &index, r#"{"schema_version":1,"profile":"turbo"}"#).unwrap_err();
        assert!(err.starts_with("E_UNKNOWN_PROFILE:"), "{err}");

        let err = generate_grid_json(&dataset, &catalog, &index, r#"{"schema_version":1,"seed":"bad seed"}"#).unwrap_err();
        assert!(err.starts_with("E_INVALID_SEED:"), "{err}");

        let guess = r#"{"schema_version":1,"share_code":"v1.x.t1~t2","row":0,"col":0,"player_id":1}"#;
        let err = check_guess_json(&dataset, &catalog, &index, guess).unwrap_err();
        assert!(err.starts_with("E_SHARE_CODE:"), "{err}");
    }
}

//! String-in/string-out entry points for hosts that speak JSON.

pub mod json_api;

pub use json_api::{
    check_guess_json, generate_grid_json, score_guess_json, GenerateRequest, GridResponse, GuessRequest,
    GuessResponse, HeaderView, ScoreResponse,
};

/// Error code prefixes used by the JSON API in `"<CODE>: <message>"` errors.
pub mod error_codes {
    pub const INVALID_REQUEST: &str = "E_INVALID_REQUEST";
    pub const UNSUPPORTED_SCHEMA: &str = "E_UNSUPPORTED_SCHEMA";
    pub const UNKNOWN_PROFILE: &str = "E_UNKNOWN_PROFILE";
    pub const UNKNOWN_LAYOUT: &str = "E_UNKNOWN_LAYOUT";
    pub const SERIALIZE: &str = "E_SERIALIZE";
}

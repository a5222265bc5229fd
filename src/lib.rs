// Scoring API - a JSON method endpoint with declarative request validation
//
// Requests arrive at `POST /method`, are validated field by field, authenticated
// by token and dispatched to `online_score` or `clients_interests`, whose results
// are cached in Redis or in process memory.

pub mod auth;
pub mod error;
pub mod handler;
pub mod requests;
pub mod scoring;
pub mod server;
pub mod settings;
pub mod store;

pub use error::{Result, ServerError};
pub use handler::{Method, MethodHandler, MethodResponse};
pub use requests::{
    ClientsInterestsRequest, Gender, InterestsArguments, MethodCall, MethodRequest,
    OnlineScoreRequest, ScoreArguments,
};
pub use server::{dispatch, serve};
pub use settings::Settings;
pub use store::open_store;

// Re-export the member crates
pub use scoring_cache;
pub use scoring_config;
pub use scoring_log;
pub use scoring_validation;

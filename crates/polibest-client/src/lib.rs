//! # polibest-client: Backend Client for PoliBest 911
//!
//! This crate connects the pure engine in `polibest-core` to the PoliBest
//! REST backend: typed endpoints, the signed-in session, configuration and
//! the workflows a manager runs from the `polibest` command line.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Client Architecture                                │
//! │                                                                         │
//! │  ┌─────────────┐    ┌─────────────────┐    ┌──────────────────────┐    │
//! │  │ClientConfig │───►│   ApiClient     │◄───│   SessionContext     │    │
//! │  │ TOML + env  │    │ reqwest, bearer │    │ token, user, state   │    │
//! │  └─────────────┘    └────────┬────────┘    └──────────────────────┘    │
//! │                              │                                          │
//! │         ┌──────────┬─────────┼──────────┬─────────────┬─────────┐      │
//! │         ▼          ▼         ▼          ▼             ▼         ▼      │
//! │      auth()    quotes() calculations() documents() instructions() catalog()
//! │                              │                                          │
//! │                   ┌──────────▼──────────┐                               │
//! │                   │      Workflow       │                               │
//! │                   │ engine + backend    │                               │
//! │                   │ price fallback      │                               │
//! │                   └─────────────────────┘                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`api`] - Resource handles over one HTTP client
//! - [`config`] - Client configuration (file + environment)
//! - [`error`] - Client error types
//! - [`session`] - Explicit session context with optional file persistence
//! - [`workflow`] - Quote and calculation workflows

pub mod api;
pub mod config;
pub mod error;
pub mod session;
pub mod workflow;

pub use api::{ApiClient, Download};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use session::{AuthState, Session, SessionContext, User};
pub use workflow::Workflow;

use tracing_subscriber::EnvFilter;

/// Initializes the tracing subscriber for logging.
///
/// ## Log Levels
/// - ERROR: Failed backend calls
/// - WARN: Fallbacks (default prices, ignored session file)
/// - INFO: Saved quotes, sign-in and sign-out
/// - DEBUG: Request status, config sources
///
/// Set `RUST_LOG` to override, e.g. `RUST_LOG=polibest_client=trace`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,polibest=debug,polibest_client=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

//! Strategy Launcher
//!
//! Configures and launches a sentiment-gated trading strategy. The operator
//! picks one of three order variants (bracket, limit, market), edits that
//! variant's parameters, and submits. Submission validates the parameters,
//! applies them on the strategy backend (`/update_params`) and only then
//! starts execution (`/start`).
//!
//! ```no_run
//! use strategy_launcher::{HttpStrategyClient, LaunchSession, OrderVariant};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = HttpStrategyClient::new("http://localhost:8000")?;
//!     let mut session = LaunchSession::new(client);
//!
//!     session.controller_mut().select_variant(OrderVariant::Limit);
//!     session.controller_mut().set_field("symbol", "AAPL")?;
//!     session.controller_mut().set_field("buyLimitMultiplier", "1.02")?;
//!
//!     let receipt = session.submit().await?;
//!     println!("Started: {}", receipt.start_response);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod fields;
pub mod pipeline;
pub mod schema;
pub mod session;
pub mod types;

pub use client::{ClientConfig, HttpStrategyClient, StrategyApi};
pub use config::LauncherConfig;
pub use controller::VariantController;
pub use error::{FieldError, LaunchError, LaunchResult, RemoteError, ValidationErrors};
pub use fields::{FieldValue, ParameterField, ParameterSet};
pub use pipeline::{FailureReason, LaunchReceipt, PipelineState, Stage, SubmissionPipeline};
pub use session::LaunchSession;
pub use types::*;

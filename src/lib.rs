//! FinMentor decision engine
//!
//! Turns a household's monthly figures into an ensemble persona, a health
//! score, a rule-based spender persona and a prioritized action plan.
//!
//! ```no_run
//! use finmentor_engine::{DecisionEngine, EngineConfig, RawFinancialInput};
//!
//! # fn main() -> finmentor_engine::Result<()> {
//! let config = EngineConfig::load(None)?;
//! let engine = DecisionEngine::from_config(&config)?;
//! let report = engine.evaluate(&RawFinancialInput::new(50000.0, 20000.0, 5000.0, 15000.0))?;
//! println!("{} ({})", report.ensemble.persona, report.health.score);
//! # Ok(())
//! # }
//! ```

pub mod artifacts;
pub mod batch;
pub mod classifier;
pub mod config;
pub mod engine;
pub mod error;
pub mod features;
pub mod logging;
pub mod types;
pub mod version;

pub use config::EngineConfig;
pub use engine::{DecisionEngine, DecisionReport};
pub use error::{Error, Result};
pub use types::{EnsemblePersona, FinancialProfile, RawFinancialInput, SpenderPersona};

//! Blueprint provider interface.
//!
//! The external planning service is reached through the
//! [`BlueprintProvider`] trait. The engine never retries provider errors;
//! they surface to the caller unchanged.
//!
//! ```text
//! PlanSynthesizer
//!     |
//!     |  generate(BlueprintRequest)
//!     v
//! &dyn BlueprintProvider ---> CommandProvider (stdin JSON -> stdout JSON)
//!     |
//!     v
//! BlueprintResponse { goals: [RawGoalBlueprint, ...] }
//! ```

pub mod command;
pub mod error;
pub mod trait_def;

pub use command::CommandProvider;
pub use error::ProviderError;
pub use trait_def::BlueprintProvider;

//! Deployment resolution engine and its supporting infrastructure.

pub mod cli_runner;
pub mod client;
pub mod correlate;
pub mod credentials;
pub mod doctor;
pub mod http;
pub mod identity;
pub mod logging;
pub mod models;
pub mod probe;
pub mod proxy_check;
pub mod routing;
pub mod sweep;
pub mod token;

pub use client::AiCoreClient;
pub use correlate::{MatchSet, NameMatcher, NamePredicate, classify, correlate};
pub use credentials::ServiceCredential;
pub use doctor::{CheckStatus, DiagnosticCheck, DoctorReport, SubaccountHealth};
pub use identity::{IdentitySource, ModelIdentity};
pub use models::{
    Configuration, Deployment, DeploymentDetails, DeploymentStatus, ModelMatch, RobotOutput,
    deployment_url,
};
pub use probe::{ProbeFailure, ProbeRequest, ProbeResult};
pub use routing::{ActionNeeded, FindSummary, RoutingSnippet, RoutingState, RoutingSuggestion};
pub use sweep::{ProbeReport, Session, SweepOptions, SweepReport};
pub use token::{AccessToken, acquire_token};

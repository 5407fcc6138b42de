//! Deprecator Core Library
//!
//! Provides the domain logic for deprecating published packages in favour of
//! renamed successors: discovering candidate repositories, generating
//! deprecation stubs and opening rename pull requests.

pub mod artifact;
pub mod config;
pub mod discovery;
pub mod error;
pub mod git;
pub mod github;
pub mod manifest;
pub mod module;
pub mod mutator;
pub mod orchestrator;
pub mod status;
pub mod template;

/// Re-exports of commonly used types
pub mod prelude {
    // Configuration
    pub use crate::config::{Config, DiscoveryConfig, EnvOverrides};

    // Input
    pub use crate::module::{ModuleDescriptor, NewModule};

    // Pipeline
    pub use crate::artifact::ArtifactBuilder;
    pub use crate::discovery::Discovery;
    pub use crate::mutator::{MutationOutcome, RepositoryMutator};
    pub use crate::orchestrator::BatchOrchestrator;
    pub use crate::status::{BatchReport, RunStatus};
    pub use crate::template::{Placeholder, TemplateSet};

    // Collaborators
    pub use crate::git::{GitCli, Vcs};
    pub use crate::github::{GitHubClient, HostingApi};
}

//! helmgen engine - render collaborators for `helm-generate`
//!
//! This crate provides:
//! - `HelmRenderer`: runs `helm template` out of process
//! - `LocalChartRenderer`: renders local chart directories with MiniJinja
//! - `ExecPostRenderer`: pipes rendered output through a post-render hook
//! - `KubectlDiscovery`: asks the current cluster for its version

pub mod chart;
pub mod discovery;
pub mod error;
pub mod filters;
pub mod helm;
pub mod local;
pub mod post_render;
mod process;

pub use chart::{ChartMetadata, LocalChart};
pub use discovery::{KubectlDiscovery, DEFAULT_KUBECTL_BINARY};
pub use error::{EngineError, Result};
pub use helm::{HelmRenderer, DEFAULT_HELM_BINARY};
pub use local::{LocalChartRenderer, LocalChartRendererBuilder};
pub use post_render::ExecPostRenderer;

//! Render collaborator interfaces
//!
//! The pipeline never evaluates templates or spawns processes itself; it
//! calls into these traits. `helmgen-engine` provides the real
//! implementations.

use crate::capabilities::Capabilities;
use crate::config::RenderRequest;
use crate::error::Result;
use crate::release::ReleaseInfo;
use crate::values::Values;

/// Renders a chart into raw multi-document YAML
pub trait ChartRenderer {
    fn render(
        &self,
        request: &RenderRequest,
        release: &ReleaseInfo,
        values: &Values,
        capabilities: &Capabilities,
    ) -> Result<String>;
}

/// Transforms rendered output through a post-render hook
pub trait PostRenderer {
    /// Run `hook` with `rendered` on its input and return what it produced
    fn post_process(&self, hook: &str, rendered: &str) -> Result<String>;
}

impl<T: ChartRenderer + ?Sized> ChartRenderer for &T {
    fn render(
        &self,
        request: &RenderRequest,
        release: &ReleaseInfo,
        values: &Values,
        capabilities: &Capabilities,
    ) -> Result<String> {
        (**self).render(request, release, values, capabilities)
    }
}

impl<T: ChartRenderer + ?Sized> ChartRenderer for Box<T> {
    fn render(
        &self,
        request: &RenderRequest,
        release: &ReleaseInfo,
        values: &Values,
        capabilities: &Capabilities,
    ) -> Result<String> {
        (**self).render(request, release, values, capabilities)
    }
}

impl<T: PostRenderer + ?Sized> PostRenderer for &T {
    fn post_process(&self, hook: &str, rendered: &str) -> Result<String> {
        (**self).post_process(hook, rendered)
    }
}

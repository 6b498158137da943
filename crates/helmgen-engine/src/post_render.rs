//! Post-render hooks run as external executables

use helmgen_core::{CoreError, PostRenderer};

use crate::process::run_with_input;

/// Pipes rendered output through the hook executable
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecPostRenderer;

impl PostRenderer for ExecPostRenderer {
    fn post_process(&self, hook: &str, rendered: &str) -> helmgen_core::Result<String> {
        tracing::debug!(hook, bytes = rendered.len(), "running post-render hook");

        run_with_input(hook, &[], rendered).map_err(|e| CoreError::PostRender {
            hook: hook.to_string(),
            message: e.to_string(),
        })
    }
}

//! Directory walker and manifest aggregator
//!
//! Walks a root path in lexical order and renders every directory holding a
//! values file. All batches land in one list, in visit order, which is then
//! deduplicated into the output stream. The first failing directory aborts
//! the whole run; there is no partial output.

use std::path::Path;
use walkdir::WalkDir;

use crate::capabilities::Capabilities;
use crate::config::{BaseConfig, OverrideDocument};
use crate::dedup::emit_stream;
use crate::error::{CoreError, Result};
use crate::manifest::{decode_manifests, Manifest};
use crate::namespace::namespaced_batch;
use crate::render::{ChartRenderer, PostRenderer};
use crate::values::Values;

/// Drives resolution and rendering across a directory tree
pub struct Aggregator<R, P> {
    config: BaseConfig,
    renderer: R,
    post_renderer: P,
    capabilities: Capabilities,
}

impl<R: ChartRenderer, P: PostRenderer> Aggregator<R, P> {
    pub fn new(config: BaseConfig, renderer: R, post_renderer: P) -> Self {
        Self {
            config,
            renderer,
            post_renderer,
            capabilities: Capabilities::default(),
        }
    }

    /// Set the capabilities passed to every render
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Render every values file under `root` and return all manifests in visit order
    pub fn collect(&self, root: &Path) -> Result<Vec<Manifest>> {
        if let Err(e) = std::fs::metadata(root) {
            return Err(if e.kind() == std::io::ErrorKind::NotFound {
                CoreError::RootNotFound {
                    path: root.to_path_buf(),
                }
            } else {
                CoreError::Io(e)
            });
        }

        let mut manifests = Vec::new();
        let mut directories = 0usize;

        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry?;
            if entry.file_type().is_dir()
                || entry.file_name() != self.config.values_filename.as_str()
            {
                continue;
            }

            let values_path = entry.path();
            let directory = values_path.parent().unwrap_or(root);
            tracing::debug!(directory = %directory.display(), "rendering directory");

            let batch = self
                .render_directory(directory, values_path)
                .map_err(|e| e.in_directory(directory))?;

            tracing::debug!(
                directory = %directory.display(),
                manifests = batch.len(),
                "rendered directory"
            );
            directories += 1;
            manifests.extend(batch);
        }

        tracing::info!(
            root = %root.display(),
            directories,
            manifests = manifests.len(),
            "aggregated manifests"
        );

        Ok(manifests)
    }

    /// Collect, deduplicate and serialize the manifests under `root`
    pub fn generate(&self, root: &Path) -> Result<String> {
        let manifests = self.collect(root)?;
        emit_stream(&manifests)
    }

    fn render_directory(&self, directory: &Path, values_path: &Path) -> Result<Vec<Manifest>> {
        let document = OverrideDocument::load(&directory.join(&self.config.override_filename))?;
        let request = self.config.resolve(document.as_ref())?;

        let mut values = Values::from_file(values_path)?;
        values.apply_assignments(&request.assignments);
        let release = values.release_info()?;

        let mut rendered = self
            .renderer
            .render(&request, &release, &values, &self.capabilities)?;

        if let Some(hook) = &request.post_render_binary {
            rendered = self.post_renderer.post_process(hook, &rendered)?;
        }

        let manifests = decode_manifests(&rendered)?;
        namespaced_batch(&release.namespace, manifests)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderRequest;
    use crate::error::ErrorKind;
    use crate::release::ReleaseInfo;
    use crate::values::KeyValueAssignments;
    use std::cell::RefCell;
    use std::fs;
    use tempfile::TempDir;

    /// Renders a Service and a shared ConfigMap named after the release
    #[derive(Default)]
    struct FakeRenderer {
        calls: RefCell<Vec<(RenderRequest, ReleaseInfo, Values)>>,
        fail_on: Option<String>,
    }

    impl ChartRenderer for FakeRenderer {
        fn render(
            &self,
            request: &RenderRequest,
            release: &ReleaseInfo,
            values: &Values,
            _capabilities: &Capabilities,
        ) -> Result<String> {
            self.calls
                .borrow_mut()
                .push((request.clone(), release.clone(), values.clone()));

            if self.fail_on.as_deref() == Some(release.name.as_str()) {
                return Err(CoreError::Render {
                    chart: request.chart.clone(),
                    message: "template evaluation failed".to_string(),
                });
            }

            Ok(format!(
                "---\nkind: Service\nmetadata:\n  name: {}\n---\nkind: ConfigMap\nmetadata:\n  name: shared\n",
                release.name
            ))
        }
    }

    #[derive(Default)]
    struct RecordingPostRenderer {
        hooks: RefCell<Vec<String>>,
    }

    impl PostRenderer for RecordingPostRenderer {
        fn post_process(&self, hook: &str, rendered: &str) -> Result<String> {
            self.hooks.borrow_mut().push(hook.to_string());
            Ok(rendered.replace("kind: ConfigMap", "kind: Secret"))
        }
    }

    fn base() -> BaseConfig {
        BaseConfig {
            chart: "tests/chart".to_string(),
            chart_version: "1.0.0".to_string(),
            ..BaseConfig::default()
        }
    }

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn tree(files: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (rel, content) in files {
            write(dir.path(), rel, content);
        }
        dir
    }

    fn kinds(manifests: &[Manifest]) -> Vec<String> {
        manifests
            .iter()
            .map(|m| m.kind().unwrap_or("<empty>").to_string())
            .collect()
    }

    #[test]
    fn test_nonexistent_root() {
        let dir = TempDir::new().unwrap();
        let aggregator = Aggregator::new(base(), FakeRenderer::default(), RecordingPostRenderer::default());

        let err = aggregator.collect(&dir.path().join("missing")).unwrap_err();

        assert!(matches!(err, CoreError::RootNotFound { .. }));
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_empty_root() {
        let dir = tree(&[("docs/README.md", "nothing to see")]);
        let renderer = FakeRenderer::default();
        let aggregator = Aggregator::new(base(), &renderer, RecordingPostRenderer::default());

        let out = aggregator.generate(dir.path()).unwrap();

        assert_eq!(out, "");
        assert!(renderer.calls.borrow().is_empty());
    }

    #[test]
    fn test_collects_in_lexical_order() {
        let dir = tree(&[
            ("b-app/values.yaml", "releaseName: b\nnamespace: team-b\n"),
            ("a-app/values.yaml", "releaseName: a\nnamespace: team-a\n"),
        ]);
        let renderer = FakeRenderer::default();
        let aggregator = Aggregator::new(base(), &renderer, RecordingPostRenderer::default());

        let manifests = aggregator.collect(dir.path()).unwrap();

        assert_eq!(
            kinds(&manifests),
            ["Namespace", "Service", "ConfigMap", "Namespace", "Service", "ConfigMap"]
        );
        assert_eq!(manifests[0].get("metadata").unwrap()["name"], "team-a");
        assert_eq!(manifests[1].get("metadata").unwrap()["namespace"], "team-a");
        assert_eq!(manifests[3].get("metadata").unwrap()["name"], "team-b");

        let releases: Vec<_> = renderer
            .calls
            .borrow()
            .iter()
            .map(|(_, release, _)| release.name.clone())
            .collect();
        assert_eq!(releases, ["a", "b"]);
    }

    #[test]
    fn test_duplicates_across_directories_emitted_once() {
        let dir = tree(&[
            ("one/values.yaml", "releaseName: web\nnamespace: shared\n"),
            ("two/values.yaml", "releaseName: web\nnamespace: shared\n"),
            ("three/values.yaml", "releaseName: api\nnamespace: shared\n"),
        ]);
        let aggregator = Aggregator::new(base(), FakeRenderer::default(), RecordingPostRenderer::default());

        let manifests = aggregator.collect(dir.path()).unwrap();
        assert_eq!(manifests.len(), 9);

        let unique = crate::dedup::dedup(manifests);
        // visit order is one, three, two; two repeats one entirely
        assert_eq!(kinds(&unique), ["Namespace", "Service", "ConfigMap", "Service"]);
        assert_eq!(unique[1].get("metadata").unwrap()["name"], "web");
        assert_eq!(unique[3].get("metadata").unwrap()["name"], "api");
    }

    #[test]
    fn test_override_document_applies_to_its_directory_only() {
        let dir = tree(&[
            ("a/.helm.yaml", "chart: other/chart\n"),
            ("a/values.yaml", "releaseName: a\nnamespace: ns\n"),
            ("b/values.yaml", "releaseName: b\nnamespace: ns\n"),
        ]);
        let renderer = FakeRenderer::default();
        let aggregator = Aggregator::new(base(), &renderer, RecordingPostRenderer::default());

        aggregator.collect(dir.path()).unwrap();

        let calls = renderer.calls.borrow();
        assert_eq!(calls[0].0.chart, "other/chart");
        assert_eq!(calls[0].0.chart_version, "1.0.0");
        assert_eq!(calls[1].0.chart, "tests/chart");
    }

    #[test]
    fn test_cli_assignments_override_values_file() {
        let dir = tree(&[("app/values.yaml", "releaseName: foo\nnamespace: ns\nreplicas: 2\n")]);
        let config = BaseConfig {
            assignments: KeyValueAssignments::parse(&["releaseName=bar"]).unwrap(),
            ..base()
        };
        let renderer = FakeRenderer::default();
        let aggregator = Aggregator::new(config, &renderer, RecordingPostRenderer::default());

        aggregator.collect(dir.path()).unwrap();

        let calls = renderer.calls.borrow();
        assert_eq!(calls[0].1.name, "bar");
        assert_eq!(calls[0].2.get("releaseName").unwrap(), "bar");
        assert_eq!(calls[0].2.get("replicas").unwrap(), 2);
    }

    #[test]
    fn test_custom_values_filename() {
        let dir = tree(&[
            ("app/values.yaml", "releaseName: ignored\nnamespace: ns\n"),
            ("app/helm-values.yaml", "releaseName: picked\nnamespace: ns\n"),
        ]);
        let config = BaseConfig {
            values_filename: "helm-values.yaml".to_string(),
            ..base()
        };
        let renderer = FakeRenderer::default();
        let aggregator = Aggregator::new(config, &renderer, RecordingPostRenderer::default());

        aggregator.collect(dir.path()).unwrap();

        let calls = renderer.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1.name, "picked");
    }

    #[test]
    fn test_missing_release_keys_abort_run() {
        let dir = tree(&[
            ("a/values.yaml", "releaseName: a\nnamespace: ns\n"),
            ("b/values.yaml", "replicas: 1\n"),
            ("c/values.yaml", "releaseName: c\nnamespace: ns\n"),
        ]);
        let renderer = FakeRenderer::default();
        let aggregator = Aggregator::new(base(), &renderer, RecordingPostRenderer::default());

        let err = aggregator.generate(dir.path()).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("releaseName"));
        // c is never visited
        assert_eq!(renderer.calls.borrow().len(), 1);
    }

    #[test]
    fn test_render_failure_aborts_run() {
        let dir = tree(&[
            ("a/values.yaml", "releaseName: a\nnamespace: ns\n"),
            ("b/values.yaml", "releaseName: b\nnamespace: ns\n"),
        ]);
        let renderer = FakeRenderer {
            fail_on: Some("a".to_string()),
            ..FakeRenderer::default()
        };
        let aggregator = Aggregator::new(base(), &renderer, RecordingPostRenderer::default());

        let err = aggregator.generate(dir.path()).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Render);
        match err {
            CoreError::Directory { path, .. } => assert!(path.ends_with("a")),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(renderer.calls.borrow().len(), 1);
    }

    #[test]
    fn test_missing_chart_configuration() {
        let dir = tree(&[("app/values.yaml", "releaseName: a\nnamespace: ns\n")]);
        let aggregator = Aggregator::new(
            BaseConfig::default(),
            FakeRenderer::default(),
            RecordingPostRenderer::default(),
        );

        let err = aggregator.collect(dir.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_post_render_hook_from_override() {
        let dir = tree(&[
            ("a/.helm.yaml", "postRenderBinary: ./hooks/secretize\n"),
            ("a/values.yaml", "releaseName: a\nnamespace: ns\n"),
            ("b/values.yaml", "releaseName: b\nnamespace: ns\n"),
        ]);
        let post = RecordingPostRenderer::default();
        let aggregator = Aggregator::new(base(), FakeRenderer::default(), &post);

        let manifests = aggregator.collect(dir.path()).unwrap();

        assert_eq!(*post.hooks.borrow(), ["./hooks/secretize"]);
        assert_eq!(
            kinds(&manifests),
            ["Namespace", "Service", "Secret", "Namespace", "Service", "ConfigMap"]
        );
    }

    #[test]
    fn test_malformed_render_output() {
        struct Broken;
        impl ChartRenderer for Broken {
            fn render(
                &self,
                _: &RenderRequest,
                _: &ReleaseInfo,
                _: &Values,
                _: &Capabilities,
            ) -> Result<String> {
                Ok("kind: Service\nspec: {}\n".to_string())
            }
        }

        let dir = tree(&[("app/values.yaml", "releaseName: a\nnamespace: ns\n")]);
        let aggregator = Aggregator::new(base(), Broken, RecordingPostRenderer::default());

        let err = aggregator.generate(dir.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Structural);
    }

    #[test]
    fn test_directory_named_like_values_file_is_skipped() {
        let dir = tree(&[("values.yaml/nested.txt", "not a values file")]);
        let aggregator = Aggregator::new(base(), FakeRenderer::default(), RecordingPostRenderer::default());

        assert!(aggregator.collect(dir.path()).unwrap().is_empty());
    }
}

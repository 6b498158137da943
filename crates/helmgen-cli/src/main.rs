//! helm-generate - render a tree of helm values files into one manifest stream

use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod error;
mod exit_codes;
mod generate;

use error::CliError;
use generate::{EngineKind, GenerateOptions};
use helmgen_core::config::{DEFAULT_OVERRIDE_FILENAME, DEFAULT_VALUES_FILENAME};
use helmgen_engine::{DEFAULT_HELM_BINARY, DEFAULT_KUBECTL_BINARY};

#[derive(Parser)]
#[command(name = "helm-generate")]
#[command(version)]
#[command(
    about = "Render every values file under a directory tree into one deduplicated manifest stream",
    long_about = None
)]
struct Cli {
    /// Root of the tree to walk
    #[arg(default_value = ".")]
    root: PathBuf,

    /// Chart used by directories that do not name one
    #[arg(long, env = "HELM_DEFAULT_CHART", default_value = "")]
    default_chart: String,

    /// Chart version used by directories that do not name one
    #[arg(long, env = "HELM_DEFAULT_CHART_VERSION", default_value = "")]
    default_chart_version: String,

    /// Per-directory override file name
    #[arg(long = "helm-yaml", default_value = DEFAULT_OVERRIDE_FILENAME)]
    helm_yaml: String,

    /// Values file name that marks a directory for rendering
    #[arg(short = 'f', long = "values-yaml", default_value = DEFAULT_VALUES_FILENAME)]
    values_yaml: String,

    /// Executable that post-processes each directory's rendered output
    #[arg(short = 'p', long)]
    post_render_binary: Option<String>,

    /// Set values on the command line (key=value), applied to every directory
    #[arg(long = "set")]
    set: Vec<String>,

    /// Chart renderer
    #[arg(long, value_enum, env = "HELM_GENERATE_ENGINE", default_value = "helm")]
    engine: EngineKind,

    /// Helm executable used by the helm engine
    #[arg(long, env = "HELM_BIN", default_value = DEFAULT_HELM_BINARY)]
    helm_binary: String,

    /// kubectl executable used to detect the cluster version when KUBE_VERSION is unset
    #[arg(long, env = "KUBECTL_BIN", default_value = DEFAULT_KUBECTL_BINARY)]
    kubectl_binary: String,

    /// Enable debug output
    #[arg(long)]
    debug: bool,
}

impl Cli {
    fn into_options(self) -> GenerateOptions {
        GenerateOptions {
            root: self.root,
            default_chart: self.default_chart,
            default_chart_version: self.default_chart_version,
            override_filename: self.helm_yaml,
            values_filename: self.values_yaml,
            post_render_binary: self.post_render_binary,
            set: self.set,
            engine: self.engine,
            helm_binary: self.helm_binary,
            kubectl_binary: self.kubectl_binary,
        }
    }
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    let stream = generate::run(&cli.into_options())?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(stream.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

fn main() {
    miette::set_panic_hook();

    let cli = Cli::parse();
    init_tracing(cli.debug);

    if let Err(err) = run(cli) {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

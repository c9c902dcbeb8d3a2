mod report;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use classclash_common::{ensure_config, load_config, AppConfig};
use classclash_core::{ClasspathRoot, ClasspathScanner, CollisionAnalyzer, ContentComparator, ScanMode, WarBundle};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Exit code for collisions that block merging
const EXIT_COLLISIONS: u8 = 2;

#[derive(Parser)]
#[command(name = "classclash")]
#[command(author = "classclash Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Detects class collisions between Java web application bundles", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two WAR files or exploded WAR directories
    Wars {
        /// Left bundle (.war file or directory)
        left: PathBuf,

        /// Right bundle (.war file or directory)
        right: PathBuf,

        /// Fail on identical libraries and identical classes too
        #[arg(short = 'W', long)]
        warnings_as_errors: bool,

        /// Overlap ratio above which a library pair is the same artifact
        #[arg(short, long)]
        threshold: Option<f64>,

        /// Read buffer size in bytes for content comparison
        #[arg(short, long)]
        buffer_size: Option<usize>,

        /// Output results as JSON
        #[arg(long)]
        json: bool,

        /// Disable ANSI colors in output
        #[arg(long)]
        no_color: bool,
    },
    /// Check classpath roots for classes that would collide when merged
    Classpath {
        /// Classpath root directories (at least two)
        #[arg(required = true)]
        roots: Vec<PathBuf>,

        /// Reference names matching the roots, in order
        #[arg(short = 'r', long = "ref")]
        refs: Vec<String>,

        /// Also check every regular file (reported as warnings)
        #[arg(short, long)]
        files: bool,

        /// Root directory for the file check; defaults to the classpath roots
        #[arg(long = "file-root")]
        file_roots: Vec<PathBuf>,

        /// Reference names matching the file roots, in order
        #[arg(long = "file-ref")]
        file_refs: Vec<String>,
    },
    /// Write the default configuration file if missing and print its path
    Config {
        /// Use the config file next to the executable
        #[arg(long)]
        portable: bool,
    },
}

fn main() -> ExitCode {
    // Initialize tracing to stderr (so JSON output can go cleanly to stdout)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Wars {
            left,
            right,
            warnings_as_errors,
            threshold,
            buffer_size,
            json,
            no_color,
        } => run_wars(WarsArgs {
            left,
            right,
            warnings_as_errors,
            threshold,
            buffer_size,
            json,
            no_color,
        })
        .context("Bundle comparison failed"),
        Commands::Classpath {
            roots,
            refs,
            files,
            file_roots,
            file_refs,
        } => run_classpath(ClasspathArgs {
            roots,
            refs,
            files,
            file_roots,
            file_refs,
        })
        .context("Classpath check failed"),
        Commands::Config { portable } => run_config(portable).context("Config setup failed"),
    };

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(EXIT_COLLISIONS),
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

struct WarsArgs {
    left: PathBuf,
    right: PathBuf,
    warnings_as_errors: bool,
    threshold: Option<f64>,
    buffer_size: Option<usize>,
    json: bool,
    no_color: bool,
}

/// Command-line flags win over the config file
fn apply_overrides(config: &mut AppConfig, args: &WarsArgs) -> anyhow::Result<()> {
    if args.warnings_as_errors {
        config.warnings_as_errors = true;
    }
    if let Some(threshold) = args.threshold {
        config.same_artifact_threshold = threshold;
    }
    if let Some(buffer_size) = args.buffer_size {
        config.buffer_size = buffer_size;
    }
    config.validate()?;
    Ok(())
}

/// Returns whether the bundles can be merged under the configured policy
fn run_wars(args: WarsArgs) -> anyhow::Result<bool> {
    let loaded = load_config(false)?;
    let mut config = loaded.config;
    if loaded.exists {
        info!("Using config {}", loaded.path.display());
    }
    apply_overrides(&mut config, &args)?;

    info!("Comparing:");
    info!("  Left:  {}", args.left.display());
    info!("  Right: {}", args.right.display());

    let left = WarBundle::open(&args.left)
        .with_context(|| format!("Failed to open {}", args.left.display()))?;
    let right = WarBundle::open(&args.right)
        .with_context(|| format!("Failed to open {}", args.right.display()))?;

    let analyzer = CollisionAnalyzer::new(ContentComparator::new(config.buffer_size))
        .with_parallel_detection(config.parallel_detection);
    let result = analyzer.analyze(&left, &right)?;

    let passed = !result.has_blocking_collisions()
        && !(config.warnings_as_errors && result.has_warnings());

    let left_name = args.left.display().to_string();
    let right_name = args.right.display().to_string();

    if args.json {
        let report = report::build_json_report(
            &left_name,
            &right_name,
            &result,
            config.same_artifact_threshold,
            passed,
        );
        let output = serde_json::to_string_pretty(&report)?;
        println!("{output}");
    } else {
        let use_color = !args.no_color && std::io::stdout().is_terminal();
        print!(
            "{}",
            report::TextReport {
                left: &left_name,
                right: &right_name,
                result: &result,
                threshold: config.same_artifact_threshold,
                passed,
                use_color,
            }
        );
    }

    if !passed {
        warn!("The bundles have collisions. Fix them before merging into a single war");
    }
    Ok(passed)
}

struct ClasspathArgs {
    roots: Vec<PathBuf>,
    refs: Vec<String>,
    files: bool,
    file_roots: Vec<PathBuf>,
    file_refs: Vec<String>,
}

/// Returns whether the roots are free of class collisions.
///
/// File collisions are only warnings, and are not looked for once the
/// class check has failed.
fn run_classpath(args: ClasspathArgs) -> anyhow::Result<bool> {
    if args.roots.len() < 2 {
        bail!("At least two classpath roots are required");
    }
    let roots = ClasspathRoot::from_args(&args.roots, &args.refs);

    let collisions = ClasspathScanner::new(ScanMode::Classes).scan(&roots)?;
    for msg in report::classpath_messages("classpaths", &collisions, &roots, true) {
        info!("{}", msg);
    }

    if !collisions.is_empty() {
        error!("The classpaths have collisions. Fix them before merging into a single war");
        return Ok(false);
    }

    if args.files || !args.file_roots.is_empty() {
        let file_roots = if args.file_roots.is_empty() {
            roots
        } else {
            if args.file_roots.len() < 2 {
                bail!("At least two file roots are required");
            }
            ClasspathRoot::from_args(&args.file_roots, &args.file_refs)
        };
        let file_collisions = ClasspathScanner::new(ScanMode::AllFiles).scan(&file_roots)?;
        for msg in report::classpath_messages("filepaths", &file_collisions, &file_roots, false) {
            warn!("{}", msg);
        }
    }

    info!("The classpaths do not have collisions");
    Ok(true)
}

fn run_config(portable: bool) -> anyhow::Result<bool> {
    let loaded = ensure_config(portable)?;
    if loaded.exists {
        info!("Config already present");
    } else {
        info!("Wrote default config");
    }
    println!("{}", loaded.path.display());
    Ok(true)
}

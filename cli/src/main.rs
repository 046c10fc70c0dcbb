//! dmi-oaa CLI: set up and run the Dunder Mifflin OAA demo imports
//!
//! Every import subcommand checks `VEZA_URL` and `VEZA_API_KEY` first and exits
//! with status 1 when either is missing.

use anyhow::Context;
use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use dmi_oaa::dataset::{unmatched_identities, ApplicationDataset, Dataset, HrisDataset};
use dmi_oaa::{
    check_credentials, Bootstrap, BootstrapOptions, CredentialSource, HarnessConfig, ProcessEnv,
    SystemLauncher, MISSING_CREDENTIALS_MESSAGE,
};
use dmi_oaa_importer::{
    ContinuationPolicy, ExternalImporter, ImportJob, ImportRunner, Orchestrator, RunState,
};

#[derive(Parser)]
#[command(name = "dmi-oaa", version, about = "Dunder Mifflin OAA import harness")]
struct Cli {
    /// Harness config file (YAML)
    #[arg(long, global = true, env = "DMI_OAA_CONFIG")]
    config: Option<PathBuf>,

    /// Harness root directory (default: current directory)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, clap::ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the sample CSVs, fetch the toolkit and emit the runner scripts
    Setup {
        /// Do not clone the toolkit or install its requirements
        #[arg(long)]
        skip_fetch: bool,

        /// Do not write the runner scripts
        #[arg(long)]
        no_scripts: bool,
    },
    /// Run an import
    Import {
        #[command(subcommand)]
        target: ImportTarget,
    },
    /// Check that the service credentials are set
    Check,
    /// Show the sample tables without writing them
    Inspect {
        /// Output format
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },
}

#[derive(Subcommand)]
enum ImportTarget {
    /// Import the HRIS dataset
    Hris,
    /// Import the custom application dataset
    App,
    /// Import HRIS, then the custom application
    All {
        /// Skip the application import if the HRIS import fails
        #[arg(long)]
        halt_on_failure: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    match run(cli, &ProcessEnv).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli, source: &dyn CredentialSource) -> anyhow::Result<i32> {
    // Imports check credentials before touching the config file
    if matches!(cli.command, Commands::Import { .. }) && check_credentials(source).is_err() {
        eprintln!("{}", MISSING_CREDENTIALS_MESSAGE);
        return Ok(1);
    }

    let mut config = HarnessConfig::load(cli.config.as_deref()).context("loading config")?;
    if let Some(root) = cli.root {
        config = config.with_root(root);
    }

    match cli.command {
        Commands::Setup { skip_fetch, no_scripts } => {
            run_setup(&config, skip_fetch, no_scripts).await
        }
        Commands::Import { target } => match target {
            ImportTarget::Hris => run_single(&config, ImportJob::hris(&config)?, source).await,
            ImportTarget::App => {
                run_single(&config, ImportJob::application(&config)?, source).await
            }
            ImportTarget::All { halt_on_failure } => {
                run_all(&config, halt_on_failure, source).await
            }
        },
        Commands::Check => run_check(source),
        Commands::Inspect { format } => run_inspect(&format),
    }
}

async fn run_setup(config: &HarnessConfig, skip_fetch: bool, no_scripts: bool) -> anyhow::Result<i32> {
    let options = BootstrapOptions {
        fetch_toolkit: !skip_fetch,
        emit_scripts: !no_scripts,
    };
    let report = Bootstrap::new(config, &SystemLauncher).run(options).await?;

    println!("Wrote {} dataset files", report.dataset_files.len());
    if report.cloned {
        println!("Cloned toolkit into {}", config.toolkit_dir()?.display());
    }
    for script in &report.scripts {
        println!("Created {}", script.display());
    }
    Ok(0)
}

fn importer_for<'a>(
    config: &HarnessConfig,
    job: &ImportJob,
    launcher: &'a SystemLauncher,
) -> anyhow::Result<ExternalImporter<'a>> {
    Ok(ExternalImporter::new(
        launcher,
        config.toolkit.python.clone(),
        job.entry_point(config)?,
    ))
}

async fn run_single(
    config: &HarnessConfig,
    job: ImportJob,
    source: &dyn CredentialSource,
) -> anyhow::Result<i32> {
    let launcher = SystemLauncher;
    let importer = importer_for(config, &job, &launcher)?;

    match ImportRunner::new(job, &importer).run(source).await? {
        RunState::Blocked(_) => {
            eprintln!("{}", MISSING_CREDENTIALS_MESSAGE);
            Ok(1)
        }
        state => Ok(state.exit_code()),
    }
}

async fn run_all(
    config: &HarnessConfig,
    halt_on_failure: bool,
    source: &dyn CredentialSource,
) -> anyhow::Result<i32> {
    let launcher = SystemLauncher;
    let hris_job = ImportJob::hris(config)?;
    let app_job = ImportJob::application(config)?;
    let hris = importer_for(config, &hris_job, &launcher)?;
    let app = importer_for(config, &app_job, &launcher)?;

    let policy = if halt_on_failure {
        ContinuationPolicy::HaltOnFailure
    } else {
        ContinuationPolicy::Continue
    };
    let report = Orchestrator::new(
        ImportRunner::new(hris_job, &hris),
        ImportRunner::new(app_job, &app),
    )
    .with_policy(policy)
    .run(source)
    .await?;

    if report.blocked.is_some() || report.steps.iter().any(|s| s.state.is_blocked()) {
        eprintln!("{}", MISSING_CREDENTIALS_MESSAGE);
    }
    Ok(report.exit_code())
}

fn run_check(source: &dyn CredentialSource) -> anyhow::Result<i32> {
    match check_credentials(source) {
        Ok(credentials) => {
            println!("Credentials found for {}", credentials.url);
            Ok(0)
        }
        Err(_) => {
            eprintln!("{}", MISSING_CREDENTIALS_MESSAGE);
            Ok(1)
        }
    }
}

fn run_inspect(format: &OutputFormat) -> anyhow::Result<i32> {
    let hris = HrisDataset::sample()?;
    let app = ApplicationDataset::sample()?;
    let datasets = [("hris", &hris as &dyn Dataset), ("app", &app as &dyn Dataset)];
    let unmatched = unmatched_identities(&hris, &app);

    match format {
        OutputFormat::Json => {
            let tables: Vec<serde_json::Value> = datasets
                .iter()
                .flat_map(|(dataset, data)| {
                    data.tables().into_iter().map(move |t| {
                        serde_json::json!({
                            "dataset": dataset,
                            "file": t.file_name,
                            "rows": t.rows,
                        })
                    })
                })
                .collect();
            let links: Vec<serde_json::Value> = app
                .users
                .iter()
                .map(|u| {
                    serde_json::json!({
                        "user": u.name,
                        "identity": u.identity,
                        "employee": hris.employee_by_identity(&u.identity).map(|e| e.name.clone()),
                        "entitlements": app.entitlements_for(&u.id).len(),
                        "group_entitlements": app.group_entitlements_for(&u.id).len(),
                    })
                })
                .collect();
            let summary = serde_json::json!({
                "tables": tables,
                "identity_links": links,
                "unmatched_identities": unmatched,
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec!["Dataset", "File", "Rows"]);
            for (dataset, data) in &datasets {
                for t in data.tables() {
                    table.add_row(vec![dataset.to_string(), t.file_name.to_string(), t.rows.to_string()]);
                }
            }
            println!("{}", table);

            let mut links = Table::new();
            links.set_content_arrangement(ContentArrangement::Dynamic);
            links.set_header(vec!["User", "Identity", "Employee", "Entitlements", "Via groups"]);
            for u in &app.users {
                let employee = hris
                    .employee_by_identity(&u.identity)
                    .map(|e| e.name.clone())
                    .unwrap_or_else(|| "(none)".to_string());
                links.add_row(vec![
                    u.name.clone(),
                    u.identity.clone(),
                    employee,
                    app.entitlements_for(&u.id).len().to_string(),
                    app.group_entitlements_for(&u.id).len().to_string(),
                ]);
            }
            println!("{}", links);

            if unmatched.is_empty() {
                println!("All application identities match an employee");
            } else {
                println!("{} unmatched identities", unmatched.len());
            }
        }
    }

    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn bad_config() -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "hris_dir: [unterminated").unwrap();
        file
    }

    #[tokio::test]
    async fn test_import_guard_precedes_config() {
        let config = bad_config();
        let no_credentials: HashMap<String, String> = HashMap::new();

        for target in ["hris", "app", "all"] {
            let cli = Cli::try_parse_from([
                "dmi-oaa",
                "--config",
                config.path().to_str().unwrap(),
                "import",
                target,
            ])
            .unwrap();
            assert_eq!(run(cli, &no_credentials).await.unwrap(), 1, "import {}", target);
        }
    }

    #[tokio::test]
    async fn test_bad_config_fails_once_credentials_pass() {
        let config = bad_config();
        let mut credentials = HashMap::new();
        credentials.insert("VEZA_URL".to_string(), "https://veza.example".to_string());
        credentials.insert("VEZA_API_KEY".to_string(), "secret-key".to_string());

        let cli = Cli::try_parse_from([
            "dmi-oaa",
            "--config",
            config.path().to_str().unwrap(),
            "import",
            "hris",
        ])
        .unwrap();
        let err = run(cli, &credentials).await.unwrap_err();
        assert!(format!("{:#}", err).contains("loading config"));
    }

    #[tokio::test]
    async fn test_check_reports_missing_credentials() {
        let cli = Cli::try_parse_from(["dmi-oaa", "check"]).unwrap();
        let none: HashMap<String, String> = HashMap::new();
        assert_eq!(run(cli, &none).await.unwrap(), 1);
    }
}

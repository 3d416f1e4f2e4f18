//! Fetch, inspect, and patch a project's cached API catalogue.
//!
//! The cache survives between runs through a JSON snapshot, so a second
//! invocation inside the TTL is served without touching the backend.

use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use api_catalog::domain::ports::{CatalogSnapshotRepository, SnapshotError};
use api_catalog::domain::{
    CacheStore, CatalogConfig, CatalogConfigError, EndpointGroup, FetchCoordinator, ProcessState,
    ProjectId,
};
use api_catalog::outbound::api_specs::ApiSpecHttpSource;
use api_catalog::outbound::snapshot_file::{DEFAULT_SNAPSHOT_FILE, FileCatalogSnapshotRepository};
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use mockable::{DefaultClock, DefaultEnv, Env};
use thiserror::Error;
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

const TOKEN_ENV: &str = "API_CATALOG_TOKEN";

/// `api-catalog` command arguments.
#[derive(Debug, Parser)]
#[command(
    name = "api-catalog",
    about = "Fetch and inspect a project's grouped API catalogue",
    version
)]
struct CliArgs {
    /// Project whose catalogue is cached.
    #[arg(long, value_name = "id")]
    project: u64,
    /// Directory holding the cache snapshot.
    #[arg(long = "snapshot-dir", value_name = "path", default_value = ".api-catalog")]
    snapshot_dir: Utf8PathBuf,
    /// Snapshot file name inside the snapshot directory.
    #[arg(long = "snapshot-file", value_name = "name", default_value = DEFAULT_SNAPSHOT_FILE)]
    snapshot_file: Utf8PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch the catalogue unless the cached copy is fresh, then print it.
    Show {
        /// Bearer token. Falls back to `API_CATALOG_TOKEN` when omitted.
        #[arg(long, value_name = "token")]
        token: Option<String>,
        /// Ignore the TTL and fetch from the backend.
        #[arg(long)]
        force: bool,
        /// Print groups as JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Change one cached endpoint's processing state.
    SetStatus {
        /// Group identifier.
        #[arg(long, value_name = "id")]
        group: String,
        /// Endpoint identifier.
        #[arg(long, value_name = "id")]
        endpoint: String,
        /// New state, for example `USER_COMPLETED`.
        #[arg(long, value_name = "state", value_parser = parse_state)]
        status: ProcessState,
    },
    /// Drop the project's cached catalogue.
    Evict,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Args(#[from] clap::Error),
    #[error("configuration error: {0}")]
    Config(#[from] CatalogConfigError),
    #[error("snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),
    #[error("create HTTP client: {0}")]
    Client(#[from] reqwest::Error),
    #[error("write output: {0}")]
    Output(#[from] io::Error),
    #[error("serialise output: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no cached endpoint '{endpoint}' in group '{group}'")]
    UnknownEndpoint { group: String, endpoint: String },
    #[error("cannot move endpoint from {from} to {to}")]
    Transition { from: ProcessState, to: ProcessState },
}

fn main() -> ExitCode {
    if let Err(error) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .json()
        .try_init()
    {
        warn!(error = %error, "tracing init failed");
    }

    let result = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::Output)
        .and_then(|runtime| runtime.block_on(run()));
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Args(error)) => {
            if let Err(print_error) = error.print() {
                drop(print_error);
            }
            if error.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(error) => {
            if let Err(write_error) = writeln!(io::stderr().lock(), "{error}") {
                drop(write_error);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), CliError> {
    let args = CliArgs::try_parse()?;
    let project_id = ProjectId::new(args.project);
    let env = DefaultEnv::new();
    let config = CatalogConfig::from_env_with(&env)?;
    let repository =
        FileCatalogSnapshotRepository::open_ambient(&args.snapshot_dir, args.snapshot_file)?;

    let store = Arc::new(CacheStore::new());
    if let Some(snapshot) = repository.load()? {
        store.restore(snapshot);
    }

    match args.command {
        Command::Show { token, force, json } => {
            let source =
                ApiSpecHttpSource::new(config.base_url().clone(), config.request_timeout())?;
            let coordinator = FetchCoordinator::new(
                Arc::new(source),
                Arc::clone(&store),
                Arc::new(DefaultClock),
                config.cache_ttl(),
            );
            let auth_token = resolve_token(token, &env);
            coordinator.fetch_api_specs(project_id, &auth_token, force).await;
            let groups = store.groups(project_id).unwrap_or_default();
            write_groups(&groups, json)?;
        }
        Command::SetStatus {
            group,
            endpoint,
            status,
        } => set_status(&store, project_id, &group, &endpoint, status)?,
        Command::Evict => {
            store.evict(project_id);
        }
    }

    repository.save(&store.snapshot())?;
    Ok(())
}

fn set_status(
    store: &CacheStore,
    project_id: ProjectId,
    group: &str,
    endpoint: &str,
    status: ProcessState,
) -> Result<(), CliError> {
    let current = store
        .entry(project_id)
        .and_then(|entry| {
            entry
                .group(group)
                .and_then(|found| found.endpoint(endpoint))
                .map(|found| found.status)
        })
        .ok_or_else(|| CliError::UnknownEndpoint {
            group: group.to_owned(),
            endpoint: endpoint.to_owned(),
        })?;
    if current == status {
        return Ok(());
    }
    if !current.permits_transition_to(status) {
        return Err(CliError::Transition {
            from: current,
            to: status,
        });
    }
    store.update_endpoint_status(project_id, group, endpoint, status);
    Ok(())
}

fn resolve_token(explicit: Option<String>, env: &impl Env) -> String {
    explicit
        .or_else(|| env.string(TOKEN_ENV))
        .unwrap_or_default()
}

fn parse_state(raw: &str) -> Result<ProcessState, String> {
    raw.parse()
        .map_err(|error: api_catalog::domain::UnknownProcessState| error.to_string())
}

fn write_groups(groups: &[EndpointGroup], json: bool) -> Result<(), CliError> {
    let mut out = io::stdout().lock();
    if json {
        serde_json::to_writer_pretty(&mut out, groups)?;
        writeln!(out)?;
        return Ok(());
    }
    for group in groups {
        writeln!(
            out,
            "{} {} [{}] ({} endpoints)",
            group.visual_tag,
            group.key,
            group.id,
            group.endpoints.len()
        )?;
        for endpoint in &group.endpoints {
            writeln!(
                out,
                "    {:<7} {} [{}] {}",
                endpoint.method.as_str(),
                endpoint.path,
                endpoint.id,
                endpoint.status
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    //! Token resolution and status-transition checks for the CLI.

    use api_catalog::domain::ports::ApiSpecRecord;
    use api_catalog::domain::build_endpoint_groups;
    use chrono::Utc;
    use mockable::MockEnv;
    use rstest::rstest;

    use super::*;

    fn env_with_token(token: Option<&'static str>) -> MockEnv {
        let mut env = MockEnv::new();
        env.expect_string()
            .times(0..)
            .returning(move |key| token.filter(|_| key == TOKEN_ENV).map(str::to_owned));
        env
    }

    #[rstest]
    #[case::explicit_wins(Some("from-flag"), Some("from-env"), "from-flag")]
    #[case::falls_back_to_env(None, Some("from-env"), "from-env")]
    #[case::absent_is_empty(None, None, "")]
    fn resolves_token(
        #[case] explicit: Option<&str>,
        #[case] from_env: Option<&'static str>,
        #[case] expected: &str,
    ) {
        let env = env_with_token(from_env);
        assert_eq!(resolve_token(explicit.map(str::to_owned), &env), expected);
    }

    fn seeded_store(project_id: ProjectId, status: ProcessState) -> (CacheStore, String, String) {
        let store = CacheStore::new();
        let groups = build_endpoint_groups(
            vec![ApiSpecRecord::new("/api/v1/users", "GET").with_status(status)],
            0,
        );
        store.write_fetched(project_id, groups, Utc::now());
        let entry = store.entry(project_id).expect("entry");
        let group = entry.groups.first().expect("group");
        let endpoint = group.endpoints.first().expect("endpoint");
        (store, group.id.clone(), endpoint.id.clone())
    }

    #[test]
    fn set_status_applies_permitted_transition() {
        let project_id = ProjectId::new(1);
        let (store, group, endpoint) = seeded_store(project_id, ProcessState::AiVisualized);

        set_status(&store, project_id, &group, &endpoint, ProcessState::UserCompleted)
            .expect("permitted transition");

        let entry = store.entry(project_id).expect("entry");
        let patched = entry
            .group(&group)
            .and_then(|found| found.endpoint(&endpoint))
            .expect("endpoint");
        assert_eq!(patched.status, ProcessState::UserCompleted);
    }

    #[test]
    fn set_status_rejects_forbidden_transition() {
        let project_id = ProjectId::new(1);
        let (store, group, endpoint) = seeded_store(project_id, ProcessState::AiGenerated);

        let error = set_status(&store, project_id, &group, &endpoint, ProcessState::UserCompleted)
            .expect_err("AI_GENERATED is locked");

        assert!(matches!(error, CliError::Transition { .. }));
    }

    #[test]
    fn set_status_reports_unknown_endpoint() {
        let project_id = ProjectId::new(1);
        let (store, group, _) = seeded_store(project_id, ProcessState::AiVisualized);

        let error = set_status(&store, project_id, &group, "missing", ProcessState::UserCompleted)
            .expect_err("unknown endpoint");

        assert!(matches!(error, CliError::UnknownEndpoint { .. }));
    }
}

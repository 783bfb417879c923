use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use device_monitor::{
    ChartPayload, DetailPayload, DeviceMonitor, FileSource, HttpSource, JsonFilePresenter,
    LogPresenter, MemoryTokenStore, Metric, Navigator, Presenter, ScreenState, SensorFeedClient,
    SensorSource, Settings, SysfsBattery, TokenProvider,
};

/// Placeholder credential handed to a replay source.
const REPLAY_TOKEN: &str = "replay";

#[derive(Parser, Debug)]
#[command(name = "device-monitor")]
#[command(about = "Headless monitor for environmental sensor history")]
struct Args {
    /// Path to a TOML configuration file (default: ./device-monitor.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Server base URL, e.g. http://172.16.22.142:3000
    #[arg(long, conflicts_with = "replay")]
    base_url: Option<String>,

    /// Refresh interval in milliseconds
    #[arg(short, long)]
    refresh: Option<u64>,

    /// File holding the bearer token
    #[arg(long)]
    token_file: Option<PathBuf>,

    /// Replay a captured sensor-data response instead of calling the server
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Also write every screen state to this JSON file
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Run a single cycle, print the result as JSON and exit
    #[arg(long)]
    once: bool,

    /// With --once, print the detail-view payload instead of the screen state
    #[arg(long, requires = "once", conflicts_with = "chart")]
    detail: bool,

    /// With --once, print the full-chart payload for one metric
    #[arg(long, requires = "once", value_name = "METRIC")]
    chart: Option<Metric>,

    /// Store the bearer token and exit
    #[arg(long, value_name = "TOKEN", conflicts_with_all = ["once", "replay", "export"])]
    save_token: Option<String>,
}

/// Navigator for a headless run: there is no sign-in screen, so the
/// redirect is reported and remembered for the exit status.
#[derive(Debug, Default)]
struct SignInPrompt {
    requested: AtomicBool,
}

impl SignInPrompt {
    fn requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}

impl Navigator for SignInPrompt {
    fn redirect_to_sign_in(&self) {
        self.requested.store(true, Ordering::SeqCst);
        warn!("Sign-in required; store a new token with --save-token");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let settings = load_settings(&args)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Some(token) = &args.save_token {
        let store = settings.token_store()?;
        store.set_token(token).await?;
        println!("Saved token to: {}", store.path().display());
        return Ok(());
    }

    let tokens = token_provider(&settings, args.replay.is_some())?;

    let client = SensorFeedClient::new(build_source(&settings, args.replay.as_deref())?)
        .with_options(settings.normalize_options())
        .with_locale(settings.locale);
    let navigator = Arc::new(SignInPrompt::default());
    let monitor = DeviceMonitor::new(client, tokens, navigator.clone())
        .with_interval(settings.poll_interval())
        .with_battery(Box::new(SysfsBattery::default()));

    if args.once {
        run_once(&monitor, &settings, &args).await?;
    } else {
        run_screen(monitor, &settings, args.export.as_deref()).await;
    }

    if navigator.requested() {
        bail!("Not signed in");
    }
    Ok(())
}

/// Load layered settings and apply command-line overrides on top.
fn load_settings(args: &Args) -> Result<Settings> {
    let mut settings = Settings::load(args.config.as_deref())?;

    if let Some(base_url) = &args.base_url {
        settings.base_url = base_url.clone();
    }
    if let Some(refresh) = args.refresh {
        settings.poll_interval_ms = refresh;
    }
    if let Some(path) = &args.token_file {
        settings.token_path = Some(path.clone());
    }

    settings.validate()?;
    Ok(settings)
}

/// Token lookup for this run.
///
/// A replayed file ignores the token, so replays never need a stored one.
fn token_provider(settings: &Settings, replaying: bool) -> Result<Arc<dyn TokenProvider>> {
    if replaying {
        return Ok(Arc::new(MemoryTokenStore::new(REPLAY_TOKEN)));
    }
    Ok(Arc::new(settings.token_store()?))
}

fn build_source(settings: &Settings, replay: Option<&Path>) -> Result<Box<dyn SensorSource>> {
    if let Some(path) = replay {
        return Ok(Box::new(FileSource::new(path)));
    }

    let mut builder = HttpSource::builder().base_url(settings.base_url.as_str());
    if let Some(timeout) = settings.request_timeout() {
        builder = builder.timeout(timeout);
    }
    Ok(Box::new(builder.build()?))
}

/// Run one cycle and print the result to stdout.
async fn run_once(monitor: &DeviceMonitor, settings: &Settings, args: &Args) -> Result<()> {
    let outcome = monitor.run_cycle().await;
    let state = ScreenState::from_outcome(outcome, settings.locale);

    let json = if args.detail {
        serde_json::to_string_pretty(&DetailPayload::from_state(&state)?)?
    } else if let Some(metric) = args.chart {
        serde_json::to_string_pretty(&ChartPayload::from_state(&state, metric)?)?
    } else {
        serde_json::to_string_pretty(&state)?
    };
    println!("{}", json);

    if let Some(path) = &args.export {
        JsonFilePresenter::new(path).present(&state)?;
        info!(path = %path.display(), "Exported screen state");
    }
    Ok(())
}

/// Activate the screen and present every state until Ctrl-C or polling stops.
async fn run_screen(monitor: DeviceMonitor, settings: &Settings, export: Option<&Path>) {
    let mut presenters: Vec<Box<dyn Presenter>> = vec![Box::new(LogPresenter::new(
        settings.locale,
        settings.label_timezone,
    ))];
    if let Some(path) = export {
        presenters.push(Box::new(JsonFilePresenter::new(path)));
    }

    let mut handle = monitor.activate();
    if let Some(battery) = handle.battery_percent() {
        info!(battery, "Battery level");
    }
    present_all(&mut presenters, &handle.state());

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Interrupted, shutting down");
                break;
            }
            next = handle.changed() => match next {
                Some(state) => present_all(&mut presenters, &state),
                None => break,
            },
        }
    }

    handle.teardown().await;
}

fn present_all(presenters: &mut [Box<dyn Presenter>], state: &ScreenState) {
    for presenter in presenters.iter_mut() {
        if let Err(e) = presenter.present(state) {
            warn!(error = %e, "Failed to present screen state");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use device_monitor::FetchOutcome;
    use tempfile::tempdir;

    fn settings_with_token_dir(dir: &Path) -> Settings {
        Settings {
            token_path: Some(dir.join("token")),
            ..Settings::default()
        }
    }

    #[tokio::test]
    async fn test_replay_needs_no_stored_token() {
        let dir = tempdir().unwrap();
        let settings = settings_with_token_dir(dir.path());

        let replay = token_provider(&settings, true).unwrap();
        assert!(replay.get_token().await.is_some());

        let live = token_provider(&settings, false).unwrap();
        assert!(live.get_token().await.is_none());
    }

    #[tokio::test]
    async fn test_replay_cycle_does_not_request_sign_in() {
        let dir = tempdir().unwrap();
        let capture = dir.path().join("sensor-data.json");
        std::fs::write(
            &capture,
            r#"{"data":[{"timestamp":"2024-05-01T10:00:00Z","temperature":25.0}]}"#,
        )
        .unwrap();
        let settings = settings_with_token_dir(dir.path());

        let client = SensorFeedClient::new(build_source(&settings, Some(&capture)).unwrap());
        let navigator = Arc::new(SignInPrompt::default());
        let monitor = DeviceMonitor::new(
            client,
            token_provider(&settings, true).unwrap(),
            navigator.clone(),
        );

        let outcome = monitor.run_cycle().await;
        assert!(matches!(outcome, FetchOutcome::Ok { .. }));
        assert!(!navigator.requested());
    }
}

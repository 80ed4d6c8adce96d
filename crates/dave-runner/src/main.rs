use tracing_subscriber::EnvFilter;

use dave_platformer::DaveSession;
use dave_platformer::config::PlatformerConfig;
use dave_platformer::levels::LevelPack;
use dave_runner::config::RunnerConfig;
use dave_runner::host::{Host, run_realtime, run_simulated};
use dave_runner::script::InputScript;

#[tokio::main]
async fn main() {
    let runner = RunnerConfig::from_env();

    if runner.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(EnvFilter::from_default_env())
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .init();
    }

    tracing::info!("Dave runner starting");

    let config = PlatformerConfig::load();
    let levels = match &runner.levels {
        Some(path) => LevelPack::load_or_builtin(path),
        None => LevelPack::builtin(),
    };
    let script = match &runner.script {
        Some(path) => InputScript::load(path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load {}: {e}, using demo script", path.display());
            InputScript::demo()
        }),
        None => InputScript::demo(),
    };
    tracing::info!(
        levels = levels.len(),
        frames = script.total_frames(),
        "Session ready"
    );

    let mut host = Host::new(DaveSession::new(config, levels), script);
    let summary = if runner.realtime {
        run_realtime(&mut host, runner.display_hz).await
    } else {
        run_simulated(&mut host, runner.display_hz)
    };

    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{json}"),
        Err(e) => tracing::error!(error = %e, "Failed to encode run summary"),
    }
}

//! Pulsating particle heart.
//!
//! Run with: `cargo run --release [config.json]`

use heartfield::{Scene, SceneConfig, SceneError};

fn run() -> Result<(), SceneError> {
    let config = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("loading config from {path}");
            SceneConfig::load(&path)?
        }
        None => SceneConfig::default(),
    };

    Scene::new().with_config(config).run()
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run() {
        log::error!("{err}");
        std::process::exit(1);
    }
}

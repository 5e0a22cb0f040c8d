//! Headless прогон SHOOTA
//!
//! Играет одну полную игру scripted игроком (HeadlessSession + Autoplay)
//! на фиксированном шаге времени. Первый аргумент: опциональный TOML config.

use std::time::Duration;

use shoota_simulation::{
    create_gallery_app, logger, AutoplayPlugin, GalleryConfig, GalleryError, GameState,
    HeadlessSession, HeadlessSessionConfig, Hud, HudRole,
};

/// Шаг virtual времени на один app.update()
const STEP: Duration = Duration::from_millis(100);

/// Страховка от бесконечного цикла (10 минут игрового времени)
const MAX_FRAMES: u32 = 6_000;

/// Gameplay config + секция `[session]` из одного TOML файла
fn parse_config(source: &str) -> Result<(GalleryConfig, HeadlessSessionConfig), GalleryError> {
    Ok((
        GalleryConfig::from_toml_str(source)?,
        HeadlessSessionConfig::from_toml_str(source)?,
    ))
}

fn load_config() -> (GalleryConfig, HeadlessSessionConfig) {
    let Some(path) = std::env::args().nth(1) else {
        return Default::default();
    };

    let parsed = std::fs::read_to_string(&path)
        .map_err(|error| error.to_string())
        .and_then(|source| parse_config(&source).map_err(|error| error.to_string()));

    match parsed {
        Ok(configs) => configs,
        Err(error) => {
            logger::log_error(&format!("Config {} not loaded ({}), using defaults", path, error));
            Default::default()
        }
    }
}

fn main() {
    logger::init_logger();
    logger::set_log_level(logger::LogLevel::Info);

    let seed = 42;
    let (config, session_config) = load_config();
    logger::log_info(&format!("Starting SHOOTA headless game (seed: {})", seed));

    let mut app = create_gallery_app(seed, config, HeadlessSession::new(session_config), STEP);
    app.add_plugins(AutoplayPlugin);

    for frame in 0..MAX_FRAMES {
        app.update();

        let state = app.world().resource::<GameState>();
        if frame % 50 == 0 {
            let session = app.world().resource::<HeadlessSession>();
            logger::log_info(&format!(
                "Frame {}: created {}/{}, live {}, nodes {}",
                frame,
                state.targets_created(),
                state.cap(),
                state.targets_live(),
                session.node_count()
            ));
        }

        if !state.is_running() {
            break;
        }
    }

    let world = app.world();
    let state = world.resource::<GameState>();
    if state.is_running() {
        logger::log_warning(&format!(
            "Game did not finish in {} frames ({} created, {} live)",
            MAX_FRAMES,
            state.targets_created(),
            state.targets_live()
        ));
        return;
    }

    let time_taken = world
        .resource::<Hud>()
        .text(HudRole::TimeTaken)
        .unwrap_or("Time taken: ?")
        .to_string();
    logger::log_info(&format!("Game complete! {}", time_taken));
}

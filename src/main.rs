// What you SEE:
// • A "press enter" prompt, then a shaky logo intro and a fake BIOS boot log.
// • Then the terminal: type commands (try `help`), Up/Down scroll history.
// • Everything sits under scanlines and glitching text; every so often the
//   picture tears into sideways-shifted bands for a moment.
// • Keys click and the boot starts with a chime when Assets/sounds has clips.
// • ESC quits from anywhere.
//
// Usage: crt-terminal [config.toml]   (defaults to ./crt.toml if present)

use std::path::PathBuf;
use std::time::{Duration, Instant};

use crt_terminal::config::AppConfig;
use crt_terminal::draw::Drawer;
use crt_terminal::error::Error;
use crt_terminal::rng::make_rng;
use crt_terminal::screen::{Flow, Screen, Theme, render_frame};
use crt_terminal::sound::Sound;
use crt_terminal::splash::Splash;
use crt_terminal::terminal::Terminal;
use crt_terminal::types::FrameBuffer;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    /* --- Config ---
       Loaded once; immutable for the whole session. */
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let cfg = AppConfig::load(config_path.as_deref())?;
    info!(scheme = ?cfg.color_scheme, width = cfg.window.width, height = cfg.window.height, "starting CRT terminal");

    let (w, h) = (cfg.window.width, cfg.window.height);
    let mut drawer = Drawer::new(&cfg.window.title, w, h, cfg.window.target_fps)?;
    let theme = Theme::from_config(&cfg);
    let mut rng = make_rng(cfg.seed);
    let mut sound = Sound::open(&cfg.sound, cfg.seed);

    /* --- Screens, in order ---
       Each owns its own corruption timer. */
    let mut terminal = Terminal::new(cfg.terminal.clone(), cfg.corruption.clone());
    terminal.add_output("CYBERPUNK RED TERMINAL ONLINE.", false);
    terminal.add_output("Type 'help' for commands.", false);

    let mut screens: Vec<Box<dyn Screen>> = Vec::new();
    if cfg.splash.enabled {
        screens.push(Box::new(Splash::new(cfg.splash.clone(), cfg.corruption.clone(), (w, h))));
    }
    screens.push(Box::new(terminal));
    let mut current = 0;

    /* --- Reusable screen buffer --- */
    let mut frame = FrameBuffer::new(w, h, theme.palette.bg);

    /* --- FPS --- */
    let start = Instant::now();
    let mut last_fps_time = Instant::now();
    let mut frames_this_second: u32 = 0;

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() {
        let now = start.elapsed().as_secs_f64();
        let input = drawer.poll_input();

        match screens[current].update(&input, now, &mut sound) {
            Flow::Continue => {}
            Flow::Next if current + 1 < screens.len() => current += 1,
            Flow::Next | Flow::Quit => break,
        }

        frame = render_frame(screens[current].as_mut(), frame, &theme, now, &mut rng);
        drawer.present(&frame)?;

        frames_this_second += 1;
        let since = last_fps_time.elapsed();
        if since >= Duration::from_secs(1) {
            let fps = frames_this_second as f32 / since.as_secs_f32();
            debug!("FPS: {fps:.1}");
            frames_this_second = 0;
            last_fps_time = Instant::now();
        }
    }

    info!("terminal closed");
    Ok(())
}

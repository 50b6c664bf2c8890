use std::io;
use std::thread;
use std::time::Duration;

use clap::Parser;

use n3ds_pad::config::{Cli, Command, Config};
use n3ds_pad::console::{self, TouchTarget};
use n3ds_pad::dump;
use n3ds_pad::input::{TouchPoint, TOUCH_MAX};
use n3ds_pad::session::InputSession;
use n3ds_pad::transport::{self, UdpTransport};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

fn main() -> Result<(), BoxError> {
    let mut cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::load(&cli);

    match cli.command.take() {
        Some(Command::Dump { button, touch }) => {
            let touch = match touch.as_deref() {
                Some(&[x, y]) if x <= TOUCH_MAX && y <= TOUCH_MAX => Some(TouchPoint { x, y }),
                Some(_) => return Err("--touch expects two coordinates in 0-4095".into()),
                None => None,
            };
            dump::run_dump(&dump::state_for(button, touch), io::stdout().lock())
        }
        Some(Command::Press { button }) => {
            with_session(&config, |session| Ok(session.press_button_oneshot(button)?))
        }
        Some(Command::Touch { target, hold_ms }) => {
            let point = TouchTarget::parse(target.as_slice())?.resolve(&config)?;
            with_session(&config, |session| {
                session.begin_touch(point.x, point.y)?;
                thread::sleep(Duration::from_millis(hold_ms));
                session.end_touch()?;
                Ok(())
            })
        }
        Some(Command::Release) => with_session(&config, |session| Ok(session.end_touch()?)),
        None => with_session(&config, |session| {
            eprintln!("Type 'help' for commands, 'quit' to exit.");
            console::run(&session.handle(), &config, io::stdin().lock(), io::stdout())
        }),
    }
}

/// Connect to the console, run `f` against a fresh session, then flush and stop it.
fn with_session<F>(config: &Config, f: F) -> Result<(), BoxError>
where
    F: FnOnce(&InputSession) -> Result<(), BoxError>,
{
    config.validate()?;
    let host = config.host.as_deref().unwrap_or_default();
    let peer = transport::resolve(host, config.port)?;

    log::info!(
        "n3ds-pad starting (peer={}, debounce={}ms, release_target={})",
        peer,
        config.debounce_ms,
        config.release_target
    );

    let session = InputSession::spawn(UdpTransport::connect(peer)?, config.session_settings())?;
    f(&session)?;

    let frames = session.shutdown()?;
    log::info!("Sent {} frames to {}", frames, peer);
    Ok(())
}

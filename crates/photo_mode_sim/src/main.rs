mod bootstrap;
mod runner;
mod script;

use std::env;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use photo_mode::sim::SimWorld;
use tracing::{error, info};

use runner::ScriptRunner;
use script::{parse_script, read_script};

const DEMO_SCRIPT: &str = "\
# enter, pose the player, and leave again
toggle
tab next
hour 21
freeze on
tab next
rotate 90
move 40 -10
expr 3 80
idle 1
weapon 0
vfx 0
frame 3
status
reset_all
tab prev
reset
status
# pose the follower, then get interrupted by the map
select 1
hide
open MapMenu
frame
status
close MapMenu
# side door from the journal's mod list
open \"Journal Menu\"
menu Mod Manager Menu
frame
toggle
status
";

fn main() -> ExitCode {
    bootstrap::init_tracing();
    info!("=== Photo Mode Sim Startup ===");

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!(error = %message, "run_failed");
            ExitCode::from(1)
        }
    }
}

fn run_cli() -> Result<(), String> {
    let settings_path = bootstrap::settings_path_from_env();
    let settings =
        bootstrap::load_settings(settings_path.as_deref()).map_err(|error| error.to_string())?;

    let source = match env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => read_script(&path).map_err(|error| error.to_string())?,
        None => DEMO_SCRIPT.to_string(),
    };
    let lines = parse_script(&source).map_err(|error| error.to_string())?;

    let mut runner = ScriptRunner::new(SimWorld::with_default_scene(), settings);
    runner
        .run(&lines, &mut io::stdout().lock())
        .map_err(|error| format!("write output: {error}"))
}

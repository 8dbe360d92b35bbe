/// MeshScene Terminal - render a scene description as ASCII art
///
/// Usage: meshscene-terminal [--fps N] [--spin DEGREES] [description-file]
///
/// Controls:
///   - WASD / Arrow Keys: Spin the scene
///   - E/R: Roll
///   - Q/ESC: Quit
use log::info;
use meshscene_terminal::{AppConfig, TerminalApp};
use std::io;

fn main() -> io::Result<()> {
    env_logger::init();

    let config = AppConfig::from_args(std::env::args().skip(1))?;
    match &config.description_path {
        Some(path) => info!("Loading scene description {}", path.display()),
        None => info!("No description given, using the demo scene"),
    }

    let scene = config.load_scene()?;
    println!(
        "Loaded {} objects. Starting terminal renderer (press Q to quit)...",
        scene.objects().len()
    );
    std::thread::sleep(std::time::Duration::from_secs(1));

    let mut app = TerminalApp::new(scene, config)?;
    app.run()?;

    println!("Thank you for using MeshScene Terminal!");
    Ok(())
}

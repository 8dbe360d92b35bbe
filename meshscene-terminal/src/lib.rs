/// Terminal-based ASCII rasterizer for MeshScene descriptions
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use log::{info, trace};
use meshscene_core::{Camera, Instruction, Scene};
use std::io::{self, stdout, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

pub mod renderer;

pub use renderer::AsciiRenderer;

/// Scene rendered when no description file is given.
///
/// The last instruction declared for an object is the first applied to its
/// vertices, so each block is scaled to unit size before being moved.
pub const DEMO_DESCRIPTION: &str = "
c,myCamera,perspective,7,7,7,0,0,0,0,1,0;
l,myLight,point,-4,5,-4,1.2,1.2,1.2;
p,unitCube,cube;
p,unitSphere,sphere,20,20;
m,globeMat,1,1,1,0.7,0.7,0.7,1,1,1,5,sun.png;
m,topdirt,0.3,0.3,0.3,0.7,0.7,0.7,1,1,1,5,largetopdirt.png;
o,globe,unitSphere,globeMat;
X,globe,T,0,1.5,0;X,globe,Ry,-150;X,globe,Rx,90;X,globe,S,1.5,1.5,1.5;
o,d1,unitCube,topdirt;X,d1,T,-1,-1,-1;X,d1,S,0.5,0.5,0.5;
o,d2,unitCube,topdirt;X,d2,T,0,-1,-1;X,d2,S,0.5,0.5,0.5;
o,d3,unitCube,topdirt;X,d3,T,1,-1,-1;X,d3,S,0.5,0.5,0.5;
o,d4,unitCube,topdirt;X,d4,T,-1,-1,0;X,d4,S,0.5,0.5,0.5;
o,d5,unitCube,topdirt;X,d5,T,0,-1,0;X,d5,S,0.5,0.5,0.5;
o,d6,unitCube,topdirt;X,d6,T,1,-1,0;X,d6,S,0.5,0.5,0.5;
o,d7,unitCube,topdirt;X,d7,T,-1,-1,1;X,d7,S,0.5,0.5,0.5;
o,d8,unitCube,topdirt;X,d8,T,0,-1,1;X,d8,S,0.5,0.5,0.5;
o,d9,unitCube,topdirt;X,d9,T,1,-1,1;X,d9,S,0.5,0.5,0.5;
";

/// Host settings for the terminal renderer
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Frames per second to aim for
    pub target_fps: u32,
    /// Degrees added per key press
    pub spin_step: f32,
    /// Degrees of automatic yaw per frame
    pub auto_spin: f32,
    /// Description file to load instead of the demo scene
    pub description_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            target_fps: 30,
            spin_step: 5.0,
            auto_spin: 0.6,
            description_path: None,
        }
    }
}

impl AppConfig {
    /// Build from command-line arguments (program name excluded).
    ///
    /// Accepts `--fps N`, `--step DEGREES`, `--spin DEGREES` and one optional
    /// description path.
    pub fn from_args<I>(args: I) -> io::Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut config = Self::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--fps" => config.target_fps = parse_flag(&arg, args.next())?.max(1.0) as u32,
                "--step" => config.spin_step = parse_flag(&arg, args.next())?,
                "--spin" => config.auto_spin = parse_flag(&arg, args.next())?,
                flag if flag.starts_with("--") => {
                    return Err(invalid_input(format!("Unknown option {}", flag)))
                }
                path => config.description_path = Some(PathBuf::from(path)),
            }
        }
        Ok(config)
    }

    /// Load the configured description, or the demo scene
    pub fn load_scene(&self) -> io::Result<Scene> {
        let text = match &self.description_path {
            Some(path) => std::fs::read_to_string(path).map_err(|e| {
                io::Error::new(e.kind(), format!("Failed to read {}: {}", path.display(), e))
            })?,
            None => DEMO_DESCRIPTION.to_string(),
        };
        Scene::from_description(&text)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))
    }
}

fn parse_flag(flag: &str, value: Option<String>) -> io::Result<f32> {
    let value = value.ok_or_else(|| invalid_input(format!("{} needs a value", flag)))?;
    value
        .parse()
        .map_err(|_| invalid_input(format!("{} expects a number, got '{}'", flag, value)))
}

fn invalid_input(message: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, message)
}

/// World-space spin applied on top of every object's own transforms, in
/// degrees
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Spin {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Spin {
    pub fn rotate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.x = (self.x + dx) % 360.0;
        self.y = (self.y + dy) % 360.0;
        self.z = (self.z + dz) % 360.0;
    }

    /// Instructions placing the spin outside an object's own sequence
    pub fn instructions(&self) -> [Instruction; 3] {
        [
            Instruction::RotateX(self.x),
            Instruction::RotateY(self.y),
            Instruction::RotateZ(self.z),
        ]
    }
}

/// Main application struct for terminal 3D rendering
pub struct TerminalApp {
    scene: Scene,
    config: AppConfig,
    spin: Spin,
    camera: Camera,
    renderer: AsciiRenderer,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(scene: Scene, config: AppConfig) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        Ok(Self::with_size(scene, config, width as usize, height as usize))
    }

    /// Create an app for a fixed viewport, without querying the terminal
    pub fn with_size(scene: Scene, config: AppConfig, width: usize, height: usize) -> Self {
        let camera = match scene.camera() {
            Some(statement) => Camera::from_statement(statement, width as u32, height as u32),
            None => Camera::new(width as u32, height as u32),
        };
        Self {
            scene,
            config,
            spin: Spin::default(),
            camera,
            renderer: AsciiRenderer::new(width, height),
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        }
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / self.config.target_fps.max(1) as u64);
        info!(
            "Rendering {} objects at {} FPS",
            self.scene.objects().len(),
            self.config.target_fps
        );

        while self.running {
            let frame_start = Instant::now();

            if event::poll(Duration::from_millis(0))? {
                self.handle_input()?;
            }

            self.update();
            self.render()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    fn handle_input(&mut self) -> io::Result<()> {
        match event::read()? {
            Event::Key(KeyEvent { code, .. }) => self.handle_key(code),
            Event::Resize(width, height) => {
                self.renderer.resize(width as usize, height as usize);
                self.camera.resize(width as u32, height as u32);
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_key(&mut self, code: KeyCode) {
        let step = self.config.spin_step;
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,
            KeyCode::Char('w') | KeyCode::Up => self.spin.rotate(step, 0.0, 0.0),
            KeyCode::Char('s') | KeyCode::Down => self.spin.rotate(-step, 0.0, 0.0),
            KeyCode::Char('a') | KeyCode::Left => self.spin.rotate(0.0, -step, 0.0),
            KeyCode::Char('d') | KeyCode::Right => self.spin.rotate(0.0, step, 0.0),
            KeyCode::Char('e') => self.spin.rotate(0.0, 0.0, step),
            KeyCode::Char('r') => self.spin.rotate(0.0, 0.0, -step),
            _ => {}
        }
    }

    fn update(&mut self) {
        // Continuous slow yaw for demo effect
        self.spin.rotate(0.0, self.config.auto_spin, 0.0);
    }

    /// Rasterize every scene object into the character buffer
    pub fn render_frame(&mut self) -> &AsciiRenderer {
        self.renderer.clear();
        let outer = self.spin.instructions();
        for renderable in self.scene.renderables(&outer) {
            trace!("Drawing '{}'", renderable.name);
            self.renderer
                .render_mesh(renderable.mesh, &renderable.model, &self.camera);
        }
        &self.renderer
    }

    fn render(&mut self) -> io::Result<()> {
        self.render_frame();

        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;

        self.renderer.draw(&mut stdout)?;

        // Draw UI overlay
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "MeshScene Terminal | FPS: {:.1} | Controls: WASD/Arrows=Spin E/R=Roll Q=Quit",
                self.fps
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_description_loads() {
        let scene = AppConfig::default().load_scene().unwrap();
        assert_eq!(scene.objects().len(), 10);
        assert!(scene.camera().is_some());
    }

    #[test]
    fn test_config_from_args() {
        let args = ["--fps", "60", "--step", "15", "--spin", "0", "scene.txt"].map(String::from);
        let config = AppConfig::from_args(args).unwrap();
        assert_eq!(config.target_fps, 60);
        assert_eq!(config.spin_step, 15.0);
        assert_eq!(config.auto_spin, 0.0);
        assert_eq!(config.description_path, Some(PathBuf::from("scene.txt")));

        assert!(AppConfig::from_args(["--fps".to_string()]).is_err());
        assert!(AppConfig::from_args(["--step", "fast"].map(String::from)).is_err());
        assert!(AppConfig::from_args(["--bogus".to_string()]).is_err());
        assert_eq!(AppConfig::from_args(Vec::new()).unwrap(), AppConfig::default());
    }

    #[test]
    fn test_spin_wraps() {
        let mut spin = Spin::default();
        spin.rotate(350.0, 0.0, 0.0);
        spin.rotate(20.0, 0.0, 0.0);
        assert!((spin.x - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_render_frame_draws_demo_scene() {
        let scene = AppConfig::default().load_scene().unwrap();
        let mut app = TerminalApp::with_size(scene, AppConfig::default(), 80, 40);
        let renderer = app.render_frame();
        let lit = (0..renderer.height())
            .flat_map(|y| (0..renderer.width()).map(move |x| (x, y)))
            .filter(|&(x, y)| renderer.cell(x, y) != ' ')
            .count();
        assert!(lit > 0);
    }
}

use std::path::PathBuf;
use std::sync::Arc;

use glam::Vec2;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use textswarm::{FloaterField, PointerState, Renderer, Swarm, SwarmConfig, ThemeTable};

const BASE_WIDTH: f32 = 1400.0;
const BASE_HEIGHT: f32 = 650.0;

const DEFAULT_WORDS: &[&str] = &["RUST", "PARTICLES", "IN", "MOTION", "SCARLET"];

struct App {
    renderer: Option<Renderer>,
    swarm: Option<Swarm>,
    floaters: Option<FloaterField>,
    window: Option<Arc<Window>>,
    pointer: PointerState,
    words: Vec<String>,
    theme: Option<ThemeTable>,
    config: SwarmConfig,
}

impl App {
    fn new(words: Vec<String>, theme: ThemeTable, config: SwarmConfig) -> Self {
        Self {
            renderer: None,
            swarm: None,
            floaters: None,
            window: None,
            pointer: PointerState::default(),
            words,
            theme: Some(theme),
            config,
        }
    }

    fn tick(&mut self) {
        let (Some(renderer), Some(swarm), Some(floaters)) =
            (&mut self.renderer, &mut self.swarm, &mut self.floaters)
        else {
            return;
        };

        swarm.advance();
        floaters.update();

        let mut floater_instances = Vec::with_capacity(floaters.len());
        floaters.emit_instances(&mut floater_instances);

        match renderer.render(&floater_instances, swarm.instances()) {
            Ok(_) => {}
            Err(wgpu::SurfaceError::Lost) => {
                let size = renderer.size();
                let view = swarm.viewport();
                renderer.resize(size, [view.x, view.y]);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => panic!("Out of memory!"),
            Err(e) => log::error!("render error: {e:?}"),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attributes = Window::default_attributes()
            .with_title("textswarm")
            .with_inner_size(winit::dpi::LogicalSize::new(BASE_WIDTH, BASE_HEIGHT));

        let window = Arc::new(event_loop.create_window(window_attributes).unwrap());
        self.window = Some(window.clone());

        let viewport = {
            let size = window.inner_size().to_logical::<f32>(window.scale_factor());
            Vec2::new(size.width.max(1.0), size.height.max(1.0))
        };

        // Initialize renderer asynchronously
        let renderer = pollster::block_on(Renderer::new(window.clone(), [viewport.x, viewport.y]));
        self.renderer = Some(renderer);

        let theme = self.theme.take().unwrap_or_default();
        self.swarm = Some(Swarm::new(
            self.words.clone(),
            theme,
            self.config.clone(),
            viewport,
        ));
        self.floaters = Some(FloaterField::new(
            self.config.floater_count,
            viewport,
            &mut rand::thread_rng(),
        ));
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => {
                event_loop.exit();
            }

            WindowEvent::Resized(physical_size) => {
                let Some(window) = &self.window else { return };
                let logical = physical_size.to_logical::<f32>(window.scale_factor());
                let viewport = Vec2::new(logical.width.max(1.0), logical.height.max(1.0));

                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(physical_size, [viewport.x, viewport.y]);
                }
                if let Some(swarm) = &mut self.swarm {
                    swarm.resize(viewport);
                }
                if let Some(floaters) = &mut self.floaters {
                    floaters.set_bounds(viewport);
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                let Some(window) = &self.window else { return };
                let logical = position.to_logical::<f32>(window.scale_factor());
                self.pointer.pos = Vec2::new(logical.x, logical.y);
                if let Some(swarm) = &mut self.swarm {
                    swarm.set_pointer(self.pointer);
                }
            }

            WindowEvent::MouseInput { state, button, .. } => {
                if state.is_pressed() {
                    self.pointer.pressed = true;
                    self.pointer.secondary = button == MouseButton::Right;
                } else {
                    self.pointer.pressed = false;
                    self.pointer.secondary = false;
                }
                if let Some(swarm) = &mut self.swarm {
                    swarm.set_pointer(self.pointer);
                }
            }

            WindowEvent::RedrawRequested => {
                self.tick();
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() {
    env_logger::init();

    let mut theme_path: Option<PathBuf> = None;
    let mut words: Vec<String> = Vec::new();

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--theme" {
            match args.next() {
                Some(path) => theme_path = Some(PathBuf::from(path)),
                None => {
                    eprintln!("--theme needs a file path");
                    std::process::exit(1);
                }
            }
        } else {
            words.push(arg);
        }
    }

    if words.is_empty() {
        words = DEFAULT_WORDS.iter().map(|w| w.to_string()).collect();
    }

    let theme = match theme_path {
        Some(path) => ThemeTable::load(&path),
        None => ThemeTable::default(),
    };

    println!("textswarm: cycling {} words, right-drag to scatter", words.len());

    let event_loop = EventLoop::new().unwrap();
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(words, theme, SwarmConfig::default());
    event_loop.run_app(&mut app).unwrap();
}

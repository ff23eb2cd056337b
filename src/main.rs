//! Confetti - drifting neon shapes, particle bursts and a sing-along
//!
//! Left/Right navigate (click + burst), P pauses auto-advance, Space/Enter
//! start the song, Up/Down change its speed. With `--record` the scene runs
//! headlessly instead.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use glam::UVec2;
use log::{error, info, warn};
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use confetti::audio::AudioOutput;
use confetti::cli::Args;
use confetti::lyrics::{LyricSheet, LyricView};
use confetti::params::{RenderConfig, ToneParams};
use confetti::recording;
use confetti::rendering::RenderSystem;
use confetti::scene::Scene;
use confetti::sequencer::happy_birthday;

/// Main application state
struct App {
    // Window and rendering
    window: Option<Arc<Window>>,
    render_system: Option<RenderSystem>,

    // Simulation
    scene: Scene,
    audio: AudioOutput,
    lyrics: LyricView,

    // Configuration
    render_config: RenderConfig,

    // Time tracking
    last_frame: Instant,
}

impl App {
    fn new(args: &Args) -> anyhow::Result<Self> {
        let scene = Scene::new(args.scene_config(), happy_birthday());
        let lyrics = LyricView::new(LyricSheet::from_sequencer(scene.sequencer()));
        let audio = AudioOutput::new(ToneParams::default())?;

        Ok(Self {
            window: None,
            render_system: None,
            scene,
            audio,
            lyrics,
            render_config: args.render_config(),
            last_frame: Instant::now(),
        })
    }

    fn handle_key(&mut self, key: KeyCode, event_loop: &winit::event_loop::ActiveEventLoop) {
        match key {
            KeyCode::Escape => event_loop.exit(),
            KeyCode::ArrowLeft | KeyCode::ArrowRight => self.scene.navigate(&mut self.audio),
            KeyCode::KeyP => {
                let paused = self.scene.toggle_auto_advance();
                info!("Auto-advance {}", if paused { "paused" } else { "resumed" });
            }
            KeyCode::Space | KeyCode::Enter => {
                if !self.scene.start_singalong(&mut self.audio) {
                    info!("Sing-along already running or unavailable");
                }
            }
            KeyCode::ArrowUp => {
                let speed = self.scene.nudge_speed(1);
                info!("Speed: {:.2}x", speed);
            }
            KeyCode::ArrowDown => {
                let speed = self.scene.nudge_speed(-1);
                info!("Speed: {:.2}x", speed);
            }
            _ => {}
        }
    }

    /// Render a single frame
    fn render_frame(&mut self) {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        let transitions = self.scene.step(dt, &mut self.audio);
        for line in self.lyrics.observe(&transitions) {
            println!("{line}");
        }

        let Some(render_system) = self.render_system.as_mut() else {
            return;
        };
        if let Err(e) = render_system.present(self.scene.compose()) {
            warn!("Skipping frame: {e}");
        }
    }
}

impl ApplicationHandler for App {
    fn about_to_wait(&mut self, _event_loop: &winit::event_loop::ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn resumed(&mut self, event_loop: &winit::event_loop::ActiveEventLoop) {
        if self.window.is_some() {
            return; // Already initialized
        }

        let window_attributes = Window::default_attributes()
            .with_title("Confetti")
            .with_inner_size(winit::dpi::PhysicalSize::new(
                self.render_config.width_px,
                self.render_config.height_px,
            ));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        self.scene.resize(UVec2::new(size.width, size.height));

        match pollster::block_on(RenderSystem::new(Arc::clone(&window))) {
            Ok(render_system) => self.render_system = Some(render_system),
            Err(e) => {
                error!("Failed to initialize rendering: {e}");
                event_loop.exit();
                return;
            }
        }

        println!("\nConfetti is running!");
        println!("Left/Right: navigate  P: pause auto  Space/Enter: sing  Up/Down: speed  ESC: quit\n");

        self.last_frame = Instant::now();
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &winit::event_loop::ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(key),
                        repeat: false,
                        ..
                    },
                ..
            } => self.handle_key(key, event_loop),
            WindowEvent::Resized(size) => {
                self.scene.resize(UVec2::new(size.width, size.height));
                if let Some(render_system) = self.render_system.as_mut() {
                    render_system.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => self.render_frame(),
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &winit::event_loop::ActiveEventLoop) {
        self.scene.shutdown(&mut self.audio);
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    if let Some(config) = args.recording_config() {
        let mut scene = Scene::new(args.scene_config(), happy_birthday());
        let view = LyricView::new(LyricSheet::from_sequencer(scene.sequencer()));
        let summary = recording::record(&config, &mut scene, ToneParams::default(), &view)
            .context("recording failed")?;
        println!(
            "Recorded {} frames ({} navigations) to {}",
            summary.frames,
            summary.navigations,
            config.output_dir.display()
        );
        return Ok(());
    }

    let mut app = App::new(&args)?;
    let event_loop = EventLoop::new()?;
    event_loop.run_app(&mut app)?;
    Ok(())
}

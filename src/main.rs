use std::num::NonZeroU32;
use std::rc::Rc;
use std::time::Instant;

use anyhow::Result;
use glam::Vec2;
use log::{LevelFilter, debug, error, info};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use raycast2d::config::Config;
use raycast2d::renderer::FrameBuffer;
use raycast2d::world::World;

struct App {
    window: Option<Rc<Window>>,
    surface: Option<softbuffer::Surface<Rc<Window>, Rc<Window>>>,
    world: World,
    canvas: FrameBuffer,

    // HUD
    frame_counter: u32,
    last_fps_print: Instant,

    // Last known cursor position, in canvas pixels
    pointer: Vec2,
}

impl App {
    fn new(config: &Config) -> Result<Self> {
        let world = World::new(config)?;

        Ok(Self {
            window: None,
            surface: None,
            world,
            canvas: FrameBuffer::new(config.width as usize, config.height as usize),

            frame_counter: 0,
            last_fps_print: Instant::now(),

            pointer: config.emitter_position,
        })
    }

    fn redraw(&mut self, id: WindowId) {
        self.world.update(self.pointer);

        let (window, surface) = match (&self.window, &mut self.surface) {
            (Some(w), Some(s)) if w.id() == id => (w, s),
            _ => return,
        };

        let size = window.inner_size();
        let width = NonZeroU32::new(size.width);
        let height = NonZeroU32::new(size.height);
        let (Some(dw), Some(dh)) = (width, height) else {
            return; // Minimized window, skip drawing
        };

        if let Err(err) = surface.resize(dw, dh) {
            error!("Failed to resize surface ({})", err);
            return;
        }

        self.world.render(&mut self.canvas);

        let mut buf = match surface.buffer_mut() {
            Ok(buf) => buf,
            Err(err) => {
                error!("Failed to acquire surface buffer ({})", err);
                return;
            }
        };
        self.canvas.present(&mut buf, dw.get() as usize, dh.get() as usize);
        if let Err(err) = buf.present() {
            error!("Failed to present frame ({})", err);
        }

        self.frame_counter += 1;
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_fps_print).as_secs_f32();
        if elapsed >= 1.0 {
            debug!("FPS: {:.1}", self.frame_counter as f32 / elapsed);
            self.frame_counter = 0;
            self.last_fps_print = now;
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        // Physical pixels, so cursor positions map 1:1 onto the canvas
        let size = PhysicalSize::new(self.canvas.width() as u32, self.canvas.height() as u32);
        let attributes = Window::default_attributes()
            .with_title("2D Raycasting")
            .with_inner_size(size)
            .with_resizable(false);

        let window = match event_loop.create_window(attributes) {
            Ok(window) => Rc::new(window),
            Err(err) => {
                error!("Failed to create window ({})", err);
                event_loop.exit();
                return;
            }
        };

        let surface = softbuffer::Context::new(window.clone())
            .and_then(|context| softbuffer::Surface::new(&context, window.clone()));
        let surface = match surface {
            Ok(surface) => surface,
            Err(err) => {
                error!("Failed to create softbuffer surface ({})", err);
                event_loop.exit();
                return;
            }
        };

        window.request_redraw();
        self.surface = Some(surface);
        self.window = Some(window);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                info!("The close button was pressed; stopping");
                event_loop.exit();
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.pointer = Vec2::new(position.x as f32, position.y as f32);
                self.world.drag(self.pointer);
            }

            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => match state {
                ElementState::Pressed => {
                    self.world.press(self.pointer);
                }
                ElementState::Released => self.world.release(),
            },

            WindowEvent::RedrawRequested => {
                self.redraw(id);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            _ => (),
        }
    }
}

fn main() -> Result<()> {
    simple_logger::SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .env()
        .init()?;

    let config = Config::from_env()?;
    info!(
        "Canvas {}x{}, fov {} deg, step {} deg, {} obstacles",
        config.width,
        config.height,
        config.fan.fov,
        config.fan.step,
        config.segments.len()
    );

    let mut app = App::new(&config)?;

    // Redraws are requested back to back, so Wait still renders continuously
    // while idling between input events.
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);
    event_loop.run_app(&mut app)?;

    Ok(())
}

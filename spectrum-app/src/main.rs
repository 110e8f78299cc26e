#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod bitmap_font;

use std::num::NonZeroU32;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{Key as WinitKey, NamedKey};
use winit::window::{Window, WindowAttributes, WindowId};

use bitmap_font::BitmapFont;
use spectrum_capture::DeviceEnumerator;
use spectrum_core::{Key, PipelineState, RowOrder, Surface, VisualizerConfiguration};

type FrameSurface = softbuffer::Surface<Arc<Window>, Arc<Window>>;

struct App {
    pipeline: PipelineState,
    font: BitmapFont,
    window: Option<Arc<Window>>,
    surface: Option<FrameSurface>,
    size: (u32, u32),
    failure: Option<anyhow::Error>,
}

impl App {
    fn new(pipeline: PipelineState) -> Self {
        Self {
            pipeline,
            font: BitmapFont::new(),
            window: None,
            surface: None,
            size: (0, 0),
            failure: None,
        }
    }

    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = WindowAttributes::default()
            .with_title("Spectrum")
            .with_inner_size(LogicalSize::new(1280, 720));
        let window = Arc::new(event_loop.create_window(attrs).context("failed to create window")?);

        let context = softbuffer::Context::new(Arc::clone(&window))
            .map_err(|e| anyhow!("failed to create display context: {e}"))?;
        let surface = softbuffer::Surface::new(&context, Arc::clone(&window))
            .map_err(|e| anyhow!("failed to create window surface: {e}"))?;

        self.surface = Some(surface);
        self.resize(window.inner_size())?;
        self.window = Some(window);
        Ok(())
    }

    fn resize(&mut self, size: PhysicalSize<u32>) -> Result<()> {
        let (Some(width), Some(height)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height)) else {
            self.size = (0, 0);
            return Ok(());
        };
        if let Some(surface) = self.surface.as_mut() {
            surface
                .resize(width, height)
                .map_err(|e| anyhow!("failed to resize window surface: {e}"))?;
        }
        // A failed resize keeps the old buffers; the frame renders truncated.
        if let Err(e) = self.pipeline.on_resize(width.get() as usize, height.get() as usize) {
            log::warn!("Visualizer kept previous frame size: {e}");
        }
        self.size = (width.get(), height.get());
        Ok(())
    }

    fn pointer_moved(&mut self, position: PhysicalPosition<f64>) {
        let (width, height) = self.size;
        let inside = position.x >= 0.0
            && position.y >= 0.0
            && position.x < width as f64
            && position.y < height as f64;
        let pointer = inside.then(|| (position.x as u32, height - 1 - position.y as u32));
        self.pipeline.on_pointer(pointer);
    }

    fn redraw(&mut self) -> Result<()> {
        let report = self.pipeline.tick();
        log::trace!(
            "tick: {} transformed, {} skipped",
            report.transformed_count(),
            report.skipped_count()
        );

        let (width, height) = self.size;
        let Some(surface) = self.surface.as_mut() else {
            return Ok(());
        };
        if width == 0 || height == 0 {
            return Ok(());
        }

        let mut buffer = surface
            .buffer_mut()
            .map_err(|e| anyhow!("failed to map window buffer: {e}"))?;
        {
            let mut frame = Surface::packed(&mut buffer, width, height, RowOrder::TopDown)?;
            self.pipeline.render(&mut frame, &mut self.font);
        }
        buffer
            .present()
            .map_err(|e| anyhow!("failed to present frame: {e}"))?;
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{error:#}");
        self.failure = Some(error);
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.create_window(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Err(e) = self.resize(size) {
                    self.fail(event_loop, e);
                }
            }
            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed => {
                if let Some(key) = map_key(&event.logical_key) {
                    self.pipeline.on_key(key);
                }
            }
            WindowEvent::CursorMoved { position, .. } => self.pointer_moved(position),
            WindowEvent::CursorLeft { .. } => self.pipeline.on_pointer(None),
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.redraw() {
                    self.fail(event_loop, e);
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

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.pipeline.shutdown();
    }
}

fn map_key(key: &WinitKey) -> Option<Key> {
    match key {
        WinitKey::Named(NamedKey::ArrowUp) => Some(Key::Up),
        WinitKey::Named(NamedKey::ArrowDown) => Some(Key::Down),
        WinitKey::Named(NamedKey::ArrowLeft) => Some(Key::Left),
        WinitKey::Named(NamedKey::ArrowRight) => Some(Key::Right),
        WinitKey::Character(text) => text.chars().next().map(Key::Character),
        _ => None,
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let config = VisualizerConfiguration::default();
    config
        .validate()
        .map_err(anyhow::Error::msg)
        .context("invalid visualizer configuration")?;
    log::info!("Configuration: {}", serde_json::to_string(&config)?);

    let enumerator = DeviceEnumerator::new();
    for device in enumerator.list_capture_devices(config.sample_rate)? {
        log::debug!(
            "Input device: {} (default: {}, {} Hz: {})",
            device.name,
            device.is_default,
            config.sample_rate,
            device.supports_rate
        );
    }
    let streams = enumerator
        .open_capture_devices(&config)
        .context("failed to open capture devices")?;

    let mut pipeline = PipelineState::new(config, streams).context("failed to build pipeline")?;
    pipeline.start().context("failed to start capture")?;

    let event_loop = EventLoop::new().context("failed to create event loop")?;
    let mut app = App::new(pipeline);
    event_loop.run_app(&mut app).context("event loop failed")?;

    match app.failure.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

use ouroboros::self_referencing;
use thiserror::Error;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::core::{App as CoreApp, AppControl, FrameCtx, WindowCtx};
use crate::device::{Gpu, GpuInit};
use crate::time::FrameClock;

/// When the runtime asks the window for a new frame.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum RedrawMode {
    /// A frame is requested every time the event loop goes idle.
    Continuous,

    /// Frames are drawn only when the window system asks (expose, resize).
    #[default]
    OnDemand,
}

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    pub redraw: RedrawMode,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "LessTriangle".to_string(),
            initial_size: LogicalSize::new(1024.0, 768.0),
            redraw: RedrawMode::default(),
        }
    }
}

/// Failures that stop the runtime before or while the loop runs.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("event loop failed")]
    EventLoop(#[source] winit::error::EventLoopError),

    #[error("failed to create window")]
    Window(#[source] winit::error::OsError),

    #[error("GPU initialization failed: {0:#}")]
    Gpu(anyhow::Error),

    #[error("surface became unusable while rendering")]
    SurfaceLost,

    #[error("application stopped after a fatal error")]
    App,
}

/// Render loop state.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum LoopState {
    #[default]
    Running,
    Terminating,
}

/// Inputs that can end the loop.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LoopSignal {
    EscapePressed,
    CloseRequested,
    AppExit,
    Fatal,
}

impl LoopState {
    /// Every signal ends the loop; termination is final.
    pub fn on_signal(self, signal: LoopSignal) -> Self {
        log::debug!("loop signal {signal:?} while {self:?}");
        LoopState::Terminating
    }

    pub fn is_running(self) -> bool {
        self == LoopState::Running
    }
}

/// Maps a window event to the loop signal it carries, if any.
pub fn loop_signal(event: &WindowEvent) -> Option<LoopSignal> {
    match event {
        WindowEvent::CloseRequested => Some(LoopSignal::CloseRequested),
        WindowEvent::KeyboardInput { event, .. }
            if is_escape_press(event.physical_key, event.state) =>
        {
            Some(LoopSignal::EscapePressed)
        }
        _ => None,
    }
}

/// Maps an app directive to the loop signal it carries, if any.
pub fn control_signal(control: AppControl) -> Option<LoopSignal> {
    match control {
        AppControl::Continue => None,
        AppControl::Exit => Some(LoopSignal::AppExit),
        AppControl::Fatal => Some(LoopSignal::Fatal),
    }
}

fn is_escape_press(key: PhysicalKey, state: ElementState) -> bool {
    key == PhysicalKey::Code(KeyCode::Escape) && state == ElementState::Pressed
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens the window, brings up the GPU, and drives `app` until the loop
    /// leaves [`LoopState::Running`].
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<(), RuntimeError>
    where
        A: 'static + CoreApp,
    {
        let event_loop = EventLoop::new().map_err(RuntimeError::EventLoop)?;
        let mut state = AppState::new(config, gpu_init, app);

        event_loop
            .run_app(&mut state)
            .map_err(RuntimeError::EventLoop)?;

        match state.error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    clock: FrameClock,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct AppState<A>
where
    A: CoreApp + 'static,
{
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,

    entry: Option<WindowEntry>,
    state: LoopState,
    error: Option<RuntimeError>,
}

impl<A> AppState<A>
where
    A: CoreApp + 'static,
{
    fn new(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Self {
        Self {
            config,
            gpu_init,
            app,
            entry: None,
            state: LoopState::Running,
            error: None,
        }
    }

    fn terminate(&mut self, event_loop: &ActiveEventLoop, signal: LoopSignal) {
        self.state = self.state.on_signal(signal);
        // Window and surface go away together; the GPU borrows the window.
        self.entry = None;
        event_loop.exit();
    }

    fn create_window_entry(&mut self, event_loop: &ActiveEventLoop) -> Result<WindowEntry, RuntimeError> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .map_err(RuntimeError::Window)?;

        let gpu_init = self.gpu_init.clone();

        WindowEntryTryBuilder {
            clock: FrameClock::default(),
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
        .map_err(RuntimeError::Gpu)
    }
}

impl<A> ApplicationHandler for AppState<A>
where
    A: CoreApp + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() || !self.state.is_running() {
            return;
        }

        match self.create_window_entry(event_loop) {
            Ok(entry) => {
                entry.with_window(|w| {
                    log::info!("window {:?} opened at {:?}", w.id(), w.inner_size());
                    w.request_redraw();
                });
                self.entry = Some(entry);
            }
            Err(e) => {
                log::error!("{e}");
                self.error = Some(e);
                self.terminate(event_loop, LoopSignal::Fatal);
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if !self.state.is_running() {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        if self.config.redraw == RedrawMode::Continuous {
            if let Some(entry) = &self.entry {
                entry.with_window(|w| w.request_redraw());
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if !self.state.is_running() {
            event_loop.exit();
            return;
        }

        if let Some(signal) = control_signal(self.app.on_window_event(&event)) {
            if signal == LoopSignal::Fatal {
                self.error.get_or_insert(RuntimeError::App);
            }
            self.terminate(event_loop, signal);
            return;
        }

        if let Some(signal) = loop_signal(&event) {
            self.terminate(event_loop, signal);
            return;
        }

        // Split borrows to avoid `self` capture inside `ouroboros` closures.
        let (app, entry) = (&mut self.app, &mut self.entry);
        let Some(entry) = entry.as_mut() else { return };

        let mut app_control = AppControl::Continue;

        match &event {
            WindowEvent::Resized(new_size) => {
                entry.with_gpu_mut(|gpu| gpu.resize(*new_size));
                entry.with_window(|w| w.request_redraw());
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                let new_size = entry.with_window(|w| w.inner_size());
                entry.with_gpu_mut(|gpu| gpu.resize(new_size));
                entry.with_window(|w| w.request_redraw());
            }

            WindowEvent::RedrawRequested => {
                entry.with_mut(|fields| {
                    let mut ctx = FrameCtx {
                        window: WindowCtx {
                            id: window_id,
                            window: fields.window,
                        },
                        gpu: fields.gpu,
                        time: fields.clock.tick(),
                    };

                    app_control = app.on_frame(&mut ctx);
                });
            }

            _ => {}
        }

        if let Some(signal) = control_signal(app_control) {
            if signal == LoopSignal::Fatal {
                // Frame-time failures come from the surface.
                self.error.get_or_insert(RuntimeError::SurfaceLost);
            }
            self.terminate(event_loop, signal);
        }
    }
}

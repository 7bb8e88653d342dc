use winit::dpi::PhysicalSize;

use lesstriangle_engine::core::{App, AppControl, FrameCtx};
use lesstriangle_engine::render::ProgramRenderer;
use lesstriangle_engine::shader::ShaderProgram;
use lesstriangle_engine::time::FrameTime;
use lesstriangle_engine::uniform::{scaled_resolution, FrameState};

use crate::config::{DemoConfig, Lighting, RenderMode};

/// Draws the full-screen quad through the assembled program every frame.
pub struct ShaderDemo {
    renderer: ProgramRenderer,
    render_mode: RenderMode,
    lighting: Lighting,
    divisor: u32,
}

impl ShaderDemo {
    pub fn new(program: &ShaderProgram, config: &DemoConfig) -> Self {
        if !program.linked() {
            log::warn!("shader program did not link; frames stay black");
        }

        Self {
            renderer: ProgramRenderer::new(program),
            render_mode: config.render_mode,
            lighting: config.lighting,
            divisor: config.divisor,
        }
    }

    /// Uniform inputs for a frame drawn at `size` with timing `time`.
    pub fn frame_state(&self, size: PhysicalSize<u32>, time: &FrameTime) -> FrameState {
        FrameState {
            elapsed_time: match self.render_mode {
                RenderMode::Dynamic => time.elapsed,
                RenderMode::Static => 0.0,
            },
            resolution: scaled_resolution(size.width, size.height, self.divisor),
            night_mode: self.lighting.is_night(),
        }
    }
}

impl App for ShaderDemo {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let state = self.frame_state(ctx.gpu.size(), &ctx.time);

        if ctx.time.frame_index == 0 {
            log::debug!("first frame: {state:?}");
        }

        let renderer = &mut self.renderer;
        ctx.render(wgpu::Color::BLACK, |rctx, target| {
            renderer.render(rctx, target, &state);
        })
    }
}

use anyhow::{Context, Result};
use winit::dpi::LogicalSize;
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{Key, NamedKey};

use cubestage_engine::core::{App, AppControl, FrameCtx, StartCtx};
use cubestage_engine::device::GpuInit;
use cubestage_engine::driver::Renderer;
use cubestage_engine::logging::{init_logging, LoggingConfig};
use cubestage_engine::stage::Stage;
use cubestage_engine::window::{Runtime, RuntimeConfig};

/// Hosts one stage's renderer inside the window runtime.
struct StageApp {
    stage: Stage,
    renderer: Option<Renderer>,
}

impl App for StageApp {
    fn on_start(&mut self, ctx: &mut StartCtx<'_, '_>) -> Result<()> {
        let canvas = ctx.backend.canvas_size();
        let renderer = Renderer::new(&mut *ctx.backend, self.stage, canvas)
            .with_context(|| format!("failed to set up stage `{}`", self.stage))?;
        self.renderer = Some(renderer);
        Ok(())
    }

    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        match event {
            WindowEvent::KeyboardInput { event, .. }
                if event.state == ElementState::Pressed
                    && event.logical_key == Key::Named(NamedKey::Escape) =>
            {
                AppControl::Exit
            }
            _ => AppControl::Continue,
        }
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> Result<AppControl> {
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.tick(&mut *ctx.backend)?;
        }
        Ok(AppControl::Continue)
    }
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let stage = match std::env::args().nth(1) {
        Some(arg) => arg.parse::<Stage>()?,
        None => Stage::default(),
    };
    log::info!("starting stage `{stage}`");

    let config = RuntimeConfig {
        title: stage.title().to_string(),
        initial_size: LogicalSize::new(800.0, 600.0),
    };

    Runtime::run(
        config,
        GpuInit::default(),
        StageApp {
            stage,
            renderer: None,
        },
    )
}

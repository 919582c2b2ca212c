//! Example: Render a short sequence of wavy text frames to PNG files.
//!
//! Run with:
//!     cargo run --example render_frames -- [config.json] [output_dir] [frames]
//!
//! Without a config file the defaults are used, which expect the font at
//! `assets/fonts/BebasNeue-Regular.ttf` and the noise texture at
//! `assets/img/noise.png`.

use std::path::PathBuf;

use anyhow::Context;
use wavy_text::frame_loop::{CancellationToken, FixedStepClock, FrameLoop, FrameTarget};
use wavy_text::{App, AppConfig, GpuError, SceneRenderer};

/// Writes every drawn frame to `<dir>/frame_NNNN.png`.
struct PngSequence {
    renderer: SceneRenderer,
    dir: PathBuf,
    written: u32,
}

#[derive(Debug, thiserror::Error)]
enum SinkError {
    #[error(transparent)]
    Gpu(#[from] GpuError),
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error("frame buffer does not match {0}x{1}")]
    Size(u32, u32),
}

impl FrameTarget for PngSequence {
    type Error = SinkError;

    fn draw_frame(&mut self, app: &App) -> Result<(), SinkError> {
        let pixels = self.renderer.render(app)?;
        let (width, height) = self.renderer.size();
        let frame = image::RgbaImage::from_raw(width, height, pixels)
            .ok_or(SinkError::Size(width, height))?;
        let path = self.dir.join(format!("frame_{:04}.png", self.written));
        frame.save(&path)?;
        log::debug!("Wrote {}", path.display());
        self.written += 1;
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.renderer.resize(width, height);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => AppConfig::from_json_file(&path).with_context(|| format!("loading {}", path))?,
        None => AppConfig::default(),
    };
    let dir = PathBuf::from(args.next().unwrap_or_else(|| "frames".to_string()));
    let frames: u64 = match args.next() {
        Some(n) => n.parse().context("frame count")?,
        None => 60,
    };
    std::fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;

    let mut app = App::load(&config).await.context("loading assets")?;
    let renderer = SceneRenderer::new(config.width, config.height)
        .await
        .context("creating GPU renderer")?;
    log::info!("Rendering on {}", renderer.adapter_info().name);

    let mut sink = PngSequence {
        renderer,
        dir: dir.clone(),
        written: 0,
    };
    let mut frame_loop =
        FrameLoop::new(FixedStepClock::at_fps(30), CancellationToken::new()).with_frame_limit(frames);
    let drawn = frame_loop.run(&mut app, &mut sink)?;

    log::info!("Wrote {} frames to {}", drawn, dir.display());
    Ok(())
}

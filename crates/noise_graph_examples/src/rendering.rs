use std::path::Path;

use anyhow::{ensure, Context};
use image::{ImageBuffer, Luma, Rgb};
use noise_graph::prelude::NoiseBuffer;
use tracing::info;

/// Installs a `fmt` subscriber honoring `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();
}

/// How normalized samples are turned into pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Palette {
    #[default]
    Grayscale,
    /// Water below 0.4, sand, grass, rock, snow above 0.85.
    Terrain,
}

impl Palette {
    fn color(self, t: f32) -> [u8; 3] {
        let t = t.clamp(0.0, 1.0);
        match self {
            Palette::Grayscale => {
                let v = (t * 255.0).round() as u8;
                [v, v, v]
            }
            Palette::Terrain => match t {
                t if t < 0.4 => shade([20, 60, 140], [60, 120, 200], t / 0.4),
                t if t < 0.45 => [210, 200, 150],
                t if t < 0.7 => shade([50, 140, 60], [30, 100, 40], (t - 0.45) / 0.25),
                t if t < 0.85 => shade([110, 100, 90], [150, 140, 130], (t - 0.7) / 0.15),
                _ => [245, 245, 250],
            },
        }
    }
}

fn shade(a: [u8; 3], b: [u8; 3], t: f32) -> [u8; 3] {
    let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
    [mix(a[0], b[0]), mix(a[1], b[1]), mix(a[2], b[2])]
}

/// Writes a `width x height` sample buffer (x fastest) to `path` as a PNG.
///
/// Samples are normalized with the buffer's recorded range before coloring.
pub fn render_buffer_to_png<P: AsRef<Path>>(
    buffer: &NoiseBuffer,
    width: u32,
    height: u32,
    palette: Palette,
    path: P,
) -> anyhow::Result<()> {
    ensure!(
        buffer.len() == width as usize * height as usize,
        "buffer holds {} samples, expected {}x{}",
        buffer.len(),
        width,
        height
    );

    let normalized = buffer.normalized();
    let path = path.as_ref();

    match palette {
        Palette::Grayscale => {
            let img = ImageBuffer::from_fn(width, height, |x, y| {
                let t = normalized[(y * width + x) as usize];
                Luma([palette.color(t)[0]])
            });
            img.save(path)
        }
        Palette::Terrain => {
            let img = ImageBuffer::from_fn(width, height, |x, y| {
                let t = normalized[(y * width + x) as usize];
                Rgb(palette.color(t))
            });
            img.save(path)
        }
    }
    .with_context(|| format!("writing {}", path.display()))?;

    info!(
        "Wrote {} ({}x{}, range {:.3}..{:.3}).",
        path.display(),
        width,
        height,
        buffer.range.min,
        buffer.range.max
    );
    Ok(())
}

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use image::{imageops, GrayImage};
use tracing::{debug, info, warn};

use habit_render::Canvas;

use crate::config::DisplayConfig;

/// Clockwise quarter-turn applied to the frame before handoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    None,
    Cw90,
    Cw180,
    Cw270,
}

impl Rotation {
    pub fn from_degrees(degrees: u16) -> Option<Self> {
        match degrees {
            0 => Some(Rotation::None),
            90 => Some(Rotation::Cw90),
            180 => Some(Rotation::Cw180),
            270 => Some(Rotation::Cw270),
            _ => None,
        }
    }

    pub fn apply(self, image: &GrayImage) -> GrayImage {
        match self {
            Rotation::None => image.clone(),
            Rotation::Cw90 => imageops::rotate90(image),
            Rotation::Cw180 => imageops::rotate180(image),
            Rotation::Cw270 => imageops::rotate270(image),
        }
    }
}

/// Output seam for a rendered frame. Sinks own the lifecycle of whatever
/// they write to: a panel device node, a preview file, or test memory.
pub trait DisplaySink {
    fn init(&mut self) -> Result<()>;
    fn clear(&mut self) -> Result<()>;
    fn show(&mut self, canvas: &Canvas) -> Result<()>;
    fn sleep(&mut self) -> Result<()>;
    fn release(&mut self) -> Result<()>;
}

/// Packs frames to 1bpp and writes them to the panel device node.
pub struct PanelSink {
    device_path: PathBuf,
    rotation: Rotation,
}

impl PanelSink {
    pub fn new(device_path: PathBuf, rotation: Rotation) -> Self {
        Self {
            device_path,
            rotation,
        }
    }
}

impl DisplaySink for PanelSink {
    fn init(&mut self) -> Result<()> {
        info!(path = %self.device_path.display(), "initializing panel");
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        // An all-paper frame; panels flush residual charge on full white.
        let blank = Canvas::new();
        self.show(&blank)
    }

    fn show(&mut self, canvas: &Canvas) -> Result<()> {
        let frame = self.rotation.apply(&canvas.to_gray_image());
        let packed = pack_frame(&frame);
        fs::write(&self.device_path, packed)
            .with_context(|| format!("writing frame to {}", self.device_path.display()))?;
        debug!(rotation = ?self.rotation, "frame written to panel");
        Ok(())
    }

    fn sleep(&mut self) -> Result<()> {
        debug!("panel entering deep sleep");
        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        debug!("panel released");
        Ok(())
    }
}

/// Writes each frame as a PNG, for development without hardware attached.
pub struct PreviewSink {
    output: PathBuf,
    rotation: Rotation,
}

impl PreviewSink {
    pub fn new(output: PathBuf, rotation: Rotation) -> Self {
        Self { output, rotation }
    }
}

impl DisplaySink for PreviewSink {
    fn init(&mut self) -> Result<()> {
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        Ok(())
    }

    fn show(&mut self, canvas: &Canvas) -> Result<()> {
        let frame = self.rotation.apply(&canvas.to_gray_image());
        frame
            .save(&self.output)
            .with_context(|| format!("writing preview to {}", self.output.display()))?;
        info!(path = %self.output.display(), "preview written");
        Ok(())
    }

    fn sleep(&mut self) -> Result<()> {
        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Captures frames and lifecycle calls for tests.
#[derive(Default)]
pub struct MemorySink {
    pub frames: Vec<GrayImage>,
    pub initialized: bool,
    pub cleared: u32,
    pub asleep: bool,
    pub released: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DisplaySink for MemorySink {
    fn init(&mut self) -> Result<()> {
        self.initialized = true;
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.cleared += 1;
        Ok(())
    }

    fn show(&mut self, canvas: &Canvas) -> Result<()> {
        self.frames.push(canvas.to_gray_image());
        Ok(())
    }

    fn sleep(&mut self) -> Result<()> {
        self.asleep = true;
        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        self.released = true;
        Ok(())
    }
}

/// Pick a sink for the configured output: the panel when its device node
/// exists, otherwise a PNG preview.
pub fn detect(config: &DisplayConfig) -> Box<dyn DisplaySink> {
    let rotation = Rotation::from_degrees(config.rotation).unwrap_or(Rotation::None);
    match &config.device_path {
        Some(path) if path.exists() => {
            Box::new(PanelSink::new(path.clone(), rotation))
        }
        Some(path) => {
            warn!(path = %path.display(), "panel device not present, falling back to preview");
            Box::new(PreviewSink::new(config.output.clone(), rotation))
        }
        None => Box::new(PreviewSink::new(config.output.clone(), rotation)),
    }
}

/// MSB-first 1bpp packing, ink low. Rows are padded to a whole byte with
/// paper bits, matching the panel's expected framebuffer layout.
fn pack_frame(frame: &GrayImage) -> Vec<u8> {
    let width = frame.width() as usize;
    let height = frame.height() as usize;
    let stride = width.div_ceil(8);
    let mut packed = vec![0xff_u8; stride * height];
    for (x, y, pixel) in frame.enumerate_pixels() {
        if pixel.0[0] < 128 {
            let index = y as usize * stride + x as usize / 8;
            packed[index] &= !(0x80 >> (x % 8));
        }
    }
    packed
}

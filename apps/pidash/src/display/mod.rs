#[cfg(feature = "oled")]
mod oled;
mod terminal;

use crate::config::{Config, DisplayKind};
use anyhow::Result;
use pidash_render::Display;

#[cfg(feature = "oled")]
pub use oled::OledDisplay;
pub use terminal::TerminalDisplay;

/// Panel geometry the terminal preview mimics.
const PREVIEW_WIDTH: u32 = 128;
const PREVIEW_HEIGHT: u32 = 64;

pub fn open(config: &Config) -> Result<Box<dyn Display>> {
    match config.display {
        DisplayKind::Terminal => Ok(Box::new(TerminalDisplay::new(
            PREVIEW_WIDTH,
            PREVIEW_HEIGHT,
        )?)),
        DisplayKind::Oled => open_oled(config),
    }
}

#[cfg(feature = "oled")]
fn open_oled(config: &Config) -> Result<Box<dyn Display>> {
    Ok(Box::new(OledDisplay::open(
        &config.i2c_path(),
        config.i2c_address,
    )?))
}

#[cfg(not(feature = "oled"))]
fn open_oled(_config: &Config) -> Result<Box<dyn Display>> {
    anyhow::bail!("built without the `oled` feature; use --display terminal")
}

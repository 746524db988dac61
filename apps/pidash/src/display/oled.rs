use anyhow::{anyhow, Result};
use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::renderer::TextRenderer;
use embedded_graphics::text::{Baseline, Text};
use linux_embedded_hal::I2cdev;
use pidash_render::{Display, FontMetrics};
use ssd1306::mode::BufferedGraphicsMode;
use ssd1306::prelude::*;
use ssd1306::{I2CDisplayInterface, Ssd1306};
use tracing::info;

const WIDTH: u32 = 128;
const HEIGHT: u32 = 64;

type Device = Ssd1306<
    I2CInterface<I2cdev>,
    DisplaySize128x64,
    BufferedGraphicsMode<DisplaySize128x64>,
>;

pub struct OledFont {
    font: &'static MonoFont<'static>,
    style: MonoTextStyle<'static, BinaryColor>,
}

impl OledFont {
    fn new(font: &'static MonoFont<'static>) -> Self {
        Self {
            font,
            style: MonoTextStyle::new(font, BinaryColor::On),
        }
    }
}

impl FontMetrics for OledFont {
    fn bounding_box_width(&self, text: &str) -> Option<u32> {
        Some(
            self.style
                .measure_string(text, Point::zero(), Baseline::Top)
                .bounding_box
                .size
                .width,
        )
    }

    fn glyph_advance(&self) -> Option<u32> {
        Some(self.font.character_size.width + self.font.character_spacing)
    }

    fn cell_width(&self) -> Option<u32> {
        Some(self.font.character_size.width)
    }
}

/// SSD1306 128x64 panel on a Linux I2C bus.
pub struct OledDisplay {
    device: Device,
    font: OledFont,
}

impl OledDisplay {
    pub fn open(bus_path: &str, address: u8) -> Result<Self> {
        let i2c = I2cdev::new(bus_path)
            .map_err(|err| anyhow!("failed to open i2c bus {bus_path}: {err}"))?;
        let interface = I2CDisplayInterface::new_custom_address(i2c, address);

        let mut device = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
            .into_buffered_graphics_mode();
        device
            .init()
            .map_err(|err| anyhow!("ssd1306 at 0x{address:02x} did not initialise: {err:?}"))?;
        device.clear_buffer();
        device
            .flush()
            .map_err(|err| anyhow!("ssd1306 at 0x{address:02x} rejected first frame: {err:?}"))?;

        info!("oled display ready on {bus_path} at 0x{address:02x}");

        Ok(Self {
            device,
            font: OledFont::new(&FONT_6X10),
        })
    }
}

impl Display for OledDisplay {
    fn width(&self) -> u32 {
        WIDTH
    }

    fn height(&self) -> u32 {
        HEIGHT
    }

    fn metrics(&self) -> &dyn FontMetrics {
        &self.font
    }

    fn clear(&mut self) {
        self.device.clear_buffer();
    }

    fn draw_text(&mut self, x: i32, y: i32, text: &str) -> Result<()> {
        Text::with_baseline(text, Point::new(x, y), self.font.style, Baseline::Top)
            .draw(&mut self.device)
            .map(|_| ())
            .map_err(|err| anyhow!("failed to draw text: {err:?}"))
    }

    fn commit(&mut self) -> Result<()> {
        self.device
            .flush()
            .map_err(|err| anyhow!("failed to flush frame: {err:?}"))
    }
}

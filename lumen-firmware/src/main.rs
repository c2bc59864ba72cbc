//! Lumen Firmware
//!
//! Demo firmware for an STM32F103C8 (Blue Pill) driving a 128x64 SSD1306
//! panel on I2C1 (PB6=SCL, PB7=SDA) at 400 kHz.

#![no_std]
#![no_main]

mod splash;

#[cfg(feature = "defmt")]
use defmt::{error, info};
use embassy_executor::Spawner;
use embassy_stm32::time::Hertz;
use embassy_stm32::Config;
use embassy_time::{Delay, Timer};
#[cfg(feature = "defmt")]
use defmt_rtt as _;
use panic_probe as _;

use lumen_display::{
    DisplayConfig, DisplayError, FrameRate, HorizontalDirection, Page, Scroll, Ssd1306,
};
use lumen_hal_stm32f1::pac::{PacPlatform, PacRegisters};
use lumen_hal_stm32f1::{BusConfig, I2cController, I2cError};

/// System clock after PLL setup
const SYSCLK_HZ: u32 = 72_000_000;

/// Seconds each demo scene stays up
const SCENE_SECS: u64 = 3;

type Display = Ssd1306<I2cController<PacRegisters>>;

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    #[cfg(feature = "defmt")]
    info!("Lumen firmware starting...");

    let mut config = Config::default();
    {
        use embassy_stm32::rcc::*;
        config.rcc.hse = Some(Hse {
            freq: Hertz(8_000_000),
            mode: HseMode::Oscillator,
        });
        config.rcc.pll = Some(Pll {
            src: PllSource::HSE,
            prediv: PllPreDiv::DIV1,
            mul: PllMul::MUL9,
        });
        config.rcc.sys = Sysclk::PLL1_P;
        config.rcc.ahb_pre = AHBPrescaler::DIV1;
        config.rcc.apb1_pre = APBPrescaler::DIV2;
        config.rcc.apb2_pre = APBPrescaler::DIV1;
    }
    let _p = embassy_stm32::init(config);

    let bus_config = BusConfig::FAST;
    let mut platform = PacPlatform::new(SYSCLK_HZ);
    let i2c = match I2cController::init(
        PacRegisters::new(bus_config.instance),
        &mut platform,
        &bus_config,
    ) {
        Ok(i2c) => i2c,
        Err(_e) => {
            #[cfg(feature = "defmt")]
            error!("I2C init failed: {:?}", _e);
            halt().await
        }
    };

    let mut display = Ssd1306::new(i2c, DisplayConfig::default());
    if let Err(_e) = display.init(&mut Delay) {
        #[cfg(feature = "defmt")]
        error!("Failed to initialize display: {:?}", _e);
        halt().await
    }

    #[cfg(feature = "defmt")]
    info!("OLED initialized");

    loop {
        if let Err(_e) = run_scenes(&mut display).await {
            #[cfg(feature = "defmt")]
            error!("Display error: {:?}", _e);
            Timer::after_secs(1).await;
        }
    }
}

/// Cycle through the drawing demos once
async fn run_scenes(display: &mut Display) -> Result<(), DisplayError<I2cError>> {
    display.scroll(Scroll::None)?;
    display.draw_bitmap(&splash::SPLASH)?;
    Timer::after_secs(SCENE_SECS).await;

    display.clear()?;
    display.move_cursor(4, Page::Page0)?;
    display.draw_char("Lumen SSD1306")?;
    display.draw_rect(0, 12, 128, 52)?;
    display.draw_circle(32, 38, 20)?;
    display.draw_line(64, 18, 124, 58)?;
    display.draw_line(64, 58, 124, 18)?;
    Timer::after_secs(SCENE_SECS).await;

    display.scroll(Scroll::Horizontal {
        dir: HorizontalDirection::Right,
        rate: FrameRate::Frames5,
        start: Page::Page2,
        end: Page::Page7,
    })?;
    Timer::after_secs(SCENE_SECS).await;
    display.scroll(Scroll::None)?;

    display.display_invert(true)?;
    Timer::after_secs(1).await;
    display.display_invert(false)?;
    Ok(())
}

async fn halt() -> ! {
    loop {
        Timer::after_secs(60).await;
    }
}

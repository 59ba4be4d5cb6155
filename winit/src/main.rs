// Prevent console window in addition to Slint window in Windows release builds when, e.g., starting the app via file manager. Ignored on other platforms.
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

slint::include_modules!();

mod headless;

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use sensor_simulator_common::{
    DisplayError, DisplaySurface, SensorReading, SensorUpdater, SimulatorConfig,
};

/// The only element of the window that accepts text from the updater.
const TIMESTAMP_ELEMENT: &str = "timestamp";

#[derive(Parser, Debug)]
#[command(version, about = "Synthetic temperature and humidity readings on a fixed timer")]
struct Cli {
    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run without a window and print each tick to stdout
    #[arg(long)]
    headless: bool,

    /// Seed for reproducible readings
    #[arg(long)]
    seed: Option<u64>,

    /// Milliseconds between ticks
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Stop after this many ticks
    #[arg(long, requires = "headless", value_parser = clap::value_parser!(u64).range(1..))]
    ticks: Option<u64>,
}

impl Cli {
    /// Defaults, then the config file, then the environment, then the flags.
    fn simulator_config(&self) -> anyhow::Result<SimulatorConfig> {
        let mut config = match &self.config {
            Some(path) => SimulatorConfig::load(path)?,
            None => SimulatorConfig::default(),
        };
        config.apply_env().context("invalid environment override")?;

        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(interval_ms) = self.interval_ms {
            config.interval_ms = interval_ms;
        }
        config.validate()?;

        Ok(config)
    }
}

/// Display surface backed by the `ViewModel` of the window.
struct WindowDisplay {
    ui: slint::Weak<AppWindow>,
}

impl DisplaySurface for WindowDisplay {
    fn set_text(&mut self, element_id: &str, text: &str) -> Result<(), DisplayError> {
        let ui = self
            .ui
            .upgrade()
            .filter(|_| element_id == TIMESTAMP_ELEMENT)
            .ok_or_else(|| DisplayError::MissingTarget(element_id.to_string()))?;

        ui.global::<ViewModel>().set_timestamp(text.into());
        Ok(())
    }
}

/// Our App struct that holds the UI and the updater.
/// It also holds a timer that runs the updater every interval.
struct App {
    ui: AppWindow,
    updater: Rc<RefCell<SensorUpdater<WindowDisplay>>>,
    timer: slint::Timer,
    interval: Duration,
}

impl App {
    fn new(config: &SimulatorConfig) -> anyhow::Result<Self> {
        let ui = AppWindow::new()?;

        if config.target_id != TIMESTAMP_ELEMENT {
            log::warn!(
                "The window has no `{}` element, only `{TIMESTAMP_ELEMENT}`",
                config.target_id
            );
        }

        let display = WindowDisplay { ui: ui.as_weak() };
        let updater = Rc::new(RefCell::new(SensorUpdater::from_config(config, display)));

        Ok(Self {
            ui,
            updater,
            timer: slint::Timer::default(),
            interval: config.interval(),
        })
    }

    /// Run the updater once, start the timer and run the UI.
    fn run(&mut self) -> anyhow::Result<()> {
        // A repeated timer first fires after one interval.
        Self::tick(&mut self.updater.borrow_mut());

        let updater = self.updater.clone();
        self.timer.start(slint::TimerMode::Repeated, self.interval, move || {
            Self::tick(&mut updater.borrow_mut());
        });

        // Run the UI (and map an error to an anyhow::Error).
        self.ui.run().map_err(|e| e.into())
    }

    fn tick(updater: &mut SensorUpdater<WindowDisplay>) {
        if let Err(err) = updater.update() {
            log::error!("Update failed: {err}");
        }

        // The window reads the reading back from the store like any other consumer.
        let Some(reading) = updater.store().latest() else {
            return;
        };
        log::info!(
            "Temp: {:.1}°C, Humidity: {:.1}%",
            reading.temperature_celsius,
            reading.humidity_percent
        );

        if let Some(ui) = updater.display().ui.upgrade() {
            let model = ui.global::<ViewModel>();
            model.set_current(reading.into());
            model.set_have_data(true);
        }
    }
}

impl From<SensorReading> for SensorRecord {
    fn from(reading: SensorReading) -> Self {
        Self {
            temperature: slint::format!("{:.1}", reading.temperature_celsius),
            humidity: slint::format!("{:.1}", reading.humidity_percent),
        }
    }
}

fn main() -> anyhow::Result<()> {
    // A missing .env file is fine.
    dotenv::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    let config = cli.simulator_config()?;
    log::debug!("Running with {config:?}");

    if cli.headless {
        return headless::run(&config, cli.ticks);
    }

    let mut app = App::new(&config)?;
    app.run()
}

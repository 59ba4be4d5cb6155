use anyhow::Context;
use sensor_simulator_common::{
    Dashboard, InMemoryPage, SensorUpdater, SharedPage, SimulatorConfig, Ticker,
};
use tokio::sync::mpsc;

/// Runs the updater against an in-memory page until interrupted or `max_ticks` is reached.
pub fn run(config: &SimulatorConfig, max_ticks: Option<u64>) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start the tokio runtime")?;

    let ticks = runtime.block_on(drive(config, max_ticks))?;
    log::info!("Stopped after {ticks} ticks");
    Ok(())
}

/// Returns the number of ticks run before stopping.
async fn drive(config: &SimulatorConfig, max_ticks: Option<u64>) -> anyhow::Result<u64> {
    let page = SharedPage::new(InMemoryPage::new().with_element(config.target_id.clone()));
    let mut updater = SensorUpdater::from_config(config, page.clone());

    let (readings_tx, mut readings) = mpsc::unbounded_channel();
    let ticker = Ticker::start(config.interval(), move || {
        if let Err(err) = updater.update() {
            log::error!("Update failed: {err}");
        }
        if let Some(reading) = updater.store().latest() {
            let _ = readings_tx.send(reading);
        }
    })?;

    let mut dashboard = Dashboard::new();
    let mut received = 0;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        if max_ticks.is_some_and(|max| received >= max) {
            break;
        }

        tokio::select! {
            result = &mut ctrl_c => {
                result.context("failed to listen for ctrl-c")?;
                log::info!("Interrupted");
                break;
            }
            reading = readings.recv() => {
                let Some(reading) = reading else { break };
                received += 1;

                log::info!(
                    "Temp: {:.1}°C, Humidity: {:.1}%",
                    reading.temperature_celsius,
                    reading.humidity_percent
                );

                // Same hop the readings take to a dashboard, as a JSON body.
                dashboard.receive_json(&reading.to_payload()?, chrono::Local::now())?;
                for line in dashboard.render() {
                    log::debug!("Dashboard: {line}");
                }

                println!(
                    "Temperature: {:.1} °C | Humidity: {:.1} % | {}",
                    reading.temperature_celsius,
                    reading.humidity_percent,
                    page.text(&config.target_id).unwrap_or_default()
                );
            }
        }
    }

    Ok(ticker.stop().await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> SimulatorConfig {
        SimulatorConfig {
            seed: Some(11),
            ..SimulatorConfig::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stops_after_the_tick_limit() {
        assert_eq!(drive(&seeded(), Some(3)).await.unwrap(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_tick_limit_runs_nothing() {
        assert_eq!(drive(&seeded(), Some(0)).await.unwrap(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn runs_against_a_custom_target() {
        let config = SimulatorConfig {
            target_id: "status".to_string(),
            interval_ms: 250,
            ..seeded()
        };

        assert_eq!(drive(&config, Some(2)).await.unwrap(), 2);
    }
}

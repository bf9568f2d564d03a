use dispatch::{Config, CsvRunner};

#[tokio::main]
pub async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env()?;
    log::info!(
        "dispatching {} aircraft over {} with orders from {}",
        config.num_aircraft,
        config.hospitals_csv_path,
        config.orders_csv_path
    );

    let runner = CsvRunner::from_config(&config)?;
    let summary = runner.run_with_defaults().await?;

    log::info!(
        "{} flights launched, {} orders rejected, {} unfulfilled",
        summary.flights_launched,
        summary.orders_rejected,
        summary.orders_unfulfilled
    );

    Ok(())
}

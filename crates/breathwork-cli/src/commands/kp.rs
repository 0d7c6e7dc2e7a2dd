use breathwork_core::{Config, KpMeasurement};
use clap::Subcommand;

#[derive(Subcommand)]
pub enum KpAction {
    /// Average a set of breath-hold durations
    Average {
        /// Hold durations in seconds
        #[arg(required = true)]
        seconds: Vec<f64>,
    },
}

pub fn run(action: KpAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        KpAction::Average { seconds } => {
            let config = Config::load()?;
            let mut measurement = KpMeasurement::new(config.kp_config()?);
            for hold in seconds {
                measurement.record(hold)?;
            }
            let result = measurement.result().ok_or("no attempts recorded")?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }
    Ok(())
}

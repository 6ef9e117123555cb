//! `analytics-connect` server binary.

// crates.io
use color_eyre::Result;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
// self
use analytics_connect::{
	config::{self, Config},
	server,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;
	config::load_dotenv()?;
	init_tracing();

	let config = Config::from_env()?;

	server::serve(config).await?;

	Ok(())
}

fn init_tracing() {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::registry().with(filter).with(fmt::layer().with_target(false)).init();
}

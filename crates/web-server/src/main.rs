use configuration::Overrides;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

// This main function is the entry point when running `cargo run -p web-server`.
// It loads the settings and hands them to `run_server`.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let settings = configuration::load_settings(None, &Overrides::default())?;
    web_server::run_server(settings).await
}

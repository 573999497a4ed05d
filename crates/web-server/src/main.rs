use market_data::PriceResolver;

// Entry point for `cargo run -p web-server`: load settings, start logging, serve.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = configuration::load_config()?;
    let _guard = configuration::init_tracing(&config.logging)?;
    web_server::run_server(config, PriceResolver::synthetic()).await
}

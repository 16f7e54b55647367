use muxboard_core::Config;

// Use mimalloc as the global allocator for better performance and lower fragmentation,
// especially when running on musl-based systems inside containers.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::from_env()?;

    let (state, router) = muxboard_api::setup::initialize_app(config.clone()).await?;

    muxboard_api::setup::server::start_server(&config, router).await?;

    state.status_updates.shutdown().await;

    Ok(())
}

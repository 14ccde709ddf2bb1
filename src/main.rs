use rendezvous_lib::bootstrap;

fn main() -> anyhow::Result<()> {
    // Configuration first: the log directory comes from it.
    let config = bootstrap::resolve_config()?;

    if let Err(err) = bootstrap::tracing::init_tracing_subscriber(&config.logs_dir) {
        eprintln!("Failed to initialize tracing: {err:#}");
    }

    let runtime = bootstrap::create_runtime()?;
    runtime.block_on(bootstrap::run_app(config))
}

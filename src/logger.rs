use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt::time, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` is honoured on top of the built-in directives. Debug builds log
/// the crate at `debug`, release builds at `info`; graphics and windowing
/// crates are kept quiet in both.
///
/// Call once, early in `main`. A second call returns an error because the
/// global subscriber is already set.
pub fn init() -> anyhow::Result<()> {
    let (own, platform) = if cfg!(debug_assertions) {
        ("scenebase=debug", "warn")
    } else {
        ("scenebase=info", "error")
    };

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env()?
        .add_directive(own.parse()?)
        .add_directive(format!("winit={platform}").parse()?)
        .add_directive(format!("naga={platform}").parse()?)
        .add_directive("wgpu_hal=error".parse()?)
        .add_directive("wgpu_core=error".parse()?)
        .add_directive(format!("cpal={platform}").parse()?);

    tracing_subscriber::Registry::default()
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(true)
                .with_timer(time::uptime()),
        )
        .with(filter)
        .try_init()?;
    Ok(())
}

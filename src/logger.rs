use std::sync::OnceLock;

use tracing_subscriber::{fmt, fmt::time::UtcTime, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{CoreError, CoreResult};

static LOGGER_INIT: OnceLock<()> = OnceLock::new();

/// Install the global subscriber once. `RUST_LOG` wins over `default_directives`.
/// Output goes to stderr so stdout can carry JSON.
pub fn init_logging(default_directives: &str) -> CoreResult<()> {
    if LOGGER_INIT.get().is_some() {
        return Ok(());
    }
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directives))
        .map_err(|err| CoreError::processing(format!("Filtro de log inválido: {err}")))?;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_timer(UtcTime::rfc_3339()),
        )
        .try_init()
        .map_err(|err| CoreError::processing(format!("Logger já inicializado: {err}")))?;

    let _ = LOGGER_INIT.set(());
    Ok(())
}

use std::backtrace::Backtrace;
use std::panic::PanicHookInfo;

use tracing_subscriber::{EnvFilter, fmt};

/// Installs the global subscriber and the panic hook. `RUST_LOG` overrides the
/// configured filter when set. Calling it again is a no-op.
pub fn init_tracing(log_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_filter));
    let active = filter.to_string();
    if fmt().with_env_filter(filter).with_target(false).try_init().is_err() {
        return;
    }
    std::panic::set_hook(Box::new(log_panic));
    tracing::debug!(filter = %active, "tracing initialised");
}

fn panic_message<'a>(info: &'a PanicHookInfo<'_>) -> &'a str {
    if let Some(message) = info.payload().downcast_ref::<&str>() {
        message
    } else if let Some(message) = info.payload().downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}

fn log_panic(info: &PanicHookInfo<'_>) {
    let message = panic_message(info);
    let backtrace = Backtrace::capture();
    let location = info
        .location()
        .map(|location| location.to_string())
        .unwrap_or_else(|| "<unknown>".to_string());

    tracing::error!(
        panic = %message,
        location = %location,
        backtrace = %backtrace,
        "handler panicked"
    );
}

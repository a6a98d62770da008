pub mod assembly;
pub mod config;
pub mod core;
pub mod export;
pub mod grid;
pub mod matching;
pub mod ocr;
pub mod pipeline;
pub mod review;
pub mod session;

pub use config::TableConfig;
pub use core::model::{Cell, Classification, Detection, MatchReport, RowKind, Table, TableRow};
pub use matching::{find_best_sequential_match, sequential_character_match, ReferenceSet};
pub use session::TableSession;

/// Installs a stderr subscriber. `RUST_LOG` wins over `verbose`.
pub fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

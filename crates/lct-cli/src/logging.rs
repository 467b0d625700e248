//! Subscriber setup shared by the binaries.

use tracing::Level;

/// Log level for a `-d/--debug` flag.
pub fn level(debug: bool) -> Level {
    if debug { Level::DEBUG } else { Level::INFO }
}

/// Install the fmt subscriber on stderr. Records from the `log` facade
/// used by the library crates are bridged into it.
pub fn init(debug: bool) {
    // A second init (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_max_level(level(debug))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

//! Main application entry point (native).

#[cfg(feature = "native")]
use clap::Parser;

#[cfg(feature = "native")]
fn main() {
    env_logger::init();
    log::info!("Starting Visionboard");

    let args = visionboard_app::CliArgs::parse();
    if let Err(err) = visionboard_app::run(args) {
        log::error!("{}", err);
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "native"))]
fn main() {
    panic!("Native feature not enabled. Use `cargo run --features native`");
}

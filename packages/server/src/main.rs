#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Binary entry point for the Fix-It map API server.

use std::path::PathBuf;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let data_dir = std::env::var("FIXIT_MAP_DATA_DIR").map_or_else(
        |_| PathBuf::from("data"),
        PathBuf::from,
    );

    fixit_map_server::run_server(&data_dir).await
}

//! # Voxel Mesh Pipeline Entry Point
//!
//! Runs the headless pipeline driver from the library's `run()` function.
//!
//! ## Usage
//!
//! ```text
//! RUST_LOG=info cargo run --release -- config.json
//! VOXEL_CONFIG=config.json cargo run --release
//! ```

fn main() {
    if let Err(error) = voxel_mesh_pipeline::run() {
        log::error!("{error}");
        std::process::exit(1);
    }
}

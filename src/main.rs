//! # Voxel Explorer Entry Point
//!
//! Calls into the library's `run()` and reports a fatal error on exit.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release
//! ```

fn main() -> anyhow::Result<()> {
    voxel_explorer::run()
}

//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `flockdesk_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    // A tiny probe keeps core crate wiring verifiable without standing up
    // any UI runtime or remote endpoint.
    println!("flockdesk_core version={}", flockdesk_core::core_version());
}

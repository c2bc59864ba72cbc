//! Build script for lumen-firmware
//!
//! memory.x comes from embassy-stm32 (`memory-x` feature); this only adds
//! the linker scripts.

fn main() {
    setup_linker();
}

/// Link against cortex-m-rt and defmt
fn setup_linker() {
    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");

    #[cfg(feature = "defmt")]
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    println!("cargo:rerun-if-changed=build.rs");
}

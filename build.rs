use std::env;

/// Linker flags a Python extension module needs on each target OS.
fn extension_link_args(target_os: &str) -> &'static [&'static str] {
    match target_os {
        // libpython symbols stay unresolved until the interpreter imports the module
        "macos" | "ios" => &["-undefined", "dynamic_lookup"],
        _ => &[],
    }
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    if env::var_os("CARGO_FEATURE_PYTHON").is_none() {
        return;
    }
    let target_os = env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    for arg in extension_link_args(&target_os) {
        println!("cargo:rustc-cdylib-link-arg={arg}");
    }
}

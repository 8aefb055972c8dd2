use std::env;

fn main() {
    // Linking only happens when building against the vendor SDK. Without the
    // feature the crate compiles on machines with no WaveForms installation.
    if env::var_os("CARGO_FEATURE_VENDOR_SDK").is_none() {
        return;
    }

    println!("cargo:rerun-if-env-changed=DWF_LIB_DIR");
    if let Some(dir) = env::var_os("DWF_LIB_DIR") {
        println!("cargo:rustc-link-search=native={}", dir.to_string_lossy());
    }
    println!("cargo:rustc-link-lib=dylib=dwf");
}

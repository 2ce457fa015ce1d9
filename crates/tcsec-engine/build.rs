fn main() {
    println!("cargo:rerun-if-env-changed=KMC_SDLS_LIB_DIR");
    if std::env::var_os("CARGO_FEATURE_CRYPTOLIB").is_none() {
        return;
    }
    if let Some(dir) = std::env::var_os("KMC_SDLS_LIB_DIR") {
        println!("cargo:rustc-link-search=native={}", dir.to_string_lossy());
    }
}

use rustc_version::version;

fn main() {
    // The compiler version is exported as a label on the
    // elasticsearch_exporter_build_info metric.
    let rustc = version().expect("unable to determine rustc version");
    println!("cargo:rustc-env=RUSTC_VERSION={rustc}");
    println!("cargo:rerun-if-changed=build.rs");
}

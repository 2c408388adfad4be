use cuda_build::{cuda_include_path, enable_stub, link_cuda_runtime, print_build_info, toolkit_available};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    if std::env::var("CARGO_FEATURE_STUB").is_ok() {
        return;
    }
    print_build_info();
    if !toolkit_available() {
        enable_stub();
        return;
    }
    link_cuda_runtime();

    if let Some(include_path) = cuda_include_path() {
        println!("cargo:include={}", include_path.display());
    }
}

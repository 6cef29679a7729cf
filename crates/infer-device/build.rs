#[cfg(feature = "cuda")]
use std::env;
#[cfg(feature = "cuda")]
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=CUDA_HOME");

    // Only the CUDA backend needs generated bindings.
    #[cfg(feature = "cuda")]
    {
        // Allows `cargo check --features cuda` on machines without a toolkit.
        if env::var("SKIP_CUDA_BINDINGS").is_ok() {
            return;
        }

        // 1. Locate the toolkit; CUDA_HOME wins over the default install path.
        let cuda_home = env::var("CUDA_HOME").unwrap_or_else(|_| "/usr/local/cuda".into());

        // 2. Link the runtime library that provides cudaGetDevice / cudaSetDevice.
        println!("cargo:rustc-link-search=native={}/lib64", cuda_home);
        println!("cargo:rustc-link-lib=cudart");
        println!("cargo:rerun-if-changed=src/cuda/wrapper.h");

        // 3. Tell libclang which target it is parsing for (matters when cross-compiling).
        let target = env::var("TARGET").expect("TARGET environment variable not set");

        // 4. Generate the FFI bindings.
        let bindings = bindgen::Builder::default()
            .header("src/cuda/wrapper.h")
            .clang_arg(format!("-I{}/include", cuda_home))
            .clang_arg(format!("--target={}", target))
            // Only the device-selection slice of the runtime API.
            .allowlist_function("cudaGetDevice")
            .allowlist_function("cudaSetDevice")
            .allowlist_function("cudaGetDeviceCount")
            .allowlist_function("cudaGetErrorName")
            .allowlist_function("cudaGetErrorString")
            .allowlist_type("cudaError_t")
            .parse_callbacks(Box::new(bindgen::CargoCallbacks::new()))
            .generate()
            .expect("Unable to generate CUDA runtime bindings");

        // 5. Written to OUT_DIR and picked up by src/cuda/ffi.rs via include!.
        let out_path = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR not set by cargo"));
        bindings
            .write_to_file(out_path.join("bindings.rs"))
            .expect("Couldn't write bindings!");
    }
}

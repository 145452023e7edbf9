fn main() {
    // On macOS, link against the Accelerate framework for the LAPACK routines
    // behind ndarray-linalg (eigen-decomposition, SVD, inverse)
    #[cfg(target_os = "macos")]
    {
        println!("cargo:rustc-link-lib=framework=Accelerate");
    }
}

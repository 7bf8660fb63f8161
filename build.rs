fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs");

    // GIT_COMMIT_HASH is None outside a git checkout.
    built::write_built_file().expect("Failed to acquire build-time information");
}

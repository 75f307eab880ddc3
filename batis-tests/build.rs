fn main() {
    // Generate mapper code for the integration tests into OUT_DIR, configured by
    // [package.metadata.batis-codegen] in Cargo.toml
    batis_codegen::generate_from_cargo_metadata().expect("codegen failed");
}

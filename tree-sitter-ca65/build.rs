fn main() {
    let src_dir = std::path::Path::new("src");

    let mut config = cc::Build::new();
    config.include(src_dir);
    config
        .flag_if_supported("-Wno-unused-parameter")
        .flag_if_supported("-Wno-unused-value")
        .flag_if_supported("-Wno-trigraphs");
    let parser_path = src_dir.join("parser.c");
    config.file(&parser_path);
    println!("cargo:rerun-if-changed={}", parser_path.to_str().unwrap());

    config.compile("tree-sitter-ca65");

    // The header tests drive the C toolchain themselves and need to know
    // which target they are building for.
    println!("cargo:rustc-env=CA65_BUILD_TARGET={}", std::env::var("TARGET").unwrap());
    println!("cargo:rustc-env=CA65_BUILD_HOST={}", std::env::var("HOST").unwrap());
}

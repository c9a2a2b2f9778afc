/// Expose the compilation target triple as an environment variable at build time.
///
/// `constants::TARGET` reads it with `env!("TARGET")` so the `version`
/// subcommand can report the platform the binary was built for.
fn main() {
    println!(
        "cargo:rustc-env=TARGET={}",
        std::env::var("TARGET").unwrap()
    );
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = lightdash_core::runtime::parse_cli_args(&args);

    if options.version {
        println!("lightdash-core {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    if let Err(error) = lightdash_core::runtime::run_with_options(options, &args) {
        eprintln!("[lightdash-core] runtime failed: {error}");
        std::process::exit(1);
    }
}

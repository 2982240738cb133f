fn main() {
    if let Err(err) = probehost_cli::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

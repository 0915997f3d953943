fn main() {
    if let Err(err) = moment_review_lib::run() {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

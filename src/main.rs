fn main() {
    if let Err(err) = borelog_renderer::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

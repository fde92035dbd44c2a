fn main() {
    if let Err(err) = prompt_canvas::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

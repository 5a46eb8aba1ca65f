use std::process::ExitCode;

fn main() -> ExitCode {
    rdoc_dictionary::cli::run()
}

use sde2string::cli::Cli;

fn main() {
    std::process::exit(Cli::run());
}

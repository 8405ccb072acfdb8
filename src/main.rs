use clap::Parser;
use console::Style;
use federation_cli::cli::Cli;

fn main() {
    let cli = Cli::parse();
    if let Err(err) = federation_cli::run(cli) {
        eprintln!("{} {}", Style::new().red().bold().for_stderr().apply_to("error:"), err);
        std::process::exit(1);
    }
}

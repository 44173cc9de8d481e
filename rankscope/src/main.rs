use colored::Colorize;
use rankscope::commands::command_argument_builder;
use rankscope::handlers::{
    handle_analyze, handle_compare, handle_gaps, handle_keywords, handle_suggest, init_logging,
};
use rankscope_core::print_banner;

#[tokio::main]
async fn main() {
    let cmd = command_argument_builder();
    let chosen_command = cmd.get_matches();
    let quiet = chosen_command.get_flag("quiet");
    let verbose = chosen_command.get_flag("verbose");

    init_logging(verbose);

    // Show banner unless --quiet flag is set
    if !quiet {
        print_banner();
    }

    if chosen_command.subcommand().is_none() {
        // No subcommand provided, just show the banner
        return;
    }

    let outcome = match chosen_command.subcommand() {
        Some(("keywords", primary_command)) => handle_keywords(primary_command),
        Some(("gaps", primary_command)) => handle_gaps(primary_command),
        Some(("suggest", primary_command)) => handle_suggest(primary_command),
        Some(("compare", primary_command)) => handle_compare(primary_command, quiet).await,
        Some(("analyze", primary_command)) => handle_analyze(primary_command, quiet).await,
        _ => unreachable!("clap should ensure we don't get here"),
    };

    if let Err(e) = outcome {
        eprintln!("{} {:#}", "✗".red().bold(), e);
        std::process::exit(1);
    }
}

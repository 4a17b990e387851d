use clap::Parser;
use tamesis_cli::config::{Cli, Command, Validate};
use tamesis_cli::error::Result;
use tamesis_cli::logger::init_logger;
use tamesis_cli::runner;
use tamesis_core::simulations;
use tracing::error;

const EXIT_BATCH_FAILURES: i32 = 3;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose, cli.log_json);

    match dispatch(cli.command).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!("{e}");
            std::process::exit(e.exit_code());
        }
    }
}

async fn dispatch(command: Command) -> Result<i32> {
    match command {
        Command::List => {
            for sim in simulations::registry() {
                println!("{:<26} {:<40} {}", sim.id(), sim.output_file(), sim.title());
            }
            Ok(0)
        }
        Command::Run(args) => {
            args.validate()?;
            let options = args.render_options();
            let report = runner::run_single(&args.id, args.seed, &args.output_dir, options).await?;
            println!("{}", report.output.display());
            Ok(0)
        }
        Command::RunAll(args) => {
            let config = args.resolve()?;
            let program = std::env::current_exe()?;
            let report = runner::run_batch(&program, &config).await?;
            println!("{}/{} simulations succeeded", report.succeeded, report.total);
            Ok(if report.has_failures() { EXIT_BATCH_FAILURES } else { 0 })
        }
    }
}

use clap::{CommandFactory, Parser, Subcommand};

#[derive(Debug, Clone, Copy)]
enum ResponseMode {
    Json,
    Yaml,
}

mod commands;
mod output;
mod tty;

use commands::{scaffold, step};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "gantry")]
#[command(version = VERSION)]
#[command(about = "Assemble workflow steps and generate project bootstrap files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build normalized workflow steps
    Step(step::StepArgs),
    /// Generate the project bootstrap file
    Scaffold(scaffold::ScaffoldArgs),
    /// List available commands (alias for --help)
    List,
}

fn response_mode(command: &Commands) -> ResponseMode {
    match command {
        Commands::Step(args) if args.yaml => ResponseMode::Yaml,
        _ => ResponseMode::Json,
    }
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    if matches!(cli.command, Commands::List) {
        let mut cmd = Cli::command();
        cmd.print_help().expect("Failed to print help");
        println!();
        return std::process::ExitCode::SUCCESS;
    }

    let mode = response_mode(&cli.command);

    if let ResponseMode::Yaml = mode {
        match commands::run_yaml(cli.command) {
            Ok((content, exit_code)) => {
                print!("{}", content);
                return std::process::ExitCode::from(exit_code_to_u8(exit_code));
            }
            Err(err) => {
                let (json_result, exit_code) =
                    output::map_cmd_result_to_json::<serde_json::Value>(Err(err));
                output::print_json_result(json_result);
                return std::process::ExitCode::from(exit_code_to_u8(exit_code));
            }
        }
    }

    let (json_result, exit_code) = commands::run_json(cli.command);
    output::print_json_result(json_result);

    std::process::ExitCode::from(exit_code_to_u8(exit_code))
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}

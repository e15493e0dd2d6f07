use crate::demo::{run_demo, run_score, DemoArgs, ScoreArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use exit_readiness::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Exit Readiness",
    about = "Score exit readiness assessments and serve the report pipeline",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Score a JSON file of raw questionnaire answers
    Score(ScoreArgs),
    /// Run a built-in sample assessment through the full report pipeline
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Score(args) => run_score(args),
        Command::Demo(args) => run_demo(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_defaults_to_serve() {
        let cli = Cli::try_parse_from(["exit-readiness-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn score_requires_an_answers_file() {
        assert!(Cli::try_parse_from(["exit-readiness-api", "score"]).is_err());

        let cli = Cli::try_parse_from([
            "exit-readiness-api",
            "score",
            "--answers",
            "answers.json",
            "--json",
        ])
        .expect("parses");
        match cli.command {
            Some(Command::Score(args)) => {
                assert_eq!(args.answers.to_str(), Some("answers.json"));
                assert!(args.json);
            }
            other => panic!("expected score command, got {other:?}"),
        }
    }

    #[test]
    fn serve_accepts_host_and_port_overrides() {
        let cli = Cli::try_parse_from([
            "exit-readiness-api",
            "serve",
            "--host",
            "0.0.0.0",
            "--port",
            "8080",
        ])
        .expect("parses");
        match cli.command {
            Some(Command::Serve(args)) => {
                assert_eq!(args.host.as_deref(), Some("0.0.0.0"));
                assert_eq!(args.port, Some(8080));
            }
            other => panic!("expected serve command, got {other:?}"),
        }
    }
}

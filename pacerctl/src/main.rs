use anyhow::Result;
use clap::{Parser, Subcommand};
use pacer_ipc::{Command, Response, SOCKET_PATH};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;

#[derive(Parser)]
#[command(name = "pacerctl")]
#[command(about = "Control a running pacer session", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the countdown
    Start,
    /// Pause the countdown
    Pause,
    /// Reset the current phase to its full duration
    Reset,
    /// Add ten minutes to the current phase
    Add10,
    /// Finish the current phase and move to the next one
    Skip,
    /// Jump to the next phase at its full duration
    Next,
    /// Show the current phase and remaining time
    Status,
    /// Switch the interface language (ca, es, en, fr)
    Lang { code: String },
    /// Write the configuration to a JSON file
    Export { path: String },
    /// Merge a configuration JSON file into the session
    Import { path: String },
    /// Copy the configuration JSON to the clipboard
    Share,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let command = match cli.command {
        Commands::Start => Command::Start,
        Commands::Pause => Command::Pause,
        Commands::Reset => Command::Reset,
        Commands::Add10 => Command::AddTen,
        Commands::Skip => Command::SkipToNext,
        Commands::Next => Command::SwitchPhase,
        Commands::Status => Command::Status,
        Commands::Lang { code } => Command::SetLang { lang: code },
        Commands::Export { path } => Command::Export { path },
        Commands::Import { path } => Command::Import { path },
        Commands::Share => Command::Share,
    };

    let response = send_command(command).await?;

    match response {
        Response::Ok => println!("OK"),
        Response::Status(status) => {
            let state = if status.running { "running" } else { "paused" };
            println!("Phase {}: {}", status.phase_index + 1, status.phase_title);
            println!("State: {}", state);
            println!(
                "Remaining: {:02}:{:02} / {:02}:{:02}",
                status.remaining / 60,
                status.remaining % 60,
                status.total / 60,
                status.total % 60
            );
            println!("Language: {}", status.lang);
        }
        Response::Error(e) => eprintln!("Error: {}", e),
    }

    Ok(())
}

async fn send_command(cmd: Command) -> Result<Response> {
    let mut stream = UnixStream::connect(SOCKET_PATH).await?;

    let msg = serde_json::to_vec(&cmd)?;
    stream.write_all(&msg).await?;
    stream.write_all(b"\n").await?;

    let mut buf = vec![0; 4096];
    let n = stream.read(&mut buf).await?;
    let response: Response = serde_json::from_slice(&buf[..n])?;

    Ok(response)
}

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use onstage::{cli, config, error, types::PlayerCommand};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the local proxy server
    Serve,

    /// Authorize with Spotify API
    Auth,

    /// Watch playback: now playing, position and concerts
    Watch,

    /// Start playback
    Play,

    /// Pause playback
    Pause,

    /// Toggle play/pause
    Toggle,

    /// Skip to the next track
    Next,

    /// Return to the previous track
    Previous,

    /// Seek to a position in the current track
    Seek(SeekOptions),

    /// Search upcoming concerts for an artist
    Concerts(ConcertsOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct SeekOptions {
    /// Target position in milliseconds
    position_ms: u64,
}

#[derive(Parser, Debug, Clone)]
pub struct ConcertsOptions {
    /// Artist name to search for
    artist: String,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    match cli.command {
        Command::Serve => cli::serve().await,
        Command::Auth => cli::auth().await,
        Command::Watch => cli::watch().await,
        Command::Play => cli::dispatch(PlayerCommand::Play).await,
        Command::Pause => cli::dispatch(PlayerCommand::Pause).await,
        Command::Toggle => cli::toggle().await,
        Command::Next => cli::dispatch(PlayerCommand::Next).await,
        Command::Previous => cli::dispatch(PlayerCommand::Previous).await,
        Command::Seek(opt) => cli::dispatch(PlayerCommand::Seek(opt.position_ms)).await,
        Command::Concerts(opt) => cli::concerts(opt.artist).await,
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}

#[cfg(not(feature = "std"))]
fn main() {}

#[cfg(feature = "std")]
use battleship_server::{
    init_logging, server, transport::in_memory::pipe, BotReport, RandomBot, SessionConfig,
    SessionOutcome, SessionRegistry, TcpTransport,
};

#[cfg(feature = "std")]
use clap::{Args, Parser, Subcommand};
#[cfg(feature = "std")]
use rand::rngs::SmallRng;
#[cfg(feature = "std")]
use rand::SeedableRng;
#[cfg(feature = "std")]
use tokio::net::TcpListener;
#[cfg(feature = "std")]
use tokio::time::Duration;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[cfg(feature = "std")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone, Debug)]
#[cfg(feature = "std")]
struct SessionArgs {
    #[arg(long, default_value_t = 30, help = "Seconds each peer has to send Connect")]
    handshake_timeout_secs: u64,
    #[arg(long, help = "Seconds the current player has to shoot before forfeiting")]
    turn_timeout_secs: Option<u64>,
    #[arg(long, default_value_t = battleship_server::MAX_FRAME_SIZE)]
    max_frame_size: u32,
}

#[cfg(feature = "std")]
impl SessionArgs {
    fn config(&self) -> SessionConfig {
        SessionConfig {
            max_frame_size: self.max_frame_size,
            handshake_timeout: Duration::from_secs(self.handshake_timeout_secs),
            turn_timeout: self.turn_timeout_secs.map(Duration::from_secs),
            ..SessionConfig::default()
        }
    }
}

#[derive(Subcommand)]
#[cfg(feature = "std")]
enum Commands {
    /// Accept players over TCP and run a session for every pair.
    Serve {
        #[arg(long, default_value = "0.0.0.0:8080")]
        bind: String,
        #[command(flatten)]
        session: SessionArgs,
    },
    /// Connect to a server and play one match with random shots.
    Bot {
        #[arg(long, default_value = "127.0.0.1:8080")]
        connect: String,
        #[arg(long, default_value = "bot")]
        name: String,
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
    },
    /// Run two bots against an in-process session and print the result as JSON.
    Local {
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
        #[command(flatten)]
        session: SessionArgs,
    },
}

#[derive(serde::Serialize)]
#[cfg(feature = "std")]
struct LocalSummary {
    session: SessionOutcome,
    bots: [BotReport; 2],
}

#[cfg(feature = "std")]
fn make_rng(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(s) => SmallRng::seed_from_u64(s),
        None => {
            let mut seed_rng = rand::rng();
            SmallRng::from_rng(&mut seed_rng)
        }
    }
}

#[cfg(feature = "std")]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { bind, session } => {
            let listener = TcpListener::bind(&bind).await?;
            server::serve(listener, session.config(), SessionRegistry::new()).await?;
        }
        Commands::Bot {
            connect,
            name,
            seed,
        } => {
            // Pairing and the opponent's turns can take arbitrarily long.
            let stream = TcpTransport::connect(&connect).await?.into_inner();
            let mut transport = TcpTransport::with_timeout(stream, None);
            let mut bot = RandomBot::new(name, make_rng(seed));
            let report = bot.play(&mut transport).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Local { seed, session } => {
            let registry = SessionRegistry::new();
            let config = session.config();
            let (server_one, mut client_one) = pipe();
            let (server_two, mut client_two) = pipe();
            let handle = server::spawn_session(
                &registry,
                &config,
                (registry.next_connection_id(), server_one),
                (registry.next_connection_id(), server_two),
            )?;

            let mut bot_one = RandomBot::new("bot-1", make_rng(seed));
            let mut bot_two = RandomBot::new("bot-2", make_rng(seed.map(|s| s.wrapping_add(1))));
            let (one, two) = tokio::try_join!(
                bot_one.play(&mut client_one),
                bot_two.play(&mut client_two)
            )?;
            let outcome = handle.await?;

            let summary = LocalSummary {
                session: outcome,
                bots: [one, two],
            };
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }
    Ok(())
}

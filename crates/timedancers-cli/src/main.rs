use clap::{Parser, Subcommand};
use timedancers_core::Config;

mod commands;

#[derive(Parser)]
#[command(name = "timedancers", version, about = "Timedancers meditation timer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Session control
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Phase duration overrides
    Phases {
        #[command(subcommand)]
        action: commands::phases::PhasesAction,
    },
    /// Background notification queue
    Notify {
        #[command(subcommand)]
        action: commands::notify::NotifyAction,
    },
    /// Daily meditation reminder
    Reminder {
        #[command(subcommand)]
        action: commands::reminder::ReminderAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_logging(config: &Config) {
    let env = env_logger::Env::default().default_filter_or(config.logging.level.as_str());
    env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .init();
}

fn main() {
    let cli = Cli::parse();
    let config = Config::load_or_default();
    init_logging(&config);

    let result = match cli.command {
        Commands::Timer { action } => commands::timer::run(action, &config),
        Commands::Phases { action } => commands::phases::run(action, &config),
        Commands::Notify { action } => commands::notify::run(action, &config),
        Commands::Reminder { action } => commands::reminder::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        log::error!("event=command_failed module=cli error={e}");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

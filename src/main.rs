use sonocli::audio::AlsaBackend;
use sonocli::catalog::SoundCatalog;
use sonocli::config::Settings;
use sonocli::init_app_dirs;
use sonocli::player::{Player, PlayerCommand, PlayerStateUpdate};
use sonocli::ui::{Cli, MenuChoice};
use std::error::Error;
use tokio::sync::oneshot;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Parse command-line arguments and initialize CLI
    let cli = Cli::new();
    let args = &cli.args;

    // Logs go to stderr so they don't interleave with the menu
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sonocli=warn")))
        .with_writer(std::io::stderr)
        .init();

    // Initialize application directories
    init_app_dirs()?;

    // Load configuration from file or create default
    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => Settings::default_path(),
    };

    let mut settings = Settings::load(&config_path)?;

    // Override settings with command-line arguments (clap already folds in
    // the environment variables)
    if let Some(sounds_dir) = &args.sounds_dir {
        settings.sounds_dir = sounds_dir.clone();
    }
    if args.alsa_device != "default" {
        settings.alsa_device = args.alsa_device.clone();
    }

    // Validate settings
    settings.validate()?;

    // Build the sound list from the configured directory
    let catalog = SoundCatalog::scan_dir(&settings.sounds_dir)?;

    // Wire up the player with the ALSA backend and run it as its own task
    let backend = AlsaBackend::new(&settings.alsa_device);
    let (mut player, command_tx) = Player::new(catalog.clone(), Box::new(backend), 16, 16);
    let mut state_updates = player.subscribe_state_updates();
    let player_handle = tokio::spawn(async move {
        player.run().await;
    });

    // Main interaction loop: show the list, toggle on selection
    loop {
        // Ask the player task for its current state
        let (state_tx, state_rx) = oneshot::channel();
        command_tx.send(PlayerCommand::GetState(state_tx)).await?;
        let state = state_rx.await?;

        cli.display_sounds(catalog.items(), &state);

        match cli.read_choice(catalog.items())? {
            MenuChoice::Toggle(name) => {
                command_tx.send(PlayerCommand::Toggle(name)).await?;

                // Wait for the toggle to be processed (commands are handled in
                // order, so the state response arrives afterwards), then show
                // any playback error it produced.
                let (state_tx, state_rx) = oneshot::channel();
                command_tx.send(PlayerCommand::GetState(state_tx)).await?;
                let _ = state_rx.await?;
                while let Ok(update) = state_updates.try_recv() {
                    match update {
                        PlayerStateUpdate::Error(message) => cli.display_error(&message),
                        other => debug!("State update: {:?}", other),
                    }
                }
            }
            MenuChoice::Quit => {
                println!("Stopping...");
                break;
            }
            MenuChoice::Invalid(input) => {
                if input.is_empty() {
                    println!("Please enter a number, a sound name, or 'q'.");
                } else {
                    println!("Unknown selection: {}", input);
                }
            }
        }
    }

    // Shut the player down; this stops and releases any active sound
    command_tx.send(PlayerCommand::Shutdown).await?;
    player_handle.await?;

    Ok(())
}

// Hide console window on Windows for release builds (GUI app).
// In debug builds, keep the console so panics/backtraces are visible.
#![cfg_attr(all(windows, not(debug_assertions)), windows_subsystem = "windows")]

use bevy::prelude::*;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use sideroll::roller::{
    animate_spins, handle_keyboard, handle_preset_buttons, handle_roll_button,
    handle_sides_buttons, parse_sides, refresh_presets, reveal_titles, setup, start_rolls,
    sync_visual_kind, update_status_text, ConfigStore, DiceConfig, Preset, RevealQueue,
    RngSource, RollAnimator, RollRequested, RollRng, RollVisual, RollerSession, ERROR_LABEL,
    MAX_SIDES, MIN_SIDES, REVEAL_DELAY, ROLLING_LABEL,
};

/// Above this many sides `show` lists only custom titles.
const SHOW_ALL_LIMIT: u32 = 20;

/// SideRoll - CLI and 3D dice/coin roller
#[derive(Parser)]
#[command(name = "sideroll")]
#[command(
    author,
    version,
    about = "SideRoll - dice and coin roller with custom side titles and presets"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Folder holding the settings database (defaults to the app data folder,
    /// or SIDEROLL_DATA_DIR when set)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Roll the die (or flip the coin when it has two sides)
    Roll {
        /// Use this many sides for this roll only
        #[arg(short, long, allow_hyphen_values = true)]
        sides: Option<String>,

        /// Number of rolls to make in a row
        #[arg(short, long, default_value = "1")]
        times: u32,

        /// Reveal the result immediately
        #[arg(long)]
        no_delay: bool,
    },

    /// Display the current configuration
    Show,

    /// Set the number of sides (2 to 1000)
    Sides {
        /// New side count
        #[arg(allow_hyphen_values = true)]
        count: String,
    },

    /// Set or clear the custom title of a side
    Title {
        /// Side index, starting at 1
        side: u32,

        /// New title. Leave out to go back to the default label.
        text: Option<String>,
    },

    /// Manage saved presets
    Preset {
        #[command(subcommand)]
        action: PresetCommand,
    },

    /// Delete all saved settings and presets
    Clear {
        /// Confirm the wipe
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum PresetCommand {
    /// List saved presets
    List,

    /// Save the current configuration as a preset
    Save {
        /// Preset name
        name: String,
    },

    /// Make a preset the current configuration
    Load {
        /// Preset id (see `preset list`)
        id: i64,
    },

    /// Delete a preset
    Delete {
        /// Preset id (see `preset list`)
        id: i64,
    },
}

fn main() {
    let cli = Cli::parse();

    if cli.command.is_some() {
        #[cfg(windows)]
        attach_parent_console();

        run_cli_mode(cli);
    } else {
        run_3d_mode(cli);
    }
}

/// Attach to the parent process's console on Windows so CLI output reaches
/// the terminal despite the GUI subsystem.
#[cfg(windows)]
fn attach_parent_console() {
    use std::io::{self, Write};

    #[link(name = "kernel32")]
    extern "system" {
        fn AttachConsole(dwProcessId: u32) -> i32;
        fn AllocConsole() -> i32;
    }

    const ATTACH_PARENT_PROCESS: u32 = 0xFFFFFFFF;

    unsafe {
        if AttachConsole(ATTACH_PARENT_PROCESS) == 0 {
            AllocConsole();
        }
    }

    let _ = io::stdout().flush();
    let _ = io::stderr().flush();
}

fn open_store(data_dir: Option<&PathBuf>) -> Result<ConfigStore, String> {
    match data_dir {
        Some(dir) => ConfigStore::open_in(dir),
        None => ConfigStore::open(),
    }
}

// ============================================================================
// 3D Mode
// ============================================================================

fn run_3d_mode(cli: Cli) {
    let store = match open_store(cli.data_dir.as_ref()) {
        Ok(store) => Some(store),
        Err(e) => {
            eprintln!("{} Settings will not be saved: {}", "Warning:".yellow().bold(), e);
            None
        }
    };
    let config = store.as_ref().map(ConfigStore::load).unwrap_or_default();

    let mut session = RollerSession::new(config, store);
    refresh_presets(&mut session);

    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "SideRoll".to_string(),
                        resolution: (1024u32, 720u32).into(),
                        ..default()
                    }),
                    ..default()
                })
                .set(bevy::log::LogPlugin {
                    level: bevy::log::Level::INFO,
                    filter: "info,wgpu=error".to_string(),
                    ..default()
                }),
        )
        .insert_resource(ClearColor(Color::srgb(0.08, 0.09, 0.12)))
        .insert_resource(session)
        .insert_resource(RevealQueue::default())
        .insert_resource(RollRng::default())
        .add_message::<RollRequested>()
        .add_systems(Startup, setup)
        .add_systems(
            Update,
            (
                handle_keyboard,
                handle_roll_button,
                handle_sides_buttons,
                handle_preset_buttons,
                start_rolls,
                animate_spins,
                reveal_titles,
                sync_visual_kind,
                update_status_text,
            )
                .chain(),
        )
        .run();
}

// ============================================================================
// CLI Mode
// ============================================================================

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("{} {}", "Error:".red().bold(), message);
    std::process::exit(1);
}

fn run_cli_mode(cli: Cli) {
    let store = match open_store(cli.data_dir.as_ref()) {
        Ok(store) => store,
        Err(e) => fail(format!("Failed to open settings database: {}", e)),
    };

    match cli.command {
        Some(Commands::Roll {
            sides,
            times,
            no_delay,
        }) => {
            let mut config = store.load();
            if let Some(raw) = sides {
                config.set_sides(checked_sides(&raw));
            }
            roll_cli(&config, times.max(1), no_delay);
        }
        Some(Commands::Show) => display_config(&store.load()),
        Some(Commands::Sides { count }) => {
            let mut config = store.load();
            config.set_sides(checked_sides(&count));
            save_or_fail(&store, &config);
            println!("Sides set to {}", config.sides.to_string().green().bold());
        }
        Some(Commands::Title { side, text }) => {
            let mut config = store.load();
            if side < 1 || side > config.sides {
                fail(format!("Side {} is out of range (1 to {})", side, config.sides));
            }
            config.set_title(side, text.as_deref().unwrap_or(""));
            save_or_fail(&store, &config);
            println!(
                "Side {} now shows {}",
                side,
                config.title_for(side).green().bold()
            );
        }
        Some(Commands::Preset { action }) => run_preset_command(&store, action),
        Some(Commands::Clear { yes }) => {
            if !yes {
                fail("Refusing to delete all settings and presets without --yes");
            }
            if let Err(e) = store.clear() {
                fail(e);
            }
            println!("{}", "All settings and presets deleted".yellow());
        }
        None => fail("No command specified"),
    }
}

/// Parse a side count, warning when the value had to be adjusted.
fn checked_sides(raw: &str) -> u32 {
    let sides = parse_sides(raw);
    if raw.trim().parse::<i64>().ok() != Some(i64::from(sides)) {
        eprintln!(
            "{} '{}' is not a side count between {} and {}; using {}",
            "Warning:".yellow().bold(),
            raw,
            MIN_SIDES,
            MAX_SIDES,
            sides
        );
    }
    sides
}

fn save_or_fail(store: &ConfigStore, config: &DiceConfig) {
    if let Err(e) = store.save(config) {
        fail(format!("Failed to save settings: {}", e));
    }
}

fn roll_cli(config: &DiceConfig, times: u32, no_delay: bool) {
    let mut animator = RollAnimator::new();
    let mut rng = RngSource::thread();

    for i in 0..times {
        if i > 0 {
            println!();
        }
        println!("{}", ROLLING_LABEL.dimmed());

        let plan = match animator.roll(config, &mut rng) {
            Ok(plan) => plan,
            Err(e) => {
                println!("{}", ERROR_LABEL.red().bold());
                fail(e);
            }
        };
        if !no_delay {
            std::thread::sleep(REVEAL_DELAY);
        }

        let bar = "═══════════════════════════════════════";
        println!("{}", bar.cyan());
        println!(
            "  {} {}",
            "Result:".bold(),
            config.title_for(plan.outcome).green().bold()
        );
        match &plan.visual {
            RollVisual::Coin { heads, spins, .. } => {
                println!(
                    "  Coin landed {} after {} turns",
                    if *heads { "heads" } else { "tails" },
                    spins
                );
                println!("  {}", animator.state().coin_transform().dimmed());
            }
            RollVisual::Dice {
                landing_face,
                faces,
                spins,
                recovered,
                ..
            } => {
                let shown: Vec<String> = faces
                    .iter()
                    .enumerate()
                    .map(|(i, value)| {
                        if i + 1 == usize::from(landing_face.index()) {
                            format!("[{}]", value).bold().to_string()
                        } else {
                            value.to_string()
                        }
                    })
                    .collect();
                println!(
                    "  {} of {} on {} after {} turns",
                    plan.outcome, plan.sides, landing_face, spins
                );
                println!("  Faces: {}", shown.join(" "));
                if *recovered {
                    eprintln!("{} cube rotation was reset", "Warning:".yellow().bold());
                }
                println!("  {}", animator.state().cube_transform().dimmed());
            }
        }
        println!("{}", bar.cyan());
    }
}

fn display_config(config: &DiceConfig) {
    let bar = "═══════════════════════════════════════";
    println!("{}", bar.cyan());
    println!(
        "  {} {} ({})",
        "Sides:".bold(),
        config.sides,
        if config.is_coin() { "coin" } else { "die" }
    );
    println!("{}", bar.cyan());

    if config.sides <= SHOW_ALL_LIMIT {
        for side in 1..=config.sides {
            print_side(config, side);
        }
        return;
    }

    let custom: Vec<u32> = config
        .titles
        .keys()
        .copied()
        .filter(|side| *side <= config.sides)
        .collect();
    for side in &custom {
        print_side(config, *side);
    }
    println!(
        "  {}",
        format!(
            "{} other sides use their default labels",
            (config.sides as usize).saturating_sub(custom.len())
        )
        .dimmed()
    );
}

fn print_side(config: &DiceConfig, side: u32) {
    let title = config.title_for(side);
    let custom = config
        .titles
        .get(&side)
        .is_some_and(|text| !text.trim().is_empty());
    if custom {
        println!("  {:>4}: {}", side, title.green());
    } else {
        println!("  {:>4}: {}", side, title.dimmed());
    }
}

fn run_preset_command(store: &ConfigStore, action: PresetCommand) {
    match action {
        PresetCommand::List => {
            let presets = store.list_presets().unwrap_or_else(|e| fail(e));
            if presets.is_empty() {
                println!("{}", "No presets saved".dimmed());
                return;
            }
            for entry in presets {
                println!("  #{:<4} {}", entry.id, entry.label());
            }
        }
        PresetCommand::Save { name } => {
            let preset = Preset::from_config(&name, &store.load());
            let id = store.save_preset(&preset).unwrap_or_else(|e| fail(e));
            println!("Saved preset {} as #{}", preset.name.green().bold(), id);
        }
        PresetCommand::Load { id } => {
            let config = store.load_preset(id).unwrap_or_else(|e| fail(e));
            println!("Loaded preset #{}", id);
            display_config(&config);
        }
        PresetCommand::Delete { id } => {
            if let Err(e) = store.delete_preset(id) {
                fail(e);
            }
            println!("Deleted preset #{}", id);
        }
    }
}

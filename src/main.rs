use clap::Parser;
use color_eyre::Result;

mod app;
mod candidate;
mod config;
mod coords;
mod dispatch;
mod error;
mod geocode;
mod kv;
mod map;
mod merge;
mod nearby;
mod recency;
mod session;
#[cfg(test)]
mod test_utils;

use app::App;
use coords::parse_latlng;
use kv::FileStore;
use map::LoggingMapSurface;
use merge::{
    GEOCODED_SECTION_TITLE, NEARBY_SECTION_TITLE, RECENT_SECTION_TITLE, USE_MAP_AFFORDANCE,
};

/// Location search for the Bengaluru civic issues map
#[derive(Parser, Debug)]
#[command(
    version,
    about = "Location search and resolution for the Bengaluru civic issues map"
)]
struct Args {
    /// Free text to resolve (a place name, or a "lat, lng" pair)
    query: String,

    /// Center the nearby-feature search on this "lat, lng" position first
    #[arg(long)]
    near: Option<String>,

    /// Print the recent-locations list after the search
    #[arg(long)]
    recent: bool,
}

fn main() -> Result<()> {
    // Writes to /tmp/civiq-debug.log at DEBUG level
    #[cfg(debug_assertions)]
    {
        use std::io::Write;

        let log_file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open("/tmp/civiq-debug.log")
            .expect("Failed to open /tmp/civiq-debug.log");

        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Debug)
            .target(env_logger::Target::Pipe(Box::new(log_file)))
            .format(|buf, record| {
                use std::time::SystemTime;
                let datetime: chrono::DateTime<chrono::Local> = SystemTime::now().into();
                writeln!(
                    buf,
                    "[{}] [{}] {}",
                    datetime.format("%Y-%m-%dT%H:%M:%S%.3f"),
                    record.level(),
                    record.args()
                )
            })
            .init();

        log::debug!("=== CIVIQ DEBUG SESSION STARTED ===");
    }

    color_eyre::install()?;

    let config_result = config::load_config();
    if let Some(warning) = &config_result.warning {
        eprintln!("Warning: {warning}");
    }

    let args = Args::parse();

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    rt.block_on(run(args, config_result.config))?;

    #[cfg(debug_assertions)]
    log::debug!("=== CIVIQ DEBUG SESSION ENDED ===");

    Ok(())
}

async fn run(args: Args, config: config::Config) -> Result<()> {
    let mut app = App::new(
        &config,
        Box::new(LoggingMapSurface),
        Box::new(FileStore::new()),
    );
    app.init_map();

    // Seed the resident nearby set so typed text can match against it,
    // mirroring what the map-position fetch does in the full application.
    if let Some(near) = &args.near {
        match parse_latlng(near) {
            Some(coords) => app.on_map_moved(coords).await,
            None => eprintln!("Ignoring --near: expected \"lat, lng\", got {near:?}"),
        }
    }

    app.on_input(&args.query);
    // One-shot driver: skip the interactive debounce and search immediately.
    app.search_now().await;

    if let Some(status) = app.status() {
        eprintln!("{status}");
    }
    if let Some(panel) = app.session.panel() {
        print_panel(panel);
    }

    if args.recent {
        println!();
        println!("Recent locations:");
        for entry in app.recent() {
            println!("  {} ({})", entry.name, entry.coords.display());
        }
    }

    Ok(())
}

fn print_panel(panel: &merge::SuggestionPanel) {
    if let Some(hint) = panel.hint {
        println!("{hint}");
    }
    if !panel.recent.is_empty() {
        println!("{RECENT_SECTION_TITLE}:");
        for c in &panel.recent {
            println!("  {} ({})", c.name, c.coords.display());
        }
    }
    if !panel.nearby.is_empty() {
        println!("{NEARBY_SECTION_TITLE}:");
        for c in &panel.nearby {
            let category = c.category.as_deref().unwrap_or("other");
            println!("  {} [{}] ({})", c.name, category, c.coords.display());
        }
    }
    if !panel.geocoded.is_empty() {
        println!("{GEOCODED_SECTION_TITLE}:");
        for c in &panel.geocoded {
            match &c.locality {
                Some(locality) => println!("  {} — {} ({})", c.name, locality, c.coords.display()),
                None => println!("  {} ({})", c.name, c.coords.display()),
            }
        }
    }
    println!("{USE_MAP_AFFORDANCE}");
}

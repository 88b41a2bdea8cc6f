//! Octo Browse - a browser shell driven from the terminal.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

use browser::commands::{self, Command, HELP};
use browser::{http, load_config, HeadlessEngine};
use shell::{EventChannel, Session, Sidebar, UserAction};

/// Octo Browse - a browser shell driven from the terminal
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// URL to open (defaults to the configured homepage)
    url: Option<String>,

    /// Config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Start with ad blocking enabled
    #[arg(long)]
    ad_block: bool,

    /// Start in incognito mode
    #[arg(long)]
    incognito: bool,

    /// User agent string
    #[arg(long)]
    user_agent: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("Octo Browse v{}", browser::VERSION);

    let mut config = load_config(args.config.as_deref())?;
    if let Some(user_agent) = args.user_agent {
        config = config.with_user_agent(user_agent);
    }
    if args.ad_block {
        config = config.with_ad_block(true);
    }
    if args.incognito {
        config = config.with_incognito(true);
    }

    let channel = EventChannel::new();
    let engine = HeadlessEngine::new(channel.sender(), &config.general.user_agent)
        .context("failed to start engine")?;
    let services = http::services(&config).context("failed to set up http services")?;
    let mut session = Session::new(config, Box::new(engine), services, channel)
        .context("failed to start session")?;

    if let Some(url) = args.url {
        session.dispatch(UserAction::Navigate(url));
    }
    session.dispatch(UserAction::RefreshWidgets);

    run(&mut session).await?;

    // Cleanup
    session.shutdown();
    info!("Browser shutdown complete");

    Ok(())
}

/// Read commands from stdin until `quit` or end of input, dispatching
/// background completions as they arrive.
async fn run(session: &mut Session) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("Type `help` for commands.");

    loop {
        print_notices(session);

        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match commands::parse(&line) {
                    Ok(Command::Action(action)) => session.dispatch(action),
                    Ok(Command::RunExtensionFile(path)) => match std::fs::read_to_string(&path) {
                        Ok(source) => session.dispatch(UserAction::RunExtension(source)),
                        Err(err) => eprintln!("cannot read {}: {err}", path.display()),
                    },
                    Ok(Command::Encrypt(plaintext)) => match session.encrypt_credential(&plaintext) {
                        Ok(ciphertext) => println!("{ciphertext}"),
                        Err(err) => eprintln!("{err}"),
                    },
                    Ok(Command::Decrypt(ciphertext)) => match session.decrypt_credential(&ciphertext) {
                        Ok(plaintext) => println!("{plaintext}"),
                        Err(err) => eprintln!("{err}"),
                    },
                    Ok(Command::Status) => print_status(session),
                    Ok(Command::Help) => println!("{HELP}"),
                    Ok(Command::Quit) => break,
                    Ok(Command::Nothing) => {}
                    Err(err) => eprintln!("{err}"),
                }
                session.try_process_pending();
            }
            _ = session.process_next() => {}
        }
    }

    Ok(())
}

fn print_notices(session: &mut Session) {
    for notice in session.drain_notices() {
        let level = if notice.is_error() { "error" } else { "info" };
        println!("[{level}] {}: {}", notice.title, notice.message);
    }
}

fn print_status(session: &Session) {
    for tab in session.tabs().tabs() {
        let marker = if session.tabs().is_active(tab.id()) { '*' } else { ' ' };
        println!(
            "{marker} {} {:>3}% zoom {:.1}  {}  {}",
            tab.id().0,
            tab.progress(),
            tab.zoom(),
            tab.title(),
            tab.url()
        );
    }
    let focus = if session.address_bar().is_focused() { " (focused)" } else { "" };
    println!("address: {}{focus}", session.address_bar().text());

    let flags = session.flags();
    println!(
        "dark mode: {}  ad block: {}  incognito: {}  fullscreen: {}",
        flags.dark_mode, flags.ad_block, flags.incognito, flags.fullscreen
    );
    if let Some(background) = session.appearance().window_background() {
        println!("window background: {background}");
    }

    println!("{}", session.widgets().weather);
    for headline in &session.widgets().news {
        println!("  - {headline}");
    }
    println!(
        "history: {}  bookmarks: {}  notes: {}",
        session.history().len(),
        session.bookmarks().len(),
        session.notes().len()
    );
    let sidebars = session.sidebars();
    if sidebars.is_visible(Sidebar::History) {
        println!("history:\n{}", session.history().entries().join("\n"));
    }
    if sidebars.is_visible(Sidebar::Bookmarks) {
        println!("bookmarks:\n{}", session.bookmarks().bookmarks().join("\n"));
    }
    if sidebars.is_visible(Sidebar::Notes) {
        println!("{}", session.notes().render_sidebar());
    }
    if let Some(source) = session.page_source() {
        println!("source of {} ({} bytes):\n{}", source.tab, source.html.len(), source.html);
    }
}

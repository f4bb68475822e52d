//! Terminal front end for the settings page.
//!
//! Shows and edits settings, and runs the pairing workflows interactively,
//! reading operator input from stdin.

use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tracing_subscriber::EnvFilter;

use roulette_settings_lib::SettingsConsole;
use roulette_settings_lib::notify::{Notice, NoticeLevel};
use roulette_settings_lib::pairing::{
    ExternalWindow, PairingParams, Prompt, SessionInput, SessionSnapshot, SessionState,
    WindowOpener,
};
use roulette_settings_lib::shutdown::graceful_shutdown;
use settings_tree::OVERRIDE_GROUPS;
use settings_tree::defaults::get_default;

#[derive(Parser)]
#[command(name = "roulette-settings", version, about = "Movie Roulette settings console")]
struct Cli {
    /// Backend base URL; overrides ROULETTE_BACKEND_URL.
    #[arg(long)]
    backend: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the settings tree, or the effective value at one path.
    Show { path: Option<String> },
    /// List settings pinned by environment variables.
    Overrides,
    /// Report enabled integrations with missing settings.
    Status,
    /// Change one setting. The value is parsed as JSON when possible.
    Set { path: String, value: String },
    /// Link an integration interactively. Type `cancel` to abort.
    Link {
        #[command(subcommand)]
        target: LinkTarget,
    },
    /// Scan the network for devices.
    Scan { device: Device },
    PlexLibraries,
    PlexUsers,
    /// Log in to Jellyfin; the password is read from stdin.
    JellyfinLogin { url: String, username: String },
    JellyfinUsers,
    TraktStatus,
    TraktDisconnect,
}

#[derive(Subcommand)]
enum LinkTarget {
    Trakt,
    Plex,
    Appletv { device_id: String },
    Lgtv,
}

#[derive(Clone, Copy, ValueEnum)]
enum Device {
    Appletv,
    Lgtv,
}

/// Prints authorization URLs instead of opening a browser.
struct TerminalWindows;

struct TerminalWindow {
    closed: bool,
}

impl WindowOpener for TerminalWindows {
    fn open(&self, url: &str) -> Option<Box<dyn ExternalWindow>> {
        println!("Open this page in your browser:\n  {url}");
        Some(Box::new(TerminalWindow { closed: false }))
    }
}

impl ExternalWindow for TerminalWindow {
    fn is_closed(&self) -> bool {
        self.closed
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = roulette_settings_lib::init_foundation()?;
    if let Some(url) = cli.backend {
        config.backend_url = url;
    }
    let console = SettingsConsole::connect(config, Arc::new(TerminalWindows)).await?;

    match cli.command {
        Command::Show { path } => show(&console, path.as_deref()).await?,
        Command::Overrides => overrides(&console).await,
        Command::Status => status(&console).await,
        Command::Set { path, value } => {
            let value = serde_json::from_str(&value).unwrap_or(Value::String(value));
            let stored = console.submit(&path, value).await?;
            println!("{path} = {stored}");
        }
        Command::Link { target } => {
            let params = match target {
                LinkTarget::Trakt => PairingParams::TraktCode,
                LinkTarget::Plex => PairingParams::PlexPin,
                LinkTarget::Appletv { device_id } => PairingParams::AppleTvPin { device_id },
                LinkTarget::Lgtv => PairingParams::LgTvScan,
            };
            link(&console, params).await?;
        }
        Command::Scan { device } => scan(&console, device).await,
        Command::PlexLibraries => print_list(console.integrations().plex_libraries().await?),
        Command::PlexUsers => print_list(console.integrations().plex_users().await?),
        Command::JellyfinLogin { url, username } => {
            println!("Password:");
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            let password = lines.next_line().await?.unwrap_or_default();
            let auth = console
                .integrations()
                .jellyfin_login(&url, &username, &password)
                .await?;
            println!("Logged in as user {}", auth.user_id);
        }
        Command::JellyfinUsers => print_list(console.integrations().jellyfin_users().await?),
        Command::TraktStatus => {
            let status = console.integrations().trakt_status().await?;
            println!(
                "connected: {}\nenabled: {}\nenv controlled: {}",
                status.connected, status.enabled, status.env_controlled
            );
        }
        Command::TraktDisconnect => {
            console.integrations().trakt_disconnect().await?;
            println!("Trakt disconnected");
        }
    }
    Ok(())
}

async fn show(console: &SettingsConsole, path: Option<&str>) -> anyhow::Result<()> {
    let snapshot = console.store().snapshot().await;
    match path {
        Some(path) => {
            let value = snapshot.effective(path).unwrap_or(Value::Null);
            let note = if snapshot.resolve(path).overridden {
                " (env)"
            } else if get_default(path).is_some_and(|d| d == value) {
                " (default)"
            } else {
                ""
            };
            println!("{path} = {value}{note}");
        }
        None => println!("{}", serde_json::to_string_pretty(&snapshot.settings)?),
    }
    Ok(())
}

async fn overrides(console: &SettingsConsole) {
    let snapshot = console.store().snapshot().await;
    for group in OVERRIDE_GROUPS {
        let toggle = snapshot.resolve(group.toggle);
        if toggle.env_enabled {
            println!("{} (enabled by environment)", group.toggle);
        } else if toggle.overridden {
            println!("{}", group.toggle);
        }
        for member in group.members {
            if snapshot.resolve(member).overridden {
                println!("{member}");
            }
        }
    }
}

async fn status(console: &SettingsConsole) {
    let status = console.store().snapshot().await.feature_status();
    if status.is_ready() {
        println!("All enabled integrations are configured");
    }
    for missing in &status.missing_settings {
        println!("missing: {missing}");
    }
    for warning in &status.warnings {
        println!("warning: {warning}");
    }
}

async fn scan(console: &SettingsConsole, device: Device) {
    match device {
        Device::Appletv => {
            for tv in console.integrations().appletv_scan().await {
                let name = tv.name.as_deref().unwrap_or("Apple TV");
                println!("{}  {name}", tv.identifier);
            }
        }
        Device::Lgtv => {
            for tv in console.integrations().lgtv_scan().await {
                println!("{}  {}", tv.ip, tv.mac);
            }
        }
    }
}

fn print_list(items: Vec<String>) {
    for item in items {
        println!("{item}");
    }
}

async fn link(console: &SettingsConsole, params: PairingParams) -> anyhow::Result<()> {
    let mut notices = console.subscribe_notices();
    let handle = match console.pairing().start(params).await {
        Ok(handle) => handle,
        Err(e) => {
            drain_notices(&mut notices);
            return Err(e.into());
        }
    };

    let mut updates = handle.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut last_shown = None;

    loop {
        let snapshot = updates.borrow_and_update().clone();
        render(&snapshot, &mut last_shown);
        if snapshot.state.is_terminal() {
            break;
        }

        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            notice = notices.recv() => match notice {
                Ok(notice) => print_notice(&notice),
                Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            },
            line = lines.next_line(), if stdin_open => match line? {
                Some(line) if line.trim().eq_ignore_ascii_case("cancel") => handle.cancel(),
                Some(line) => match input_for(&snapshot, line.trim()) {
                    Some(input) => {
                        if let Err(e) = handle.send(input).await {
                            eprintln!("{e}");
                        }
                    }
                    None => eprintln!("Not expecting input right now"),
                },
                None => {
                    stdin_open = false;
                    handle.cancel();
                }
            },
            _ = tokio::signal::ctrl_c() => {
                graceful_shutdown(console).await;
            }
        }
    }

    handle.finished().await;
    drain_notices(&mut notices);
    Ok(())
}

fn input_for(snapshot: &SessionSnapshot, line: &str) -> Option<SessionInput> {
    if !snapshot.input_enabled {
        return None;
    }
    let SessionState::AwaitingUserAction(prompt) = &snapshot.state else {
        return None;
    };
    match prompt {
        Prompt::EnterCode { .. } => Some(SessionInput::Code(line.to_string())),
        Prompt::EnterPin { .. } => Some(SessionInput::Pin(line.to_string())),
        Prompt::ChooseDevice { candidates } => {
            if let Some(tv) = line
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| candidates.get(i))
            {
                return Some(SessionInput::Device {
                    ip: tv.ip.clone(),
                    mac: tv.mac.clone(),
                });
            }
            let mut parts = line.split_whitespace();
            Some(SessionInput::Device {
                ip: parts.next().unwrap_or_default().to_string(),
                mac: parts.collect::<String>(),
            })
        }
    }
}

/// Print what the session needs, once per distinct state.
fn render(snapshot: &SessionSnapshot, last_shown: &mut Option<(SessionState, u32)>) {
    let key = (snapshot.state.clone(), snapshot.attempts);
    if last_shown.as_ref() == Some(&key) {
        return;
    }
    *last_shown = Some(key);

    match &snapshot.state {
        SessionState::Init => {}
        SessionState::AwaitingUserAction(Prompt::EnterCode { .. }) => {
            println!("Paste the code shown after authorizing:");
        }
        SessionState::AwaitingUserAction(Prompt::EnterPin { round, .. }) => {
            println!("Enter the 4-digit PIN shown on the Apple TV (round {round}):");
        }
        SessionState::AwaitingUserAction(Prompt::ChooseDevice { candidates }) => {
            for (i, tv) in candidates.iter().enumerate() {
                println!("  {}) {}  {}", i + 1, tv.ip, tv.mac);
            }
            println!("Pick a number, or type `<ip> <mac>`:");
        }
        SessionState::Polling { pin, .. } => {
            let limit = snapshot
                .attempt_limit
                .map(|l| l.to_string())
                .unwrap_or_else(|| "?".into());
            println!(
                "Waiting for approval of PIN {pin} ({}/{limit})",
                snapshot.attempts
            );
        }
        SessionState::Success
        | SessionState::Failure(_)
        | SessionState::Timeout
        | SessionState::Cancelled => {}
    }
}

fn print_notice(notice: &Notice) {
    match notice.level {
        NoticeLevel::Success | NoticeLevel::Info => println!("{}", notice.message),
        NoticeLevel::Error => eprintln!("error: {}", notice.message),
    }
}

fn drain_notices(notices: &mut tokio::sync::broadcast::Receiver<Notice>) {
    loop {
        match notices.try_recv() {
            Ok(notice) => print_notice(&notice),
            Err(TryRecvError::Lagged(_)) => {}
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
}

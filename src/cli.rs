use clap::{Args, Parser, Subcommand};
use std::io::ErrorKind;
use std::path::PathBuf;

pub(crate) enum RunOutcome {
    Check(satchel::config::ClientConfig),
    Exit(i32),
}

pub(crate) fn run() -> RunOutcome {
    let cli = Cli::parse();
    match cli.command {
        Command::Init(args) => RunOutcome::Exit(run_init(args)),
        Command::FreePort(args) => RunOutcome::Exit(run_free_port(args)),
        Command::Check(args) => match resolve_client_config(&args) {
            Ok(config) => RunOutcome::Check(config),
            Err(err) => {
                eprintln!("error: {err}");
                RunOutcome::Exit(2)
            }
        },
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "satchel",
    version,
    about = "Setup and diagnostics for the satchel workspace client"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a VAPID key pair for the push messaging server identity.
    Init(InitArgs),
    /// Terminate whatever is listening on a local TCP port.
    FreePort(FreePortArgs),
    /// Reach the configured server and print its app settings.
    Check(CheckArgs),
}

#[derive(Args, Debug)]
struct InitArgs {
    #[arg(long)]
    subject: Option<String>,
}

#[derive(Args, Debug)]
struct FreePortArgs {
    #[arg(long)]
    port: u16,
}

#[derive(Args, Debug)]
struct CheckArgs {
    #[arg(long, env = "SATCHEL_CONFIG")]
    config: Option<PathBuf>,
    #[arg(long, env = "SATCHEL_BASE_URL")]
    base_url: Option<String>,
}

fn run_init(args: InitArgs) -> i32 {
    let keypair = match satchel::generate_vapid_keypair() {
        Ok(keypair) => keypair,
        Err(err) => {
            eprintln!("failed to generate VAPID key pair: {err}");
            return 1;
        }
    };
    let (subject, show_subject_note) = match args.subject {
        Some(subject) => (subject, false),
        None => ("mailto:you@example.com".to_string(), true),
    };

    println!("VAPID key pair generated.");
    println!();
    println!("SATCHEL_VAPID_PRIVATE_KEY=\"{}\"", keypair.private_key);
    println!("SATCHEL_VAPID_PUBLIC_KEY=\"{}\"", keypair.public_key);
    println!("SATCHEL_VAPID_SUBJECT=\"{subject}\"");
    if show_subject_note {
        println!();
        println!("Note: replace SATCHEL_VAPID_SUBJECT with a contact URI you control.");
    }
    0
}

fn run_free_port(args: FreePortArgs) -> i32 {
    let pids = match listener_pids(args.port) {
        Ok(pids) => pids,
        Err(err) => {
            eprintln!("failed to inspect listening sockets: {err}");
            return 1;
        }
    };
    if pids.is_empty() {
        println!("no process is listening on port {}", args.port);
        return 0;
    }

    let mut system = sysinfo::System::new();
    system.refresh_processes(sysinfo::ProcessesToUpdate::All, true);
    let mut failures = 0;
    for pid in pids {
        let Some(process) = system.process(sysinfo::Pid::from_u32(pid)) else {
            eprintln!("pid {pid} disappeared before it could be killed");
            continue;
        };
        let name = process.name().to_string_lossy().to_string();
        if process.kill() {
            println!("killed {name} (pid {pid}) on port {}", args.port);
        } else {
            eprintln!("failed to kill {name} (pid {pid})");
            failures += 1;
        }
    }
    if failures > 0 { 1 } else { 0 }
}

/// Pids with a socket in LISTEN state on `port`, resolved through the Linux
/// socket table and each process's fd links.
fn listener_pids(port: u16) -> std::io::Result<Vec<u32>> {
    let mut inodes = Vec::new();
    for table in ["/proc/net/tcp", "/proc/net/tcp6"] {
        match std::fs::read_to_string(table) {
            Ok(contents) => inodes.extend(listening_socket_inodes(&contents, port)),
            Err(err) if err.kind() == ErrorKind::NotFound => continue,
            Err(err) => return Err(err),
        }
    }
    if inodes.is_empty() {
        return Ok(Vec::new());
    }

    let mut pids = Vec::new();
    for entry in std::fs::read_dir("/proc")? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(pid) = name.to_str().and_then(|name| name.parse::<u32>().ok()) else {
            continue;
        };
        // fd listings of other users' processes are unreadable; skip them.
        let Ok(fds) = std::fs::read_dir(entry.path().join("fd")) else {
            continue;
        };
        for fd in fds.flatten() {
            if let Ok(target) = std::fs::read_link(fd.path())
                && let Some(target) = target.to_str()
                && let Some(inode) = parse_socket_inode(target)
                && inodes.contains(&inode)
            {
                pids.push(pid);
                break;
            }
        }
    }
    pids.sort_unstable();
    pids.dedup();
    Ok(pids)
}

const TCP_LISTEN_STATE: &str = "0A";

fn listening_socket_inodes(table: &str, port: u16) -> Vec<u64> {
    table
        .lines()
        .skip(1)
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            let local = fields.get(1)?;
            let state = fields.get(3)?;
            let inode = fields.get(9)?;
            if *state != TCP_LISTEN_STATE {
                return None;
            }
            let (_, local_port) = local.rsplit_once(':')?;
            let local_port = u16::from_str_radix(local_port, 16).ok()?;
            if local_port != port {
                return None;
            }
            inode.parse::<u64>().ok()
        })
        .collect()
}

fn parse_socket_inode(target: &str) -> Option<u64> {
    target.strip_prefix("socket:[")?.strip_suffix(']')?.parse().ok()
}

fn resolve_client_config(args: &CheckArgs) -> Result<satchel::config::ClientConfig, String> {
    if let Some(base_url) = args.base_url.as_deref() {
        if base_url.trim().is_empty() {
            return Err("base url cannot be empty".to_string());
        }
        return Ok(satchel::config::ClientConfig::new(base_url));
    }
    if let Some(path) = args.config.as_ref() {
        return satchel::config::ClientConfig::load(path).map_err(|err| err.to_string());
    }
    Err("pass --base-url or --config (or set SATCHEL_BASE_URL)".to_string())
}

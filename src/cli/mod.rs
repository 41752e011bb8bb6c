//! CLI argument definitions for stubdeck.

use clap::{Parser, Subcommand};

/// Stubdeck - a terminal admin console for WireMock-style mock servers.
///
/// Point it at a running server with `--url` (or `SD_URL`), then browse
/// with subcommands or start the full console with `sd tui`.
#[derive(Parser, Debug)]
#[command(name = "sd")]
#[command(author, version, about = "Terminal admin console for WireMock-style mock servers", long_about = None)]
#[command(long_version = concat!(
    env!("CARGO_PKG_VERSION"),
    " (commit ", env!("SD_GIT_COMMIT"),
    ", built ", env!("SD_BUILD_TIMESTAMP"), ")"
))]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    /// Admin base URL of the mock server (e.g. http://localhost:8080).
    /// Can also be set via SD_URL or the config file.
    #[arg(short = 'u', long = "url", global = true, env = "SD_URL")]
    pub url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Stub mapping commands
    Mapping {
        #[command(subcommand)]
        command: MappingCommands,
    },

    /// Request journal commands
    Request {
        #[command(subcommand)]
        command: RequestCommands,
    },

    /// Scenario commands
    Scenario {
        #[command(subcommand)]
        command: ScenarioCommands,
    },

    /// Traffic recording commands
    Record {
        #[command(subcommand)]
        command: RecordCommands,
    },

    /// Proxy configuration commands
    Proxy {
        #[command(subcommand)]
        command: ProxyCommands,
    },

    /// Fetch a server-side file by name
    File {
        /// File name as known to the server
        name: String,
    },

    /// Reset mappings and the request journal to defaults
    Reset,

    /// Shut the mock server down
    Shutdown,

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Start the full-screen console
    Tui,
}

/// Mapping subcommands
#[derive(Subcommand, Debug)]
pub enum MappingCommands {
    /// List stub mappings
    List {
        /// Filter by search query (regex, falling back to substring)
        #[arg(short, long)]
        search: Option<String>,

        /// Match case-sensitively
        #[arg(long)]
        case_sensitive: bool,

        /// Render the foldered tree in human output
        #[arg(long)]
        tree: bool,
    },

    /// Show one mapping by id
    Get {
        /// Mapping id or uuid
        id: String,
    },

    /// Create a mapping from a JSON file (or stdin with -)
    Create {
        /// Path to the mapping JSON, or - for stdin
        file: String,
    },

    /// Update a mapping from a JSON file (or stdin with -)
    Update {
        /// Mapping id or uuid
        id: String,

        /// Path to the mapping JSON, or - for stdin
        file: String,
    },

    /// Delete a mapping
    Delete {
        /// Mapping id or uuid
        id: String,
    },

    /// Persist in-memory mappings to the server's backing store
    Save,

    /// Restore mappings from the server's backing store
    Reset,
}

/// Request journal subcommands
#[derive(Subcommand, Debug)]
pub enum RequestCommands {
    /// List journaled requests (matched and unmatched)
    List {
        /// Filter by search query (regex, falling back to substring)
        #[arg(short, long)]
        search: Option<String>,

        /// Match case-sensitively
        #[arg(long)]
        case_sensitive: bool,
    },

    /// List requests no mapping matched
    Unmatched {
        /// Filter by search query (regex, falling back to substring)
        #[arg(short, long)]
        search: Option<String>,

        /// Match case-sensitively
        #[arg(long)]
        case_sensitive: bool,
    },

    /// Clear the request journal
    Clear,
}

/// Scenario subcommands
#[derive(Subcommand, Debug)]
pub enum ScenarioCommands {
    /// List scenarios and their current states
    List,

    /// Show a scenario's state machine
    Show {
        /// Scenario name
        name: String,
    },

    /// Reset all scenarios to their start states
    Reset,
}

/// Recording subcommands
#[derive(Subcommand, Debug)]
pub enum RecordCommands {
    /// Start recording traffic proxied to a target
    Start {
        /// Base URL traffic is forwarded to while recording
        target: String,
    },

    /// Stop recording and list the captured mappings
    Stop,

    /// Snapshot the request journal into mappings
    Snapshot,

    /// Show recorder status
    Status,
}

/// Proxy subcommands
#[derive(Subcommand, Debug)]
pub enum ProxyCommands {
    /// List proxy configurations
    List,

    /// Create or update a proxy configuration from a JSON file (or stdin with -)
    Set {
        /// Path to the proxy JSON, or - for stdin
        file: String,
    },

    /// Delete a proxy configuration
    Delete {
        /// Proxy id
        id: String,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show resolved configuration and where each value came from
    Show,

    /// Print the config file path
    Path,
}

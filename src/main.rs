//! Stubdeck CLI - terminal admin console for WireMock-style mock servers.

use clap::Parser;
use std::process;
use stubdeck::cli::{
    Cli, Commands, ConfigCommands, MappingCommands, ProxyCommands, RecordCommands,
    RequestCommands, ScenarioCommands,
};
use stubdeck::client::AdminClient;
use stubdeck::commands::{self, Output};
use stubdeck::config::{self, SdConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // The TUI owns the terminal and logs to a file instead; see tui::run.
    let is_tui = matches!(cli.command, Some(Commands::Tui));
    if !is_tui {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init();
    }

    let config = match SdConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: ignoring unreadable config: {}", e);
            SdConfig::default()
        }
    };
    let human = config::resolve_human(cli.human_readable, &config);
    let url = config::resolve_url(cli.url.as_deref(), &config).url;

    let result = run_command(cli.command, &url, cli.url.as_deref(), human, &config).await;

    if let Err(e) = result {
        if human {
            eprintln!("Error: {}", e);
        } else {
            eprintln!("{}", serde_json::json!({ "error": e.to_string() }));
        }
        process::exit(1);
    }
}

async fn run_command(
    command: Option<Commands>,
    url: &str,
    flag_url: Option<&str>,
    human: bool,
    config: &SdConfig,
) -> Result<(), stubdeck::Error> {
    match command {
        Some(Commands::Mapping { command }) => {
            let client = AdminClient::new(url)?;
            match command {
                MappingCommands::List {
                    search,
                    case_sensitive,
                    tree,
                } => {
                    let result =
                        commands::mapping_list(&client, search.as_deref(), case_sensitive, tree)
                            .await?;
                    output(&result, human);
                }
                MappingCommands::Get { id } => {
                    output(&commands::mapping_get(&client, &id).await?, human);
                }
                MappingCommands::Create { file } => {
                    output(&commands::mapping_create(&client, &file).await?, human);
                }
                MappingCommands::Update { id, file } => {
                    output(&commands::mapping_update(&client, &id, &file).await?, human);
                }
                MappingCommands::Delete { id } => {
                    output(&commands::mapping_delete(&client, &id).await?, human);
                }
                MappingCommands::Save => {
                    output(&commands::mapping_save(&client).await?, human);
                }
                MappingCommands::Reset => {
                    output(&commands::mapping_reset(&client).await?, human);
                }
            }
            Ok(())
        }
        Some(Commands::Request { command }) => {
            let client = AdminClient::new(url)?;
            match command {
                RequestCommands::List {
                    search,
                    case_sensitive,
                } => {
                    let result =
                        commands::request_list(&client, search.as_deref(), case_sensitive).await?;
                    output(&result, human);
                }
                RequestCommands::Unmatched {
                    search,
                    case_sensitive,
                } => {
                    let result =
                        commands::request_unmatched(&client, search.as_deref(), case_sensitive)
                            .await?;
                    output(&result, human);
                }
                RequestCommands::Clear => {
                    output(&commands::request_clear(&client).await?, human);
                }
            }
            Ok(())
        }
        Some(Commands::Scenario { command }) => {
            let client = AdminClient::new(url)?;
            match command {
                ScenarioCommands::List => {
                    output(&commands::scenario_list(&client).await?, human);
                }
                ScenarioCommands::Show { name } => {
                    output(&commands::scenario_show(&client, &name).await?, human);
                }
                ScenarioCommands::Reset => {
                    output(&commands::scenario_reset(&client).await?, human);
                }
            }
            Ok(())
        }
        Some(Commands::Record { command }) => {
            let client = AdminClient::new(url)?;
            match command {
                RecordCommands::Start { target } => {
                    output(&commands::record_start(&client, &target).await?, human);
                }
                RecordCommands::Stop => {
                    output(&commands::record_stop(&client).await?, human);
                }
                RecordCommands::Snapshot => {
                    output(&commands::record_snapshot(&client).await?, human);
                }
                RecordCommands::Status => {
                    output(&commands::record_status(&client).await?, human);
                }
            }
            Ok(())
        }
        Some(Commands::Proxy { command }) => {
            let client = AdminClient::new(url)?;
            match command {
                ProxyCommands::List => {
                    output(&commands::proxy_list(&client).await?, human);
                }
                ProxyCommands::Set { file } => {
                    output(&commands::proxy_set(&client, &file).await?, human);
                }
                ProxyCommands::Delete { id } => {
                    output(&commands::proxy_delete(&client, &id).await?, human);
                }
            }
            Ok(())
        }
        Some(Commands::File { name }) => {
            let client = AdminClient::new(url)?;
            output(&commands::file_get(&client, &name).await?, human);
            Ok(())
        }
        Some(Commands::Reset) => {
            let client = AdminClient::new(url)?;
            output(&commands::server_reset(&client).await?, human);
            Ok(())
        }
        Some(Commands::Shutdown) => {
            let client = AdminClient::new(url)?;
            output(&commands::server_shutdown(&client).await?, human);
            Ok(())
        }
        Some(Commands::Config { command }) => {
            match command {
                ConfigCommands::Show => {
                    output(&commands::config_show(flag_url, human, config), human);
                }
                ConfigCommands::Path => match config::config_file_path() {
                    Some(path) => println!("{}", path.display()),
                    None => println!("<none>"),
                },
            }
            Ok(())
        }
        Some(Commands::Tui) => stubdeck::tui::run(url).await,
        None => {
            // No subcommand: show resolved config as an orientation aid.
            output(&commands::config_show(flag_url, human, config), human);
            Ok(())
        }
    }
}

fn output(result: &impl Output, human: bool) {
    commands::print(result, human);
}

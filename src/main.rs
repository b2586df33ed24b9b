use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, info};

use treestore::{hash_password, Config, FolderId, NewFile, Store, StoreError, UserId};

#[derive(Parser)]
#[command(name = "treestore")]
#[command(about = "Per-user folder trees with files stored in SQLite")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a user and print its access credential
    Register { username: String, password: String },
    /// Show the user a credential belongs to
    Whoami { credential: String },
    /// Create a folder under a parent folder
    Mkdir {
        credential: String,
        parent_id: FolderId,
        name: String,
    },
    /// List a folder (the root when no id is given)
    Ls {
        credential: String,
        folder_id: Option<FolderId>,
        /// Print the listing as JSON
        #[arg(long)]
        json: bool,
    },
    /// Upload a local file into a folder, replacing a file of the same name
    Put {
        credential: String,
        folder_id: FolderId,
        file: PathBuf,
    },
    /// Download a file to a local path
    Get {
        credential: String,
        file_id: i64,
        dest: PathBuf,
    },
    /// Print the path from the root to a folder
    Path {
        credential: String,
        folder_id: FolderId,
    },
    /// Delete a file
    Rm { credential: String, file_id: i64 },
    /// Delete a folder and everything below it
    Rmdir {
        credential: String,
        folder_id: FolderId,
    },
}


async fn authenticate(store: &Store, credential: &str) -> treestore::Result<UserId> {
    Ok(store.get_user_by_credential(credential).await?.user_id)
}

async fn run(store: &Store, command: Commands) -> treestore::Result<()> {
    match command {
        Commands::Register { username, password } => {
            if store.username_exists(&username).await? {
                return Err(StoreError::Conflict("username already taken".to_string()));
            }
            let verifier =
                hash_password(&password).map_err(|e| StoreError::Validation(e.to_string()))?;
            store.create_user(&username, &verifier).await?;
            let access = store.get_user_by_username(&username).await?;
            println!("user id:     {}", access.user_id);
            println!("credential:  {}", access.credential);
            println!("root folder: {}", access.root_folder_id);
        }
        Commands::Whoami { credential } => {
            let user_id = authenticate(store, &credential).await?;
            let root = store.ensure_root(user_id).await?;
            println!("user id: {user_id}, root folder: {root}");
        }
        Commands::Mkdir {
            credential,
            parent_id,
            name,
        } => {
            let user_id = authenticate(store, &credential).await?;
            let folder = store.create_folder(user_id, parent_id, &name).await?;
            println!("{}", folder.id);
        }
        Commands::Ls {
            credential,
            folder_id,
            json,
        } => {
            let user_id = authenticate(store, &credential).await?;
            let folder_id = match folder_id {
                Some(id) => id,
                None => store.ensure_root(user_id).await?,
            };
            let items = store.list_items(user_id, folder_id).await?;
            if json {
                let out = serde_json::to_string_pretty(&items)
                    .map_err(|e| StoreError::Validation(e.to_string()))?;
                println!("{out}");
            } else {
                println!("{}", store.resolve_path(user_id, folder_id).await?);
                for item in &items {
                    let marker = if item.is_container() { "d" } else { "-" };
                    println!(
                        "{marker} {:>8} {:>10} {} {}",
                        item.id(),
                        item.size(),
                        item.created_at().format("%Y-%m-%d %H:%M"),
                        item.name()
                    );
                }
            }
        }
        Commands::Put {
            credential,
            folder_id,
            file,
        } => {
            let user_id = authenticate(store, &credential).await?;
            let name = file
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| StoreError::Validation("file has no usable name".to_string()))?
                .to_string();
            let content = tokio::fs::read(&file).await?;
            let saved = store
                .save_file(user_id, &NewFile::new(folder_id, name, content))
                .await?;
            println!("{} ({} bytes)", saved.id, saved.size);
        }
        Commands::Get {
            credential,
            file_id,
            dest,
        } => {
            let user_id = authenticate(store, &credential).await?;
            let stored = store.get_file(user_id, file_id).await?;
            tokio::fs::write(&dest, &stored.content).await?;
            println!("{} -> {}", stored.name, dest.display());
        }
        Commands::Path {
            credential,
            folder_id,
        } => {
            let user_id = authenticate(store, &credential).await?;
            println!("{}", store.resolve_path(user_id, folder_id).await?);
        }
        Commands::Rm {
            credential,
            file_id,
        } => {
            let user_id = authenticate(store, &credential).await?;
            store.delete_file(user_id, file_id).await?;
        }
        Commands::Rmdir {
            credential,
            folder_id,
        } => {
            let user_id = authenticate(store, &credential).await?;
            store.delete_folder(user_id, folder_id).await?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = match Config::load_or_default(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration in {}: {e}", cli.config.display());
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = treestore::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        treestore::logging::init_console_only(&config.logging.level);
    }

    let store = match Store::open(&config).await {
        Ok(store) => store,
        Err(e) => {
            error!("Failed to open store: {e}");
            return ExitCode::FAILURE;
        }
    };
    info!("Store ready at {}", config.database.path);

    let result = run(&store, cli.command).await;
    store.close().await;

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

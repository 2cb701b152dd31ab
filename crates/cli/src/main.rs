//! Pocket Cart CLI - Inspect and edit a file-backed cart.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart
//! cart list
//!
//! # Add a product
//! cart add --id a --title Shirt --image-url https://img/shirt.png --price 10
//!
//! # Adjust quantities
//! cart increment a
//! cart decrement a
//!
//! # Use a different data directory
//! cart --data-dir /tmp/carts list
//! ```
//!
//! # Commands
//!
//! - `list` - Print the cart
//! - `add` - Add one unit of a product
//! - `increment` / `decrement` - Change a product's quantity by one
//! - `remove` - Drop a product from the cart
//! - `clear` - Empty the cart

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use pocket_cart::DecrementPolicy;

mod commands;

use commands::cart::{AddArgs, StoreOptions};

#[derive(Parser)]
#[command(name = "cart")]
#[command(author, version, about = "Pocket Cart CLI tools")]
struct Cli {
    /// Directory the cart is stored in (overrides `CART_DATA_DIR`)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Storage key (overrides `CART_STORAGE_KEY`)
    #[arg(long, global = true)]
    key: Option<String>,

    /// What decrementing the last unit does (overrides `CART_DECREMENT_POLICY`)
    #[arg(long, global = true, value_enum)]
    policy: Option<PolicyArg>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the cart
    List,
    /// Add one unit of a product
    Add {
        /// Catalog product id
        #[arg(long)]
        id: String,

        /// Product title
        #[arg(long)]
        title: String,

        /// Product image URL
        #[arg(long, default_value = "")]
        image_url: String,

        /// Unit price (e.g. 19.99)
        #[arg(long)]
        price: String,
    },
    /// Add one unit of a product already in the cart
    Increment {
        /// Catalog product id
        id: String,
    },
    /// Take one unit of a product away
    Decrement {
        /// Catalog product id
        id: String,
    },
    /// Drop a product from the cart
    Remove {
        /// Catalog product id
        id: String,
    },
    /// Empty the cart
    Clear,
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    /// Remove the line-item
    Remove,
    /// Keep the line-item at one unit
    Clamp,
}

impl From<PolicyArg> for DecrementPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Remove => Self::Remove,
            PolicyArg::Clamp => Self::Clamp,
        }
    }
}

#[tokio::main]
async fn main() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pocket_cart=info,pocket_cart_cli=info".into());

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::cart::CommandError> {
    let options = StoreOptions {
        data_dir: cli.data_dir,
        key: cli.key,
        policy: cli.policy.map(DecrementPolicy::from),
    };

    match cli.command {
        Commands::List => commands::cart::list(&options).await?,
        Commands::Add {
            id,
            title,
            image_url,
            price,
        } => {
            let args = AddArgs {
                id,
                title,
                image_url,
                price,
            };
            commands::cart::add(&options, args).await?;
        }
        Commands::Increment { id } => commands::cart::increment(&options, &id).await?,
        Commands::Decrement { id } => commands::cart::decrement(&options, &id).await?,
        Commands::Remove { id } => commands::cart::remove(&options, &id).await?,
        Commands::Clear => commands::cart::clear(&options).await?,
    }
    Ok(())
}

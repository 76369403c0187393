//! Farmers Mandi CLI - browse, shop and manage the storefront from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Sign in (prompts for the password when --password is omitted)
//! mandi login -e asha@example.com
//!
//! # Browse and fill the cart
//! mandi products
//! mandi search tomato
//! mandi cart add 1 2
//!
//! # Place the order and look at it
//! mandi checkout --address "12 Market Road" --city Pune --state Maharashtra --zip 411001
//! mandi orders
//!
//! # Admin
//! mandi admin orders
//! mandi admin deliver 11 --payment cash
//! mandi admin ingest ./products.xlsx
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use mandi_client::{ClientConfig, ClientResult, Storefront};
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::TerminalNavigator;

#[derive(Parser)]
#[command(name = "mandi")]
#[command(author, version, about = "Farmers Mandi storefront CLI")]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with email and password
    Login {
        #[arg(short, long)]
        email: String,

        /// Read from stdin when omitted
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Create an account
    Signup {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        email: String,

        /// Delivery location
        #[arg(short, long)]
        location: String,

        /// Contact phone number
        #[arg(short, long)]
        contact: String,

        #[arg(short, long)]
        password: Option<String>,
    },
    /// Forget the saved session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// List products
    Products {
        #[arg(long, default_value_t = 0)]
        skip: i64,

        #[arg(long, default_value_t = mandi_client::catalog::DEFAULT_PAGE_SIZE)]
        limit: i64,
    },
    /// List products in a category
    Category { name: String },
    /// Search products by name
    Search { query: String },
    /// Show or change the cart
    Cart {
        #[command(subcommand)]
        action: Option<CartAction>,
    },
    /// Place an order for the cart
    Checkout(commands::shop::CheckoutArgs),
    /// Show your orders
    Orders,
    /// Show or edit your profile
    Profile {
        #[command(subcommand)]
        action: Option<ProfileAction>,
    },
    /// Admin order and product management
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Show or write the client configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart and its totals
    Show,
    /// Put a product in the cart
    Add {
        product_id: i64,
        #[arg(default_value_t = 1)]
        quantity: i64,
    },
    /// Change a line's quantity (0 removes it)
    Set { product_id: i64, quantity: i64 },
    /// Remove a product
    Remove { product_id: i64 },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Show the profile
    Show,
    /// Change profile fields
    Update {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        location: Option<String>,

        #[arg(long)]
        contact: Option<String>,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Pending, delivered and failed orders
    Orders,
    /// Mark a processing order delivered
    Deliver {
        order_id: i64,

        /// Payment note, e.g. "cash" or a UPI reference
        #[arg(long)]
        payment: Option<String>,
    },
    /// Upload a product spreadsheet (.xlsx or .xls)
    Ingest { file: PathBuf },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write the effective configuration to the config file
    Init,
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!(error = %e, "Command failed");
        eprintln!("{}", e.user_message());
        std::process::exit(1);
    }
}

/// Logs go to stderr so command output stays clean.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,mandi=debug,reqwest=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> ClientResult<()> {
    let config = ClientConfig::load(cli.config.clone())?;

    if let Commands::Config { action } = &cli.command {
        return match action {
            ConfigAction::Show => commands::config::show(&config),
            ConfigAction::Init => commands::config::init(&config, cli.config),
        };
    }

    let app = Storefront::connect(&config, Arc::new(TerminalNavigator))?;
    if let Err(e) = app.session.restore().await {
        warn!(error = %e, "Saved session could not be restored");
    }

    match cli.command {
        Commands::Login { email, password } => {
            commands::auth::login(&app, email, password).await?
        }
        Commands::Signup {
            name,
            email,
            location,
            contact,
            password,
        } => commands::auth::signup(&app, name, email, location, contact, password).await?,
        Commands::Logout => app.session.logout().await?,
        Commands::Whoami => commands::auth::whoami(&app).await?,
        Commands::Products { skip, limit } => commands::shop::products(&app, skip, limit).await?,
        Commands::Category { name } => commands::shop::category(&app, &name).await?,
        Commands::Search { query } => commands::shop::search(&app, &query).await?,
        Commands::Cart { action } => {
            app.cart.fetch().await?;
            match action.unwrap_or(CartAction::Show) {
                CartAction::Show => {}
                CartAction::Add {
                    product_id,
                    quantity,
                } => commands::shop::add(&app, product_id, quantity).await?,
                CartAction::Set {
                    product_id,
                    quantity,
                } => app.cart.set_quantity(product_id, quantity).await?,
                CartAction::Remove { product_id } => app.cart.remove(product_id).await?,
                CartAction::Clear => app.cart.clear().await?,
            }
            commands::shop::print_cart(&app);
        }
        Commands::Checkout(args) => commands::shop::checkout(&app, args).await?,
        Commands::Orders => commands::shop::orders(&app).await?,
        Commands::Profile { action } => match action.unwrap_or(ProfileAction::Show) {
            ProfileAction::Show => commands::account::show(&app).await?,
            ProfileAction::Update {
                name,
                email,
                location,
                contact,
            } => commands::account::update(&app, name, email, location, contact).await?,
        },
        Commands::Admin { action } => match action {
            AdminAction::Orders => commands::admin::orders(&app).await?,
            AdminAction::Deliver { order_id, payment } => {
                commands::admin::deliver(&app, order_id, payment).await?
            }
            AdminAction::Ingest { file } => commands::admin::ingest(&app, &file).await?,
        },
        Commands::Config { .. } => {}
    }

    Ok(())
}

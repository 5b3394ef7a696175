// Import and re-export the `error` module
pub use self::error::{Error, Result};
mod error;

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use afiliado_api_client::Dashboard;
use afiliado_api_client::config::ClientConfig;
use afiliado_api_client::session::{AuthState, landing_route, routes};
use afiliado_core::format::{format_brl, format_date};
use afiliado_core::messages;
use afiliado_core::models::product::{Product, ProductDraft, ProductFilters};
use afiliado_core::notify::ChannelNotifier;
use afiliado_core::session::FileSessionStore;
use afiliado_core::validation;
use clap::Parser;
use cli::{Cli, Commands, ProductCommands};

mod cli;
mod console;
mod logging;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    logging::init();

    let args = Cli::parse();

    if let Commands::Version = args.command {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let mut config = ClientConfig::from_env();
    if let Some(url) = args.api_url {
        config.base_url = url;
    }
    let store = match args.session_file {
        Some(path) => FileSessionStore::new(path),
        None => FileSessionStore::open_default(),
    };
    tracing::debug!(session = %store.path().display(), api = %config.base_url, "starting");

    let (notifier, mut notes) = ChannelNotifier::channel();
    let dashboard = Dashboard::new(
        &config,
        Arc::new(store),
        Arc::new(notifier),
        Arc::new(console::ConsoleNavigator),
    )?;
    dashboard.auth.hydrate();

    let result = dispatch(&dashboard, args.command).await;
    console::drain(&mut notes);
    result
}

async fn dispatch(dashboard: &Dashboard, command: Commands) -> Result<()> {
    match command {
        Commands::Version => {}
        Commands::Login { email, password } => {
            let user = dashboard.auth.login(email.trim(), &password).await?;
            println!("Signed in as {} <{}> ({})", user.name, user.email, user.role);
        }
        Commands::Logout => dashboard.auth.logout(),
        Commands::Whoami => match dashboard.auth.state() {
            AuthState::Authenticated(user) => {
                println!("{} <{}> ({})", user.name, user.email, user.role);
            }
            _ => return Err(Error::Custom("Not signed in".to_string())),
        },
        Commands::Register {
            name,
            email,
            password,
        } => {
            dashboard.auth.register(&name, &email, &password).await?;
            println!("Account created for {}", email.trim());
        }
        Commands::Products { command } => {
            require_admin(dashboard)?;
            products(dashboard, command).await?;
        }
    }
    Ok(())
}

fn require_admin(dashboard: &Dashboard) -> Result<()> {
    match landing_route(&dashboard.auth.state()) {
        Some(routes::DASHBOARD) => Ok(()),
        Some(routes::CLIENT) => Err(Error::Custom(messages::FORBIDDEN.to_string())),
        _ => Err(Error::Custom(
            "Not signed in. Run `afiliado login` first.".to_string(),
        )),
    }
}

async fn products(dashboard: &Dashboard, command: ProductCommands) -> Result<()> {
    let controller = &dashboard.products;
    match command {
        ProductCommands::List(args) => {
            let filters = ProductFilters::from(args);
            let loaded = if filters == controller.filters() {
                controller.refetch().await
            } else {
                controller.set_filters(filters).await
            };
            if !loaded {
                return Err(Error::Custom("Could not load products".to_string()));
            }
            print_products(&controller.products());
        }
        ProductCommands::Create(args) => {
            let draft = ProductDraft::from(args);
            check_new_product(&draft)?;
            controller.create(&draft).await?;
        }
        ProductCommands::Update { id, draft } => {
            let draft = ProductDraft::from(draft);
            if let Some(link) = &draft.affiliate_link {
                check_link(link)?;
            }
            controller.update(id, &draft).await?;
        }
        ProductCommands::Delete { id, yes } => {
            if !yes && !confirm(&format!("Delete product {id}?"))? {
                println!("Cancelled");
                return Ok(());
            }
            controller.delete(id).await?;
        }
    }
    Ok(())
}

fn check_new_product(draft: &ProductDraft) -> Result<()> {
    let missing = [
        ("--name", draft.name.as_deref().is_none_or(|n| n.trim().is_empty())),
        ("--store", draft.store.is_none()),
        ("--link", draft.affiliate_link.is_none()),
        ("--price", draft.current_price.is_none()),
    ];
    for (flag, absent) in missing {
        if absent {
            return Err(Error::Custom(format!("{flag}: {}", messages::REQUIRED_FIELD)));
        }
    }
    if let Some(link) = &draft.affiliate_link {
        check_link(link)?;
    }
    Ok(())
}

fn check_link(link: &str) -> Result<()> {
    if validation::is_valid_url(link) {
        Ok(())
    } else {
        Err(Error::Custom(format!("Invalid affiliate link: {link}")))
    }
}

fn confirm(question: &str) -> Result<bool> {
    eprint!("{question} [s/N] ");
    io::stderr().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_lowercase().as_str(),
        "s" | "sim" | "y" | "yes"
    ))
}

fn print_products(products: &[Product]) {
    if products.is_empty() {
        println!("No products");
        return;
    }
    println!(
        "{:>6}  {:<40}  {:<14}  {:>14}  {:<6}  {:<10}",
        "ID", "NAME", "STORE", "PRICE", "ACTIVE", "UPDATED"
    );
    for product in products {
        println!("{}", product_row(product));
    }
    println!("{} product(s)", products.len());
}

fn product_row(product: &Product) -> String {
    let name: String = product.name.chars().take(40).collect();
    let updated = product
        .updated_at
        .or(product.created_at)
        .map(|ts| format_date(&ts))
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{:>6}  {:<40}  {:<14}  {:>14}  {:<6}  {:<10}",
        product.id,
        name,
        product.store.to_string(),
        format_brl(product.current_price),
        if product.is_active { "yes" } else { "no" },
        updated,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(json: &str) -> Product {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn row_shows_price_and_last_change() {
        let row = product_row(&product(
            r#"{"id":7,"name":"Fone","store":"amazon","current_price":1234.5,"created_at":"2024-05-01T12:00:00","updated_at":"2024-06-10T08:00:00Z"}"#,
        ));
        assert!(row.contains("Fone"));
        assert!(row.contains("R$ 1.234,50"));
        assert!(row.contains("10/06/2024"));
        assert!(row.trim_start().starts_with('7'));
    }

    #[test]
    fn row_falls_back_to_creation_date() {
        let row = product_row(&product(
            r#"{"id":8,"name":"Mouse","store":"shopee","current_price":10,"is_active":false,"created_at":"2024-05-01T12:00:00"}"#,
        ));
        assert!(row.contains("01/05/2024"));
        assert!(row.contains("no"));

        let row = product_row(&product(
            r#"{"id":9,"name":"Cabo","store":"temu","current_price":5}"#,
        ));
        assert!(row.trim_end().ends_with('-'));
    }
}

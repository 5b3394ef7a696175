use std::path::PathBuf;

use afiliado_core::models::product::{ProductDraft, ProductFilters, Store};
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;

/// AfiliadoBot dashboard client.
#[derive(Parser, Debug)]
#[command(name = "afiliado", about = "AfiliadoBot dashboard client")]
pub struct Cli {
    /// API base URL (overrides `AFILIADO_API_URL`).
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Session file location.
    #[arg(long, global = true, env = "AFILIADO_SESSION_FILE")]
    pub session_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the version.
    Version,

    /// Sign in and store the session.
    Login {
        #[arg(long)]
        email: String,

        #[arg(long, env = "AFILIADO_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Sign out and forget the stored session.
    Logout,

    /// Show the signed-in user.
    Whoami,

    /// Create a client account.
    Register {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long, env = "AFILIADO_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Manage the product catalogue (admin only).
    Products {
        #[command(subcommand)]
        command: ProductCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProductCommands {
    /// List products.
    List(FilterArgs),

    /// Create a product.
    Create(DraftArgs),

    /// Update fields of a product.
    Update {
        id: i64,

        #[command(flatten)]
        draft: DraftArgs,
    },

    /// Delete a product.
    Delete {
        id: i64,

        /// Skip the confirmation prompt.
        #[arg(long, short)]
        yes: bool,
    },
}

#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    #[arg(long)]
    pub store: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long)]
    pub search: Option<String>,

    /// Only active products.
    #[arg(long, conflicts_with = "inactive")]
    pub active: bool,

    /// Only inactive products.
    #[arg(long)]
    pub inactive: bool,
}

impl From<FilterArgs> for ProductFilters {
    fn from(args: FilterArgs) -> Self {
        let is_active = match (args.active, args.inactive) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };
        ProductFilters {
            store: args.store.map(Store::from),
            category: args.category,
            search: args.search,
            is_active,
        }
    }
}

#[derive(Args, Debug, Default)]
pub struct DraftArgs {
    #[arg(long)]
    pub name: Option<String>,

    /// shopee, aliexpress, amazon, mercado_livre, ...
    #[arg(long)]
    pub store: Option<String>,

    #[arg(long = "link")]
    pub affiliate_link: Option<String>,

    #[arg(long = "price")]
    pub current_price: Option<Decimal>,

    #[arg(long)]
    pub original_price: Option<Decimal>,

    #[arg(long = "discount", value_parser = clap::value_parser!(u8).range(0..=100))]
    pub discount_percentage: Option<u8>,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long)]
    pub subcategory: Option<String>,

    #[arg(long)]
    pub image_url: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long = "coupon")]
    pub coupon_code: Option<String>,

    /// Comma-separated tags.
    #[arg(long, value_delimiter = ',')]
    pub tags: Option<Vec<String>>,

    #[arg(long)]
    pub active: Option<bool>,

    #[arg(long)]
    pub featured: Option<bool>,
}

impl From<DraftArgs> for ProductDraft {
    fn from(args: DraftArgs) -> Self {
        ProductDraft {
            name: args.name,
            store: args.store.map(Store::from),
            affiliate_link: args.affiliate_link,
            current_price: args.current_price,
            original_price: args.original_price,
            discount_percentage: args.discount_percentage,
            category: args.category,
            subcategory: args.subcategory,
            image_url: args.image_url,
            description: args.description,
            coupon_code: args.coupon_code,
            tags: args.tags,
            is_active: args.active,
            is_featured: args.featured,
        }
    }
}

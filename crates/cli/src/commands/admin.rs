//! Admin product management commands.
//!
//! Every command first runs the admin guard, the same way opening the admin
//! page would.
//!
//! # Usage
//!
//! ```bash
//! pawshop admin list --page 2
//! pawshop admin create --title "Salmon treats" --category food --unit bag \
//!     --origin-price 300 --price 250 --description Crunchy --content "Wild salmon"
//! pawshop admin update -NabcDEF --price 199 --enabled
//! pawshop admin delete -NabcDEF --yes
//! ```

use std::io::Write;

use clap::{Args, Subcommand};
use pawshop_client::admin::AdminProducts;
use pawshop_client::api::ShopBackend;
use pawshop_client::error::ClientError;
use pawshop_client::state::AppState;
use pawshop_core::{Money, Product, ProductDraft, ProductStatus};

use super::session::require_admin;
use super::{CommandError, Result};
use crate::render;

#[derive(Debug, Subcommand)]
pub enum AdminAction {
    /// List every product, including disabled ones
    List {
        /// Page number
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
    /// Create a product
    Create(ProductFields),
    /// Edit a product
    Update {
        /// Product ID
        #[arg(allow_hyphen_values = true)]
        id: String,
        /// Page of the admin listing the product is on
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[command(flatten)]
        fields: ProductFields,
    },
    /// Delete a product
    Delete {
        /// Product ID
        #[arg(allow_hyphen_values = true)]
        id: String,
        /// Page of the admin listing the product is on
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Confirm deletion
        #[arg(short, long)]
        yes: bool,
    },
}

/// Product fields; unset fields keep their current value when editing.
#[derive(Debug, Args)]
pub struct ProductFields {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    unit: Option<String>,
    /// List price in whole NT$
    #[arg(long)]
    origin_price: Option<i64>,
    /// Selling price in whole NT$
    #[arg(long)]
    price: Option<i64>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    content: Option<String>,
    /// Main image URL
    #[arg(long)]
    image_url: Option<String>,
    /// Additional image URL (repeatable)
    #[arg(long = "image")]
    images: Vec<String>,
    /// Star rating, 0 to 5
    #[arg(long)]
    rating: Option<u8>,
    /// List the product in the storefront
    #[arg(long, conflicts_with = "disabled")]
    enabled: bool,
    /// Hide the product from the storefront
    #[arg(long)]
    disabled: bool,
}

impl ProductFields {
    fn apply(self, draft: &mut ProductDraft) {
        if let Some(title) = self.title {
            draft.title = title;
        }
        if let Some(category) = self.category {
            draft.category = category;
        }
        if let Some(unit) = self.unit {
            draft.unit = unit;
        }
        if let Some(price) = self.origin_price {
            draft.origin_price = Some(Money::from_dollars(price));
        }
        if let Some(price) = self.price {
            draft.price = Some(Money::from_dollars(price));
        }
        if let Some(description) = self.description {
            draft.description = description;
        }
        if let Some(content) = self.content {
            draft.content = content;
        }
        if let Some(url) = self.image_url {
            draft.image_url = url;
        }
        if !self.images.is_empty() {
            draft.images_url = self.images;
        }
        if self.rating.is_some() {
            draft.rating = self.rating;
        }
        if self.enabled {
            draft.is_enabled = ProductStatus::Enabled;
        } else if self.disabled {
            draft.is_enabled = ProductStatus::Disabled;
        }
    }
}

pub async fn run<B: ShopBackend>(state: &AppState<B>, action: AdminAction) -> Result<()> {
    require_admin(state).await?;
    let mut admin = state.admin_products();
    let result = dispatch(&mut admin, action).await;

    // A session that lapses mid-command goes back to login, like the admin page
    if let Err(CommandError::Client(err)) = &result
        && let Some(redirect) = err.redirect()
    {
        state.router().follow(redirect).await;
        return Err(CommandError::NotSignedIn);
    }
    result
}

async fn dispatch<B: ShopBackend>(admin: &mut AdminProducts<B>, action: AdminAction) -> Result<()> {
    match action {
        AdminAction::List { page } => list(admin, page).await,
        AdminAction::Create(fields) => {
            let mut draft = ProductDraft::default();
            fields.apply(&mut draft);
            save(admin, &draft).await
        }
        AdminAction::Update { id, page, fields } => {
            let mut draft = ProductDraft::from(&find(admin, &id, page).await?);
            fields.apply(&mut draft);
            save(admin, &draft).await
        }
        AdminAction::Delete { id, page, yes } => {
            let product = find(admin, &id, page).await?;
            admin.request_delete(&product);
            if yes {
                admin.confirm_delete().await?;
                render::admin_products(&mut std::io::stdout().lock(), admin)?;
            } else {
                admin.cancel_delete();
                writeln!(
                    std::io::stdout().lock(),
                    "Deletion of \"{}\" not confirmed; pass --yes to delete.",
                    product.title
                )?;
            }
            Ok(())
        }
    }
}

async fn list<B: ShopBackend>(admin: &mut AdminProducts<B>, page: u32) -> Result<()> {
    admin.list(Some(page)).await?;
    render::admin_products(&mut std::io::stdout().lock(), admin)?;
    Ok(())
}

async fn save<B: ShopBackend>(admin: &mut AdminProducts<B>, draft: &ProductDraft) -> Result<()> {
    match admin.save(draft).await {
        Ok(()) => {
            render::admin_products(&mut std::io::stdout().lock(), admin)?;
            Ok(())
        }
        Err(ClientError::Validation(errors)) => {
            render::validation(&mut std::io::stdout().lock(), &errors)?;
            Err(CommandError::InvalidArgument("product rejected".to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

async fn find<B: ShopBackend>(admin: &mut AdminProducts<B>, id: &str, page: u32) -> Result<Product> {
    admin
        .list(Some(page))
        .await?
        .iter()
        .find(|p| p.id.as_str() == id)
        .cloned()
        .ok_or_else(|| CommandError::InvalidArgument(format!("no product {id} on page {page}")))
}

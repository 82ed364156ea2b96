//! Storefront commands: catalog, cart and checkout.

use std::io::Write;

use clap::{Args, Subcommand, ValueEnum};
use pawshop_client::api::ShopBackend;
use pawshop_client::catalog::{ProductQuery, SortOrder};
use pawshop_client::error::ClientError;
use pawshop_client::state::AppState;
use pawshop_client::views::{CartPage, QuantityChange};
use pawshop_core::{Cart, CartItemId, CartLine, CheckoutForm, ProductId};

use super::{CommandError, Result};
use crate::render;

/// Listing order accepted on the command line.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum Sort {
    #[default]
    Default,
    PriceLowToHigh,
    PriceHighToLow,
    Name,
}

impl From<Sort> for SortOrder {
    fn from(sort: Sort) -> Self {
        match sort {
            Sort::Default => Self::Default,
            Sort::PriceLowToHigh => Self::PriceLowToHigh,
            Sort::PriceHighToLow => Self::PriceHighToLow,
            Sort::Name => Self::Name,
        }
    }
}

#[derive(Debug, Args)]
pub struct ProductsArgs {
    /// Only show this category
    #[arg(short, long)]
    category: Option<String>,

    /// Page number
    #[arg(short, long, default_value_t = 1)]
    page: u32,

    /// Match against title or description
    #[arg(short, long)]
    search: Option<String>,

    /// Listing order
    #[arg(long, value_enum, default_value_t = Sort::Default)]
    sort: Sort,
}

#[derive(Debug, Subcommand)]
pub enum CartAction {
    /// Show the cart and its summary
    Show,
    /// Add a product
    Add {
        /// Product ID
        #[arg(allow_hyphen_values = true)]
        product_id: String,
        /// Quantity
        #[arg(short, long, default_value_t = 1)]
        qty: u32,
    },
    /// Change a line's quantity (0 asks to remove it)
    Update {
        /// Cart line ID
        #[arg(allow_hyphen_values = true)]
        line_id: String,
        /// New quantity
        qty: u32,
        /// Confirm removal when the quantity is 0
        #[arg(short, long)]
        yes: bool,
    },
    /// Remove a line
    Remove {
        /// Cart line ID
        #[arg(allow_hyphen_values = true)]
        line_id: String,
        /// Confirm removal
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Debug, Args)]
pub struct CheckoutArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    tel: String,
    #[arg(long)]
    address: String,
    /// Note for the shop
    #[arg(long, default_value = "")]
    message: String,
}

pub async fn products<B: ShopBackend>(state: &AppState<B>, args: ProductsArgs) -> Result<()> {
    let query = ProductQuery {
        category: args.category,
        page: args.page,
        search: args.search,
        sort: args.sort.into(),
    };
    let page = state.catalog().list(&query).await?;
    render::product_page(&mut std::io::stdout().lock(), &page)?;
    Ok(())
}

pub async fn product<B: ShopBackend>(state: &AppState<B>, id: &str) -> Result<()> {
    let result = state.catalog().get(&ProductId::new(id)).await;
    let mut out = std::io::stdout().lock();
    match result {
        Ok(product) => render::product(&mut out, &product)?,
        Err(ClientError::NotFound(_)) => render::not_found(&mut out, id)?,
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

pub async fn cart<B: ShopBackend>(state: &AppState<B>, action: CartAction) -> Result<()> {
    let mut page = state.cart_page();

    match action {
        CartAction::Show => {
            page.load().await?;
        }
        CartAction::Add { product_id, qty } => {
            let product = state.catalog().get(&ProductId::new(product_id)).await?;
            state.catalog().add_quantity(&product, qty).await?;
        }
        CartAction::Update { line_id, qty, yes } => {
            let cart = page.load().await?;
            let line = find_line(&cart, &line_id)?;
            if page.change_quantity(line, qty).await? == QuantityChange::ConfirmRemoval {
                confirm_or_cancel(&mut page, yes).await?;
            }
        }
        CartAction::Remove { line_id, yes } => {
            let cart = page.load().await?;
            page.request_removal(find_line(&cart, &line_id)?);
            confirm_or_cancel(&mut page, yes).await?;
        }
    }

    let mut out = std::io::stdout().lock();
    if let Some(cart) = state.cart().snapshot() {
        render::cart(&mut out, &cart)?;
    }
    render::cart_summary(&mut out, &page.summary())?;
    Ok(())
}

async fn confirm_or_cancel<B: ShopBackend>(page: &mut CartPage<B>, yes: bool) -> Result<()> {
    if yes {
        page.confirm_removal().await?;
    } else {
        page.cancel_removal();
        writeln!(
            std::io::stdout().lock(),
            "Removal not confirmed; pass --yes to remove the line."
        )?;
    }
    Ok(())
}

fn find_line<'a>(cart: &'a Cart, line_id: &str) -> Result<&'a CartLine> {
    cart.line(&CartItemId::new(line_id))
        .ok_or_else(|| CommandError::InvalidArgument(format!("no cart line {line_id}")))
}

pub async fn checkout<B: ShopBackend>(state: &AppState<B>, args: CheckoutArgs) -> Result<()> {
    let checkout = state.checkout();
    let summary = checkout.summary().await;
    render::checkout_summary(&mut std::io::stdout().lock(), &summary)?;

    let form = CheckoutForm {
        name: args.name,
        email: args.email,
        tel: args.tel,
        address: args.address,
        message: args.message,
    };
    let result = checkout.submit(form).await;
    let mut out = std::io::stdout().lock();
    match result {
        Ok(placed) => {
            render::receipt(&mut out, &placed.receipt)?;
            Ok(())
        }
        Err(ClientError::Validation(errors)) => {
            render::validation(&mut out, &errors)?;
            Err(CommandError::InvalidArgument("checkout form rejected".to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

//! Plain-text rendering of pages for the terminal.

use std::io::{self, Write};

use pawshop_client::admin::AdminProducts;
use pawshop_client::api::ShopBackend;
use pawshop_client::checkout::CheckoutSummary;
use pawshop_client::notice::{Notice, NoticeLevel};
use pawshop_client::router::Navigation;
use pawshop_client::views::CartSummary;
use pawshop_core::{Cart, Money, OrderReceipt, Pagination, Product, ProductPage, ValidationErrors};

const RULE: &str = "----------------------------------------";

fn amount(value: Option<Money>) -> String {
    value.map_or_else(|| "--".to_string(), |m| m.to_string())
}

pub fn notices(out: &mut impl Write, notices: &[Notice]) -> io::Result<()> {
    for notice in notices {
        let tag = match notice.level {
            NoticeLevel::Success => "ok",
            NoticeLevel::Info => "info",
            NoticeLevel::Warning => "warn",
            NoticeLevel::Error => "error",
        };
        writeln!(out, "[{tag}] {}", notice.message)?;
    }
    Ok(())
}

pub fn navigation(out: &mut impl Write, navigation: &Navigation) -> io::Result<()> {
    match navigation {
        Navigation::Rendered(route) => writeln!(out, "Now at {}", route.path()),
        Navigation::Superseded => writeln!(out, "Navigation superseded"),
    }
}

fn pagination(out: &mut impl Write, pagination: &Pagination) -> io::Result<()> {
    write!(
        out,
        "Page {} of {}",
        pagination.current_page,
        pagination.total_pages.max(1)
    )?;
    if pagination.has_pre {
        write!(out, "  [prev]")?;
    }
    if pagination.has_next {
        write!(out, "  [next]")?;
    }
    writeln!(out)
}

pub fn product_page(out: &mut impl Write, page: &ProductPage) -> io::Result<()> {
    if page.products.is_empty() {
        writeln!(out, "No products found.")?;
    }
    for product in &page.products {
        writeln!(
            out,
            "{:<24} {:<32} {:>10}  {}",
            product.id.as_str(),
            product.title,
            product.price.to_string(),
            product.category_label()
        )?;
    }
    pagination(out, &page.pagination)
}

pub fn product(out: &mut impl Write, product: &Product) -> io::Result<()> {
    writeln!(out, "{}", product.title)?;
    writeln!(out, "{RULE}")?;
    writeln!(out, "Category: {}", product.category_label())?;
    if product.origin_price == product.price {
        writeln!(out, "Price:    {} / {}", product.price, product.unit)?;
    } else {
        writeln!(
            out,
            "Price:    {} / {} (was {})",
            product.price, product.unit, product.origin_price
        )?;
    }
    if let Some(rating) = product.rating {
        writeln!(out, "Rating:   {rating}/5")?;
    }
    if let Some(image) = product.main_image() {
        writeln!(out, "Image:    {image}")?;
    }
    writeln!(out)?;
    writeln!(out, "{}", product.description)?;
    if !product.content.is_empty() {
        writeln!(out)?;
        writeln!(out, "{}", product.content)?;
    }
    Ok(())
}

/// Placeholder for a product ID the backend does not know.
pub fn not_found(out: &mut impl Write, id: &str) -> io::Result<()> {
    writeln!(out, "Product {id} is no longer available.")
}

pub fn cart(out: &mut impl Write, cart: &Cart) -> io::Result<()> {
    if cart.is_empty() {
        return writeln!(out, "Your cart is empty.");
    }
    for line in &cart.lines {
        writeln!(
            out,
            "{:<24} {:<32} x{:<4} {:>10}",
            line.id.as_str(),
            line.product.title,
            line.qty,
            line.final_total.to_string()
        )?;
    }
    Ok(())
}

pub fn cart_summary(out: &mut impl Write, summary: &CartSummary) -> io::Result<()> {
    writeln!(out, "{RULE}")?;
    writeln!(out, "Subtotal: {}", amount(summary.subtotal))?;
    writeln!(out, "Shipping: {}", summary.shipping)?;
    writeln!(out, "Total:    {}", amount(summary.total))?;
    if summary.can_checkout() {
        writeln!(out, "Ready for checkout.")?;
    }
    Ok(())
}

pub fn checkout_summary(out: &mut impl Write, summary: &CheckoutSummary) -> io::Result<()> {
    for line in &summary.lines {
        writeln!(
            out,
            "{} x{}  {}",
            line.product.title, line.qty, line.final_total
        )?;
    }
    writeln!(out, "{RULE}")?;
    writeln!(out, "Subtotal: {}", amount(summary.subtotal))?;
    writeln!(out, "Shipping: {}", summary.shipping)?;
    writeln!(out, "Total:    {}", amount(summary.total))
}

pub fn receipt(out: &mut impl Write, receipt: &OrderReceipt) -> io::Result<()> {
    writeln!(out, "Order {} placed, total {}", receipt.order_id, receipt.total)
}

pub fn validation(out: &mut impl Write, errors: &ValidationErrors) -> io::Result<()> {
    for error in errors.errors() {
        writeln!(out, "  {}: {}", error.field, error.message)?;
    }
    Ok(())
}

pub fn admin_products<B: ShopBackend>(out: &mut impl Write, admin: &AdminProducts<B>) -> io::Result<()> {
    if admin.products().is_empty() {
        writeln!(out, "No products.")?;
    }
    for product in admin.products() {
        writeln!(
            out,
            "{:<24} {:<10} {:<32} {:>10} {:>10}  {}",
            product.id.as_str(),
            product.category_label(),
            product.title,
            product.origin_price.to_string(),
            product.price.to_string(),
            product.is_enabled.label()
        )?;
    }
    if let Some(pending) = admin.pending_delete() {
        writeln!(out, "Pending deletion: {}", pending.title)?;
    }
    pagination(out, admin.pagination())
}

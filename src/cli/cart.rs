use anyhow::Result;
use clap::Subcommand;

use crate::cli::{build_client, describe, format_money};
use crate::core::models::{GST_RATE, SERVICE_FEE};

#[derive(Subcommand)]
pub enum CartCommand {
    /// Show cart contents and totals
    Show,

    /// Add an item to the cart
    Add {
        item_id: String,

        #[arg(long, default_value = "1")]
        quantity: u32,
    },

    /// Set the quantity of an item already in the cart
    Set { item_id: String, quantity: u32 },

    /// Remove an item from the cart
    Rm { item_id: String },

    /// Show how many items are in the cart
    Count,
}

pub async fn run(command: CartCommand) -> Result<()> {
    let client = build_client()?;

    match command {
        CartCommand::Show => {
            let cart = client.my_cart().await.map_err(describe)?;

            if cart.is_empty() {
                println!("Your cart is empty.");
                return Ok(());
            }

            for entry in &cart.items {
                println!(
                    "{}  {:<30} x{:<3}  {}",
                    entry.item.id,
                    entry.item.name,
                    entry.quantity,
                    format_money(entry.item.price * f64::from(entry.quantity))
                );
            }

            let subtotal = cart.subtotal();
            println!();
            println!("  Subtotal     {}", format_money(subtotal));
            println!("  GST (5%)     {}", format_money(subtotal * GST_RATE));
            println!("  Service fee  {}", format_money(SERVICE_FEE));
            println!("  Total        {}", format_money(cart.grand_total()));
        }
        CartCommand::Add { item_id, quantity } => {
            client
                .add_to_cart(&item_id, quantity)
                .await
                .map_err(describe)?;
            println!("Added to cart.");
        }
        CartCommand::Set { item_id, quantity } => {
            client
                .set_cart_quantity(&item_id, quantity)
                .await
                .map_err(describe)?;
            println!("Quantity updated.");
        }
        CartCommand::Rm { item_id } => {
            client.remove_from_cart(&item_id).await.map_err(describe)?;
            println!("Removed from cart.");
        }
        CartCommand::Count => {
            let count = client.cart_count().await.map_err(describe)?;
            println!("{count}");
        }
    }

    Ok(())
}

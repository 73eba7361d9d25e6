use anyhow::Result;
use clap::Subcommand;

use crate::api::ApiClient;
use crate::cli::{build_client, describe, format_money};
use crate::core::models::{NewOrder, Order, OrderLine};

#[derive(Subcommand)]
pub enum OrderCommand {
    /// Place a dine-in order from the current cart
    Place {
        #[arg(long)]
        table: String,

        #[arg(long)]
        phone: String,

        #[arg(long)]
        email: String,

        #[arg(long, default_value = "cash")]
        payment: String,

        #[arg(long, default_value = "")]
        notes: String,
    },

    /// List your orders
    List {
        #[arg(long)]
        json: bool,
    },

    /// Show one order
    Show { order_id: String },

    /// Cancel a pending order
    Cancel { order_id: String },

    /// Print the invoice URL for an order
    Invoice {
        order_id: String,

        /// Open the invoice in the browser
        #[arg(long)]
        open: bool,
    },
}

pub async fn run(command: OrderCommand) -> Result<()> {
    let client = build_client()?;

    match command {
        OrderCommand::Place {
            table,
            phone,
            email,
            payment,
            notes,
        } => {
            let cart = client.my_cart().await.map_err(describe)?;
            if cart.is_empty() {
                anyhow::bail!("Cart is empty; add items before placing an order");
            }

            let order = NewOrder {
                items: cart
                    .items
                    .iter()
                    .map(|entry| OrderLine {
                        item: entry.item.id.clone(),
                        quantity: entry.quantity,
                    })
                    .collect(),
                table_number: table,
                customer_phone: phone,
                customer_email: email,
                payment_method: payment,
                order_notes: notes,
                total_amount: cart.grand_total(),
            };

            let placed = client.place_order(&order).await.map_err(describe)?;
            match placed {
                Some(order) => println!(
                    "Order placed: {} ({})",
                    order.id,
                    format_money(order.total_amount)
                ),
                None => println!(
                    "Order placed ({})",
                    format_money(order.total_amount)
                ),
            }
        }
        OrderCommand::List { json } => {
            let orders = client.my_orders().await.map_err(describe)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&orders)?);
                return Ok(());
            }

            if orders.is_empty() {
                println!("No orders yet.");
                return Ok(());
            }

            for order in &orders {
                print_order(&client, order).await;
                println!();
            }
        }
        OrderCommand::Show { order_id } => {
            let order = client.order(&order_id).await.map_err(describe)?;
            print_order(&client, &order).await;
        }
        OrderCommand::Cancel { order_id } => {
            let order = client.order(&order_id).await.map_err(describe)?;
            if !order.status.is_cancellable() {
                anyhow::bail!("Only pending orders can be cancelled (status: {})", order.status);
            }

            client.cancel_order(&order_id).await.map_err(describe)?;
            println!("Order cancelled.");
        }
        OrderCommand::Invoice { order_id, open } => {
            let url = client.invoice_url(&order_id);
            println!("{url}");
            if open {
                open::that(&url)?;
            }
        }
    }

    Ok(())
}

async fn print_order(client: &ApiClient, order: &Order) {
    println!(
        "{}  {:<10}  {}  {}",
        order.id,
        order.status.to_string(),
        format_money(order.total_amount),
        order
            .created_at
            .with_timezone(&chrono::Local)
            .format("%b %d, %Y %I:%M %p")
    );

    if let Some(table) = &order.table_number {
        println!("  Table {table}");
    }

    for line in &order.items {
        // Order lines only carry item ids; resolve names best-effort like
        // the storefront does, falling back when an item was removed from
        // the menu.
        let name = match client.item(&line.item).await {
            Ok(item) => item.name,
            Err(_) => "Unknown Item".to_string(),
        };
        println!("  {} x{}", name, line.quantity);
    }
}

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cli::{build_client, describe, format_money};
use crate::core::models::{Order, Reservation};

#[derive(Serialize)]
struct StatusOutput {
    orders: Vec<OrderStatusLine>,
    reservations: Vec<ReservationStatusLine>,
    #[serde(with = "chrono::serde::ts_seconds")]
    fetched_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct OrderStatusLine {
    id: String,
    status: String,
    total_amount: f64,
    created_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct ReservationStatusLine {
    id: String,
    status: String,
    date: String,
    time: String,
    people_count: u32,
}

pub async fn run(json: bool) -> Result<()> {
    let client = build_client()?;

    let orders = client.my_orders().await.map_err(describe)?;
    let reservations = client.my_reservations().await.map_err(describe)?;

    if json {
        let output = StatusOutput {
            orders: orders.iter().map(order_line).collect(),
            reservations: reservations.iter().map(reservation_line).collect(),
            fetched_at: Utc::now(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_text_output(&orders, &reservations);
    }

    Ok(())
}

fn order_line(order: &Order) -> OrderStatusLine {
    OrderStatusLine {
        id: order.id.clone(),
        status: order.status.to_string(),
        total_amount: order.total_amount,
        created_at: order.created_at,
    }
}

fn reservation_line(reservation: &Reservation) -> ReservationStatusLine {
    ReservationStatusLine {
        id: reservation.id.clone(),
        status: reservation.status.to_string(),
        date: reservation.date.clone(),
        time: reservation.time.clone(),
        people_count: reservation.people_count,
    }
}

fn print_text_output(orders: &[Order], reservations: &[Reservation]) {
    println!("Orders");
    if orders.is_empty() {
        println!("  (none)");
    }
    for order in orders {
        println!(
            "  {}  {:<10}  {:>10}  {}",
            order.id,
            order.status.to_string(),
            format_money(order.total_amount),
            order
                .created_at
                .with_timezone(&chrono::Local)
                .format("%b %d, %Y %I:%M %p")
        );
    }

    println!();
    println!("Reservations");
    if reservations.is_empty() {
        println!("  (none)");
    }
    for reservation in reservations {
        println!(
            "  {}  {:<10}  {} {}  {} {}",
            reservation.id,
            reservation.status.to_string(),
            reservation.date,
            reservation.time,
            reservation.people_count,
            if reservation.people_count == 1 {
                "person"
            } else {
                "people"
            }
        );
    }
}

use anyhow::Result;
use clap::Subcommand;

use crate::cli::{build_client, describe};
use crate::core::models::NewReservation;

const MAX_PARTY_SIZE: u32 = 20;

#[derive(Subcommand)]
pub enum ReserveCommand {
    /// Book a table
    Book {
        /// Name the reservation is held under
        #[arg(long)]
        name: String,

        /// Party size (1-20)
        #[arg(long)]
        people: u32,

        /// Date, e.g. 2026-02-14
        #[arg(long)]
        date: String,

        /// Time slot, e.g. 19:30
        #[arg(long)]
        time: String,

        #[arg(long, default_value = "")]
        request: String,
    },

    /// List your reservations
    List {
        #[arg(long)]
        json: bool,
    },

    /// Cancel a pending reservation
    Cancel { reservation_id: String },
}

pub async fn run(command: ReserveCommand) -> Result<()> {
    let client = build_client()?;

    match command {
        ReserveCommand::Book {
            name,
            people,
            date,
            time,
            request,
        } => {
            if people == 0 || people > MAX_PARTY_SIZE {
                anyhow::bail!("Party size must be between 1 and {MAX_PARTY_SIZE}");
            }

            let reservation = NewReservation {
                name,
                people_count: people,
                date,
                time,
                special_request: request,
            };

            client
                .book_reservation(&reservation)
                .await
                .map_err(describe)?;
            println!("Reservation created. We've reserved your table - see you soon!");
        }
        ReserveCommand::List { json } => {
            let reservations = client.my_reservations().await.map_err(describe)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&reservations)?);
                return Ok(());
            }

            if reservations.is_empty() {
                println!("No reservations yet.");
                return Ok(());
            }

            for reservation in &reservations {
                println!(
                    "{}  {:<10}  {} {}  {} {}",
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
                if let Some(request) = &reservation.special_request {
                    if !request.is_empty() {
                        println!("  Note: {request}");
                    }
                }
            }
        }
        ReserveCommand::Cancel { reservation_id } => {
            let reservations = client.my_reservations().await.map_err(describe)?;
            let reservation = reservations
                .iter()
                .find(|r| r.id == reservation_id)
                .ok_or_else(|| anyhow::anyhow!("No such reservation: {reservation_id}"))?;

            if !reservation.status.is_cancellable() {
                anyhow::bail!(
                    "Only pending reservations can be cancelled (status: {})",
                    reservation.status
                );
            }

            client
                .cancel_reservation(&reservation_id)
                .await
                .map_err(describe)?;
            println!("Reservation cancelled.");
        }
    }

    Ok(())
}

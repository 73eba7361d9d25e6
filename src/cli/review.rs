use anyhow::Result;
use clap::Subcommand;

use crate::cli::{build_client, describe};
use crate::core::models::Review;

#[derive(Subcommand)]
pub enum ReviewCommand {
    /// List recent reviews
    List {
        #[arg(long)]
        json: bool,
    },

    /// Leave a review
    Post {
        #[arg(long)]
        name: String,

        /// Star rating, 1-5
        #[arg(long)]
        rating: u8,

        #[arg(long)]
        comment: String,
    },
}

pub async fn run(command: ReviewCommand) -> Result<()> {
    let client = build_client()?;

    match command {
        ReviewCommand::List { json } => {
            let reviews = client.reviews().await.map_err(describe)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&reviews)?);
                return Ok(());
            }

            if reviews.is_empty() {
                println!("No reviews yet.");
                return Ok(());
            }

            for review in &reviews {
                let stars: String = "*".repeat(usize::from(review.rating));
                println!("{}  {}", review.name, stars);
                println!("  \"{}\"", review.comment);
            }
        }
        ReviewCommand::Post {
            name,
            rating,
            comment,
        } => {
            if !(1..=5).contains(&rating) {
                anyhow::bail!("Rating must be between 1 and 5");
            }
            if comment.trim().is_empty() {
                anyhow::bail!("Comment must not be empty");
            }

            let review = Review {
                name,
                rating,
                comment,
            };
            client.post_review(&review).await.map_err(describe)?;
            println!("Thanks for your review!");
        }
    }

    Ok(())
}

use anyhow::Result;

use crate::cli::{build_client, describe, format_money};

const ITEM_LIMIT: u32 = 100;

pub async fn run(category: Option<String>, item: Option<String>, json: bool) -> Result<()> {
    let client = build_client()?;

    if let Some(item_id) = item {
        let item = client.item(&item_id).await.map_err(describe)?;
        if json {
            println!("{}", serde_json::to_string_pretty(&item)?);
        } else {
            println!("{}  {}", item.name, format_money(item.price));
            if let Some(description) = &item.description {
                println!("  {description}");
            }
        }
        return Ok(());
    }

    if let Some(category) = category {
        let category_id = resolve_category(&client, &category).await?;
        let items = client
            .items_by_category(&category_id, ITEM_LIMIT)
            .await
            .map_err(describe)?;

        if json {
            println!("{}", serde_json::to_string_pretty(&items)?);
        } else if items.is_empty() {
            println!("No items in this category.");
        } else {
            for item in items {
                println!("{}  {:<30}  {}", item.id, item.name, format_money(item.price));
            }
        }
        return Ok(());
    }

    let categories = client.categories().await.map_err(describe)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&categories)?);
    } else if categories.is_empty() {
        println!("No menu categories.");
    } else {
        for category in categories {
            println!("{}  {}", category.id, category.name);
        }
    }

    Ok(())
}

/// Accept either a raw category id or a (case-insensitive) category name.
async fn resolve_category(client: &crate::api::ApiClient, wanted: &str) -> Result<String> {
    let categories = client.categories().await.map_err(describe)?;

    let matched = categories.iter().find(|c| {
        c.id == wanted || c.name.eq_ignore_ascii_case(wanted)
    });

    match matched {
        Some(category) => Ok(category.id.clone()),
        None => anyhow::bail!("Unknown category: {wanted}"),
    }
}

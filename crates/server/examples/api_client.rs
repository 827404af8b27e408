//! Walks through the movie API against a running server.
//!
//! ```text
//! cargo run -p movie-store-server &
//! cargo run -p movie-store-server --example api_client
//! ```

use reqwest::Client;
use serde_json::{json, Value};

const SERVER_URL: &str = "http://localhost:4000";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let client = Client::new();

    println!("1. Create a movie:");
    let resp = client
        .post(format!("{SERVER_URL}/createMovie"))
        .json(&json!({
            "title": "movie1",
            "release_date": "2007-10-15",
            "description": "movie1",
            "image_url": "image1"
        }))
        .send()
        .await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    println!("2. Create it again (title taken):");
    let resp = client
        .post(format!("{SERVER_URL}/createMovie"))
        .json(&json!({
            "title": "movie1",
            "release_date": "2007-10-15",
            "description": "movie1",
            "image_url": "image1"
        }))
        .send()
        .await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    println!("3. List movies:");
    let movies: Vec<Value> = client
        .get(format!("{SERVER_URL}/getMovies"))
        .send()
        .await?
        .json()
        .await?;
    println!("{}", serde_json::to_string_pretty(&movies)?);
    println!();

    let Some(id) = movies
        .iter()
        .find(|m| m["title"] == "movie1")
        .and_then(|m| m["_id"].as_str())
        .map(str::to_string)
    else {
        println!("movie1 not found, stopping");
        return Ok(());
    };

    println!("4. Get by id:");
    let resp = client.get(format!("{SERVER_URL}/getMovie/{id}")).send().await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    println!("5. Get with a malformed id:");
    let resp = client.get(format!("{SERVER_URL}/getMovie/123")).send().await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    println!("6. Update the description:");
    let resp = client
        .put(format!("{SERVER_URL}/update/{id}"))
        .json(&json!({ "description": "An updated description" }))
        .send()
        .await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    println!("7. Delete:");
    let resp = client.delete(format!("{SERVER_URL}/delete/{id}")).send().await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    println!("8. Delete again:");
    let resp = client.delete(format!("{SERVER_URL}/delete/{id}")).send().await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);

    Ok(())
}

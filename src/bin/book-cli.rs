use std::error::Error;

use clap::{Parser, Subcommand};
use reqwest::Url;
use serde_json::{Map, Value};

#[derive(Parser)]
#[command(name = "book-cli")]
#[command(about = "Command-line client for the book inventory API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3030")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every book
    List,
    /// Create a book
    Create {
        #[arg(long)]
        id: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        author: String,
        #[arg(long)]
        pages: Option<String>,
        #[arg(long)]
        edition: Option<String>,
        #[arg(long)]
        year: Option<String>,
    },
    /// Update the given fields of a book
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        author: Option<String>,
        #[arg(long)]
        pages: Option<String>,
        #[arg(long)]
        edition: Option<String>,
        #[arg(long)]
        year: Option<String>,
    },
    /// Delete a book
    Delete { id: String },
}

/// JSON object holding only the fields that were given.
fn fields(pairs: &[(&str, Option<String>)]) -> Value {
    let map: Map<String, Value> = pairs
        .iter()
        .filter_map(|(key, value)| {
            value
                .as_ref()
                .map(|v| (key.to_string(), Value::String(v.clone())))
        })
        .collect();
    Value::Object(map)
}

/// `<base>/api/books[/<id>]`, with the id percent-encoded as one segment.
fn books_url(base: &str, id: Option<&str>) -> Result<Url, Box<dyn Error>> {
    let mut url = Url::parse(base)?;
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| format!("{base} cannot be used as a base URL"))?;
        segments.pop_if_empty().extend(["api", "books"]);
        if let Some(id) = id {
            segments.push(id);
        }
    }
    Ok(url)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let res = match cli.command {
        Commands::List => client.get(books_url(&cli.url, None)?).send().await?,
        Commands::Create { id, title, author, pages, edition, year } => {
            let body = fields(&[
                ("id", Some(id)),
                ("title", Some(title)),
                ("author", Some(author)),
                ("pages", pages),
                ("edition", edition),
                ("year", year),
            ]);
            client
                .post(books_url(&cli.url, None)?)
                .json(&body)
                .send()
                .await?
        }
        Commands::Update { id, title, author, pages, edition, year } => {
            let body = fields(&[
                ("title", title),
                ("author", author),
                ("pages", pages),
                ("edition", edition),
                ("year", year),
            ]);
            client
                .put(books_url(&cli.url, Some(&id))?)
                .json(&body)
                .send()
                .await?
        }
        Commands::Delete { id } => {
            client
                .delete(books_url(&cli.url, Some(&id))?)
                .send()
                .await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn Error>> {
    let status = res.status();
    let text = res.text().await?;

    if !status.is_success() {
        eprintln!("Error: API returned status {}", status);
        if !text.is_empty() {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    if text.is_empty() {
        println!("{}", status);
        return Ok(());
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}

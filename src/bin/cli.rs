// Bookhub - Book Shelf & Reading Statistics
// Copyright (C) 2025 Bookhub contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use serde::Serialize;

use bookhub_core::convert::{parse_book_id, parse_book_refs, parse_count, parse_status};
use bookhub_core::storage::{NewBook, NewUser};
use bookhub_core::{logging, BookSearch, Config, Library};

#[derive(Parser)]
#[command(name = "bookhub-cli")]
#[command(about = "Bookhub CLI - manage a book shelf from the terminal", long_about = None)]
struct Cli {
    /// JSON config file; environment variables override it
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a user
    Register {
        /// Identifier issued by the auth provider
        external_id: String,
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Show a user
    User { external_id: String },
    /// Delete a user with their books and charts
    RemoveUser { external_id: String },
    /// Add a book to a shelf
    Add {
        /// Owner's external id
        owner: String,
        #[arg(short, long)]
        title: String,
        #[arg(short, long, default_value = "")]
        author: String,
        #[arg(long, default_value = "")]
        isbn10: String,
        #[arg(long, default_value = "")]
        image_url: String,
        /// Page count, "1,640" accepted
        #[arg(long, default_value = "0")]
        page: String,
        /// Price, "1,320" accepted
        #[arg(long, default_value = "0")]
        price: String,
        /// bought, reading or read
        #[arg(short, long, default_value = "bought")]
        status: String,
    },
    /// List an owner's books
    Shelf { owner: String },
    /// Change price, page count or status of a book
    Update {
        book_id: String,
        #[arg(long)]
        page: Option<String>,
        #[arg(long)]
        price: Option<String>,
        #[arg(short, long)]
        status: Option<String>,
        #[arg(short, long)]
        title: Option<String>,
    },
    /// Delete books by id
    Delete {
        #[arg(required = true)]
        book_ids: Vec<String>,
    },
    /// Monthly chart series of an owner
    Charts { owner: String },
    /// Reading record of an owner
    Record { owner: String },
    /// Search the book catalogue
    Search { query: String },
    /// Check that the database answers
    Health,
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?.overlay(|key| std::env::var(key).ok())?,
        None => Config::from_env()?,
    };
    logging::init(&config.log_filter)?;

    let library = Library::open(&config)
        .await
        .with_context(|| format!("Failed to open {}", config.database_path.display()))?;

    match cli.command {
        Commands::Register {
            external_id,
            name,
            email,
            password,
        } => {
            let mut user = NewUser::new(external_id, name, email);
            if let Some(password) = password {
                user = user.with_password(password);
            }
            print_json(&library.register_user(user).await?)?;
        }
        Commands::User { external_id } => {
            print_json(&library.find_user(&external_id).await?)?;
        }
        Commands::RemoveUser { external_id } => {
            library.remove_user(&external_id).await?;
            println!("Removed {}", external_id);
        }
        Commands::Add {
            owner,
            title,
            author,
            isbn10,
            image_url,
            page,
            price,
            status,
        } => {
            let book = NewBook::new(owner, title, parse_status(&status)?)
                .with_author(author)
                .with_isbn10(isbn10)
                .with_image_url(image_url)
                .with_page(parse_count(&page)?)
                .with_price(parse_count(&price)?);
            print_json(&library.create_book_with_charts(book).await?)?;
        }
        Commands::Shelf { owner } => {
            print_json(&library.find_books_by_owner(&owner).await?)?;
        }
        Commands::Update {
            book_id,
            page,
            price,
            status,
            title,
        } => {
            let mut book = library.find_book(parse_book_id(&book_id)?).await?;
            if let Some(page) = page {
                book.page = parse_count(&page)?;
            }
            if let Some(price) = price {
                book.price = parse_count(&price)?;
            }
            if let Some(status) = status {
                book.status = parse_status(&status)?;
            }
            if let Some(title) = title {
                book.title = title;
            }
            print_json(&library.update_book_with_charts(book).await?)?;
        }
        Commands::Delete { book_ids } => {
            let refs = parse_book_refs(&book_ids)?;
            let deleted = library.delete_books_with_charts(&refs).await?;
            println!("Deleted {} book(s)", deleted);
        }
        Commands::Charts { owner } => {
            print_json(&library.find_charts_by_owner(&owner).await?)?;
        }
        Commands::Record { owner } => {
            print_json(&library.record_for_owner(&owner).await?)?;
        }
        Commands::Health => {
            if !library.is_active().await {
                bail!("database at {} is not answering", config.database_path.display());
            }
            println!("ok");
        }
        Commands::Search { query } => {
            let search = BookSearch::from_config(&config)?;
            print_json(&search.search(&query).await?)?;
        }
    }

    Ok(())
}

//! Catalog command-line front end.
//!
//! # Responsibility
//! - Map subcommands onto catalog service operations.
//! - Render display records and outcome messages for the terminal.
//!
//! Parameter parsing rules live in the core service; this binary only
//! collects text and prints results.

use anyhow::{anyhow, Context, Result};
use bookshelf_core::db::open_db;
use bookshelf_core::{
    default_log_level, init_logging, BookListQuery, CatalogService, NewAuthorRequest,
    NewBookRequest, SortKey, SqliteCatalogRepository,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

const AUTHOR_ADDED_MESSAGE: &str = "Author added successfully!";
const BOOK_ADDED_MESSAGE: &str = "Book added successfully!";

#[derive(Parser)]
#[command(
    name = "bookshelf",
    about = "Browse and maintain a local library catalog",
    version
)]
struct Cli {
    /// Path to the catalog database file.
    #[arg(long, default_value = "data/library.sqlite")]
    db: PathBuf,

    /// Absolute directory for rolling log files; logging stays off when
    /// unset.
    #[arg(long)]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List books with optional title filter and sort order.
    List {
        /// Substring to match against book titles.
        #[arg(long, short)]
        query: Option<String>,
        /// Sort order: `title` or `author`.
        #[arg(long, default_value = "title")]
        sort_by: String,
    },
    /// List all authors.
    Authors,
    /// Add an author.
    AddAuthor {
        #[arg(long)]
        name: String,
        /// Birth date as YYYY-MM-DD.
        #[arg(long)]
        birth_date: Option<String>,
        /// Date of death as YYYY-MM-DD.
        #[arg(long)]
        date_of_death: Option<String>,
    },
    /// Add a book attached to an existing author.
    AddBook {
        #[arg(long)]
        title: String,
        #[arg(long)]
        isbn: String,
        #[arg(long)]
        publication_year: Option<String>,
        /// Id of the owning author.
        #[arg(long)]
        author: String,
    },
    /// Delete a book; its author is removed too when left bookless.
    DeleteBook { id: i64 },
    /// Delete an author and every book they own.
    DeleteAuthor { id: i64 },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        init_logging(default_log_level(), log_dir).map_err(|err| anyhow!(err))?;
    }

    if let Some(parent) = cli.db.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }

    let conn = open_db(&cli.db)
        .with_context(|| format!("failed to open catalog database at {}", cli.db.display()))?;
    let repo = SqliteCatalogRepository::try_new(&conn)?;
    let service = CatalogService::new(repo);

    match cli.command {
        Command::List { query, sort_by } => {
            let listing = service.list_books(&BookListQuery {
                filter: query,
                sort: SortKey::from_param(&sort_by),
            })?;
            if listing.is_empty() {
                println!("No books in the catalog.");
            }
            for record in listing {
                println!("[{}] {} by {}", record.id, record.title, record.author);
                println!("      cover: {}", record.cover_url);
            }
        }
        Command::Authors => {
            for author in service.list_authors()? {
                println!("[{}] {author}", author.id);
            }
        }
        Command::AddAuthor {
            name,
            birth_date,
            date_of_death,
        } => {
            let id = service.create_author(&NewAuthorRequest {
                name,
                birth_date,
                date_of_death,
            })?;
            println!("{AUTHOR_ADDED_MESSAGE} (id={id})");
        }
        Command::AddBook {
            title,
            isbn,
            publication_year,
            author,
        } => {
            let id = service.create_book(&NewBookRequest {
                title,
                isbn,
                publication_year,
                author_id: author,
            })?;
            println!("{BOOK_ADDED_MESSAGE} (id={id})");
        }
        Command::DeleteBook { id } => {
            let outcome = service.delete_book(id)?;
            match outcome.removed_author {
                Some(author_id) => println!(
                    "Book {id} deleted; author {author_id} had no other books and was removed too."
                ),
                None => println!("Book {id} deleted."),
            }
        }
        Command::DeleteAuthor { id } => {
            let outcome = service.delete_author(id)?;
            println!(
                "Author {id} deleted along with {} book(s).",
                outcome.removed_books
            );
        }
    }

    Ok(())
}

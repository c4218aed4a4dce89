//! # Command Handlers
//!
//! Each module exposes the operations as async functions taking a
//! [`quill_db::Database`], plus a `handle` function that runs one parsed
//! subcommand and prints its result to stdout.
//!
//! ```text
//! commands/
//! ├── company.rs  show / set
//! ├── client.rs   add / list / show / edit / delete
//! └── quote.rs    create / list / show / edit / status / duplicate / delete / export
//! ```

pub mod client;
pub mod company;
pub mod quote;

#[cfg(test)]
pub(crate) mod test_support {
    use quill_core::Client;
    use quill_db::{Database, DbConfig};

    pub async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    pub async fn test_client(db: &Database) -> Client {
        let mut client = Client::new("Jane Doe");
        client.company = "Doe Industries".to_string();
        client.address = "1 Rue de la Paix".to_string();
        client.postal_code = "75002".to_string();
        client.city = "Paris".to_string();
        db.clients().create(&client).await.unwrap()
    }
}

//! # Client Commands

use quill_core::validation::validate_client_name;
use quill_core::Client;
use quill_db::Database;
use tracing::info;

use crate::args::{ClientArgs, ClientCommand, ClientEditArgs};
use crate::error::{AppError, AppResult};

pub async fn handle(db: &Database, command: ClientCommand) -> AppResult<()> {
    match command {
        ClientCommand::Add(args) => {
            let client = add(db, &args).await?;
            println!("Client {} created: {}", client.id, client.name);
        }
        ClientCommand::List => {
            let clients = db.clients().list().await?;
            if clients.is_empty() {
                println!("No clients.");
            }
            for client in clients {
                match client.distinct_company() {
                    Some(company) => println!("{:>5}  {} ({})", client.id, client.name, company),
                    None => println!("{:>5}  {}", client.id, client.name),
                }
            }
        }
        ClientCommand::Show { id } => {
            let client = find(db, id).await?;
            println!("{}", serde_json::to_string_pretty(&client)?);
        }
        ClientCommand::Edit { id, fields } => {
            let client = edit(db, id, &fields).await?;
            println!("Client {} updated: {}", client.id, client.name);
        }
        ClientCommand::Delete { id } => {
            db.clients().delete(id).await?;
            info!(id, "Client deleted");
            println!("Client {} deleted", id);
        }
    }
    Ok(())
}

/// Validates and stores a new client.
pub async fn add(db: &Database, args: &ClientArgs) -> AppResult<Client> {
    validate_client_name(&args.name)?;

    let text = |value: &Option<String>| value.as_deref().map(str::trim).unwrap_or_default().to_string();
    let client = Client {
        company: text(&args.company),
        email: text(&args.email),
        phone: text(&args.phone),
        address: text(&args.address),
        city: text(&args.city),
        postal_code: text(&args.postal_code),
        country: text(&args.country),
        tax_id: text(&args.tax_id),
        ..Client::new(args.name.trim())
    };

    Ok(db.clients().create(&client).await?)
}

/// Applies the given fields to a stored client.
///
/// Quotes read the client when loaded, so later exports show the new
/// details.
pub async fn edit(db: &Database, id: i64, fields: &ClientEditArgs) -> AppResult<Client> {
    let mut client = find(db, id).await?;

    if let Some(name) = &fields.name {
        validate_client_name(name)?;
        client.name = name.trim().to_string();
    }

    let updates = [
        (&fields.company, &mut client.company),
        (&fields.email, &mut client.email),
        (&fields.phone, &mut client.phone),
        (&fields.address, &mut client.address),
        (&fields.city, &mut client.city),
        (&fields.postal_code, &mut client.postal_code),
        (&fields.country, &mut client.country),
        (&fields.tax_id, &mut client.tax_id),
    ];
    for (value, field) in updates {
        if let Some(value) = value {
            *field = value.trim().to_string();
        }
    }

    db.clients().update(&client).await?;
    info!(id, "Client updated");
    find(db, id).await
}

async fn find(db: &Database, id: i64) -> AppResult<Client> {
    db.clients()
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Client", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{test_client, test_db};

    #[tokio::test]
    async fn test_add_client() {
        let db = test_db().await;

        let args = ClientArgs {
            name: "  Jane Doe ".into(),
            company: Some("Doe & Co".into()),
            city: Some("Nantes".into()),
            ..Default::default()
        };
        let client = add(&db, &args).await.unwrap();

        assert!(client.id > 0);
        assert_eq!(client.name, "Jane Doe");
        assert_eq!(client.company, "Doe & Co");
        assert_eq!(client.email, "");

        let stored = db.clients().get_by_id(client.id).await.unwrap().unwrap();
        assert_eq!(stored.city, "Nantes");
    }

    #[tokio::test]
    async fn test_add_client_requires_name() {
        let db = test_db().await;

        let args = ClientArgs {
            name: "   ".into(),
            ..Default::default()
        };
        assert!(matches!(add(&db, &args).await, Err(AppError::Validation(_))));
        assert!(db.clients().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_edit_client() {
        let db = test_db().await;
        let client = test_client(&db).await;

        let fields = ClientEditArgs {
            email: Some(" jane@doe.test ".into()),
            company: Some(String::new()),
            ..Default::default()
        };
        let edited = edit(&db, client.id, &fields).await.unwrap();

        assert_eq!(edited.email, "jane@doe.test");
        assert_eq!(edited.company, "");
        assert_eq!(edited.name, "Jane Doe");
        assert_eq!(edited.city, "Paris");
    }

    #[tokio::test]
    async fn test_edit_client_validates_before_saving() {
        let db = test_db().await;
        let client = test_client(&db).await;

        let fields = ClientEditArgs {
            name: Some(" ".into()),
            email: Some("new@doe.test".into()),
            ..Default::default()
        };
        assert!(matches!(
            edit(&db, client.id, &fields).await,
            Err(AppError::Validation(_))
        ));

        let stored = find(&db, client.id).await.unwrap();
        assert_eq!(stored.email, client.email);
    }

    #[tokio::test]
    async fn test_show_and_edit_missing_client() {
        let db = test_db().await;

        assert!(matches!(find(&db, 9).await, Err(AppError::NotFound(_))));
        assert!(matches!(
            edit(&db, 9, &ClientEditArgs::default()).await,
            Err(AppError::NotFound(_))
        ));
    }
}

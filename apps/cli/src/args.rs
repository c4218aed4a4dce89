//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "quill")]
#[command(about = "Draft, number and export client quotes as PDF", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: platform config dir, quill.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Issuing company profile
    #[command(subcommand)]
    Company(CompanyCommand),

    /// Quote recipients
    #[command(subcommand)]
    Client(ClientCommand),

    /// Quotes and PDF export
    #[command(subcommand, alias = "q")]
    Quote(QuoteCommand),

    /// Configuration file
    #[command(subcommand)]
    Config(ConfigCommand),
}

// =============================================================================
// Company
// =============================================================================

#[derive(Subcommand, Debug)]
pub enum CompanyCommand {
    /// Print the company profile
    Show,

    /// Update fields of the company profile
    Set(CompanyArgs),
}

/// Fields left out keep their stored value.
#[derive(Args, Debug, Default, Clone)]
pub struct CompanyArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub city: Option<String>,
    #[arg(long)]
    pub postal_code: Option<String>,
    #[arg(long)]
    pub country: Option<String>,
    #[arg(long)]
    pub tax_id: Option<String>,
    #[arg(long)]
    pub website: Option<String>,
    /// Three-letter currency code
    #[arg(long)]
    pub currency: Option<String>,
    /// Default tax rate in percent for new items
    #[arg(long)]
    pub tax_rate: Option<String>,
    /// PNG or JPEG stored in the profile
    #[arg(long, value_name = "PATH")]
    pub logo: Option<PathBuf>,
}

// =============================================================================
// Client
// =============================================================================

#[derive(Subcommand, Debug)]
pub enum ClientCommand {
    /// Register a client
    #[command(alias = "new")]
    Add(ClientArgs),

    /// List clients
    #[command(alias = "ls")]
    List,

    /// Print a client as JSON
    Show { id: i64 },

    /// Update fields of a client
    Edit {
        id: i64,

        #[command(flatten)]
        fields: ClientEditArgs,
    },

    /// Delete a client without quotes
    #[command(alias = "rm")]
    Delete { id: i64 },
}

#[derive(Args, Debug, Default, Clone)]
pub struct ClientArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub company: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub city: Option<String>,
    #[arg(long)]
    pub postal_code: Option<String>,
    #[arg(long)]
    pub country: Option<String>,
    #[arg(long)]
    pub tax_id: Option<String>,
}

/// Fields left out keep their stored value; an empty string clears an
/// optional field.
#[derive(Args, Debug, Default, Clone)]
pub struct ClientEditArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub company: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub city: Option<String>,
    #[arg(long)]
    pub postal_code: Option<String>,
    #[arg(long)]
    pub country: Option<String>,
    #[arg(long)]
    pub tax_id: Option<String>,
}

// =============================================================================
// Quote
// =============================================================================

#[derive(Subcommand, Debug)]
pub enum QuoteCommand {
    /// Create a draft quote with a fresh number
    #[command(alias = "new")]
    Create(CreateQuoteArgs),

    /// List quotes, newest first
    #[command(alias = "ls")]
    List,

    /// Print a quote as JSON
    Show { id: i64 },

    /// Change items, client, discount or texts; totals are recomputed
    Edit {
        id: i64,

        #[command(flatten)]
        changes: EditQuoteArgs,
    },

    /// Set the status: draft, sent, accepted, rejected or expired
    Status { id: i64, status: String },

    /// Copy a quote into a new draft
    Duplicate { id: i64 },

    /// Delete a quote and its items
    #[command(alias = "rm")]
    Delete { id: i64 },

    /// Write the quote PDF, terms document appended when present
    Export {
        id: i64,

        /// Target file (default: <output_dir>/<year>_<month>_quote_<code>.pdf)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Default, Clone)]
pub struct CreateQuoteArgs {
    /// Client id
    #[arg(long)]
    pub client: i64,

    /// Item as "description;quantity;unit price[;tax rate]"
    #[arg(long = "item", value_name = "ITEM", required = true)]
    pub items: Vec<String>,

    #[arg(long)]
    pub discount: Option<String>,

    #[arg(long)]
    pub notes: Option<String>,

    /// Payment terms (default from config)
    #[arg(long)]
    pub terms: Option<String>,

    /// Days until the quote expires (default from config)
    #[arg(long)]
    pub validity_days: Option<i64>,
}

/// Item changes apply in order: `--set-item`, then `--remove-item`, then
/// `--add-item`. Line numbers start at 1 and refer to the stored quote.
#[derive(Args, Debug, Default, Clone)]
pub struct EditQuoteArgs {
    /// Move the quote to another client id
    #[arg(long)]
    pub client: Option<i64>,

    /// Append an item, "description;quantity;unit price[;tax rate]"
    #[arg(long = "add-item", value_name = "ITEM")]
    pub add_items: Vec<String>,

    /// Replace a line, "N:description;quantity;unit price[;tax rate]"
    #[arg(long = "set-item", value_name = "N:ITEM")]
    pub set_items: Vec<String>,

    /// Delete line N
    #[arg(long = "remove-item", value_name = "N")]
    pub remove_items: Vec<usize>,

    #[arg(long)]
    pub discount: Option<String>,

    #[arg(long)]
    pub notes: Option<String>,

    /// Payment terms
    #[arg(long)]
    pub terms: Option<String>,

    /// Days from the issue date until the quote expires
    #[arg(long)]
    pub validity_days: Option<i64>,
}

// =============================================================================
// Config
// =============================================================================

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,

    /// Write the effective configuration to the config file
    Init,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_quote_create() {
        let cli = Cli::parse_from([
            "quill",
            "-v",
            "quote",
            "create",
            "--client",
            "3",
            "--item",
            "Audit;2;1000",
            "--item",
            "Travel;1;50;0",
            "--discount",
            "10",
        ]);

        assert!(cli.verbose);
        match cli.command {
            Commands::Quote(QuoteCommand::Create(args)) => {
                assert_eq!(args.client, 3);
                assert_eq!(args.items, vec!["Audit;2;1000", "Travel;1;50;0"]);
                assert_eq!(args.discount.as_deref(), Some("10"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_create_requires_an_item() {
        let result = Cli::try_parse_from(["quill", "quote", "create", "--client", "1"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_quote_edit() {
        let cli = Cli::parse_from([
            "quill",
            "q",
            "edit",
            "4",
            "--set-item",
            "1:Audit;3;900",
            "--remove-item",
            "2",
            "--remove-item",
            "3",
            "--add-item",
            "Travel;1;50",
            "--notes",
            "",
        ]);

        match cli.command {
            Commands::Quote(QuoteCommand::Edit { id, changes }) => {
                assert_eq!(id, 4);
                assert_eq!(changes.set_items, vec!["1:Audit;3;900"]);
                assert_eq!(changes.remove_items, vec![2, 3]);
                assert_eq!(changes.add_items, vec!["Travel;1;50"]);
                assert_eq!(changes.notes.as_deref(), Some(""));
                assert!(changes.discount.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_client_edit() {
        let cli = Cli::parse_from(["quill", "client", "edit", "2", "--email", "jane@doe.test"]);

        match cli.command {
            Commands::Client(ClientCommand::Edit { id, fields }) => {
                assert_eq!(id, 2);
                assert_eq!(fields.email.as_deref(), Some("jane@doe.test"));
                assert!(fields.name.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_export_with_global_config() {
        let cli = Cli::parse_from(["quill", "quote", "export", "7", "-o", "out.pdf", "--config", "q.toml"]);

        assert_eq!(cli.config, Some(PathBuf::from("q.toml")));
        match cli.command {
            Commands::Quote(QuoteCommand::Export { id, output }) => {
                assert_eq!(id, 7);
                assert_eq!(output, Some(PathBuf::from("out.pdf")));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}

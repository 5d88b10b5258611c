//! Key-value data commands

use clap::{Args, Subcommand, ValueEnum};
use indexmap::IndexMap;
use serde_json::Value;
use tracing::info;

use super::{CliError, OutputFormat};
use crate::access::{AccessClass, DataOptions};
use crate::{CloudSaveService, FieldFilter, FilterOp, Item, Query, SaveItem};

/// Access class flag values
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum AccessArg {
    /// Player's default partition
    #[default]
    Default,
    /// Server-only partition
    Private,
    /// Player-readable, server-writable partition
    Protected,
    /// Partition readable by every player
    Public,
}

impl From<AccessArg> for AccessClass {
    fn from(arg: AccessArg) -> Self {
        match arg {
            AccessArg::Default => AccessClass::Default,
            AccessArg::Private => AccessClass::Private,
            AccessArg::Protected => AccessClass::Protected,
            AccessArg::Public => AccessClass::Public,
        }
    }
}

/// Which data a command addresses
#[derive(Args, Debug, Clone, Default)]
pub struct ScopeArgs {
    /// Access class of the player partition
    #[arg(long, value_enum, default_value = "default")]
    pub access_class: AccessArg,

    /// Read another player's public data
    #[arg(long, conflicts_with = "custom_id")]
    pub public_player: Option<String>,

    /// Read a custom entity instead of the signed-in player
    #[arg(long)]
    pub custom_id: Option<String>,
}

impl ScopeArgs {
    fn options(&self) -> DataOptions {
        match &self.public_player {
            Some(player_id) => DataOptions::public_for(player_id.clone()),
            None => DataOptions {
                access_class: self.access_class.into(),
                ..DataOptions::default()
            },
        }
    }
}

/// Key-value data commands
#[derive(Subcommand, Debug)]
pub enum DataCommand {
    /// List every key
    Keys {
        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// Load items, every item when no key is given
    Load {
        /// Keys to load
        keys: Vec<String>,

        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// Save KEY=VALUE pairs; values are parsed as JSON, falling back to a string
    Save {
        /// Items to save
        #[arg(required = true, value_parser = parse_key_value)]
        items: Vec<(String, Value)>,

        /// Access class of the player partition
        #[arg(long, value_enum, default_value = "default")]
        access_class: AccessArg,

        /// Write lock every item is expected to hold
        #[arg(long)]
        write_lock: Option<String>,
    },

    /// Delete one key, or every key with --all
    Delete {
        /// Key to delete
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        key: Option<String>,

        /// Delete every key in the partition
        #[arg(long)]
        all: bool,

        /// Access class of the player partition
        #[arg(long, value_enum, default_value = "default")]
        access_class: AccessArg,

        /// Expected write lock of the key
        #[arg(long, conflicts_with = "all")]
        write_lock: Option<String>,
    },

    /// Query indexed data
    Query(QueryArgs),
}

/// Query command arguments
#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Field condition as KEY:OP:VALUE, OP one of eq, ne, lt, le, gt, ge
    #[arg(long = "filter", required = true, value_parser = parse_filter)]
    pub filters: Vec<FieldFilter>,

    /// Keys to return for each match
    #[arg(long = "return-key")]
    pub return_keys: Vec<String>,

    /// Matches to skip
    #[arg(long)]
    pub offset: Option<u32>,

    /// Maximum matches
    #[arg(long)]
    pub limit: Option<u32>,

    /// Random sample size
    #[arg(long)]
    pub sample_size: Option<u32>,

    /// Access class to query; public for players, default for custom entities
    #[arg(long, value_enum)]
    pub access_class: Option<AccessArg>,

    /// Query custom entities instead of players
    #[arg(long)]
    pub custom: bool,
}

impl QueryArgs {
    fn query(&self) -> Query {
        Query {
            fields: self.filters.clone(),
            return_keys: self.return_keys.clone(),
            offset: self.offset,
            limit: self.limit,
            sample_size: self.sample_size,
        }
    }
}

/// JSON if it parses, a plain string otherwise
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn parse_key_value(s: &str) -> Result<(String, Value), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("'{s}' is not KEY=VALUE"))?;
    if key.is_empty() {
        return Err(format!("'{s}' has an empty key"));
    }
    Ok((key.to_string(), parse_value(value)))
}

fn parse_filter(s: &str) -> Result<FieldFilter, String> {
    let mut parts = s.splitn(3, ':');
    let (Some(key), Some(op), Some(value)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(format!("'{s}' is not KEY:OP:VALUE"));
    };

    let op = match op.to_lowercase().as_str() {
        "eq" => FilterOp::Eq,
        "ne" => FilterOp::Ne,
        "lt" => FilterOp::Lt,
        "le" => FilterOp::Le,
        "gt" => FilterOp::Gt,
        "ge" => FilterOp::Ge,
        other => return Err(format!("unknown operator '{other}'")),
    };
    Ok(FieldFilter::new(key, parse_value(value), op))
}

fn print_items(items: &IndexMap<String, Item>) {
    println!("Loaded {} items:\n", items.len());
    for (key, item) in items {
        println!(
            "{} = {} (write lock {})",
            key,
            item.value,
            item.write_lock.as_deref().unwrap_or("-")
        );
    }
}

impl DataCommand {
    /// Execute the data command
    pub async fn execute(&self, service: &CloudSaveService, format: OutputFormat) -> Result<(), CliError> {
        match self {
            DataCommand::Keys { scope } => {
                let keys = match &scope.custom_id {
                    Some(id) => service.data.custom.list_all_keys(id).await?,
                    None => service.data.player.list_all_keys(&scope.options()).await?,
                };
                format.emit(&keys, |keys| {
                    println!("Found {} keys:\n", keys.len());
                    for key in keys {
                        println!("{} | {}", key.key, key.write_lock.as_deref().unwrap_or("-"));
                    }
                })
            }
            DataCommand::Load { keys, scope } => {
                let items = match (&scope.custom_id, keys.is_empty()) {
                    (Some(id), true) => service.data.custom.load_all(id).await?,
                    (Some(id), false) => service.data.custom.load(id, keys.iter().cloned()).await?,
                    (None, true) => service.data.player.load_all(&scope.options()).await?,
                    (None, false) => {
                        service
                            .data
                            .player
                            .load(keys.iter().cloned(), &scope.options())
                            .await?
                    }
                };
                format.emit(&items, print_items)
            }
            DataCommand::Save {
                items,
                access_class,
                write_lock,
            } => {
                let options = DataOptions {
                    access_class: (*access_class).into(),
                    ..DataOptions::default()
                };
                let data = items.iter().map(|(key, value)| {
                    let item = SaveItem::new(value.clone());
                    let item = match write_lock {
                        Some(lock) => item.with_write_lock(lock.clone()),
                        None => item,
                    };
                    (key.clone(), item)
                });

                let written = service.data.player.save(data, &options).await?;
                info!("Saved {} items", written.len());
                format.emit(&written, |written| {
                    for (key, lock) in written {
                        println!("{key} -> write lock {lock}");
                    }
                })
            }
            DataCommand::Delete {
                key,
                all,
                access_class,
                write_lock,
            } => {
                let mut options = DataOptions {
                    access_class: (*access_class).into(),
                    ..DataOptions::default()
                };
                if *all {
                    service.data.player.delete_all(&options).await?;
                    info!("Deleted every key in {} data", options.access_class);
                    return Ok(());
                }

                let key = key
                    .as_deref()
                    .ok_or_else(|| CliError::InvalidArgument("a key or --all is required".to_string()))?;
                options.write_lock = write_lock.clone();
                service.data.player.delete(key, &options).await?;
                info!("Deleted {}", key);
                Ok(())
            }
            DataCommand::Query(args) => {
                let query = args.query();
                let results = if args.custom {
                    let access_class = args.access_class.unwrap_or(AccessArg::Default);
                    service.data.custom.query(&query, access_class.into()).await?
                } else {
                    let access_class = args.access_class.unwrap_or(AccessArg::Public);
                    service.data.player.query(&query, access_class.into()).await?
                };
                format.emit(&results, |results| {
                    println!("Matched {} entities:\n", results.len());
                    for entity in results {
                        let values: Vec<String> = entity
                            .data
                            .iter()
                            .map(|item| format!("{}={}", item.key, item.value))
                            .collect();
                        println!("{} | {}", entity.id, values.join(", "));
                    }
                })
            }
        }
    }
}

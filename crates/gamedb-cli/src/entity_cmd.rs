//! Entity subcommands: list, get, create, update, delete.
//!
//! Results are written to stdout as pretty-printed JSON.

use std::io::{self, Write};

use anyhow::{Context, Result};
use serde_json::Value;

use gamedb_client::ApiClient;
use gamedb_core::entity::{
    Ailment, Armor, ArmorSet, Charm, Decoration, Entity, Event, Item, Location, Monster,
    MotionValue, Skill, Weapon,
};
use gamedb_core::{Filter, Projection};

/// Resource selector on the command line.
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityKind {
    Ailment,
    Armor,
    ArmorSet,
    Charm,
    Decoration,
    Event,
    Item,
    Location,
    Monster,
    MotionValue,
    Skill,
    Weapon,
}

/// Entity subcommands.
#[derive(clap::Subcommand, Debug)]
pub enum EntityAction {
    /// List records, optionally filtered.
    List {
        entity: EntityKind,
        /// Query document as JSON, e.g. '{"rank":"high"}'.
        #[arg(short, long)]
        filter: Option<String>,
        /// Comma-separated fields to return.
        #[arg(long, value_delimiter = ',')]
        fields: Vec<String>,
    },
    /// Fetch one record.
    Get {
        entity: EntityKind,
        id: u64,
        #[arg(long, value_delimiter = ',')]
        fields: Vec<String>,
    },
    /// Create a record from JSON (`@path` reads a file).
    Create {
        entity: EntityKind,
        data: String,
        #[arg(long, value_delimiter = ',')]
        fields: Vec<String>,
    },
    /// Patch the given fields of a record.
    Update {
        entity: EntityKind,
        id: u64,
        data: String,
        #[arg(long, value_delimiter = ',')]
        fields: Vec<String>,
    },
    /// Delete a record.
    Delete { entity: EntityKind, id: u64 },
}

impl EntityAction {
    pub const fn entity(&self) -> EntityKind {
        match self {
            Self::List { entity, .. }
            | Self::Get { entity, .. }
            | Self::Create { entity, .. }
            | Self::Update { entity, .. }
            | Self::Delete { entity, .. } => *entity,
        }
    }
}

/// Execute an entity subcommand.
pub async fn run(action: EntityAction, client: &ApiClient) -> Result<()> {
    let output = match action.entity() {
        EntityKind::Ailment => execute::<Ailment>(action, client).await?,
        EntityKind::Armor => execute::<Armor>(action, client).await?,
        EntityKind::ArmorSet => execute::<ArmorSet>(action, client).await?,
        EntityKind::Charm => execute::<Charm>(action, client).await?,
        EntityKind::Decoration => execute::<Decoration>(action, client).await?,
        EntityKind::Event => execute::<Event>(action, client).await?,
        EntityKind::Item => execute::<Item>(action, client).await?,
        EntityKind::Location => execute::<Location>(action, client).await?,
        EntityKind::Monster => execute::<Monster>(action, client).await?,
        EntityKind::MotionValue => execute::<MotionValue>(action, client).await?,
        EntityKind::Skill => execute::<Skill>(action, client).await?,
        EntityKind::Weapon => execute::<Weapon>(action, client).await?,
    };

    let mut out = io::stdout();
    match output {
        Some(value) => writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?,
        None => writeln!(out, "Deleted")?,
    }
    Ok(())
}

async fn execute<E: Entity>(action: EntityAction, client: &ApiClient) -> Result<Option<Value>> {
    let resource = client.resource::<E>();
    let value = match action {
        EntityAction::List { filter, fields, .. } => {
            let filter = filter.as_deref().map(parse_filter).transpose()?;
            let items = resource
                .list(filter.as_ref(), projection(&fields).as_ref(), None)
                .await?;
            serde_json::to_value(items)?
        }
        EntityAction::Get { id, fields, .. } => {
            let item = resource.read(id, projection(&fields).as_ref(), None).await?;
            serde_json::to_value(item)?
        }
        EntityAction::Create { data, fields, .. } => {
            let payload = object_payload(&data, "Create")?;
            let created = resource
                .create(&payload, projection(&fields).as_ref())
                .await?;
            serde_json::to_value(created)?
        }
        EntityAction::Update { id, data, fields, .. } => {
            let patch = object_payload(&data, "Update")?;
            let updated = resource
                .update(id, &patch, projection(&fields).as_ref())
                .await?;
            serde_json::to_value(updated)?
        }
        EntityAction::Delete { id, .. } => {
            resource.delete(id).await?;
            return Ok(None);
        }
    };
    Ok(Some(value))
}

fn parse_filter(raw: &str) -> Result<Filter> {
    let value: Value = serde_json::from_str(raw).context("--filter is not valid JSON")?;
    if !value.is_object() {
        anyhow::bail!("--filter must be a JSON object");
    }
    Ok(Filter::from(value))
}

fn projection(fields: &[String]) -> Option<Projection> {
    let fields: Vec<&str> = fields
        .iter()
        .map(|f| f.trim())
        .filter(|f| !f.is_empty())
        .collect();
    (!fields.is_empty()).then(|| Projection::include(fields))
}

/// Inline JSON, or `@path` to read it from a file.
fn read_data(data: &str) -> Result<Value> {
    let text = match data.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read payload file {path}"))?,
        None => data.to_string(),
    };
    serde_json::from_str(&text).context("Payload is not valid JSON")
}

/// Request body for create/update, sent as given so fields the local
/// models do not know about still reach the server.
fn object_payload(data: &str, command: &str) -> Result<Value> {
    let value = read_data(data)?;
    if !value.is_object() {
        anyhow::bail!("{command} payload must be a JSON object");
    }
    Ok(value)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::ValueEnum;
    use gamedb_core::entity::RESOURCES;

    #[test]
    fn kinds_cover_the_catalog() {
        let names: Vec<String> = EntityKind::value_variants()
            .iter()
            .filter_map(|k| k.to_possible_value())
            .map(|v| v.get_name().to_string())
            .collect();
        let catalog: Vec<String> = RESOURCES.iter().map(|(n, _)| (*n).to_string()).collect();
        assert_eq!(names, catalog);
    }

    #[test]
    fn fields_become_inclusive_projection() {
        let p = projection(&["id".into(), " name ".into(), String::new()]).unwrap();
        assert_eq!(p.get("id"), Some(true));
        assert_eq!(p.get("name"), Some(true));
        assert!(projection(&[]).is_none());
    }

    #[test]
    fn filter_must_be_object() {
        assert!(parse_filter(r#"{"rank":"high"}"#).is_ok());
        assert!(parse_filter("[1]").is_err());
        assert!(parse_filter("{oops").is_err());
    }

    #[test]
    fn data_reads_inline_or_file() {
        assert_eq!(read_data(r#"{"a":1}"#).unwrap()["a"], 1);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("payload.json");
        std::fs::write(&path, r#"{"name":"Potion"}"#).unwrap();
        let value = read_data(&format!("@{}", path.display())).unwrap();
        assert_eq!(value["name"], "Potion");
    }

    #[test]
    fn payload_keeps_fields_the_models_lack() {
        let payload = object_payload(
            r#"{"name":"Kulu Headpiece","armorSet":{"id":35},"assets":{"icon":"a.png"}}"#,
            "Create",
        )
        .unwrap();
        assert_eq!(payload["armorSet"]["id"], 35);
        assert_eq!(payload["assets"]["icon"], "a.png");
    }

    #[test]
    fn payload_must_be_object() {
        let err = object_payload("[1,2]", "Create").unwrap_err();
        assert_eq!(err.to_string(), "Create payload must be a JSON object");
        assert!(object_payload("{oops", "Update").is_err());
    }
}

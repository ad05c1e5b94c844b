use serde::Deserialize;
use sqlx::{postgres::PgListener, Pool, Postgres};
use tokio::{sync::mpsc, task::JoinHandle};

use crate::{
    constants::{RECIPES_SCHEMA, RECIPES_TABLE, RECIPE_CHANGES_CHANNEL},
    error::StoreError,
    schema::Uuid,
};

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

#[derive(Deserialize)]
struct Envelope {
    schema: String,
    table: String,
}

/// Key payload published by the `notify_recipe_change` trigger. The row itself is re-read.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub schema: String,
    pub table: String,
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    pub id: Uuid,
    pub user_id: Uuid,
}

fn invalid(e: serde_json::Error) -> StoreError {
    StoreError::parse(format!("Invalid change payload: {e}"))
}

/// Events for other schemas or tables yield `None` whatever else they carry.
pub fn decode_change(payload: &str) -> Result<Option<ChangeEvent>, StoreError> {
    let envelope: Envelope = serde_json::from_str(payload).map_err(invalid)?;

    if envelope.schema != RECIPES_SCHEMA || envelope.table != RECIPES_TABLE {
        return Ok(None);
    }

    let event: ChangeEvent = serde_json::from_str(payload).map_err(invalid)?;
    Ok(Some(event))
}

/// Live `LISTEN` on the recipe change channel.
///
/// The listener runs on its own task and is torn down when the subscription is closed or dropped.
pub struct ChangeSubscription {
    channel: String,
    events: mpsc::UnboundedReceiver<ChangeEvent>,
    task: Option<JoinHandle<()>>,
}

impl ChangeSubscription {
    pub async fn open(pool: &Pool<Postgres>) -> Result<Self, StoreError> {
        let channel = RECIPE_CHANGES_CHANNEL;
        let mut listener = PgListener::connect_with(pool)
            .await
            .map_err(StoreError::from_read)?;
        listener
            .listen(channel)
            .await
            .map_err(StoreError::from_read)?;

        let (sender, events) = mpsc::unbounded_channel();

        let task = tokio::spawn(async move {
            loop {
                let notification = match listener.recv().await {
                    Ok(notification) => notification,
                    Err(e) => {
                        log::error!("> Change channel {channel} closed: {e}");
                        break;
                    }
                };

                match decode_change(notification.payload()) {
                    Ok(Some(event)) => {
                        if sender.send(event).is_err() {
                            break;
                        }
                    }
                    Ok(None) => log::trace!("> Ignored change on {channel}"),
                    Err(e) => log::error!("Could not parse change event. {e}"),
                }
            }
        });

        log::debug!("> Subscribed to {channel}");

        Ok(Self {
            channel: channel.to_owned(),
            events,
            task: Some(task),
        })
    }

    #[cfg(test)]
    pub(crate) fn from_receiver(channel: &str, events: mpsc::UnboundedReceiver<ChangeEvent>) -> Self {
        Self {
            channel: channel.to_owned(),
            events,
            task: None,
        }
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Next pending event, without waiting.
    pub fn try_next(&mut self) -> Option<ChangeEvent> {
        self.events.try_recv().ok()
    }

    pub async fn next(&mut self) -> Option<ChangeEvent> {
        self.events.recv().await
    }

    pub fn close(self) {}
}

impl Drop for ChangeSubscription {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.events.close();
        log::debug!("> Released subscription on {}", self.channel);
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::constants::INGREDIENTS_TABLE;

    const SCHEMA_SQL: &str = include_str!("../../sql/schema.sql");

    #[test]
    fn decodes_key_payload() {
        let payload = json!({
            "schema": "public",
            "table": "recipes",
            "type": "INSERT",
            "id": "00000000-0000-0000-0000-000000000001",
            "user_id": "00000000-0000-0000-0000-000000000009",
        })
        .to_string();

        let event = decode_change(&payload).unwrap().unwrap();
        assert_eq!(event.kind, ChangeKind::Insert);
        assert_eq!(event.id, Uuid::from_u128(1));
        assert_eq!(event.user_id, Uuid::from_u128(9));
    }

    #[test]
    fn payload_size_does_not_depend_on_row_contents() {
        let payload = json!({
            "schema": "public",
            "table": "recipes",
            "type": "DELETE",
            "id": Uuid::from_u128(2),
            "user_id": Uuid::from_u128(9),
        })
        .to_string();
        assert!(payload.len() < 200);

        let event = decode_change(&payload).unwrap().unwrap();
        assert_eq!(event.kind, ChangeKind::Delete);
        assert_eq!(event.id, Uuid::from_u128(2));

        assert!(!SCHEMA_SQL.contains("row_to_json"));
        assert!(SCHEMA_SQL.contains("'id', changed.id"));
        assert!(SCHEMA_SQL.contains("'user_id', changed.user_id"));
    }

    #[test]
    fn filters_other_tables_and_schemas() {
        let payload = json!({
            "schema": "public",
            "table": INGREDIENTS_TABLE,
            "type": "INSERT",
            "record": {"id": "00000000-0000-0000-0000-000000000003", "name": "salt"},
        })
        .to_string();
        assert!(decode_change(&payload).unwrap().is_none());

        let payload = json!({
            "schema": "audit",
            "table": "recipes",
            "type": "DELETE",
            "id": "00000000-0000-0000-0000-000000000002",
            "user_id": "00000000-0000-0000-0000-000000000009",
        })
        .to_string();
        assert!(decode_change(&payload).unwrap().is_none());
    }

    #[test]
    fn malformed_payload_is_a_parse_error() {
        let err = decode_change("{\"type\": \"TRUNCATE\"}").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Parse);

        let payload = json!({"schema": "public", "table": "recipes", "type": "INSERT"}).to_string();
        let err = decode_change(&payload).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Parse);
    }

    #[test]
    fn trigger_notifies_the_listened_channel() {
        let call = &SCHEMA_SQL[SCHEMA_SQL.find("pg_notify(").unwrap()..];
        let channel = call.split('\'').nth(1).unwrap();
        assert_eq!(channel, RECIPE_CHANGES_CHANNEL);
    }

    #[tokio::test]
    async fn dropping_the_subscription_closes_the_stream() {
        let (sender, receiver) = mpsc::unbounded_channel();
        let subscription = ChangeSubscription::from_receiver(RECIPE_CHANGES_CHANNEL, receiver);
        assert_eq!(subscription.channel(), "recipe_changes");

        subscription.close();
        assert!(sender.is_closed());
    }
}

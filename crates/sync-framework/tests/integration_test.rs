use async_trait::async_trait;
use sync_framework::{ActorEntity, FrameworkError, ResourceActor, Target};
use tokio::sync::mpsc;

// --- Test Entity ---

#[derive(Clone, Debug, PartialEq)]
struct Tag {
    id: u32,
    code: String,
    label: String,
}

#[derive(Debug)]
struct TagCreate {
    code: String,
    label: String,
}

#[derive(Debug)]
enum TagUpdate {
    Recode(String),
    Relabel(String),
}

#[derive(Debug, thiserror::Error, PartialEq)]
enum TagError {
    #[error("code must not be blank")]
    BlankCode,
}

/// Hooks report what they saw on this channel.
type HookLog = mpsc::UnboundedSender<String>;

#[async_trait]
impl ActorEntity for Tag {
    type Id = u32;
    type Key = String;
    type Create = TagCreate;
    type Update = TagUpdate;
    type Context = HookLog;
    type Error = TagError;

    fn key(&self) -> &String {
        &self.code
    }

    fn from_create_params(id: u32, params: TagCreate) -> Result<Self, Self::Error> {
        if params.code.trim().is_empty() {
            return Err(TagError::BlankCode);
        }
        Ok(Self {
            id,
            code: params.code,
            label: params.label,
        })
    }

    async fn on_update(&mut self, update: TagUpdate, _ctx: &HookLog) -> Result<(), Self::Error> {
        match update {
            TagUpdate::Recode(code) if code.trim().is_empty() => return Err(TagError::BlankCode),
            TagUpdate::Recode(code) => self.code = code,
            TagUpdate::Relabel(label) => self.label = label,
        }
        Ok(())
    }

    async fn after_create(&self, log: &HookLog) -> Result<(), Self::Error> {
        let _ = log.send(format!("created {}", self.code));
        Ok(())
    }

    async fn after_update(&self, previous: &Self, log: &HookLog) -> Result<(), Self::Error> {
        let _ = log.send(format!("updated {} -> {}", previous.code, self.code));
        Ok(())
    }

    async fn after_delete(&self, log: &HookLog) -> Result<(), Self::Error> {
        let _ = log.send(format!("deleted {}", self.code));
        Ok(())
    }
}

fn tag(code: &str) -> TagCreate {
    TagCreate {
        code: code.to_string(),
        label: format!("label {code}"),
    }
}

fn drain(log: &mut mpsc::UnboundedReceiver<String>) -> Vec<String> {
    let mut entries = Vec::new();
    while let Ok(entry) = log.try_recv() {
        entries.push(entry);
    }
    entries
}

#[tokio::test]
async fn test_lifecycle_and_hooks() {
    let (actor, client) = ResourceActor::<Tag>::new(10);
    let (log_tx, mut log) = mpsc::unbounded_channel();
    let handle = tokio::spawn(actor.run(log_tx));

    let created = client.create(tag("red")).await.unwrap();
    assert_eq!(created.id, 1);

    let by_key = client.get(Target::Key("red".into())).await.unwrap();
    assert_eq!(by_key, Some(created.clone()));
    let by_id = client.get(Target::Id(1)).await.unwrap();
    assert_eq!(by_id, Some(created));

    let updated = client
        .update(Target::Key("red".into()), TagUpdate::Recode("crimson".into()))
        .await
        .unwrap();
    assert_eq!(updated.code, "crimson");
    assert_eq!(client.get(Target::Key("red".into())).await.unwrap(), None);

    let removed = client.delete(Target::Key("crimson".into())).await.unwrap();
    assert_eq!(removed.id, 1);
    assert!(client.list().await.unwrap().is_empty());

    assert_eq!(
        drain(&mut log),
        vec!["created red", "updated red -> crimson", "deleted crimson"]
    );

    drop(client);
    handle.await.unwrap();
}

#[tokio::test]
async fn test_unique_key_is_enforced() {
    let (actor, client) = ResourceActor::<Tag>::new(10);
    let (log_tx, mut log) = mpsc::unbounded_channel();
    tokio::spawn(actor.run(log_tx));

    client.create(tag("red")).await.unwrap();
    client.create(tag("blue")).await.unwrap();

    let duplicate = client.create(tag("red")).await;
    assert!(matches!(duplicate, Err(FrameworkError::Conflict(key)) if key == "red"));

    let collision = client
        .update(Target::Key("blue".into()), TagUpdate::Recode("red".into()))
        .await;
    assert!(matches!(collision, Err(FrameworkError::Conflict(_))));

    // Nothing changed and no hook ran for the refused writes
    assert_eq!(client.list().await.unwrap().len(), 2);
    assert!(client.get(Target::Key("blue".into())).await.unwrap().is_some());
    assert_eq!(drain(&mut log), vec!["created red", "created blue"]);

    // Keeping one's own key is not a conflict
    let relabelled = client
        .update(Target::Key("red".into()), TagUpdate::Relabel("warm".into()))
        .await
        .unwrap();
    assert_eq!(relabelled.label, "warm");
}

#[tokio::test]
async fn test_missing_targets_and_entity_errors() {
    let (actor, client) = ResourceActor::<Tag>::new(10);
    let (log_tx, _log) = mpsc::unbounded_channel();
    tokio::spawn(actor.run(log_tx));

    let missing = client
        .update(Target::Key("none".into()), TagUpdate::Relabel("x".into()))
        .await;
    assert!(matches!(missing, Err(FrameworkError::NotFound(_))));
    assert!(matches!(
        client.delete(Target::Id(42)).await,
        Err(FrameworkError::NotFound(_))
    ));

    let invalid = client.create(tag("  ")).await.unwrap_err();
    assert_eq!(invalid.downcast_entity::<TagError>().unwrap(), TagError::BlankCode);

    client.create(tag("red")).await.unwrap();
    let invalid = client
        .update(Target::Key("red".into()), TagUpdate::Recode(String::new()))
        .await
        .unwrap_err();
    assert_eq!(invalid.downcast_entity::<TagError>().unwrap(), TagError::BlankCode);

    // Failed creates do not consume ids
    let next = client.create(tag("blue")).await.unwrap();
    assert_eq!(next.id, 2);
}

#[tokio::test]
async fn test_closed_actor_is_reported() {
    let (actor, client) = ResourceActor::<Tag>::new(10);
    drop(actor);

    let result = client.list().await;
    assert!(matches!(result, Err(FrameworkError::ActorClosed)));
}

//! Data structures for registry event notifications
//! Contains the event model and the envelope sent on the wire

use crate::core::NotificationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Media type of an event envelope. Endpoints reject any other content type.
pub const EVENTS_MEDIA_TYPE: &str = "application/vnd.docker.distribution.events.v1+json";

/// Registry action that produced an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Push,
    Pull,
    Delete,
    Mount,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Push => "push",
            Action::Pull => "pull",
            Action::Delete => "delete",
            Action::Mount => "mount",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = NotificationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "push" => Ok(Action::Push),
            "pull" => Ok(Action::Pull),
            "delete" => Ok(Action::Delete),
            "mount" => Ok(Action::Mount),
            other => Err(NotificationError::config(format!(
                "unknown action '{}', expected one of: push, pull, delete, mount",
                other
            ))),
        }
    }
}

/// The object an action was performed on
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Kind of object, e.g. `manifest` or `layer`
    #[serde(rename = "type")]
    pub target_type: String,
    /// Repository name
    pub name: String,
    #[serde(rename = "mediaType", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl Target {
    pub fn new<T: Into<String>, N: Into<String>>(target_type: T, name: N) -> Self {
        Self {
            target_type: target_type.into(),
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Who triggered the event
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    #[serde(default)]
    pub name: String,
}

/// The registry node that generated the event
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    #[serde(default)]
    pub addr: String,
    #[serde(rename = "instanceID", default)]
    pub instance_id: String,
}

/// The request that caused the event
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub addr: String,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub method: String,
    #[serde(rename = "useragent", default)]
    pub user_agent: String,
}

/// One registry action occurrence.
///
/// Fields are read-only once built; the `with_*` builders consume the event so
/// nothing can change it after it has been handed to a sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    id: String,
    timestamp: DateTime<Utc>,
    action: Action,
    target: Target,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    request: Option<RequestRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    actor: Option<Actor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source: Option<Source>,
}

impl Event {
    /// Create an event with a fresh id and the current time
    pub fn new(action: Action, target: Target) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            action,
            target,
            request: None,
            actor: None,
            source: None,
        }
    }

    pub fn with_actor(mut self, actor: Actor) -> Self {
        self.actor = Some(actor);
        self
    }

    pub fn with_source(mut self, source: Source) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_request(mut self, request: RequestRecord) -> Self {
        self.request = Some(request);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn actor(&self) -> Option<&Actor> {
        self.actor.as_ref()
    }

    pub fn source(&self) -> Option<&Source> {
        self.source.as_ref()
    }

    pub fn request(&self) -> Option<&RequestRecord> {
        self.request.as_ref()
    }
}

/// Wire container for one delivery attempt. Event order is call order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub events: Vec<Event>,
}

impl Envelope {
    pub fn new(events: &[Event]) -> Self {
        Self {
            events: events.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_wire_shape() {
        let mut target = Target::new("manifest", "library/test");
        target.digest = Some("sha256:abc".to_string());
        let event = Event::new(Action::Push, target).with_actor(Actor {
            name: "alice".to_string(),
        });

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["action"], "push");
        assert_eq!(value["target"]["type"], "manifest");
        assert_eq!(value["target"]["name"], "library/test");
        assert_eq!(value["target"]["digest"], "sha256:abc");
        assert!(value["target"].get("mediaType").is_none());
        assert_eq!(value["actor"]["name"], "alice");
        assert!(value.get("source").is_none());
        assert_eq!(value["id"], event.id());
    }

    #[test]
    fn test_envelope_preserves_order() {
        let events = vec![
            Event::new(Action::Push, Target::new("manifest", "a")),
            Event::new(Action::Pull, Target::new("layer", "b")),
            Event::new(Action::Delete, Target::new("manifest", "c")),
        ];

        let body = serde_json::to_vec(&Envelope::new(&events)).unwrap();
        let decoded: Envelope = serde_json::from_slice(&body).unwrap();
        assert_eq!(decoded.events, events);
    }

    #[test]
    fn test_event_ids_are_unique() {
        let a = Event::new(Action::Push, Target::new("manifest", "a"));
        let b = Event::new(Action::Push, Target::new("manifest", "a"));
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_action_from_str() {
        assert_eq!("PUSH".parse::<Action>().unwrap(), Action::Push);
        assert_eq!(" mount ".parse::<Action>().unwrap(), Action::Mount);
        assert!("copy".parse::<Action>().is_err());
    }
}

//! Conversation memory
//!
//! Keeps the high-level chat history that persists across user turns. The
//! agent's intermediate tool steps never land here; only what the user said
//! and what the assistant replied.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Default maximum number of messages kept per conversation
pub const DEFAULT_MAX_MESSAGES: usize = 100;

/// One entry in the conversation log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    /// Role: user or assistant
    pub role: String,
    pub content: String,
    pub timestamp: DateTime<Local>,
}

/// A persisted conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub name: String,
    pub entries: Vec<Entry>,
    pub created_at: DateTime<Local>,
    pub updated_at: DateTime<Local>,
    #[serde(default = "default_max_messages")]
    pub max_messages: usize,
}

fn default_max_messages() -> usize {
    DEFAULT_MAX_MESSAGES
}

impl Conversation {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_max_messages(name, DEFAULT_MAX_MESSAGES)
    }

    pub fn with_max_messages(name: impl Into<String>, max_messages: usize) -> Self {
        let now = Local::now();
        Self {
            name: name.into(),
            entries: Vec::new(),
            created_at: now,
            updated_at: now,
            max_messages,
        }
    }

    /// Append a message to the conversation
    pub fn append(&mut self, role: impl Into<String>, content: impl Into<String>) {
        self.entries.push(Entry {
            role: role.into(),
            content: content.into(),
            timestamp: Local::now(),
        });
        self.updated_at = Local::now();
        self.enforce_max_messages();
    }

    fn enforce_max_messages(&mut self) {
        if self.entries.len() > self.max_messages {
            let to_remove = self.entries.len() - self.max_messages;
            self.entries.drain(0..to_remove);
            debug!(
                "conversation {} truncated to {} messages",
                self.name,
                self.entries.len()
            );
        }
    }

    /// Most recent history as planner input
    pub fn history(&self, max_messages: usize) -> Vec<presage_provider::Message> {
        self.entries
            .iter()
            .skip(self.entries.len().saturating_sub(max_messages))
            .map(|e| presage_provider::Message {
                role: e.role.clone(),
                content: e.content.clone(),
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.updated_at = Local::now();
    }
}

/// Loads, caches, and saves conversations
pub struct ConversationStore {
    dir: PathBuf,
    cache: HashMap<String, Conversation>,
    max_messages: usize,
}

impl ConversationStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self::with_max_messages(dir, DEFAULT_MAX_MESSAGES)
    }

    pub fn with_max_messages(dir: impl AsRef<Path>, max_messages: usize) -> Self {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir).ok();

        Self {
            dir,
            cache: HashMap::new(),
            max_messages,
        }
    }

    /// Get or create a conversation by name
    pub async fn get_or_create(&mut self, name: &str) -> &mut Conversation {
        if !self.cache.contains_key(name) {
            let conversation = self
                .load(name)
                .await
                .unwrap_or_else(|| Conversation::with_max_messages(name, self.max_messages));
            self.cache.insert(name.to_string(), conversation);
        }
        self.cache.get_mut(name).unwrap()
    }

    pub async fn save(&self, conversation: &Conversation) -> std::io::Result<()> {
        let path = self.conversation_path(&conversation.name);
        let content = serde_json::to_string_pretty(conversation)?;
        tokio::fs::write(path, content).await?;
        debug!("saved conversation: {}", conversation.name);
        Ok(())
    }

    async fn load(&self, name: &str) -> Option<Conversation> {
        let path = self.conversation_path(name);
        if !path.exists() {
            return None;
        }

        match tokio::fs::read_to_string(&path).await {
            Ok(content) => match serde_json::from_str::<Conversation>(&content) {
                Ok(mut conversation) => {
                    if conversation.max_messages != self.max_messages {
                        conversation.max_messages = self.max_messages;
                        conversation.enforce_max_messages();
                    }
                    debug!("loaded conversation: {}", name);
                    Some(conversation)
                }
                Err(e) => {
                    warn!("failed to parse conversation {}: {}", name, e);
                    None
                }
            },
            Err(e) => {
                warn!("failed to read conversation {}: {}", name, e);
                None
            }
        }
    }

    fn conversation_path(&self, name: &str) -> PathBuf {
        let safe_name = name.replace([':', '/'], "_");
        self.dir.join(format!("{}.json", safe_name))
    }

    pub async fn delete(&mut self, name: &str) -> std::io::Result<bool> {
        self.cache.remove(name);
        let path = self.conversation_path(name);
        if path.exists() {
            tokio::fs::remove_file(path).await?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub async fn list(&self) -> Vec<String> {
        let mut names = Vec::new();

        if let Ok(mut entries) = tokio::fs::read_dir(&self.dir).await {
            while let Ok(Some(entry)) = entries.next_entry().await {
                if let Some(name) = entry.file_name().to_str() {
                    if let Some(stripped) = name.strip_suffix(".json") {
                        names.push(stripped.to_string());
                    }
                }
            }
        }

        names
    }

    pub fn max_messages(&self) -> usize {
        self.max_messages
    }
}

//! Scripted collaborators for unit tests

use crate::error::{LegalRagError, Result};
use crate::llm::{ChatMessage, LLMClient};
use crate::search::{WebResult, WebSearch};
use crate::store::{CollectionStats, Document, VectorStore};
use async_trait::async_trait;
use std::sync::Mutex;

/// What the scripted model does when a rule fires
#[derive(Debug, Clone)]
pub(crate) enum Reply {
    Text(String),
    Fail,
}

/// Model that answers by the first rule whose needle appears in the prompt
pub(crate) struct ScriptedLlm {
    rules: Vec<(String, Reply)>,
    default: Reply,
    pub calls: Mutex<Vec<(Vec<ChatMessage>, f32)>>,
}

impl ScriptedLlm {
    pub fn new(default: &str) -> Self {
        Self {
            rules: Vec::new(),
            default: Reply::Text(default.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn on(mut self, needle: &str, reply: &str) -> Self {
        self.rules
            .push((needle.to_string(), Reply::Text(reply.to_string())));
        self
    }

    pub fn fail_on(mut self, needle: &str) -> Self {
        self.rules.push((needle.to_string(), Reply::Fail));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl LLMClient for ScriptedLlm {
    async fn chat_completion(&self, messages: Vec<ChatMessage>, temperature: f32) -> Result<String> {
        let prompt: String = messages.iter().map(|m| m.content.as_str()).collect();
        self.calls.lock().unwrap().push((messages, temperature));

        let reply = self
            .rules
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, reply)| reply)
            .unwrap_or(&self.default);

        match reply {
            Reply::Text(text) => Ok(text.clone()),
            Reply::Fail => Err(LegalRagError::ExternalCall("scripted failure".into())),
        }
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

/// Store returning a fixed, possibly unsorted, result list
pub(crate) struct StaticStore {
    pub hits: Vec<(Document, f32)>,
    pub fail: bool,
}

#[async_trait]
impl VectorStore for StaticStore {
    async fn similarity_search_with_score(
        &self,
        _query: &str,
        k: usize,
    ) -> Result<Vec<(Document, f32)>> {
        if self.fail {
            return Err(LegalRagError::ExternalCall("store offline".into()));
        }
        Ok(self.hits.iter().take(k).cloned().collect())
    }

    async fn add_documents(&self, documents: &[Document]) -> Result<usize> {
        Ok(documents.len())
    }

    fn collection_stats(&self) -> Result<CollectionStats> {
        Ok(CollectionStats {
            name: "static".into(),
            count: self.hits.len(),
        })
    }

    fn delete_collection(&self) -> Result<()> {
        Ok(())
    }
}

/// Search provider that counts calls
pub(crate) struct CountingSearch {
    pub calls: Mutex<usize>,
}

impl Default for CountingSearch {
    fn default() -> Self {
        Self::new()
    }
}

impl CountingSearch {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl WebSearch for CountingSearch {
    async fn search(&self, _query: &str) -> Result<Vec<WebResult>> {
        *self.calls.lock().unwrap() += 1;
        Ok(vec![WebResult {
            title: "Cal. Code Civ. Proc. § 337".into(),
            content: "Four years for actions on written contracts.".into(),
            ..Default::default()
        }])
    }
}

/// Search provider that is always down
pub(crate) struct FailingSearch;

#[async_trait]
impl WebSearch for FailingSearch {
    async fn search(&self, _query: &str) -> Result<Vec<WebResult>> {
        Err(LegalRagError::ExternalCall(
            "search API key is not configured".into(),
        ))
    }
}

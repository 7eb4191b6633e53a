// ABOUTME: Chat title derivation heuristic with an overridable policy table
// ABOUTME: Greetings and short questions resolve locally; longer ones go through the vendor
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ellara Labs

//! Title derivation for brand-new chats.
//!
//! Invoked once, synchronously, when the first turn of a new thread is
//! persisted. The heuristic is pure with respect to persisted state: it
//! reads its input and at most calls the backend's one-shot completion.

use crate::llm::{AssistantBackend, CompletionMessage, CompletionRequest};
use tracing::warn;

/// Fixed system instruction for vendor title generation
const TITLE_SYSTEM_PROMPT: &str = "You are a title generator. Generate a short, descriptive \
title (max 50 characters) for a chat conversation based EXACTLY on the user's first message. \
Use the actual content and context of the message. Do not invent or add information that is \
not in the message. Return only the title, no quotes, no extra text, no explanations.";

/// Tunable policy table for the title heuristic
///
/// The greeting tokens and filler phrases are deliberately configuration,
/// not inline literals, so the policy is testable and adjustable.
#[derive(Debug, Clone)]
pub struct TitlePolicy {
    /// Case-insensitive tokens that resolve to the greeting label
    pub greetings: Vec<String>,
    /// Label returned for a greeting question
    pub greeting_label: String,
    /// Vendor titles containing any of these phrases are rejected
    pub filler_phrases: Vec<String>,
    /// Questions at or below this many characters resolve locally
    pub short_limit: usize,
    /// Hard cap on title length
    pub max_len: usize,
}

impl Default for TitlePolicy {
    fn default() -> Self {
        Self {
            greetings: vec!["hi".to_owned(), "hello".to_owned(), "halo".to_owned()],
            greeting_label: "Greeting".to_owned(),
            filler_phrases: vec!["casual chat".to_owned(), "video games".to_owned()],
            short_limit: 15,
            max_len: 50,
        }
    }
}

/// Uppercase the first character, leaving the rest unmodified
fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().collect::<String>() + chars.as_str()
    })
}

fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

impl TitlePolicy {
    /// Resolve a title without the vendor, when the question allows it
    #[must_use]
    pub fn local_title(&self, trimmed: &str) -> Option<String> {
        let lowered = trimmed.to_lowercase();
        if self.greetings.iter().any(|token| *token == lowered) {
            return Some(self.greeting_label.clone());
        }
        if trimmed.chars().count() <= self.short_limit {
            return Some(capitalize_first(trimmed));
        }
        None
    }

    /// Fallback title from the question itself
    ///
    /// Empty questions get a timestamp-based default label.
    #[must_use]
    pub fn fallback(&self, trimmed: &str) -> String {
        if trimmed.is_empty() {
            format!("Chat {}", chrono::Utc::now().format("%Y-%m-%d"))
        } else {
            truncate_chars(trimmed, self.max_len)
        }
    }

    /// Validate a vendor-returned title, falling back when it is too long
    /// or generic
    #[must_use]
    pub fn accept_vendor(&self, raw: &str, trimmed_question: &str) -> String {
        let stripped = raw
            .trim()
            .trim_matches(|c| c == '"' || c == '\'')
            .to_owned();

        let lowered = stripped.to_lowercase();
        let generic = self
            .filler_phrases
            .iter()
            .any(|phrase| lowered.contains(phrase));

        if stripped.chars().count() > self.max_len || generic || stripped.is_empty() {
            return self.fallback(trimmed_question);
        }

        truncate_chars(&stripped, self.max_len)
    }

    /// Derive a title for the first question of a new chat
    ///
    /// Never fails: any vendor error degrades to the local fallback.
    pub async fn derive(&self, backend: &dyn AssistantBackend, question: &str) -> String {
        let trimmed = question.trim();

        if let Some(title) = self.local_title(trimmed) {
            return title;
        }

        let request = CompletionRequest::new(vec![
            CompletionMessage::system(TITLE_SYSTEM_PROMPT),
            CompletionMessage::user(format!(
                "User's first message: \"{trimmed}\"\n\nGenerate a title based on this exact message:"
            )),
        ])
        .with_temperature(0.3)
        .with_max_tokens(30);

        match backend.generate(&request).await {
            Ok(raw) => self.accept_vendor(&raw, trimmed),
            Err(e) => {
                warn!(error = %e, "Title generation failed, using fallback");
                self.fallback(trimmed)
            }
        }
    }
}

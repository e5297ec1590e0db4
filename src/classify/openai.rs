// src/classify/openai.rs
//! Real classifier/summarizer backed by the OpenAI chat-completions API.
//! Requires `OPENAI_API_KEY`. One call per topic, no retries.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::cluster::TopicCluster;
use crate::model::Category;

use super::{ClassifiedTopic, ClassifierResponse, TopicClassifier};

/// Members included in the prompt; the rest of a large cluster adds little.
const MAX_PROMPT_MEMBERS: usize = 4;

const SYSTEM_PROMPT: &str = "You are a journalist writing very simple Greek for readers with mild \
intellectual disabilities. You receive one news topic: a title and excerpts from one or more \
sources. Respond with ONLY a JSON object, no prose around it, with exactly these fields: \
{\"category\": one of \"politics_economy\", \"social\", \"world\", \"sports\", \"screen\", \
\"culture\", \"fun\", \"other\"; \"reason\": one short Greek sentence explaining the category; \
\"simple_title\": a very simple Greek title; \"simple_text\": 5 to 10 very short and simple Greek \
sentences that retell the story, explaining any hard word with an everyday example; \
\"is_sensitive\": true only when the story contains graphic violence or content unsuitable for \
vulnerable readers}. Never include links. Never invent facts that are not in the sources.";

pub struct OpenAiClassifier {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenAiClassifier {
    pub fn new(api_key: String, model: &str) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("plain-news-digest/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(30))
            .build()
            .expect("reqwest client");
        Self {
            http,
            api_key,
            model: model.to_string(),
        }
    }

    fn build_input(topic: &TopicCluster) -> String {
        let mut input = format!("Τίτλος: {}\n", topic.lead_title());
        for member in topic.members.iter().take(MAX_PROMPT_MEMBERS) {
            input.push_str(&format!(
                "\nΠηγή: {} ({})\nΤίτλος πηγής: {}\nΚείμενο: {}\n",
                member.source_name, member.source_url, member.title, member.raw_text
            ));
        }
        input
    }
}

#[derive(Deserialize)]
struct RawClassification {
    category: String,
    #[serde(default)]
    reason: String,
    #[serde(default)]
    simple_title: String,
    #[serde(default)]
    simple_text: String,
    #[serde(default)]
    is_sensitive: bool,
}

/// Slice out the outermost JSON object; models occasionally wrap it in code
/// fences or commentary.
pub(crate) fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if start <= end {
        Some(&text[start..=end])
    } else {
        None
    }
}

pub(crate) fn parse_classification(text: &str) -> Result<ClassifiedTopic, String> {
    let json = extract_json(text).ok_or_else(|| "no JSON object in response".to_string())?;
    let raw: RawClassification = serde_json::from_str(json).map_err(|e| e.to_string())?;
    // An invalid category value is normalized to the safe default here, at
    // the boundary; it is not a parse failure.
    let category = Category::from_key(raw.category.trim()).unwrap_or(Category::Other);
    Ok(ClassifiedTopic {
        category,
        category_reason: raw.reason,
        simple_title: raw.simple_title,
        simple_text: raw.simple_text,
        is_sensitive: raw.is_sensitive,
    })
}

#[async_trait]
impl TopicClassifier for OpenAiClassifier {
    async fn classify_and_summarize(&self, topic: &TopicCluster) -> ClassifierResponse {
        if self.api_key.is_empty() {
            return ClassifierResponse::CallError("missing API key".to_string());
        }

        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }
        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            messages: Vec<Msg<'a>>,
            temperature: f32,
            max_tokens: u32,
        }
        #[derive(Deserialize)]
        struct Resp {
            choices: Vec<Choice>,
        }
        #[derive(Deserialize)]
        struct Choice {
            message: ChoiceMsg,
        }
        #[derive(Deserialize)]
        struct ChoiceMsg {
            content: String,
        }

        let input = Self::build_input(topic);
        let req = Req {
            model: &self.model,
            messages: vec![
                Msg {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                Msg {
                    role: "user",
                    content: &input,
                },
            ],
            temperature: 0.2,
            max_tokens: 900,
        };

        let resp = match self
            .http
            .post("https://api.openai.com/v1/chat/completions")
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => return ClassifierResponse::CallError(e.to_string()),
        };

        if !resp.status().is_success() {
            return ClassifierResponse::CallError(format!("http status {}", resp.status()));
        }

        let body: Resp = match resp.json().await {
            Ok(b) => b,
            Err(e) => return ClassifierResponse::ParseError(e.to_string()),
        };
        let content = body
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .unwrap_or("");

        match parse_classification(content) {
            Ok(classified) => ClassifierResponse::Classified(classified),
            Err(e) => ClassifierResponse::ParseError(e),
        }
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

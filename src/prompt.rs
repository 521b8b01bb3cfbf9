//! System instructions and prompt assembly for Cypher generation.

use crate::models::chat::ChatMessage;
use crate::system_prompt_config::SystemPromptConfig;

/// Built-in instructions describing the graph and the expected output format.
pub const DEFAULT_SYSTEM_PROMPT: &str = r#"
You are an expert Cypher assistant for querying a Neo4j graph.

The graph contains:
- Nodes with a unique 'id' (e.g., Google, Microsoft, France)
- Edges of type CONNECTED_TO, each with a numeric property 'weight'

Your job is to translate natural language questions into valid Cypher queries.
Do NOT explain. Only return a raw Cypher query as output. No markdown.

You must handle queries like:
- Strongest or weakest connection of an entity
- Top N connections of a node
- All connections of a node
- Relationship between two entities
- General exploration of a node (e.g., “Tell me about France”)

Examples:

Q: Who is most connected to OpenAI?
A: MATCH (n {id: 'OpenAI'})-[r:CONNECTED_TO]-(m) RETURN m.id, r.weight ORDER BY r.weight DESC LIMIT 1

Q: What’s the connection between Google and Microsoft?
A: MATCH (a {id: 'Google'})-[r:CONNECTED_TO]-(b {id: 'Microsoft'}) RETURN r.weight

Q: Tell me about France in the graph.
A: MATCH (n {id: 'France'})-[r:CONNECTED_TO]-(m) RETURN m.id, r.weight

"#;

/// Process-wide system instruction, fixed once the server starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    system: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_SYSTEM_PROMPT)
    }
}

impl PromptTemplate {
    /// Surrounding whitespace is stripped; the body is kept as-is.
    pub fn new(system: impl AsRef<str>) -> Self {
        Self {
            system: system.as_ref().trim().to_string(),
        }
    }

    /// Pick the instruction text for `model` from an override file, falling back to the built-in prompt.
    pub fn resolve(config: &SystemPromptConfig, model: &str) -> Self {
        match config.get_prompt(Some(model)) {
            Some(p) if !p.trim().is_empty() => Self::new(p),
            _ => Self::default(),
        }
    }

    pub fn system(&self) -> &str {
        &self.system
    }

    /// Combine the instructions with the caller's text. The user text is passed through untouched.
    pub fn render(&self, user_text: &str) -> Prompt {
        Prompt {
            system: self.system.clone(),
            user: user_text.to_string(),
        }
    }
}

/// One outbound prompt: a system turn followed by a user turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

impl Prompt {
    pub fn to_messages(&self) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(self.system.clone()),
            ChatMessage::user(self.user.clone()),
        ]
    }
}

//! Prompt Template System
//!
//! Named-placeholder templates for every model interaction.
//!
//! ## Syntax
//!
//! - `{name}` is replaced by the value bound to `name`
//! - `{{` and `}}` produce literal braces
//!
//! Each template kind declares the placeholders it may use. A template that
//! references anything else is rejected when the configuration is loaded, so
//! rendering never fails halfway through a run.

use serde::{Deserialize, Serialize};

use crate::types::{AutodocError, Result};

// =============================================================================
// Default Templates
// =============================================================================

pub const DEFAULT_FOLDER_PROMPT: &str = "Given the following context:\n{context}\n\nDescribe the purpose and contents of the folder {folder_path} containing files {files}. Also, explain how this folder might relate to other parts of the project:";

pub const DEFAULT_FILE_PROMPT: &str = "Given the following context:\n{context}\n\nAnalyze and document the following part of a code file:\n\nFile: {file_path}\n\nContent:\n{chunk}\n\nProvide documentation and explain how this file might relate to other parts of the project:";

pub const DEFAULT_COMBINE_PROMPT: &str = "Given the following context:\n{context}\n\nCombine and summarize the following documentation chunks for file {file_path}:\n\n{chunk_docs}\n\nProvide a comprehensive documentation including relationships to other project components:";

pub const DEFAULT_PROJECT_PROMPT: &str = "Based on the following component documentation and overall context summary, provide a comprehensive overview of the project structure, functionality, and component relationships:\n\nContext Summary: {context_summary}\n\nComponent Documentation: {documentation}\n\nProject Overview:";

pub const DEFAULT_RELATIONSHIP_PROMPT: &str = "Given the following context:\n{context}\n\nFor the large file {file_path} with summary:\n{summary}\n\nExplain how this file might relate to other parts of the project:";

pub const DEFAULT_SUMMARY_UPDATE_PROMPT: &str = "Current project summary: {current_summary}\n\nNew {content_type} content: {new_content}\n\nUpdate the project summary to incorporate this new information:";

pub const DEFAULT_MAP_PROMPT: &str =
    "Write a concise summary of the following:\n\n\n\"{text}\"\n\n\nCONCISE SUMMARY:";

pub const DEFAULT_REDUCE_PROMPT: &str =
    "Write a concise summary of the following:\n\n\n\"{text}\"\n\n\nCONCISE SUMMARY:";

// =============================================================================
// Template Kinds
// =============================================================================

/// Every prompt the pipeline issues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Folder,
    File,
    Combine,
    Project,
    Relationship,
    SummaryUpdate,
    Map,
    Reduce,
}

impl PromptKind {
    pub const ALL: [PromptKind; 8] = [
        PromptKind::Folder,
        PromptKind::File,
        PromptKind::Combine,
        PromptKind::Project,
        PromptKind::Relationship,
        PromptKind::SummaryUpdate,
        PromptKind::Map,
        PromptKind::Reduce,
    ];

    /// Config key of this template
    pub fn name(&self) -> &'static str {
        match self {
            PromptKind::Folder => "folder",
            PromptKind::File => "file",
            PromptKind::Combine => "combine",
            PromptKind::Project => "project",
            PromptKind::Relationship => "relationship",
            PromptKind::SummaryUpdate => "summary_update",
            PromptKind::Map => "map",
            PromptKind::Reduce => "reduce",
        }
    }

    /// Placeholders this template may reference
    pub fn placeholders(&self) -> &'static [&'static str] {
        match self {
            PromptKind::Folder => &["folder_path", "files", "context"],
            PromptKind::File => &["file_path", "chunk", "context"],
            PromptKind::Combine => &["file_path", "chunk_docs", "context"],
            PromptKind::Project => &["documentation", "context_summary"],
            PromptKind::Relationship => &["file_path", "summary", "context"],
            PromptKind::SummaryUpdate => &["current_summary", "new_content", "content_type"],
            PromptKind::Map | PromptKind::Reduce => &["text"],
        }
    }
}

// =============================================================================
// Template
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

/// A parsed prompt template
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    segments: Vec<Segment>,
}

impl PromptTemplate {
    /// Parse a template string
    pub fn parse(template: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = template.char_indices().peekable();

        while let Some((pos, ch)) = chars.next() {
            match ch {
                '{' if matches!(chars.peek(), Some((_, '{'))) => {
                    chars.next();
                    literal.push('{');
                }
                '}' if matches!(chars.peek(), Some((_, '}'))) => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for (_, c) in chars.by_ref() {
                        if c == '}' {
                            closed = true;
                            break;
                        }
                        name.push(c);
                    }
                    if !closed {
                        return Err(AutodocError::Config(format!(
                            "Unclosed placeholder at offset {} in prompt template",
                            pos
                        )));
                    }
                    if !is_identifier(&name) {
                        return Err(AutodocError::Config(format!(
                            "Invalid placeholder '{{{}}}' in prompt template (use '{{{{' for a literal brace)",
                            name
                        )));
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Placeholder(name));
                }
                '}' => {
                    return Err(AutodocError::Config(format!(
                        "Unmatched '}}' at offset {} in prompt template (use '}}}}' for a literal brace)",
                        pos
                    )));
                }
                _ => literal.push(ch),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self { segments })
    }

    /// Parse and check that only `kind`'s placeholders are referenced
    pub fn for_kind(kind: PromptKind, template: &str) -> Result<Self> {
        let parsed = Self::parse(template)?;
        let allowed = kind.placeholders();
        if let Some(unknown) = parsed
            .placeholders()
            .find(|name| !allowed.contains(name))
        {
            return Err(AutodocError::Config(format!(
                "Prompt '{}' references unknown placeholder '{{{}}}'. Allowed: {}",
                kind.name(),
                unknown,
                allowed.join(", ")
            )));
        }
        Ok(parsed)
    }

    /// Placeholder names in order of appearance
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Placeholder(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Substitute `vars`; placeholders without a binding render empty
    pub fn render(&self, vars: &[(&str, &str)]) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(name) => {
                    if let Some((_, value)) = vars.iter().find(|(k, _)| k == name) {
                        out.push_str(value);
                    }
                }
            }
        }
        out
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// =============================================================================
// Template Set
// =============================================================================

/// Raw template strings as they appear in configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    pub folder: String,
    pub file: String,
    pub combine: String,
    pub project: String,
    pub relationship: String,
    pub summary_update: String,
    pub map: String,
    pub reduce: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            folder: DEFAULT_FOLDER_PROMPT.to_string(),
            file: DEFAULT_FILE_PROMPT.to_string(),
            combine: DEFAULT_COMBINE_PROMPT.to_string(),
            project: DEFAULT_PROJECT_PROMPT.to_string(),
            relationship: DEFAULT_RELATIONSHIP_PROMPT.to_string(),
            summary_update: DEFAULT_SUMMARY_UPDATE_PROMPT.to_string(),
            map: DEFAULT_MAP_PROMPT.to_string(),
            reduce: DEFAULT_REDUCE_PROMPT.to_string(),
        }
    }
}

impl PromptConfig {
    pub fn get(&self, kind: PromptKind) -> &str {
        match kind {
            PromptKind::Folder => &self.folder,
            PromptKind::File => &self.file,
            PromptKind::Combine => &self.combine,
            PromptKind::Project => &self.project,
            PromptKind::Relationship => &self.relationship,
            PromptKind::SummaryUpdate => &self.summary_update,
            PromptKind::Map => &self.map,
            PromptKind::Reduce => &self.reduce,
        }
    }
}

/// Parsed, validated templates for a run
#[derive(Debug, Clone)]
pub struct PromptTemplates {
    pub folder: PromptTemplate,
    pub file: PromptTemplate,
    pub combine: PromptTemplate,
    pub project: PromptTemplate,
    pub relationship: PromptTemplate,
    pub summary_update: PromptTemplate,
    pub map: PromptTemplate,
    pub reduce: PromptTemplate,
}

impl PromptTemplates {
    pub fn from_config(config: &PromptConfig) -> Result<Self> {
        let parse = |kind: PromptKind| PromptTemplate::for_kind(kind, config.get(kind));
        Ok(Self {
            folder: parse(PromptKind::Folder)?,
            file: parse(PromptKind::File)?,
            combine: parse(PromptKind::Combine)?,
            project: parse(PromptKind::Project)?,
            relationship: parse(PromptKind::Relationship)?,
            summary_update: parse(PromptKind::SummaryUpdate)?,
            map: parse(PromptKind::Map)?,
            reduce: parse(PromptKind::Reduce)?,
        })
    }
}

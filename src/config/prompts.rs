//! Prompt templates for Sitat.
//!
//! Prompts can be customized by placing TOML files in the custom prompts
//! directory. Every template that feeds the reduction engine must instruct
//! the model to cite with trailing parenthetical index lists, since that is
//! the grammar the citation parser expects.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub summary: SummaryPrompts,
    pub concise: ConcisePrompts,
    pub query: QueryPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}


/// Prompt for hierarchical summarization passes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryPrompts {
    pub template: String,
}

impl Default for SummaryPrompts {
    fn default() -> Self {
        Self {
            template: r#"You are summarizing an interview transcript about {{interviewee}}.

Each numbered line below is one indexed statement:

{{lines}}

Write a summary of what {{interviewee}} said. After every sentence of your
summary, cite the line indices that justify it in parentheses, e.g.
"They moved abroad in 2004 (3,7)." or "The move was difficult (12-14)."

Rules:
- Cite only indices that appear above.
- Use comma-separated indices and inclusive ranges, nothing else inside the
  parentheses.
- Every factual sentence must carry at least one citation.
- Do not add headings, bullet points, or commentary about these instructions."#
                .to_string(),
        }
    }
}

/// Prompt for concise-rewrite passes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConcisePrompts {
    pub template: String,
}

impl Default for ConcisePrompts {
    fn default() -> Self {
        Self {
            template: r#"You are condensing an interview transcript about {{interviewee}}.

Each numbered line below is one indexed statement:

{{lines}}

Rewrite the content in {{interviewee}}'s own voice, shorter but preserving
meaning and tone. After every sentence, cite the line indices it came from
in parentheses, e.g. "I never expected to stay (5)." or "Those were hard
years (8-10)."

Rules:
- Keep first person where the speaker used it.
- Cite only indices that appear above, comma-separated, ranges allowed.
- Every sentence must carry at least one citation."#
                .to_string(),
        }
    }
}

/// Prompt for query answering over retrieved lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryPrompts {
    pub template: String,
}

impl Default for QueryPrompts {
    fn default() -> Self {
        Self {
            template: r#"Answer the question using only the indexed transcript lines below.

Question: {{query}}

Lines:
{{lines}}

After every sentence of your answer, cite the line indices that support it
in parentheses, e.g. "The project launched in March (2)." If the lines do
not contain the answer, say so in one uncited sentence.

Rules:
- Cite only indices that appear above, comma-separated, ranges allowed.
- No headings or commentary about these instructions."#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let summary_path = custom_path.join("summary.toml");
            if summary_path.exists() {
                let content = std::fs::read_to_string(&summary_path)?;
                prompts.summary = toml::from_str(&content)?;
            }

            let concise_path = custom_path.join("concise.toml");
            if concise_path.exists() {
                let content = std::fs::read_to_string(&concise_path)?;
                prompts.concise = toml::from_str(&content)?;
            }

            let query_path = custom_path.join("query.toml");
            if query_path.exists() {
                let content = std::fs::read_to_string(&query_path)?;
                prompts.query = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

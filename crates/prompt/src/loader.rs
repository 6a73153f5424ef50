//! Prompt loader: built-in definitions with optional YAML overrides.

use crate::types::PromptDefinition;
use std::path::{Path, PathBuf};
use venturegraph_core::{AppError, AppResult};

/// Grounded answer / deal-flow report synthesis.
pub const REASONING_PROMPT: &str = "analyst.reasoning";

/// Translation into a target language.
pub const TRANSLATE_PROMPT: &str = "language.translate";

const REASONING_SYSTEM: &str = "You are an expert startup analyst. Answer strictly using the \
provided context. Cite sources using [1], [2], etc.";

const REASONING_TEMPLATE: &str = "Question:
{{question}}

Context:
{{context}}

Citations:
{{#each citations}}[{{this.number}}] {{this.source}}: {{this.excerpt}}
{{/each}}
Answer clearly with citations.";

const TRANSLATE_SYSTEM: &str =
    "Translate the following text to {{language}}. Only return the translated text.";

/// Return the built-in definition for a prompt ID.
pub fn builtin_prompt(prompt_id: &str) -> Option<PromptDefinition> {
    match prompt_id {
        REASONING_PROMPT => Some(PromptDefinition {
            id: REASONING_PROMPT.to_string(),
            title: "Grounded analyst answer".to_string(),
            api_version: "1.0".to_string(),
            system: Some(REASONING_SYSTEM.to_string()),
            template: REASONING_TEMPLATE.to_string(),
            temperature: Some(0.5),
            max_tokens: None,
        }),
        TRANSLATE_PROMPT => Some(PromptDefinition {
            id: TRANSLATE_PROMPT.to_string(),
            title: "Plain translation".to_string(),
            api_version: "1.0".to_string(),
            system: Some(TRANSLATE_SYSTEM.to_string()),
            template: "{{text}}".to_string(),
            temperature: Some(0.3),
            max_tokens: None,
        }),
        _ => None,
    }
}

fn prompts_dir(workspace_path: &Path) -> PathBuf {
    workspace_path
        .join(venturegraph_core::config::STATE_DIR)
        .join("prompts")
}

/// Load a prompt definition by ID.
///
/// A file named `<id>.yml` in `.venturegraph/prompts/` overrides the
/// built-in definition of the same ID.
///
/// # Example
/// ```no_run
/// use venturegraph_prompt::{load_prompt, REASONING_PROMPT};
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = load_prompt(Path::new("."), REASONING_PROMPT)?;
/// println!("Loaded prompt: {}", prompt.title);
/// # Ok(())
/// # }
/// ```
pub fn load_prompt(workspace_path: &Path, prompt_id: &str) -> AppResult<PromptDefinition> {
    let prompt_file = prompts_dir(workspace_path).join(format!("{}.yml", prompt_id));

    if !prompt_file.exists() {
        return builtin_prompt(prompt_id)
            .ok_or_else(|| AppError::Prompt(format!("Unknown prompt: {}", prompt_id)));
    }

    tracing::debug!("Loading prompt override from: {:?}", prompt_file);

    let contents = std::fs::read_to_string(&prompt_file).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to read prompt file {:?}: {}",
            prompt_file, e
        ))
    })?;

    let definition: PromptDefinition = serde_yaml::from_str(&contents).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to parse prompt YAML {:?}: {}",
            prompt_file, e
        ))
    })?;

    validate_prompt(&definition)?;

    tracing::info!("Loaded prompt override: {} ({})", definition.id, definition.title);

    Ok(definition)
}

/// List the IDs of all prompt overrides present in the workspace.
pub fn list_prompts(workspace_path: &Path) -> AppResult<Vec<String>> {
    let prompts_dir = prompts_dir(workspace_path);

    if !prompts_dir.exists() {
        return Ok(Vec::new());
    }

    let mut prompt_ids = Vec::new();

    for entry in walkdir::WalkDir::new(&prompts_dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("yml") {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                prompt_ids.push(stem.to_string());
            }
        }
    }

    prompt_ids.sort();
    Ok(prompt_ids)
}

/// Override files in the workspace whose ID matches no built-in prompt.
/// Nothing loads them.
pub fn unknown_overrides(workspace_path: &Path) -> AppResult<Vec<String>> {
    Ok(list_prompts(workspace_path)?
        .into_iter()
        .filter(|id| builtin_prompt(id).is_none())
        .collect())
}

/// Validate a prompt definition.
fn validate_prompt(def: &PromptDefinition) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if def.api_version.is_empty() {
        return Err(AppError::Prompt(
            "Prompt apiVersion cannot be empty".to_string(),
        ));
    }

    if def.template.is_empty() {
        return Err(AppError::Prompt(
            "Prompt template cannot be empty".to_string(),
        ));
    }

    Ok(())
}

//! Prompt builder for rendering templates.

use crate::types::{BuiltPrompt, PromptDefinition};
use handlebars::Handlebars;
use serde_json::Value;
use venturegraph_core::{AppError, AppResult};

/// Build a prompt from a definition and template data.
///
/// Both the system message (when the definition has one) and the user
/// template are rendered against the same `data` object.
///
/// # Example
/// ```no_run
/// use venturegraph_prompt::{build_prompt, builtin_prompt, TRANSLATE_PROMPT};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let def = builtin_prompt(TRANSLATE_PROMPT).unwrap();
/// let data = serde_json::json!({"language": "Hindi", "text": "Hello"});
/// let built = build_prompt(&def, &data)?;
/// println!("User prompt: {}", built.user);
/// # Ok(())
/// # }
/// ```
pub fn build_prompt(definition: &PromptDefinition, data: &Value) -> AppResult<BuiltPrompt> {
    tracing::debug!("Building prompt: {}", definition.id);

    let mut handlebars = Handlebars::new();

    // Plain text, never HTML
    handlebars.register_escape_fn(handlebars::no_escape);

    let system = definition
        .system
        .as_deref()
        .map(|template| render(&mut handlebars, "system", template, data))
        .transpose()?;
    let user = render(&mut handlebars, "user", &definition.template, data)?;

    Ok(BuiltPrompt {
        system,
        user,
        temperature: definition.temperature,
        max_tokens: definition.max_tokens,
    })
}

fn render(
    handlebars: &mut Handlebars<'_>,
    name: &str,
    template: &str,
    data: &Value,
) -> AppResult<String> {
    handlebars
        .register_template_string(name, template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    handlebars
        .render(name, data)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))
}

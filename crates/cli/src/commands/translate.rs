//! Translate command handler.

use super::print_json;
use clap::Args;
use venturegraph_core::{AppError, AppResult};
use venturegraph_knowledge::{translate_request, Collaborators, Language};

/// Detect the language of a text and translate it
#[derive(Args, Debug)]
pub struct TranslateCommand {
    /// Text to translate
    pub text: String,

    /// Target language (en, hi, ta); defaults to English
    #[arg(long)]
    pub to: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl TranslateCommand {
    pub async fn execute(&self, deps: &Collaborators) -> AppResult<()> {
        tracing::info!("Executing translate command");

        let target = self
            .to
            .as_deref()
            .map(|code| {
                Language::parse(code).ok_or_else(|| {
                    AppError::Request(format!("Unsupported language: {}. Supported: en, hi, ta", code))
                })
            })
            .transpose()?;

        let response = translate_request(&deps.language_gate(), &self.text, target).await?;

        if self.json {
            print_json(&response)
        } else {
            println!("{}", response.translated_text);
            Ok(())
        }
    }
}

use std::time::Duration;

use async_trait::async_trait;
use dialoguer::Input;
use dialoguer::theme::ColorfulTheme;
use indicatif::ProgressBar;

use crate::error::PickerError;
use crate::kubectl::namespace;
use crate::validation::validate_namespace_name;

/// Dialog that creates a namespace.
#[async_trait]
pub trait NamespacePicker: Send + Sync {
    /// Resolves with the created namespace, or `None` when the user backed out.
    async fn show(&self, existing: &[String]) -> Result<Option<String>, PickerError>;
}

/// Asks for a name on the terminal and creates the namespace with kubectl.
pub struct PromptNamespacePicker;

#[async_trait]
impl NamespacePicker for PromptNamespacePicker {
    async fn show(&self, existing: &[String]) -> Result<Option<String>, PickerError> {
        let existing = existing.to_vec();
        tokio::task::spawn_blocking(move || prompt_and_create(&existing)).await?
    }
}

fn prompt_and_create(existing: &[String]) -> Result<Option<String>, PickerError> {
    let theme = ColorfulTheme::default();
    let name = Input::<String>::with_theme(&theme)
        .with_prompt("New namespace name (leave empty to cancel)")
        .allow_empty(true)
        .validate_with(|input: &String| {
            if input.is_empty() {
                Ok(())
            } else {
                validate_namespace_name(input, existing)
            }
        })
        .interact_text()?;

    if name.is_empty() {
        return Ok(None);
    }

    let bar = ProgressBar::new_spinner().with_message(format!("Creating namespace {name}..."));
    bar.enable_steady_tick(Duration::from_millis(100));
    let created = namespace::create(&name);
    bar.finish_and_clear();
    created?;

    tracing::info!(namespace = %name, "Created namespace");
    Ok(Some(name))
}

use anyhow::Result;
use dialoguer::{Editor, FuzzySelect, Input, Select};

/// Arrow-key Yes/No selection
pub fn prompt_confirmation(prompt: &str, default_yes: bool) -> Result<bool> {
    let items = vec!["Yes", "No"];
    let default_index = if default_yes { 0 } else { 1 };

    let selection = Select::new()
        .with_prompt(prompt)
        .items(&items)
        .default(default_index)
        .interact()?;

    Ok(selection == 0)
}

/// Text input; an empty answer keeps `default` when one is given
pub fn text_input(prompt: &str, default: Option<&str>) -> Result<String> {
    let mut input_prompt = Input::<String>::new().with_prompt(prompt).allow_empty(true);

    if let Some(default_val) = default.filter(|d| !d.is_empty()) {
        input_prompt = input_prompt.default(default_val.to_string());
    }

    Ok(input_prompt.interact_text()?)
}

/// Text input that must not be blank
pub fn required_input(prompt: &str, default: Option<&str>) -> Result<String> {
    let mut input_prompt = Input::<String>::new()
        .with_prompt(prompt)
        .validate_with(|value: &String| -> Result<(), &str> {
            if value.trim().is_empty() {
                Err("This field is required")
            } else {
                Ok(())
            }
        });

    if let Some(default_val) = default.filter(|d| !d.is_empty()) {
        input_prompt = input_prompt.default(default_val.to_string());
    }

    Ok(input_prompt.interact_text()?.trim().to_string())
}

/// Menu selection returning the chosen index
pub fn select(prompt: &str, items: &[String], default: usize) -> Result<usize> {
    Ok(Select::new()
        .with_prompt(prompt)
        .items(items)
        .default(default)
        .interact()?)
}

/// Searchable selection for long lists such as the canonical catalogue
pub fn fuzzy_select(prompt: &str, items: &[String], default: usize) -> Result<usize> {
    Ok(FuzzySelect::new()
        .with_prompt(prompt)
        .items(items)
        .default(default)
        .interact()?)
}

/// Multi-line text in `$EDITOR`, falling back to single-line input when no
/// editor is available. `None` means the operator aborted.
pub fn multiline_input(prompt: &str, current: &str) -> Result<Option<String>> {
    println!("{}", prompt);
    match Editor::new().extension(".txt").edit(current) {
        Ok(edited) => Ok(edited),
        Err(e) => {
            log::debug!("Editor unavailable ({}), using line input", e);
            let line = text_input(prompt, Some(current))?;
            Ok(Some(line))
        }
    }
}

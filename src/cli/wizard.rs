//! Interactive form for creating a paint can

use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use miette::{IntoDiagnostic, Result};

use crate::core::color::{ColorHex, ColorMode, ColorResolver};
use crate::entities::paint::{Paint, PERCENT_MAX, PERCENT_STEP};

/// Prompts for every field of a new can
pub struct PaintWizard<'a> {
    resolver: &'a ColorResolver,
    mode: ColorMode,
    theme: ColorfulTheme,
}

impl<'a> PaintWizard<'a> {
    pub fn new(resolver: &'a ColorResolver, mode: ColorMode) -> Self {
        Self {
            resolver,
            mode,
            theme: ColorfulTheme::default(),
        }
    }

    /// Run the form; `defaults` pre-fills values already given as flags
    pub fn run(&self, defaults: &Paint) -> Result<Paint> {
        println!();
        println!("{} Creating new paint can", style("◆").cyan());
        println!("{}", style("─".repeat(50)).dim());
        println!();

        let name: String = Input::with_theme(&self.theme)
            .with_prompt("Name")
            .with_initial_text(defaults.name.clone())
            .validate_with(|s: &String| non_empty(s, "name"))
            .interact_text()
            .into_diagnostic()?;

        let code: String = Input::with_theme(&self.theme)
            .with_prompt("Code")
            .with_initial_text(defaults.code.clone())
            .validate_with(|s: &String| non_empty(s, "code"))
            .interact_text()
            .into_diagnostic()?;

        let mixed = Confirm::with_theme(&self.theme)
            .with_prompt("Mixed with water?")
            .default(defaults.mixed)
            .interact()
            .into_diagnostic()?;

        let steps: Vec<u8> = (0..=PERCENT_MAX).step_by(usize::from(PERCENT_STEP)).collect();
        let labels: Vec<String> = steps.iter().map(|p| format!("{}%", p)).collect();
        let current = steps
            .iter()
            .position(|p| *p == defaults.percent)
            .unwrap_or(steps.len() - 1);
        let picked = Select::with_theme(&self.theme)
            .with_prompt("Remaining")
            .items(&labels)
            .default(current)
            .interact()
            .into_diagnostic()?;
        let percent = steps[picked];

        let color = match self.mode {
            ColorMode::Code => {
                let color = self.resolver.resolve(&code);
                println!(
                    "  {} {} {}",
                    style("Color:").dim(),
                    style("■").color256(color.ansi256()),
                    color
                );
                color
            }
            ColorMode::Picker => {
                let raw: String = Input::with_theme(&self.theme)
                    .with_prompt("Color (#RRGGBB)")
                    .default(defaults.color.to_string())
                    .validate_with(|s: &String| s.parse::<ColorHex>().map(|_| ()).map_err(|e| e.to_string()))
                    .interact_text()
                    .into_diagnostic()?;
                raw.parse::<ColorHex>().into_diagnostic()?
            }
        };

        println!();
        println!("{} Values collected!", style("✓").green());

        Ok(Paint::new(name.trim(), code.trim(), color)
            .with_mixed(mixed)
            .with_percent(percent))
    }
}

fn non_empty(value: &str, field: &str) -> std::result::Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{} must not be empty", field))
    } else {
        Ok(())
    }
}

// Terminal stand-ins for the form surface and notifications

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;

use crate::visit::traits::{FormSurface, Indicator, Notifier};

fn glyph(indicator: Indicator) -> &'static str {
    match indicator {
        Indicator::Green => "✅",
        Indicator::Blue => "ℹ️ ",
        Indicator::Orange => "⚠️ ",
        Indicator::Red => "❌",
    }
}

/// Prints notifications to stdout
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn toast(&self, message: &str, indicator: Indicator, _duration: Duration) {
        println!("{} {}", glyph(indicator), message);
    }

    fn dialog(&self, title: &str, message: &str, indicator: Indicator) {
        println!("{} {}", glyph(indicator), title);
        println!("   {message}");
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TriggerState {
    pub hidden: bool,
    pub disabled: bool,
}

/// Keeps trigger display state in memory; freezes print a progress line
#[derive(Debug, Default)]
pub struct ConsoleSurface {
    triggers: Mutex<BTreeMap<String, TriggerState>>,
}

impl ConsoleSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn triggers(&self) -> BTreeMap<String, TriggerState> {
        self.triggers
            .lock()
            .map(|t| t.clone())
            .unwrap_or_default()
    }

    fn update(&self, trigger: &str, change: impl FnOnce(&mut TriggerState)) {
        if let Ok(mut triggers) = self.triggers.lock() {
            change(triggers.entry(trigger.to_string()).or_default());
        }
    }
}

impl FormSurface for ConsoleSurface {
    fn set_hidden(&self, trigger: &str, hidden: bool) {
        self.update(trigger, |state| state.hidden = hidden);
    }

    fn set_disabled(&self, trigger: &str, disabled: bool) {
        self.update(trigger, |state| state.disabled = disabled);
    }

    fn freeze(&self, message: &str) {
        println!("⏳ {message}");
    }

    fn unfreeze(&self) {
        tracing::debug!("Surface unfrozen");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_tracks_trigger_state() {
        let surface = ConsoleSurface::new();
        surface.set_hidden("check_in_button", false);
        surface.set_disabled("check_in_button", true);
        surface.set_hidden("check_out_button", true);

        let triggers = surface.triggers();
        assert_eq!(
            triggers["check_in_button"],
            TriggerState {
                hidden: false,
                disabled: true
            }
        );
        assert!(triggers["check_out_button"].hidden);
    }
}

//! Combat logging
//!
//! Records combat and stage events for post-run analysis. Each entry carries
//! a human-readable message and, where it makes sense, structured data so
//! aggregate queries never have to parse messages.

use bevy::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

/// A single entry in the combat log
#[derive(Debug, Clone, Serialize)]
pub struct CombatLogEntry {
    /// Simulation time in milliseconds
    pub timestamp_ms: u64,
    /// The type of event
    pub event_type: CombatLogEventType,
    /// Human-readable description of the event
    pub message: String,
    /// Machine-readable details, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<StructuredEventData>,
}

/// Types of combat log events for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CombatLogEventType {
    /// Damage dealt
    Damage,
    /// Health added
    Healing,
    /// Ability activated
    AbilityUsed,
    /// Actor died
    Death,
    /// Stage loaded, run ended, etc.
    StageEvent,
}

/// Structured payload attached to an entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum StructuredEventData {
    Damage {
        source: String,
        target: String,
        ability: String,
        amount: f32,
        killing_blow: bool,
    },
    Healing {
        target: String,
        amount: f32,
    },
    AbilityUsed {
        owner: String,
        ability: String,
    },
    Death {
        victim: String,
        killer: Option<String>,
    },
}

/// The combat log resource storing all events
#[derive(Resource, Default, Debug, Serialize)]
pub struct CombatLog {
    /// All log entries in chronological order
    pub entries: Vec<CombatLogEntry>,
    /// Time stamped onto new entries
    #[serde(skip)]
    pub now_ms: u64,
}

impl CombatLog {
    /// Clear the log for a new run
    pub fn clear(&mut self) {
        self.entries.clear();
        self.now_ms = 0;
    }

    /// Add a new entry to the log
    pub fn log(&mut self, event_type: CombatLogEventType, message: String) {
        self.push(event_type, message, None);
    }

    fn push(&mut self, event_type: CombatLogEventType, message: String, data: Option<StructuredEventData>) {
        self.entries.push(CombatLogEntry {
            timestamp_ms: self.now_ms,
            event_type,
            message,
            data,
        });
    }

    pub fn log_damage(&mut self, source: String, target: String, ability: String, amount: f32, killing_blow: bool) {
        let message = if killing_blow {
            format!("{}'s {} hits {} for {:.0} (killing blow)", source, ability, target, amount)
        } else {
            format!("{}'s {} hits {} for {:.0}", source, ability, target, amount)
        };
        self.push(
            CombatLogEventType::Damage,
            message,
            Some(StructuredEventData::Damage {
                source,
                target,
                ability,
                amount,
                killing_blow,
            }),
        );
    }

    pub fn log_healing(&mut self, target: String, amount: f32) {
        let message = format!("{} recovers {:.0} health", target, amount);
        self.push(
            CombatLogEventType::Healing,
            message,
            Some(StructuredEventData::Healing { target, amount }),
        );
    }

    pub fn log_ability(&mut self, owner: String, ability: String) {
        let message = format!("{} uses {}", owner, ability);
        self.push(
            CombatLogEventType::AbilityUsed,
            message,
            Some(StructuredEventData::AbilityUsed { owner, ability }),
        );
    }

    pub fn log_death(&mut self, victim: String, killer: Option<String>) {
        let message = match &killer {
            Some(killer) => format!("{} has been slain by {}", victim, killer),
            None => format!("{} has died", victim),
        };
        self.push(
            CombatLogEventType::Death,
            message,
            Some(StructuredEventData::Death { victim, killer }),
        );
    }

    /// Get entries filtered by event type
    pub fn filter_by_type(&self, event_type: CombatLogEventType) -> Vec<&CombatLogEntry> {
        self.entries
            .iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }

    /// Get the last N entries
    pub fn recent(&self, count: usize) -> Vec<&CombatLogEntry> {
        self.entries.iter().rev().take(count).rev().collect()
    }

    /// Total damage dealt by `source`, keyed by ability name
    pub fn damage_by_ability(&self, source: &str) -> HashMap<String, f32> {
        let mut totals = HashMap::new();
        for entry in &self.entries {
            if let Some(StructuredEventData::Damage {
                source: s,
                ability,
                amount,
                ..
            }) = &entry.data
            {
                if s == source {
                    *totals.entry(ability.clone()).or_insert(0.0) += amount;
                }
            }
        }
        totals
    }

    /// Total damage taken by `target`
    pub fn damage_taken(&self, target: &str) -> f32 {
        self.entries
            .iter()
            .filter_map(|e| match &e.data {
                Some(StructuredEventData::Damage { target: t, amount, .. }) if t == target => Some(*amount),
                _ => None,
            })
            .sum()
    }

    /// Number of killing blows landed by `source`
    pub fn killing_blows(&self, source: &str) -> usize {
        self.entries
            .iter()
            .filter(|e| {
                matches!(
                    &e.data,
                    Some(StructuredEventData::Damage { source: s, killing_blow: true, .. }) if s == source
                )
            })
            .count()
    }

    /// Serialize the full log as pretty JSON
    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string_pretty(self).map_err(|e| format!("Failed to serialize combat log: {}", e))
    }

    /// Write the log as JSON to `path`
    pub fn save_to_file(&self, path: &Path) -> Result<(), String> {
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
        info!("Saved combat log ({} entries) to {}", self.entries.len(), path.display());
        Ok(())
    }
}

//! Record rendering.
//!
//! Turns the record list into display cards and lays the cards out as
//! terminal text. Each redraw renders the whole list.

use std::fmt::Write as _;

use crossterm::style::Stylize;
use serde::Serialize;

use crate::record::{MedicationStatus, Record};
use crate::theme::Palette;

/// Placeholder shown when there are no records.
pub const EMPTY_MESSAGE: &str = "目前沒有血壓紀錄";

/// Styling bucket of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    /// `systolic >= 140 || diastolic >= 90`
    #[serde(rename = "bp-high")]
    High,
    /// `systolic >= 120 || diastolic >= 80`
    #[serde(rename = "bp-elevated")]
    Elevated,
    /// Everything else.
    #[serde(rename = "bp-normal")]
    Normal,
}

impl Category {
    /// Classify a reading. First match wins, checked from high to low.
    #[must_use]
    pub fn classify(systolic: i64, diastolic: i64) -> Self {
        if systolic >= 140 || diastolic >= 90 {
            Self::High
        } else if systolic >= 120 || diastolic >= 80 {
            Self::Elevated
        } else {
            Self::Normal
        }
    }

    /// Style class name.
    #[must_use]
    pub fn class_name(self) -> &'static str {
        match self {
            Self::High => "bp-high",
            Self::Elevated => "bp-elevated",
            Self::Normal => "bp-normal",
        }
    }
}

/// Five-tier clinical label of a reading.
///
/// Uses its own thresholds, which deliberately differ from [`Category`]'s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    /// `systolic >= 180 || diastolic >= 120`
    HypertensiveCrisis,
    /// `systolic >= 140 || diastolic >= 90`
    Hypertension,
    /// `systolic >= 130 || diastolic >= 80`
    PreHypertension,
    /// `systolic >= 120 && diastolic < 80`
    IsolatedSystolic,
    /// Everything else.
    Normal,
}

impl Level {
    /// Classify a reading. First match wins, checked from high to low.
    #[must_use]
    pub fn classify(systolic: i64, diastolic: i64) -> Self {
        if systolic >= 180 || diastolic >= 120 {
            Self::HypertensiveCrisis
        } else if systolic >= 140 || diastolic >= 90 {
            Self::Hypertension
        } else if systolic >= 130 || diastolic >= 80 {
            Self::PreHypertension
        } else if systolic >= 120 && diastolic < 80 {
            Self::IsolatedSystolic
        } else {
            Self::Normal
        }
    }

    /// Label shown on the card, marker included.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::HypertensiveCrisis => "⚠️ 高血壓危象",
            Self::Hypertension => "🔴 高血壓",
            Self::PreHypertension => "🟡 高血壓前期",
            Self::IsolatedSystolic => "🟠 血壓偏高",
            Self::Normal => "🟢 正常",
        }
    }
}

/// Icon for a medication value: pill, warning, or a neutral dash.
#[must_use]
pub fn medication_icon(medication: &str) -> &'static str {
    match MedicationStatus::from_value(medication) {
        MedicationStatus::Taken => "💊",
        MedicationStatus::NotTaken => "⚠️",
        MedicationStatus::Unspecified => "➖",
    }
}

/// Display model of one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Card {
    /// Id passed to the card's delete action.
    pub id: i64,
    /// Creation datetime.
    pub datetime: String,
    /// `systolic/diastolic`.
    pub blood_pressure: String,
    /// `N bpm`.
    pub pulse: String,
    /// Medication icon.
    pub medication_icon: &'static str,
    /// Medication value as stored.
    pub medication: String,
    /// Styling bucket.
    pub category: Category,
    /// Clinical level.
    pub level: Level,
    /// Clinical level label.
    pub level_label: &'static str,
    /// Notes, present only when non-empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Card {
    /// Build the card for `record`.
    #[must_use]
    pub fn from_record(record: &Record) -> Self {
        let level = Level::classify(record.systolic, record.diastolic);
        Self {
            id: record.id,
            datetime: record.datetime.clone(),
            blood_pressure: format!("{}/{}", record.systolic, record.diastolic),
            pulse: format!("{} bpm", record.pulse),
            medication_icon: medication_icon(&record.medication),
            medication: record.medication.clone(),
            category: Category::classify(record.systolic, record.diastolic),
            level,
            level_label: level.label(),
            notes: record.has_notes().then(|| record.notes.clone()),
        }
    }
}

/// The rendered record list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", content = "cards", rename_all = "snake_case")]
pub enum ListView {
    /// No records; show [`EMPTY_MESSAGE`].
    Empty,
    /// One card per record, newest first.
    Cards(Vec<Card>),
}

/// Render the whole list, replacing anything rendered before.
#[must_use]
pub fn render_all(records: &[Record]) -> ListView {
    if records.is_empty() {
        ListView::Empty
    } else {
        ListView::Cards(records.iter().map(Card::from_record).collect())
    }
}

const LABEL_BLOOD_PRESSURE: &str = "血壓";
const LABEL_PULSE: &str = "脈搏";
const LABEL_MEDICATION: &str = "藥物狀態";
const LABEL_LEVEL: &str = "血壓等級";
const LABEL_NOTES: &str = "備註";
const LABEL_DELETE: &str = "刪除";

/// Lay out `view` as terminal text.
///
/// With a palette, each card's header and blood-pressure value take the
/// category color; without one the output is plain. `selected` marks the
/// card at that index.
#[must_use]
pub fn render_text(view: &ListView, palette: Option<&Palette>, selected: Option<usize>) -> String {
    let mut out = String::new();
    match view {
        ListView::Empty => {
            let _ = writeln!(out, "{}", paint(EMPTY_MESSAGE, palette.map(|p| p.muted)));
        }
        ListView::Cards(cards) => {
            for (index, card) in cards.iter().enumerate() {
                if index > 0 {
                    out.push('\n');
                }
                write_card(&mut out, card, palette, selected == Some(index));
            }
        }
    }
    out
}

fn write_card(out: &mut String, card: &Card, palette: Option<&Palette>, selected: bool) {
    let tint = palette.map(|p| p.category(card.category));
    let cursor = if selected { "▶ " } else { "  " };
    let header = format!("📅 {}", card.datetime);

    let _ = writeln!(
        out,
        "{cursor}{}  [{LABEL_DELETE} #{}]",
        paint(&header, tint),
        card.id
    );
    let _ = writeln!(
        out,
        "    {LABEL_BLOOD_PRESSURE}      {}",
        paint(&card.blood_pressure, tint)
    );
    let _ = writeln!(out, "    {LABEL_PULSE}      {}", card.pulse);
    let _ = writeln!(
        out,
        "    {LABEL_MEDICATION}  {} {}",
        card.medication_icon, card.medication
    );
    let _ = writeln!(out, "    {LABEL_LEVEL}  {}", card.level_label);

    if let Some(notes) = &card.notes {
        let _ = writeln!(out, "    {LABEL_NOTES}");
        for line in notes.lines() {
            let _ = writeln!(out, "      {}", paint(line, palette.map(|p| p.muted)));
        }
    }
}

fn paint(text: &str, color: Option<crossterm::style::Color>) -> String {
    match color {
        Some(color) => text.with(color).to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::Theme;

    fn record(systolic: i64, diastolic: i64, medication: &str, notes: &str) -> Record {
        Record {
            id: 1_705_302_245_000,
            datetime: "2024/01/15 下午03:04:05".to_string(),
            systolic,
            diastolic,
            pulse: 72,
            medication: medication.to_string(),
            notes: notes.to_string(),
        }
    }

    #[test]
    fn test_classification_examples() {
        let cases = [
            ((180, 70), Category::High, Level::HypertensiveCrisis),
            ((150, 95), Category::High, Level::Hypertension),
            ((132, 82), Category::Elevated, Level::PreHypertension),
            ((125, 75), Category::Elevated, Level::IsolatedSystolic),
            ((110, 70), Category::Normal, Level::Normal),
        ];
        for ((sys, dia), category, level) in cases {
            assert_eq!(Category::classify(sys, dia), category, "{sys}/{dia}");
            assert_eq!(Level::classify(sys, dia), level, "{sys}/{dia}");
        }
    }

    #[test]
    fn test_category_and_level_disagree_at_boundaries() {
        // Diastolic 80 is elevated for the category, pre-hypertension for the level.
        assert_eq!(Category::classify(110, 80), Category::Elevated);
        assert_eq!(Level::classify(110, 80), Level::PreHypertension);

        // Systolic 139 is elevated for the category but never high.
        assert_eq!(Category::classify(139, 70), Category::Elevated);
        assert_eq!(Level::classify(139, 70), Level::PreHypertension);

        // Diastolic alone at 120 is a crisis but only "high" for styling.
        assert_eq!(Category::classify(100, 120), Category::High);
        assert_eq!(Level::classify(100, 120), Level::HypertensiveCrisis);
    }

    #[test]
    fn test_level_thresholds() {
        assert_eq!(Level::classify(179, 119), Level::Hypertension);
        assert_eq!(Level::classify(129, 79), Level::IsolatedSystolic);
        assert_eq!(Level::classify(119, 79), Level::Normal);
        assert_eq!(Level::classify(130, 60), Level::PreHypertension);
    }

    #[test]
    fn test_labels() {
        assert_eq!(Level::HypertensiveCrisis.label(), "⚠️ 高血壓危象");
        assert_eq!(Level::Normal.label(), "🟢 正常");
        assert_eq!(Category::High.class_name(), "bp-high");
    }

    #[test]
    fn test_medication_icon() {
        assert_eq!(medication_icon("已服藥"), "💊");
        assert_eq!(medication_icon("未服藥"), "⚠️");
        assert_eq!(medication_icon("無"), "➖");
        assert_eq!(medication_icon(""), "➖");
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render_all(&[]), ListView::Empty);
        let text = render_text(&ListView::Empty, None, None);
        assert_eq!(text.trim(), EMPTY_MESSAGE);
    }

    #[test]
    fn test_render_keeps_list_order() {
        let mut newer = record(150, 95, "無", "");
        newer.id = 2;
        let mut older = record(110, 70, "無", "");
        older.id = 1;

        let ListView::Cards(cards) = render_all(&[newer, older]) else {
            panic!("expected cards");
        };
        let ids: Vec<i64> = cards.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_card_fields() {
        let card = Card::from_record(&record(125, 75, "已服藥", ""));
        assert_eq!(card.blood_pressure, "125/75");
        assert_eq!(card.pulse, "72 bpm");
        assert_eq!(card.medication_icon, "💊");
        assert_eq!(card.category, Category::Elevated);
        assert_eq!(card.level_label, "🟠 血壓偏高");
        assert!(card.notes.is_none());
    }

    #[test]
    fn test_notes_block_only_when_present() {
        let without = render_text(&render_all(&[record(110, 70, "無", "")]), None, None);
        assert!(!without.contains(LABEL_NOTES));

        let with = render_text(
            &render_all(&[record(110, 70, "無", "after walk\nsecond line")]),
            None,
            None,
        );
        assert!(with.contains(LABEL_NOTES));
        assert!(with.contains("after walk"));
        assert!(with.contains("second line"));
    }

    #[test]
    fn test_plain_text_layout() {
        let text = render_text(&render_all(&[record(150, 95, "未服藥", "")]), None, None);
        assert!(text.contains("📅 2024/01/15 下午03:04:05"));
        assert!(text.contains("[刪除 #1705302245000]"));
        assert!(text.contains("150/95"));
        assert!(text.contains("⚠️ 未服藥"));
        assert!(text.contains("🔴 高血壓"));
        assert!(!text.contains('\u{1b}'));
    }

    #[test]
    fn test_colored_text_uses_escape_codes() {
        let palette = Theme::Dark.palette();
        let text = render_text(
            &render_all(&[record(150, 95, "無", "")]),
            Some(&palette),
            None,
        );
        // crossterm honors NO_COLOR even when a color is requested.
        if std::env::var_os("NO_COLOR").is_none() {
            assert!(text.contains('\u{1b}'));
        }
        assert!(text.contains("150/95"));
    }

    #[test]
    fn test_selected_marker() {
        let records = [record(110, 70, "無", ""), record(120, 70, "無", "")];
        let text = render_text(&render_all(&records), None, Some(1));
        assert_eq!(text.matches('▶').count(), 1);
        let marker_line = text.lines().find(|l| l.contains('▶')).unwrap();
        assert!(marker_line.starts_with("▶ "));
    }

    #[test]
    fn test_json_view() {
        let json = serde_json::to_value(render_all(&[record(180, 70, "無", "")])).unwrap();
        assert_eq!(json["view"], "cards");
        assert_eq!(json["cards"][0]["category"], "bp-high");
        assert_eq!(json["cards"][0]["level"], "hypertensive_crisis");
        assert!(json["cards"][0].get("notes").is_none());

        let empty = serde_json::to_value(ListView::Empty).unwrap();
        assert_eq!(empty["view"], "empty");
    }
}

use serde_derive::Deserialize;

use crate::models::note::{Note, NoteDraft};

/// One entry of an import file. Older exports spell the flag `is_important`.
#[derive(Deserialize)]
struct ImportedNote {
    title: Option<String>,
    content: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    important: Option<bool>,
    is_important: Option<bool>,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImportPlan {
    pub drafts: Vec<NoteDraft>,
    pub skipped: usize,
}

pub fn export_notes(notes: &[Note]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(notes)
}

/// Reads a JSON array of notes. Entries without a title or content are
/// counted as skipped.
pub fn parse_import(text: &str) -> Result<ImportPlan, serde_json::Error> {
    let entries: Vec<serde_json::Value> = serde_json::from_str(text)?;
    let mut plan = ImportPlan::default();
    for entry in entries {
        let Ok(imported) = serde_json::from_value::<ImportedNote>(entry) else {
            plan.skipped += 1;
            continue;
        };
        match (imported.title, imported.content) {
            (Some(title), Some(content))
                if !title.trim().is_empty() && !content.trim().is_empty() =>
            {
                let important = imported.important.or(imported.is_important).unwrap_or(false);
                plan.drafts.push(
                    NoteDraft::new(title, content)
                        .with_tags(imported.tags)
                        .with_important(important),
                );
            }
            _ => plan.skipped += 1,
        }
    }
    Ok(plan)
}

use std::fmt::Write;

use crate::entity::EntityModel;
use crate::error::DashboardError;
use crate::html::escape;

#[derive(Debug, Clone, Default)]
pub struct Header;

impl Header {
    pub fn render(&self, model: &EntityModel) -> String {
        format!("<h1>{} Report</h1>", model.kind().label())
    }
}

/// Radio group whose change event asks the server for a fresh selector.
#[derive(Debug, Clone)]
pub struct Radio {
    pub values: Vec<&'static str>,
    pub name: &'static str,
    pub hx_get: &'static str,
    pub hx_target: &'static str,
}

impl Radio {
    pub fn render(&self, model: &EntityModel) -> String {
        let mut output = String::new();
        let _ = write!(output, "<fieldset>");
        for value in &self.values {
            let checked = if *value == model.kind().label() {
                " checked"
            } else {
                ""
            };
            let _ = write!(
                output,
                "<label><input type=\"radio\" name=\"{name}\" value=\"{value}\" \
                 hx-get=\"{get}\" hx-target=\"{target}\" \
                 hx-swap=\"outerHTML\"{checked}>{value}</label>",
                name = escape(self.name),
                value = escape(value),
                get = escape(self.hx_get),
                target = escape(self.hx_target),
            );
        }
        let _ = write!(output, "</fieldset>");
        output
    }
}

#[derive(Debug, Clone)]
pub struct Dropdown {
    pub id: &'static str,
    pub name: &'static str,
}

impl Dropdown {
    /// `entity_id` is `None` when only the options are being refreshed
    /// after a kind change.
    pub async fn render(
        &self,
        entity_id: Option<i64>,
        model: &EntityModel,
    ) -> Result<String, DashboardError> {
        let options = model.list_selectable().await?;

        let mut output = String::new();
        let _ = write!(
            output,
            "<div id=\"{id}\"><label for=\"{name}\">{label}</label>\
             <select id=\"{name}\" name=\"{name}\">",
            id = escape(self.id),
            name = escape(self.name),
            label = model.kind().label(),
        );
        for option in options {
            let selected = if Some(option.id) == entity_id {
                " selected"
            } else {
                ""
            };
            let _ = write!(
                output,
                "<option value=\"{}\"{}>{}</option>",
                option.id,
                selected,
                escape(&option.label)
            );
        }
        let _ = write!(output, "</select></div>");
        Ok(output)
    }
}

#[derive(Debug, Clone, Default)]
pub struct NotesTable;

impl NotesTable {
    pub async fn render(
        &self,
        entity_id: Option<i64>,
        model: &EntityModel,
    ) -> Result<String, DashboardError> {
        let id = entity_id.ok_or(DashboardError::MissingEntityId("notes table"))?;
        let notes = model.notes(id).await?;

        let mut output = String::new();
        let _ = write!(
            output,
            "<table><thead><tr><th>Date</th><th>Note</th></tr></thead><tbody>"
        );
        for note in notes {
            let _ = write!(
                output,
                "<tr><td>{}</td><td>{}</td></tr>",
                note.note_date,
                escape(&note.content)
            );
        }
        let _ = write!(output, "</tbody></table>");
        Ok(output)
    }
}

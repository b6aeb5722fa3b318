use std::sync::Arc;

use crate::components::{
    BarChart, Chart, Component, Composite, Container, Dropdown, Header, LineChart, NotesTable,
    Radio,
};
use crate::entity::EntityModel;
use crate::error::DashboardError;
use crate::html;
use crate::models::EntityKind;
use crate::risk::Predictor;

pub const FILTER_FORM_ID: &str = "top-filters";
pub const SELECTOR_ID: &str = "selector";

/// Entity selector shared by the filter form and the `/update_dropdown`
/// fragment, so a swapped fragment keeps the same id and field name.
pub fn report_dropdown() -> Dropdown {
    Dropdown {
        id: SELECTOR_ID,
        name: "user-selection",
    }
}

fn dashboard_filters() -> Composite {
    Composite::new(
        Container::Form {
            id: FILTER_FORM_ID,
            action: "/update_data",
            method: "POST",
            submit_label: "Submit",
        },
        vec![
            Component::Radio(Radio {
                values: EntityKind::ALL.iter().map(|kind| kind.label()).collect(),
                name: "profile_type",
                hx_get: "/update_dropdown",
                hx_target: "#selector",
            }),
            Component::Dropdown(report_dropdown()),
        ],
    )
}

fn visualizations(predictor: Arc<dyn Predictor>) -> Composite {
    Composite::new(
        Container::Div {
            class: Some("grid"),
        },
        vec![
            Component::Chart(Chart::Line(LineChart::default())),
            Component::Chart(Chart::Bar(BarChart::new(predictor))),
        ],
    )
}

/// The dashboard page: header, filters, charts and notes, in that order.
/// Built once at startup and rendered per request.
pub struct Report {
    root: Component,
}

impl Report {
    pub fn new(predictor: Arc<dyn Predictor>) -> Self {
        let root = Composite::new(
            Container::Div { class: None },
            vec![
                Component::Header(Header),
                Component::Composite(dashboard_filters()),
                Component::Composite(visualizations(predictor)),
                Component::NotesTable(NotesTable),
            ],
        );
        Self {
            root: Component::Composite(root),
        }
    }

    pub async fn render_body(
        &self,
        entity_id: i64,
        model: &EntityModel,
    ) -> Result<String, DashboardError> {
        self.root.render(Some(entity_id), model).await
    }

    pub async fn render(
        &self,
        entity_id: i64,
        model: &EntityModel,
    ) -> Result<String, DashboardError> {
        let body = self.render_body(entity_id, model).await?;
        let title = format!("{} Report", model.kind().label());
        Ok(html::page(&title, &body))
    }
}

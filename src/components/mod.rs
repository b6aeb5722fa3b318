//! Render tree for the dashboard.
//!
//! Every node renders from `(entity_id, model)` alone. Leaves pull their
//! data from the model; composites wrap their children's output in a
//! container element.

use futures::future::{BoxFuture, FutureExt};

use crate::entity::EntityModel;
use crate::error::DashboardError;

mod charts;
mod composite;
mod leaves;

pub use charts::{BarChart, Chart, LineChart};
pub use composite::{Composite, Container};
pub use leaves::{Dropdown, Header, NotesTable, Radio};

pub enum Component {
    Header(Header),
    Radio(Radio),
    Dropdown(Dropdown),
    Chart(Chart),
    NotesTable(NotesTable),
    Composite(Composite),
}

impl Component {
    pub fn name(&self) -> &'static str {
        match self {
            Component::Header(_) => "header",
            Component::Radio(_) => "radio",
            Component::Dropdown(_) => "dropdown",
            Component::Chart(chart) => chart.name(),
            Component::NotesTable(_) => "notes table",
            Component::Composite(_) => "composite",
        }
    }

    // Boxed so composites can recurse through child components.
    pub fn render<'a>(
        &'a self,
        entity_id: Option<i64>,
        model: &'a EntityModel,
    ) -> BoxFuture<'a, Result<String, DashboardError>> {
        async move {
            match self {
                Component::Header(header) => Ok(header.render(model)),
                Component::Radio(radio) => Ok(radio.render(model)),
                Component::Dropdown(dropdown) => dropdown.render(entity_id, model).await,
                Component::Chart(chart) => chart.render(entity_id, model).await,
                Component::NotesTable(table) => table.render(entity_id, model).await,
                Component::Composite(composite) => composite.render(entity_id, model).await,
            }
        }
        .boxed()
    }
}

use std::fmt::Write;

use crate::entity::EntityModel;
use crate::error::DashboardError;
use crate::html::escape;

use super::Component;

/// Element that wraps a composite's children.
#[derive(Debug, Clone)]
pub enum Container {
    Div {
        class: Option<&'static str>,
    },
    Form {
        id: &'static str,
        action: &'static str,
        method: &'static str,
        submit_label: &'static str,
    },
}

impl Container {
    fn open(&self) -> String {
        match self {
            Container::Div { class: Some(class) } => format!("<div class=\"{}\">", escape(class)),
            Container::Div { class: None } => "<div>".to_string(),
            Container::Form {
                id, action, method, ..
            } => format!(
                "<form id=\"{}\" action=\"{}\" method=\"{}\">",
                escape(id),
                escape(action),
                escape(method)
            ),
        }
    }

    fn close(&self) -> String {
        match self {
            Container::Div { .. } => "</div>".to_string(),
            Container::Form { submit_label, .. } => {
                format!("<button type=\"submit\">{}</button></form>", escape(submit_label))
            }
        }
    }
}

pub struct Composite {
    container: Container,
    children: Vec<Component>,
}

impl Composite {
    pub fn new(container: Container, children: Vec<Component>) -> Self {
        Self {
            container,
            children,
        }
    }

    pub async fn render(
        &self,
        entity_id: Option<i64>,
        model: &EntityModel,
    ) -> Result<String, DashboardError> {
        let mut output = self.container.open();
        for child in &self.children {
            match child.render(entity_id, model).await {
                Ok(markup) => {
                    let _ = write!(output, "{markup}");
                }
                Err(e) => {
                    tracing::warn!(
                        component = child.name(),
                        entity = model.name(),
                        entity_id = ?entity_id,
                        error = %e,
                        "component render failed"
                    );
                    return Err(e);
                }
            }
        }
        output.push_str(&self.container.close());
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Header, NotesTable};
    use crate::entity::fixtures::{model, FixtureSource};
    use crate::models::EntityKind;

    #[tokio::test]
    async fn renders_children_in_order_inside_the_container() {
        let composite = Composite::new(
            Container::Div { class: Some("grid") },
            vec![Component::NotesTable(NotesTable), Component::Header(Header)],
        );
        let employees = model(EntityKind::Employee, FixtureSource::sample());
        let html = composite.render(Some(1), &employees).await.unwrap();

        assert!(html.starts_with("<div class=\"grid\"><table>"));
        assert!(html.ends_with("<h1>Employee Report</h1></div>"));
    }

    #[tokio::test]
    async fn nested_composites_share_the_same_arguments() {
        let inner = Composite::new(Container::Div { class: None }, vec![Component::Header(Header)]);
        let outer = Composite::new(
            Container::Form {
                id: "f",
                action: "/go",
                method: "POST",
                submit_label: "Submit",
            },
            vec![Component::Composite(inner), Component::Header(Header)],
        );
        let teams = model(EntityKind::Team, FixtureSource::sample());
        let html = outer.render(Some(7), &teams).await.unwrap();

        assert_eq!(
            html,
            "<form id=\"f\" action=\"/go\" method=\"POST\"><div><h1>Team Report</h1></div>\
             <h1>Team Report</h1><button type=\"submit\">Submit</button></form>"
        );
    }

    #[tokio::test]
    async fn first_child_failure_is_propagated() {
        let mut source = FixtureSource::sample();
        source.notes.remove(&(EntityKind::Employee, 1));
        let composite = Composite::new(
            Container::Div { class: None },
            vec![Component::Header(Header), Component::NotesTable(NotesTable)],
        );

        let err = composite
            .render(Some(1), &model(EntityKind::Employee, source))
            .await
            .unwrap_err();
        assert!(matches!(err, DashboardError::NotFound { id: 1, .. }));
    }
}

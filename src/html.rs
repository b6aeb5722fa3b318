use std::fmt::Write;

const HTMX_SRC: &str = "https://unpkg.com/htmx.org@1.9.12";
const PICO_HREF: &str = "https://cdn.jsdelivr.net/npm/@picocss/pico@2/css/pico.min.css";

pub fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

pub fn page(title: &str, body: &str) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "<!DOCTYPE html>");
    let _ = writeln!(output, "<html lang=\"en\">");
    let _ = writeln!(output, "<head>");
    let _ = writeln!(output, "<meta charset=\"utf-8\">");
    let _ = writeln!(
        output,
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">"
    );
    let _ = writeln!(output, "<title>{}</title>", escape(title));
    let _ = writeln!(output, "<link rel=\"stylesheet\" href=\"{PICO_HREF}\">");
    let _ = writeln!(output, "<script src=\"{HTMX_SRC}\"></script>");
    let _ = writeln!(output, "</head>");
    let _ = writeln!(output, "<body>");
    let _ = writeln!(output, "<main class=\"container\">");
    let _ = writeln!(output, "{body}");
    let _ = writeln!(output, "</main>");
    let _ = writeln!(output, "</body>");
    let _ = writeln!(output, "</html>");
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup_and_quotes() {
        assert_eq!(
            escape(r#"<a href="x">Tom & Jo's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jo&#39;s&lt;/a&gt;"
        );
    }

    #[test]
    fn page_wraps_body_and_escapes_title() {
        let html = page("A<B", "<h1>Hi</h1>");
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>A&lt;B</title>"));
        assert!(html.contains("<h1>Hi</h1>"));
        assert!(html.contains("htmx.org"));
    }
}

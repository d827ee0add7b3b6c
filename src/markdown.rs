use pulldown_cmark::{html, Event, Options, Parser};

/// Renders the model's markdown answer to an HTML fragment for the form page.
///
/// Raw HTML in the answer is emitted as escaped text, never as markup.
pub fn render_html(input: &str) -> String {
    let options = Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES;
    let parser = Parser::new_ext(input, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });

    let mut out = String::with_capacity(input.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

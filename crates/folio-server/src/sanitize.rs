/// Cleans user-supplied HTML with ammonia's defaults, extended with headings,
/// embedded media and presentational attributes on every tag.
pub fn sanitize_html(input: &str) -> String {
    let mut cleaner = ammonia::Builder::default();
    cleaner
        .add_tags(&["img", "h1", "h2", "h3", "iframe", "video"])
        .add_generic_attributes(&["style", "class", "id"]);
    cleaner.clean(input).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_scripts_and_handlers() {
        let out = sanitize_html(r#"<p onclick="x()">hi<script>alert(1)</script></p>"#);
        assert_eq!(out, "<p>hi</p>");
    }

    #[test]
    fn keeps_extended_tags_and_attributes() {
        let out = sanitize_html(r#"<h1 class="big" id="top" style="color:red">T</h1><video></video>"#);
        assert!(out.contains("<h1"));
        assert!(out.contains(r#"class="big""#));
        assert!(out.contains(r#"id="top""#));
        assert!(out.contains("<video>"));
    }
}

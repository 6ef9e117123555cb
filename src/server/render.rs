// self
use crate::analytics::PropertySummary;

/// Renders one `<li>` per property, in the order given.
pub fn render_property_list(properties: &[PropertySummary]) -> String {
	let mut html = String::from("<p>Google Analytics connected successfully.</p><ul>");

	for property in properties {
		html.push_str("<li>");
		html.push_str(&escape_html(&property.name));
		html.push_str(" (");
		html.push_str(&escape_html(&property.id));
		html.push_str(")</li>");
	}

	html.push_str("</ul>");

	html
}

/// Escapes the five HTML-special characters.
pub fn escape_html(input: &str) -> String {
	let mut output = String::with_capacity(input.len());

	for ch in input.chars() {
		match ch {
			'&' => output.push_str("&amp;"),
			'<' => output.push_str("&lt;"),
			'>' => output.push_str("&gt;"),
			'"' => output.push_str("&quot;"),
			'\'' => output.push_str("&#x27;"),
			_ => output.push(ch),
		}
	}

	output
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn property(id: &str, name: &str) -> PropertySummary {
		PropertySummary {
			account_id: "accounts/1".into(),
			account_name: "Account".into(),
			id: id.into(),
			name: name.into(),
		}
	}

	#[test]
	fn list_keeps_input_order() {
		let html = render_property_list(&[property("P2", "Beta"), property("P1", "Alpha")]);

		assert_eq!(
			html,
			concat!(
				"<p>Google Analytics connected successfully.</p>",
				"<ul><li>Beta (P2)</li><li>Alpha (P1)</li></ul>"
			)
		);
	}

	#[test]
	fn names_are_escaped() {
		let html = render_property_list(&[property("P1", "<script>\"x\" & 'y'</script>")]);

		assert!(html.contains("&lt;script&gt;&quot;x&quot; &amp; &#x27;y&#x27;&lt;/script&gt;"));
		assert!(!html.contains("<script>"));
	}
}

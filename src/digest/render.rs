//! HTML digest rendering.

use anyhow::Result;
use handlebars::Handlebars;
use serde::Serialize;

use crate::youtube::SearchItem;

/// The projection of a search result actually rendered into the email.
#[derive(Debug, Clone, Serialize)]
pub struct DigestRecord {
    pub title: String,
    pub description: String,
    pub thumbnail: String,
    pub id: String,
}

impl From<&SearchItem> for DigestRecord {
    fn from(item: &SearchItem) -> Self {
        Self {
            title: item.snippet.title.clone(),
            description: item.snippet.description.clone(),
            thumbnail: item.snippet.thumbnails.medium_url().to_string(),
            id: item.id.video_id.clone(),
        }
    }
}

#[derive(Serialize)]
struct DigestData {
    videos: Vec<DigestRecord>,
}

/// One table row per video; thumbnail links to the canonical watch URL.
/// Handlebars' default escaping covers the provider-supplied text fields.
const DIGEST_TEMPLATE: &str = r#"<html>
<body>
    <table>
    {{#each videos}}
        <tr>
            <td><a href="https://youtube.com/watch?v={{id}}"><img src="{{thumbnail}}"></a></td>
            <td>{{title}}</td>
            <td>{{description}}</td>
        </tr>
    {{/each}}
    </table>
</body>
</html>"#;

/// Renders search results into the digest HTML.
pub struct DigestRenderer {
    handlebars: Handlebars<'static>,
}

impl DigestRenderer {
    /// Create a renderer with the embedded template.
    pub fn new() -> Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.register_template_string("digest", DIGEST_TEMPLATE)?;
        Ok(Self { handlebars })
    }

    /// Render one row per item, preserving the provider's date ordering.
    pub fn render(&self, items: &[SearchItem]) -> Result<String> {
        let data = DigestData {
            videos: items.iter().map(DigestRecord::from).collect(),
        };
        let html = self.handlebars.render("digest", &data)?;
        Ok(html)
    }
}

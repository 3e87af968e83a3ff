//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::routes::layout::{Layout, Page};

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct HomeTemplate {
    pub layout: Layout,
}

/// Display the home page.
#[instrument(skip_all)]
pub async fn home(page: Page) -> Result<HomeTemplate> {
    Ok(HomeTemplate {
        layout: page.layout("Home").await?,
    })
}

//! The console shell page.
//!
//! Every `GET` that is not an API or asset route returns this page. It
//! loads the console scripts and styles and boots the client with the
//! deployment zone (`<env>-<region>`).

use axum::response::Html;
use minijinja::{Environment, context};

use crate::error::HttpError;

const INDEX_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8">
    <link href="https://fonts.googleapis.com/css?family=Fira+Sans:300,300i,400,500,700" rel="stylesheet">
    <link href="/styles/normalize.css" rel="stylesheet">
    <link href="/styles/nucleo-glyph.css" rel="stylesheet">
    <link href="/styles/nucleo-outline.css" rel="stylesheet">
    <link href="/styles/console.css" rel="stylesheet">
    <script src="/scripts/console.js" type="text/javascript"></script>
  </head>
  <body>
    <script type="text/javascript">
      Elm.Console.fullscreen({zone: "{{ zone }}"});
    </script>
  </body>
</html>
"#;

/// Renders the shell page for one deployment zone.
pub struct Shell {
    env: Environment<'static>,
    zone: String,
}

impl Shell {
    /// Compile the page template for `zone`.
    ///
    /// # Errors
    ///
    /// Returns a [`minijinja::Error`] if the template fails to compile.
    pub fn new(zone: &str) -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template("index.html", INDEX_TEMPLATE)?;
        Ok(Self {
            env,
            zone: zone.to_owned(),
        })
    }

    /// Render the page.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Internal`] if rendering fails.
    pub fn render(&self) -> Result<Html<String>, HttpError> {
        self.env
            .get_template("index.html")
            .and_then(|tpl| tpl.render(context! { zone => self.zone.as_str() }))
            .map(Html)
            .map_err(|e| HttpError::Internal(format!("shell render failed: {e}")))
    }
}

//! Client-dependent exposure of the stored shards
//!
//! Command-line clients get the curl shard as plain text; everything else
//! gets an HTML page with the web shard tucked into a hidden element.
//! Detection is a substring match on the `User-Agent` header. It is
//! trivially spoofable and only picks a presentation, it guards nothing.

use handlebars::Handlebars;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::store::FlagShards;

const INDEX_TEMPLATE: &str = include_str!("../../templates/index.html.hbs");

/// User-Agent token identifying command-line clients
const CLI_TOKEN: &str = "curl";

/// Kind of client asking for the index page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientKind {
    CommandLine,
    Browser,
}

impl ClientKind {
    /// Classify a request from its `User-Agent` header, if any
    pub fn from_user_agent(user_agent: Option<&str>) -> Self {
        match user_agent {
            Some(ua) if ua.to_ascii_lowercase().contains(CLI_TOKEN) => Self::CommandLine,
            _ => Self::Browser,
        }
    }
}

/// Rendered response body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exposure {
    /// `text/plain` body
    PlainText(String),

    /// `text/html` body
    Html(String),
}

impl Exposure {
    /// Body text
    pub fn body(&self) -> &str {
        match self {
            Self::PlainText(body) | Self::Html(body) => body,
        }
    }
}

#[derive(Serialize)]
struct PageData<'a> {
    title: &'a str,
    flag: String,
}

/// Renders the HTML page; every interpolated value is HTML-escaped
pub struct PageRenderer {
    handlebars: Handlebars<'static>,
}

impl PageRenderer {
    /// Compile the built-in page template
    pub fn new() -> Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(|s| html_escape::encode_safe(s).into_owned());
        handlebars
            .register_template_string("index", INDEX_TEMPLATE)
            .map_err(|e| Error::Template(e.to_string()))?;

        Ok(Self { handlebars })
    }

    /// Build the response for `kind` from the current shards
    pub fn expose(&self, kind: ClientKind, shards: &FlagShards) -> Result<Exposure> {
        match kind {
            ClientKind::CommandLine => Ok(Exposure::PlainText(format!("flag: {}\n", shards.curl))),
            ClientKind::Browser => {
                let data = PageData {
                    title: "Page",
                    flag: format!("FLAG{{{}}}", shards.web),
                };
                self.handlebars
                    .render("index", &data)
                    .map(Exposure::Html)
                    .map_err(|e| Error::Template(e.to_string()))
            }
        }
    }
}

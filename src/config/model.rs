//! Serde data structures for the patmux route table file.
//!
//! Contains [`Config`] (the root), [`Route`] (one pattern and what to
//! answer with) and [`Respond`]. Structs use `deny_unknown_fields` for
//! strict parsing.

use serde::{Deserialize, Serialize};

const fn default_status() -> u16 {
    200
}

const fn default_true() -> bool {
    true
}

fn is_default_status(v: &u16) -> bool {
    *v == default_status()
}

fn is_true(v: &bool) -> bool {
    *v
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub routes: Vec<Route>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Route {
    pub pattern: String,
    pub respond: Respond,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Respond {
    /// Fixed body; `{:name}` placeholders take the first captured value.
    Text {
        #[serde(default = "default_status", skip_serializing_if = "is_default_status")]
        status: u16,
        body: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content_type: Option<String>,
    },

    /// JSON description of the matched request.
    Echo,

    Redirect {
        location: String,
        #[serde(default = "default_true", skip_serializing_if = "is_true")]
        permanent: bool,
    },
}

impl Config {
    #[must_use]
    pub fn count_by_kind(&self) -> (usize, usize, usize) {
        self.routes
            .iter()
            .fold((0, 0, 0), |(text, echo, redirect), r| match r.respond {
                Respond::Text { .. } => (text + 1, echo, redirect),
                Respond::Echo => (text, echo + 1, redirect),
                Respond::Redirect { .. } => (text, echo, redirect + 1),
            })
    }
}

impl Respond {
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Echo => "echo",
            Self::Redirect { .. } => "redirect",
        }
    }
}

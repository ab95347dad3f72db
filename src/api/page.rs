//! Page rendering
//!
//! Every HTML page gets the standard variables (site name, path, year), the
//! visitor's session summary and at most one toast.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Serialize;
use tera::Context as TeraContext;

use super::flash::Toast;
use super::middleware::{append_cookie, AppState, Visitor};
use crate::views::PageVars;

/// Session fields exposed to templates
#[derive(Debug, Serialize)]
struct VisitorView<'a> {
    username: &'a str,
    display_name: String,
    role: &'static str,
    role_label: &'static str,
    is_admin: bool,
}

/// Add `visitor` and `toast` to a template context.
/// An explicit toast wins over the pending flash toast.
pub fn insert_visitor(context: &mut TeraContext, visitor: &Visitor, toast: Option<&Toast>) {
    if let Some(session) = &visitor.session {
        context.insert(
            "visitor",
            &VisitorView {
                username: &session.username,
                display_name: session.display_name(),
                role: session.role.code(),
                role_label: session.role.label(),
                is_admin: session.is_admin(),
            },
        );
    }
    if let Some(toast) = toast.or(visitor.flash.as_ref()) {
        context.insert("toast", toast);
    }
}

/// A template about to be rendered
pub struct Page {
    template: &'static str,
    context: TeraContext,
    status: StatusCode,
    toast: Option<Toast>,
}

impl Page {
    pub fn new(template: &'static str) -> Self {
        Self {
            template,
            context: TeraContext::new(),
            status: StatusCode::OK,
            toast: None,
        }
    }

    pub fn with<T: Serialize + ?Sized>(mut self, key: &str, value: &T) -> Self {
        self.context.insert(key, value);
        self
    }

    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn toast(mut self, toast: Toast) -> Self {
        self.toast = Some(toast);
        self
    }

    pub fn render(mut self, state: &AppState, visitor: &Visitor) -> Response {
        PageVars::new(&state.config.views.site_name, &visitor.path).insert_into(&mut self.context);
        insert_visitor(&mut self.context, visitor, self.toast.as_ref());
        let html = state.views.render_with_fallback(self.template, &self.context);
        (self.status, Html(html)).into_response()
    }
}

/// 303 redirect carrying a toast and any extra cookies
pub fn redirect_with(location: &str, toast: Option<Toast>, cookies: &[String]) -> Response {
    let mut response = Redirect::to(location).into_response();
    for cookie in cookies {
        append_cookie(&mut response, cookie);
    }
    if let Some(toast) = toast {
        append_cookie(&mut response, &toast.to_cookie());
    }
    response
}

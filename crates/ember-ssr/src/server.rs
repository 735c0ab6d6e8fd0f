//! Request handling: server props, routing and the rendered document.

use std::fmt;

use ember_core::{Node, RenderConfig};
use ember_router::path::{parse_query, split_location, Params, PathPattern, Query};
use ember_router::{Route, Router};
use indexmap::IndexMap;
use serde_json::{json, Value};

use crate::document::DocumentTemplate;
use crate::error::{SsrError, SsrResult};
use crate::markup::MarkupRenderer;

/// What a page's server-props loader decided for a request.
#[derive(Clone, Debug, PartialEq)]
pub enum ServerProps {
    /// Render the page with these props.
    Props(Value),
    /// Answer with `308` when permanent, `307` otherwise.
    Redirect { destination: String, permanent: bool },
    NotFound,
}

pub type LoaderResult = Result<ServerProps, Box<dyn std::error::Error + 'static>>;

type Loader = Box<dyn Fn(&PropsContext<'_>) -> LoaderResult>;

/// Input to a server-props loader.
#[derive(Debug)]
pub struct PropsContext<'a> {
    pub request: &'a SsrRequest,
    pub pathname: &'a str,
    pub params: &'a Params,
    pub query: &'a Query,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SsrRequest {
    pub url: String,
    pub method: String,
    pub headers: IndexMap<String, String>,
    pub cookies: IndexMap<String, String>,
}

impl SsrRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: "GET".to_owned(),
            ..Self::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.header("user-agent")
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SsrResponse {
    pub status: u16,
    pub headers: IndexMap<String, String>,
    pub body: String,
}

impl SsrResponse {
    fn new(status: u16, content_type: Option<&str>, body: impl Into<String>) -> Self {
        let mut headers = IndexMap::new();
        if let Some(content_type) = content_type {
            headers.insert("Content-Type".to_owned(), content_type.to_owned());
        }
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    pub fn html(body: impl Into<String>) -> Self {
        Self::new(200, Some("text/html; charset=utf-8"), body)
    }

    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self::new(status, Some("text/plain; charset=utf-8"), body)
    }

    pub fn redirect(destination: &str, permanent: bool) -> Self {
        let mut response = Self::new(if permanent { 308 } else { 307 }, None, "");
        response
            .headers
            .insert("Location".to_owned(), destination.to_owned());
        response
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// What the app closure sees while a request renders.
pub struct SsrContext<'a> {
    pub url: &'a str,
    pub router: &'a Router,
    /// Props returned by the page's loader, if it has one.
    pub props: Option<&'a Value>,
    pub request: Option<&'a SsrRequest>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RenderOutput {
    pub html: String,
    /// `{"router": <router state>, "props": <page props or null>}`
    pub initial_state: Value,
}

struct Page {
    pattern: PathPattern,
    loader: Loader,
}

/// Renders an app per request against a fresh router.
pub struct SsrServer {
    routes: Vec<Route>,
    pages: Vec<Page>,
    renderer: MarkupRenderer,
    template: DocumentTemplate,
}

impl SsrServer {
    pub fn new(routes: Vec<Route>) -> Self {
        Self::with_config(routes, RenderConfig::default())
    }

    pub fn with_config(routes: Vec<Route>, config: RenderConfig) -> Self {
        let template = DocumentTemplate::new(config.document.clone());
        Self {
            routes,
            pages: Vec::new(),
            renderer: MarkupRenderer::with_config(config),
            template,
        }
    }

    pub fn with_template(mut self, template: DocumentTemplate) -> Self {
        self.template = template;
        self
    }

    /// Registers a server-props loader for pathnames matching `path`.
    /// The first registered page that matches wins.
    pub fn page(
        mut self,
        path: &str,
        loader: impl Fn(&PropsContext<'_>) -> LoaderResult + 'static,
    ) -> Self {
        self.pages.push(Page {
            pattern: PathPattern::parse(path),
            loader: Box::new(loader),
        });
        self
    }

    pub fn template(&self) -> &DocumentTemplate {
        &self.template
    }

    /// Renders `app` for `url` without running any loader.
    pub fn render_to_string(
        &self,
        url: &str,
        app: impl Fn(&SsrContext<'_>) -> Node,
    ) -> SsrResult<RenderOutput> {
        self.render(url, None, None, &app)
    }

    /// Loader, render and document in one go.
    pub fn handle(&self, request: &SsrRequest, app: impl Fn(&SsrContext<'_>) -> Node) -> SsrResponse {
        match self.try_handle(request, &app) {
            Ok(response) => {
                log::debug!("{} {} -> {}", request.method, request.url, response.status);
                response
            }
            Err(err) => {
                log::error!("SSR error for {}: {err}", request.url);
                SsrResponse::text(500, "Internal Server Error")
            }
        }
    }

    fn try_handle(
        &self,
        request: &SsrRequest,
        app: &dyn Fn(&SsrContext<'_>) -> Node,
    ) -> SsrResult<SsrResponse> {
        let (pathname, search) = split_location(&request.url);
        let mut props = None;
        if let Some((page, params)) = self.find_page(pathname) {
            let query = parse_query(search);
            let context = PropsContext {
                request,
                pathname,
                params: &params,
                query: &query,
            };
            let loaded = (page.loader)(&context).map_err(|source| SsrError::Loader {
                page: page.pattern.source().to_owned(),
                source,
            })?;
            match loaded {
                ServerProps::Redirect {
                    destination,
                    permanent,
                } => return Ok(SsrResponse::redirect(&destination, permanent)),
                ServerProps::NotFound => return Ok(SsrResponse::text(404, "Page not found")),
                ServerProps::Props(value) => props = Some(value),
            }
        }

        let output = self.render(&request.url, props.as_ref(), Some(request), app)?;
        let document = self
            .template
            .render(&output.html, Some(&output.initial_state))?;
        Ok(SsrResponse::html(document))
    }

    fn render(
        &self,
        url: &str,
        props: Option<&Value>,
        request: Option<&SsrRequest>,
        app: &dyn Fn(&SsrContext<'_>) -> Node,
    ) -> SsrResult<RenderOutput> {
        let router = Router::new(self.routes.clone(), url);
        let context = SsrContext {
            url,
            router: &router,
            props,
            request,
        };
        let html = self.renderer.render(&app(&context))?;
        let initial_state = json!({
            "router": serde_json::to_value(router.state())?,
            "props": props.cloned().unwrap_or(Value::Null),
        });
        Ok(RenderOutput {
            html,
            initial_state,
        })
    }

    fn find_page(&self, pathname: &str) -> Option<(&Page, Params)> {
        self.pages
            .iter()
            .find_map(|page| page.pattern.captures(pathname).map(|params| (page, params)))
    }
}

impl fmt::Debug for SsrServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SsrServer")
            .field("routes", &self.routes.len())
            .field("pages", &self.pages.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/server_tests.rs"]
mod tests;

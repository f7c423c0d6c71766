//! Route templates and compiled request targets

use std::fmt;

/// HTTP verb of a route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Endpoint template such as `channels/{channel_id}/messages`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    method: Method,
    template: &'static str,
}

impl Route {
    pub const fn get(template: &'static str) -> Self {
        Self::new(Method::Get, template)
    }

    pub const fn post(template: &'static str) -> Self {
        Self::new(Method::Post, template)
    }

    pub const fn put(template: &'static str) -> Self {
        Self::new(Method::Put, template)
    }

    pub const fn patch(template: &'static str) -> Self {
        Self::new(Method::Patch, template)
    }

    pub const fn delete(template: &'static str) -> Self {
        Self::new(Method::Delete, template)
    }

    pub const fn new(method: Method, template: &'static str) -> Self {
        Self { method, template }
    }

    #[inline]
    pub fn method(&self) -> Method {
        self.method
    }

    #[inline]
    pub fn template(&self) -> &'static str {
        self.template
    }

    /// Number of `{placeholder}` segments in the template
    pub fn param_count(&self) -> usize {
        self.template.matches('{').count()
    }

    /// Substitute the placeholders, in order, with `params`
    ///
    /// # Panics
    /// Panics if the number of params does not match the template. Route
    /// constants are fixed at compile time so a mismatch is a programming error.
    pub fn compile(&self, params: &[&str]) -> CompiledRoute {
        assert_eq!(
            params.len(),
            self.param_count(),
            "route {} expects {} params",
            self.template,
            self.param_count()
        );

        let mut path = String::with_capacity(self.template.len() + params.iter().map(|p| p.len()).sum::<usize>());
        let mut rest = self.template;
        for param in params {
            // Placeholder count was checked above
            let Some(open) = rest.find('{') else { break };
            let close = rest[open..].find('}').map_or(rest.len(), |i| open + i + 1);
            path.push_str(&rest[..open]);
            path.push_str(param);
            rest = &rest[close..];
        }
        path.push_str(rest);

        CompiledRoute {
            base: *self,
            path,
            query: Vec::new(),
        }
    }
}

/// A route with all placeholders resolved, ready to be submitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledRoute {
    base: Route,
    path: String,
    query: Vec<(String, String)>,
}

impl CompiledRoute {
    /// Append a query parameter
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    #[inline]
    pub fn method(&self) -> Method {
        self.base.method
    }

    #[inline]
    pub fn base(&self) -> Route {
        self.base
    }

    /// Path relative to the API base, without query string
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[inline]
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    /// Whether this route modifies an existing message rather than creating one
    #[inline]
    pub fn is_edit(&self) -> bool {
        self.base.method == Method::Patch
    }
}

impl fmt::Display for CompiledRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method(), self.path)?;
        for (i, (key, value)) in self.query.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(f, "{sep}{key}={value}")?;
        }
        Ok(())
    }
}

// ============================================================================
// Route constants
// ============================================================================

pub mod channels {
    use super::Route;

    pub const GET_WEBHOOKS: Route = Route::get("channels/{channel_id}/webhooks");
}

pub mod messages {
    use super::Route;

    pub const SEND_MESSAGE: Route = Route::post("channels/{channel_id}/messages");
    pub const EDIT_MESSAGE: Route = Route::patch("channels/{channel_id}/messages/{message_id}");
    pub const GET_MESSAGE: Route = Route::get("channels/{channel_id}/messages/{message_id}");
    pub const DELETE_MESSAGE: Route = Route::delete("channels/{channel_id}/messages/{message_id}");
    pub const DELETE_MESSAGES: Route = Route::post("channels/{channel_id}/messages/bulk-delete");
    pub const GET_MESSAGE_HISTORY: Route = Route::get("channels/{channel_id}/messages");

    pub const GET_PINNED_MESSAGES: Route = Route::get("channels/{channel_id}/pins");
    pub const ADD_PINNED_MESSAGE: Route = Route::put("channels/{channel_id}/pins/{message_id}");
    pub const REMOVE_PINNED_MESSAGE: Route = Route::delete("channels/{channel_id}/pins/{message_id}");

    pub const ADD_REACTION: Route =
        Route::put("channels/{channel_id}/messages/{message_id}/reactions/{reaction_code}/@me");
    pub const REMOVE_ALL_REACTIONS: Route =
        Route::delete("channels/{channel_id}/messages/{message_id}/reactions");
}

pub mod webhooks {
    use super::Route;

    pub const DELETE_WEBHOOK: Route = Route::delete("webhooks/{webhook_id}");
}

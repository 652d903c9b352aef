//! Comment rendering.
//!
//! Every stored comment is compiled and evaluated as a Jinja template each time
//! a profile is viewed. The template sees the viewer's name, the full user table
//! (password digests included) and a secret string. Comment text is code here,
//! not data: this is the SSTI exercise and must not be sandboxed or cached.

use minijinja::{Environment, context};

use crate::user::UserTable;

/// Values exposed to comment templates.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    /// Username of whoever is viewing the profile, exposed as `current_user`.
    pub current_user: &'a str,
    /// Full user table, exposed as `users`.
    pub users: &'a UserTable,
    /// Exposed as `secret_key`.
    pub secret_key: &'a str,
}

/// Evaluates comment text as templates.
#[derive(Debug)]
pub struct CommentRenderer {
    env: Environment<'static>,
}

impl CommentRenderer {
    pub fn new() -> Self {
        Self {
            env: Environment::new(),
        }
    }

    /// Render one comment.
    ///
    /// On a syntax or evaluation error the comment text is returned unchanged.
    pub fn render(&self, comment: &str, ctx: &RenderContext<'_>) -> String {
        let result = self.env.render_str(
            comment,
            context! {
                current_user => ctx.current_user,
                users => ctx.users,
                secret_key => ctx.secret_key,
            },
        );

        match result {
            Ok(rendered) => rendered,
            Err(e) => {
                tracing::debug!("Comment failed to render, showing raw text: {e}");
                comment.to_string()
            }
        }
    }

    /// Render every comment in order.
    pub fn render_all(&self, comments: &[String], ctx: &RenderContext<'_>) -> Vec<String> {
        comments
            .iter()
            .map(|comment| self.render(comment, ctx))
            .collect()
    }
}

impl Default for CommentRenderer {
    fn default() -> Self {
        Self::new()
    }
}

//! Storage pages: list, create and delete comments backed by blobs

use std::sync::Arc;

use axum::Form;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};

use super::{AppState, escape, layout};
use crate::error::Error;
use crate::models::Comment;

pub async fn index(State(state): State<Arc<AppState>>) -> Result<Html<String>, Error> {
    let comments = state.comments.list().await?;

    let mut body = String::from(r#"<p><a href="/storage/create">Create a comment</a></p>"#);
    if comments.is_empty() {
        body.push_str("<p>No comments yet.</p>");
    } else {
        body.push_str("<table><tr><th>Name</th><th>Comment</th><th></th></tr>");
        for comment in &comments {
            body.push_str(&format!(
                r#"<tr><td>{name}</td><td>{text}</td><td><a href="/storage/delete/{link}">delete</a></td></tr>"#,
                name = escape(&comment.name),
                text = escape(&comment.text),
                link = urlencoding::encode(&comment.name),
            ));
        }
        body.push_str("</table>");
    }

    Ok(layout("Comments", &body))
}

pub async fn create_form() -> Html<String> {
    render_create_form(&Comment::default(), None)
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Form(comment): Form<Comment>,
) -> Result<Response, Error> {
    if let Some(problem) = comment.name_error() {
        let page = render_create_form(&comment, Some(problem));
        return Ok((StatusCode::UNPROCESSABLE_ENTITY, page).into_response());
    }

    state.comments.create(&comment).await?;
    Ok(Redirect::to("/storage").into_response())
}

pub async fn confirm_delete(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Html<String>, Error> {
    let comment = state.comments.find(&name).await?;

    let body = format!(
        r#"<p>Delete this comment?</p>
<table><tr><th>Name</th><td>{name}</td></tr><tr><th>Comment</th><td>{text}</td></tr></table>
<form method="post" action="/storage/delete/{link}">
  <button type="submit">Delete</button> <a href="/storage">Cancel</a>
</form>"#,
        name = escape(&comment.name),
        text = escape(&comment.text),
        link = urlencoding::encode(&comment.name),
    );

    Ok(layout("Delete comment", &body))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Redirect, Error> {
    state.comments.delete(&name).await?;
    Ok(Redirect::to("/storage"))
}

fn render_create_form(comment: &Comment, problem: Option<&str>) -> Html<String> {
    let notice = match problem {
        Some(problem) => format!(r#"<p class="error">{}</p>"#, escape(problem)),
        None => String::new(),
    };
    let body = format!(
        r#"{notice}<form method="post" action="/storage/create">
  <p><label>Name <input name="name" value="{name}"></label></p>
  <p><label>Comment <textarea name="text">{text}</textarea></label></p>
  <button type="submit">Create</button> <a href="/storage">Cancel</a>
</form>"#,
        notice = notice,
        name = escape(&comment.name),
        text = escape(&comment.text),
    );
    layout("Create comment", &body)
}

//! Graph page: profile of the signed-in identity

use std::sync::Arc;

use axum::extract::State;
use axum::response::Html;

use super::{AppState, escape, layout};
use crate::models::Profile;

pub async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    match state.graph.fetch_profile().await {
        Ok(profile) => render_profile(&profile),
        Err(err) => {
            tracing::warn!("profile unavailable: {err}");
            layout(
                "Profile",
                &format!(
                    r#"<p class="error">Could not load the profile: {}</p>"#,
                    escape(&err.to_string()),
                ),
            )
        }
    }
}

fn render_profile(profile: &Profile) -> Html<String> {
    let photo = match &profile.photo_base64 {
        Some(photo) => format!(
            r#"<p><img src="data:image/jpeg;base64,{photo}" alt="profile photo" width="120"></p>"#,
        ),
        None => "<p>No profile photo.</p>".to_string(),
    };
    let body = format!(
        "<p>Signed in as <strong>{}</strong></p>\n{}",
        escape(&profile.display_name),
        photo,
    );
    layout("Profile", &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_the_photo_when_present() {
        let page = render_profile(&Profile {
            display_name: "Megan Bowen".to_string(),
            photo_base64: Some("AQID".to_string()),
        });
        assert!(page.0.contains("Megan Bowen"));
        assert!(page.0.contains("data:image/jpeg;base64,AQID"));
    }

    #[test]
    fn renders_a_placeholder_without_a_photo() {
        let page = render_profile(&Profile {
            display_name: "Megan Bowen".to_string(),
            photo_base64: None,
        });
        assert!(page.0.contains("No profile photo."));
    }

    #[test]
    fn escapes_the_display_name() {
        let page = render_profile(&Profile {
            display_name: "<script>x</script>".to_string(),
            photo_base64: None,
        });
        assert!(!page.0.contains("<script>"));
    }
}

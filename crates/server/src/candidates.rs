//! Candidate management, including photo uploads.

use api_types::{
    admin::{CandidateForm, CandidatesPage, DeleteCandidateForm},
    flash::FlashMessage,
};
use axum::{
    Form,
    body::Bytes,
    extract::{Multipart, State, multipart::MultipartError},
};
use axum_extra::extract::cookie::SignedCookieJar;
use engine::CandidateInput;

use crate::{
    ServerError,
    server::ServerState,
    uploads,
    view::{self, FormResult, Page},
};

const PAGE: &str = "/admin/candidates";
const PHOTO_FIELD: &str = "photo";

pub async fn list(
    State(state): State<ServerState>,
    jar: SignedCookieJar,
) -> Result<Page<CandidatesPage>, ServerError> {
    let candidates = state.engine.list_candidates().await?;
    let positions = state.engine.list_positions().await?;
    let elections = state.engine.list_elections().await?;
    Ok(view::render(
        jar,
        "admin/candidates.html",
        CandidatesPage {
            candidates: candidates.into_iter().map(view::candidate_row).collect(),
            positions: positions.into_iter().map(view::position_row).collect(),
            elections: elections.iter().map(view::election_summary).collect(),
        },
    ))
}

struct Photo {
    file_name: String,
    bytes: Bytes,
}

async fn read_form(
    multipart: &mut Multipart,
) -> Result<(CandidateForm, Option<Photo>), MultipartError> {
    let mut form = CandidateForm::default();
    let mut photo = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        if name == PHOTO_FIELD {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let bytes = field.bytes().await?;
            // Browsers send an empty part when no file was chosen.
            if !file_name.is_empty() && !bytes.is_empty() {
                photo = Some(Photo { file_name, bytes });
            }
            continue;
        }

        let value = Some(field.text().await?);
        match name.as_str() {
            "candidate_id" => form.candidate_id = value,
            "full_name" => form.full_name = value,
            "position_id" => form.position_id = value,
            "party" => form.party = value,
            "bio" => form.bio = value,
            "election_id" => form.election_id = value,
            _ => {}
        }
    }
    Ok((form, photo))
}

pub async fn save(
    State(state): State<ServerState>,
    jar: SignedCookieJar,
    mut multipart: Multipart,
) -> FormResult {
    let (form, photo) = match read_form(&mut multipart).await {
        Ok(parsed) => parsed,
        Err(err) => {
            tracing::warn!("unreadable candidate form: {err}");
            return view::redirect(
                jar,
                PAGE,
                FlashMessage::error(format!("Upload failed: {}", err.body_text())),
            );
        }
    };

    let uploads_dir = &state.config.uploads_dir;
    let stored_photo = match &photo {
        Some(photo) => Some(uploads::store(uploads_dir, &photo.file_name, &photo.bytes).await?),
        None => None,
    };

    let outcome = state
        .engine
        .save_candidate(CandidateInput {
            candidate_id: form.candidate_id,
            full_name: form.full_name,
            position_id: form.position_id,
            party: form.party,
            bio: form.bio,
            election_id: form.election_id,
            photo_filename: stored_photo.clone(),
        })
        .await;

    let outcome = match outcome {
        Ok(saved) => {
            if let Some(old) = &saved.replaced_photo {
                uploads::remove(uploads_dir, old).await;
            }
            Ok(if saved.created {
                format!("Candidate \"{}\" created.", saved.candidate.full_name)
            } else {
                format!("Candidate \"{}\" updated.", saved.candidate.full_name)
            })
        }
        Err(err) => {
            if let Some(name) = &stored_photo {
                uploads::remove(uploads_dir, name).await;
            }
            Err(err)
        }
    };
    view::form_outcome(jar, outcome, PAGE, PAGE)
}

pub async fn delete(
    State(state): State<ServerState>,
    jar: SignedCookieJar,
    Form(form): Form<DeleteCandidateForm>,
) -> FormResult {
    let outcome = match state
        .engine
        .delete_candidate(form.candidate_id.as_deref())
        .await
    {
        Ok(candidate) => {
            if let Some(photo) = &candidate.photo_filename {
                uploads::remove(&state.config.uploads_dir, photo).await;
            }
            Ok(format!("Candidate \"{}\" deleted.", candidate.full_name))
        }
        Err(err) => Err(err),
    };
    view::form_outcome(jar, outcome, PAGE, PAGE)
}

//! Plain-text rendering of the selection screen.

use std::fmt::Write as _;

use selection_core::{
    GalleryStateStore, Notice, NoticeKind, SelectionSummary, ViewController, ViewSelector,
};

pub fn screen(
    store: &GalleryStateStore,
    view: &ViewController,
    summary: SelectionSummary,
    can_complete: bool,
) -> String {
    let mut out = String::new();
    let Some(bundle) = store.bundle() else {
        out.push_str("Loading gallery...\n");
        return out;
    };
    let selector = view.selector();

    let _ = writeln!(out, "== {} ==", selector.title(bundle));
    let _ = write!(
        out,
        "liked {} | disliked {} | unrated {}",
        summary.liked, summary.disliked, summary.unrated,
    );
    if can_complete {
        let _ = write!(out, " | Done ({})", summary.pending_liked);
    }
    out.push('\n');

    let custom: Vec<String> = bundle
        .custom_galleries()
        .map(|gallery| format!("{} ({})", gallery.title, gallery.id))
        .collect();
    if !custom.is_empty() {
        let _ = writeln!(out, "galleries: {}", custom.join(", "));
    }

    let photos = view.current_photos(store);
    match view.current_photo(store) {
        None => {
            let _ = writeln!(out, "{}", selector.empty_message());
        }
        Some(photo) => {
            let position = photos
                .iter()
                .position(|candidate| candidate.id == photo.id)
                .unwrap_or(0);
            let _ = write!(
                out,
                "[{}/{}] photo {} {}",
                position + 1,
                photos.len(),
                photo.id,
                view.image_ref(photo)
            );
            if let Some(caption) = &photo.caption {
                let _ = write!(out, " \"{caption}\"");
            }
            if view.is_loading(photo.id) {
                out.push_str(" (loading)");
            }
            if let Some(decision) = store.overlay().decision_of(photo.id) {
                let _ = write!(out, " [{}d]", decision.verb());
            }
            out.push('\n');
        }
    }

    if selector != ViewSelector::All && !photos.is_empty() {
        let ids: Vec<String> = photos.iter().map(|photo| photo.id.to_string()).collect();
        let _ = writeln!(out, "photos: {}", ids.join(" "));
    }

    if let Some(preview) = view.preview().and_then(|id| bundle.find_photo(id)) {
        let _ = writeln!(out, "preview: {}", view.image_ref(preview));
    }
    out
}

pub fn notices(notices: &[Notice]) -> String {
    let mut out = String::new();
    for notice in notices {
        let label = match notice.kind {
            NoticeKind::Validation => "!",
            NoticeKind::Busy => "…",
            NoticeKind::MoveFailed | NoticeKind::ResyncFailed | NoticeKind::FetchFailed => "error",
        };
        let _ = writeln!(out, "{label}: {}", notice.message);
    }
    out
}

/// The message shown once the client finishes rating.
pub fn completion(summary: SelectionSummary) -> String {
    format!(
        "Selection Complete!\nYou've liked {} and disliked {}.\n(keep rating, or type 'quit' to leave)\n",
        photo_count(summary.liked),
        photo_count(summary.disliked),
    )
}

fn photo_count(count: usize) -> String {
    if count == 1 {
        "1 photo".to_string()
    } else {
        format!("{count} photos")
    }
}

pub fn failure(message: &str) -> String {
    format!("Gallery not available\n{message}\n(type 'reload' to try again or 'quit')\n")
}

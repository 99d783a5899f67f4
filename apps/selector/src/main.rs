mod commands;
mod config;
mod render;

use std::{path::PathBuf, time::Duration};

use anyhow::Result;
use clap::Parser;
use commands::{parse_command, Command, HELP};
use config::{load_settings, CliOverrides};
use selection_core::{
    CategorizationService, Decision, FormFactor, HttpGalleryApi, IntentOutcome,
    RecordingNotificationSink, SelectionSession, SessionPhase, SwipeDecision,
};
use shared::domain::PhotoId;
use tokio::io::{stdin, AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

type Session = SelectionSession<HttpGalleryApi, RecordingNotificationSink>;

#[derive(Parser, Debug)]
#[command(about = "Sort a shared gallery into liked and disliked photos")]
struct Args {
    /// Public selection token from the share link.
    token: String,
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    config: Option<PathBuf>,
    /// Behave like a touch device: auto-advance after each decision.
    #[arg(long)]
    touch: bool,
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let settings = load_settings(&CliOverrides {
        config_path: args.config,
        server_url: args.server_url,
        request_timeout_secs: args.timeout_secs,
        touch_device: args.touch,
    })?;

    let mut api = HttpGalleryApi::new(&settings.server_url)?;
    if let Some(token) = &settings.bearer_token {
        api = api.with_bearer_token(token.clone());
    }
    let service = CategorizationService::new(api)
        .with_timeout(Duration::from_secs(settings.request_timeout_secs));
    let form_factor = if settings.touch_device {
        FormFactor::Touch
    } else {
        FormFactor::Pointer
    };
    info!(server_url = %settings.server_url, ?form_factor, "starting selector");

    let notices = RecordingNotificationSink::new();
    let mut session = SelectionSession::new(args.token, service, notices.clone(), form_factor);

    if let Err(err) = session.mount().await {
        warn!(%err, "initial fetch failed");
    }
    print_state(&session, &notices);

    let mut lines = BufReader::new(stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                println!("{err}");
                continue;
            }
        };
        if command == Command::Quit {
            break;
        }
        handle(&mut session, command).await;
        print_state(&session, &notices);
    }

    let summary = session.summary();
    info!(
        liked = summary.liked,
        disliked = summary.disliked,
        unrated = summary.unrated,
        "selector finished"
    );
    Ok(())
}

async fn handle(session: &mut Session, command: Command) {
    if matches!(session.phase(), SessionPhase::Failed(_)) {
        match command {
            Command::Reload => {
                let _ = session.reload().await;
            }
            Command::Help => println!("{HELP}"),
            _ => println!("the gallery is not loaded; try 'reload'"),
        }
        return;
    }

    match command {
        Command::Like(photo) => decide(session, photo, Decision::Liked).await,
        Command::Dislike(photo) => decide(session, photo, Decision::Disliked).await,
        Command::Next => {
            if !session.advance() {
                println!("already at the last photo");
            }
        }
        Command::Prev => {
            if !session.retreat() {
                println!("already at the first photo");
            }
        }
        Command::View(selector) => session.select_view(selector),
        Command::Back => session.back_to_all(),
        Command::Swipe { from, to } => {
            if !session.gestures().is_enabled() {
                println!("swiping only works in the all-photos view");
                return;
            }
            session.drag_start(from);
            session.drag_move(to);
            let (swipe, outcome) = session.drag_end().await;
            match (swipe, outcome) {
                (SwipeDecision::None, _) => println!("not far enough to decide"),
                (_, Some(outcome)) => report(outcome),
                (_, None) => println!("no photo under the cursor"),
            }
        }
        Command::Preview(photo_id) => session.open_preview(photo_id),
        Command::ClosePreview => session.close_preview(),
        Command::ImageLoaded(photo_id) => session.image_loaded(photo_id),
        Command::ImageFailed(photo_id) => session.image_failed(photo_id),
        Command::Summary => {
            let summary = session.summary();
            println!(
                "liked {} ({} pending) | disliked {} ({} pending) | unrated {}",
                summary.liked,
                summary.pending_liked,
                summary.disliked,
                summary.pending_disliked,
                summary.unrated
            );
        }
        Command::Done => match session.completion() {
            Some(summary) => print!("{}", render::completion(summary)),
            None => println!("like at least one photo before finishing"),
        },
        Command::Reload => {
            let _ = session.reload().await;
        }
        Command::Help => println!("{HELP}"),
        Command::Quit => {}
    }
}

async fn decide(session: &mut Session, photo: Option<PhotoId>, decision: Decision) {
    let target = photo.or_else(|| {
        session
            .view()
            .current_photo(session.store())
            .map(|photo| photo.id)
    });
    match target {
        Some(photo_id) => report(session.decide(photo_id, decision).await),
        None => println!("no photo under the cursor"),
    }
}

fn report(outcome: IntentOutcome) {
    match outcome {
        IntentOutcome::Moved => println!("saved"),
        IntentOutcome::MovedStale => println!("saved; the view may be out of date"),
        IntentOutcome::Reverted | IntentOutcome::Rejected => {}
    }
}

fn print_state(session: &Session, notices: &RecordingNotificationSink) {
    print!("{}", render::notices(&notices.drain()));
    match session.phase() {
        SessionPhase::Failed(message) => print!("{}", render::failure(message)),
        _ => print!(
            "{}",
            render::screen(
                session.store(),
                session.view(),
                session.summary(),
                session.can_complete()
            )
        ),
    }
}

use anyhow::{anyhow, bail, Context, Result};
use selection_core::ViewSelector;
use shared::domain::{GalleryId, PhotoId};

pub const HELP: &str = "\
commands:
  like [photo]        like the photo under the cursor, or the given id
  dislike [photo]     dislike the photo under the cursor, or the given id
  next | prev         move the cursor
  view <all|liked|disliked|gallery-id>
  back                return to all photos
  swipe <from> <to>   drag horizontally from one x to another
  preview <photo>     open the full-size preview
  close               close the preview
  loaded <photo>      report an image as loaded
  broken <photo>      report an image as failed to load
  summary             show decision counts
  done                finish once at least one photo is liked
  reload              refetch the gallery
  help | quit";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Like(Option<PhotoId>),
    Dislike(Option<PhotoId>),
    Next,
    Prev,
    View(ViewSelector),
    Back,
    Swipe { from: f64, to: f64 },
    Preview(PhotoId),
    ClosePreview,
    ImageLoaded(PhotoId),
    ImageFailed(PhotoId),
    Summary,
    Done,
    Reload,
    Help,
    Quit,
}

/// Parses one input line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let command = match head.to_ascii_lowercase().as_str() {
        "like" | "l" => Command::Like(optional_photo(&args)?),
        "dislike" | "d" => Command::Dislike(optional_photo(&args)?),
        "next" | "n" => no_args(Command::Next, &args)?,
        "prev" | "p" => no_args(Command::Prev, &args)?,
        "view" => Command::View(parse_selector(single(&args, "view")?)?),
        "back" => no_args(Command::Back, &args)?,
        "swipe" => match args.as_slice() {
            [from, to] => Command::Swipe {
                from: parse_coordinate(from)?,
                to: parse_coordinate(to)?,
            },
            _ => bail!("usage: swipe <from> <to>"),
        },
        "preview" => Command::Preview(parse_photo(single(&args, "preview")?)?),
        "close" => no_args(Command::ClosePreview, &args)?,
        "loaded" => Command::ImageLoaded(parse_photo(single(&args, "loaded")?)?),
        "broken" => Command::ImageFailed(parse_photo(single(&args, "broken")?)?),
        "summary" => no_args(Command::Summary, &args)?,
        "done" => no_args(Command::Done, &args)?,
        "reload" => no_args(Command::Reload, &args)?,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => bail!("unknown command '{other}' (try 'help')"),
    };
    Ok(Some(command))
}

fn no_args(command: Command, args: &[&str]) -> Result<Command> {
    if args.is_empty() {
        Ok(command)
    } else {
        Err(anyhow!("{command:?} takes no arguments"))
    }
}

fn single<'a>(args: &[&'a str], name: &str) -> Result<&'a str> {
    match args {
        [one] => Ok(*one),
        _ => bail!("usage: {name} <value>"),
    }
}

fn optional_photo(args: &[&str]) -> Result<Option<PhotoId>> {
    match args {
        [] => Ok(None),
        [one] => parse_photo(one).map(Some),
        _ => bail!("expected at most one photo id"),
    }
}

fn parse_photo(raw: &str) -> Result<PhotoId> {
    raw.parse::<i64>()
        .map(PhotoId)
        .with_context(|| format!("'{raw}' is not a photo id"))
}

fn parse_coordinate(raw: &str) -> Result<f64> {
    let value: f64 = raw
        .parse()
        .with_context(|| format!("'{raw}' is not a coordinate"))?;
    if !value.is_finite() {
        bail!("'{raw}' is not a finite coordinate");
    }
    Ok(value)
}

fn parse_selector(raw: &str) -> Result<ViewSelector> {
    Ok(match raw.to_ascii_lowercase().as_str() {
        "all" => ViewSelector::All,
        "liked" => ViewSelector::Liked,
        "disliked" => ViewSelector::Disliked,
        other => ViewSelector::Custom(GalleryId(
            other
                .parse()
                .with_context(|| format!("'{raw}' is not a view name or gallery id"))?,
        )),
    })
}

#[cfg(test)]
#[path = "tests/commands_tests.rs"]
mod tests;
